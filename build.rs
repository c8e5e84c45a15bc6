//! Build script - copies the linker script into the output directory
//! so that the linker can find it at link time, and records the build
//! time as the firmware's wall-clock base.

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to OUT_DIR
    fs::copy("memory.x", out_dir.join("memory.x")).unwrap();

    // Tell cargo to look for linker scripts in OUT_DIR
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Firmware link scripts (cortex-m-rt, defmt); host test builds skip them.
    if env::var("TARGET").is_ok_and(|t| t.starts_with("thumb")) {
        println!("cargo:rustc-link-arg-bins=--nmagic");
        println!("cargo:rustc-link-arg-bins=-Tlink.x");
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    // The board has no battery-backed RTC; the clock starts at build time.
    let epoch = chrono::Utc::now().timestamp();
    fs::write(
        out_dir.join("build_time.rs"),
        format!("pub const BUILD_EPOCH: i64 = {epoch};\n"),
    )
    .unwrap();

    // No rerun-if-changed: Cargo then re-runs this script whenever any file
    // in the package changes, which keeps BUILD_EPOCH close to flash time.
}
