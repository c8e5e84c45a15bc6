//! Errors raised while building, updating or tearing down the watchface.
//!
//! Every variant is `Copy` and fixed-size, so errors can be logged with
//! `defmt` and returned from handlers without `alloc`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // UI toolkit
    /// The toolkit has no free slot left for this kind of resource.
    ResourceExhausted(Resource),

    /// A handle did not refer to a live resource of this kind.
    InvalidHandle(Resource),

    // Notification services
    /// A notification service refused the subscription.
    Subscribe(Service),

    // Display
    /// Drawing to or flushing the panel failed.
    Display,

    // BLE
    /// Advertising or the GATT server failed.
    Ble(BleError),
}

/// Kinds of toolkit resources the watchface acquires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resource {
    Window,
    TextLayer,
    BitmapLayer,
    Bitmap,
    Font,
}

/// Notification services the watchface subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Service {
    Tick,
    Battery,
    Connection,
}

/// BLE failures surfaced by the peripheral task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BleError {
    /// Connectable advertising could not start.
    AdvertiseFailed,
    /// GATT server registration or notification failed.
    GattServer,
}

impl From<BleError> for Error {
    fn from(e: BleError) -> Self {
        Error::Ble(e)
    }
}
