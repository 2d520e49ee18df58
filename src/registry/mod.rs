//! Connection registry for device pairing
//!
//! The registry records, per user, which device connection is live for each
//! role. It never owns a connection: each session owns its socket and hands
//! the registry a shared [`StreamHandle`] used only for delivery.
//!
//! # Architecture
//!
//! ```text
//!                       Arc<ConnectionRegistry>
//!                  ┌──────────────────────────────┐
//!                  │ users: HashMap<UserId,       │
//!                  │   HashMap<DeviceRole,        │
//!                  │           StreamHandle>      │
//!                  │ >                            │
//!                  └──────────────┬───────────────┘
//!                                 │
//!           ┌─────────────────────┼─────────────────────┐
//!           │                     │                     │
//!           ▼                     ▼                     ▼
//!   [Session DESKTOP]       [PacketRouter]        [Session MOBILE]
//!   register/unregister     lookup + send         register/unregister
//! ```

pub mod error;
pub mod handle;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{RouteError, SendError};
pub use handle::{PacketSink, StreamHandle};
pub use store::ConnectionRegistry;
