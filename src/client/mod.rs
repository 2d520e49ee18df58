//! Relay client
//!
//! Connects a desktop or mobile device to a relay server, for tools and
//! integration tests.

pub mod connector;

pub use connector::RelayClient;
