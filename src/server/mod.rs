//! Relay server
//!
//! Accepts TCP connections and runs one frame loop per client. Stream
//! packets go through the session state machine; unary requests are
//! answered directly.

pub mod config;
pub mod connection;
pub mod listener;
pub mod writer;

pub use config::ServerConfig;
pub use connection::Connection;
pub use listener::RelayServer;
pub use writer::ConnectionWriter;
