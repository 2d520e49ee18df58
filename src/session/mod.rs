//! Stream session management
//!
//! Each accepted connection runs one [`StreamSession`], which binds the
//! connection to a (user, role) pair and relays its packets.

pub mod handler;
pub mod state;

pub use handler::StreamSession;
pub use state::{SessionPhase, SessionState};
