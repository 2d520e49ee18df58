//! Fake stream handles for unit tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::error::SendError;
use super::handle::PacketSink;
use crate::protocol::Packet;

/// Handle that records every packet it is asked to deliver
pub struct RecordingSink {
    id: u64,
    sent: Mutex<Vec<Packet>>,
    fail: AtomicBool,
}

impl RecordingSink {
    pub fn new(id: u64) -> Arc<Self> {
        Arc::new(Self {
            id,
            sent: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        })
    }

    /// Handle whose sends always fail
    pub fn failing(id: u64) -> Arc<Self> {
        let sink = Self::new(id);
        sink.set_failing(true);
        sink
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Packets delivered so far
    pub fn sent(&self) -> Vec<Packet> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl PacketSink for RecordingSink {
    fn id(&self) -> u64 {
        self.id
    }

    async fn send(&self, packet: &Packet) -> Result<(), SendError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SendError::Closed);
        }
        self.sent.lock().unwrap().push(packet.clone());
        Ok(())
    }
}
