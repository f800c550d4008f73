use std::cell::RefCell;
use std::rc::Rc;
use crate::tcp::tcp_segment::{PacketKind, Segment};

/// Cosmetic notifications for whoever animates the handshake. Nothing a sink
/// does with them flows back into the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    PacketDeparted(Segment),
    PacketLost(Segment),
    /// A lost packet will be resent after the backoff; `retries` failed attempts so far
    RetryScheduled {
        kind: PacketKind,
        retries: u32,
        max_retries: u32,
    },
}

pub trait EventSink {
    fn emit(&mut self, event: &SimEvent);
}

/// Discards every event.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &SimEvent) {}
}

/// Collects events into a buffer shared by all clones.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Rc<RefCell<Vec<SimEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SimEvent> {
        self.events.borrow().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &SimEvent) {
        self.events.borrow_mut().push(*event);
    }
}
