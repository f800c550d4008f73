use std::time::Duration;
use thiserror::Error;
use crate::tcp::tcp_segment::PacketKind;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandshakeError {
    #[error("{kind} packet lost")]
    PacketLost { kind: PacketKind }, // Recoverable, consumed by the retry loop

    #[error("{kind} not delivered after {attempts} attempts")]
    RetriesExhausted { kind: PacketKind, attempts: u32 }, // Terminal for the run

    #[error("Invalid handshake step: {0}")]
    InvalidStep(u8),

    #[error("Step out of order: expected {expected}, got {got}")]
    OutOfOrder { expected: u8, got: u8 },

    #[error("Handshake already finished")]
    Finished,

    #[error("A simulation run is already active")]
    Busy,

    #[error("Simulation run was stopped")]
    Stopped,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Transit duration {got:?} outside {min:?}..={max:?}")]
    TransitOutOfRange {
        got: Duration,
        min: Duration,
        max: Duration,
    },

    #[error("max_retries must be at least 1")]
    ZeroRetries,

    #[error("Unknown loss policy: {0}")]
    UnknownLossPolicy(String),

    #[error("Unknown drive mode: {0}")]
    UnknownDriveMode(String),

    #[error("Unknown packet kind: {0}")]
    UnknownPacketKind(String),
}
