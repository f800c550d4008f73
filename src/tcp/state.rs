use std::fmt;

/// Handshake state of one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TcpState {
    #[default]
    Closed,      // No connection; initial state after reset
    SynSent,     // SYN sent, waiting for SYN-ACK
    SynRcvd,     // SYN received, SYN-ACK sent, waiting for ACK
    Established, // Handshake complete
    Failed,      // Retries exhausted; terminal until reset
}

impl TcpState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TcpState::Closed => "CLOSED",
            TcpState::SynSent => "SYN-SENT",
            TcpState::SynRcvd => "SYN-RECEIVED",
            TcpState::Established => "ESTABLISHED",
            TcpState::Failed => "FAILED",
        }
    }
}

impl fmt::Display for TcpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Overall status of the simulated connection.
///
/// `Established` iff both endpoints are `TcpState::Established`, `Failed` iff
/// both endpoints are `TcpState::Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Idle,
    Connecting,
    Established,
    Failed,
}

impl ConnectionStatus {
    /// The connection reached a terminal status and needs a reset.
    pub fn is_finished(&self) -> bool {
        matches!(self, ConnectionStatus::Established | ConnectionStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Idle => "idle",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Established => "established",
            ConnectionStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_states() {
        assert_eq!(TcpState::default(), TcpState::Closed);
        assert_eq!(ConnectionStatus::default(), ConnectionStatus::Idle);
    }

    #[test]
    fn test_display() {
        assert_eq!(TcpState::SynSent.to_string(), "SYN-SENT");
        assert_eq!(TcpState::SynRcvd.to_string(), "SYN-RECEIVED");
        assert_eq!(ConnectionStatus::Connecting.to_string(), "connecting");
    }

    #[test]
    fn test_is_finished() {
        assert!(!ConnectionStatus::Idle.is_finished());
        assert!(!ConnectionStatus::Connecting.is_finished());
        assert!(ConnectionStatus::Established.is_finished());
        assert!(ConnectionStatus::Failed.is_finished());
    }
}
