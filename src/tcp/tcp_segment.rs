use std::fmt;
use std::str::FromStr;
use crate::errors::ConfigError;
use crate::tcp::tcp_flags::TcpFlags;
use crate::tcp::wrap32::Wrap32;

/// Which way a segment travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ClientToServer,
    ServerToClient,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::ClientToServer => f.write_str("client -> server"),
            Direction::ServerToClient => f.write_str("server -> client"),
        }
    }
}

/// The three messages of the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketKind {
    Syn,
    SynAck,
    Ack,
}

impl PacketKind {
    pub fn flags(&self) -> TcpFlags {
        match self {
            PacketKind::Syn => TcpFlags::SYN,
            PacketKind::SynAck => TcpFlags::SYN | TcpFlags::ACK,
            PacketKind::Ack => TcpFlags::ACK,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PacketKind::Syn => "SYN",
            PacketKind::SynAck => "SYN-ACK",
            PacketKind::Ack => "ACK",
        }
    }
}

impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PacketKind {
    type Err = ConfigError;

    /// Case-insensitive match against the kind tag, e.g. `syn-ack` or `SYN-ACK`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SYN" => Ok(PacketKind::Syn),
            "SYN-ACK" => Ok(PacketKind::SynAck),
            "ACK" => Ok(PacketKind::Ack),
            _ => Err(ConfigError::UnknownPacketKind(s.to_string())),
        }
    }
}

/// A simulated handshake segment. Lives for exactly one step attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    kind: PacketKind,
    seq_no: Option<Wrap32>,
    ack_no: Option<Wrap32>,
    direction: Direction,
}

impl Segment {
    pub fn new(kind: PacketKind, direction: Direction) -> Self {
        Segment {
            kind,
            seq_no: None,
            ack_no: None,
            direction,
        }
    }

    pub fn seq_no(mut self, seq_no: Wrap32) -> Self {
        self.seq_no = Some(seq_no);
        self
    }

    pub fn ack_no(mut self, ack_no: Wrap32) -> Self {
        self.ack_no = Some(ack_no);
        self
    }

    pub fn kind(&self) -> PacketKind {
        self.kind
    }

    pub fn flags(&self) -> TcpFlags {
        self.kind.flags()
    }

    pub fn seq(&self) -> Option<Wrap32> {
        self.seq_no
    }

    pub fn ack(&self) -> Option<Wrap32> {
        self.ack_no
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(seq_no) = self.seq_no {
            write!(f, " seq={seq_no}")?;
        }
        if let Some(ack_no) = self.ack_no {
            write!(f, " ack={ack_no}")?;
        }
        write!(f, " ({})", self.direction)
    }
}
