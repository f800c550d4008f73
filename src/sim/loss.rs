use std::fmt;
use std::str::FromStr;
use rand::{Rng, RngCore};
use crate::errors::ConfigError;
use crate::tcp::tcp_segment::PacketKind;

/// Drop probability applied by `PacketLoss::Random`.
pub const RANDOM_LOSS_RATE: f64 = 0.30;

/// Which simulated packets the network drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PacketLoss {
    #[default]
    None,
    Syn,
    SynAck,
    Ack,
    Random,
}

impl PacketLoss {
    /// Decide whether one attempt at sending `kind` is dropped.
    ///
    /// Only `Random` consumes randomness; every other policy is a pure function of `kind`.
    pub fn should_drop(&self, kind: PacketKind, rng: &mut dyn RngCore) -> bool {
        match self {
            PacketLoss::None => false,
            PacketLoss::Syn => kind == PacketKind::Syn,
            PacketLoss::SynAck => kind == PacketKind::SynAck,
            PacketLoss::Ack => kind == PacketKind::Ack,
            PacketLoss::Random => rng.gen_bool(RANDOM_LOSS_RATE),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PacketLoss::None => "none",
            PacketLoss::Syn => "syn",
            PacketLoss::SynAck => "syn-ack",
            PacketLoss::Ack => "ack",
            PacketLoss::Random => "random",
        }
    }
}

impl fmt::Display for PacketLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PacketLoss {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(PacketLoss::None),
            "random" => Ok(PacketLoss::Random),
            other => match other.parse::<PacketKind>() {
                Ok(PacketKind::Syn) => Ok(PacketLoss::Syn),
                Ok(PacketKind::SynAck) => Ok(PacketLoss::SynAck),
                Ok(PacketKind::Ack) => Ok(PacketLoss::Ack),
                Err(_) => Err(ConfigError::UnknownLossPolicy(s.to_string())),
            },
        }
    }
}

// -- Unit tests --
