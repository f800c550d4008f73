use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use crate::errors::ConfigError;
use crate::sim::loss::PacketLoss;

pub const MIN_TRANSIT: Duration = Duration::from_millis(800);
pub const MAX_TRANSIT: Duration = Duration::from_millis(5000);
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(1000);
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(500);

/// Whether the handshake plays out on its own or one step per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriveMode {
    #[default]
    RunToCompletion,
    SingleStep,
}

impl fmt::Display for DriveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriveMode::RunToCompletion => f.write_str("auto"),
            DriveMode::SingleStep => f.write_str("step"),
        }
    }
}

impl FromStr for DriveMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "run" | "run-to-completion" => Ok(DriveMode::RunToCompletion),
            "step" | "single-step" | "manual" => Ok(DriveMode::SingleStep),
            _ => Err(ConfigError::UnknownDriveMode(s.to_string())),
        }
    }
}

/// Everything the presentation side can tune. Read at reset and between steps.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub mode: DriveMode,
    pub loss: PacketLoss,
    pub transit: Duration,       // Time a delivered packet spends "on the wire"
    pub randomize_isn: bool,
    pub max_retries: u32,        // Attempts per step; 1 disables retransmission
    pub backoff: Duration,       // Pause before each retransmission
    pub step_delay: Duration,    // Pause between steps when running to completion
    pub seed: Option<u64>,       // Seed for ISNs and random loss; entropy when unset
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            mode: DriveMode::default(),
            loss: PacketLoss::default(),
            transit: MIN_TRANSIT,
            randomize_isn: true,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: DEFAULT_BACKOFF,
            step_delay: DEFAULT_STEP_DELAY,
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transit < MIN_TRANSIT || self.transit > MAX_TRANSIT {
            return Err(ConfigError::TransitOutOfRange {
                got: self.transit,
                min: MIN_TRANSIT,
                max: MAX_TRANSIT,
            });
        }
        if self.max_retries == 0 {
            return Err(ConfigError::ZeroRetries);
        }
        Ok(())
    }
}
