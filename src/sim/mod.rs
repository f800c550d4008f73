pub mod config;
pub mod driver;
pub mod event_log;
pub mod events;
pub mod executor;
pub mod isn;
pub mod loss;
pub mod retry;
pub mod simulation;
pub mod timer;

// -- Re-export structs for more concise usage

pub use config::{DriveMode, SimConfig};
pub use event_log::{EventLog, LogEntry, Severity};
pub use events::{EventSink, NullSink, RecordingSink, SimEvent};
pub use loss::PacketLoss;
pub use simulation::{HandshakeState, RunHandle, Simulation};
pub use timer::{ThreadTimer, Timer, VirtualClock};
