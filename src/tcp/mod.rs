pub mod state;
pub mod tcp_flags;
pub mod tcp_segment;
pub mod wrap32;

// -- Re-export types for more concise usage

pub use state::{ConnectionStatus, TcpState};
pub use tcp_flags::TcpFlags;
pub use tcp_segment::{Direction, PacketKind, Segment};
pub use wrap32::Wrap32;
