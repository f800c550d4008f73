//! An illustrative simulator of the TCP three-way handshake.
//!
//! Nothing here touches a socket. A [`sim::Simulation`] owns a client/server
//! pair, walks them through SYN, SYN-ACK and ACK, drops packets according to a
//! [`sim::PacketLoss`] policy and retransmits with a fixed backoff until the
//! connection is established or the retry budget runs out.
//!
//! Randomness, pauses and animation hooks are injected, so a run can be made
//! fully deterministic:
//!
//! ```
//! use handshake_sim::sim::{PacketLoss, SimConfig, Simulation, NullSink, VirtualClock};
//! use handshake_sim::tcp::ConnectionStatus;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let config = SimConfig { loss: PacketLoss::None, randomize_isn: false, ..Default::default() };
//! let mut sim = Simulation::new(
//!     config,
//!     Box::new(StdRng::seed_from_u64(0)),
//!     Box::new(VirtualClock::new()),
//!     Box::new(NullSink),
//! ).unwrap();
//!
//! assert_eq!(sim.run(), Ok(ConnectionStatus::Established));
//! assert_eq!(sim.state().client_seq().value(), 1001);
//! ```

pub mod errors;
pub mod sim;
pub mod tcp;
