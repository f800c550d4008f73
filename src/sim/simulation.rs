use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use crate::errors::{ConfigError, HandshakeError};
use crate::sim::config::SimConfig;
use crate::sim::event_log::{EventLog, Severity};
use crate::sim::events::{EventSink, NullSink};
use crate::sim::isn::{generate_isn, IsnSpace};
use crate::sim::timer::{ThreadTimer, Timer};
use crate::tcp::state::{ConnectionStatus, TcpState};
use crate::tcp::wrap32::Wrap32;

/// Last handshake step; the step counter reads this once the ACK is delivered.
pub const FINAL_STEP: u8 = 3;

/// Everything a renderer may observe about one run. Only the simulation mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeState {
    pub(crate) client: TcpState,
    pub(crate) server: TcpState,
    pub(crate) status: ConnectionStatus,
    pub(crate) step: u8,        // Delivered steps, 0..=3
    pub(crate) retries: u32,    // Failed attempts of the current step
    pub(crate) client_isn: Wrap32,
    pub(crate) server_isn: Wrap32,
    pub(crate) client_seq: Wrap32,
    pub(crate) server_seq: Wrap32,
    pub(crate) log: EventLog,
}

impl HandshakeState {
    fn new(client_isn: Wrap32, server_isn: Wrap32) -> Self {
        HandshakeState {
            client: TcpState::Closed,
            server: TcpState::Closed,
            status: ConnectionStatus::Idle,
            step: 0,
            retries: 0,
            client_isn,
            server_isn,
            client_seq: client_isn,
            server_seq: server_isn,
            log: EventLog::new(),
        }
    }

    pub fn client(&self) -> TcpState {
        self.client
    }

    pub fn server(&self) -> TcpState {
        self.server
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn step(&self) -> u8 {
        self.step
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn client_isn(&self) -> Wrap32 {
        self.client_isn
    }

    pub fn server_isn(&self) -> Wrap32 {
        self.server_isn
    }

    pub fn client_seq(&self) -> Wrap32 {
        self.client_seq
    }

    pub fn server_seq(&self) -> Wrap32 {
        self.server_seq
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }
}

/// Shared run-active flag. Clones observe and clear the same flag, which is
/// how a run is stopped between steps.
#[derive(Debug, Clone, Default)]
pub struct RunHandle {
    active: Arc<AtomicBool>,
}

impl RunHandle {
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Ask an in-flight run to stop before its next step. The current step still resolves.
    pub fn stop(&self) {
        self.active.store(false, Ordering::Release);
    }

    pub(crate) fn try_begin(&self) -> bool {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// One simulated client/server pair and the collaborators it is driven with.
pub struct Simulation {
    pub(crate) config: SimConfig,
    pending: Option<SimConfig>,         // Held back until the next reset
    pub(crate) state: HandshakeState,
    pub(crate) rng: Box<dyn RngCore>,   // ISNs and random loss
    pub(crate) timer: Box<dyn Timer>,   // Transit, backoff and inter-step pauses
    pub(crate) sink: Box<dyn EventSink>, // Animation hooks
    pub(crate) active: RunHandle,
}

impl Simulation {
    /// Build a simulation from explicit collaborators and reset it.
    pub fn new(
        config: SimConfig,
        rng: Box<dyn RngCore>,
        timer: Box<dyn Timer>,
        sink: Box<dyn EventSink>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut sim = Simulation {
            config,
            pending: None,
            state: HandshakeState::new(Wrap32::new(0), Wrap32::new(0)),
            rng,
            timer,
            sink,
            active: RunHandle::default(),
        };
        sim.reinitialize();
        Ok(sim)
    }

    /// Wall-clock timer, no event sink, RNG seeded from `config.seed` or entropy.
    pub fn from_config(config: SimConfig) -> Result<Self, ConfigError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(config, Box::new(rng), Box::new(ThreadTimer::new()), Box::new(NullSink))
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Replace the configuration. An idle simulation takes it at once (ISN
    /// randomization still waits for the next reset); once the handshake has
    /// started it is held until the next reset, so one run sees one policy.
    pub fn configure(&mut self, config: SimConfig) -> Result<(), ConfigError> {
        config.validate()?;
        if self.state.status == ConnectionStatus::Idle {
            self.config = config;
            self.pending = None;
        } else {
            log::debug!("[sim] configuration held until reset");
            self.pending = Some(config);
        }
        Ok(())
    }

    /// Configuration waiting for the next reset, if any
    pub fn pending_config(&self) -> Option<&SimConfig> {
        self.pending.as_ref()
    }

    pub fn state(&self) -> &HandshakeState {
        &self.state
    }

    pub fn run_handle(&self) -> RunHandle {
        self.active.clone()
    }

    /// Return both endpoints to CLOSED with fresh ISNs and an empty log.
    pub fn reset(&mut self) -> Result<(), HandshakeError> {
        if self.active.is_active() {
            return Err(HandshakeError::Busy);
        }
        self.reinitialize();
        Ok(())
    }

    fn reinitialize(&mut self) {
        if let Some(config) = self.pending.take() {
            self.config = config;
        }
        self.timer.restart();
        let client_isn = generate_isn(IsnSpace::Client, self.config.randomize_isn, self.rng.as_mut());
        let server_isn = generate_isn(IsnSpace::Server, self.config.randomize_isn, self.rng.as_mut());
        self.state = HandshakeState::new(client_isn, server_isn);
        log::debug!("[sim] reset: client isn={client_isn} server isn={server_isn}");
    }

    pub(crate) fn narrate(&mut self, severity: Severity, message: impl Into<String>) {
        let now = self.timer.elapsed();
        self.state.log.push(now, severity, message);
    }
}


#[cfg(test)]
mod tests {
    use super::fixture;
    use super::*;
    use crate::sim::config::DriveMode;
    use crate::sim::loss::PacketLoss;

    #[test]
    fn test_new_starts_closed() {
        let (sim, _, _) = fixture::simulation(PacketLoss::None, DriveMode::RunToCompletion);
        let state = sim.state();

        assert_eq!(state.client(), TcpState::Closed);
        assert_eq!(state.server(), TcpState::Closed);
        assert_eq!(state.status(), ConnectionStatus::Idle);
        assert_eq!(state.step(), 0);
        assert_eq!(state.retries(), 0);
        assert_eq!(state.client_isn(), Wrap32::new(1000));
        assert_eq!(state.server_isn(), Wrap32::new(2000));
        assert_eq!(state.client_seq(), Wrap32::new(1000));
        assert_eq!(state.server_seq(), Wrap32::new(2000));
        assert!(state.log().is_empty());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = SimConfig {
            max_retries: 0,
            ..Default::default()
        };
        assert!(matches!(Simulation::from_config(config), Err(ConfigError::ZeroRetries)));
    }

    #[test]
    fn test_seeded_isns_are_reproducible() {
        let config = SimConfig {
            seed: Some(2024),
            ..Default::default()
        };
        let a = Simulation::from_config(config.clone()).unwrap();
        let b = Simulation::from_config(config).unwrap();

        assert_eq!(a.state().client_isn(), b.state().client_isn());
        assert_eq!(a.state().server_isn(), b.state().server_isn());
    }

    #[test]
    fn test_configure_validates() {
        let (mut sim, _, _) = fixture::simulation(PacketLoss::None, DriveMode::RunToCompletion);
        let bad = SimConfig {
            transit: std::time::Duration::from_millis(10),
            ..Default::default()
        };
        assert!(sim.configure(bad).is_err());
        assert_eq!(sim.config().loss, PacketLoss::None);

        let good = SimConfig {
            loss: PacketLoss::Ack,
            ..sim.config().clone()
        };
        sim.configure(good).unwrap();
        assert_eq!(sim.config().loss, PacketLoss::Ack);
    }

    #[test]
    fn test_configure_mid_handshake_waits_for_reset() {
        let (mut sim, _, _) = fixture::simulation(PacketLoss::None, DriveMode::SingleStep);
        sim.advance().unwrap();
        assert_eq!(sim.state().status(), ConnectionStatus::Connecting);

        let lossy = SimConfig {
            loss: PacketLoss::SynAck,
            ..sim.config().clone()
        };
        sim.configure(lossy).unwrap();
        assert_eq!(sim.config().loss, PacketLoss::None);
        assert_eq!(sim.pending_config().map(|c| c.loss), Some(PacketLoss::SynAck));

        // The rest of this handshake still runs without loss
        sim.advance().unwrap();
        sim.advance().unwrap();
        assert_eq!(sim.state().status(), ConnectionStatus::Established);

        sim.reset().unwrap();
        assert_eq!(sim.config().loss, PacketLoss::SynAck);
        assert!(sim.pending_config().is_none());
        sim.advance().unwrap();
        assert!(sim.advance().is_err());
        assert_eq!(sim.state().status(), ConnectionStatus::Failed);
    }

    #[test]
    fn test_run_handle_is_exclusive() {
        let handle = RunHandle::default();
        assert!(handle.try_begin());
        assert!(!handle.try_begin());
        handle.stop();
        assert!(!handle.is_active());
        assert!(handle.try_begin());
    }
}
