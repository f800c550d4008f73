use crate::errors::HandshakeError;
use crate::sim::config::DriveMode;
use crate::sim::simulation::{Simulation, FINAL_STEP};
use crate::tcp::state::ConnectionStatus;
use crate::tcp::tcp_segment::Segment;

impl Simulation {
    /// Play the handshake the way the configured drive mode asks for: the whole
    /// sequence, or just the next step.
    pub fn play(&mut self) -> Result<ConnectionStatus, HandshakeError> {
        match self.config.mode {
            DriveMode::RunToCompletion => self.run(),
            DriveMode::SingleStep => self.advance().map(|_| self.state.status),
        }
    }

    /// Run every remaining step in order, pausing `step_delay` between delivered steps.
    ///
    /// Stops at the first step whose retries run out, or before the next step if
    /// the run handle was stopped. A finished connection is returned as-is.
    pub fn run(&mut self) -> Result<ConnectionStatus, HandshakeError> {
        if !self.active.try_begin() {
            return Err(HandshakeError::Busy);
        }
        let result = self.run_steps();
        self.active.stop();
        result
    }

    fn run_steps(&mut self) -> Result<ConnectionStatus, HandshakeError> {
        if self.state.status.is_finished() {
            return Ok(self.state.status);
        }
        while self.state.step < FINAL_STEP {
            if !self.active.is_active() {
                log::debug!("[sim] run stopped before step {}", self.state.step + 1);
                return Err(HandshakeError::Stopped);
            }
            self.run_step_with_retry(self.state.step + 1)?;
            if self.state.step < FINAL_STEP {
                self.timer.sleep(self.config.step_delay);
            }
        }
        Ok(self.state.status)
    }

    /// Execute exactly the next step. `Ok(None)` when there is nothing left to do,
    /// either because all three steps were delivered or the connection failed.
    pub fn advance(&mut self) -> Result<Option<Segment>, HandshakeError> {
        if self.state.step >= FINAL_STEP || self.state.status == ConnectionStatus::Failed {
            return Ok(None);
        }
        if !self.active.try_begin() {
            return Err(HandshakeError::Busy);
        }
        let result = self.run_step_with_retry(self.state.step + 1);
        self.active.stop();
        result.map(Some)
    }
}

// -- Unit tests --
