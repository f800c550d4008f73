use crate::errors::HandshakeError;
use crate::sim::event_log::Severity;
use crate::sim::events::SimEvent;
use crate::sim::simulation::Simulation;
use crate::tcp::state::{ConnectionStatus, TcpState};
use crate::tcp::tcp_segment::{PacketKind, Segment};

impl Simulation {
    /// Run `step`, retransmitting lost packets up to `max_retries` attempts in total.
    ///
    /// The retry counter is visible through the state while this runs. It is zeroed
    /// when the step is delivered and left at `max_retries` when the budget runs out,
    /// at which point both endpoints fail and the run is halted.
    pub fn run_step_with_retry(&mut self, step: u8) -> Result<Segment, HandshakeError> {
        self.state.retries = 0;
        loop {
            match self.execute_step(step) {
                Ok(segment) => {
                    self.state.retries = 0;
                    return Ok(segment);
                }
                Err(HandshakeError::PacketLost { kind }) => {
                    self.state.retries += 1;
                    if self.state.retries >= self.config.max_retries {
                        return Err(self.fail(kind));
                    }
                    let message = format!(
                        "Retransmitting {kind} (attempt {}/{})",
                        self.state.retries + 1,
                        self.config.max_retries
                    );
                    self.narrate(Severity::Warning, message);
                    self.sink.emit(&SimEvent::RetryScheduled {
                        kind,
                        retries: self.state.retries,
                        max_retries: self.config.max_retries,
                    });
                    self.timer.sleep(self.config.backoff);
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn fail(&mut self, kind: PacketKind) -> HandshakeError {
        let attempts = self.state.retries;
        self.state.client = TcpState::Failed;
        self.state.server = TcpState::Failed;
        self.state.status = ConnectionStatus::Failed;
        self.active.stop();
        self.narrate(
            Severity::Error,
            format!("{kind} not delivered after {attempts} attempts, connection FAILED"),
        );
        HandshakeError::RetriesExhausted { kind, attempts }
    }
}

// -- Unit tests --
