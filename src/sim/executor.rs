use crate::errors::HandshakeError;
use crate::sim::event_log::Severity;
use crate::sim::events::SimEvent;
use crate::sim::simulation::{Simulation, FINAL_STEP};
use crate::tcp::state::{ConnectionStatus, TcpState};
use crate::tcp::tcp_segment::{Direction, PacketKind, Segment};

impl Simulation {
    /// Make one attempt at handshake step `step` (1 = SYN, 2 = SYN-ACK, 3 = ACK).
    ///
    /// The sender's state moves before the loss decision is made, so a lost SYN
    /// still leaves the client in SYN-SENT. On delivery the step counter moves to
    /// `step`. Invalid, out-of-order or post-completion steps fail without touching state.
    pub fn execute_step(&mut self, step: u8) -> Result<Segment, HandshakeError> {
        let kind = match step {
            1 => PacketKind::Syn,
            2 => PacketKind::SynAck,
            3 => PacketKind::Ack,
            _ => return Err(HandshakeError::InvalidStep(step)),
        };
        if self.state.status.is_finished() {
            return Err(HandshakeError::Finished);
        }
        let expected = self.state.step + 1;
        if step != expected {
            return Err(HandshakeError::OutOfOrder { expected, got: step });
        }

        let segment = self.send(kind);
        self.narrate(Severity::Info, format!("Sending {segment}"));

        if self.config.loss.should_drop(kind, self.rng.as_mut()) {
            self.sink.emit(&SimEvent::PacketLost(segment));
            self.narrate(Severity::Warning, format!("{kind} packet lost in transit"));
            return Err(HandshakeError::PacketLost { kind });
        }

        self.sink.emit(&SimEvent::PacketDeparted(segment));
        log::debug!("[sim] in flight: {segment}");
        self.timer.sleep(self.config.transit);

        self.deliver(kind);
        self.state.step = step;
        Ok(segment)
    }

    /// Sender-side transition plus the segment it puts on the wire
    fn send(&mut self, kind: PacketKind) -> Segment {
        let state = &mut self.state;
        match kind {
            PacketKind::Syn => {
                state.client = TcpState::SynSent;
                state.status = ConnectionStatus::Connecting;
                Segment::new(kind, Direction::ClientToServer).seq_no(state.client_seq)
            }
            PacketKind::SynAck => {
                state.server = TcpState::SynRcvd;
                Segment::new(kind, Direction::ServerToClient)
                    .seq_no(state.server_seq)
                    .ack_no(state.client_seq + 1)
            }
            PacketKind::Ack => Segment::new(kind, Direction::ClientToServer)
                .seq_no(state.client_seq)
                .ack_no(state.server_seq + 1),
        }
    }

    /// Receiver-side effects once a segment arrives. A SYN is only consumed
    /// from the sequence space once it is acknowledged.
    fn deliver(&mut self, kind: PacketKind) {
        match kind {
            PacketKind::Syn => {
                self.narrate(Severity::Info, "Server received SYN");
            }
            PacketKind::SynAck => {
                self.state.client_seq = self.state.client_seq + 1;
                self.narrate(Severity::Info, "Client received SYN-ACK");
            }
            PacketKind::Ack => {
                self.state.server_seq = self.state.server_seq + 1;
                self.state.client = TcpState::Established;
                self.state.server = TcpState::Established;
                self.state.status = ConnectionStatus::Established;
                debug_assert_eq!(self.state.step + 1, FINAL_STEP);
                self.narrate(Severity::Success, "Server received ACK, connection ESTABLISHED");
            }
        }
    }
}

// -- Unit tests --

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use crate::sim::config::DriveMode;
    use crate::sim::loss::PacketLoss;
    use crate::sim::simulation::fixture;
    use crate::tcp::wrap32::Wrap32;
    use super::*;

    #[test]
    fn test_sequence_numbers_follow_handshake() {
        let (mut sim, _, _) = fixture::simulation(PacketLoss::None, DriveMode::SingleStep);

        let syn = sim.execute_step(1).unwrap();
        assert_eq!(syn.kind(), PacketKind::Syn);
        assert_eq!(syn.seq(), Some(Wrap32::new(1000)));
        assert_eq!(syn.ack(), None);
        assert_eq!(syn.direction(), Direction::ClientToServer);

        let syn_ack = sim.execute_step(2).unwrap();
        assert_eq!(syn_ack.kind(), PacketKind::SynAck);
        assert_eq!(syn_ack.seq(), Some(Wrap32::new(2000)));
        assert_eq!(syn_ack.ack(), Some(Wrap32::new(1001)));
        assert_eq!(syn_ack.direction(), Direction::ServerToClient);

        let ack = sim.execute_step(3).unwrap();
        assert_eq!(ack.kind(), PacketKind::Ack);
        assert_eq!(ack.seq(), Some(Wrap32::new(1001)));
        assert_eq!(ack.ack(), Some(Wrap32::new(2001)));

        let state = sim.state();
        assert_eq!(state.client_seq(), Wrap32::new(1001));
        assert_eq!(state.server_seq(), Wrap32::new(2001));
        assert_eq!(state.client_isn(), Wrap32::new(1000));
        assert_eq!(state.server_isn(), Wrap32::new(2000));
    }

    #[test]
    fn test_state_transitions_per_step() {
        let (mut sim, _, _) = fixture::simulation(PacketLoss::None, DriveMode::SingleStep);

        sim.execute_step(1).unwrap();
        assert_eq!(sim.state().client(), TcpState::SynSent);
        assert_eq!(sim.state().server(), TcpState::Closed);
        assert_eq!(sim.state().status(), ConnectionStatus::Connecting);

        sim.execute_step(2).unwrap();
        assert_eq!(sim.state().client(), TcpState::SynSent);
        assert_eq!(sim.state().server(), TcpState::SynRcvd);
        assert_eq!(sim.state().status(), ConnectionStatus::Connecting);

        sim.execute_step(3).unwrap();
        assert_eq!(sim.state().client(), TcpState::Established);
        assert_eq!(sim.state().server(), TcpState::Established);
        assert_eq!(sim.state().status(), ConnectionStatus::Established);
        assert_eq!(sim.state().step(), 3);
    }

    #[test]
    fn test_lost_syn_still_leaves_client_syn_sent() {
        let (mut sim, clock, sink) = fixture::simulation(PacketLoss::Syn, DriveMode::SingleStep);

        let result = sim.execute_step(1);
        assert_eq!(result, Err(HandshakeError::PacketLost { kind: PacketKind::Syn }));
        assert_eq!(sim.state().client(), TcpState::SynSent);
        assert_eq!(sim.state().status(), ConnectionStatus::Connecting);
        assert_eq!(sim.state().step(), 0);

        // A lost packet never spends time in transit
        assert!(clock.pauses().is_empty());
        assert!(matches!(sink.events()[..], [SimEvent::PacketLost(s)] if s.kind() == PacketKind::Syn));
    }

    #[test]
    fn test_lost_syn_ack_leaves_server_syn_rcvd() {
        let (mut sim, _, _) = fixture::simulation(PacketLoss::SynAck, DriveMode::SingleStep);
        sim.execute_step(1).unwrap();

        assert!(sim.execute_step(2).is_err());
        assert_eq!(sim.state().server(), TcpState::SynRcvd);
        assert_eq!(sim.state().client_seq(), Wrap32::new(1000));
        assert_eq!(sim.state().step(), 1);
    }

    #[test]
    fn test_delivered_packet_waits_for_transit() {
        let (mut sim, clock, sink) = fixture::simulation(PacketLoss::None, DriveMode::SingleStep);
        sim.execute_step(1).unwrap();

        assert_eq!(clock.pauses(), vec![Duration::from_millis(800)]);
        assert!(matches!(sink.events()[..], [SimEvent::PacketDeparted(s)] if s.kind() == PacketKind::Syn));
    }

    #[test]
    fn test_invalid_step_has_no_side_effects() {
        let (mut sim, clock, sink) = fixture::simulation(PacketLoss::None, DriveMode::SingleStep);
        let before = sim.state().clone();

        for step in [0u8, 4, 255] {
            assert_eq!(sim.execute_step(step), Err(HandshakeError::InvalidStep(step)));
        }
        assert_eq!(sim.state(), &before);
        assert!(clock.pauses().is_empty());
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_out_of_order_step_has_no_side_effects() {
        let (mut sim, _, _) = fixture::simulation(PacketLoss::None, DriveMode::SingleStep);
        let before = sim.state().clone();

        assert_eq!(
            sim.execute_step(2),
            Err(HandshakeError::OutOfOrder { expected: 1, got: 2 })
        );
        assert_eq!(sim.state(), &before);

        sim.execute_step(1).unwrap();
        assert_eq!(
            sim.execute_step(1),
            Err(HandshakeError::OutOfOrder { expected: 2, got: 1 })
        );
    }

    #[test]
    fn test_step_after_established_is_rejected() {
        let (mut sim, _, _) = fixture::simulation(PacketLoss::None, DriveMode::SingleStep);
        for step in 1..=3 {
            sim.execute_step(step).unwrap();
        }
        let before = sim.state().clone();

        assert_eq!(sim.execute_step(3), Err(HandshakeError::Finished));
        assert_eq!(sim.state(), &before);
    }

    #[test]
    fn test_narration() {
        let (mut sim, _, _) = fixture::simulation(PacketLoss::None, DriveMode::SingleStep);
        sim.execute_step(1).unwrap();

        let messages: Vec<&str> = sim.state().log().entries().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["Sending SYN seq=1000 (client -> server)", "Server received SYN"]
        );
        // Delivery is stamped after the transit pause
        assert_eq!(sim.state().log().entries()[1].timestamp, Duration::from_millis(800));
    }
}
