use bitflags::bitflags;

bitflags! {
    // Only the control bits the handshake exchanges: [ ACK, SYN ]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TcpFlags: u8 {
        const ACK = 1 << 4;
        const SYN = 1 << 1;
    }
}

// -- Unit tests --
