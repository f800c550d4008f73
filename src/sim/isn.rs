use rand::{Rng, RngCore};
use crate::tcp::wrap32::Wrap32;

/// Width of the randomized ISN range above each base.
pub const ISN_SPREAD: u32 = 10_000;

/// Sequence space an ISN is drawn for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsnSpace {
    Client,
    Server,
}

impl IsnSpace {
    /// Fixed ISN, also the lower bound of the randomized range
    pub fn base(&self) -> u32 {
        match self {
            IsnSpace::Client => 1000,
            IsnSpace::Server => 2000,
        }
    }
}

/// Pick an initial sequence number: `base` when fixed, `base + [0, ISN_SPREAD)` when randomized.
pub fn generate_isn(space: IsnSpace, randomize: bool, rng: &mut dyn RngCore) -> Wrap32 {
    let base = space.base();
    if randomize {
        Wrap32::new(base + rng.gen_range(0..ISN_SPREAD))
    } else {
        Wrap32::new(base)
    }
}
