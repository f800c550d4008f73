//! Terminal front end for the handshake simulator.
//!
//! Renders packets as they leave, prints the narrated log and final endpoint
//! states, and can export the log to a text file. `RUST_LOG` controls the
//! library's own logging.

use std::error::Error;
use std::fs::File;
use std::io;
use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;
use clap::Parser;
use handshake_sim::errors::HandshakeError;
use handshake_sim::sim::{
    DriveMode, EventSink, PacketLoss, SimConfig, SimEvent, Simulation, ThreadTimer, Timer, VirtualClock,
};
use handshake_sim::tcp::{Direction, Segment};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Simulate a TCP three-way handshake with configurable packet loss.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Drive mode: `auto` runs every step, `step` waits for Enter between steps.
    #[arg(short, long, default_value = "auto")]
    mode: DriveMode,

    /// Packet loss policy: none, syn, syn-ack, ack or random.
    #[arg(short, long, default_value = "none")]
    loss: PacketLoss,

    /// Time a delivered packet spends in transit (800-5000 ms).
    #[arg(long, default_value_t = 800)]
    transit_ms: u64,

    /// Use fixed ISNs (client 1000, server 2000) instead of random ones.
    #[arg(long)]
    fixed_isn: bool,

    /// Attempts per step before the connection fails; 1 disables retransmission.
    #[arg(long, default_value_t = 3)]
    max_retries: u32,

    /// Pause before each retransmission.
    #[arg(long, default_value_t = 1000)]
    backoff_ms: u64,

    /// Pause between steps in `auto` mode.
    #[arg(long, default_value_t = 500)]
    step_delay_ms: u64,

    /// Seed for ISNs and random loss.
    #[arg(long)]
    seed: Option<u64>,

    /// Skip real waiting; simulated time still advances.
    #[arg(long)]
    instant: bool,

    /// Write the event log to this file when the simulation ends.
    #[arg(long)]
    export: Option<PathBuf>,
}

impl Cli {
    fn config(&self) -> SimConfig {
        SimConfig {
            mode: self.mode,
            loss: self.loss,
            transit: Duration::from_millis(self.transit_ms),
            randomize_isn: !self.fixed_isn,
            max_retries: self.max_retries,
            backoff: Duration::from_millis(self.backoff_ms),
            step_delay: Duration::from_millis(self.step_delay_ms),
            seed: self.seed,
        }
    }
}

/// Draws each packet as it leaves or disappears.
struct TerminalSink;

impl TerminalSink {
    fn arrow(segment: &Segment) -> String {
        let flags = segment.flags().bits();
        match segment.direction() {
            Direction::ClientToServer => {
                format!("  client ---- {segment} flags={flags:#04x} ---> server")
            }
            Direction::ServerToClient => {
                format!("  client <--- {segment} flags={flags:#04x} ---- server")
            }
        }
    }
}

impl EventSink for TerminalSink {
    fn emit(&mut self, event: &SimEvent) {
        match event {
            SimEvent::PacketDeparted(segment) => println!("{}", Self::arrow(segment)),
            SimEvent::PacketLost(segment) => println!("{}  [LOST]", Self::arrow(segment)),
            SimEvent::RetryScheduled {
                kind,
                retries,
                max_retries,
            } => println!("  retrying {kind} ({retries}/{max_retries} attempts lost)"),
        }
    }
}

fn print_state(sim: &Simulation) {
    let state = sim.state();
    println!(
        "client: {:<12} server: {:<12} status: {:<11} step: {}/3 retries: {}/{}",
        state.client(),
        state.server(),
        state.status(),
        state.step(),
        state.retries(),
        sim.config().max_retries
    );
}

fn drive_single_step(sim: &mut Simulation) -> Result<(), Box<dyn Error>> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print_state(sim);
        if sim.state().status().is_finished() {
            return Ok(());
        }
        println!("Press Enter to advance, q to quit");
        let Some(line) = lines.next() else {
            return Ok(());
        };
        if line?.trim() == "q" {
            return Ok(());
        }
        match sim.advance() {
            Ok(_) | Err(HandshakeError::RetriesExhausted { .. }) => {}
            Err(err) => return Err(err.into()),
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = cli.config();
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let timer: Box<dyn Timer> = if cli.instant {
        Box::new(VirtualClock::new())
    } else {
        Box::new(ThreadTimer::new())
    };
    let mut sim = Simulation::new(config, Box::new(rng), timer, Box::new(TerminalSink))?;

    println!(
        "client ISN={} server ISN={} loss={} mode={}",
        sim.state().client_isn(),
        sim.state().server_isn(),
        sim.config().loss,
        sim.config().mode
    );

    match sim.config().mode {
        DriveMode::RunToCompletion => match sim.run() {
            Ok(_) | Err(HandshakeError::RetriesExhausted { .. }) => print_state(&sim),
            Err(err) => return Err(err.into()),
        },
        DriveMode::SingleStep => drive_single_step(&mut sim)?,
    }

    println!();
    print!("{}", sim.state().log().export());

    if let Some(path) = cli.export {
        let file = File::create(&path)?;
        sim.state().log().write_to(io::BufWriter::new(file))?;
        log::info!("Exported {} log entries to {}", sim.state().log().len(), path.display());
    }

    Ok(())
}

fn main() {
    // Initialise env_logger; set RUST_LOG to control verbosity.
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("handshake-sim: {}", e);
        std::process::exit(1);
    };
}

// -- Unit tests --
