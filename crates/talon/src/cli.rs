use clap::Parser;
use std::path::PathBuf;

/// User-specified command line parameters
#[derive(Debug, Parser)]
#[clap(name = "Talon Engine", about)]
pub struct Args {
    #[clap(long, default_value_t = 1024)]
    /// Entity pool capacity.
    pub capacity: usize,

    #[clap(long, default_value_t = 600)]
    /// Number of frames to simulate before exiting.
    pub frames: u64,

    #[clap(long)]
    /// Fixed timestep in seconds. Defaults to 1/60; pass 0 to follow the
    /// wall clock instead.
    pub timestep: Option<f64>,

    #[clap(long)]
    /// Skips spawning the built-in demo scene.
    pub no_demo: bool,

    #[clap(long, short = 's')]
    /// Writes a pool snapshot to this path after the run.
    pub snapshot: Option<PathBuf>,
}

impl Args {
    /// The effective fixed-step setting, with `0` meaning wall clock.
    pub fn fixed_step(&self) -> Option<f64> {
        match self.timestep {
            Some(step) if step <= 0.0 => None,
            Some(step) => Some(step),
            None => Some(1.0 / 60.0),
        }
    }
}
