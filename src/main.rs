//! Umbra headless driver
//!
//! Loads a level and tuning settings, runs the simulation against a seeded
//! wandering input stream and logs what the guards see.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use umbra::mask::{LightMask, light_vertices, shadow_vertices};
use umbra::settings::QualityPreset;
use umbra::sim::{FrameSnapshot, TickInput, World, tick};
use umbra::{LevelData, Settings};

/// 60 Hz
const TICK_MS: f32 = 1000.0 / 60.0;
const DEFAULT_TICKS: u64 = 600;
const DEFAULT_SEED: u64 = 0x5EED;
const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);
/// Light mask resolution in world units per cell
const MASK_CELL: f32 = 2.0;
const AMBIENT: u8 = 100;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Level layout JSON (built-in demo level when omitted)
    #[arg(long)]
    level: Option<PathBuf>,

    /// Tuning settings JSON
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Vision fan quality: low, medium or high
    #[arg(long, value_parser = parse_quality)]
    quality: Option<QualityPreset>,

    /// Number of simulation ticks to run
    #[arg(long, default_value_t = DEFAULT_TICKS)]
    ticks: u64,

    /// Seed for the wandering input stream
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Print the final frame snapshot as JSON
    #[arg(long)]
    dump: bool,
}

fn parse_quality(s: &str) -> Result<QualityPreset, String> {
    QualityPreset::from_str(s)
        .ok_or_else(|| format!("unknown quality `{s}`, expected low, medium or high"))
}

/// Holds a random input for a random number of ticks, then picks another
struct Wanderer {
    rng: Pcg32,
    input: TickInput,
    hold: u32,
}

impl Wanderer {
    fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            input: TickInput::default(),
            hold: 0,
        }
    }

    fn next_input(&mut self) -> TickInput {
        if self.hold == 0 {
            self.hold = self.rng.random_range(10..60);
            let turn = self.rng.random_range(0..3);
            self.input = TickInput {
                forward: self.rng.random_bool(0.7),
                turn_left: turn == 1,
                turn_right: turn == 2,
                interact: self.rng.random_bool(0.1),
                ..Default::default()
            };
        }
        self.hold -= 1;
        self.input.clone()
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let mut settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::from_preset(args.quality.unwrap_or_default()),
    };
    if let Some(quality) = args.quality {
        settings.quality = quality;
    }
    let level = match &args.level {
        Some(path) => LevelData::load(path)?,
        None => LevelData::demo(),
    };

    log::info!(
        "Umbra starting: {} ticks, seed {:#x}, {} quality",
        args.ticks,
        args.seed,
        settings.quality.as_str()
    );
    log::info!(
        "View scale for {}x{} viewport: {:.3}",
        VIEWPORT.x,
        VIEWPORT.y,
        settings.view_scale(VIEWPORT)
    );

    let mut world = World::from_level(&level, settings);
    let mut wanderer = Wanderer::new(args.seed);
    let mut seen_ticks = 0u64;
    for _ in 0..args.ticks {
        let input = wanderer.next_input();
        tick(&mut world, &input, TICK_MS);
        if world.seen {
            seen_ticks += 1;
        }
    }

    let snapshot = FrameSnapshot::capture(&world);
    let mut mask = LightMask::new(
        (VIEWPORT.x / MASK_CELL) as usize,
        (VIEWPORT.y / MASK_CELL) as usize,
        snapshot.player_pos - VIEWPORT * 0.5,
        MASK_CELL,
    );
    mask.compose(&snapshot, AMBIENT);
    let lit = mask.as_bytes().iter().filter(|v| **v == u8::MAX).count();

    log::info!(
        "Player at ({:.1}, {:.1}) heading {:.1} deg, seen for {} of {} ticks",
        snapshot.player_pos.x,
        snapshot.player_pos.y,
        snapshot.player_heading_deg,
        seen_ticks,
        args.ticks
    );
    log::info!(
        "Final frame: {} light vertices, {} shadow vertices, {} fully lit cells",
        light_vertices(&snapshot).len(),
        shadow_vertices(&snapshot.shadows).len(),
        lit
    );

    if args.dump {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    Ok(())
}

fn main() -> ExitCode {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("umbra: {e}");
            ExitCode::FAILURE
        }
    }
}
