//! Aberred Platformer command-line runner.
//!
//! Loads a map, a configuration file and an input source, then runs the
//! simulation headless for a fixed number of ticks. Frames can be dumped as
//! text while it runs; the final score and every wizard's position are
//! printed at the end.
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --map assets/maps/arena.txt --input assets/input/demo.json --dump-every 30
//! RUST_LOG=debug cargo run -- --seed 7 --ticks 1200
//! ```

use bevy_ecs::prelude::*;
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;

use aberredplatformer::components::lifecycle::{Dead, Player};
use aberredplatformer::components::rigidbody::RigidBody;
use aberredplatformer::components::statemachine::StateMachine;
use aberredplatformer::game::{build_schedule, build_world, run_tick};
use aberredplatformer::resources::gameconfig::GameConfig;
use aberredplatformer::resources::input::{InputBot, InputScript, InputSource};
use aberredplatformer::resources::scoreboard::Scoreboard;
use aberredplatformer::resources::tilemap::{TileMap, TileSet};
use aberredplatformer::resources::worldtime::WorldTime;
use aberredplatformer::systems::render::world_frame;

/// Aberred Platformer, headless
#[derive(Parser)]
#[command(version, about = "Runs a wizard platformer match without a window.")]
struct Cli {
    /// Map file: one character per 16x16 cell, digits mark player spawns.
    #[arg(long, value_name = "PATH", default_value = "assets/maps/arena.txt")]
    map: PathBuf,

    /// JSON tile set. Uses the built-in tiles when omitted.
    #[arg(long, value_name = "PATH")]
    tiles: Option<PathBuf>,

    /// INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    /// JSON input script. Without it (and without --seed) wizards stand idle.
    #[arg(long, value_name = "PATH", conflicts_with = "seed")]
    input: Option<PathBuf>,

    /// Drive wizards with a random bot using this seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Ticks to run. Defaults to `max_ticks` from the configuration.
    #[arg(long)]
    ticks: Option<u64>,

    /// Mirror the left half of the map onto the right half.
    #[arg(long)]
    mirror: bool,

    /// Print the map every N ticks (0 prints nothing).
    #[arg(long, value_name = "N", default_value_t = 0)]
    dump_every: u64,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let mut config = GameConfig::with_path(&cli.config);
    if cli.config.exists() {
        config.load_from_file()?;
    } else {
        warn!(
            "Config file {} not found, using defaults",
            cli.config.display()
        );
    }

    let tileset = match &cli.tiles {
        Some(path) => TileSet::load(path)?,
        None => TileSet::standard(),
    };
    let map = TileMap::load(&cli.map, tileset, cli.mirror)?;

    let input = match (&cli.input, cli.seed) {
        (Some(path), _) => InputSource::Script(InputScript::load(path)?),
        (None, Some(seed)) => {
            info!("Random input, seed {}", seed);
            InputSource::Bot(InputBot::new(seed))
        }
        (None, None) => InputSource::Idle,
    };

    let ticks = cli.ticks.unwrap_or(config.max_ticks);
    let dt = config.dt();
    let mut world = build_world(config, map, input)?;
    let mut schedule = build_schedule();

    info!("Running {} ticks at dt={:.4}", ticks, dt);
    for _ in 0..ticks {
        run_tick(&mut world, &mut schedule, dt);
        let frame = world.resource::<WorldTime>().frame_count;
        if cli.dump_every > 0 && frame % cli.dump_every == 0 {
            println!("-- frame {} --", frame);
            print!("{}", world_frame(&mut world));
        }
    }

    print_summary(&mut world);
    Ok(())
}

fn print_summary(world: &mut World) {
    let time = *world.resource::<WorldTime>();
    println!("Finished after {} ticks ({:.2}s)", time.frame_count, time.elapsed);

    for (player, score) in world.resource::<Scoreboard>().standings() {
        println!("Player {}: {} points", player, score);
    }

    let mut query = world.query_filtered::<(&Player, &RigidBody, &StateMachine), Without<Dead>>();
    let mut wizards: Vec<_> = query.iter(world).collect();
    wizards.sort_unstable_by_key(|(player, ..)| player.index);
    for (player, body, machine) in wizards {
        println!(
            "Wizard {} at ({:.1}, {:.1}) {}",
            player.index,
            body.position.x,
            body.position.y,
            machine.stack_names().join(" > ")
        );
    }
}
