#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives the dungeon crawler core headlessly.

mod ascii;
mod frame;
mod loading;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Result};
use clap::Parser;
use crawler_core::{CellCoord, Event, PlayerPose};
use crawler_world::{query, Session};
use tracing_subscriber::EnvFilter;

use frame::FrameDriver;

#[derive(Debug, Parser)]
#[command(name = "crawler", about = "Runs the dungeon crawler core without a window")]
struct Cli {
    /// JSON map bundle to load; the bundled dungeon is used when omitted.
    #[arg(long)]
    map: Option<PathBuf>,
    /// Id of the map inside the bundle.
    #[arg(long, default_value = "map")]
    map_id: String,
    /// TOML file overriding the engine configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of frames to simulate.
    #[arg(long, default_value_t = 60)]
    frames: u32,
    /// Simulated duration of each frame in milliseconds.
    #[arg(long, default_value_t = 16)]
    dt_ms: u64,
    /// Column of the cell the player starts in.
    #[arg(long, default_value_t = 1)]
    player_column: u32,
    /// Row of the cell the player starts in.
    #[arg(long, default_value_t = 1)]
    player_row: u32,
    /// Initial heading in degrees; 0 looks east and 90 looks south.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    player_angle: f32,
    /// Degrees the player turns every second.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    turn_rate: f32,
    /// Prints the final frame and a minimap as text.
    #[arg(long)]
    ascii: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = loading::load_config(cli.config.as_deref())?;
    let grid = loading::load_grid(cli.map.as_deref(), &cli.map_id)?;

    let spawn = CellCoord::new(cli.player_column, cli.player_row);
    if !grid.is_walkable(spawn) {
        bail!(
            "player spawn ({}, {}) is not a walkable cell",
            spawn.column(),
            spawn.row()
        );
    }
    let mut pose = PlayerPose::at_cell(spawn, config.tile_size, cli.player_angle);

    let mut driver = FrameDriver::new(&config);
    let mut session = Session::new(grid, pose, config);
    println!("{}", query::welcome_banner(&session));

    let dt = Duration::from_millis(cli.dt_ms);
    let mut last = None;
    for index in 0..cli.frames {
        pose.angle_degrees =
            (pose.angle_degrees + cli.turn_rate * dt.as_secs_f32()).rem_euclid(360.0);
        let report = driver.advance(&mut session, pose, dt);
        for event in &report.events {
            match event {
                Event::CombatEngaged { enemy } => {
                    tracing::info!(frame = index, ?enemy, "enemy engaged the player");
                }
                Event::EntityRemoved { entity } => {
                    tracing::info!(frame = index, ?entity, "entity removed");
                }
                _ => {}
            }
        }
        last = Some(report);
    }

    let Some(report) = last else {
        return Ok(());
    };
    let walls = report
        .strips
        .iter()
        .filter(|strip| strip.texture_id.is_some())
        .count();
    let visible = report
        .sprites
        .iter()
        .filter(|(_, projection)| !projection.columns.is_empty())
        .count();
    println!(
        "{} frames: {walls}/{} columns hit walls, {visible} sprites visible, {} entities alive, mode {:?}",
        cli.frames,
        report.strips.len(),
        query::entity_view(&session).len(),
        query::play_mode(&session),
    );

    if cli.ascii {
        println!("{}", ascii::render_view(&report, driver.viewport()));
        println!();
        println!("{}", ascii::render_minimap(&session, &report));
    }

    Ok(())
}
