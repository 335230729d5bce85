#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line console for aiming explosive-block cannons.

mod console;
mod table_file;
mod terrain;

use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use cannon_aim_core::{TableSource, DEFAULT_PRECISION_RANGE};
use cannon_aim_system_query::{BlockQuery, PlayerPose, DEFAULT_EYE_HEIGHT};
use clap::Parser;
use glam::DVec3;

use crate::{
    console::{Feedback, Session},
    table_file::JsonTableFile,
    terrain::FlatTerrain,
};

/// Command-line options for the cannon aiming console.
#[derive(Debug, Parser)]
#[command(name = "cannon-aim", version)]
struct Cli {
    /// JSON configuration table with `points` and `configs` arrays.
    #[arg(long, value_name = "PATH")]
    table: PathBuf,
    /// Initial precision range in blocks.
    #[arg(long, default_value_t = DEFAULT_PRECISION_RANGE)]
    precision: u32,
    /// Height of the topmost solid layer of the flat stand-in world.
    #[arg(long, default_value_t = 63, allow_hyphen_values = true)]
    surface: i32,
    /// Height of the player's eyes above their feet.
    #[arg(long, default_value_t = DEFAULT_EYE_HEIGHT)]
    eye_height: f64,
    /// Read commands from a file instead of standard input.
    #[arg(long, value_name = "PATH")]
    script: Option<PathBuf>,
}

/// Entry point for the cannon aiming console.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let source = JsonTableFile::new(&cli.table);
    let terrain = FlatTerrain::new(cli.surface);
    let spawn = DVec3::new(0.5, f64::from(terrain.surface()) + 1.0, 0.5);
    let player = PlayerPose::new(spawn).with_eye_height(cli.eye_height);
    log::debug!(
        "table {}, surface {}, player at {spawn}",
        source.path().display(),
        terrain.surface()
    );

    let mut session = Session::new(source, terrain, player);
    let _ = session
        .set_precision(i64::from(cli.precision))
        .context("invalid --precision")?;

    let stdout = io::stdout();
    let stderr = io::stderr();
    let mut out = stdout.lock();
    let mut err = stderr.lock();

    report(session.reload(), &mut out, &mut err)?;

    match &cli.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("could not open script {}", path.display()))?;
            run(&mut session, BufReader::new(file), &mut out, &mut err)
        }
        None => run(&mut session, io::stdin().lock(), &mut out, &mut err),
    }
}

/// Executes console lines until the input ends or the operator quits.
fn run<S, W>(
    session: &mut Session<S, W>,
    input: impl BufRead,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<()>
where
    S: TableSource,
    W: BlockQuery,
{
    for line in input.lines() {
        let line = line.context("could not read console input")?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let feedback = session.execute(trimmed);
        if feedback == Feedback::Quit {
            break;
        }
        report(feedback, out, err)?;
    }
    Ok(())
}

fn report(feedback: Feedback, out: &mut impl Write, err: &mut impl Write) -> Result<()> {
    match feedback {
        Feedback::Info(message) => writeln!(out, "{message}")?,
        Feedback::Error(message) => writeln!(err, "{message}")?,
        Feedback::Quit => {}
    }
    Ok(())
}
