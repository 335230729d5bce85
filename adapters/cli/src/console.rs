//! Line-oriented command console mirroring the in-game command tree.

use cannon_aim_core::{BlockPos, NotReady, Precision, TableSource, TargetingError};
use cannon_aim_system_query::{
    BlockQuery, ExplicitTarget, LookTarget, PlayerPose, PositionArgument, QueryResolver,
    ResolveError,
};
use cannon_aim_system_targeting::TargetingEngine;
use clap::{Parser, Subcommand};
use glam::DVec3;

const HELP_TEXT: &str = "\
Command functionality:
  - reload: reload the configuration table.
  - precision <int>: maximum distance to the explosion.
  - origin [<x> <y> <z> <facing>]: set cannon origin to a location, uses player position and facing direction if no arguments provided.
  - target [<x> <y> <z>]: output closest configuration to specified position. Uses block player is looking at (even very far) if no argument is provided.
  - player <x> <y> <z> [--yaw <deg>] [--pitch <deg>]: move the player.
  - quit: leave the console.";

#[derive(Debug, Parser)]
#[command(
    name = "console",
    no_binary_name = true,
    disable_help_flag = true,
    disable_help_subcommand = true,
    disable_version_flag = true
)]
struct ConsoleLine {
    #[command(subcommand)]
    command: ConsoleCommand,
}

#[derive(Debug, PartialEq, Subcommand)]
enum ConsoleCommand {
    /// Describes the available commands.
    Help,
    /// Reloads the configuration table from its source.
    Reload,
    /// Sets the maximum distance between target and configuration.
    #[command(allow_negative_numbers = true)]
    Precision { range: i64 },
    /// Sets the cannon origin explicitly or from the player.
    Origin {
        #[arg(num_args = 0.., allow_hyphen_values = true)]
        arguments: Vec<String>,
    },
    /// Finds the configuration for a position or the block under the crosshair.
    Target {
        #[arg(num_args = 0.., allow_hyphen_values = true)]
        arguments: Vec<String>,
    },
    /// Moves the player and optionally turns their view.
    #[command(allow_negative_numbers = true)]
    Player {
        x: f64,
        y: f64,
        z: f64,
        #[arg(long, allow_hyphen_values = true)]
        yaw: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        pitch: Option<f64>,
    },
    /// Leaves the console.
    Quit,
}

/// Response produced by a single console line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Feedback {
    /// Informational message for the operator.
    Info(String),
    /// Failure message for the operator.
    Error(String),
    /// The operator asked to leave.
    Quit,
}

/// Interactive session binding the targeting engine to its collaborators.
#[derive(Debug)]
pub(crate) struct Session<S, W> {
    engine: TargetingEngine,
    source: S,
    world: W,
    player: PlayerPose,
}

impl<S, W> Session<S, W>
where
    S: TableSource,
    W: BlockQuery,
{
    /// Creates a session with no table loaded yet.
    #[must_use]
    pub(crate) fn new(source: S, world: W, player: PlayerPose) -> Self {
        Self {
            engine: TargetingEngine::new(),
            source,
            world,
            player,
        }
    }

    /// Applies a precision range chosen outside the console.
    pub(crate) fn set_precision(&mut self, range: i64) -> Result<Precision, TargetingError> {
        self.engine.set_precision(range)
    }

    /// Runs a single console line.
    pub(crate) fn execute(&mut self, line: &str) -> Feedback {
        let tokens = line.trim().trim_start_matches('/').split_whitespace();
        let command = match ConsoleLine::try_parse_from(tokens) {
            Ok(parsed) => parsed.command,
            Err(error) => {
                let rendered = error.to_string();
                let message = rendered.lines().next().unwrap_or_default();
                return Feedback::Error(message.to_owned());
            }
        };

        match command {
            ConsoleCommand::Help => Feedback::Info(HELP_TEXT.to_owned()),
            ConsoleCommand::Reload => self.reload(),
            ConsoleCommand::Precision { range } => match self.engine.set_precision(range) {
                Ok(precision) => Feedback::Info(format!("Precision set to {}", precision.range())),
                Err(error) => Feedback::Error(describe(&error)),
            },
            ConsoleCommand::Origin { arguments } => self.origin(&arguments),
            ConsoleCommand::Target { arguments } => self.target(&arguments),
            ConsoleCommand::Player { x, y, z, yaw, pitch } => {
                let yaw = yaw.unwrap_or(self.player.yaw());
                let pitch = pitch.unwrap_or(self.player.pitch());
                let position = DVec3::new(x, y, z);
                if BlockPos::try_containing(position).is_none() {
                    return Feedback::Error(format!("{x}, {y}, {z} is outside the world"));
                }
                if !(yaw.is_finite() && pitch.is_finite()) {
                    return Feedback::Error(format!(
                        "view angles must be finite, found yaw {yaw} and pitch {pitch}"
                    ));
                }
                self.player = self
                    .player
                    .with_position(position)
                    .with_rotation(yaw, pitch);
                Feedback::Info(format!(
                    "Player at {x}, {y}, {z} looking {} (yaw {yaw}, pitch {pitch})",
                    self.player.horizontal_facing()
                ))
            }
            ConsoleCommand::Quit => Feedback::Quit,
        }
    }

    /// Reloads the table, clearing the origin when the load succeeds.
    pub(crate) fn reload(&mut self) -> Feedback {
        match self.engine.load_table(&self.source) {
            Ok(entries) => {
                log::info!("configuration table holds {entries} entries");
                Feedback::Info("Config reloaded!".to_owned())
            }
            Err(error) => {
                log::error!("{:#}", anyhow::Error::new(error));
                Feedback::Error("Error reading config!".to_owned())
            }
        }
    }

    fn origin(&mut self, arguments: &[String]) -> Feedback {
        let origin = match arguments {
            [] => {
                let origin = self.player.cannon_origin();
                self.engine.set_origin(origin.position(), origin.facing())
            }
            [x, y, z, facing] => {
                let argument = match PositionArgument::from_axes(&[x, y, z]) {
                    Ok(argument) => argument,
                    Err(error) => return Feedback::Error(error.to_string()),
                };
                let position = argument.block_pos(self.player.position());
                match self.engine.set_origin_named(position, facing) {
                    Ok(origin) => origin,
                    Err(error) => return Feedback::Error(describe(&error)),
                }
            }
            _ => {
                return Feedback::Error(format!(
                    "expected no arguments or <x> <y> <z> <facing>, found {} arguments",
                    arguments.len()
                ))
            }
        };

        Feedback::Info(format!(
            "Origin set to {} facing {}",
            origin.position(),
            origin.facing()
        ))
    }

    fn target(&self, arguments: &[String]) -> Feedback {
        let resolved = match arguments {
            [] => LookTarget::new(&self.player, &self.world).resolve(),
            [_, _, _] => match PositionArgument::from_axes(arguments) {
                Ok(argument) => ExplicitTarget::new(argument, &self.player).resolve(),
                Err(error) => return Feedback::Error(error.to_string()),
            },
            _ => {
                return Feedback::Error(format!(
                    "expected no arguments or <x> <y> <z>, found {} arguments",
                    arguments.len()
                ))
            }
        };

        let point = match resolved {
            Ok(point) => point,
            Err(ResolveError::LookingIntoNowhere { block }) => {
                log::debug!("look ray ended at {block}");
                return Feedback::Error("You are looking into nowhere...".to_owned());
            }
        };

        match self.engine.find_configuration(point) {
            Ok(found) => Feedback::Info(format!(
                "Configuration: {}; distance: {:.2}",
                found.label,
                found.distance()
            )),
            Err(error) => Feedback::Error(describe(&error)),
        }
    }
}

fn describe(error: &TargetingError) -> String {
    match error {
        TargetingError::NotReady(NotReady::NoTable) => "Config is not loaded!".to_owned(),
        TargetingError::NotReady(NotReady::NoOrigin) => "Origin is not set up!".to_owned(),
        TargetingError::OutOfRange => "Your target is too far away!".to_owned(),
        TargetingError::ConfigLoadFailure(_) => "Error reading config!".to_owned(),
        TargetingError::InvalidArgument(reason) => reason.to_string(),
    }
}
