use std::str::FromStr;

use cannon_aim_core::BlockPos;
use glam::DVec3;
use thiserror::Error;

const RELATIVE_MARKER: char = '~';

/// Single axis of a position argument.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Coordinate {
    /// Whole block coordinate, e.g. `12`.
    Absolute(i32),
    /// Offset from the player's position on this axis, e.g. `~` or `~-2.5`.
    Relative(f64),
}

impl Coordinate {
    /// Resolves the axis against the player's coordinate `base`.
    #[must_use]
    pub fn resolve(self, base: f64) -> f64 {
        match self {
            Self::Absolute(value) => f64::from(value),
            Self::Relative(offset) => base + offset,
        }
    }
}

impl FromStr for Coordinate {
    type Err = CoordinateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.is_empty() {
            return Err(CoordinateError::Empty);
        }

        let Some(offset) = value.strip_prefix(RELATIVE_MARKER) else {
            return value
                .parse::<i32>()
                .map(Self::Absolute)
                .map_err(|_| CoordinateError::InvalidNumber(value.to_owned()));
        };

        if offset.is_empty() {
            return Ok(Self::Relative(0.0));
        }
        match offset.parse::<f64>() {
            Ok(offset) if offset.is_finite() => Ok(Self::Relative(offset)),
            _ => Err(CoordinateError::InvalidNumber(value.to_owned())),
        }
    }
}

/// Three-axis block position argument such as `~ 64 ~-3`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionArgument {
    x: Coordinate,
    y: Coordinate,
    z: Coordinate,
}

impl PositionArgument {
    /// Creates a position argument from individual axes.
    #[must_use]
    pub const fn new(x: Coordinate, y: Coordinate, z: Coordinate) -> Self {
        Self { x, y, z }
    }

    /// Parses a position argument from exactly three axis tokens.
    pub fn from_axes<S: AsRef<str>>(axes: &[S]) -> Result<Self, CoordinateError> {
        let [x, y, z] = axes else {
            return Err(CoordinateError::AxisCount(axes.len()));
        };
        Ok(Self {
            x: x.as_ref().parse()?,
            y: y.as_ref().parse()?,
            z: z.as_ref().parse()?,
        })
    }

    /// Resolves the argument to the block containing it, relative to `base`.
    #[must_use]
    pub fn block_pos(&self, base: DVec3) -> BlockPos {
        BlockPos::containing(DVec3::new(
            self.x.resolve(base.x),
            self.y.resolve(base.y),
            self.z.resolve(base.z),
        ))
    }
}

impl From<BlockPos> for PositionArgument {
    fn from(block: BlockPos) -> Self {
        Self::new(
            Coordinate::Absolute(block.x()),
            Coordinate::Absolute(block.y()),
            Coordinate::Absolute(block.z()),
        )
    }
}

impl FromStr for PositionArgument {
    type Err = CoordinateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let axes: Vec<&str> = value.split_whitespace().collect();
        Self::from_axes(&axes)
    }
}

/// Errors raised while parsing coordinate arguments.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CoordinateError {
    /// An axis token was empty.
    #[error("coordinate is empty")]
    Empty,
    /// An axis token was not a whole number or a relative offset.
    #[error("'{0}' is not a valid coordinate")]
    InvalidNumber(String),
    /// The position did not contain exactly three axes.
    #[error("expected 3 coordinates, found {0}")]
    AxisCount(usize),
}
