#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the cannon aiming tools.
//!
//! This crate defines the vocabulary used by every other crate in the
//! workspace: block coordinates, cannon facings, the configuration table that
//! maps cannon-local offsets to build labels, and the error taxonomy reported
//! by the targeting engine. Table loaders plug in through [`TableSource`] so
//! that the engine never depends on a concrete file format.

use std::{
    f64::consts::{FRAC_PI_2, PI},
    fmt, io,
    str::FromStr,
};

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest precision range accepted by [`Precision::new`].
pub const MIN_PRECISION_RANGE: u32 = 1;
/// Largest precision range accepted by [`Precision::new`].
pub const MAX_PRECISION_RANGE: u32 = 9000;
/// Precision range applied before any explicit precision is configured.
pub const DEFAULT_PRECISION_RANGE: u32 = 20;

/// Offset applied to every origin axis so distances are measured between block centers.
const ORIGIN_CENTER_OFFSET: f64 = 0.5;

/// Location of a single block expressed in integer world coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    x: i32,
    y: i32,
    z: i32,
}

impl BlockPos {
    /// Creates a new block position.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Returns the block containing the provided world-space point.
    ///
    /// Coordinates are floored, so `-0.5` lands in block `-1`. Values beyond
    /// the `i32` range saturate.
    #[must_use]
    pub fn containing(point: DVec3) -> Self {
        Self {
            x: point.x.floor() as i32,
            y: point.y.floor() as i32,
            z: point.z.floor() as i32,
        }
    }

    /// Returns the block containing `point`, or `None` when the point is not
    /// finite or lies outside the representable grid.
    #[must_use]
    pub fn try_containing(point: DVec3) -> Option<Self> {
        let axis = |value: f64| {
            let floored = value.floor();
            (floored >= f64::from(i32::MIN) && floored <= f64::from(i32::MAX))
                .then_some(floored as i32)
        };
        Some(Self {
            x: axis(point.x)?,
            y: axis(point.y)?,
            z: axis(point.z)?,
        })
    }

    /// East-west coordinate of the block.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical coordinate of the block.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// North-south coordinate of the block.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Lower corner of the block as a real-valued vector.
    #[must_use]
    pub fn as_dvec3(&self) -> DVec3 {
        DVec3::new(f64::from(self.x), f64::from(self.y), f64::from(self.z))
    }

    /// Center of the block.
    #[must_use]
    pub fn center(&self) -> DVec3 {
        self.as_dvec3() + DVec3::splat(0.5)
    }

    /// Squared distance between the block's center and `point`.
    #[must_use]
    pub fn squared_distance_to(&self, point: DVec3) -> f64 {
        self.center().distance_squared(point)
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.x, self.y, self.z)
    }
}

/// Cardinal horizontal orientation of a cannon.
///
/// North is the reference facing: the configuration table is expressed in the
/// frame of a cannon facing north.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    /// Facing toward decreasing z.
    North,
    /// Facing toward increasing z.
    South,
    /// Facing toward increasing x.
    East,
    /// Facing toward decreasing x.
    West,
}

impl Facing {
    /// All facings in declaration order.
    pub const ALL: [Facing; 4] = [Facing::North, Facing::South, Facing::East, Facing::West];

    /// Facings indexed the way yaw quadrants are numbered.
    const BY_YAW_QUADRANT: [Facing; 4] = [Facing::South, Facing::West, Facing::North, Facing::East];

    /// Lowercase name used in commands and table files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::South => "south",
            Self::East => "east",
            Self::West => "west",
        }
    }

    /// Parses a facing from its lowercase name.
    pub fn from_name(name: &str) -> Result<Self, InvalidArgument> {
        Self::ALL
            .into_iter()
            .find(|facing| facing.name() == name)
            .ok_or_else(|| InvalidArgument::UnknownFacing(name.to_owned()))
    }

    /// Horizontal facing closest to the provided yaw, measured in degrees.
    ///
    /// A yaw of zero looks south and yaw grows clockwise when seen from above.
    #[must_use]
    pub fn from_yaw(yaw_degrees: f64) -> Self {
        let quadrant = (yaw_degrees / 90.0 + 0.5).floor() as i64;
        Self::BY_YAW_QUADRANT[quadrant.rem_euclid(4) as usize]
    }

    /// Facing pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
        }
    }

    /// Rotation about the vertical axis that maps world space into this facing's frame.
    #[must_use]
    pub const fn angle(self) -> f64 {
        match self {
            Self::North => 0.0,
            Self::South => PI,
            Self::East => FRAC_PI_2,
            Self::West => -FRAC_PI_2,
        }
    }

    /// Exact cosine and sine of [`Facing::angle`].
    const fn cos_sin(self) -> (f64, f64) {
        match self {
            Self::North => (1.0, 0.0),
            Self::South => (-1.0, 0.0),
            Self::East => (0.0, 1.0),
            Self::West => (0.0, -1.0),
        }
    }

    /// Rotates `vector` about the vertical axis by [`Facing::angle`].
    ///
    /// The vertical component is left untouched.
    #[must_use]
    pub fn rotate(self, vector: DVec3) -> DVec3 {
        let (cos, sin) = self.cos_sin();
        DVec3::new(
            vector.x * cos + vector.z * sin,
            vector.y,
            vector.z * cos - vector.x * sin,
        )
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Facing {
    type Err = InvalidArgument;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_name(value)
    }
}

/// Anchor block and facing that define the cannon's local frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CannonOrigin {
    position: BlockPos,
    facing: Facing,
}

impl CannonOrigin {
    /// Creates a cannon origin anchored at `position` facing `facing`.
    #[must_use]
    pub const fn new(position: BlockPos, facing: Facing) -> Self {
        Self { position, facing }
    }

    /// Block that anchors the cannon.
    #[must_use]
    pub const fn position(&self) -> BlockPos {
        self.position
    }

    /// Direction the cannon faces.
    #[must_use]
    pub const fn facing(&self) -> Facing {
        self.facing
    }

    /// Transforms a world-space point into the cannon's local frame.
    ///
    /// The point is measured from the anchor shifted by half a block on every
    /// axis, then rotated into the reference facing.
    #[must_use]
    pub fn to_local(&self, point: DVec3) -> DVec3 {
        let anchor = self.position.as_dvec3() - DVec3::splat(ORIGIN_CENTER_OFFSET);
        self.facing.rotate(point - anchor)
    }
}

/// Single offset/label pair within a [`ConfigurationTable`].
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigurationEntry {
    /// Cannon-local point reached by the configuration.
    pub offset: DVec3,
    /// Identifier of the build configuration that reaches `offset`.
    pub label: String,
}

/// Ordered set of configurations searched by the targeting engine.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigurationTable {
    entries: Vec<ConfigurationEntry>,
}

impl ConfigurationTable {
    /// Pairs offsets with labels by index.
    ///
    /// Fails when the sequences differ in length or an offset is not finite.
    pub fn from_parts(offsets: Vec<DVec3>, labels: Vec<String>) -> Result<Self, TableLoadError> {
        if offsets.len() != labels.len() {
            return Err(TableLoadError::LengthMismatch {
                offsets: offsets.len(),
                labels: labels.len(),
            });
        }

        let entries = offsets
            .into_iter()
            .zip(labels)
            .map(|(offset, label)| ConfigurationEntry { offset, label })
            .collect();
        Self::from_entries(entries)
    }

    /// Builds a table from already paired entries, preserving their order.
    pub fn from_entries(entries: Vec<ConfigurationEntry>) -> Result<Self, TableLoadError> {
        if let Some(index) = entries.iter().position(|entry| !entry.offset.is_finite()) {
            return Err(TableLoadError::NonFiniteOffset { index });
        }
        Ok(Self { entries })
    }

    /// Entries in table order.
    #[must_use]
    pub fn entries(&self) -> &[ConfigurationEntry] {
        &self.entries
    }

    /// Iterator over the entries in table order.
    pub fn iter(&self) -> impl Iterator<Item = &ConfigurationEntry> {
        self.entries.iter()
    }

    /// Number of entries in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the table holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Maximum accepted distance between a target and a configuration offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Precision {
    range: u32,
}

impl Precision {
    /// Validates `range` against the accepted bounds.
    pub fn new(range: i64) -> Result<Self, InvalidArgument> {
        u32::try_from(range)
            .ok()
            .filter(|range| (MIN_PRECISION_RANGE..=MAX_PRECISION_RANGE).contains(range))
            .map(|range| Self { range })
            .ok_or(InvalidArgument::PrecisionOutOfBounds { range })
    }

    /// Accepted distance in blocks.
    #[must_use]
    pub const fn range(&self) -> u32 {
        self.range
    }

    /// Accepted squared distance, the bound used while searching.
    #[must_use]
    pub fn squared_threshold(&self) -> f64 {
        let range = f64::from(self.range);
        range * range
    }
}

impl Default for Precision {
    fn default() -> Self {
        Self {
            range: DEFAULT_PRECISION_RANGE,
        }
    }
}

/// Closest configuration found for a query.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigurationMatch {
    /// Position of the entry within the table.
    pub index: usize,
    /// Label of the selected configuration.
    pub label: String,
    /// Squared distance between the local query point and the entry offset.
    pub squared_distance: f64,
}

impl ConfigurationMatch {
    /// Euclidean distance between the local query point and the entry offset.
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.squared_distance.sqrt()
    }
}

/// Supplies configuration tables on demand.
pub trait TableSource {
    /// Produces a freshly loaded table.
    fn load_table(&self) -> Result<ConfigurationTable, TableLoadError>;
}

impl TableSource for ConfigurationTable {
    fn load_table(&self) -> Result<ConfigurationTable, TableLoadError> {
        Ok(self.clone())
    }
}

/// Arguments rejected before any state changes.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvalidArgument {
    /// The facing name is not one of the four cardinal directions.
    #[error("'{0}' is not a cardinal facing")]
    UnknownFacing(String),
    /// The precision range lies outside the accepted bounds.
    #[error("precision {range} is outside {}..={}", MIN_PRECISION_RANGE, MAX_PRECISION_RANGE)]
    PrecisionOutOfBounds {
        /// Range that was requested.
        range: i64,
    },
}

/// State missing before a query can be answered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum NotReady {
    /// No configuration table has been loaded.
    #[error("configuration table is not loaded")]
    NoTable,
    /// No cannon origin has been set since the last load.
    #[error("cannon origin is not set")]
    NoOrigin,
}

/// Reasons a table source may fail to produce a table.
#[derive(Debug, Error)]
pub enum TableLoadError {
    /// The underlying source could not be read.
    #[error("could not read configuration source")]
    Unreadable(#[source] io::Error),
    /// The source was read but its contents could not be parsed.
    #[error("could not parse configuration source")]
    Malformed(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// Offsets and labels do not pair up by index.
    #[error("configuration source lists {offsets} offsets but {labels} labels")]
    LengthMismatch {
        /// Number of offsets supplied.
        offsets: usize,
        /// Number of labels supplied.
        labels: usize,
    },
    /// An offset contained a NaN or infinite coordinate.
    #[error("configuration offset {index} is not finite")]
    NonFiniteOffset {
        /// Index of the offending entry.
        index: usize,
    },
}

/// Failures reported by the targeting engine.
#[derive(Debug, Error)]
pub enum TargetingError {
    /// An argument was rejected before mutating state.
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),
    /// The engine lacks the state required to answer a query.
    #[error(transparent)]
    NotReady(#[from] NotReady),
    /// No configuration lies within the precision threshold.
    #[error("no configuration within the precision threshold")]
    OutOfRange,
    /// The table source failed; the previous table remains active.
    #[error("configuration table failed to load")]
    ConfigLoadFailure(#[from] TableLoadError),
}
