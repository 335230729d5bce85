#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Resolution of world-space query points for the targeting engine.
//!
//! The host game is represented by two small capabilities: a [`PlayerPose`]
//! describing where the player stands and looks, and a [`BlockQuery`] that
//! reports which blocks are solid. Resolvers combine them into the point the
//! targeting engine should aim at.

mod coordinates;
mod player;
mod raycast;

pub use coordinates::{Coordinate, CoordinateError, PositionArgument};
pub use player::{PlayerPose, DEFAULT_EYE_HEIGHT};
pub use raycast::{raycast, BlockQuery, RayHit};

use cannon_aim_core::BlockPos;
use glam::DVec3;
use thiserror::Error;

/// Length of the look ray cast from the player's eyes.
pub const RAYCAST_MAX_DISTANCE: f64 = 1000.0;
/// Blocks at least this far from the eyes are treated as a miss.
pub const NOWHERE_DISTANCE: f64 = 990.0;

/// Produces the world-space point a query should target.
pub trait QueryResolver {
    /// Resolves the query point.
    fn resolve(&self) -> Result<DVec3, ResolveError>;
}

/// Reasons a query point could not be resolved.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ResolveError {
    /// The look ray did not reach any block close enough to aim at.
    #[error("no block within {} blocks along the look direction", NOWHERE_DISTANCE)]
    LookingIntoNowhere {
        /// Block reported at the end of the ray.
        block: BlockPos,
    },
}

/// Targets the block named by an explicit, possibly relative, position argument.
#[derive(Clone, Copy, Debug)]
pub struct ExplicitTarget<'a> {
    argument: PositionArgument,
    player: &'a PlayerPose,
}

impl<'a> ExplicitTarget<'a> {
    /// Creates a resolver that interprets relative axes against `player`.
    #[must_use]
    pub fn new(argument: PositionArgument, player: &'a PlayerPose) -> Self {
        Self { argument, player }
    }
}

impl QueryResolver for ExplicitTarget<'_> {
    fn resolve(&self) -> Result<DVec3, ResolveError> {
        Ok(self.argument.block_pos(self.player.position()).as_dvec3())
    }
}

/// Targets the block the player currently stands in.
#[derive(Clone, Copy, Debug)]
pub struct PlayerTarget<'a> {
    player: &'a PlayerPose,
}

impl<'a> PlayerTarget<'a> {
    /// Creates a resolver anchored on `player`.
    #[must_use]
    pub fn new(player: &'a PlayerPose) -> Self {
        Self { player }
    }
}

impl QueryResolver for PlayerTarget<'_> {
    fn resolve(&self) -> Result<DVec3, ResolveError> {
        Ok(self.player.block_pos().as_dvec3())
    }
}

/// Targets the block the player is looking at.
#[derive(Clone, Copy, Debug)]
pub struct LookTarget<'a, W: ?Sized> {
    player: &'a PlayerPose,
    world: &'a W,
}

impl<'a, W> LookTarget<'a, W>
where
    W: BlockQuery + ?Sized,
{
    /// Creates a resolver that casts from `player`'s eyes through `world`.
    #[must_use]
    pub fn new(player: &'a PlayerPose, world: &'a W) -> Self {
        Self { player, world }
    }
}

impl<W> QueryResolver for LookTarget<'_, W>
where
    W: BlockQuery + ?Sized,
{
    fn resolve(&self) -> Result<DVec3, ResolveError> {
        let eye = self.player.eye_position();
        let end = eye + self.player.look_vector() * RAYCAST_MAX_DISTANCE;
        // A miss ends a full ray length away, past the cutoff, unless the pose
        // was not finite to begin with. Either way nothing is being looked at.
        let block = match raycast(self.world, eye, end) {
            RayHit::Block(block) => block,
            RayHit::Miss(block) => return Err(ResolveError::LookingIntoNowhere { block }),
        };

        let cutoff = NOWHERE_DISTANCE * NOWHERE_DISTANCE;
        if !(block.squared_distance_to(eye) < cutoff) {
            return Err(ResolveError::LookingIntoNowhere { block });
        }
        Ok(block.as_dvec3())
    }
}
