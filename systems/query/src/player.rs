use cannon_aim_core::{BlockPos, CannonOrigin, Facing};
use glam::DVec3;

/// Height of a standing player's eyes above their feet.
pub const DEFAULT_EYE_HEIGHT: f64 = 1.62;

/// Position and view direction of the player issuing queries.
///
/// Yaw and pitch are in degrees. Yaw zero looks toward +z and grows
/// clockwise seen from above; positive pitch looks down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerPose {
    position: DVec3,
    eye_height: f64,
    yaw: f64,
    pitch: f64,
}

impl PlayerPose {
    /// Creates a standing player at `position` looking south along the horizon.
    #[must_use]
    pub const fn new(position: DVec3) -> Self {
        Self {
            position,
            eye_height: DEFAULT_EYE_HEIGHT,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// Returns the pose with the provided view rotation.
    #[must_use]
    pub fn with_rotation(mut self, yaw: f64, pitch: f64) -> Self {
        self.yaw = yaw;
        self.pitch = pitch;
        self
    }

    /// Returns the pose moved to `position`, keeping its rotation and eye height.
    #[must_use]
    pub fn with_position(mut self, position: DVec3) -> Self {
        self.position = position;
        self
    }

    /// Returns the pose with a different eye height.
    #[must_use]
    pub fn with_eye_height(mut self, eye_height: f64) -> Self {
        self.eye_height = eye_height;
        self
    }

    /// Feet position of the player.
    #[must_use]
    pub const fn position(&self) -> DVec3 {
        self.position
    }

    /// Horizontal view angle in degrees.
    #[must_use]
    pub const fn yaw(&self) -> f64 {
        self.yaw
    }

    /// Vertical view angle in degrees.
    #[must_use]
    pub const fn pitch(&self) -> f64 {
        self.pitch
    }

    /// Block the player's feet occupy.
    #[must_use]
    pub fn block_pos(&self) -> BlockPos {
        BlockPos::containing(self.position)
    }

    /// Point the look ray starts from.
    #[must_use]
    pub fn eye_position(&self) -> DVec3 {
        self.position + DVec3::new(0.0, self.eye_height, 0.0)
    }

    /// Unit vector along the player's line of sight.
    #[must_use]
    pub fn look_vector(&self) -> DVec3 {
        let pitch = self.pitch.to_radians();
        let yaw = -self.yaw.to_radians();
        let (yaw_sin, yaw_cos) = yaw.sin_cos();
        let (pitch_sin, pitch_cos) = pitch.sin_cos();
        DVec3::new(yaw_sin * pitch_cos, -pitch_sin, yaw_cos * pitch_cos)
    }

    /// Cardinal direction closest to the player's yaw.
    #[must_use]
    pub fn horizontal_facing(&self) -> Facing {
        Facing::from_yaw(self.yaw)
    }

    /// Cannon origin anchored where the player stands, facing where they look.
    #[must_use]
    pub fn cannon_origin(&self) -> CannonOrigin {
        CannonOrigin::new(self.block_pos(), self.horizontal_facing())
    }
}

impl Default for PlayerPose {
    fn default() -> Self {
        Self::new(DVec3::ZERO)
    }
}
