use cannon_aim_core::BlockPos;
use glam::DVec3;

/// Read access to the solidity of world blocks.
pub trait BlockQuery {
    /// Reports whether `block` stops a look ray.
    fn is_solid(&self, block: BlockPos) -> bool;
}

/// Outcome of casting a ray through the block grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RayHit {
    /// The ray stopped at a solid block.
    Block(BlockPos),
    /// No solid block was crossed; carries the block containing the ray end.
    Miss(BlockPos),
}

impl RayHit {
    /// Block reported by the cast, whether it was hit or merely reached.
    #[must_use]
    pub const fn block(&self) -> BlockPos {
        match self {
            Self::Block(block) | Self::Miss(block) => *block,
        }
    }
}

/// Walks the blocks crossed by the segment `from..to` and stops at the first solid one.
///
/// The block containing `from` is tested first. Blocks are visited in the
/// order the segment enters them. A segment crosses at most three block faces
/// per unit of length, so the walk is capped at that many steps even when the
/// endpoints lie beyond the integer grid.
pub fn raycast<W>(world: &W, from: DVec3, to: DVec3) -> RayHit
where
    W: BlockQuery + ?Sized,
{
    let start = BlockPos::containing(from);
    if world.is_solid(start) {
        return RayHit::Block(start);
    }

    let end = BlockPos::containing(to);
    let delta = to - from;
    let length = delta.length();
    if length == 0.0 || !length.is_finite() {
        return RayHit::Miss(end);
    }
    let direction = delta / length;

    let mut cell = [start.x(), start.y(), start.z()];
    let origin = from.to_array();
    let direction = direction.to_array();
    let mut step = [0_i32; 3];
    let mut t_max = [f64::INFINITY; 3];
    let mut t_delta = [f64::INFINITY; 3];

    for axis in 0..3 {
        let d = direction[axis];
        if d > 0.0 {
            step[axis] = 1;
            t_max[axis] = (f64::from(cell[axis]) + 1.0 - origin[axis]) / d;
            t_delta[axis] = 1.0 / d;
        } else if d < 0.0 {
            step[axis] = -1;
            t_max[axis] = (f64::from(cell[axis]) - origin[axis]) / d;
            t_delta[axis] = -1.0 / d;
        }
    }

    let max_steps = (length.ceil() as usize).saturating_mul(3).saturating_add(3);
    for _ in 0..max_steps {
        let axis = nearest_axis(&t_max);
        if t_max[axis] > length {
            return RayHit::Miss(end);
        }

        cell[axis] = cell[axis].saturating_add(step[axis]);
        t_max[axis] += t_delta[axis];

        let block = BlockPos::new(cell[0], cell[1], cell[2]);
        if world.is_solid(block) {
            return RayHit::Block(block);
        }
    }
    RayHit::Miss(end)
}

fn nearest_axis(t_max: &[f64; 3]) -> usize {
    if t_max[0] <= t_max[1] && t_max[0] <= t_max[2] {
        0
    } else if t_max[1] <= t_max[2] {
        1
    } else {
        2
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    struct Blocks(HashSet<BlockPos>);

    impl BlockQuery for Blocks {
        fn is_solid(&self, block: BlockPos) -> bool {
            self.0.contains(&block)
        }
    }

    fn blocks(positions: &[(i32, i32, i32)]) -> Blocks {
        Blocks(
            positions
                .iter()
                .map(|&(x, y, z)| BlockPos::new(x, y, z))
                .collect(),
        )
    }

    #[test]
    fn stops_at_first_solid_block() {
        let world = blocks(&[(5, 0, 0), (8, 0, 0)]);
        let hit = raycast(
            &world,
            DVec3::new(0.5, 0.5, 0.5),
            DVec3::new(20.5, 0.5, 0.5),
        );
        assert_eq!(hit, RayHit::Block(BlockPos::new(5, 0, 0)));
    }

    #[test]
    fn negative_direction_crosses_zero() {
        let world = blocks(&[(-3, 0, 0), (2, 0, 0)]);
        let hit = raycast(
            &world,
            DVec3::new(0.5, 0.5, 0.5),
            DVec3::new(-10.5, 0.5, 0.5),
        );
        assert_eq!(hit, RayHit::Block(BlockPos::new(-3, 0, 0)));
    }

    #[test]
    fn diagonal_ray_visits_face_adjacent_blocks() {
        // The ray climbs into row 1 before reaching x = 1, so (1, 0, 0) is never entered.
        let world = blocks(&[(1, 0, 0), (2, 1, 0)]);
        let hit = raycast(
            &world,
            DVec3::new(0.5, 0.9, 0.5),
            DVec3::new(4.5, 2.9, 0.5),
        );
        assert_eq!(hit, RayHit::Block(BlockPos::new(2, 1, 0)));
    }

    #[test]
    fn miss_reports_end_block() {
        let world = blocks(&[(0, 10, 0)]);
        let hit = raycast(
            &world,
            DVec3::new(0.5, 0.5, 0.5),
            DVec3::new(6.2, 0.5, -3.7),
        );
        assert_eq!(hit, RayHit::Miss(BlockPos::new(6, 0, -4)));
    }

    #[test]
    fn solid_start_block_is_hit_immediately() {
        let world = blocks(&[(0, 0, 0)]);
        let hit = raycast(&world, DVec3::splat(0.5), DVec3::new(9.0, 0.5, 0.5));
        assert_eq!(hit, RayHit::Block(BlockPos::new(0, 0, 0)));
    }

    #[test]
    fn walk_ends_when_start_lies_beyond_the_grid() {
        let world = blocks(&[]);
        for x in [1e10, 1e18] {
            let from = DVec3::new(x, 65.5, 0.5);
            let hit = raycast(&world, from, from + DVec3::X * 1000.0);
            assert!(matches!(hit, RayHit::Miss(_)), "start at {x}: {hit:?}");
        }
    }
}
