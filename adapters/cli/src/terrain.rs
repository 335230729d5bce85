use cannon_aim_core::BlockPos;
use cannon_aim_system_query::BlockQuery;

/// Stand-in world made of solid ground up to a fixed height and open air above.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct FlatTerrain {
    surface: i32,
}

impl FlatTerrain {
    /// Creates terrain whose topmost solid layer sits at `surface`.
    #[must_use]
    pub(crate) const fn new(surface: i32) -> Self {
        Self { surface }
    }

    /// Height of the topmost solid layer.
    #[must_use]
    pub(crate) const fn surface(&self) -> i32 {
        self.surface
    }
}

impl BlockQuery for FlatTerrain {
    fn is_solid(&self, block: BlockPos) -> bool {
        block.y() <= self.surface
    }
}
