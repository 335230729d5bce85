#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Targeting engine that maps world-space targets onto cannon configurations.

use cannon_aim_core::{
    BlockPos, CannonOrigin, ConfigurationMatch, ConfigurationTable, Facing, NotReady, Precision,
    TableSource, TargetingError,
};
use glam::DVec3;

/// Owns the cannon origin, the loaded configuration table and the precision threshold.
#[derive(Debug, Default)]
pub struct TargetingEngine {
    origin: Option<CannonOrigin>,
    table: Option<ConfigurationTable>,
    precision: Precision,
}

impl TargetingEngine {
    /// Creates an engine with no table, no origin and the default precision.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchors the cannon at `position` facing `facing`.
    pub fn set_origin(&mut self, position: BlockPos, facing: Facing) -> CannonOrigin {
        let origin = CannonOrigin::new(position, facing);
        self.origin = Some(origin);
        log::debug!("cannon origin set to {position} facing {facing}");
        origin
    }

    /// Anchors the cannon using a facing name such as `"east"`.
    ///
    /// Unknown names are rejected without touching the current origin.
    pub fn set_origin_named(
        &mut self,
        position: BlockPos,
        facing: &str,
    ) -> Result<CannonOrigin, TargetingError> {
        let facing = Facing::from_name(facing)?;
        Ok(self.set_origin(position, facing))
    }

    /// Sets the maximum accepted distance, in blocks, between target and configuration.
    pub fn set_precision(&mut self, range: i64) -> Result<Precision, TargetingError> {
        let precision = Precision::new(range)?;
        self.precision = precision;
        log::debug!(
            "precision set to {} ({} squared units)",
            precision.range(),
            precision.squared_threshold()
        );
        Ok(precision)
    }

    /// Replaces the configuration table with a fresh one from `source`.
    ///
    /// A successful load clears the cannon origin because the new table may
    /// describe a different cannon. A failed load keeps the previous table and
    /// origin. Returns the number of entries loaded.
    pub fn load_table<S>(&mut self, source: &S) -> Result<usize, TargetingError>
    where
        S: TableSource + ?Sized,
    {
        match source.load_table() {
            Ok(table) => {
                let entries = table.len();
                self.table = Some(table);
                self.origin = None;
                log::debug!("configuration table loaded with {entries} entries");
                Ok(entries)
            }
            Err(error) => {
                log::warn!("configuration table failed to load: {error}");
                Err(TargetingError::ConfigLoadFailure(error))
            }
        }
    }

    /// Finds the configuration whose offset lies closest to `target`.
    ///
    /// Entries further than the precision threshold are never selected. When
    /// several entries share the smallest distance the last one in table order
    /// wins.
    pub fn find_configuration(&self, target: DVec3) -> Result<ConfigurationMatch, TargetingError> {
        let table = self.table.as_ref().ok_or(NotReady::NoTable)?;
        let origin = self.origin.ok_or(NotReady::NoOrigin)?;

        let local = origin.to_local(target);
        let mut required = self.precision.squared_threshold();
        let mut best: Option<usize> = None;

        for (index, entry) in table.iter().enumerate() {
            let distance_sq = local.distance_squared(entry.offset);
            if distance_sq <= required {
                required = distance_sq;
                best = Some(index);
            }
        }

        let index = best.ok_or(TargetingError::OutOfRange)?;
        let label = table.entries()[index].label.clone();
        log::debug!("target {target} maps to local {local}; selected '{label}'");

        Ok(ConfigurationMatch {
            index,
            label,
            squared_distance: required,
        })
    }

    /// Current cannon origin, if one is set.
    #[must_use]
    pub fn origin(&self) -> Option<CannonOrigin> {
        self.origin
    }

    /// Currently loaded configuration table, if any.
    #[must_use]
    pub fn table(&self) -> Option<&ConfigurationTable> {
        self.table.as_ref()
    }

    /// Current precision threshold.
    #[must_use]
    pub fn precision(&self) -> Precision {
        self.precision
    }
}

#[cfg(test)]
mod tests {
    use super::TargetingEngine;
    use cannon_aim_core::{
        BlockPos, ConfigurationTable, Facing, InvalidArgument, NotReady, TableLoadError,
        TableSource, TargetingError,
    };
    use glam::DVec3;

    struct FailingSource;

    impl TableSource for FailingSource {
        fn load_table(&self) -> Result<ConfigurationTable, TableLoadError> {
            Err(TableLoadError::LengthMismatch {
                offsets: 3,
                labels: 2,
            })
        }
    }

    fn table(entries: &[((f64, f64, f64), &str)]) -> ConfigurationTable {
        let offsets = entries
            .iter()
            .map(|((x, y, z), _)| DVec3::new(*x, *y, *z))
            .collect();
        let labels = entries.iter().map(|(_, label)| (*label).to_owned()).collect();
        ConfigurationTable::from_parts(offsets, labels).expect("valid table")
    }

    fn ready_engine(source: &ConfigurationTable, range: i64) -> TargetingEngine {
        let mut engine = TargetingEngine::new();
        let _ = engine.load_table(source).expect("table loads");
        let _ = engine.set_precision(range).expect("precision accepted");
        let _ = engine.set_origin(BlockPos::new(0, 0, 0), Facing::North);
        engine
    }

    #[test]
    fn query_without_table_is_not_ready() {
        let mut engine = TargetingEngine::new();
        let _ = engine.set_origin(BlockPos::new(0, 0, 0), Facing::North);

        let result = engine.find_configuration(DVec3::ZERO);
        assert!(matches!(
            result,
            Err(TargetingError::NotReady(NotReady::NoTable))
        ));
    }

    #[test]
    fn query_without_origin_is_not_ready() {
        let mut engine = TargetingEngine::new();
        let _ = engine
            .load_table(&table(&[((1.0, 0.0, 0.0), "A")]))
            .expect("table loads");

        let result = engine.find_configuration(DVec3::ZERO);
        assert!(matches!(
            result,
            Err(TargetingError::NotReady(NotReady::NoOrigin))
        ));
    }

    #[test]
    fn nearest_entry_is_selected() {
        let source = table(&[((1.0, 0.0, 0.0), "A"), ((5.0, 0.0, 0.0), "B")]);
        let engine = ready_engine(&source, 10);

        let found = engine
            .find_configuration(DVec3::new(1.5, 0.0, 0.0))
            .expect("target within range");
        assert_eq!(found.label, "A");
        assert_eq!(found.index, 0);
        assert_eq!(found.squared_distance, 1.5);
        assert!((found.distance() - 1.5_f64.sqrt()).abs() < 1e-12);

        let found = engine
            .find_configuration(DVec3::new(4.0, -0.5, -0.5))
            .expect("target within range");
        assert_eq!(found.label, "B");
        assert!((found.distance() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn exact_hit_reports_zero_distance() {
        let source = table(&[((1.0, 0.0, 0.0), "A"), ((5.0, 0.0, 0.0), "B")]);
        let engine = ready_engine(&source, 10);

        let found = engine
            .find_configuration(DVec3::new(0.5, -0.5, -0.5))
            .expect("target within range");
        assert_eq!(found.label, "A");
        assert_eq!(found.distance(), 0.0);
    }

    #[test]
    fn far_target_is_out_of_range() {
        let source = table(&[((1.0, 0.0, 0.0), "A"), ((5.0, 0.0, 0.0), "B")]);
        let engine = ready_engine(&source, 1);

        let result = engine.find_configuration(DVec3::new(100.0, 0.0, 0.0));
        assert!(matches!(result, Err(TargetingError::OutOfRange)));
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        let source = table(&[((3.0, 0.0, 0.0), "edge")]);
        let engine = ready_engine(&source, 3);

        // Local origin lands on (0, 0, 0): exactly three blocks from the entry.
        let found = engine
            .find_configuration(DVec3::new(-0.5, -0.5, -0.5))
            .expect("boundary accepted");
        assert_eq!(found.label, "edge");
        assert_eq!(found.squared_distance, 9.0);

        let result = engine.find_configuration(DVec3::new(-1.5, -0.5, -0.5));
        assert!(matches!(result, Err(TargetingError::OutOfRange)));
    }

    #[test]
    fn later_entry_wins_ties() {
        let source = table(&[
            ((2.0, 0.0, 0.0), "first"),
            ((-2.0, 0.0, 0.0), "second"),
            ((0.0, 0.0, 5.0), "far"),
        ]);
        let engine = ready_engine(&source, 10);

        let found = engine
            .find_configuration(DVec3::splat(-0.5))
            .expect("target within range");
        assert_eq!(found.label, "second");
        assert_eq!(found.index, 1);
    }

    #[test]
    fn duplicate_offsets_prefer_last_entry() {
        let source = table(&[((1.0, 1.0, 1.0), "old"), ((1.0, 1.0, 1.0), "new")]);
        let engine = ready_engine(&source, 5);

        let found = engine
            .find_configuration(DVec3::splat(0.5))
            .expect("target within range");
        assert_eq!(found.label, "new");
    }

    #[test]
    fn facing_rotates_target_into_table_frame() {
        let source = table(&[((0.0, 0.0, -4.0), "ahead"), ((4.0, 0.0, 0.0), "side")]);
        let mut engine = ready_engine(&source, 1);

        // Four blocks east of an east-facing cannon is straight ahead.
        let _ = engine.set_origin(BlockPos::new(10, 0, 10), Facing::East);
        let found = engine
            .find_configuration(DVec3::new(13.5, -0.5, 9.5))
            .expect("target within range");
        assert_eq!(found.label, "ahead");

        // Four blocks north of a west-facing cannon maps onto the +x offset.
        let _ = engine.set_origin(BlockPos::new(10, 0, 10), Facing::West);
        let found = engine
            .find_configuration(DVec3::new(9.5, -0.5, 5.5))
            .expect("target within range");
        assert_eq!(found.label, "side");
    }

    #[test]
    fn unknown_facing_name_keeps_previous_origin() {
        let source = table(&[((1.0, 0.0, 0.0), "A")]);
        let mut engine = ready_engine(&source, 10);
        let before = engine.origin();

        let result = engine.set_origin_named(BlockPos::new(5, 5, 5), "up");
        assert!(matches!(
            result,
            Err(TargetingError::InvalidArgument(InvalidArgument::UnknownFacing(_)))
        ));
        assert_eq!(engine.origin(), before);

        let origin = engine
            .set_origin_named(BlockPos::new(5, 5, 5), "south")
            .expect("valid facing");
        assert_eq!(origin.facing(), Facing::South);
        assert_eq!(engine.origin(), Some(origin));
    }

    #[test]
    fn precision_outside_bounds_is_rejected() {
        let mut engine = TargetingEngine::new();
        let default = engine.precision();

        assert!(matches!(
            engine.set_precision(0),
            Err(TargetingError::InvalidArgument(
                InvalidArgument::PrecisionOutOfBounds { range: 0 }
            ))
        ));
        assert!(engine.set_precision(9001).is_err());
        assert_eq!(engine.precision(), default);

        let precision = engine.set_precision(9000).expect("upper bound accepted");
        assert_eq!(precision.squared_threshold(), 81_000_000.0);
        assert_eq!(engine.precision(), precision);
    }

    #[test]
    fn successful_reload_clears_origin_and_keeps_precision() {
        let source = table(&[((1.0, 0.0, 0.0), "A")]);
        let mut engine = ready_engine(&source, 7);

        let replacement = table(&[((2.0, 0.0, 0.0), "B"), ((3.0, 0.0, 0.0), "C")]);
        assert_eq!(engine.load_table(&replacement).expect("reload"), 2);

        assert_eq!(engine.origin(), None);
        assert_eq!(engine.precision().range(), 7);
        assert_eq!(engine.table(), Some(&replacement));
        assert!(matches!(
            engine.find_configuration(DVec3::ZERO),
            Err(TargetingError::NotReady(NotReady::NoOrigin))
        ));
    }

    #[test]
    fn failed_reload_preserves_table_and_origin() {
        let source = table(&[((1.0, 0.0, 0.0), "A")]);
        let mut engine = ready_engine(&source, 10);
        let origin = engine.origin();

        let result = engine.load_table(&FailingSource);
        assert!(matches!(
            result,
            Err(TargetingError::ConfigLoadFailure(
                TableLoadError::LengthMismatch { .. }
            ))
        ));
        assert_eq!(engine.table(), Some(&source));
        assert_eq!(engine.origin(), origin);
        assert!(engine.find_configuration(DVec3::new(1.5, 0.0, 0.0)).is_ok());
    }

    #[test]
    fn empty_table_is_always_out_of_range() {
        let source = ConfigurationTable::default();
        let engine = ready_engine(&source, 9000);

        assert!(matches!(
            engine.find_configuration(DVec3::ZERO),
            Err(TargetingError::OutOfRange)
        ));
    }
}
