//! Placement engine: place, remove and move buildings; add and clear decorations.
//!
//! Every operation validates first and writes last, so a rejected call leaves
//! the grid exactly as it was.

use crate::grid::{footprint_cells, BuildingInstance, Grid};
use crate::{InstanceId, PlacementError, Pos};
use rust_decimal::Decimal;
use sim_core::{BuildingKind, Catalog, DecorKind, Footprint, Orientation};
use tracing::debug;

/// A building taken off the grid and the refund owed for it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Removed {
    pub instance: BuildingInstance,
    /// Half the purchase price, rounded down.
    pub refund: Decimal,
}

/// Refund for demolishing a building bought at `cost`.
pub fn refund_for(cost: Decimal) -> Decimal {
    (cost / Decimal::from(2)).floor()
}

impl Grid {
    /// Check that the rectangle is inside the grid and empty. Cells of `own`
    /// count as free so a building may move onto its old position.
    fn check_free(
        &self,
        anchor: Pos,
        footprint: Footprint,
        own: Option<InstanceId>,
    ) -> Result<(), PlacementError> {
        if !self.rect_in_bounds(anchor, footprint) {
            return Err(PlacementError::OutOfBounds(anchor));
        }
        for p in footprint_cells(anchor, footprint) {
            let cell = self.cell(p).ok_or(PlacementError::OutOfBounds(p))?;
            let own_cell = own.is_some() && cell.instance_id == own;
            if cell.decorative_object.is_some() || (cell.building_type.is_some() && !own_cell) {
                return Err(PlacementError::Occupied(p));
            }
        }
        Ok(())
    }

    fn check_road_rule(
        &self,
        catalog: &Catalog,
        kind: BuildingKind,
        anchor: Pos,
        footprint: Footprint,
        requires_road: bool,
    ) -> Result<(), PlacementError> {
        if catalog.game.enforce_road_access && requires_road && !self.has_road_access(anchor, footprint)
        {
            return Err(PlacementError::NoRoadAccess(kind));
        }
        Ok(())
    }

    /// Validate a placement without performing it.
    pub fn can_place(
        &self,
        catalog: &Catalog,
        at: Pos,
        kind: BuildingKind,
    ) -> Result<(), PlacementError> {
        let cfg = catalog.building(kind)?;
        self.check_free(at, cfg.size, None)?;
        self.check_road_rule(catalog, kind, at, cfg.size, cfg.requires_road)
    }

    /// Place a building with its anchor at `at`.
    pub fn place(
        &mut self,
        catalog: &Catalog,
        at: Pos,
        kind: BuildingKind,
        orientation: Orientation,
    ) -> Result<InstanceId, PlacementError> {
        self.can_place(catalog, at, kind)?;
        let footprint = catalog.building(kind)?.size;
        let id = self.allocate_id();
        self.write_instance(BuildingInstance {
            id,
            kind,
            orientation,
            anchor: at,
            footprint,
        });
        debug!(%kind, anchor = %at, %id, "building placed");
        Ok(id)
    }

    /// Remove the building covering `at`, from any of its cells.
    ///
    /// Returns `Ok(None)` when there is nothing to remove.
    pub fn remove(&mut self, catalog: &Catalog, at: Pos) -> Result<Option<Removed>, PlacementError> {
        let Some(inst) = self.instance_at(at).copied() else {
            return Ok(None);
        };
        let refund = refund_for(catalog.building(inst.kind)?.cost);
        self.clear_instance(inst.id);
        debug!(kind = %inst.kind, anchor = %inst.anchor, %refund, "building removed");
        Ok(Some(Removed {
            instance: inst,
            refund,
        }))
    }

    /// Move the building covering `from` so that its anchor lands on `to`.
    ///
    /// The building keeps its id, kind and orientation. Returns the new anchor.
    pub fn move_building(
        &mut self,
        catalog: &Catalog,
        from: Pos,
        to: Pos,
    ) -> Result<Pos, PlacementError> {
        let inst = *self
            .instance_at(from)
            .ok_or(PlacementError::NoBuilding(from))?;
        self.check_free(to, inst.footprint, Some(inst.id))?;
        let requires_road = catalog.building(inst.kind)?.requires_road;
        self.check_road_rule(catalog, inst.kind, to, inst.footprint, requires_road)?;

        self.clear_instance(inst.id);
        self.write_instance(BuildingInstance { anchor: to, ..inst });
        debug!(kind = %inst.kind, from = %inst.anchor, %to, "building moved");
        Ok(to)
    }

    /// Put a decorative object on an empty cell.
    pub fn place_decoration(&mut self, at: Pos, kind: DecorKind) -> Result<(), PlacementError> {
        let cell = self.cell_mut(at).ok_or(PlacementError::OutOfBounds(at))?;
        if !cell.is_empty() {
            return Err(PlacementError::Occupied(at));
        }
        cell.decorative_object = Some(kind);
        Ok(())
    }

    /// Clear the decorative object at `at` and report what it was.
    pub fn remove_decoration(&mut self, at: Pos) -> Result<DecorKind, PlacementError> {
        let cell = self.cell_mut(at).ok_or(PlacementError::OutOfBounds(at))?;
        let kind = cell
            .decorative_object
            .take()
            .ok_or(PlacementError::NoDecoration(at))?;
        debug!(%kind, %at, "decoration cleared");
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn catalog() -> Catalog {
        Catalog::builtin().unwrap()
    }

    #[test]
    fn multi_cell_placement_marks_every_cell() {
        let c = catalog();
        let mut g = Grid::new(10);
        let id = g
            .place(&c, Pos::new(2, 3), BuildingKind::School, Orientation::NORTH)
            .unwrap();
        for p in [Pos::new(2, 3), Pos::new(3, 3), Pos::new(2, 4), Pos::new(3, 4)] {
            let cell = g.cell(p).unwrap();
            assert_eq!(cell.building_type, Some(BuildingKind::School));
            assert_eq!(cell.instance_id, Some(id));
        }
        assert_eq!(g.building_at(Pos::new(4, 3)), None);
        assert_eq!(g.instance_counts()[&BuildingKind::School], 1);
    }

    #[test]
    fn boundary_overflow_rejected() {
        let c = catalog();
        let mut g = Grid::new(10);
        let err = g
            .place(&c, Pos::new(9, 9), BuildingKind::Hospital, Orientation::NORTH)
            .unwrap_err();
        assert!(matches!(err, PlacementError::OutOfBounds(_)));
        assert!(g.place(&c, Pos::new(8, 8), BuildingKind::Hospital, Orientation::NORTH).is_ok());
    }

    #[test]
    fn decoration_blocks_placement() {
        let c = catalog();
        let mut g = Grid::new(10);
        g.place_decoration(Pos::new(1, 1), DecorKind::Rock).unwrap();
        let err = g
            .place(&c, Pos::new(0, 0), BuildingKind::Apartment, Orientation::NORTH)
            .unwrap_err();
        assert!(matches!(err, PlacementError::Occupied(p) if p == Pos::new(1, 1)));
        assert_eq!(g.remove_decoration(Pos::new(1, 1)).unwrap(), DecorKind::Rock);
        assert!(matches!(
            g.remove_decoration(Pos::new(1, 1)),
            Err(PlacementError::NoDecoration(_))
        ));
        assert!(g.place(&c, Pos::new(0, 0), BuildingKind::Apartment, Orientation::NORTH).is_ok());
    }

    #[test]
    fn remove_from_any_cell_clears_footprint_and_refunds_half() {
        let c = catalog();
        let mut g = Grid::new(10);
        g.place(&c, Pos::new(4, 4), BuildingKind::Monument, Orientation::new(2).unwrap())
            .unwrap();
        let removed = g.remove(&c, Pos::new(5, 5)).unwrap().unwrap();
        assert_eq!(removed.instance.anchor, Pos::new(4, 4));
        assert_eq!(removed.refund, Decimal::new(1500, 0));
        assert!(g.cells().all(|cell| cell.is_empty()));
        assert_eq!(g.remove(&c, Pos::new(5, 5)).unwrap(), None);
    }

    #[test]
    fn refund_rounds_down() {
        assert_eq!(refund_for(Decimal::new(15, 0)), Decimal::new(7, 0));
        assert_eq!(refund_for(Decimal::new(200, 0)), Decimal::new(100, 0));
    }

    #[test]
    fn adjacent_identical_buildings_resolve_separately() {
        let c = catalog();
        let mut g = Grid::new(10);
        let a = g
            .place(&c, Pos::new(0, 0), BuildingKind::Apartment, Orientation::NORTH)
            .unwrap();
        let b = g
            .place(&c, Pos::new(2, 0), BuildingKind::Apartment, Orientation::NORTH)
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(g.anchor_of(Pos::new(2, 1)), Some(Pos::new(2, 0)));
        g.remove(&c, Pos::new(2, 1)).unwrap();
        assert_eq!(g.building_at(Pos::new(1, 1)), Some(BuildingKind::Apartment));
        assert_eq!(g.building_at(Pos::new(2, 0)), None);
    }

    #[test]
    fn move_may_overlap_own_footprint() {
        let c = catalog();
        let mut g = Grid::new(10);
        let id = g
            .place(&c, Pos::new(1, 1), BuildingKind::Hospital, Orientation::NORTH)
            .unwrap();
        let to = g.move_building(&c, Pos::new(2, 2), Pos::new(2, 1)).unwrap();
        assert_eq!(to, Pos::new(2, 1));
        assert_eq!(g.building_at(Pos::new(1, 1)), None);
        assert_eq!(g.instance_at(Pos::new(3, 2)).map(|i| i.id), Some(id));
        assert_eq!(g.instance_count(), 1);
    }

    #[test]
    fn move_into_other_building_fails_without_change() {
        let c = catalog();
        let mut g = Grid::new(10);
        g.place(&c, Pos::new(0, 0), BuildingKind::House, Orientation::NORTH)
            .unwrap();
        g.place(&c, Pos::new(3, 3), BuildingKind::School, Orientation::NORTH)
            .unwrap();
        let before = g.clone();
        assert!(matches!(
            g.move_building(&c, Pos::new(0, 0), Pos::new(4, 4)),
            Err(PlacementError::Occupied(_))
        ));
        assert!(matches!(
            g.move_building(&c, Pos::new(7, 7), Pos::new(1, 1)),
            Err(PlacementError::NoBuilding(_))
        ));
        assert_eq!(g, before);
    }

    #[test]
    fn road_rule_applies_only_when_enabled() {
        let mut c = catalog();
        let mut g = Grid::new(10);
        assert!(g.can_place(&c, Pos::new(5, 5), BuildingKind::House).is_ok());
        c.game.enforce_road_access = true;
        assert!(matches!(
            g.can_place(&c, Pos::new(5, 5), BuildingKind::House),
            Err(PlacementError::NoRoadAccess(BuildingKind::House))
        ));
        g.place(&c, Pos::new(5, 6), BuildingKind::Road, Orientation::NORTH)
            .unwrap();
        assert!(g.place(&c, Pos::new(5, 5), BuildingKind::House, Orientation::NORTH).is_ok());
    }

    fn kind_strategy() -> impl Strategy<Value = BuildingKind> {
        (0usize..BuildingKind::ALL.len()).prop_map(|i| BuildingKind::ALL[i])
    }

    #[derive(Clone, Debug)]
    enum Op {
        Place(u32, u32, BuildingKind),
        Remove(u32, u32),
        Move(u32, u32, u32, u32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u32..12, 0u32..12, kind_strategy()).prop_map(|(x, y, k)| Op::Place(x, y, k)),
            (0u32..12, 0u32..12).prop_map(|(x, y)| Op::Remove(x, y)),
            (0u32..12, 0u32..12, 0u32..12, 0u32..12).prop_map(|(a, b, x, y)| Op::Move(a, b, x, y)),
        ]
    }

    fn assert_consistent(g: &Grid) {
        for cell in g.cells() {
            assert!(cell.building_type.is_none() || cell.decorative_object.is_none());
            match cell.instance_id {
                Some(id) => {
                    let inst = g.instance(id).expect("indexed instance");
                    assert!(inst.contains(cell.pos()));
                    assert_eq!(cell.building_type, Some(inst.kind));
                }
                None => assert!(cell.building_type.is_none()),
            }
        }
        for inst in g.instances() {
            for p in inst.cells() {
                assert_eq!(g.cell(p).and_then(|c| c.instance_id), Some(inst.id));
            }
        }
    }

    proptest! {
        #[test]
        fn failed_placement_leaves_grid_untouched(
            ops in prop::collection::vec(op_strategy(), 0..30),
            x in 0u32..12, y in 0u32..12, kind in kind_strategy(),
        ) {
            let c = catalog();
            let mut g = Grid::new(10);
            g.place_decoration(Pos::new(5, 5), DecorKind::Tree).unwrap();
            for op in ops {
                let _ = match op {
                    Op::Place(x, y, k) => g.place(&c, Pos::new(x, y), k, Orientation::NORTH).map(|_| ()),
                    Op::Remove(x, y) => g.remove(&c, Pos::new(x, y)).map(|_| ()),
                    Op::Move(a, b, x, y) => g.move_building(&c, Pos::new(a, b), Pos::new(x, y)).map(|_| ()),
                };
            }
            let before = g.clone();
            if g.place(&c, Pos::new(x, y), kind, Orientation::NORTH).is_err() {
                prop_assert_eq!(&g, &before);
            }
        }

        #[test]
        fn no_overlap_after_any_sequence(ops in prop::collection::vec(op_strategy(), 0..60)) {
            let c = catalog();
            let mut g = Grid::new(10);
            g.place_decoration(Pos::new(3, 3), DecorKind::Rock).unwrap();
            for op in ops {
                let _ = match op {
                    Op::Place(x, y, k) => g.place(&c, Pos::new(x, y), k, Orientation::NORTH).map(|_| ()),
                    Op::Remove(x, y) => g.remove(&c, Pos::new(x, y)).map(|_| ()),
                    Op::Move(a, b, x, y) => g.move_building(&c, Pos::new(a, b), Pos::new(x, y)).map(|_| ()),
                };
                assert_consistent(&g);
            }
            prop_assert_eq!(g.decoration_at(Pos::new(3, 3)), Some(DecorKind::Rock));
        }

        #[test]
        fn remove_on_any_cell_clears_whole_footprint(
            x in 0u32..8, y in 0u32..8, dx in 0u32..2, dy in 0u32..2, kind in kind_strategy(),
        ) {
            let c = catalog();
            let mut g = Grid::new(10);
            g.place(&c, Pos::new(x, y), kind, Orientation::NORTH).unwrap();
            let fp = c.building(kind).unwrap().size;
            let probe = Pos::new(x + dx % fp.width, y + dy % fp.height);
            let removed = g.remove(&c, probe).unwrap().unwrap();
            prop_assert_eq!(removed.instance.anchor, Pos::new(x, y));
            prop_assert!(g.cells().all(|cell| cell.building_type.is_none()));
            prop_assert_eq!(g.instance_count(), 0);
        }
    }
}
