//! Grid model: cells, the building instance index and read-only queries.

use crate::{GridError, InstanceId, Pos};
use serde::{Deserialize, Serialize};
use sim_core::{BuildingKind, Catalog, DecorKind, Footprint, Orientation};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// One square of the world.
///
/// Holds at most one of: membership in a building footprint, or a
/// decorative object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub x: u32,
    pub y: u32,
    #[serde(default)]
    pub building_type: Option<BuildingKind>,
    /// Meaningless when `building_type` is `None`.
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub decorative_object: Option<DecorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<InstanceId>,
}

impl GridCell {
    fn empty(p: Pos) -> Self {
        GridCell {
            x: p.x,
            y: p.y,
            building_type: None,
            orientation: Orientation::NORTH,
            decorative_object: None,
            instance_id: None,
        }
    }

    pub fn pos(&self) -> Pos {
        Pos::new(self.x, self.y)
    }

    pub fn is_empty(&self) -> bool {
        self.building_type.is_none() && self.decorative_object.is_none()
    }
}

/// A placed building as recorded in the instance index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildingInstance {
    pub id: InstanceId,
    pub kind: BuildingKind,
    pub orientation: Orientation,
    /// Minimal-(x, y) cell of the footprint.
    pub anchor: Pos,
    pub footprint: Footprint,
}

impl BuildingInstance {
    pub fn contains(&self, p: Pos) -> bool {
        p.x >= self.anchor.x
            && p.y >= self.anchor.y
            && p.x - self.anchor.x < self.footprint.width
            && p.y - self.anchor.y < self.footprint.height
    }

    pub fn cells(&self) -> impl Iterator<Item = Pos> {
        footprint_cells(self.anchor, self.footprint)
    }
}

/// Cells of the `footprint` rectangle anchored at `anchor`, row by row.
pub fn footprint_cells(anchor: Pos, footprint: Footprint) -> impl Iterator<Item = Pos> {
    (0..footprint.height).flat_map(move |dy| {
        (0..footprint.width).map(move |dx| Pos::new(anchor.x + dx, anchor.y + dy))
    })
}

/// Fixed-size square grid with an index of placed buildings.
#[derive(Clone, Debug)]
pub struct Grid {
    size: u32,
    cells: Vec<GridCell>,
    instances: BTreeMap<InstanceId, BuildingInstance>,
    next_id: u64,
}

/// Grids are equal when their cells and buildings are; the id counter is not compared.
impl PartialEq for Grid {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.cells == other.cells && self.instances == other.instances
    }
}

impl Grid {
    /// An empty `size` x `size` grid.
    pub fn new(size: u32) -> Self {
        let mut cells = Vec::with_capacity(size as usize * size as usize);
        for y in 0..size {
            for x in 0..size {
                cells.push(GridCell::empty(Pos::new(x, y)));
            }
        }
        Grid {
            size,
            cells,
            instances: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    fn index(&self, p: Pos) -> usize {
        p.y as usize * self.size as usize + p.x as usize
    }

    #[inline]
    pub fn in_bounds(&self, p: Pos) -> bool {
        p.x < self.size && p.y < self.size
    }

    /// Whether the whole rectangle lies inside `[0, size)` on both axes.
    pub fn rect_in_bounds(&self, anchor: Pos, footprint: Footprint) -> bool {
        let size = u64::from(self.size);
        u64::from(anchor.x) + u64::from(footprint.width) <= size
            && u64::from(anchor.y) + u64::from(footprint.height) <= size
    }

    pub fn cell(&self, p: Pos) -> Option<&GridCell> {
        if !self.in_bounds(p) {
            return None;
        }
        self.cells.get(self.index(p))
    }

    pub(crate) fn cell_mut(&mut self, p: Pos) -> Option<&mut GridCell> {
        if !self.in_bounds(p) {
            return None;
        }
        let idx = self.index(p);
        self.cells.get_mut(idx)
    }

    pub fn cells(&self) -> impl Iterator<Item = &GridCell> {
        self.cells.iter()
    }

    pub fn building_at(&self, p: Pos) -> Option<BuildingKind> {
        self.cell(p).and_then(|c| c.building_type)
    }

    pub fn decoration_at(&self, p: Pos) -> Option<DecorKind> {
        self.cell(p).and_then(|c| c.decorative_object)
    }

    pub fn instance(&self, id: InstanceId) -> Option<&BuildingInstance> {
        self.instances.get(&id)
    }

    /// The building covering `p`, whichever of its cells `p` is.
    pub fn instance_at(&self, p: Pos) -> Option<&BuildingInstance> {
        self.cell(p)
            .and_then(|c| c.instance_id)
            .and_then(|id| self.instances.get(&id))
    }

    pub fn anchor_of(&self, p: Pos) -> Option<Pos> {
        self.instance_at(p).map(|i| i.anchor)
    }

    pub fn instances(&self) -> impl Iterator<Item = &BuildingInstance> {
        self.instances.values()
    }

    pub fn instances_of(&self, kind: BuildingKind) -> impl Iterator<Item = &BuildingInstance> {
        self.instances.values().filter(move |i| i.kind == kind)
    }

    /// Houses and apartments, one entry per building.
    pub fn residential(&self) -> impl Iterator<Item = &BuildingInstance> {
        self.instances.values().filter(|i| i.kind.is_residential())
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Number of placed buildings per kind.
    pub fn instance_counts(&self) -> BTreeMap<BuildingKind, u32> {
        let mut counts = BTreeMap::new();
        for i in self.instances.values() {
            *counts.entry(i.kind).or_insert(0) += 1;
        }
        counts
    }

    pub fn decoration_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| c.decorative_object.is_some())
            .count()
    }

    pub fn is_road(&self, p: Pos) -> bool {
        self.building_at(p).is_some_and(BuildingKind::is_road)
    }

    /// In-bounds cardinal neighbours of `p`.
    pub fn neighbors4(&self, p: Pos) -> Vec<Pos> {
        let mut out = Vec::with_capacity(4);
        if p.x > 0 {
            out.push(Pos::new(p.x - 1, p.y));
        }
        if p.y > 0 {
            out.push(Pos::new(p.x, p.y - 1));
        }
        let right = Pos::new(p.x.saturating_add(1), p.y);
        if right != p && self.in_bounds(right) {
            out.push(right);
        }
        let down = Pos::new(p.x, p.y.saturating_add(1));
        if down != p && self.in_bounds(down) {
            out.push(down);
        }
        out
    }

    /// Whether a road touches the rectangle from outside.
    pub fn has_road_access(&self, anchor: Pos, footprint: Footprint) -> bool {
        let inside = |p: Pos| {
            p.x >= anchor.x
                && p.y >= anchor.y
                && p.x - anchor.x < footprint.width
                && p.y - anchor.y < footprint.height
        };
        footprint_cells(anchor, footprint).any(|c| {
            self.neighbors4(c)
                .into_iter()
                .any(|n| !inside(n) && self.is_road(n))
        })
    }

    /// Cells as rows, `rows[y][x]`, the persisted layout.
    pub fn rows(&self) -> Vec<Vec<GridCell>> {
        self.cells
            .chunks(self.size.max(1) as usize)
            .map(<[GridCell]>::to_vec)
            .collect()
    }

    /// Rebuild a grid and its instance index from persisted rows.
    ///
    /// Cells saved without an instance id are grouped by claiming the
    /// configured footprint of their kind in row-major order.
    pub fn from_rows(rows: Vec<Vec<GridCell>>, catalog: &Catalog) -> Result<Self, GridError> {
        let n = rows.len();
        if n == 0 || rows.iter().any(|r| r.len() != n) {
            return Err(GridError::NotSquare);
        }
        let size = u32::try_from(n).map_err(|_| GridError::NotSquare)?;
        let mut cells = Vec::with_capacity(n * n);
        for (y, row) in rows.into_iter().enumerate() {
            for (x, mut cell) in row.into_iter().enumerate() {
                let actual = Pos::new(x as u32, y as u32);
                if cell.pos() != actual {
                    return Err(GridError::CellMismatch {
                        stored: cell.pos(),
                        actual,
                    });
                }
                if cell.building_type.is_some() && cell.decorative_object.is_some() {
                    return Err(GridError::Overlap(actual));
                }
                if cell.building_type.is_none() {
                    cell.instance_id = None;
                    cell.orientation = Orientation::NORTH;
                }
                cells.push(cell);
            }
        }
        let mut grid = Grid {
            size,
            cells,
            instances: BTreeMap::new(),
            next_id: 1,
        };
        grid.index_saved_instances()?;
        grid.claim_legacy_footprints(catalog)?;
        debug!(
            size,
            buildings = grid.instances.len(),
            "grid rebuilt from saved cells"
        );
        Ok(grid)
    }

    fn index_saved_instances(&mut self) -> Result<(), GridError> {
        struct Extent {
            kind: BuildingKind,
            orientation: Orientation,
            min: Pos,
            max: Pos,
            count: u32,
        }
        let mut extents: BTreeMap<InstanceId, Extent> = BTreeMap::new();
        for cell in &self.cells {
            let (Some(kind), Some(id)) = (cell.building_type, cell.instance_id) else {
                continue;
            };
            let p = cell.pos();
            let e = extents.entry(id).or_insert(Extent {
                kind,
                orientation: cell.orientation,
                min: p,
                max: p,
                count: 0,
            });
            if e.kind != kind || e.orientation != cell.orientation {
                return Err(GridError::Fragmented(id));
            }
            e.min = Pos::new(e.min.x.min(p.x), e.min.y.min(p.y));
            e.max = Pos::new(e.max.x.max(p.x), e.max.y.max(p.y));
            e.count += 1;
        }
        for (id, e) in extents {
            let footprint = Footprint::new(e.max.x - e.min.x + 1, e.max.y - e.min.y + 1);
            if footprint.area() != e.count {
                return Err(GridError::Fragmented(id));
            }
            self.instances.insert(
                id,
                BuildingInstance {
                    id,
                    kind: e.kind,
                    orientation: e.orientation,
                    anchor: e.min,
                    footprint,
                },
            );
            self.next_id = self.next_id.max(id.0 + 1);
        }
        Ok(())
    }

    fn claim_legacy_footprints(&mut self, catalog: &Catalog) -> Result<(), GridError> {
        let mut claimed = 0usize;
        for i in 0..self.cells.len() {
            let cell = &self.cells[i];
            let Some(kind) = cell.building_type else {
                continue;
            };
            if cell.instance_id.is_some() {
                continue;
            }
            let anchor = cell.pos();
            let orientation = cell.orientation;
            let wanted = catalog.building(kind)?.size;
            let fits = self.rect_in_bounds(anchor, wanted)
                && footprint_cells(anchor, wanted).all(|p| {
                    let c = &self.cells[self.index(p)];
                    c.building_type == Some(kind)
                        && c.orientation == orientation
                        && c.instance_id.is_none()
                });
            let footprint = if fits {
                wanted
            } else {
                warn!(%anchor, %kind, "partial legacy footprint, keeping a single cell");
                Footprint::UNIT
            };
            let id = self.allocate_id();
            self.write_instance(BuildingInstance {
                id,
                kind,
                orientation,
                anchor,
                footprint,
            });
            claimed += 1;
        }
        if claimed > 0 {
            debug!(claimed, "assigned instance ids to legacy cells");
        }
        Ok(())
    }

    pub(crate) fn allocate_id(&mut self) -> InstanceId {
        let id = InstanceId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Stamp the instance onto its cells and index it. Bounds are checked by callers.
    pub(crate) fn write_instance(&mut self, inst: BuildingInstance) {
        for p in inst.cells() {
            if let Some(c) = self.cell_mut(p) {
                c.building_type = Some(inst.kind);
                c.orientation = inst.orientation;
                c.instance_id = Some(inst.id);
            }
        }
        self.instances.insert(inst.id, inst);
    }

    /// Clear every cell of the instance and drop it from the index.
    pub(crate) fn clear_instance(&mut self, id: InstanceId) -> Option<BuildingInstance> {
        let inst = self.instances.remove(&id)?;
        for p in inst.cells() {
            if let Some(c) = self.cell_mut(p) {
                c.building_type = None;
                c.orientation = Orientation::NORTH;
                c.instance_id = None;
            }
        }
        Some(inst)
    }
}
