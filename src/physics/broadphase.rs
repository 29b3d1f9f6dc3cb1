//! Broadphase collision detection using a uniform spatial grid.

use std::collections::HashMap;

use glam::Vec2;

use super::body::BodyHandle;
use super::collider::Aabb;

type CellKey = (i32, i32);

/// Default edge length of a grid cell in world units.
pub const DEFAULT_CELL_SIZE: f32 = 100.0;

/// Uniform grid mapping cells to the bodies whose AABB overlaps them.
///
/// Rebuilt wholesale every step, so removal is a plain scan over all cells.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<CellKey, Vec<BodyHandle>>,
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}

impl SpatialGrid {
    /// `cell_size` must be positive; validated by the collision config.
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of non-empty cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Compute cell coordinates for a point.
    #[inline]
    fn cell_coords(&self, point: Vec2) -> CellKey {
        (
            (point.x / self.cell_size).floor() as i32,
            (point.y / self.cell_size).floor() as i32,
        )
    }

    /// Inclusive cell range covered by an AABB.
    fn cell_range(&self, aabb: &Aabb) -> impl Iterator<Item = CellKey> {
        let (min_x, min_y) = self.cell_coords(aabb.min);
        let (max_x, max_y) = self.cell_coords(aabb.max);
        (min_x..=max_x).flat_map(move |cx| (min_y..=max_y).map(move |cy| (cx, cy)))
    }

    /// Add a body to every cell its AABB covers.
    pub fn insert(&mut self, handle: BodyHandle, aabb: &Aabb) {
        for key in self.cell_range(aabb) {
            let cell = self.cells.entry(key).or_default();
            if !cell.contains(&handle) {
                cell.push(handle);
            }
        }
    }

    /// Remove a body from every cell, dropping cells left empty.
    pub fn remove(&mut self, handle: BodyHandle) {
        self.cells.retain(|_, cell| {
            cell.retain(|h| *h != handle);
            !cell.is_empty()
        });
    }

    /// Bodies sharing a cell with `aabb`, excluding `handle` itself.
    ///
    /// Returned sorted and deduplicated so iteration order is deterministic.
    pub fn query_nearby(&self, handle: BodyHandle, aabb: &Aabb) -> Vec<BodyHandle> {
        let mut nearby = self.query_aabb(aabb);
        nearby.retain(|h| *h != handle);
        nearby
    }

    /// Bodies in every cell `aabb` covers, sorted and deduplicated.
    pub fn query_aabb(&self, aabb: &Aabb) -> Vec<BodyHandle> {
        let mut found = Vec::new();
        for key in self.cell_range(aabb) {
            if let Some(cell) = self.cells.get(&key) {
                found.extend_from_slice(cell);
            }
        }
        found.sort_unstable();
        found.dedup();
        found
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Clear and re-insert every body.
    pub fn rebuild<'a>(&mut self, entries: impl IntoIterator<Item = (BodyHandle, &'a Aabb)>) {
        self.clear();
        for (handle, aabb) in entries {
            self.insert(handle, aabb);
        }
    }
}
