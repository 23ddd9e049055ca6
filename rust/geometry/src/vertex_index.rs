// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Nearest-vertex lookup
//!
//! The linear scan is the reference behaviour: the smallest squared distance
//! wins and ties go to the lowest vertex index. [`VertexGrid`] is a uniform
//! spatial hash that returns exactly the same index, used when a buffer is
//! large enough for the O(n) scan per query to matter.

use crate::buffer::GeometryBuffer;
use nalgebra::Point3;
use rustc_hash::FxHashMap;

#[inline]
fn distance_squared(positions: &[f32], index: usize, point: &Point3<f64>) -> f64 {
    let base = index * 3;
    let dx = positions[base] as f64 - point.x;
    let dy = positions[base + 1] as f64 - point.y;
    let dz = positions[base + 2] as f64 - point.z;
    dx * dx + dy * dy + dz * dz
}

/// Index of the vertex closest to `point` by linear scan; first minimum wins
pub fn nearest_vertex_index(buffer: &GeometryBuffer, point: &Point3<f64>) -> Option<usize> {
    nearest_in_positions(&buffer.positions, point)
}

/// Linear scan over a flat `[x, y, z, ...]` position array
pub fn nearest_in_positions(positions: &[f32], point: &Point3<f64>) -> Option<usize> {
    let mut best: Option<usize> = None;
    let mut best_distance = f64::INFINITY;
    for i in 0..positions.len() / 3 {
        let d = distance_squared(positions, i, point);
        if d < best_distance {
            best_distance = d;
            best = Some(i);
        }
    }
    best
}

type Cell = (i64, i64, i64);

/// Cell coordinates beyond this magnitude are kept out of the grid
const MAX_CELL_COORD: f64 = 1.0e15;

#[inline]
fn vertex(positions: &[f32], index: usize) -> Point3<f64> {
    Point3::new(
        positions[index * 3] as f64,
        positions[index * 3 + 1] as f64,
        positions[index * 3 + 2] as f64,
    )
}

/// Running best candidate; exact ties go to the lower index
struct Nearest {
    index: Option<usize>,
    distance: f64,
}

impl Default for Nearest {
    fn default() -> Self {
        Self {
            index: None,
            distance: f64::INFINITY,
        }
    }
}

impl Nearest {
    #[inline]
    fn offer(&mut self, positions: &[f32], point: &Point3<f64>, index: usize) {
        let d = distance_squared(positions, index, point);
        let closer = d < self.distance;
        let tie_lower = d == self.distance && self.index.map_or(false, |b| index < b);
        if closer || tie_lower {
            self.distance = d;
            self.index = Some(index);
        }
    }
}

/// Cells between `c` and the range `[lo, hi]` along one axis
#[inline]
fn gap(c: i64, lo: i64, hi: i64) -> i64 {
    if c < lo {
        lo.saturating_sub(c)
    } else if c > hi {
        c.saturating_sub(hi)
    } else {
        0
    }
}

/// Uniform grid over a buffer's vertices.
///
/// Vertices with non-finite or out-of-range coordinates are not binned;
/// they are kept in `outliers` and scanned on every query.
pub struct VertexGrid<'a> {
    positions: &'a [f32],
    cell_size: f64,
    cells: FxHashMap<Cell, Vec<u32>>,
    outliers: Vec<u32>,
    min_cell: Cell,
    max_cell: Cell,
}

impl<'a> VertexGrid<'a> {
    /// Build a grid with roughly one vertex per cell
    pub fn new(buffer: &'a GeometryBuffer) -> Self {
        let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);
        let mut finite = 0usize;
        for p in buffer.vertices().filter(|p| p.coords.iter().all(|v| v.is_finite())) {
            min = min.inf(&p);
            max = max.sup(&p);
            finite += 1;
        }
        let extent = if finite > 0 { (max - min).max() } else { 0.0 };
        let per_axis = (finite as f64).cbrt().max(1.0);
        let cell_size = extent / per_axis;
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        Self::with_cell_size(&buffer.positions, cell_size)
    }

    pub fn with_cell_size(positions: &'a [f32], cell_size: f64) -> Self {
        let mut grid = Self {
            positions,
            cell_size,
            cells: FxHashMap::default(),
            outliers: Vec::new(),
            min_cell: (i64::MAX, i64::MAX, i64::MAX),
            max_cell: (i64::MIN, i64::MIN, i64::MIN),
        };
        for i in 0..positions.len() / 3 {
            let Some(cell) = grid.cell_of(&vertex(positions, i)) else {
                grid.outliers.push(i as u32);
                continue;
            };
            grid.min_cell = (
                grid.min_cell.0.min(cell.0),
                grid.min_cell.1.min(cell.1),
                grid.min_cell.2.min(cell.2),
            );
            grid.max_cell = (
                grid.max_cell.0.max(cell.0),
                grid.max_cell.1.max(cell.1),
                grid.max_cell.2.max(cell.2),
            );
            grid.cells.entry(cell).or_default().push(i as u32);
        }
        grid
    }

    /// Cell holding `p`, or `None` when a coordinate is not finite or too
    /// far out to discretize
    #[inline]
    fn cell_of(&self, p: &Point3<f64>) -> Option<Cell> {
        let discretize = |v: f64| {
            let scaled = (v / self.cell_size).floor();
            (scaled.is_finite() && scaled.abs() < MAX_CELL_COORD).then_some(scaled as i64)
        };
        Some((discretize(p.x)?, discretize(p.y)?, discretize(p.z)?))
    }

    /// Same result as [`nearest_in_positions`], visiting rings of cells
    /// outward until no unvisited cell can hold a closer vertex
    pub fn nearest(&self, point: &Point3<f64>) -> Option<usize> {
        let Some(center) = self.cell_of(point) else {
            return nearest_in_positions(self.positions, point);
        };

        let mut best = Nearest::default();
        for &i in &self.outliers {
            best.offer(self.positions, point, i as usize);
        }

        if !self.cells.is_empty() {
            // Rings closer than the occupied box hold no cells
            let first = gap(center.0, self.min_cell.0, self.max_cell.0)
                .max(gap(center.1, self.min_cell.1, self.max_cell.1))
                .max(gap(center.2, self.min_cell.2, self.max_cell.2));
            let reach = [
                center.0.saturating_sub(self.min_cell.0).saturating_abs(),
                center.0.saturating_sub(self.max_cell.0).saturating_abs(),
                center.1.saturating_sub(self.min_cell.1).saturating_abs(),
                center.1.saturating_sub(self.max_cell.1).saturating_abs(),
                center.2.saturating_sub(self.min_cell.2).saturating_abs(),
                center.2.saturating_sub(self.max_cell.2).saturating_abs(),
            ]
            .into_iter()
            .max()
            .unwrap_or(0);

            for ring in first..=reach {
                self.visit_ring(center, ring, |index| best.offer(self.positions, point, index));

                // Everything beyond this ring is at least `ring` cells away
                let bound = ring as f64 * self.cell_size;
                if best.distance.is_finite() && bound * bound > best.distance {
                    break;
                }
            }
        }
        best.index
    }

    /// Visit the occupied cells on the shell at Chebyshev distance `ring`
    /// from `center`, clipped to the occupied box
    fn visit_ring<F: FnMut(usize)>(&self, center: Cell, ring: i64, mut visit: F) {
        let span = |c: i64, lo: i64, hi: i64| (c.saturating_sub(ring).max(lo), c.saturating_add(ring).min(hi));
        let (x0, x1) = span(center.0, self.min_cell.0, self.max_cell.0);
        let (y0, y1) = span(center.1, self.min_cell.1, self.max_cell.1);
        let (z0, z1) = span(center.2, self.min_cell.2, self.max_cell.2);
        let on_shell = |c: i64, centre: i64| c.abs_diff(centre) == ring.unsigned_abs();

        let mut visit_cell = |cell: Cell| {
            if let Some(indices) = self.cells.get(&cell) {
                for &i in indices {
                    visit(i as usize);
                }
            }
        };

        for x in x0..=x1 {
            for y in y0..=y1 {
                if on_shell(x, center.0) || on_shell(y, center.1) {
                    for z in z0..=z1 {
                        visit_cell((x, y, z));
                    }
                } else {
                    for z in [center.2.saturating_sub(ring), center.2.saturating_add(ring)] {
                        if z >= z0 && z <= z1 && on_shell(z, center.2) {
                            visit_cell((x, y, z));
                        }
                    }
                }
            }
        }
    }
}

/// Nearest-vertex lookup that switches to a [`VertexGrid`] above a vertex
/// count threshold
pub struct VertexLookup<'a> {
    positions: &'a [f32],
    grid: Option<VertexGrid<'a>>,
}

impl<'a> VertexLookup<'a> {
    /// `grid_threshold` of `None` always uses the linear scan
    pub fn new(buffer: &'a GeometryBuffer, grid_threshold: Option<usize>) -> Self {
        let grid = match grid_threshold {
            Some(threshold) if buffer.vertex_count() >= threshold => Some(VertexGrid::new(buffer)),
            _ => None,
        };
        Self {
            positions: &buffer.positions,
            grid,
        }
    }

    #[inline]
    pub fn nearest(&self, point: &Point3<f64>) -> Option<usize> {
        match &self.grid {
            Some(grid) => grid.nearest(point),
            None => nearest_in_positions(self.positions, point),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solids::{build_base, BaseSolid};
    use crate::surface::{klein_bottle, tessellate};

    #[test]
    fn test_point_from_buffer_resolves_to_itself() {
        let buffer = build_base(BaseSolid::SixHundredCell, 1.0);
        for i in 0..buffer.vertex_count() {
            let p = buffer.position(i);
            let found = nearest_vertex_index(&buffer, &p).unwrap();
            let q = buffer.position(found);
            assert!((p.x - q.x).abs() < 1e-6);
            assert!((p.y - q.y).abs() < 1e-6);
            assert!((p.z - q.z).abs() < 1e-6);
        }
    }

    #[test]
    fn test_first_minimum_wins() {
        let positions = vec![1.0, 0.0, 0.0, -1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        assert_eq!(nearest_in_positions(&positions, &Point3::origin()), Some(0));
        assert_eq!(nearest_in_positions(&positions, &Point3::new(1.0, 0.0, 0.0)), Some(0));
        assert_eq!(nearest_in_positions(&[], &Point3::origin()), None);
    }

    #[test]
    fn test_grid_matches_linear_scan() {
        // The Klein grid duplicates its seam, so exact ties are common
        let buffer = tessellate(klein_bottle, 24, 16, 0.5).unwrap();
        let grid = VertexGrid::new(&buffer);
        let probes = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.3, -0.2, 0.4),
            Point3::new(-5.0, 5.0, 5.0),
            Point3::new(0.7, 0.7, -0.1),
        ];
        for p in probes.iter().cloned().chain(buffer.vertices()) {
            assert_eq!(grid.nearest(&p), nearest_vertex_index(&buffer, &p), "probe {:?}", p);
        }
    }

    #[test]
    fn test_lookup_threshold() {
        let buffer = build_base(BaseSolid::Icosahedron, 1.0);
        let linear = VertexLookup::new(&buffer, None);
        let gridded = VertexLookup::new(&buffer, Some(1));
        assert!(linear.grid.is_none());
        assert!(gridded.grid.is_some());
        let p = Point3::new(0.1, 0.9, 0.3);
        assert_eq!(linear.nearest(&p), gridded.nearest(&p));
    }

    #[test]
    fn test_grid_skips_non_finite_vertices() {
        let mut buffer = tessellate(klein_bottle, 64, 64, 0.5).unwrap();
        buffer.positions[3 * 10] = f32::INFINITY;
        buffer.positions[3 * 11 + 1] = f32::NEG_INFINITY;
        buffer.positions[3 * 12 + 2] = f32::NAN;
        let grid = VertexGrid::new(&buffer);
        assert_eq!(grid.outliers, vec![10, 11, 12]);

        let probes = [
            Point3::new(0.2, 0.1, -0.3),
            Point3::new(f64::INFINITY, 0.0, 0.0),
            Point3::new(0.0, f64::NAN, 0.0),
            Point3::new(1.0e6, -2.0e6, 3.0e5),
            Point3::new(1.0e30, 0.0, 0.0),
        ];
        for p in probes.iter().cloned().chain(buffer.vertices().step_by(37)) {
            assert_eq!(grid.nearest(&p), nearest_vertex_index(&buffer, &p), "probe {:?}", p);
        }
    }

    #[test]
    fn test_grid_of_only_non_finite_vertices() {
        let positions = [f32::NAN, 0.0, 0.0, f32::INFINITY, 1.0, 1.0];
        let grid = VertexGrid::with_cell_size(&positions, 1.0);
        assert!(grid.cells.is_empty());
        assert_eq!(grid.nearest(&Point3::origin()), None);
        assert_eq!(grid.nearest(&Point3::origin()), nearest_in_positions(&positions, &Point3::origin()));
    }
}
