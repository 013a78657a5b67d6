//! Piecewise-constant height field over the container floor.
//!
//! The floor is cut by sorted breakpoint lists along x and z. Each cell of
//! the resulting grid carries the height of the top surface above it. Every
//! placed footprint edge is a breakpoint, so a cell is either fully under a
//! footprint or fully outside it.

/// Tolerance used when locating cells under a footprint.
pub const GRID_EPS: f64 = 1e-12;

/// Height field with adaptive breakpoints.
#[derive(Debug, Clone)]
pub struct HeightGrid {
    width: f64,
    depth: f64,
    xs: Vec<f64>,
    zs: Vec<f64>,
    /// Row-major, `(xs.len() - 1) * (zs.len() - 1)` cells.
    heights: Vec<f64>,
}

impl HeightGrid {
    /// Creates a flat grid covering a `width × depth` floor.
    pub fn new(width: f64, depth: f64) -> Self {
        Self {
            width,
            depth,
            xs: vec![0.0, width],
            zs: vec![0.0, depth],
            heights: vec![0.0],
        }
    }

    /// Breakpoints along x, ascending, from 0 to the width.
    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    /// Breakpoints along z, ascending, from 0 to the depth.
    pub fn zs(&self) -> &[f64] {
        &self.zs
    }

    /// Number of cells.
    pub fn cell_count(&self) -> usize {
        self.heights.len()
    }

    /// Height of cell `(a, b)`.
    pub fn height_at(&self, a: usize, b: usize) -> f64 {
        self.heights[a * self.z_cells() + b]
    }

    /// Highest cell of the whole grid.
    pub fn max_height(&self) -> f64 {
        self.heights.iter().copied().fold(0.0, f64::max)
    }

    /// Highest surface under the footprint `[x0, x1] × [z0, z1]`.
    pub fn max_over(&self, x0: f64, x1: f64, z0: f64, z1: f64) -> f64 {
        if x1 <= x0 || z1 <= z0 {
            return 0.0;
        }
        let (xa, xb, za, zb) = self.cell_range(x0, x1, z0, z1);
        let mut max = 0.0;
        for a in xa..=xb {
            for b in za..=zb {
                max = f64::max(max, self.height_at(a, b));
            }
        }
        max
    }

    /// Raises every cell under the footprint to `height`.
    pub fn set_over(&mut self, x0: f64, x1: f64, z0: f64, z1: f64, height: f64) {
        let (xa, xb, za, zb) = self.cell_range(x0, x1, z0, z1);
        let nz = self.z_cells();
        for a in xa..=xb {
            for b in za..=zb {
                self.heights[a * nz + b] = height;
            }
        }
    }

    /// Adds the footprint edges as breakpoints.
    ///
    /// Returns `false` when all four were already present. Otherwise the grid
    /// is rebuilt: each new cell takes the height of the old cell containing
    /// its midpoint.
    pub fn insert_breakpoints(&mut self, x0: f64, x1: f64, z0: f64, z1: f64) -> bool {
        let mut xs = self.xs.clone();
        let mut zs = self.zs.clone();

        let mut changed = false;
        for x in [x0, x1] {
            changed |= insert_sorted(&mut xs, x.clamp(0.0, self.width));
        }
        for z in [z0, z1] {
            changed |= insert_sorted(&mut zs, z.clamp(0.0, self.depth));
        }
        if !changed {
            return false;
        }

        let nz = zs.len() - 1;
        let mut heights = Vec::with_capacity((xs.len() - 1) * nz);
        for xw in xs.windows(2) {
            let old_a = find_interval(&self.xs, 0.5 * (xw[0] + xw[1]), self.width);
            for zw in zs.windows(2) {
                let old_b = find_interval(&self.zs, 0.5 * (zw[0] + zw[1]), self.depth);
                heights.push(self.height_at(old_a, old_b));
            }
        }

        self.xs = xs;
        self.zs = zs;
        self.heights = heights;
        true
    }

    fn z_cells(&self) -> usize {
        self.zs.len() - 1
    }

    /// Inclusive cell index ranges under a footprint. Edges are nudged
    /// inward so that cells merely touching the footprint are excluded.
    fn cell_range(&self, x0: f64, x1: f64, z0: f64, z1: f64) -> (usize, usize, usize, usize) {
        (
            find_interval(&self.xs, x0 + GRID_EPS, self.width),
            find_interval(&self.xs, x1 - GRID_EPS, self.width),
            find_interval(&self.zs, z0 + GRID_EPS, self.depth),
            find_interval(&self.zs, z1 - GRID_EPS, self.depth),
        )
    }
}

/// Index `i` of the interval `[brk[i], brk[i + 1])` holding `coord`.
fn find_interval(breakpoints: &[f64], coord: f64, upper: f64) -> usize {
    let last = breakpoints.len().saturating_sub(2);
    let coord = coord.max(breakpoints[0]).min(upper - GRID_EPS);
    breakpoints
        .partition_point(|&b| b <= coord)
        .saturating_sub(1)
        .min(last)
}

/// Inserts `value` keeping the list sorted; returns `false` if present.
fn insert_sorted(list: &mut Vec<f64>, value: f64) -> bool {
    match list.binary_search_by(|v| v.total_cmp(&value)) {
        Ok(_) => false,
        Err(pos) => {
            list.insert(pos, value);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_flat() {
        let grid = HeightGrid::new(10.0, 8.0);
        assert_eq!(grid.xs(), &[0.0, 10.0]);
        assert_eq!(grid.zs(), &[0.0, 8.0]);
        assert_eq!(grid.cell_count(), 1);
        assert_eq!(grid.max_over(0.0, 10.0, 0.0, 8.0), 0.0);
    }

    #[test]
    fn test_insert_and_raise() {
        let mut grid = HeightGrid::new(10.0, 10.0);
        assert!(grid.insert_breakpoints(0.0, 4.0, 0.0, 3.0));
        grid.set_over(0.0, 4.0, 0.0, 3.0, 5.0);

        assert_eq!(grid.xs(), &[0.0, 4.0, 10.0]);
        assert_eq!(grid.zs(), &[0.0, 3.0, 10.0]);
        assert_eq!(grid.cell_count(), 4);
        assert_eq!(grid.max_over(0.0, 4.0, 0.0, 3.0), 5.0);
        // Touching the raised block along an edge does not count.
        assert_eq!(grid.max_over(4.0, 10.0, 0.0, 10.0), 0.0);
        assert_eq!(grid.max_over(0.0, 10.0, 3.0, 10.0), 0.0);
        // Partially covering it does.
        assert_eq!(grid.max_over(3.0, 6.0, 2.0, 5.0), 5.0);
        assert_eq!(grid.max_height(), 5.0);
    }

    #[test]
    fn test_existing_breakpoints_do_not_rebuild() {
        let mut grid = HeightGrid::new(10.0, 10.0);
        assert!(grid.insert_breakpoints(0.0, 5.0, 0.0, 5.0));
        assert!(!grid.insert_breakpoints(0.0, 5.0, 5.0, 10.0));
        assert_eq!(grid.cell_count(), 4);
    }

    #[test]
    fn test_rebuild_resamples_heights() {
        let mut grid = HeightGrid::new(10.0, 10.0);
        grid.insert_breakpoints(0.0, 6.0, 0.0, 10.0);
        grid.set_over(0.0, 6.0, 0.0, 10.0, 2.0);

        // Splitting the raised region keeps its height on both sides.
        assert!(grid.insert_breakpoints(2.0, 8.0, 4.0, 10.0));
        assert_eq!(grid.xs(), &[0.0, 2.0, 6.0, 8.0, 10.0]);
        assert_eq!(grid.zs(), &[0.0, 4.0, 10.0]);
        for b in 0..2 {
            assert_eq!(grid.height_at(0, b), 2.0);
            assert_eq!(grid.height_at(1, b), 2.0);
            assert_eq!(grid.height_at(2, b), 0.0);
            assert_eq!(grid.height_at(3, b), 0.0);
        }
    }

    #[test]
    fn test_out_of_range_edges_are_clamped() {
        let mut grid = HeightGrid::new(10.0, 10.0);
        grid.insert_breakpoints(5.0, 10.0 + 1e-13, 0.0, 10.0);
        assert_eq!(grid.xs(), &[0.0, 5.0, 10.0]);
        assert_eq!(*grid.xs().last().unwrap(), 10.0);
    }

    #[test]
    fn test_degenerate_footprint() {
        let grid = HeightGrid::new(10.0, 10.0);
        assert_eq!(grid.max_over(3.0, 3.0, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_find_interval() {
        let brk = [0.0, 2.0, 5.0, 10.0];
        assert_eq!(find_interval(&brk, 0.0, 10.0), 0);
        assert_eq!(find_interval(&brk, 2.0, 10.0), 1);
        assert_eq!(find_interval(&brk, 4.999, 10.0), 1);
        assert_eq!(find_interval(&brk, 10.0, 10.0), 2);
        assert_eq!(find_interval(&brk, -1.0, 10.0), 0);
    }
}
