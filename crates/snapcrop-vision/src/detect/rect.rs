// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Maximal rectangle finder: largest axis-aligned rectangle of paper cells.
//
// Classic "maximal rectangle in a binary matrix": every grid row turns the
// column run-lengths of paper cells into a histogram, and the largest
// rectangle under each histogram is found with a monotonic stack.
//
// Ties keep the rectangle found first (rows top to bottom, stack pop order
// within a row). Two equally large sheets resolve to whichever is scanned
// first.

use super::grid::DensityGrid;

/// A rectangle of grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridRect {
    /// Leftmost cell column.
    pub column: u32,
    /// Topmost cell row.
    pub row: u32,
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
}

impl GridRect {
    /// Area in cells.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Whether both sides span at least `min_cells` cells.
    pub fn spans_at_least(&self, min_cells: u32) -> bool {
        self.width >= min_cells && self.height >= min_cells
    }
}

/// Largest rectangle under a histogram whose bars end on `bottom_row`.
///
/// Returns `None` when every bar has height zero.
pub fn largest_in_histogram(heights: &[u32], bottom_row: u32) -> Option<GridRect> {
    let n = heights.len();
    let mut stack: Vec<usize> = Vec::with_capacity(n + 1);
    let mut best: Option<GridRect> = None;
    let mut best_area = 0u64;

    // The extra iteration with height 0 flushes the stack.
    for i in 0..=n {
        let current = if i == n { 0 } else { heights[i] };

        while let Some(&top) = stack.last() {
            if heights[top] <= current {
                break;
            }
            stack.pop();

            let height = heights[top];
            let (left, width) = match stack.last() {
                Some(&below) => (below + 1, i - below - 1),
                None => (0, i),
            };
            let area = height as u64 * width as u64;
            if area > best_area {
                best_area = area;
                best = Some(GridRect {
                    column: left as u32,
                    row: bottom_row + 1 - height,
                    width: width as u32,
                    height,
                });
            }
        }
        if i < n {
            stack.push(i);
        }
    }
    best
}

/// Largest rectangle of `is_paper` cells in `grid`.
pub fn find_largest_rectangle(grid: &DensityGrid) -> Option<GridRect> {
    let mut heights = vec![0u32; grid.columns() as usize];
    let mut best: Option<GridRect> = None;

    for row in 0..grid.rows() {
        for (height, cell) in heights.iter_mut().zip(grid.row(row)) {
            *height = if cell.is_paper { *height + 1 } else { 0 };
        }

        if let Some(candidate) = largest_in_histogram(&heights, row) {
            let better = best.is_none_or(|current| candidate.area() > current.area());
            if better {
                best = Some(candidate);
            }
        }
    }
    best
}
