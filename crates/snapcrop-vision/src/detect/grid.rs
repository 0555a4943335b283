// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Density grid: summarises the paper mask as fixed-size cells.
//
// Ink on the paper darkens individual pixels, which fragments a per-pixel
// mask. A cell only needs `min_cell_density` paper pixels to count as paper,
// so a drawing does not punch holes in the detected sheet.

use tracing::debug;

use super::ScanError;
use super::classify::PaperMask;
use super::rect::GridRect;

/// One cell of the density grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityCell {
    pub column: u32,
    pub row: u32,
    /// Pixel bounds, `x2`/`y2` exclusive. Edge cells may be smaller than the
    /// nominal cell size.
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
    /// Fraction of paper pixels in the cell (0-1).
    pub density: f64,
    pub is_paper: bool,
}

/// Row-major grid of `DensityCell`s covering the whole image.
#[derive(Debug, Clone)]
pub struct DensityGrid {
    columns: u32,
    rows: u32,
    cell_size: u32,
    cells: Vec<DensityCell>,
}

impl DensityGrid {
    /// Partition `mask` into `cell_size` squares and measure each one.
    pub fn build(mask: &PaperMask, cell_size: u32, min_density: f64) -> Result<Self, ScanError> {
        if cell_size == 0 {
            return Err(ScanError::InvalidCellSize);
        }
        let (width, height) = (mask.width(), mask.height());
        let expected = width as usize * height as usize;
        if mask.flags().len() != expected {
            return Err(ScanError::MaskSizeMismatch {
                expected,
                actual: mask.flags().len(),
            });
        }

        let columns = width.div_ceil(cell_size);
        let rows = height.div_ceil(cell_size);
        let integral = compute_integral_mask(mask);

        let mut cells = Vec::with_capacity(columns as usize * rows as usize);
        for row in 0..rows {
            for column in 0..columns {
                let x1 = column * cell_size;
                let y1 = row * cell_size;
                let x2 = ((column + 1) * cell_size).min(width);
                let y2 = ((row + 1) * cell_size).min(height);

                let total = (x2 - x1) as u64 * (y2 - y1) as u64;
                let paper = region_count(&integral, width, x1, y1, x2, y2);
                let density = if total > 0 {
                    paper as f64 / total as f64
                } else {
                    0.0
                };

                cells.push(DensityCell {
                    column,
                    row,
                    x1,
                    y1,
                    x2,
                    y2,
                    density,
                    is_paper: density >= min_density,
                });
            }
        }

        debug!(
            columns,
            rows,
            paper_cells = cells.iter().filter(|c| c.is_paper).count(),
            "Density grid built"
        );
        Ok(Self {
            columns,
            rows,
            cell_size,
            cells,
        })
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    pub fn cells(&self) -> &[DensityCell] {
        &self.cells
    }

    pub fn cell(&self, row: u32, column: u32) -> Option<&DensityCell> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        self.cells.get((row * self.columns + column) as usize)
    }

    /// The cells of one grid row, left to right.
    pub fn row(&self, row: u32) -> &[DensityCell] {
        let start = (row * self.columns) as usize;
        &self.cells[start..start + self.columns as usize]
    }

    /// Mean density of the cells inside `rect`.
    pub fn mean_density(&self, rect: &GridRect) -> Result<f64, ScanError> {
        let out_of_grid = rect.width == 0
            || rect.height == 0
            || rect.column + rect.width > self.columns
            || rect.row + rect.height > self.rows;
        if out_of_grid {
            return Err(ScanError::RectOutOfGrid {
                rect: *rect,
                columns: self.columns,
                rows: self.rows,
            });
        }

        let total: f64 = (rect.row..rect.row + rect.height)
            .flat_map(|row| {
                let start = rect.column as usize;
                self.row(row)[start..start + rect.width as usize].iter()
            })
            .map(|cell| cell.density)
            .sum();
        Ok(total / rect.area() as f64)
    }
}

// -- Integral mask helpers ----------------------------------------------------

/// Summed-area table of the mask: `table[y * (width+1) + x]` is the number of
/// paper pixels in `[0, x) x [0, y)`. Counts are `u32`, which covers any image below 4 Gpx.
fn compute_integral_mask(mask: &PaperMask) -> Vec<u32> {
    let (w, h) = (mask.width() as usize, mask.height() as usize);
    let stride = w + 1;
    let mut table = vec![0u32; stride * (h + 1)];
    let flags = mask.flags();

    for y in 0..h {
        let mut row_sum = 0u32;
        for x in 0..w {
            row_sum += flags[y * w + x] as u32;
            table[(y + 1) * stride + x + 1] = row_sum + table[y * stride + x + 1];
        }
    }
    table
}

/// Paper pixels in `[x1, x2) x [y1, y2)`.
fn region_count(integral: &[u32], width: u32, x1: u32, y1: u32, x2: u32, y2: u32) -> u32 {
    let stride = (width + 1) as usize;
    let (x1, y1, x2, y2) = (x1 as usize, y1 as usize, x2 as usize, y2 as usize);
    // Each difference is a non-negative strip count, so nothing overflows.
    (integral[y2 * stride + x2] - integral[y2 * stride + x1])
        - (integral[y1 * stride + x2] - integral[y1 * stride + x1])
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mask of `width x height` whose paper pixels are given by `paper(x, y)`.
    fn mask_from(width: u32, height: u32, paper: impl Fn(u32, u32) -> bool) -> PaperMask {
        let flags = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| paper(x, y))
            .collect();
        PaperMask::from_flags(width, height, flags)
    }

    #[test]
    fn grid_dimensions_round_up() {
        let mask = mask_from(100, 81, |_, _| false);
        let grid = DensityGrid::build(&mask, 40, 0.35).unwrap();
        assert_eq!((grid.columns(), grid.rows()), (3, 3));

        // Edge cells are clipped to the image.
        let corner = grid.cell(2, 2).unwrap();
        assert_eq!((corner.x1, corner.y1, corner.x2, corner.y2), (80, 80, 100, 81));
    }

    #[test]
    fn density_counts_only_pixels_inside_cell() {
        // Left half of a 20x10 image is paper.
        let mask = mask_from(20, 10, |x, _| x < 10);
        let grid = DensityGrid::build(&mask, 10, 0.35).unwrap();
        assert_eq!(grid.cell(0, 0).unwrap().density, 1.0);
        assert_eq!(grid.cell(0, 1).unwrap().density, 0.0);
        assert!(grid.cell(0, 0).unwrap().is_paper);
        assert!(!grid.cell(0, 1).unwrap().is_paper);
    }

    #[test]
    fn small_edge_cell_density_uses_its_own_area() {
        // 45 px wide: the last column is 5 px wide and fully paper.
        let mask = mask_from(45, 40, |x, _| x >= 40);
        let grid = DensityGrid::build(&mask, 40, 0.35).unwrap();
        assert_eq!(grid.cell(0, 1).unwrap().density, 1.0);
        assert!((grid.cell(0, 0).unwrap().density).abs() < 1e-12);
    }

    #[test]
    fn threshold_is_inclusive() {
        // 35 of 100 pixels are paper: exactly the default threshold.
        let mask = mask_from(10, 10, |x, y| y * 10 + x < 35);
        let grid = DensityGrid::build(&mask, 10, 0.35).unwrap();
        assert!(grid.cell(0, 0).unwrap().is_paper);
    }

    #[test]
    fn mean_density_over_rect() {
        let mask = mask_from(40, 20, |x, _| x < 20 || x >= 30);
        let grid = DensityGrid::build(&mask, 10, 0.35).unwrap();
        let rect = GridRect {
            column: 1,
            row: 0,
            width: 3,
            height: 2,
        };
        // Columns 1, 2, 3 have densities 1, 0, 1.
        assert!((grid.mean_density(&rect).unwrap() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn mean_density_rejects_rect_outside_grid() {
        let grid = DensityGrid::build(&mask_from(20, 20, |_, _| true), 10, 0.35).unwrap();
        let rect = GridRect {
            column: 1,
            row: 1,
            width: 2,
            height: 1,
        };
        assert!(matches!(
            grid.mean_density(&rect),
            Err(ScanError::RectOutOfGrid { .. })
        ));
    }

    #[test]
    fn integral_table_counts_paper_pixels() {
        // Checkerboard: every other pixel is paper.
        let mask = mask_from(6, 4, |x, y| (x + y) % 2 == 0);
        let integral = compute_integral_mask(&mask);

        assert_eq!(integral.len(), 7 * 5);
        assert_eq!(integral[4 * 7 + 6], 12);
        assert_eq!(region_count(&integral, 6, 0, 0, 6, 4), 12);
        assert_eq!(region_count(&integral, 6, 1, 1, 3, 3), 2);
        assert_eq!(region_count(&integral, 6, 2, 0, 3, 1), 1);
    }

    #[test]
    fn zero_cell_size_is_an_error() {
        let mask = mask_from(4, 4, |_, _| true);
        assert_eq!(
            DensityGrid::build(&mask, 0, 0.35).unwrap_err(),
            ScanError::InvalidCellSize
        );
    }

    #[test]
    fn mismatched_mask_is_an_error() {
        let mask = PaperMask::from_flags(4, 4, vec![true; 3]);
        assert!(matches!(
            DensityGrid::build(&mask, 2, 0.35),
            Err(ScanError::MaskSizeMismatch { expected: 16, actual: 3 })
        ));
    }
}
