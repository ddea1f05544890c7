// THEORY:
// The `GridManager` is the bridge between a raw frame and the nine per-cell colors the
// rest of the pipeline works on. The player holds the cube face inside a centered
// square guide, so the grid geometry is a pure function of the frame size.
//
// Key architectural principles:
// 1.  **Geometry**: The guide square spans `grid_fraction` (0.4) of the frame's
//     shorter side, centered. It is split into 3×3 cells; each cell center is floored
//     to a whole pixel and the sampling radius is `radius_fraction` (0.32) of a cell's
//     side, which stays well inside the sticker.
// 2.  **Orchestration**: It is not an analyzer itself. It owns the geometry and one
//     precomputed `SampleDisk`, and runs the sampler once per cell.
// 3.  **Ordering**: Cells are always produced row-major, top-left to bottom-right.
//     Pattern comparison downstream is positional, so this order is part of the
//     contract.
// 4.  **Reuse**: A manager depends only on the frame size and config, so a caller
//     scanning repeatedly at one resolution can keep it around. It holds no
//     per-frame state.

use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::core_modules::sampler::{CellCenter, SampleDisk, SamplerConfig};
use serde::{Deserialize, Serialize};

/// Cells per side of the pattern grid.
pub const GRID_SIDE: usize = 3;
/// Cells in the pattern grid.
pub const CELL_COUNT: usize = GRID_SIDE * GRID_SIDE;

/// Where the guide square sits in the frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Side of the guide square as a fraction of the frame's shorter side.
    pub grid_fraction: f64,
    /// Sampling radius as a fraction of one cell's side.
    pub radius_fraction: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            grid_fraction: 0.4,
            radius_fraction: 0.32,
        }
    }
}

/// The nine cell centers and the sampling radius for one frame size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    pub centers: [CellCenter; CELL_COUNT],
    pub radius: f64,
}

impl GridGeometry {
    pub fn for_frame(width: u32, height: u32, config: &GridConfig) -> Self {
        let center_x = width as f64 / 2.0;
        let center_y = height as f64 / 2.0;
        let grid_size = width.min(height) as f64 * config.grid_fraction;
        let cell_size = grid_size / GRID_SIDE as f64;

        let centers = std::array::from_fn(|index| {
            let row = (index / GRID_SIDE) as f64;
            let col = (index % GRID_SIDE) as f64;
            let x = center_x - grid_size / 2.0 + col * cell_size + cell_size / 2.0;
            let y = center_y - grid_size / 2.0 + row * cell_size + cell_size / 2.0;
            CellCenter::new(x.floor() as i64, y.floor() as i64)
        });

        Self {
            centers,
            radius: cell_size * config.radius_fraction,
        }
    }
}

/// Samples the nine cells of a frame.
pub struct GridManager {
    centers: [CellCenter; CELL_COUNT],
    disk: SampleDisk,
    trim_fraction: f64,
}

impl GridManager {
    pub fn new(centers: [CellCenter; CELL_COUNT], radius: f64, sampler: &SamplerConfig) -> Self {
        Self {
            centers,
            disk: SampleDisk::new(radius, sampler.sigma_ratio),
            trim_fraction: sampler.trim_fraction,
        }
    }

    pub fn from_geometry(geometry: &GridGeometry, sampler: &SamplerConfig) -> Self {
        Self::new(geometry.centers, geometry.radius, sampler)
    }

    pub fn centers(&self) -> &[CellCenter; CELL_COUNT] {
        &self.centers
    }

    /// One raw color per cell, row-major.
    pub fn sample_frame(&self, buffer: &PixelBuffer) -> [Pixel; CELL_COUNT] {
        self.centers
            .map(|center| self.disk.sample(buffer, center, self.trim_fraction))
    }
}
