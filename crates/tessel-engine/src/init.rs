//! Initial conditions.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use tessel_grid::{Decomposition, Tile};
use tessel_io::{read_tile_block, IoError};

/// How a rank fills its tile before the first step.
#[derive(Clone, Debug, PartialEq)]
pub enum InitialCondition {
    /// Leave the tile at zero.
    ConstantZero,
    /// Every interior cell set to one value.
    Constant(f64),
    /// A Gaussian bump `A · exp(-r² / 2σ²)` with `σ = sigma_frac · min(Lx, Ly)`
    /// centred at `(xc_frac · Lx, yc_frac · Ly)`.
    GaussianHotspot {
        /// Peak value.
        amplitude: f64,
        /// Width relative to the shorter domain side.
        sigma_frac: f64,
        /// Centre x relative to `Lx`.
        xc_frac: f64,
        /// Centre y relative to `Ly`.
        yc_frac: f64,
    },
    /// Global row-major little-endian `f64` field; each rank reads its block.
    BinaryFile(PathBuf),
}

impl InitialCondition {
    /// The default hotspot: unit amplitude, `σ = 0.05 · min(Lx, Ly)`,
    /// centred in the domain.
    pub fn hotspot() -> Self {
        Self::GaussianHotspot {
            amplitude: 1.0,
            sigma_frac: 0.05,
            xc_frac: 0.5,
            yc_frac: 0.5,
        }
    }

    /// Fill `tile`'s interior for the rank described by `decomp`.
    ///
    /// Coordinates are cell-centred in global space, so every rank computes
    /// the same field a single rank would. Ghost cells are not touched.
    pub fn apply(&self, tile: &mut Tile, decomp: &Decomposition) -> Result<(), IoError> {
        match self {
            Self::ConstantZero => {}
            Self::Constant(value) => tile.fill_interior(*value),
            Self::GaussianHotspot {
                amplitude,
                sigma_frac,
                xc_frac,
                yc_frac,
            } => {
                let (dx, dy) = (tile.dx(), tile.dy());
                let lx = decomp.nx_global() as f64 * dx;
                let ly = decomp.ny_global() as f64 * dy;
                let sigma = sigma_frac * lx.min(ly);
                let (xc, yc) = (xc_frac * lx, yc_frac * ly);
                let h = tile.halo();
                for j in 0..decomp.ny_local() {
                    let y = (decomp.y_offset() + j) as f64 * dy + 0.5 * dy;
                    for i in 0..decomp.nx_local() {
                        let x = (decomp.x_offset() + i) as f64 * dx + 0.5 * dx;
                        let r2 = (x - xc).powi(2) + (y - yc).powi(2);
                        tile[(h + i, h + j)] = amplitude * (-r2 / (2.0 * sigma * sigma)).exp();
                    }
                }
            }
            Self::BinaryFile(path) => {
                let file = BufReader::new(File::open(path)?);
                read_tile_block(file, &decomp.layout(tile.halo()), tile)?;
            }
        }
        Ok(())
    }
}
