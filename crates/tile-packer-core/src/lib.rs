//! Core library for placing rectangular tiles onto fixed-size canvases.
//!
//! - Placement: smallest free area first, kept in an arena-backed list sorted by a size metric
//! - Rotation fallback: a tile is turned 90° only when it does not fit upright
//! - Overflow: stop, skip, or open additional canvases (`FailPolicy`)
//! - Optional shrinking of the last canvas toward the area its tiles cover
//! - Geometry only: tiles carry sizes and positions, never pixels
//!
//! Quick example:
//! ```
//! use tile_packer_core::prelude::*;
//! # fn main() -> tile_packer_core::Result<()> {
//! let mut session = PackingSession::with_tiles([(60, 40), (50, 50)], 100, 100)?;
//! session.set_options(PackerOptions::builder().sort_by(SortMetric::Area).build());
//! let packed = session.pack()?;
//! assert_eq!(packed, 2);
//! let t = session.tile(1)?;
//! println!("tile 1 at ({}, {}) on canvas {:?}", t.x, t.y, t.canvas_index);
//! # Ok(()) }
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod packer;
pub mod portfolio;
pub mod session;
pub mod shrink;

pub use config::*;
pub use error::*;
pub use model::*;
pub use portfolio::*;
pub use session::*;

/// Convenience prelude for common types and functions.
/// Importing `tile_packer_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{FailPolicy, PackerOptions, PackerOptionsBuilder, SortMetric};
    pub use crate::error::{Result, TilePackerError};
    pub use crate::model::{PackResult, PackStats, Rect, Tile};
    pub use crate::portfolio::{PortfolioConfig, PortfolioOutcome, pack_portfolio};
    pub use crate::session::PackingSession;
}
