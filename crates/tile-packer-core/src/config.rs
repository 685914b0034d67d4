//! Packing options.
//! Key notes:
//!   - `sort_by` orders tiles descending and free areas ascending; both always use the same metric
//!   - `fail_policy` decides what happens when a tile does not fit the current canvas
//!   - `shrink_final_canvas` re-packs the last canvas several times, so it costs extra CPU

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Size metric used to rank tiles and to order free areas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortMetric {
    /// `width + height`. Usually the best general choice.
    #[default]
    Perimeter,
    /// `width * height`.
    Area,
    Width,
    Height,
}

impl SortMetric {
    pub const ALL: [SortMetric; 4] = [
        SortMetric::Perimeter,
        SortMetric::Area,
        SortMetric::Width,
        SortMetric::Height,
    ];

    /// Scalar key of a `w x h` rectangle under this metric.
    #[inline]
    pub fn key(self, w: u32, h: u32) -> u64 {
        match self {
            SortMetric::Perimeter => w as u64 + h as u64,
            SortMetric::Area => w as u64 * h as u64,
            SortMetric::Width => w as u64,
            SortMetric::Height => h as u64,
        }
    }
}

impl FromStr for SortMetric {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "p" | "perimeter" => Ok(Self::Perimeter),
            "a" | "area" => Ok(Self::Area),
            "w" | "width" => Ok(Self::Width),
            "h" | "height" => Ok(Self::Height),
            _ => Err(()),
        }
    }
}

/// What to do when a tile does not fit the current canvas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailPolicy {
    /// Stop packing immediately and report how many tiles were processed.
    #[default]
    Stop,
    /// Leave the tile unpacked and keep packing smaller tiles.
    Continue,
    /// Keep packing, then open a new canvas for the tiles that did not fit.
    /// Gives up if a tile does not fit even an empty canvas.
    NewCanvas,
}

impl FromStr for FailPolicy {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stop" => Ok(Self::Stop),
            "continue" | "skip" => Ok(Self::Continue),
            "new" | "new_canvas" | "newcanvas" | "new_image" => Ok(Self::NewCanvas),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct PackerOptions {
    /// Try a 90° rotation when a tile does not fit in its original orientation.
    pub allow_rotation: bool,
    /// Tiles are already ranked by the caller; keep their order as-is.
    pub tiles_presorted: bool,
    /// Re-pack every tile on each `pack()` instead of only the unpacked ones.
    pub always_repack: bool,
    /// Shrink the last canvas toward the area of the tiles placed on it.
    pub shrink_final_canvas: bool,
    pub sort_by: SortMetric,
    pub fail_policy: FailPolicy,
}

/// Builder for `PackerOptions` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PackerOptionsBuilder {
    opts: PackerOptions,
}

impl PackerOptionsBuilder {
    pub fn new() -> Self {
        Self {
            opts: PackerOptions::default(),
        }
    }
    pub fn allow_rotation(mut self, v: bool) -> Self {
        self.opts.allow_rotation = v;
        self
    }
    pub fn tiles_presorted(mut self, v: bool) -> Self {
        self.opts.tiles_presorted = v;
        self
    }
    pub fn always_repack(mut self, v: bool) -> Self {
        self.opts.always_repack = v;
        self
    }
    pub fn shrink_final_canvas(mut self, v: bool) -> Self {
        self.opts.shrink_final_canvas = v;
        self
    }
    pub fn sort_by(mut self, v: SortMetric) -> Self {
        self.opts.sort_by = v;
        self
    }
    pub fn fail_policy(mut self, v: FailPolicy) -> Self {
        self.opts.fail_policy = v;
        self
    }
    pub fn build(self) -> PackerOptions {
        self.opts
    }
}

impl PackerOptions {
    /// Create a fluent builder for `PackerOptions`.
    pub fn builder() -> PackerOptionsBuilder {
        PackerOptionsBuilder::new()
    }
}
