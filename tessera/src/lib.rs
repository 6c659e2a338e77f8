//! Tessera - concurrent quadtree image approximation.
//!
//! Approximates a raster image by recursively partitioning it into quadrants
//! and replacing each sufficiently uniform quadrant with its average color.
//!
//! # Algorithm Overview
//!
//! 1. **Statistics**: for each region, compute the alpha-corrected average
//!    color and the per-channel mean squared deviation from it.
//!
//! 2. **Stopping policy**: a region becomes a leaf when it is too small to
//!    split, when its scalar error falls below the configured threshold, or
//!    when the work budget cannot cover four more node creations.
//!
//! 3. **Concurrent construction**: every subdivided quadrant is processed by
//!    its own task; a parent suspends only at the fan-in barrier awaiting its
//!    four children. The work budget strictly bounds total node creations.
//!
//! 4. **Reconstruction**: the finalized leaf set is painted back into a
//!    raster, largest leaves first.
//!
//! ```rust,ignore
//! use tessera::{BuildConfig, QuadTree, RasterSource};
//!
//! let source = RasterSource::from_straight_rgba8(width, height, &rgba_bytes);
//! let tree = QuadTree::build(source, BuildConfig::default()).await?;
//! let raster = tree.render();
//! ```

mod color;
mod config;
mod region;
mod render;
mod source;
mod tree;

#[cfg(test)]
mod tests;

pub use color::{region_stats, ChannelError, RegionStats, Rgba8};
pub use config::{BuildConfig, ConfigError, ErrorMetric};
pub use region::Region;
pub use render::render;
pub use source::{PixelSource, RasterSource};
pub use tree::{BuildError, BuildStats, Leaf, LeafCause, Node, NodeId, NodeState, QuadTree};
