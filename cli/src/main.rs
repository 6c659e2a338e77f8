//! Thin executable shell over the tessera core: decode an image file, build
//! the decomposition, render it, encode the result.

use std::env;
use std::fs;

use anyhow::{bail, Context};

use tessera::{BuildConfig, QuadTree, RasterSource};

mod image_io;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    common::log_setup::setup_logging("info");

    let args: Vec<String> = env::args().skip(1).collect();
    let (input, output, config) = match args.as_slice() {
        [input, output] => (input, output, BuildConfig::default()),
        [input, output, config_path] => {
            let raw = fs::read_to_string(config_path)
                .with_context(|| format!("failed to read config '{config_path}'"))?;
            let config = serde_json::from_str(&raw)
                .with_context(|| format!("invalid config '{config_path}'"))?;
            (input, output, config)
        }
        _ => bail!("usage: tessera-cli <input> <output> [config.json]"),
    };

    let (width, height, data) = image_io::load_rgba8(input)?;
    tracing::info!(input = %input, width, height, "image loaded");
    let source = RasterSource::from_straight_rgba8(width, height, &data);

    let tree = QuadTree::build(source, config).await?;
    let stats = tree.stats();
    tracing::info!(
        nodes = stats.nodes_created,
        leaves = stats.leaf_count,
        max_depth = stats.max_depth,
        elapsed_secs = stats.elapsed_secs,
        "decomposition finished"
    );

    let raster = tree.render();
    image_io::save_rgba8(output, &raster)?;
    tracing::info!(output = %output, "approximation written");

    Ok(())
}
