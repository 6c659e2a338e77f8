//! Average color and error score of a rectangular region.

use serde::{Deserialize, Serialize};

use crate::region::Region;
use crate::source::PixelSource;

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const TRANSPARENT: Rgba8 = Rgba8::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Rgba8 {
        Rgba8 { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Rgba8 {
        Rgba8 { r, g, b, a: 255 }
    }
}

/// Per-channel mean squared deviation from the region average.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChannelError {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

/// Result of one statistics pass over a region.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RegionStats {
    pub color: Rgba8,
    pub error: ChannelError,
}

/// Alpha-corrected sample: premultiplied channels divided by the pixel's own
/// sqrt(alpha) contribution, alpha itself contributing sqrt(alpha).
///
/// A zero-alpha premultiplied pixel carries zero channels; it contributes
/// nothing to any accumulator.
#[inline]
fn corrected(pixel: [u16; 4]) -> [f64; 4] {
    if pixel[3] == 0 {
        return [0.0; 4];
    }
    let a_sqrt = (pixel[3] as f64).sqrt();
    [
        pixel[0] as f64 / a_sqrt,
        pixel[1] as f64 / a_sqrt,
        pixel[2] as f64 / a_sqrt,
        a_sqrt,
    ]
}

/// Single final rounding from the floating point accumulators to 8 bits.
#[inline]
fn quantize(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Average color and per-channel error score for `region`.
///
/// Channel samples accumulate in `f64`, are normalized by the region area and
/// quantized to 8 bits exactly once. The error pass then measures the squared
/// deviation of each corrected sample from that quantized average, normalized
/// by `2 * area`.
pub fn region_stats<S: PixelSource>(source: &S, region: Region) -> RegionStats {
    debug_assert!(
        region.max_x <= source.width() && region.max_y <= source.height(),
        "region {region:?} exceeds source {}x{}",
        source.width(),
        source.height()
    );

    let area = region.area() as f64;

    let mut sum = [0.0f64; 4];
    for y in region.min_y..region.max_y {
        for x in region.min_x..region.max_x {
            let sample = corrected(source.pixel(x, y));
            for (acc, channel) in sum.iter_mut().zip(sample) {
                *acc += channel;
            }
        }
    }

    let color = Rgba8::new(
        quantize(sum[0] / area),
        quantize(sum[1] / area),
        quantize(sum[2] / area),
        quantize(sum[3] / area),
    );

    let average = [
        color.r as f64,
        color.g as f64,
        color.b as f64,
        color.a as f64,
    ];
    let mut deviation = [0.0f64; 4];
    for y in region.min_y..region.max_y {
        for x in region.min_x..region.max_x {
            let sample = corrected(source.pixel(x, y));
            for ((acc, avg), channel) in deviation.iter_mut().zip(average).zip(sample) {
                let diff = avg - channel;
                *acc += diff * diff;
            }
        }
    }

    let norm = 2.0 * area;
    RegionStats {
        color,
        error: ChannelError {
            r: deviation[0] / norm,
            g: deviation[1] / norm,
            b: deviation[2] / norm,
            a: deviation[3] / norm,
        },
    }
}
