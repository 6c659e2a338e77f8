//! Read-only pixel access for the build.

use common::Buffer2;

/// Read-only pixel accessor over a fixed-size grid.
///
/// Samples are RGBA in 16-bit range with premultiplied alpha: color channels
/// are pre-scaled by opacity and must be divided out before averaging, which
/// the statistics pass does. Sources are read concurrently by many build
/// tasks and must not require synchronization.
pub trait PixelSource: Send + Sync {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Premultiplied RGBA sample at `(x, y)`. Callers stay in bounds.
    fn pixel(&self, x: u32, y: u32) -> [u16; 4];
}

/// Owned pixel grid backing a build.
#[derive(Debug, Clone)]
pub struct RasterSource {
    pixels: Buffer2<[u16; 4]>,
}

impl RasterSource {
    /// Premultiplied 16-bit samples, row-major.
    pub fn from_premultiplied(width: u32, height: u32, pixels: Vec<[u16; 4]>) -> RasterSource {
        RasterSource {
            pixels: Buffer2::new(width as usize, height as usize, pixels),
        }
    }

    /// Straight (non-premultiplied) 8-bit RGBA bytes, row-major.
    pub fn from_straight_rgba8(width: u32, height: u32, data: &[u8]) -> RasterSource {
        assert_eq!(
            data.len(),
            width as usize * height as usize * 4,
            "expected 4 bytes per pixel"
        );
        let pixels = data
            .chunks_exact(4)
            .map(|px| premultiply(px[0], px[1], px[2], px[3]))
            .collect();
        RasterSource::from_premultiplied(width, height, pixels)
    }
}

impl PixelSource for RasterSource {
    fn width(&self) -> u32 {
        self.pixels.width() as u32
    }

    fn height(&self) -> u32 {
        self.pixels.height() as u32
    }

    #[inline]
    fn pixel(&self, x: u32, y: u32) -> [u16; 4] {
        *self.pixels.get(x as usize, y as usize)
    }
}

/// Widen a straight 8-bit sample to the premultiplied 16-bit convention.
fn premultiply(r: u8, g: u8, b: u8, a: u8) -> [u16; 4] {
    let a16 = a as u32 * 0x101;
    let scale = |c: u8| ((c as u32 * 0x101 * a16 + 0x7fff) / 0xffff) as u16;
    [scale(r), scale(g), scale(b), a16 as u16]
}
