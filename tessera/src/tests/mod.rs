
use common::Buffer2;

use crate::{RasterSource, Rgba8};

/// Solid straight-RGBA source.
pub(crate) fn solid_source(width: u32, height: u32, color: Rgba8) -> RasterSource {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for _ in 0..width * height {
        data.extend_from_slice(&[color.r, color.g, color.b, color.a]);
    }
    RasterSource::from_straight_rgba8(width, height, &data)
}

/// Opaque checkerboard of alternating black and white pixels, black at (0, 0).
pub(crate) fn checkerboard_source(width: u32, height: u32) -> RasterSource {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let value = checkerboard_value(x, y);
            data.extend_from_slice(&[value, value, value, 255]);
        }
    }
    RasterSource::from_straight_rgba8(width, height, &data)
}

pub(crate) fn checkerboard_value(x: u32, y: u32) -> u8 {
    if (x + y) % 2 == 0 {
        0
    } else {
        255
    }
}

pub(crate) fn expected_checkerboard_raster(width: u32, height: u32) -> Buffer2<Rgba8> {
    let mut raster = Buffer2::new_filled(width as usize, height as usize, Rgba8::TRANSPARENT);
    for y in 0..height {
        for x in 0..width {
            let value = checkerboard_value(x, y);
            raster[(x as usize, y as usize)] = Rgba8::opaque(value, value, value);
        }
    }
    raster
}

/// Opaque horizontal grayscale gradient, black on the left edge.
pub(crate) fn gradient_source(width: u32, height: u32) -> RasterSource {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for _y in 0..height {
        for x in 0..width {
            let value = (x * 255 / width.max(2).saturating_sub(1)) as u8;
            data.extend_from_slice(&[value, value, value, 255]);
        }
    }
    RasterSource::from_straight_rgba8(width, height, &data)
}
