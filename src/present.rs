//! Copies the dye grid onto a pixel surface.

use crate::d2::{sample, Filter};
use cgmath::{vec2, Vector3};
use ndarray::Array2;

/// An opaque RGBA8 image, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let o = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[o],
            self.pixels[o + 1],
            self.pixels[o + 2],
            self.pixels[o + 3],
        ]
    }
}

fn to_byte(c: f64) -> u8 {
    (c.max(0.0).min(1.0) * 255.0).round() as u8
}

/// Resamples `dye` over `surface`.
///
/// Surface row 0 is the top of the screen, dye row 0 the bottom.
pub fn present(dye: &Array2<Vector3<f64>>, surface: &mut Surface, filter: Filter) {
    let (w, h) = (surface.width as usize, surface.height as usize);

    surface
        .pixels
        .chunks_exact_mut(4)
        .enumerate()
        .for_each(|(n, px)| {
            let (x, y) = (n % w, n / w);
            let uv = vec2(
                (x as f64 + 0.5) / w as f64,
                1.0 - (y as f64 + 0.5) / h as f64,
            );
            let c = sample(dye, uv, filter);

            px[0] = to_byte(c.x);
            px[1] = to_byte(c.y);
            px[2] = to_byte(c.z);
            px[3] = 255;
        });
}
