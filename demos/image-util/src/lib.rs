use dubflow::Surface;
use image::{Rgb, RgbImage, RgbaImage};
use ndarray::Array2;
use std::path::Path;

/// Writes a scalar grid centered on gray, `scale` per full intensity step.
pub fn save_signed(
    dir: &Path,
    prefix: &str,
    index: usize,
    x: &Array2<f64>,
    scale: f64,
) -> anyhow::Result<()> {
    let shape = x.dim();

    let mut img = RgbImage::new(shape.0 as u32, shape.1 as u32);

    for i in 0..shape.0 {
        for j in 0..shape.1 {
            let l = (128.0 + x[[i, j]] * scale).max(0.0).min(255.0) as u8;
            // Grid row 0 is the bottom of the image.
            img.put_pixel(i as u32, (shape.1 - 1 - j) as u32, Rgb([l, l, l]));
        }
    }

    img.save(dir.join(format!("{}_{:06}.png", prefix, index)))?;

    Ok(())
}

pub fn save_surface(
    dir: &Path,
    prefix: &str,
    index: usize,
    surface: &Surface,
) -> anyhow::Result<()> {
    let img = RgbaImage::from_raw(surface.width, surface.height, surface.pixels.clone())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "surface buffer does not match {}x{}",
                surface.width,
                surface.height
            )
        })?;

    img.save(dir.join(format!("{}_{:06}.png", prefix, index)))?;

    Ok(())
}
