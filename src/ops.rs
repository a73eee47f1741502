//! Elementary raster operations. Each is a pure function from immutable
//! inputs to a fresh artifact; together they are the vocabulary the recipe
//! subgraphs are assembled from.

use crate::{
    artifact::{BlobArtifact, RasterArtifact},
    blur_cpu::blur_rgba8,
    error::{LayerKitError, LayerKitResult},
};

/// Solid-color artifact of the given size.
pub fn create_solid(width: u32, height: u32, rgba: [u8; 4]) -> LayerKitResult<RasterArtifact> {
    if width == 0 || height == 0 {
        return Err(LayerKitError::configuration(format!(
            "solid size must be positive, got {width}x{height}"
        )));
    }
    Ok(RasterArtifact::new(image::RgbaImage::from_pixel(
        width,
        height,
        image::Rgba(rgba),
    )))
}

/// Scales to exact target dimensions with Lanczos3 resampling.
pub fn resize(src: &RasterArtifact, width: u32, height: u32) -> LayerKitResult<RasterArtifact> {
    if width == 0 || height == 0 {
        return Err(LayerKitError::configuration(format!(
            "resize target must be positive, got {width}x{height}"
        )));
    }
    let resized = image::imageops::resize(
        src.pixels(),
        width,
        height,
        image::imageops::FilterType::Lanczos3,
    );
    Ok(RasterArtifact::new(resized))
}

/// Decodes encoded image bytes (PNG, JPEG, WEBP, ...) into a raster artifact.
pub fn blob_to_image(blob: &BlobArtifact) -> LayerKitResult<RasterArtifact> {
    let img = image::load_from_memory(blob.data()).map_err(|e| {
        LayerKitError::decode(format!(
            "blob ({}) does not decode as an image: {e}",
            blob.media_type()
        ))
    })?;
    Ok(RasterArtifact::from_dynamic(img))
}

/// White silhouette carrying the source's alpha channel.
pub fn extract_alpha(src: &RasterArtifact) -> LayerKitResult<RasterArtifact> {
    let out = image::RgbaImage::from_fn(src.width(), src.height(), |x, y| {
        image::Rgba([255, 255, 255, src.pixels().get_pixel(x, y).0[3]])
    });
    Ok(RasterArtifact::new(out))
}

/// Adds a transparent margin around the image.
pub fn pad(
    src: &RasterArtifact,
    left: u32,
    top: u32,
    right: u32,
    bottom: u32,
) -> LayerKitResult<RasterArtifact> {
    let width = src
        .width()
        .checked_add(left)
        .and_then(|w| w.checked_add(right))
        .ok_or_else(|| LayerKitError::configuration("pad width overflows u32"))?;
    let height = src
        .height()
        .checked_add(top)
        .and_then(|h| h.checked_add(bottom))
        .ok_or_else(|| LayerKitError::configuration("pad height overflows u32"))?;

    let mut canvas = image::RgbaImage::new(width, height);
    image::imageops::replace(&mut canvas, src.pixels(), i64::from(left), i64::from(top));
    Ok(RasterArtifact::new(canvas))
}

/// Square max-filter of the given radius over every channel, run as two
/// separable passes. Radius 0 is the identity.
pub fn dilate(src: &RasterArtifact, radius: u32) -> LayerKitResult<RasterArtifact> {
    if radius == 0 {
        return Ok(src.clone());
    }
    let (w, h) = (src.width(), src.height());
    let r = radius as i64;

    let horizontal = image::RgbaImage::from_fn(w, h, |x, y| {
        let mut best = [0u8; 4];
        for dx in -r..=r {
            let sx = (i64::from(x) + dx).clamp(0, i64::from(w) - 1) as u32;
            let px = src.pixels().get_pixel(sx, y).0;
            for c in 0..4 {
                best[c] = best[c].max(px[c]);
            }
        }
        image::Rgba(best)
    });
    let out = image::RgbaImage::from_fn(w, h, |x, y| {
        let mut best = [0u8; 4];
        for dy in -r..=r {
            let sy = (i64::from(y) + dy).clamp(0, i64::from(h) - 1) as u32;
            let px = horizontal.get_pixel(x, sy).0;
            for c in 0..4 {
                best[c] = best[c].max(px[c]);
            }
        }
        image::Rgba(best)
    });
    Ok(RasterArtifact::new(out))
}

/// Gaussian blur with the deterministic fixed-point kernel from
/// [`crate::blur_cpu`]. Sigma 0 is the identity.
pub fn gaussian_blur(src: &RasterArtifact, sigma: f64) -> LayerKitResult<RasterArtifact> {
    let (w, h) = (src.width(), src.height());
    let blurred = blur_rgba8(src.pixels().as_raw(), w, h, sigma)?;
    let pixels = image::RgbaImage::from_raw(w, h, blurred)
        .ok_or_else(|| LayerKitError::configuration("blur output buffer mismatch"))?;
    Ok(RasterArtifact::new(pixels))
}

/// Recolors: output rgb is the given color, output alpha is the source alpha
/// scaled by the color's alpha.
pub fn colorize(src: &RasterArtifact, rgba: [u8; 4]) -> LayerKitResult<RasterArtifact> {
    let [red, green, blue, alpha] = rgba;
    let out = image::RgbaImage::from_fn(src.width(), src.height(), |x, y| {
        let a = src.pixels().get_pixel(x, y).0[3];
        let scaled = ((u16::from(a) * u16::from(alpha) + 127) / 255) as u8;
        image::Rgba([red, green, blue, scaled])
    });
    Ok(RasterArtifact::new(out))
}

/// Shifts content by (dx, dy), growing the canvas by |dx| and |dy| so nothing
/// is clipped. Positive offsets move content right/down.
pub fn translate(src: &RasterArtifact, dx: i32, dy: i32) -> LayerKitResult<RasterArtifact> {
    let width = src
        .width()
        .checked_add(dx.unsigned_abs())
        .ok_or_else(|| LayerKitError::configuration("translate width overflows u32"))?;
    let height = src
        .height()
        .checked_add(dy.unsigned_abs())
        .ok_or_else(|| LayerKitError::configuration("translate height overflows u32"))?;

    let mut canvas = image::RgbaImage::new(width, height);
    image::imageops::replace(
        &mut canvas,
        src.pixels(),
        i64::from(dx.max(0)),
        i64::from(dy.max(0)),
    );
    Ok(RasterArtifact::new(canvas))
}
