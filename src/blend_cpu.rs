pub type Rgba8 = [u8; 4];

/// Straight-alpha source-over blend of one pixel, with a layer opacity
/// multiplier applied to the source alpha. Integer arithmetic only so the
/// result is identical on every platform.
pub fn over(dst: Rgba8, src: Rgba8, opacity: f32) -> Rgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    // Weights for straight (non-premultiplied) compositing:
    // out_a = sa + da*(1-sa); out_c = (sc*sa + dc*da*(1-sa)) / out_a.
    let ws = u32::from(sa) * 255;
    let wd = u32::from(dst[3]) * (255 - u32::from(sa));
    let wsum = ws + wd;

    let mut out = [0u8; 4];
    out[3] = ((wsum + 127) / 255) as u8;
    for i in 0..3 {
        let num = u32::from(src[i]) * ws + u32::from(dst[i]) * wd;
        out[i] = ((num + wsum / 2) / wsum) as u8;
    }
    out
}

/// Blends `src` onto `canvas` at integer coordinates, clipping at the canvas
/// edges. Row-major traversal; per-pixel blending is pure, so traversal order
/// cannot affect the result.
pub fn blit_over(canvas: &mut image::RgbaImage, src: &image::RgbaImage, x: i32, y: i32, opacity: f32) {
    let (cw, ch) = canvas.dimensions();
    for (sx, sy, px) in src.enumerate_pixels() {
        let dx = x + sx as i32;
        let dy = y + sy as i32;
        if dx < 0 || dy < 0 || dx >= cw as i32 || dy >= ch as i32 {
            continue;
        }
        let d = canvas.get_pixel(dx as u32, dy as u32).0;
        canvas.put_pixel(dx as u32, dy as u32, image::Rgba(over(d, px.0, opacity)));
    }
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn over_opacity_0_is_noop() {
        let dst = [1, 2, 3, 4];
        let src = [200, 200, 200, 200];
        assert_eq!(over(dst, src, 0.0), dst);
    }

    #[test]
    fn over_src_alpha_0_is_noop() {
        let dst = [10, 20, 30, 40];
        let src = [255, 255, 255, 0];
        assert_eq!(over(dst, src, 1.0), dst);
    }

    #[test]
    fn over_src_opaque_replaces_dst() {
        let dst = [0, 0, 0, 255];
        let src = [255, 0, 0, 255];
        assert_eq!(over(dst, src, 1.0), src);
    }

    #[test]
    fn over_dst_transparent_keeps_src_color() {
        let dst = [0, 0, 0, 0];
        let src = [100, 110, 120, 200];
        assert_eq!(over(dst, src, 1.0), src);
    }

    #[test]
    fn over_half_opacity_halves_coverage() {
        let dst = [0, 0, 0, 0];
        let src = [80, 90, 100, 255];
        let out = over(dst, src, 0.5);
        assert_eq!(out, [80, 90, 100, 128]);
    }

    #[test]
    fn blit_clips_at_canvas_edges() {
        let mut canvas = image::RgbaImage::new(4, 4);
        let src = image::RgbaImage::from_pixel(3, 3, image::Rgba([255, 0, 0, 255]));
        blit_over(&mut canvas, &src, -1, -1, 1.0);
        assert_eq!(canvas.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(1, 1).0, [255, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(2, 2).0, [0, 0, 0, 0]);
    }
}
