use image::ImageEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use sha2::{Digest, Sha256};

use crate::error::{LayerKitError, LayerKitResult};

/// Immutable pixel artifact, always RGBA8 with straight alpha.
///
/// The canonical form is a PNG written with fixed encoder parameters, so two
/// artifacts with pixel-identical buffers always produce identical canonical
/// bytes and therefore identical content hashes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterArtifact {
    pixels: image::RgbaImage,
}

impl RasterArtifact {
    pub fn new(pixels: image::RgbaImage) -> Self {
        Self { pixels }
    }

    /// Normalizes any decoded image to the RGBA8 channel format.
    pub fn from_dynamic(img: image::DynamicImage) -> Self {
        Self {
            pixels: img.to_rgba8(),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &image::RgbaImage {
        &self.pixels
    }

    pub fn into_pixels(self) -> image::RgbaImage {
        self.pixels
    }

    /// Canonical PNG bytes: fixed compression, no adaptive filtering, no
    /// ancillary chunks. Used for both hashing and persistence.
    pub fn canonical_png(&self) -> LayerKitResult<Vec<u8>> {
        let mut buf = Vec::new();
        let encoder =
            PngEncoder::new_with_quality(&mut buf, CompressionType::Fast, FilterType::NoFilter);
        encoder
            .write_image(
                self.pixels.as_raw(),
                self.width(),
                self.height(),
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| LayerKitError::decode(format!("canonical png encode failed: {e}")))?;
        Ok(buf)
    }

    /// SHA-256 hex digest of the canonical PNG bytes.
    pub fn content_hash(&self) -> LayerKitResult<String> {
        let png = self.canonical_png()?;
        let mut hasher = Sha256::new();
        hasher.update(&png);
        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Persisted form: `[8-byte big-endian length][canonical PNG bytes]`.
    pub fn encode(&self) -> LayerKitResult<Vec<u8>> {
        let png = self.canonical_png()?;
        let mut out = Vec::with_capacity(8 + png.len());
        write_frame(&mut out, &png);
        Ok(out)
    }

    pub fn decode(bytes: &[u8]) -> LayerKitResult<Self> {
        let (png, rest) = read_frame(bytes, "raster payload")?;
        if !rest.is_empty() {
            return Err(LayerKitError::decode(format!(
                "raster artifact has {} trailing bytes after payload",
                rest.len()
            )));
        }
        let img = image::load_from_memory_with_format(png, image::ImageFormat::Png)
            .map_err(|e| LayerKitError::decode(format!("raster payload is not valid png: {e}")))?;
        Ok(Self::from_dynamic(img))
    }
}

/// Immutable opaque binary payload tagged with a media type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlobArtifact {
    data: Vec<u8>,
    media_type: String,
}

impl BlobArtifact {
    pub fn new(data: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            data,
            media_type: media_type.into(),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// SHA-256 hex digest of the raw payload bytes.
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.data);
        format!("{:x}", hasher.finalize())
    }

    /// Persisted form: length-prefixed media type, then length-prefixed payload.
    pub fn encode(&self) -> Vec<u8> {
        let mt = self.media_type.as_bytes();
        let mut out = Vec::with_capacity(16 + mt.len() + self.data.len());
        write_frame(&mut out, mt);
        write_frame(&mut out, &self.data);
        out
    }

    pub fn decode(bytes: &[u8]) -> LayerKitResult<Self> {
        let (mt, rest) = read_frame(bytes, "blob media type")?;
        let media_type = std::str::from_utf8(mt)
            .map_err(|e| LayerKitError::decode(format!("blob media type is not utf-8: {e}")))?
            .to_string();
        let (data, rest) = read_frame(rest, "blob payload")?;
        if !rest.is_empty() {
            return Err(LayerKitError::decode(format!(
                "blob artifact has {} trailing bytes after payload",
                rest.len()
            )));
        }
        Ok(Self {
            data: data.to_vec(),
            media_type,
        })
    }
}

fn write_frame(out: &mut Vec<u8>, payload: &[u8]) {
    out.extend_from_slice(&(payload.len() as u64).to_be_bytes());
    out.extend_from_slice(payload);
}

fn read_frame<'a>(bytes: &'a [u8], what: &str) -> LayerKitResult<(&'a [u8], &'a [u8])> {
    if bytes.len() < 8 {
        return Err(LayerKitError::decode(format!(
            "{what}: truncated length prefix ({} of 8 bytes)",
            bytes.len()
        )));
    }
    let (prefix, rest) = bytes.split_at(8);
    let mut len_bytes = [0u8; 8];
    len_bytes.copy_from_slice(prefix);
    let len = u64::from_be_bytes(len_bytes);
    let len = usize::try_from(len)
        .map_err(|_| LayerKitError::decode(format!("{what}: length {len} exceeds address space")))?;
    if rest.len() < len {
        return Err(LayerKitError::decode(format!(
            "{what}: truncated payload ({} of {len} bytes)",
            rest.len()
        )));
    }
    Ok(rest.split_at(len))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(w: u32, h: u32) -> RasterArtifact {
        let pixels = image::RgbaImage::from_fn(w, h, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgba([255, 0, 0, 255])
            } else {
                image::Rgba([0, 0, 255, 128])
            }
        });
        RasterArtifact::new(pixels)
    }

    #[test]
    fn raster_roundtrip_preserves_pixels_and_hash() {
        let art = checker(7, 5);
        let bytes = art.encode().unwrap();
        let back = RasterArtifact::decode(&bytes).unwrap();
        assert_eq!(back.width(), 7);
        assert_eq!(back.height(), 5);
        assert_eq!(back.pixels(), art.pixels());
        assert_eq!(back.content_hash().unwrap(), art.content_hash().unwrap());
        assert_eq!(back.canonical_png().unwrap(), art.canonical_png().unwrap());
    }

    #[test]
    fn identical_buffers_hash_identically() {
        let a = checker(4, 4);
        let b = checker(4, 4);
        assert_eq!(a.content_hash().unwrap(), b.content_hash().unwrap());
    }

    #[test]
    fn different_pixels_hash_differently() {
        let a = checker(4, 4);
        let b = checker(4, 3);
        assert_ne!(a.content_hash().unwrap(), b.content_hash().unwrap());
    }

    #[test]
    fn from_dynamic_normalizes_to_rgba8() {
        let gray = image::GrayImage::from_pixel(3, 3, image::Luma([42]));
        let art = RasterArtifact::from_dynamic(image::DynamicImage::ImageLuma8(gray));
        assert_eq!(art.pixels().get_pixel(1, 1), &image::Rgba([42, 42, 42, 255]));
    }

    #[test]
    fn raster_decode_rejects_truncation() {
        let art = checker(4, 4);
        let bytes = art.encode().unwrap();

        let err = RasterArtifact::decode(&bytes[..4]).unwrap_err();
        assert!(err.to_string().contains("length prefix"));

        let err = RasterArtifact::decode(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(err.to_string().contains("truncated payload"));
    }

    #[test]
    fn raster_decode_rejects_garbage_payload() {
        let mut bytes = Vec::new();
        write_frame(&mut bytes, b"not a png");
        assert!(RasterArtifact::decode(&bytes).is_err());
    }

    #[test]
    fn blob_roundtrip_and_hash() {
        let blob = BlobArtifact::new(vec![1, 2, 3, 4], "image/svg+xml");
        let back = BlobArtifact::decode(&blob.encode()).unwrap();
        assert_eq!(back, blob);
        assert_eq!(back.content_hash(), blob.content_hash());
        // SHA-256 of raw bytes, not of the framed form.
        assert_eq!(
            blob.content_hash(),
            "9f64a747e1b97f131fabb6b447296c9b6f0201e79fb3c5356e6c77e89b6a806a"
        );
    }

    #[test]
    fn blob_decode_rejects_short_stream() {
        let blob = BlobArtifact::new(vec![9; 32], "font/ttf");
        let bytes = blob.encode();
        let err = BlobArtifact::decode(&bytes[..bytes.len() - 10]).unwrap_err();
        assert!(err.to_string().contains("blob payload"));
    }
}
