//! # Image Codec Module
//!
//! Questo modulo definisce il seam verso il codec di immagini: decodifica
//! HEIC/HEIF, resize e encoding JPEG. La pipeline di conversione dipende
//! solo dal trait `ImageCodec`, così i test possono iniettare codec finti
//! senza toccare libheif.
//!
//! ## Responsabilità:
//! - `decode`: apre un file HEIC/HEIF e produce pixel decodificati + blob EXIF
//! - `resize`: resize esatto alle dimensioni richieste (Lanczos3)
//! - `encode_jpeg`: encoding JPEG alla qualità data, con pass-through EXIF
//!
//! ## Implementazione di produzione:
//! `HeifCodec` decodifica tramite libheif (piano RGB interleaved) e codifica
//! con l'encoder JPEG della crate `image`. Il blob EXIF viene trattato come
//! opaco: estratto dal container HEIF e reinserito come segmento APP1 nel
//! JPEG, senza alcuna reinterpretazione dei campi.

use crate::error::ConvertError;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use libheif_rs::{ColorSpace, HeifContext, ImageHandle, LibHeif, RgbChroma};
use std::io::Cursor;
use std::path::Path;

/// A decoded image plus its opaque embedded metadata blob
pub struct DecodedImage {
    /// Decoded pixel data
    pub pixels: DynamicImage,
    /// Raw EXIF payload carried over from the source container, if any
    pub exif: Option<Vec<u8>>,
}

/// Codec seam used by the conversion pipeline
pub trait ImageCodec: Send + Sync {
    /// Decode a HEIC/HEIF file into pixels plus its embedded metadata blob
    fn decode(&self, path: &Path) -> Result<DecodedImage, ConvertError>;

    /// Resize to exactly (width, height) with a high-quality filter.
    /// The aspect ratio is not preserved.
    fn resize(&self, image: DecodedImage, width: u32, height: u32) -> DecodedImage {
        DecodedImage {
            pixels: image.pixels.resize_exact(width, height, FilterType::Lanczos3),
            exif: image.exif,
        }
    }

    /// Encode to JPEG bytes at the given quality, carrying the EXIF blob over
    fn encode_jpeg(&self, image: &DecodedImage, quality: u8) -> Result<Vec<u8>, ConvertError>;
}

/// Production codec: libheif for HEIC decoding, the `image` crate for JPEG
pub struct HeifCodec;

impl ImageCodec for HeifCodec {
    fn decode(&self, path: &Path) -> Result<DecodedImage, ConvertError> {
        let lib_heif = LibHeif::new();

        let ctx = HeifContext::read_from_file(path.to_string_lossy().as_ref())
            .map_err(|e| ConvertError::Decode(format!("failed to read {}: {}", path.display(), e)))?;

        let handle = ctx.primary_image_handle().map_err(|e| {
            ConvertError::Decode(format!("no primary image in {}: {}", path.display(), e))
        })?;

        let width = handle.width();
        let height = handle.height();
        let exif = extract_exif(&handle);

        let decoded = lib_heif
            .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
            .map_err(|e| {
                ConvertError::Decode(format!("decode failed for {}: {}", path.display(), e))
            })?;

        let planes = decoded.planes();
        let plane = planes
            .interleaved
            .ok_or_else(|| ConvertError::Decode("no interleaved RGB plane".to_string()))?;

        // Rows may be padded: copy width*3 bytes per row, skipping the stride
        let row_bytes = width as usize * 3;
        let mut raw = Vec::with_capacity(row_bytes * height as usize);
        for row in 0..height as usize {
            let start = row * plane.stride;
            raw.extend_from_slice(&plane.data[start..start + row_bytes]);
        }

        let pixels = image::RgbImage::from_raw(width, height, raw)
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(|| ConvertError::Decode("RGB buffer size mismatch".to_string()))?;

        Ok(DecodedImage { pixels, exif })
    }

    fn encode_jpeg(&self, image: &DecodedImage, quality: u8) -> Result<Vec<u8>, ConvertError> {
        let mut buf = Cursor::new(Vec::new());
        JpegEncoder::new_with_quality(&mut buf, quality)
            .encode_image(&image.pixels.to_rgb8())
            .map_err(|e| ConvertError::Encode(e.to_string()))?;

        let mut bytes = buf.into_inner();
        if let Some(ref exif) = image.exif {
            bytes = splice_exif(bytes, exif);
        }

        Ok(bytes)
    }
}

/// Pull the raw EXIF payload out of a HEIF image handle, if present
fn extract_exif(handle: &ImageHandle) -> Option<Vec<u8>> {
    for meta in handle.all_metadata() {
        if meta.item_type.0 == *b"Exif" && meta.raw_data.len() > 4 {
            // The payload starts with a 4-byte offset to the TIFF header
            let offset = u32::from_be_bytes(meta.raw_data[..4].try_into().ok()?) as usize;
            let skip = 4 + offset;
            if skip < meta.raw_data.len() {
                return Some(meta.raw_data[skip..].to_vec());
            }
        }
    }
    None
}

/// Insert the EXIF payload as an APP1 segment right after the JPEG SOI marker
fn splice_exif(jpeg: Vec<u8>, exif: &[u8]) -> Vec<u8> {
    // Segment length counts the two length bytes plus "Exif\0\0" plus payload
    let segment_len = 2 + 6 + exif.len();
    if exif.is_empty() || segment_len > 0xFFFF || jpeg.len() < 2 {
        return jpeg;
    }

    let mut out = Vec::with_capacity(jpeg.len() + segment_len + 2);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&(segment_len as u16).to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(exif);
    out.extend_from_slice(&jpeg[2..]);
    out
}

#[cfg(test)]
pub(crate) mod mock {
    //! Codec finto per i test: nessuna dipendenza da libheif o da file HEIC reali.

    use super::*;
    use image::RgbImage;

    /// Deterministic in-memory codec. Decoding a path whose file name
    /// contains "corrupt" fails; `fail_encode` injects an encode failure.
    pub struct MockCodec {
        pub fail_encode: bool,
    }

    impl MockCodec {
        pub fn new() -> Self {
            Self { fail_encode: false }
        }
    }

    impl ImageCodec for MockCodec {
        fn decode(&self, path: &Path) -> Result<DecodedImage, ConvertError> {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            if name.contains("corrupt") {
                return Err(ConvertError::Decode(format!(
                    "mock decode failure for {}",
                    path.display()
                )));
            }
            Ok(DecodedImage {
                pixels: DynamicImage::ImageRgb8(RgbImage::from_pixel(
                    64,
                    48,
                    image::Rgb([120, 80, 40]),
                )),
                exif: None,
            })
        }

        fn encode_jpeg(&self, image: &DecodedImage, quality: u8) -> Result<Vec<u8>, ConvertError> {
            if self.fail_encode {
                return Err(ConvertError::Encode("mock encode failure".to_string()));
            }
            let mut buf = Cursor::new(Vec::new());
            JpegEncoder::new_with_quality(&mut buf, quality)
                .encode_image(&image.pixels.to_rgb8())
                .map_err(|e| ConvertError::Encode(e.to_string()))?;
            Ok(buf.into_inner())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_jpeg() -> Vec<u8> {
        // SOI + EOI, enough structure for the splice
        vec![0xFF, 0xD8, 0xFF, 0xD9]
    }

    #[test]
    fn test_splice_exif_inserts_app1_after_soi() {
        let exif = vec![0x49, 0x49, 0x2A, 0x00];
        let out = splice_exif(minimal_jpeg(), &exif);

        assert_eq!(&out[..2], &[0xFF, 0xD8]);
        assert_eq!(&out[2..4], &[0xFF, 0xE1]);
        let len = u16::from_be_bytes([out[4], out[5]]) as usize;
        assert_eq!(len, 2 + 6 + exif.len());
        assert_eq!(&out[6..12], b"Exif\0\0");
        assert_eq!(&out[12..16], exif.as_slice());
        assert_eq!(&out[16..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_splice_exif_empty_payload_is_noop() {
        let jpeg = minimal_jpeg();
        assert_eq!(splice_exif(jpeg.clone(), &[]), jpeg);
    }

    #[test]
    fn test_splice_exif_oversized_payload_is_noop() {
        let jpeg = minimal_jpeg();
        let oversized = vec![0u8; 0x10000];
        assert_eq!(splice_exif(jpeg.clone(), &oversized), jpeg);
    }

    #[test]
    fn test_mock_codec_roundtrip() {
        let codec = mock::MockCodec::new();
        let decoded = codec.decode(Path::new("photo.heic")).unwrap();
        assert_eq!(decoded.pixels.width(), 64);
        assert_eq!(decoded.pixels.height(), 48);

        let resized = codec.resize(decoded, 32, 32);
        assert_eq!(resized.pixels.width(), 32);
        assert_eq!(resized.pixels.height(), 32);

        let bytes = codec.encode_jpeg(&resized, 80).unwrap();
        let reloaded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(reloaded.width(), 32);
        assert_eq!(reloaded.height(), 32);
    }

    #[test]
    fn test_mock_codec_corrupt_file_fails_decode() {
        let codec = mock::MockCodec::new();
        let err = codec.decode(Path::new("corrupt.heic")).unwrap_err();
        assert!(matches!(err, ConvertError::Decode(_)));
    }
}
