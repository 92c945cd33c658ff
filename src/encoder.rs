use std::num::NonZeroUsize;

use log::debug;

use crate::{
    chunks::{
        idat::IDATChunk, iend::IENDChunk, ihdr::IHDRChunk, ParseableChunk, MAX_CHUNK_LEN,
        SIGNATURE,
    },
    error::{PngError, Result},
    filters::Filter,
    image::Image,
    image_data::{build_scanlines, compress_data},
    pixel::Rgb,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    /// zlib level, 0 (store) to 10. Defaults to 6, zlib's own default.
    pub compression_level: u8,
    /// Filter applied to every scanline.
    pub filter: Filter,
    /// Largest `IDAT` payload to emit. `None` puts the whole stream in one chunk.
    pub max_idat_len: Option<NonZeroUsize>,
}
impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            compression_level: 6,
            filter: Filter::None,
            max_idat_len: None,
        }
    }
}

/// Encodes `pixels` (row-major, top row first) as an 8-bit truecolor PNG.
pub fn encode(width: u32, height: u32, pixels: &[Rgb]) -> Result<Vec<u8>> {
    check_dimensions(width, height, pixels.len())?;
    write_png(width, height, &Rgb::flatten(pixels), &EncodeOptions::default())
}

/// Like [`encode`], for a flat `R, G, B, R, G, B, ...` buffer.
pub fn encode_rgb_bytes(width: u32, height: u32, bytes: &[u8]) -> Result<Vec<u8>> {
    if bytes.len() % 3 != 0 {
        return Err(PngError::InvalidImageData(format!(
            "{} bytes is not a whole number of RGB pixels",
            bytes.len()
        )));
    }
    check_dimensions(width, height, bytes.len() / 3)?;
    write_png(width, height, bytes, &EncodeOptions::default())
}

pub fn encode_with_options(image: &Image, options: &EncodeOptions) -> Result<Vec<u8>> {
    write_png(
        image.width(),
        image.height(),
        &Rgb::flatten(image.pixels()),
        options,
    )
}

/// Validates an image shape before anything is encoded.
pub(crate) fn check_dimensions(width: u32, height: u32, pixel_count: usize) -> Result<()> {
    let max = MAX_CHUNK_LEN as u32;
    if width == 0 || height == 0 || width > max || height > max {
        return Err(PngError::InvalidImageData(format!(
            "dimensions {width}x{height} must be between 1 and {max}"
        )));
    }
    let expected = (width as usize).checked_mul(height as usize);
    if expected != Some(pixel_count) {
        return Err(PngError::InvalidImageData(format!(
            "{pixel_count} pixels supplied for a {width}x{height} image"
        )));
    }
    (width as usize)
        .checked_mul(3)
        .and_then(|row| row.checked_add(1))
        .and_then(|line| line.checked_mul(height as usize))
        .map(|_| ())
        .ok_or_else(|| {
            PngError::InvalidImageData(format!("{width}x{height} image is too large to buffer"))
        })
}

/// `pixel_bytes` must already match `width` and `height`.
fn write_png(width: u32, height: u32, pixel_bytes: &[u8], options: &EncodeOptions) -> Result<Vec<u8>> {
    let header = IHDRChunk::truecolor(width, height);
    let raw = build_scanlines(pixel_bytes, &header, options.filter);
    let compressed = compress_data(&raw, options.compression_level)?;

    let split = options
        .max_idat_len
        .map_or(MAX_CHUNK_LEN, NonZeroUsize::get)
        .min(MAX_CHUNK_LEN);
    let idat_count = compressed.len().div_ceil(split);
    debug!(
        "encoded {width}x{height} image: {} raw bytes, {} compressed in {idat_count} IDAT chunk(s)",
        raw.len(),
        compressed.len(),
    );

    let mut png = Vec::with_capacity(SIGNATURE.len() + 25 + compressed.len() + 12 * idat_count + 12);
    png.extend(SIGNATURE);
    png.extend(header.to_bytes());
    for data in compressed.chunks(split) {
        png.extend(IDATChunk { data }.to_bytes());
    }
    png.extend(IENDChunk.to_bytes());
    Ok(png)
}
