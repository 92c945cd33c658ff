use anyhow::{anyhow, bail, Context};
use miniz_oxide::{
    deflate::core::{
        compress_to_output, create_comp_flags_from_zip_params, CompressorOxide, TDEFLFlush,
        TDEFLStatus,
    },
    inflate::decompress_to_vec_zlib,
};

use crate::{chunks::ihdr::IHDRChunk, error::PngError, filters::Filter};

/// Highest level miniz accepts.
pub(crate) const MAX_COMPRESSION_LEVEL: u8 = 10;

/// Splits `pixel_bytes` into rows and prefixes each with its filter byte.
pub(crate) fn build_scanlines(pixel_bytes: &[u8], header: &IHDRChunk, filter: Filter) -> Vec<u8> {
    let bpp = header.filter_width();
    let row_len = header.width as usize * bpp;
    let mut data = Vec::with_capacity((row_len + 1) * header.height as usize);
    let zero_row = vec![0; row_len];
    let mut prev: &[u8] = &zero_row;
    for row in pixel_bytes.chunks_exact(row_len) {
        data.push(filter as u8);
        filter.filter_row(row, prev, bpp, &mut data);
        prev = row;
    }
    data
}

/// Wraps `data` in a zlib stream.
pub(crate) fn compress_data(data: &[u8], level: u8) -> crate::Result<Vec<u8>> {
    if level > MAX_COMPRESSION_LEVEL {
        return Err(PngError::EncodingFailed(format!(
            "compression level {level} is above {MAX_COMPRESSION_LEVEL}"
        )));
    }
    // Positive window bits selects the zlib header and Adler-32 trailer.
    let flags = create_comp_flags_from_zip_params(level.into(), 1, 0);
    let mut compressor = CompressorOxide::new(flags);
    let mut compressed = Vec::with_capacity(data.len() / 2 + 64);
    let (status, consumed) = compress_to_output(&mut compressor, data, TDEFLFlush::Finish, |out| {
        compressed.extend_from_slice(out);
        true
    });
    match status {
        TDEFLStatus::Done if consumed == data.len() => Ok(compressed),
        status => Err(PngError::EncodingFailed(format!(
            "deflate stopped with {status:?} after {consumed} of {} bytes",
            data.len()
        ))),
    }
}

/// Inflates the concatenated `IDAT` payload and removes the scanline filters,
/// returning bare pixel bytes.
pub(crate) fn decompress_data(compressed_data: &[u8], header: &IHDRChunk) -> anyhow::Result<Vec<u8>> {
    let mut data = decompress_to_vec_zlib(compressed_data)
        .map_err(|e| anyhow!("{:?}", e.status))
        .context("Failed to decompress image data.")?;
    let scanline_size = header
        .scanline_size()
        .context("scanline length overflows")?;
    let expected = scanline_size
        .checked_mul(header.height as usize)
        .context("image data length overflows")?;
    if data.len() != expected {
        bail!(
            "image data is {} bytes, expected {expected} for {}x{}",
            data.len(),
            header.width,
            header.height
        );
    }
    reconstruct_scanlines(&mut data, scanline_size, header.filter_width())?;
    Ok(data)
}

/// Reverses filtering in place, then drops the filter bytes.
fn reconstruct_scanlines(data: &mut Vec<u8>, scanline_size: usize, bpp: usize) -> anyhow::Result<()> {
    let row_len = scanline_size - 1;
    let mut prev = vec![0; row_len];
    for (index, line) in data.chunks_exact_mut(scanline_size).enumerate() {
        let filter = Filter::try_from(line[0]).with_context(|| format!("scanline {index}"))?;
        let row = &mut line[1..];
        filter.reconstruct_row(row, &prev, bpp);
        prev.copy_from_slice(row);
    }
    let mut pixels = Vec::with_capacity(row_len * (data.len() / scanline_size));
    for line in data.chunks_exact(scanline_size) {
        pixels.extend_from_slice(&line[1..]);
    }
    *data = pixels;
    Ok(())
}
