use std::marker::PhantomData;

use anyhow::{anyhow, bail, ensure};
use log::debug;

use crate::chunks::{
    ihdr::{ColorType, IHDRChunk, Interlacing},
    iter_chunks_at, parse_chunk, parse_signature, Chunk,
};

/// Walks a datastream in the order PNG requires: signature, `IHDR`, then the
/// `IDAT` run up to `IEND`. Holds the unread input and its offset.
pub(crate) struct PNGDecoder<'a, State>(&'a [u8], usize, PhantomData<State>);

pub(crate) struct Start;
pub(crate) struct Header;

impl<'a> PNGDecoder<'a, Start> {
    pub(crate) fn new(data: &'a [u8]) -> anyhow::Result<Self> {
        let (rest, _) = parse_signature(data)
            .map_err(|_| anyhow!("input doesn't start with expected signature"))?;
        Ok(Self(rest, data.len() - rest.len(), PhantomData))
    }

    pub(crate) fn parse_ihdr(self) -> anyhow::Result<(PNGDecoder<'a, Header>, IHDRChunk)> {
        let (rest, chunk) =
            parse_chunk(self.0).map_err(|_| anyhow!("first chunk is not a valid IHDR"))?;
        let header = match chunk {
            Chunk::IHDR(header) => header,
            other => bail!(
                "expected IHDR as the first chunk, found {}",
                String::from_utf8_lossy(other.chunk_type())
            ),
        };
        check_supported(&header)?;
        let offset = self.1 + self.0.len() - rest.len();
        Ok((PNGDecoder(rest, offset, PhantomData), header))
    }
}

impl<'a> PNGDecoder<'a, Header> {
    /// Concatenates every `IDAT` payload. Ancillary chunks are skipped.
    pub(crate) fn read_image_data(self) -> anyhow::Result<Vec<u8>> {
        let mut data = vec![];
        let mut idat_count = 0;
        let mut idat_run_ended = false;
        for chunk in iter_chunks_at(self.0, self.1) {
            match chunk? {
                Chunk::IDAT(idat) => {
                    ensure!(!idat_run_ended, "IDAT chunks are not consecutive");
                    idat_count += 1;
                    data.extend_from_slice(idat.data);
                }
                Chunk::IEND => {
                    ensure!(idat_count > 0, "no IDAT chunk before IEND");
                    debug!("read {} bytes from {idat_count} IDAT chunk(s)", data.len());
                    return Ok(data);
                }
                Chunk::IHDR(_) => bail!("duplicate IHDR chunk"),
                Chunk::Unknown(raw) => {
                    if idat_count > 0 {
                        idat_run_ended = true;
                    }
                    if raw.is_critical() {
                        bail!(
                            "unsupported critical chunk {}",
                            String::from_utf8_lossy(raw.chunk_type)
                        );
                    }
                    debug!(
                        "skipping {} chunk ({} bytes)",
                        String::from_utf8_lossy(raw.chunk_type),
                        raw.data.len()
                    );
                }
            }
        }
        bail!("datastream ended before IEND")
    }
}

fn check_supported(header: &IHDRChunk) -> anyhow::Result<()> {
    ensure!(
        header.width > 0 && header.height > 0,
        "image has zero width or height"
    );
    ensure!(
        header.bit_depth == 8,
        "unsupported bit depth {}",
        header.bit_depth
    );
    ensure!(
        header.color_type == ColorType::Truecolor,
        "unsupported color type {:?}",
        header.color_type
    );
    ensure!(
        header.compression_method == 0,
        "unknown compression method {}",
        header.compression_method
    );
    ensure!(
        header.filter_method == 0,
        "unknown filter method {}",
        header.filter_method
    );
    ensure!(
        header.interlace_method == Interlacing::None,
        "interlaced images are not supported"
    );
    Ok(())
}
