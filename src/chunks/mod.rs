use anyhow::anyhow;
use nom::{
    bytes::complete::{tag, take},
    combinator::map_res,
    error::{Error, ErrorKind},
    number::complete::be_u32,
    IResult,
};

mod crc;
pub mod idat;
pub mod iend;
pub mod ihdr;

pub use crc::{chunk_crc, crc32, Crc32};

/// The fixed first eight bytes of every PNG datastream.
pub const SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];

/// Chunk payloads are limited to 2^31 - 1 bytes.
pub(crate) const MAX_CHUNK_LEN: usize = i32::MAX as usize;

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug)]
pub enum Chunk<'a> {
    IHDR(ihdr::IHDRChunk),
    IDAT(idat::IDATChunk<'a>),
    IEND,
    Unknown(RawChunk<'a>),
}
impl Chunk<'_> {
    pub fn chunk_type(&self) -> &[u8; 4] {
        match self {
            Chunk::IHDR(_) => ihdr::IHDRChunk::HEADER,
            Chunk::IDAT(_) => idat::IDATChunk::HEADER,
            Chunk::IEND => iend::IENDChunk::HEADER,
            Chunk::Unknown(raw) => raw.chunk_type,
        }
    }
}

#[derive(Debug)]
pub struct RawChunk<'a> {
    pub chunk_type: &'a [u8; 4],
    pub data: &'a [u8],
}
impl RawChunk<'_> {
    /// Ancillary chunks have bit 5 of their first byte set (lowercase).
    pub fn is_critical(&self) -> bool {
        self.chunk_type[0] & 0x20 == 0
    }
}

pub trait ParseableChunk<'a>: Sized {
    type Output: AsRef<[u8]>;
    const HEADER: &'static [u8; 4];

    fn from_bytes(chunk_data: &'a [u8]) -> IResult<&'a [u8], Self>;
    fn to_bytes(&self) -> Self::Output;
}

/// Lays out one chunk: length, type, payload, CRC.
pub(crate) fn frame(chunk_type: &[u8; 4], data: &[u8]) -> Vec<u8> {
    debug_assert!(data.len() <= MAX_CHUNK_LEN);
    let mut bytes = Vec::with_capacity(data.len() + 12);
    bytes.extend((data.len() as u32).to_be_bytes());
    bytes.extend(chunk_type);
    bytes.extend(data);
    bytes.extend(chunk_crc(chunk_type, data).to_be_bytes());
    bytes
}

pub fn parse_signature(input: &[u8]) -> IResult<&[u8], &[u8]> {
    tag(&SIGNATURE[..])(input)
}

/// Iterates the chunks following the signature. Stops after `IEND` or at the
/// first malformed chunk, which is yielded as an error.
pub fn iter_chunks(source: &[u8]) -> ChunkIter<'_> {
    iter_chunks_at(source, SIGNATURE.len())
}

/// Same as [`iter_chunks`] for input starting `offset` bytes into the file.
pub(crate) fn iter_chunks_at(source: &[u8], offset: usize) -> ChunkIter<'_> {
    ChunkIter {
        source,
        offset,
        finished: false,
    }
}

pub struct ChunkIter<'a> {
    source: &'a [u8],
    offset: usize,
    finished: bool,
}
impl<'a> Iterator for ChunkIter<'a> {
    type Item = anyhow::Result<Chunk<'a>>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if self.source.is_empty() {
            self.finished = true;
            return Some(Err(anyhow!("datastream ended before IEND")));
        }
        match parse_chunk(self.source) {
            Ok((rest, chunk)) => {
                self.offset += self.source.len() - rest.len();
                self.source = rest;
                if matches!(chunk, Chunk::IEND) {
                    self.finished = true;
                }
                Some(Ok(chunk))
            }
            Err(e) => {
                self.finished = true;
                let kind = match e {
                    nom::Err::Error(e) | nom::Err::Failure(e) => e.code,
                    nom::Err::Incomplete(_) => ErrorKind::Eof,
                };
                Some(Err(anyhow!(
                    "malformed chunk at byte {}: {}",
                    self.offset,
                    describe(kind)
                )))
            }
        }
    }
}

fn describe(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Verify => "CRC mismatch",
        ErrorKind::Eof => "truncated chunk",
        ErrorKind::MapRes => "invalid header field",
        _ => "unexpected payload layout",
    }
}

pub(crate) fn parse_chunk(input: &[u8]) -> IResult<&[u8], Chunk<'_>> {
    let (rest, (chunk_type, chunk_data)) = valid_chunk(input)?;
    let chunk = if chunk_type == ihdr::IHDRChunk::HEADER {
        Chunk::IHDR(ihdr::IHDRChunk::from_bytes(chunk_data)?.1)
    } else if chunk_type == idat::IDATChunk::HEADER {
        Chunk::IDAT(idat::IDATChunk::from_bytes(chunk_data)?.1)
    } else if chunk_type == iend::IENDChunk::HEADER {
        iend::IENDChunk::from_bytes(chunk_data)?;
        Chunk::IEND
    } else {
        Chunk::Unknown(RawChunk {
            chunk_type,
            data: chunk_data,
        })
    };
    Ok((rest, chunk))
}

/// Splits off one chunk and checks its CRC, returning `(type, payload)`.
fn valid_chunk(input: &[u8]) -> IResult<&[u8], (&[u8; 4], &[u8])> {
    let (rest, length) = be_u32(input)?;
    let (rest, chunk_type) = map_res(take(4usize), <&[u8; 4]>::try_from)(rest)?;
    let (rest, chunk_data) = take(length)(rest)?;
    let (rest, crc) = be_u32(rest)?;
    if crc != chunk_crc(chunk_type, chunk_data) {
        return Err(nom::Err::Failure(Error::new(input, ErrorKind::Verify)));
    }
    Ok((rest, (chunk_type, chunk_data)))
}
