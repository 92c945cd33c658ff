use super::{frame, ParseableChunk};
use nom::IResult;

/// One slice of the zlib stream. Images may spread it over several of these.
#[derive(Debug)]
pub struct IDATChunk<'a> {
    pub data: &'a [u8],
}
impl<'a> ParseableChunk<'a> for IDATChunk<'a> {
    type Output = Vec<u8>;

    const HEADER: &'static [u8; 4] = b"IDAT";

    fn from_bytes(chunk_data: &'a [u8]) -> IResult<&'a [u8], Self> {
        Ok((&chunk_data[0..0], IDATChunk { data: chunk_data }))
    }

    fn to_bytes(&self) -> Self::Output {
        frame(Self::HEADER, self.data)
    }
}
