use nom::{
    combinator::{all_consuming, map_res},
    number::complete::{be_u32, u8},
    sequence::tuple,
    IResult,
};

use super::{frame, ParseableChunk};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IHDRChunk {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_type: ColorType,
    pub compression_method: u8,
    pub filter_method: u8,
    pub interlace_method: Interlacing,
}
impl IHDRChunk {
    /// Header for an 8-bit RGB image with deflate compression, adaptive
    /// filtering and no interlacing.
    pub fn truecolor(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bit_depth: 8,
            color_type: ColorType::Truecolor,
            compression_method: 0,
            filter_method: 0,
            interlace_method: Interlacing::None,
        }
    }

    /// Bytes per complete pixel, the distance filters look back.
    pub(crate) fn filter_width(&self) -> usize {
        let sample_width = usize::max(self.bit_depth as usize / 8, 1);
        self.color_type.channel_count() as usize * sample_width
    }

    /// Length of one scanline including its leading filter byte, or `None`
    /// if it doesn't fit in memory.
    pub(crate) fn scanline_size(&self) -> Option<usize> {
        let bits = (self.width as usize)
            .checked_mul(self.color_type.channel_count() as usize)?
            .checked_mul(self.bit_depth as usize)?;
        Some(bits.div_ceil(8) + 1)
    }
}
impl<'a> ParseableChunk<'a> for IHDRChunk {
    type Output = Vec<u8>;

    const HEADER: &'static [u8; 4] = b"IHDR";

    fn from_bytes(chunk_data: &'a [u8]) -> IResult<&'a [u8], Self> {
        let (
            rest,
            (width, height, bit_depth, color_type, compression_method, filter_method, interlace_method),
        ) = all_consuming(tuple((
            be_u32,
            be_u32,
            u8,
            map_res(u8, ColorType::try_from),
            u8,
            u8,
            map_res(u8, Interlacing::try_from),
        )))(chunk_data)?;
        Ok((
            rest,
            IHDRChunk {
                width,
                height,
                bit_depth,
                color_type,
                compression_method,
                filter_method,
                interlace_method,
            },
        ))
    }

    fn to_bytes(&self) -> Self::Output {
        let mut data = Vec::with_capacity(13);
        data.extend(self.width.to_be_bytes());
        data.extend(self.height.to_be_bytes());
        data.extend([
            self.bit_depth,
            self.color_type as u8,
            self.compression_method,
            self.filter_method,
            self.interlace_method as u8,
        ]);
        frame(Self::HEADER, &data)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorType {
    Greyscale = 0,
    Truecolor = 2,
    IndexedColor = 3,
    GreyscaleWithAlpha = 4,
    TruecolorWithAlpha = 6,
}
impl TryFrom<u8> for ColorType {
    type Error = u8;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Greyscale),
            2 => Ok(Self::Truecolor),
            3 => Ok(Self::IndexedColor),
            4 => Ok(Self::GreyscaleWithAlpha),
            6 => Ok(Self::TruecolorWithAlpha),
            other => Err(other),
        }
    }
}
impl ColorType {
    pub(crate) fn channel_count(&self) -> u8 {
        match self {
            Self::Greyscale => 1,
            Self::IndexedColor => 1,
            Self::GreyscaleWithAlpha => 2,
            Self::Truecolor => 3,
            Self::TruecolorWithAlpha => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interlacing {
    None = 0,
    Adam7 = 1,
}
impl TryFrom<u8> for Interlacing {
    type Error = u8;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Adam7),
            other => Err(other),
        }
    }
}
