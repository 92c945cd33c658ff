use crate::{
    decoder::PNGDecoder,
    encoder::{check_dimensions, encode_with_options, EncodeOptions},
    error::Result,
    image_data::decompress_data,
    pixel::Rgb,
};

/// An RGB image, always non-empty with exactly `width * height` pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl Image {
    pub fn new(width: u32, height: u32, pixels: Vec<Rgb>) -> Result<Self> {
        check_dimensions(width, height, pixels.len())?;
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn filled(width: u32, height: u32, color: Rgb) -> Result<Self> {
        Self::from_fn(width, height, |_, _| color)
    }

    /// Builds an image by calling `f(x, y)` for every pixel, row by row.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Rgb) -> Result<Self> {
        check_dimensions(width, height, width as usize * height as usize)?;
        let pixels = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// PNG bytes with the default [`EncodeOptions`].
    pub fn encode(&self) -> Result<Vec<u8>> {
        encode_with_options(self, &EncodeOptions::default())
    }

    pub fn encode_with(&self, options: &EncodeOptions) -> Result<Vec<u8>> {
        encode_with_options(self, options)
    }

    /// Reads back an 8-bit truecolor, non-interlaced PNG.
    pub fn decode(bytes: &[u8]) -> anyhow::Result<Self> {
        let (decoder, header) = PNGDecoder::new(bytes)?.parse_ihdr()?;
        let compressed = decoder.read_image_data()?;
        let data = decompress_data(&compressed, &header)?;
        let pixels = data.chunks_exact(3).map(|p| Rgb::new(p[0], p[1], p[2])).collect();
        Ok(Self::new(header.width, header.height, pixels)?)
    }
}
