//! Minimal PNG writer for placeholder icons.
//!
//! Serializes 8-bit truecolor images into PNG files without an imaging library:
//! signature, `IHDR`, zlib-compressed `IDAT` and `IEND`, each chunk framed with
//! its length and CRC-32. A small reader for the same subset is included so the
//! output can be checked.

pub mod chunks;
mod decoder;
mod encoder;
mod error;
mod filters;
pub mod icons;
mod image;
mod image_data;
mod pixel;

pub use encoder::{encode, encode_rgb_bytes, encode_with_options, EncodeOptions};
pub use error::{PngError, Result};
pub use filters::Filter;
pub use image::Image;
pub use pixel::Rgb;
