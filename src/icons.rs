//! Placeholder icon sets for browser extensions.
//!
//! Whether rich drawing is available is the caller's call, passed in as a
//! [`Capability`]. When it isn't, icons fall back to a solid square that goes
//! straight through the PNG encoder.

use log::{debug, warn};
use serde_json::{json, Map, Value};

use crate::{error::Result, image::Image, pixel::Rgb};

/// Sizes a browser extension manifest asks for.
pub const STANDARD_SIZES: [u32; 4] = [16, 32, 48, 128];

pub const VUE_GREEN: Rgb = Rgb::new(65, 184, 131);
pub const REACT_BLUE: Rgb = Rgb::new(97, 218, 251);
pub const RECORDER_RED: Rgb = Rgb::new(255, 107, 107);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// A renderer able to draw the full icon is available.
    RichDrawing,
    FallbackOnly,
}

pub trait IconRenderer {
    /// Draws a `size` x `size` icon.
    fn render(&self, size: u32) -> Result<Image>;
}

/// Fills the whole icon with one colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolidFill {
    pub color: Rgb,
}
impl IconRenderer for SolidFill {
    fn render(&self, size: u32) -> Result<Image> {
        Image::filled(size, size, self.color)
    }
}

/// Renders with `rich` when the capability allows it and one was supplied,
/// otherwise with `fallback`.
pub fn render_icon(
    capability: Capability,
    rich: Option<&dyn IconRenderer>,
    fallback: &dyn IconRenderer,
    size: u32,
) -> Result<Image> {
    match (capability, rich) {
        (Capability::RichDrawing, Some(renderer)) => renderer.render(size),
        (Capability::RichDrawing, None) => {
            warn!("rich drawing requested without a renderer, using fallback for {size}px icon");
            fallback.render(size)
        }
        (Capability::FallbackOnly, _) => {
            debug!("rendering {size}px fallback icon");
            fallback.render(size)
        }
    }
}

/// [`render_icon`] packaged as a renderer, for [`IconSet::generate`].
#[derive(Clone, Copy)]
pub struct RendererChoice<'a> {
    pub capability: Capability,
    pub rich: Option<&'a dyn IconRenderer>,
    pub fallback: &'a dyn IconRenderer,
}
impl IconRenderer for RendererChoice<'_> {
    fn render(&self, size: u32) -> Result<Image> {
        render_icon(self.capability, self.rich, self.fallback, size)
    }
}

pub fn icon_file_name(size: u32) -> String {
    format!("icon{size}.png")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub size: u32,
    pub png: Vec<u8>,
}
impl Icon {
    pub fn file_name(&self) -> String {
        icon_file_name(self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IconSet {
    pub icons: Vec<Icon>,
}
impl IconSet {
    /// Renders and encodes one icon per size. Nothing is returned unless every
    /// size succeeds.
    pub fn generate(renderer: &dyn IconRenderer, sizes: &[u32]) -> Result<Self> {
        let icons = sizes
            .iter()
            .map(|&size| -> Result<Icon> {
                let png = renderer.render(size)?.encode()?;
                Ok(Icon { size, png })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { icons })
    }

    /// The `icons` object of an extension manifest, paths relative to the
    /// extension root with `dir` as the icon folder.
    pub fn manifest(&self, dir: &str) -> Value {
        let dir = dir.trim_end_matches('/');
        let entries: Map<String, Value> = self
            .icons
            .iter()
            .map(|icon| {
                (
                    icon.size.to_string(),
                    json!(format!("{dir}/{}", icon.file_name())),
                )
            })
            .collect();
        Value::Object(entries)
    }
}
