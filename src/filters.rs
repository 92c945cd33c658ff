use anyhow::anyhow;

/// Per-scanline filter types (filter method 0).
///
/// `None` leaves bytes as they are and is what [`crate::EncodeOptions`] uses
/// unless told otherwise. The others predict each byte from its neighbours:
/// `a` is the byte one pixel to the left, `b` the byte above and `c` the byte
/// above and to the left, all zero outside the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    None = 0,
    Sub = 1,
    Up = 2,
    Average = 3,
    Paeth = 4,
}
impl Filter {
    pub const ALL: [Filter; 5] = [
        Filter::None,
        Filter::Sub,
        Filter::Up,
        Filter::Average,
        Filter::Paeth,
    ];

    pub fn filter(&self, x: u8, a: u8, b: u8, c: u8) -> u8 {
        x.wrapping_sub(self.predict(a, b, c))
    }

    pub fn reconstruct(&self, x: u8, a: u8, b: u8, c: u8) -> u8 {
        x.wrapping_add(self.predict(a, b, c))
    }

    fn predict(&self, a: u8, b: u8, c: u8) -> u8 {
        match self {
            Filter::None => 0,
            Filter::Sub => a,
            Filter::Up => b,
            Filter::Average => ((a as u16 + b as u16) / 2) as u8,
            Filter::Paeth => paeth_predictor(a, b, c),
        }
    }

    /// Appends the filtered form of `row` to `out`. `prev` is the unfiltered
    /// row above, all zeros for the first row.
    pub(crate) fn filter_row(&self, row: &[u8], prev: &[u8], bpp: usize, out: &mut Vec<u8>) {
        if *self == Filter::None {
            out.extend_from_slice(row);
            return;
        }
        for i in 0..row.len() {
            let (a, c) = if i >= bpp {
                (row[i - bpp], prev[i - bpp])
            } else {
                (0, 0)
            };
            out.push(self.filter(row[i], a, prev[i], c));
        }
    }

    /// Undoes [`Filter::filter_row`] in place. `prev` is the already
    /// reconstructed row above.
    pub(crate) fn reconstruct_row(&self, row: &mut [u8], prev: &[u8], bpp: usize) {
        if *self == Filter::None {
            return;
        }
        for i in 0..row.len() {
            let (a, c) = if i >= bpp {
                (row[i - bpp], prev[i - bpp])
            } else {
                (0, 0)
            };
            row[i] = self.reconstruct(row[i], a, prev[i], c);
        }
    }
}
impl TryFrom<u8> for Filter {
    type Error = anyhow::Error;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Sub),
            2 => Ok(Self::Up),
            3 => Ok(Self::Average),
            4 => Ok(Self::Paeth),
            i => Err(anyhow!("unknown scanline filter type {i}")),
        }
    }
}

fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
    let p = a as i16 + b as i16 - c as i16;
    let pa = (p - a as i16).abs();
    let pb = (p - b as i16).abs();
    let pc = (p - c as i16).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}
