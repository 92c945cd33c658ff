use std::num::NonZeroUsize;

use fallback_png::{encode, encode_rgb_bytes, EncodeOptions, Filter, Image, PngError, Rgb};
use miniz_oxide::inflate::decompress_to_vec_zlib;
use rand::{rngs::StdRng, Rng, SeedableRng};

const SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];

struct RawChunk<'a> {
    chunk_type: [u8; 4],
    declared_len: usize,
    data: &'a [u8],
    crc: u32,
}

/// Splits a datastream by its length fields without any help from the crate.
fn split_chunks(png: &[u8]) -> Vec<RawChunk<'_>> {
    assert_eq!(&png[..8], &SIGNATURE);
    let mut chunks = vec![];
    let mut rest = &png[8..];
    while !rest.is_empty() {
        let declared_len = u32::from_be_bytes(rest[0..4].try_into().unwrap()) as usize;
        let chunk_type = rest[4..8].try_into().unwrap();
        let data = &rest[8..8 + declared_len];
        let crc = u32::from_be_bytes(rest[8 + declared_len..12 + declared_len].try_into().unwrap());
        chunks.push(RawChunk {
            chunk_type,
            declared_len,
            data,
            crc,
        });
        rest = &rest[12 + declared_len..];
    }
    chunks
}

/// Bit-at-a-time CRC-32, independent of the crate's table.
fn reference_crc(bytes: &[u8]) -> u32 {
    let mut crc = 0xffff_ffffu32;
    for &byte in bytes {
        crc ^= byte as u32;
        for _ in 0..8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ 0xedb8_8320
            } else {
                crc >> 1
            };
        }
    }
    crc ^ 0xffff_ffff
}

fn decode_with_png_crate(bytes: &[u8]) -> (u32, u32, Vec<u8>) {
    let decoder = png::Decoder::new(bytes);
    let mut reader = decoder.read_info().unwrap();
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).unwrap();
    assert_eq!(info.color_type, png::ColorType::Rgb);
    assert_eq!(info.bit_depth, png::BitDepth::Eight);
    buf.truncate(info.buffer_size());
    (info.width, info.height, buf)
}

fn layout(png: &[u8]) -> String {
    split_chunks(png)
        .iter()
        .map(|c| {
            let name = String::from_utf8_lossy(&c.chunk_type).into_owned();
            if &c.chunk_type == b"IDAT" {
                name
            } else {
                format!("{name}:{}", c.declared_len)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn single_red_pixel() {
    let png = encode(1, 1, &[Rgb::new(255, 0, 0)]).unwrap();
    insta::assert_snapshot!(layout(&png), @"IHDR:13 IDAT IEND:0");

    let (width, height, pixels) = decode_with_png_crate(&png);
    assert_eq!((width, height), (1, 1));
    assert_eq!(pixels, [255, 0, 0]);

    let image = Image::decode(&png).unwrap();
    assert_eq!(image.pixels(), &[Rgb::new(255, 0, 0)]);
}

#[test]
fn header_fields() {
    let png = encode(1, 1, &[Rgb::new(255, 0, 0)]).unwrap();
    let ihdr = &split_chunks(&png)[0];
    insta::assert_snapshot!(
        format!("{:02x?}", ihdr.data),
        @"[00, 00, 00, 01, 00, 00, 00, 01, 08, 02, 00, 00, 00]"
    );
}

#[test]
fn structure_and_checksums() {
    let image = Image::from_fn(23, 9, |x, y| Rgb::new(x as u8 * 11, y as u8 * 27, 200)).unwrap();
    for filter in Filter::ALL {
        let options = EncodeOptions {
            filter,
            max_idat_len: NonZeroUsize::new(64),
            ..EncodeOptions::default()
        };
        let png = image.encode_with(&options).unwrap();
        let chunks = split_chunks(&png);

        assert_eq!(&chunks[0].chunk_type, b"IHDR");
        let last = chunks.last().unwrap();
        assert_eq!(&last.chunk_type, b"IEND");
        assert!(last.data.is_empty());
        assert!(chunks[1..chunks.len() - 1]
            .iter()
            .all(|c| &c.chunk_type == b"IDAT"));

        for chunk in &chunks {
            assert_eq!(chunk.declared_len, chunk.data.len());
            let mut covered = chunk.chunk_type.to_vec();
            covered.extend_from_slice(chunk.data);
            assert_eq!(chunk.crc, reference_crc(&covered));
        }
    }
}

#[test]
fn none_filter_matches_plain_scanline_layout() {
    let png = encode_rgb_bytes(2, 2, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]).unwrap();
    let idat: Vec<u8> = split_chunks(&png)
        .iter()
        .filter(|c| &c.chunk_type == b"IDAT")
        .flat_map(|c| c.data.iter().copied())
        .collect();
    assert_eq!(
        decompress_to_vec_zlib(&idat).unwrap(),
        [0, 1, 2, 3, 4, 5, 6, 0, 7, 8, 9, 10, 11, 12]
    );
}

#[test]
fn uniform_react_icon() {
    let color = Rgb::new(97, 218, 251);
    let png = Image::filled(16, 16, color).unwrap().encode().unwrap();
    let (width, height, pixels) = decode_with_png_crate(&png);
    assert_eq!((width, height), (16, 16));
    assert_eq!(pixels.len(), 16 * 16 * 3);
    assert!(pixels.chunks_exact(3).all(|p| p == [97, 218, 251]));
}

#[test]
fn large_uniform_image_compresses() {
    let png = Image::filled(128, 128, Rgb::new(65, 184, 131))
        .unwrap()
        .encode()
        .unwrap();
    assert!(png.len() < 1_000, "{} bytes", png.len());
    let (width, height, pixels) = decode_with_png_crate(&png);
    assert_eq!((width, height), (128, 128));
    assert!(pixels.chunks_exact(3).all(|p| p == [65, 184, 131]));
}

#[test]
fn zero_width_is_rejected() {
    let err = encode(0, 16, &[]).unwrap_err();
    assert!(matches!(err, PngError::InvalidImageData(_)));
    assert!(encode_rgb_bytes(0, 1, &[]).is_err());
}

#[test]
fn mismatched_buffer_is_rejected() {
    let err = encode_rgb_bytes(2, 2, &[0; 11]).unwrap_err();
    assert!(matches!(err, PngError::InvalidImageData(_)));
}

#[test]
fn output_is_deterministic() {
    let image = Image::from_fn(48, 48, |x, y| Rgb::new(x as u8, y as u8, (x ^ y) as u8)).unwrap();
    let options = EncodeOptions {
        filter: Filter::Paeth,
        ..EncodeOptions::default()
    };
    assert_eq!(image.encode().unwrap(), image.encode().unwrap());
    assert_eq!(
        image.encode_with(&options).unwrap(),
        image.encode_with(&options).unwrap()
    );
}

#[test]
fn random_images_round_trip() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..20 {
        let width = rng.gen_range(1..=40u32);
        let height = rng.gen_range(1..=40u32);
        let mut bytes = vec![0u8; (width * height * 3) as usize];
        rng.fill(bytes.as_mut_slice());
        let filter = Filter::ALL[rng.gen_range(0..Filter::ALL.len())];
        let options = EncodeOptions {
            filter,
            compression_level: rng.gen_range(0..=10),
            max_idat_len: NonZeroUsize::new(rng.gen_range(0..512)),
        };
        let image = Image::new(
            width,
            height,
            bytes.chunks_exact(3).map(|p| Rgb::new(p[0], p[1], p[2])).collect(),
        )
        .unwrap();
        let png = image.encode_with(&options).unwrap();

        let (w, h, pixels) = decode_with_png_crate(&png);
        assert_eq!((w, h), (width, height));
        assert_eq!(pixels, bytes, "{options:?}");
        assert_eq!(Image::decode(&png).unwrap(), image);
    }
}
