use fallback_png::{
    chunks::{iter_chunks, parse_signature, Chunk},
    Image, Rgb,
};

// Written by the zlib-based fallback the icon scripts used.
const VUE_ICON: &[u8] = include_bytes!("vue16.png");
// 5x5, rows filtered None/Sub/Up/Average/Paeth, a pHYs chunk and a split IDAT.
const FILTERED: &[u8] = include_bytes!("filtered5.png");
// Hard-coded 1x1 fallback whose IDAT checksum is wrong.
const BAD_IDAT_CRC: &[u8] = include_bytes!("bad_idat_crc.png");

#[test]
fn decodes_externally_compressed_icon() {
    let image = Image::decode(VUE_ICON).unwrap();
    assert_eq!((image.width(), image.height()), (16, 16));
    assert!(image.pixels().iter().all(|&p| p == Rgb::new(65, 184, 131)));
}

#[test]
fn reconstructs_every_filter_type() {
    let image = Image::decode(FILTERED).unwrap();
    let expected = Image::from_fn(5, 5, |x, y| {
        Rgb::new(
            (x * 60 % 256) as u8,
            (y * 50 % 256) as u8,
            ((x * y * 13 + 7) % 256) as u8,
        )
    })
    .unwrap();
    assert_eq!(image, expected);
}

#[test]
fn lists_chunks_of_fixture() {
    let (rest, _) = parse_signature(FILTERED).unwrap();
    let types: Vec<String> = iter_chunks(rest)
        .map(|chunk| String::from_utf8_lossy(chunk.unwrap().chunk_type()).into_owned())
        .collect();
    insta::assert_snapshot!(
        types.join(" "),
        @"IHDR pHYs IDAT IDAT IDAT IDAT IDAT IDAT IDAT IDAT IDAT IDAT IDAT IEND"
    );
}

#[test]
fn rejects_chunk_with_wrong_crc() {
    let (rest, _) = parse_signature(BAD_IDAT_CRC).unwrap();
    let chunks: Vec<_> = iter_chunks(rest).collect();
    assert!(matches!(chunks[0], Ok(Chunk::IHDR(_))));
    assert!(matches!(chunks[1], Ok(Chunk::Unknown(_))));
    let err = chunks[2].as_ref().unwrap_err();
    assert_eq!(err.to_string(), "malformed chunk at byte 54: CRC mismatch");
    assert_eq!(chunks.len(), 3);

    assert!(Image::decode(BAD_IDAT_CRC).is_err());
}

#[test]
fn reencoding_reproduces_pixels() {
    let image = Image::decode(FILTERED).unwrap();
    let png = image.encode().unwrap();
    assert_eq!(Image::decode(&png).unwrap(), image);
}
