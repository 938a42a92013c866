//! Tests for PNG encoding functionality.
//!
//! The images are decoded again with a minimal chunk reader and `flate2`,
//! so the pixel content is checked, not just the signature.

use std::io::Read;

use renderer::png::{create_png, encode_png, PngEncoding};

// ============================================================================
// Helper functions
// ============================================================================

struct Chunk {
    kind: [u8; 4],
    data: Vec<u8>,
}

fn read_chunks(png: &[u8]) -> Vec<Chunk> {
    assert_eq!(&png[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
    let mut chunks = Vec::new();
    let mut pos = 8;
    while pos < png.len() {
        let len = u32::from_be_bytes(png[pos..pos + 4].try_into().unwrap()) as usize;
        let kind: [u8; 4] = png[pos + 4..pos + 8].try_into().unwrap();
        let data = png[pos + 8..pos + 8 + len].to_vec();
        let crc = u32::from_be_bytes(png[pos + 8 + len..pos + 12 + len].try_into().unwrap());
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&kind);
        hasher.update(&data);
        assert_eq!(hasher.finalize(), crc, "bad CRC in {:?}", kind);
        chunks.push(Chunk { kind, data });
        pos += 12 + len;
    }
    chunks
}

fn find<'a>(chunks: &'a [Chunk], kind: &[u8; 4]) -> Option<&'a Chunk> {
    chunks.iter().find(|c| &c.kind == kind)
}

/// Decode an 8-bit indexed or RGBA PNG written without filters.
fn decode(png: &[u8]) -> (usize, usize, Vec<u8>) {
    let chunks = read_chunks(png);
    let ihdr = &find(&chunks, b"IHDR").unwrap().data;
    let width = u32::from_be_bytes(ihdr[0..4].try_into().unwrap()) as usize;
    let height = u32::from_be_bytes(ihdr[4..8].try_into().unwrap()) as usize;
    let color_type = ihdr[9];

    let mut raw = Vec::new();
    flate2::read::ZlibDecoder::new(&find(&chunks, b"IDAT").unwrap().data[..])
        .read_to_end(&mut raw)
        .unwrap();

    let bpp = if color_type == 3 { 1 } else { 4 };
    let mut rgba = Vec::with_capacity(width * height * 4);
    for line in raw.chunks_exact(1 + width * bpp) {
        assert_eq!(line[0], 0, "filter byte");
        if color_type == 3 {
            let plte = &find(&chunks, b"PLTE").unwrap().data;
            let trns = find(&chunks, b"tRNS").map(|c| c.data.clone());
            for &idx in &line[1..] {
                let i = idx as usize;
                rgba.extend_from_slice(&plte[i * 3..i * 3 + 3]);
                rgba.push(trns.as_ref().map_or(255, |t| t[i]));
            }
        } else {
            rgba.extend_from_slice(&line[1..]);
        }
    }
    (width, height, rgba)
}

fn banded_pixels(width: usize, height: usize, colors: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for x in 0..width {
            let band = ((x + y) * colors / (width + height)) as u8;
            pixels.extend_from_slice(&[band, 255 - band, band / 2, 255]);
        }
    }
    pixels
}

// ============================================================================
// Encoding selection
// ============================================================================

#[test]
fn test_few_colors_use_indexed() {
    let pixels = banded_pixels(32, 16, 10);
    let (png, encoding) = encode_png(&pixels, 32, 16).unwrap();
    assert!(matches!(encoding, PngEncoding::Indexed { palette_size } if palette_size <= 10));
    assert_eq!(decode(&png), (32, 16, pixels));
}

#[test]
fn test_large_image_parallel_path_roundtrip() {
    let pixels = banded_pixels(256, 128, 40);
    let (png, encoding) = encode_png(&pixels, 256, 128).unwrap();
    assert!(matches!(encoding, PngEncoding::Indexed { .. }));
    assert_eq!(decode(&png).2, pixels);
}

#[test]
fn test_many_colors_fall_back_to_rgba() {
    let pixels: Vec<u8> = (0..600u32)
        .flat_map(|i| [(i % 256) as u8, (i / 256) as u8, 7, 255])
        .collect();
    let (png, encoding) = encode_png(&pixels, 30, 20).unwrap();
    assert_eq!(encoding, PngEncoding::Rgba);
    assert_eq!(decode(&png), (30, 20, pixels));
}

#[test]
fn test_transparency_written_to_trns() {
    let pixels = [10, 20, 30, 255, 0, 0, 0, 0];
    let (png, _) = encode_png(&pixels, 2, 1).unwrap();
    let chunks = read_chunks(&png);
    assert_eq!(find(&chunks, b"tRNS").unwrap().data.len(), 2);
    assert_eq!(decode(&png).2, pixels.to_vec());
}

#[test]
fn test_opaque_image_has_no_trns() {
    let pixels = [10, 20, 30, 255, 40, 50, 60, 255];
    let (png, _) = encode_png(&pixels, 2, 1).unwrap();
    assert!(find(&read_chunks(&png), b"tRNS").is_none());
}

#[test]
fn test_indexed_smaller_than_rgba_for_banded_data() {
    let pixels = banded_pixels(256, 256, 20);
    let (indexed, _) = encode_png(&pixels, 256, 256).unwrap();
    let rgba = create_png(&pixels, 256, 256).unwrap();
    assert!(indexed.len() < rgba.len());
}

#[test]
fn test_buffer_size_checked() {
    assert!(encode_png(&[0, 0, 0], 1, 1).is_err());
    assert!(create_png(&[0; 8], 1, 1).is_err());
    assert!(encode_png(&[], 0, 0).is_err());
}
