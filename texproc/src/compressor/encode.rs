//! Level encoders.
//!
//! BC1 and BC3 blocks come from the ISPC compressor in `intel_tex_2`. The
//! other block formats are derived from those:
//!
//! | Format | Derivation |
//! |--------|------------|
//! | DXT1a  | BC1, blocks with transparent texels rebuilt in 3-colour mode |
//! | DXT3   | BC3 colour half, alpha half replaced by explicit 4-bit alpha |
//! | DXT5n  | BC3 of the swizzle (R=1, G=y, B=0, A=x) |
//!
//! Partial blocks at the right and bottom edges are padded by replicating
//! the last column and row.

use intel_tex_2::{bc1, bc3, RgbaSurface};

use super::options::{Format, PixelFormat};
use super::quantize::mask_bits;
use crate::texture::BLOCK_DIMENSION;

/// Alpha below this is transparent in DXT1a blocks.
const PUNCH_THROUGH_ALPHA: u8 = 128;

/// Encode one level of tightly packed R, G, B, A bytes.
pub fn encode_level(format: Format, pixel_format: Option<PixelFormat>, rgba: &[u8], width: u32, height: u32) -> Vec<u8> {
    match format {
        Format::Rgba => match pixel_format {
            Some(pixel_format) => pack_pixels(&pixel_format, rgba, width, height),
            None => rgba.to_vec(),
        },
        Format::Dxt1 => compress_bc1(rgba, width, height),
        Format::Dxt1a => compress_dxt1a(rgba, width, height),
        Format::Dxt3 => compress_dxt3(rgba, width, height),
        Format::Dxt5 => compress_bc3(rgba, width, height),
        Format::Dxt5n => {
            let swizzled: Vec<u8> = rgba
                .chunks_exact(4)
                .flat_map(|px| [255, px[1], 0, px[0]])
                .collect();
            compress_bc3(&swizzled, width, height)
        }
    }
}

/// Extend an image to whole 4×4 blocks by edge replication.
pub fn pad_to_blocks(rgba: &[u8], width: u32, height: u32) -> (Vec<u8>, u32, u32) {
    let padded_width = width.div_ceil(BLOCK_DIMENSION).max(1) * BLOCK_DIMENSION;
    let padded_height = height.div_ceil(BLOCK_DIMENSION).max(1) * BLOCK_DIMENSION;
    if padded_width == width && padded_height == height {
        return (rgba.to_vec(), width, height);
    }

    let (width, height) = (width.max(1) as usize, height.max(1) as usize);
    let mut padded = Vec::with_capacity(padded_width as usize * padded_height as usize * 4);
    for y in 0..padded_height as usize {
        let row = y.min(height - 1) * width * 4;
        for x in 0..padded_width as usize {
            let offset = row + x.min(width - 1) * 4;
            padded.extend_from_slice(&rgba[offset..offset + 4]);
        }
    }
    (padded, padded_width, padded_height)
}

fn surface_of(padded: &[u8], width: u32, height: u32) -> RgbaSurface<'_> {
    RgbaSurface {
        data: padded,
        width,
        height,
        stride: width * 4,
    }
}

fn compress_bc1(rgba: &[u8], width: u32, height: u32) -> Vec<u8> {
    let (padded, w, h) = pad_to_blocks(rgba, width, height);
    bc1::compress_blocks(&surface_of(&padded, w, h))
}

fn compress_bc3(rgba: &[u8], width: u32, height: u32) -> Vec<u8> {
    let (padded, w, h) = pad_to_blocks(rgba, width, height);
    bc3::compress_blocks(&surface_of(&padded, w, h))
}

/// Texels of each block in block order, 16 RGBA texels per block.
fn block_texels(padded: &[u8], width: u32, height: u32) -> Vec<[[u8; 4]; 16]> {
    let blocks_wide = (width / BLOCK_DIMENSION) as usize;
    let blocks_high = (height / BLOCK_DIMENSION) as usize;
    let stride = width as usize * 4;

    let mut blocks = Vec::with_capacity(blocks_wide * blocks_high);
    for by in 0..blocks_high {
        for bx in 0..blocks_wide {
            let mut texels = [[0u8; 4]; 16];
            for (i, texel) in texels.iter_mut().enumerate() {
                let (tx, ty) = (i % 4, i / 4);
                let offset = (by * 4 + ty) * stride + (bx * 4 + tx) * 4;
                texel.copy_from_slice(&padded[offset..offset + 4]);
            }
            blocks.push(texels);
        }
    }
    blocks
}

fn compress_dxt1a(rgba: &[u8], width: u32, height: u32) -> Vec<u8> {
    let (padded, w, h) = pad_to_blocks(rgba, width, height);
    let mut encoded = bc1::compress_blocks(&surface_of(&padded, w, h));

    for (block, texels) in encoded.chunks_exact_mut(8).zip(block_texels(&padded, w, h)) {
        if texels.iter().any(|t| t[3] < PUNCH_THROUGH_ALPHA) {
            block.copy_from_slice(&punch_through_block(&texels));
        }
    }
    encoded
}

/// 3-colour BC1 block where index 3 is transparent black.
fn punch_through_block(texels: &[[u8; 4]; 16]) -> [u8; 8] {
    let opaque: Vec<[u8; 4]> = texels
        .iter()
        .copied()
        .filter(|t| t[3] >= PUNCH_THROUGH_ALPHA)
        .collect();
    if opaque.is_empty() {
        return [0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF];
    }

    let mut low = [u8::MAX; 3];
    let mut high = [u8::MIN; 3];
    for texel in &opaque {
        for c in 0..3 {
            low[c] = low[c].min(texel[c]);
            high[c] = high[c].max(texel[c]);
        }
    }

    // 3-colour mode requires color0 <= color1.
    let (a, b) = (pack_565(low), pack_565(high));
    let (c0, c1) = if a <= b { (a, b) } else { (b, a) };
    let p0 = unpack_565(c0);
    let p1 = unpack_565(c1);
    let p2 = [
        (p0[0] + p1[0]) / 2,
        (p0[1] + p1[1]) / 2,
        (p0[2] + p1[2]) / 2,
    ];
    let palette = [p0, p1, p2];

    let mut indices = 0u32;
    for (i, texel) in texels.iter().enumerate() {
        let index = if texel[3] < PUNCH_THROUGH_ALPHA {
            3
        } else {
            nearest(&palette, texel)
        };
        indices |= index << (2 * i);
    }

    let mut block = [0u8; 8];
    block[0..2].copy_from_slice(&c0.to_le_bytes());
    block[2..4].copy_from_slice(&c1.to_le_bytes());
    block[4..8].copy_from_slice(&indices.to_le_bytes());
    block
}

fn nearest(palette: &[[u32; 3]; 3], texel: &[u8; 4]) -> u32 {
    let distance = |p: &[u32; 3]| -> u32 {
        (0..3)
            .map(|c| {
                let d = p[c].abs_diff(u32::from(texel[c]));
                d * d
            })
            .sum()
    };
    let mut best = 0;
    for (index, entry) in palette.iter().enumerate().skip(1) {
        if distance(entry) < distance(&palette[best]) {
            best = index;
        }
    }
    best as u32
}

fn pack_565(rgb: [u8; 3]) -> u16 {
    let r = (u16::from(rgb[0]) * 31 + 127) / 255;
    let g = (u16::from(rgb[1]) * 63 + 127) / 255;
    let b = (u16::from(rgb[2]) * 31 + 127) / 255;
    (r << 11) | (g << 5) | b
}

fn unpack_565(color: u16) -> [u32; 3] {
    let r = u32::from(color >> 11) & 0x1F;
    let g = u32::from(color >> 5) & 0x3F;
    let b = u32::from(color) & 0x1F;
    [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2)]
}

fn compress_dxt3(rgba: &[u8], width: u32, height: u32) -> Vec<u8> {
    let (padded, w, h) = pad_to_blocks(rgba, width, height);
    let mut encoded = bc3::compress_blocks(&surface_of(&padded, w, h));

    for (block, texels) in encoded.chunks_exact_mut(16).zip(block_texels(&padded, w, h)) {
        let mut alpha = 0u64;
        for (i, texel) in texels.iter().enumerate() {
            let a4 = (u64::from(texel[3]) * 15 + 127) / 255;
            alpha |= a4 << (4 * i);
        }
        block[0..8].copy_from_slice(&alpha.to_le_bytes());
    }
    encoded
}

/// Pack pixels through an explicit bit layout, rows padded to 32 bits.
fn pack_pixels(pixel_format: &PixelFormat, rgba: &[u8], width: u32, height: u32) -> Vec<u8> {
    let bytes_per_pixel = (pixel_format.bit_count / 8) as usize;
    let pitch = pixel_format.pitch(width);
    let masks = pixel_format.masks();
    let mut packed = vec![0u8; pitch * height as usize];

    for (y, row) in rgba.chunks_exact(width as usize * 4).enumerate().take(height as usize) {
        for (x, px) in row.chunks_exact(4).enumerate() {
            let mut value = 0u32;
            for (channel, &mask) in masks.iter().enumerate() {
                if mask == 0 {
                    continue;
                }
                let bits = mask_bits(mask);
                let max = (1u64 << bits) - 1;
                let scaled = ((u64::from(px[channel]) * max + 127) / 255) as u32;
                value |= (scaled << mask.trailing_zeros()) & mask;
            }
            let offset = y * pitch + x * bytes_per_pixel;
            packed[offset..offset + bytes_per_pixel].copy_from_slice(&value.to_le_bytes()[..bytes_per_pixel]);
        }
    }
    packed
}
