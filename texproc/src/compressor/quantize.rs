//! Quantization of 8-bit RGBA pixels ahead of encoding.
//!
//! All functions work in place on tightly packed R, G, B, A bytes.

/// RGB565 bit depths used by the DXT colour endpoints.
pub const RGB565_BITS: [(usize, u32); 3] = [(0, 5), (1, 6), (2, 5)];

/// Alpha bit depth of DXT3 explicit alpha.
pub const ALPHA4_BITS: [(usize, u32); 1] = [(3, 4)];

/// Force alpha to 0 or 255 around `threshold`.
pub fn binary_alpha(pixels: &mut [u8], threshold: u8) {
    for px in pixels.chunks_exact_mut(4) {
        px[3] = if px[3] > threshold { 255 } else { 0 };
    }
}

/// Binary alpha with Floyd–Steinberg error diffusion.
pub fn dither_binary_alpha(pixels: &mut [u8], width: u32, height: u32, threshold: u8) {
    diffuse(pixels, width, height, 3, |value| {
        if value > f32::from(threshold) {
            255.0
        } else {
            0.0
        }
    });
}

/// Reduce channels to the given bit depths with Floyd–Steinberg dithering.
///
/// Each `(channel, bits)` pair is dithered independently; values are stored
/// back expanded to the 0..255 range.
pub fn dither_channels(pixels: &mut [u8], width: u32, height: u32, channels: &[(usize, u32)]) {
    for &(channel, bits) in channels {
        if bits == 0 || bits >= 8 {
            continue;
        }
        let levels = ((1u32 << bits) - 1) as f32;
        diffuse(pixels, width, height, channel, |value| {
            let q = (value.clamp(0.0, 255.0) * levels / 255.0).round();
            (q * 255.0 / levels).round()
        });
    }
}

/// Number of bits a channel mask selects.
pub fn mask_bits(mask: u32) -> u32 {
    mask.count_ones()
}

fn diffuse(pixels: &mut [u8], width: u32, height: u32, channel: usize, quantize: impl Fn(f32) -> f32) {
    let width = width as usize;
    let height = height as usize;
    if width == 0 || pixels.len() < width * height * 4 {
        return;
    }

    // Error carried into the current and next rows, padded by one on each side.
    let mut current = vec![0.0f32; width + 2];
    let mut next = vec![0.0f32; width + 2];

    for y in 0..height {
        for x in 0..width {
            let index = (y * width + x) * 4 + channel;
            let value = f32::from(pixels[index]) + current[x + 1];
            let quantized = quantize(value).clamp(0.0, 255.0);
            pixels[index] = quantized as u8;

            let error = value - quantized;
            current[x + 2] += error * 7.0 / 16.0;
            next[x] += error * 3.0 / 16.0;
            next[x + 1] += error * 5.0 / 16.0;
            next[x + 2] += error * 1.0 / 16.0;
        }
        std::mem::swap(&mut current, &mut next);
        next.iter_mut().for_each(|e| *e = 0.0);
    }
}
