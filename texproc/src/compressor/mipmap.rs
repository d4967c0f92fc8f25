//! Floating-point working images and mip filtering.

use super::options::{InputFormat, MipmapFilter, WrapMode};

/// RGBA image with one `[f32; 4]` per pixel, channels in R, G, B, A order.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearImage {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 4]>,
}

impl LinearImage {
    /// Image filled with a single value.
    pub fn filled(width: u32, height: u32, value: [f32; 4]) -> Self {
        Self {
            width,
            height,
            pixels: vec![value; width as usize * height as usize],
        }
    }

    /// Decode 8-bit pixels into the 0..1 range.
    pub fn from_bytes(data: &[u8], width: u32, height: u32, format: InputFormat) -> Self {
        let pixels = data
            .chunks_exact(4)
            .map(|px| {
                let [r, g, b, a] = match format {
                    InputFormat::Rgba8 => [px[0], px[1], px[2], px[3]],
                    InputFormat::Bgra8 => [px[2], px[1], px[0], px[3]],
                };
                [unorm(r), unorm(g), unorm(b), unorm(a)]
            })
            .collect();
        Self { width, height, pixels }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[[f32; 4]] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [[f32; 4]] {
        &mut self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> [f32; 4] {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Texel lookup with out-of-range coordinates resolved by `wrap`.
    pub fn sample(&self, x: i64, y: i64, wrap: WrapMode) -> [f32; 4] {
        let x = wrap.resolve(x, self.width);
        let y = wrap.resolve(y, self.height);
        self.pixel(x as u32, y as u32)
    }

    /// Remove gamma from the colour channels.
    pub fn to_linear(&mut self, gamma: f32) {
        self.apply_gamma(gamma);
    }

    /// Apply gamma to the colour channels.
    pub fn to_gamma(&mut self, gamma: f32) {
        self.apply_gamma(1.0 / gamma);
    }

    fn apply_gamma(&mut self, exponent: f32) {
        if (exponent - 1.0).abs() <= f32::EPSILON {
            return;
        }
        for px in &mut self.pixels {
            for channel in &mut px[..3] {
                *channel = channel.max(0.0).powf(exponent);
            }
        }
    }

    /// Encode back to 8-bit R, G, B, A bytes.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels()
            .iter()
            .flat_map(|px| px.map(to_unorm8))
            .collect()
    }

    /// Renormalize every pixel as a normal packed into 0..1.
    pub fn normalize_normals(&mut self) {
        for px in &mut self.pixels {
            let n = [px[0] * 2.0 - 1.0, px[1] * 2.0 - 1.0, px[2] * 2.0 - 1.0];
            let length = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            if length > f32::EPSILON {
                for (channel, value) in px.iter_mut().zip(n) {
                    *channel = (value / length) * 0.5 + 0.5;
                }
            } else {
                px[0] = 0.5;
                px[1] = 0.5;
                px[2] = 1.0;
            }
        }
    }

    /// Next level of a mip chain: each axis halved and floored, minimum 1.
    pub fn downsample(&self, filter: MipmapFilter, wrap: WrapMode, alpha_weighted: bool) -> Self {
        self.resize(
            (self.width / 2).max(1),
            (self.height / 2).max(1),
            filter,
            wrap,
            alpha_weighted,
        )
    }

    /// Resample to an arbitrary extent with a separable filter.
    pub fn resize(&self, width: u32, height: u32, filter: MipmapFilter, wrap: WrapMode, alpha_weighted: bool) -> Self {
        if width == self.width && height == self.height {
            return self.clone();
        }
        let kernel = Kernel::from(filter);

        // Premultiplying colour by alpha before filtering weights it by coverage.
        let mut source = self.clone();
        if alpha_weighted {
            for px in &mut source.pixels {
                px[0] *= px[3];
                px[1] *= px[3];
                px[2] *= px[3];
            }
        }

        let horizontal = source.resample_rows(width, kernel, wrap);
        let mut result = horizontal.resample_columns(height, kernel, wrap);

        if alpha_weighted {
            for px in &mut result.pixels {
                if px[3] > f32::EPSILON {
                    px[0] /= px[3];
                    px[1] /= px[3];
                    px[2] /= px[3];
                }
            }
        }
        result
    }

    fn resample_rows(&self, new_width: u32, kernel: Kernel, wrap: WrapMode) -> Self {
        if new_width == self.width {
            return self.clone();
        }
        let taps = Kernel::taps(kernel, self.width, new_width);
        let mut pixels = Vec::with_capacity(new_width as usize * self.height as usize);
        for y in 0..self.height {
            for tap in &taps {
                pixels.push(tap.apply(|x| self.sample(x, i64::from(y), wrap)));
            }
        }
        Self {
            width: new_width,
            height: self.height,
            pixels,
        }
    }

    fn resample_columns(&self, new_height: u32, kernel: Kernel, wrap: WrapMode) -> Self {
        if new_height == self.height {
            return self.clone();
        }
        let taps = Kernel::taps(kernel, self.height, new_height);
        let mut pixels = Vec::with_capacity(self.width as usize * new_height as usize);
        for tap in &taps {
            for x in 0..self.width {
                pixels.push(tap.apply(|y| self.sample(i64::from(x), y, wrap)));
            }
        }
        Self {
            width: self.width,
            height: new_height,
            pixels,
        }
    }
}

fn unorm(value: u8) -> f32 {
    f32::from(value) / 255.0
}

fn to_unorm8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

// =============================================================================
// Kernels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Kernel {
    Box,
    Triangle,
    Lanczos3,
}

impl From<MipmapFilter> for Kernel {
    fn from(filter: MipmapFilter) -> Self {
        match filter {
            MipmapFilter::Box => Kernel::Box,
            MipmapFilter::Triangle => Kernel::Triangle,
            MipmapFilter::Kaiser => Kernel::Lanczos3,
        }
    }
}

impl Kernel {
    fn support(self) -> f32 {
        match self {
            Kernel::Box => 0.5,
            Kernel::Triangle => 1.0,
            Kernel::Lanczos3 => 3.0,
        }
    }

    fn weight(self, x: f32) -> f32 {
        let x = x.abs();
        match self {
            Kernel::Box => {
                if x <= 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            Kernel::Triangle => (1.0 - x).max(0.0),
            Kernel::Lanczos3 => {
                if x < 3.0 {
                    sinc(x) * sinc(x / 3.0)
                } else {
                    0.0
                }
            }
        }
    }

    /// Per-output-sample source taps for resampling `src_len` to `dst_len`.
    fn taps(kernel: Kernel, src_len: u32, dst_len: u32) -> Vec<Tap> {
        let scale = src_len as f32 / dst_len as f32;
        // Minification widens the kernel to cover the source footprint.
        let stretch = scale.max(1.0);
        let radius = kernel.support() * stretch;

        (0..dst_len)
            .map(|i| {
                let center = (i as f32 + 0.5) * scale - 0.5;
                let first = (center - radius).floor() as i64;
                let last = (center + radius).ceil() as i64;
                let mut entries: Vec<(i64, f32)> = (first..=last)
                    .map(|s| (s, kernel.weight((s as f32 - center) / stretch)))
                    .filter(|&(_, w)| w != 0.0)
                    .collect();
                let total: f32 = entries.iter().map(|&(_, w)| w).sum();
                if total.abs() > f32::EPSILON {
                    for entry in &mut entries {
                        entry.1 /= total;
                    }
                } else {
                    entries = vec![(center.round() as i64, 1.0)];
                }
                Tap { entries }
            })
            .collect()
    }
}

struct Tap {
    entries: Vec<(i64, f32)>,
}

impl Tap {
    fn apply(&self, fetch: impl Fn(i64) -> [f32; 4]) -> [f32; 4] {
        let mut out = [0.0; 4];
        for &(index, weight) in &self.entries {
            let px = fetch(index);
            for (acc, value) in out.iter_mut().zip(px) {
                *acc += value * weight;
            }
        }
        out
    }
}

fn sinc(x: f32) -> f32 {
    if x.abs() < 1e-6 {
        1.0
    } else {
        let px = std::f32::consts::PI * x;
        px.sin() / px
    }
}
