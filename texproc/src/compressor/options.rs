//! Input and compression options of the compressor boundary.
//!
//! [`InputOptions`] describes the source texture: its layout, the raw RGBA
//! bytes of each (face, mip) slot, and the preprocessing to apply.
//! [`CompressionOptions`] selects the output encoding and quantization.
//!
//! The layout must be declared with [`InputOptions::set_texture_layout`]
//! before any mip data is supplied.

use serde::{Deserialize, Serialize};

use crate::texture::{full_mip_count, mip_extent, PixelEncoding, TextureType, RGBA_BYTES_PER_PIXEL};

/// Default alpha threshold for binary alpha quantization.
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 127;

/// Default gamma applied on input and output.
pub const DEFAULT_GAMMA: f32 = 2.2;

// =============================================================================
// Option enums
// =============================================================================

/// Compressor output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    /// Uncompressed pixels, optionally through an explicit bit layout.
    Rgba,
    Dxt1,
    /// DXT1 with 1-bit (punch-through) alpha.
    Dxt1a,
    Dxt3,
    Dxt5,
    /// DXT5 with the normal swizzled into green and alpha.
    Dxt5n,
}

impl Format {
    /// Encoding of the bytes this format produces.
    pub fn encoding(self) -> PixelEncoding {
        match self {
            Format::Rgba => PixelEncoding::Rgba8,
            Format::Dxt1 | Format::Dxt1a => PixelEncoding::Dxt1,
            Format::Dxt3 => PixelEncoding::Dxt3,
            Format::Dxt5 | Format::Dxt5n => PixelEncoding::Dxt5,
        }
    }

    pub fn is_block_compressed(self) -> bool {
        !matches!(self, Format::Rgba)
    }
}

/// Compression quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    Fastest,
    Normal,
    Production,
    Highest,
}

/// How texel lookups outside the image are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapMode {
    Clamp,
    Repeat,
    Mirror,
}

impl WrapMode {
    /// Map a possibly out-of-range coordinate into `0..len`.
    pub fn resolve(self, coord: i64, len: u32) -> usize {
        let len = i64::from(len.max(1));
        let resolved = match self {
            WrapMode::Clamp => coord.clamp(0, len - 1),
            WrapMode::Repeat => coord.rem_euclid(len),
            WrapMode::Mirror => {
                if len == 1 {
                    0
                } else {
                    let period = 2 * (len - 1);
                    let folded = coord.rem_euclid(period);
                    if folded < len {
                        folded
                    } else {
                        period - folded
                    }
                }
            }
        };
        resolved as usize
    }
}

/// Filter used to build each mip level from the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MipmapFilter {
    Box,
    Triangle,
    /// Windowed sinc.
    Kaiser,
}

/// Rounding applied to the target extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundMode {
    None,
    ToNextPowerOfTwo,
    ToNearestPowerOfTwo,
    ToPreviousPowerOfTwo,
}

impl RoundMode {
    fn apply(self, value: u32) -> u32 {
        match self {
            RoundMode::None => value,
            RoundMode::ToNextPowerOfTwo => next_power_of_two(value),
            RoundMode::ToNearestPowerOfTwo => {
                let next = next_power_of_two(value);
                let previous = previous_power_of_two(value);
                if next - value <= value - previous {
                    next
                } else {
                    previous
                }
            }
            RoundMode::ToPreviousPowerOfTwo => previous_power_of_two(value),
        }
    }
}

/// Alpha channel interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlphaMode {
    None,
    /// Alpha is coverage; colour is alpha-weighted when filtering.
    Transparency,
}

/// Byte order of the supplied mip data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputFormat {
    Bgra8,
    Rgba8,
}

/// Explicit bit layout for uncompressed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelFormat {
    pub bit_count: u32,
    pub red_mask: u32,
    pub green_mask: u32,
    pub blue_mask: u32,
    pub alpha_mask: u32,
}

impl PixelFormat {
    pub fn new(bit_count: u32, red_mask: u32, green_mask: u32, blue_mask: u32, alpha_mask: u32) -> Self {
        Self {
            bit_count,
            red_mask,
            green_mask,
            blue_mask,
            alpha_mask,
        }
    }

    /// Byte-aligned layouts the encoder can pack.
    pub fn is_supported(&self) -> bool {
        matches!(self.bit_count, 8 | 16 | 24 | 32)
    }

    /// Bytes per row, rounded up to 32 bits.
    pub fn pitch(&self, width: u32) -> usize {
        self.encoding().row_pitch(width).unwrap_or(0)
    }

    pub fn masks(&self) -> [u32; 4] {
        [self.red_mask, self.green_mask, self.blue_mask, self.alpha_mask]
    }

    /// Encoding of levels packed with this layout.
    pub fn encoding(&self) -> PixelEncoding {
        PixelEncoding::Packed {
            bit_count: self.bit_count,
            masks: self.masks(),
        }
    }
}

fn next_power_of_two(value: u32) -> u32 {
    value.max(1).checked_next_power_of_two().unwrap_or(1 << 31)
}

fn previous_power_of_two(value: u32) -> u32 {
    let value = value.max(1);
    1 << (31 - value.leading_zeros())
}

// =============================================================================
// Input options
// =============================================================================

/// Raw pixels of one (face, mip) slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputImage {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub data: Vec<u8>,
}

/// Declared source layout and its mip data slots.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureLayout {
    texture_type: TextureType,
    width: u32,
    height: u32,
    depth: u32,
    mip_count: u32,
    images: Vec<Option<InputImage>>,
}

impl TextureLayout {
    pub fn texture_type(&self) -> TextureType {
        self.texture_type
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn face_count(&self) -> u32 {
        self.texture_type.face_count() as u32
    }

    /// Slots per face: a full chain down to 1×1×1.
    pub fn mip_count(&self) -> u32 {
        self.mip_count
    }

    /// Supplied data for a slot.
    pub fn image(&self, face: u32, mip: u32) -> Option<&InputImage> {
        if face >= self.face_count() || mip >= self.mip_count {
            return None;
        }
        self.images
            .get((face * self.mip_count + mip) as usize)
            .and_then(Option::as_ref)
    }

    fn slot_extent(&self, mip: u32) -> (u32, u32, u32) {
        let (w, h) = mip_extent(self.width, self.height, mip);
        (w, h, (self.depth >> mip.min(31)).max(1))
    }
}

/// Source description and preprocessing settings.
#[derive(Debug, Clone, PartialEq)]
pub struct InputOptions {
    layout: Option<TextureLayout>,
    input_format: InputFormat,
    alpha_mode: AlphaMode,
    input_gamma: f32,
    output_gamma: f32,
    wrap_mode: WrapMode,
    mipmap_filter: MipmapFilter,
    generate_mipmaps: bool,
    max_level: Option<u32>,
    round_mode: RoundMode,
    max_extent: Option<u32>,
    normal_map: bool,
    convert_to_normal_map: bool,
    height_factors: [f32; 4],
    normalize_mipmaps: bool,
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            layout: None,
            input_format: InputFormat::Bgra8,
            alpha_mode: AlphaMode::None,
            input_gamma: DEFAULT_GAMMA,
            output_gamma: DEFAULT_GAMMA,
            wrap_mode: WrapMode::Mirror,
            mipmap_filter: MipmapFilter::Box,
            generate_mipmaps: true,
            max_level: None,
            round_mode: RoundMode::None,
            max_extent: None,
            normal_map: false,
            convert_to_normal_map: false,
            height_factors: [0.0, 0.0, 0.0, 1.0],
            normalize_mipmaps: true,
        }
    }
}

impl InputOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the declared layout and every supplied level.
    pub fn reset_texture_layout(&mut self) {
        self.layout = None;
    }

    /// Declare the texture layout.
    ///
    /// Zero extents are treated as 1. Every (face, mip) slot of a full
    /// chain is created empty.
    pub fn set_texture_layout(&mut self, texture_type: TextureType, width: u32, height: u32, depth: u32) {
        let width = width.max(1);
        let height = height.max(1);
        let depth = depth.max(1);
        let mip_count = full_mip_count(width.max(depth), height);
        let slots = texture_type.face_count() * mip_count as usize;

        self.layout = Some(TextureLayout {
            texture_type,
            width,
            height,
            depth,
            mip_count,
            images: vec![None; slots],
        });
    }

    /// Supply the pixels of one (face, mip) slot.
    ///
    /// Returns `false` when no layout is declared, an index is out of range,
    /// the extent differs from the declared chain, or `data` is not exactly
    /// `width × height × depth × 4` bytes.
    pub fn set_mipmap_data(&mut self, data: &[u8], width: u32, height: u32, depth: u32, face: u32, mip: u32) -> bool {
        let Some(layout) = self.layout.as_mut() else {
            return false;
        };
        if face >= layout.face_count() || mip >= layout.mip_count {
            return false;
        }
        if layout.slot_extent(mip) != (width, height, depth) {
            return false;
        }
        let expected = width as usize * height as usize * depth as usize * RGBA_BYTES_PER_PIXEL;
        if data.len() != expected {
            return false;
        }

        let index = (face * layout.mip_count + mip) as usize;
        layout.images[index] = Some(InputImage {
            width,
            height,
            depth,
            data: data.to_vec(),
        });
        true
    }

    pub fn set_format(&mut self, format: InputFormat) {
        self.input_format = format;
    }

    pub fn set_alpha_mode(&mut self, mode: AlphaMode) {
        self.alpha_mode = mode;
    }

    pub fn set_gamma(&mut self, input_gamma: f32, output_gamma: f32) {
        self.input_gamma = input_gamma;
        self.output_gamma = output_gamma;
    }

    pub fn set_wrap_mode(&mut self, mode: WrapMode) {
        self.wrap_mode = mode;
    }

    pub fn set_mipmap_filter(&mut self, filter: MipmapFilter) {
        self.mipmap_filter = filter;
    }

    /// Enable mip generation, optionally capping the number of levels.
    pub fn set_mipmap_generation(&mut self, enabled: bool, max_level: Option<u32>) {
        self.generate_mipmaps = enabled;
        self.max_level = max_level;
    }

    pub fn set_round_mode(&mut self, mode: RoundMode) {
        self.round_mode = mode;
    }

    /// Cap the largest target extent. `None` disables the cap.
    pub fn set_max_extents(&mut self, max_extent: Option<u32>) {
        self.max_extent = max_extent.filter(|&extent| extent > 0);
    }

    pub fn set_normal_map(&mut self, enabled: bool) {
        self.normal_map = enabled;
    }

    pub fn set_convert_to_normal_map(&mut self, enabled: bool) {
        self.convert_to_normal_map = enabled;
    }

    /// Weights of the R, G, B and A channels when deriving height.
    pub fn set_height_evaluation(&mut self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.height_factors = [red, green, blue, alpha];
    }

    pub fn set_normalize_mipmaps(&mut self, enabled: bool) {
        self.normalize_mipmaps = enabled;
    }

    pub fn layout(&self) -> Option<&TextureLayout> {
        self.layout.as_ref()
    }

    pub fn input_format(&self) -> InputFormat {
        self.input_format
    }

    pub fn alpha_mode(&self) -> AlphaMode {
        self.alpha_mode
    }

    pub fn input_gamma(&self) -> f32 {
        self.input_gamma
    }

    pub fn output_gamma(&self) -> f32 {
        self.output_gamma
    }

    pub fn wrap_mode(&self) -> WrapMode {
        self.wrap_mode
    }

    pub fn mipmap_filter(&self) -> MipmapFilter {
        self.mipmap_filter
    }

    pub fn generate_mipmaps(&self) -> bool {
        self.generate_mipmaps
    }

    pub fn max_level(&self) -> Option<u32> {
        self.max_level
    }

    pub fn is_normal_map(&self) -> bool {
        self.normal_map
    }

    pub fn convert_to_normal_map(&self) -> bool {
        self.convert_to_normal_map
    }

    pub fn height_factors(&self) -> [f32; 4] {
        self.height_factors
    }

    pub fn normalize_mipmaps(&self) -> bool {
        self.normalize_mipmaps
    }

    /// Whether pixels carry normals rather than colour after preprocessing.
    pub fn treats_as_normals(&self) -> bool {
        self.normal_map || self.convert_to_normal_map
    }

    /// Extent of the first emitted level.
    ///
    /// The declared extent is scaled down to fit the max extent (rounded to
    /// a power of two when rounding is enabled), cube faces are squared, and
    /// the round mode is applied to each axis.
    ///
    /// `None` when no layout is declared.
    pub fn target_extents(&self) -> Option<(u32, u32)> {
        let layout = self.layout.as_ref()?;
        let mut width = layout.width;
        let mut height = layout.height;

        if let Some(mut max_extent) = self.max_extent {
            if self.round_mode != RoundMode::None {
                max_extent = previous_power_of_two(max_extent);
            }
            let largest = width.max(height).max(layout.depth);
            if largest > max_extent {
                let scale = |value: u32| ((u64::from(value) * u64::from(max_extent)) / u64::from(largest)).max(1) as u32;
                width = scale(width);
                height = scale(height);
            }
        }

        if layout.texture_type == TextureType::TextureCube {
            let side = ((u64::from(width) + u64::from(height)) / 2) as u32;
            width = side;
            height = side;
        }

        Some((self.round_mode.apply(width), self.round_mode.apply(height)))
    }

    /// Number of levels a run emits per face.
    ///
    /// A full chain from the target extent to 1×1 when generation is on,
    /// otherwise 1; clamped by a positive max level.
    pub fn output_mipmap_count(&self) -> u32 {
        let Some((width, height)) = self.target_extents() else {
            return 0;
        };
        if !self.generate_mipmaps {
            return 1;
        }
        let count = full_mip_count(width, height);
        match self.max_level {
            Some(max) if max > 0 => count.min(max),
            _ => count,
        }
    }
}

// =============================================================================
// Compression options
// =============================================================================

/// Output encoding and quantization settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionOptions {
    format: Format,
    quality: Quality,
    pixel_format: Option<PixelFormat>,
    color_dithering: bool,
    alpha_dithering: bool,
    binary_alpha: bool,
    alpha_threshold: u8,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            format: Format::Dxt1,
            quality: Quality::Normal,
            pixel_format: None,
            color_dithering: false,
            alpha_dithering: false,
            binary_alpha: false,
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
        }
    }
}

impl CompressionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_format(&mut self, format: Format) {
        self.format = format;
    }

    pub fn set_quality(&mut self, quality: Quality) {
        self.quality = quality;
    }

    /// Explicit bit layout for [`Format::Rgba`] output.
    pub fn set_pixel_format(&mut self, bit_count: u32, red_mask: u32, green_mask: u32, blue_mask: u32, alpha_mask: u32) {
        self.pixel_format = Some(PixelFormat::new(bit_count, red_mask, green_mask, blue_mask, alpha_mask));
    }

    pub fn set_quantization(&mut self, color_dithering: bool, alpha_dithering: bool, binary_alpha: bool, alpha_threshold: u8) {
        self.color_dithering = color_dithering;
        self.alpha_dithering = alpha_dithering;
        self.binary_alpha = binary_alpha;
        self.alpha_threshold = alpha_threshold;
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn pixel_format(&self) -> Option<PixelFormat> {
        self.pixel_format
    }

    pub fn color_dithering(&self) -> bool {
        self.color_dithering
    }

    pub fn alpha_dithering(&self) -> bool {
        self.alpha_dithering
    }

    pub fn binary_alpha(&self) -> bool {
        self.binary_alpha
    }

    pub fn alpha_threshold(&self) -> u8 {
        self.alpha_threshold
    }

    /// Encoding of the emitted levels. An explicit pixel layout only
    /// applies to [`Format::Rgba`].
    pub fn encoding(&self) -> PixelEncoding {
        match (self.format, self.pixel_format) {
            (Format::Rgba, Some(pixel_format)) => pixel_format.encoding(),
            (format, _) => format.encoding(),
        }
    }

    /// Bytes one emitted level of the given extent occupies.
    pub fn level_size(&self, width: u32, height: u32) -> usize {
        self.encoding().level_size(width, height)
    }

    /// Bytes per streamed row: one row of blocks, or one row of pixels.
    pub fn row_size(&self, width: u32) -> usize {
        self.encoding().level_size(width, 1)
    }
}

/// Bytes a run with these options would emit, excluding any header.
///
/// Pure: consults only the options.
pub fn estimate_output_size(input: &InputOptions, compression: &CompressionOptions) -> usize {
    let (Some(layout), Some((width, height))) = (input.layout(), input.target_extents()) else {
        return 0;
    };
    let per_face: usize = (0..input.output_mipmap_count())
        .map(|mip| {
            let (w, h) = mip_extent(width, height, mip);
            compression.level_size(w, h)
        })
        .sum();
    per_face * layout.face_count() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_2d(width: u32, height: u32) -> InputOptions {
        let mut input = InputOptions::new();
        input.set_texture_layout(TextureType::Texture2D, width, height, 1);
        input
    }

    #[test]
    fn test_input_defaults() {
        let input = InputOptions::new();
        assert!(input.layout().is_none());
        assert_eq!(input.input_format(), InputFormat::Bgra8);
        assert_eq!(input.wrap_mode(), WrapMode::Mirror);
        assert_eq!(input.mipmap_filter(), MipmapFilter::Box);
        assert!((input.input_gamma() - 2.2).abs() < f32::EPSILON);
        assert!(input.generate_mipmaps());
        assert_eq!(input.target_extents(), None);
        assert_eq!(input.output_mipmap_count(), 0);
    }

    #[test]
    fn test_compression_defaults() {
        let compression = CompressionOptions::new();
        assert_eq!(compression.format(), Format::Dxt1);
        assert_eq!(compression.quality(), Quality::Normal);
        assert_eq!(compression.alpha_threshold(), 127);
    }

    #[test]
    fn test_layout_zero_extents_become_one() {
        let input = layout_2d(0, 0);
        let layout = input.layout().unwrap();
        assert_eq!((layout.width(), layout.height(), layout.depth()), (1, 1, 1));
        assert_eq!(layout.mip_count(), 1);
    }

    #[test]
    fn test_set_mipmap_data_requires_layout() {
        let mut input = InputOptions::new();
        assert!(!input.set_mipmap_data(&[0; 16], 2, 2, 1, 0, 0));
    }

    #[test]
    fn test_set_mipmap_data_checks_slot() {
        let mut input = layout_2d(8, 8);
        assert!(input.set_mipmap_data(&[0; 256], 8, 8, 1, 0, 0));
        assert!(input.set_mipmap_data(&[0; 64], 4, 4, 1, 0, 1));
        // Wrong extent for the level
        assert!(!input.set_mipmap_data(&[0; 64], 4, 4, 1, 0, 2));
        // Face out of range for a 2D layout
        assert!(!input.set_mipmap_data(&[0; 256], 8, 8, 1, 1, 0));
        // Mip out of range
        assert!(!input.set_mipmap_data(&[0; 4], 1, 1, 1, 0, 4));
        // Short buffer
        assert!(!input.set_mipmap_data(&[0; 255], 8, 8, 1, 0, 0));

        let layout = input.layout().unwrap();
        assert!(layout.image(0, 0).is_some());
        assert!(layout.image(0, 1).is_some());
        assert!(layout.image(0, 2).is_none());
    }

    #[test]
    fn test_reset_clears_layout() {
        let mut input = layout_2d(8, 8);
        input.reset_texture_layout();
        assert!(input.layout().is_none());
    }

    #[test]
    fn test_target_extents_max_extent_scaling() {
        let mut input = layout_2d(1024, 512);
        input.set_max_extents(Some(256));
        assert_eq!(input.target_extents(), Some((256, 128)));
    }

    #[test]
    fn test_target_extents_max_extent_rounds_down_with_round_mode() {
        let mut input = layout_2d(1024, 1024);
        input.set_max_extents(Some(300));
        input.set_round_mode(RoundMode::ToNearestPowerOfTwo);
        assert_eq!(input.target_extents(), Some((256, 256)));
    }

    #[test]
    fn test_target_extents_cube_is_squared() {
        let mut input = InputOptions::new();
        input.set_texture_layout(TextureType::TextureCube, 64, 32, 1);
        assert_eq!(input.target_extents(), Some((48, 48)));
    }

    #[test]
    fn test_round_modes() {
        assert_eq!(RoundMode::ToNextPowerOfTwo.apply(100), 128);
        assert_eq!(RoundMode::ToPreviousPowerOfTwo.apply(100), 64);
        assert_eq!(RoundMode::ToNearestPowerOfTwo.apply(100), 128);
        assert_eq!(RoundMode::ToNearestPowerOfTwo.apply(90), 64);
        assert_eq!(RoundMode::ToNearestPowerOfTwo.apply(96), 128);
        assert_eq!(RoundMode::None.apply(100), 100);
        assert_eq!(RoundMode::ToNextPowerOfTwo.apply(64), 64);
    }

    #[test]
    fn test_output_mipmap_count() {
        let mut input = layout_2d(128, 128);
        assert_eq!(input.output_mipmap_count(), 8);

        input.set_mipmap_generation(true, Some(3));
        assert_eq!(input.output_mipmap_count(), 3);

        input.set_mipmap_generation(true, Some(0));
        assert_eq!(input.output_mipmap_count(), 8);

        input.set_mipmap_generation(false, None);
        assert_eq!(input.output_mipmap_count(), 1);
    }

    #[test]
    fn test_wrap_mode_resolve() {
        assert_eq!(WrapMode::Clamp.resolve(-3, 4), 0);
        assert_eq!(WrapMode::Clamp.resolve(9, 4), 3);
        assert_eq!(WrapMode::Repeat.resolve(-1, 4), 3);
        assert_eq!(WrapMode::Repeat.resolve(5, 4), 1);
        assert_eq!(WrapMode::Mirror.resolve(-1, 4), 1);
        assert_eq!(WrapMode::Mirror.resolve(4, 4), 2);
        assert_eq!(WrapMode::Mirror.resolve(7, 1), 0);
    }

    #[test]
    fn test_level_size_with_pixel_format() {
        let mut compression = CompressionOptions::new();
        compression.set_format(Format::Rgba);
        assert_eq!(compression.level_size(3, 2), 24);

        // 16-bit rows of 3 pixels pad from 6 to 8 bytes
        compression.set_pixel_format(16, 0xF800, 0x07E0, 0x001F, 0);
        assert_eq!(compression.level_size(3, 2), 16);
        assert_eq!(compression.row_size(3), 8);
        assert_eq!(
            compression.encoding(),
            PixelEncoding::Packed { bit_count: 16, masks: [0xF800, 0x07E0, 0x001F, 0] }
        );

        // The layout is ignored by block formats
        compression.set_format(Format::Dxt1);
        assert_eq!(compression.encoding(), PixelEncoding::Dxt1);
    }

    #[test]
    fn test_estimate_output_size_bc1_chain() {
        let input = layout_2d(128, 128);
        let compression = CompressionOptions::new();
        // 8192 + 2048 + 512 + 128 + 32 + 8 + 8 + 8
        assert_eq!(estimate_output_size(&input, &compression), 10_936);
    }

    #[test]
    fn test_estimate_output_size_cube() {
        let mut input = InputOptions::new();
        input.set_texture_layout(TextureType::TextureCube, 8, 8, 1);
        let mut compression = CompressionOptions::new();
        compression.set_format(Format::Dxt5);
        // (64 + 16 + 16 + 16) * 6
        assert_eq!(estimate_output_size(&input, &compression), 672);
    }

    #[test]
    fn test_height_evaluation_defaults_to_alpha() {
        let mut input = InputOptions::new();
        assert_eq!(input.height_factors(), [0.0, 0.0, 0.0, 1.0]);
        input.set_height_evaluation(0.25, 0.5, 0.25, 0.0);
        assert_eq!(input.height_factors(), [0.25, 0.5, 0.25, 0.0]);
    }
}
