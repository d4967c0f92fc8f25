//! Mip chain extent arithmetic.

/// Upper bound on mip levels for 32-bit extents.
pub const MAX_MIP_LEVELS: u32 = 32;

/// Extent of mip `level` derived from a level-0 extent.
///
/// Each axis is halved and floored per level, never dropping below 1.
#[inline]
pub fn mip_extent(width: u32, height: u32, level: u32) -> (u32, u32) {
    if level >= MAX_MIP_LEVELS {
        return (1, 1);
    }
    ((width >> level).max(1), (height >> level).max(1))
}

/// Number of levels in a complete chain from the given extent down to 1×1.
///
/// # Example
///
/// ```
/// use texproc::texture::full_mip_count;
///
/// assert_eq!(full_mip_count(128, 128), 8);
/// assert_eq!(full_mip_count(256, 16), 9);
/// assert_eq!(full_mip_count(1, 1), 1);
/// ```
pub fn full_mip_count(width: u32, height: u32) -> u32 {
    let mut w = width.max(1);
    let mut h = height.max(1);
    let mut count = 1;
    while w > 1 || h > 1 {
        w = (w / 2).max(1);
        h = (h / 2).max(1);
        count += 1;
    }
    count
}
