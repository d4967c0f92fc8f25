//! Height-map to normal-map conversion.

use super::mipmap::LinearImage;
use super::options::WrapMode;

/// Convert an image to a tangent-space normal map.
///
/// Height is the dot product of each pixel with `height_factors`. Slopes are
/// central differences, with neighbours outside the image resolved by `wrap`.
/// The normal is packed into RGB as `n * 0.5 + 0.5`; alpha keeps the height.
pub fn height_to_normal(image: &LinearImage, height_factors: [f32; 4], wrap: WrapMode) -> LinearImage {
    let height_at = |x: i64, y: i64| -> f32 {
        let px = image.sample(x, y, wrap);
        px.iter().zip(height_factors).map(|(value, factor)| value * factor).sum()
    };

    let mut result = LinearImage::filled(image.width(), image.height(), [0.0; 4]);
    let width = image.width() as usize;
    for y in 0..image.height() {
        for x in 0..image.width() {
            let (xi, yi) = (i64::from(x), i64::from(y));
            let dx = height_at(xi + 1, yi) - height_at(xi - 1, yi);
            let dy = height_at(xi, yi + 1) - height_at(xi, yi - 1);

            let n = [-dx, -dy, 1.0];
            let length = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            let index = y as usize * width + x as usize;
            result.pixels_mut()[index] = [
                n[0] / length * 0.5 + 0.5,
                n[1] / length * 0.5 + 0.5,
                n[2] / length * 0.5 + 0.5,
                height_at(xi, yi).clamp(0.0, 1.0),
            ];
        }
    }
    result
}
