//! Resampling decoded images to the model input size.
//!
//! Samples are produced as `f32` intensities on the 0-255 scale and handed
//! straight to the normalizer, so interpolated values are never rounded back
//! to 8 bits.

use image::GrayImage;
use ndarray::Array2;

use super::types::ResizeFilter;

/// Where one output coordinate lands on a source axis.
#[derive(Debug, Clone, Copy)]
struct AxisSample {
    lower: u32,
    upper: u32,
    lerp: f32,
    nearest: u32,
}

/// Maps every output coordinate on an axis to its source pixels.
///
/// Output pixel `i` is centered at source coordinate `(i + 0.5) * in / out`.
/// Bilinear reads the two source pixels around that center minus one half,
/// clamped to the image; nearest takes the pixel containing the center.
fn axis_samples(in_size: u32, out_size: u32) -> Vec<AxisSample> {
    let scale = in_size as f32 / out_size as f32;
    let last = in_size - 1;
    (0..out_size)
        .map(|i| {
            let center = (i as f32 + 0.5) * scale;
            let src = (center - 0.5).clamp(0.0, last as f32);
            let lower = src.floor() as u32;
            AxisSample {
                lower,
                upper: (lower + 1).min(last),
                lerp: src - lower as f32,
                nearest: (center.floor() as u32).min(last),
            }
        })
        .collect()
}

/// Copies an image into a `[height, width]` plane of `f32` intensities.
pub fn pixel_plane(image: &GrayImage) -> Array2<f32> {
    let (width, height) = image.dimensions();
    Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
        f32::from(image.get_pixel(x as u32, y as u32).0[0])
    })
}

/// Resizes `image` to exactly `width` x `height`, ignoring aspect ratio.
///
/// Returns a `[height, width]` plane of intensities in `[0, 255]`. Bilinear
/// blends the four source pixels around each output center with no
/// antialiasing, so a downscale samples the source instead of averaging
/// over it. An image with no pixels resizes to all zeros.
pub fn resize_exact(
    image: &GrayImage,
    width: u32,
    height: u32,
    filter: ResizeFilter,
) -> Array2<f32> {
    let (in_width, in_height) = image.dimensions();
    if (in_width, in_height) == (width, height) {
        return pixel_plane(image);
    }
    if in_width == 0 || in_height == 0 {
        return Array2::zeros((height as usize, width as usize));
    }

    let xs = axis_samples(in_width, width);
    let ys = axis_samples(in_height, height);
    let at = |x: u32, y: u32| f32::from(image.get_pixel(x, y).0[0]);

    Array2::from_shape_fn((height as usize, width as usize), |(row, col)| {
        let (sx, sy) = (xs[col], ys[row]);
        match filter {
            ResizeFilter::Nearest => at(sx.nearest, sy.nearest),
            ResizeFilter::Bilinear => {
                let top_left = at(sx.lower, sy.lower);
                let top_right = at(sx.upper, sy.lower);
                let bottom_left = at(sx.lower, sy.upper);
                let bottom_right = at(sx.upper, sy.upper);
                let top = top_left + (top_right - top_left) * sx.lerp;
                let bottom = bottom_left + (bottom_right - bottom_left) * sx.lerp;
                top + (bottom - top) * sy.lerp
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn row_image(values: &[u8], height: u32) -> GrayImage {
        GrayImage::from_fn(values.len() as u32, height, |x, _| Luma([values[x as usize]]))
    }

    #[test]
    fn test_resize_exact_dimensions() {
        let img = GrayImage::from_pixel(100, 37, Luma([200]));
        for filter in [ResizeFilter::Nearest, ResizeFilter::Bilinear] {
            let resized = resize_exact(&img, 28, 28, filter);
            assert_eq!(resized.dim(), (28, 28));
            assert!(resized.iter().all(|&v| v == 200.0));
        }
    }

    #[test]
    fn test_resize_noop_at_target_size() {
        let mut img = GrayImage::new(28, 28);
        img.put_pixel(3, 4, Luma([77]));
        let resized = resize_exact(&img, 28, 28, ResizeFilter::Bilinear);
        assert_eq!(resized, pixel_plane(&img));
        assert_eq!(resized[[4, 3]], 77.0);
    }

    #[test]
    fn test_bilinear_downscale_does_not_antialias() {
        // Each output center falls between columns 4i+1 and 4i+2, both black.
        let img = GrayImage::from_fn(112, 112, |x, _| {
            if x % 4 == 0 { Luma([255]) } else { Luma([0]) }
        });
        let resized = resize_exact(&img, 28, 28, ResizeFilter::Bilinear);
        assert_eq!(resized.dim(), (28, 28));
        assert!(resized.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_bilinear_downscale_keeps_fractional_intensities() {
        let img = row_image(&[0, 1, 0, 1], 4);
        let resized = resize_exact(&img, 2, 2, ResizeFilter::Bilinear);
        assert!(resized.iter().all(|&v| v == 0.5));

        let img = row_image(&[0, 100, 200, 40], 4);
        let resized = resize_exact(&img, 2, 2, ResizeFilter::Bilinear);
        assert_eq!(resized.row(0).to_vec(), vec![50.0, 120.0]);
    }

    #[test]
    fn test_bilinear_upscale_half_pixel_centers() {
        let img = row_image(&[0, 255], 1);
        let resized = resize_exact(&img, 4, 1, ResizeFilter::Bilinear);
        assert_eq!(resized.row(0).to_vec(), vec![0.0, 63.75, 191.25, 255.0]);
    }

    #[test]
    fn test_resize_nearest_upscale_keeps_values() {
        let mut img = GrayImage::new(2, 2);
        img.put_pixel(0, 0, Luma([255]));
        let resized = resize_exact(&img, 28, 28, ResizeFilter::Nearest);
        assert_eq!(resized[[0, 0]], 255.0);
        assert_eq!(resized[[27, 27]], 0.0);
    }

    #[test]
    fn test_resize_empty_image_is_black() {
        let img = GrayImage::new(0, 0);
        let resized = resize_exact(&img, 28, 28, ResizeFilter::Bilinear);
        assert_eq!(resized.dim(), (28, 28));
        assert!(resized.iter().all(|&v| v == 0.0));
    }
}
