//! Normalization of uploaded images into the canonical square frame.
//!
//! Every point and mask in a session lives in the coordinate space of the
//! [`CanonicalImage`] produced here.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};

use crate::{Notice, PreconditionError};

/// The default side length of the canonical image.
pub const DEFAULT_RESOLUTION: u32 = 512;

/// A square RGB image at the canonical resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalImage {
    image: RgbImage,
}

impl CanonicalImage {
    fn new(image: RgbImage) -> Self {
        debug_assert_eq!(image.width(), image.height());
        Self { image }
    }

    /// The side length of the image in pixels.
    pub fn resolution(&self) -> u32 {
        self.image.width()
    }

    /// Borrow the underlying pixels.
    pub fn as_rgb(&self) -> &RgbImage {
        &self.image
    }

    /// Take the underlying pixels.
    pub fn into_rgb(self) -> RgbImage {
        self.image
    }

    /// Copy the image into a [`DynamicImage`].
    pub fn to_dynamic(&self) -> DynamicImage {
        DynamicImage::ImageRgb8(self.image.clone())
    }
}

impl From<CanonicalImage> for DynamicImage {
    fn from(image: CanonicalImage) -> Self {
        DynamicImage::ImageRgb8(image.image)
    }
}

/// The result of normalizing an image.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    /// The square image at canonical resolution.
    pub image: CanonicalImage,
    /// Set if the source had to be padded.
    pub notice: Option<Notice>,
}

/// Pads images to a square and resizes them to a fixed resolution.
#[derive(Debug, Clone)]
pub struct GeometryNormalizer {
    resolution: u32,
    pad_color: Rgb<u8>,
    filter: FilterType,
}

impl Default for GeometryNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_RESOLUTION)
    }
}

impl GeometryNormalizer {
    /// Create a normalizer for the given side length with white padding.
    pub fn new(resolution: u32) -> Self {
        Self {
            resolution,
            pad_color: Rgb([255, 255, 255]),
            filter: FilterType::CatmullRom,
        }
    }

    /// Set the color used for the padding bars.
    pub fn with_pad_color(mut self, pad_color: Rgb<u8>) -> Self {
        self.pad_color = pad_color;
        self
    }

    /// Set the filter used to resample images.
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// The side length of the canonical image.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Normalize an uploaded image. A missing image normalizes to nothing.
    pub fn normalize(
        &self,
        image: Option<&DynamicImage>,
    ) -> Result<Option<NormalizedImage>, PreconditionError> {
        let Some(image) = image else {
            return Ok(None);
        };
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 {
            return Err(PreconditionError::EmptyImage { width, height });
        }

        let (square, notice) = if width != height {
            let side = width.max(height);
            let mut canvas = RgbImage::from_pixel(side, side, self.pad_color);
            let left = (side - width) / 2;
            let top = (side - height) / 2;
            imageops::overlay(&mut canvas, &rgb, left as i64, top as i64);
            tracing::debug!(width, height, side, left, top, "padded image to a square");
            (canvas, Some(Notice::Padded { width, height }))
        } else {
            (rgb, None)
        };

        Ok(Some(NormalizedImage {
            image: self.resize(square),
            notice,
        }))
    }

    /// Stretch an image to the canonical resolution without padding.
    pub(crate) fn fit(&self, image: &DynamicImage) -> CanonicalImage {
        self.resize(image.to_rgb8())
    }

    fn resize(&self, image: RgbImage) -> CanonicalImage {
        if image.width() == self.resolution && image.height() == self.resolution {
            return CanonicalImage::new(image);
        }
        CanonicalImage::new(imageops::resize(
            &image,
            self.resolution,
            self.resolution,
            self.filter,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
    }

    #[test]
    fn missing_image_is_a_no_op() {
        let normalizer = GeometryNormalizer::default();
        assert!(normalizer.normalize(None).unwrap().is_none());
    }

    #[test]
    fn portrait_image_is_padded_and_resized() {
        let normalizer = GeometryNormalizer::default();
        let normalized = normalizer
            .normalize(Some(&solid(300, 500, [10, 20, 30])))
            .unwrap()
            .unwrap();
        assert_eq!(normalized.image.resolution(), 512);
        assert_eq!(normalized.image.as_rgb().dimensions(), (512, 512));
        assert_eq!(
            normalized.notice,
            Some(Notice::Padded {
                width: 300,
                height: 500
            })
        );
    }

    #[test]
    fn square_image_has_no_notice() {
        let normalizer = GeometryNormalizer::default();
        let normalized = normalizer
            .normalize(Some(&solid(1024, 1024, [0, 0, 0])))
            .unwrap()
            .unwrap();
        assert_eq!(normalized.image.resolution(), 512);
        assert!(normalized.notice.is_none());
    }

    #[test]
    fn content_is_centered_on_the_pad_color() {
        let normalizer = GeometryNormalizer::new(4)
            .with_pad_color(Rgb([255, 255, 255]))
            .with_filter(FilterType::Nearest);
        let normalized = normalizer
            .normalize(Some(&solid(2, 4, [255, 0, 0])))
            .unwrap()
            .unwrap();
        let image = normalized.image.as_rgb();
        for y in 0..4 {
            assert_eq!(image.get_pixel(0, y), &Rgb([255, 255, 255]));
            assert_eq!(image.get_pixel(1, y), &Rgb([255, 0, 0]));
            assert_eq!(image.get_pixel(2, y), &Rgb([255, 0, 0]));
            assert_eq!(image.get_pixel(3, y), &Rgb([255, 255, 255]));
        }
    }

    #[test]
    fn wide_content_is_centered_vertically() {
        let normalizer = GeometryNormalizer::new(4)
            .with_pad_color(Rgb([255, 255, 255]))
            .with_filter(FilterType::Nearest);
        let normalized = normalizer
            .normalize(Some(&solid(4, 2, [0, 0, 255])))
            .unwrap()
            .unwrap();
        assert!(normalized.notice.is_some());
        let image = normalized.image.as_rgb();
        for x in 0..4 {
            assert_eq!(image.get_pixel(x, 0), &Rgb([255, 255, 255]));
            assert_eq!(image.get_pixel(x, 1), &Rgb([0, 0, 255]));
            assert_eq!(image.get_pixel(x, 2), &Rgb([0, 0, 255]));
            assert_eq!(image.get_pixel(x, 3), &Rgb([255, 255, 255]));
        }
    }

    #[test]
    fn empty_image_is_rejected() {
        let normalizer = GeometryNormalizer::default();
        let err = normalizer
            .normalize(Some(&solid(0, 10, [0, 0, 0])))
            .unwrap_err();
        assert_eq!(
            err,
            PreconditionError::EmptyImage {
                width: 0,
                height: 10
            }
        );
    }

    #[test]
    fn fit_stretches_without_padding() {
        let normalizer = GeometryNormalizer::new(64);
        let fitted = normalizer.fit(&solid(100, 30, [1, 2, 3]));
        assert_eq!(fitted.resolution(), 64);
    }
}
