//! Binary masks and the post-processing applied to segmentation output.

use std::fmt::Display;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma};

use crate::AdapterError;

const SET: Luma<u8> = Luma([u8::MAX]);
const UNSET: Luma<u8> = Luma([0]);

/// Which side of the segmentation a mask covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaskLabel {
    /// The segmentation model's raw output.
    Background,
    /// The inverse of the model's output.
    Subject,
}

impl Display for MaskLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaskLabel::Background => write!(f, "background"),
            MaskLabel::Subject => write!(f, "subject"),
        }
    }
}

/// A binary mask. Set pixels are stored as 255, unset pixels as 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    pixels: GrayImage,
}

impl Mask {
    /// Build a mask from a grayscale image. Any non-zero pixel is considered set.
    pub fn from_luma(image: &GrayImage) -> Self {
        let mut pixels = image.clone();
        for pixel in pixels.pixels_mut() {
            *pixel = if pixel.0[0] > 0 { SET } else { UNSET };
        }
        Self { pixels }
    }

    /// Width of the mask in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height of the mask in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Returns true if the pixel at (x, y) is part of the mask.
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.pixels.get_pixel(x, y).0[0] > 0
    }

    /// The number of set pixels.
    pub fn count_set(&self) -> usize {
        self.pixels.pixels().filter(|p| p.0[0] > 0).count()
    }

    /// The bitwise inverse of this mask.
    pub fn complement(&self) -> Self {
        let mut pixels = self.pixels.clone();
        imageops::invert(&mut pixels);
        Self { pixels }
    }

    /// Borrow the mask as a grayscale image.
    pub fn as_luma(&self) -> &GrayImage {
        &self.pixels
    }

    /// Copy the mask into a [`DynamicImage`].
    pub fn to_dynamic(&self) -> DynamicImage {
        DynamicImage::ImageLuma8(self.pixels.clone())
    }
}

/// The model's mask together with its complement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskPair {
    background: Mask,
    subject: Mask,
}

impl MaskPair {
    /// Pair a primary mask with its complement.
    pub fn new(background: Mask) -> Self {
        let subject = background.complement();
        Self {
            background,
            subject,
        }
    }

    /// The primary mask, as returned by the segmentation model.
    pub fn background(&self) -> &Mask {
        &self.background
    }

    /// The complement of the primary mask.
    pub fn subject(&self) -> &Mask {
        &self.subject
    }

    /// Get the mask with the given label.
    pub fn get(&self, label: MaskLabel) -> &Mask {
        match label {
            MaskLabel::Background => &self.background,
            MaskLabel::Subject => &self.subject,
        }
    }

    /// Both masks with their display labels, background first.
    pub fn labeled(&self) -> [(MaskLabel, &Mask); 2] {
        [
            (MaskLabel::Background, &self.background),
            (MaskLabel::Subject, &self.subject),
        ]
    }
}

/// Turns raw segmentation output into a [`MaskPair`] at canonical resolution.
#[derive(Debug, Clone, Copy)]
pub struct MaskPostProcessor {
    resolution: u32,
}

impl MaskPostProcessor {
    /// Create a post-processor for the given canonical resolution.
    pub fn new(resolution: u32) -> Self {
        Self { resolution }
    }

    /// Resize and binarize a model mask, then derive its complement.
    pub fn process(&self, raw: &DynamicImage) -> Result<MaskPair, AdapterError> {
        let (width, height) = (raw.width(), raw.height());
        if width == 0 || height == 0 {
            return Err(AdapterError::MalformedMask { width, height });
        }
        let luma = raw.to_luma8();
        let luma = if width == self.resolution && height == self.resolution {
            luma
        } else {
            tracing::debug!(width, height, resolution = self.resolution, "resizing mask");
            imageops::resize(&luma, self.resolution, self.resolution, FilterType::Nearest)
        };
        Ok(MaskPair::new(Mask::from_luma(&luma)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Luma([200])
            } else {
                Luma([0])
            }
        })
    }

    #[test]
    fn complement_round_trips() {
        let mask = Mask::from_luma(&checker(7, 5));
        assert_ne!(mask.complement(), mask);
        assert_eq!(mask.complement().complement(), mask);
        assert_eq!(mask.count_set() + mask.complement().count_set(), 35);
    }

    #[test]
    fn non_zero_pixels_are_set() {
        let mask = Mask::from_luma(&GrayImage::from_raw(3, 1, vec![0, 1, 255]).unwrap());
        assert!(!mask.get(0, 0));
        assert!(mask.get(1, 0));
        assert!(mask.get(2, 0));
    }

    #[test]
    fn masks_are_resized_to_canonical_resolution() {
        let processor = MaskPostProcessor::new(512);
        for (width, height) in [(256, 256), (1024, 768), (3, 1000)] {
            let raw = DynamicImage::ImageLuma8(checker(width, height));
            let pair = processor.process(&raw).unwrap();
            assert_eq!(pair.background().width(), 512);
            assert_eq!(pair.background().height(), 512);
            assert_eq!(pair.subject(), &pair.background().complement());
        }
    }

    #[test]
    fn upscaling_keeps_regions() {
        let mut raw = GrayImage::new(2, 2);
        raw.put_pixel(0, 0, Luma([255]));
        let pair = MaskPostProcessor::new(8)
            .process(&DynamicImage::ImageLuma8(raw))
            .unwrap();
        assert!(pair.background().get(0, 0));
        assert!(pair.background().get(3, 3));
        assert!(!pair.background().get(7, 7));
        assert!(pair.subject().get(7, 7));
        assert_eq!(pair.background().count_set(), 16);
    }

    #[test]
    fn rgb_masks_are_accepted() {
        let raw = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            4,
            4,
            image::Rgb([255, 255, 255]),
        ));
        let pair = MaskPostProcessor::new(4).process(&raw).unwrap();
        assert_eq!(pair.background().count_set(), 16);
        assert_eq!(pair.subject().count_set(), 0);
    }

    #[test]
    fn empty_masks_are_malformed() {
        let raw = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        let err = MaskPostProcessor::new(4).process(&raw).unwrap_err();
        assert!(matches!(
            err,
            AdapterError::MalformedMask {
                width: 0,
                height: 0
            }
        ));
    }

    #[test]
    fn labels_match_the_display_names() {
        let pair = MaskPair::new(Mask::from_luma(&checker(2, 2)));
        let labels: Vec<String> = pair.labeled().iter().map(|(l, _)| l.to_string()).collect();
        assert_eq!(labels, ["background", "subject"]);
        assert_eq!(pair.get(MaskLabel::Subject), pair.subject());
    }
}
