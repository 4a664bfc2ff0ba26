//! The seams to the external segmentation and inpainting models.

use std::sync::Arc;

use image::DynamicImage;

use crate::{CanonicalImage, InpaintRequest, Point};

/// A point prompted segmentation model, for example [Segment Anything](https://segment-anything.com/).
///
/// The model is treated as stateless: it is called again with every point of the
/// session each time a new point is added.
#[async_trait::async_trait]
pub trait SegmentationModel: Send + Sync {
    /// Segment `image` using the clicked `points`, in click order.
    ///
    /// The points are in pixel coordinates of `image`. The returned mask may have any
    /// resolution and pixel format; any non-zero pixel is treated as part of the mask.
    async fn segment(&self, image: &CanonicalImage, points: &[Point])
        -> anyhow::Result<DynamicImage>;
}

/// A text conditioned inpainting model.
#[async_trait::async_trait]
pub trait InpaintModel: Send + Sync {
    /// Regenerate the masked region of the request's image. The result may have any resolution.
    async fn inpaint(&self, request: &InpaintRequest) -> anyhow::Result<DynamicImage>;
}

#[async_trait::async_trait]
impl<M: SegmentationModel + ?Sized> SegmentationModel for Arc<M> {
    async fn segment(
        &self,
        image: &CanonicalImage,
        points: &[Point],
    ) -> anyhow::Result<DynamicImage> {
        (**self).segment(image, points).await
    }
}

#[async_trait::async_trait]
impl<M: InpaintModel + ?Sized> InpaintModel for Arc<M> {
    async fn inpaint(&self, request: &InpaintRequest) -> anyhow::Result<DynamicImage> {
        (**self).inpaint(request).await
    }
}

#[async_trait::async_trait]
impl<M: SegmentationModel + ?Sized> SegmentationModel for Box<M> {
    async fn segment(
        &self,
        image: &CanonicalImage,
        points: &[Point],
    ) -> anyhow::Result<DynamicImage> {
        (**self).segment(image, points).await
    }
}

#[async_trait::async_trait]
impl<M: InpaintModel + ?Sized> InpaintModel for Box<M> {
    async fn inpaint(&self, request: &InpaintRequest) -> anyhow::Result<DynamicImage> {
        (**self).inpaint(request).await
    }
}
