//! The interactive workflow: load an image, click on a subject, inpaint.

use std::sync::Arc;

use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};
use tokio::sync::{Mutex, MutexGuard};

use crate::geometry::DEFAULT_RESOLUTION;
use crate::notice::{self, NoticeHandler};
use crate::{
    AdapterError, CanonicalImage, GeometryNormalizer, InpaintError, InpaintModel, InpaintRequest,
    InpaintSettings, MarkerStyle, MaskLabel, MaskPair, MaskPostProcessor, Notice, Point,
    PreconditionError, SegmentationModel, Session, SessionState,
};

/// What happens when an operation is requested while another one is still running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BusyPolicy {
    /// Fail the new operation with [`InpaintError::Busy`].
    #[default]
    Reject,
    /// Wait for the running operation, then run against the updated state.
    Queue,
}

/// A builder for [`InpaintStudio`].
pub struct InpaintStudioBuilder<S, I> {
    segmentation: S,
    inpaint: I,
    resolution: u32,
    pad_color: Rgb<u8>,
    filter: FilterType,
    marker_style: MarkerStyle,
    busy_policy: BusyPolicy,
    mask_cache: bool,
    notice_handler: Option<NoticeHandler>,
}

impl<S: SegmentationModel, I: InpaintModel> InpaintStudioBuilder<S, I> {
    fn new(segmentation: S, inpaint: I) -> Self {
        Self {
            segmentation,
            inpaint,
            resolution: DEFAULT_RESOLUTION,
            pad_color: Rgb([255, 255, 255]),
            filter: FilterType::CatmullRom,
            marker_style: MarkerStyle::default(),
            busy_policy: BusyPolicy::default(),
            mask_cache: false,
            notice_handler: None,
        }
    }

    /// Set the side length of the canonical image. Defaults to 512.
    pub fn with_resolution(mut self, resolution: u32) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set the color used to pad non-square images. Defaults to white.
    pub fn with_pad_color(mut self, pad_color: Rgb<u8>) -> Self {
        self.pad_color = pad_color;
        self
    }

    /// Set the filter used to resample images.
    pub fn with_resample_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// Set how clicked points are drawn on the preview.
    pub fn with_marker_style(mut self, marker_style: MarkerStyle) -> Self {
        self.marker_style = marker_style;
        self
    }

    /// Set what happens to operations requested while another one is running.
    pub fn with_busy_policy(mut self, busy_policy: BusyPolicy) -> Self {
        self.busy_policy = busy_policy;
        self
    }

    /// Reuse the masks computed for the current points instead of segmenting again
    /// when inpainting. Disabled by default.
    pub fn with_mask_cache(mut self, mask_cache: bool) -> Self {
        self.mask_cache = mask_cache;
        self
    }

    /// Set a handler that receives every [`Notice`].
    pub fn with_notice_handler(
        mut self,
        handler: impl Fn(Notice) + Send + Sync + 'static,
    ) -> Self {
        self.notice_handler = Some(Arc::new(handler));
        self
    }

    /// Build the [`InpaintStudio`].
    pub fn build(self) -> anyhow::Result<InpaintStudio<S, I>> {
        let Self {
            segmentation,
            inpaint,
            resolution,
            pad_color,
            filter,
            marker_style,
            busy_policy,
            mask_cache,
            notice_handler,
        } = self;
        anyhow::ensure!(
            resolution > 0,
            "the canonical resolution must be at least one pixel"
        );

        Ok(InpaintStudio {
            segmentation,
            inpaint,
            normalizer: GeometryNormalizer::new(resolution)
                .with_pad_color(pad_color)
                .with_filter(filter),
            post_processor: MaskPostProcessor::new(resolution),
            marker_style,
            busy_policy,
            mask_cache,
            notice_handler,
            workspace: Mutex::new(Workspace::default()),
        })
    }
}

/// The result of a click.
#[derive(Debug, Clone)]
pub struct PointSelection {
    /// The session image.
    pub image: CanonicalImage,
    /// Every point of the session, in click order.
    pub points: Vec<Point>,
    /// The session image with a marker at every point.
    pub overlay: RgbImage,
    /// The masks for all points of the session.
    pub masks: MaskPair,
}

/// The result of an inpainting run.
#[derive(Debug, Clone)]
pub struct InpaintOutcome {
    /// The generated image at canonical resolution.
    pub image: CanonicalImage,
    /// The region that was regenerated.
    pub target: MaskLabel,
    /// The masks the run was based on.
    pub masks: MaskPair,
}

#[derive(Default)]
struct Workspace {
    displayed: Option<CanonicalImage>,
    session: SessionState,
}

/// Builds a mask from clicks with a segmentation model and inpaints it with a text prompt.
///
/// # Example
/// ```rust, no_run
/// # use kalosm_inpaint::*;
/// # async fn demo(segmentation: impl SegmentationModel, inpaint: impl InpaintModel) -> anyhow::Result<()> {
/// let studio = InpaintStudio::builder(segmentation, inpaint).build()?;
/// let image = image::open("car.png")?;
/// studio.load_image(Some(&image)).await?;
/// studio.add_point(256, 300).await?;
/// let outcome = studio
///     .run(InpaintSettings::new("a car driving on planet Mars. Studio lights, 1970s"))
///     .await?;
/// image::DynamicImage::from(outcome.image).save("out.png")?;
/// # Ok(())
/// # }
/// ```
pub struct InpaintStudio<S, I> {
    segmentation: S,
    inpaint: I,
    normalizer: GeometryNormalizer,
    post_processor: MaskPostProcessor,
    marker_style: MarkerStyle,
    busy_policy: BusyPolicy,
    mask_cache: bool,
    notice_handler: Option<NoticeHandler>,
    workspace: Mutex<Workspace>,
}

impl<S: SegmentationModel, I: InpaintModel> InpaintStudio<S, I> {
    /// Create a new [`InpaintStudioBuilder`] for the given models.
    pub fn builder(segmentation: S, inpaint: I) -> InpaintStudioBuilder<S, I> {
        InpaintStudioBuilder::new(segmentation, inpaint)
    }

    /// The side length of the canonical image.
    pub fn resolution(&self) -> u32 {
        self.normalizer.resolution()
    }

    /// Load, replace or (with `None`) clear the image. Any active session ends.
    ///
    /// Returns the normalized image that clicks refer to.
    pub async fn load_image(
        &self,
        image: Option<&DynamicImage>,
    ) -> Result<Option<CanonicalImage>, InpaintError> {
        let normalized = self.normalizer.normalize(image)?;
        let mut workspace = self.workspace.lock().await;
        if workspace.session.reset() {
            tracing::debug!("image replaced, ending the active session");
        }
        let Some(normalized) = normalized else {
            workspace.displayed = None;
            return Ok(None);
        };
        if let Some(notice) = normalized.notice {
            notice::emit(self.notice_handler.as_ref(), notice);
        }
        workspace.displayed = Some(normalized.image.clone());
        Ok(Some(normalized.image))
    }

    /// Record a click at (x, y) in canonical coordinates and segment with every point so far.
    ///
    /// The first click after a reset starts a new session with the current image. If
    /// segmentation fails the click stays recorded.
    pub async fn add_point(&self, x: u32, y: u32) -> Result<PointSelection, InpaintError> {
        let mut workspace = self.acquire().await?;
        let Workspace { displayed, session } = &mut *workspace;
        let session = session.add_point(displayed.as_ref(), Point::new(x, y))?;
        tracing::debug!(x, y, points = session.points().len(), "added point");

        let overlay = self.marker_style.draw(session.image(), session.points());
        let masks = self.masks(session).await?;
        Ok(PointSelection {
            image: session.image().clone(),
            points: session.points().as_slice().to_vec(),
            overlay,
            masks,
        })
    }

    /// Segment the session image with every point of the session.
    pub async fn segment(&self) -> Result<MaskPair, InpaintError> {
        let mut workspace = self.acquire().await?;
        let session = active(&mut workspace)?;
        self.masks(session).await
    }

    /// Inpaint the background, or with [`InpaintSettings::with_invert`] the subject,
    /// of the session image. The model is called exactly once.
    pub async fn run(&self, settings: InpaintSettings) -> Result<InpaintOutcome, InpaintError> {
        settings.validate()?;
        let mut workspace = self.acquire().await?;
        let session = active(&mut workspace)?;

        let masks = self.masks(session).await?;
        let target = settings.target();
        notice::emit(self.notice_handler.as_ref(), Notice::Inpainting { target });
        let request =
            InpaintRequest::new(session.image().clone(), masks.get(target).clone(), &settings);

        let generated = self
            .inpaint
            .inpaint(&request)
            .await
            .map_err(AdapterError::Inpaint)?;
        let (width, height) = (generated.width(), generated.height());
        if width == 0 || height == 0 {
            return Err(AdapterError::MalformedImage { width, height }.into());
        }
        tracing::info!(%target, width, height, "inpainting finished");

        Ok(InpaintOutcome {
            image: self.normalizer.fit(&generated),
            target,
            masks,
        })
    }

    /// End the active session, keeping the loaded image. Calling this without a session does nothing.
    pub async fn reset(&self) {
        let mut workspace = self.workspace.lock().await;
        if workspace.session.reset() {
            tracing::debug!("session reset");
        }
    }

    /// A copy of the active session, if any.
    ///
    /// This waits for any running operation to finish, which can take minutes while
    /// the inpainting model runs.
    pub async fn session(&self) -> Option<Session> {
        self.workspace.lock().await.session.session().cloned()
    }

    /// The points of the active session, in click order.
    ///
    /// This waits for any running operation to finish, which can take minutes while
    /// the inpainting model runs.
    pub async fn points(&self) -> Vec<Point> {
        self.workspace
            .lock()
            .await
            .session
            .session()
            .map(|session| session.points().as_slice().to_vec())
            .unwrap_or_default()
    }

    /// The currently loaded image.
    ///
    /// This waits for any running operation to finish, which can take minutes while
    /// the inpainting model runs.
    pub async fn displayed_image(&self) -> Option<CanonicalImage> {
        self.workspace.lock().await.displayed.clone()
    }

    async fn acquire(&self) -> Result<MutexGuard<'_, Workspace>, InpaintError> {
        match self.busy_policy {
            BusyPolicy::Reject => self.workspace.try_lock().map_err(|_| {
                tracing::debug!("rejecting an operation while another one is running");
                InpaintError::Busy
            }),
            BusyPolicy::Queue => Ok(self.workspace.lock().await),
        }
    }

    async fn masks(&self, session: &mut Session) -> Result<MaskPair, InpaintError> {
        if self.mask_cache {
            if let Some(masks) = session.cached_masks() {
                tracing::debug!("reusing masks for the current points");
                return Ok(masks.clone());
            }
        }
        let len = session.points().len();
        if len == 0 {
            return Err(PreconditionError::NoPoints.into());
        }
        tracing::debug!(points = len, "running segmentation");
        let raw = self
            .segmentation
            .segment(session.image(), session.points().as_slice())
            .await
            .map_err(AdapterError::Segmentation)?;
        let masks = self.post_processor.process(&raw)?;
        if self.mask_cache {
            session.cache_masks(len, masks.clone());
        }
        Ok(masks)
    }
}

fn active<'a>(
    workspace: &'a mut MutexGuard<'_, Workspace>,
) -> Result<&'a mut Session, PreconditionError> {
    workspace
        .session
        .session_mut()
        .filter(|session| !session.points().is_empty())
        .ok_or(PreconditionError::NoPoints)
}
