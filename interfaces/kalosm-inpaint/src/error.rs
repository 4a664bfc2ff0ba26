/// An error returned by an [`InpaintStudio`](crate::InpaintStudio) operation.
#[derive(Debug, thiserror::Error)]
pub enum InpaintError {
    /// The operation was requested in a state where it cannot run.
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
    /// The segmentation or inpainting model failed.
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    /// Another segmentation or inpainting call is still running for this session.
    #[error("Another operation is still running, wait for it to finish")]
    Busy,
}

impl InpaintError {
    /// Returns true if the error is a [`PreconditionError`].
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }

    /// Returns true if the error came from one of the models.
    pub fn is_adapter(&self) -> bool {
        matches!(self, Self::Adapter(_))
    }
}

/// A user facing validation error. These are never retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PreconditionError {
    /// No image has been loaded yet.
    #[error("No image loaded. Upload an image before selecting points")]
    NoImage,
    /// There is no active session, or the session has no points.
    #[error("No points provided. Click on the image to select the object to segment")]
    NoPoints,
    /// The loaded image has no pixels.
    #[error("Image is empty ({width}x{height})")]
    EmptyImage {
        /// Width of the rejected image.
        width: u32,
        /// Height of the rejected image.
        height: u32,
    },
    /// A click landed outside of the canonical image.
    #[error("Point ({x}, {y}) is outside of the {resolution}x{resolution} image")]
    PointOutOfBounds {
        /// The x coordinate of the click.
        x: u32,
        /// The y coordinate of the click.
        y: u32,
        /// The canonical resolution.
        resolution: u32,
    },
    /// The guidance scale was not a finite number in the supported range.
    #[error("Guidance scale must be between 0 and 20, got {0}")]
    InvalidGuidanceScale(f64),
}

/// An error raised by one of the external models. The model's message is shown as is.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// The segmentation model failed.
    #[error("{0}")]
    Segmentation(#[source] anyhow::Error),
    /// The segmentation model returned a mask without any pixels.
    #[error("Segmentation model returned an empty {width}x{height} mask")]
    MalformedMask {
        /// Width of the returned mask.
        width: u32,
        /// Height of the returned mask.
        height: u32,
    },
    /// The inpainting model failed.
    #[error("{0}")]
    Inpaint(#[source] anyhow::Error),
    /// The inpainting model returned an image without any pixels.
    #[error("Inpainting model returned an empty {width}x{height} image")]
    MalformedImage {
        /// Width of the returned image.
        width: u32,
        /// Height of the returned image.
        height: u32,
    },
}
