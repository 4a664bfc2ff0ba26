use std::fmt::Display;
use std::sync::Arc;

use crate::MaskLabel;

/// A non-fatal message for the user. Processing always continues after a notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The loaded image was not square and was padded before resizing.
    Padded {
        /// Width of the source image.
        width: u32,
        /// Height of the source image.
        height: u32,
    },
    /// An inpainting run started for the given region.
    Inpainting {
        /// The region being regenerated.
        target: MaskLabel,
    },
}

impl Notice {
    /// Returns true for geometry warnings.
    pub fn is_warning(&self) -> bool {
        matches!(self, Notice::Padded { .. })
    }
}

impl Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::Padded { .. } => write!(f, "Image is not square, adding padding"),
            Notice::Inpainting { target } => write!(
                f,
                "Inpainting {target}... (this will take up to a few minutes)"
            ),
        }
    }
}

pub(crate) type NoticeHandler = Arc<dyn Fn(Notice) + Send + Sync>;

/// Log the notice and forward it to the user supplied handler, if any.
pub(crate) fn emit(handler: Option<&NoticeHandler>, notice: Notice) {
    if notice.is_warning() {
        tracing::warn!("{notice}");
    } else {
        tracing::info!("{notice}");
    }
    if let Some(handler) = handler {
        handler(notice);
    }
}
