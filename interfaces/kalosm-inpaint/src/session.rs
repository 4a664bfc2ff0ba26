use crate::{CanonicalImage, MaskPair, Point, PointSet, PreconditionError};

/// One editing session: the image captured at the first click and every click since.
#[derive(Debug, Clone)]
pub struct Session {
    image: CanonicalImage,
    points: PointSet,
    // The mask pair computed for the first `n` points. The set is append only,
    // so the length identifies the point set within a session.
    masks: Option<(usize, MaskPair)>,
}

impl Session {
    fn begin(image: CanonicalImage) -> Self {
        Self {
            image,
            points: PointSet::new(),
            masks: None,
        }
    }

    /// The image captured when the session started.
    pub fn image(&self) -> &CanonicalImage {
        &self.image
    }

    /// The clicks of this session, in order.
    pub fn points(&self) -> &PointSet {
        &self.points
    }

    /// The mask pair for the current points, if one was computed and cached.
    pub(crate) fn cached_masks(&self) -> Option<&MaskPair> {
        match &self.masks {
            Some((len, masks)) if *len == self.points.len() => Some(masks),
            _ => None,
        }
    }

    pub(crate) fn cache_masks(&mut self, len: usize, masks: MaskPair) {
        if len == self.points.len() {
            self.masks = Some((len, masks));
        }
    }
}

/// The lifecycle of the session.
///
/// `Empty -> Active` on the first click, `Active -> Active` on every further click and
/// `Active -> Empty` on reset or when a new image is loaded.
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    /// No click was recorded since the last reset.
    #[default]
    Empty,
    /// At least one click was recorded.
    Active(Session),
}

impl SessionState {
    /// Returns true if a session is active.
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active(_))
    }

    /// The active session, if any.
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Active(session) => Some(session),
            SessionState::Empty => None,
        }
    }

    pub(crate) fn session_mut(&mut self) -> Option<&mut Session> {
        match self {
            SessionState::Active(session) => Some(session),
            SessionState::Empty => None,
        }
    }

    /// Record a click. Starts a session with a snapshot of `image` if none is active.
    pub(crate) fn add_point(
        &mut self,
        image: Option<&CanonicalImage>,
        point: Point,
    ) -> Result<&mut Session, PreconditionError> {
        let resolution = match (self.session(), image) {
            (Some(session), _) => session.image.resolution(),
            (None, Some(image)) => image.resolution(),
            (None, None) => return Err(PreconditionError::NoImage),
        };
        if point.x >= resolution || point.y >= resolution {
            return Err(PreconditionError::PointOutOfBounds {
                x: point.x,
                y: point.y,
                resolution,
            });
        }
        if !self.is_active() {
            if let Some(image) = image {
                tracing::debug!("starting a new session");
                *self = SessionState::Active(Session::begin(image.clone()));
            }
        }
        match self {
            SessionState::Active(session) => {
                session.points.push(point);
                Ok(session)
            }
            SessionState::Empty => Err(PreconditionError::NoImage),
        }
    }

    /// End the active session. Returns true if there was one.
    pub(crate) fn reset(&mut self) -> bool {
        let was_active = self.is_active();
        *self = SessionState::Empty;
        was_active
    }
}
