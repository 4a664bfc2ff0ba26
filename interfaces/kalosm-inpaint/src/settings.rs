use crate::{CanonicalImage, Mask, MaskLabel, PreconditionError};

/// The default random seed.
pub const DEFAULT_SEED: u64 = 74294536;

/// The default classifier-free guidance scale.
pub const DEFAULT_GUIDANCE_SCALE: f64 = 7.0;

/// The largest accepted guidance scale.
pub const MAX_GUIDANCE_SCALE: f64 = 20.0;

/// Settings for one inpainting run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InpaintSettings {
    /// The prompt describing what to generate in the masked region.
    prompt: String,

    /// The prompt describing what to avoid.
    negative_prompt: String,

    /// The random seed for sampling.
    seed: u64,

    /// Higher guidance scale encourages images that are closely linked to the prompt, usually at the expense of lower image quality.
    guidance_scale: f64,

    /// Inpaint the selected subject instead of the background.
    invert: bool,
}

impl InpaintSettings {
    /// Create new settings with the given prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            negative_prompt: String::new(),
            seed: DEFAULT_SEED,
            guidance_scale: DEFAULT_GUIDANCE_SCALE,
            invert: false,
        }
    }

    /// Set the negative prompt.
    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = negative_prompt.into();
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the guidance scale, between 0 and 20.
    pub fn with_guidance_scale(mut self, guidance_scale: f64) -> Self {
        self.guidance_scale = guidance_scale;
        self
    }

    /// Inpaint the subject (the complement of the model's mask) instead of the background.
    pub fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    /// The prompt.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The negative prompt.
    pub fn negative_prompt(&self) -> &str {
        &self.negative_prompt
    }

    /// The random seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The guidance scale.
    pub fn guidance_scale(&self) -> f64 {
        self.guidance_scale
    }

    /// Whether the mask is inverted.
    pub fn invert(&self) -> bool {
        self.invert
    }

    /// The region that will be regenerated.
    pub fn target(&self) -> MaskLabel {
        if self.invert {
            MaskLabel::Subject
        } else {
            MaskLabel::Background
        }
    }

    pub(crate) fn validate(&self) -> Result<(), PreconditionError> {
        if !self.guidance_scale.is_finite()
            || !(0.0..=MAX_GUIDANCE_SCALE).contains(&self.guidance_scale)
        {
            return Err(PreconditionError::InvalidGuidanceScale(self.guidance_scale));
        }
        Ok(())
    }
}

impl Default for InpaintSettings {
    fn default() -> Self {
        Self::new("")
    }
}

/// Everything the inpainting model receives for a single run.
#[derive(Debug, Clone)]
pub struct InpaintRequest {
    image: CanonicalImage,
    mask: Mask,
    target: MaskLabel,
    prompt: String,
    negative_prompt: String,
    seed: u64,
    guidance_scale: f64,
}

impl InpaintRequest {
    pub(crate) fn new(image: CanonicalImage, mask: Mask, settings: &InpaintSettings) -> Self {
        Self {
            image,
            mask,
            target: settings.target(),
            prompt: settings.prompt.clone(),
            negative_prompt: settings.negative_prompt.clone(),
            seed: settings.seed,
            guidance_scale: settings.guidance_scale,
        }
    }

    /// The session image.
    pub fn image(&self) -> &CanonicalImage {
        &self.image
    }

    /// The region to regenerate.
    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Which of the two masks was selected.
    pub fn target(&self) -> MaskLabel {
        self.target
    }

    /// The prompt.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The negative prompt.
    pub fn negative_prompt(&self) -> &str {
        &self.negative_prompt
    }

    /// The random seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The guidance scale.
    pub fn guidance_scale(&self) -> f64 {
        self.guidance_scale
    }
}
