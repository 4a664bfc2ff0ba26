//! # Kalosm Inpaint
//!
//! Interactive mask building and inpainting on top of a point prompted segmentation model
//! (like [Segment Anything](https://segment-anything.com/)) and a text conditioned inpainting model.
//!
//! The workflow is driven by [`InpaintStudio`]:
//! 1. [`InpaintStudio::load_image`] pads the image to a square and resizes it to the canonical resolution.
//! 2. Every [`InpaintStudio::add_point`] records a click and segments the image with all clicks so far.
//! 3. [`InpaintStudio::run`] inpaints the background, or the subject if the mask is inverted.
//! 4. [`InpaintStudio::reset`] ends the session so a new one can start.
//!
//! The models are plugged in through the [`SegmentationModel`] and [`InpaintModel`] traits.

#![warn(missing_docs)]

mod adapter;
mod error;
mod geometry;
mod mask;
mod notice;
mod points;
mod session;
mod settings;
mod studio;

pub use adapter::*;
pub use error::*;
pub use geometry::*;
pub use mask::*;
pub use notice::Notice;
pub use points::*;
pub use session::*;
pub use settings::*;
pub use studio::*;
