//! Page model types.
//!
//! This module defines the intermediate representation that bridges
//! extraction and reconstruction. Spans carry the full source font and color
//! metadata; it is only reduced to the output font set at draw time.

mod geometry;
mod image;
mod modification;
mod page;

pub use geometry::{BBox, Point};
pub use image::{ImageId, ImagePlacement, ImageReference};
pub use modification::ModificationMap;
pub use page::{Block, Line, Page, Span};
