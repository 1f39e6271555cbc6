//! Structural analysis of a source page.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{BBox, ImageId, Page};
use crate::parser::{ExtractOptions, SourceDocument};
use crate::reconstruct::group_placements;

/// A page's structure plus what is known about its images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageAnalysis {
    pub pdf_version: String,
    pub page_count: u32,
    pub page: Page,
    /// One entry per distinct image, in order of first appearance
    pub images: Vec<ImageSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSummary {
    pub id: ImageId,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub filter: Option<String>,
    pub mime_type: String,
    /// Encoded size in bytes
    pub size: usize,
    /// Every rectangle the image is drawn at
    pub placements: Vec<BBox>,
}

impl PageAnalysis {
    /// Extract a page and describe its images.
    pub fn analyze(source: &SourceDocument, options: &ExtractOptions) -> Result<Self> {
        let page = source.extract_page(options)?;

        let mut images = Vec::new();
        for (id, placements) in group_placements(&page.images) {
            let reference = source.image_reference(id)?;
            images.push(ImageSummary {
                id,
                width: reference.width(),
                height: reference.height(),
                filter: reference.filter(),
                mime_type: reference.mime_type().to_string(),
                size: reference.size(),
                placements: placements.iter().map(|p| p.rect).collect(),
            });
        }

        Ok(Self {
            pdf_version: source.version(),
            page_count: source.page_count(),
            page,
            images,
        })
    }
}
