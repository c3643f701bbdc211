//! Page layout: the ordered scroll sections and their overlays.
//!
//! A page is a vertical stack of sections, each one viewport tall. Every
//! section carries exactly one overlay that fades in while the camera moves
//! to that section's waypoint.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{SceneError, SceneResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub text: String,
    /// Opacity before the section's timeline slot starts
    #[serde(default)]
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overlay: Option<Overlay>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PageLayout {
    pub sections: Vec<Section>,
}

impl PageLayout {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn load(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let page_error = |message: String| SceneError::PageLayout {
            path: path.display().to_string(),
            message,
        };

        let json = std::fs::read_to_string(path).map_err(|e| page_error(e.to_string()))?;
        let layout = Self::from_json(&json).map_err(|e| page_error(e.to_string()))?;
        log::info!("Page layout {:?}: {} sections", path, layout.sections.len());
        Ok(layout)
    }

    /// Page with `count` sections, each with an empty overlay
    pub fn with_sections(count: usize) -> Self {
        Self {
            sections: (0..count)
                .map(|i| Section {
                    title: format!("Section {}", i + 1),
                    overlay: Some(Overlay {
                        text: String::new(),
                        opacity: 0.0,
                    }),
                })
                .collect(),
        }
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// At least one section, and every section has an overlay
    pub fn validate(&self) -> SceneResult<()> {
        if self.sections.is_empty() {
            return Err(SceneError::NoSections);
        }
        match self.sections.iter().position(|s| s.overlay.is_none()) {
            Some(index) => Err(SceneError::MissingOverlay { index }),
            None => Ok(()),
        }
    }

    /// Initial opacity of every overlay, in section order
    pub fn initial_opacities(&self) -> Vec<f32> {
        self.sections
            .iter()
            .map(|s| s.overlay.as_ref().map_or(0.0, |o| o.opacity))
            .collect()
    }
}

/// Document scroll position, clamped to the scrollable range
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PageScroll {
    offset: f32,
    max: f32,
}

impl PageScroll {
    /// Scroll range of a page whose first section is pinned for `pin_distance`
    pub fn new(section_count: usize, viewport_height: f32, pin_distance: f32) -> Self {
        let document_height = section_count as f32 * viewport_height + pin_distance;
        Self {
            offset: 0.0,
            max: (document_height - viewport_height).max(0.0),
        }
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn scroll_to(&mut self, offset: f32) -> f32 {
        self.offset = offset.clamp(0.0, self.max);
        self.offset
    }

    pub fn scroll_by(&mut self, delta: f32) -> f32 {
        self.scroll_to(self.offset + delta)
    }

    /// Keep the offset valid after the viewport changes height
    pub fn set_range(&mut self, section_count: usize, viewport_height: f32, pin_distance: f32) {
        let offset = self.offset;
        *self = Self::new(section_count, viewport_height, pin_distance);
        self.scroll_to(offset);
    }
}
