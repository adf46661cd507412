//! Optional presentation fields carried by elements and relationships.
//!
//! Colors are CSS strings. An absent color means "use the renderer's theme",
//! so absent fields are never filled in on export. [`Annotations`] holds the
//! editor-owned extras the model never interprets.

use serde::{Deserialize, Serialize};

/// Fill, stroke and text colors. Each is optional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
}

impl Style {
    #[must_use]
    pub fn fill(color: &str) -> Self {
        Self { fill_color: Some(color.to_owned()), ..Self::default() }
    }

    #[must_use]
    pub fn stroke(color: &str) -> Self {
        Self { stroke_color: Some(color.to_owned()), ..Self::default() }
    }
}

/// Sparse update for [`Style`]. Only present fields are applied.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StylePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
}

impl StylePatch {
    /// Overlay the present fields onto `style`.
    pub fn apply_to(&self, style: &mut Style) {
        if let Some(ref c) = self.fill_color {
            style.fill_color = Some(c.clone());
        }
        if let Some(ref c) = self.stroke_color {
            style.stroke_color = Some(c.clone());
        }
        if let Some(ref c) = self.text_color {
            style.text_color = Some(c.clone());
        }
    }
}

/// Editor extras shared by every record: highlight color, icon, link and
/// grading note. Stored and written back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment_note: Option<String>,
}
