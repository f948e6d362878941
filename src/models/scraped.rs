//! Layout records as emitted by the per-source scrapers after layout analysis.
//!
//! Coordinates are normalized to the scraped viewport (`0.0..=1.0`). Fields the
//! converter does not interpret are kept in `extra` so they survive conversion.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::template::CanvasSize;
use crate::convert::ValidationError;

/// Bounding box in viewport-relative units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Viewport the layout was captured at, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// The viewport as a canvas, if both dimensions are usable.
    pub fn as_canvas(&self) -> Option<CanvasSize> {
        if !(self.width.is_finite() && self.height.is_finite()) {
            return None;
        }
        let width = self.width.round();
        let height = self.height.round();
        if width < 1.0 || height < 1.0 || width > u32::MAX as f64 || height > u32::MAX as f64 {
            return None;
        }
        CanvasSize::new(width as u32, height as u32)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<NormalizedBox>,
    /// Member slots, by slot id. Used to derive a box when `bounding_box` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_ids: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedSlot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub slot_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<NormalizedBox>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One instance of a repeated group: the slots that make up the `index`-th item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatedItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u64>,
    #[serde(default)]
    pub slot_ids: Vec<String>,
}

/// Slots the layout analyser found repeating with the same role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatedGroupSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(default)]
    pub items: Vec<RepeatedItem>,
}

/// Grouping metadata from layout analysis.
///
/// `repeated_groups` is keyed by group id (`repeated-<role>`). Visual groups
/// and counts are not interpreted and stay in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedGrouping {
    #[serde(default)]
    pub repeated_groups: BTreeMap<String, RepeatedGroupSource>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One extracted component or page layout.
///
/// `sections` and `slots` are optional at the type level so that a record
/// missing either can still be parsed and then rejected by the converter with
/// a precise [`ValidationError`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, alias = "name", skip_serializing_if = "Option::is_none")]
    pub component_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<ScrapedSection>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slots: Option<Vec<ScrapedSlot>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeated_groups: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grouping: Option<ScrapedGrouping>,
}

impl ScrapedRecord {
    /// Parse a record from the JSON text a scraper wrote.
    pub fn from_json_str(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json).map_err(|e| ValidationError::Malformed(e.to_string()))
    }

    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        serde_json::from_value(value).map_err(|e| ValidationError::Malformed(e.to_string()))
    }
}
