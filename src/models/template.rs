use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::enums::{Role, ScreenType, SlotType};
use super::scraped::NormalizedBox;

/// Reference pixel dimensions used to de-normalize coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    /// Fallback when a scraped record does not say which viewport it was captured at.
    pub const DEFAULT: CanvasSize = CanvasSize { width: 1280, height: 720 };

    /// Both dimensions must be non-zero.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self { width, height })
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Display for CanvasSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for CanvasSize {
    type Err = String;

    /// Parses `WIDTHxHEIGHT`, e.g. `1920x1080`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
        let width: u32 = w.trim().parse().map_err(|_| format!("invalid width in {s:?}"))?;
        let height: u32 = h.trim().parse().map_err(|_| format!("invalid height in {s:?}"))?;
        Self::new(width, height).ok_or_else(|| format!("canvas dimensions must be positive: {s:?}"))
    }
}

/// Bounding box in whole pixels, always inside its canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub bounding_box: PixelBox,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_ids: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSlot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub slot_type: SlotType,
    pub role: Role,
    /// The scraped box, carried unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<NormalizedBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel_box: Option<PixelBox>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A repeated group derived from layout-analysis grouping.
///
/// `max_items` is null when the analyser gave no count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRepeatedGroup {
    pub id: String,
    pub slots: Vec<TemplateSlot>,
    pub min_items: u64,
    pub max_items: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateMetadata {
    pub description: String,
    pub version: String,
    pub canvas: CanvasSize,
}

/// A template in the downstream application's schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecord {
    pub template_id: String,
    pub template_name: String,
    pub screen_type: ScreenType,
    pub pattern: String,
    pub sections: Vec<TemplateSection>,
    pub slots: Vec<TemplateSlot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeated_groups: Option<Vec<Value>>,
    pub metadata: TemplateMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_rejects_zero_dimension() {
        assert!(CanvasSize::new(0, 720).is_none());
        assert!(CanvasSize::new(1280, 0).is_none());
        assert_eq!(CanvasSize::new(1, 1), Some(CanvasSize { width: 1, height: 1 }));
    }

    #[test]
    fn canvas_parses_from_cli_form() {
        assert_eq!("1920x1080".parse::<CanvasSize>().unwrap(), CanvasSize { width: 1920, height: 1080 });
        assert_eq!(" 800X600 ".parse::<CanvasSize>().unwrap(), CanvasSize { width: 800, height: 600 });
        assert!("1920".parse::<CanvasSize>().is_err());
        assert!("0x600".parse::<CanvasSize>().is_err());
        assert!("ax600".parse::<CanvasSize>().is_err());
    }

    #[test]
    fn canvas_display_round_trips() {
        let canvas = CanvasSize::DEFAULT;
        assert_eq!(canvas.to_string(), "1280x720");
        assert_eq!(canvas.to_string().parse::<CanvasSize>().unwrap(), canvas);
    }

    #[test]
    fn absent_repeated_groups_are_omitted_from_json() {
        let record = TemplateRecord {
            template_id: "t".into(),
            template_name: "T".into(),
            screen_type: ScreenType::Landing,
            pattern: "scraped-t".into(),
            sections: vec![],
            slots: vec![],
            repeated_groups: None,
            metadata: TemplateMetadata {
                description: String::new(),
                version: "1.0.0".into(),
                canvas: CanvasSize::DEFAULT,
            },
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("repeatedGroups").is_none());
        assert_eq!(json["templateId"], "t");
        assert_eq!(json["screenType"], "landing");
    }
}
