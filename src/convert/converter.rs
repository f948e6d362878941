use std::collections::HashMap;

use uuid::Uuid;

use super::coords::{full_canvas, to_pixels, union_box};
use super::fields::{map_role, map_screen_type, map_slot_type, DEFAULT_ROLE};
use super::ValidationError;
use crate::models::{
    CanvasSize, PixelBox, ScrapedGrouping, ScrapedRecord, ScrapedSection, ScrapedSlot,
    TemplateMetadata, TemplateRecord, TemplateRepeatedGroup, TemplateSection, TemplateSlot,
};

pub const TEMPLATE_VERSION: &str = "1.0.0";

/// `minItems` for a derived repeated group whose analyser entry has no count.
pub const DEFAULT_MIN_ITEMS: u64 = 2;

/// Convert a scraped layout into a template record laid out on `canvas`.
///
/// Sections and slots keep their cardinality and order. The template id is the
/// scraped id when one is present, so re-converting the same record targets the
/// same stored template; otherwise a fresh v4 UUID is generated.
pub fn convert(
    scraped: &ScrapedRecord,
    override_name: Option<&str>,
    canvas: CanvasSize,
) -> Result<TemplateRecord, ValidationError> {
    let sections = scraped
        .sections
        .as_ref()
        .ok_or(ValidationError::MissingSections)?;
    let slots = scraped.slots.as_ref().ok_or(ValidationError::MissingSlots)?;

    let template_id = resolve_template_id(scraped);
    let template_name = resolve_template_name(scraped, override_name, &template_id);
    let screen_type = map_screen_type(scraped.screen_type.as_deref().unwrap_or("page"));

    let slots_by_id: HashMap<&str, &ScrapedSlot> = slots
        .iter()
        .filter_map(|slot| slot.id.as_deref().map(|id| (id, slot)))
        .collect();

    let sections = sections
        .iter()
        .map(|section| TemplateSection {
            id: section.id.clone(),
            bounding_box: section_box(section, &slots_by_id, canvas),
            slot_ids: section.slot_ids.clone(),
            extra: section.extra.clone(),
        })
        .collect();

    let repeated_groups = match (&scraped.repeated_groups, &scraped.grouping) {
        (Some(groups), _) => Some(groups.clone()),
        (None, Some(grouping)) => derive_repeated_groups(grouping, &slots_by_id, canvas)?,
        (None, None) => None,
    };

    let slots = slots.iter().map(|slot| convert_slot(slot, canvas)).collect();

    Ok(TemplateRecord {
        pattern: format!("scraped-{template_id}"),
        template_id,
        template_name,
        screen_type,
        sections,
        slots,
        repeated_groups,
        metadata: TemplateMetadata {
            description: format!("Template scraped from website ({canvas})"),
            version: TEMPLATE_VERSION.into(),
            canvas,
        },
    })
}

fn resolve_template_id(scraped: &ScrapedRecord) -> String {
    match scraped.id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => Uuid::new_v4().to_string(),
    }
}

fn resolve_template_name(
    scraped: &ScrapedRecord,
    override_name: Option<&str>,
    template_id: &str,
) -> String {
    [override_name, scraped.component_name.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !name.is_empty())
        .map(String::from)
        .unwrap_or_else(|| format!("Template {template_id}"))
}

/// A section's own box if it has one, else the union of its member slots,
/// else the whole canvas.
fn section_box(
    section: &ScrapedSection,
    slots_by_id: &HashMap<&str, &ScrapedSlot>,
    canvas: CanvasSize,
) -> PixelBox {
    if let Some(bbox) = &section.bounding_box {
        return to_pixels(bbox, canvas);
    }

    let member_boxes = section
        .slot_ids
        .iter()
        .flatten()
        .filter_map(|id| slots_by_id.get(id.as_str()))
        .filter_map(|slot| slot.bounding_box.as_ref());

    union_box(member_boxes)
        .map(|bbox| to_pixels(&bbox, canvas))
        .unwrap_or_else(|| full_canvas(canvas))
}

/// Build template repeated groups from the analyser's `grouping.repeatedGroups`.
///
/// Member slots resolve by id and convert like top-level slots. Groups with no
/// resolvable member are dropped; `None` when nothing survives.
fn derive_repeated_groups(
    grouping: &ScrapedGrouping,
    slots_by_id: &HashMap<&str, &ScrapedSlot>,
    canvas: CanvasSize,
) -> Result<Option<Vec<serde_json::Value>>, ValidationError> {
    let mut groups = Vec::new();
    for (group_id, source) in &grouping.repeated_groups {
        let slots: Vec<TemplateSlot> = source
            .items
            .iter()
            .flat_map(|item| &item.slot_ids)
            .filter_map(|id| slots_by_id.get(id.as_str()))
            .map(|slot| convert_slot(slot, canvas))
            .collect();
        if slots.is_empty() {
            tracing::debug!(group_id = %group_id, "Repeated group has no resolvable slots, skipping");
            continue;
        }

        let group = TemplateRepeatedGroup {
            id: group_id.clone(),
            slots,
            min_items: source.count.unwrap_or(DEFAULT_MIN_ITEMS),
            max_items: source.count,
        };
        groups.push(
            serde_json::to_value(&group).map_err(|e| ValidationError::Malformed(e.to_string()))?,
        );
    }
    Ok((!groups.is_empty()).then_some(groups))
}

fn convert_slot(slot: &ScrapedSlot, canvas: CanvasSize) -> TemplateSlot {
    // The computed pixel box replaces any scraped one.
    let mut extra = slot.extra.clone();
    extra.remove("pixelBox");

    TemplateSlot {
        id: slot.id.clone(),
        slot_type: map_slot_type(&slot.slot_type),
        role: slot.role.as_deref().map(map_role).unwrap_or(DEFAULT_ROLE),
        bounding_box: slot.bounding_box,
        pixel_box: slot.bounding_box.as_ref().map(|bbox| to_pixels(bbox, canvas)),
        extra,
    }
}
