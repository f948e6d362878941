//! Categorical field mapping from scraper vocabulary to template vocabulary.
//!
//! Every lookup is total. Values with no mapping fall back to a fixed default
//! and are logged at debug level, so one odd field never sinks a record.

use std::str::FromStr;

use crate::models::{Role, ScreenType, SlotType};

pub const DEFAULT_SCREEN_TYPE: ScreenType = ScreenType::Landing;
pub const DEFAULT_SLOT_TYPE: SlotType = SlotType::Content;
pub const DEFAULT_ROLE: Role = Role::Body;

/// `page` is the analyzer's generic screen type; the template store calls it `landing`.
/// Names already in the destination vocabulary map to themselves.
pub fn map_screen_type(source: &str) -> ScreenType {
    let key = source.trim().to_ascii_lowercase();
    if key == "page" {
        return ScreenType::Landing;
    }
    ScreenType::from_str(&key).unwrap_or_else(|_| {
        tracing::debug!(value = source, fallback = %DEFAULT_SCREEN_TYPE, "Unmapped screen type");
        DEFAULT_SCREEN_TYPE
    })
}

pub fn map_slot_type(source: &str) -> SlotType {
    match source.trim().to_ascii_lowercase().as_str() {
        "image" => SlotType::Image,
        "container" | "text" | "content" | "mixed" => SlotType::Content,
        _ => {
            tracing::debug!(value = source, fallback = %DEFAULT_SLOT_TYPE, "Unmapped slot type");
            DEFAULT_SLOT_TYPE
        }
    }
}

pub fn map_role(source: &str) -> Role {
    match source.trim().to_ascii_lowercase().as_str() {
        "header" => Role::Header,
        "body" | "content" | "image" => Role::Body,
        "footer" => Role::Footer,
        "sidebar" => Role::Sidebar,
        "navigation" => Role::Navigation,
        "main" => Role::Main,
        "aside" => Role::Aside,
        _ => {
            tracing::debug!(value = source, fallback = %DEFAULT_ROLE, "Unmapped role");
            DEFAULT_ROLE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_maps_to_landing() {
        assert_eq!(map_screen_type("page"), ScreenType::Landing);
        assert_eq!(map_screen_type("Page "), ScreenType::Landing);
    }

    #[test]
    fn destination_screen_types_pass_through() {
        assert_eq!(map_screen_type("pricing"), ScreenType::Pricing);
        assert_eq!(map_screen_type("auth"), ScreenType::Auth);
        assert_eq!(map_screen_type("dashboard"), ScreenType::Dashboard);
    }

    #[test]
    fn unknown_screen_type_falls_back_to_landing() {
        assert_eq!(map_screen_type("unknown_value"), ScreenType::Landing);
        assert_eq!(map_screen_type(""), DEFAULT_SCREEN_TYPE);
    }

    #[test]
    fn slot_types() {
        assert_eq!(map_slot_type("container"), SlotType::Content);
        assert_eq!(map_slot_type("image"), SlotType::Image);
        assert_eq!(map_slot_type("text"), SlotType::Content);
        assert_eq!(map_slot_type("video"), DEFAULT_SLOT_TYPE);
    }

    #[test]
    fn roles_follow_table() {
        assert_eq!(map_role("header"), Role::Header);
        assert_eq!(map_role("content"), Role::Body);
        assert_eq!(map_role("image"), Role::Body);
        assert_eq!(map_role("NAVIGATION"), Role::Navigation);
        assert_eq!(map_role("aside"), Role::Aside);
    }

    #[test]
    fn unknown_role_falls_back_to_body() {
        assert_eq!(map_role("hero"), Role::Body);
        assert_eq!(map_role("cta"), DEFAULT_ROLE);
    }
}
