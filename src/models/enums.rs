use serde::{Deserialize, Serialize};

use super::UnknownVariant;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(UnknownVariant {
                        field: stringify!($name),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

// Destination vocabularies. These are the only values a stored template may carry.

str_enum!(ScreenType {
    Landing => "landing",
    Auth => "auth",
    Services => "services",
    Pricing => "pricing",
    Portfolio => "portfolio",
    Blog => "blog",
    Dashboard => "dashboard",
});

str_enum!(SlotType {
    Content => "content",
    Image => "image",
});

str_enum!(Role {
    Header => "header",
    Body => "body",
    Footer => "footer",
    Sidebar => "sidebar",
    Navigation => "navigation",
    Main => "main",
    Aside => "aside",
});

// Component catalogues the scraper knows how to crawl.
str_enum!(Source {
    Aceternity => "aceternity",
    Aura => "aura",
    Magic => "magic",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn screen_type_round_trip() {
        for variant in ScreenType::ALL {
            assert_eq!(ScreenType::from_str(variant.as_str()).unwrap(), *variant);
        }
    }

    #[test]
    fn role_serializes_as_lowercase_string() {
        let json = serde_json::to_string(&Role::Navigation).unwrap();
        assert_eq!(json, "\"navigation\"");
        let back: Role = serde_json::from_str("\"aside\"").unwrap();
        assert_eq!(back, Role::Aside);
    }

    #[test]
    fn source_display_matches_directory_name() {
        assert_eq!(Source::Aceternity.to_string(), "aceternity");
        assert_eq!(Source::ALL.len(), 3);
    }

    #[test]
    fn invalid_enum_returns_error() {
        let err = SlotType::from_str("container").unwrap_err();
        assert_eq!(err.field, "SlotType");
        assert_eq!(err.value, "container");
        assert!(Source::from_str("").is_err());
    }
}
