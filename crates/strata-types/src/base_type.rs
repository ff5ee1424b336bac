use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

// ── Macro for metadata-name enum boilerplate ──────────────────────────
//
// Column metadata names the semantic base type with a short keyword
// ("text", "fixed", "object", ...). The server has used both lower and
// upper case over time, so parsing is case-insensitive while rendering
// always produces the canonical upper-case keyword.

macro_rules! metadata_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $keyword:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Canonical metadata keyword for this variant.
            #[must_use]
            pub fn keyword(self) -> &'static str {
                match self {
                    $( Self::$variant => $keyword ),+
                }
            }

            /// Parse a metadata keyword, ignoring ASCII case.
            ///
            /// Returns `Err(TypeError::UnknownBaseType)` for names outside
            /// the known set.
            pub fn from_keyword(name: &str) -> Result<Self, TypeError> {
                $(
                    if name.eq_ignore_ascii_case($keyword) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(TypeError::UnknownBaseType { name: name.to_string() })
            }
        }
    };
}

metadata_enum! {
    /// Semantic base type of a column or structured field.
    ///
    /// The decoder dispatches on this enum with exhaustive matches, so a
    /// new base type cannot be added without every decode path handling
    /// it.
    ///
    /// ```text
    /// ┌──────────────────┬─────────────────────────────────────────┐
    /// │ Category         │ Variants                                │
    /// ├──────────────────┼─────────────────────────────────────────┤
    /// │ text             │ Text, Char                              │
    /// │ numeric          │ Fixed (exact), Real (binary float)      │
    /// │ boolean          │ Boolean                                 │
    /// │ binary           │ Binary                                  │
    /// │ temporal         │ Date, Time, Timestamp{Ltz,Ntz,Tz}       │
    /// │ semi-structured  │ Variant                                 │
    /// │ composite        │ Object, Array, Map                      │
    /// └──────────────────┴─────────────────────────────────────────┘
    /// ```
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub enum BaseType {
        Text = "TEXT",
        Char = "CHAR",
        Fixed = "FIXED",
        Real = "REAL",
        Boolean = "BOOLEAN",
        Binary = "BINARY",
        Date = "DATE",
        Time = "TIME",
        TimestampLtz = "TIMESTAMP_LTZ",
        TimestampNtz = "TIMESTAMP_NTZ",
        TimestampTz = "TIMESTAMP_TZ",
        Variant = "VARIANT",
        Object = "OBJECT",
        Array = "ARRAY",
        Map = "MAP",
    }
}

impl BaseType {
    /// `true` for OBJECT, ARRAY and MAP, the bases that carry child
    /// descriptors.
    #[must_use]
    pub fn is_composite(self) -> bool {
        matches!(self, Self::Object | Self::Array | Self::Map)
    }

    /// `true` for the date/time family, which structured values deliver
    /// as text.
    #[must_use]
    pub fn is_temporal(self) -> bool {
        matches!(
            self,
            Self::Date | Self::Time | Self::TimestampLtz | Self::TimestampNtz | Self::TimestampTz
        )
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for BaseType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_keyword(s)
    }
}

impl Serialize for BaseType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.keyword())
    }
}

impl<'de> Deserialize<'de> for BaseType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::from_keyword(&name).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_parse_case_insensitively() {
        assert_eq!(BaseType::from_keyword("text").unwrap(), BaseType::Text);
        assert_eq!(BaseType::from_keyword("OBJECT").unwrap(), BaseType::Object);
        assert_eq!(
            "timestamp_ltz".parse::<BaseType>().unwrap(),
            BaseType::TimestampLtz
        );
    }

    #[test]
    fn unknown_keyword_rejected() {
        let result = BaseType::from_keyword("GEOGRAPHY");
        assert!(matches!(
            result,
            Err(TypeError::UnknownBaseType { ref name }) if name == "GEOGRAPHY"
        ));
    }

    #[test]
    fn composite_and_temporal_categories() {
        assert!(BaseType::Object.is_composite());
        assert!(BaseType::Map.is_composite());
        assert!(!BaseType::Variant.is_composite());
        assert!(BaseType::Date.is_temporal());
        assert!(!BaseType::Text.is_temporal());
    }

    #[test]
    fn serde_uses_canonical_keyword() {
        let json = serde_json::to_string(&BaseType::TimestampTz).unwrap();
        assert_eq!(json, "\"TIMESTAMP_TZ\"");
        let parsed: BaseType = serde_json::from_str("\"fixed\"").unwrap();
        assert_eq!(parsed, BaseType::Fixed);
    }
}
