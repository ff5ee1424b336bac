use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::base_type::BaseType;
use crate::error::TypeError;
use crate::sql_types;

/// Default byte length the server reports for an unsized VARCHAR.
const MAX_TEXT_LENGTH: i32 = 16_777_216;

/// Default byte length the server reports for an unsized BINARY.
const MAX_BINARY_LENGTH: i32 = 8_388_608;

/// Schema descriptor for one column or one field of a structured value.
///
/// A descriptor is a tree: OBJECT nodes list their fields in declaration
/// order, ARRAY nodes carry a single synthetic child describing the
/// element type, and MAP nodes carry two synthetic children (key, then
/// value). Primitive leaves have no children.
///
/// ```text
/// OBJECT(string VARCHAR, simpleClass OBJECT(string VARCHAR))
///
///   FieldDescriptor { base: Object, fields: [
///     FieldDescriptor { name: "string",      base: Text },
///     FieldDescriptor { name: "simpleClass", base: Object, fields: [
///       FieldDescriptor { name: "string", base: Text },
///     ]},
///   ]}
/// ```
///
/// Descriptors are loaded once from column metadata and then shared
/// read-only (typically behind an `Arc`) by every decode of that column.
/// Attributes are reachable only through accessors, so a loaded tree
/// cannot drift from the metadata it was validated against. Equality is
/// structural.
///
/// The JSON form matches the driver's column metadata:
///
/// ```text
/// ┌──────────────┬──────────────────┬──────────────────────────────┐
/// │ JSON key     │ Field            │ Notes                        │
/// ├──────────────┼──────────────────┼──────────────────────────────┤
/// │ name         │ name             │                              │
/// │ typeName     │ type_name        │ declared SQL type name       │
/// │ type         │ sql_type         │ java.sql.Types code          │
/// │ nullable     │ nullable         │ absent = false               │
/// │ byteLength   │ length           │ variable-size types only     │
/// │ precision    │ precision        │                              │
/// │ scale        │ scale            │                              │
/// │ fixed        │ fixed            │ exact fixed-point numerics   │
/// │ base         │ base             │ semantic base type keyword   │
/// │ fields       │ fields           │ absent or null = no children │
/// └──────────────┴──────────────────┴──────────────────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    name: String,
    #[serde(default)]
    type_name: String,
    #[serde(rename = "type", default)]
    sql_type: i32,
    #[serde(default)]
    nullable: bool,
    #[serde(rename = "byteLength", default)]
    length: i32,
    #[serde(default)]
    precision: i32,
    #[serde(default)]
    scale: i32,
    #[serde(default)]
    fixed: bool,
    base: BaseType,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    fields: Vec<FieldDescriptor>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<FieldDescriptor>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<FieldDescriptor>>::deserialize(deserializer)?.unwrap_or_default())
}

impl FieldDescriptor {
    /// Create a nullable leaf descriptor with zeroed size attributes.
    ///
    /// The named constructors below fill in the declared type name and
    /// JDBC code for the common cases; use this one for the rest (the
    /// temporal bases, VARIANT).
    pub fn new(
        name: impl Into<String>,
        base: BaseType,
        type_name: impl Into<String>,
        sql_type: i32,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            sql_type,
            nullable: true,
            length: 0,
            precision: 0,
            scale: 0,
            fixed: false,
            base,
            fields: Vec::new(),
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self {
            length: MAX_TEXT_LENGTH,
            ..Self::new(name, BaseType::Text, "VARCHAR", sql_types::VARCHAR)
        }
    }

    /// Exact numeric leaf. A zero scale reports as BIGINT, anything else
    /// as DECIMAL.
    pub fn fixed(name: impl Into<String>, precision: i32, scale: i32) -> Self {
        let sql_type = if scale == 0 {
            sql_types::BIGINT
        } else {
            sql_types::DECIMAL
        };
        Self {
            precision,
            scale,
            fixed: true,
            ..Self::new(name, BaseType::Fixed, "NUMBER", sql_type)
        }
    }

    pub fn real(name: impl Into<String>) -> Self {
        Self::new(name, BaseType::Real, "DOUBLE", sql_types::DOUBLE)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, BaseType::Boolean, "BOOLEAN", sql_types::BOOLEAN)
    }

    pub fn binary(name: impl Into<String>) -> Self {
        Self {
            length: MAX_BINARY_LENGTH,
            ..Self::new(name, BaseType::Binary, "BINARY", sql_types::BINARY)
        }
    }

    pub fn object(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            fields,
            ..Self::new(name, BaseType::Object, "OBJECT", sql_types::STRUCT)
        }
    }

    pub fn array(name: impl Into<String>, element: FieldDescriptor) -> Self {
        Self {
            fields: vec![element],
            ..Self::new(name, BaseType::Array, "ARRAY", sql_types::ARRAY)
        }
    }

    pub fn map(name: impl Into<String>, key: FieldDescriptor, value: FieldDescriptor) -> Self {
        Self {
            fields: vec![key, value],
            ..Self::new(name, BaseType::Map, "MAP", sql_types::JAVA_OBJECT)
        }
    }

    #[must_use]
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    #[must_use]
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    // ── Accessors ──────────────────────────────────────────────────────

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared SQL type name, e.g. `NUMBER` or `VARCHAR`.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// `java.sql.Types` code reported for the node.
    #[must_use]
    pub fn sql_type(&self) -> i32 {
        self.sql_type
    }

    #[must_use]
    pub fn nullable(&self) -> bool {
        self.nullable
    }

    #[must_use]
    pub fn length(&self) -> i32 {
        self.length
    }

    #[must_use]
    pub fn precision(&self) -> i32 {
        self.precision
    }

    #[must_use]
    pub fn scale(&self) -> i32 {
        self.scale
    }

    /// Exact fixed-point numeric.
    #[must_use]
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    #[must_use]
    pub fn base(&self) -> BaseType {
        self.base
    }

    /// OBJECT fields in declaration order, the ARRAY element, or the MAP
    /// key and value.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Element descriptor of an ARRAY node.
    #[must_use]
    pub fn element(&self) -> Option<&FieldDescriptor> {
        match self.base {
            BaseType::Array => self.fields.first(),
            _ => None,
        }
    }

    /// Key and value descriptors of a MAP node.
    #[must_use]
    pub fn map_entry(&self) -> Option<(&FieldDescriptor, &FieldDescriptor)> {
        match (self.base, self.fields.as_slice()) {
            (BaseType::Map, [key, value]) => Some((key, value)),
            _ => None,
        }
    }

    /// Child field of an OBJECT node, by name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check the shape invariant for this node and every descendant.
    ///
    /// ```text
    /// ┌───────────┬─────────────────────────────────────────────┐
    /// │ Base      │ Required children                           │
    /// ├───────────┼─────────────────────────────────────────────┤
    /// │ OBJECT    │ at least one, names unique                  │
    /// │ ARRAY     │ exactly one (element)                       │
    /// │ MAP       │ exactly two (key, value)                    │
    /// │ otherwise │ none                                        │
    /// └───────────┴─────────────────────────────────────────────┘
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::InvalidSchema`] naming the first offending
    /// node's path.
    pub fn validate(&self) -> Result<(), TypeError> {
        self.validate_at(&self.name)
    }

    fn validate_at(&self, path: &str) -> Result<(), TypeError> {
        let invalid = |reason: String| TypeError::InvalidSchema {
            path: path.to_string(),
            reason,
        };

        match self.base {
            BaseType::Object => {
                if self.fields.is_empty() {
                    return Err(invalid("OBJECT declares no fields".to_string()));
                }
                let mut seen = HashSet::with_capacity(self.fields.len());
                for field in &self.fields {
                    if !seen.insert(field.name.as_str()) {
                        return Err(invalid(format!("duplicate field name {:?}", field.name)));
                    }
                }
            }
            BaseType::Array => {
                if self.fields.len() != 1 {
                    return Err(invalid(format!(
                        "ARRAY needs one element descriptor, found {}",
                        self.fields.len()
                    )));
                }
            }
            BaseType::Map => {
                if self.fields.len() != 2 {
                    return Err(invalid(format!(
                        "MAP needs key and value descriptors, found {}",
                        self.fields.len()
                    )));
                }
            }
            BaseType::Text
            | BaseType::Char
            | BaseType::Fixed
            | BaseType::Real
            | BaseType::Boolean
            | BaseType::Binary
            | BaseType::Date
            | BaseType::Time
            | BaseType::TimestampLtz
            | BaseType::TimestampNtz
            | BaseType::TimestampTz
            | BaseType::Variant => {
                if !self.fields.is_empty() {
                    return Err(invalid(format!("{} leaf declares child fields", self.base)));
                }
            }
        }

        for field in &self.fields {
            field.validate_at(&format!("{path}.{}", field.name))?;
        }
        Ok(())
    }

    /// Parse and validate a whole row type: a JSON array with one
    /// descriptor per result column.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::Json`] for malformed metadata and
    /// [`TypeError::InvalidSchema`] if any column breaks the shape
    /// invariant.
    pub fn row_type_from_json(text: &str) -> Result<Vec<FieldDescriptor>, TypeError> {
        let columns: Vec<FieldDescriptor> = serde_json::from_str(text)?;
        for column in &columns {
            column.validate()?;
        }
        Ok(columns)
    }
}

/// Renders the declared type signature, e.g.
/// `OBJECT(string VARCHAR, inner OBJECT(c NUMBER))`.
impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.base {
            BaseType::Object => {
                f.write_str("OBJECT(")?;
                for (i, field) in self.fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} {field}", field.name)?;
                }
                f.write_str(")")
            }
            BaseType::Array => match self.element() {
                Some(element) => write!(f, "ARRAY({element})"),
                None => f.write_str("ARRAY"),
            },
            BaseType::Map => match self.map_entry() {
                Some((key, value)) => write!(f, "MAP({key}, {value})"),
                None => f.write_str("MAP"),
            },
            _ if self.type_name.is_empty() => write!(f, "{}", self.base),
            _ => f.write_str(&self.type_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    fn simple_class() -> FieldDescriptor {
        FieldDescriptor::object("simpleClass", vec![FieldDescriptor::text("string")])
    }

    #[test]
    fn builders_fill_metadata() {
        let f = FieldDescriptor::fixed("l", 38, 0);
        assert_eq!(f.base, BaseType::Fixed);
        assert_eq!(f.sql_type, sql_types::BIGINT);
        assert!(f.fixed);
        assert!(f.nullable);
        assert_eq!(FieldDescriptor::fixed("d", 10, 2).sql_type, sql_types::DECIMAL);
        assert_eq!(FieldDescriptor::text("s").length, MAX_TEXT_LENGTH);
    }

    #[test]
    fn signature_renders_nested_types() {
        let schema = FieldDescriptor::object(
            "col",
            vec![
                FieldDescriptor::text("string"),
                FieldDescriptor::fixed("b", 3, 0).with_type_name("TINYINT"),
                simple_class(),
                FieldDescriptor::array("tags", FieldDescriptor::text("")),
                FieldDescriptor::map("m", FieldDescriptor::text(""), FieldDescriptor::real("")),
            ],
        );
        assert_snapshot!(
            schema.to_string(),
            @"OBJECT(string VARCHAR, b TINYINT, simpleClass OBJECT(string VARCHAR), tags ARRAY(VARCHAR), m MAP(VARCHAR, DOUBLE))"
        );
    }

    #[test]
    fn validate_accepts_well_formed_tree() {
        let schema = FieldDescriptor::array("arr", simple_class());
        schema.validate().unwrap();
    }

    #[test]
    fn validate_rejects_empty_object() {
        let schema = FieldDescriptor::object("outer", vec![FieldDescriptor::object("inner", vec![])]);
        let err = schema.validate().unwrap_err();
        assert!(matches!(
            err,
            TypeError::InvalidSchema { ref path, .. } if path == "outer.inner"
        ));
    }

    #[test]
    fn validate_rejects_duplicate_names() {
        let schema = FieldDescriptor::object(
            "o",
            vec![FieldDescriptor::text("a"), FieldDescriptor::boolean("a")],
        );
        assert!(matches!(schema.validate(), Err(TypeError::InvalidSchema { .. })));
    }

    #[test]
    fn validate_rejects_leaf_with_children() {
        let mut leaf = FieldDescriptor::text("s");
        leaf.fields.push(FieldDescriptor::text("x"));
        assert!(matches!(leaf.validate(), Err(TypeError::InvalidSchema { .. })));
    }

    #[test]
    fn validate_rejects_map_with_one_child() {
        let mut map = FieldDescriptor::map("m", FieldDescriptor::text(""), FieldDescriptor::text(""));
        map.fields.pop();
        assert!(matches!(map.validate(), Err(TypeError::InvalidSchema { .. })));
    }

    #[test]
    fn accessors_follow_base_type() {
        let arr = FieldDescriptor::array("a", FieldDescriptor::fixed("", 38, 0));
        assert_eq!(arr.element().unwrap().base, BaseType::Fixed);
        assert!(arr.map_entry().is_none());

        let obj = simple_class();
        assert!(obj.element().is_none());
        assert_eq!(obj.child("string").unwrap().base, BaseType::Text);
        assert!(obj.child("missing").is_none());
    }

    #[test]
    fn loads_driver_metadata_json() {
        let json = r#"[{
            "name": "OBJ",
            "typeName": "OBJECT",
            "type": 2002,
            "nullable": true,
            "byteLength": 0,
            "precision": 0,
            "scale": 0,
            "fixed": false,
            "base": "object",
            "fields": [
                {"name": "string", "typeName": "VARCHAR", "type": 12,
                 "nullable": true, "byteLength": 16777216, "base": "text", "fields": null}
            ]
        }]"#;
        let columns = FieldDescriptor::row_type_from_json(json).unwrap();
        assert_eq!(columns.len(), 1);
        assert_eq!(
            columns[0],
            FieldDescriptor::object("OBJ", vec![FieldDescriptor::text("string")])
        );
    }

    #[test]
    fn metadata_json_roundtrips() {
        let schema = FieldDescriptor::object(
            "o",
            vec![FieldDescriptor::fixed("n", 10, 2).with_nullable(false)],
        );
        let json = serde_json::to_string(&schema).unwrap();
        assert!(json.contains("\"byteLength\""));
        let back: FieldDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, schema);
    }

    #[test]
    fn absent_nullable_reads_as_not_null() {
        let json = r#"[{"name": "n", "base": "fixed", "precision": 38}]"#;
        let columns = FieldDescriptor::row_type_from_json(json).unwrap();
        assert!(!columns[0].nullable());
        assert_eq!(columns[0].precision(), 38);
        assert_eq!(columns[0].scale(), 0);
    }

    #[test]
    fn invalid_metadata_rejected() {
        let json = r#"[{"name": "O", "base": "OBJECT", "fields": []}]"#;
        assert!(matches!(
            FieldDescriptor::row_type_from_json(json),
            Err(TypeError::InvalidSchema { .. })
        ));
    }
}
