// Descriptor model
//
// A schema is an ordered map from property name to type descriptor.
// Descriptors form a closed tagged union, one variant per supported
// kind, deserializable from JSON documents (internally tagged on
// "type"). Unrecognized tags deserialize to `Unknown` so loading a
// schema never panics; the validator rejects such properties at
// validation time instead.

use crate::error::{SchemaError, SchemaResult};
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::sync::Arc;

/// Opaque acceptance predicate over a runtime value.
///
/// Predicates are constructible only through the Rust API; a schema
/// document can only express the nested-schema arm of `of`.
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&Value) -> bool + Send + Sync>);

impl Predicate {
    pub fn new(f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Predicate(Arc::new(f))
    }

    pub fn test(&self, value: &Value) -> bool {
        (self.0)(value)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// `of` for object and json descriptors: a nested schema or a predicate.
#[derive(Debug, Clone)]
pub enum Of {
    Schema(Schema),
    Predicate(Predicate),
}

impl From<Schema> for Of {
    fn from(schema: Schema) -> Self {
        Of::Schema(schema)
    }
}

impl From<Predicate> for Of {
    fn from(predicate: Predicate) -> Self {
        Of::Predicate(predicate)
    }
}

impl<'de> Deserialize<'de> for Of {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Of::Schema(Schema::deserialize(deserializer)?))
    }
}

/// `of` for array descriptors: one element descriptor or a predicate.
#[derive(Debug, Clone)]
pub enum ElementOf {
    Descriptor(Box<TypeDescriptor>),
    Predicate(Predicate),
}

impl From<TypeDescriptor> for ElementOf {
    fn from(descriptor: TypeDescriptor) -> Self {
        ElementOf::Descriptor(Box::new(descriptor))
    }
}

impl From<Predicate> for ElementOf {
    fn from(predicate: Predicate) -> Self {
        ElementOf::Predicate(predicate)
    }
}

impl<'de> Deserialize<'de> for ElementOf {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(ElementOf::Descriptor(Box::new(TypeDescriptor::deserialize(
            deserializer,
        )?)))
    }
}

/// String descriptor, optionally restricted to an allowed set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StringDescriptor {
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub nullable: bool,
    /// Allowed values; an empty set rejects everything
    #[serde(default, rename = "enum")]
    pub values: Option<Vec<String>>,
}

/// Number descriptor; NaN never validates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NumberDescriptor {
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default, rename = "enum")]
    pub values: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BooleanDescriptor {
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub nullable: bool,
}

/// Date descriptor: native date values or date strings (see the
/// validator's date-string policy).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateDescriptor {
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub nullable: bool,
}

/// JSON-safe value descriptor with an optional nested shape check.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JsonDescriptor {
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub nullable: bool,
    /// Nested check applied after the base JSON-safety check. The
    /// schema arm only revalidates properties the value actually has.
    #[serde(default)]
    pub of: Option<Of>,
}

/// Plain-object descriptor. The nested schema arm applies full
/// closed-schema semantics.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectDescriptor {
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub nullable: bool,
    pub of: Of,
}

/// Homogeneous array descriptor.
#[derive(Debug, Clone, Deserialize)]
pub struct ArrayDescriptor {
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub nullable: bool,
    pub of: ElementOf,
}

/// The descriptor vocabulary, one variant per supported kind.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TypeDescriptor {
    String(StringDescriptor),
    Number(NumberDescriptor),
    Boolean(BooleanDescriptor),
    Date(DateDescriptor),
    Json(JsonDescriptor),
    Object(ObjectDescriptor),
    Array(ArrayDescriptor),
    /// Unrecognized `type` tag, kept so that validation (not loading)
    /// reports it, deterministically and path-qualified
    #[serde(other)]
    Unknown,
}

impl TypeDescriptor {
    pub fn string() -> Self {
        TypeDescriptor::String(StringDescriptor::default())
    }

    pub fn number() -> Self {
        TypeDescriptor::Number(NumberDescriptor::default())
    }

    pub fn boolean() -> Self {
        TypeDescriptor::Boolean(BooleanDescriptor::default())
    }

    pub fn date() -> Self {
        TypeDescriptor::Date(DateDescriptor::default())
    }

    pub fn json() -> Self {
        TypeDescriptor::Json(JsonDescriptor::default())
    }

    /// A json descriptor with a nested shape check.
    pub fn json_of(of: impl Into<Of>) -> Self {
        TypeDescriptor::Json(JsonDescriptor {
            of: Some(of.into()),
            ..JsonDescriptor::default()
        })
    }

    /// A string restricted to the given allowed set.
    pub fn string_enum<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TypeDescriptor::String(StringDescriptor {
            values: Some(values.into_iter().map(Into::into).collect()),
            ..StringDescriptor::default()
        })
    }

    /// A number restricted to the given allowed set.
    pub fn number_enum<I: IntoIterator<Item = f64>>(values: I) -> Self {
        TypeDescriptor::Number(NumberDescriptor {
            values: Some(values.into_iter().collect()),
            ..NumberDescriptor::default()
        })
    }

    pub fn object(of: impl Into<Of>) -> Self {
        TypeDescriptor::Object(ObjectDescriptor {
            optional: false,
            nullable: false,
            of: of.into(),
        })
    }

    pub fn array(of: impl Into<ElementOf>) -> Self {
        TypeDescriptor::Array(ArrayDescriptor {
            optional: false,
            nullable: false,
            of: of.into(),
        })
    }

    /// Mark the property as allowed to be absent.
    pub fn optional(mut self) -> Self {
        self.set_optional();
        self
    }

    /// Mark the property as accepting an explicit null.
    pub fn nullable(mut self) -> Self {
        self.set_nullable();
        self
    }

    /// Whether the property may be absent from the input entirely.
    pub fn is_optional(&self) -> bool {
        match self {
            TypeDescriptor::String(d) => d.optional,
            TypeDescriptor::Number(d) => d.optional,
            TypeDescriptor::Boolean(d) => d.optional,
            TypeDescriptor::Date(d) => d.optional,
            TypeDescriptor::Json(d) => d.optional,
            TypeDescriptor::Object(d) => d.optional,
            TypeDescriptor::Array(d) => d.optional,
            TypeDescriptor::Unknown => false,
        }
    }

    /// Whether an explicit null satisfies the descriptor.
    pub fn is_nullable(&self) -> bool {
        match self {
            TypeDescriptor::String(d) => d.nullable,
            TypeDescriptor::Number(d) => d.nullable,
            TypeDescriptor::Boolean(d) => d.nullable,
            TypeDescriptor::Date(d) => d.nullable,
            TypeDescriptor::Json(d) => d.nullable,
            TypeDescriptor::Object(d) => d.nullable,
            TypeDescriptor::Array(d) => d.nullable,
            TypeDescriptor::Unknown => false,
        }
    }

    /// Force `optional: true`; false when the descriptor is `Unknown`
    /// and carries no flags to set.
    fn set_optional(&mut self) -> bool {
        match self {
            TypeDescriptor::String(d) => d.optional = true,
            TypeDescriptor::Number(d) => d.optional = true,
            TypeDescriptor::Boolean(d) => d.optional = true,
            TypeDescriptor::Date(d) => d.optional = true,
            TypeDescriptor::Json(d) => d.optional = true,
            TypeDescriptor::Object(d) => d.optional = true,
            TypeDescriptor::Array(d) => d.optional = true,
            TypeDescriptor::Unknown => return false,
        }
        true
    }

    fn set_nullable(&mut self) {
        match self {
            TypeDescriptor::String(d) => d.nullable = true,
            TypeDescriptor::Number(d) => d.nullable = true,
            TypeDescriptor::Boolean(d) => d.nullable = true,
            TypeDescriptor::Date(d) => d.nullable = true,
            TypeDescriptor::Json(d) => d.nullable = true,
            TypeDescriptor::Object(d) => d.nullable = true,
            TypeDescriptor::Array(d) => d.nullable = true,
            TypeDescriptor::Unknown => {}
        }
    }
}

/// Ordered property-name → descriptor map. Declaration order is
/// preserved and drives the order in which missing-required violations
/// are reported.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    entries: IndexMap<String, TypeDescriptor>,
}

impl Schema {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Parse a schema document. Document order is preserved. Malformed
    /// descriptors (other than unknown `type` tags) fail here, at load
    /// time.
    pub fn from_json_str(document: &str) -> SchemaResult<Self> {
        Ok(serde_json::from_str(document)?)
    }

    pub fn insert(&mut self, name: impl Into<String>, descriptor: TypeDescriptor) {
        self.entries.insert(name.into(), descriptor);
    }

    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterate entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TypeDescriptor)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Derive a schema with `optional: true` forced on every top-level
    /// descriptor. Errs on an `Unknown` entry: deriving optionality for
    /// a descriptor this engine does not recognize is a caller bug.
    pub fn all_optional(&self) -> SchemaResult<Schema> {
        let mut entries = IndexMap::with_capacity(self.entries.len());
        for (name, descriptor) in &self.entries {
            let mut forced = descriptor.clone();
            if !forced.set_optional() {
                return Err(SchemaError::UnknownDescriptor {
                    property: name.clone(),
                });
            }
            entries.insert(name.clone(), forced);
        }
        Ok(Schema { entries })
    }
}

impl<K: Into<String>> FromIterator<(K, TypeDescriptor)> for Schema {
    fn from_iter<I: IntoIterator<Item = (K, TypeDescriptor)>>(iter: I) -> Self {
        Schema {
            entries: iter.into_iter().map(|(k, d)| (k.into(), d)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_descriptor_kinds() {
        let schema = Schema::from_json_str(
            r#"{
                "name": {"type": "string", "optional": true},
                "age": {"type": "number"},
                "active": {"type": "boolean", "nullable": true},
                "birth": {"type": "date"},
                "meta": {"type": "json"},
                "theme": {"type": "string", "enum": ["light", "dark"]}
            }"#,
        )
        .unwrap();

        assert_eq!(schema.len(), 6);
        assert!(schema.get("name").unwrap().is_optional());
        assert!(!schema.get("age").unwrap().is_optional());
        assert!(schema.get("active").unwrap().is_nullable());
        let Some(TypeDescriptor::String(theme)) = schema.get("theme") else {
            panic!("expected string descriptor");
        };
        assert_eq!(theme.values.as_deref(), Some(&["light".to_string(), "dark".to_string()][..]));
    }

    #[test]
    fn test_parse_nested_of() {
        let schema = Schema::from_json_str(
            r#"{
                "tags": {"type": "array", "of": {"type": "string"}},
                "settings": {
                    "type": "object",
                    "of": {
                        "notifications": {"type": "boolean"},
                        "theme": {"type": "string", "enum": ["light", "dark"]}
                    }
                }
            }"#,
        )
        .unwrap();

        let Some(TypeDescriptor::Array(tags)) = schema.get("tags") else {
            panic!("expected array descriptor");
        };
        assert!(matches!(
            &tags.of,
            ElementOf::Descriptor(d) if matches!(**d, TypeDescriptor::String(_))
        ));

        let Some(TypeDescriptor::Object(settings)) = schema.get("settings") else {
            panic!("expected object descriptor");
        };
        let Of::Schema(nested) = &settings.of else {
            panic!("expected nested schema");
        };
        assert_eq!(nested.len(), 2);
    }

    #[test]
    fn test_document_order_is_preserved() {
        let schema = Schema::from_json_str(
            r#"{"zeta": {"type": "string"}, "alpha": {"type": "number"}, "mid": {"type": "boolean"}}"#,
        )
        .unwrap();
        let names: Vec<&str> = schema.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_unknown_tag_parses_to_unknown() {
        let schema =
            Schema::from_json_str(r#"{"thing": {"type": "planet", "optional": true}}"#).unwrap();
        assert!(matches!(schema.get("thing"), Some(TypeDescriptor::Unknown)));
        assert!(!schema.get("thing").unwrap().is_optional());
    }

    #[test]
    fn test_object_descriptor_requires_of() {
        let err = Schema::from_json_str(r#"{"settings": {"type": "object"}}"#).unwrap_err();
        assert!(matches!(err, SchemaError::Parse(_)));
    }

    #[test]
    fn test_malformed_of_fails_at_load() {
        let err = Schema::from_json_str(r#"{"tags": {"type": "array", "of": 5}}"#).unwrap_err();
        assert!(matches!(err, SchemaError::Parse(_)));
    }

    #[test]
    fn test_builders() {
        let descriptor = TypeDescriptor::string().optional().nullable();
        assert!(descriptor.is_optional());
        assert!(descriptor.is_nullable());

        let accepts_everything = TypeDescriptor::array(Predicate::new(|_| true));
        assert!(matches!(
            accepts_everything,
            TypeDescriptor::Array(ArrayDescriptor {
                of: ElementOf::Predicate(_),
                ..
            })
        ));
    }

    #[test]
    fn test_all_optional_forces_flag() {
        let schema = Schema::from_json_str(
            r#"{"name": {"type": "string"}, "age": {"type": "number", "optional": true}}"#,
        )
        .unwrap();
        let derived = schema.all_optional().unwrap();
        assert!(derived.iter().all(|(_, d)| d.is_optional()));
        // derivation leaves the source untouched
        assert!(!schema.get("name").unwrap().is_optional());
    }

    #[test]
    fn test_all_optional_rejects_unknown() {
        let schema = Schema::from_json_str(r#"{"thing": {"type": "warp"}}"#).unwrap();
        let err = schema.all_optional().unwrap_err();
        assert!(
            matches!(err, SchemaError::UnknownDescriptor { property } if property == "thing")
        );
    }
}
