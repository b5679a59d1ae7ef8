//! Structured validation failures.
//!
//! The traversal reports the first violation as data: a path plus a
//! reason kind with its parameters. Both the boolean verdict and the
//! localized message derive from this one value, so the reason reported
//! always matches the reason validation failed for.

use crate::error::Path;
use crate::provider::MessageProvider;
use serde::Serialize;

/// The first failure found while checking a value against a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    path: Path,
    kind: ViolationKind,
}

impl Violation {
    pub(crate) fn new(path: Path, kind: ViolationKind) -> Self {
        Self { path, kind }
    }

    /// Where in the input the violation occurred. Empty at the root.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> &ViolationKind {
        &self.kind
    }

    /// The message-catalog key for this violation.
    pub fn key(&self) -> &'static str {
        self.kind.key()
    }

    /// Format the violation through a message provider.
    pub fn message(&self, provider: &dyn MessageProvider) -> String {
        provider.translate(self.key(), &self.params(provider))
    }

    /// Message parameters. The json reason's detail sentence is itself
    /// resolved through the provider (per-kind detail keys), which is
    /// why the provider is threaded in here.
    fn params(&self, provider: &dyn MessageProvider) -> Vec<(&'static str, String)> {
        let property = self.path.to_string();
        match &self.kind {
            ViolationKind::NotObject => Vec::new(),
            ViolationKind::UnexpectedProperty
            | ViolationKind::MissingRequired
            | ViolationKind::DateInvalidFormat
            | ViolationKind::ObjectRejected
            | ViolationKind::UnknownDescriptor => vec![("property", property)],
            ViolationKind::StringExpected { found }
            | ViolationKind::NumberExpected { found }
            | ViolationKind::BooleanExpected { found }
            | ViolationKind::DateExpected { found }
            | ViolationKind::ArrayItemInvalid { found } => {
                vec![("property", property), ("type", found.clone())]
            }
            ViolationKind::EnumNotAllowed { value, allowed } => vec![
                ("property", property),
                ("value", value.clone()),
                ("allowed", allowed.join(", ")),
            ],
            ViolationKind::ObjectExpected { .. } | ViolationKind::ArrayExpected { .. } => {
                vec![("property", property)]
            }
            ViolationKind::JsonRejected { reason } => {
                let details = provider.translate(reason.details_key(), &reason.details_params());
                vec![
                    ("property", property),
                    ("type", reason.type_name().to_string()),
                    ("details", details),
                ]
            }
        }
    }
}

/// Why a value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ViolationKind {
    /// The checked value itself is not a non-null object
    NotObject,
    /// The input carries a property the schema does not declare
    UnexpectedProperty,
    /// A non-optional schema property is absent from the input
    MissingRequired,
    StringExpected { found: String },
    NumberExpected { found: String },
    BooleanExpected { found: String },
    DateExpected { found: String },
    /// String value that is neither parseable nor a calendar date
    DateInvalidFormat,
    EnumNotAllowed { value: String, allowed: Vec<String> },
    ObjectExpected { found: String },
    /// Object rejected by an `of` predicate
    ObjectRejected,
    ArrayExpected { found: String },
    /// Array element rejected by an `of` predicate
    ArrayItemInvalid { found: String },
    JsonRejected { reason: JsonReason },
    /// The schema entry for this property has an unrecognized type tag
    UnknownDescriptor,
}

impl ViolationKind {
    pub fn key(&self) -> &'static str {
        match self {
            ViolationKind::NotObject => "error.type.not_object",
            ViolationKind::UnexpectedProperty => "error.type.unexpected_property",
            ViolationKind::MissingRequired => "error.type.missing_required",
            ViolationKind::StringExpected { .. } => "error.type.string.expected",
            ViolationKind::NumberExpected { .. } => "error.type.number.expected",
            ViolationKind::BooleanExpected { .. } => "error.type.boolean.expected",
            ViolationKind::DateExpected { .. } => "error.type.date.expected",
            ViolationKind::DateInvalidFormat => "error.type.date.invalid_format",
            ViolationKind::EnumNotAllowed { .. } => "error.type.enum.not_allowed",
            ViolationKind::ObjectExpected { .. } => "error.type.object.expected",
            ViolationKind::ObjectRejected => "error.type.object.invalid",
            ViolationKind::ArrayExpected { .. } => "error.type.array.expected",
            ViolationKind::ArrayItemInvalid { .. } => "error.type.array.item_invalid",
            ViolationKind::JsonRejected { .. } => "error.type.json.expected",
            ViolationKind::UnknownDescriptor => "error.type.unknown_descriptor",
        }
    }
}

/// Why a value failed the JSON-safety check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum JsonReason {
    /// Null at the top of the json check
    Null,
    /// A non-container primitive at the top of the json check
    NotObject { found: String },
    Function,
    Date,
    Regexp,
    Error,
    Map,
    Set,
    WeakMap,
    WeakSet,
    /// A class instance rather than a plain object
    ClassInstance { class: String },
    /// The serialization probe found a cycle
    Circular,
    /// The serialization probe found a BigInt
    BigInt,
    /// The `of` predicate rejected the value
    PredicateRejected,
}

impl JsonReason {
    /// The `${type}` parameter: the detected kind, named the way the
    /// rejection messages name it.
    pub fn type_name(&self) -> &str {
        match self {
            JsonReason::Null => "null",
            JsonReason::NotObject { found } => found,
            JsonReason::Function => "function",
            JsonReason::Date => "Date",
            JsonReason::Regexp => "RegExp",
            JsonReason::Error => "Error",
            JsonReason::Map => "Map",
            JsonReason::Set => "Set",
            JsonReason::WeakMap => "WeakMap",
            JsonReason::WeakSet => "WeakSet",
            JsonReason::ClassInstance { class } => class,
            JsonReason::Circular | JsonReason::BigInt => "invalid",
            JsonReason::PredicateRejected => "invalid structure",
        }
    }

    /// Catalog key of the per-kind detail sentence.
    pub fn details_key(&self) -> &'static str {
        match self {
            JsonReason::Null => "error.type.json.details.null",
            JsonReason::NotObject { .. } => "error.type.json.details.not_object",
            JsonReason::Function => "error.type.json.details.function",
            JsonReason::Date => "error.type.json.details.date",
            JsonReason::Regexp => "error.type.json.details.regexp",
            JsonReason::Error => "error.type.json.details.error",
            JsonReason::Map => "error.type.json.details.map",
            JsonReason::Set => "error.type.json.details.set",
            JsonReason::WeakMap => "error.type.json.details.weakmap",
            JsonReason::WeakSet => "error.type.json.details.weakset",
            JsonReason::ClassInstance { .. } => "error.type.json.details.class_instance",
            JsonReason::Circular => "error.type.json.details.circular",
            JsonReason::BigInt => "error.type.json.details.bigint",
            JsonReason::PredicateRejected => "error.type.json.details.predicate",
        }
    }

    fn details_params(&self) -> Vec<(&'static str, String)> {
        match self {
            JsonReason::NotObject { found } => vec![("type", found.clone())],
            JsonReason::ClassInstance { class } => vec![("class", class.clone())],
            _ => Vec::new(),
        }
    }
}
