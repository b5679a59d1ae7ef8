//! The validation traversal.
//!
//! One walk over the input produces the first [`Violation`] or `None`;
//! the guard derives its boolean verdict and its message from the same
//! result. Ordering is fixed: the root must be a plain object, then the
//! closed-schema check scans the value's own keys for an undeclared
//! property, then schema entries are visited in declaration order
//! (absent-and-required before the per-kind check of a present value).
//! A nullable descriptor accepts an explicit null before any
//! kind-specific rule runs.

use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Path;
use crate::schema::{
    ArrayDescriptor, ElementOf, JsonDescriptor, NumberDescriptor, ObjectDescriptor, Of, Schema,
    StringDescriptor, TypeDescriptor,
};
use crate::value::{Fields, Shared, Value};
use crate::violation::{JsonReason, Violation, ViolationKind};

/// Strict date-string fallback: zero-padded `YYYY-MM-DD` with month and
/// day ranges encoded in the pattern. Calendar validity (e.g. Feb 30)
/// is checked separately.
static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$")
        .expect("date pattern is a valid regex; if this fails it is a bug in bodyguard")
});

/// Check a value against a schema, returning the first violation.
pub(crate) fn validate(schema: &Schema, value: &Value) -> Option<Violation> {
    let mut path = Path::new();
    let Some(fields) = value.as_object() else {
        return Some(Violation::new(path, ViolationKind::NotObject));
    };
    let snapshot = fields.read().clone();
    validate_fields(schema, &snapshot, &mut path)
}

/// Closed-schema check of an object's fields: first undeclared key (in
/// the value's own order), then schema entries in declaration order.
fn validate_fields(schema: &Schema, fields: &Fields, path: &mut Path) -> Option<Violation> {
    for key in fields.keys() {
        if !schema.contains(key) {
            path.push_key(key);
            let violation = Violation::new(path.clone(), ViolationKind::UnexpectedProperty);
            path.pop();
            return Some(violation);
        }
    }
    for (key, descriptor) in schema.iter() {
        match fields.get(key) {
            None => {
                if !descriptor.is_optional() {
                    path.push_key(key);
                    let violation = Violation::new(path.clone(), ViolationKind::MissingRequired);
                    path.pop();
                    return Some(violation);
                }
            }
            Some(value) => {
                path.push_key(key);
                let violation = validate_descriptor(descriptor, value, path);
                path.pop();
                if violation.is_some() {
                    return violation;
                }
            }
        }
    }
    None
}

fn validate_descriptor(
    descriptor: &TypeDescriptor,
    value: &Value,
    path: &mut Path,
) -> Option<Violation> {
    if descriptor.is_nullable() && value.is_null() {
        return None;
    }
    match descriptor {
        TypeDescriptor::String(string) => validate_string(string, value, path),
        TypeDescriptor::Number(number) => validate_number(number, value, path),
        TypeDescriptor::Boolean(_) => validate_boolean(value, path),
        TypeDescriptor::Date(_) => validate_date(value, path),
        TypeDescriptor::Json(json) => validate_json(json, value, path),
        TypeDescriptor::Object(object) => validate_object(object, value, path),
        TypeDescriptor::Array(array) => validate_array(array, value, path),
        TypeDescriptor::Unknown => Some(Violation::new(
            path.clone(),
            ViolationKind::UnknownDescriptor,
        )),
    }
}

fn validate_string(
    descriptor: &StringDescriptor,
    value: &Value,
    path: &Path,
) -> Option<Violation> {
    let Value::String(text) = value else {
        return Some(Violation::new(
            path.clone(),
            ViolationKind::StringExpected {
                found: value.kind_name().to_string(),
            },
        ));
    };
    if let Some(allowed) = &descriptor.values {
        if !allowed.iter().any(|candidate| candidate == text) {
            return Some(Violation::new(
                path.clone(),
                ViolationKind::EnumNotAllowed {
                    value: text.clone(),
                    allowed: allowed.clone(),
                },
            ));
        }
    }
    None
}

fn validate_number(
    descriptor: &NumberDescriptor,
    value: &Value,
    path: &Path,
) -> Option<Violation> {
    let number = match value {
        Value::Number(number) if !number.is_nan() => *number,
        _ => {
            return Some(Violation::new(
                path.clone(),
                ViolationKind::NumberExpected {
                    found: value.kind_name().to_string(),
                },
            ));
        }
    };
    if let Some(allowed) = &descriptor.values {
        if !allowed.iter().any(|candidate| *candidate == number) {
            return Some(Violation::new(
                path.clone(),
                ViolationKind::EnumNotAllowed {
                    value: number.to_string(),
                    allowed: allowed.iter().map(|n| n.to_string()).collect(),
                },
            ));
        }
    }
    None
}

fn validate_boolean(value: &Value, path: &Path) -> Option<Violation> {
    match value {
        Value::Bool(_) => None,
        _ => Some(Violation::new(
            path.clone(),
            ViolationKind::BooleanExpected {
                found: value.kind_name().to_string(),
            },
        )),
    }
}

/// Native dates must carry a valid instant; strings must satisfy the
/// date-string policy. Non-strings report the expected-date violation,
/// strings that miss the policy report the invalid-format one.
fn validate_date(value: &Value, path: &Path) -> Option<Violation> {
    match value {
        Value::Date(Some(_)) => None,
        Value::String(text) => {
            if is_date_string(text) {
                None
            } else {
                Some(Violation::new(
                    path.clone(),
                    ViolationKind::DateInvalidFormat,
                ))
            }
        }
        _ => Some(Violation::new(
            path.clone(),
            ViolationKind::DateExpected {
                found: value.kind_name().to_string(),
            },
        )),
    }
}

/// Date-string policy: an RFC 3339 timestamp is accepted outright;
/// otherwise the string must match the strict `YYYY-MM-DD` pattern and
/// name a real calendar date (`2021-02-30` matches the pattern but is
/// still rejected).
pub(crate) fn is_date_string(text: &str) -> bool {
    if DateTime::parse_from_rfc3339(text).is_ok() {
        return true;
    }
    if !DATE_PATTERN.is_match(text) {
        return false;
    }
    parse_calendar_date(text).is_some()
}

fn parse_calendar_date(text: &str) -> Option<NaiveDate> {
    let mut parts = text.splitn(3, '-');
    let year = parts.next()?.parse().ok()?;
    let month = parts.next()?.parse().ok()?;
    let day = parts.next()?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn validate_json(descriptor: &JsonDescriptor, value: &Value, path: &mut Path) -> Option<Violation> {
    if let Some(reason) = json_reason(value) {
        return Some(Violation::new(
            path.clone(),
            ViolationKind::JsonRejected { reason },
        ));
    }
    match &descriptor.of {
        None => None,
        Some(Of::Predicate(predicate)) => {
            if predicate.test(value) {
                None
            } else {
                Some(Violation::new(
                    path.clone(),
                    ViolationKind::JsonRejected {
                        reason: JsonReason::PredicateRejected,
                    },
                ))
            }
        }
        // The schema arm is not a closed-schema check: it revalidates
        // only the properties the value actually has, and arrays skip
        // it entirely.
        Some(Of::Schema(nested)) => {
            let Some(fields) = value.as_object() else {
                return None;
            };
            let snapshot = fields.read().clone();
            for (key, field_descriptor) in nested.iter() {
                if let Some(field) = snapshot.get(key) {
                    path.push_key(key);
                    let violation = validate_descriptor(field_descriptor, field, path);
                    path.pop();
                    if violation.is_some() {
                        return violation;
                    }
                }
            }
            None
        }
    }
}

fn validate_object(
    descriptor: &ObjectDescriptor,
    value: &Value,
    path: &mut Path,
) -> Option<Violation> {
    let Some(fields) = value.as_object() else {
        return Some(Violation::new(
            path.clone(),
            ViolationKind::ObjectExpected {
                found: value.kind_name().to_string(),
            },
        ));
    };
    match &descriptor.of {
        Of::Predicate(predicate) => {
            if predicate.test(value) {
                None
            } else {
                Some(Violation::new(path.clone(), ViolationKind::ObjectRejected))
            }
        }
        Of::Schema(nested) => {
            let snapshot = fields.read().clone();
            validate_fields(nested, &snapshot, path)
        }
    }
}

fn validate_array(
    descriptor: &ArrayDescriptor,
    value: &Value,
    path: &mut Path,
) -> Option<Violation> {
    let Some(items) = value.as_array() else {
        return Some(Violation::new(
            path.clone(),
            ViolationKind::ArrayExpected {
                found: value.kind_name().to_string(),
            },
        ));
    };
    let snapshot = items.read().clone();
    match &descriptor.of {
        ElementOf::Predicate(predicate) => {
            for (index, item) in snapshot.iter().enumerate() {
                if !predicate.test(item) {
                    path.push_index(index);
                    let violation = Violation::new(
                        path.clone(),
                        ViolationKind::ArrayItemInvalid {
                            found: item.kind_name().to_string(),
                        },
                    );
                    path.pop();
                    return Some(violation);
                }
            }
            None
        }
        ElementOf::Descriptor(element) => {
            for (index, item) in snapshot.iter().enumerate() {
                path.push_index(index);
                let violation = validate_descriptor(element, item, path);
                path.pop();
                if violation.is_some() {
                    return violation;
                }
            }
            None
        }
    }
}

/// Why a value fails the JSON-safety check, if it does.
///
/// The top level is kind-restricted: null, primitives, functions, and
/// the non-serializable built-ins are rejected by name, class instances
/// by their class. Arrays and plain objects then go through the
/// serialization probe.
fn json_reason(value: &Value) -> Option<JsonReason> {
    match value {
        Value::Null => Some(JsonReason::Null),
        Value::Function(_) => Some(JsonReason::Function),
        Value::Bool(_)
        | Value::Number(_)
        | Value::BigInt(_)
        | Value::String(_)
        | Value::Symbol(_) => Some(JsonReason::NotObject {
            found: value.kind_name().to_string(),
        }),
        Value::Date(_) => Some(JsonReason::Date),
        Value::Regex(_) => Some(JsonReason::Regexp),
        Value::Error(_) => Some(JsonReason::Error),
        Value::Map(_) => Some(JsonReason::Map),
        Value::Set(_) => Some(JsonReason::Set),
        Value::WeakMap => Some(JsonReason::WeakMap),
        Value::WeakSet => Some(JsonReason::WeakSet),
        Value::Instance(instance) => Some(JsonReason::ClassInstance {
            class: instance.class.clone(),
        }),
        Value::Array(_) | Value::Object(_) => probe(value, &mut Vec::new()).err(),
    }
}

/// Serialization probe: walks exactly the containers JSON serialization
/// would walk (arrays, plain objects, and the fields of nested class
/// instances) and reports what would make it fail. Nested dates, maps,
/// sets, symbols and functions serialize without raising (dropped or
/// stringified), so the probe does not descend into them. Cycles are
/// detected by container identity along the current trail, which keeps
/// shared but acyclic substructure linear.
fn probe(value: &Value, trail: &mut Vec<usize>) -> Result<(), JsonReason> {
    match value {
        Value::BigInt(_) => Err(JsonReason::BigInt),
        Value::Array(items) => {
            if trail.contains(&items.addr()) {
                return Err(JsonReason::Circular);
            }
            trail.push(items.addr());
            let snapshot = items.read().clone();
            for item in &snapshot {
                probe(item, trail)?;
            }
            trail.pop();
            Ok(())
        }
        Value::Object(fields) => probe_fields(fields, trail),
        Value::Instance(instance) => probe_fields(&instance.fields, trail),
        _ => Ok(()),
    }
}

fn probe_fields(fields: &Shared<Fields>, trail: &mut Vec<usize>) -> Result<(), JsonReason> {
    if trail.contains(&fields.addr()) {
        return Err(JsonReason::Circular);
    }
    trail.push(fields.addr());
    let snapshot = fields.read().clone();
    for field in snapshot.values() {
        probe(field, trail)?;
    }
    trail.pop();
    Ok(())
}
