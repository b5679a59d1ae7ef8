// Runtime value model
//
// Guards validate dynamically-typed input, so the engine needs a value
// representation that distinguishes every kind the checks can reject:
// plain JSON data, dates (possibly with an invalid instant), and the
// non-serializable built-ins the JSON-safety check must name (regex,
// error, map, set, weak collections, functions, symbols, class
// instances).

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Ordered property map of an object-like value
pub type Fields = IndexMap<String, Value>;

/// Shared, mutable container payload.
///
/// Containers are reference-counted so values can alias each other —
/// cyclic inputs are representable, which the JSON serialization probe
/// must detect rather than diverge on. Validation itself only ever
/// reads.
#[derive(Debug, Default)]
pub struct Shared<T>(Arc<RwLock<T>>);

impl<T> Shared<T> {
    pub fn new(inner: T) -> Self {
        Shared(Arc::new(RwLock::new(inner)))
    }

    /// Read access; recovers from poisoning since readers never observe
    /// partial writes here (validation performs none).
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write access, for building aliased or cyclic values.
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stable address of the shared allocation, used for cycle
    /// detection by pointer identity.
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Shared(Arc::clone(&self.0))
    }
}

/// A class instance: named class plus its enumerable fields.
#[derive(Debug, Clone)]
pub struct Instance {
    pub class: String,
    pub fields: Shared<Fields>,
}

/// A dynamically-typed runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    /// Numeric value; NaN is representable and rejected by the number check
    Number(f64),
    BigInt(i128),
    String(String),
    /// Symbol with an optional description
    Symbol(Option<String>),
    /// Date instant; `None` is the invalid-instant state
    Date(Option<DateTime<Utc>>),
    /// Regular expression, kept as its source text
    Regex(String),
    /// Error value, kept as its message
    Error(String),
    /// Function value with an optional name
    Function(Option<String>),
    Array(Shared<Vec<Value>>),
    Object(Shared<Fields>),
    Map(Shared<Vec<(Value, Value)>>),
    Set(Shared<Vec<Value>>),
    /// Weak collections carry no enumerable contents
    WeakMap,
    WeakSet,
    Instance(Instance),
}

impl Value {
    /// Build an object from `(name, value)` pairs, preserving order.
    pub fn object<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(Shared::new(
            fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// Build an array from its elements.
    pub fn array<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::Array(Shared::new(items.into_iter().collect()))
    }

    /// Build a map value from `(key, value)` entries.
    pub fn map<I: IntoIterator<Item = (Value, Value)>>(entries: I) -> Self {
        Value::Map(Shared::new(entries.into_iter().collect()))
    }

    /// Build a set value from its members.
    pub fn set<I: IntoIterator<Item = Value>>(members: I) -> Self {
        Value::Set(Shared::new(members.into_iter().collect()))
    }

    /// Build a class instance with the given class name and fields.
    pub fn instance<K, I>(class: impl Into<String>, fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Instance(Instance {
            class: class.into(),
            fields: Shared::new(fields.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        })
    }

    /// A date with a valid instant.
    pub fn date(instant: DateTime<Utc>) -> Self {
        Value::Date(Some(instant))
    }

    /// A date whose instant is invalid (the NaN-time state).
    pub fn invalid_date() -> Self {
        Value::Date(None)
    }

    pub fn symbol(description: Option<&str>) -> Self {
        Value::Symbol(description.map(str::to_string))
    }

    pub fn function(name: Option<&str>) -> Self {
        Value::Function(name.map(str::to_string))
    }

    pub fn regex(source: impl Into<String>) -> Self {
        Value::Regex(source.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Value::Error(message.into())
    }

    /// The runtime kind reported in `got ${type}` message parameters.
    /// Class instances report their class name.
    pub fn kind_name(&self) -> &str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Date(_) => "date",
            Value::Regex(_) => "regexp",
            Value::Error(_) => "error",
            Value::Function(_) => "function",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Map(_) => "map",
            Value::Set(_) => "set",
            Value::WeakMap => "weakmap",
            Value::WeakSet => "weakset",
            Value::Instance(instance) => &instance.class,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The object fields, if this is a plain object.
    pub fn as_object(&self) -> Option<&Shared<Fields>> {
        match self {
            Value::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// The array elements, if this is an array.
    pub fn as_array(&self) -> Option<&Shared<Vec<Value>>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for Value {
    /// Converts decoded JSON (e.g. a request body) into the runtime
    /// model. Map entries keep document order (`serde_json`'s
    /// `preserve_order` feature), which unexpected-property reporting
    /// relies on.
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::array(items.into_iter().map(Value::from)),
            serde_json::Value::Object(map) => {
                Value::object(map.into_iter().map(|(k, v)| (k, Value::from(v))))
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
