//! Compiled guards.
//!
//! A [`Guard`] binds one [`Schema`] and exposes the three entry points
//! callers use: the boolean predicate, the structured first-violation
//! check, and the localized message. All three run the same traversal.

use crate::error::SchemaResult;
use crate::provider::MessageProvider;
use crate::schema::Schema;
use crate::validator;
use crate::value::Value;
use crate::violation::Violation;

/// A compiled validator bound to one schema.
///
/// Guards own no mutable state and are `Send + Sync`: build one at
/// setup time and validate from as many threads as you like.
#[derive(Debug, Clone)]
pub struct Guard {
    schema: Schema,
}

impl Guard {
    /// Compile a guard over a schema.
    ///
    /// Never fails: a descriptor with an unrecognized type tag stays in
    /// the schema and rejects its property at validation time with a
    /// path-qualified message instead.
    pub fn new(schema: Schema) -> Self {
        tracing::debug!(properties = schema.len(), "Compiled guard");
        Self { schema }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The first violation, or `None` when the value conforms.
    pub fn check(&self, value: &Value) -> Option<Violation> {
        validator::validate(&self.schema, value)
    }

    /// Whether the value conforms to the schema.
    pub fn is_valid(&self, value: &Value) -> bool {
        self.check(value).is_none()
    }

    /// The first violation formatted through `provider`, or `None` when
    /// the value conforms. Derived from the same traversal as
    /// [`is_valid`](Guard::is_valid), so the reason reported always
    /// matches the reason the predicate rejects for.
    pub fn message(&self, value: &Value, provider: &dyn MessageProvider) -> Option<String> {
        self.check(value)
            .map(|violation| violation.message(provider))
    }

    /// Derive a guard over the same shape with every top-level property
    /// optional. The receiver is left untouched. Errs if any schema
    /// entry is an unrecognized descriptor, which is a caller bug worth
    /// failing loudly on at derivation time.
    pub fn optional(&self) -> SchemaResult<Guard> {
        let derived = self.schema.all_optional()?;
        tracing::debug!(properties = derived.len(), "Derived all-optional guard");
        Ok(Guard { schema: derived })
    }
}
