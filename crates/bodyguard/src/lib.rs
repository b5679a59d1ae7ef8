// Schema-driven runtime validation
//
// This crate validates untyped runtime values against declarative
// schemas, producing either a boolean verdict or a path-qualified,
// localizable diagnostic for the first violation. Message rendering
// goes through the MessageProvider seam; the bodyguard-i18n crate
// ships catalog-backed providers.

pub mod error;
pub mod guard;
pub mod provider;
pub mod schema;
mod validator;
pub mod value;
pub mod violation;

pub use error::{Path, PathSegment, SchemaError, SchemaResult};
pub use guard::Guard;
pub use provider::MessageProvider;
pub use schema::{ElementOf, Of, Predicate, Schema, TypeDescriptor};
pub use value::Value;
pub use violation::{JsonReason, Violation, ViolationKind};
