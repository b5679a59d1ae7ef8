//! Message rendering seam.
//!
//! Validation produces catalog keys and named parameters; turning those
//! into human-readable text is someone else's job. Callers pass a
//! provider explicitly wherever a message is rendered, so two requests
//! in different languages never share state.

/// Resolves a message key and named parameters to display text.
///
/// Implementations decide the language and the template syntax. A
/// provider must return *something* for every key it is handed, even
/// keys it does not recognize, so that message rendering is total.
pub trait MessageProvider {
    fn translate(&self, key: &str, params: &[(&str, String)]) -> String;
}
