//! Translation-bundle support for catalog languages.
//!
//! Every language document carries two string bundles consumed by the public
//! widget: `widget` (browser UI labels) and `form` (order form and email
//! labels). This module holds the fixed key sets those surfaces expect, the
//! default Ukrainian bundles applied when a new language is created without
//! explicit strings, and a validator that reports incomplete bundles.
//!
//! A missing key is never fatal: consumers fall back to a placeholder label.

mod defaults;
mod keys;
mod validator;

pub use defaults::{default_form_bundle, default_widget_bundle};
pub use keys::{FORM_KEYS, WIDGET_KEYS};
pub use validator::{BundleValidator, ValidationReport};
