//! Translation bundle validation.
//!
//! Checks a language's bundles against the fixed key sets the public widget
//! consumes. An incomplete bundle is reported, never enforced: the widget
//! degrades to placeholder labels for missing keys.

use crate::catalog::Translations;
use crate::i18n::keys::{FORM_KEYS, WIDGET_KEYS};

/// Validation report containing errors and warnings about a bundle pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// An entirely empty bundle - the widget would render placeholders only
    pub errors: Vec<String>,

    /// Individual keys that are missing or blank
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for a language's translation bundles.
pub struct BundleValidator;

impl BundleValidator {
    /// Check both bundles against the required key sets.
    ///
    /// # Returns
    /// A `ValidationReport`: an empty bundle is an error, a missing or blank
    /// key is a warning.
    pub fn validate(translations: &Translations) -> ValidationReport {
        let mut report = ValidationReport::new();

        Self::check_bundle("widget", &translations.widget, WIDGET_KEYS, &mut report);
        Self::check_bundle("form", &translations.form, FORM_KEYS, &mut report);

        report
    }

    fn check_bundle(
        bundle_name: &str,
        bundle: &std::collections::BTreeMap<String, String>,
        required: &[&str],
        report: &mut ValidationReport,
    ) {
        if bundle.is_empty() {
            report
                .errors
                .push(format!("Bundle '{}' is empty", bundle_name));
            return;
        }

        for key in required {
            match bundle.get(*key) {
                None => report
                    .warnings
                    .push(format!("Bundle '{}' is missing key '{}'", bundle_name, key)),
                Some(value) if value.trim().is_empty() => report
                    .warnings
                    .push(format!("Bundle '{}' has blank key '{}'", bundle_name, key)),
                Some(_) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::defaults::{default_form_bundle, default_widget_bundle};

    fn complete_translations() -> Translations {
        Translations {
            widget: default_widget_bundle(),
            form: default_form_bundle(),
        }
    }

    #[test]
    fn test_default_bundles_are_clean() {
        let report = BundleValidator::validate(&complete_translations());
        assert!(report.is_clean(), "unexpected report: {:?}", report);
    }

    #[test]
    fn test_missing_key_is_a_warning() {
        let mut translations = complete_translations();
        translations.form.remove("letter_subject");

        let report = BundleValidator::validate(&translations);
        assert!(!report.has_errors());
        assert!(report.has_warnings());
        assert!(report.warnings[0].contains("letter_subject"));
    }

    #[test]
    fn test_blank_key_is_a_warning() {
        let mut translations = complete_translations();
        translations
            .widget
            .insert("download_pdf".to_string(), "  ".to_string());

        let report = BundleValidator::validate(&translations);
        assert!(report.has_warnings());
        assert!(report.warnings[0].contains("download_pdf"));
    }

    #[test]
    fn test_empty_bundle_is_an_error() {
        let translations = Translations {
            widget: Default::default(),
            form: default_form_bundle(),
        };

        let report = BundleValidator::validate(&translations);
        assert!(report.has_errors());
        assert!(report.errors[0].contains("widget"));
        // An empty bundle is not additionally reported key by key
        assert!(!report.has_warnings());
    }
}
