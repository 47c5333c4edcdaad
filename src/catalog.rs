//! Typed catalog entities and the decoding boundary over the document store.
//!
//! Documents are stored with the original camelCase field names (`tmName`,
//! `colorTm`, `logoUrl`, ...) so existing exports stay readable. Everything
//! crossing the store boundary as a typed entity goes through
//! [`decode_document`] / [`decode_collection`]; malformed documents are
//! rejected there instead of leaking half-parsed data into rendering.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::store::{CollectionPath, Document};

/// Placeholder rendered wherever a label cannot be resolved (unknown language
/// id, missing translation key).
pub const MISSING_LABEL: &str = "—";

/// A decoded document: generated id plus the typed body.
///
/// Widget documents embed these wholesale as snapshots, id included, which is
/// why the body is flattened on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stored<T> {
    pub id: String,
    #[serde(flatten)]
    pub data: T,
}

// ==================== Language ====================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub translations: Translations,
}

/// The two translation-string bundles every language carries. The public
/// widget and its order form consume a fixed key set (see `i18n::keys`);
/// a missing key degrades to [`MISSING_LABEL`], never a hard failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Translations {
    #[serde(default)]
    pub widget: BTreeMap<String, String>,
    #[serde(default)]
    pub form: BTreeMap<String, String>,
}

impl Translations {
    pub fn widget_label(&self, key: &str) -> &str {
        self.widget.get(key).map(String::as_str).unwrap_or(MISSING_LABEL)
    }

    pub fn form_label(&self, key: &str) -> &str {
        self.form.get(key).map(String::as_str).unwrap_or(MISSING_LABEL)
    }
}

// ==================== Trademark ====================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trademark {
    pub tm_name: String,
    pub description: String,
    /// Brand color as a hex string, e.g. `#ff5500`.
    pub color_tm: String,
    pub logo_url: Option<String>,
    pub name_url: Option<String>,
    pub desktop_advantage_url: Option<String>,
    pub mobile_advantage_url: Option<String>,
    pub pdf_url: Option<String>,
    #[serde(default)]
    pub advantages: Vec<Advantage>,
    #[serde(default)]
    pub colors: Vec<TrademarkColor>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advantage {
    pub text: String,
    pub image: Option<String>,
}

/// One facade color offered under a trademark, with its texture image and an
/// optional spec sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrademarkColor {
    pub name: String,
    pub image: Option<String>,
    pub pdf: Option<String>,
}

// ==================== Color ====================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Color {
    pub color_name: String,
    #[serde(default)]
    pub trademarks: Vec<ColorTrademark>,
}

/// Association from a color to one trademark carrying that color's texture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorTrademark {
    pub trademark_id: String,
    pub trademark_name: String,
    #[serde(default)]
    pub trademark_texture_url: Option<String>,
}

// ==================== House ====================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct House {
    pub name: String,
    #[serde(default)]
    pub icon_url: String,
}

// ==================== Image set ====================

/// Rendered facade photos for one house/trademark/color combination.
///
/// House, trademark and color names are denormalized at write time and never
/// refreshed when the source entity is renamed. Stale labels here are a known
/// product tradeoff; do not cascade updates into these documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSet {
    pub house_id: String,
    pub house_name: String,
    pub trademark_id: String,
    pub trademark_name: String,
    pub color_id: String,
    #[serde(default)]
    pub color_name: Vec<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

// ==================== Widget ====================

/// A saved, embeddable configuration snapshot of one language's catalog.
///
/// The `color`/`trademark`/`house` arrays are by-value copies taken when the
/// widget was last saved, not references: later edits to the source records
/// do not show up in the widget until it is edited and re-saved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub widget_name: String,
    pub admin_email: String,
    pub language_id: String,
    #[serde(default)]
    pub color: Vec<Stored<Color>>,
    #[serde(default)]
    pub trademark: Vec<Stored<Trademark>>,
    #[serde(default)]
    pub house: Vec<Stored<House>>,
}

// ==================== Decoding boundary ====================

/// Decode a single document into a typed entity. A malformed body is an
/// error, not a half-populated value.
pub fn decode_document<T: DeserializeOwned>(
    path: &CollectionPath,
    document: &Document,
) -> Result<Stored<T>> {
    let data: T = serde_json::from_value(document.body.clone())
        .context(format!("Malformed document {}/{}", path, document.id))?;

    Ok(Stored {
        id: document.id.clone(),
        data,
    })
}

/// Decode a whole listing, skipping documents that fail to parse.
pub fn decode_collection<T: DeserializeOwned>(
    path: &CollectionPath,
    documents: &[Document],
) -> Vec<Stored<T>> {
    documents
        .iter()
        .filter_map(|document| match decode_document(path, document) {
            Ok(stored) => Some(stored),
            Err(e) => {
                tracing::warn!("Rejecting document in {}: {:#}", path, e);
                None
            }
        })
        .collect()
}
