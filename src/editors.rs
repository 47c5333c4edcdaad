//! Per-entity editors: field rules and document assembly for every "add"
//! form, composed on the shared [`editor`] pipeline.
//!
//! Each editor mirrors its admin form: the same required-field rules and the
//! same document shape, including the denormalized names image sets capture
//! at write time.

use chrono::Utc;
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::catalog::{decode_document, Color, House, Stored, Trademark, Translations};
use crate::editor::{
    self, Draft, EditorError, FieldError, FieldKind, FieldSpec, UploadedFiles, WriteTarget,
};
use crate::i18n::{default_form_bundle, default_widget_bundle, BundleValidator};
use crate::snapshot::{assemble as assemble_snapshot, CatalogSelection, fetch_language_catalog};
use crate::storage::ObjectStorage;
use crate::store::{collections, CollectionPath, DocStore};

// ==================== Field rules ====================

pub const LANGUAGE_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("name", FieldKind::Text, "Будь ласка, введіть назву мови!"),
    FieldSpec::required("code", FieldKind::Text, "Будь ласка, введіть код мови!"),
];

pub const TRADEMARK_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("languageId", FieldKind::Selection, "Будь ласка, виберіть мову!"),
    FieldSpec::required("tmName", FieldKind::Text, "Будь ласка, введіть назву!"),
    FieldSpec::required("description", FieldKind::Text, "Будь ласка, введіть опис!"),
    FieldSpec::required("colorTm", FieldKind::Text, "Будь ласка, введіть Колір!"),
];

pub const COLOR_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("languageId", FieldKind::Selection, "Будь ласка, виберіть мову!"),
    FieldSpec::required("colorName", FieldKind::Text, "Будь ласка, введіть назву кольору!"),
];

pub const HOUSE_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("languageId", FieldKind::Selection, "Будь ласка, виберіть мову!"),
    FieldSpec::required("name", FieldKind::Text, "Будь ласка, введіть назву будинку!"),
];

pub const IMAGE_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("languageId", FieldKind::Selection, "Будь ласка, виберіть мову!"),
    FieldSpec::required("houseId", FieldKind::Selection, "Будь ласка, виберіть будинок!"),
    FieldSpec::required(
        "trademarkId",
        FieldKind::Selection,
        "Будь ласка, виберіть торгову марку!",
    ),
    FieldSpec::required("colorId", FieldKind::Selection, "Будь ласка, виберіть колір!"),
];

pub const WIDGET_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("widgetName", FieldKind::Text, "Будь ласка, введіть назву віджету!"),
    FieldSpec::required("adminEmail", FieldKind::Email, "Будь ласка, введіть email!"),
    FieldSpec::required("languageId", FieldKind::Selection, "Будь ласка, виберіть мову!"),
];

// ==================== Language ====================

/// Create a language with its translation bundles. Omitted or empty bundles
/// fall back to the Ukrainian defaults so a fresh language renders a
/// complete widget.
pub async fn create_language(
    store: &DocStore,
    storage: &ObjectStorage,
    draft: &Draft,
    refresh: impl FnOnce(),
) -> Result<String, EditorError> {
    editor::submit(
        store,
        storage,
        LANGUAGE_FIELDS,
        draft,
        |draft, _uploaded| {
            let translations = language_translations(draft);

            let report = BundleValidator::validate(&translations);
            for warning in &report.warnings {
                tracing::warn!("Language bundle incomplete: {}", warning);
            }

            let body = json!({
                "name": draft.field_str("name").unwrap_or_default(),
                "code": draft.field_str("code").unwrap_or_default(),
                "translations": serde_json::to_value(&translations).unwrap_or_default(),
            });
            (
                WriteTarget::Add(CollectionPath::root(collections::LANGUAGES)),
                body,
            )
        },
        refresh,
    )
    .await
}

fn language_translations(draft: &Draft) -> Translations {
    let widget = bundle_field(draft, "widget").unwrap_or_else(default_widget_bundle);
    let form = bundle_field(draft, "form").unwrap_or_else(default_form_bundle);
    Translations { widget, form }
}

fn bundle_field(draft: &Draft, name: &str) -> Option<BTreeMap<String, String>> {
    let object = draft.fields.get(name)?.as_object()?;
    if object.is_empty() {
        return None;
    }
    Some(
        object
            .iter()
            .filter_map(|(key, value)| Some((key.clone(), value.as_str()?.to_string())))
            .collect(),
    )
}

// ==================== Trademark ====================

/// Create a trademark under one language.
///
/// The logo is the only required attachment. Advantage and per-color images
/// are matched to their JSON rows by indexed field names
/// (`advantageImage[0]`, `colorImage[2]`, ...).
pub async fn create_trademark(
    store: &DocStore,
    storage: &ObjectStorage,
    draft: &Draft,
    refresh: impl FnOnce(),
) -> Result<String, EditorError> {
    let language_id = validated_language_id(TRADEMARK_FIELDS, draft)?;
    require_attachment(draft, "logo", "Будь ласка, завантажте лого!")?;

    editor::submit(
        store,
        storage,
        TRADEMARK_FIELDS,
        draft,
        move |draft, uploaded| {
            let now = Utc::now().to_rfc3339();
            let body = json!({
                "tmName": draft.field_str("tmName").unwrap_or_default(),
                "description": draft.field_str("description").unwrap_or_default(),
                "colorTm": draft.field_str("colorTm").unwrap_or_default(),
                "logoUrl": uploaded.first("logo"),
                "nameUrl": uploaded.first("nameUrl"),
                "desktopAdvantageUrl": uploaded.first("desktopAdvantage"),
                "mobileAdvantageUrl": uploaded.first("mobileAdvantage"),
                "pdfUrl": uploaded.first("pdf"),
                "advantages": trademark_advantages(draft, uploaded),
                "colors": trademark_colors(draft, uploaded),
                "createdAt": now,
                "updatedAt": now,
            });
            (
                WriteTarget::Add(CollectionPath::language_sub(&language_id, collections::TRADEMARKS)),
                body,
            )
        },
        refresh,
    )
    .await
}

fn trademark_advantages(draft: &Draft, uploaded: &UploadedFiles) -> Value {
    let rows = draft
        .fields
        .get("advantages")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    Value::Array(
        rows.iter()
            .enumerate()
            .map(|(i, row)| {
                json!({
                    "text": row["text"].as_str().unwrap_or_default(),
                    "image": uploaded.first(&format!("advantageImage[{}]", i)),
                })
            })
            .collect(),
    )
}

fn trademark_colors(draft: &Draft, uploaded: &UploadedFiles) -> Value {
    let rows = draft
        .fields
        .get("colors")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    Value::Array(
        rows.iter()
            .enumerate()
            .map(|(i, row)| {
                json!({
                    "name": row["name"].as_str().unwrap_or_default(),
                    "image": uploaded.first(&format!("colorImage[{}]", i)),
                    "pdf": uploaded.first(&format!("colorPdf[{}]", i)),
                })
            })
            .collect(),
    )
}

// ==================== Color ====================

/// Create a color under one language, with its trademark associations and
/// their texture images (`texture[i]` attachments match the `trademarks`
/// rows by index).
pub async fn create_color(
    store: &DocStore,
    storage: &ObjectStorage,
    draft: &Draft,
    refresh: impl FnOnce(),
) -> Result<String, EditorError> {
    let language_id = validated_language_id(COLOR_FIELDS, draft)?;

    editor::submit(
        store,
        storage,
        COLOR_FIELDS,
        draft,
        move |draft, uploaded| {
            let rows = draft
                .fields
                .get("trademarks")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();

            let trademarks: Vec<Value> = rows
                .iter()
                .enumerate()
                .map(|(i, row)| {
                    json!({
                        "trademarkId": row["trademarkId"].as_str().unwrap_or_default(),
                        "trademarkName": row["trademarkName"].as_str().unwrap_or_default(),
                        "trademarkTextureUrl": uploaded.first(&format!("texture[{}]", i)),
                    })
                })
                .collect();

            let body = json!({
                "colorName": draft.field_str("colorName").unwrap_or_default(),
                "trademarks": trademarks,
            });
            (
                WriteTarget::Add(CollectionPath::language_sub(&language_id, collections::COLORS)),
                body,
            )
        },
        refresh,
    )
    .await
}

// ==================== House ====================

pub async fn create_house(
    store: &DocStore,
    storage: &ObjectStorage,
    draft: &Draft,
    refresh: impl FnOnce(),
) -> Result<String, EditorError> {
    let language_id = validated_language_id(HOUSE_FIELDS, draft)?;

    editor::submit(
        store,
        storage,
        HOUSE_FIELDS,
        draft,
        move |draft, uploaded| {
            let body = json!({
                "name": draft.field_str("name").unwrap_or_default(),
                "iconUrl": uploaded.first("icon").unwrap_or(""),
            });
            (
                WriteTarget::Add(CollectionPath::language_sub(&language_id, collections::HOUSES)),
                body,
            )
        },
        refresh,
    )
    .await
}

// ==================== Image set ====================

/// Create an image set for a house/trademark/color combination.
///
/// House, trademark and color names are copied into the document at write
/// time and never refreshed afterwards - a later rename of the source entity
/// leaves these labels stale by design.
pub async fn create_image_set(
    store: &DocStore,
    storage: &ObjectStorage,
    draft: &Draft,
    refresh: impl FnOnce(),
) -> Result<String, EditorError> {
    let language_id = validated_language_id(IMAGE_FIELDS, draft)?;

    let house = lookup_selection::<House>(
        store,
        &language_id,
        collections::HOUSES,
        draft,
        "houseId",
    )?;
    let trademark = lookup_selection::<Trademark>(
        store,
        &language_id,
        collections::TRADEMARKS,
        draft,
        "trademarkId",
    )?;
    let color = lookup_selection::<Color>(
        store,
        &language_id,
        collections::COLORS,
        draft,
        "colorId",
    )?;

    editor::submit(
        store,
        storage,
        IMAGE_FIELDS,
        draft,
        move |_draft, uploaded| {
            let body = json!({
                "houseId": house.id,
                "houseName": house.data.name,
                "trademarkId": trademark.id,
                "trademarkName": trademark.data.tm_name,
                "colorId": color.id,
                "colorName": [color.data.color_name],
                "imageUrls": uploaded.all("images"),
            });
            (
                WriteTarget::Add(CollectionPath::language_sub(&language_id, collections::IMAGES)),
                body,
            )
        },
        refresh,
    )
    .await
}

// ==================== Widget ====================

/// Assemble and save a widget snapshot. With `existing_id` this is the
/// full-overwrite edit path; the snapshot is rebuilt from the current
/// catalog either way.
pub async fn save_widget(
    store: &DocStore,
    storage: &ObjectStorage,
    draft: &Draft,
    selection: &CatalogSelection,
    existing_id: Option<String>,
    refresh: impl FnOnce(),
) -> Result<String, EditorError> {
    editor::validate(WIDGET_FIELDS, draft).map_err(EditorError::Validation)?;

    let language_id = draft.field_str("languageId").unwrap_or_default().to_string();
    let catalog = fetch_language_catalog(store, &language_id).map_err(EditorError::Lookup)?;

    let widget = assemble_snapshot(
        draft.field_str("widgetName").unwrap_or_default(),
        draft.field_str("adminEmail").unwrap_or_default(),
        selection,
        &catalog,
    );
    let body = serde_json::to_value(&widget).map_err(|e| EditorError::Write(e.into()))?;

    editor::submit(
        store,
        storage,
        WIDGET_FIELDS,
        draft,
        move |_draft, _uploaded| {
            let target = match existing_id {
                Some(id) => WriteTarget::Set(CollectionPath::root(collections::WIDGETS), id),
                None => WriteTarget::Add(CollectionPath::root(collections::WIDGETS)),
            };
            (target, body)
        },
        refresh,
    )
    .await
}

// ==================== Shared helpers ====================

fn require_attachment(draft: &Draft, field: &str, message: &str) -> Result<(), EditorError> {
    if draft.attachments.iter().any(|a| a.field == field) {
        Ok(())
    } else {
        Err(EditorError::Validation(vec![FieldError {
            field: field.to_string(),
            message: message.to_string(),
        }]))
    }
}

/// Run field validation early and pull out the owning language id, so
/// assembly can rely on both.
fn validated_language_id(specs: &[FieldSpec], draft: &Draft) -> Result<String, EditorError> {
    editor::validate(specs, draft).map_err(EditorError::Validation)?;
    Ok(draft.field_str("languageId").unwrap_or_default().to_string())
}

/// Resolve a dependent selection against its language-scoped collection.
/// A selected id that no longer exists is a validation failure, not a write
/// of dangling denormalized labels.
fn lookup_selection<T: serde::de::DeserializeOwned>(
    store: &DocStore,
    language_id: &str,
    sub_collection: &str,
    draft: &Draft,
    field: &str,
) -> Result<Stored<T>, EditorError> {
    let id = draft.field_str(field).unwrap_or_default();
    let path = CollectionPath::language_sub(language_id, sub_collection);

    let document = store
        .get(&path, id)
        .map_err(EditorError::Lookup)?
        .ok_or_else(|| {
            EditorError::Validation(vec![FieldError {
                field: field.to_string(),
                message: "Вибраний запис не знайдено".to_string(),
            }])
        })?;

    decode_document(&path, &document).map_err(EditorError::Lookup)
}
