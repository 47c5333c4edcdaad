//! HTTP surface: the admin API, the public widget endpoints and the mail
//! relay, wired over one shared [`AppState`].
//!
//! Admin routes never rely on ambient auth state: every protected handler
//! receives an explicit [`Session`] and runs `require_admin()` itself before
//! touching data.

use axum::extract::{FromRequestParts, Multipart, Path, Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::convert::Infallible;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::browse::{BrowseSpec, Column, RecordBrowser, RenderedRow};
use crate::catalog::{decode_collection, decode_document, ImageSet, Stored, Widget};
use crate::config::Config;
use crate::editor::{Attachment, Draft};
use crate::editors;
use crate::error::{AppError, AppResult};
use crate::mail::{Mailer, SendMailRequest};
use crate::session::Session;
use crate::snapshot::{fetch_language_catalog, CatalogSelection, LanguageCatalog};
use crate::storage::{ObjectStorage, StoragePrefix};
use crate::store::{collections, CollectionPath, DocStore};

/// Shared application state, cheaply cloneable into every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: DocStore,
    pub storage: ObjectStorage,
    pub mailer: Mailer,
}

impl AppState {
    pub fn new(config: Config, store: DocStore) -> Self {
        let storage = ObjectStorage::new(&config);
        let mailer = Mailer::new(&config);
        Self {
            config: Arc::new(config),
            store,
            storage,
            mailer,
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        Ok(Session::from_bearer_token(token, &state.config.admin_token))
    }
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Public surface
        .route("/send-mail", post(send_mail))
        .route("/widgets/:id", get(get_widget))
        .route("/widgets/:id/images", get(get_widget_images))
        // Admin browse + editors
        .route("/api/languages", get(browse_languages).post(create_language))
        .route("/api/languages/:id", delete(delete_language))
        .route("/api/languages/:id/catalog", get(language_catalog))
        .route("/api/languages/:id/trademarks", post(create_trademark))
        .route("/api/languages/:id/colors", post(create_color))
        .route("/api/languages/:id/houses", post(create_house))
        .route("/api/languages/:id/images", post(create_image_set))
        .route("/api/languages/:id/:sub/:record_id", delete(delete_sub_record))
        .route("/api/trademarks", get(browse_trademarks))
        .route("/api/colors", get(browse_colors))
        .route("/api/houses", get(browse_houses))
        .route("/api/images", get(browse_images))
        .route("/api/widgets", get(browse_widgets).post(create_widget))
        .route("/api/widgets/:id", put(update_widget).delete(delete_widget))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ==================== Page column schemas ====================

fn join_strings(value: &Value) -> String {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default()
}

fn join_trademark_names(value: &Value) -> String {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["trademarkName"].as_str())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default()
}

fn count_photos(value: &Value) -> String {
    format!("{} фото", value.as_array().map(|a| a.len()).unwrap_or(0))
}

fn languages_spec() -> BrowseSpec {
    BrowseSpec {
        parent_collection: collections::LANGUAGES.to_string(),
        sub_collection: None,
        columns: vec![
            Column::new("Назва мови", "name"),
            Column::new("Код", "code"),
        ],
    }
}

fn trademarks_spec() -> BrowseSpec {
    BrowseSpec {
        parent_collection: collections::LANGUAGES.to_string(),
        sub_collection: Some(collections::TRADEMARKS.to_string()),
        columns: vec![
            Column::new("Назва", "tmName"),
            Column::new("Опис", "description"),
            Column::new("Колір", "colorTm"),
        ],
    }
}

fn colors_spec() -> BrowseSpec {
    BrowseSpec {
        parent_collection: collections::LANGUAGES.to_string(),
        sub_collection: Some(collections::COLORS.to_string()),
        columns: vec![
            Column::new("Назва кольору", "colorName"),
            Column::with_renderer("Торгові марки", "trademarks", join_trademark_names),
        ],
    }
}

fn houses_spec() -> BrowseSpec {
    BrowseSpec {
        parent_collection: collections::LANGUAGES.to_string(),
        sub_collection: Some(collections::HOUSES.to_string()),
        columns: vec![
            Column::new("Назва будинку", "name"),
            Column::new("Іконка", "iconUrl"),
        ],
    }
}

fn images_spec() -> BrowseSpec {
    BrowseSpec {
        parent_collection: collections::LANGUAGES.to_string(),
        sub_collection: Some(collections::IMAGES.to_string()),
        columns: vec![
            Column::new("Будинок", "houseName"),
            Column::new("Торгова марка", "trademarkName"),
            Column::with_renderer("Колір", "colorName", join_strings),
            Column::with_renderer("Зображення", "imageUrls", count_photos),
        ],
    }
}

fn widgets_spec() -> BrowseSpec {
    BrowseSpec {
        parent_collection: collections::WIDGETS.to_string(),
        sub_collection: None,
        columns: vec![
            Column::new("Назва віджету", "widgetName"),
            Column::new("Email адміністратора", "adminEmail"),
        ],
    }
}

// ==================== Browse handlers ====================

#[derive(Debug, Deserialize)]
struct BrowseQuery {
    language: Option<String>,
}

#[derive(Debug, Serialize)]
struct BrowseResponse {
    columns: Vec<String>,
    rows: Vec<RenderedRow>,
}

fn browse(
    state: &AppState,
    spec: BrowseSpec,
    language_filter: Option<&str>,
) -> AppResult<Json<BrowseResponse>> {
    let mut browser = RecordBrowser::new(spec);
    browser.refresh(&state.store, language_filter)?;

    Ok(Json(BrowseResponse {
        columns: browser.column_labels(),
        rows: browser.render_rows(),
    }))
}

async fn browse_languages(
    session: Session,
    State(state): State<AppState>,
) -> AppResult<Json<BrowseResponse>> {
    session.require_admin()?;
    browse(&state, languages_spec(), None)
}

async fn browse_trademarks(
    session: Session,
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> AppResult<Json<BrowseResponse>> {
    session.require_admin()?;
    browse(&state, trademarks_spec(), query.language.as_deref())
}

async fn browse_colors(
    session: Session,
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> AppResult<Json<BrowseResponse>> {
    session.require_admin()?;
    browse(&state, colors_spec(), query.language.as_deref())
}

async fn browse_houses(
    session: Session,
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> AppResult<Json<BrowseResponse>> {
    session.require_admin()?;
    browse(&state, houses_spec(), query.language.as_deref())
}

async fn browse_images(
    session: Session,
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> AppResult<Json<BrowseResponse>> {
    session.require_admin()?;
    browse(&state, images_spec(), query.language.as_deref())
}

async fn browse_widgets(
    session: Session,
    State(state): State<AppState>,
) -> AppResult<Json<BrowseResponse>> {
    session.require_admin()?;
    browse(&state, widgets_spec(), None)
}

// ==================== Delete handlers ====================

async fn delete_language(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    session.require_admin()?;
    // No cascade: sub-collections of the deleted language stay behind
    state
        .store
        .delete(&CollectionPath::root(collections::LANGUAGES), &id)?;
    tracing::info!("✓ Deleted languages/{}", id);
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_widget(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    session.require_admin()?;
    state
        .store
        .delete(&CollectionPath::root(collections::WIDGETS), &id)?;
    tracing::info!("✓ Deleted widgets/{}", id);
    Ok(StatusCode::NO_CONTENT)
}

const SUB_COLLECTIONS: &[&str] = &[
    collections::TRADEMARKS,
    collections::COLORS,
    collections::HOUSES,
    collections::IMAGES,
];

async fn delete_sub_record(
    session: Session,
    State(state): State<AppState>,
    Path((language_id, sub, record_id)): Path<(String, String, String)>,
) -> AppResult<StatusCode> {
    session.require_admin()?;

    if !SUB_COLLECTIONS.contains(&sub.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Unknown sub-collection '{}'",
            sub
        )));
    }

    let path = CollectionPath::language_sub(&language_id, &sub);
    state.store.delete(&path, &record_id)?;
    tracing::info!("✓ Deleted {}/{}", path, record_id);
    Ok(StatusCode::NO_CONTENT)
}

// ==================== Editor handlers ====================

#[derive(Debug, Serialize)]
struct CreatedResponse {
    id: String,
}

/// Collect a multipart submission into a [`Draft`].
///
/// Text parts whose value looks like JSON (`{...}` / `[...]`) carry
/// structured fields (option lists, translation bundles); everything else is
/// a plain string. File parts must map to a known storage prefix.
async fn draft_from_multipart(
    mut multipart: Multipart,
    prefix_for: fn(&str) -> Option<StoragePrefix>,
) -> AppResult<Draft> {
    let mut draft = Draft::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(file_name) = field.file_name().map(str::to_string) {
            let prefix = prefix_for(&name).ok_or_else(|| {
                AppError::BadRequest(format!("Unexpected file field '{}'", name))
            })?;
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Invalid file part '{}': {}", name, e)))?
                .to_vec();
            draft.attach(Attachment {
                field: name,
                file_name,
                content_type,
                bytes,
                prefix,
            });
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("Invalid text part '{}': {}", name, e)))?;
            draft.set_field(&name, parse_field_value(&text));
        }
    }

    Ok(draft)
}

fn parse_field_value(text: &str) -> Value {
    let trimmed = text.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
    } else {
        Value::String(text.to_string())
    }
}

fn no_files(_field: &str) -> Option<StoragePrefix> {
    None
}

fn trademark_prefix(field: &str) -> Option<StoragePrefix> {
    match field {
        "logo" | "nameUrl" => Some(StoragePrefix::Logos),
        "desktopAdvantage" | "mobileAdvantage" => Some(StoragePrefix::Advantages),
        "pdf" => Some(StoragePrefix::Pdfs),
        _ if field.starts_with("advantageImage[") => Some(StoragePrefix::Advantages),
        _ if field.starts_with("colorImage[") => Some(StoragePrefix::Colors),
        _ if field.starts_with("colorPdf[") => Some(StoragePrefix::ColorPdfs),
        _ => None,
    }
}

fn color_prefix(field: &str) -> Option<StoragePrefix> {
    field.starts_with("texture[").then_some(StoragePrefix::Textures)
}

fn house_prefix(field: &str) -> Option<StoragePrefix> {
    (field == "icon").then_some(StoragePrefix::HouseIcons)
}

fn images_prefix(field: &str) -> Option<StoragePrefix> {
    (field == "images").then_some(StoragePrefix::Images)
}

async fn create_language(
    session: Session,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    session.require_admin()?;

    let draft = draft_from_multipart(multipart, no_files).await?;
    let id = editors::create_language(&state.store, &state.storage, &draft, || {}).await?;
    tracing::info!("✓ Created languages/{}", id);
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

async fn create_trademark(
    session: Session,
    State(state): State<AppState>,
    Path(language_id): Path<String>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    session.require_admin()?;

    let mut draft = draft_from_multipart(multipart, trademark_prefix).await?;
    draft.set_field("languageId", json!(language_id));
    let id = editors::create_trademark(&state.store, &state.storage, &draft, || {}).await?;
    tracing::info!("✓ Created languages/{}/trademarks/{}", language_id, id);
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

async fn create_color(
    session: Session,
    State(state): State<AppState>,
    Path(language_id): Path<String>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    session.require_admin()?;

    let mut draft = draft_from_multipart(multipart, color_prefix).await?;
    draft.set_field("languageId", json!(language_id));
    let id = editors::create_color(&state.store, &state.storage, &draft, || {}).await?;
    tracing::info!("✓ Created languages/{}/colors/{}", language_id, id);
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

async fn create_house(
    session: Session,
    State(state): State<AppState>,
    Path(language_id): Path<String>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    session.require_admin()?;

    let mut draft = draft_from_multipart(multipart, house_prefix).await?;
    draft.set_field("languageId", json!(language_id));
    let id = editors::create_house(&state.store, &state.storage, &draft, || {}).await?;
    tracing::info!("✓ Created languages/{}/houses/{}", language_id, id);
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

async fn create_image_set(
    session: Session,
    State(state): State<AppState>,
    Path(language_id): Path<String>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    session.require_admin()?;

    let mut draft = draft_from_multipart(multipart, images_prefix).await?;
    draft.set_field("languageId", json!(language_id));
    let id = editors::create_image_set(&state.store, &state.storage, &draft, || {}).await?;
    tracing::info!("✓ Created languages/{}/images/{}", language_id, id);
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

// ==================== Widget handlers ====================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WidgetPayload {
    #[serde(default)]
    widget_name: Option<String>,
    #[serde(default)]
    admin_email: Option<String>,
    #[serde(default)]
    language_id: Option<String>,
    #[serde(default)]
    color_ids: Vec<String>,
    #[serde(default)]
    trademark_ids: Vec<String>,
    #[serde(default)]
    house_ids: Vec<String>,
}

fn widget_draft(payload: &WidgetPayload) -> (Draft, CatalogSelection) {
    let mut draft = Draft::default();
    if let Some(widget_name) = &payload.widget_name {
        draft.set_field("widgetName", json!(widget_name));
    }
    if let Some(admin_email) = &payload.admin_email {
        draft.set_field("adminEmail", json!(admin_email));
    }
    if let Some(language_id) = &payload.language_id {
        draft.set_field("languageId", json!(language_id));
    }

    let selection = CatalogSelection {
        color_ids: payload.color_ids.clone(),
        trademark_ids: payload.trademark_ids.clone(),
        house_ids: payload.house_ids.clone(),
    };
    (draft, selection)
}

async fn create_widget(
    session: Session,
    State(state): State<AppState>,
    Json(payload): Json<WidgetPayload>,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    session.require_admin()?;

    let (draft, selection) = widget_draft(&payload);
    let id = editors::save_widget(&state.store, &state.storage, &draft, &selection, None, || {})
        .await?;
    tracing::info!("✓ Created widgets/{}", id);
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

async fn update_widget(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<WidgetPayload>,
) -> AppResult<Json<CreatedResponse>> {
    session.require_admin()?;

    let widgets = CollectionPath::root(collections::WIDGETS);
    if state.store.get(&widgets, &id)?.is_none() {
        return Err(AppError::NotFound { entity: "Widget" });
    }

    let (draft, selection) = widget_draft(&payload);
    let id = editors::save_widget(
        &state.store,
        &state.storage,
        &draft,
        &selection,
        Some(id),
        || {},
    )
    .await?;
    tracing::info!("✓ Updated widgets/{}", id);
    Ok(Json(CreatedResponse { id }))
}

async fn language_catalog(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<LanguageCatalog>> {
    session.require_admin()?;
    let catalog = fetch_language_catalog(&state.store, &id)?;
    Ok(Json(catalog))
}

// ==================== Public surface ====================

async fn get_widget(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Stored<Widget>>> {
    let widgets = CollectionPath::root(collections::WIDGETS);
    let document = state
        .store
        .get(&widgets, &id)?
        .ok_or(AppError::NotFound { entity: "Widget" })?;

    let widget = decode_document::<Widget>(&widgets, &document)?;
    Ok(Json(widget))
}

async fn get_widget_images(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Stored<ImageSet>>>> {
    let widgets = CollectionPath::root(collections::WIDGETS);
    let document = state
        .store
        .get(&widgets, &id)?
        .ok_or(AppError::NotFound { entity: "Widget" })?;
    let widget = decode_document::<Widget>(&widgets, &document)?;

    let images_path = CollectionPath::language_sub(&widget.data.language_id, collections::IMAGES);
    let image_sets = decode_collection::<ImageSet>(&images_path, &state.store.list(&images_path)?);
    Ok(Json(image_sets))
}

/// `POST /send-mail`: relay one widget order as two emails.
///
/// The response contract is fixed: 400 with `Missing required fields` when a
/// required field is absent or empty, 200 `{"success":true}` after both
/// sends, 500 with the transport message otherwise.
async fn send_mail(
    State(state): State<AppState>,
    Json(payload): Json<SendMailRequest>,
) -> Response {
    if payload.missing_required_fields() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": "Missing required fields" })),
        )
            .into_response();
    }

    match state.mailer.relay_order(&payload).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))).into_response(),
        Err(e) => {
            tracing::error!("Order relay failed: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
