//! Generic record browser: the table-plus-delete engine every admin page
//! composes.
//!
//! A browser is parameterized by a parent collection, an optional
//! language-scoped sub-collection, and an ordered column schema. Sub-
//! collection browsing merges the named sub-collection of every language into
//! one flat list via [`fan_out`]; a synthesized column resolves each row's
//! parent language id to a display name through a side-loaded lookup map.

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::catalog::MISSING_LABEL;
use crate::store::{collections, CollectionPath, DocStore};

/// Formats one field value into a table cell.
pub type Renderer = fn(&Value) -> String;

/// One column of a browse table.
pub struct Column {
    pub label: String,
    pub field: String,
    pub render: Option<Renderer>,
}

impl Column {
    pub fn new(label: &str, field: &str) -> Self {
        Self {
            label: label.to_string(),
            field: field.to_string(),
            render: None,
        }
    }

    pub fn with_renderer(label: &str, field: &str, render: Renderer) -> Self {
        Self {
            label: label.to_string(),
            field: field.to_string(),
            render: Some(render),
        }
    }

    fn cell(&self, body: &Value) -> String {
        let value = &body[self.field.as_str()];
        if let Some(render) = self.render {
            return render(value);
        }
        match value {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Configuration of one browser instance.
pub struct BrowseSpec {
    pub parent_collection: String,
    pub sub_collection: Option<String>,
    pub columns: Vec<Column>,
}

/// One merged record: document id, owning language (sub-collection browsing
/// only), and the raw body the column schema projects from.
#[derive(Debug, Clone)]
pub struct Row {
    pub id: String,
    pub language_id: Option<String>,
    pub body: Value,
}

/// A row projected through the column schema, ready for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedRow {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_id: Option<String>,
    /// Resolved parent language name; present only for sub-collection pages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub cells: Vec<String>,
}

/// Merge the named sub-collection of every language into one flat list,
/// tagging each document with its parent language id.
///
/// Cost model: one listing of `languages` plus one listing per matching
/// language - O(L) store round-trips yielding O(L x S) rows. The catalog is
/// small and admin-only, so the N+1 shape is accepted; keep it in this one
/// function rather than hiding it in callers.
pub fn fan_out(
    store: &DocStore,
    sub_collection: &str,
    language_filter: Option<&str>,
) -> Result<Vec<Row>> {
    let languages = store.list(&CollectionPath::root(collections::LANGUAGES))?;

    let mut rows = Vec::new();
    for language in &languages {
        if let Some(filter) = language_filter {
            if language.id != filter {
                continue;
            }
        }

        let path = CollectionPath::language_sub(&language.id, sub_collection);
        for document in store.list(&path)? {
            rows.push(Row {
                id: document.id,
                language_id: Some(language.id.clone()),
                body: document.body,
            });
        }
    }

    Ok(rows)
}

/// Side-loaded language id -> display name map for the synthesized lookup
/// column.
pub fn language_name_map(store: &DocStore) -> Result<HashMap<String, String>> {
    let languages = store.list(&CollectionPath::root(collections::LANGUAGES))?;

    Ok(languages
        .into_iter()
        .map(|document| {
            let name = document.body["name"].as_str().unwrap_or(MISSING_LABEL).to_string();
            (document.id, name)
        })
        .collect())
}

pub struct RecordBrowser {
    spec: BrowseSpec,
    rows: Vec<Row>,
    language_names: HashMap<String, String>,
}

impl RecordBrowser {
    pub fn new(spec: BrowseSpec) -> Self {
        Self {
            spec,
            rows: Vec::new(),
            language_names: HashMap::new(),
        }
    }

    /// Re-fetch the full record list.
    ///
    /// On any read failure the previous rows stay in place: the caller
    /// surfaces the error and keeps showing the stale list.
    pub fn refresh(&mut self, store: &DocStore, language_filter: Option<&str>) -> Result<()> {
        match &self.spec.sub_collection {
            Some(sub_collection) => {
                let rows = fan_out(store, sub_collection, language_filter)?;
                self.language_names = language_name_map(store)?;
                self.rows = rows;
            }
            None => {
                let path = CollectionPath::root(&self.spec.parent_collection);
                self.rows = store
                    .list(&path)?
                    .into_iter()
                    .map(|document| Row {
                        id: document.id,
                        language_id: None,
                        body: document.body,
                    })
                    .collect();
            }
        }

        Ok(())
    }

    /// Delete one record by its full path and drop it from the in-memory
    /// list without a re-fetch. A failed delete leaves the row in place.
    ///
    /// Denormalized copies elsewhere (widget snapshots, image sets) are
    /// deliberately not touched.
    pub fn delete(
        &mut self,
        store: &DocStore,
        id: &str,
        language_id: Option<&str>,
    ) -> Result<bool> {
        let path = match (&self.spec.sub_collection, language_id) {
            (Some(sub_collection), Some(language_id)) => {
                CollectionPath::language_sub(language_id, sub_collection)
            }
            _ => CollectionPath::root(&self.spec.parent_collection),
        };

        let removed = store.delete(&path, id)?;
        self.rows.retain(|row| row.id != id);
        Ok(removed)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Column labels, including the synthesized language column when this
    /// browser fans out over a sub-collection.
    pub fn column_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.spec.columns.iter().map(|c| c.label.clone()).collect();
        if self.spec.sub_collection.is_some() {
            labels.push("Мова".to_string());
        }
        labels
    }

    /// Project every row through the column schema.
    pub fn render_rows(&self) -> Vec<RenderedRow> {
        self.rows
            .iter()
            .map(|row| {
                let cells = self.spec.columns.iter().map(|c| c.cell(&row.body)).collect();
                let language = row.language_id.as_deref().map(|id| {
                    self.language_names
                        .get(id)
                        .map(String::as_str)
                        .unwrap_or(MISSING_LABEL)
                        .to_string()
                });
                RenderedRow {
                    id: row.id.clone(),
                    language_id: row.language_id.clone(),
                    language,
                    cells,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use tempfile::TempDir;

    // ==================== Helper Functions ====================

    fn create_test_store() -> (DocStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test_browse.db");
        let store = DocStore::open(db_path.to_str().unwrap()).expect("Failed to open store");
        (store, temp_dir)
    }

    fn add_language(store: &DocStore, name: &str, code: &str) -> String {
        store
            .add(
                &CollectionPath::root(collections::LANGUAGES),
                &json!({"name": name, "code": code, "translations": {"widget": {}, "form": {}}}),
            )
            .expect("add language")
    }

    fn add_color(store: &DocStore, language_id: &str, color_name: &str) -> String {
        store
            .add(
                &CollectionPath::language_sub(language_id, collections::COLORS),
                &json!({"colorName": color_name, "trademarks": []}),
            )
            .expect("add color")
    }

    fn colors_spec() -> BrowseSpec {
        BrowseSpec {
            parent_collection: collections::LANGUAGES.to_string(),
            sub_collection: Some(collections::COLORS.to_string()),
            columns: vec![Column::new("Назва кольору", "colorName")],
        }
    }

    // ==================== Fan-Out Tests ====================

    #[test]
    fn test_fan_out_merges_all_languages() {
        let (store, _temp_dir) = create_test_store();

        let uk = add_language(&store, "Українська", "uk");
        let en = add_language(&store, "English", "en");
        add_color(&store, &uk, "Червоний");
        add_color(&store, &uk, "Синій");
        add_color(&store, &en, "Red");

        let rows = fan_out(&store, collections::COLORS, None).expect("fan out");
        assert_eq!(rows.len(), 3);

        let uk_rows: Vec<_> = rows
            .iter()
            .filter(|r| r.language_id.as_deref() == Some(uk.as_str()))
            .collect();
        assert_eq!(uk_rows.len(), 2);
    }

    #[test]
    fn test_fan_out_language_filter() {
        let (store, _temp_dir) = create_test_store();

        let uk = add_language(&store, "Українська", "uk");
        let en = add_language(&store, "English", "en");
        add_color(&store, &uk, "Червоний");
        add_color(&store, &en, "Red");

        let rows = fan_out(&store, collections::COLORS, Some(&uk)).expect("fan out");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].body["colorName"], "Червоний");
        assert_eq!(rows[0].language_id.as_deref(), Some(uk.as_str()));
    }

    #[test]
    fn test_fan_out_empty_catalog() {
        let (store, _temp_dir) = create_test_store();

        let rows = fan_out(&store, collections::COLORS, None).expect("fan out");
        assert!(rows.is_empty());
    }

    proptest! {
        // Union property: fanning out equals the union of every language's
        // sub-collection, each row tagged with its parent language id.
        #[test]
        fn prop_fan_out_is_tagged_union(counts in proptest::collection::vec(0usize..5, 1..4)) {
            let (store, _temp_dir) = create_test_store();

            let mut expected: HashMap<String, usize> = HashMap::new();
            for (i, count) in counts.iter().enumerate() {
                let language_id = add_language(&store, &format!("Мова {}", i), "xx");
                for j in 0..*count {
                    add_color(&store, &language_id, &format!("Колір {}-{}", i, j));
                }
                expected.insert(language_id, *count);
            }

            let rows = fan_out(&store, collections::COLORS, None).expect("fan out");
            prop_assert_eq!(rows.len(), counts.iter().sum::<usize>());

            let mut by_language: HashMap<String, usize> = HashMap::new();
            for row in &rows {
                let language_id = row.language_id.clone().expect("tagged");
                *by_language.entry(language_id).or_default() += 1;
            }
            by_language.retain(|_, count| *count > 0);
            expected.retain(|_, count| *count > 0);
            prop_assert_eq!(by_language, expected);
        }
    }

    // ==================== Browser Refresh Tests ====================

    #[test]
    fn test_refresh_root_collection() {
        let (store, _temp_dir) = create_test_store();
        add_language(&store, "Українська", "uk");

        let mut browser = RecordBrowser::new(BrowseSpec {
            parent_collection: collections::LANGUAGES.to_string(),
            sub_collection: None,
            columns: vec![Column::new("Назва", "name"), Column::new("Код", "code")],
        });
        browser.refresh(&store, None).expect("refresh");

        let rendered = browser.render_rows();
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].cells, vec!["Українська", "uk"]);
        assert!(rendered[0].language.is_none());
        assert_eq!(browser.column_labels(), vec!["Назва", "Код"]);
    }

    #[test]
    fn test_refresh_resolves_language_column() {
        let (store, _temp_dir) = create_test_store();
        let uk = add_language(&store, "Українська", "uk");
        add_color(&store, &uk, "Червоний");

        let mut browser = RecordBrowser::new(colors_spec());
        browser.refresh(&store, None).expect("refresh");

        let rendered = browser.render_rows();
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].language.as_deref(), Some("Українська"));
        assert_eq!(
            browser.column_labels(),
            vec!["Назва кольору".to_string(), "Мова".to_string()]
        );
    }

    #[test]
    fn test_unknown_language_renders_placeholder() {
        let (store, _temp_dir) = create_test_store();
        let uk = add_language(&store, "Українська", "uk");
        add_color(&store, &uk, "Червоний");

        let mut browser = RecordBrowser::new(colors_spec());
        browser.refresh(&store, None).expect("refresh");

        // Parent language deleted after the lookup rows were written: the
        // orphaned color keeps its tag but the name no longer resolves.
        store
            .delete(&CollectionPath::root(collections::LANGUAGES), &uk)
            .unwrap();
        browser.refresh(&store, None).expect("refresh");

        let rendered = browser.render_rows();
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].language.as_deref(), Some(MISSING_LABEL));
    }

    #[test]
    fn test_refresh_failure_keeps_stale_rows() {
        let temp_dir = TempDir::new().expect("temp dir");
        let db_path = temp_dir.path().join("test.db");
        let store = DocStore::open(db_path.to_str().unwrap()).expect("open");

        let uk = add_language(&store, "Українська", "uk");
        add_color(&store, &uk, "Червоний");

        let mut browser = RecordBrowser::new(colors_spec());
        browser.refresh(&store, None).expect("refresh");
        assert_eq!(browser.rows().len(), 1);

        // Break the store underneath the browser
        let raw = rusqlite::Connection::open(&db_path).expect("raw conn");
        raw.execute("DROP TABLE documents", []).expect("drop");

        let result = browser.refresh(&store, None);
        assert!(result.is_err());
        assert_eq!(browser.rows().len(), 1, "stale rows must survive a failed read");
    }

    // ==================== Delete Tests ====================

    #[test]
    fn test_delete_removes_exactly_one_row() {
        let (store, _temp_dir) = create_test_store();
        let uk = add_language(&store, "Українська", "uk");
        let doomed = add_color(&store, &uk, "Червоний");
        add_color(&store, &uk, "Синій");

        let mut browser = RecordBrowser::new(colors_spec());
        browser.refresh(&store, None).expect("refresh");
        assert_eq!(browser.rows().len(), 2);

        let removed = browser.delete(&store, &doomed, Some(&uk)).expect("delete");
        assert!(removed);

        // Dropped locally without a re-fetch
        assert_eq!(browser.rows().len(), 1);
        assert_eq!(browser.rows()[0].body["colorName"], "Синій");

        // And gone from the store for the next browse
        let rows = fan_out(&store, collections::COLORS, None).expect("fan out");
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_delete_root_collection_record() {
        let (store, _temp_dir) = create_test_store();
        let widgets = CollectionPath::root(collections::WIDGETS);
        let id = store.add(&widgets, &json!({"widgetName": "w"})).unwrap();

        let mut browser = RecordBrowser::new(BrowseSpec {
            parent_collection: collections::WIDGETS.to_string(),
            sub_collection: None,
            columns: vec![Column::new("Назва віджету", "widgetName")],
        });
        browser.refresh(&store, None).expect("refresh");

        assert!(browser.delete(&store, &id, None).expect("delete"));
        assert!(browser.rows().is_empty());
        assert!(store.get(&widgets, &id).unwrap().is_none());
    }

    // ==================== Rendering Tests ====================

    #[test]
    fn test_custom_renderer_applied() {
        let (store, _temp_dir) = create_test_store();
        let uk = add_language(&store, "Українська", "uk");
        store
            .add(
                &CollectionPath::language_sub(&uk, collections::IMAGES),
                &json!({"houseName": "Котедж", "imageUrls": ["a.webp", "b.webp"]}),
            )
            .unwrap();

        fn count_urls(value: &Value) -> String {
            format!("{} фото", value.as_array().map(|a| a.len()).unwrap_or(0))
        }

        let mut browser = RecordBrowser::new(BrowseSpec {
            parent_collection: collections::LANGUAGES.to_string(),
            sub_collection: Some(collections::IMAGES.to_string()),
            columns: vec![
                Column::new("Будинок", "houseName"),
                Column::with_renderer("Зображення", "imageUrls", count_urls),
            ],
        });
        browser.refresh(&store, None).expect("refresh");

        let rendered = browser.render_rows();
        assert_eq!(rendered[0].cells, vec!["Котедж", "2 фото"]);
    }

    #[test]
    fn test_missing_field_renders_empty() {
        let (store, _temp_dir) = create_test_store();
        let uk = add_language(&store, "Українська", "uk");
        add_color(&store, &uk, "Червоний");

        let mut browser = RecordBrowser::new(BrowseSpec {
            parent_collection: collections::LANGUAGES.to_string(),
            sub_collection: Some(collections::COLORS.to_string()),
            columns: vec![Column::new("Немає такого", "noSuchField")],
        });
        browser.refresh(&store, None).expect("refresh");

        assert_eq!(browser.render_rows()[0].cells, vec![String::new()]);
    }
}
