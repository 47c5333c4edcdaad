//! Widget snapshot assembly.
//!
//! A widget stores point-in-time copies of the selected catalog entries, not
//! references: the embeddable surface shows whatever existed when the widget
//! was last saved, regardless of later catalog edits. Selected ids that no
//! longer resolve against the fetched catalog are dropped silently.

use anyhow::Result;
use serde::Serialize;

use crate::catalog::{decode_collection, Color, House, Stored, Trademark, Widget};
use crate::store::{collections, CollectionPath, DocStore};

/// Ids picked in the widget editor.
#[derive(Debug, Clone, Default)]
pub struct CatalogSelection {
    pub color_ids: Vec<String>,
    pub trademark_ids: Vec<String>,
    pub house_ids: Vec<String>,
}

/// The option lists of one language, fetched fresh whenever the editor's
/// language selection changes. Previously chosen dependent values do not
/// survive such a re-fetch.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageCatalog {
    pub language_id: String,
    pub colors: Vec<Stored<Color>>,
    pub trademarks: Vec<Stored<Trademark>>,
    pub houses: Vec<Stored<House>>,
}

/// Load the full catalog of one language. Malformed documents are rejected
/// at the decode boundary and simply absent from the option lists.
pub fn fetch_language_catalog(store: &DocStore, language_id: &str) -> Result<LanguageCatalog> {
    let colors_path = CollectionPath::language_sub(language_id, collections::COLORS);
    let trademarks_path = CollectionPath::language_sub(language_id, collections::TRADEMARKS);
    let houses_path = CollectionPath::language_sub(language_id, collections::HOUSES);

    Ok(LanguageCatalog {
        language_id: language_id.to_string(),
        colors: decode_collection(&colors_path, &store.list(&colors_path)?),
        trademarks: decode_collection(&trademarks_path, &store.list(&trademarks_path)?),
        houses: decode_collection(&houses_path, &store.list(&houses_path)?),
    })
}

/// Copy the selected catalog entries by value into a widget document.
pub fn assemble(
    widget_name: &str,
    admin_email: &str,
    selection: &CatalogSelection,
    catalog: &LanguageCatalog,
) -> Widget {
    Widget {
        widget_name: widget_name.to_string(),
        admin_email: admin_email.to_string(),
        language_id: catalog.language_id.clone(),
        color: pick(&selection.color_ids, &catalog.colors),
        trademark: pick(&selection.trademark_ids, &catalog.trademarks),
        house: pick(&selection.house_ids, &catalog.houses),
    }
}

fn pick<T: Clone>(ids: &[String], items: &[Stored<T>]) -> Vec<Stored<T>> {
    ids.iter()
        .filter_map(|id| items.iter().find(|item| &item.id == id).cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{decode_document, ColorTrademark};
    use serde_json::json;
    use tempfile::TempDir;

    // ==================== Helper Functions ====================

    fn create_test_store() -> (DocStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test_snapshot.db");
        let store = DocStore::open(db_path.to_str().unwrap()).expect("Failed to open store");
        (store, temp_dir)
    }

    fn seed_language(store: &DocStore) -> String {
        store
            .add(
                &CollectionPath::root(collections::LANGUAGES),
                &json!({"name": "Українська", "code": "uk"}),
            )
            .unwrap()
    }

    fn seed_catalog(store: &DocStore, language_id: &str) -> (String, String, String) {
        let color_id = store
            .add(
                &CollectionPath::language_sub(language_id, collections::COLORS),
                &json!({
                    "colorName": "Червоний",
                    "trademarks": [{
                        "trademarkId": "tm-x",
                        "trademarkName": "Fasiding",
                        "trademarkTextureUrl": "https://cdn.test/textures/t.webp"
                    }]
                }),
            )
            .unwrap();
        let trademark_id = store
            .add(
                &CollectionPath::language_sub(language_id, collections::TRADEMARKS),
                &json!({
                    "tmName": "Fasiding Standart",
                    "description": "Опис",
                    "colorTm": "#102030",
                    "logoUrl": null,
                    "nameUrl": null,
                    "desktopAdvantageUrl": null,
                    "mobileAdvantageUrl": null,
                    "pdfUrl": null,
                    "advantages": [],
                    "colors": []
                }),
            )
            .unwrap();
        let house_id = store
            .add(
                &CollectionPath::language_sub(language_id, collections::HOUSES),
                &json!({"name": "Котедж", "iconUrl": ""}),
            )
            .unwrap();
        (color_id, trademark_id, house_id)
    }

    // ==================== Catalog Fetch Tests ====================

    #[test]
    fn test_fetch_catalog_is_language_scoped() {
        let (store, _temp_dir) = create_test_store();
        let uk = seed_language(&store);
        let other = seed_language(&store);
        seed_catalog(&store, &uk);
        seed_catalog(&store, &other);

        let catalog = fetch_language_catalog(&store, &uk).expect("fetch");
        assert_eq!(catalog.language_id, uk);
        assert_eq!(catalog.colors.len(), 1);
        assert_eq!(catalog.trademarks.len(), 1);
        assert_eq!(catalog.houses.len(), 1);
    }

    #[test]
    fn test_fetch_catalog_skips_malformed_entries() {
        let (store, _temp_dir) = create_test_store();
        let uk = seed_language(&store);
        seed_catalog(&store, &uk);
        store
            .add(
                &CollectionPath::language_sub(&uk, collections::HOUSES),
                &json!({"name": 42}),
            )
            .unwrap();

        let catalog = fetch_language_catalog(&store, &uk).expect("fetch");
        assert_eq!(catalog.houses.len(), 1);
    }

    // ==================== Assembly Tests ====================

    #[test]
    fn test_assemble_copies_selected_entries() {
        let (store, _temp_dir) = create_test_store();
        let uk = seed_language(&store);
        let (color_id, trademark_id, house_id) = seed_catalog(&store, &uk);
        let catalog = fetch_language_catalog(&store, &uk).expect("fetch");

        let selection = CatalogSelection {
            color_ids: vec![color_id.clone()],
            trademark_ids: vec![trademark_id.clone()],
            house_ids: vec![house_id.clone()],
        };
        let widget = assemble("Головний", "admin@fasiding.com.ua", &selection, &catalog);

        assert_eq!(widget.language_id, uk);
        assert_eq!(widget.color.len(), 1);
        assert_eq!(widget.color[0].id, color_id);
        assert_eq!(widget.color[0].data.color_name, "Червоний");
        assert_eq!(
            widget.color[0].data.trademarks,
            vec![ColorTrademark {
                trademark_id: "tm-x".to_string(),
                trademark_name: "Fasiding".to_string(),
                trademark_texture_url: Some("https://cdn.test/textures/t.webp".to_string()),
            }]
        );
        assert_eq!(widget.trademark[0].id, trademark_id);
        assert_eq!(widget.house[0].id, house_id);
    }

    #[test]
    fn test_assemble_drops_unresolved_ids_silently() {
        let (store, _temp_dir) = create_test_store();
        let uk = seed_language(&store);
        let (color_id, _, _) = seed_catalog(&store, &uk);
        let catalog = fetch_language_catalog(&store, &uk).expect("fetch");

        let selection = CatalogSelection {
            color_ids: vec!["deleted-color".to_string(), color_id.clone()],
            trademark_ids: vec!["deleted-tm".to_string()],
            house_ids: vec![],
        };
        let widget = assemble("Головний", "admin@fasiding.com.ua", &selection, &catalog);

        assert_eq!(widget.color.len(), 1);
        assert_eq!(widget.color[0].id, color_id);
        assert!(widget.trademark.is_empty());
        assert!(widget.house.is_empty());
    }

    // ==================== Immutability Tests ====================

    #[test]
    fn test_saved_snapshot_survives_source_edits() {
        let (store, _temp_dir) = create_test_store();
        let uk = seed_language(&store);
        let (color_id, trademark_id, house_id) = seed_catalog(&store, &uk);
        let catalog = fetch_language_catalog(&store, &uk).expect("fetch");

        let selection = CatalogSelection {
            color_ids: vec![color_id.clone()],
            trademark_ids: vec![trademark_id.clone()],
            house_ids: vec![house_id],
        };
        let widget = assemble("Головний", "admin@fasiding.com.ua", &selection, &catalog);

        let widgets = CollectionPath::root(collections::WIDGETS);
        let widget_id = store
            .add(&widgets, &serde_json::to_value(&widget).unwrap())
            .unwrap();

        // Rename the source color after the widget was saved
        let colors = CollectionPath::language_sub(&uk, collections::COLORS);
        store
            .set(
                &colors,
                &color_id,
                &json!({"colorName": "Перейменований", "trademarks": []}),
            )
            .unwrap();

        let document = store.get(&widgets, &widget_id).unwrap().unwrap();
        let reread: crate::catalog::Stored<Widget> =
            decode_document(&widgets, &document).expect("decode");
        assert_eq!(reread.data.color[0].data.color_name, "Червоний");
    }
}
