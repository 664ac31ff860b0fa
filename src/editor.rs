use crate::catalog::StyleCatalog;
use crate::error::RestyleError;
use crate::types::StyleRecord;

/// Logic behind the catalog editor screen: validates user input, then
/// delegates to the catalog. Holds no state of its own so the editor and the
/// restyler can share one backing file without coordination.
pub struct StyleCatalogEditor {
    catalog: StyleCatalog,
}

impl StyleCatalogEditor {
    pub fn new(catalog: StyleCatalog) -> Self {
        Self { catalog }
    }

    pub fn list_names(&self) -> Vec<String> {
        self.catalog
            .load()
            .into_iter()
            .map(|record| record.name)
            .collect()
    }

    pub fn describe(&self, name: &str) -> Result<String, RestyleError> {
        self.catalog
            .find(name)
            .map(|record| record.description)
            .ok_or_else(|| RestyleError::NotFound(name.to_string()))
    }

    pub fn apply_add(&self, name: &str, text: &str) -> Result<StyleRecord, RestyleError> {
        self.require_input(name, text)?;
        self.catalog.add(name, text)
    }

    pub fn apply_edit(&self, name: &str, new_text: &str) -> Result<(), RestyleError> {
        self.require_input(name, new_text)?;
        self.catalog.update(name, new_text)
    }

    pub fn apply_remove(&self, name: &str) -> Result<(), RestyleError> {
        self.catalog.remove(name)
    }

    pub fn apply_rename(
        &self,
        old_name: &str,
        new_name: &str,
        new_text: &str,
    ) -> Result<(), RestyleError> {
        self.require_input(new_name, new_text)?;
        self.catalog.rename(old_name, new_name, new_text)
    }

    fn require_input(&self, name: &str, text: &str) -> Result<(), RestyleError> {
        if name.trim().is_empty() {
            return Err(RestyleError::Validation("style name is required".into()));
        }
        if text.trim().is_empty() {
            return Err(RestyleError::Validation(
                "style description is required".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog_path;
    use tempfile::TempDir;

    fn editor_in(dir: &TempDir) -> StyleCatalogEditor {
        StyleCatalogEditor::new(StyleCatalog::new(default_catalog_path(dir.path())))
    }

    #[test]
    fn lists_names_in_insertion_order() {
        let temp = TempDir::new().expect("temp dir");
        let editor = editor_in(&temp);
        editor.apply_add("Zebra", "stripes").expect("add");
        editor.apply_add("Antelope", "horns").expect("add");

        assert_eq!(editor.list_names(), vec!["Zebra", "Antelope"]);
    }

    #[test]
    fn describe_reports_missing_names() {
        let temp = TempDir::new().expect("temp dir");
        let editor = editor_in(&temp);

        let err = editor.describe("Ghost").unwrap_err();
        assert!(matches!(err, RestyleError::NotFound(name) if name == "Ghost"));
    }

    #[test]
    fn blank_input_is_rejected_before_touching_the_catalog() {
        let temp = TempDir::new().expect("temp dir");
        let editor = editor_in(&temp);

        assert!(matches!(
            editor.apply_add("", "text"),
            Err(RestyleError::Validation(_))
        ));
        assert!(matches!(
            editor.apply_edit("name", "  "),
            Err(RestyleError::Validation(_))
        ));
        assert!(editor.list_names().is_empty());
    }

    #[test]
    fn edit_and_remove_round_trip() {
        let temp = TempDir::new().expect("temp dir");
        let editor = editor_in(&temp);
        editor.apply_add("Cubist", "angular planes").expect("add");

        editor.apply_edit("Cubist", "fractured planes").expect("edit");
        assert_eq!(editor.describe("Cubist").expect("describe"), "fractured planes");

        editor.apply_remove("Cubist").expect("remove");
        assert!(editor.list_names().is_empty());
    }
}
