//! Template lifecycle

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use super::errors::{FormError, FormResult};
use super::model::{FormTemplate, Page};
use crate::schema::SchemaValidator;
use crate::store::FormStore;

/// Creates, lists, fetches and deletes form templates.
pub struct TemplateManager<S: FormStore + ?Sized> {
    store: Arc<S>,
    validator: SchemaValidator,
}

impl<S: FormStore + ?Sized> TemplateManager<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            validator: SchemaValidator,
        }
    }

    /// Validates `schema` and persists a new template.
    pub fn create(
        &self,
        name: &str,
        schema: &Value,
        allow_edit: bool,
        allow_delete: bool,
    ) -> FormResult<FormTemplate> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FormError::InvalidRequest(
                "Form name must not be blank".to_string(),
            ));
        }

        let schema = self.validator.validate(schema)?;

        let template = FormTemplate {
            id: Uuid::new_v4(),
            name: name.to_string(),
            schema,
            allow_edit,
            allow_delete,
            created_at: Utc::now(),
        };
        self.store.save_template(&template)?;

        tracing::info!(
            template_id = %template.id,
            name = %template.name,
            fields = template.schema.len(),
            "template created"
        );
        Ok(template)
    }

    /// Newest first, optionally filtered by name (case-insensitive substring).
    pub fn list(&self, page: Page, name_filter: Option<&str>) -> FormResult<Vec<FormTemplate>> {
        let filter = name_filter.map(str::trim).filter(|f| !f.is_empty());
        self.store.list_templates(page, filter)
    }

    pub fn get_by_id(&self, id: Uuid) -> FormResult<FormTemplate> {
        self.store
            .find_template(id)?
            .ok_or_else(|| FormError::template_not_found(id))
    }

    /// Deletes the template and every submission made against it.
    pub fn delete_by_id(&self, id: Uuid) -> FormResult<()> {
        if !self.store.delete_template(id)? {
            return Err(FormError::template_not_found(id));
        }
        tracing::info!(template_id = %id, "template deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldType, ValidationErrorCode};
    use crate::store::InMemoryFormStore;
    use serde_json::json;

    fn setup() -> TemplateManager<InMemoryFormStore> {
        TemplateManager::new(Arc::new(InMemoryFormStore::new()))
    }

    fn schema() -> Value {
        json!([
            {"label": "Name", "type": "TEXT", "key": "name", "required": true},
            {"label": "Plan", "type": "dropdown", "key": "plan", "options": ["free", "pro"]}
        ])
    }

    #[test]
    fn test_create_and_get() {
        let manager = setup();
        let created = manager.create("  Signup ", &schema(), true, false).unwrap();

        assert_eq!(created.name, "Signup");
        assert_eq!(created.schema.fields()[0].field_type, FieldType::Text);
        assert_eq!(manager.get_by_id(created.id).unwrap(), created);
    }

    #[test]
    fn test_create_rejects_blank_name() {
        let manager = setup();
        assert!(matches!(
            manager.create("   ", &schema(), false, false),
            Err(FormError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_create_rejects_invalid_schema() {
        let manager = setup();
        let err = manager
            .create("Bad", &json!([{"label": "X", "type": "radio", "key": "x"}]), false, false)
            .unwrap_err();
        let validation = err.as_validation().unwrap();
        assert_eq!(validation.code(), ValidationErrorCode::UnsupportedType);
        assert!(manager.list(Page::default(), None).unwrap().is_empty());
    }

    #[test]
    fn test_list_filter_ignores_blank() {
        let manager = setup();
        manager.create("Customer survey", &schema(), false, false).unwrap();
        manager.create("Signup", &schema(), false, false).unwrap();

        assert_eq!(manager.list(Page::default(), Some("  ")).unwrap().len(), 2);
        assert_eq!(manager.list(Page::default(), Some("SURV")).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_unknown_is_not_found() {
        let manager = setup();
        let id = Uuid::new_v4();
        assert!(matches!(
            manager.delete_by_id(id),
            Err(FormError::NotFound { .. })
        ));
        assert!(matches!(manager.get_by_id(id), Err(FormError::NotFound { .. })));
    }
}
