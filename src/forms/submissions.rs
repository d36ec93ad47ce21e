//! Submission lifecycle
//!
//! Every operation takes the acting principal explicitly. Reads, edits and
//! deletes of a single submission are restricted to its submitter; edits
//! additionally require the template's `allow_edit` flag.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use super::errors::{FormError, FormResult};
use super::model::{FormData, FormTemplate, Page, Principal};
use crate::export::{ExportFile, Exporter};
use crate::notify::{submission_receipt, Notifier};
use crate::schema::SubmissionValidator;
use crate::store::FormStore;

/// Accepts, lists, edits, deletes and exports submissions.
pub struct SubmissionManager<S: FormStore + ?Sized> {
    store: Arc<S>,
    notifier: Arc<dyn Notifier>,
    exporter: Arc<dyn Exporter>,
}

impl<S: FormStore + ?Sized> SubmissionManager<S> {
    pub fn new(store: Arc<S>, notifier: Arc<dyn Notifier>, exporter: Arc<dyn Exporter>) -> Self {
        Self {
            store,
            notifier,
            exporter,
        }
    }

    fn template(&self, id: Uuid) -> FormResult<FormTemplate> {
        self.store
            .find_template(id)?
            .ok_or_else(|| FormError::template_not_found(id))
    }

    fn owned_submission(&self, id: Uuid, principal: &Principal) -> FormResult<FormData> {
        let data = self
            .store
            .find_submission(id)?
            .ok_or_else(|| FormError::submission_not_found(id))?;
        if !data.is_owned_by(principal) {
            return Err(FormError::AccessDenied(
                "You can only access your own submissions".to_string(),
            ));
        }
        Ok(data)
    }

    /// Validates `candidate` against the template and stores it.
    ///
    /// With `notify` set, a receipt is sent to `principal` after the write.
    /// Notification failures are logged and do not affect the result.
    pub fn submit(
        &self,
        template_id: Uuid,
        candidate: &Value,
        principal: &Principal,
        notify: bool,
    ) -> FormResult<FormData> {
        let template = self.template(template_id)?;
        let values = SubmissionValidator::new(&template.schema).validate(candidate)?;

        let data = FormData {
            id: Uuid::new_v4(),
            template_id,
            submitted_by: principal.clone(),
            values,
            created_at: Utc::now(),
        };
        self.store.save_submission(&data)?;

        tracing::info!(
            template_id = %template_id,
            submission_id = %data.id,
            submitted_by = %principal,
            "submission accepted"
        );

        if notify {
            if let Err(e) = self.notifier.send(submission_receipt(&template, &data)) {
                tracing::warn!(
                    submission_id = %data.id,
                    to = %principal,
                    error = %e,
                    "failed to send submission receipt"
                );
            }
        }

        Ok(data)
    }

    /// Newest first, across all submitters.
    pub fn list_by_template(&self, template_id: Uuid, page: Page) -> FormResult<Vec<FormData>> {
        self.store.list_submissions(template_id, page)
    }

    /// Newest first, only those made by `principal`.
    pub fn list_mine_by_template(
        &self,
        template_id: Uuid,
        principal: &Principal,
    ) -> FormResult<Vec<FormData>> {
        self.store.list_submissions_by_principal(template_id, principal)
    }

    pub fn get_by_id(&self, id: Uuid, principal: &Principal) -> FormResult<FormData> {
        self.owned_submission(id, principal)
    }

    /// Replaces the values of a submission, keeping its id and timestamp.
    pub fn edit(&self, id: Uuid, candidate: &Value, principal: &Principal) -> FormResult<FormData> {
        let existing = self
            .store
            .find_submission(id)?
            .ok_or_else(|| FormError::submission_not_found(id))?;
        let template = self.template(existing.template_id)?;

        if !template.allow_edit {
            return Err(FormError::AccessDenied(
                "Editing is not allowed for this form".to_string(),
            ));
        }
        if !existing.is_owned_by(principal) {
            return Err(FormError::AccessDenied(
                "You can only edit your own submissions".to_string(),
            ));
        }

        let values = SubmissionValidator::new(&template.schema).validate(candidate)?;
        let updated = FormData { values, ..existing };
        // a concurrent delete wins; the edit must not bring the record back
        self.store.replace_submission(&updated)?;

        tracing::info!(submission_id = %id, edited_by = %principal, "submission edited");
        Ok(updated)
    }

    /// Deletes a submission owned by `principal`.
    ///
    /// Only ownership is checked; the template's `allow_delete` flag does not
    /// apply here.
    pub fn delete(&self, id: Uuid, principal: &Principal) -> FormResult<()> {
        self.owned_submission(id, principal)?;
        if !self.store.delete_submission(id)? {
            return Err(FormError::submission_not_found(id));
        }
        tracing::info!(submission_id = %id, deleted_by = %principal, "submission deleted");
        Ok(())
    }

    /// Renders every submission for a template through the exporter.
    pub fn export(&self, template_id: Uuid) -> FormResult<ExportFile> {
        let template = self.template(template_id)?;
        let submissions = self.store.all_submissions(template_id)?;
        let bytes = self.exporter.render(&template.schema, &submissions)?;

        let filename = format!(
            "form_responses_{}_{}.{}",
            template_id,
            Utc::now().format("%Y%m%d_%H%M%S"),
            self.exporter.extension()
        );
        tracing::info!(
            template_id = %template_id,
            rows = submissions.len(),
            %filename,
            "submissions exported"
        );

        Ok(ExportFile {
            filename,
            content_type: self.exporter.content_type(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::CsvExporter;
    use crate::forms::TemplateManager;
    use crate::notify::{MockNotifier, Notification, NotifyError, NotifyResult};
    use crate::store::{FormStore, InMemoryFormStore};
    use serde_json::json;

    struct FailingNotifier;

    impl Notifier for FailingNotifier {
        fn send(&self, _notification: Notification) -> NotifyResult<()> {
            Err(NotifyError::Unavailable("smtp down".to_string()))
        }
    }

    struct Fixture {
        templates: TemplateManager<InMemoryFormStore>,
        submissions: SubmissionManager<InMemoryFormStore>,
        notifier: Arc<MockNotifier>,
    }

    fn setup() -> Fixture {
        let store = Arc::new(InMemoryFormStore::new());
        let notifier = Arc::new(MockNotifier::new());
        Fixture {
            templates: TemplateManager::new(store.clone()),
            submissions: SubmissionManager::new(store, notifier.clone(), Arc::new(CsvExporter)),
            notifier,
        }
    }

    fn colour_template(fixture: &Fixture, allow_edit: bool) -> FormTemplate {
        fixture
            .templates
            .create(
                "Colours",
                &json!([{"label": "Colour", "type": "dropdown", "key": "colour",
                         "required": true, "options": ["red", "blue"]}]),
                allow_edit,
                false,
            )
            .unwrap()
    }

    fn answer(colour: &str) -> Value {
        json!([{"label": "Colour", "type": "dropdown", "key": "colour", "value": colour}])
    }

    #[test]
    fn test_submit_sends_receipt_when_asked() {
        let f = setup();
        let t = colour_template(&f, false);
        let ada = Principal::from("ada@example.com");

        f.submissions.submit(t.id, &answer("red"), &ada, false).unwrap();
        assert_eq!(f.notifier.sent_count(), 0);

        let data = f.submissions.submit(t.id, &answer("blue"), &ada, true).unwrap();
        assert_eq!(data.submitted_by, ada);
        assert_eq!(f.notifier.sent_count(), 1);
        assert_eq!(f.notifier.sent()[0].to, "ada@example.com");
    }

    #[test]
    fn test_notification_failure_keeps_submission() {
        let store = Arc::new(InMemoryFormStore::new());
        let templates = TemplateManager::new(store.clone());
        let submissions =
            SubmissionManager::new(store, Arc::new(FailingNotifier), Arc::new(CsvExporter));
        let t = templates
            .create(
                "T",
                &json!([{"label": "A", "type": "text", "key": "a"}]),
                false,
                false,
            )
            .unwrap();
        let ada = Principal::from("ada@example.com");

        let data = submissions
            .submit(t.id, &json!([{"label": "A", "type": "text", "key": "a", "value": "x"}]), &ada, true)
            .unwrap();
        assert_eq!(submissions.get_by_id(data.id, &ada).unwrap(), data);
    }

    #[test]
    fn test_submit_unknown_template() {
        let f = setup();
        let err = f
            .submissions
            .submit(Uuid::new_v4(), &answer("red"), &Principal::from("a@x.com"), false)
            .unwrap_err();
        assert!(matches!(err, FormError::NotFound { .. }));
    }

    #[test]
    fn test_edit_preserves_identity() {
        let f = setup();
        let t = colour_template(&f, true);
        let ada = Principal::from("ada@example.com");
        let original = f.submissions.submit(t.id, &answer("red"), &ada, false).unwrap();

        let edited = f.submissions.edit(original.id, &answer("blue"), &ada).unwrap();
        assert_eq!(edited.id, original.id);
        assert_eq!(edited.created_at, original.created_at);
        assert_eq!(edited.values.values()[0].value, json!("blue"));

        // invalid edits leave the stored values alone
        assert!(f.submissions.edit(original.id, &answer("green"), &ada).is_err());
        let stored = f.submissions.get_by_id(original.id, &ada).unwrap();
        assert_eq!(stored.values.values()[0].value, json!("blue"));
    }

    /// Store where a submission is deleted right after it is read, as if
    /// its owner deleted it while an edit was in flight.
    struct DeletedAfterRead(InMemoryFormStore);

    impl FormStore for DeletedAfterRead {
        fn save_template(&self, template: &FormTemplate) -> FormResult<()> {
            self.0.save_template(template)
        }
        fn find_template(&self, id: Uuid) -> FormResult<Option<FormTemplate>> {
            self.0.find_template(id)
        }
        fn delete_template(&self, id: Uuid) -> FormResult<bool> {
            self.0.delete_template(id)
        }
        fn list_templates(&self, page: Page, name_filter: Option<&str>) -> FormResult<Vec<FormTemplate>> {
            self.0.list_templates(page, name_filter)
        }
        fn save_submission(&self, data: &FormData) -> FormResult<()> {
            self.0.save_submission(data)
        }
        fn replace_submission(&self, data: &FormData) -> FormResult<()> {
            self.0.replace_submission(data)
        }
        fn find_submission(&self, id: Uuid) -> FormResult<Option<FormData>> {
            let found = self.0.find_submission(id)?;
            self.0.delete_submission(id)?;
            Ok(found)
        }
        fn delete_submission(&self, id: Uuid) -> FormResult<bool> {
            self.0.delete_submission(id)
        }
        fn list_submissions(&self, template_id: Uuid, page: Page) -> FormResult<Vec<FormData>> {
            self.0.list_submissions(template_id, page)
        }
        fn list_submissions_by_principal(
            &self,
            template_id: Uuid,
            principal: &Principal,
        ) -> FormResult<Vec<FormData>> {
            self.0.list_submissions_by_principal(template_id, principal)
        }
        fn all_submissions(&self, template_id: Uuid) -> FormResult<Vec<FormData>> {
            self.0.all_submissions(template_id)
        }
    }

    #[test]
    fn test_edit_does_not_restore_deleted_submission() {
        let store = Arc::new(DeletedAfterRead(InMemoryFormStore::new()));
        let templates = TemplateManager::new(store.clone());
        let submissions = SubmissionManager::new(
            store.clone(),
            Arc::new(MockNotifier::new()),
            Arc::new(CsvExporter),
        );
        let t = templates
            .create(
                "Colours",
                &json!([{"label": "Colour", "type": "dropdown", "key": "colour",
                         "required": true, "options": ["red", "blue"]}]),
                true,
                false,
            )
            .unwrap();
        let ada = Principal::from("ada@example.com");
        let data = submissions.submit(t.id, &answer("red"), &ada, false).unwrap();

        let err = submissions.edit(data.id, &answer("blue"), &ada).unwrap_err();
        assert!(matches!(err, FormError::NotFound { .. }));
        assert!(store.0.find_submission(data.id).unwrap().is_none());
        assert!(submissions.list_by_template(t.id, Page::default()).unwrap().is_empty());
    }

    #[test]
    fn test_edit_by_non_owner_denied() {
        let f = setup();
        let t = colour_template(&f, true);
        let data = f
            .submissions
            .submit(t.id, &answer("red"), &Principal::from("a@x.com"), false)
            .unwrap();

        assert!(matches!(
            f.submissions.edit(data.id, &answer("blue"), &Principal::from("b@x.com")),
            Err(FormError::AccessDenied(_))
        ));
    }

    #[test]
    fn test_delete_is_ownership_only() {
        let f = setup();
        // allow_delete is false on this template
        let t = colour_template(&f, false);
        let owner = Principal::from("a@x.com");
        let data = f.submissions.submit(t.id, &answer("red"), &owner, false).unwrap();

        assert!(matches!(
            f.submissions.delete(data.id, &Principal::from("b@x.com")),
            Err(FormError::AccessDenied(_))
        ));
        f.submissions.delete(data.id, &owner).unwrap();
        assert!(matches!(
            f.submissions.delete(data.id, &owner),
            Err(FormError::NotFound { .. })
        ));
    }

    #[test]
    fn test_list_mine_filters_by_principal() {
        let f = setup();
        let t = colour_template(&f, false);
        let a = Principal::from("a@x.com");
        let b = Principal::from("b@x.com");
        f.submissions.submit(t.id, &answer("red"), &a, false).unwrap();
        f.submissions.submit(t.id, &answer("blue"), &b, false).unwrap();

        assert_eq!(f.submissions.list_by_template(t.id, Page::default()).unwrap().len(), 2);
        let mine = f.submissions.list_mine_by_template(t.id, &a).unwrap();
        assert_eq!(mine.len(), 1);
        assert!(mine[0].is_owned_by(&a));
    }

    #[test]
    fn test_export_file() {
        let f = setup();
        let t = colour_template(&f, false);
        f.submissions
            .submit(t.id, &answer("red"), &Principal::from("a@x.com"), false)
            .unwrap();

        let file = f.submissions.export(t.id).unwrap();
        assert!(file.filename.starts_with(&format!("form_responses_{}_", t.id)));
        assert!(file.filename.ends_with(".csv"));
        assert_eq!(file.content_type, "text/csv");
        let text = String::from_utf8(file.bytes).unwrap();
        assert!(text.starts_with("Colour,Submitted At\n"));
        assert!(text.lines().nth(1).unwrap().starts_with("red,"));

        assert!(matches!(
            f.submissions.export(Uuid::new_v4()),
            Err(FormError::NotFound { .. })
        ));
    }
}
