//! # Form Store
//!
//! Persistence boundary for templates and their submissions.
//!
//! Both record kinds live behind a single lock per store, so a submission
//! write and a template delete can never interleave: saving a submission
//! re-checks its template under the same write lock that the cascading
//! template delete takes.

mod file;
mod memory;

pub use file::FileFormStore;
pub use memory::InMemoryFormStore;

use uuid::Uuid;

use crate::forms::{FormData, FormError, FormResult, FormTemplate, Page, Principal};

/// Store trait
///
/// Lookups report absence as `None`; errors are reserved for storage faults.
pub trait FormStore: Send + Sync {
    /// Insert or replace a template
    fn save_template(&self, template: &FormTemplate) -> FormResult<()>;

    /// Find a template by id
    fn find_template(&self, id: Uuid) -> FormResult<Option<FormTemplate>>;

    /// Delete a template and every submission it owns.
    ///
    /// Returns false if the template did not exist.
    fn delete_template(&self, id: Uuid) -> FormResult<bool>;

    /// Newest first, optionally filtered by a case-insensitive name substring
    fn list_templates(&self, page: Page, name_filter: Option<&str>) -> FormResult<Vec<FormTemplate>>;

    /// Insert or replace a submission.
    ///
    /// Fails with NotFound if the owning template no longer exists.
    fn save_submission(&self, data: &FormData) -> FormResult<()>;

    /// Overwrite an existing submission.
    ///
    /// Fails with NotFound if the submission is gone (deleted directly or by
    /// a template cascade); never inserts.
    fn replace_submission(&self, data: &FormData) -> FormResult<()>;

    /// Find a submission by id
    fn find_submission(&self, id: Uuid) -> FormResult<Option<FormData>>;

    /// Returns false if the submission did not exist
    fn delete_submission(&self, id: Uuid) -> FormResult<bool>;

    /// Newest first
    fn list_submissions(&self, template_id: Uuid, page: Page) -> FormResult<Vec<FormData>>;

    /// Newest first, only records submitted by `principal`
    fn list_submissions_by_principal(
        &self,
        template_id: Uuid,
        principal: &Principal,
    ) -> FormResult<Vec<FormData>>;

    /// Every submission for a template, oldest first
    fn all_submissions(&self, template_id: Uuid) -> FormResult<Vec<FormData>>;
}

/// Records shared by the store implementations, kept in insertion order.
#[derive(Debug, Default, Clone)]
pub(crate) struct StoreState {
    templates: Vec<FormTemplate>,
    submissions: Vec<FormData>,
}

impl StoreState {
    pub(crate) fn from_parts(templates: Vec<FormTemplate>, submissions: Vec<FormData>) -> Self {
        Self {
            templates,
            submissions,
        }
    }

    pub(crate) fn templates(&self) -> &[FormTemplate] {
        &self.templates
    }

    pub(crate) fn submissions(&self) -> &[FormData] {
        &self.submissions
    }

    fn save_template(&mut self, template: &FormTemplate) {
        match self.templates.iter_mut().find(|t| t.id == template.id) {
            Some(existing) => *existing = template.clone(),
            None => self.templates.push(template.clone()),
        }
    }

    fn find_template(&self, id: Uuid) -> Option<FormTemplate> {
        self.templates.iter().find(|t| t.id == id).cloned()
    }

    fn delete_template(&mut self, id: Uuid) -> bool {
        let before = self.templates.len();
        self.templates.retain(|t| t.id != id);
        if self.templates.len() == before {
            return false;
        }
        self.submissions.retain(|d| d.template_id != id);
        true
    }

    fn list_templates(&self, page: Page, name_filter: Option<&str>) -> Vec<FormTemplate> {
        let needle = name_filter.map(str::to_lowercase);
        let matching = self.templates.iter().filter(|t| match &needle {
            Some(n) => t.name.to_lowercase().contains(n.as_str()),
            None => true,
        });
        page.apply(newest_first(matching, |t| t.created_at).into_iter().cloned())
    }

    fn save_submission(&mut self, data: &FormData) -> FormResult<()> {
        if !self.templates.iter().any(|t| t.id == data.template_id) {
            return Err(FormError::template_not_found(data.template_id));
        }
        match self.submissions.iter_mut().find(|d| d.id == data.id) {
            Some(existing) => *existing = data.clone(),
            None => self.submissions.push(data.clone()),
        }
        Ok(())
    }

    fn replace_submission(&mut self, data: &FormData) -> FormResult<()> {
        let existing = self
            .submissions
            .iter_mut()
            .find(|d| d.id == data.id)
            .ok_or_else(|| FormError::submission_not_found(data.id))?;
        *existing = data.clone();
        Ok(())
    }

    fn find_submission(&self, id: Uuid) -> Option<FormData> {
        self.submissions.iter().find(|d| d.id == id).cloned()
    }

    fn delete_submission(&mut self, id: Uuid) -> bool {
        let before = self.submissions.len();
        self.submissions.retain(|d| d.id != id);
        self.submissions.len() != before
    }

    fn list_submissions(&self, template_id: Uuid, page: Page) -> Vec<FormData> {
        let matching = self.submissions.iter().filter(|d| d.template_id == template_id);
        page.apply(newest_first(matching, |d| d.created_at).into_iter().cloned())
    }

    fn list_submissions_by_principal(&self, template_id: Uuid, principal: &Principal) -> Vec<FormData> {
        let matching = self
            .submissions
            .iter()
            .filter(|d| d.template_id == template_id && d.is_owned_by(principal));
        newest_first(matching, |d| d.created_at)
            .into_iter()
            .cloned()
            .collect()
    }

    fn all_submissions(&self, template_id: Uuid) -> Vec<FormData> {
        self.submissions
            .iter()
            .filter(|d| d.template_id == template_id)
            .cloned()
            .collect()
    }
}

/// Orders records newest first; records with equal timestamps keep
/// reverse insertion order.
fn newest_first<'a, T, K, I>(items: I, created_at: impl Fn(&T) -> K) -> Vec<&'a T>
where
    I: DoubleEndedIterator<Item = &'a T>,
    K: Ord,
{
    let mut ordered: Vec<&T> = items.rev().collect();
    ordered.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    ordered
}
