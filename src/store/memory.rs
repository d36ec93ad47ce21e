//! In-memory store, lost on restart

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

use super::{FormStore, StoreState};
use crate::forms::{FormData, FormError, FormResult, FormTemplate, Page, Principal};

/// In-memory form store (for development/testing)
#[derive(Debug, Default)]
pub struct InMemoryFormStore {
    state: RwLock<StoreState>,
}

impl InMemoryFormStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> FormResult<RwLockReadGuard<'_, StoreState>> {
        self.state
            .read()
            .map_err(|_| FormError::Storage("Lock poisoned".to_string()))
    }

    fn write(&self) -> FormResult<RwLockWriteGuard<'_, StoreState>> {
        self.state
            .write()
            .map_err(|_| FormError::Storage("Lock poisoned".to_string()))
    }
}

impl FormStore for InMemoryFormStore {
    fn save_template(&self, template: &FormTemplate) -> FormResult<()> {
        self.write()?.save_template(template);
        Ok(())
    }

    fn find_template(&self, id: Uuid) -> FormResult<Option<FormTemplate>> {
        Ok(self.read()?.find_template(id))
    }

    fn delete_template(&self, id: Uuid) -> FormResult<bool> {
        Ok(self.write()?.delete_template(id))
    }

    fn list_templates(&self, page: Page, name_filter: Option<&str>) -> FormResult<Vec<FormTemplate>> {
        Ok(self.read()?.list_templates(page, name_filter))
    }

    fn save_submission(&self, data: &FormData) -> FormResult<()> {
        self.write()?.save_submission(data)
    }

    fn replace_submission(&self, data: &FormData) -> FormResult<()> {
        self.write()?.replace_submission(data)
    }

    fn find_submission(&self, id: Uuid) -> FormResult<Option<FormData>> {
        Ok(self.read()?.find_submission(id))
    }

    fn delete_submission(&self, id: Uuid) -> FormResult<bool> {
        Ok(self.write()?.delete_submission(id))
    }

    fn list_submissions(&self, template_id: Uuid, page: Page) -> FormResult<Vec<FormData>> {
        Ok(self.read()?.list_submissions(template_id, page))
    }

    fn list_submissions_by_principal(
        &self,
        template_id: Uuid,
        principal: &Principal,
    ) -> FormResult<Vec<FormData>> {
        Ok(self.read()?.list_submissions_by_principal(template_id, principal))
    }

    fn all_submissions(&self, template_id: Uuid) -> FormResult<Vec<FormData>> {
        Ok(self.read()?.all_submissions(template_id))
    }
}
