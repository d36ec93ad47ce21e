//! Shared handler state

use std::sync::Arc;

use crate::auth::{AuthService, InMemoryUserRepository, JwtConfig, PasswordPolicy, UserRepository};
use crate::export::{CsvExporter, Exporter};
use crate::forms::{SubmissionManager, TemplateManager};
use crate::notify::{LogNotifier, Notifier};
use crate::store::{FormStore, InMemoryFormStore};

/// Services reachable from every route
pub struct AppState {
    pub auth: AuthService<dyn UserRepository>,
    pub templates: TemplateManager<dyn FormStore>,
    pub submissions: SubmissionManager<dyn FormStore>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn FormStore>,
        users: Arc<dyn UserRepository>,
        jwt_config: JwtConfig,
        notifier: Arc<dyn Notifier>,
        exporter: Arc<dyn Exporter>,
    ) -> Self {
        Self {
            auth: AuthService::new(users, jwt_config, PasswordPolicy::default()),
            templates: TemplateManager::new(store.clone()),
            submissions: SubmissionManager::new(store, notifier, exporter),
        }
    }

    /// Everything in memory, notifications only logged
    pub fn in_memory(jwt_config: JwtConfig) -> Self {
        Self::new(
            Arc::new(InMemoryFormStore::new()),
            Arc::new(InMemoryUserRepository::new()),
            jwt_config,
            Arc::new(LogNotifier::new()),
            Arc::new(CsvExporter::new()),
        )
    }
}
