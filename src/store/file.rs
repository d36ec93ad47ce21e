//! File-backed store
//!
//! The whole store is one JSON snapshot at `<data_dir>/forms.json`. Every
//! mutation is applied to a copy of the state, written to a temporary file,
//! fsynced and renamed over the snapshot; the in-memory state is only
//! replaced once the rename succeeds.
//!
//! Schemas and submission values are stored in their canonical string form
//! and re-parsed when the snapshot is opened.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{FormStore, StoreState};
use crate::forms::{FormData, FormError, FormResult, FormTemplate, Page, Principal};
use crate::schema::{Schema, Submission};

/// Snapshot file name inside the data directory
pub const SNAPSHOT_FILE: &str = "forms.json";

#[derive(Debug, Serialize, Deserialize)]
struct TemplateRow {
    id: Uuid,
    name: String,
    schema: String,
    allow_edit: bool,
    allow_delete: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SubmissionRow {
    id: Uuid,
    template_id: Uuid,
    submitted_by: Principal,
    values: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    templates: Vec<TemplateRow>,
    submissions: Vec<SubmissionRow>,
}

impl Snapshot {
    fn capture(state: &StoreState) -> FormResult<Self> {
        let templates = state
            .templates()
            .iter()
            .map(|t| {
                Ok(TemplateRow {
                    id: t.id,
                    name: t.name.clone(),
                    schema: t.schema.encode()?,
                    allow_edit: t.allow_edit,
                    allow_delete: t.allow_delete,
                    created_at: t.created_at,
                })
            })
            .collect::<FormResult<Vec<_>>>()?;

        let submissions = state
            .submissions()
            .iter()
            .map(|d| {
                Ok(SubmissionRow {
                    id: d.id,
                    template_id: d.template_id,
                    submitted_by: d.submitted_by.clone(),
                    values: d.values.encode()?,
                    created_at: d.created_at,
                })
            })
            .collect::<FormResult<Vec<_>>>()?;

        Ok(Self {
            templates,
            submissions,
        })
    }

    fn restore(self) -> FormResult<StoreState> {
        let templates = self
            .templates
            .into_iter()
            .map(|row| {
                Ok(FormTemplate {
                    id: row.id,
                    name: row.name,
                    schema: Schema::decode(&row.schema)?,
                    allow_edit: row.allow_edit,
                    allow_delete: row.allow_delete,
                    created_at: row.created_at,
                })
            })
            .collect::<FormResult<Vec<_>>>()?;

        let submissions = self
            .submissions
            .into_iter()
            .map(|row| {
                Ok(FormData {
                    id: row.id,
                    template_id: row.template_id,
                    submitted_by: row.submitted_by,
                    values: Submission::decode(&row.values)?,
                    created_at: row.created_at,
                })
            })
            .collect::<FormResult<Vec<_>>>()?;

        Ok(StoreState::from_parts(templates, submissions))
    }
}

/// Form store persisted as a JSON snapshot
#[derive(Debug)]
pub struct FileFormStore {
    path: PathBuf,
    state: RwLock<StoreState>,
}

impl FileFormStore {
    /// Opens (or creates) the store in `data_dir`.
    pub fn open(data_dir: &Path) -> FormResult<Self> {
        fs::create_dir_all(data_dir).map_err(|e| {
            FormError::Storage(format!(
                "Failed to create data directory {}: {}",
                data_dir.display(),
                e
            ))
        })?;

        let path = data_dir.join(SNAPSHOT_FILE);
        let state = if path.exists() {
            load_snapshot(&path)?
        } else {
            StoreState::default()
        };

        tracing::debug!(
            path = %path.display(),
            templates = state.templates().len(),
            submissions = state.submissions().len(),
            "opened form store"
        );

        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    /// Path of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> FormResult<RwLockReadGuard<'_, StoreState>> {
        self.state
            .read()
            .map_err(|_| FormError::Storage("Lock poisoned".to_string()))
    }

    /// Applies `op` to a copy of the state, persists it, then publishes it.
    fn mutate<T>(&self, op: impl FnOnce(&mut StoreState) -> FormResult<T>) -> FormResult<T> {
        let mut guard = self
            .state
            .write()
            .map_err(|_| FormError::Storage("Lock poisoned".to_string()))?;

        let mut next = guard.clone();
        let out = op(&mut next)?;
        write_snapshot(&self.path, &Snapshot::capture(&next)?)?;
        *guard = next;
        Ok(out)
    }
}

fn load_snapshot(path: &Path) -> FormResult<StoreState> {
    let content = fs::read_to_string(path).map_err(|e| {
        FormError::Storage(format!("Failed to read snapshot {}: {}", path.display(), e))
    })?;
    let snapshot: Snapshot = serde_json::from_str(&content).map_err(|e| {
        FormError::Serialization(format!("Corrupt snapshot {}: {}", path.display(), e))
    })?;
    snapshot.restore()
}

fn write_snapshot(path: &Path, snapshot: &Snapshot) -> FormResult<()> {
    let json = serde_json::to_vec_pretty(snapshot)
        .map_err(|e| FormError::Serialization(e.to_string()))?;

    let tmp = path.with_extension("json.tmp");
    let io_err = |what: &str, e: std::io::Error| {
        FormError::Storage(format!("{} {}: {}", what, tmp.display(), e))
    };

    let mut file = File::create(&tmp).map_err(|e| io_err("Failed to create", e))?;
    file.write_all(&json).map_err(|e| io_err("Failed to write", e))?;
    file.sync_all().map_err(|e| io_err("Failed to fsync", e))?;
    drop(file);

    fs::rename(&tmp, path).map_err(|e| {
        FormError::Storage(format!("Failed to replace snapshot {}: {}", path.display(), e))
    })?;

    // fsync the directory so the rename survives a crash
    if let Some(dir) = path.parent() {
        if let Ok(handle) = OpenOptions::new().read(true).open(dir) {
            let _ = handle.sync_all();
        }
    }
    Ok(())
}

impl FormStore for FileFormStore {
    fn save_template(&self, template: &FormTemplate) -> FormResult<()> {
        self.mutate(|state| {
            state.save_template(template);
            Ok(())
        })
    }

    fn find_template(&self, id: Uuid) -> FormResult<Option<FormTemplate>> {
        Ok(self.read()?.find_template(id))
    }

    fn delete_template(&self, id: Uuid) -> FormResult<bool> {
        if self.read()?.find_template(id).is_none() {
            return Ok(false);
        }
        self.mutate(|state| Ok(state.delete_template(id)))
    }

    fn list_templates(&self, page: Page, name_filter: Option<&str>) -> FormResult<Vec<FormTemplate>> {
        Ok(self.read()?.list_templates(page, name_filter))
    }

    fn save_submission(&self, data: &FormData) -> FormResult<()> {
        self.mutate(|state| state.save_submission(data))
    }

    fn replace_submission(&self, data: &FormData) -> FormResult<()> {
        self.mutate(|state| state.replace_submission(data))
    }

    fn find_submission(&self, id: Uuid) -> FormResult<Option<FormData>> {
        Ok(self.read()?.find_submission(id))
    }

    fn delete_submission(&self, id: Uuid) -> FormResult<bool> {
        if self.read()?.find_submission(id).is_none() {
            return Ok(false);
        }
        self.mutate(|state| Ok(state.delete_submission(id)))
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
