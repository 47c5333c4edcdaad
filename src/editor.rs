//! Scoped record editor pipeline.
//!
//! Every "add entity" form follows the same sequence: validate required
//! fields, upload any attached files to object storage, assemble exactly one
//! document from the fields plus the returned URLs, write it, then fire the
//! caller's refresh hook. Validation is presence/shape only - no cross-field
//! or uniqueness checks against existing records.
//!
//! Uploads within one submission run concurrently with each other but the
//! document write strictly waits for all of them, so readers never observe a
//! partially assembled document. A failure after some uploads completed
//! leaves those files orphaned in storage; nothing collects them.

use futures::future::try_join_all;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::storage::{ObjectStorage, StoragePrefix};
use crate::store::{CollectionPath, DocStore};

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap())
}

// ==================== Field specs ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text input
    Text,
    /// A choice from a pre-fetched option list (language, house, ...)
    Selection,
    /// Text that must look like an email address
    Email,
}

/// Declarative validation rule for one form field, with the message shown
/// when the rule fails.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub message: &'static str,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind, message: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            message,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind, message: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

// ==================== Draft ====================

/// One file attached to a submission, bound for a fixed storage prefix.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub prefix: StoragePrefix,
}

/// The collected form state of one submission.
#[derive(Debug, Clone, Default)]
pub struct Draft {
    pub fields: BTreeMap<String, Value>,
    pub attachments: Vec<Attachment>,
}

impl Draft {
    pub fn set_field(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_string(), value);
    }

    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    pub fn attach(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }
}

/// URLs returned by this submission's uploads, keyed by attachment field and
/// in attachment order.
#[derive(Debug, Clone, Default)]
pub struct UploadedFiles(Vec<(String, String)>);

impl UploadedFiles {
    pub fn first(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, url)| url.as_str())
    }

    pub fn all(&self, field: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(f, _)| f == field)
            .map(|(_, url)| url.as_str())
            .collect()
    }
}

// ==================== Submission ====================

/// Where the assembled document goes: a fresh id in a collection, or an
/// overwrite of a known document (widget edit only).
pub enum WriteTarget {
    Add(CollectionPath),
    Set(CollectionPath, String),
}

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),
    /// A dependent option lookup failed before assembly (selected parent
    /// record unreadable).
    #[error("Lookup failed: {0:#}")]
    Lookup(#[source] anyhow::Error),
    #[error("Upload failed: {0:#}")]
    Upload(#[source] anyhow::Error),
    #[error("Write failed: {0:#}")]
    Write(#[source] anyhow::Error),
}

/// Validate a draft against its field specs.
///
/// Checks presence for required fields and email shape for [`FieldKind::Email`];
/// an optional field is only shape-checked when non-empty.
pub fn validate(specs: &[FieldSpec], draft: &Draft) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    for spec in specs {
        let value = draft.field_str(spec.name).map(str::trim).unwrap_or("");

        if value.is_empty() {
            if spec.required {
                errors.push(FieldError {
                    field: spec.name.to_string(),
                    message: spec.message.to_string(),
                });
            }
            continue;
        }

        if spec.kind == FieldKind::Email && !email_regex().is_match(value) {
            errors.push(FieldError {
                field: spec.name.to_string(),
                message: "Некоректна адреса електронної пошти".to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Run one editor submission end to end.
///
/// # Arguments
/// * `specs` - validation rules; a failure here never issues a write
/// * `draft` - collected fields and attachments
/// * `assemble` - builds the single document from the draft and upload URLs
/// * `refresh` - fired after a successful write (table re-fetch signal)
///
/// On failure the caller still owns the draft, so the form can stay open
/// with its values intact.
pub async fn submit<F, R>(
    store: &DocStore,
    storage: &ObjectStorage,
    specs: &[FieldSpec],
    draft: &Draft,
    assemble: F,
    refresh: R,
) -> Result<String, EditorError>
where
    F: FnOnce(&Draft, &UploadedFiles) -> (WriteTarget, Value),
    R: FnOnce(),
{
    validate(specs, draft).map_err(EditorError::Validation)?;

    // All uploads in flight together; the document write waits for every one
    let uploads = draft.attachments.iter().map(|attachment| async {
        let url = storage
            .upload(
                attachment.prefix,
                &attachment.file_name,
                &attachment.content_type,
                attachment.bytes.clone(),
            )
            .await?;
        Ok::<_, anyhow::Error>((attachment.field.clone(), url))
    });
    let uploaded = UploadedFiles(try_join_all(uploads).await.map_err(EditorError::Upload)?);

    let (target, body) = assemble(draft, &uploaded);
    let id = match target {
        WriteTarget::Add(path) => store.add(&path, &body).map_err(EditorError::Write)?,
        WriteTarget::Set(path, id) => {
            store.set(&path, &id, &body).map_err(EditorError::Write)?;
            id
        }
    };

    refresh();
    Ok(id)
}
