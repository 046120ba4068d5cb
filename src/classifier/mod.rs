// src/classifier/mod.rs
//! Natural Language Classifier: classifier handles, training uploads and the
//! REST client for the `/v1/classifiers` endpoint family.

mod client;

pub use client::NaturalLanguageClassifier;

use std::path::Path;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{NlcError, NlcResult};

pub const DEFAULT_LANGUAGE: &str = "en";

/// Field holding the identifier inside classifier records
pub const CLASSIFIER_ID_FIELD: &str = "classifier_id";

/// A classifier reference: either a bare id or a record returned by the
/// service (e.g. an entry from `list` or the reply to `create`).
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifierHandle {
    Id(String),
    Record(Map<String, Value>),
}

impl ClassifierHandle {
    /// Normalize to the identifier string used in request paths.
    pub fn resolve(&self) -> NlcResult<&str> {
        let id = match self {
            Self::Id(id) => Some(id.as_str()),
            Self::Record(record) => record.get(CLASSIFIER_ID_FIELD).and_then(Value::as_str),
        };

        match id {
            Some(id) if !id.trim().is_empty() => Ok(id),
            _ => Err(NlcError::invalid_argument(format!(
                "expected a classifier id or an object with a '{CLASSIFIER_ID_FIELD}' string field"
            ))),
        }
    }
}

impl From<&str> for ClassifierHandle {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl From<String> for ClassifierHandle {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

impl From<&String> for ClassifierHandle {
    fn from(id: &String) -> Self {
        Self::Id(id.clone())
    }
}

impl From<Map<String, Value>> for ClassifierHandle {
    fn from(record: Map<String, Value>) -> Self {
        Self::Record(record)
    }
}

impl TryFrom<Value> for ClassifierHandle {
    type Error = NlcError;

    fn try_from(value: Value) -> NlcResult<Self> {
        match value {
            Value::String(id) => Ok(Self::Id(id)),
            Value::Object(record) => Ok(Self::Record(record)),
            other => Err(NlcError::invalid_argument(format!(
                "classifier handle must be a string or an object, got {other}"
            ))),
        }
    }
}

/// CSV training data uploaded as the `training_data` part of `create`.
#[derive(Debug, Clone)]
pub struct TrainingData {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl TrainingData {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn from_csv(content: impl Into<String>) -> Self {
        Self::new("training.csv", content.into().into_bytes())
    }

    pub async fn from_path(path: &Path) -> NlcResult<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("training.csv")
            .to_string();
        Ok(Self { file_name, bytes })
    }

    pub fn mime_type(&self) -> String {
        mime_guess::from_path(&self.file_name)
            .first_or_octet_stream()
            .to_string()
    }
}

/// JSON sent as the `training_metadata` part
#[derive(Debug, Clone, Serialize)]
pub struct TrainingMetadata<'a> {
    pub language: &'a str,
    pub name: Option<&'a str>,
}

/// The slice of the classifier API the dialog layer depends on.
#[async_trait]
pub trait ClassifierApi: Send + Sync {
    async fn classify(&self, handle: &ClassifierHandle, text: &str) -> NlcResult<Value>;
}
