// src/classifier/client.rs

use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{ClassifierApi, ClassifierHandle, TrainingData, TrainingMetadata};
use crate::config::{NlcConfig, DEFAULT_NLC_URL};
use crate::error::{json_or_api_error, NlcResult};

/// REST client for the v1 Natural Language Classifier service
#[derive(Debug, Clone)]
pub struct NaturalLanguageClassifier {
    client: Client,
    base_url: String,
    credentials: Option<(String, String)>,
}

impl NaturalLanguageClassifier {
    pub const SERVICE_NAME: &'static str = "natural_language_classifier";

    pub fn new(config: &NlcConfig) -> NlcResult<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        debug!("Initialized {} client: url={}", Self::SERVICE_NAME, config.nlc_url);

        Ok(Self {
            client,
            base_url: config.nlc_url.trim_end_matches('/').to_string(),
            credentials: config
                .credentials()
                .map(|(user, pass)| (user.to_string(), pass.to_string())),
        })
    }

    /// Client against `base_url` without credentials (local gateways, tests)
    pub fn with_base_url(base_url: impl Into<String>) -> NlcResult<Self> {
        let config = NlcConfig {
            nlc_url: base_url.into(),
            ..NlcConfig::default()
        };
        Self::new(&config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let builder = self
            .client
            .request(method, url)
            .header(header::ACCEPT, "application/json");

        match &self.credentials {
            Some((user, pass)) => builder.basic_auth(user, Some(pass)),
            None => builder,
        }
    }

    fn classifier_path(handle: &ClassifierHandle) -> NlcResult<String> {
        let id = handle.resolve()?;
        Ok(format!("/v1/classifiers/{}", urlencoding::encode(id)))
    }

    /// Upload training data; the reply carries the new `classifier_id` with
    /// status "Training".
    pub async fn create(
        &self,
        training_data: TrainingData,
        name: Option<&str>,
        language: &str,
    ) -> NlcResult<Value> {
        let metadata = serde_json::to_string(&TrainingMetadata { language, name })?;
        let mime_type = training_data.mime_type();

        let form = reqwest::multipart::Form::new()
            .part(
                "training_metadata",
                reqwest::multipart::Part::text(metadata)
                    .file_name("training.json")
                    .mime_str("application/json")?,
            )
            .part(
                "training_data",
                reqwest::multipart::Part::bytes(training_data.bytes)
                    .file_name(training_data.file_name)
                    .mime_str(&mime_type)?,
            );

        let response = self
            .request(Method::POST, "/v1/classifiers")
            .multipart(form)
            .send()
            .await?;
        let created = json_or_api_error(response).await?;

        info!(
            "Created classifier {} (status: {})",
            created.get("classifier_id").and_then(serde_json::Value::as_str).unwrap_or("?"),
            created.get("status").and_then(serde_json::Value::as_str).unwrap_or("?"),
        );
        Ok(created)
    }

    pub async fn list(&self) -> NlcResult<Value> {
        let response = self.request(Method::GET, "/v1/classifiers").send().await?;
        json_or_api_error(response).await
    }

    pub async fn status(&self, handle: impl Into<ClassifierHandle>) -> NlcResult<Value> {
        let path = Self::classifier_path(&handle.into())?;
        let response = self.request(Method::GET, &path).send().await?;
        json_or_api_error(response).await
    }

    pub async fn classify(&self, handle: impl Into<ClassifierHandle>, text: &str) -> NlcResult<Value> {
        let path = format!("{}/classify", Self::classifier_path(&handle.into())?);
        let response = self
            .request(Method::POST, &path)
            .json(&json!({ "text": text }))
            .send()
            .await?;
        json_or_api_error(response).await
    }

    pub async fn remove(&self, handle: impl Into<ClassifierHandle>) -> NlcResult<Value> {
        let path = Self::classifier_path(&handle.into())?;
        let response = self.request(Method::DELETE, &path).send().await?;
        json_or_api_error(response).await
    }
}

impl Default for NaturalLanguageClassifier {
    fn default() -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_NLC_URL.to_string(),
            credentials: None,
        }
    }
}

#[async_trait]
impl ClassifierApi for NaturalLanguageClassifier {
    async fn classify(&self, handle: &ClassifierHandle, text: &str) -> NlcResult<Value> {
        NaturalLanguageClassifier::classify(self, handle.clone(), text).await
    }
}
