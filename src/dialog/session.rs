// src/dialog/session.rs

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use super::format::{filter_by_score, format_for_display, merge_context, normalize_classes};
use crate::classifier::{ClassifierApi, ClassifierHandle, NaturalLanguageClassifier};
use crate::config::{NlcConfig, DEFAULT_DISPLAY_TEMPLATE, DEFAULT_FAKE_RESULT};
use crate::conversation::{ConversationApi, ConversationClient};
use crate::error::{NlcError, NlcResult};

/// Context key holding the text the dialog wants classified
pub const NLC_QUERY_KEY: &str = "nlc_string";

/// Context key the formatted classifier output is merged under
pub const NLC_RESULT_KEY: &str = "nlc_result";

/// One multi-turn dialog: the context threaded through Conversation calls plus
/// the classifier lookups the dialog can request.
pub struct DialogSession {
    classifier: Option<(Arc<dyn ClassifierApi>, ClassifierHandle)>,
    conversation: Arc<dyn ConversationApi>,
    workspace_id: Option<String>,
    score_filter: Option<f64>,
    display_template: String,
    fake_result: String,
    context: Map<String, Value>,
    last_results: Vec<Value>,
    last_response: Option<Value>,
}

impl DialogSession {
    pub fn new(conversation: Arc<dyn ConversationApi>) -> Self {
        Self {
            classifier: None,
            conversation,
            workspace_id: None,
            score_filter: None,
            display_template: DEFAULT_DISPLAY_TEMPLATE.to_string(),
            fake_result: DEFAULT_FAKE_RESULT.to_string(),
            context: Map::new(),
            last_results: Vec::new(),
            last_response: None,
        }
    }

    /// Wire real clients from configuration. Without a `classifier_id` the
    /// session answers queries with the configured fake result.
    pub fn from_config(config: &NlcConfig) -> NlcResult<Self> {
        let conversation = Arc::new(ConversationClient::new(config)?);
        let mut session = Self::new(conversation)
            .with_score_filter(config.score_filter)
            .with_display_template(config.display_template.clone())
            .with_fake_result(config.fake_result.clone());

        if let Some(workspace_id) = &config.workspace_id {
            session = session.with_workspace(workspace_id.clone());
        }
        if let Some(classifier_id) = &config.classifier_id {
            let classifier = Arc::new(NaturalLanguageClassifier::new(config)?);
            session = session.with_classifier(classifier, classifier_id);
        }

        Ok(session)
    }

    pub fn with_classifier(
        mut self,
        classifier: Arc<dyn ClassifierApi>,
        handle: impl Into<ClassifierHandle>,
    ) -> Self {
        self.classifier = Some((classifier, handle.into()));
        self
    }

    pub fn with_workspace(mut self, workspace_id: impl Into<String>) -> Self {
        self.workspace_id = Some(workspace_id.into());
        self
    }

    pub fn with_score_filter(mut self, score_filter: Option<f64>) -> Self {
        self.score_filter = score_filter;
        self
    }

    pub fn with_display_template(mut self, template: impl Into<String>) -> Self {
        self.display_template = template.into();
        self
    }

    pub fn with_fake_result(mut self, fake_result: impl Into<String>) -> Self {
        self.fake_result = fake_result.into();
        self
    }

    pub fn with_context(mut self, context: Map<String, Value>) -> Self {
        self.context = context;
        self
    }

    pub fn context(&self) -> &Map<String, Value> {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.context
    }

    /// Entries that survived filtering in the latest classification
    pub fn last_results(&self) -> &[Value] {
        &self.last_results
    }

    /// Latest raw Conversation reply
    pub fn last_response(&self) -> Option<&Value> {
        self.last_response.as_ref()
    }

    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    /// Classify `query`, normalized and score-filtered. Classifier errors are
    /// returned to the caller.
    pub async fn classify_query(&self, query: &str) -> NlcResult<Value> {
        let (classifier, handle) = self
            .classifier
            .as_ref()
            .ok_or_else(|| NlcError::config("no classifier configured"))?;

        let mut response = classifier.classify(handle, query).await?;
        normalize_classes(&mut response);
        filter_by_score(&mut response, self.score_filter);
        Ok(response)
    }

    /// Format a filtered classification for display and remember its entries.
    pub fn display_results(&mut self, response: &Value) -> NlcResult<String> {
        let entries = response
            .get("results")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let text = format_for_display(&entries, &self.display_template)?;
        self.last_results = entries;
        Ok(text)
    }

    /// Classify the context's `nlc_string` and merge `{nlc_result: text}` back
    /// into the context.
    ///
    /// A classifier failure becomes the result text so the dialog keeps going;
    /// a template that does not fit the results is returned as an error. The
    /// `Ok` value is always `false`: the dialog needs no user input before the
    /// next Conversation turn.
    pub async fn handle_query(&mut self) -> NlcResult<bool> {
        let query = self
            .context
            .get(NLC_QUERY_KEY)
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| {
                NlcError::invalid_argument(format!("context has no '{NLC_QUERY_KEY}' string"))
            })?;

        let text = if self.has_classifier() {
            match self.classify_query(&query).await {
                Ok(response) => self.display_results(&response)?,
                Err(e) => {
                    warn!("Classifier call failed for '{}': {}", query, e);
                    self.last_results.clear();
                    e.to_string()
                }
            }
        } else {
            debug!("No classifier configured, using fake result");
            self.last_results.clear();
            self.fake_result.clone()
        };

        let mut update = Map::new();
        update.insert(NLC_RESULT_KEY.to_string(), Value::String(text));
        merge_context(&mut self.context, update);

        debug!(
            "watson_nlc: {}\ncontext: {}",
            self.context[NLC_RESULT_KEY],
            serde_json::Value::Object(self.context.clone())
        );

        Ok(false)
    }

    /// Send `message` with the current context to the Conversation workspace
    /// and return the reply unmodified.
    pub async fn get_response(&mut self, message: &str) -> NlcResult<Value> {
        let workspace_id = self
            .workspace_id
            .as_deref()
            .ok_or_else(|| NlcError::config("workspace_id is not configured"))?;

        let response = self
            .conversation
            .message(workspace_id, &json!({ "text": message }), &self.context)
            .await?;

        self.last_response = Some(response.clone());
        Ok(response)
    }
}
