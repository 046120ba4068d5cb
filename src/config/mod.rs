// src/config/mod.rs
// Service endpoints, credentials and dialog settings.
// Precedence: CLI flags > environment (.env included) > ~/.watson-nlc/config.toml > defaults

mod file;

pub use file::{ConfigFile, config_path};

use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, warn};
use url::Url;

use crate::error::{NlcError, NlcResult};

pub const DEFAULT_NLC_URL: &str = "https://gateway.watsonplatform.net/natural-language-classifier/api";
pub const DEFAULT_CONVERSATION_URL: &str = "https://gateway.watsonplatform.net/conversation/api";
pub const DEFAULT_CONVERSATION_VERSION: &str = "2017-05-26";
pub const DEFAULT_DISPLAY_TEMPLATE: &str = "{index}) {name}\n{image}";
pub const DEFAULT_FAKE_RESULT: &str = "1) Sample result\nhttps://example.com/sample.png";

#[derive(Debug, Clone, PartialEq)]
pub struct NlcConfig {
    // ── Natural Language Classifier
    pub nlc_url: String,
    pub classifier_id: Option<String>,
    pub score_filter: Option<f64>,
    pub display_template: String,
    pub fake_result: String,

    // ── Conversation
    pub conversation_url: String,
    pub conversation_version: String,
    pub workspace_id: Option<String>,

    // ── Credentials (HTTP basic auth)
    pub username: Option<String>,
    pub password: Option<String>,

    // ── Transport / logging
    pub timeout_secs: u64,
    pub log_level: String,
}

impl Default for NlcConfig {
    fn default() -> Self {
        Self {
            nlc_url: DEFAULT_NLC_URL.to_string(),
            classifier_id: None,
            score_filter: None,
            display_template: DEFAULT_DISPLAY_TEMPLATE.to_string(),
            fake_result: DEFAULT_FAKE_RESULT.to_string(),
            conversation_url: DEFAULT_CONVERSATION_URL.to_string(),
            conversation_version: DEFAULT_CONVERSATION_VERSION.to_string(),
            workspace_id: None,
            username: None,
            password: None,
            timeout_secs: 60,
            log_level: "info".to_string(),
        }
    }
}

// Numeric values may carry trailing comments in .env files ("30 # seconds").
fn parse_env<T>(key: &str, raw: Option<String>) -> Option<T>
where
    T: FromStr,
{
    let val = raw?;
    let clean_val = val.split('#').next().unwrap_or("").trim();
    match clean_val.parse::<T>() {
        Ok(parsed) => {
            debug!("Config: {} = {} (from environment)", key, clean_val);
            Some(parsed)
        }
        Err(_) => {
            warn!("Config: {} = '{}' (parse failed, using default)", key, val);
            None
        }
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl NlcConfig {
    /// Load `.env`, the TOML config file and the process environment.
    pub fn from_env() -> Self {
        if dotenvy::dotenv().is_err() {
            debug!(".env file not found, using environment variables and defaults");
        }
        let file = ConfigFile::load(&config_path());
        Self::from_lookup(|key| std::env::var(key).ok(), file)
    }

    /// Build from an arbitrary variable lookup layered over a config file.
    pub fn from_lookup<F>(lookup: F, file: ConfigFile) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let string = |key: &str, file_val: Option<String>, default: String| {
            non_empty(lookup(key)).or(file_val).unwrap_or(default)
        };
        let optional = |key: &str, file_val: Option<String>| non_empty(lookup(key)).or(file_val);

        let score_filter = parse_env::<f64>(
            "WATSON_NLC_SCORE_FILTER",
            non_empty(lookup("WATSON_NLC_SCORE_FILTER")),
        )
        .or(file.score_filter);

        let timeout_secs = parse_env("WATSON_TIMEOUT_SECS", lookup("WATSON_TIMEOUT_SECS"))
            .or(file.timeout_secs)
            .unwrap_or(defaults.timeout_secs);

        // Templates coming from env/TOML spell newlines as "\n"
        let display_template = string(
            "WATSON_NLC_TEMPLATE",
            file.display_template,
            defaults.display_template,
        )
        .replace("\\n", "\n");

        Self {
            nlc_url: string("WATSON_NLC_URL", file.nlc_url, defaults.nlc_url),
            classifier_id: optional("WATSON_CLASSIFIER_ID", file.classifier_id),
            score_filter,
            display_template,
            fake_result: string("WATSON_NLC_FAKE_RESULT", file.fake_result, defaults.fake_result)
                .replace("\\n", "\n"),
            conversation_url: string(
                "WATSON_CONVERSATION_URL",
                file.conversation_url,
                defaults.conversation_url,
            ),
            conversation_version: string(
                "WATSON_CONVERSATION_VERSION",
                file.conversation_version,
                defaults.conversation_version,
            ),
            workspace_id: optional("WATSON_WORKSPACE_ID", file.workspace_id),
            username: optional("WATSON_USERNAME", file.username),
            password: optional("WATSON_PASSWORD", file.password),
            timeout_secs,
            log_level: string("WATSON_LOG_LEVEL", file.log_level, defaults.log_level),
        }
    }

    /// Reject settings that would only fail later, mid-request.
    pub fn validate(&self) -> NlcResult<()> {
        validate_base_url("nlc_url", &self.nlc_url)?;
        validate_base_url("conversation_url", &self.conversation_url)?;

        if let Some(threshold) = self.score_filter {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(NlcError::config(format!(
                    "score_filter must be between 0 and 1, got {threshold}"
                )));
            }
        }

        if self.timeout_secs == 0 {
            return Err(NlcError::config("timeout_secs must be greater than 0"));
        }

        if self.username.is_some() != self.password.is_some() {
            return Err(NlcError::config("username and password must be set together"));
        }

        Ok(())
    }

    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn require_workspace(&self) -> NlcResult<&str> {
        self.workspace_id
            .as_deref()
            .ok_or_else(|| NlcError::config("workspace_id is not configured"))
    }
}

fn validate_base_url(field: &str, raw: &str) -> NlcResult<()> {
    let parsed = Url::parse(raw).map_err(|e| NlcError::config(format!("{field} '{raw}': {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(NlcError::config(format!(
            "{field} must use http or https, got '{other}'"
        ))),
    }
}
