//! watson-nlc - command line front end for the Natural Language Classifier
//! and Conversation services.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use watson_nlc::classifier::DEFAULT_LANGUAGE;
use watson_nlc::dialog::{NLC_QUERY_KEY, NLC_RESULT_KEY};
use watson_nlc::{DialogSession, NaturalLanguageClassifier, NlcConfig, TrainingData};

#[derive(Parser)]
#[command(name = "watson-nlc")]
#[command(about = "Manage Watson NLC classifiers and relay Conversation messages")]
struct Args {
    /// Classifier service base URL
    #[arg(long, global = true)]
    nlc_url: Option<String>,

    /// Conversation service base URL
    #[arg(long, global = true)]
    conversation_url: Option<String>,

    /// Service username (HTTP basic auth)
    #[arg(long, global = true)]
    username: Option<String>,

    /// Service password (HTTP basic auth)
    #[arg(long, global = true)]
    password: Option<String>,

    /// Conversation workspace
    #[arg(long, global = true)]
    workspace_id: Option<String>,

    /// Classifier used by `query`
    #[arg(long, global = true)]
    classifier_id: Option<String>,

    /// Hide results whose score is not above this value
    #[arg(long, global = true)]
    score_filter: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train a new classifier from a CSV file
    Create {
        training_data: PathBuf,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value = DEFAULT_LANGUAGE)]
        language: String,
    },
    /// List classifiers
    List,
    /// Show a classifier's training status
    Status { classifier_id: String },
    /// Classify text
    Classify { classifier_id: String, text: String },
    /// Delete a classifier
    Remove { classifier_id: String },
    /// Run a dialog classifier query and print the display text
    Query { text: String },
    /// Send a message to the Conversation workspace
    Chat { message: String },
}

impl Args {
    // CLI flags beat env and config file
    fn apply(&self, config: &mut NlcConfig) {
        if let Some(url) = &self.nlc_url {
            config.nlc_url = url.clone();
        }
        if let Some(url) = &self.conversation_url {
            config.conversation_url = url.clone();
        }
        if self.username.is_some() {
            config.username = self.username.clone();
        }
        if self.password.is_some() {
            config.password = self.password.clone();
        }
        if self.workspace_id.is_some() {
            config.workspace_id = self.workspace_id.clone();
        }
        if self.classifier_id.is_some() {
            config.classifier_id = self.classifier_id.clone();
        }
        if self.score_filter.is_some() {
            config.score_filter = self.score_filter;
        }
    }
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = NlcConfig::from_env();
    args.apply(&mut config);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    config.validate().context("invalid configuration")?;

    match args.command {
        Command::Create { training_data, name, language } => {
            let client = NaturalLanguageClassifier::new(&config)?;
            let data = TrainingData::from_path(&training_data)
                .await
                .with_context(|| format!("failed to read {}", training_data.display()))?;
            info!("Uploading {} ({} bytes)", data.file_name, data.bytes.len());
            print_json(&client.create(data, name.as_deref(), &language).await?)?;
        }
        Command::List => {
            let client = NaturalLanguageClassifier::new(&config)?;
            print_json(&client.list().await?)?;
        }
        Command::Status { classifier_id } => {
            let client = NaturalLanguageClassifier::new(&config)?;
            print_json(&client.status(classifier_id).await?)?;
        }
        Command::Classify { classifier_id, text } => {
            let client = NaturalLanguageClassifier::new(&config)?;
            print_json(&client.classify(classifier_id, &text).await?)?;
        }
        Command::Remove { classifier_id } => {
            let client = NaturalLanguageClassifier::new(&config)?;
            print_json(&client.remove(classifier_id).await?)?;
        }
        Command::Query { text } => {
            let mut session = DialogSession::from_config(&config)?;
            session
                .context_mut()
                .insert(NLC_QUERY_KEY.to_string(), Value::String(text));
            session.handle_query().await.context("query formatting failed")?;
            let result = session.context()[NLC_RESULT_KEY].as_str().unwrap_or_default();
            println!("{result}");
        }
        Command::Chat { message } => {
            let mut session = DialogSession::from_config(&config)?;
            print_json(&session.get_response(&message).await?)?;
        }
    }

    Ok(())
}
