// src/lib.rs

pub mod classifier;
pub mod config;
pub mod conversation;
pub mod dialog;
pub mod error;

pub use classifier::{ClassifierApi, ClassifierHandle, NaturalLanguageClassifier, TrainingData};
pub use config::NlcConfig;
pub use conversation::{ConversationApi, ConversationClient};
pub use dialog::DialogSession;
pub use error::{NlcError, NlcResult};
