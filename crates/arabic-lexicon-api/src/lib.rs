pub mod audio;
pub mod completion;
pub mod config;
pub mod handlers;
pub mod lookup;
pub mod prompts;
pub mod rate_limit;
pub mod speech;

pub use audio::{AudioService, AudioStore};
pub use completion::{CompletionClient, CompletionError, OpenAiCompletion};
pub use config::Config;
pub use handlers::{ApiError, AppState, router};
pub use lookup::LookupCache;
pub use speech::{OpenAiSpeech, SpeechError, SpeechSynthesizer};
