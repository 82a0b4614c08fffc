//! Process configuration, read once at startup.
//!
//! Values come from environment variables with typed defaults; a few
//! `--flag` / `--flag=value` arguments override them. Unparseable numbers
//! fall back to the default rather than aborting startup.

use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_UPSTREAM_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_COMPLETION_MODEL: &str = "gpt-4o";
const DEFAULT_MAX_TOKENS: u32 = 4000;
const DEFAULT_TTS_MODEL: &str = "tts-1";
const DEFAULT_TTS_VOICE: &str = "alloy";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 60;
const DEFAULT_TTS_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TTS_CONCURRENCY: usize = 4;
const DEFAULT_AUDIO_DIR: &str = "/var/data";
const DEFAULT_LOOKUP_CACHE_CAPACITY: usize = 1024;
const DEFAULT_RATE_LIMIT_RPS: u32 = 5;
const DEFAULT_RATE_LIMIT_BURST: u32 = 10;
const DEFAULT_RATE_LIMIT_HEADER: &str = "X-Forwarded-For";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub upstream: UpstreamConfig,
    pub audio: AudioConfig,
    /// Zero disables the lookup log.
    pub lookup_cache_capacity: usize,
    pub disable_cache: bool,
    pub rate_limit_rps: u32,
    pub rate_limit_burst: u32,
    pub rate_limit_header: String,
}

/// Connection details shared by the completion and speech clients.
#[derive(Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub completion_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub tts_model: String,
    pub tts_voice: String,
    pub timeout: Duration,
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("completion_model", &self.completion_model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("tts_model", &self.tts_model)
            .field("tts_voice", &self.tts_voice)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AudioConfig {
    pub dir: PathBuf,
    /// Prefix for returned file URLs, without the trailing `/files/...`.
    pub public_base_url: String,
    pub concurrency: usize,
    pub timeout: Duration,
}

impl Config {
    /// Load from the process arguments and environment.
    pub fn from_env() -> Self {
        Self::load(env::args().skip(1), |key| env::var(key).ok())
    }

    /// Load from explicit arguments and a variable lookup.
    pub fn load<I, F>(args: I, var: F) -> Self
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let mut disable_cache = false;
        let mut cli_audio_dir: Option<PathBuf> = None;
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--no-cache" => disable_cache = true,
                "--audio-dir" => {
                    if let Some(path) = args.next() {
                        cli_audio_dir = Some(PathBuf::from(path));
                    }
                }
                _ => {
                    if let Some(path) = arg.strip_prefix("--audio-dir=") {
                        cli_audio_dir = Some(PathBuf::from(path));
                    }
                }
            }
        }

        let host = var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parsed(&var, "PORT").unwrap_or(DEFAULT_PORT);

        let upstream = UpstreamConfig {
            base_url: var("OPENAI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_UPSTREAM_BASE_URL.to_string()),
            api_key: var("OPENAI_API_KEY").filter(|key| !key.trim().is_empty()),
            completion_model: var("COMPLETION_MODEL")
                .unwrap_or_else(|| DEFAULT_COMPLETION_MODEL.to_string()),
            max_tokens: parsed(&var, "COMPLETION_MAX_TOKENS")
                .filter(|v| *v > 0)
                .unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: parsed(&var, "COMPLETION_TEMPERATURE").unwrap_or(0.0),
            tts_model: var("TTS_MODEL").unwrap_or_else(|| DEFAULT_TTS_MODEL.to_string()),
            tts_voice: var("TTS_VOICE").unwrap_or_else(|| DEFAULT_TTS_VOICE.to_string()),
            timeout: Duration::from_secs(
                parsed(&var, "UPSTREAM_TIMEOUT_SECS")
                    .filter(|v| *v > 0)
                    .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            ),
        };

        let audio = AudioConfig {
            dir: cli_audio_dir
                .or_else(|| var("AUDIO_DIR").map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_AUDIO_DIR)),
            public_base_url: var("PUBLIC_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| format!("http://localhost:{port}")),
            concurrency: parsed(&var, "TTS_CONCURRENCY")
                .filter(|v| *v > 0)
                .unwrap_or(DEFAULT_TTS_CONCURRENCY),
            timeout: Duration::from_secs(
                parsed(&var, "TTS_TIMEOUT_SECS")
                    .filter(|v| *v > 0)
                    .unwrap_or(DEFAULT_TTS_TIMEOUT_SECS),
            ),
        };

        let lookup_cache_capacity =
            parsed(&var, "LOOKUP_CACHE_CAPACITY").unwrap_or(DEFAULT_LOOKUP_CACHE_CAPACITY);
        let rate_limit_rps = parsed(&var, "RATE_LIMIT_RPS")
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_RATE_LIMIT_RPS);
        let rate_limit_burst = parsed(&var, "RATE_LIMIT_BURST")
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_RATE_LIMIT_BURST);
        let rate_limit_header = var("RATE_LIMIT_HEADER")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_RATE_LIMIT_HEADER.to_string());

        Config {
            host,
            port,
            upstream,
            audio,
            lookup_cache_capacity,
            disable_cache,
            rate_limit_rps,
            rate_limit_burst,
            rate_limit_header,
        }
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

fn parsed<T, F>(var: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    var(key).and_then(|raw| raw.trim().parse::<T>().ok())
}
