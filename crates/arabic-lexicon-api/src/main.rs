use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderName;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

use arabic_lexicon_api::rate_limit::RateLimiterLayer;
use arabic_lexicon_api::{
    AppState, AudioService, AudioStore, Config, LookupCache, OpenAiCompletion, OpenAiSpeech,
    router,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env();
    info!("binding to {}:{}", config.host, config.port);
    info!(
        "upstream {} (completion model {}, tts model {} voice {})",
        config.upstream.base_url,
        config.upstream.completion_model,
        config.upstream.tts_model,
        config.upstream.tts_voice
    );
    if config.upstream.api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; upstream calls are sent without credentials");
    }
    if config.disable_cache {
        info!("cache headers and lookup memory disabled");
    }
    info!(
        "rate limit: {} req/s (burst {}) keyed on {}",
        config.rate_limit_rps, config.rate_limit_burst, config.rate_limit_header
    );

    let http = reqwest::Client::builder()
        .timeout(config.upstream.timeout)
        .build()
        .context("building HTTP client")?;

    let store = AudioStore::new(&config.audio.dir, &config.audio.public_base_url);
    match store.ensure_dir().await {
        Ok(()) => info!("writing audio to {}", store.dir().display()),
        Err(err) => warn!(
            "audio directory {} is not writable yet: {err}",
            store.dir().display()
        ),
    }
    let audio = Arc::new(AudioService::new(
        Arc::new(OpenAiSpeech::new(http.clone(), &config.upstream)),
        store,
        config.audio.concurrency,
        config.audio.timeout,
    ));

    let lookups = (!config.disable_cache && config.lookup_cache_capacity > 0)
        .then(|| Arc::new(LookupCache::new(config.lookup_cache_capacity)));

    let state = AppState {
        completion: Arc::new(OpenAiCompletion::new(http, &config.upstream)),
        audio,
        lookups,
        disable_cache: config.disable_cache,
    };

    let client_header = HeaderName::from_bytes(config.rate_limit_header.as_bytes())
        .context("RATE_LIMIT_HEADER is not a valid header name")?;
    let rate_limiter = RateLimiterLayer::new(config.rate_limit_rps, config.rate_limit_burst)
        .with_client_header(client_header);
    let app = router(state)
        .layer(rate_limiter)
        .layer(TraceLayer::new_for_http());

    let addr = config.listen_addr().context("invalid listen address")?;
    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}
