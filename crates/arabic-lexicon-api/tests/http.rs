use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode, header};
use tempfile::TempDir;
use tower::util::ServiceExt;

use arabic_lexicon_api::handlers::{AppState, router};
use arabic_lexicon_api::{
    AudioService, AudioStore, CompletionClient, CompletionError, LookupCache, SpeechError,
    SpeechSynthesizer,
};

struct CannedCompletion {
    reply: Option<&'static str>,
    calls: AtomicUsize,
}

#[async_trait]
impl CompletionClient for CannedCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reply {
            Some(text) => Ok(text.to_string()),
            None => Err(CompletionError::Status {
                status: 503,
                body: "overloaded".into(),
            }),
        }
    }
}

struct FakeSpeech {
    working: bool,
}

#[async_trait]
impl SpeechSynthesizer for FakeSpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        if !self.working {
            return Err(SpeechError::Timeout);
        }
        Ok(format!("ID3 {text}").into_bytes())
    }
}

/// Earlier forms take longer, so synthesis finishes in reverse order.
struct ReverseLatencySpeech;

#[async_trait]
impl SpeechSynthesizer for ReverseLatencySpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let delay = match text {
            "أ" => 80,
            "ب" => 40,
            _ => 0,
        };
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok(format!("ID3 {text}").into_bytes())
    }
}

struct Harness {
    state: AppState,
    completion: Arc<CannedCompletion>,
    _audio_dir: TempDir,
}

fn harness(reply: Option<&'static str>, speech_works: bool, disable_cache: bool) -> Harness {
    let speech = Arc::new(FakeSpeech {
        working: speech_works,
    });
    harness_with(reply, speech, disable_cache)
}

fn harness_with(
    reply: Option<&'static str>,
    speech: Arc<dyn SpeechSynthesizer>,
    disable_cache: bool,
) -> Harness {
    let audio_dir = tempfile::tempdir().unwrap();
    let completion = Arc::new(CannedCompletion {
        reply,
        calls: AtomicUsize::new(0),
    });
    let audio = Arc::new(AudioService::new(
        speech,
        AudioStore::new(audio_dir.path(), "http://lexicon.test"),
        2,
        Duration::from_secs(1),
    ));
    let state = AppState {
        completion: completion.clone(),
        audio,
        lookups: (!disable_cache).then(|| Arc::new(LookupCache::new(16))),
        disable_cache,
    };
    Harness {
        state,
        completion,
        _audio_dir: audio_dir,
    }
}

fn encode(text: &str) -> String {
    text.bytes().map(|b| format!("%{b:02X}")).collect()
}

async fn get(state: &AppState, uri: &str) -> Response<Body> {
    router(state.clone())
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn healthz_ok() {
    let h = harness(None, true, false);
    let response = get(&h.state, "/healthz").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn frontend_serves_lookup_form() {
    let h = harness(None, true, false);
    let response = get(&h.state, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("/getWordForms"));
}

#[tokio::test]
async fn missing_or_blank_word_is_rejected() {
    let h = harness(Some("ضحك: P, m, 1, 3, a"), true, false);
    for uri in ["/getWordForms", "/getDialect?word=", "/getStems?word=%20%20"] {
        let response = get(&h.state, uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body = json_body(response).await;
        assert!(
            body["error"]
                .as_str()
                .unwrap_or_default()
                .contains("required")
        );
    }
    assert_eq!(h.completion.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn word_forms_are_normalized() {
    let reply = "Here are the forms:\n- ضَحِكَ: P, m, 1, 3, a\n- ضَحِكَتْ: P, f, 1, 3, a\n- ضَحِكَا: P, m";
    let h = harness(Some(reply), true, false);
    let response = get(&h.state, &format!("/getWordForms?word={}", encode("ضحك"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "public, max-age=300"
    );
    let body = json_body(response).await;
    let forms = body["wordForms"].as_array().unwrap();
    assert_eq!(forms.len(), 2);
    assert_eq!(forms[0]["formRepresentations"]["form"], "ضَحِكَ");
    assert_eq!(forms[1]["formRepresentations"]["gender"], "f");
    assert_eq!(forms[1]["formRepresentations"]["numberWordForm"], "1");
}

#[tokio::test]
async fn dialect_is_a_single_value() {
    let h = harness(Some("  فُصحى \n"), true, false);
    let response = get(&h.state, &format!("/getDialect?word={}", encode("ضرب"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, serde_json::json!({"dialect": "فُصحى"}));
}

#[tokio::test]
async fn examples_carry_served_audio() {
    let reply = "- قول: /qawl/, Standard Arabic, null, proverb, true, Unknown";
    let h = harness(Some(reply), true, false);
    let response = get(&h.state, &format!("/getExamples?word={}", encode("قول"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let example = &body["examples"][0];
    assert_eq!(example["exampleType"], "proverb");
    assert_eq!(example["showInResults"], true);

    let url = example["audio"].as_str().unwrap();
    let file_name = url.strip_prefix("http://lexicon.test/files/").unwrap();
    let file = get(&h.state, &format!("/files/{file_name}")).await;
    assert_eq!(file.status(), StatusCode::OK);
    assert_eq!(file.headers().get(header::CONTENT_TYPE).unwrap(), "audio/mpeg");
    let bytes = to_bytes(file.into_body(), 1024 * 1024).await.unwrap();
    assert_eq!(bytes.as_ref(), "ID3 قول".as_bytes());
}

#[tokio::test]
async fn records_keep_reply_order_and_their_own_audio() {
    let reply = "- أ: /a/, Standard Arabic, null, proverb, true, Unknown\n\
                 - ب: /b/, Standard Arabic, null, proverb, true, Unknown\n\
                 - ج: /j/, Standard Arabic, null, proverb, true, Unknown";
    let h = harness_with(Some(reply), Arc::new(ReverseLatencySpeech), false);
    let response = get(&h.state, &format!("/getExamples?word={}", encode("أبج"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let examples = body["examples"].as_array().unwrap();
    let forms: Vec<&str> = examples
        .iter()
        .map(|example| example["form"].as_str().unwrap())
        .collect();
    assert_eq!(forms, vec!["أ", "ب", "ج"]);

    for example in examples {
        let form = example["form"].as_str().unwrap();
        let url = example["audio"].as_str().unwrap();
        let file_name = url.strip_prefix("http://lexicon.test/files/").unwrap();
        let file = get(&h.state, &format!("/files/{file_name}")).await;
        assert_eq!(file.status(), StatusCode::OK);
        let bytes = to_bytes(file.into_body(), 1024 * 1024).await.unwrap();
        assert_eq!(bytes.as_ref(), format!("ID3 {form}").as_bytes(), "{form}");
    }
}

#[tokio::test]
async fn blank_reply_is_an_empty_result() {
    let h = harness(Some(""), true, false);
    let response = get(&h.state, &format!("/getDialect?word={}", encode("ضرب"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, serde_json::json!({"dialect": null}));

    let response = get(&h.state, &format!("/getWordForms?word={}", encode("ضرب"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, serde_json::json!({"wordForms": []}));
}

#[tokio::test]
async fn malformed_query_is_a_json_400() {
    let h = harness(Some("/dˤarb/"), true, false);
    let response = get(&h.state, "/getPhonetic?word=a&word=b").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("query string"));
    assert_eq!(h.completion.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_speech_yields_null_audio() {
    let reply = "- en: to hit, tuː hɪt, American English, null";
    let h = harness(Some(reply), false, false);
    let response = get(
        &h.state,
        &format!("/getSenseTranslation?word={}", encode("ضرب")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["translations"][0]["form"], "to hit");
    assert!(body["translations"][0]["audio"].is_null());
}

#[tokio::test]
async fn completion_failure_is_500() {
    let h = harness(None, true, false);
    let response = get(&h.state, &format!("/getContexts?word={}", encode("ضرب"))).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn repeated_lookup_is_served_from_memory() {
    let h = harness(Some("/dˤarb/"), true, false);
    let uri = format!("/getPhonetic?word={}", encode("ضرب"));
    let first = json_body(get(&h.state, &uri).await).await;
    let second = json_body(get(&h.state, &uri).await).await;
    assert_eq!(first, second);
    assert_eq!(first["phonetic"], "/dˤarb/");
    assert_eq!(h.completion.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn no_cache_mode_skips_headers_and_memory() {
    let h = harness(Some("/dˤarb/"), true, true);
    let uri = format!("/getPhonetic?word={}", encode("ضرب"));
    let response = get(&h.state, &uri).await;
    assert!(response.headers().get(header::CACHE_CONTROL).is_none());
    get(&h.state, &uri).await;
    assert_eq!(h.completion.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn audio_endpoint_returns_url_or_null() {
    let h = harness(None, true, false);
    let response = get(&h.state, &format!("/getAudio/{}", encode("لعب"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(
        body["audio_url"]
            .as_str()
            .unwrap()
            .starts_with("http://lexicon.test/files/")
    );

    let h = harness(None, false, false);
    let body = json_body(get(&h.state, &format!("/getAudio/{}", encode("لعب"))).await).await;
    assert!(body["audio_url"].is_null());
}

#[tokio::test]
async fn unknown_or_escaping_files_are_404() {
    let h = harness(None, true, false);
    for uri in ["/files/missing.mp3", "/files/..%2Fsecret.mp3", "/files/.."] {
        let response = get(&h.state, uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}
