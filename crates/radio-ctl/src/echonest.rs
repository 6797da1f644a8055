//! Echo Nest dynamic playlist client.

use async_trait::async_trait;
use radio_proto::config::EchoNestConfig;
use radio_proto::echonest::{self, Params, RadioKind, Track};
use radio_proto::error::{EchoNestError, Result};
use std::time::Duration;
use tracing::debug;

use crate::retry::Backoff;

/// Operations the radio needs from a recommendation service.
#[async_trait]
pub trait RecommendationService: Send + Sync {
    async fn create_session(&self, kind: RadioKind, seed: &str) -> Result<String>;
    /// `Ok(None)` when the service had no song to offer.
    async fn next_track(&self, session_id: &str) -> Result<Option<Track>>;
    async fn submit_skip(&self, session_id: &str, song_id: &str) -> Result<()>;
    async fn submit_rating(&self, session_id: &str, song_id: &str, rating: &str) -> Result<()>;
}

pub struct EchoNestClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    backoff: Backoff,
}

impl EchoNestClient {
    pub fn new(config: &EchoNestConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            backoff: Backoff::new(
                config.retry_attempts,
                config.retry_base_ms,
                config.retry_max_ms,
            ),
        })
    }

    async fn get(&self, endpoint: &str, params: &Params) -> Result<String> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("echonest: GET {} {:?}", endpoint, params);
        let response = self
            .http
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("format", "json")])
            .query(params)
            .send()
            .await?;
        debug!("echonest: {} -> {}", endpoint, response.status());
        let body = response.error_for_status()?.text().await?;
        Ok(body)
    }

    async fn get_with_retry(&self, endpoint: &'static str, params: Params) -> Result<String> {
        let params = &params;
        self.backoff
            .run(endpoint, EchoNestError::is_transient, move || async move {
                let body = self.get(endpoint, params).await?;
                // Surface API status errors here so rate limiting is retried.
                echonest::decode_ack(&body)?;
                Ok::<_, EchoNestError>(body)
            })
            .await
    }
}

#[async_trait]
impl RecommendationService for EchoNestClient {
    async fn create_session(&self, kind: RadioKind, seed: &str) -> Result<String> {
        let body = self
            .get(echonest::CREATE_ENDPOINT, &echonest::create_params(kind, seed))
            .await?;
        echonest::decode_session_id(&body)
    }

    async fn next_track(&self, session_id: &str) -> Result<Option<Track>> {
        let body = self
            .get_with_retry(echonest::NEXT_ENDPOINT, echonest::next_params(session_id))
            .await?;
        echonest::decode_next_track(&body)
    }

    async fn submit_skip(&self, session_id: &str, song_id: &str) -> Result<()> {
        self.get_with_retry(
            echonest::FEEDBACK_ENDPOINT,
            echonest::skip_params(session_id, song_id),
        )
        .await
        .map(|_| ())
    }

    async fn submit_rating(&self, session_id: &str, song_id: &str, rating: &str) -> Result<()> {
        self.get_with_retry(
            echonest::FEEDBACK_ENDPOINT,
            echonest::rate_params(session_id, song_id, rating),
        )
        .await
        .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Query, State};
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    type Pairs = Vec<(String, String)>;

    /// Local stand-in for the Echo Nest API.  `next` answers with a gateway
    /// error page `unavailable` times, then with a rate limit error
    /// `rate_limited` times, before returning a song.
    #[derive(Clone, Default)]
    struct Stub {
        requests: Arc<Mutex<Vec<(&'static str, Pairs)>>>,
        next_calls: Arc<AtomicUsize>,
        unavailable: usize,
        rate_limited: usize,
    }

    impl Stub {
        fn record(&self, endpoint: &'static str, q: Pairs) {
            self.requests.lock().unwrap().push((endpoint, q));
        }

        fn requests(&self, endpoint: &str) -> Vec<Pairs> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .filter(|(e, _)| *e == endpoint)
                .map(|(_, q)| q.clone())
                .collect()
        }
    }

    fn ok(body: Value) -> Json<Value> {
        let mut response = json!({ "status": { "code": 0, "message": "Success" } });
        if let (Some(r), Some(b)) = (response.as_object_mut(), body.as_object()) {
            r.extend(b.clone());
        }
        Json(json!({ "response": response }))
    }

    async fn create(State(stub): State<Stub>, Query(q): Query<Pairs>) -> Json<Value> {
        let has_seed = q.iter().any(|(k, _)| k == "artist" || k == "genre");
        stub.record("create", q);
        if has_seed {
            ok(json!({ "session_id": "sess-42" }))
        } else {
            Json(json!({ "response": { "status": { "code": 4, "message": "Missing parameter" } } }))
        }
    }

    async fn next(State(stub): State<Stub>, Query(q): Query<Pairs>) -> Response {
        stub.record("next", q);
        let n = stub.next_calls.fetch_add(1, Ordering::SeqCst);
        if n < stub.unavailable {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                "<html>Service Unavailable</html>",
            )
                .into_response();
        }
        if n < stub.unavailable + stub.rate_limited {
            return Json(json!({ "response": { "status": { "code": 3, "message": "Rate limit" } } }))
                .into_response();
        }
        ok(json!({ "songs": [{
            "id": "SOKARMA",
            "title": "Karma Police",
            "artist_name": "Radiohead",
            "tracks": [{ "catalog": "spotify", "foreign_id": "spotify:track:karma" }]
        }] }))
        .into_response()
    }

    async fn feedback(State(stub): State<Stub>, Query(q): Query<Pairs>) -> Json<Value> {
        stub.record("feedback", q);
        ok(json!({}))
    }

    async fn serve(stub: Stub) -> String {
        let app = Router::new()
            .route("/api/v4/playlist/dynamic/create", get(create))
            .route("/api/v4/playlist/dynamic/next", get(next))
            .route("/api/v4/playlist/dynamic/feedback", get(feedback))
            .with_state(stub);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{}/api/v4/", addr)
    }

    fn client(base_url: String, retry_attempts: u32) -> EchoNestClient {
        EchoNestClient::new(&EchoNestConfig {
            api_key: "TESTKEY".into(),
            base_url,
            timeout_secs: 5,
            retry_attempts,
            retry_base_ms: 1,
            retry_max_ms: 5,
        })
        .unwrap()
    }

    fn value<'a>(q: &'a Pairs, key: &str) -> Vec<&'a str> {
        q.iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[tokio::test]
    async fn test_create_session_sends_seed_and_buckets() {
        let stub = Stub::default();
        let client = client(serve(stub.clone()).await, 1);

        let session = client
            .create_session(RadioKind::Genre, "dream pop")
            .await
            .unwrap();
        assert_eq!(session, "sess-42");

        let reqs = stub.requests("create");
        assert_eq!(reqs.len(), 1);
        let q = &reqs[0];
        assert_eq!(value(q, "api_key"), vec!["TESTKEY"]);
        assert_eq!(value(q, "format"), vec!["json"]);
        assert_eq!(value(q, "genre"), vec!["dream pop"]);
        assert_eq!(value(q, "bucket"), vec!["id:spotify", "tracks"]);
        assert_eq!(value(q, "type"), vec!["genre-radio"]);
    }

    #[tokio::test]
    async fn test_next_track_retries_rate_limit() {
        let stub = Stub {
            rate_limited: 2,
            ..Stub::default()
        };
        let client = client(serve(stub.clone()).await, 4);

        let track = client.next_track("sess-42").await.unwrap().unwrap();
        assert_eq!(track.id, "SOKARMA");
        assert_eq!(track.local_id(), Some("spotify:track:karma"));
        assert_eq!(stub.next_calls.load(Ordering::SeqCst), 3);
        assert_eq!(value(&stub.requests("next")[0], "session_id"), vec!["sess-42"]);
    }

    #[tokio::test]
    async fn test_next_track_gives_up() {
        let stub = Stub {
            rate_limited: 10,
            ..Stub::default()
        };
        let client = client(serve(stub.clone()).await, 2);

        match client.next_track("sess-42").await {
            Err(EchoNestError::Api { code: 3, .. }) => {}
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(stub.next_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_next_track_retries_server_error() {
        let stub = Stub {
            unavailable: 2,
            ..Stub::default()
        };
        let client = client(serve(stub.clone()).await, 4);

        let track = client.next_track("sess-42").await.unwrap().unwrap();
        assert_eq!(track.id, "SOKARMA");
        assert_eq!(stub.next_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_persistent_server_error_is_http_error() {
        let stub = Stub {
            unavailable: 10,
            ..Stub::default()
        };
        let client = client(serve(stub.clone()).await, 4);

        match client.next_track("sess-42").await {
            Err(EchoNestError::Http(e)) => {
                assert_eq!(e.status(), Some(reqwest::StatusCode::SERVICE_UNAVAILABLE));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(stub.next_calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_feedback_params() {
        let stub = Stub::default();
        let client = client(serve(stub.clone()).await, 1);

        client.submit_skip("sess-42", "SOA").await.unwrap();
        client.submit_rating("sess-42", "SOB", "7").await.unwrap();

        let reqs = stub.requests("feedback");
        assert_eq!(reqs.len(), 2);
        assert_eq!(value(&reqs[0], "skip_song"), vec!["SOA"]);
        assert!(value(&reqs[0], "rate_song").is_empty());
        assert_eq!(value(&reqs[1], "rate_song"), vec!["SOB^7"]);
        assert_eq!(value(&reqs[1], "session_id"), vec!["sess-42"]);
    }

    #[tokio::test]
    async fn test_unreachable_service_is_http_error() {
        let client = client("http://127.0.0.1:9/api/v4".into(), 1);
        assert!(matches!(
            client.create_session(RadioKind::Artist, "Can").await,
            Err(EchoNestError::Http(_))
        ));
    }
}
