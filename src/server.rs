//! HTTP entry point that keeps the API key server-side.
//!
//! `POST /youtube-proxy` runs discovery for `{searchParams}`;
//! `POST /get-transcript` serves caption tracks for `{videoId}` or `{url}`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use log::{error, info, warn};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};

use crate::discovery::DiscoveryPipeline;
use crate::error::Error;
use crate::{captions, guard};

/// Caption language requested from the timedtext endpoint.
const TRANSCRIPT_LANG: &str = "en";

pub struct AppState {
    pub pipeline: DiscoveryPipeline,
    pub client: reqwest::Client,
    pub timedtext_url: String,
}

pub fn router(state: AppState) -> Router {
    // Preflight is answered for any origin, method and header
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/youtube-proxy", post(handle_search))
        .route("/get-transcript", post(handle_transcript))
        .layer(cors)
        .with_state(Arc::new(state))
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self {
            Error::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            Error::Upstream(_) | Error::EnrichmentUnavailable(_) => StatusCode::BAD_GATEWAY,
        };
        error_response(status, self.to_string())
    }
}

fn parse_body(body: &Bytes) -> Result<Value, Response> {
    serde_json::from_slice(body).map_err(|e| error_response(StatusCode::BAD_REQUEST, format!("invalid JSON body: {e}")))
}

async fn handle_search(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let body = match parse_body(&body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let params = match guard::validate(body.get("searchParams").unwrap_or(&Value::Null)) {
        Ok(p) => p,
        Err(e) => {
            warn!("Rejected search request: {e}");
            return e.into_response();
        }
    };

    match state.pipeline.discover(&params).await {
        Ok(videos) => {
            info!("Returning {} videos for {:?}", videos.len(), params.keyword);
            Json(videos).into_response()
        }
        Err(e) => {
            error!("Search proxy error: {e}");
            e.into_response()
        }
    }
}

async fn handle_transcript(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let body = match parse_body(&body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let video_id = ["videoId", "url"]
        .iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_str))
        .find_map(crate::extract_video_id);
    let Some(video_id) = video_id else {
        return error_response(StatusCode::BAD_REQUEST, "Video ID is required");
    };

    info!("Fetching transcript for video: {video_id}");
    let transcript = captions::fetch_transcript(&state.client, &state.timedtext_url, &video_id, TRANSCRIPT_LANG).await;

    let mut response = json!({
        "transcript": transcript.segments,
        "available": transcript.available,
    });
    if let Some(reason) = transcript.reason {
        response["error"] = Value::String(reason);
    }
    Json(response).into_response()
}

/// Bind and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> eyre::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::DurationPolicy;
    use crate::youtube::YouTubeClient;
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, header};
    use mockito::Matcher;
    use tower::ServiceExt;

    fn app(api_base: &str, timedtext_url: &str) -> Router {
        let client = reqwest::Client::new();
        let youtube = YouTubeClient::with_base_url(client.clone(), "server-key", api_base);
        router(AppState {
            pipeline: DiscoveryPipeline::new(youtube, DurationPolicy::default()),
            client,
            timedtext_url: timedtext_url.to_string(),
        })
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(resp: Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_preflight_allows_all() {
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/youtube-proxy")
            .header(header::ORIGIN, "https://example.com")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type, apikey")
            .body(Body::empty())
            .unwrap();

        let resp = app("http://127.0.0.1:9", "http://127.0.0.1:9").oneshot(req).await.unwrap();
        assert!(resp.status().is_success());
        assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_HEADERS));
    }

    #[tokio::test]
    async fn test_invalid_params_rejected_before_upstream() {
        let mut server = mockito::Server::new_async().await;
        let upstream = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let req = post_json(
            "/youtube-proxy",
            json!({"searchParams": {"keyword": "k", "timeRange": "9d", "language": "en"}}),
        );
        let resp = app(&server.url(), "http://127.0.0.1:9").oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("timeRange"));
        upstream.assert_async().await;
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/youtube-proxy")
            .body(Body::from("{not json"))
            .unwrap();
        let resp = app("http://127.0.0.1:9", "http://127.0.0.1:9").oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(resp).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_search_returns_json_array() {
        let mut server = mockito::Server::new_async().await;
        let _search = server
            .mock("GET", "/search")
            .match_query(Matcher::UrlEncoded("key".into(), "server-key".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"items": []}"#)
            .create_async()
            .await;

        let req = post_json(
            "/youtube-proxy",
            json!({"searchParams": {"keyword": "test", "timeRange": "24h", "language": "both"}}),
        );
        let resp = app(&server.url(), "http://127.0.0.1:9").oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!([]));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_bad_gateway() {
        let mut server = mockito::Server::new_async().await;
        let _search = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"error": {"message": "API key not valid"}}"#)
            .create_async()
            .await;

        let req = post_json(
            "/youtube-proxy",
            json!({"searchParams": {"keyword": "test", "timeRange": "24h", "language": "both"}}),
        );
        let resp = app(&server.url(), "http://127.0.0.1:9").oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        assert!(body_json(resp).await["error"].as_str().unwrap().contains("API key not valid"));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_hides_api_key() {
        let req = post_json(
            "/youtube-proxy",
            json!({"searchParams": {"keyword": "test", "timeRange": "24h", "language": "both"}}),
        );
        let resp = app("http://127.0.0.1:9", "http://127.0.0.1:9").oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let message = body_json(resp).await["error"].as_str().unwrap().to_string();
        assert!(message.contains("search request failed"), "{message}");
        assert!(!message.contains("server-key"), "{message}");
        assert!(!message.contains("key="), "{message}");
    }

    #[tokio::test]
    async fn test_transcript_requires_video_id() {
        let resp = app("http://127.0.0.1:9", "http://127.0.0.1:9")
            .oneshot(post_json("/get-transcript", json!({})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"], "Video ID is required");
    }

    #[tokio::test]
    async fn test_transcript_unavailable_is_ok() {
        let resp = app("http://127.0.0.1:9", "http://127.0.0.1:9/api/timedtext")
            .oneshot(post_json("/get-transcript", json!({"videoId": "dQw4w9WgXcQ"})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["available"], false);
        assert_eq!(body["transcript"], json!([]));
        assert_eq!(body["error"], "Transcript not available");
    }

    #[tokio::test]
    async fn test_transcript_from_url() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/timedtext")
            .match_query(Matcher::UrlEncoded("v".into(), "dQw4w9WgXcQ".into()))
            .with_status(200)
            .with_body(r#"<transcript><text start="0" dur="1.5">hi</text></transcript>"#)
            .create_async()
            .await;

        let timedtext = format!("{}/api/timedtext", server.url());
        let resp = app("http://127.0.0.1:9", &timedtext)
            .oneshot(post_json("/get-transcript", json!({"url": "https://youtu.be/dQw4w9WgXcQ"})))
            .await
            .unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["available"], true);
        assert_eq!(body["transcript"][0]["text"], "hi");
        assert!(body.get("error").is_none());
    }
}
