//! HTTP backend against a local mock endpoint

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use url::Url;

use artist_search::{
    HttpSearchBackend, SearchBackend, SearchConfig, SearchError, SearchSession, SessionState,
};

type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

/// Serve `router` on an ephemeral port, returning its `/api` base URL
async fn serve(router: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Url::parse(&format!("http://{addr}/api")).unwrap()
}

fn backend_for(base_url: Url) -> HttpSearchBackend {
    let config = SearchConfig::default().with_base_url(base_url);
    HttpSearchBackend::new(&config).unwrap()
}

async fn search_echo(
    State(seen): State<Seen>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    seen.lock().unwrap().push(params);
    Json(json!({
        "suggestions": [
            { "spotifyId": "06HL4z0CvFAxyc27GXpf02", "name": "Taylor Swift",
              "followers": 98765432, "imageUrl": "https://img/ts.jpg" }
        ],
        "results": [
            { "spotifyId": "06HL4z0CvFAxyc27GXpf02", "name": "Taylor Swift",
              "followers": { "total": 98765432 },
              "images": [{ "url": "https://img/ts-640.jpg", "width": 640, "height": 640 }] }
        ]
    }))
}

async fn artist(Path(id): Path<String>) -> Json<Value> {
    Json(json!({
        "id": id,
        "name": "Taylor Swift",
        "followers": { "total": 100 },
        "genres": ["pop"],
        "popularity": 100
    }))
}

fn mock_api(seen: Seen) -> Router {
    Router::new()
        .route("/api/search", get(search_echo))
        .route("/api/artist/:id", get(artist))
        .with_state(seen)
}

#[tokio::test]
async fn test_search_sends_query_and_limit() {
    let seen = Seen::default();
    let backend = backend_for(serve(mock_api(seen.clone())).await);

    let response = backend.search("Taylor Swift", 20).await.unwrap();

    let params = seen.lock().unwrap().clone();
    assert_eq!(params.len(), 1);
    assert_eq!(params[0]["q"], "Taylor Swift");
    assert_eq!(params[0]["limit"], "20");

    assert_eq!(response.suggestions.len(), 1);
    let suggestion = &response.suggestions[0];
    assert_eq!(suggestion.id, "06HL4z0CvFAxyc27GXpf02");
    assert_eq!(suggestion.followers, 98_765_432);
    assert_eq!(suggestion.image_url.as_deref(), Some("https://img/ts.jpg"));

    let result = &response.results[0];
    assert_eq!(result.followers, 98_765_432);
    assert_eq!(result.images[0].url, "https://img/ts-640.jpg");
    assert_eq!(result.images[0].width, Some(640));
}

#[tokio::test]
async fn test_get_details_hits_artist_path() {
    let backend = backend_for(serve(mock_api(Seen::default())).await);

    let entity = backend.get_details("06HL4z0CvFAxyc27GXpf02").await.unwrap();

    assert_eq!(entity.id, "06HL4z0CvFAxyc27GXpf02");
    assert_eq!(entity.genres, vec!["pop".to_string()]);
    assert_eq!(entity.popularity, Some(100));
}

#[tokio::test]
async fn test_base_url_with_trailing_slash() {
    let base = serve(mock_api(Seen::default())).await;
    let with_slash = Url::parse(&format!("{base}/")).unwrap();
    let backend = backend_for(with_slash);

    assert!(backend.get_details("abc").await.is_ok());
}

#[tokio::test]
async fn test_missing_lists_are_empty_success() {
    let router = Router::new().route("/api/search", get(|| async { Json(json!({})) }));
    let backend = backend_for(serve(router).await);

    let response = backend.search("nobody", 20).await.unwrap();
    assert!(response.suggestions.is_empty());
    assert!(response.results.is_empty());
}

#[tokio::test]
async fn test_server_error_status() {
    let router = Router::new().route(
        "/api/search",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response() }),
    );
    let backend = backend_for(serve(router).await);

    let error = backend.search("Tay", 20).await.unwrap_err();
    assert_eq!(
        error,
        SearchError::server(Some(500), "upstream exploded")
    );
}

#[tokio::test]
async fn test_malformed_payload_is_server_error() {
    let router = Router::new().route("/api/artist/:id", get(|| async { "<html>not json</html>" }));
    let backend = backend_for(serve(router).await);

    let error = backend.get_details("1").await.unwrap_err();
    assert!(matches!(
        error,
        SearchError::Server { status: Some(200), ref message } if message.starts_with("Malformed payload")
    ));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_error() {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = backend_for(Url::parse(&format!("http://{addr}/api")).unwrap());
    let error = backend.search("Tay", 20).await.unwrap_err();
    assert!(matches!(error, SearchError::Network(_)), "got {error:?}");
}

#[tokio::test]
async fn test_request_timeout_is_network_error() {
    let router = Router::new().route(
        "/api/search",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({}))
        }),
    );
    let base = serve(router).await;
    let config = SearchConfig {
        request_timeout_secs: Some(1),
        ..SearchConfig::default()
    }
    .with_base_url(base);
    let backend = HttpSearchBackend::new(&config).unwrap();

    let error = backend.search("Tay", 20).await.unwrap_err();
    assert!(matches!(error, SearchError::Network(_)), "got {error:?}");
}

#[tokio::test]
async fn test_session_over_http() {
    let seen = Seen::default();
    let base = serve(mock_api(seen.clone())).await;
    let config = SearchConfig {
        debounce_ms: 20,
        ..SearchConfig::default()
    }
    .with_base_url(base);
    let mut session = SearchSession::connect(config).unwrap();

    session.on_query_changed("Ta");
    session.on_query_changed("Tay");
    session.settle().await;

    assert_eq!(seen.lock().unwrap().len(), 1);
    assert_eq!(session.view().suggestions[0].name, "Taylor Swift");

    let summary = session.view().suggestions[0].clone();
    session.on_suggestion_selected(summary);
    session.settle().await;

    match session.state() {
        SessionState::DetailReady { selected, error } => {
            assert_eq!(error, None);
            assert_eq!(selected.genres, vec!["pop".to_string()]);
            assert_eq!(selected.followers, 100);
        }
        other => panic!("expected detail, got {other:?}"),
    }
}
