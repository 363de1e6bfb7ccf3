use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod handlers;
pub mod render;
pub mod session;
pub mod state;

pub use session::SessionSigner;
pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index).post(handlers::enhance))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Bind `addr` and serve the app until the process is stopped.
pub async fn serve(addr: SocketAddr, state: AppState) -> ae_core::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🌐 Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, create_app(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ae_core::{
        Article, ContentGenerator, Error, Generation, GenerationRequest, Result, SessionId,
        UsageLedger,
    };
    use ae_enrich::{Catalog, EnrichmentWorkflow, WorkflowConfig};
    use ae_inference::models::DummyScorer;
    use ae_inference::{RelevanceRanker, ScoringConfig};
    use ae_storage::{InMemoryStorage, InMemoryUsageLedger};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    const SECRET: &str = "test-secret";

    /// Always answers with the same post, or always fails.
    #[derive(Debug)]
    struct FixedGenerator {
        reply: std::result::Result<(&'static str, u64), &'static str>,
    }

    #[async_trait]
    impl ContentGenerator for FixedGenerator {
        fn name(&self) -> &str {
            "Fixed"
        }

        async fn generate(&self, _request: &GenerationRequest<'_>) -> Result<Generation> {
            match self.reply {
                Ok((text, total_tokens)) => Ok(Generation { text: text.to_string(), total_tokens }),
                Err(message) => Err(Error::Generator(message.to_string())),
            }
        }
    }

    async fn test_app(reply: std::result::Result<(&'static str, u64), &'static str>) -> (Router, Arc<InMemoryUsageLedger>) {
        let storage = InMemoryStorage::with_articles(&[
            Article::new("A", "l1", "s1").with_score(0.9),
            Article::new("B", "l2", "s2").with_score(0.4),
        ])
        .await;
        let ledger = Arc::new(InMemoryUsageLedger::new());
        let state = AppState {
            catalog: Catalog::new(
                Arc::new(storage),
                RelevanceRanker::new(
                    Arc::new(DummyScorer),
                    ScoringConfig { compute_scores: false, ..Default::default() },
                ),
            ),
            workflow: EnrichmentWorkflow::new(
                Arc::new(FixedGenerator { reply }),
                ledger.clone(),
                WorkflowConfig::default(),
            ),
            sessions: SessionSigner::new(SECRET).unwrap(),
        };
        (create_app(state), ledger)
    }

    fn post(body: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn session_cookie(response: &axum::response::Response) -> String {
        let set_cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_index_renders_catalog_and_sets_session() {
        let (app, _) = test_app(Ok(("Blog A", 100))).await;
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(session_cookie(&response).starts_with("ae_session="));
        let html = body_text(response).await;
        assert!(html.contains(r#"value="l1""#));
        assert!(html.contains(r#"value="l2""#));
        assert!(html.contains("Tokens used: 0"));
    }

    #[tokio::test]
    async fn test_enhance_downloads_csv_and_charges_session() {
        let (app, ledger) = test_app(Ok(("Blog A", 100))).await;
        let signer = SessionSigner::new(SECRET).unwrap();
        let session = SessionId::new();
        let cookie = format!("ae_session={}", signer.sign(&session));

        let response = app
            .clone()
            .oneshot(post("api_key=sk-test&selected_articles=l1", Some(&cookie)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert_eq!(
            response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"enhanced_articles.csv\""
        );
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/csv; charset=utf-8"
        );
        let csv = body_text(response).await;
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines, vec![
            "title,link,original_summary,relevance_score,blog_post",
            "A,l1,s1,0.9,Blog A",
        ]);

        let usage = ledger.get(&session).await.unwrap();
        assert_eq!(usage.tokens, 100);

        let response = app
            .oneshot(Request::builder().uri("/").header(header::COOKIE, &cookie).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(body_text(response).await.contains("Tokens used: 100"));
    }

    #[tokio::test]
    async fn test_enhance_without_api_key_rerenders() {
        let (app, _) = test_app(Ok(("Blog A", 100))).await;
        let response = app.oneshot(post("api_key=&selected_articles=l1", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_text(response).await;
        assert!(html.contains("Please provide an API key!"));
        assert!(html.contains(r#"value="l2""#));
    }

    #[tokio::test]
    async fn test_enhance_without_selection_rerenders() {
        let (app, _) = test_app(Ok(("Blog A", 100))).await;
        let response = app.oneshot(post("api_key=sk-test", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("No articles selected!"));
    }

    #[tokio::test]
    async fn test_generator_failure_keeps_usage() {
        let (app, ledger) = test_app(Err("You exceeded your current quota")).await;
        let session = SessionId::new();
        ledger.update(&session, 42).await.unwrap();
        let cookie = format!("ae_session={}", SessionSigner::new(SECRET).unwrap().sign(&session));

        let response = app
            .oneshot(post("api_key=sk-test&selected_articles=l1&selected_articles=l2", Some(&cookie)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let html = body_text(response).await;
        assert!(html.contains("You exceeded your current quota"));
        assert!(html.contains("Tokens used: 42"));
        assert_eq!(ledger.get(&session).await.unwrap().tokens, 42);
    }

    #[tokio::test]
    async fn test_forged_cookie_gets_fresh_session() {
        let (app, _) = test_app(Ok(("Blog A", 100))).await;
        let forged = format!("ae_session={}.deadbeef", SessionId::new());
        let response = app
            .oneshot(Request::builder().uri("/").header(header::COOKIE, forged).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let cookie = session_cookie(&response);
        let value = cookie.trim_start_matches("ae_session=");
        assert!(SessionSigner::new(SECRET).unwrap().verify(value).is_some());
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = test_app(Ok(("Blog A", 100))).await;
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn test_enhance_without_form_body_rerenders_page() {
        let (app, _) = test_app(Ok(("Blog A", 100))).await;
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from("api_key=sk-test&selected_articles=l1"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(response.headers()[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/html"));
        let html = body_text(response).await;
        assert!(html.contains(r#"value="l1""#));
        assert!(html.contains("Tokens used: 0"));
    }
}
