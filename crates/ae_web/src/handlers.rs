use std::collections::HashSet;
use std::sync::Arc;
use ae_core::{Article, Error, SessionId, Usage};
use ae_enrich::{export, EXPORT_FILENAME};
use axum::{
    extract::{rejection::FormRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use tracing::{error, info, warn};
use crate::render::{render_index, IndexPage};
use crate::session::ResolvedSession;
use crate::AppState;

/// Fields posted by the index form. `selected_articles` repeats once per checked box.
#[derive(Debug, Default, PartialEq)]
pub struct EnhanceForm {
    pub api_key: String,
    pub selected_articles: HashSet<String>,
}

impl EnhanceForm {
    pub fn from_fields(fields: Vec<(String, String)>) -> Self {
        let mut form = Self::default();
        for (name, value) in fields {
            match name.as_str() {
                "api_key" => form.api_key = value,
                "selected_articles" => {
                    form.selected_articles.insert(value);
                }
                _ => {}
            }
        }
        form
    }
}

fn status_for(err: &Error) -> StatusCode {
    match err {
        e if e.is_user_error() => StatusCode::UNPROCESSABLE_ENTITY,
        Error::Scorer(_) | Error::Generator(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn usage_for(state: &AppState, session: &SessionId) -> Usage {
    match state.workflow.ledger().get(session).await {
        Ok(usage) => usage,
        Err(e) => {
            warn!(%session, "failed to read usage ledger: {}", e);
            Usage::default()
        }
    }
}

fn page(status: StatusCode, session: ResolvedSession, articles: &[Article], usage: Usage, error: Option<&str>) -> Response {
    let body = render_index(&IndexPage { articles, usage, error });
    with_session((status, Html(body)).into_response(), session)
}

fn with_session(mut response: Response, session: ResolvedSession) -> Response {
    if let Some(cookie) = session.set_cookie {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}

pub async fn index(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let session = state.sessions.resolve(&headers);
    let usage = usage_for(&state, &session.id).await;

    match state.catalog.load().await {
        Ok(articles) => page(StatusCode::OK, session, &articles, usage, None),
        Err(e) => {
            error!("failed to load catalog: {}", e);
            page(status_for(&e), session, &[], usage, Some(&e.to_string()))
        }
    }
}

pub async fn enhance(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Response {
    let session = state.sessions.resolve(&headers);
    let form = match form {
        Ok(Form(fields)) => EnhanceForm::from_fields(fields),
        Err(rejection) => {
            warn!(session = %session.id, "rejected form submission: {}", rejection.body_text());
            let usage = usage_for(&state, &session.id).await;
            let articles = match state.catalog.load().await {
                Ok(articles) => articles,
                Err(e) => {
                    error!("failed to load catalog: {}", e);
                    Vec::new()
                }
            };
            return page(rejection.status(), session, &articles, usage, Some(&rejection.body_text()));
        }
    };

    let articles = match state.catalog.load().await {
        Ok(articles) => articles,
        Err(e) => {
            error!("failed to load catalog: {}", e);
            let usage = usage_for(&state, &session.id).await;
            return page(status_for(&e), session, &[], usage, Some(&e.to_string()));
        }
    };

    let enrichment = match state
        .workflow
        .enrich(&session.id, &articles, &form.selected_articles, &form.api_key)
        .await
    {
        Ok(enrichment) => enrichment,
        Err(e) => {
            if !e.is_user_error() {
                error!(session = %session.id, "enhancement failed: {}", e);
            }
            let usage = usage_for(&state, &session.id).await;
            return page(status_for(&e), session, &articles, usage, Some(&e.to_string()));
        }
    };

    match export::encode(&enrichment.records) {
        Ok(bytes) => {
            info!("📦 Exporting {} enhanced articles", enrichment.records.len());
            let disposition = format!("attachment; filename=\"{}\"", EXPORT_FILENAME);
            let response = (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                bytes,
            )
                .into_response();
            with_session(response, session)
        }
        Err(e) => {
            error!("failed to encode export: {}", e);
            page(status_for(&e), session, &articles, enrichment.usage, Some(&e.to_string()))
        }
    }
}

pub async fn health() -> impl IntoResponse {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_collects_repeated_selection() {
        let form = EnhanceForm::from_fields(vec![
            ("api_key".to_string(), "sk-test".to_string()),
            ("selected_articles".to_string(), "l1".to_string()),
            ("selected_articles".to_string(), "l2".to_string()),
            ("selected_articles".to_string(), "l1".to_string()),
            ("unrelated".to_string(), "x".to_string()),
        ]);
        assert_eq!(form.api_key, "sk-test");
        assert_eq!(form.selected_articles.len(), 2);
        assert!(form.selected_articles.contains("l2"));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&Error::MissingCredential), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status_for(&Error::EmptySelection), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status_for(&Error::Generator("quota".to_string())), StatusCode::BAD_GATEWAY);
        assert_eq!(status_for(&Error::Scorer("down".to_string())), StatusCode::BAD_GATEWAY);
        assert_eq!(status_for(&Error::Storage("locked".to_string())), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
