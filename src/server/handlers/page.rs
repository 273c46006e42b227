use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};

use crate::{
    Result,
    logging::RequestLogRecord,
    proxy::UpstreamHeaders,
    rewrite::{ContentClassifier, RewriteContext, context::query_suffix},
    server::state::AppState,
};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Mirror any path from the upstream origin.
pub async fn handle_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response> {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| uri.authority().map(|a| a.as_str()));
    let user_agent = headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok());

    let path = uri.path();
    let query = uri.query();
    let context = RewriteContext::for_request(&state.config, host, path, query);
    let record = RequestLogRecord::new(path, &context.serving_origin).with_user_agent(user_agent);

    let upstream_url = format!("{}{}{}", state.config.target_base(), path, query_suffix(query));
    let upstream_headers = UpstreamHeaders::for_request(&state.config, user_agent);

    tracing::debug!("Mirroring {} from {}", path, upstream_url);

    let upstream = match state.client.fetch(&upstream_url, &upstream_headers).await {
        Ok(upstream) => upstream,
        Err(e) => {
            record
                .with_error(e.error_code(), &e.to_string())
                .with_response(StatusCode::INTERNAL_SERVER_ERROR.as_u16(), None)
                .emit();
            return Err(e);
        }
    };

    let kind = ContentClassifier::classify(&upstream.content_type);
    let body = state.pipeline.process(kind, upstream.body, &context);
    let body_len = body.len() as u64;

    let content_type = match kind.response_content_type() {
        Some(ct) => ct.to_string(),
        None if upstream.content_type.is_empty() => FALLBACK_CONTENT_TYPE.to_string(),
        None => upstream.content_type,
    };

    let mut response = ([(header::CONTENT_TYPE, content_type)], body).into_response();

    if let Some(cache_control) = &state.config.cache_control {
        match HeaderValue::from_str(cache_control) {
            Ok(value) => {
                response.headers_mut().insert(header::CACHE_CONTROL, value);
            }
            Err(e) => tracing::warn!("Ignoring invalid cache-control value: {}", e),
        }
    }

    record
        .with_upstream(upstream.status, kind)
        .with_response(response.status().as_u16(), Some(body_len))
        .emit();

    Ok(response)
}
