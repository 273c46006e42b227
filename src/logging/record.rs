use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::rewrite::ContentKind;

/// A record of one mirrored request, emitted as a single structured event.
#[derive(Debug, Clone)]
pub struct RequestLogRecord {
    pub request_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub path: String,
    pub serving_origin: String,
    pub content_kind: Option<ContentKind>,
    pub upstream_status: Option<u16>,
    pub response_status: u16,
    pub response_time_ms: i64,
    pub content_length: Option<u64>,
    pub error_type: Option<String>,
    pub error_message: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestLogRecord {
    pub fn new(path: &str, serving_origin: &str) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            path: path.to_string(),
            serving_origin: serving_origin.to_string(),
            content_kind: None,
            upstream_status: None,
            response_status: 0,
            response_time_ms: 0,
            content_length: None,
            error_type: None,
            error_message: None,
            user_agent: None,
        }
    }

    pub fn with_user_agent(mut self, user_agent: Option<&str>) -> Self {
        self.user_agent = user_agent.map(String::from);
        self
    }

    pub fn with_upstream(mut self, status: u16, kind: ContentKind) -> Self {
        self.upstream_status = Some(status);
        self.content_kind = Some(kind);
        self
    }

    pub fn with_response(mut self, status: u16, length: Option<u64>) -> Self {
        self.response_status = status;
        self.content_length = length;
        self.response_time_ms = (Utc::now() - self.timestamp).num_milliseconds();
        self
    }

    pub fn with_error(mut self, error_type: &str, message: &str) -> Self {
        self.error_type = Some(error_type.to_string());
        self.error_message = Some(message.to_string());
        self
    }

    pub fn emit(&self) {
        let kind = self.content_kind.map(|k| k.as_str()).unwrap_or("-");

        match (&self.error_type, &self.error_message) {
            (Some(error_type), Some(message)) => tracing::warn!(
                request_id = %self.request_id,
                path = %self.path,
                serving_origin = %self.serving_origin,
                status = self.response_status,
                elapsed_ms = self.response_time_ms,
                error_type = %error_type,
                user_agent = self.user_agent.as_deref().unwrap_or("-"),
                "Mirror request failed: {}",
                message
            ),
            _ => tracing::info!(
                request_id = %self.request_id,
                path = %self.path,
                serving_origin = %self.serving_origin,
                kind,
                upstream_status = self.upstream_status.unwrap_or_default(),
                status = self.response_status,
                bytes = self.content_length.unwrap_or_default(),
                elapsed_ms = self.response_time_ms,
                user_agent = self.user_agent.as_deref().unwrap_or("-"),
                "Mirror request served"
            ),
        }
    }
}
