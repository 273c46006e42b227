/// How an upstream response body is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// HTML page: every rewrite stage runs.
    Html,
    /// XML, RSS or plain text: only host substitution runs.
    Textual,
    /// Anything else is passed through byte for byte.
    Binary,
}

impl ContentKind {
    pub fn is_text(&self) -> bool {
        !matches!(self, Self::Binary)
    }

    /// Content type sent back to the client for rewritten bodies.
    pub fn response_content_type(&self) -> Option<&'static str> {
        match self {
            Self::Html => Some("text/html; charset=UTF-8"),
            Self::Textual => Some("application/xml; charset=UTF-8"),
            Self::Binary => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Textual => "textual",
            Self::Binary => "binary",
        }
    }
}

/// Classifier for upstream `Content-Type` values.
pub struct ContentClassifier;

impl ContentClassifier {
    pub fn classify(content_type: &str) -> ContentKind {
        let content_type = content_type.to_ascii_lowercase();

        if content_type.contains("text/html") {
            ContentKind::Html
        } else if content_type.contains("xml")
            || content_type.contains("rss")
            || content_type.contains("text/plain")
        {
            ContentKind::Textual
        } else {
            ContentKind::Binary
        }
    }
}
