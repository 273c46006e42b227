//! Maps server descriptors to playable embed URLs.
//!
//! Provider names overlap ("ArabEstream" contains both "arab" and "estream"),
//! so rules are an ordered first-match table rather than a lookup.

use crate::{codec::ServerDescriptor, config::EstreamTemplate};

/// Condition a descriptor is tested against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderMatch {
    /// `id` already starts with `http://` or `https://`.
    AbsoluteId,
    /// Lower-cased name contains the needle.
    NameContains(&'static str),
}

/// What a matching rule produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderTarget {
    /// Substitute `{id}` into the template.
    Template(String),
    /// Use the id unchanged.
    Verbatim,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRule {
    pub condition: ProviderMatch,
    pub target: ProviderTarget,
}

impl ProviderRule {
    fn name_contains(needle: &'static str, template: &str) -> Self {
        Self {
            condition: ProviderMatch::NameContains(needle),
            target: ProviderTarget::Template(template.to_string()),
        }
    }

    fn matches(&self, lower_name: &str, id: &str) -> bool {
        match self.condition {
            ProviderMatch::AbsoluteId => is_absolute_url(id),
            ProviderMatch::NameContains(needle) => lower_name.contains(needle),
        }
    }

    fn apply(&self, id: &str) -> String {
        match &self.target {
            ProviderTarget::Template(template) => template.replace("{id}", id),
            ProviderTarget::Verbatim => id.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderResolver {
    rules: Vec<ProviderRule>,
}

impl ProviderResolver {
    pub fn new(estream: &EstreamTemplate) -> Self {
        let rules = vec![
            ProviderRule {
                condition: ProviderMatch::AbsoluteId,
                target: ProviderTarget::Verbatim,
            },
            ProviderRule::name_contains("estream", estream.as_str()),
            ProviderRule::name_contains("arab", "https://v.turkvearab.com/embed-{id}.html"),
            ProviderRule::name_contains("ok", "https://ok.ru/videoembed/{id}"),
            ProviderRule::name_contains("red", "https://iplayerhls.com/e/{id}"),
            ProviderRule::name_contains(
                "dailymotion",
                "https://www.dailymotion.com/embed/video/{id}",
            ),
            ProviderRule {
                condition: ProviderMatch::NameContains("express"),
                target: ProviderTarget::Verbatim,
            },
        ];

        Self { rules }
    }

    /// Resolve a descriptor. Falls back to the raw id when nothing matches.
    pub fn resolve(&self, server: &ServerDescriptor) -> String {
        let name = server.name.to_lowercase();

        self.rules
            .iter()
            .find(|rule| rule.matches(&name, &server.id))
            .map(|rule| rule.apply(&server.id))
            .unwrap_or_else(|| server.id.clone())
    }
}

impl Default for ProviderResolver {
    fn default() -> Self {
        Self::new(&EstreamTemplate::default())
    }
}

fn is_absolute_url(id: &str) -> bool {
    let lower = id.get(..8).unwrap_or(id).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(name: &str, id: &str) -> String {
        ProviderResolver::default().resolve(&ServerDescriptor::new(name, id))
    }

    #[test]
    fn test_absolute_id_wins() {
        assert_eq!(
            resolve("Ok.ru", "HTTPS://cdn.example.com/v"),
            "HTTPS://cdn.example.com/v"
        );
        assert_eq!(resolve("estream", "http://x.test/a"), "http://x.test/a");
    }

    #[test]
    fn test_known_providers() {
        assert_eq!(resolve("Ok.ru", "abc123"), "https://ok.ru/videoembed/abc123");
        assert_eq!(resolve("EStream", "e1"), "https://arabveturk.com/e1.html");
        assert_eq!(
            resolve("Arab HD", "a1"),
            "https://v.turkvearab.com/embed-a1.html"
        );
        assert_eq!(resolve("Red", "r1"), "https://iplayerhls.com/e/r1");
        assert_eq!(
            resolve("Dailymotion", "d1"),
            "https://www.dailymotion.com/embed/video/d1"
        );
    }

    #[test]
    fn test_verbatim_fallbacks() {
        assert_eq!(resolve("Express", "exp-1"), "exp-1");
        assert_eq!(resolve("Unknown host", "zzz"), "zzz");
        assert_eq!(resolve("", ""), "");
    }

    #[test]
    fn test_rule_order_on_overlapping_names() {
        // "estream" is listed before "arab".
        assert_eq!(
            resolve("ArabEstream", "x"),
            "https://arabveturk.com/x.html"
        );
        // "arab" is listed before "ok".
        assert_eq!(
            resolve("ArabOk", "x"),
            "https://v.turkvearab.com/embed-x.html"
        );
        // "ok" is listed before "red".
        assert_eq!(resolve("Red Ok", "x"), "https://ok.ru/videoembed/x");
        // "red" is listed before "express".
        assert_eq!(resolve("ExpressRed", "x"), "https://iplayerhls.com/e/x");
    }

    #[test]
    fn test_embed_estream_template() {
        let resolver = ProviderResolver::new(&EstreamTemplate::Embed);
        assert_eq!(
            resolver.resolve(&ServerDescriptor::new("estream", "x")),
            "https://arabveturk.com/embed-x.html"
        );
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let resolver = ProviderResolver::default();
        let server = ServerDescriptor::new("Ok", "same");
        assert_eq!(resolver.resolve(&server), resolver.resolve(&server));
    }
}
