//! Markup fragments that replace embedded server payloads.
//!
//! Names and URLs come straight from upstream content, so both are escaped
//! before they are placed in markup.

use super::provider::ProviderResolver;
use crate::codec::DecodedPayload;

const WATCH_SUFFIX: &str = "اضغط هنا للمشاهدة";
const COPY_NOTICE: &str = "يرجى نسخ السيرفر وفتحه في المتصفح";
const COPY_LABEL: &str = "نسخ";

const BUTTON_STYLE: &str = r#"  <style>
    .servers-container{max-width:800px;margin:20px auto;padding:20px;background:#f5f5f5;border-radius:10px}
    .server-btn{display:block;background:#ff004c;color:#fff;padding:15px;margin:10px 0;text-align:center;text-decoration:none;border-radius:8px;font-size:18px;font-weight:bold;transition:all 0.3s}
    .server-btn:hover{background:#cc0039;transform:scale(1.02)}
  </style>"#;

const COPY_ROW_STYLE: &str = r#"<style>
.notice-bar{background:#222;color:#fff;padding:10px;text-align:center;font-size:15px}
.getEmbed{max-width:800px;margin:0 auto;padding:10px}
.srv-row{display:flex;align-items:center;gap:6px;margin:5px 0;flex-wrap:wrap}
.srv-row b{min-width:70px;font-size:14px;flex-shrink:0}
.srv-url{width:300px;max-width:100%;padding:5px;font-size:11px;overflow:hidden;text-overflow:ellipsis}
.srv-row button{background:#ff004c;color:#fff;border:0;padding:5px 10px;cursor:pointer;border-radius:3px;font-size:13px;white-space:nowrap}
.srv-row button:hover{background:#222}
@media(max-width:600px){.srv-url{width:200px}}
</style>"#;

/// A server ready to render. Lives only for one render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedServer {
    pub name: String,
    pub url: String,
}

impl ResolvedServer {
    pub fn escaped_name(&self) -> String {
        escape_text(&self.name)
    }

    pub fn escaped_url(&self) -> String {
        escape_attr(&self.url)
    }
}

/// Resolve every descriptor, dropping entries without a URL. Order is kept.
pub fn resolve_servers(
    payload: &DecodedPayload,
    resolver: &ProviderResolver,
) -> Vec<ResolvedServer> {
    payload
        .servers
        .iter()
        .filter_map(|server| {
            let url = resolver.resolve(server);
            (!url.is_empty()).then(|| ResolvedServer {
                name: server.name.clone(),
                url,
            })
        })
        .collect()
}

pub fn escape_text(s: &str) -> String {
    s.replace('<', "&lt;").replace('>', "&gt;")
}

pub fn escape_attr(s: &str) -> String {
    s.replace('"', "&quot;")
}

/// Turns a payload's servers into a replacement fragment.
pub trait BlockRenderer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Render a non-empty list of servers.
    fn render_servers(&self, servers: &[ResolvedServer]) -> String;

    /// Render a payload. `None` means "leave the original block alone".
    fn render(&self, payload: &DecodedPayload, resolver: &ProviderResolver) -> Option<String> {
        let servers = resolve_servers(payload, resolver);
        if servers.is_empty() {
            return None;
        }
        Some(self.render_servers(&servers))
    }
}

/// One clickable button per server.
pub struct EmbedButtonRenderer;

impl BlockRenderer for EmbedButtonRenderer {
    fn name(&self) -> &'static str {
        "embed-buttons"
    }

    fn render_servers(&self, servers: &[ResolvedServer]) -> String {
        let buttons: String = servers
            .iter()
            .map(|s| {
                format!(
                    r#"<a href="{}" target="_blank" class="server-btn">{} - {}</a>"#,
                    s.escaped_url(),
                    s.escaped_name(),
                    WATCH_SUFFIX
                )
            })
            .collect();

        format!(
            "\n<div class=\"servers-container\">\n{}\n  {}\n</div>",
            BUTTON_STYLE, buttons
        )
    }
}

/// A notice plus one read-only, copyable URL field per server.
pub struct CopyRowRenderer;

impl BlockRenderer for CopyRowRenderer {
    fn name(&self) -> &'static str {
        "copy-rows"
    }

    fn render_servers(&self, servers: &[ResolvedServer]) -> String {
        // Row ids follow output position, after empty entries were dropped.
        let rows: String = servers
            .iter()
            .enumerate()
            .map(|(i, s)| {
                format!(
                    r#"
<div class="srv-row">
  <b>{name}</b>
  <input type="text" readonly value="{url}" class="srv-url" id="u{i}">
  <button onclick="navigator.clipboard.writeText(document.getElementById('u{i}').value);this.textContent='✓'">{label}</button>
</div>"#,
                    name = s.escaped_name(),
                    url = s.escaped_url(),
                    label = COPY_LABEL,
                )
            })
            .collect();

        format!(
            "\n{}\n<div class=\"notice-bar\">{}</div>\n<div class=\"getEmbed\">{}</div>\n",
            COPY_ROW_STYLE, COPY_NOTICE, rows
        )
    }
}
