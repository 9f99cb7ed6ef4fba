//! Server-rendered HTML pages
//!
//! - **Index** (`index`): registered songs, registration form, flash messages
//! - **Verify** (`verify`): transaction verification form and result
//!
//! Every user-controlled string goes through [`escape`] before it reaches markup.

mod index;
mod verify;

pub use index::render_index;
pub use verify::{render_verify, VerifyView};

use crate::api::flash::FlashMessage;

/// Escape text for HTML element content and quoted attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Only http(s) URLs become links; anything else renders as text
pub(crate) fn is_linkable(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

pub(crate) fn render_flashes(messages: &[FlashMessage]) -> String {
    messages
        .iter()
        .map(|m| {
            format!(
                "<div class=\"flash flash-{}\">{}</div>\n",
                m.category.as_str(),
                escape(&m.message)
            )
        })
        .collect()
}

/// Wrap page content in the shared layout
pub(crate) fn layout(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        body {{
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background-color: #1a1a1a;
            color: #e0e0e0;
            line-height: 1.6;
            margin: 0;
        }}
        header {{
            background-color: #2a2a2a;
            border-bottom: 1px solid #3a3a3a;
            padding: 20px;
            margin-bottom: 20px;
            display: flex;
            justify-content: space-between;
            align-items: center;
        }}
        header nav a {{
            color: #4a9eff;
            margin-left: 15px;
            text-decoration: none;
        }}
        h1 {{ font-size: 26px; margin: 0; color: #4a9eff; }}
        h2 {{ color: #4a9eff; }}
        .content {{ padding: 0 20px 20px; }}
        .build-info {{ color: #888; font-family: 'Courier New', monospace; font-size: 12px; }}
        .flash {{ padding: 10px; border-radius: 4px; margin-bottom: 10px; }}
        .flash-success {{ background: #10b981; color: #fff; }}
        .flash-info {{ background: #3a8eef; color: #fff; }}
        .flash-error {{ background: #ef4444; color: #fff; }}
        table {{ border-collapse: collapse; width: 100%; margin-bottom: 30px; }}
        th, td {{ border: 1px solid #3a3a3a; padding: 6px 8px; text-align: left; }}
        th {{ background: #2a2a2a; }}
        .status-pending {{ color: #f59e0b; }}
        .status-confirmed {{ color: #10b981; }}
        .status-failed {{ color: #ef4444; }}
        form label {{ display: block; margin-top: 10px; }}
        input, textarea {{ width: 100%; max-width: 600px; padding: 6px; background: #2a2a2a; color: #e0e0e0; border: 1px solid #3a3a3a; }}
        button {{ margin-top: 15px; padding: 10px 20px; background: #4a9eff; color: #fff; border: none; border-radius: 4px; font-weight: 600; }}
        pre {{ background: #2a2a2a; padding: 10px; overflow-x: auto; }}
        .mono {{ font-family: 'Courier New', monospace; font-size: 12px; }}
    </style>
</head>
<body>
    <header>
        <h1>{title}</h1>
        <nav>
            <a href="/">Songs</a>
            <a href="/verify_transaction">Verify</a>
            <span class="build-info">v{version} ({git_hash})</span>
        </nav>
    </header>
    <div class="content">
{content}
    </div>
</body>
</html>"#,
        title = escape(title),
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
        content = content,
    )
}
