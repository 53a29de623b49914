//! Answer markup: normalisation to the allowed tag set and terminal rendering.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::prompt::ALLOWED_TAGS;

/// Paragraph appended when the answer has no verified evidence to stand on.
pub const OFFICIAL_SOURCE_DIRECTIVE: &str = "<p>I could not find verified dates or requirements \
for this admissions cycle in current sources. Please <b>check the official website</b> of the \
institution for the latest deadlines, fees and eligibility criteria.</p>";

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static pattern compiles"))
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"<(/?)([a-zA-Z][a-zA-Z0-9]*)\b[^<>]*?(/?)>")
}

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?m)^[ \t]*```[a-zA-Z]*[ \t]*$\n?")
}

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?m)^[ \t]{0,3}#{1,6}[ \t]+(.+?)[ \t]*#*[ \t]*$")
}

fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^[ \t]*(?:[-*+•]|\d{1,2}[.)])[ \t]+(.+)$")
}

fn strong_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"\*\*(.+?)\*\*|__(.+?)__")
}

fn emphasis_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"\*([^*\n]+)\*")
}

fn blank_lines_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"\n{3,}")
}

/// Normalise a model answer so it only uses the allowed structural tags.
///
/// Markdown emphasis becomes `<b>` (or plain text for single asterisks),
/// markdown headings and bullets become `<h3>` and `<ul><li>`, close
/// relatives of allowed tags are mapped onto them, and every other tag is
/// dropped while its inner text is kept. No asterisk survives.
pub fn sanitize_answer(text: &str) -> String {
    let text = fence_re().replace_all(text, "");
    let text = heading_re().replace_all(&text, "<h3>$1</h3>");
    let text = convert_bullets(&text);
    let text = strong_re().replace_all(&text, |caps: &Captures| {
        let inner = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        format!("<b>{inner}</b>")
    });
    let text = emphasis_re().replace_all(&text, "$1");
    let text = text.replace('*', "");
    let text = tag_re().replace_all(&text, normalize_tag);
    blank_lines_re()
        .replace_all(text.trim(), "\n\n")
        .into_owned()
}

fn normalize_tag(caps: &Captures) -> String {
    let closing = !caps[1].is_empty();
    let name = caps[2].to_ascii_lowercase();
    let mapped = match name.as_str() {
        "strong" => "b",
        "h1" | "h2" | "h4" | "h5" | "h6" => "h3",
        "ol" => "ul",
        other => other,
    };
    if !ALLOWED_TAGS.contains(&mapped) {
        return String::new();
    }
    match (mapped, closing) {
        ("br", true) => String::new(),
        ("br", false) => "<br>".to_string(),
        (tag, true) => format!("</{tag}>"),
        (tag, false) => format!("<{tag}>"),
    }
}

fn convert_bullets(text: &str) -> String {
    let mut out = Vec::new();
    let mut in_list = false;
    for line in text.lines() {
        match bullet_re().captures(line) {
            Some(caps) => {
                if !in_list {
                    out.push("<ul>".to_string());
                    in_list = true;
                }
                out.push(format!("<li>{}</li>", &caps[1]));
            }
            None => {
                if in_list {
                    out.push("</ul>".to_string());
                    in_list = false;
                }
                out.push(line.to_string());
            }
        }
    }
    if in_list {
        out.push("</ul>".to_string());
    }
    out.join("\n")
}

/// Whether the answer already points the reader at the official source.
pub fn mentions_official_source(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("official website") || lower.contains("official site")
}

/// Render assistant markup for a plain terminal.
pub fn render_terminal(markup: &str) -> String {
    let rendered = tag_re().replace_all(markup, |caps: &Captures| {
        let closing = !caps[1].is_empty();
        match (caps[2].to_ascii_lowercase().as_str(), closing) {
            ("h3", false) => "\n\x1b[1;4m".to_string(),
            ("h3", true) => "\x1b[0m\n".to_string(),
            ("b", false) => "\x1b[1m".to_string(),
            ("b", true) => "\x1b[0m".to_string(),
            ("li", false) => "  • ".to_string(),
            ("li", true) | ("br", _) | ("ul", _) => "\n".to_string(),
            ("p", true) => "\n\n".to_string(),
            _ => String::new(),
        }
    });
    let decoded = rendered
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    let lines: Vec<&str> = decoded.lines().map(str::trim_end).collect();
    blank_lines_re()
        .replace_all(lines.join("\n").trim(), "\n\n")
        .into_owned()
}
