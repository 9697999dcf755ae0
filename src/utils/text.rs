// src/utils/text.rs
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile WS_RE"));

/// Collapses whitespace runs (including non-breaking spaces) to single spaces.
pub fn normalize_ws(text: &str) -> String {
    let replaced = text.replace('\u{a0}', " ");
    WS_RE.replace_all(&replaced, " ").trim().to_string()
}

/// Flattens a fragment of tagged markup to its visible text. Plain strings
/// pass through with whitespace normalized only.
pub fn flatten_fragment_text(raw: &str) -> String {
    if !raw.contains('<') && !raw.contains('&') {
        return normalize_ws(raw);
    }
    let fragment = Html::parse_fragment(raw);
    let text: Vec<&str> = fragment.root_element().text().collect();
    normalize_ws(&text.join(" "))
}

/// Turns a dimensional member name like `ck0001:BusinessServicesMember`
/// into a readable label ("Business Services").
pub fn humanize_member(member: &str) -> String {
    let local = member.rsplit(':').next().unwrap_or(member).trim();
    let local = local.strip_suffix("Member").unwrap_or(local);

    let chars: Vec<char> = local.chars().collect();
    let mut out = String::with_capacity(local.len() + 8);
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_uppercase() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).map(|n| n.is_lowercase()).unwrap_or(false);
            if prev.is_lowercase() || prev.is_numeric() || (prev.is_uppercase() && next_is_lower) {
                out.push(' ');
            }
        }
        out.push(c);
    }
    normalize_ws(&out)
}
