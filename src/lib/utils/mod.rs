use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// HTML-escape text content.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// HTML-escape attribute values (same rules as text for this codebase).
pub fn escape_attr(s: &str) -> String {
    escape_text(s)
}

/// Compute a slug suitable for ids/anchors. Output is limited to lowercase
/// alphanumerics and hyphens, so it can never contain `.`, `#`, or `:`.
pub fn slugify(input: &str) -> String {
    let mut out = String::new();
    let mut prev_dash = false;

    for ch in input.chars() {
        if ch.is_alphanumeric() {
            for lc in ch.to_lowercase() {
                out.push(lc);
            }
            prev_dash = false;
        } else if !out.is_empty() && !prev_dash {
            out.push('-');
            prev_dash = true;
        }
    }

    while out.ends_with('-') {
        out.pop();
    }

    out
}

const SMALL_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "but", "by", "for", "in", "into", "nor", "of", "on", "or",
    "the", "to", "via", "vs", "with",
];

/// Title-case a heading: capitalize each word except short connectives, and
/// always the first word. Words already containing capitals are left alone.
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut first = true;
    for piece in input.split_inclusive(char::is_whitespace) {
        let word = piece.trim_end();
        let trailing = &piece[word.len()..];
        if word.is_empty() {
            out.push_str(piece);
            continue;
        }
        let keep = !first
            && (SMALL_WORDS.contains(&word.to_ascii_lowercase().as_str())
                || word.chars().any(|c| c.is_uppercase()));
        if keep || word.chars().any(|c| c.is_uppercase()) {
            out.push_str(word);
        } else {
            let mut chars = word.chars();
            if let Some(head) = chars.next() {
                out.extend(head.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
        out.push_str(trailing);
        first = false;
    }
    out
}

/// Apply `f` to every text segment of an HTML string, leaving everything
/// inside `<...>` untouched.
pub fn map_html_text(html: &str, mut f: impl FnMut(&str) -> String) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(open) = rest.find('<') {
        out.push_str(&f(&rest[..open]));
        match rest[open..].find('>') {
            Some(close) => {
                out.push_str(&rest[open..open + close + 1]);
                rest = &rest[open + close + 1..];
            }
            None => {
                // Unbalanced tag; pass the tail through untouched.
                out.push_str(&rest[open..]);
                return out;
            }
        }
    }
    out.push_str(&f(rest));
    out
}

/// The lower-cased authority of an absolute URL, if it has one.
pub fn domain_of(raw: &str) -> Option<String> {
    url::Url::parse(raw)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
}

/// Write to a temporary sibling and rename into place, so a crash never
/// leaves a partial file at the final path.
pub fn write_then_rename(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = temp_sibling(path);
    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)
}

/// Atomic write that skips the disk entirely when the content is unchanged.
/// Returns whether a write happened.
pub fn write_if_changed(path: &Path, data: &[u8]) -> io::Result<bool> {
    if path.exists() && fs::read(path).is_ok_and(|existing| existing == data) {
        return Ok(false);
    }
    write_then_rename(path, data)?;
    Ok(true)
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}
