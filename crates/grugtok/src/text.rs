//! Text normalisation helpers shared by the parser, enricher and content fetcher.
//!
//! Everything here is a free function over `&str`; nothing patches or wraps the
//! standard string types.

use std::borrow::Cow;
use std::sync::LazyLock;

use quick_xml::escape::{resolve_html5_entity, unescape, unescape_with};
use regex::Regex;

/// Two-byte gzip magic number.
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script\s*>").expect("valid regex"));

static STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b.*?</style\s*>").expect("valid regex"));

static HTML_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));

static HTML_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#?[A-Za-z0-9]+;").expect("valid regex"));

/// Header and footer text the arXiv HTML renderer puts around every paper.
static HTML_BOILERPLATE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)Report issue for preceding element",
        r"(?i)HTML conversions sometimes display errors due to content that did not convert correctly from the source\.?",
        r"(?i)This paper uses the following packages that are not yet supported by the HTML conversion tool\.?",
        r"(?i)License:\s*(arXiv\.org perpetual non-exclusive license|CC\s?BY(-[A-Z]{2})*(\s\d\.\d)?|CC0 1\.0)",
        r"(?i)Generated\s+on\s+.{0,80}?\s+by\s+LaTeXML\S*",
        r"(?i)\b(Back to arXiv|Back to Abstract|Download PDF|Why HTML\?|Report Issue|Switch to light mode)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid regex"))
    .collect()
});

/// `%` comment to end of line, unless the percent sign is escaped.
static LATEX_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(^|[^\\])%.*$").expect("valid regex"));

static LATEX_COMMAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\[A-Za-z]+\*?(\[[^\]]*\])?").expect("valid regex"));

static LATEX_DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[^A-Za-z0-9\s.,;:!?()'"-]"#).expect("valid regex"));

/// Collapse every whitespace run to a single space and trim both ends.
#[must_use]
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Unescape XML character and entity references, keeping the raw text when it
/// contains a malformed reference.
#[must_use]
pub fn unescape_xml(s: &str) -> Cow<'_, str> {
    unescape(s).unwrap_or(Cow::Borrowed(s))
}

/// Remove a surrounding markdown code fence (```` ``` ```` or ```` ```json ````).
///
/// Text without a leading fence is returned trimmed and otherwise untouched.
#[must_use]
pub fn strip_code_fence(s: &str) -> &str {
    let trimmed = s.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag line, if any.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// True when the payload starts with the gzip signature.
#[must_use]
pub fn is_gzip(bytes: &[u8]) -> bool {
    bytes.starts_with(&GZIP_MAGIC)
}

/// Share of characters that are printable text (tabs and newlines count as printable).
///
/// Replacement characters from a lossy decode count against the ratio. An empty
/// string has ratio 0.
#[must_use]
pub fn printable_ratio(s: &str) -> f64 {
    let mut total = 0usize;
    let mut printable = 0usize;
    for c in s.chars() {
        total += 1;
        let is_printable = match c {
            '\n' | '\r' | '\t' => true,
            char::REPLACEMENT_CHARACTER => false,
            c => !c.is_control(),
        };
        if is_printable {
            printable += 1;
        }
    }
    if total == 0 { 0.0 } else { printable as f64 / total as f64 }
}

/// Reduce an HTML document to its visible text.
#[must_use]
pub fn html_to_text(html: &str) -> String {
    let text = SCRIPT_BLOCK.replace_all(html, " ");
    let text = STYLE_BLOCK.replace_all(&text, " ");
    let text = HTML_COMMENT.replace_all(&text, " ");
    let text = HTML_TAG.replace_all(&text, " ");
    let text = HTML_ENTITY.replace_all(&text, |caps: &regex::Captures<'_>| {
        let entity = &caps[0];
        unescape_with(entity, resolve_html5_entity)
            .map(Cow::into_owned)
            .unwrap_or_else(|_| " ".to_string())
    });

    let mut text = collapse_whitespace(&text);
    for pattern in HTML_BOILERPLATE.iter() {
        text = pattern.replace_all(&text, " ").into_owned();
    }
    collapse_whitespace(&text)
}

/// Reduce LaTeX source to plain words and basic punctuation.
#[must_use]
pub fn latex_to_text(tex: &str) -> String {
    let text = LATEX_COMMENT.replace_all(tex, "$1");
    let text = LATEX_COMMAND.replace_all(&text, " ");
    let text = LATEX_DISALLOWED.replace_all(&text, " ");
    collapse_whitespace(&text)
}
