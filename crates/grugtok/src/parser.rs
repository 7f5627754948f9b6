//! Atom entry parsing.
//!
//! The arXiv feed markup is not contractually stable, so entries are read with a
//! streaming `quick_xml` reader rather than deserialized into a strict schema.
//! Missing fields degrade to defaults; only stub entries (short or missing
//! abstracts) are dropped. A malformed tail ends the read and keeps what came
//! before it.

use std::borrow::Cow;

use chrono::{SecondsFormat, Utc};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use crate::models::Paper;
use crate::text::{collapse_whitespace, unescape_xml};

/// Abstracts at or below this many characters mark an incomplete record.
pub const MIN_ABSTRACT_CHARS: usize = 100;

/// Title used when an entry carries none.
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Text-bearing elements read out of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Summary,
    Id,
    Published,
    Name,
}

impl Field {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Self::Title),
            b"summary" => Some(Self::Summary),
            b"id" => Some(Self::Id),
            b"published" => Some(Self::Published),
            b"name" => Some(Self::Name),
            _ => None,
        }
    }
}

/// Raw values collected from one entry, first occurrence wins.
#[derive(Debug, Default)]
struct EntryFields {
    title: Option<String>,
    summary: Option<String>,
    id: Option<String>,
    published: Option<String>,
    authors: Vec<String>,
    categories: Vec<String>,
    pdf_url: Option<String>,
}

impl EntryFields {
    fn read(raw: &str) -> Self {
        let mut reader = lenient_reader(raw);
        let mut fields = Self::default();
        // Element whose text is being gathered, with the text so far.
        let mut open: Option<(Field, String)> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    if open.is_none() {
                        open = Field::from_local_name(e.local_name().as_ref())
                            .map(|field| (field, String::new()));
                    }
                    fields.read_attributes(&e);
                }
                Ok(Event::Empty(e)) => fields.read_attributes(&e),
                Ok(Event::Text(text)) => {
                    if let Some((_, buf)) = open.as_mut() {
                        buf.push_str(&unescape_xml(&String::from_utf8_lossy(&text)));
                    }
                }
                Ok(Event::CData(cdata)) => {
                    if let Some((_, buf)) = open.as_mut() {
                        buf.push_str(&String::from_utf8_lossy(&cdata));
                    }
                }
                Ok(Event::End(e)) => {
                    let closing = Field::from_local_name(e.local_name().as_ref());
                    if closing.is_some() && closing == open.as_ref().map(|(field, _)| *field) {
                        if let Some((field, text)) = open.take() {
                            fields.finish(field, collapse_whitespace(&text));
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    debug!(error = %e, "Stopped reading malformed entry");
                    break;
                }
                Ok(_) => {}
            }
        }
        fields
    }

    fn finish(&mut self, field: Field, text: String) {
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Summary => &mut self.summary,
            Field::Id => &mut self.id,
            Field::Published => &mut self.published,
            Field::Name => {
                if !text.is_empty() {
                    self.authors.push(text);
                }
                return;
            }
        };
        slot.get_or_insert(text);
    }

    fn read_attributes(&mut self, element: &BytesStart<'_>) {
        match element.local_name().as_ref() {
            b"category" => {
                if let Some(term) = attribute(element, b"term").filter(|t| !t.is_empty()) {
                    self.categories.push(term);
                }
            }
            b"link" if self.pdf_url.is_none() => {
                if attribute(element, b"title").as_deref() == Some("pdf") {
                    self.pdf_url = attribute(element, b"href").filter(|h| !h.is_empty());
                }
            }
            _ => {}
        }
    }
}

fn lenient_reader(raw: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(raw);
    reader.config_mut().check_end_names = false;
    reader
}

/// Trimmed, unescaped value of an attribute, matched by local name.
fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == key)
        .map(|attr| {
            let value = attr
                .unescape_value()
                .unwrap_or_else(|_| Cow::Owned(String::from_utf8_lossy(&attr.value).into_owned()));
            value.trim().to_string()
        })
}

/// Yield the markup of every `<entry>` block in a feed.
pub fn split_entries(feed: &str) -> impl Iterator<Item = &str> {
    let mut reader = lenient_reader(feed);
    let mut blocks = Vec::new();
    let mut start = None;

    loop {
        let before = usize::try_from(reader.buffer_position()).ok();
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"entry" => {
                if start.is_none() {
                    start = before;
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"entry" => {
                let end = usize::try_from(reader.buffer_position()).ok();
                if let (Some(from), Some(to)) = (start.take(), end) {
                    blocks.extend(feed.get(from..to));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                debug!(error = %e, "Stopped splitting malformed feed");
                break;
            }
            Ok(_) => {}
        }
    }
    blocks.into_iter()
}

/// Parse every entry of a feed, dropping stubs.
#[must_use]
pub fn parse_feed(feed: &str) -> Vec<Paper> {
    split_entries(feed).filter_map(parse_entry).collect()
}

/// Parse one raw entry into a [`Paper`].
///
/// Returns `None` only when the abstract is too short to be a real record.
#[must_use]
pub fn parse_entry(raw: &str) -> Option<Paper> {
    let fields = EntryFields::read(raw);

    let r#abstract = fields.summary.unwrap_or_default();
    if r#abstract.chars().count() <= MIN_ABSTRACT_CHARS {
        return None;
    }

    let title = fields
        .title
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

    let canonical = fields.id.filter(|u| !u.is_empty());
    let id = canonical
        .as_deref()
        .and_then(last_path_segment)
        .map(str::to_string)
        .unwrap_or_else(|| format!("unknown-{}", uuid::Uuid::new_v4()));
    let url = canonical.unwrap_or_else(|| format!("https://arxiv.org/abs/{id}"));

    let published_at = fields
        .published
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));

    Some(Paper {
        id,
        title,
        authors: fields.authors,
        r#abstract,
        url,
        pdf_url: fields.pdf_url,
        published_at,
        categories: fields.categories,
        tag: None,
        question: None,
        answer: None,
        bet: None,
        content: None,
    })
}

fn last_path_segment(url: &str) -> Option<&str> {
    url.trim_end_matches('/').rsplit('/').next().filter(|s| !s.is_empty())
}
