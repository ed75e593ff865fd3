pub mod builder;

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use serde::{Deserialize, Serialize};

use crate::app::ParseError;
use crate::domain::Article;

pub use builder::ArticleBuilder;

/// Element names that identify articles in a particular feed flavour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedDialect {
    /// Per-article container, e.g. `entry` or `item`
    pub entry: String,
    pub title: String,
    pub link: String,
    /// Attribute on the link element carrying the URL (Atom `href`)
    pub link_attribute: Option<String>,
}

impl FeedDialect {
    pub fn new(entry: &str, title: &str, link: &str) -> Self {
        Self {
            entry: entry.to_string(),
            title: title.to_string(),
            link: link.to_string(),
            link_attribute: None,
        }
    }

    pub fn with_link_attribute(mut self, attribute: &str) -> Self {
        self.link_attribute = Some(attribute.to_string());
        self
    }

    pub fn atom() -> Self {
        Self::new("entry", "title", "link").with_link_attribute("href")
    }

    pub fn rss() -> Self {
        Self::new("item", "title", "link")
    }
}

impl Default for FeedDialect {
    fn default() -> Self {
        Self::atom()
    }
}

/// Streaming feed parser.
///
/// Elements are matched by local name with namespaces resolved, so
/// `atom:entry` counts as `entry`, while a `media:title` inside an entry is
/// not taken for the entry's own title.
/// The result is all-or-nothing: malformed input yields a single
/// [`ParseError`] and no articles.
#[derive(Debug, Clone, Default)]
pub struct FeedParser {
    dialect: FeedDialect,
}

impl FeedParser {
    pub fn new(dialect: FeedDialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> &FeedDialect {
        &self.dialect
    }

    pub fn parse_bytes(&self, body: &[u8]) -> Result<Vec<Article>, ParseError> {
        self.parse(body)
    }

    pub fn parse<R: BufRead>(&self, source: R) -> Result<Vec<Article>, ParseError> {
        let mut reader = NsReader::from_reader(source);
        let mut builder = ArticleBuilder::new(&self.dialect);
        let mut buf = Vec::new();

        loop {
            let position = reader.buffer_position() as u64;

            let read = reader
                .read_resolved_event_into(&mut buf)
                .map(|(resolved, event)| (namespace_uri(resolved), event));
            let (namespace, event) = match read {
                Ok(read) => read,
                Err(e) => {
                    return Err(ParseError::malformed(
                        reader.error_position() as u64,
                        e.to_string(),
                    ))
                }
            };
            let namespace = namespace.as_deref();

            match event {
                Event::Start(ref e) => {
                    let (name, attributes) = element(e, position)?;
                    builder
                        .start_element(namespace, &name, &attributes)
                        .map_err(|err| err.at(position))?;
                }
                Event::Empty(ref e) => {
                    let (name, attributes) = element(e, position)?;
                    builder
                        .start_element(namespace, &name, &attributes)
                        .and_then(|_| builder.end_element(namespace, &name))
                        .map_err(|err| err.at(position))?;
                }
                Event::End(ref e) => {
                    let name = utf8(e.local_name().as_ref(), position)?;
                    builder
                        .end_element(namespace, &name)
                        .map_err(|err| err.at(position))?;
                }
                Event::Text(ref e) => {
                    let text = e
                        .unescape()
                        .map_err(|err| ParseError::malformed(position, err.to_string()))?;
                    builder.characters(&text);
                }
                Event::CData(e) => {
                    let data = e.into_inner();
                    builder.characters(&utf8(&data, position)?);
                }
                Event::Eof => break,
                _ => {}
            }

            buf.clear();
        }

        let end = reader.buffer_position() as u64;
        let articles = builder.finish().map_err(|err| err.at(end))?;
        tracing::debug!("Parsed {} articles", articles.len());
        Ok(articles)
    }
}

fn namespace_uri(resolved: ResolveResult<'_>) -> Option<String> {
    match resolved {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        ResolveResult::Unbound => None,
        // Undeclared prefix, kept apart from every declared namespace
        ResolveResult::Unknown(prefix) => Some(format!("{}:", String::from_utf8_lossy(&prefix))),
    }
}

fn element(e: &BytesStart<'_>, position: u64) -> Result<(String, Vec<(String, String)>), ParseError> {
    let name = utf8(e.local_name().as_ref(), position)?;

    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| ParseError::malformed(position, err.to_string()))?;
        let key = utf8(attr.key.local_name().as_ref(), position)?;
        let value = attr
            .unescape_value()
            .map_err(|err| ParseError::malformed(position, err.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok((name, attributes))
}

fn utf8(bytes: &[u8], position: u64) -> Result<String, ParseError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| ParseError::malformed(position, e.to_string()))
}
