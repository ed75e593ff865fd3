use url::Url;

use crate::app::ParseError;
use crate::domain::Article;
use crate::parser::FeedDialect;

#[derive(Debug, Default)]
struct Draft {
    namespace: Option<String>,
    depth: usize,
    title: String,
    link: String,
    link_from_attribute: bool,
}

impl Draft {
    fn finish(self) -> Article {
        let link = self.link.trim();
        let url = if link.is_empty() {
            None
        } else {
            match Url::parse(link) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::debug!("Ignoring unparsable link {:?}: {}", link, e);
                    None
                }
            }
        };

        Article {
            title: self.title.trim().to_string(),
            url,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
}

#[derive(Debug)]
struct OpenElement {
    namespace: Option<String>,
    name: String,
    field: Option<Field>,
}

/// Event-driven article assembly.
///
/// Fed with element open/close and character data in document order, it
/// keeps a stack of open elements and the records currently under
/// construction. A record is appended to the output when its entry element
/// closes.
///
/// Title and link are only taken from direct children of the entry that
/// share its namespace, so `<media:title>` or `<source><title>` never leak
/// into the article. Character data is accumulated per element, so text
/// delivered in several chunks ends up concatenated.
#[derive(Debug)]
pub struct ArticleBuilder<'d> {
    dialect: &'d FeedDialect,
    open: Vec<OpenElement>,
    drafts: Vec<Draft>,
    articles: Vec<Article>,
    seen_root: bool,
}

impl<'d> ArticleBuilder<'d> {
    pub fn new(dialect: &'d FeedDialect) -> Self {
        Self {
            dialect,
            open: Vec::new(),
            drafts: Vec::new(),
            articles: Vec::new(),
            seen_root: false,
        }
    }

    /// Open an element. `namespace` is the resolved namespace URI, `None`
    /// for elements in no namespace.
    pub fn start_element(
        &mut self,
        namespace: Option<&str>,
        name: &str,
        attributes: &[(String, String)],
    ) -> Result<(), ParseError> {
        if self.open.is_empty() && self.seen_root {
            return Err(ParseError::malformed(
                0,
                format!("unexpected element <{}> after the root element", name),
            ));
        }
        self.seen_root = true;

        let field = self.field_of(namespace, name);
        match field {
            Some(Field::Title) => {
                if let Some(draft) = self.drafts.last_mut() {
                    draft.title.clear();
                }
            }
            Some(Field::Link) => self.start_link(attributes),
            None if name == self.dialect.entry => {
                self.drafts.push(Draft {
                    namespace: namespace.map(str::to_string),
                    depth: self.open.len(),
                    ..Draft::default()
                });
            }
            None => {}
        }

        self.open.push(OpenElement {
            namespace: namespace.map(str::to_string),
            name: name.to_string(),
            field,
        });
        Ok(())
    }

    pub fn characters(&mut self, text: &str) {
        let Some(field) = self.open.last().and_then(|open| open.field) else {
            return;
        };
        let Some(draft) = self.drafts.last_mut() else {
            return;
        };

        match field {
            Field::Title => draft.title.push_str(text),
            Field::Link if !draft.link_from_attribute => draft.link.push_str(text),
            Field::Link => {}
        }
    }

    pub fn end_element(&mut self, namespace: Option<&str>, name: &str) -> Result<(), ParseError> {
        match self.open.pop() {
            Some(open) if open.name == name && open.namespace.as_deref() == namespace => {}
            Some(open) => {
                return Err(ParseError::malformed(
                    0,
                    format!("expected </{}>, found </{}>", open.name, name),
                ))
            }
            None => {
                return Err(ParseError::malformed(
                    0,
                    format!("unexpected </{}> with no open element", name),
                ))
            }
        }

        let closes_draft = self
            .drafts
            .last()
            .is_some_and(|draft| draft.depth == self.open.len());
        if name == self.dialect.entry && closes_draft {
            if let Some(draft) = self.drafts.pop() {
                self.articles.push(draft.finish());
            }
        }

        Ok(())
    }

    /// Articles completed so far.
    pub fn completed(&self) -> &[Article] {
        &self.articles
    }

    pub fn finish(self) -> Result<Vec<Article>, ParseError> {
        if let Some(open) = self.open.last() {
            return Err(ParseError::malformed(
                0,
                format!("document ended while <{}> was still open", open.name),
            ));
        }
        if !self.seen_root {
            return Err(ParseError::malformed(0, "document has no root element"));
        }

        Ok(self.articles)
    }

    // A title or link field is a direct child of the entry being built, in
    // the entry's namespace.
    fn field_of(&self, namespace: Option<&str>, name: &str) -> Option<Field> {
        let draft = self.drafts.last()?;
        if self.open.len() != draft.depth + 1 || draft.namespace.as_deref() != namespace {
            return None;
        }

        if name == self.dialect.title {
            Some(Field::Title)
        } else if name == self.dialect.link {
            Some(Field::Link)
        } else {
            None
        }
    }

    // Atom style `<link rel="alternate" href="..."/>`: the first alternate
    // link of an entry wins. Otherwise the link is the element text, and
    // every link element starts over.
    fn start_link(&mut self, attributes: &[(String, String)]) {
        let Some(draft) = self.drafts.last_mut() else {
            return;
        };
        if draft.link_from_attribute {
            return;
        }

        let alternate = attributes
            .iter()
            .find(|(key, _)| key == "rel")
            .map_or(true, |(_, rel)| rel == "alternate");
        let href = self
            .dialect
            .link_attribute
            .as_deref()
            .filter(|_| alternate)
            .and_then(|wanted| attributes.iter().find(|(key, _)| key == wanted));

        draft.link.clear();
        if let Some((_, value)) = href {
            draft.link.push_str(value);
            draft.link_from_attribute = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_split_character_data_is_accumulated() {
        let dialect = FeedDialect::atom();
        let mut builder = ArticleBuilder::new(&dialect);

        builder.start_element(None, "feed", &[]).unwrap();
        builder.start_element(None, "entry", &[]).unwrap();
        builder.start_element(None, "title", &[]).unwrap();
        builder.characters("Hel");
        builder.characters("lo");
        builder.end_element(None, "title").unwrap();
        builder.end_element(None, "entry").unwrap();
        builder.end_element(None, "feed").unwrap();

        let articles = builder.finish().unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Hello");
    }

    #[test]
    fn test_record_completes_on_entry_close() {
        let dialect = FeedDialect::atom();
        let mut builder = ArticleBuilder::new(&dialect);

        builder.start_element(None, "feed", &[]).unwrap();
        builder.start_element(None, "entry", &[]).unwrap();
        assert!(builder.completed().is_empty());
        builder.end_element(None, "entry").unwrap();

        // An entry without any fields is still an article
        assert_eq!(builder.completed(), &[Article::default()]);
    }

    #[test]
    fn test_text_outside_entries_is_ignored() {
        let dialect = FeedDialect::atom();
        let mut builder = ArticleBuilder::new(&dialect);

        builder.start_element(None, "feed", &[]).unwrap();
        builder.start_element(None, "title", &[]).unwrap();
        builder.characters("Feed title");
        builder.end_element(None, "title").unwrap();
        builder.end_element(None, "feed").unwrap();

        assert!(builder.finish().unwrap().is_empty());
    }

    #[test]
    fn test_only_immediate_parent_counts() {
        let dialect = FeedDialect::atom();
        let mut builder = ArticleBuilder::new(&dialect);

        builder.start_element(None, "entry", &[]).unwrap();
        builder.start_element(None, "title", &[]).unwrap();
        builder.characters("Real");
        builder.start_element(None, "em", &[]).unwrap();
        builder.characters(" ignored");
        builder.end_element(None, "em").unwrap();
        builder.end_element(None, "title").unwrap();
        builder.end_element(None, "entry").unwrap();

        assert_eq!(builder.finish().unwrap()[0].title, "Real");
    }

    #[test]
    fn test_link_attribute_prefers_alternate() {
        let dialect = FeedDialect::atom();
        let mut builder = ArticleBuilder::new(&dialect);

        builder.start_element(None, "entry", &[]).unwrap();
        builder
            .start_element(None, "link", &attrs(&[("rel", "self"), ("href", "https://example.com/self")]))
            .unwrap();
        builder.end_element(None, "link").unwrap();
        builder
            .start_element(None, "link", &attrs(&[("href", "https://example.com/post")]))
            .unwrap();
        builder.end_element(None, "link").unwrap();
        builder.end_element(None, "entry").unwrap();

        let articles = builder.finish().unwrap();
        assert_eq!(articles[0].url.as_ref().unwrap().as_str(), "https://example.com/post");
    }

    #[test]
    fn test_unbalanced_close_is_malformed() {
        let dialect = FeedDialect::atom();
        let mut builder = ArticleBuilder::new(&dialect);

        builder.start_element(None, "entry", &[]).unwrap();
        builder.start_element(None, "title", &[]).unwrap();
        assert!(builder.end_element(None, "entry").is_err());
    }

    #[test]
    fn test_unclosed_document_is_malformed() {
        let dialect = FeedDialect::atom();
        let mut builder = ArticleBuilder::new(&dialect);

        builder.start_element(None, "feed", &[]).unwrap();
        builder.start_element(None, "entry", &[]).unwrap();
        builder.end_element(None, "entry").unwrap();

        assert!(matches!(builder.finish(), Err(ParseError::Malformed { .. })));
    }

    #[test]
    fn test_foreign_namespace_title_is_ignored() {
        let atom = Some("http://www.w3.org/2005/Atom");
        let media = Some("http://search.yahoo.com/mrss/");
        let dialect = FeedDialect::atom();
        let mut builder = ArticleBuilder::new(&dialect);

        builder.start_element(atom, "entry", &[]).unwrap();
        builder.start_element(atom, "title", &[]).unwrap();
        builder.characters("Video");
        builder.end_element(atom, "title").unwrap();
        builder.start_element(media, "title", &[]).unwrap();
        builder.characters("Other");
        builder.end_element(media, "title").unwrap();
        builder.end_element(atom, "entry").unwrap();

        assert_eq!(builder.finish().unwrap()[0].title, "Video");
    }

    #[test]
    fn test_second_title_starts_fresh() {
        let dialect = FeedDialect::rss();
        let mut builder = ArticleBuilder::new(&dialect);

        builder.start_element(None, "item", &[]).unwrap();
        builder.start_element(None, "title", &[]).unwrap();
        builder.characters("First");
        builder.end_element(None, "title").unwrap();
        builder.start_element(None, "title", &[]).unwrap();
        builder.characters("Second");
        builder.end_element(None, "title").unwrap();
        builder.end_element(None, "item").unwrap();

        assert_eq!(builder.finish().unwrap()[0].title, "Second");
    }

    #[test]
    fn test_text_link_with_atom_dialect() {
        let dialect = FeedDialect::atom();
        let mut builder = ArticleBuilder::new(&dialect);

        builder.start_element(None, "entry", &[]).unwrap();
        builder.start_element(None, "link", &[]).unwrap();
        builder.characters("https://example.com/text");
        builder.end_element(None, "link").unwrap();
        builder.end_element(None, "entry").unwrap();

        let articles = builder.finish().unwrap();
        assert_eq!(articles[0].url.as_ref().unwrap().as_str(), "https://example.com/text");
    }
}
