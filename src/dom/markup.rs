use crate::dom::{Document, NodeId};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use std::borrow::Cow;
use std::fmt::{Display, Formatter};
use tracing::trace;

#[derive(Parser)]
#[grammar = "dom/markup.pest"] // relative to src
struct MarkupPairs;

/// Elements that never have children, so they never need a close tag.
const VOID_ELEMENTS: [&str; 13] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

/// A 1-indexed line/column position within the markup text.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl From<&Pair<'_, Rule>> for Position {
    fn from(pair: &Pair<'_, Rule>) -> Self {
        let (line, column) = pair.as_span().start_pos().line_col();
        Self { line, column }
    }
}

/// Errors from [`Document::parse`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum InvalidMarkup {
    /// The text isn't well-formed markup. The message is the fully rendered parser error.
    Syntax(String),
    /// A close tag that doesn't match the innermost open element.
    UnexpectedClose { tag: String, position: Position },
    /// An element that was still open when the input ended.
    Unclosed { tag: String, position: Position },
}

impl std::error::Error for InvalidMarkup {}

impl Display for InvalidMarkup {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidMarkup::Syntax(message) => f.write_str(message),
            InvalidMarkup::UnexpectedClose { tag, position } => {
                write!(f, "unexpected </{tag}> at {position}")
            }
            InvalidMarkup::Unclosed { tag, position } => {
                write!(f, "<{tag}> opened at {position} is never closed")
            }
        }
    }
}

impl Document {
    /// Parses markup into a new document. Top-level nodes become children of [`Document::root`].
    ///
    /// ```
    /// use nodegate::dom::Document;
    ///
    /// let doc = Document::parse(r#"<div class="target"><span data-allow>hi</span></div>"#).unwrap();
    /// let div = doc.node(doc.root()).element_children().next().unwrap();
    /// assert_eq!(div.describe(), "div.target");
    /// ```
    pub fn parse(text: &str) -> Result<Self, InvalidMarkup> {
        let pairs = MarkupPairs::parse(Rule::document, text).map_err(|err| {
            let renamed = err.renamed_rules(|rule| {
                match rule {
                    Rule::EOI => "end of input",
                    Rule::document => "markup",
                    Rule::doctype => "doctype",
                    Rule::comment | Rule::comment_text => "comment",
                    Rule::open_tag => "open tag",
                    Rule::close_tag => "close tag",
                    Rule::self_closing => "_/_",
                    Rule::tag_name => "tag name",
                    Rule::attribute | Rule::attr_name => "attribute",
                    Rule::attr_value | Rule::dq_value | Rule::sq_value | Rule::unquoted_value => "attribute value",
                    Rule::text => "text",
                    Rule::content => "element, text, or comment",
                    Rule::ws => "whitespace",
                }
                .replace('_', "\"")
            });
            InvalidMarkup::Syntax(renamed.to_string())
        })?;

        let mut builder = TreeBuilder::new();
        for pair in pairs {
            for item in pair.into_inner() {
                builder.accept(item)?;
            }
        }
        builder.finish()
    }
}

struct OpenElement {
    id: NodeId,
    name: String,
    position: Position,
}

struct TreeBuilder {
    doc: Document,
    open: Vec<OpenElement>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            doc: Document::new(),
            open: Vec::with_capacity(16), // guess at a typical max depth
        }
    }

    fn current_parent(&self) -> NodeId {
        self.open.last().map(|open| open.id).unwrap_or(self.doc.root())
    }

    fn accept(&mut self, pair: Pair<Rule>) -> Result<(), InvalidMarkup> {
        match pair.as_rule() {
            Rule::open_tag => self.open_tag(pair),
            Rule::close_tag => self.close_tag(pair),
            Rule::text => {
                let id = self.doc.create_text_node(&decode_entities(pair.as_str()));
                self.attach(id);
                Ok(())
            }
            Rule::comment => {
                let id = self.doc.create_comment(pair.into_inner().as_str());
                self.attach(id);
                Ok(())
            }
            // doctype carries nothing we keep, and EOI is handled by finish()
            _ => Ok(()),
        }
    }

    fn open_tag(&mut self, pair: Pair<Rule>) -> Result<(), InvalidMarkup> {
        let position = Position::from(&pair);
        let mut name = String::new();
        let mut self_closing = false;
        let mut id = None;
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::tag_name => {
                    name = inner.as_str().to_ascii_lowercase();
                    id = Some(self.doc.create_element(&name));
                }
                Rule::attribute => {
                    let Some(element) = id else { continue };
                    let mut attr = inner.into_inner();
                    let attr_name = attr.next().map(|p| p.as_str()).unwrap_or_default();
                    let value = attr.next().map(|p| decode_entities(p.as_str())).unwrap_or_default();
                    // The first occurrence wins, as in HTML.
                    if !self.doc.node(element).has_attribute(attr_name) {
                        self.doc
                            .set_attribute(element, attr_name, &value)
                            .map_err(|e| InvalidMarkup::Syntax(e.to_string()))?;
                    }
                }
                Rule::self_closing => self_closing = true,
                _ => {}
            }
        }
        let Some(id) = id else {
            return Ok(());
        };
        trace!(tag = %name, %position, "open tag");
        self.attach(id);
        if !self_closing && !VOID_ELEMENTS.contains(&name.as_str()) {
            self.open.push(OpenElement { id, name, position });
        }
        Ok(())
    }

    fn close_tag(&mut self, pair: Pair<Rule>) -> Result<(), InvalidMarkup> {
        let position = Position::from(&pair);
        let name = pair
            .into_inner()
            .find(|p| p.as_rule() == Rule::tag_name)
            .map(|p| p.as_str().to_ascii_lowercase())
            .unwrap_or_default();
        match self.open.last() {
            Some(open) if open.name == name => {
                self.open.pop();
                Ok(())
            }
            _ => Err(InvalidMarkup::UnexpectedClose { tag: name, position }),
        }
    }

    fn attach(&mut self, child: NodeId) {
        let parent = self.current_parent();
        // The parent is always the document or an open element, and the child is always brand new, so this can't
        // create a cycle.
        if let Err(err) = self.doc.append_child(parent, child) {
            tracing::warn!(%err, "dropping node from markup");
        }
    }

    fn finish(self) -> Result<Document, InvalidMarkup> {
        if let Some(unclosed) = self.open.into_iter().last() {
            return Err(InvalidMarkup::Unclosed {
                tag: unclosed.name,
                position: unclosed.position,
            });
        }
        Ok(self.doc)
    }
}

/// Decodes the handful of character references the markup supports. Anything unrecognized is kept verbatim.
fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut remaining = text;
    while let Some(amp) = remaining.find('&') {
        out.push_str(&remaining[..amp]);
        let after = &remaining[amp + 1..];
        let decoded = after.find(';').and_then(|semi| {
            let name = &after[..semi];
            decode_entity(name).map(|ch| (ch, semi + 1))
        });
        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                remaining = &after[consumed..];
            }
            None => {
                out.push('&');
                remaining = after;
            }
        }
    }
    out.push_str(remaining);
    Cow::Owned(out)
}

fn decode_entity(name: &str) -> Option<char> {
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{A0}',
        _ => {
            let numeric = name.strip_prefix('#')?;
            let code_point = match numeric.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => numeric.parse::<u32>().ok()?,
            };
            return char::from_u32(code_point);
        }
    };
    Some(ch)
}
