//! CSS selectors over [`crate::dom`] trees.
//!
//! A [`SelectorList`] is parsed from a string and then answers the same question as the DOM's `Element.matches`:
//!
//! ```
//! use nodegate::dom::Document;
//! use nodegate::select::SelectorList;
//!
//! let doc = Document::parse(r#"<ul><li class="handle">grab</li><li>text</li></ul>"#).unwrap();
//! let selector = SelectorList::try_from("ul > .handle:first-child").unwrap();
//!
//! let found = selector.query_all(doc.node(doc.root()));
//! assert_eq!(found.len(), 1);
//! assert!(selector.matches(found[0]));
//! ```
mod api;
mod matching;
mod selector;

pub use crate::query::ParseError;
pub use selector::*;
