//! Allow/ignore filters for pointer interactions.
//!
//! An interaction starts on some *event target* node, inside the element an interactable is bound to (the *reference*
//! node). Two filters decide whether it may proceed:
//!
//! - [`test_allow`] with the `allow_from` filter: the interaction may only start if this is satisfied;
//! - [`test_ignore`] with the `ignore_from` filter: the interaction must not start if this is satisfied.
//!
//! A [`Filter`] can be absent, a CSS selector, a specific node, or a predicate. Selector filters look at the event
//! target and its ancestors, up to and including the reference node, but never above it.
//!
//! ```
//! use nodegate::dom::Document;
//! use nodegate::filter::{test_allow, test_ignore, Filter};
//!
//! let doc = Document::parse(r#"<div class="card"><p><b>title</b></p></div>"#).unwrap();
//! let card = doc.node(doc.root()).element_children().next().unwrap();
//! let bold = card.descendants().find(|n| n.local_name() == Some("b")).unwrap();
//!
//! assert!(test_allow(&Filter::selector(".card p").unwrap(), card, bold));
//! assert!(!test_ignore(&Filter::None, card, bold));
//!
//! let text = bold.children().next().unwrap();
//! assert!(!test_allow(&Filter::None, card, text));
//! ```
mod matcher;
mod pointer;
mod types;

pub use matcher::*;
pub use pointer::*;
pub use types::*;
