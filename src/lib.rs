//! Decide whether a pointer interaction may start from a node.
//!
//! An interactable element (the *reference* node) can restrict where pointer interactions on it may begin. The event
//! target is checked against two filters: `allow_from`, which must be satisfied, and `ignore_from`, which must not
//! be. This crate provides:
//!
//! - [`filter`]: the filters themselves, and [`filter::test_allow`] / [`filter::test_ignore`] to evaluate them;
//! - [`dom`]: an arena-backed node tree for the filters to work on, with a small markup reader;
//! - [`select`]: CSS selectors, with the same matching semantics as the DOM's `Element.matches`;
//! - [`run`]: the end-to-end workflow behind the `nodegate` CLI.
//!
//! ```
//! use nodegate::dom::Document;
//! use nodegate::filter::{Filter, PointerFiltersBuilder};
//!
//! let doc = Document::parse(r#"<div class="card"><span class="drag-handle">::</span><p>body</p></div>"#)?;
//! let card = doc.node(doc.root()).element_children().next().unwrap();
//! let mut children = card.element_children();
//! let (handle, body) = (children.next().unwrap(), children.next().unwrap());
//!
//! let filters = PointerFiltersBuilder::default()
//!     .allow_from(Filter::selector(".drag-handle")?)
//!     .build()?;
//! assert!(filters.test_ignore_allow(card, handle));
//! assert!(!filters.test_ignore_allow(card, body));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod dom;
pub mod filter;
mod query;
pub mod run;
pub mod select;
mod util;
