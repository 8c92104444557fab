//! An arena-backed node tree.
//!
//! This is the stand-in for a browser DOM: a [`Document`] owns every node, [`NodeId`]s name them, and [`NodeRef`]
//! is a borrowed handle for navigating between them. Documents can be built node by node, or read from markup with
//! [`Document::parse`].
//!
//! ```
//! use nodegate::dom::Document;
//!
//! let mut doc = Document::new();
//! let target = doc.create_element("div");
//! let handle = doc.create_element("span");
//! doc.set_class_name(handle, "drag-handle").unwrap();
//! doc.append_child(target, handle).unwrap();
//!
//! let handle = doc.node(handle);
//! assert!(handle.has_class("drag-handle"));
//! assert_eq!(handle.parent_element().map(|p| p.id()), Some(target));
//! ```
mod markup;
mod node_ref;
mod tree;

pub use markup::{InvalidMarkup, Position};
pub use node_ref::*;
pub use tree::*;
