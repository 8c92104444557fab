use crate::dom::{NodeHandle, NodeRef};
use crate::select::{ParseError, SelectorList};
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

/// A caller-supplied check, invoked as `predicate(reference, event_target)`.
pub type Predicate = Rc<dyn Fn(NodeRef<'_>, NodeRef<'_>) -> bool>;

/// Where a pointer interaction may (or may not) start from.
///
/// This is the value behind both an `allow_from` and an `ignore_from` setting. What "satisfied" means depends on the
/// variant; see [`crate::filter::test_allow`].
#[derive(Clone, Default)]
pub enum Filter {
    /// No restriction. Whether that means "allow" or "don't ignore" is up to the caller.
    #[default]
    None,

    /// Satisfied if the event target, or any of its ancestor elements up to and including the reference node, matches.
    Selector(SelectorList),

    /// Satisfied if this node is the event target or contains it. A node from a different document never is.
    Node(NodeHandle),

    /// Satisfied if the predicate returns `true`. The predicate gets full control; no ancestors are walked for it.
    Predicate(Predicate),
}

impl Filter {
    /// Parses a selector string into a [`Filter::Selector`].
    pub fn selector(text: &str) -> Result<Self, ParseError> {
        SelectorList::try_from(text).map(Self::Selector)
    }

    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(NodeRef<'_>, NodeRef<'_>) -> bool + 'static,
    {
        Self::Predicate(Rc::new(predicate))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Filter::None)
    }
}

impl Debug for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::None => f.write_str("None"),
            Filter::Selector(selector) => f.debug_tuple("Selector").field(&selector.to_string()).finish(),
            Filter::Node(handle) => f.debug_tuple("Node").field(&handle.node_id()).finish(),
            Filter::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<SelectorList> for Filter {
    fn from(value: SelectorList) -> Self {
        Self::Selector(value)
    }
}

impl From<NodeHandle> for Filter {
    fn from(value: NodeHandle) -> Self {
        Self::Node(value)
    }
}

impl From<NodeRef<'_>> for Filter {
    fn from(value: NodeRef<'_>) -> Self {
        Self::Node(value.handle())
    }
}

impl TryFrom<&'_ str> for Filter {
    type Error = ParseError;

    fn try_from(value: &'_ str) -> Result<Self, Self::Error> {
        Self::selector(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;
    use crate::util::utils_for_test::*;

    #[test]
    fn default_is_none() {
        assert!(Filter::default().is_none());
        assert!(!Filter::predicate(|_, _| true).is_none());
    }

    #[test]
    fn from_selector_text() {
        let filter = Filter::try_from(".allow-class").unwrap();
        unwrap!(filter, Filter::Selector(list));
        assert_eq!(list.to_string(), ".allow-class");
    }

    #[test]
    fn bad_selector_fails_at_construction() {
        let err = Filter::selector("div >").unwrap_err();
        assert!(err.to_string("div >").starts_with(" --> 1:"));
    }

    #[test]
    fn from_node() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        unwrap!(Filter::from(doc.node(div)), Filter::Node(handle));
        assert_eq!(handle.node_id(), div);
        assert_eq!(handle.document_id(), doc.id());
    }

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", Filter::None), "None");
        assert_eq!(
            format!("{:?}", Filter::selector("a > b").unwrap()),
            r#"Selector("a > b")"#
        );
        assert_eq!(format!("{:?}", Filter::predicate(|_, _| false)), "Predicate(..)");
    }
}
