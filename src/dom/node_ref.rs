use crate::dom::{Document, Element, NodeData, NodeHandle, NodeId};
use std::fmt::{Debug, Formatter};

/// A borrowed, navigable handle to one node of a [`Document`].
///
/// This is the type the filter and selector APIs work with; it's the moral equivalent of a DOM `Node` reference.
/// Two `NodeRef`s are equal iff they point to the same node of the same document.
#[derive(Copy, Clone)]
pub struct NodeRef<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(doc: &'a Document, id: NodeId) -> Self {
        Self { doc, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn handle(&self) -> NodeHandle {
        NodeHandle::new(self.doc.id(), self.id)
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    pub fn data(&self) -> &'a NodeData {
        &self.doc.nodes[self.id.0].data
    }

    pub fn is_element(&self) -> bool {
        matches!(self.data(), NodeData::Element(_))
    }

    pub fn as_element(&self) -> Option<&'a Element> {
        match self.data() {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    /// The uppercased tag name (`"INPUT"`), or `None` for non-elements.
    pub fn tag_name(&self) -> Option<String> {
        self.as_element().map(Element::tag_name)
    }

    pub fn local_name(&self) -> Option<&'a str> {
        self.as_element().map(Element::local_name)
    }

    pub fn get_attribute(&self, name: &str) -> Option<&'a str> {
        self.as_element().and_then(|e| e.get_attribute(name))
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.get_attribute(name).is_some()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.as_element().is_some_and(|e| e.has_class(class))
    }

    /// The text of a text or comment node.
    pub fn text(&self) -> Option<&'a str> {
        match self.data() {
            NodeData::Text(text) | NodeData::Comment(text) => Some(text),
            NodeData::Document | NodeData::Element(_) => None,
        }
    }

    pub fn parent_node(&self) -> Option<NodeRef<'a>> {
        self.doc.nodes[self.id.0].parent.map(|p| NodeRef::new(self.doc, p))
    }

    /// The parent, if it's an element. The document node is not an element, so a top-level element's
    /// `parent_element` is `None` even though its `parent_node` is the document.
    pub fn parent_element(&self) -> Option<NodeRef<'a>> {
        self.parent_node().filter(NodeRef::is_element)
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let doc = self.doc;
        doc.nodes[self.id.0].children.iter().map(move |c| NodeRef::new(doc, *c))
    }

    pub fn element_children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        self.children().filter(NodeRef::is_element)
    }

    /// Element siblings that come before this node, nearest first.
    pub fn preceding_element_siblings(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let (siblings, idx) = self.siblings_and_index();
        let doc = self.doc;
        siblings[..idx]
            .iter()
            .rev()
            .map(move |s| NodeRef::new(doc, *s))
            .filter(NodeRef::is_element)
    }

    /// Element siblings that come after this node, nearest first.
    pub fn following_element_siblings(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let (siblings, idx) = self.siblings_and_index();
        let doc = self.doc;
        let start = (idx + 1).min(siblings.len());
        siblings[start..]
            .iter()
            .map(move |s| NodeRef::new(doc, *s))
            .filter(NodeRef::is_element)
    }

    pub fn previous_element_sibling(&self) -> Option<NodeRef<'a>> {
        self.preceding_element_siblings().next()
    }

    pub fn next_element_sibling(&self) -> Option<NodeRef<'a>> {
        self.following_element_siblings().next()
    }

    /// Ancestor elements, starting with the parent element and moving up. Stops at the first non-element.
    pub fn ancestors(&self) -> Ancestors<'a> {
        Ancestors {
            next: self.parent_element(),
        }
    }

    /// All descendants (not including this node), in document order.
    pub fn descendants(&self) -> Descendants<'a> {
        let mut stack: Vec<NodeId> = self.doc.nodes[self.id.0].children.clone();
        stack.reverse();
        Descendants { doc: self.doc, stack }
    }

    /// Whether `other` is this node or one of its descendants, the way the DOM's `Node.contains` works.
    ///
    /// This follows `parent_node` links from `other`, so it isn't limited to elements.
    pub fn contains(&self, other: NodeRef<'_>) -> bool {
        if !std::ptr::eq(self.doc, other.doc) {
            return false;
        }
        let mut current = Some(other.id);
        while let Some(id) = current {
            if id == self.id {
                return true;
            }
            current = self.doc.nodes[id.0].parent;
        }
        false
    }

    /// A short, human-readable description: `span#id.class1.class2` for elements, `#text` for text, and so on.
    pub fn describe(&self) -> String {
        match self.data() {
            NodeData::Document => "#document".to_string(),
            NodeData::Text(_) => "#text".to_string(),
            NodeData::Comment(_) => "#comment".to_string(),
            NodeData::Element(element) => {
                let mut description = element.local_name().to_string();
                if let Some(id) = element.id().filter(|id| !id.is_empty()) {
                    description.push('#');
                    description.push_str(id);
                }
                for class in element.classes() {
                    description.push('.');
                    description.push_str(class);
                }
                description
            }
        }
    }

    fn siblings_and_index(&self) -> (&'a [NodeId], usize) {
        let Some(parent) = self.doc.nodes[self.id.0].parent else {
            return (&[], 0);
        };
        let siblings = self.doc.nodes[parent.0].children.as_slice();
        let idx = siblings.iter().position(|s| *s == self.id).unwrap_or(siblings.len());
        (siblings, idx)
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.describe(), self.id.0)
    }
}

pub struct Ancestors<'a> {
    next: Option<NodeRef<'a>>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent_element();
        Some(current)
    }
}

pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack.extend(self.doc.nodes[id.0].children.iter().rev());
        Some(NodeRef::new(self.doc, id))
    }
}
