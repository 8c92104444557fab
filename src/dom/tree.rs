use crate::dom::NodeRef;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies a node within the [`Document`] that created it.
///
/// Ids are only meaningful for the document that issued them. Using an id from one document with another is a logic
/// error; depending on the id, it may panic or silently refer to an unrelated node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

/// Identifies one [`Document`] for as long as the process runs. A clone gets an identity of its own.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(u64);

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(0);

impl DocumentId {
    fn next() -> Self {
        Self(NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A [`NodeId`] tied to the document that issued it, so it can be held without borrowing the document.
///
/// Get one from [`NodeRef::handle`], and turn it back into a [`NodeRef`] with [`Document::resolve`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    document: DocumentId,
    node: NodeId,
}

impl NodeHandle {
    pub(crate) fn new(document: DocumentId, node: NodeId) -> Self {
        Self { document, node }
    }

    pub fn document_id(&self) -> DocumentId {
        self.document
    }

    pub fn node_id(&self) -> NodeId {
        self.node
    }
}

/// The payload of a single node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeData {
    /// The document node. Every [`Document`] has exactly one, at [`Document::root`].
    Document,
    Element(Element),
    Text(String),
    Comment(String),
}

/// An element's name and attributes.
///
/// Both the element's name and its attribute names are stored ASCII-lowercased, the same way an HTML document stores
/// them. Attribute values are kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    local_name: String,
    attributes: Vec<Attribute>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Element {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            local_name: name.to_ascii_lowercase(),
            attributes: Vec::new(),
        }
    }

    /// The element's lowercased name, like `div`.
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// The element's name as the DOM's `tagName` reports it for HTML elements: uppercased, like `DIV`.
    pub fn tag_name(&self) -> String {
        self.local_name.to_ascii_uppercase()
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
            .map(|attr| attr.value.as_str())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.get_attribute(name).is_some()
    }

    pub fn id(&self) -> Option<&str> {
        self.get_attribute("id")
    }

    /// Iterates over the element's classes: its `class` attribute split on ASCII whitespace.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.get_attribute("class")
            .unwrap_or("")
            .split(|ch: char| ch.is_ascii_whitespace())
            .filter(|class| !class.is_empty())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    fn set_attribute(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        match self.attributes.iter_mut().find(|attr| attr.name == name) {
            Some(existing) => existing.value = value.to_string(),
            None => self.attributes.push(Attribute {
                name,
                value: value.to_string(),
            }),
        }
    }

    fn remove_attribute(&mut self, name: &str) -> bool {
        let before = self.attributes.len();
        self.attributes.retain(|attr| !attr.name.eq_ignore_ascii_case(name));
        before != self.attributes.len()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) data: NodeData,
}

/// An arena of nodes.
///
/// A document owns all of its nodes, attached or not. Nodes created with [`Document::create_element`] and friends
/// start out detached (they have no parent) and can be attached with [`Document::append_child`]. A detached subtree is
/// still a perfectly good tree: selector matching and containment checks only look at parent/child links, never at
/// whether a node is reachable from [`Document::root`].
///
/// Two documents are equal if their trees are, regardless of their [`DocumentId`]s.
#[derive(Debug)]
pub struct Document {
    id: DocumentId,
    pub(crate) nodes: Vec<Node>,
}

impl Clone for Document {
    fn clone(&self) -> Self {
        Self {
            id: DocumentId::next(),
            nodes: self.nodes.clone(),
        }
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }
}

impl Eq for Document {}

/// Errors from mutating a [`Document`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DomError {
    /// The requested insertion would create a cycle, put a node under a text or comment node, or move the document
    /// node.
    HierarchyRequest { parent: NodeId, child: NodeId },
    /// The operation requires an element.
    NotAnElement(NodeId),
    /// The node isn't a child of the given parent.
    NotFound { parent: NodeId, child: NodeId },
}

impl std::error::Error for DomError {}

impl Display for DomError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DomError::HierarchyRequest { parent, child } => {
                write!(f, "can't insert node {} under node {}", child.0, parent.0)
            }
            DomError::NotAnElement(id) => write!(f, "node {} is not an element", id.0),
            DomError::NotFound { parent, child } => {
                write!(f, "node {} is not a child of node {}", child.0, parent.0)
            }
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a document that contains only its document node.
    pub fn new() -> Self {
        Self {
            id: DocumentId::next(),
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
            }],
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// The document node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Gets a navigable reference to a node.
    ///
    /// Panics if the id didn't come from this document.
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        assert!(id.0 < self.nodes.len(), "node {} is not in this document", id.0);
        NodeRef::new(self, id)
    }

    /// Like [`Self::node`], but returns `None` for an id that isn't in this document.
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id.0 < self.nodes.len()).then(|| NodeRef::new(self, id))
    }

    /// Turns a handle back into a [`NodeRef`], or `None` if the handle came from a different document.
    pub fn resolve(&self, handle: NodeHandle) -> Option<NodeRef<'_>> {
        if handle.document != self.id {
            return None;
        }
        self.get(handle.node)
    }

    /// Iterates over every node in the document, attached or not, in creation order.
    pub fn all_nodes(&self) -> impl Iterator<Item = NodeRef<'_>> {
        (0..self.nodes.len()).map(|idx| NodeRef::new(self, NodeId(idx)))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push(NodeData::Element(Element::new(name)))
    }

    pub fn create_text_node(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Comment(text.to_string()))
    }

    /// Appends `child` as the last child of `parent`, first detaching it from its current parent if it has one.
    ///
    /// Fails without changing anything if `parent` can't have children, if `child` is the document node, or if `child`
    /// is `parent` or one of its ancestors.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, DomError> {
        let hierarchy_err = || DomError::HierarchyRequest { parent, child };
        if !matches!(self.nodes[parent.0].data, NodeData::Document | NodeData::Element(_)) {
            return Err(hierarchy_err());
        }
        if matches!(self.nodes[child.0].data, NodeData::Document) {
            return Err(hierarchy_err());
        }
        if self.node(child).contains(self.node(parent)) {
            return Err(hierarchy_err());
        }
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(child)
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, DomError> {
        if self.nodes[child.0].parent != Some(parent) {
            return Err(DomError::NotFound { parent, child });
        }
        self.detach(child);
        Ok(child)
    }

    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.element_mut(element)?.set_attribute(name, value);
        Ok(())
    }

    /// Removes the attribute, returning whether it was there.
    pub fn remove_attribute(&mut self, element: NodeId, name: &str) -> Result<bool, DomError> {
        Ok(self.element_mut(element)?.remove_attribute(name))
    }

    /// Shorthand for setting the `class` attribute.
    pub fn set_class_name(&mut self, element: NodeId, classes: &str) -> Result<(), DomError> {
        self.set_attribute(element, "class", classes)
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut Element, DomError> {
        match &mut self.nodes[id.0].data {
            NodeData::Element(element) => Ok(element),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(old_parent) = self.nodes[child.0].parent.take() {
            self.nodes[old_parent.0].children.retain(|c| *c != child);
        }
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }
}
