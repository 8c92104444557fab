use crate::dom::NodeRef;
use crate::select::SelectorList;
use tracing::trace;

impl SelectorList {
    /// Every element under `root` (not including `root` itself) that matches, in document order.
    ///
    /// This is the equivalent of the DOM's `querySelectorAll`.
    pub fn query_all<'a>(&self, root: NodeRef<'a>) -> Vec<NodeRef<'a>> {
        let found: Vec<_> = root.descendants().filter(|node| self.matches(*node)).collect();
        trace!("{} matched {} node(s) under {}", self, found.len(), root.describe());
        found
    }

    /// The first element under `root` (in document order) that matches, like the DOM's `querySelector`.
    pub fn query_first<'a>(&self, root: NodeRef<'a>) -> Option<NodeRef<'a>> {
        root.descendants().find(|node| self.matches(*node))
    }
}
