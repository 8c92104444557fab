use crate::dom::NodeRef;
use crate::filter::{test_allow, test_ignore, Filter};
use derive_builder::Builder;

/// The allow/ignore pair that gates where an interactable's pointer interactions may start.
///
/// ```
/// use nodegate::dom::Document;
/// use nodegate::filter::{Filter, PointerFiltersBuilder};
///
/// let doc = Document::parse(r#"<div id="card"><span class="handle"><input></span></div>"#).unwrap();
/// let filters = PointerFiltersBuilder::default()
///     .allow_from(Filter::selector(".handle").unwrap())
///     .ignore_from(Filter::selector("input").unwrap())
///     .build()
///     .unwrap();
///
/// let card = doc.node(doc.root()).element_children().next().unwrap();
/// let handle = card.element_children().next().unwrap();
/// let input = handle.element_children().next().unwrap();
///
/// assert!(filters.test_ignore_allow(card, handle));
/// assert!(!filters.test_ignore_allow(card, input));
/// assert!(!filters.test_ignore_allow(card, card));
/// ```
#[derive(Clone, Debug, Default, Builder)]
#[builder(default)]
pub struct PointerFilters {
    #[builder(setter(into))]
    pub allow_from: Filter,

    #[builder(setter(into))]
    pub ignore_from: Filter,
}

impl PointerFilters {
    pub fn test_allow(&self, reference: NodeRef<'_>, event_target: NodeRef<'_>) -> bool {
        test_allow(&self.allow_from, reference, event_target)
    }

    pub fn test_ignore(&self, reference: NodeRef<'_>, event_target: NodeRef<'_>) -> bool {
        test_ignore(&self.ignore_from, reference, event_target)
    }

    /// Whether an interaction may start at `event_target`: it must not be ignored, and it must be allowed.
    ///
    /// `ignore_from` is checked first, so an allow-predicate isn't invoked for targets that are ignored anyway.
    pub fn test_ignore_allow(&self, reference: NodeRef<'_>, event_target: NodeRef<'_>) -> bool {
        !self.test_ignore(reference, event_target) && self.test_allow(reference, event_target)
    }
}
