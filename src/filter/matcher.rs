use crate::dom::NodeRef;
use crate::filter::Filter;
use crate::select::SelectorList;
use tracing::{debug, trace};

/// Whether a pointer interaction on `event_target` may start, given an `allow_from` filter.
///
/// - An event target that isn't an element (a text node, say) is never allowed, whatever the filter.
/// - [`Filter::None`] allows everything else.
/// - Otherwise, the interaction is allowed iff the filter is satisfied (see [`Filter`]'s variants).
pub fn test_allow(filter: &Filter, reference: NodeRef<'_>, event_target: NodeRef<'_>) -> bool {
    let result = evaluate(filter, reference, event_target).unwrap_or(true);
    debug!("allow_from {filter:?} for {event_target:?} within {reference:?}: {result}");
    result
}

/// Whether a pointer interaction on `event_target` should be ignored, given an `ignore_from` filter.
///
/// Like [`test_allow`], an event target that isn't an element yields `false`. Note that this means "don't ignore";
/// callers that combine the two checks still reject non-elements, because [`test_allow`] rejects them too.
/// [`Filter::None`] ignores nothing.
pub fn test_ignore(filter: &Filter, reference: NodeRef<'_>, event_target: NodeRef<'_>) -> bool {
    let result = evaluate(filter, reference, event_target).unwrap_or(false);
    debug!("ignore_from {filter:?} for {event_target:?} within {reference:?}: {result}");
    result
}

/// Walks from `element` up through its ancestor elements, and returns whether any of them match `selector`.
///
/// The walk includes `element` itself, and stops after `limit` has been tested; nothing above `limit` is considered.
/// If `limit` isn't actually an ancestor, the walk continues until it runs out of parent elements.
pub fn matches_up_to(element: NodeRef<'_>, selector: &SelectorList, limit: NodeRef<'_>) -> bool {
    let mut current = Some(element);
    while let Some(node) = current {
        let matched = selector.matches(node);
        trace!("{selector} against {node:?}: {matched}");
        if matched {
            return true;
        }
        if node == limit {
            break;
        }
        current = node.parent_element();
    }
    false
}

/// `Some(satisfied)` for a filter that's present, `None` for [`Filter::None`]. Non-element targets are always
/// `Some(false)`.
fn evaluate(filter: &Filter, reference: NodeRef<'_>, event_target: NodeRef<'_>) -> Option<bool> {
    if !event_target.is_element() {
        trace!("{event_target:?} is not an element");
        return Some(false);
    }
    match filter {
        Filter::None => None,
        Filter::Selector(selector) => Some(matches_up_to(event_target, selector, reference)),
        Filter::Node(handle) => {
            let contains = event_target
                .document()
                .resolve(*handle)
                .is_some_and(|node| node.contains(event_target));
            Some(contains)
        }
        Filter::Predicate(predicate) => Some(predicate(reference, event_target)),
    }
}
