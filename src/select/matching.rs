use crate::dom::{NodeData, NodeRef};
use crate::select::{
    AttributeCondition, AttributeOperator, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    NthSelector, PseudoClass, SelectorList, SubclassSelector, TypeSelector,
};

/// What the selector is being evaluated relative to: the element `matches` was originally called on, which is what
/// `:scope` refers to.
#[derive(Copy, Clone)]
struct MatchContext<'a> {
    scope: NodeRef<'a>,
}

impl SelectorList {
    /// Whether the element matches any selector in this list, the way the DOM's `Element.matches` does.
    ///
    /// Non-elements never match. Matching only looks at parent and sibling links, so it works the same whether or not
    /// the element is attached to its document's root.
    pub fn matches(&self, element: NodeRef<'_>) -> bool {
        if !element.is_element() {
            return false;
        }
        let ctx = MatchContext { scope: element };
        self.matches_in(&ctx, element)
    }

    fn matches_in(&self, ctx: &MatchContext, element: NodeRef<'_>) -> bool {
        self.selectors.iter().any(|selector| selector.matches_in(ctx, element))
    }
}

impl ComplexSelector {
    fn matches_in(&self, ctx: &MatchContext, element: NodeRef<'_>) -> bool {
        match self.compounds.len() {
            0 => false,
            len => self.matches_at(ctx, element, len - 1),
        }
    }

    /// Matches right to left: `compounds[idx]` against `element`, then whatever `combinators[idx - 1]` says about the
    /// rest of the chain. Descendant and subsequent-sibling combinators try every candidate, so a failed branch
    /// further left backtracks into the next one.
    fn matches_at(&self, ctx: &MatchContext, element: NodeRef<'_>, idx: usize) -> bool {
        if !self.compounds[idx].matches_in(ctx, element) {
            return false;
        }
        if idx == 0 {
            return true;
        }
        let next_idx = idx - 1;
        match self.combinators.get(next_idx).copied().unwrap_or(Combinator::Descendant) {
            Combinator::Child => element
                .parent_element()
                .is_some_and(|parent| self.matches_at(ctx, parent, next_idx)),
            Combinator::Descendant => element
                .ancestors()
                .any(|ancestor| self.matches_at(ctx, ancestor, next_idx)),
            Combinator::NextSibling => element
                .previous_element_sibling()
                .is_some_and(|sibling| self.matches_at(ctx, sibling, next_idx)),
            Combinator::SubsequentSibling => element
                .preceding_element_siblings()
                .any(|sibling| self.matches_at(ctx, sibling, next_idx)),
        }
    }
}

impl CompoundSelector {
    fn matches_in(&self, ctx: &MatchContext, element: NodeRef<'_>) -> bool {
        let Some(local_name) = element.local_name() else {
            return false;
        };
        let type_matches = match &self.type_selector {
            None | Some(TypeSelector::Universal) => true,
            Some(TypeSelector::Named(name)) => name.eq_ignore_ascii_case(local_name),
        };
        type_matches && self.subclasses.iter().all(|s| s.matches_in(ctx, element))
    }
}

impl SubclassSelector {
    fn matches_in(&self, ctx: &MatchContext, element: NodeRef<'_>) -> bool {
        let Some(data) = element.as_element() else {
            return false;
        };
        match self {
            SubclassSelector::Id(id) => data.id() == Some(id.as_str()),
            SubclassSelector::Class(class) => data.has_class(class),
            SubclassSelector::Attribute(attr) => attr.matches_value(data.get_attribute(&attr.name)),
            SubclassSelector::Pseudo(pseudo) => pseudo.matches_in(ctx, element),
        }
    }
}

impl AttributeSelector {
    fn matches_value(&self, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match &self.condition {
            None => true,
            Some(condition) => condition.matches(value),
        }
    }
}

impl AttributeCondition {
    fn matches(&self, actual: &str) -> bool {
        let (actual, expected) = if self.case_sensitive {
            (actual.to_string(), self.value.clone())
        } else {
            (actual.to_ascii_lowercase(), self.value.to_ascii_lowercase())
        };
        match self.operator {
            AttributeOperator::Equals => actual == expected,
            AttributeOperator::Includes => {
                !expected.is_empty()
                    && !expected.contains(|ch: char| ch.is_ascii_whitespace())
                    && actual
                        .split(|ch: char| ch.is_ascii_whitespace())
                        .any(|word| word == expected)
            }
            AttributeOperator::DashMatch => {
                actual == expected
                    || actual
                        .strip_prefix(expected.as_str())
                        .is_some_and(|rest| rest.starts_with('-'))
            }
            AttributeOperator::Prefix => !expected.is_empty() && actual.starts_with(expected.as_str()),
            AttributeOperator::Suffix => !expected.is_empty() && actual.ends_with(expected.as_str()),
            AttributeOperator::Substring => !expected.is_empty() && actual.contains(expected.as_str()),
        }
    }
}

impl PseudoClass {
    fn matches_in(&self, ctx: &MatchContext, element: NodeRef<'_>) -> bool {
        match self {
            PseudoClass::Not(list) => !list.matches_in(ctx, element),
            PseudoClass::Is(list) | PseudoClass::Where(list) => list.matches_in(ctx, element),
            PseudoClass::FirstChild => element.previous_element_sibling().is_none() && has_element_parent(element),
            PseudoClass::LastChild => element.next_element_sibling().is_none() && has_element_parent(element),
            PseudoClass::OnlyChild => {
                element.previous_element_sibling().is_none()
                    && element.next_element_sibling().is_none()
                    && has_element_parent(element)
            }
            PseudoClass::FirstOfType => same_type_position(element, false) == Some(1),
            PseudoClass::LastOfType => same_type_position(element, true) == Some(1),
            PseudoClass::OnlyOfType => {
                same_type_position(element, false) == Some(1) && same_type_position(element, true) == Some(1)
            }
            PseudoClass::Empty => element.children().all(|child| match child.data() {
                NodeData::Element(_) => false,
                NodeData::Text(text) => text.is_empty(),
                NodeData::Comment(_) | NodeData::Document => true,
            }),
            PseudoClass::Root => element
                .parent_node()
                .is_some_and(|parent| matches!(parent.data(), NodeData::Document)),
            PseudoClass::Scope => element == ctx.scope,
            PseudoClass::Nth(nth) => nth.matches(element),
        }
    }
}

impl NthSelector {
    fn matches(&self, element: NodeRef<'_>) -> bool {
        if !has_element_parent(element) {
            return false;
        }
        let position = if self.of_type {
            same_type_position(element, self.from_end)
        } else {
            let preceding = if self.from_end {
                element.following_element_siblings().count()
            } else {
                element.preceding_element_siblings().count()
            };
            Some(preceding + 1)
        };
        match position.and_then(|p| i32::try_from(p).ok()) {
            Some(position) => self.accepts(position),
            None => false,
        }
    }
}

/// Structural pseudo-classes only apply to elements that have a parent; in browsers, that's any element other than the
/// root or a detached subtree's top.
fn has_element_parent(element: NodeRef<'_>) -> bool {
    element.parent_node().is_some()
}

/// 1-based position among siblings with the same element name, counting from the start or the end.
fn same_type_position(element: NodeRef<'_>, from_end: bool) -> Option<usize> {
    if !has_element_parent(element) {
        return None;
    }
    let name = element.local_name()?;
    let same_type = |sibling: &NodeRef<'_>| sibling.local_name() == Some(name);
    let before = if from_end {
        element.following_element_siblings().filter(same_type).count()
    } else {
        element.preceding_element_siblings().filter(same_type).count()
    };
    Some(before + 1)
}
