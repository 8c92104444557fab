use crate::query::ParseError;
use std::fmt::{Display, Formatter, Write};

/// A comma-separated list of complex selectors, like `.handle, [data-draggable] > span`.
///
/// An element matches the list if it matches any of its selectors. This is the in-memory form of the string you'd
/// pass to the DOM's `Element.matches`; build one with [`TryFrom<&str>`](SelectorList#impl-TryFrom<%26str>-for-SelectorList).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

/// A chain of compound selectors joined by combinators: `div.a > span ~ em`.
///
/// `compounds` and `combinators` are in source order, and `combinators[i]` sits between `compounds[i]` and
/// `compounds[i + 1]`. The last compound is the subject: the element that's actually being matched.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComplexSelector {
    pub compounds: Vec<CompoundSelector>,
    pub combinators: Vec<Combinator>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
    /// `a + b`
    NextSibling,
    /// `a ~ b`
    SubsequentSibling,
}

/// Simple selectors with no combinators between them: `span.handle[data-x]:first-child`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct CompoundSelector {
    pub type_selector: Option<TypeSelector>,
    pub subclasses: Vec<SubclassSelector>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeSelector {
    /// `*`
    Universal,
    /// `div`, stored lowercased.
    Named(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SubclassSelector {
    /// `#id`
    Id(String),
    /// `.class`
    Class(String),
    /// `[attr]`, `[attr=value]`, etc
    Attribute(AttributeSelector),
    /// `:first-child`, `:not(...)`, etc
    Pseudo(PseudoClass),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AttributeSelector {
    /// The attribute name, stored lowercased.
    pub name: String,
    /// `None` for a bare `[attr]` presence check.
    pub condition: Option<AttributeCondition>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AttributeCondition {
    pub operator: AttributeOperator,
    pub value: String,
    /// `false` if the selector had an `i` flag, like `[type=text i]`.
    pub case_sensitive: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AttributeOperator {
    /// `[a=v]`
    Equals,
    /// `[a~=v]`: whitespace-separated list containing `v`
    Includes,
    /// `[a|=v]`: exactly `v`, or starting with `v-`
    DashMatch,
    /// `[a^=v]`
    Prefix,
    /// `[a$=v]`
    Suffix,
    /// `[a*=v]`
    Substring,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PseudoClass {
    Not(SelectorList),
    Is(SelectorList),
    Where(SelectorList),
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    Empty,
    Root,
    /// The element that `matches` was called on.
    Scope,
    Nth(NthSelector),
}

/// `:nth-child(An+B)` and its three siblings.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NthSelector {
    pub step: i32,
    pub offset: i32,
    /// Count only siblings with the same element name (`-of-type`).
    pub of_type: bool,
    /// Count from the last sibling (`nth-last-`).
    pub from_end: bool,
}

impl NthSelector {
    /// Whether a 1-based position fits `An+B` for some non-negative `n`.
    pub fn accepts(&self, position: i32) -> bool {
        // Widened so that offsets and steps near the i32 bounds can't overflow.
        let diff = i64::from(position) - i64::from(self.offset);
        let step = i64::from(self.step);
        if step == 0 {
            return diff == 0;
        }
        diff % step == 0 && diff / step >= 0
    }
}

impl TryFrom<&'_ str> for SelectorList {
    type Error = ParseError;

    fn try_from(value: &'_ str) -> Result<Self, Self::Error> {
        SelectorList::try_parse(value)
    }
}

impl TryFrom<&'_ String> for SelectorList {
    type Error = ParseError;

    fn try_from(value: &'_ String) -> Result<Self, Self::Error> {
        SelectorList::try_from(value.as_str())
    }
}

impl Display for SelectorList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (idx, selector) in self.selectors.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            Display::fmt(selector, f)?;
        }
        Ok(())
    }
}

impl Display for ComplexSelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (idx, compound) in self.compounds.iter().enumerate() {
            if idx > 0 {
                let combinator = match self.combinators.get(idx - 1) {
                    Some(Combinator::Child) => " > ",
                    Some(Combinator::NextSibling) => " + ",
                    Some(Combinator::SubsequentSibling) => " ~ ",
                    Some(Combinator::Descendant) | None => " ",
                };
                f.write_str(combinator)?;
            }
            Display::fmt(compound, f)?;
        }
        Ok(())
    }
}

impl Display for CompoundSelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.type_selector {
            Some(TypeSelector::Universal) => f.write_char('*')?,
            Some(TypeSelector::Named(name)) => f.write_str(name)?,
            None if self.subclasses.is_empty() => f.write_char('*')?,
            None => {}
        }
        for subclass in &self.subclasses {
            match subclass {
                SubclassSelector::Id(id) => write!(f, "#{id}")?,
                SubclassSelector::Class(class) => write!(f, ".{class}")?,
                SubclassSelector::Attribute(attr) => Display::fmt(attr, f)?,
                SubclassSelector::Pseudo(pseudo) => Display::fmt(pseudo, f)?,
            }
        }
        Ok(())
    }
}

impl Display for AttributeSelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}", self.name)?;
        if let Some(condition) = &self.condition {
            let op = match condition.operator {
                AttributeOperator::Equals => "=",
                AttributeOperator::Includes => "~=",
                AttributeOperator::DashMatch => "|=",
                AttributeOperator::Prefix => "^=",
                AttributeOperator::Suffix => "$=",
                AttributeOperator::Substring => "*=",
            };
            write!(f, "{op}{:?}", condition.value)?;
            if !condition.case_sensitive {
                f.write_str(" i")?;
            }
        }
        f.write_char(']')
    }
}

impl Display for PseudoClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PseudoClass::Not(list) => write!(f, ":not({list})"),
            PseudoClass::Is(list) => write!(f, ":is({list})"),
            PseudoClass::Where(list) => write!(f, ":where({list})"),
            PseudoClass::FirstChild => f.write_str(":first-child"),
            PseudoClass::LastChild => f.write_str(":last-child"),
            PseudoClass::OnlyChild => f.write_str(":only-child"),
            PseudoClass::FirstOfType => f.write_str(":first-of-type"),
            PseudoClass::LastOfType => f.write_str(":last-of-type"),
            PseudoClass::OnlyOfType => f.write_str(":only-of-type"),
            PseudoClass::Empty => f.write_str(":empty"),
            PseudoClass::Root => f.write_str(":root"),
            PseudoClass::Scope => f.write_str(":scope"),
            PseudoClass::Nth(nth) => {
                let name = match (nth.from_end, nth.of_type) {
                    (false, false) => "nth-child",
                    (true, false) => "nth-last-child",
                    (false, true) => "nth-of-type",
                    (true, true) => "nth-last-of-type",
                };
                write!(f, ":{name}({}n{:+})", nth.step, nth.offset)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nth_accepts() {
        let odd = NthSelector {
            step: 2,
            offset: 1,
            of_type: false,
            from_end: false,
        };
        assert!(odd.accepts(1));
        assert!(!odd.accepts(2));
        assert!(odd.accepts(3));

        let first_three = NthSelector { step: -1, offset: 3, ..odd };
        assert!(first_three.accepts(1));
        assert!(first_three.accepts(3));
        assert!(!first_three.accepts(4));

        let exactly_two = NthSelector { step: 0, offset: 2, ..odd };
        assert!(exactly_two.accepts(2));
        assert!(!exactly_two.accepts(4));

        let from_five = NthSelector { step: 1, offset: 5, ..odd };
        assert!(!from_five.accepts(4));
        assert!(from_five.accepts(5));
        assert!(from_five.accepts(50));
    }

    #[test]
    fn nth_accepts_at_integer_bounds() {
        let most_negative = SelectorList::try_from(":nth-child(-2147483648)").unwrap();
        let nth = get_nth(&most_negative);
        assert!(!nth.accepts(1));
        assert!(!nth.accepts(i32::MAX));

        let negative_step = SelectorList::try_from(":nth-child(-n-2147483647)").unwrap();
        let nth = get_nth(&negative_step);
        assert!(!nth.accepts(1));

        let huge_step = NthSelector {
            step: i32::MIN,
            offset: i32::MAX,
            of_type: false,
            from_end: false,
        };
        assert!(huge_step.accepts(i32::MAX));
        assert!(!huge_step.accepts(1));
    }

    fn get_nth(list: &SelectorList) -> NthSelector {
        match list.selectors[0].compounds[0].subclasses.as_slice() {
            [SubclassSelector::Pseudo(PseudoClass::Nth(nth))] => *nth,
            other => panic!("expected a single :nth-* pseudo-class, got {other:?}"),
        }
    }
}
