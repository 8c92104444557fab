use crate::query::pest::Rule;
use crate::query::traversal::{ByRule, OneOf, Present};
use crate::query::{DetachedSpan, Pair, ParseError, Query};
use crate::select::{
    AttributeCondition, AttributeOperator, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    NthSelector, PseudoClass, SelectorList, SubclassSelector, TypeSelector,
};

impl SelectorList {
    pub(crate) fn try_parse(value: &str) -> Result<Self, ParseError> {
        let parsed = Query::parse(value)?;
        // ByRule doesn't descend into a match, so this only finds the top-level list, not ones within :not(...) etc.
        let mut top_list = OneOf::default();
        for list in ByRule::new(Rule::selector_list).find_all_in(parsed) {
            top_list.store(list);
        }
        match top_list.take() {
            Ok(Some(list)) => Self::from_pair(list),
            Ok(None) => Err(ParseError::other(DetachedSpan::default(), "no selector found")),
            Err(msg) => Err(ParseError::other(DetachedSpan::default(), msg)),
        }
    }

    fn from_pair(pair: Pair) -> Result<Self, ParseError> {
        let selectors = pair
            .into_inner()
            .filter(|p| p.as_rule() == Rule::complex_selector)
            .map(ComplexSelector::from_pair)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { selectors })
    }
}

impl ComplexSelector {
    fn from_pair(pair: Pair) -> Result<Self, ParseError> {
        let mut compounds = Vec::new();
        let mut combinators = Vec::new();
        for child in pair.into_inner() {
            match child.as_rule() {
                Rule::compound_selector => compounds.push(CompoundSelector::from_pair(child)?),
                Rule::combinator_descendant => combinators.push(Combinator::Descendant),
                Rule::combinator_child => combinators.push(Combinator::Child),
                Rule::combinator_next_sibling => combinators.push(Combinator::NextSibling),
                Rule::combinator_subsequent_sibling => combinators.push(Combinator::SubsequentSibling),
                _ => {}
            }
        }
        Ok(Self { compounds, combinators })
    }
}

impl CompoundSelector {
    fn from_pair(pair: Pair) -> Result<Self, ParseError> {
        let mut compound = CompoundSelector::default();
        for child in pair.into_inner() {
            match child.as_rule() {
                Rule::type_selector => {
                    let type_selector = match child.into_inner().next() {
                        Some(named) if named.as_rule() == Rule::ident => {
                            TypeSelector::Named(unescape(named.as_str()).to_ascii_lowercase())
                        }
                        _ => TypeSelector::Universal,
                    };
                    compound.type_selector = Some(type_selector);
                }
                Rule::id_selector => compound.subclasses.push(SubclassSelector::Id(inner_ident(child))),
                Rule::class_selector => compound.subclasses.push(SubclassSelector::Class(inner_ident(child))),
                Rule::attribute_selector => compound
                    .subclasses
                    .push(SubclassSelector::Attribute(AttributeSelector::from_pair(child)?)),
                Rule::pseudo_class => compound
                    .subclasses
                    .push(SubclassSelector::Pseudo(PseudoClass::from_pair(child)?)),
                _ => {}
            }
        }
        Ok(compound)
    }
}

impl AttributeSelector {
    fn from_pair(pair: Pair) -> Result<Self, ParseError> {
        let span = DetachedSpan::from(&pair);
        let to_parse_error = |msg: String| ParseError::other(span, msg);

        let mut name = OneOf::default();
        let mut operator = OneOf::default();
        let mut value = OneOf::default();
        let mut case_insensitive = Present::default();
        for child in pair.into_inner() {
            match child.as_rule() {
                Rule::attr_name => name.store(child.as_str().to_string()),
                Rule::attr_operator => operator.store(match child.as_str() {
                    "~=" => AttributeOperator::Includes,
                    "|=" => AttributeOperator::DashMatch,
                    "^=" => AttributeOperator::Prefix,
                    "$=" => AttributeOperator::Suffix,
                    "*=" => AttributeOperator::Substring,
                    _ => AttributeOperator::Equals,
                }),
                Rule::attr_value => value.store(attr_value_text(child)),
                Rule::attr_modifier => {
                    if child.as_str().eq_ignore_ascii_case("i") {
                        case_insensitive.store();
                    }
                }
                _ => {}
            }
        }

        let Some(name) = name.take().map_err(to_parse_error)? else {
            return Err(ParseError::other(span, "attribute selector needs a name"));
        };
        let condition = match (operator.take().map_err(to_parse_error)?, value.take().map_err(to_parse_error)?) {
            (Some(operator), Some(value)) => Some(AttributeCondition {
                operator,
                value,
                case_sensitive: !case_insensitive.is_present(),
            }),
            _ => None,
        };
        Ok(Self {
            name: unescape(&name).to_ascii_lowercase(),
            condition,
        })
    }
}

impl PseudoClass {
    fn from_pair(pair: Pair) -> Result<Self, ParseError> {
        let span = DetachedSpan::from(&pair);
        let Some(inner) = pair.into_inner().next() else {
            return Err(ParseError::other(span, "expected a pseudo-class"));
        };
        match inner.as_rule() {
            Rule::pseudo_not => Ok(Self::Not(inner_selector_list(inner)?)),
            Rule::pseudo_is => Ok(Self::Is(inner_selector_list(inner)?)),
            Rule::pseudo_where => Ok(Self::Where(inner_selector_list(inner)?)),
            Rule::pseudo_nth => Ok(Self::Nth(NthSelector::from_pair(inner)?)),
            _ => {
                let name = unescape(inner.as_str()).to_ascii_lowercase();
                match name.as_str() {
                    "first-child" => Ok(Self::FirstChild),
                    "last-child" => Ok(Self::LastChild),
                    "only-child" => Ok(Self::OnlyChild),
                    "first-of-type" => Ok(Self::FirstOfType),
                    "last-of-type" => Ok(Self::LastOfType),
                    "only-of-type" => Ok(Self::OnlyOfType),
                    "empty" => Ok(Self::Empty),
                    "root" => Ok(Self::Root),
                    "scope" => Ok(Self::Scope),
                    _ => Err(ParseError::other(span, format!("unknown pseudo-class :{name}"))),
                }
            }
        }
    }
}

impl NthSelector {
    fn from_pair(pair: Pair) -> Result<Self, ParseError> {
        let span = DetachedSpan::from(&pair);
        let out_of_range = || ParseError::other(span, "number out of range");

        let mut of_type = false;
        let mut from_end = false;
        let mut step_offset = (0, 0);
        for child in pair.into_inner() {
            match child.as_rule() {
                Rule::pseudo_nth_name => {
                    let name = child.as_str().to_ascii_lowercase();
                    of_type = name.ends_with("-of-type");
                    from_end = name.starts_with("nth-last-");
                }
                Rule::nth => {
                    let Some(form) = child.into_inner().next() else {
                        continue;
                    };
                    step_offset = match form.as_rule() {
                        Rule::nth_odd => (2, 1),
                        Rule::nth_even => (2, 0),
                        Rule::nth_b => (0, form.as_str().parse().map_err(|_| out_of_range())?),
                        _ => {
                            let mut step = 1;
                            let mut negative_offset = false;
                            let mut offset = 0;
                            for part in form.into_inner() {
                                match (part.as_rule(), part.as_str()) {
                                    (Rule::nth_a, "" | "+") => step = 1,
                                    (Rule::nth_a, "-") => step = -1,
                                    (Rule::nth_a, digits) => step = digits.parse().map_err(|_| out_of_range())?,
                                    (Rule::nth_sign, sign) => negative_offset = sign == "-",
                                    (Rule::nth_offset, digits) => {
                                        offset = digits.parse().map_err(|_| out_of_range())?
                                    }
                                    _ => {}
                                }
                            }
                            (step, if negative_offset { -offset } else { offset })
                        }
                    };
                }
                _ => {}
            }
        }
        let (step, offset) = step_offset;
        Ok(Self {
            step,
            offset,
            of_type,
            from_end,
        })
    }
}

fn inner_selector_list(pair: Pair) -> Result<SelectorList, ParseError> {
    let span = DetachedSpan::from(&pair);
    match pair.into_inner().find(|p| p.as_rule() == Rule::selector_list) {
        Some(list) => SelectorList::from_pair(list),
        None => Err(ParseError::other(span, "expected a selector list")),
    }
}

fn inner_ident(pair: Pair) -> String {
    pair.into_inner()
        .find(|p| p.as_rule() == Rule::ident)
        .map(|p| unescape(p.as_str()))
        .unwrap_or_default()
}

fn attr_value_text(pair: Pair) -> String {
    let Some(value) = pair.into_inner().next() else {
        return String::new();
    };
    match value.as_rule() {
        Rule::quoted_string => value.into_inner().next().map(|p| unescape(p.as_str())).unwrap_or_default(),
        _ => unescape(value.as_str()),
    }
}

/// Resolves CSS escapes: `\` followed by 1-6 hex digits (plus one optional whitespace), an escaped newline (which is
/// dropped), or any other single character.
fn unescape(text: &str) -> String {
    if !text.contains('\\') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let mut hex = String::with_capacity(6);
        while hex.len() < 6 {
            match chars.peek() {
                Some(c) if c.is_ascii_hexdigit() => {
                    hex.push(*c);
                    chars.next();
                }
                _ => break,
            }
        }
        if hex.is_empty() {
            match chars.next() {
                Some('\r') => {
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                }
                Some('\n' | '\x0C') => {}
                Some(other) => out.push(other),
                None => out.push(char::REPLACEMENT_CHARACTER),
            }
            continue;
        }
        let code_point = u32::from_str_radix(&hex, 16).unwrap_or(0);
        let decoded = match code_point {
            0 => char::REPLACEMENT_CHARACTER,
            cp => char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER),
        };
        out.push(decoded);
        if matches!(chars.peek(), Some(' ' | '\t' | '\n' | '\r' | '\x0C')) {
            chars.next();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::utils_for_test::*;

    fn parse(text: &str) -> SelectorList {
        match SelectorList::try_from(text) {
            Ok(list) => list,
            Err(err) => panic!("{}", err.to_string(text)),
        }
    }

    fn only_compound(text: &str) -> CompoundSelector {
        let list = parse(text);
        let complex = get_only(list.selectors);
        get_only(complex.compounds)
    }

    #[test]
    fn class_selector() {
        assert_eq!(
            only_compound(".ignore-class"),
            CompoundSelector {
                type_selector: None,
                subclasses: vec![SubclassSelector::Class("ignore-class".to_string())],
            }
        );
    }

    #[test]
    fn type_is_lowercased_but_class_and_id_are_not() {
        assert_eq!(
            only_compound("DIV#Main.Drag-Handle"),
            CompoundSelector {
                type_selector: Some(TypeSelector::Named("div".to_string())),
                subclasses: vec![
                    SubclassSelector::Id("Main".to_string()),
                    SubclassSelector::Class("Drag-Handle".to_string()),
                ],
            }
        );
    }

    #[test]
    fn combinators_in_order() {
        let complex = get_only(parse("a b>c + d~e").selectors);
        assert_eq!(complex.compounds.len(), 5);
        assert_eq!(
            complex.combinators,
            vec![
                Combinator::Descendant,
                Combinator::Child,
                Combinator::NextSibling,
                Combinator::SubsequentSibling,
            ]
        );
    }

    #[test]
    fn selector_list() {
        let list = parse(".a, .b ,.c");
        assert_eq!(list.selectors.len(), 3);
    }

    #[test]
    fn attribute_presence() {
        let compound = only_compound("[Data-Allow]");
        unwrap!(get_only(compound.subclasses), SubclassSelector::Attribute(attr));
        assert_eq!(
            attr,
            AttributeSelector {
                name: "data-allow".to_string(),
                condition: None,
            }
        );
    }

    #[test]
    fn attribute_operators() {
        let cases = [
            ("[a=x]", AttributeOperator::Equals),
            ("[a~=x]", AttributeOperator::Includes),
            ("[a|=x]", AttributeOperator::DashMatch),
            ("[a^=x]", AttributeOperator::Prefix),
            ("[a$=x]", AttributeOperator::Suffix),
            ("[a*=x]", AttributeOperator::Substring),
        ];
        for (text, expected) in cases {
            let compound = only_compound(text);
            unwrap!(get_only(compound.subclasses), SubclassSelector::Attribute(attr));
            unwrap!(attr.condition, Some(condition));
            assert_eq!(condition.operator, expected, "{text}");
            assert_eq!(condition.value, "x");
            assert!(condition.case_sensitive);
        }
    }

    #[test]
    fn attribute_quoted_with_flag() {
        let compound = only_compound(r#"[data-role="Ad\"min" i]"#);
        unwrap!(get_only(compound.subclasses), SubclassSelector::Attribute(attr));
        assert_eq!(
            attr.condition,
            Some(AttributeCondition {
                operator: AttributeOperator::Equals,
                value: "Ad\"min".to_string(),
                case_sensitive: false,
            })
        );
    }

    #[test]
    fn attribute_empty_string() {
        let compound = only_compound("[title='']");
        unwrap!(get_only(compound.subclasses), SubclassSelector::Attribute(attr));
        unwrap!(attr.condition, Some(condition));
        assert_eq!(condition.value, "");
    }

    #[test]
    fn escapes() {
        assert_eq!(
            only_compound(r".a\:b.\31 0x"),
            CompoundSelector {
                type_selector: None,
                subclasses: vec![
                    SubclassSelector::Class("a:b".to_string()),
                    SubclassSelector::Class("10x".to_string()),
                ],
            }
        );
        assert_eq!(unescape(r"\000"), "\u{FFFD}");
        assert_eq!(unescape("plain"), "plain");
    }

    #[test]
    fn nested_lists() {
        let compound = only_compound("input:not([type=hidden], .skip)");
        unwrap!(&compound.subclasses[0], SubclassSelector::Pseudo(PseudoClass::Not(list)));
        assert_eq!(list.selectors.len(), 2);
    }

    #[test]
    fn nth_forms() {
        let cases = [
            ("li:nth-child(odd)", 2, 1, false, false),
            ("li:nth-child(EVEN)", 2, 0, false, false),
            ("li:nth-child(3)", 0, 3, false, false),
            ("li:nth-child(+3)", 0, 3, false, false),
            ("li:nth-last-child(n)", 1, 0, true, false),
            ("li:nth-of-type(-n + 3)", -1, 3, false, true),
            ("li:nth-last-of-type(2n-1)", 2, -1, true, true),
            ("li:nth-child(-2n+10)", -2, 10, false, false),
        ];
        for (text, step, offset, from_end, of_type) in cases {
            let compound = only_compound(text);
            unwrap!(get_only(compound.subclasses), SubclassSelector::Pseudo(PseudoClass::Nth(nth)));
            assert_eq!(
                nth,
                NthSelector {
                    step,
                    offset,
                    of_type,
                    from_end
                },
                "{text}"
            );
        }
    }

    #[test]
    fn simple_pseudo_classes() {
        let compound = only_compound(":first-child:LAST-CHILD:only-child:first-of-type:last-of-type:only-of-type:empty:root:scope");
        let pseudos: Vec<_> = compound
            .subclasses
            .into_iter()
            .map(|s| match s {
                SubclassSelector::Pseudo(p) => p,
                other => panic!("{other:?}"),
            })
            .collect();
        assert_eq!(
            pseudos,
            vec![
                PseudoClass::FirstChild,
                PseudoClass::LastChild,
                PseudoClass::OnlyChild,
                PseudoClass::FirstOfType,
                PseudoClass::LastOfType,
                PseudoClass::OnlyOfType,
                PseudoClass::Empty,
                PseudoClass::Root,
                PseudoClass::Scope,
            ]
        );
    }

    #[test]
    fn unknown_pseudo_class() {
        let text = "span:hovr";
        let err = SelectorList::try_from(text).unwrap_err();
        assert_eq!(ToString::to_string(&err), "unknown pseudo-class :hovr");
        assert_eq!(
            err.to_string(text),
            indoc::indoc! {r#"
                 --> 1:5
                  |
                1 | span:hovr
                  |     ^---^
                  |
                  = unknown pseudo-class :hovr"#}
        );
    }

    #[test]
    fn nth_out_of_range() {
        let err = SelectorList::try_from("li:nth-child(99999999999)").unwrap_err();
        assert_eq!(ToString::to_string(&err), "number out of range");
    }

    #[test]
    fn syntax_error_is_pest() {
        let err = SelectorList::try_from(".").unwrap_err();
        unwrap!(err.inner, crate::query::InnerParseError::Pest(_));
    }
}
