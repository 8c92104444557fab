use pest::Parser;
use pest_derive::Parser;
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;

#[derive(Parser)]
#[grammar = "query/grammar.pest"]
struct QueryPairs;

pub struct Query {
    _private: (),
}

pub(crate) type Pair<'a> = pest::iterators::Pair<'a, Rule>;
pub(crate) type Pairs<'a> = pest::iterators::Pairs<'a, Rule>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Error {
    pub(crate) pest_error: Rc<pest::error::Error<Rule>>,
}

impl Error {
    pub(crate) fn new_from_span(span: pest::Span, message: String) -> Self {
        Self {
            pest_error: Rc::new(pest::error::Error::new_from_span(
                pest::error::ErrorVariant::CustomError { message },
                span,
            )),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.pest_error, f)
    }
}

impl std::error::Error for Error {}

impl From<pest::error::Error<Rule>> for Error {
    fn from(value: pest::error::Error<Rule>) -> Self {
        Self {
            pest_error: Rc::new(value),
        }
    }
}

impl Query {
    pub fn parse(query_text: &str) -> Result<Pairs, Error> {
        QueryPairs::parse(Rule::top, query_text).map_err(Self::format_err)
    }

    fn format_err(err: pest::error::Error<Rule>) -> Error {
        let renamed = err.renamed_rules(|err| {
            match err {
                Rule::EOI => "end of input",
                Rule::top => "valid selector",
                Rule::selector_list => "selector list",
                Rule::complex_selector | Rule::compound_selector => "selector",
                Rule::combinator_child => "_>_",
                Rule::combinator_next_sibling => "_+_",
                Rule::combinator_subsequent_sibling => "_~_",
                Rule::combinator_descendant => "whitespace",
                Rule::type_selector => "type selector",
                Rule::universal => "_*_",
                Rule::id_selector => "_#id_",
                Rule::class_selector => "_.class_",
                Rule::attribute_selector => "_[attribute]_",
                Rule::attr_name => "attribute name",
                Rule::attr_operator => "_=_, _~=_, _|=_, _^=_, _$=_, or _*=_",
                Rule::attr_value => "attribute value",
                Rule::attr_modifier => "_i_ or _s_",
                Rule::pseudo_class => "pseudo-class",
                Rule::pseudo_not => "_:not(…)_",
                Rule::pseudo_is => "_:is(…)_",
                Rule::pseudo_where => "_:where(…)_",
                Rule::pseudo_nth | Rule::pseudo_nth_name => "_:nth-child(…)_",
                Rule::pseudo_simple => "pseudo-class name",
                Rule::nth | Rule::nth_anb | Rule::nth_a | Rule::nth_b => "_An+B_",
                Rule::nth_odd => "_odd_",
                Rule::nth_even => "_even_",
                Rule::nth_sign => "_+_ or _-_",
                Rule::nth_offset => "integer",
                Rule::ident => "identifier",
                Rule::quoted_string => "quoted string",
                Rule::dq_chars | Rule::sq_chars => "character in quoted string",
                Rule::combinator => "combinator",
                Rule::subclass_selector => "_#id_, _.class_, _[attribute]_, or pseudo-class",
                Rule::ident_start | Rule::ident_char | Rule::non_ascii => "identifier character",
                Rule::escape => "escape sequence",
                Rule::newline => "newline",
                Rule::ws => "whitespace",
            }
            .to_string()
            .replace('_', "\"")
        });
        Error {
            pest_error: Rc::new(renamed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts() {
        for ok in [
            "div",
            "*",
            ".a.b#c",
            "div > span + em ~ strong  i",
            "a , b,c",
            " padded ",
            "[data-allow]",
            "[ data-role = 'admin' i ]",
            r#"[title="a \"quoted\" value"]"#,
            "input:not([type=hidden], .skip)",
            ":is(p, div):where(.x)",
            "li:nth-child(2n + 1):nth-last-of-type(-n+3):nth-child(odd):nth-of-type(4)",
            "p:first-child:empty",
            r"\31 23",
            "-foo--bar",
        ] {
            assert!(Query::parse(ok).is_ok(), "{ok:?}: {:?}", Query::parse(ok).err());
        }
    }

    #[test]
    fn rejects() {
        for bad in ["", "   ", "div >", "> div", "a,,b", "[data-allow", ".", "#1", "[a=1]", ":not(", "a b,"] {
            assert!(Query::parse(bad).is_err(), "{bad:?} should have failed");
        }
    }

    #[test]
    fn error_is_renamed() {
        let err = Query::parse("div >").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("selector"), "{message}");
        assert!(!message.contains("compound_selector"), "{message}");
    }
}
