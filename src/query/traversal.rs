use crate::query::pest::Rule;
use crate::query::{Pair, Pairs};

/// Finds pairs by rule, searching depth-first but not descending into a pair once it matches.
#[derive(Debug, Copy, Clone)]
pub struct ByRule {
    rule: Rule,
}

impl ByRule {
    pub fn new(rule: Rule) -> Self {
        Self { rule }
    }

    pub fn matches(&self, pair: &Pair) -> bool {
        pair.as_rule() == self.rule
    }

    pub fn find_all_in<'a>(&self, pairs: Pairs<'a>) -> Vec<Pair<'a>> {
        let mut found = Vec::new();
        self.find_into(pairs, &mut found);
        found
    }

    fn find_into<'a>(&self, pairs: Pairs<'a>, found: &mut Vec<Pair<'a>>) {
        for pair in pairs {
            if self.matches(&pair) {
                found.push(pair);
            } else {
                self.find_into(pair.into_inner(), found);
            }
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct Present(bool);

impl Present {
    pub fn is_present(&self) -> bool {
        self.0
    }

    pub fn store(&mut self) {
        self.0 = true
    }
}

/// Holds at most one item; storing a second one is an error that surfaces on [`OneOf::take`].
#[derive(Debug)]
pub struct OneOf<T>(Result<Option<T>, ()>);

impl<T> Default for OneOf<T> {
    fn default() -> Self {
        Self(Ok(None))
    }
}

impl<T> OneOf<T> {
    pub fn take(self) -> Result<Option<T>, String> {
        self.0.map_err(|_| "multiple items found".to_string())
    }

    pub fn store(&mut self, item: T) {
        self.0 = match self.0 {
            Ok(Some(_)) | Err(_) => Err(()),
            Ok(None) => Ok(Some(item)),
        }
    }
}
