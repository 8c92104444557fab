#[cfg(test)]
pub(crate) use test_utils::*;

// We hide this file's contents from prod by putting them in a submodule guarded by cfg(test), but then "pub use" it to
// export its contents.
#[cfg(test)]
mod test_utils {
    use std::fmt::Debug;

    pub fn get_only<T: Debug, C: IntoIterator<Item = T>>(col: C) -> T {
        let mut iter = col.into_iter();
        let Some(result) = iter.next() else {
            panic!("expected an element, but was empty");
        };
        match iter.next() {
            None => result,
            Some(extra) => {
                let mut all = Vec::new();
                all.push(result);
                all.push(extra);
                all.extend(iter);
                panic!("expected exactly one element, but found {}: {all:?}", all.len());
            }
        }
    }

    /// Turn a pattern match into an `if let ... { else panic! }`.
    macro_rules! unwrap {
        ($enum_value:expr, $enum_variant:pat) => {
            let node = $enum_value;
            let node_debug = format!("{:?}", node);
            let $enum_variant = node else {
                panic!("Expected {} but saw {}", stringify!($enum_variant), node_debug);
            };
        };
    }
    pub(crate) use unwrap;

    /// Defines a pair of tests, `<name>_allow` and `<name>_ignore`, that check a filter against one event target.
    ///
    /// `$fixture` is a function returning `(Document, reference, event_target)`; `$filter` is a closure from
    /// `&Document` to the [`crate::filter::Filter`] under test.
    ///
    /// ```text
    /// filter_scenario!(selector_on_target: fixture, |_| Filter::selector(".a").unwrap() => allow true, ignore true);
    /// ```
    macro_rules! filter_scenario {
        ($name:ident : $fixture:expr, $filter:expr => allow $allow:literal, ignore $ignore:literal) => {
            paste::paste! {
                #[test]
                fn [<$name _allow>]() {
                    let (doc, reference, event_target) = ($fixture)();
                    let filter = ($filter)(&doc);
                    let actual = crate::filter::test_allow(&filter, doc.node(reference), doc.node(event_target));
                    assert_eq!(actual, $allow, "test_allow with {filter:?}");
                }

                #[test]
                fn [<$name _ignore>]() {
                    let (doc, reference, event_target) = ($fixture)();
                    let filter = ($filter)(&doc);
                    let actual = crate::filter::test_ignore(&filter, doc.node(reference), doc.node(event_target));
                    assert_eq!(actual, $ignore, "test_ignore with {filter:?}");
                }
            }
        };
    }
    pub(crate) use filter_scenario;
}
