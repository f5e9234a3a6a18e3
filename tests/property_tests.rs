//! Property-based tests for the pattern compiler and rule list store.

use fsvault::ignore::{
    Classification, DirectoryArena, Entry, FileKind, InsertPosition, Rule, RuleKind, RuleList,
    classify,
};
use proptest::prelude::*;

/// A valid glob pattern: optional modifiers, `./`, alphanumeric segments,
/// optionally ending in `/**`.
fn valid_glob() -> impl Strategy<Value = String> {
    (
        "[ti]{0,2}",
        "[a-z][a-z0-9]{0,5}",
        prop::collection::vec("[a-z][a-z0-9]{0,5}", 0..3),
        prop::bool::ANY,
    )
        .prop_map(|(mods, first, rest, unbounded)| {
            let mut pattern = format!("{mods}./{first}");
            for seg in &rest {
                pattern.push('/');
                pattern.push_str(seg);
            }
            if unbounded {
                pattern.push_str("/**");
            }
            pattern
        })
}

/// Segments with no wildcard characters at all.
fn literal_path_segments() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-zA-Z0-9][a-zA-Z0-9._-]{0,7}", 1..4)
}

fn classify_at_depth(rules: &RuleList, path: &str) -> Classification {
    let mut arena = DirectoryArena::new();
    let mut node = arena.push_root(rules, 0);
    for _ in 0..path.matches('/').count().saturating_sub(1) {
        node = arena.push_child(rules, node, 0);
    }
    let entry = Entry {
        path,
        kind: FileKind::File,
        dev: 0,
        ino: 0,
        parent: Some(node),
    };
    let view = arena.node(node).unwrap().view().clone();
    classify(&entry, &view, rules, &arena).unwrap()
}

proptest! {
    /// A wildcard-free glob matches exactly its own literal path.
    #[test]
    fn literal_glob_matches_itself_and_nothing_longer(segments in literal_path_segments()) {
        let path = format!("./{}", segments.join("/"));
        let rule = Rule::compile(&path).unwrap();

        let matcher = match rule.kind() {
            RuleKind::PathGlob { matcher } => matcher,
            other => panic!("expected a glob, got {other:?}"),
        };
        prop_assert!(matcher.is_match(&path));
        let longer = format!("{path}x");
        prop_assert!(!matcher.is_match(&longer));
        let deeper = format!("{path}/deeper");
        prop_assert!(!matcher.is_match(&deeper));
        let replaced = format!("./q{}", &path[2..]);
        prop_assert!(!matcher.is_match(&replaced));
    }

    /// The compiler returns an error or a rule; it never panics, whatever
    /// the input.
    #[test]
    fn compile_never_panics(text in ".{0,60}") {
        let _ = Rule::compile(&text);
    }

    /// Persisting a list and loading it back preserves the ordered user
    /// rule texts.
    #[test]
    fn save_load_preserves_order(patterns in prop::collection::vec(valid_glob(), 0..8)) {
        let mut list = RuleList::new();
        let rules: Vec<Rule> = patterns.iter().map(|p| Rule::compile(p).unwrap()).collect();
        list.insert(rules, InsertPosition::End).unwrap();

        let mut buffer = Vec::new();
        list.save(&mut buffer).unwrap();

        let mut reloaded = RuleList::new();
        let count = reloaded.load(&buffer).unwrap();
        prop_assert_eq!(count, patterns.len());

        let dumped: Vec<String> = reloaded
            .dump()
            .into_iter()
            .map(|(_, t)| t.to_string())
            .collect();
        prop_assert_eq!(dumped, patterns);
    }

    /// Classification through propagated views equals classification with
    /// every rule active (the brute-force fallback).
    #[test]
    fn propagation_equals_brute_force(
        patterns in prop::collection::vec(valid_glob(), 1..6),
        segments in literal_path_segments(),
    ) {
        let mut list = RuleList::new();
        let rules: Vec<Rule> = patterns.iter().map(|p| Rule::compile(p).unwrap()).collect();
        list.insert(rules, InsertPosition::End).unwrap();

        let path = format!("./{}", segments.join("/"));
        let propagated = classify_at_depth(&list, &path);

        let brute = list
            .iter()
            .find_map(|rule| {
                let matched = match rule.kind() {
                    RuleKind::PathGlob { matcher } | RuleKind::RawRegex { matcher } => {
                        matcher.is_match(&path)
                    }
                    _ => false,
                };
                matched.then(|| match rule.sense() {
                    fsvault::ignore::Sense::Ignore => Classification::Ignored,
                    fsvault::ignore::Sense::Take => Classification::Taken,
                })
            })
            .unwrap_or(Classification::Unclassified);

        prop_assert_eq!(propagated, brute);
    }
}
