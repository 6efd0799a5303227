use apiguard_registry::{OperationPath, Registry, RegistryError};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9]{0,7}"
}

fn method() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9]{0,11}"
}

/// Two-level tables: resource -> action -> method
fn table() -> impl Strategy<Value = BTreeMap<(String, String), String>> {
    proptest::collection::btree_map((segment(), segment()), method(), 1..24)
}

fn build(table: &BTreeMap<(String, String), String>) -> Registry {
    let paths: Vec<(String, &str)> = table
        .iter()
        .map(|((resource, action), method)| (format!("{resource}.{action}"), method.as_str()))
        .collect();
    Registry::from_pairs(paths.iter().map(|(p, m)| (p.as_str(), *m))).unwrap()
}

proptest! {
    #[test]
    fn prop_resolve_returns_configured_leaf(table in table()) {
        let registry = build(&table);
        for ((resource, action), method) in &table {
            let path = OperationPath::new(vec![resource.clone(), action.clone()]).unwrap();
            prop_assert_eq!(registry.resolve(&path).unwrap(), method.as_str());
        }
    }

    #[test]
    fn prop_unknown_action_fails(table in table(), extra in "[A-Z][A-Z0-9]{1,6}") {
        // Upper-case-first segments never appear in generated tables
        let registry = build(&table);
        let ((resource, _), _) = table.iter().next().unwrap();
        let path = OperationPath::new(vec![resource.clone(), extra.clone()]).unwrap();
        let err = registry.resolve(&path).unwrap_err();
        let is_not_found = matches!(err, RegistryError::NotFound { .. });
        prop_assert!(is_not_found);
        prop_assert_eq!(err.failed_prefix().unwrap(), &path);
        // Deterministic
        prop_assert_eq!(registry.resolve(&path).unwrap_err(), err);
    }

    #[test]
    fn prop_is_known_iff_leaf(table in table(), probe in method()) {
        let registry = build(&table);
        let is_leaf = table.values().any(|m| m == &probe);
        prop_assert_eq!(registry.is_known_method(&probe), is_leaf);
        for method in table.values() {
            prop_assert!(registry.is_known_method(method));
        }
    }

    #[test]
    fn prop_duplicates_are_exactly_repeated_leaves(table in table()) {
        let registry = build(&table);
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for method in table.values() {
            *counts.entry(method.as_str()).or_default() += 1;
        }
        let expected: Vec<&str> = counts
            .into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(m, _)| m)
            .collect();
        let found = registry.find_duplicates();
        let found: Vec<&str> = found.iter().map(String::as_str).collect();
        prop_assert_eq!(found, expected);
        prop_assert_eq!(registry.all_methods().len(), table.len());
    }
}

#[test]
fn duplicate_category_list_detected() {
    let registry = Registry::from_pairs([
        ("categories.list", "getCategoryList"),
        ("examPapers.categories", "getCategoryList"),
    ])
    .unwrap();
    let dups = registry.find_duplicates();
    assert_eq!(dups.into_iter().collect::<Vec<_>>(), vec!["getCategoryList".to_string()]);
}
