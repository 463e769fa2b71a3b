//! Property tests for longest-prefix ownership lookup.

use proptest::prelude::*;

use zatch::{WatchRegistry, WatchRoot};

/// Short segments from a tiny alphabet so roots nest and collide often.
fn segment() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[ab.-]{1,3}").unwrap()
}

fn absolute_path() -> impl Strategy<Value = String> {
    proptest::collection::vec(segment(), 0..=4).prop_map(|segments| format!("/{}", segments.join("/")))
}

fn event_path() -> impl Strategy<Value = String> {
    (absolute_path(), any::<bool>()).prop_map(|(path, dir)| {
        if dir && !path.ends_with('/') {
            format!("{path}/")
        } else {
            path
        }
    })
}

/// Linear scan: the longest resolved form that prefixes the path.
fn oracle<'a>(roots: &'a [WatchRoot], path: &[u8]) -> Option<&'a WatchRoot> {
    roots
        .iter()
        .filter(|root| path.starts_with(root.resolved()))
        .max_by_key(|root| root.resolved_len())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 512,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: lookup agrees with a linear scan for the deepest owner.
    #[test]
    fn property_find_owner_matches_linear_scan(
        roots in proptest::collection::vec(absolute_path(), 1..8),
        paths in proptest::collection::vec(event_path(), 1..16),
    ) {
        let registry = WatchRegistry::build(roots.iter().map(|r| WatchRoot::new(r, r))).unwrap();

        for path in &paths {
            let expected = oracle(registry.roots(), path.as_bytes()).map(WatchRoot::resolved);
            let actual = registry.find_owner(path.as_bytes()).map(WatchRoot::resolved);
            prop_assert_eq!(actual, expected, "path {}", path);
        }
    }

    /// PROPERTY: the registry is sorted and free of duplicate resolved forms.
    #[test]
    fn property_registry_sorted_and_unique(
        roots in proptest::collection::vec(absolute_path(), 1..12),
    ) {
        let registry = WatchRegistry::build(roots.iter().map(|r| WatchRoot::new(r, r))).unwrap();
        let resolved: Vec<&[u8]> = registry.roots().iter().map(WatchRoot::resolved).collect();
        prop_assert!(resolved.windows(2).all(|pair| pair[0] < pair[1]));
    }

    /// PROPERTY: every root owns its own resolved form.
    #[test]
    fn property_root_owns_itself(
        roots in proptest::collection::vec(absolute_path(), 1..8),
    ) {
        let registry = WatchRegistry::build(roots.iter().map(|r| WatchRoot::new(r, r))).unwrap();
        for root in registry.roots() {
            let owner = registry.find_owner(root.resolved()).map(WatchRoot::resolved);
            prop_assert_eq!(owner, Some(root.resolved()));
        }
    }
}
