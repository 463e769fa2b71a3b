//! Property tests for report line construction.

use std::sync::Arc;

use proptest::prelude::*;

use zatch::watcher::EventTranslator;
use zatch::{OutputMode, WatchRegistry, WatchRoot};

fn relative_suffix() -> impl Strategy<Value = String> {
    let segment = proptest::string::string_regex("[A-Za-z0-9._-]{1,8}").unwrap();
    proptest::collection::vec(segment, 0..=3).prop_map(|segments| segments.join("/"))
}

fn single_root(orig: &str, resolved: &str, mode: OutputMode) -> EventTranslator {
    let registry = WatchRegistry::build([WatchRoot::new(orig, resolved)]).unwrap();
    EventTranslator::new(Arc::new(registry), mode)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: sub-path lines are the terminated name followed by the sub-path,
    /// whether or not the user typed the trailing separator.
    #[test]
    fn property_sub_path_line_shape(
        name in "[a-z]{1,8}",
        suffix in relative_suffix(),
        typed_slash in any::<bool>(),
    ) {
        let orig = if typed_slash { format!("{name}/") } else { name.clone() };
        let translator = single_root(&orig, "/base/root", OutputMode::SubPath);

        let event = format!("/base/root/{suffix}");
        let line = translator.translate(event.as_bytes()).unwrap();

        prop_assert_eq!(line, format!("{name}/{suffix}\n").into_bytes());
    }

    /// PROPERTY: root mode always prints the name exactly as typed.
    #[test]
    fn property_root_line_is_orig(
        orig in "[a-z./]{1,12}",
        suffix in relative_suffix(),
    ) {
        let translator = single_root(&orig, "/base/root", OutputMode::Root);
        let event = format!("/base/root/{suffix}");
        let line = translator.translate(event.as_bytes()).unwrap();

        prop_assert_eq!(line, format!("{orig}\n").into_bytes());
    }
}
