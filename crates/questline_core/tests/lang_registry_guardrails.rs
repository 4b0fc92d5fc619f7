use std::collections::HashMap;

use questline_core::lang::kinds;
use questline_core::lang::lists::{self, ListKind};
use questline_core::lang::patterns::OptionalPosition;

#[test]
fn kind_spellings_unique_and_resolvable_per_list() {
    for list in ListKind::ALL {
        let mut seen: HashMap<&'static str, &'static str> = HashMap::new();

        for info in kinds::kinds(list) {
            assert_eq!(info.list, list, "kind {} registered under the wrong list", info.canonical);
            assert_eq!(
                kinds::from_str(list, info.canonical).map(|k| k.canonical),
                Some(info.canonical),
                "kind canonical spelling not resolvable: {}",
                info.canonical
            );

            if let Some(prev) = seen.insert(info.canonical, info.canonical) {
                panic!("duplicate {} spelling {:?} (also {:?})", lists::singular(list), info.canonical, prev);
            }

            for &alias in info.aliases {
                assert_eq!(
                    kinds::from_str(list, alias).map(|k| k.canonical),
                    Some(info.canonical),
                    "kind alias not resolvable: {}",
                    alias
                );
                if let Some(prev) = seen.insert(alias, info.canonical) {
                    panic!("duplicate {} alias {:?}: {:?} and {:?}", lists::singular(list), alias, prev, info.canonical);
                }
            }
        }
    }
}

#[test]
fn builtin_patterns_are_valid() {
    for list in ListKind::ALL {
        for info in kinds::kinds(list) {
            assert!(
                info.pattern.validate().is_ok(),
                "builtin pattern for {} {} is invalid: {:?}",
                lists::singular(list),
                info.canonical,
                info.pattern.validate()
            );
            assert!(!info.description.is_empty(), "{} has no description", info.canonical);
        }
    }
}

#[test]
fn head_position_is_only_used_with_a_text_tail() {
    // A head-positioned optional run followed by single-token slots would make `key:value` tokens in mandatory
    // position ambiguous, so every head pattern ends in a whitespace-preserving slot.
    for list in ListKind::ALL {
        for info in kinds::kinds(list) {
            if info.pattern.optional_position == OptionalPosition::Head {
                assert!(info.pattern.preserve_whitespace_in_last_mandatory, "{}", info.canonical);
            }
        }
    }
}
