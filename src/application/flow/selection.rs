//! Choosing a candidate by the name the user typed.

use crate::application::registry::MethodEntry;

/// Finds the candidate whose name equals `choice` exactly.
///
/// Case matters, and nothing is trimmed or defaulted.
pub fn find_candidate<'a>(candidates: &[&'a MethodEntry], choice: &str) -> Option<&'a MethodEntry> {
    candidates.iter().copied().find(|entry| entry.name() == choice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::methods::ScriptedMethod;
    use crate::config::{MethodScope, TextCatalog};
    use proptest::prelude::*;
    use std::sync::Arc;

    fn entry(name: &str) -> MethodEntry {
        MethodEntry::new(
            name,
            Arc::new(ScriptedMethod::new()),
            MethodScope::new(name, Default::default(), Arc::new(TextCatalog::default())),
        )
    }

    #[test]
    fn exact_name_is_found() {
        let (a, b) = (entry("methodA"), entry("methodB"));
        let candidates = vec![&a, &b];
        assert_eq!(find_candidate(&candidates, "methodB").unwrap().name(), "methodB");
    }

    #[test]
    fn case_differs_is_not_found() {
        let (a, b) = (entry("methodA"), entry("methodB"));
        let candidates = vec![&a, &b];
        assert!(find_candidate(&candidates, "methodb").is_none());
        assert!(find_candidate(&candidates, " methodB").is_none());
    }

    proptest! {
        #[test]
        fn result_always_matches_choice(
            names in proptest::collection::hash_set("[a-zA-Z]{1,8}", 1..6),
            choice in "[a-zA-Z ]{0,10}",
        ) {
            let entries: Vec<MethodEntry> = names.iter().map(|n| entry(n)).collect();
            let candidates: Vec<&MethodEntry> = entries.iter().collect();

            match find_candidate(&candidates, &choice) {
                Some(found) => prop_assert_eq!(found.name(), choice.as_str()),
                None => prop_assert!(!names.contains(&choice)),
            }
        }
    }
}
