// Table invariants for the game copy and theme data.
// These tests are native-friendly and avoid wasm/browser APIs.

use std::collections::HashSet;

use val_wrapped::{QUESTION_VARIANTS, SENDER_UPDATES, TAUNTS, ThemeId};

fn assert_unique_non_empty(name: &str, table: &[&str]) {
    assert!(!table.is_empty(), "{name} is empty");
    let mut seen = HashSet::new();
    for entry in table {
        assert!(!entry.trim().is_empty(), "blank entry in {name}");
        assert!(seen.insert(*entry), "duplicate '{entry}' in {name}");
    }
}

#[test]
fn copy_tables_are_unique_and_non_empty() {
    assert_unique_non_empty("TAUNTS", TAUNTS);
    assert_unique_non_empty("QUESTION_VARIANTS", QUESTION_VARIANTS);
    assert_unique_non_empty("SENDER_UPDATES", SENDER_UPDATES);
}

#[test]
fn first_question_is_the_plain_ask() {
    assert_eq!(QUESTION_VARIANTS[0], "Will you be my Valentine? 💕");
}

#[test]
fn sender_updates_name_the_sender() {
    for line in SENDER_UPDATES {
        assert!(line.contains("{name}"), "'{line}' has no {{name}} placeholder");
    }
}

#[test]
fn theme_codes_and_ids_are_unique() {
    let codes: HashSet<char> = ThemeId::ALL.iter().map(|t| t.code()).collect();
    let ids: HashSet<&str> = ThemeId::ALL.iter().map(|t| t.as_str()).collect();
    assert_eq!(codes.len(), ThemeId::ALL.len());
    assert_eq!(ids.len(), ThemeId::ALL.len());
    for theme in ThemeId::ALL {
        assert!(theme.code().is_ascii_lowercase());
        assert!(!theme.display_name().is_empty());
    }
}
