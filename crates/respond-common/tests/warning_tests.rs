//! Tests for deduplicated diagnostics.

use respond_common::warning::{has_warned, warn_once};

#[test]
fn test_warn_once_records_message() {
    warn_once("Test", "first unique diagnostic");
    assert!(has_warned("Test", "first unique diagnostic"));
}

#[test]
fn test_component_is_part_of_key() {
    warn_once("Alpha", "shared text");
    assert!(has_warned("Alpha", "shared text"));
    assert!(!has_warned("Beta", "shared text"));
}
