//! Subject deletion behind a confirmation step

mod common;

use common::{seed_resource, test_state, ADMIN};
use studydesk_bot::engine;
use studydesk_bot::store::Store;
use studydesk_core::{ResourceKind, SubjectCode};

#[tokio::test]
async fn test_confirmed_deletion_reports_row_count() {
    let (state, channel) = test_state();
    seed_resource(&state, "CSE211", "Data Structures", 1, ResourceKind::Notes, "https://example.com/a.pdf");
    seed_resource(&state, "CSE211", "Data Structures", 2, ResourceKind::Slides, "https://example.com/b.ppt");

    engine::handle_message(&state, ADMIN, "/delete_subject CSE211").await;
    let warning = channel.last_text_to(ADMIN);
    assert!(warning.contains("⚠️ WARNING: You are about to delete all resources for CSE211"));
    assert!(warning.contains("cannot be undone"));

    engine::handle_message(&state, ADMIN, "confirm").await;
    assert!(channel
        .last_text_to(ADMIN)
        .contains("✅ Deleted all resources for CSE211 (2 entries removed)."));

    let code = SubjectCode::parse("CSE211").unwrap();
    assert!(state.store.list_resources(&code).unwrap().is_empty());
}

#[tokio::test]
async fn test_any_other_reply_cancels_deletion() {
    let (state, channel) = test_state();
    seed_resource(&state, "CSE211", "Data Structures", 1, ResourceKind::Notes, "https://example.com/a.pdf");

    engine::handle_message(&state, ADMIN, "/delete_subject CSE211").await;
    engine::handle_message(&state, ADMIN, "on second thought, no").await;

    assert!(channel.last_text_to(ADMIN).contains("🚫 Subject deletion cancelled."));

    let code = SubjectCode::parse("CSE211").unwrap();
    assert_eq!(state.store.list_resources(&code).unwrap().len(), 1);
}

#[tokio::test]
async fn test_confirming_unknown_subject_reports_not_found() {
    let (state, channel) = test_state();

    engine::handle_message(&state, ADMIN, "/delete_subject XYZ999").await;
    engine::handle_message(&state, ADMIN, "confirm").await;

    assert!(channel
        .last_text_to(ADMIN)
        .contains("⚠️ Failed to delete subject: Subject not found."));
}

#[tokio::test]
async fn test_delete_requires_subject_code() {
    let (state, channel) = test_state();

    engine::handle_message(&state, ADMIN, "/delete_subject").await;

    assert!(channel.last_text_to(ADMIN).contains("⚠️ Please provide the subject code."));
}

#[tokio::test]
async fn test_reply_mentioning_a_code_cancels_instead_of_searching() {
    let (state, channel) = test_state();
    seed_resource(&state, "CSE211", "Data Structures", 1, ResourceKind::Notes, "https://example.com/a.pdf");

    engine::handle_message(&state, ADMIN, "/delete_subject CSE211").await;
    engine::handle_message(&state, ADMIN, "CSE211").await;

    // The active flow captured the text; it was not a lookup
    assert!(channel.last_text_to(ADMIN).contains("🚫 Subject deletion cancelled."));
    let code = SubjectCode::parse("CSE211").unwrap();
    assert_eq!(state.store.list_resources(&code).unwrap().len(), 1);
}
