//! Subject lookup: code detection, listing delivery, loading animation

mod common;

use common::{seed_resource, settle, test_state, STUDENT};
use studydesk_bot::engine;
use studydesk_bot::store::Store;
use studydesk_core::ResourceKind;

#[tokio::test(start_paused = true)]
async fn test_lookup_delivers_listing_through_animation() {
    let (state, channel) = test_state();
    seed_resource(
        &state,
        "CSE211",
        "Data Structures",
        1,
        ResourceKind::Notes,
        "https://example.com/ds.pdf",
    );

    engine::handle_message(&state, STUDENT, "please share CSE211 material").await;

    // The placeholder goes out immediately, showing a loading frame
    assert_eq!(channel.sent_count_to(STUDENT), 1);
    assert!(channel.last_text_to(STUDENT).contains("CSE211"));

    settle().await;

    let text = channel.last_text_to(STUDENT);
    assert!(text.contains("🎓 CSE211: Data Structures"));
    assert!(text.contains("📌 UNIT 1"));
    assert!(text.contains("https://example.com/ds.pdf"));
    assert!(text.contains("Slides: Not available"));

    // Revealed by editing the placeholder, never by a second message
    assert_eq!(channel.sent_count_to(STUDENT), 1);
    let messages = channel.messages.read().unwrap();
    assert_eq!(messages[0].edits, 4);

    // Exactly one access recorded for the delivery
    let (code, count) = state.store.most_accessed_subject().unwrap().unwrap();
    assert_eq!(code.as_str(), "CSE211");
    assert_eq!(count, 1);
}

#[tokio::test(start_paused = true)]
async fn test_code_detected_anywhere_in_text_case_insensitive() {
    let (state, channel) = test_state();
    seed_resource(
        &state,
        "CSE211",
        "Data Structures",
        2,
        ResourceKind::Slides,
        "https://example.com/slides.ppt",
    );

    engine::handle_message(&state, STUDENT, "hey, got anything for cse211 unit 2?").await;
    settle().await;

    let text = channel.last_text_to(STUDENT);
    assert!(text.contains("🎓 CSE211: Data Structures"));
    assert!(text.contains("https://example.com/slides.ppt"));
}

#[tokio::test]
async fn test_unknown_subject_reports_not_found() {
    let (state, channel) = test_state();

    engine::handle_message(&state, STUDENT, "MTH101 please").await;

    let text = channel.last_text_to(STUDENT);
    assert!(text.contains("⚠️ No resources found for subject code: MTH101"));

    // No animation for a miss, and no access recorded
    let messages = channel.messages.read().unwrap();
    assert_eq!(messages[0].edits, 0);
    assert!(state.store.most_accessed_subject().unwrap().is_none());
}

#[tokio::test]
async fn test_plain_chatter_gets_no_reply() {
    let (state, channel) = test_state();

    engine::handle_message(&state, STUDENT, "hello there, how are you?").await;

    assert_eq!(channel.sent_count_to(STUDENT), 0);
}

#[tokio::test(start_paused = true)]
async fn test_footer_counts_prior_searches() {
    let (state, channel) = test_state();
    seed_resource(
        &state,
        "CSE211",
        "Data Structures",
        1,
        ResourceKind::Notes,
        "https://example.com/ds.pdf",
    );

    engine::handle_message(&state, STUDENT, "CSE211").await;
    settle().await;
    assert!(channel.last_text_to(STUDENT).contains("Searches used: 0/4"));

    engine::handle_message(&state, STUDENT, "CSE211 again").await;
    settle().await;
    assert!(channel.last_text_to(STUDENT).contains("Searches used: 1/4"));
}

#[tokio::test(start_paused = true)]
async fn test_subscriber_footer_shows_subscription() {
    let (state, channel) = test_state();
    seed_resource(
        &state,
        "CSE211",
        "Data Structures",
        1,
        ResourceKind::Notes,
        "https://example.com/ds.pdf",
    );
    studydesk_bot::approvals::grant(&state.store, STUDENT).unwrap();

    engine::handle_message(&state, STUDENT, "CSE211").await;
    settle().await;

    let text = channel.last_text_to(STUDENT);
    assert!(text.contains("✅ You have an active subscription"));
    assert!(!text.contains("Searches used"));
}

#[tokio::test(start_paused = true)]
async fn test_unknown_subject_consumes_no_quota() {
    let (state, channel) = test_state();
    seed_resource(
        &state,
        "CSE211",
        "Data Structures",
        1,
        ResourceKind::Notes,
        "https://example.com/ds.pdf",
    );

    engine::handle_message(&state, STUDENT, "MTH101?").await;
    engine::handle_message(&state, STUDENT, "CSE211?").await;
    settle().await;

    // The miss did not count against the quota
    assert!(channel.last_text_to(STUDENT).contains("Searches used: 0/4"));
}
