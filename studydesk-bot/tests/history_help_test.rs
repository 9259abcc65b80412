//! /start, /help, and /my_history

mod common;

use common::{seed_resource, test_state, ADMIN, STUDENT};
use studydesk_bot::{approvals, engine};
use studydesk_core::ResourceKind;

#[tokio::test]
async fn test_start_greets_with_quota_and_price() {
    let (state, channel) = test_state();

    engine::handle_message(&state, STUDENT, "/start").await;

    let text = channel.last_text_to(STUDENT);
    assert!(text.contains("Welcome to Studydesk"));
    assert!(text.contains("CSE211"));
    assert!(text.contains("🎁 You have 4 free searches"));
    assert!(text.contains("₹21"));
}

#[tokio::test]
async fn test_help_for_regular_user_has_no_admin_menu() {
    let (state, channel) = test_state();

    engine::handle_message(&state, STUDENT, "/help").await;

    let text = channel.last_text_to(STUDENT);
    assert!(text.contains("User commands:"));
    assert!(text.contains("/verify_payment <ref_id>"));
    assert!(text.contains("🔢 Free searches: 0/4"));
    assert!(!text.contains("Admin commands:"));
}

#[tokio::test]
async fn test_help_for_admin_includes_admin_menu() {
    let (state, channel) = test_state();

    engine::handle_message(&state, ADMIN, "/help").await;

    let text = channel.last_text_to(ADMIN);
    assert!(text.contains("Admin commands:"));
    assert!(text.contains("/grant_access <user_id>"));
    assert!(text.contains("/upload_json"));
}

#[tokio::test]
async fn test_help_status_line_reflects_subscription() {
    let (state, channel) = test_state();
    approvals::grant(&state.store, STUDENT).unwrap();

    engine::handle_message(&state, STUDENT, "/help").await;

    assert!(channel.last_text_to(STUDENT).contains("✅ Active subscription"));
}

#[tokio::test]
async fn test_history_for_unknown_user() {
    let (state, channel) = test_state();

    engine::handle_message(&state, STUDENT, "/my_history").await;

    let text = channel.last_text_to(STUDENT);
    assert!(text.contains("You haven't made any searches yet."));
    assert!(text.contains("4 free searches available"));
    assert!(text.contains("Subscription: Not active."));
}

#[tokio::test]
async fn test_history_counts_searches() {
    let (state, channel) = test_state();
    seed_resource(
        &state,
        "CSE211",
        "Data Structures",
        1,
        ResourceKind::Notes,
        "https://example.com/a.pdf",
    );

    engine::handle_message(&state, STUDENT, "CSE211").await;
    engine::handle_message(&state, STUDENT, "/my_history").await;

    let text = channel.last_text_to(STUDENT);
    assert!(text.contains("✅ You've used 1/4 free searches."));
    assert!(text.contains("Subscription: Not active."));
}

#[tokio::test]
async fn test_history_shows_subscription_expiry() {
    let (state, channel) = test_state();
    approvals::grant(&state.store, STUDENT).unwrap();

    engine::handle_message(&state, STUDENT, "/my_history").await;

    let text = channel.last_text_to(STUDENT);
    assert!(text.contains("✅ You have unlimited searches (subscription active)."));
    assert!(text.contains("📅 Subscription: Active till"));
}

#[tokio::test]
async fn test_history_treats_expired_subscription_as_inactive() {
    let (state, channel) = test_state();
    use studydesk_bot::store::Store;

    state.store.ensure_user(STUDENT).unwrap();
    state
        .store
        .set_subscription(STUDENT, chrono::Utc::now() - chrono::Duration::hours(1))
        .unwrap();

    engine::handle_message(&state, STUDENT, "/my_history").await;

    let text = channel.last_text_to(STUDENT);
    assert!(text.contains("Subscription: Not active."));
}
