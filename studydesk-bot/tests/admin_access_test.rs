//! Admin gating, direct grants, stats, and the control panel

mod common;

use common::{seed_resource, test_state, ADMIN, STUDENT};
use studydesk_bot::engine;
use studydesk_bot::store::{Store, UserId};
use studydesk_core::ResourceKind;

#[tokio::test]
async fn test_every_admin_command_refused_for_non_admin() {
    let (state, channel) = test_state();

    let commands = [
        "/admin",
        "/verify TXN1",
        "/grant_access 5",
        "/add_resource",
        "/remove_resource CSE211 1 notes",
        "/edit_resource CSE211 1 notes https://example.com/x.pdf",
        "/delete_subject CSE211",
        "/upload_json",
        "/stats",
    ];

    for command in commands {
        engine::handle_message(&state, STUDENT, command).await;
        assert_eq!(
            channel.last_text_to(STUDENT),
            "⚠️ This command is for administrators only.",
            "command {} was not refused",
            command
        );
    }
}

#[tokio::test]
async fn test_grant_access_activates_and_notifies() {
    let (state, channel) = test_state();

    engine::handle_message(&state, ADMIN, "/grant_access 42").await;

    assert!(channel
        .last_text_to(ADMIN)
        .contains("✅ Access granted to user 42 successfully!"));
    assert!(channel
        .last_text_to(STUDENT)
        .contains("🎉 Your subscription has been activated!"));

    let record = state.store.get_user(UserId(42)).unwrap().unwrap();
    assert!(record.subscribed);
}

#[tokio::test]
async fn test_grant_access_creates_missing_user() {
    let (state, _channel) = test_state();

    engine::handle_message(&state, ADMIN, "/grant_access 9999").await;

    assert!(state.store.get_user(UserId(9999)).unwrap().is_some());
}

#[tokio::test]
async fn test_grant_access_argument_validation() {
    let (state, channel) = test_state();

    engine::handle_message(&state, ADMIN, "/grant_access").await;
    assert!(channel.last_text_to(ADMIN).contains("⚠️ Please provide the user's ID."));

    engine::handle_message(&state, ADMIN, "/grant_access alice").await;
    assert!(channel.last_text_to(ADMIN).contains("⚠️ User ID must be a number."));
}

#[tokio::test]
async fn test_stats_summarizes_usage() {
    let (state, channel) = test_state();
    seed_resource(&state, "CSE211", "Data Structures", 1, ResourceKind::Notes, "https://example.com/a.pdf");
    seed_resource(&state, "MTH101", "Calculus", 1, ResourceKind::Notes, "https://example.com/b.pdf");

    engine::handle_message(&state, STUDENT, "CSE211").await;
    engine::handle_message(&state, STUDENT, "CSE211 once more").await;
    engine::handle_message(&state, STUDENT, "MTH101").await;

    engine::handle_message(&state, ADMIN, "/stats").await;

    let text = channel.last_text_to(ADMIN);
    assert!(text.contains("👥 Total users: 1"));
    assert!(text.contains("🔓 Active subscribers: 0"));
    assert!(text.contains("📦 Most accessed subject: CSE211"));
}

#[tokio::test]
async fn test_panel_shows_overview_and_pending_requests() {
    let (state, channel) = test_state();

    engine::handle_message(&state, STUDENT, "/verify_payment TXN1").await;
    engine::handle_message(&state, UserId(43), "/verify_payment TXN2").await;

    engine::handle_message(&state, ADMIN, "/admin").await;

    let text = channel.last_text_to(ADMIN);
    assert!(text.contains("ADMIN CONTROL PANEL"));
    assert!(text.contains("Pending requests: 2"));
    assert!(text.contains("TXN1"));
    assert!(text.contains("TXN2"));
    assert!(text.contains("Admin commands:"));
}

#[tokio::test]
async fn test_panel_caps_the_pending_list_at_five() {
    let (state, channel) = test_state();

    for i in 1..=7 {
        let command = format!("/verify_payment TXN{}", i);
        engine::handle_message(&state, UserId(100 + i), &command).await;
    }

    engine::handle_message(&state, ADMIN, "/admin").await;

    let text = channel.last_text_to(ADMIN);
    assert_eq!(text.matches("User ID:").count(), 5);
    assert!(text.contains("...and 2 more pending requests."));
}

#[tokio::test]
async fn test_panel_without_pending_requests() {
    let (state, channel) = test_state();

    engine::handle_message(&state, ADMIN, "/admin").await;

    let text = channel.last_text_to(ADMIN);
    assert!(text.contains("No pending verification requests."));
}
