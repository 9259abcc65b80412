//! Status endpoints
//!
//! A small public surface for uptime monitors: an HTML overview page, a
//! health probe, and the usage counters as JSON.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use axum::Json;

use crate::channel::MessagingChannel;
use crate::error::BotError;
use crate::state::AppState;
use crate::store::{Store, UsageStats};

/// GET /
pub async fn index<S, C>(
    State(state): State<Arc<AppState<S, C>>>,
) -> Result<Html<String>, BotError>
where
    S: Store,
    C: MessagingChannel,
{
    let stats = state.store.usage_stats()?;
    Ok(Html(render_status_page(&stats, &state.config.payment_address)))
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /stats
pub async fn stats<S, C>(
    State(state): State<Arc<AppState<S, C>>>,
) -> Result<Json<UsageStats>, BotError>
where
    S: Store,
    C: MessagingChannel,
{
    Ok(Json(state.store.usage_stats()?))
}

fn render_status_page(stats: &UsageStats, payment_address: &str) -> String {
    let most_accessed = stats
        .most_accessed
        .as_ref()
        .map(|subject| subject.code.as_str())
        .unwrap_or("None");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Studydesk Status</title>
    <style>
        body {{
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background-color: #f4f4f4;
            color: #333;
            margin: 0;
            padding: 20px;
        }}
        .container {{
            max-width: 800px;
            margin: auto;
            background: white;
            padding: 30px;
            border-radius: 10px;
            box-shadow: 0 0 10px rgba(0,0,0,0.1);
        }}
        h1 {{
            color: #2c3e50;
        }}
        ul {{
            list-style: none;
            padding-left: 0;
        }}
        ul li {{
            margin-bottom: 10px;
            background: #ecf0f1;
            padding: 10px;
            border-radius: 5px;
        }}
        code {{
            background: #dfe6e9;
            padding: 2px 6px;
            border-radius: 4px;
        }}
        .section {{
            margin-top: 30px;
        }}
    </style>
</head>
<body>
    <div class="container">
        <h1>📚 Studydesk Status</h1>
        <p>✅ The assistant is <strong>running</strong>.</p>

        <div class="section">
            <h2>📊 Stats</h2>
            <ul>
                <li><strong>Total Users:</strong> {total_users}</li>
                <li><strong>Active Subscribers:</strong> {active_subscribers}</li>
                <li><strong>Verified Payments:</strong> {verified_payments}</li>
                <li><strong>Pending Payments:</strong> {pending_payments}</li>
                <li><strong>Total Resources:</strong> {resource_rows}</li>
                <li><strong>Subject Count:</strong> {subject_count}</li>
                <li><strong>Most Accessed Subject:</strong> {most_accessed}</li>
            </ul>
        </div>

        <div class="section">
            <h2>🛠 Admin Commands</h2>
            <ul>
                <li><code>/verify &lt;ref_id&gt;</code> - Verify a user's payment</li>
                <li><code>/grant_access &lt;user_id&gt;</code> - Grant subscription access</li>
                <li><code>/add_resource</code> - Add a resource step by step</li>
                <li><code>/stats</code> - Show usage statistics</li>
            </ul>
        </div>

        <div class="section">
            <h2>ℹ️ Assistant Information</h2>
            <ul>
                <li><strong>Payment Address:</strong> {payment_address}</li>
                <li><strong>Free Searches:</strong> {quota}</li>
                <li><strong>Subscription:</strong> ₹21 for 1 week</li>
            </ul>
        </div>
    </div>
</body>
</html>"#,
        total_users = stats.total_users,
        active_subscribers = stats.active_subscribers,
        verified_payments = stats.verified_payments,
        pending_payments = stats.pending_payments,
        resource_rows = stats.resource_rows,
        subject_count = stats.subject_count,
        most_accessed = most_accessed,
        payment_address = payment_address,
        quota = crate::gate::FREE_SEARCH_QUOTA,
    )
}
