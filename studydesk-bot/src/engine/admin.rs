//! Admin commands: payment verification, access grants, catalog maintenance,
//! bulk upload, and the control panel.
//!
//! Every handler re-checks the caller against the configured admin id before
//! doing anything.

use std::sync::Arc;

use chrono::Utc;
use studydesk_core::{Link, ResourceKind, SubjectCode, Unit};

use crate::approvals;
use crate::catalog::{self, BulkImportOutcome, EditOutcome, ImportReport, RemoveOutcome};
use crate::channel::MessagingChannel;
use crate::error::BotError;
use crate::state::AppState;
use crate::store::{Store, UserId};

use super::flows::{Flow, GuidedStep};

pub(crate) const ADMIN_MENU: &str = "\n\n\
    Admin commands:\n\
    - /admin - Open the admin panel\n\
    - /verify <ref_id> - Verify a user's payment\n\
    - /grant_access <user_id> - Directly grant subscription access\n\
    - /add_resource - Add a resource step by step\n\
    - /remove_resource <code> <unit> <type> - Remove a specific resource link\n\
    - /edit_resource <code> <unit> <type> <new_link> - Update a resource link\n\
    - /delete_subject <code> - Delete all resources for a subject\n\
    - /upload_json - Bulk upload resources from a JSON file\n\
    - /stats - Show usage statistics";

/// Send the fixed refusal and report whether the caller may continue
fn require_admin<S, C>(state: &Arc<AppState<S, C>>, from: UserId) -> Result<bool, BotError>
where
    S: Store,
    C: MessagingChannel,
{
    if state.is_admin(from) {
        return Ok(true);
    }
    tracing::warn!(user = %from, "Admin command refused");
    state
        .channel
        .send(from, "⚠️ This command is for administrators only.")
        .map_err(BotError::Channel)?;
    Ok(false)
}

pub(crate) fn begin_guided_entry<S, C>(
    state: &Arc<AppState<S, C>>,
    from: UserId,
    args: &[String],
) -> Result<(), BotError>
where
    S: Store,
    C: MessagingChannel,
{
    if !require_admin(state, from)? {
        return Ok(());
    }

    // Arguments used to be accepted inline; point old habits at the flow
    if !args.is_empty() {
        state
            .channel
            .send(
                from,
                "💭 Resource addition - interactive mode\n\n\
                 I'll guide you through adding a resource step by step.\n\
                 No need to provide all the details in a single command.",
            )
            .map_err(BotError::Channel)?;
    }

    state.sessions.set(from, Flow::GuidedEntry(GuidedStep::SubjectCode));
    state
        .channel
        .send(
            from,
            "📚 Add new resource - Step 1/5\n\n\
             Please enter the subject code (e.g., CSE211):",
        )
        .map_err(BotError::Channel)?;
    Ok(())
}

pub(crate) fn verify<S, C>(
    state: &Arc<AppState<S, C>>,
    from: UserId,
    args: &[String],
) -> Result<(), BotError>
where
    S: Store,
    C: MessagingChannel,
{
    if !require_admin(state, from)? {
        return Ok(());
    }

    let reference = match args.first() {
        Some(reference) => reference.as_str(),
        None => {
            state
                .channel
                .send(from, "⚠️ Please provide the payment reference ID to verify.")
                .map_err(BotError::Channel)?;
            return Ok(());
        }
    };

    match approvals::approve(&state.store, reference, None)? {
        Some(user) => {
            tracing::info!(admin = %from, user = %user, reference = %reference, "Payment verified");
            let confirmation = format!(
                "✅ Payment with reference ID {} has been verified successfully!",
                reference
            );
            state.channel.send(from, &confirmation).map_err(BotError::Channel)?;

            let celebration = format!(
                "🎉 Your payment with reference ID {} has been verified!\n\n\
                 Your subscription is now active for 1 week. Enjoy unlimited searches!",
                reference
            );
            if let Err(err) = state.channel.send(user, &celebration) {
                tracing::warn!(user = %user, error = %err, "Failed to notify user of verification");
            }
        }
        None => {
            let failure = format!(
                "⚠️ Failed to verify payment with reference ID {}. \
                 It may have already been verified or doesn't exist.",
                reference
            );
            state.channel.send(from, &failure).map_err(BotError::Channel)?;
        }
    }

    Ok(())
}

pub(crate) fn grant_access<S, C>(
    state: &Arc<AppState<S, C>>,
    from: UserId,
    args: &[String],
) -> Result<(), BotError>
where
    S: Store,
    C: MessagingChannel,
{
    if !require_admin(state, from)? {
        return Ok(());
    }

    let raw = match args.first() {
        Some(raw) => raw,
        None => {
            state
                .channel
                .send(
                    from,
                    "⚠️ Please provide the user's ID.\n\
                     Example: /grant_access 123456789",
                )
                .map_err(BotError::Channel)?;
            return Ok(());
        }
    };
    let user = match raw.parse::<u64>() {
        Ok(id) => UserId(id),
        Err(_) => {
            state
                .channel
                .send(from, "⚠️ User ID must be a number.")
                .map_err(BotError::Channel)?;
            return Ok(());
        }
    };

    approvals::grant(&state.store, user)?;
    tracing::info!(admin = %from, user = %user, "Subscription granted directly");

    let confirmation = format!("✅ Access granted to user {} successfully!", user);
    state.channel.send(from, &confirmation).map_err(BotError::Channel)?;

    let celebration = "🎉 Your subscription has been activated!\n\n\
                       Your subscription is now active for 1 week. Enjoy unlimited searches!";
    if let Err(err) = state.channel.send(user, celebration) {
        tracing::warn!(user = %user, error = %err, "Failed to notify user of granted access");
    }

    Ok(())
}

pub(crate) fn remove_resource<S, C>(
    state: &Arc<AppState<S, C>>,
    from: UserId,
    args: &[String],
) -> Result<(), BotError>
where
    S: Store,
    C: MessagingChannel,
{
    if !require_admin(state, from)? {
        return Ok(());
    }

    let (code, unit, kind) = match args {
        [code, unit, kind] => {
            match parse_target(code, unit, kind) {
                Ok(target) => target,
                Err(err) => {
                    state
                        .channel
                        .send(from, &format!("⚠️ {}", err))
                        .map_err(BotError::Channel)?;
                    return Ok(());
                }
            }
        }
        _ => {
            state
                .channel
                .send(
                    from,
                    "⚠️ Please provide all required information.\n\
                     Format: /remove_resource <code> <unit> <type>\n\
                     Example: /remove_resource CSE211 1 notes",
                )
                .map_err(BotError::Channel)?;
            return Ok(());
        }
    };

    let reply = match catalog::remove_link(&state.store, &code, unit, kind)? {
        RemoveOutcome::Removed => {
            tracing::info!(admin = %from, code = %code, unit = %unit, kind = %kind, "Resource removed");
            format!(
                "✅ Resource removed successfully!\n\n\
                 - Subject code: {}\n\
                 - Unit: {}\n\
                 - Type: {}",
                code, unit, kind
            )
        }
        RemoveOutcome::RowNotFound => "⚠️ Failed to remove resource: Resource not found.".to_string(),
        RemoveOutcome::LinkNotFound(kind) => {
            format!("⚠️ Failed to remove resource: {} resource not found.", kind.label())
        }
    };
    state.channel.send(from, &reply).map_err(BotError::Channel)?;
    Ok(())
}

pub(crate) fn edit_resource<S, C>(
    state: &Arc<AppState<S, C>>,
    from: UserId,
    args: &[String],
) -> Result<(), BotError>
where
    S: Store,
    C: MessagingChannel,
{
    if !require_admin(state, from)? {
        return Ok(());
    }

    let (code, unit, kind, link) = match args {
        [code, unit, kind, link] => {
            let target = parse_target(code, unit, kind).and_then(|(code, unit, kind)| {
                Ok((code, unit, kind, Link::parse(link)?))
            });
            match target {
                Ok(target) => target,
                Err(err) => {
                    state
                        .channel
                        .send(from, &format!("⚠️ {}", err))
                        .map_err(BotError::Channel)?;
                    return Ok(());
                }
            }
        }
        _ => {
            state
                .channel
                .send(
                    from,
                    "⚠️ Please provide all required information.\n\
                     Format: /edit_resource <code> <unit> <type> <new_link>\n\
                     Example: /edit_resource CSE211 1 notes https://example.com/notes.pdf",
                )
                .map_err(BotError::Channel)?;
            return Ok(());
        }
    };

    let reply = match catalog::edit_link(&state.store, &code, unit, kind, link.clone())? {
        EditOutcome::Updated => {
            tracing::info!(admin = %from, code = %code, unit = %unit, kind = %kind, "Resource link updated");
            format!(
                "✅ Resource updated successfully!\n\n\
                 - Subject code: {}\n\
                 - Unit: {}\n\
                 - Type: {}\n\
                 - New link: {}",
                code, unit, kind, link
            )
        }
        EditOutcome::RowNotFound => "⚠️ Failed to update resource: Resource not found.".to_string(),
    };
    state.channel.send(from, &reply).map_err(BotError::Channel)?;
    Ok(())
}

pub(crate) fn delete_subject<S, C>(
    state: &Arc<AppState<S, C>>,
    from: UserId,
    args: &[String],
) -> Result<(), BotError>
where
    S: Store,
    C: MessagingChannel,
{
    if !require_admin(state, from)? {
        return Ok(());
    }

    let code = match args.first().map(|raw| SubjectCode::parse(raw)) {
        Some(Ok(code)) => code,
        Some(Err(err)) => {
            state
                .channel
                .send(from, &format!("⚠️ {}", err))
                .map_err(BotError::Channel)?;
            return Ok(());
        }
        None => {
            state
                .channel
                .send(
                    from,
                    "⚠️ Please provide the subject code.\n\
                     Example: /delete_subject CSE211",
                )
                .map_err(BotError::Channel)?;
            return Ok(());
        }
    };

    let warning = format!(
        "⚠️ WARNING: You are about to delete all resources for {}\n\n\
         This action cannot be undone. Reply \"confirm\" to continue, \
         or anything else to cancel.",
        code
    );
    state.sessions.set(from, Flow::DeleteConfirm { code });
    state.channel.send(from, &warning).map_err(BotError::Channel)?;
    Ok(())
}

pub(crate) fn begin_bulk_import<S, C>(state: &Arc<AppState<S, C>>, from: UserId) -> Result<(), BotError>
where
    S: Store,
    C: MessagingChannel,
{
    if !require_admin(state, from)? {
        return Ok(());
    }

    state.sessions.set(from, Flow::AwaitingJson);
    state
        .channel
        .send(
            from,
            "📚 Bulk resource upload\n\n\
             Please upload a JSON file with the following format:\n\n\
             [\n\
             \x20\x20{\n\
             \x20\x20\x20\x20\"subject_code\": \"CSE211\",\n\
             \x20\x20\x20\x20\"subject_name\": \"Data Structures\",\n\
             \x20\x20\x20\x20\"unit\": 1,\n\
             \x20\x20\x20\x20\"type\": \"notes\",\n\
             \x20\x20\x20\x20\"link\": \"https://example.com/notes.pdf\"\n\
             \x20\x20}\n\
             ]\n\n\
             Each object must contain:\n\
             - subject_code: course code (e.g., CSE211)\n\
             - subject_name: full name of the subject\n\
             - unit: unit number (1-6)\n\
             - type: one of notes, slides, past-papers (ppt and pyq work too)\n\
             - link: URL starting with http:// or https://\n\n\
             Now, please upload your JSON file.",
        )
        .map_err(BotError::Channel)?;
    Ok(())
}

/// Process an uploaded JSON document for the admin who asked for one
pub(crate) fn finish_bulk_import<S, C>(
    state: &Arc<AppState<S, C>>,
    from: UserId,
    content: &[u8],
) -> Result<(), BotError>
where
    S: Store,
    C: MessagingChannel,
{
    let reply = match catalog::bulk_import(&state.store, content)? {
        BulkImportOutcome::MalformedJson => {
            "⚠️ Invalid JSON format. Please check your file and try again.".to_string()
        }
        BulkImportOutcome::NotAnArray => {
            "⚠️ Invalid JSON format. The file must contain a list of resource objects.".to_string()
        }
        BulkImportOutcome::Completed(report) => {
            tracing::info!(
                admin = %from,
                succeeded = report.succeeded,
                failed = report.failed,
                "Bulk import finished"
            );
            render_import_report(&report)
        }
    };
    state.channel.send(from, &reply).map_err(BotError::Channel)?;
    Ok(())
}

pub(crate) fn stats<S, C>(state: &Arc<AppState<S, C>>, from: UserId) -> Result<(), BotError>
where
    S: Store,
    C: MessagingChannel,
{
    if !require_admin(state, from)? {
        return Ok(());
    }

    let stats = state.store.usage_stats()?;
    let most_accessed = stats
        .most_accessed
        .as_ref()
        .map(|subject| subject.code.as_str())
        .unwrap_or("None");
    let reply = format!(
        "👥 Total users: {}\n\
         🔓 Active subscribers: {}\n\
         📦 Most accessed subject: {}",
        stats.total_users, stats.active_subscribers, most_accessed
    );
    state.channel.send(from, &reply).map_err(BotError::Channel)?;
    Ok(())
}

pub(crate) fn panel<S, C>(state: &Arc<AppState<S, C>>, from: UserId) -> Result<(), BotError>
where
    S: Store,
    C: MessagingChannel,
{
    if !require_admin(state, from)? {
        return Ok(());
    }

    let stats = state.store.usage_stats()?;
    let pending = approvals::pending(&state.store)?;
    let most_accessed = stats
        .most_accessed
        .as_ref()
        .map(|subject| subject.code.as_str())
        .unwrap_or("None");

    let mut message = format!(
        "🛠️ ADMIN CONTROL PANEL\n\n\
         📊 System overview\n\
         - Total users: {} | Active subscribers: {}\n\
         - Verified payments: {} | Pending requests: {}\n\
         - Most accessed subject: {}\n\
         - Time: {}\n",
        stats.total_users,
        stats.active_subscribers,
        stats.verified_payments,
        stats.pending_payments,
        most_accessed,
        Utc::now().format("%Y-%m-%d %H:%M:%S"),
    );

    if pending.is_empty() {
        message.push_str("\nNo pending verification requests.\n");
    } else {
        message.push_str(&format!(
            "\n💳 Pending verification requests ({} total):\n",
            pending.len()
        ));
        for (position, request) in pending.iter().take(5).enumerate() {
            message.push_str(&format!(
                "{}. User ID: {}\n\
                 \x20\x20\x20Reference: {}\n\
                 \x20\x20\x20Time: {}\n",
                position + 1,
                request.user,
                request.reference,
                request.submitted_at.format("%Y-%m-%d %H:%M:%S"),
            ));
        }
        if pending.len() > 5 {
            message.push_str(&format!("...and {} more pending requests.\n", pending.len() - 5));
        }
    }

    message.push_str(ADMIN_MENU);
    state.channel.send(from, &message).map_err(BotError::Channel)?;
    Ok(())
}

fn parse_target(
    code: &str,
    unit: &str,
    kind: &str,
) -> studydesk_core::Result<(SubjectCode, Unit, ResourceKind)> {
    Ok((SubjectCode::parse(code)?, Unit::parse(unit)?, ResourceKind::parse(kind)?))
}

fn render_import_report(report: &ImportReport) -> String {
    if report.succeeded == 0 {
        let mut message = "⚠️ Failed to add any resources. \
                           Please check the following errors:\n"
            .to_string();
        for (item, reason) in report.errors.iter().take(10) {
            message.push_str(&format!("\n- Resource #{}: {}", item, reason));
        }
        if report.errors.len() > 10 {
            message.push_str(&format!("\n- ... and {} more errors.", report.errors.len() - 10));
        }
        return message;
    }

    let mut message = format!(
        "✅ Successfully uploaded {} resources for subject(s): {}.",
        report.succeeded,
        report.subjects.join(", ")
    );
    if report.failed > 0 {
        message.push_str(&format!(
            "\n\n⚠️ {} resources could not be added due to errors:",
            report.failed
        ));
        for (item, reason) in report.errors.iter().take(5) {
            message.push_str(&format!("\n- Resource #{}: {}", item, reason));
        }
        if report.errors.len() > 5 {
            message.push_str(&format!("\n- ... and {} more errors.", report.errors.len() - 5));
        }
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(succeeded: u32, errors: Vec<(usize, String)>) -> ImportReport {
        ImportReport {
            succeeded,
            failed: errors.len() as u32,
            errors,
            subjects: vec!["CSE211".to_string()],
        }
    }

    #[test]
    fn test_clean_import_report() {
        let rendered = render_import_report(&report(3, Vec::new()));
        assert!(rendered.starts_with("✅ Successfully uploaded 3 resources"));
        assert!(rendered.contains("CSE211"));
        assert!(!rendered.contains("errors"));
    }

    #[test]
    fn test_mixed_import_report_caps_error_lines() {
        let errors = (1..=8)
            .map(|item| (item, format!("bad item {}", item)))
            .collect();
        let rendered = render_import_report(&report(2, errors));
        assert!(rendered.contains("⚠️ 8 resources could not be added"));
        assert!(rendered.contains("- Resource #5: bad item 5"));
        assert!(!rendered.contains("- Resource #6:"));
        assert!(rendered.contains("... and 3 more errors."));
    }

    #[test]
    fn test_failed_import_report_lists_reasons() {
        let errors = vec![(1, "Missing required field: link".to_string())];
        let rendered = render_import_report(&report(0, errors));
        assert!(rendered.starts_with("⚠️ Failed to add any resources"));
        assert!(rendered.contains("- Resource #1: Missing required field: link"));
    }
}
