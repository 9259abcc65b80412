//! Message dispatch
//!
//! Entry points for the two transport events: a text message and a document
//! upload. Precedence for text is fixed: slash commands first, then any
//! active flow, then subject-code detection, and silence for everything else.

pub mod command;
pub mod flows;

mod admin;
mod lookup;
mod user;

pub use command::Command;
pub use flows::{Flow, GuidedStep};

use std::sync::Arc;

use studydesk_core::SubjectCode;

use crate::channel::MessagingChannel;
use crate::error::BotError;
use crate::state::AppState;
use crate::store::{Store, UserId};

/// Handle one inbound text message end to end.
///
/// Failures are logged and answered with a generic apology; nothing
/// propagates to the transport loop.
pub async fn handle_message<S, C>(state: &Arc<AppState<S, C>>, from: UserId, text: &str)
where
    S: Store + 'static,
    C: MessagingChannel + 'static,
{
    if let Err(err) = dispatch_message(state, from, text).await {
        tracing::error!(user = %from, error = %err, "Message handling failed");
        if let Err(err) = state
            .channel
            .send(from, "⚠️ Something went wrong. Please try again later.")
        {
            tracing::warn!(user = %from, error = %err, "Failed to deliver failure notice");
        }
    }
}

/// Handle one uploaded document end to end
pub fn handle_document<S, C>(
    state: &Arc<AppState<S, C>>,
    from: UserId,
    file_name: &str,
    content: &[u8],
) where
    S: Store,
    C: MessagingChannel,
{
    if let Err(err) = dispatch_document(state, from, file_name, content) {
        tracing::error!(user = %from, file = %file_name, error = %err, "Document handling failed");
        if let Err(err) = state
            .channel
            .send(from, "⚠️ Something went wrong. Please try again later.")
        {
            tracing::warn!(user = %from, error = %err, "Failed to deliver failure notice");
        }
    }
}

async fn dispatch_message<S, C>(
    state: &Arc<AppState<S, C>>,
    from: UserId,
    text: &str,
) -> Result<(), BotError>
where
    S: Store + 'static,
    C: MessagingChannel + 'static,
{
    let text = text.trim();
    if text.is_empty() {
        return Ok(());
    }

    // A slash message is a command and nothing else
    if let Some(stripped) = text.strip_prefix('/') {
        return match Command::parse(stripped) {
            Some(command) => dispatch_command(state, from, command),
            None => {
                tracing::debug!(user = %from, "Ignoring unknown command");
                Ok(())
            }
        };
    }

    // An active flow captures the message before code detection
    if let Some(flow) = state.sessions.take(from) {
        match flow {
            Flow::GuidedEntry(step) => return flows::advance_guided_entry(state, from, step, text),
            Flow::DeleteConfirm { code } => {
                return flows::finish_delete_confirm(state, from, code, text)
            }
            Flow::AwaitingJson => {
                // Waits for a document, not text; put it back and fall through
                state.sessions.set(from, Flow::AwaitingJson);
            }
        }
    }

    match SubjectCode::find_in(text) {
        Some(code) => lookup::run(state, from, code).await,
        None => Ok(()),
    }
}

fn dispatch_command<S, C>(
    state: &Arc<AppState<S, C>>,
    from: UserId,
    command: Command,
) -> Result<(), BotError>
where
    S: Store,
    C: MessagingChannel,
{
    match command {
        Command::Start => user::start(state, from),
        Command::Help => user::help(state, from),
        Command::MyHistory => user::my_history(state, from),
        Command::VerifyPayment(args) => user::verify_payment(state, from, &args),
        Command::AddResource(args) => admin::begin_guided_entry(state, from, &args),
        Command::Verify(args) => admin::verify(state, from, &args),
        Command::GrantAccess(args) => admin::grant_access(state, from, &args),
        Command::RemoveResource(args) => admin::remove_resource(state, from, &args),
        Command::EditResource(args) => admin::edit_resource(state, from, &args),
        Command::DeleteSubject(args) => admin::delete_subject(state, from, &args),
        Command::UploadJson => admin::begin_bulk_import(state, from),
        Command::Stats => admin::stats(state, from),
        Command::Admin => admin::panel(state, from),
    }
}

fn dispatch_document<S, C>(
    state: &Arc<AppState<S, C>>,
    from: UserId,
    file_name: &str,
    content: &[u8],
) -> Result<(), BotError>
where
    S: Store,
    C: MessagingChannel,
{
    let flow = match state.sessions.take(from) {
        Some(flow) => flow,
        None => {
            tracing::debug!(user = %from, file = %file_name, "Ignoring unsolicited document");
            return Ok(());
        }
    };

    match flow {
        Flow::AwaitingJson => {
            if !state.is_admin(from) {
                return Ok(());
            }
            if !file_name.to_lowercase().ends_with(".json") {
                // Wrong kind of file; the flow keeps waiting
                state.sessions.set(from, Flow::AwaitingJson);
                return Ok(());
            }
            admin::finish_bulk_import(state, from, content)
        }
        other => {
            // Documents mean nothing to the other flows
            state.sessions.set(from, other);
            Ok(())
        }
    }
}
