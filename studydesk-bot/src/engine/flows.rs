//! Multi-turn conversation flows
//!
//! Each user has at most one active flow. Guided entry collects one resource
//! link over several messages; delete confirmation holds a subject code until
//! the admin confirms; the bulk-import flow waits for a JSON document.

use std::sync::Arc;

use studydesk_core::{Link, ResourceKind, SubjectCode, Unit};

use crate::catalog;
use crate::channel::MessagingChannel;
use crate::error::BotError;
use crate::state::AppState;
use crate::store::{Store, UserId};

/// Active flow for one user
#[derive(Debug, Clone)]
pub enum Flow {
    GuidedEntry(GuidedStep),
    DeleteConfirm { code: SubjectCode },
    AwaitingJson,
}

/// Where a guided resource entry currently is, with everything collected so far
#[derive(Debug, Clone)]
pub enum GuidedStep {
    SubjectCode,
    SubjectName {
        code: SubjectCode,
    },
    Unit {
        code: SubjectCode,
        name: String,
    },
    Kind {
        code: SubjectCode,
        name: String,
        unit: Unit,
    },
    Link {
        code: SubjectCode,
        name: String,
        unit: Unit,
        kind: ResourceKind,
    },
    Confirm {
        code: SubjectCode,
        name: String,
        unit: Unit,
        kind: ResourceKind,
        link: Link,
    },
}

fn affirmative(text: &str) -> bool {
    text.to_lowercase().contains("confirm") || text.contains("✅")
}

/// Advance a guided entry by one message.
///
/// The caller has already removed the flow from the session table; every
/// non-terminal branch stores the follow-up step back before prompting.
pub(crate) fn advance_guided_entry<S, C>(
    state: &Arc<AppState<S, C>>,
    from: UserId,
    step: GuidedStep,
    text: &str,
) -> Result<(), BotError>
where
    S: Store,
    C: MessagingChannel,
{
    // Re-checked at every message, not just at flow start
    if !state.is_admin(from) {
        return Ok(());
    }

    if text.eq_ignore_ascii_case("cancel") {
        state
            .channel
            .send(from, "🚫 Resource addition canceled.\n\nUse /add_resource to start again.")
            .map_err(BotError::Channel)?;
        return Ok(());
    }

    match step {
        GuidedStep::SubjectCode => {
            let code = match SubjectCode::parse(text) {
                Ok(code) => code,
                Err(_) => {
                    state.sessions.set(from, Flow::GuidedEntry(GuidedStep::SubjectCode));
                    state
                        .channel
                        .send(
                            from,
                            "⚠️ Invalid subject code format. Please enter a valid code like CSE211:",
                        )
                        .map_err(BotError::Channel)?;
                    return Ok(());
                }
            };

            // An existing subject keeps its stored name; skip the name step
            match catalog::subject_name(&state.store, &code)? {
                Some(name) => {
                    let prompt = format!(
                        "📚 Add new resource - Step 2/5\n\n\
                         Subject {}: {} found in the catalog.\n\n\
                         Please enter the unit number (1-6):",
                        code, name
                    );
                    state
                        .sessions
                        .set(from, Flow::GuidedEntry(GuidedStep::Unit { code, name }));
                    state.channel.send(from, &prompt).map_err(BotError::Channel)?;
                }
                None => {
                    let prompt = format!(
                        "🌟 Add new resource - Step 2/5\n\n\
                         Subject code {} is not in the catalog yet.\n\n\
                         Please enter the full subject name:",
                        code
                    );
                    state
                        .sessions
                        .set(from, Flow::GuidedEntry(GuidedStep::SubjectName { code }));
                    state.channel.send(from, &prompt).map_err(BotError::Channel)?;
                }
            }
        }

        GuidedStep::SubjectName { code } => match studydesk_core::subject::validate_name(text) {
            Ok(name) => {
                let name = name.to_string();
                let prompt = format!(
                    "📚 Add new resource - Step 3/5\n\n\
                     Subject name: {}\n\n\
                     Please enter the unit number (1-6):",
                    name
                );
                state
                    .sessions
                    .set(from, Flow::GuidedEntry(GuidedStep::Unit { code, name }));
                state.channel.send(from, &prompt).map_err(BotError::Channel)?;
            }
            Err(_) => {
                state
                    .sessions
                    .set(from, Flow::GuidedEntry(GuidedStep::SubjectName { code }));
                state
                    .channel
                    .send(
                        from,
                        "⚠️ Subject name is too short or too long. \
                         Please enter a valid name (3-100 characters):",
                    )
                    .map_err(BotError::Channel)?;
            }
        },

        GuidedStep::Unit { code, name } => match Unit::parse(text) {
            Ok(unit) => {
                let prompt = format!(
                    "📚 Add new resource - Step 4/5\n\n\
                     Unit number: {}\n\n\
                     Please enter the resource type (notes, slides, past-papers):",
                    unit
                );
                state
                    .sessions
                    .set(from, Flow::GuidedEntry(GuidedStep::Kind { code, name, unit }));
                state.channel.send(from, &prompt).map_err(BotError::Channel)?;
            }
            Err(_) => {
                state
                    .sessions
                    .set(from, Flow::GuidedEntry(GuidedStep::Unit { code, name }));
                state
                    .channel
                    .send(
                        from,
                        "⚠️ Unit number must be between 1 and 6. Please enter a valid unit number:",
                    )
                    .map_err(BotError::Channel)?;
            }
        },

        GuidedStep::Kind { code, name, unit } => match ResourceKind::parse(text) {
            Ok(kind) => {
                let prompt = format!(
                    "📚 Add new resource - Step 5/5\n\n\
                     Resource type: {}\n\n\
                     Please enter the resource link (must start with http:// or https://):",
                    kind
                );
                state
                    .sessions
                    .set(from, Flow::GuidedEntry(GuidedStep::Link { code, name, unit, kind }));
                state.channel.send(from, &prompt).map_err(BotError::Channel)?;
            }
            Err(_) => {
                state
                    .sessions
                    .set(from, Flow::GuidedEntry(GuidedStep::Kind { code, name, unit }));
                state
                    .channel
                    .send(
                        from,
                        "⚠️ Invalid resource type. Please enter one of: notes, slides, past-papers:",
                    )
                    .map_err(BotError::Channel)?;
            }
        },

        GuidedStep::Link { code, name, unit, kind } => match Link::parse(text) {
            Ok(link) => {
                let prompt = format!(
                    "📝 Resource addition - confirmation\n\n\
                     Please review the resource details:\n\n\
                     - Subject code: {}\n\
                     - Subject name: {}\n\
                     - Unit number: {}\n\
                     - Resource type: {}\n\
                     - Link: {}\n\n\
                     Reply \"confirm\" to save, or anything else to discard.",
                    code, name, unit, kind, link
                );
                state.sessions.set(
                    from,
                    Flow::GuidedEntry(GuidedStep::Confirm { code, name, unit, kind, link }),
                );
                state.channel.send(from, &prompt).map_err(BotError::Channel)?;
            }
            Err(_) => {
                state
                    .sessions
                    .set(from, Flow::GuidedEntry(GuidedStep::Link { code, name, unit, kind }));
                state
                    .channel
                    .send(
                        from,
                        "⚠️ Link must start with http:// or https://. Please enter a valid link:",
                    )
                    .map_err(BotError::Channel)?;
            }
        },

        GuidedStep::Confirm { code, name, unit, kind, link } => {
            if affirmative(text) {
                catalog::upsert(&state.store, &code, &name, unit, kind, link)?;
                tracing::info!(
                    user = %from, code = %code, unit = %unit, kind = %kind,
                    "Resource added via guided entry"
                );
                let done = format!(
                    "✨ Resource added successfully!\n\n\
                     - Subject: {}: {}\n\
                     - Unit: {}\n\
                     - Type: {}\n\n\
                     Use /add_resource again to add another resource.",
                    code, name, unit, kind
                );
                state.channel.send(from, &done).map_err(BotError::Channel)?;
            } else {
                state
                    .channel
                    .send(from, "🚫 Resource addition canceled.\n\nUse /add_resource to start again.")
                    .map_err(BotError::Channel)?;
            }
        }
    }

    Ok(())
}

/// Resolve a pending subject deletion with the admin's answer
pub(crate) fn finish_delete_confirm<S, C>(
    state: &Arc<AppState<S, C>>,
    from: UserId,
    code: SubjectCode,
    text: &str,
) -> Result<(), BotError>
where
    S: Store,
    C: MessagingChannel,
{
    if !state.is_admin(from) {
        return Ok(());
    }

    if affirmative(text) {
        let removed = catalog::delete_subject(&state.store, &code)?;
        if removed > 0 {
            tracing::info!(user = %from, code = %code, rows = removed, "Subject deleted");
            let done = format!(
                "✅ Deleted all resources for {} ({} entries removed).",
                code, removed
            );
            state.channel.send(from, &done).map_err(BotError::Channel)?;
        } else {
            state
                .channel
                .send(from, "⚠️ Failed to delete subject: Subject not found.")
                .map_err(BotError::Channel)?;
        }
    } else {
        state
            .channel
            .send(from, "🚫 Subject deletion cancelled.")
            .map_err(BotError::Channel)?;
    }

    Ok(())
}
