//! User commands: /start, /help, /my_history, /verify_payment

use std::sync::Arc;

use crate::approvals;
use crate::channel::MessagingChannel;
use crate::error::BotError;
use crate::gate::{self, FREE_SEARCH_QUOTA};
use crate::state::AppState;
use crate::store::{Store, UserId};

use super::admin::ADMIN_MENU;

pub(crate) fn start<S, C>(state: &Arc<AppState<S, C>>, from: UserId) -> Result<(), BotError>
where
    S: Store,
    C: MessagingChannel,
{
    state.store.ensure_user(from)?;

    let greeting = format!(
        "👋 Hello!\n\n\
         Welcome to Studydesk, your personal academic assistant.\n\
         Mention any subject code like CSE211 in your message and I'll fetch \
         all available resources:\n\n\
         📓 Notes\n\
         📄 Slides\n\
         📋 Past year question papers\n\n\
         🎁 You have {} free searches to explore. After that, unlock unlimited \
         access for 1 week by paying ₹21.\n\n\
         Let's get started! Type your subject code now 👇",
        FREE_SEARCH_QUOTA
    );
    state.channel.send(from, &greeting).map_err(BotError::Channel)?;
    Ok(())
}

pub(crate) fn help<S, C>(state: &Arc<AppState<S, C>>, from: UserId) -> Result<(), BotError>
where
    S: Store,
    C: MessagingChannel,
{
    let searches_used = state
        .store
        .get_user(from)?
        .map(|record| record.search_count)
        .unwrap_or(0);
    let status = if gate::subscription_expiry(&state.store, from)?.is_some() {
        "✅ Active subscription".to_string()
    } else {
        format!("🔢 Free searches: {}/{}", searches_used, FREE_SEARCH_QUOTA)
    };

    let mut message = format!(
        "🤖 Studydesk help\n\n\
         How to use:\n\
         - Mention a subject code like CSE211 in your message\n\
         - I'll show you the available resources for that subject\n\n\
         User commands:\n\
         - /start - Start the assistant\n\
         - /help - Show this help message\n\
         - /my_history - Check your usage and subscription status\n\
         - /verify_payment <ref_id> - Submit a payment for verification\n\n\
         Your status:\n\
         {}\n\n\
         Subscription:\n\
         - Price: ₹21 for 1 week of unlimited searches\n\
         - Payment: send ₹21 to {}\n\
         - After payment, use /verify_payment with your payment reference ID\n\
         - Example: /verify_payment 12345678",
        status, state.config.payment_address
    );
    if state.is_admin(from) {
        message.push_str(ADMIN_MENU);
    }

    state.channel.send(from, &message).map_err(BotError::Channel)?;
    Ok(())
}

pub(crate) fn my_history<S, C>(state: &Arc<AppState<S, C>>, from: UserId) -> Result<(), BotError>
where
    S: Store,
    C: MessagingChannel,
{
    let record = match state.store.get_user(from)? {
        Some(record) => record,
        None => {
            let message = format!(
                "👋 Hello!\n\n\
                 ✅ You haven't made any searches yet. You have {} free searches available.\n\
                 📅 Subscription: Not active. Upgrade for unlimited access.",
                FREE_SEARCH_QUOTA
            );
            state.channel.send(from, &message).map_err(BotError::Channel)?;
            return Ok(());
        }
    };

    // Reads through the gate so a lapsed subscription shows as inactive
    let message = match gate::subscription_expiry(&state.store, from)? {
        Some(expiry) => format!(
            "👋 Hello!\n\n\
             ✅ You have unlimited searches (subscription active).\n\
             📅 Subscription: Active till {}",
            expiry.format("%d-%b-%Y")
        ),
        None => format!(
            "👋 Hello!\n\n\
             ✅ You've used {}/{} free searches.\n\
             📅 Subscription: Not active. Upgrade for unlimited access.",
            record.search_count, FREE_SEARCH_QUOTA
        ),
    };
    state.channel.send(from, &message).map_err(BotError::Channel)?;
    Ok(())
}

pub(crate) fn verify_payment<S, C>(
    state: &Arc<AppState<S, C>>,
    from: UserId,
    args: &[String],
) -> Result<(), BotError>
where
    S: Store,
    C: MessagingChannel,
{
    let reference = match args.first() {
        Some(reference) => reference.as_str(),
        None => {
            state
                .channel
                .send(
                    from,
                    "⚠️ Please provide your payment reference ID.\n\
                     Example: /verify_payment 12345678",
                )
                .map_err(BotError::Channel)?;
            return Ok(());
        }
    };

    match approvals::submit(&state.store, from, reference) {
        Ok(()) => {
            tracing::info!(user = %from, reference = %reference, "Payment reference submitted");
            let receipt = format!(
                "✅ Payment reference {} received!\n\n\
                 Your payment will be verified by an admin shortly. \
                 You'll receive a notification once it's confirmed.",
                reference
            );
            state.channel.send(from, &receipt).map_err(BotError::Channel)?;

            // The submission stands even when the admin cannot be reached
            let notice = format!(
                "🔔 New payment verification request\n\n\
                 - User ID: {}\n\
                 - Reference ID: {}\n\n\
                 To verify: /verify {}",
                from, reference, reference
            );
            if let Err(err) = state.channel.send(UserId(state.config.admin_id), &notice) {
                tracing::warn!(
                    reference = %reference, error = %err,
                    "Failed to notify admin of payment request"
                );
            }
        }
        Err(BotError::DuplicateReference(_)) => {
            state
                .channel
                .send(
                    from,
                    "⚠️ This reference ID has already been submitted. \
                     Please check the ID or contact support.",
                )
                .map_err(BotError::Channel)?;
        }
        Err(err) => return Err(err),
    }

    Ok(())
}
