//! Subject lookup
//!
//! The main flow: a message mentioning a subject code turns into a resource
//! listing, behind the quota gate. The listing is revealed by editing a
//! placeholder message through a short loading animation.

use std::sync::Arc;
use std::time::Duration;

use studydesk_core::SubjectCode;

use crate::channel::{MessageId, MessagingChannel};
use crate::error::BotError;
use crate::format;
use crate::gate::{self, Access, DenialReason};
use crate::catalog;
use crate::state::AppState;
use crate::store::{Store, UserId};

const FIRST_FRAME_DELAY: Duration = Duration::from_millis(300);
const FRAME_DELAY: Duration = Duration::from_millis(500);

pub(crate) async fn run<S, C>(
    state: &Arc<AppState<S, C>>,
    from: UserId,
    code: SubjectCode,
) -> Result<(), BotError>
where
    S: Store + 'static,
    C: MessagingChannel + 'static,
{
    state.store.ensure_user(from)?;

    let (subscribed, searches_used) = match gate::check(&state.store, from)? {
        Access::Granted { subscribed, searches_used } => (subscribed, searches_used),
        Access::Denied(reason) => {
            tracing::info!(user = %from, code = %code, ?reason, "Lookup denied");
            state
                .channel
                .send(from, &denial_message(reason, &state.config.payment_address))
                .map_err(BotError::Channel)?;
            return Ok(());
        }
    };

    let listing = match catalog::subject_listing(&state.store, &code)? {
        Some(listing) => listing,
        None => {
            state
                .channel
                .send(from, &format!("⚠️ No resources found for subject code: {}", code))
                .map_err(BotError::Channel)?;
            return Ok(());
        }
    };

    // The listing is going out: count the access and consume the quota now,
    // before the cosmetic animation, so a dropped edit cannot lose either.
    state.store.increment_subject_access(&code)?;
    let reply = format::resource_listing(&listing, searches_used, subscribed, &state.config.payment_address);
    if !subscribed {
        gate::record_search(&state.store, from)?;
    }

    tracing::info!(user = %from, code = %code, subscribed, "Delivering resource listing");

    let frames = format::loading_frames(&code);
    let placeholder = state.channel.send(from, &frames[0]).map_err(BotError::Channel)?;

    let state = Arc::clone(state);
    tokio::spawn(async move {
        animate(state, from, placeholder, frames, reply).await;
    });

    Ok(())
}

/// Step the placeholder through the remaining frames, ending on the listing.
/// Edit failures end the animation; the lookup itself already succeeded.
async fn animate<S, C>(
    state: Arc<AppState<S, C>>,
    to: UserId,
    message: MessageId,
    frames: Vec<String>,
    reply: String,
) where
    S: Store,
    C: MessagingChannel,
{
    let mut delay = FIRST_FRAME_DELAY;
    for frame in frames.iter().skip(1) {
        tokio::time::sleep(delay).await;
        delay = FRAME_DELAY;
        if let Err(err) = state.channel.edit(to, message, frame) {
            tracing::warn!(user = %to, message = %message, error = %err, "Loading animation aborted");
            return;
        }
    }

    tokio::time::sleep(delay).await;
    if let Err(err) = state.channel.edit(to, message, &reply) {
        tracing::warn!(user = %to, message = %message, error = %err, "Failed to reveal resource listing");
    }
}

fn denial_message(reason: DenialReason, payment_address: &str) -> String {
    let header = match reason {
        DenialReason::SubscriptionLapsed => {
            "⚠️ Your subscription has expired\n\n\
             To continue accessing resources, please renew your subscription:"
        }
        DenialReason::QuotaExhausted => {
            "⚠️ You've used all your free searches\n\n\
             To continue accessing resources, please subscribe:"
        }
    };

    format!(
        "{}\n\
         - Send ₹21 to {}\n\
         - After payment, use /verify_payment with your payment reference ID\n\
         - Example: /verify_payment 12345678\n\n\
         Your subscription will be active for 1 week after verification.",
        header, payment_address
    )
}
