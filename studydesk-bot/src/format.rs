//! Message formatting for the chat surface

use rand::seq::SliceRandom;
use studydesk_core::{ResourceKind, SubjectCode, SubjectListing};

use crate::gate::FREE_SEARCH_QUOTA;

// Internal: background fills cycled through the loading frames
const FRAME_FILLS: [&str; 4] = ["░░░░░░░░", "▒▒▒▒▒▒▒▒", "▓▓▓▓▓▓▓▓", "████████"];

// Internal: ornament row picked at random per frame
const FRAME_ORNAMENTS: [&str; 5] = [
    "🟩🟨🟧🟥",
    "🟦🟪🟫⬜",
    "⬜🟦🟩🟨",
    "🟪🟦⬜🟨",
    "🟥🟧🟨🟩",
];

fn kind_marker(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Notes => "📓",
        ResourceKind::Slides => "📄",
        ResourceKind::PastPapers => "📋",
    }
}

/// The timed frame sequence shown while a listing is being "fetched".
///
/// Purely cosmetic: the first frame is sent as a fresh message and the rest
/// arrive as edits, ending with the real listing.
pub fn loading_frames(code: &SubjectCode) -> Vec<String> {
    let mut rng = rand::thread_rng();
    let phases = [
        format!("🔍 Searching for {} resources...", code),
        format!("🔎 Fetching {} information...", code),
        format!("📚 Preparing {} resources...", code),
        format!("✨ Organizing {} materials...", code),
    ];

    phases
        .into_iter()
        .enumerate()
        .map(|(i, phase)| {
            let ornament = FRAME_ORNAMENTS
                .choose(&mut rng)
                .copied()
                .unwrap_or(FRAME_ORNAMENTS[0]);
            format!("{}\n{}\n{}", ornament, FRAME_FILLS[i], phase)
        })
        .collect()
}

/// Render the full listing for a subject: header, units 1 to 6 with one line
/// per resource kind, and a quota or subscription footer.
pub fn resource_listing(
    listing: &SubjectListing,
    searches_used: u32,
    subscribed: bool,
    payment_address: &str,
) -> String {
    let mut message = format!("🎓 {}: {}\n{}\n\n", listing.code, listing.name, "✦".repeat(15));

    for (unit, links) in listing.units() {
        message.push_str(&format!("📌 UNIT {}\n", unit));
        for kind in ResourceKind::ALL {
            match links.get(kind) {
                Some(link) => {
                    message.push_str(&format!(
                        "{} {}: {}\n",
                        kind_marker(kind),
                        kind.label(),
                        link
                    ));
                }
                None => {
                    message.push_str(&format!(
                        "{} {}: Not available\n",
                        kind_marker(kind),
                        kind.label()
                    ));
                }
            }
        }
        message.push('\n');
    }

    if subscribed {
        message.push_str("✅ You have an active subscription");
    } else {
        message.push_str(&format!(
            "🔢 Searches used: {}/{}\n\n\
             💰 Upgrade to premium:\n\
             - Price: ₹21 for 1 week of unlimited searches\n\
             - Payment: send ₹21 to {}\n\
             - After payment, use /verify_payment with your payment reference ID",
            searches_used, FREE_SEARCH_QUOTA, payment_address
        ));
    }

    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use studydesk_core::{Link, Unit};

    fn listing_with_notes() -> SubjectListing {
        let code = SubjectCode::parse("CSE211").unwrap();
        let mut listing = SubjectListing::new(code, "Data Structures".to_string());
        listing.unit_mut(Unit::new(1).unwrap()).set(
            ResourceKind::Notes,
            Some(Link::parse("https://example.com/notes").unwrap()),
        );
        listing
    }

    #[test]
    fn test_loading_frames_mention_the_code() {
        let code = SubjectCode::parse("CSE211").unwrap();
        let frames = loading_frames(&code);
        assert_eq!(frames.len(), 4);
        for frame in &frames {
            assert!(frame.contains("CSE211"));
        }
    }

    #[test]
    fn test_listing_shows_links_and_gaps() {
        let text = resource_listing(&listing_with_notes(), 1, false, "pay@upi");

        assert!(text.contains("CSE211: Data Structures"));
        assert!(text.contains("UNIT 1"));
        assert!(text.contains("UNIT 6"));
        assert!(text.contains("https://example.com/notes"));
        assert!(text.contains("Slides: Not available"));
        assert!(text.contains("Searches used: 1/4"));
        assert!(text.contains("pay@upi"));
    }

    #[test]
    fn test_listing_footer_for_subscribers() {
        let text = resource_listing(&listing_with_notes(), 2, true, "pay@upi");

        assert!(text.contains("active subscription"));
        assert!(!text.contains("Searches used"));
        assert!(!text.contains("pay@upi"));
    }
}
