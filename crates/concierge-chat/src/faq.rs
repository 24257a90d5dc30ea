//! Rule-based answers for the most common hotel questions.
//!
//! Checked before any LLM call. Rules are tried in order against the
//! lower-cased transcript and the first substring hit wins.

struct FaqRule {
    needles: &'static [&'static str],
    answer: &'static str,
}

const RULES: &[FaqRule] = &[
    FaqRule {
        needles: &["check-in", "check in", "checkin"],
        answer: "Standard check-in time is 3:00 PM. Early check-in may be available on request.",
    },
    FaqRule {
        needles: &["wifi", "wi-fi", "internet"],
        answer: "Yes — complimentary Wi-Fi is available for guests. Connect to our guest network at check-in.",
    },
    FaqRule {
        needles: &["breakfast"],
        answer: "Breakfast is served 7:00–10:30 AM in the dining area on the ground floor.",
    },
    FaqRule {
        needles: &["cancellation", "cancel"],
        answer: "Cancellation policy varies by rate — typically free cancellation up to 24 hours before arrival. Check your booking confirmation for details.",
    },
    FaqRule {
        needles: &["parking"],
        answer: "We offer on-site parking for a daily fee. Please contact reception for availability.",
    },
];

/// Canned answer for `transcript`, or `None` when no rule applies.
pub fn match_faq(transcript: &str) -> Option<&'static str> {
    if transcript.is_empty() {
        return None;
    }
    let lowered = transcript.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.needles.iter().any(|n| lowered.contains(n)))
        .map(|rule| rule.answer)
}
