//! FAQ seeding: clears the faqs table and repopulates it.

use tracing::info;

use concierge_core::error::ConciergeError;
use concierge_core::types::FaqEntry;

use crate::db::StoreHandle;
use crate::repository::FaqRepository;

/// The stock hotel FAQ set.
pub fn default_faqs() -> Vec<FaqEntry> {
    vec![
        FaqEntry::new(
            "What are check-in and check-out timings?",
            "Check-in from 2:00 PM; check-out by 12:00 PM. Early check-in and late check-out are subject to availability.",
        ),
        FaqEntry::new(
            "Is breakfast included?",
            "Breakfast inclusion depends on the room rate. Please check your booking details or ask for breakfast add-on at reception.",
        ),
        FaqEntry::new(
            "Do you have free WiFi?",
            "Yes — complimentary high-speed WiFi is available across the property for all guests.",
        ),
        FaqEntry::new(
            "What is your cancellation policy?",
            "Cancellation policies vary by rate and season. Standard rates may allow free cancellation up to 24 hours before arrival.",
        ),
        FaqEntry::new(
            "Is parking available?",
            "Yes, we offer complimentary self-parking for hotel guests. Valet is available on request for a small fee.",
        ),
        FaqEntry::new(
            "Do you accept pets?",
            "Sorry, pets are not allowed except for service animals with prior notification.",
        ),
    ]
}

/// Replace the FAQ collection with `entries`.
///
/// Idempotent: running it twice leaves exactly `entries` in the table.
/// Unlike the request path, seeding requires a configured database.
pub fn seed_faqs(handle: &StoreHandle, entries: &[FaqEntry]) -> Result<usize, ConciergeError> {
    let db = handle.require()?;
    let count = FaqRepository::new(db.clone()).replace_all(entries)?;
    info!(count, "Seeded FAQs");
    Ok(count)
}
