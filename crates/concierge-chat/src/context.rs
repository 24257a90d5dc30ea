//! Prompt assembly for the text path.

use concierge_core::types::Interaction;

/// System prompt for the text path.
pub const SYSTEM_PROMPT: &str =
    "You are a helpful hotel voice assistant. Keep answers short and friendly.";

/// Render recent history plus the new user line into one prompt.
///
/// `recent` is newest first, as returned by the history store; it is
/// rendered oldest first.
pub fn build_prompt(system_prompt: &str, recent: &[Interaction], transcript: &str) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(recent.len() + 3);
    parts.push(system_prompt.to_string());
    parts.push("\nConversation history:".to_string());
    for turn in recent.iter().rev() {
        parts.push(format!("{}: {}", turn.role.label(), turn.text));
    }
    parts.push("\nUser:".to_string());

    format!("{}\nUser: {}", parts.join("\n"), transcript)
}

/// First `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
