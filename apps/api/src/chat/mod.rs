// Conversational intake: sessions, messages, and the coaching prompt.
// All AI calls go through the inference gateway; no direct HTTP from here.

pub mod handlers;
pub mod prompts;
pub mod sessions;
