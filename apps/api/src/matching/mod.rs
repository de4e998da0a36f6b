// Match scoring and the bookmark/apply actions on stored matches.
// Scoring goes through the inference gateway; results are cached per
// (session, posting) and recomputed only on first access or explicit refresh.

pub mod handlers;
pub mod orchestrator;
