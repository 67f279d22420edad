// handlers/mod.rs - HTTP handlers grouped by access tier
//
// Public (no auth) → Protected (bearer token, owner-scoped)

pub mod public;
pub mod protected;
