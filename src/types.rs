/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Identity of the authenticated requester.
///
/// Every store call that touches tags, ingredients or recipes takes one of
/// these and only ever sees rows owned by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
