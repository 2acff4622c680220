//! Who the records belong to.

use serde::{Deserialize, Serialize};

/// Identity of the signed-in user, shown beside the coin balance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Login name.
    pub username: String,
    /// Contact address.
    pub email: String,
}

impl Account {
    /// Creates an account record.
    #[must_use]
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
        }
    }
}
