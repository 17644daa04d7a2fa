//! The identity/session contract.
//!
//! The store does not authenticate anyone; it consumes a [`Session`]
//! produced by whatever identity provider the application embeds. The
//! session distinguishes three situations:
//!
//! - not yet resolved (the provider is still determining who, if anyone,
//!   is signed in),
//! - resolved to no user (signed out),
//! - resolved to a user with a [`Role`].
//!
//! Role gating: `Operator` sessions only see tasks assigned to them;
//! `Admin` sessions see everything and may run privileged bulk
//! operations.

use serde::{Deserialize, Serialize};

/// The permission level of a signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Sees and manages every task; may run privileged bulk operations.
    Admin,
    /// Sees only tasks assigned to them.
    Operator,
}

/// The current identity state, as reported by the identity provider.
///
/// # Examples
///
/// ```
/// use tack_config::{Role, Session};
///
/// let session = Session::unresolved();
/// assert!(!session.is_ready());
///
/// let session = Session::authenticated("alice", Role::Operator);
/// assert!(session.is_ready());
/// assert_eq!(session.user_id(), Some("alice"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: Option<String>,
    role: Option<Role>,
    resolved: bool,
}

impl Session {
    /// A session whose identity has not been determined yet.
    #[must_use]
    pub const fn unresolved() -> Self {
        Self {
            user_id: None,
            role: None,
            resolved: false,
        }
    }

    /// A resolved session with nobody signed in.
    #[must_use]
    pub const fn signed_out() -> Self {
        Self {
            user_id: None,
            role: None,
            resolved: true,
        }
    }

    /// A resolved session for a signed-in user.
    #[must_use]
    pub fn authenticated(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: Some(user_id.into()),
            role: Some(role),
            resolved: true,
        }
    }

    /// Returns `true` once the identity provider has answered, whether or
    /// not anyone is signed in.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.resolved
    }

    /// The signed-in user id, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// The signed-in user's role, if any.
    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        self.role
    }

    /// Returns `true` if the session belongs to an admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::unresolved()
    }
}
