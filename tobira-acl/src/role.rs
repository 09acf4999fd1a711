// SPDX-License-Identifier: MIT OR Apache-2.0

//! Role identifiers and their classification into groups and users.
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Role of everyone, including anonymous visitors. Root of the group graph.
pub const ROLE_ANONYMOUS: &str = "ROLE_ANONYMOUS";

/// Role of every logged-in user.
pub const ROLE_USER: &str = "ROLE_USER";

/// Role of administrators, they implicitly have access to everything.
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

/// Role of the administrator user account.
pub const ROLE_USER_ADMIN: &str = "ROLE_USER_ADMIN";

/// Prefix every role name needs to have to be accepted as a new entry.
const ROLE_PREFIX: &str = "ROLE_";

/// Default prefix of user roles.
pub const DEFAULT_USER_ROLE_PREFIX: &str = "ROLE_USER_";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoleError {
    #[error("role must not be empty")]
    Empty,

    #[error("role '{0}' contains leading or trailing whitespace")]
    Whitespace(String),
}

/// Identifier of a group or a single user used in access control checks.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Role(String);

impl Role {
    pub fn new(value: impl Into<String>) -> Result<Self, RoleError> {
        let value = value.into();

        if value.is_empty() {
            return Err(RoleError::Empty);
        }

        if value.trim() != value {
            return Err(RoleError::Whitespace(value));
        }

        Ok(Self(value))
    }

    /// Wraps a role name known to be valid.
    pub(crate) fn from_static(value: &'static str) -> Self {
        Self(value.to_string())
    }

    pub fn anonymous() -> Self {
        Self(ROLE_ANONYMOUS.to_string())
    }

    pub fn user() -> Self {
        Self(ROLE_USER.to_string())
    }

    pub fn admin() -> Self {
        Self(ROLE_ADMIN.to_string())
    }

    pub fn user_admin() -> Self {
        Self(ROLE_USER_ADMIN.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if this is the admin role.
    pub fn is_admin(&self) -> bool {
        self.0 == ROLE_ADMIN
    }

    /// Returns `true` for the admin role or the administrator user account.
    ///
    /// Both always hold write access and are never flagged as being redundant.
    pub fn is_privileged(&self) -> bool {
        self.0 == ROLE_ADMIN || self.0 == ROLE_USER_ADMIN
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Role {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

impl TryFrom<String> for Role {
    type Error = RoleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Role {
    type Error = RoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.0
    }
}

/// The two kinds of roles, shown in separate columns of the ACL selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoleKind {
    Group,
    User,
}

/// Decides whether a role names a single user or a group, based on a list of user role
/// prefixes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleClassifier {
    user_role_prefixes: Vec<String>,
}

impl Default for RoleClassifier {
    fn default() -> Self {
        Self::new(vec![DEFAULT_USER_ROLE_PREFIX.to_string()])
    }
}

impl RoleClassifier {
    pub fn new(user_role_prefixes: Vec<String>) -> Self {
        Self { user_role_prefixes }
    }

    pub fn user_role_prefixes(&self) -> &[String] {
        &self.user_role_prefixes
    }

    /// Returns `true` if the role starts with a user role prefix followed by at least one word
    /// character.
    pub fn is_user_role(&self, role: &str) -> bool {
        self.user_role_prefixes
            .iter()
            .any(|prefix| has_word_after(role, prefix))
    }

    pub fn kind_of(&self, role: &str) -> RoleKind {
        if self.is_user_role(role) {
            RoleKind::User
        } else {
            RoleKind::Group
        }
    }

    /// Strips the user role prefix, returning the remaining user name part.
    pub fn user_name_part<'a>(&self, role: &'a str) -> Option<&'a str> {
        self.user_role_prefixes
            .iter()
            .filter(|prefix| has_word_after(role, prefix))
            .find_map(|prefix| role.strip_prefix(prefix.as_str()))
    }

    /// Checks if free text typed into the selector of the given kind may be added as a new role.
    ///
    /// Groups need the general role prefix and must not look like a user role, users need a user
    /// role prefix.
    pub fn is_valid_new_role(&self, input: &str, kind: RoleKind) -> bool {
        let is_user_role = self.is_user_role(input);
        match kind {
            RoleKind::Group => has_word_after(input, ROLE_PREFIX) && !is_user_role,
            RoleKind::User => is_user_role,
        }
    }

    /// Finds the user role among the roles of a user.
    ///
    /// Every user is expected to have exactly one user role. If none is found `None` is returned,
    /// if multiple are found the first one is returned. A warning is logged in both cases.
    pub fn find_user_role<'a>(
        &self,
        username: &str,
        mut roles: impl Iterator<Item = &'a Role>,
    ) -> Option<&'a Role> {
        let Some(user_role) = roles.by_ref().find(|role| self.is_user_role(role.as_str())) else {
            warn!(%username, "user has no user role, but it needs exactly one");
            return None;
        };

        if let Some(extra) = roles.find(|role| self.is_user_role(role.as_str())) {
            warn!(
                %username,
                %user_role,
                %extra,
                "user has multiple user roles but there should only be one",
            );
        }

        Some(user_role)
    }
}

fn has_word_after(value: &str, prefix: &str) -> bool {
    value
        .strip_prefix(prefix)
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
}
