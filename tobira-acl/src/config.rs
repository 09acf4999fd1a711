// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration of known groups, users and their relationships.
//!
//! ```toml
//! user_role_prefixes = ["ROLE_USER_"]
//! large_groups = ["ROLE_USER", "ROLE_ANONYMOUS"]
//!
//! [[groups]]
//! role = "ROLE_ANONYMOUS"
//! label = "Everyone"
//!
//! [[groups]]
//! role = "ROLE_USER"
//! label = "Logged in users"
//! supersets = ["ROLE_ANONYMOUS"]
//!
//! [[users]]
//! role = "ROLE_USER_MORGAN"
//! label = "Morgan Yu"
//! ```
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::dag::{DagError, GroupDag};
use crate::registry::{KnownRoles, Registry};
use crate::role::{DEFAULT_USER_ROLE_PREFIX, Role, RoleClassifier};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid group relations: {0}")]
    Dag(#[from] DagError),

    #[error("at least one user role prefix needs to be configured")]
    NoUserRolePrefixes,

    #[error("group {0} looks like a user role")]
    GroupIsUserRole(Role),

    #[error("user {0} does not start with a user role prefix")]
    NotAUserRole(Role),
}

/// A known group, its display label and its direct supersets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupConfig {
    pub role: Role,
    pub label: String,

    /// Groups which contain every member of this group. Empty only for the root group.
    #[serde(default)]
    pub supersets: Vec<Role>,
}

/// A known user and its display name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserConfig {
    pub role: Role,
    pub label: String,
}

/// Labels of special entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabelConfig {
    /// Label of the implicit administrators row.
    pub admins: String,

    /// Label of the administrator user account.
    pub user_admin: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            admins: "Administrators".to_string(),
            user_admin: "Administrator".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AclConfig {
    /// Prefixes distinguishing user roles from group roles.
    pub user_role_prefixes: Vec<String>,

    /// All known groups. Replaces the built-in groups when set.
    pub groups: Vec<GroupConfig>,

    /// Known users with their display names.
    pub users: Vec<UserConfig>,

    /// Groups with many members. Giving them write access is flagged.
    pub large_groups: Vec<Role>,

    pub labels: LabelConfig,
}

impl Default for AclConfig {
    fn default() -> Self {
        Self {
            user_role_prefixes: vec![DEFAULT_USER_ROLE_PREFIX.to_string()],
            groups: builtin_groups(),
            users: Vec::new(),
            large_groups: vec![Role::user(), Role::anonymous()],
            labels: LabelConfig::default(),
        }
    }
}

fn builtin_group(role: &'static str, label: &str, supersets: Vec<Role>) -> GroupConfig {
    GroupConfig {
        role: Role::from_static(role),
        label: label.to_string(),
        supersets,
    }
}

fn builtin_groups() -> Vec<GroupConfig> {
    vec![
        builtin_group("ROLE_ANONYMOUS", "Everyone", vec![]),
        builtin_group("ROLE_USER", "Logged in users", vec![Role::anonymous()]),
        builtin_group("ROLE_TOBIRA_MODERATOR", "Moderators", vec![Role::user()]),
        builtin_group("ROLE_TOBIRA_STUDIO", "Studio users", vec![Role::user()]),
        builtin_group("ROLE_TOBIRA_EDITOR", "Editors", vec![Role::user()]),
    ]
}

impl AclConfig {
    /// Parses a configuration from TOML. Missing fields fall back to their defaults.
    pub fn from_toml_str(value: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(value)?)
    }

    /// Reads and parses a TOML configuration file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loading acl config");
        Self::from_toml_str(&contents)
    }

    /// Validates the configuration and builds the registry of known roles.
    pub fn build(self) -> Result<Registry, ConfigError> {
        if self.user_role_prefixes.is_empty() {
            return Err(ConfigError::NoUserRolePrefixes);
        }
        let classifier = RoleClassifier::new(self.user_role_prefixes);

        if let Some(group) = self
            .groups
            .iter()
            .find(|group| classifier.is_user_role(group.role.as_str()))
        {
            return Err(ConfigError::GroupIsUserRole(group.role.clone()));
        }

        if let Some(user) = self
            .users
            .iter()
            .find(|user| !classifier.is_user_role(user.role.as_str()))
        {
            return Err(ConfigError::NotAUserRole(user.role.clone()));
        }

        let dag = GroupDag::new(
            self.groups
                .iter()
                .map(|group| (group.role.clone(), group.supersets.clone())),
        )?;

        let groups = KnownRoles::new(
            self.groups
                .into_iter()
                .map(|group| (group.role, group.label)),
        );
        let users = KnownRoles::new(self.users.into_iter().map(|user| (user.role, user.label)));

        Ok(Registry::new(
            dag,
            classifier,
            groups,
            users,
            self.large_groups.into_iter().collect(),
            self.labels,
        ))
    }
}
