// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities.
use crate::config::{AclConfig, GroupConfig, UserConfig};
use crate::registry::Registry;
use crate::role::Role;

pub fn setup_logging() {
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }
}

/// Shorthand for a role which is known to be valid.
pub fn role(value: &str) -> Role {
    Role::new(value).expect("valid role")
}

/// Built-in groups and a handful of known users.
pub fn test_config() -> AclConfig {
    AclConfig {
        users: vec![
            user("ROLE_USER_SABINE", "Sabine Rudolfs"),
            user("ROLE_USER_BJÖRK", "Prof. Björk Guðmundsdóttir"),
            user("ROLE_USER_MORGAN", "Morgan Yu"),
            user("ROLE_USER_JOSE", "José Carreño Quiñones"),
        ],
        ..AclConfig::default()
    }
}

pub fn test_registry() -> Registry {
    test_config().build().expect("valid test config")
}

/// Config with the given groups and their direct supersets. Labels are the lowercase role.
pub fn config_with_groups(groups: &[(&str, &[&str])]) -> AclConfig {
    AclConfig {
        groups: groups
            .iter()
            .map(|(group, supersets)| GroupConfig {
                role: role(group),
                label: group.to_lowercase(),
                supersets: supersets.iter().map(|superset| role(superset)).collect(),
            })
            .collect(),
        ..AclConfig::default()
    }
}

fn user(value: &str, label: &str) -> UserConfig {
    UserConfig {
        role: role(value),
        label: label.to_string(),
    }
}
