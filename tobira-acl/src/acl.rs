// SPDX-License-Identifier: MIT OR Apache-2.0

//! Access control lists as a pair of read and write role sets.
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::access::Action;
use crate::role::{Role, RoleClassifier};

/// Access control list of a single item.
///
/// Roles in `write_roles` are always treated as readable, even if they are missing in
/// `read_roles`. Every operation returns a new list and leaves `self` untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acl {
    pub read_roles: BTreeSet<Role>,
    pub write_roles: BTreeSet<Role>,
}

/// One role together with all actions it is allowed to perform, as submitted when saving an
/// access list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclEntry {
    pub role: Role,
    pub actions: BTreeSet<Action>,
}

impl Acl {
    pub fn new(
        read_roles: impl IntoIterator<Item = Role>,
        write_roles: impl IntoIterator<Item = Role>,
    ) -> Self {
        Self {
            read_roles: read_roles.into_iter().collect(),
            write_roles: write_roles.into_iter().collect(),
        }
    }

    /// Access list containing only the given user with read and write access.
    pub fn with_required_user(user_role: Role) -> Self {
        Self::new([user_role.clone()], [user_role])
    }

    pub fn is_empty(&self) -> bool {
        self.read_roles.is_empty() && self.write_roles.is_empty()
    }

    /// Returns `true` if the role has any access.
    pub fn contains(&self, role: &Role) -> bool {
        self.read_roles.contains(role) || self.write_roles.contains(role)
    }

    /// Returns `true` if the role may write.
    pub fn can_write(&self, role: &Role) -> bool {
        self.write_roles.contains(role)
    }

    /// All roles with any access, each listed once.
    pub fn roles(&self) -> BTreeSet<Role> {
        self.read_roles.union(&self.write_roles).cloned().collect()
    }

    /// Highest action granted to the role.
    pub fn action_of(&self, role: &Role) -> Option<Action> {
        if self.write_roles.contains(role) {
            Some(Action::Write)
        } else if self.read_roles.contains(role) {
            Some(Action::Read)
        } else {
            None
        }
    }

    /// Grants read access. Newly added roles never start with write access.
    pub fn add(&self, role: Role) -> Self {
        let mut acl = self.clone();
        acl.read_roles.insert(role);
        acl
    }

    /// Revokes all access of the role.
    pub fn remove(&self, role: &Role) -> Self {
        let mut acl = self.clone();
        acl.read_roles.remove(role);
        acl.write_roles.remove(role);
        acl
    }

    /// Sets the highest action of the role. The role keeps its read access when write access is
    /// taken away.
    pub fn set_action(&self, role: Role, action: Action) -> Self {
        let mut acl = self.clone();
        match action {
            Action::Write => {
                acl.write_roles.insert(role);
            }
            Action::Read => {
                acl.write_roles.remove(&role);
            }
        }
        acl
    }

    /// Splits the list into a group and a user partition.
    pub fn split(&self, classifier: &RoleClassifier) -> (Acl, Acl) {
        let (user_read, group_read): (BTreeSet<_>, BTreeSet<_>) = self
            .read_roles
            .iter()
            .cloned()
            .partition(|role| classifier.is_user_role(role.as_str()));
        let (user_write, group_write): (BTreeSet<_>, BTreeSet<_>) = self
            .write_roles
            .iter()
            .cloned()
            .partition(|role| classifier.is_user_role(role.as_str()));

        (
            Acl {
                read_roles: group_read,
                write_roles: group_write,
            },
            Acl {
                read_roles: user_read,
                write_roles: user_write,
            },
        )
    }

    /// Recombines two partitions into one list.
    pub fn merge(&self, other: &Acl) -> Self {
        Self {
            read_roles: self.read_roles.union(&other.read_roles).cloned().collect(),
            write_roles: self.write_roles.union(&other.write_roles).cloned().collect(),
        }
    }

    /// Converts the list into submission entries. Every role is readable, write-enabled roles
    /// additionally carry the write action.
    pub fn to_entries(&self) -> Vec<AclEntry> {
        self.roles()
            .into_iter()
            .map(|role| {
                let mut actions = BTreeSet::from([Action::Read]);
                if self.write_roles.contains(&role) {
                    actions.insert(Action::Write);
                }
                AclEntry { role, actions }
            })
            .collect()
    }

    /// Builds a list from submission entries. Entries without any action are ignored.
    pub fn from_entries(entries: impl IntoIterator<Item = AclEntry>) -> Self {
        let mut acl = Acl::default();
        for AclEntry { role, actions } in entries {
            if actions.contains(&Action::Write) {
                acl.write_roles.insert(role.clone());
            }
            if !actions.is_empty() {
                acl.read_roles.insert(role);
            }
        }
        acl
    }
}
