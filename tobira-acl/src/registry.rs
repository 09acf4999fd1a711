// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::{BTreeSet, HashMap};

use crate::config::LabelConfig;
use crate::dag::{GroupDag, RoleOption};
use crate::role::{Role, RoleClassifier, RoleKind};

/// Roles of one kind with known display labels, in their configured order.
#[derive(Clone, Debug, Default)]
pub struct KnownRoles {
    options: Vec<RoleOption>,
    labels: HashMap<Role, usize>,
}

impl KnownRoles {
    pub fn new(roles: impl IntoIterator<Item = (Role, String)>) -> Self {
        let mut known = Self::default();
        for (role, label) in roles {
            match known.labels.get(&role) {
                Some(&idx) => known.options[idx].label = label,
                None => {
                    known.labels.insert(role.clone(), known.options.len());
                    known.options.push(RoleOption::new(role, label));
                }
            }
        }
        known
    }

    pub fn label(&self, role: &Role) -> Option<&str> {
        self.labels
            .get(role)
            .map(|&idx| self.options[idx].label.as_str())
    }

    pub fn contains(&self, role: &Role) -> bool {
        self.labels.contains_key(role)
    }

    /// All known roles as selectable options.
    pub fn options(&self) -> &[RoleOption] {
        &self.options
    }

    /// Finds the first role with exactly this label.
    pub fn find_by_label(&self, label: &str) -> Option<&Role> {
        self.options
            .iter()
            .find(|option| option.label == label)
            .map(|option| &option.role)
    }
}

/// Everything known about roles, built once at startup from [`AclConfig`] and shared by
/// reference with every editor.
///
/// [`AclConfig`]: crate::config::AclConfig
#[derive(Clone, Debug)]
pub struct Registry {
    dag: GroupDag,
    classifier: RoleClassifier,
    groups: KnownRoles,
    users: KnownRoles,
    large_groups: BTreeSet<Role>,
    labels: LabelConfig,
}

impl Registry {
    pub fn new(
        dag: GroupDag,
        classifier: RoleClassifier,
        groups: KnownRoles,
        users: KnownRoles,
        large_groups: BTreeSet<Role>,
        labels: LabelConfig,
    ) -> Self {
        Self {
            dag,
            classifier,
            groups,
            users,
            large_groups,
            labels,
        }
    }

    pub fn dag(&self) -> &GroupDag {
        &self.dag
    }

    pub fn classifier(&self) -> &RoleClassifier {
        &self.classifier
    }

    pub fn known(&self, kind: RoleKind) -> &KnownRoles {
        match kind {
            RoleKind::Group => &self.groups,
            RoleKind::User => &self.users,
        }
    }

    /// Returns `true` for groups with so many members that write access is probably a mistake.
    pub fn is_large_group(&self, role: &Role) -> bool {
        self.large_groups.contains(role)
    }

    pub fn admins_label(&self) -> &str {
        &self.labels.admins
    }

    /// Display label of a role. Falls back to the role itself if it is not known.
    pub fn label(&self, role: &Role, kind: RoleKind) -> String {
        if *role == Role::user_admin() {
            return self.labels.user_admin.clone();
        }

        self.known(kind)
            .label(role)
            .map(str::to_string)
            .unwrap_or_else(|| role.to_string())
    }
}

#[cfg(test)]
mod tests {
    use crate::role::Role;

    use super::KnownRoles;

    #[test]
    fn later_labels_win() {
        let morgan = Role::new("ROLE_USER_MORGAN").unwrap();
        let known = KnownRoles::new([
            (morgan.clone(), "Morgan".to_string()),
            (Role::new("ROLE_USER_SABINE").unwrap(), "Sabine Rudolfs".to_string()),
            (morgan.clone(), "Morgan Yu".to_string()),
        ]);

        assert_eq!(known.options().len(), 2);
        assert_eq!(known.label(&morgan), Some("Morgan Yu"));
        assert_eq!(known.find_by_label("Morgan Yu"), Some(&morgan));
        assert_eq!(known.find_by_label("Morgan"), None);
    }
}
