// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::BTreeSet;

use crate::role::{Role, RoleClassifier};

/// The user currently editing an access list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Viewer {
    roles: BTreeSet<Role>,
    user_role: Option<Role>,
}

impl Viewer {
    /// A visitor who is not logged in.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A logged-in user with the given roles. The user role is looked up with the classifier.
    pub fn new(
        username: &str,
        roles: impl IntoIterator<Item = Role>,
        classifier: &RoleClassifier,
    ) -> Self {
        let roles: BTreeSet<Role> = roles.into_iter().collect();
        let user_role = classifier.find_user_role(username, roles.iter()).cloned();
        Self { roles, user_role }
    }

    pub fn roles(&self) -> &BTreeSet<Role> {
        &self.roles
    }

    /// The role representing this user alone, if any.
    pub fn user_role(&self) -> Option<&Role> {
        self.user_role.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(Role::is_admin)
    }

    /// Returns `true` if the role is this user's own user role.
    pub fn is(&self, role: &Role) -> bool {
        self.user_role.as_ref() == Some(role)
    }
}

#[cfg(test)]
mod tests {
    use crate::role::{Role, RoleClassifier};

    use super::Viewer;

    #[test]
    fn admin_viewer() {
        let viewer = Viewer::new(
            "admin",
            [Role::admin(), Role::user(), Role::user_admin()],
            &RoleClassifier::default(),
        );

        assert!(viewer.is_admin());
        assert_eq!(viewer.user_role(), Some(&Role::user_admin()));
        assert!(viewer.is(&Role::user_admin()));
    }

    #[test]
    fn anonymous_viewer() {
        let viewer = Viewer::anonymous();
        assert!(!viewer.is_admin());
        assert_eq!(viewer.user_role(), None);
        assert!(!viewer.is(&Role::anonymous()));
    }
}
