// SPDX-License-Identifier: MIT OR Apache-2.0

//! Editing of access lists and the view-model of the two-column ACL selector.
//!
//! Changes are expressed as [`AclCommand`]s which are applied to an [`Acl`] by a pure reducer.
//! The edited list is never modified in place: every command produces a new snapshot.
use tracing::debug;

use crate::access::Action;
use crate::acl::Acl;
use crate::dag::RoleOption;
use crate::registry::Registry;
use crate::role::{Role, RoleKind};
use crate::viewer::Viewer;

/// Changes which can be made to an access list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AclCommand {
    /// Grant read access to a role.
    Add(Role),

    /// Grant read access to several roles at once.
    AddMany(Vec<Role>),

    /// Revoke all access of a role.
    Remove(Role),

    /// Change the highest action of a role.
    SetAction { role: Role, action: Action },
}

/// How the name of an entry is shown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisplayLabel {
    /// The editing user, shown with their label.
    Yourself(String),

    /// A user without known display name, shown with a name derived from the role.
    UnknownUser(String),

    Plain(String),
}

/// One row of a selector column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub role: Role,
    pub label: String,
    pub display: DisplayLabel,
    pub action: Action,

    /// The action can't be changed by the editing user.
    pub action_fixed: bool,

    pub removable: bool,

    /// Labels of selected groups making this entry redundant.
    pub supersets: Vec<String>,

    /// A large group was given write access.
    pub large_group_write: bool,
}

impl Entry {
    /// Returns `true` if the entry is redundant because of a selected superset.
    pub fn is_subset(&self) -> bool {
        !self.supersets.is_empty()
    }
}

/// Editor of a single access list.
#[derive(Clone, Copy, Debug)]
pub struct AclEditor<'a> {
    registry: &'a Registry,
    viewer: &'a Viewer,
    user_is_required: bool,
}

impl<'a> AclEditor<'a> {
    pub fn new(registry: &'a Registry, viewer: &'a Viewer) -> Self {
        Self {
            registry,
            viewer,
            user_is_required: false,
        }
    }

    /// If set, the editing user always keeps write access and can't be removed. Used when
    /// uploading, so nobody locks themselves out of their own video.
    pub fn user_is_required(mut self, required: bool) -> Self {
        self.user_is_required = required;
        self
    }

    /// The list a new item starts with.
    pub fn initial_acl(&self) -> Acl {
        match self.viewer.user_role() {
            Some(user_role) if self.user_is_required => Acl::with_required_user(user_role.clone()),
            _ => Acl::default(),
        }
    }

    fn is_required_user(&self, role: &Role) -> bool {
        self.user_is_required && self.viewer.is(role)
    }

    /// Returns `true` if the role may be taken off the list.
    pub fn is_removable(&self, role: &Role) -> bool {
        !role.is_admin() && !self.is_required_user(role)
    }

    /// Returns `true` if the action of the role can't be changed.
    pub fn has_fixed_action(&self, role: &Role) -> bool {
        role.is_privileged() || self.is_required_user(role)
    }

    /// Applies a command and returns the resulting list.
    pub fn reduce(&self, acl: &Acl, command: &AclCommand) -> Acl {
        match command {
            AclCommand::Add(role) => acl.add(role.clone()),
            AclCommand::AddMany(roles) => roles
                .iter()
                .fold(acl.clone(), |acl, role| acl.add(role.clone())),
            AclCommand::Remove(role) => {
                if self.is_removable(role) {
                    acl.remove(role)
                } else {
                    debug!(%role, "ignoring removal of protected role");
                    acl.clone()
                }
            }
            AclCommand::SetAction { role, action } => {
                if self.has_fixed_action(role) {
                    debug!(%role, %action, "ignoring action change of role with fixed action");
                    acl.clone()
                } else {
                    acl.set_action(role.clone(), *action)
                }
            }
        }
    }

    /// Applies a command and hands the new list to `on_change`.
    pub fn dispatch<F>(&self, acl: &Acl, command: AclCommand, on_change: F)
    where
        F: FnOnce(Acl),
    {
        on_change(self.reduce(acl, &command));
    }

    /// Turns free text entered into a column into an add command, if it is a valid new role of
    /// that kind.
    pub fn create_command(&self, input: &str, kind: RoleKind) -> Option<AclCommand> {
        if !self.registry.classifier().is_valid_new_role(input, kind) {
            return None;
        }
        Role::new(input).ok().map(AclCommand::Add)
    }

    /// Known roles of a kind, offered for selection.
    pub fn options(&self, kind: RoleKind) -> &'a [RoleOption] {
        self.registry.known(kind).options()
    }

    /// Returns the labels of every other selected group which is a superset of the given role
    /// and grants at least the same access.
    ///
    /// A read-only entry is made redundant by any selected superset, a write-enabled one only by
    /// write-enabled supersets.
    pub fn superset_list(&self, role: &Role, acl: &Acl) -> Vec<String> {
        let required = acl.action_of(role).unwrap_or(Action::Read);
        self.registry
            .dag()
            .supersets_of(role)
            .into_iter()
            .filter(|superset| {
                acl.action_of(superset)
                    .is_some_and(|action| action.includes(required))
            })
            .map(|superset| self.registry.label(&superset, RoleKind::Group))
            .collect()
    }

    /// Pastes a newline-separated list of user names into the user column.
    ///
    /// Names are matched against the labels of known users. Returns `None` if the text is not a
    /// list or no name matched.
    pub fn paste_users(&self, acl: &Acl, text: &str) -> Option<Acl> {
        if !text.contains('\n') {
            return None;
        }

        let known = self.registry.known(RoleKind::User);
        let roles: Vec<Role> = text
            .split('\n')
            .map(str::trim)
            .filter_map(|name| known.find_by_label(name))
            .cloned()
            .collect();

        if roles.is_empty() {
            return None;
        }

        Some(self.reduce(acl, &AclCommand::AddMany(roles)))
    }

    /// Rows of one selector column.
    ///
    /// Groups are sorted from large to small. When the editing user is an admin and the admin
    /// role is not part of the list, a row for it is appended since admins always have access.
    /// Users are sorted with the editing user first, then known and finally unknown users.
    pub fn selection(&self, acl: &Acl, kind: RoleKind) -> Vec<Entry> {
        let (groups, users) = acl.split(self.registry.classifier());
        let partition = match kind {
            RoleKind::Group => groups,
            RoleKind::User => users,
        };

        let entries: Vec<Entry> = partition
            .roles()
            .into_iter()
            .map(|role| self.entry(role, kind, acl))
            .collect();

        match kind {
            RoleKind::Group => {
                let mut entries = self.registry.dag().sort_by_role(entries, |entry| &entry.role);
                let admin = Role::admin();
                if self.viewer.is_admin() && !partition.contains(&admin) {
                    entries.push(self.admin_entry(admin));
                }
                entries
            }
            RoleKind::User => {
                let mut entries = entries;
                entries.sort_by_cached_key(|entry| {
                    (
                        self.user_section(&entry.role),
                        entry.label.to_lowercase(),
                        entry.role.clone(),
                    )
                });
                entries
            }
        }
    }

    fn user_section(&self, role: &Role) -> u8 {
        if self.viewer.is(role) {
            0
        } else if self.is_known_user(role) {
            1
        } else {
            2
        }
    }

    fn is_known_user(&self, role: &Role) -> bool {
        *role == Role::user_admin() || self.registry.known(RoleKind::User).contains(role)
    }

    fn entry(&self, role: Role, kind: RoleKind, acl: &Acl) -> Entry {
        let label = self.registry.label(&role, kind);
        let display = if self.viewer.is(&role) {
            DisplayLabel::Yourself(label.clone())
        } else if kind == RoleKind::User && !self.is_known_user(&role) {
            DisplayLabel::UnknownUser(self.unknown_user_name(&role))
        } else {
            DisplayLabel::Plain(label.clone())
        };

        let supersets = match kind {
            RoleKind::Group => self.superset_list(&role, acl),
            RoleKind::User => Vec::new(),
        };

        // Roles with a fixed action always have write access, whatever the list says.
        let action_fixed = self.has_fixed_action(&role);
        let action = if action_fixed {
            Action::Write
        } else {
            acl.action_of(&role).unwrap_or(Action::Read)
        };

        Entry {
            action,
            action_fixed,
            removable: self.is_removable(&role),
            large_group_write: self.registry.is_large_group(&role) && action.is_write(),
            display,
            label,
            supersets,
            role,
        }
    }

    fn admin_entry(&self, role: Role) -> Entry {
        let label = self.registry.admins_label().to_string();
        Entry {
            display: DisplayLabel::Plain(label.clone()),
            label,
            action: Action::Write,
            action_fixed: true,
            removable: false,
            supersets: Vec::new(),
            large_group_write: false,
            role,
        }
    }

    /// Derives a readable name from a user role, e.g. "jose carreño" for
    /// `ROLE_USER_JOSE_CARREÑO`.
    fn unknown_user_name(&self, role: &Role) -> String {
        let name = self
            .registry
            .classifier()
            .user_name_part(role.as_str())
            .unwrap_or(role.as_str());
        name.to_lowercase().replacen('_', " ", 1)
    }
}
