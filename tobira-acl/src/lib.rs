// SPDX-License-Identifier: MIT OR Apache-2.0

mod access;
pub mod acl;
pub mod config;
pub mod dag;
pub mod editor;
pub mod registry;
pub mod role;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
mod viewer;

pub use access::{Action, ParseActionError};
pub use acl::{Acl, AclEntry};
pub use config::{AclConfig, ConfigError};
pub use dag::{DagError, GroupDag, RoleOption};
pub use editor::{AclCommand, AclEditor, DisplayLabel, Entry};
pub use registry::{KnownRoles, Registry};
pub use role::{Role, RoleClassifier, RoleError, RoleKind};
pub use viewer::Viewer;
