// SPDX-License-Identifier: MIT OR Apache-2.0

//! Superset relationships between groups.
//!
//! A group `A` is a superset of group `B` if every member of `B` is also a member of `A`.
//! "Everyone" (`ROLE_ANONYMOUS`) is the superset of all other groups and forms the root of the
//! graph. The relationships are used to sort groups from large to small and to detect redundant
//! entries in an access list.
use std::collections::{HashMap, HashSet};

use petgraph::Direction;
use petgraph::algo::{has_path_connecting, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use thiserror::Error;
use tracing::debug;

use crate::role::Role;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DagError {
    #[error("group {0} is listed more than once")]
    DuplicateGroup(Role),

    #[error("root group {0} is missing")]
    MissingRoot(Role),

    #[error("root group {0} can not have supersets")]
    RootHasSupersets(Role),

    #[error("group {group} names unknown group {superset} as superset")]
    UnknownSuperset { group: Role, superset: Role },

    #[error("superset relations of group {0} form a cycle")]
    Cycle(Role),

    #[error("group {0} is not a subset of the root group")]
    Unreachable(Role),
}

/// A role which can be placed in a sorted list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleOption {
    pub role: Role,
    pub label: String,
}

impl RoleOption {
    pub fn new(role: Role, label: impl Into<String>) -> Self {
        Self {
            role,
            label: label.into(),
        }
    }
}

/// Result of looking up a role in the graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Resolved {
    /// Roles which are never reasoned about (admin roles).
    Excluded,

    Known(NodeIndex),

    Unknown,
}

/// Immutable graph of groups with an edge from every group to each of its direct supersets.
#[derive(Clone, Debug)]
pub struct GroupDag {
    graph: DiGraph<Role, ()>,
    indices: HashMap<Role, NodeIndex>,
    root: NodeIndex,
}

impl GroupDag {
    /// Builds the graph from a table of groups and their direct supersets, using
    /// `ROLE_ANONYMOUS` as root.
    pub fn new<I>(groups: I) -> Result<Self, DagError>
    where
        I: IntoIterator<Item = (Role, Vec<Role>)>,
    {
        Self::with_root(Role::anonymous(), groups)
    }

    /// Builds the graph with a custom root group.
    ///
    /// The table is validated: the root has to be present and can't have supersets, every
    /// superset has to be listed as a group itself, there can't be cycles and every group needs
    /// to be a subset of the root.
    pub fn with_root<I>(root: Role, groups: I) -> Result<Self, DagError>
    where
        I: IntoIterator<Item = (Role, Vec<Role>)>,
    {
        let mut graph = DiGraph::new();
        let mut indices = HashMap::new();
        let mut edges = Vec::new();

        for (group, supersets) in groups {
            if indices.contains_key(&group) {
                return Err(DagError::DuplicateGroup(group));
            }
            let idx = graph.add_node(group.clone());
            indices.insert(group, idx);
            edges.push((idx, supersets));
        }

        let Some(&root_idx) = indices.get(&root) else {
            return Err(DagError::MissingRoot(root));
        };

        for (idx, supersets) in edges {
            for superset in supersets {
                let Some(&superset_idx) = indices.get(&superset) else {
                    return Err(DagError::UnknownSuperset {
                        group: graph[idx].clone(),
                        superset,
                    });
                };
                graph.update_edge(idx, superset_idx, ());
            }
        }

        if graph
            .neighbors_directed(root_idx, Direction::Outgoing)
            .next()
            .is_some()
        {
            return Err(DagError::RootHasSupersets(root));
        }

        if let Err(cycle) = toposort(&graph, None) {
            return Err(DagError::Cycle(graph[cycle.node_id()].clone()));
        }

        for idx in graph.node_indices() {
            if !has_path_connecting(&graph, idx, root_idx, None) {
                return Err(DagError::Unreachable(graph[idx].clone()));
            }
        }

        debug!(
            groups = graph.node_count(),
            relations = graph.edge_count(),
            "built group superset graph"
        );

        Ok(Self {
            graph,
            indices,
            root: root_idx,
        })
    }

    /// The group containing everyone.
    pub fn root(&self) -> &Role {
        &self.graph[self.root]
    }

    /// Returns `true` if the group is listed in the graph.
    pub fn contains(&self, role: &Role) -> bool {
        self.indices.contains_key(role)
    }

    /// All groups of the graph.
    pub fn groups(&self) -> impl Iterator<Item = &Role> {
        self.graph.node_weights()
    }

    /// Direct supersets of a known group. Empty for unknown groups.
    pub fn direct_supersets(&self, role: &Role) -> Vec<Role> {
        self.indices
            .get(role)
            .map(|&idx| {
                self.graph
                    .neighbors_directed(idx, Direction::Outgoing)
                    .map(|superset| self.graph[superset].clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn resolve(&self, role: &Role) -> Resolved {
        if role.is_privileged() {
            return Resolved::Excluded;
        }

        match self.indices.get(role) {
            Some(&idx) => Resolved::Known(idx),
            None => Resolved::Unknown,
        }
    }

    /// Returns all groups which include the given one, i.e. are its (transitive) supersets.
    ///
    /// Nothing is known about unknown groups except that they are a subset of `ROLE_ANONYMOUS`
    /// and `ROLE_USER`. Admin roles never have supersets as warning about them is not useful.
    pub fn supersets_of(&self, role: &Role) -> Vec<Role> {
        match self.resolve(role) {
            Resolved::Excluded => Vec::new(),
            Resolved::Unknown => vec![Role::anonymous(), Role::user()],
            Resolved::Known(start) => {
                // The traversal marks nodes as discovered before expanding them and thus also
                // terminates on cyclic input.
                let mut supersets = Vec::new();
                let mut dfs = Dfs::new(&self.graph, start);
                while let Some(node) = dfs.next(&self.graph) {
                    if node != start {
                        supersets.push(self.graph[node].clone());
                    }
                }
                supersets
            }
        }
    }

    /// Sorts options topologically such that large groups come first and smaller ones last.
    ///
    /// Options of unknown roles are appended in their original order.
    pub fn sort(&self, options: Vec<RoleOption>) -> Vec<RoleOption> {
        self.sort_by_role(options, |option| &option.role)
    }

    /// Like [`GroupDag::sort`] for arbitrary items carrying a role.
    pub fn sort_by_role<T, F>(&self, items: Vec<T>, role_of: F) -> Vec<T>
    where
        F: Fn(&T) -> &Role,
    {
        let roles: Vec<Role> = items.iter().map(|item| role_of(item).clone()).collect();
        let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
        let mut out = Vec::with_capacity(slots.len());
        let mut visited: HashSet<NodeIndex> = HashSet::new();

        // The root is a superset of everything, so we can always start there.
        let mut candidates = vec![self.root];
        while let Some(candidate) = candidates.pop() {
            if !visited.insert(candidate) {
                continue;
            }

            let candidate_role = &self.graph[candidate];
            for (slot, role) in slots.iter_mut().zip(&roles) {
                if role == candidate_role {
                    if let Some(item) = slot.take() {
                        out.push(item);
                    }
                }
            }

            for subset in self.graph.neighbors_directed(candidate, Direction::Incoming) {
                // Once all supersets were visited, everything which has to come before this
                // subset has been placed.
                let ready = self
                    .graph
                    .neighbors_directed(subset, Direction::Outgoing)
                    .all(|superset| visited.contains(&superset));
                if ready && !visited.contains(&subset) {
                    candidates.push(subset);
                }
            }
        }

        out.extend(slots.into_iter().flatten());
        out
    }
}

#[cfg(test)]
mod tests {
    use crate::role::Role;

    use super::{DagError, GroupDag, RoleOption};

    fn role(value: &str) -> Role {
        Role::new(value).unwrap()
    }

    fn table(entries: &[(&str, &[&str])]) -> Vec<(Role, Vec<Role>)> {
        entries
            .iter()
            .map(|(group, supersets)| (role(group), supersets.iter().map(|s| role(s)).collect()))
            .collect()
    }

    fn option(value: &str) -> RoleOption {
        RoleOption::new(role(value), value.to_lowercase())
    }

    fn roles(options: &[RoleOption]) -> Vec<&str> {
        options.iter().map(|option| option.role.as_str()).collect()
    }

    #[test]
    fn diamond_supersets() {
        //      ANONYMOUS
        //          |
        //        USER
        //       /    \
        //   STAFF   STUDENT
        //       \    /
        //       TUTOR
        let dag = GroupDag::new(table(&[
            ("ROLE_ANONYMOUS", &[]),
            ("ROLE_USER", &["ROLE_ANONYMOUS"]),
            ("ROLE_STAFF", &["ROLE_USER"]),
            ("ROLE_STUDENT", &["ROLE_USER"]),
            ("ROLE_TUTOR", &["ROLE_STAFF", "ROLE_STUDENT"]),
        ]))
        .unwrap();

        let mut supersets = dag.supersets_of(&role("ROLE_TUTOR"));
        supersets.sort();
        assert_eq!(
            supersets,
            vec![
                role("ROLE_ANONYMOUS"),
                role("ROLE_STAFF"),
                role("ROLE_STUDENT"),
                role("ROLE_USER"),
            ]
        );
        assert!(dag.supersets_of(&role("ROLE_ANONYMOUS")).is_empty());

        let sorted = dag.sort(vec![
            option("ROLE_TUTOR"),
            option("ROLE_STUDENT"),
            option("ROLE_USER"),
            option("ROLE_STAFF"),
        ]);
        let sorted = roles(&sorted);
        assert_eq!(sorted[0], "ROLE_USER");
        assert_eq!(sorted[3], "ROLE_TUTOR");
    }

    #[test]
    fn unknown_and_admin_roles() {
        let dag = GroupDag::new(table(&[("ROLE_ANONYMOUS", &[])])).unwrap();

        assert_eq!(
            dag.supersets_of(&role("ROLE_LECTURER")),
            vec![Role::anonymous(), Role::user()]
        );
        assert!(dag.supersets_of(&Role::admin()).is_empty());
        assert!(dag.supersets_of(&Role::user_admin()).is_empty());
    }

    #[test]
    fn unknown_options_keep_input_order() {
        let dag = GroupDag::new(table(&[
            ("ROLE_ANONYMOUS", &[]),
            ("ROLE_USER", &["ROLE_ANONYMOUS"]),
        ]))
        .unwrap();

        let sorted = dag.sort(vec![
            option("ROLE_ZOO"),
            option("ROLE_USER"),
            option("ROLE_APE"),
            option("ROLE_ANONYMOUS"),
        ]);
        assert_eq!(
            roles(&sorted),
            vec!["ROLE_ANONYMOUS", "ROLE_USER", "ROLE_ZOO", "ROLE_APE"]
        );
    }

    #[test]
    fn rejects_invalid_tables() {
        assert_eq!(
            GroupDag::new(table(&[("ROLE_USER", &[])])).unwrap_err(),
            DagError::MissingRoot(Role::anonymous())
        );

        assert_eq!(
            GroupDag::new(table(&[("ROLE_ANONYMOUS", &[]), ("ROLE_ANONYMOUS", &[])])).unwrap_err(),
            DagError::DuplicateGroup(Role::anonymous())
        );

        assert_eq!(
            GroupDag::new(table(&[("ROLE_ANONYMOUS", &[]), ("ROLE_USER", &["ROLE_NOPE"])]))
                .unwrap_err(),
            DagError::UnknownSuperset {
                group: Role::user(),
                superset: role("ROLE_NOPE"),
            }
        );

        assert_eq!(
            GroupDag::new(table(&[
                ("ROLE_ANONYMOUS", &["ROLE_USER"]),
                ("ROLE_USER", &["ROLE_ANONYMOUS"]),
            ]))
            .unwrap_err(),
            DagError::RootHasSupersets(Role::anonymous())
        );

        assert!(matches!(
            GroupDag::new(table(&[
                ("ROLE_ANONYMOUS", &[]),
                ("ROLE_A", &["ROLE_B"]),
                ("ROLE_B", &["ROLE_A"]),
            ]))
            .unwrap_err(),
            DagError::Cycle(_)
        ));

        assert_eq!(
            GroupDag::new(table(&[("ROLE_ANONYMOUS", &[]), ("ROLE_LONELY", &[])])).unwrap_err(),
            DagError::Unreachable(role("ROLE_LONELY"))
        );
    }

    #[test]
    fn direct_supersets() {
        let dag = GroupDag::new(table(&[
            ("ROLE_ANONYMOUS", &[]),
            ("ROLE_USER", &["ROLE_ANONYMOUS"]),
        ]))
        .unwrap();

        assert_eq!(dag.direct_supersets(&Role::user()), vec![Role::anonymous()]);
        assert!(dag.direct_supersets(&role("ROLE_UNKNOWN")).is_empty());
        assert_eq!(dag.root(), &Role::anonymous());
        assert_eq!(dag.groups().count(), 2);
    }
}
