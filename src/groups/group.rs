//! Group records and their attach constraints.
//!
//! Groups label registrations within one event. A group may require other
//! groups to already be present on a registration (dependencies) and may
//! forbid co-presence with others (conflicts). Constraint checks are pure
//! predicates here; the mutating, loudly-failing operations live on the
//! store, which can see the whole registration.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{EntityRef, GroupId};
use crate::error::GroupConstraintError;

/// Who created a group.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupSource {
    /// Created by a person through the UI.
    #[default]
    User,
    /// Created by an integration; carries the integration's name.
    Module(String),
}

/// A group scoped to one event, attachable to its registrations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Store-assigned id; `GroupId::UNSAVED` until inserted.
    pub id: GroupId,
    /// The event this group belongs to.
    pub event: EntityRef,
    /// Short label.
    pub label: String,
    /// Longer description.
    pub description: Option<String>,
    /// Who created the group.
    pub source: GroupSource,
    /// Groups that must already be on a registration before this one.
    pub dependent_groups: SmallVec<[GroupId; 4]>,
    /// Groups that must not be on a registration with this one.
    pub conflicting_groups: SmallVec<[GroupId; 4]>,
}

impl Group {
    /// Create an unsaved group for an event.
    pub fn new(event: EntityRef, label: impl Into<String>) -> Self {
        Self {
            id: GroupId::UNSAVED,
            event,
            label: label.into(),
            description: None,
            source: GroupSource::default(),
            dependent_groups: SmallVec::new(),
            conflicting_groups: SmallVec::new(),
        }
    }

    /// Require another group to be present first (builder pattern).
    #[must_use]
    pub fn with_dependency(mut self, group: GroupId) -> Self {
        self.dependent_groups.push(group);
        self
    }

    /// Forbid co-presence with another group (builder pattern).
    #[must_use]
    pub fn with_conflict(mut self, group: GroupId) -> Self {
        self.conflicting_groups.push(group);
        self
    }

    /// Mark the group as created by an integration (builder pattern).
    #[must_use]
    pub fn with_source(mut self, source: GroupSource) -> Self {
        self.source = source;
        self
    }

    /// Whether the group was created by a person.
    #[must_use]
    pub fn is_user_generated(&self) -> bool {
        self.source == GroupSource::User
    }

    /// Whether this group may join a registration currently holding
    /// `current`.
    #[must_use]
    pub fn can_add(&self, current: &[GroupId]) -> bool {
        self.check_add(current).is_ok()
    }

    /// Check attach constraints, naming the violated one.
    pub fn check_add(&self, current: &[GroupId]) -> Result<(), GroupConstraintError> {
        for required in &self.dependent_groups {
            if !current.contains(required) {
                return Err(GroupConstraintError::MissingDependency {
                    group: self.id,
                    requires: *required,
                });
            }
        }
        for conflicting in &self.conflicting_groups {
            if current.contains(conflicting) {
                return Err(GroupConstraintError::Conflicting {
                    group: self.id,
                    conflicts_with: *conflicting,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> EntityRef {
        EntityRef::new("node", 1)
    }

    #[test]
    fn test_no_constraints_always_addable() {
        let group = Group::new(event(), "speakers");
        assert!(group.can_add(&[]));
        assert!(group.can_add(&[GroupId::new(9)]));
    }

    #[test]
    fn test_missing_dependency_rejected() {
        let vip = GroupId::new(2);
        let group = Group::new(event(), "backstage").with_dependency(vip);

        assert!(!group.can_add(&[]));
        assert_eq!(
            group.check_add(&[]),
            Err(GroupConstraintError::MissingDependency {
                group: GroupId::UNSAVED,
                requires: vip,
            })
        );
        assert!(group.can_add(&[vip]));
    }

    #[test]
    fn test_conflict_rejected() {
        let online = GroupId::new(3);
        let group = Group::new(event(), "in-person").with_conflict(online);

        assert!(group.can_add(&[]));
        assert_eq!(
            group.check_add(&[online]),
            Err(GroupConstraintError::Conflicting {
                group: GroupId::UNSAVED,
                conflicts_with: online,
            })
        );
    }

    #[test]
    fn test_dependencies_checked_before_conflicts() {
        let a = GroupId::new(1);
        let b = GroupId::new(2);
        let group = Group::new(event(), "both").with_dependency(a).with_conflict(b);

        // Both violated: the dependency is reported.
        assert_eq!(
            group.check_add(&[b]),
            Err(GroupConstraintError::MissingDependency {
                group: GroupId::UNSAVED,
                requires: a,
            })
        );
    }
}
