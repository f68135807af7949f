//! Integrity checking: would a new edge contradict the taxonomy?
//!
//! A declaration `K(a, b)` conflicts when any exclusion the
//! [`ConstraintProfile`] lists for `K` already holds between `a` and `b`,
//! either as a stored edge or by inference through the [`ClosureEngine`].
//!
//! Conflicts are *reported*, not raised. The mutator turns them into warnings
//! and skips the commit.

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

use super::closure::ClosureEngine;
use super::profile::{ConstraintProfile, Exclusion};
use super::{Orientation, RelationKind};

/// A declaration rejected because of existing knowledge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub subject: EntityId,
    pub object: EntityId,
    /// The kind whose declaration was attempted.
    pub attempted: RelationKind,
    /// Exclusions that already hold between the pair.
    pub conflicting: Vec<Exclusion>,
}

/// Pure predicates over a profile and a closure engine.
#[derive(Debug, Clone, Copy)]
pub struct IntegrityChecker<'a> {
    profile: &'a ConstraintProfile,
    engine: ClosureEngine<'a>,
}

impl<'a> IntegrityChecker<'a> {
    pub fn new(profile: &'a ConstraintProfile, engine: ClosureEngine<'a>) -> Self {
        Self { profile, engine }
    }

    /// Exclusions for `kind` that already hold between `subject` and `object`.
    pub fn conflicts(
        &self,
        kind: RelationKind,
        subject: EntityId,
        object: EntityId,
    ) -> Vec<Exclusion> {
        self.profile
            .excluded_by(kind)
            .iter()
            .copied()
            .filter(|ex| match ex.orientation {
                Orientation::Same => self.engine.holds(ex.kind, subject, object),
                Orientation::Reversed => self.engine.holds(ex.kind, object, subject),
            })
            .collect()
    }

    /// `None` if `kind(subject, object)` may be committed.
    pub fn check(
        &self,
        kind: RelationKind,
        subject: EntityId,
        object: EntityId,
    ) -> Option<Violation> {
        let conflicting = self.conflicts(kind, subject, object);
        if conflicting.is_empty() {
            None
        } else {
            Some(Violation {
                subject,
                object,
                attempted: kind,
                conflicting,
            })
        }
    }

    /// Whether `kind(subject, object)` may be committed.
    pub fn permits(&self, kind: RelationKind, subject: EntityId, object: EntityId) -> bool {
        self.check(kind, subject, object).is_none()
    }

    /// Check every pair of an n-ary disjointness group as `DisjointWith`.
    pub fn check_group(&self, members: &[EntityId]) -> Vec<Violation> {
        let mut violations = Vec::new();
        for (i, &a) in members.iter().enumerate() {
            for &b in &members[i + 1..] {
                violations.extend(self.check(RelationKind::DisjointWith, a, b));
            }
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::RelationEdge;
    use crate::graph::store::RelationStores;

    use RelationKind::*;

    fn ent(id: u64) -> EntityId {
        EntityId::new(id).unwrap()
    }

    fn stores(edges: &[(u64, RelationKind, u64)]) -> RelationStores {
        let mut stores = RelationStores::new();
        for &(s, k, o) in edges {
            stores.insert(RelationEdge::new(ent(s), k, ent(o)));
        }
        stores
    }

    #[test]
    fn inferred_superclass_blocks_reverse_subclass() {
        let s = stores(&[(1, SubClassOf, 2), (2, SubClassOf, 3)]);
        let profile = ConstraintProfile::builtin();
        let checker = IntegrityChecker::new(&profile, ClosureEngine::new(&s));

        let v = checker.check(SubClassOf, ent(3), ent(1)).unwrap();
        assert_eq!(v.conflicting, vec![Exclusion::reversed(SubClassOf)]);
        assert!(checker.permits(SubClassOf, ent(1), ent(3)));
    }

    #[test]
    fn equivalence_and_disjointness_block_each_other() {
        let s = stores(&[(1, EquivalentClass, 2), (2, EquivalentClass, 1), (3, DisjointWith, 4)]);
        let profile = ConstraintProfile::builtin();
        let checker = IntegrityChecker::new(&profile, ClosureEngine::new(&s));

        assert!(!checker.permits(DisjointWith, ent(2), ent(1)));
        assert!(!checker.permits(SubClassOf, ent(1), ent(2)));
        assert!(!checker.permits(EquivalentClass, ent(4), ent(3)));
        assert!(checker.permits(EquivalentClass, ent(1), ent(2)));
    }

    #[test]
    fn concept_inverse_on_reversed_pair_is_compatible() {
        let s = stores(&[(1, Broader, 2)]);
        let profile = ConstraintProfile::builtin();
        let checker = IntegrityChecker::new(&profile, ClosureEngine::new(&s));

        // narrower(2, 1) restates broader(1, 2).
        assert!(checker.permits(Narrower, ent(2), ent(1)));
        assert!(checker.permits(BroaderTransitive, ent(1), ent(2)));
        assert_eq!(
            checker.conflicts(Narrower, ent(1), ent(2)),
            vec![Exclusion::same(Broader)]
        );
        assert!(!checker.permits(Related, ent(1), ent(2)));
        assert!(!checker.permits(ExactMatch, ent(2), ent(1)));
    }

    #[test]
    fn group_reports_every_conflicting_pair() {
        let s = stores(&[(1, SubClassOf, 2), (3, EquivalentClass, 1)]);
        let profile = ConstraintProfile::builtin();
        let checker = IntegrityChecker::new(&profile, ClosureEngine::new(&s));

        // 1 ⊑ 2, 1 ≡ 3, and so 3 ⊑ 2.
        let violations = checker.check_group(&[ent(1), ent(2), ent(3), ent(4)]);
        assert_eq!(violations.len(), 3);
        assert!(violations.iter().all(|v| v.object != ent(4)));
        assert!(checker.check_group(&[ent(2), ent(4)]).is_empty());
    }

    #[test]
    fn empty_profile_permits_everything() {
        let s = stores(&[(1, SubClassOf, 2)]);
        let profile = ConstraintProfile::empty();
        let checker = IntegrityChecker::new(&profile, ClosureEngine::new(&s));
        assert!(checker.permits(SubClassOf, ent(2), ent(1)));
    }
}
