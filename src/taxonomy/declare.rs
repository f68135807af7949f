//! Declare-operations: the only way relation edges enter a taxonomy through
//! validation.
//!
//! Every operation follows the same sequence:
//!
//! 1. preconditions (self-relation, empty collections, bad literals) fail
//!    fast with a [`PreconditionError`] and leave the taxonomy untouched
//! 2. both endpoints are registered with the role the kind requires
//! 3. the [`IntegrityChecker`] is consulted; a conflict becomes a warning on
//!    the notice channel and the call returns normally without committing
//! 4. the edge, plus its mirror for symmetric kinds, is committed at once
//!
//! Operations return `&mut Self` so declarations chain with `?`.

use std::collections::HashSet;

use crate::entity::{EntityId, EntityRole};
use crate::error::{PreconditionError, TaxoResult};
use crate::graph::integrity::IntegrityChecker;
use crate::graph::{RelationEdge, RelationKind};
use crate::labels::{LabelKind, Literal};
use crate::message::Notice;

use super::Taxonomy;

impl Taxonomy {
    // -- entities ------------------------------------------------------------

    /// Intern a named class. Idempotent.
    pub fn declare_class(&mut self, name: &str) -> TaxoResult<EntityId> {
        self.registry.declare_named(name, EntityRole::Class)
    }

    /// Intern a named concept. Idempotent.
    pub fn declare_concept(&mut self, name: &str) -> TaxoResult<EntityId> {
        self.registry.declare_named(name, EntityRole::Concept)
    }

    /// Intern a named property. Idempotent.
    pub fn declare_property(&mut self, name: &str) -> TaxoResult<EntityId> {
        self.registry.declare_named(name, EntityRole::Property)
    }

    // -- generic -------------------------------------------------------------

    /// Declare `kind(subject, object)` for any binary kind.
    ///
    /// `AllDisjointGroup` is n-ary; use [`Taxonomy::declare_all_disjoint`].
    pub fn declare(
        &mut self,
        kind: RelationKind,
        subject: EntityId,
        object: EntityId,
    ) -> TaxoResult<&mut Self> {
        self.relate("declare", kind, subject, object)
    }

    fn relate(
        &mut self,
        operation: &'static str,
        kind: RelationKind,
        subject: EntityId,
        object: EntityId,
    ) -> TaxoResult<&mut Self> {
        if kind == RelationKind::AllDisjointGroup {
            return Err(PreconditionError::NotBinary {
                operation,
                kind: kind.to_string(),
            }
            .into());
        }
        if subject == object {
            return Err(PreconditionError::SelfRelation {
                operation,
                entity: self.display_name(subject),
            }
            .into());
        }

        self.registry.ensure(subject, kind.subject_role());
        self.registry.ensure(object, kind.object_role());

        let edge = RelationEdge::new(subject, kind, object);
        if self.stores.contains(&edge) {
            return Ok(self);
        }

        let violation =
            IntegrityChecker::new(&self.profile, self.engine()).check(kind, subject, object);
        if let Some(violation) = violation {
            tracing::debug!(%kind, %subject, %object, "declaration rejected");
            let notice = self.violation_notice(&violation);
            self.emit(notice);
            return Ok(self);
        }

        let added = self.stores.commit(&edge.commit_set());
        if added > 0 {
            self.bump_generation();
        }
        Ok(self)
    }

    // -- class taxonomy ------------------------------------------------------

    /// `sub ⊑ sup`.
    pub fn declare_sub_class_of(&mut self, sub: EntityId, sup: EntityId) -> TaxoResult<&mut Self> {
        self.relate("declare_sub_class_of", RelationKind::SubClassOf, sub, sup)
    }

    /// `a ≡ b`; committed in both directions.
    pub fn declare_equivalent_classes(
        &mut self,
        a: EntityId,
        b: EntityId,
    ) -> TaxoResult<&mut Self> {
        self.relate("declare_equivalent_classes", RelationKind::EquivalentClass, a, b)
    }

    /// `a` and `b` share no instances; committed in both directions.
    pub fn declare_disjoint_classes(&mut self, a: EntityId, b: EntityId) -> TaxoResult<&mut Self> {
        self.relate("declare_disjoint_classes", RelationKind::DisjointWith, a, b)
    }

    /// Declare every pair of `members` mutually disjoint.
    ///
    /// The group is recorded as a fresh anonymous entity with an
    /// `AllDisjointGroup` edge to each member. Every pair is checked first;
    /// if any pair conflicts, one warning per conflicting pair is emitted and
    /// nothing is committed. Re-declaring an existing group is a no-op.
    pub fn declare_all_disjoint(&mut self, members: &[EntityId]) -> TaxoResult<&mut Self> {
        self.group("declare_all_disjoint", None, members)
    }

    /// Shared body of group declarations. Bulk import passes the group entity
    /// of the snapshot so the group keeps its ID.
    pub(super) fn group(
        &mut self,
        operation: &'static str,
        group: Option<EntityId>,
        members: &[EntityId],
    ) -> TaxoResult<&mut Self> {
        if members.is_empty() {
            return Err(PreconditionError::EmptyCollection {
                operation,
                what: "members",
            }
            .into());
        }
        let mut seen = HashSet::new();
        for &m in members {
            if !seen.insert(m) {
                return Err(PreconditionError::DuplicateMember {
                    operation,
                    entity: self.display_name(m),
                }
                .into());
            }
        }
        if seen.len() < 2 {
            return Err(PreconditionError::TooFewMembers {
                operation,
                required: 2,
                actual: seen.len(),
            }
            .into());
        }

        for &m in members {
            self.registry.ensure(m, EntityRole::Class);
        }
        if self.has_group(&seen) {
            return Ok(self);
        }

        let violations =
            IntegrityChecker::new(&self.profile, self.engine()).check_group(members);
        if !violations.is_empty() {
            tracing::debug!(conflicts = violations.len(), "disjointness group rejected");
            let notices: Vec<Notice> = violations
                .iter()
                .map(|v| self.violation_notice(v))
                .collect();
            self.sink.emit_batch(&notices);
            return Ok(self);
        }

        let group = match group {
            Some(id) if self.stores.objects_of(id, RelationKind::AllDisjointGroup).is_empty() => {
                self.registry.ensure(id, EntityRole::Class);
                id
            }
            _ => self.registry.declare_anonymous(EntityRole::Class)?,
        };
        let edges: Vec<RelationEdge> = members
            .iter()
            .map(|&m| RelationEdge::new(group, RelationKind::AllDisjointGroup, m))
            .collect();
        self.stores.commit(&edges);
        self.bump_generation();
        Ok(self)
    }

    fn has_group(&self, members: &HashSet<EntityId>) -> bool {
        let Some(&first) = members.iter().next() else {
            return false;
        };
        self.stores
            .subjects_of(RelationKind::AllDisjointGroup, first)
            .into_iter()
            .any(|group| {
                let existing: HashSet<EntityId> = self
                    .stores
                    .objects_of(group, RelationKind::AllDisjointGroup)
                    .into_iter()
                    .collect();
                existing == *members
            })
    }

    // -- concept taxonomy ----------------------------------------------------

    /// `narrower` has the one-hop broader concept `broader`.
    pub fn declare_broader(
        &mut self,
        narrower: EntityId,
        broader: EntityId,
    ) -> TaxoResult<&mut Self> {
        self.relate("declare_broader", RelationKind::Broader, narrower, broader)
    }

    pub fn declare_broader_transitive(
        &mut self,
        narrower: EntityId,
        broader: EntityId,
    ) -> TaxoResult<&mut Self> {
        self.relate(
            "declare_broader_transitive",
            RelationKind::BroaderTransitive,
            narrower,
            broader,
        )
    }

    /// `broader` has the one-hop narrower concept `narrower`.
    pub fn declare_narrower(
        &mut self,
        broader: EntityId,
        narrower: EntityId,
    ) -> TaxoResult<&mut Self> {
        self.relate("declare_narrower", RelationKind::Narrower, broader, narrower)
    }

    pub fn declare_narrower_transitive(
        &mut self,
        broader: EntityId,
        narrower: EntityId,
    ) -> TaxoResult<&mut Self> {
        self.relate(
            "declare_narrower_transitive",
            RelationKind::NarrowerTransitive,
            broader,
            narrower,
        )
    }

    pub fn declare_related(&mut self, a: EntityId, b: EntityId) -> TaxoResult<&mut Self> {
        self.relate("declare_related", RelationKind::Related, a, b)
    }

    pub fn declare_broad_match(&mut self, a: EntityId, b: EntityId) -> TaxoResult<&mut Self> {
        self.relate("declare_broad_match", RelationKind::BroadMatch, a, b)
    }

    pub fn declare_narrow_match(&mut self, a: EntityId, b: EntityId) -> TaxoResult<&mut Self> {
        self.relate("declare_narrow_match", RelationKind::NarrowMatch, a, b)
    }

    pub fn declare_close_match(&mut self, a: EntityId, b: EntityId) -> TaxoResult<&mut Self> {
        self.relate("declare_close_match", RelationKind::CloseMatch, a, b)
    }

    pub fn declare_exact_match(&mut self, a: EntityId, b: EntityId) -> TaxoResult<&mut Self> {
        self.relate("declare_exact_match", RelationKind::ExactMatch, a, b)
    }

    pub fn declare_related_match(&mut self, a: EntityId, b: EntityId) -> TaxoResult<&mut Self> {
        self.relate("declare_related_match", RelationKind::RelatedMatch, a, b)
    }

    // -- property taxonomy ---------------------------------------------------

    pub fn declare_sub_property_of(
        &mut self,
        sub: EntityId,
        sup: EntityId,
    ) -> TaxoResult<&mut Self> {
        self.relate("declare_sub_property_of", RelationKind::SubPropertyOf, sub, sup)
    }

    pub fn declare_equivalent_properties(
        &mut self,
        a: EntityId,
        b: EntityId,
    ) -> TaxoResult<&mut Self> {
        self.relate(
            "declare_equivalent_properties",
            RelationKind::EquivalentProperty,
            a,
            b,
        )
    }

    /// Subjects of `property` are instances of `class`.
    pub fn declare_domain(&mut self, property: EntityId, class: EntityId) -> TaxoResult<&mut Self> {
        self.relate("declare_domain", RelationKind::Domain, property, class)
    }

    /// Objects of `property` are instances of `class`.
    pub fn declare_range(&mut self, property: EntityId, class: EntityId) -> TaxoResult<&mut Self> {
        self.relate("declare_range", RelationKind::Range, property, class)
    }

    // -- labels --------------------------------------------------------------

    pub fn declare_pref_label(
        &mut self,
        concept: EntityId,
        value: &str,
        language: Option<&str>,
    ) -> TaxoResult<&mut Self> {
        self.label("declare_pref_label", LabelKind::Preferred, concept, value, language)
    }

    pub fn declare_alt_label(
        &mut self,
        concept: EntityId,
        value: &str,
        language: Option<&str>,
    ) -> TaxoResult<&mut Self> {
        self.label("declare_alt_label", LabelKind::Alternative, concept, value, language)
    }

    pub fn declare_hidden_label(
        &mut self,
        concept: EntityId,
        value: &str,
        language: Option<&str>,
    ) -> TaxoResult<&mut Self> {
        self.label("declare_hidden_label", LabelKind::Hidden, concept, value, language)
    }

    /// Attach a label of any kind.
    pub fn declare_label(
        &mut self,
        kind: LabelKind,
        concept: EntityId,
        value: &str,
        language: Option<&str>,
    ) -> TaxoResult<&mut Self> {
        self.label("declare_label", kind, concept, value, language)
    }

    pub(super) fn label(
        &mut self,
        operation: &'static str,
        kind: LabelKind,
        concept: EntityId,
        value: &str,
        language: Option<&str>,
    ) -> TaxoResult<&mut Self> {
        let literal = Literal::new(operation, value, language)?;
        self.registry.ensure(concept, EntityRole::Concept);

        let conflicts = self.labels.conflicts(concept, kind, &literal);
        if !conflicts.is_empty() {
            let notice = Notice::conflict(
                self.display_name(concept),
                literal.to_string(),
                kind.term(),
                conflicts.iter().map(|k| k.term().to_string()).collect(),
            );
            self.emit(notice);
            return Ok(self);
        }
        self.labels.insert(concept, kind, literal);
        Ok(self)
    }
}
