//! Check- and answer-operations.
//!
//! Queries take `&self` and never fail: unknown or isolated entities yield
//! `false` or an empty set. Under the materialized strategy a current table
//! answers directly; otherwise the closure is computed on read.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;

use crate::entity::{EntityId, EntityRole};
use crate::graph::RelationKind;
use crate::graph::closure::Closure;
use crate::graph::domain_range::DomainRangeAnalyzer;
use crate::labels::{LabelKind, Literal};

use super::Taxonomy;

/// One boolean check-operation per binary relation kind.
macro_rules! check_operations {
    ($($(#[$doc:meta])* $name:ident => $kind:ident;)+) => {
        $(
            $(#[$doc])*
            pub fn $name(&self, subject: EntityId, object: EntityId) -> bool {
                self.holds(RelationKind::$kind, subject, object)
            }
        )+
    };
}

/// One answer-operation per closure.
macro_rules! answer_operations {
    ($($(#[$doc:meta])* $name:ident => $closure:ident;)+) => {
        $(
            $(#[$doc])*
            pub fn $name(&self, entity: EntityId) -> HashSet<EntityId> {
                self.answer(Closure::$closure, entity)
            }
        )+
    };
}

impl Taxonomy {
    /// Compute `closure` for `entity`.
    pub fn answer(&self, closure: Closure, entity: EntityId) -> HashSet<EntityId> {
        if let Some(table) = &self.materialized {
            if let Some(answer) = table.lookup(closure, entity, self.generation) {
                return answer;
            }
        }
        self.engine().answer(closure, entity)
    }

    /// Compute `closure` for many entities in parallel.
    pub fn answer_many(
        &self,
        closure: Closure,
        entities: &[EntityId],
    ) -> HashMap<EntityId, HashSet<EntityId>> {
        entities
            .par_iter()
            .map(|&e| (e, self.answer(closure, e)))
            .collect()
    }

    /// Whether `kind(subject, object)` holds directly or by inference.
    pub fn holds(&self, kind: RelationKind, subject: EntityId, object: EntityId) -> bool {
        subject != object && self.answer(Closure::for_kind(kind), subject).contains(&object)
    }

    check_operations! {
        /// `sub ⊑ sup`, through chains and equivalences.
        check_sub_class_of => SubClassOf;
        check_equivalent_class => EquivalentClass;
        /// Disjointness with inheritance through superclasses, equivalents
        /// and n-ary groups.
        check_disjoint_with => DisjointWith;
        check_broader => Broader;
        check_broader_transitive => BroaderTransitive;
        check_narrower => Narrower;
        check_narrower_transitive => NarrowerTransitive;
        check_related => Related;
        check_broad_match => BroadMatch;
        check_narrow_match => NarrowMatch;
        check_close_match => CloseMatch;
        check_exact_match => ExactMatch;
        check_related_match => RelatedMatch;
        check_sub_property_of => SubPropertyOf;
        check_equivalent_property => EquivalentProperty;
        /// `class` is in the expanded domain of `property`.
        check_domain => Domain;
        /// `class` is in the expanded range of `property`.
        check_range => Range;
    }

    answer_operations! {
        super_classes => SuperClasses;
        sub_classes => SubClasses;
        equivalent_classes => EquivalentClasses;
        disjoint_classes => DisjointClasses;
        broader_concepts => BroaderConcepts;
        narrower_concepts => NarrowerConcepts;
        related_concepts => RelatedConcepts;
        broad_match_concepts => BroadMatchConcepts;
        narrow_match_concepts => NarrowMatchConcepts;
        close_match_concepts => CloseMatchConcepts;
        exact_match_concepts => ExactMatchConcepts;
        related_match_concepts => RelatedMatchConcepts;
        super_properties => SuperProperties;
        sub_properties => SubProperties;
        equivalent_properties => EquivalentProperties;
        /// Domain classes of a property, expanded down the class lattice.
        domain_of => DomainOf;
        /// Range classes of a property, expanded down the class lattice.
        range_of => RangeOf;
    }

    /// Whether every member of `members` is pairwise disjoint.
    pub fn check_all_disjoint(&self, members: &[EntityId]) -> bool {
        members.len() >= 2
            && members.iter().enumerate().all(|(i, &a)| {
                members[i + 1..]
                    .iter()
                    .all(|&b| self.check_disjoint_with(a, b))
            })
    }

    // -- domain and range ----------------------------------------------------

    fn domain_range(&self) -> DomainRangeAnalyzer<'_> {
        DomainRangeAnalyzer::new(self.engine())
    }

    pub fn is_in_domain(&self, property: EntityId, class: EntityId) -> bool {
        self.domain_of(property).contains(&class)
    }

    pub fn is_in_range(&self, property: EntityId, class: EntityId) -> bool {
        self.range_of(property).contains(&class)
    }

    /// Registered properties whose domain contains `class`.
    pub fn properties_with_domain(&self, class: EntityId) -> HashSet<EntityId> {
        self.domain_range()
            .properties_with_domain(class, self.registry.with_role(EntityRole::Property))
    }

    /// Registered properties whose range contains `class`.
    pub fn properties_with_range(&self, class: EntityId) -> HashSet<EntityId> {
        self.domain_range()
            .properties_with_range(class, self.registry.with_role(EntityRole::Property))
    }

    // -- labels --------------------------------------------------------------

    /// Whether `concept` carries the label; malformed literals never match.
    pub fn check_label(
        &self,
        kind: LabelKind,
        concept: EntityId,
        value: &str,
        language: Option<&str>,
    ) -> bool {
        Literal::new("check_label", value, language)
            .is_ok_and(|literal| self.labels.contains(concept, kind, &literal))
    }

    pub fn preferred_label(&self, concept: EntityId, language: Option<&str>) -> Option<&Literal> {
        self.labels.preferred(concept, language)
    }

    pub fn labels_of(&self, concept: EntityId, kind: LabelKind) -> Vec<&Literal> {
        self.labels.labels_of(concept, kind)
    }
}
