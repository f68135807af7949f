//! Relation substrate: typed edges, the append-only store, and the engines
//! that validate and reason over it.
//!
//! - [`store`]: the [`RelationStore`](store::RelationStore), one per family
//! - [`profile`]: the declarative mutual-exclusion table
//! - [`integrity`]: "would this edge contradict the taxonomy?" predicates
//! - [`traverse`]: the visited-set worklist every closure is built on
//! - [`closure`]: transitive closures for all three families
//! - [`domain_range`]: property domain/range propagation

pub mod closure;
pub mod domain_range;
pub mod integrity;
pub mod profile;
pub mod store;
pub mod traverse;

use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, EntityRole};

/// Partition of the relation store. Kinds never cross families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Family {
    /// Class subsumption, equivalence and disjointness.
    Class,
    /// Hierarchical, associative and mapping relations between concepts.
    Concept,
    /// Property subsumption, equivalence, domain and range.
    Property,
}

impl Family {
    pub const ALL: [Family; 3] = [Family::Class, Family::Concept, Family::Property];

    /// Role both endpoints of a relation in this family are registered with.
    ///
    /// `Domain` and `Range` objects are classes; see [`RelationKind::object_role`].
    pub fn role(self) -> EntityRole {
        match self {
            Family::Class => EntityRole::Class,
            Family::Concept => EntityRole::Concept,
            Family::Property => EntityRole::Property,
        }
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Family::Class => write!(f, "class"),
            Family::Concept => write!(f, "concept"),
            Family::Property => write!(f, "property"),
        }
    }
}

/// The closed set of relation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RelationKind {
    // Class taxonomy
    SubClassOf,
    EquivalentClass,
    DisjointWith,
    /// `(group, AllDisjointGroup, member)`: the group entity is anonymous.
    AllDisjointGroup,

    // Concept taxonomy
    Broader,
    BroaderTransitive,
    Narrower,
    NarrowerTransitive,
    Related,
    BroadMatch,
    NarrowMatch,
    CloseMatch,
    ExactMatch,
    RelatedMatch,

    // Property taxonomy
    SubPropertyOf,
    EquivalentProperty,
    Domain,
    Range,
}

impl RelationKind {
    pub const ALL: [RelationKind; 18] = [
        RelationKind::SubClassOf,
        RelationKind::EquivalentClass,
        RelationKind::DisjointWith,
        RelationKind::AllDisjointGroup,
        RelationKind::Broader,
        RelationKind::BroaderTransitive,
        RelationKind::Narrower,
        RelationKind::NarrowerTransitive,
        RelationKind::Related,
        RelationKind::BroadMatch,
        RelationKind::NarrowMatch,
        RelationKind::CloseMatch,
        RelationKind::ExactMatch,
        RelationKind::RelatedMatch,
        RelationKind::SubPropertyOf,
        RelationKind::EquivalentProperty,
        RelationKind::Domain,
        RelationKind::Range,
    ];

    /// Family this kind belongs to.
    pub fn family(self) -> Family {
        use RelationKind::*;
        match self {
            SubClassOf | EquivalentClass | DisjointWith | AllDisjointGroup => Family::Class,
            Broader | BroaderTransitive | Narrower | NarrowerTransitive | Related | BroadMatch
            | NarrowMatch | CloseMatch | ExactMatch | RelatedMatch => Family::Concept,
            SubPropertyOf | EquivalentProperty | Domain | Range => Family::Property,
        }
    }

    /// Symmetric kinds are committed as a mirrored pair of edges.
    pub fn is_symmetric(self) -> bool {
        use RelationKind::*;
        matches!(
            self,
            EquivalentClass
                | DisjointWith
                | Related
                | CloseMatch
                | ExactMatch
                | RelatedMatch
                | EquivalentProperty
        )
    }

    /// The kind that states the same fact with subject and object swapped.
    ///
    /// Symmetric kinds are their own inverse.
    pub fn inverse(self) -> Option<RelationKind> {
        use RelationKind::*;
        match self {
            Broader => Some(Narrower),
            Narrower => Some(Broader),
            BroaderTransitive => Some(NarrowerTransitive),
            NarrowerTransitive => Some(BroaderTransitive),
            BroadMatch => Some(NarrowMatch),
            NarrowMatch => Some(BroadMatch),
            k if k.is_symmetric() => Some(k),
            _ => None,
        }
    }

    /// Role the subject of an edge of this kind is registered with.
    pub fn subject_role(self) -> EntityRole {
        match self {
            RelationKind::AllDisjointGroup => EntityRole::Class,
            k => k.family().role(),
        }
    }

    /// Role the object of an edge of this kind is registered with.
    pub fn object_role(self) -> EntityRole {
        match self {
            RelationKind::Domain | RelationKind::Range => EntityRole::Class,
            k => k.family().role(),
        }
    }

    /// camelCase vocabulary term, as used in notices and exports.
    pub fn term(self) -> &'static str {
        use RelationKind::*;
        match self {
            SubClassOf => "subClassOf",
            EquivalentClass => "equivalentClass",
            DisjointWith => "disjointWith",
            AllDisjointGroup => "allDisjointClasses",
            Broader => "broader",
            BroaderTransitive => "broaderTransitive",
            Narrower => "narrower",
            NarrowerTransitive => "narrowerTransitive",
            Related => "related",
            BroadMatch => "broadMatch",
            NarrowMatch => "narrowMatch",
            CloseMatch => "closeMatch",
            ExactMatch => "exactMatch",
            RelatedMatch => "relatedMatch",
            SubPropertyOf => "subPropertyOf",
            EquivalentProperty => "equivalentProperty",
            Domain => "domain",
            Range => "range",
        }
    }
}

impl RelationKind {
    /// Inverse of [`RelationKind::term`]; the variant name is accepted too.
    pub fn from_term(term: &str) -> Option<RelationKind> {
        RelationKind::ALL
            .into_iter()
            .find(|k| k.term() == term || format!("{k:?}") == term)
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.term())
    }
}

/// Which way round a relation is read relative to the pair being declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// `K(a, b)` for a declaration between `(a, b)`.
    Same,
    /// `K(b, a)` for a declaration between `(a, b)`.
    Reversed,
}

/// A directed, labeled edge `(subject, kind, object)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationEdge {
    pub subject: EntityId,
    pub kind: RelationKind,
    pub object: EntityId,
}

impl RelationEdge {
    pub fn new(subject: EntityId, kind: RelationKind, object: EntityId) -> Self {
        Self {
            subject,
            kind,
            object,
        }
    }

    /// Edges a declaration of this edge commits: itself, plus its mirror for
    /// symmetric kinds.
    pub fn commit_set(&self) -> Vec<Self> {
        if self.kind.is_symmetric() {
            vec![*self, Self::new(self.object, self.kind, self.subject)]
        } else {
            vec![*self]
        }
    }
}
