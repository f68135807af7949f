//! Transitive closures over all three relation families.
//!
//! One engine serves classes, concepts and properties. Each answer-operation
//! is a [`Closure`] whose shape is data: which edge steps may be taken once
//! from the queried entity, which chain transitively, and which form the
//! equivalence that every reached node fans out through. All traversal goes
//! through [`traverse::reach`](super::traverse::reach), so cyclic stores
//! terminate.
//!
//! Closures are computed on read. [`MaterializedClosures`] is an optional
//! secondary table of precomputed answers; it is never written back into the
//! relation store.

use std::collections::{HashMap, HashSet};

use petgraph::Direction;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

use super::store::RelationStores;
use super::traverse::{reach, reachable_from};
use super::{Family, RelationKind};

/// Answer-operations, one per closure the engine can compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Closure {
    SuperClasses,
    SubClasses,
    EquivalentClasses,
    DisjointClasses,
    BroaderConcepts,
    NarrowerConcepts,
    RelatedConcepts,
    BroadMatchConcepts,
    NarrowMatchConcepts,
    CloseMatchConcepts,
    ExactMatchConcepts,
    RelatedMatchConcepts,
    SuperProperties,
    SubProperties,
    EquivalentProperties,
    DomainOf,
    RangeOf,
}

impl Closure {
    pub const ALL: [Closure; 17] = [
        Closure::SuperClasses,
        Closure::SubClasses,
        Closure::EquivalentClasses,
        Closure::DisjointClasses,
        Closure::BroaderConcepts,
        Closure::NarrowerConcepts,
        Closure::RelatedConcepts,
        Closure::BroadMatchConcepts,
        Closure::NarrowMatchConcepts,
        Closure::CloseMatchConcepts,
        Closure::ExactMatchConcepts,
        Closure::RelatedMatchConcepts,
        Closure::SuperProperties,
        Closure::SubProperties,
        Closure::EquivalentProperties,
        Closure::DomainOf,
        Closure::RangeOf,
    ];

    /// Family of the queried entity.
    pub fn family(self) -> Family {
        use Closure::*;
        match self {
            SuperClasses | SubClasses | EquivalentClasses | DisjointClasses => Family::Class,
            BroaderConcepts | NarrowerConcepts | RelatedConcepts | BroadMatchConcepts
            | NarrowMatchConcepts | CloseMatchConcepts | ExactMatchConcepts
            | RelatedMatchConcepts => Family::Concept,
            SuperProperties | SubProperties | EquivalentProperties | DomainOf | RangeOf => {
                Family::Property
            }
        }
    }

    /// The closure that decides whether `kind(a, b)` holds: `b ∈ closure(a)`.
    pub fn for_kind(kind: RelationKind) -> Closure {
        use RelationKind::*;
        match kind {
            SubClassOf => Closure::SuperClasses,
            EquivalentClass => Closure::EquivalentClasses,
            DisjointWith | AllDisjointGroup => Closure::DisjointClasses,
            Broader | BroaderTransitive => Closure::BroaderConcepts,
            Narrower | NarrowerTransitive => Closure::NarrowerConcepts,
            Related => Closure::RelatedConcepts,
            BroadMatch => Closure::BroadMatchConcepts,
            NarrowMatch => Closure::NarrowMatchConcepts,
            CloseMatch => Closure::CloseMatchConcepts,
            ExactMatch => Closure::ExactMatchConcepts,
            RelatedMatch => Closure::RelatedMatchConcepts,
            SubPropertyOf => Closure::SuperProperties,
            EquivalentProperty => Closure::EquivalentProperties,
            Domain => Closure::DomainOf,
            Range => Closure::RangeOf,
        }
    }

    /// snake_case name used by the CLI.
    pub fn name(self) -> &'static str {
        use Closure::*;
        match self {
            SuperClasses => "super_classes",
            SubClasses => "sub_classes",
            EquivalentClasses => "equivalent_classes",
            DisjointClasses => "disjoint_classes",
            BroaderConcepts => "broader_concepts",
            NarrowerConcepts => "narrower_concepts",
            RelatedConcepts => "related_concepts",
            BroadMatchConcepts => "broad_match_concepts",
            NarrowMatchConcepts => "narrow_match_concepts",
            CloseMatchConcepts => "close_match_concepts",
            ExactMatchConcepts => "exact_match_concepts",
            RelatedMatchConcepts => "related_match_concepts",
            SuperProperties => "super_properties",
            SubProperties => "sub_properties",
            EquivalentProperties => "equivalent_properties",
            DomainOf => "domain_of",
            RangeOf => "range_of",
        }
    }

    /// Inverse of [`Closure::name`].
    pub fn from_name(name: &str) -> Option<Closure> {
        Closure::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl std::fmt::Display for Closure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether answers are computed per query or read from a precomputed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosureStrategy {
    /// Recompute every answer from the store.
    #[default]
    OnDemand,
    /// Serve answers from [`MaterializedClosures`] while it is current.
    Materialized,
}

// ---------------------------------------------------------------------------
// Closure shapes
// ---------------------------------------------------------------------------

/// One edge step: follow `kind` outgoing (`s → o`) or incoming (`o → s`).
#[derive(Debug, Clone, Copy)]
struct Step {
    kind: RelationKind,
    direction: Direction,
}

const fn out(kind: RelationKind) -> Step {
    Step {
        kind,
        direction: Direction::Outgoing,
    }
}

const fn inc(kind: RelationKind) -> Step {
    Step {
        kind,
        direction: Direction::Incoming,
    }
}

/// A subsumption-like closure.
///
/// `hop` steps are taken from the queried entity (and its equivalents) only;
/// `chain` steps are taken from every node reached along the chain; every
/// chained node also fans out through `equivalence`.
struct Hierarchy {
    hop: &'static [Step],
    chain: &'static [Step],
    equivalence: &'static [Step],
}

const CLASS_EQUIVALENCE: &[Step] = &[
    out(RelationKind::EquivalentClass),
    inc(RelationKind::EquivalentClass),
];
const PROPERTY_EQUIVALENCE: &[Step] = &[
    out(RelationKind::EquivalentProperty),
    inc(RelationKind::EquivalentProperty),
];
const EXACT_MATCH: &[Step] = &[out(RelationKind::ExactMatch), inc(RelationKind::ExactMatch)];

const SUPER_CLASSES: Hierarchy = Hierarchy {
    hop: &[],
    chain: &[out(RelationKind::SubClassOf)],
    equivalence: CLASS_EQUIVALENCE,
};
const SUB_CLASSES: Hierarchy = Hierarchy {
    hop: &[],
    chain: &[inc(RelationKind::SubClassOf)],
    equivalence: CLASS_EQUIVALENCE,
};
const SUPER_PROPERTIES: Hierarchy = Hierarchy {
    hop: &[],
    chain: &[out(RelationKind::SubPropertyOf)],
    equivalence: PROPERTY_EQUIVALENCE,
};
const SUB_PROPERTIES: Hierarchy = Hierarchy {
    hop: &[],
    chain: &[inc(RelationKind::SubPropertyOf)],
    equivalence: PROPERTY_EQUIVALENCE,
};
const BROADER: Hierarchy = Hierarchy {
    hop: &[out(RelationKind::Broader), inc(RelationKind::Narrower)],
    chain: &[
        out(RelationKind::BroaderTransitive),
        inc(RelationKind::NarrowerTransitive),
    ],
    equivalence: &[],
};
const NARROWER: Hierarchy = Hierarchy {
    hop: &[out(RelationKind::Narrower), inc(RelationKind::Broader)],
    chain: &[
        out(RelationKind::NarrowerTransitive),
        inc(RelationKind::BroaderTransitive),
    ],
    equivalence: &[],
};
const RELATED: Hierarchy = Hierarchy {
    hop: &[out(RelationKind::Related), inc(RelationKind::Related)],
    chain: &[],
    equivalence: &[],
};
const BROAD_MATCH: Hierarchy = Hierarchy {
    hop: &[out(RelationKind::BroadMatch), inc(RelationKind::NarrowMatch)],
    chain: &[],
    equivalence: &[],
};
const NARROW_MATCH: Hierarchy = Hierarchy {
    hop: &[out(RelationKind::NarrowMatch), inc(RelationKind::BroadMatch)],
    chain: &[],
    equivalence: &[],
};
const CLOSE_MATCH: Hierarchy = Hierarchy {
    hop: &[out(RelationKind::CloseMatch), inc(RelationKind::CloseMatch)],
    chain: &[],
    equivalence: &[],
};
const RELATED_MATCH: Hierarchy = Hierarchy {
    hop: &[out(RelationKind::RelatedMatch), inc(RelationKind::RelatedMatch)],
    chain: &[],
    equivalence: &[],
};
const DISJOINT: &[Step] = &[
    out(RelationKind::DisjointWith),
    inc(RelationKind::DisjointWith),
];

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Read-only closure computation over a set of relation stores.
#[derive(Clone, Copy)]
pub struct ClosureEngine<'a> {
    stores: &'a RelationStores,
}

impl<'a> ClosureEngine<'a> {
    pub fn new(stores: &'a RelationStores) -> Self {
        Self { stores }
    }

    /// Compute `closure` for `entity`. Unknown entities yield an empty set.
    pub fn answer(&self, closure: Closure, entity: EntityId) -> HashSet<EntityId> {
        let result = match closure {
            Closure::SuperClasses => self.hierarchy(&SUPER_CLASSES, entity),
            Closure::SubClasses => self.hierarchy(&SUB_CLASSES, entity),
            Closure::EquivalentClasses => self.equivalence(CLASS_EQUIVALENCE, entity),
            Closure::DisjointClasses => self.disjoint_classes(entity),
            Closure::BroaderConcepts => self.hierarchy(&BROADER, entity),
            Closure::NarrowerConcepts => self.hierarchy(&NARROWER, entity),
            Closure::RelatedConcepts => self.hierarchy(&RELATED, entity),
            Closure::BroadMatchConcepts => self.hierarchy(&BROAD_MATCH, entity),
            Closure::NarrowMatchConcepts => self.hierarchy(&NARROW_MATCH, entity),
            Closure::CloseMatchConcepts => self.hierarchy(&CLOSE_MATCH, entity),
            Closure::ExactMatchConcepts => self.equivalence(EXACT_MATCH, entity),
            Closure::RelatedMatchConcepts => self.hierarchy(&RELATED_MATCH, entity),
            Closure::SuperProperties => self.hierarchy(&SUPER_PROPERTIES, entity),
            Closure::SubProperties => self.hierarchy(&SUB_PROPERTIES, entity),
            Closure::EquivalentProperties => self.equivalence(PROPERTY_EQUIVALENCE, entity),
            Closure::DomainOf => self.property_classes(RelationKind::Domain, entity),
            Closure::RangeOf => self.property_classes(RelationKind::Range, entity),
        };
        tracing::trace!(%closure, %entity, size = result.len(), "closure computed");
        result
    }

    /// Whether `kind(subject, object)` holds directly or by inference.
    pub fn holds(&self, kind: RelationKind, subject: EntityId, object: EntityId) -> bool {
        subject != object && self.answer(Closure::for_kind(kind), subject).contains(&object)
    }

    fn neighbors(&self, node: EntityId, steps: &[Step]) -> Vec<EntityId> {
        let mut found = Vec::new();
        for step in steps {
            match step.direction {
                Direction::Outgoing => found.extend(self.stores.objects_of(node, step.kind)),
                Direction::Incoming => found.extend(self.stores.subjects_of(step.kind, node)),
            }
        }
        found
    }

    fn equivalence(&self, steps: &[Step], entity: EntityId) -> HashSet<EntityId> {
        reachable_from(entity, |n| self.neighbors(n, steps))
    }

    fn hierarchy(&self, shape: &Hierarchy, entity: EntityId) -> HashSet<EntityId> {
        let seeds = reach([entity], |n| self.neighbors(n, shape.equivalence)).visited;

        let mut result = reach(seeds.iter().copied(), |n| {
            let mut next = self.neighbors(n, shape.chain);
            next.extend(self.neighbors(n, shape.equivalence));
            next
        })
        .visited;

        for &seed in &seeds {
            result.extend(self.neighbors(seed, shape.hop));
        }
        result.retain(|n| !seeds.contains(n));
        result
    }

    /// Classes below any of `tops` (inclusive), fanned out through equivalence.
    fn downward(&self, tops: impl IntoIterator<Item = EntityId>) -> HashSet<EntityId> {
        reach(tops, |n| {
            let mut next = self.neighbors(n, SUB_CLASSES.chain);
            next.extend(self.neighbors(n, CLASS_EQUIVALENCE));
            next
        })
        .visited
    }

    /// Disjointness with its inference rules applied:
    ///
    /// - anything disjoint with an equivalent or a superclass of `entity` is
    ///   disjoint with `entity`
    /// - a class disjoint with `entity` passes that on to its equivalents and
    ///   every subclass below it
    fn disjoint_classes(&self, entity: EntityId) -> HashSet<EntityId> {
        let mut origins = self.equivalence(CLASS_EQUIVALENCE, entity);
        origins.extend(self.hierarchy(&SUPER_CLASSES, entity));
        origins.insert(entity);

        let mut partners = Vec::new();
        for &origin in &origins {
            partners.extend(self.neighbors(origin, DISJOINT));
            partners.extend(self.group_partners(origin));
        }

        let mut result = self.downward(partners);
        result.remove(&entity);
        result
    }

    /// Co-members of `class` in every all-disjoint group it belongs to.
    fn group_partners(&self, class: EntityId) -> Vec<EntityId> {
        self.stores
            .subjects_of(RelationKind::AllDisjointGroup, class)
            .into_iter()
            .flat_map(|group| self.stores.objects_of(group, RelationKind::AllDisjointGroup))
            .filter(|&member| member != class)
            .collect()
    }

    /// Domain or range classes of `property`.
    ///
    /// Declarations on super- and equivalent properties apply too; every class
    /// found is expanded by its subclasses and equivalents.
    fn property_classes(&self, kind: RelationKind, property: EntityId) -> HashSet<EntityId> {
        let mut properties = self.hierarchy(&SUPER_PROPERTIES, property);
        properties.extend(self.equivalence(PROPERTY_EQUIVALENCE, property));
        properties.insert(property);

        let direct: Vec<EntityId> = properties
            .iter()
            .flat_map(|&p| self.stores.objects_of(p, kind))
            .collect();
        self.downward(direct)
    }
}

impl std::fmt::Debug for ClosureEngine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosureEngine")
            .field("edges", &self.stores.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Materialized closures
// ---------------------------------------------------------------------------

/// Precomputed answers for every entity of every family, tagged with the
/// store generation they were computed at.
#[derive(Debug, Clone, Default)]
pub struct MaterializedClosures {
    generation: u64,
    table: HashMap<(Closure, EntityId), HashSet<EntityId>>,
}

impl MaterializedClosures {
    /// Compute every closure for the entities of its family, in parallel.
    pub fn build(
        engine: ClosureEngine<'_>,
        entities: impl Fn(Family) -> Vec<EntityId>,
        generation: u64,
    ) -> Self {
        let jobs: Vec<(Closure, EntityId)> = Closure::ALL
            .iter()
            .flat_map(|&c| entities(c.family()).into_iter().map(move |e| (c, e)))
            .collect();

        let table: HashMap<_, _> = jobs
            .into_par_iter()
            .map(|(c, e)| ((c, e), engine.answer(c, e)))
            .filter(|(_, answer)| !answer.is_empty())
            .collect();

        tracing::debug!(generation, entries = table.len(), "materialized closures");
        Self { generation, table }
    }

    /// Answer from the table, or `None` if it is stale for `generation`.
    pub fn lookup(
        &self,
        closure: Closure,
        entity: EntityId,
        generation: u64,
    ) -> Option<HashSet<EntityId>> {
        if self.generation != generation {
            return None;
        }
        Some(
            self.table
                .get(&(closure, entity))
                .cloned()
                .unwrap_or_default(),
        )
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of non-empty answers held.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
