//! Append-only relation store with pattern lookup.
//!
//! Uses `petgraph` for the adjacency structure and a kind index for
//! predicate-only lookups. No validation happens here; that is the
//! mutator's job. Edges are never removed.

use std::collections::{HashMap, HashSet};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::entity::EntityId;

use super::{Family, RelationEdge, RelationKind};

/// Edges of one relation family.
///
/// Set semantics: inserting an edge that is already present is a silent no-op.
pub struct RelationStore {
    family: Family,
    /// The directed graph: nodes are EntityIds, edges carry their kind.
    graph: DiGraph<EntityId, RelationKind>,
    /// EntityId → NodeIndex mapping for O(1) node lookups.
    node_index: HashMap<EntityId, NodeIndex>,
    /// Kind index: kind → list of (subject, object) pairs.
    kind_index: HashMap<RelationKind, Vec<(EntityId, EntityId)>>,
    /// Membership set backing the no-duplicates invariant.
    edges: HashSet<RelationEdge>,
}

impl RelationStore {
    /// Create a new empty store for `family`.
    pub fn new(family: Family) -> Self {
        Self {
            family,
            graph: DiGraph::new(),
            node_index: HashMap::new(),
            kind_index: HashMap::new(),
            edges: HashSet::new(),
        }
    }

    pub fn family(&self) -> Family {
        self.family
    }

    fn ensure_node(&mut self, entity: EntityId) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(&entity) {
            return idx;
        }
        let idx = self.graph.add_node(entity);
        self.node_index.insert(entity, idx);
        idx
    }

    /// Insert an edge. Returns `false` if it was already present.
    pub fn insert(&mut self, edge: RelationEdge) -> bool {
        debug_assert_eq!(edge.kind.family(), self.family);
        if !self.edges.insert(edge) {
            return false;
        }
        let subj = self.ensure_node(edge.subject);
        let obj = self.ensure_node(edge.object);
        self.graph.add_edge(subj, obj, edge.kind);
        self.kind_index
            .entry(edge.kind)
            .or_default()
            .push((edge.subject, edge.object));
        true
    }

    /// Insert every edge in `edges`, returning how many were new.
    pub fn commit(&mut self, edges: &[RelationEdge]) -> usize {
        edges.iter().filter(|e| self.insert(**e)).count()
    }

    /// Whether this exact edge is present.
    pub fn contains(&self, edge: &RelationEdge) -> bool {
        self.edges.contains(edge)
    }

    /// All edges matching a partial pattern; `None` fields are wildcards.
    pub fn matching(
        &self,
        subject: Option<EntityId>,
        kind: Option<RelationKind>,
        object: Option<EntityId>,
    ) -> Vec<RelationEdge> {
        let keep = |e: &RelationEdge| {
            subject.is_none_or(|s| e.subject == s)
                && kind.is_none_or(|k| e.kind == k)
                && object.is_none_or(|o| e.object == o)
        };

        match (subject, kind, object) {
            (Some(s), _, _) => self
                .edges_at(s, Direction::Outgoing)
                .into_iter()
                .filter(keep)
                .collect(),
            (None, _, Some(o)) => self
                .edges_at(o, Direction::Incoming)
                .into_iter()
                .filter(keep)
                .collect(),
            (None, Some(k), None) => self
                .pairs_for_kind(k)
                .iter()
                .map(|&(s, o)| RelationEdge::new(s, k, o))
                .collect(),
            (None, None, None) => self.edges.iter().copied().collect(),
        }
    }

    fn edges_at(&self, entity: EntityId, direction: Direction) -> Vec<RelationEdge> {
        let Some(&idx) = self.node_index.get(&entity) else {
            return vec![];
        };
        self.graph
            .edges_directed(idx, direction)
            .map(|e| {
                RelationEdge::new(self.graph[e.source()], *e.weight(), self.graph[e.target()])
            })
            .collect()
    }

    /// Objects `o` with `(subject, kind, o)`.
    pub fn objects_of(&self, subject: EntityId, kind: RelationKind) -> Vec<EntityId> {
        let Some(&idx) = self.node_index.get(&subject) else {
            return vec![];
        };
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .filter(|e| *e.weight() == kind)
            .map(|e| self.graph[e.target()])
            .collect()
    }

    /// Subjects `s` with `(s, kind, object)`.
    pub fn subjects_of(&self, kind: RelationKind, object: EntityId) -> Vec<EntityId> {
        let Some(&idx) = self.node_index.get(&object) else {
            return vec![];
        };
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .filter(|e| *e.weight() == kind)
            .map(|e| self.graph[e.source()])
            .collect()
    }

    /// All `(subject, object)` pairs of one kind.
    pub fn pairs_for_kind(&self, kind: RelationKind) -> &[(EntityId, EntityId)] {
        self.kind_index
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether the entity appears as an endpoint of any edge.
    pub fn has_node(&self, entity: EntityId) -> bool {
        self.node_index.contains_key(&entity)
    }

    /// Number of distinct endpoints.
    pub fn node_count(&self) -> usize {
        self.node_index.len()
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Every edge, in insertion order.
    pub fn all_edges(&self) -> Vec<RelationEdge> {
        self.graph
            .edge_indices()
            .filter_map(|ei| {
                let (src, dst) = self.graph.edge_endpoints(ei)?;
                let kind = *self.graph.edge_weight(ei)?;
                Some(RelationEdge::new(self.graph[src], kind, self.graph[dst]))
            })
            .collect()
    }
}

impl std::fmt::Debug for RelationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationStore")
            .field("family", &self.family)
            .field("nodes", &self.node_count())
            .field("edges", &self.len())
            .finish()
    }
}

/// One [`RelationStore`] per [`Family`], routing edges by their kind.
#[derive(Debug)]
pub struct RelationStores {
    class: RelationStore,
    concept: RelationStore,
    property: RelationStore,
}

impl RelationStores {
    pub fn new() -> Self {
        Self {
            class: RelationStore::new(Family::Class),
            concept: RelationStore::new(Family::Concept),
            property: RelationStore::new(Family::Property),
        }
    }

    /// The store for one family.
    pub fn family(&self, family: Family) -> &RelationStore {
        match family {
            Family::Class => &self.class,
            Family::Concept => &self.concept,
            Family::Property => &self.property,
        }
    }

    fn family_mut(&mut self, family: Family) -> &mut RelationStore {
        match family {
            Family::Class => &mut self.class,
            Family::Concept => &mut self.concept,
            Family::Property => &mut self.property,
        }
    }

    /// Insert into the store of the edge's family.
    pub fn insert(&mut self, edge: RelationEdge) -> bool {
        self.family_mut(edge.kind.family()).insert(edge)
    }

    /// Insert several edges as one step, returning how many were new.
    pub fn commit(&mut self, edges: &[RelationEdge]) -> usize {
        let added = edges.iter().filter(|e| self.insert(**e)).count();
        if added > 0 {
            tracing::debug!(added, "committed edges");
        }
        added
    }

    pub fn contains(&self, edge: &RelationEdge) -> bool {
        self.family(edge.kind.family()).contains(edge)
    }

    /// Pattern lookup across all families. A given kind narrows to its family.
    pub fn matching(
        &self,
        subject: Option<EntityId>,
        kind: Option<RelationKind>,
        object: Option<EntityId>,
    ) -> Vec<RelationEdge> {
        match kind {
            Some(k) => self.family(k.family()).matching(subject, kind, object),
            None => Family::ALL
                .iter()
                .flat_map(|&f| self.family(f).matching(subject, None, object))
                .collect(),
        }
    }

    /// Objects `o` with `(subject, kind, o)`.
    pub fn objects_of(&self, subject: EntityId, kind: RelationKind) -> Vec<EntityId> {
        self.family(kind.family()).objects_of(subject, kind)
    }

    /// Subjects `s` with `(s, kind, object)`.
    pub fn subjects_of(&self, kind: RelationKind, object: EntityId) -> Vec<EntityId> {
        self.family(kind.family()).subjects_of(kind, object)
    }

    /// Total number of edges.
    pub fn len(&self) -> usize {
        Family::ALL.iter().map(|&f| self.family(f).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every edge of every family.
    pub fn all_edges(&self) -> Vec<RelationEdge> {
        Family::ALL
            .iter()
            .flat_map(|&f| self.family(f).all_edges())
            .collect()
    }
}

impl Default for RelationStores {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ent(id: u64) -> EntityId {
        EntityId::new(id).unwrap()
    }

    #[test]
    fn insert_and_query() {
        let mut store = RelationStore::new(Family::Class);
        let dog = ent(1);
        let mammal = ent(2);

        assert!(store.insert(RelationEdge::new(dog, RelationKind::SubClassOf, mammal)));

        assert!(store.has_node(dog));
        assert!(store.has_node(mammal));
        assert_eq!(store.node_count(), 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.objects_of(dog, RelationKind::SubClassOf), vec![mammal]);
        assert_eq!(store.subjects_of(RelationKind::SubClassOf, mammal), vec![dog]);
        assert!(store.objects_of(dog, RelationKind::EquivalentClass).is_empty());
    }

    #[test]
    fn duplicates_are_silently_ignored() {
        let mut store = RelationStore::new(Family::Class);
        let e = RelationEdge::new(ent(1), RelationKind::SubClassOf, ent(2));
        assert!(store.insert(e));
        assert!(!store.insert(e));
        assert_eq!(store.len(), 1);
        assert_eq!(store.all_edges(), vec![e]);
        assert_eq!(store.pairs_for_kind(RelationKind::SubClassOf).len(), 1);
    }

    #[test]
    fn pattern_matching_with_wildcards() {
        let mut store = RelationStore::new(Family::Class);
        let (a, b, c) = (ent(1), ent(2), ent(3));
        store.insert(RelationEdge::new(a, RelationKind::SubClassOf, b));
        store.insert(RelationEdge::new(a, RelationKind::DisjointWith, c));
        store.insert(RelationEdge::new(c, RelationKind::SubClassOf, b));

        assert_eq!(store.matching(Some(a), None, None).len(), 2);
        assert_eq!(store.matching(None, Some(RelationKind::SubClassOf), None).len(), 2);
        assert_eq!(store.matching(None, None, Some(b)).len(), 2);
        assert_eq!(
            store.matching(Some(a), Some(RelationKind::SubClassOf), Some(b)),
            vec![RelationEdge::new(a, RelationKind::SubClassOf, b)]
        );
        assert!(store
            .matching(Some(b), Some(RelationKind::SubClassOf), None)
            .is_empty());
        assert_eq!(store.matching(None, None, None).len(), 3);
    }

    #[test]
    fn stores_route_by_family() {
        let mut stores = RelationStores::new();
        stores.commit(&[
            RelationEdge::new(ent(1), RelationKind::SubClassOf, ent(2)),
            RelationEdge::new(ent(3), RelationKind::Broader, ent(4)),
            RelationEdge::new(ent(5), RelationKind::Domain, ent(1)),
        ]);
        assert_eq!(stores.family(Family::Class).len(), 1);
        assert_eq!(stores.family(Family::Concept).len(), 1);
        assert_eq!(stores.family(Family::Property).len(), 1);
        assert_eq!(stores.len(), 3);
        assert_eq!(stores.matching(Some(ent(1)), None, None).len(), 1);
        assert_eq!(stores.matching(None, None, Some(ent(1))).len(), 1);
    }

    #[test]
    fn empty_queries() {
        let store = RelationStore::new(Family::Concept);
        assert!(store.objects_of(ent(1), RelationKind::Broader).is_empty());
        assert!(store.subjects_of(RelationKind::Broader, ent(1)).is_empty());
        assert!(store.matching(Some(ent(1)), None, None).is_empty());
    }
}
