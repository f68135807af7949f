//! Property domain and range questions.
//!
//! A thin layer over [`ClosureEngine`]: `DomainOf(p)` already carries the
//! subclass, equivalence and super-property expansion, so membership answers
//! "is `c` in the domain of `p`".

use std::collections::HashSet;

use crate::entity::EntityId;

use super::closure::{Closure, ClosureEngine};

#[derive(Debug, Clone, Copy)]
pub struct DomainRangeAnalyzer<'a> {
    engine: ClosureEngine<'a>,
}

impl<'a> DomainRangeAnalyzer<'a> {
    pub fn new(engine: ClosureEngine<'a>) -> Self {
        Self { engine }
    }

    pub fn domain_of(&self, property: EntityId) -> HashSet<EntityId> {
        self.engine.answer(Closure::DomainOf, property)
    }

    pub fn range_of(&self, property: EntityId) -> HashSet<EntityId> {
        self.engine.answer(Closure::RangeOf, property)
    }

    pub fn is_in_domain(&self, property: EntityId, class: EntityId) -> bool {
        self.domain_of(property).contains(&class)
    }

    pub fn is_in_range(&self, property: EntityId, class: EntityId) -> bool {
        self.range_of(property).contains(&class)
    }

    /// Properties among `candidates` whose domain contains `class`.
    pub fn properties_with_domain(
        &self,
        class: EntityId,
        candidates: impl IntoIterator<Item = EntityId>,
    ) -> HashSet<EntityId> {
        candidates
            .into_iter()
            .filter(|&p| self.is_in_domain(p, class))
            .collect()
    }

    /// Properties among `candidates` whose range contains `class`.
    pub fn properties_with_range(
        &self,
        class: EntityId,
        candidates: impl IntoIterator<Item = EntityId>,
    ) -> HashSet<EntityId> {
        candidates
            .into_iter()
            .filter(|&p| self.is_in_range(p, class))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::store::RelationStores;
    use crate::graph::{RelationEdge, RelationKind};

    fn ent(id: u64) -> EntityId {
        EntityId::new(id).unwrap()
    }

    #[test]
    fn membership_follows_subclasses_and_equivalents() {
        let mut stores = RelationStores::new();
        // hasPet(10) domain Person(1); Child(2) ⊑ Person; Person ≡ Human(3); hasPet range Animal(4)
        stores.commit(&[
            RelationEdge::new(ent(10), RelationKind::Domain, ent(1)),
            RelationEdge::new(ent(2), RelationKind::SubClassOf, ent(1)),
            RelationEdge::new(ent(1), RelationKind::EquivalentClass, ent(3)),
            RelationEdge::new(ent(3), RelationKind::EquivalentClass, ent(1)),
            RelationEdge::new(ent(10), RelationKind::Range, ent(4)),
            RelationEdge::new(ent(11), RelationKind::Range, ent(1)),
        ]);
        let analyzer = DomainRangeAnalyzer::new(ClosureEngine::new(&stores));

        assert!(analyzer.is_in_domain(ent(10), ent(1)));
        assert!(analyzer.is_in_domain(ent(10), ent(2)));
        assert!(analyzer.is_in_domain(ent(10), ent(3)));
        assert!(!analyzer.is_in_domain(ent(10), ent(4)));
        assert!(analyzer.is_in_range(ent(10), ent(4)));
        assert!(!analyzer.is_in_range(ent(10), ent(1)));

        let props = [ent(10), ent(11)];
        assert_eq!(
            analyzer.properties_with_domain(ent(2), props),
            HashSet::from([ent(10)])
        );
        assert_eq!(
            analyzer.properties_with_range(ent(3), props),
            HashSet::from([ent(11)])
        );
    }

    #[test]
    fn unknown_property_has_empty_domain() {
        let stores = RelationStores::new();
        let analyzer = DomainRangeAnalyzer::new(ClosureEngine::new(&stores));
        assert!(analyzer.domain_of(ent(1)).is_empty());
        assert!(!analyzer.is_in_range(ent(1), ent(2)));
    }
}
