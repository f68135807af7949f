//! Export types for serializing taxonomy state.
//!
//! These types provide name-resolved representations of entities, edges and
//! labels suitable for JSON export and external re-serialization.

use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, EntityMeta};
use crate::graph::{Family, RelationEdge, RelationKind};
use crate::labels::LabelEdge;

/// Exported edge with resolved names for both endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeExport {
    pub subject: EntityId,
    /// Subject name, or `_:b<id>` for anonymous entities.
    pub subject_name: String,
    pub kind: RelationKind,
    /// Store partition the edge lives in.
    pub family: Family,
    pub object: EntityId,
    pub object_name: String,
}

impl EdgeExport {
    /// The bare edge, as accepted by bulk import.
    pub fn edge(&self) -> RelationEdge {
        RelationEdge::new(self.subject, self.kind, self.object)
    }
}

/// A complete snapshot of one taxonomy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyExport {
    /// Every registered entity with its name and roles, ordered by ID.
    pub entities: Vec<EntityMeta>,
    /// Every stored edge, ordered by subject, kind and object.
    pub edges: Vec<EdgeExport>,
    /// Concept labels.
    pub labels: Vec<LabelEdge>,
}

impl TaxonomyExport {
    /// The bare edges, for feeding another taxonomy's import.
    pub fn relation_edges(&self) -> Vec<RelationEdge> {
        self.edges.iter().map(EdgeExport::edge).collect()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::Taxonomy;
    use crate::taxonomy::import::ImportMode;

    #[test]
    fn export_serializes_to_json() {
        let mut tax = Taxonomy::default();
        let a = tax.declare_class("ex:A").unwrap();
        let b = tax.declare_class("ex:B").unwrap();
        tax.declare_sub_class_of(a, b).unwrap();

        let json = tax.export().to_json_pretty().unwrap();
        assert!(json.contains("\"subject_name\": \"ex:A\""));
        assert!(json.contains("\"kind\": \"SubClassOf\""));
        assert!(json.contains("\"family\": \"Class\""));

        let back: TaxonomyExport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tax.export());
    }

    #[test]
    fn exported_edges_feed_another_taxonomy() {
        let mut source = Taxonomy::default();
        let x = source.declare_concept("ex:X").unwrap();
        let y = source.declare_concept("ex:Y").unwrap();
        let z = source.declare_concept("ex:Z").unwrap();
        source
            .declare_broader_transitive(x, y)
            .unwrap()
            .declare_broader_transitive(y, z)
            .unwrap();

        let mut target = Taxonomy::default();
        let summary = target
            .import(&source.export().relation_edges(), ImportMode::Raw)
            .unwrap();
        assert_eq!(summary.committed, 2);
        assert_eq!(target.broader_concepts(x), source.broader_concepts(x));
    }
}
