//! Taxonomy facade: top-level API for the taxonomia engine.
//!
//! A `Taxonomy` owns the entity registry, the three relation stores, the
//! label store, the constraint profile and the notice sink. Declarations
//! live in [`declare`], queries in [`query`], bulk loading in [`import`].

pub mod declare;
pub mod import;
pub mod query;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::TaxonomyConfig;
use crate::entity::EntityId;
use crate::error::TaxoResult;
use crate::export::{EdgeExport, TaxonomyExport};
use crate::graph::closure::{ClosureEngine, ClosureStrategy, MaterializedClosures};
use crate::graph::integrity::Violation;
use crate::graph::profile::ConstraintProfile;
use crate::graph::store::RelationStores;
use crate::graph::{Family, Orientation};
use crate::labels::LabelStore;
use crate::message::{Notice, NoticeSink, TracingSink};
use crate::registry::EntityRegistry;

/// A constraint-checked taxonomy of classes, concepts and properties.
pub struct Taxonomy {
    config: TaxonomyConfig,
    profile: ConstraintProfile,
    registry: EntityRegistry,
    stores: RelationStores,
    labels: LabelStore,
    sink: Arc<dyn NoticeSink>,
    /// Advances on every commit that changes a relation store.
    generation: u64,
    materialized: Option<MaterializedClosures>,
}

impl Taxonomy {
    /// Create an empty taxonomy. The constraint profile is the built-in
    /// table unless the config names a profile file.
    pub fn new(config: TaxonomyConfig) -> TaxoResult<Self> {
        config.validate()?;
        let profile = config.profile()?;
        tracing::info!(
            strategy = ?config.strategy,
            rules = profile.len(),
            "taxonomy initialized"
        );
        Ok(Self::from_parts(config, profile))
    }

    fn from_parts(config: TaxonomyConfig, profile: ConstraintProfile) -> Self {
        Self {
            config,
            profile,
            registry: EntityRegistry::new(),
            stores: RelationStores::new(),
            labels: LabelStore::new(),
            sink: Arc::new(TracingSink),
            generation: 0,
            materialized: None,
        }
    }

    /// Route notices to `sink` instead of `tracing`.
    pub fn with_sink(mut self, sink: Arc<dyn NoticeSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replace the constraint profile.
    pub fn with_profile(mut self, profile: ConstraintProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn config(&self) -> &TaxonomyConfig {
        &self.config
    }

    pub fn profile(&self) -> &ConstraintProfile {
        &self.profile
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// The current relation store contents, for external re-serialization.
    pub fn stores(&self) -> &RelationStores {
        &self.stores
    }

    pub fn labels(&self) -> &LabelStore {
        &self.labels
    }

    /// Store generation; advances on every commit.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn engine(&self) -> ClosureEngine<'_> {
        ClosureEngine::new(&self.stores)
    }

    /// Precompute every closure for every registered entity.
    ///
    /// Only the [`ClosureStrategy::Materialized`] strategy keeps a table;
    /// under `OnDemand` this is a no-op. Returns the number of non-empty
    /// answers held.
    pub fn materialize(&mut self) -> usize {
        if self.config.strategy != ClosureStrategy::Materialized {
            tracing::debug!("on-demand strategy, nothing to materialize");
            return 0;
        }
        let registry = &self.registry;
        let table = MaterializedClosures::build(
            self.engine(),
            |family: Family| registry.with_role(family.role()),
            self.generation,
        );
        let entries = table.len();
        tracing::info!(generation = self.generation, entries, "closures materialized");
        self.materialized = Some(table);
        entries
    }

    /// Whether a materialized table exists and matches the current store.
    pub fn is_materialized(&self) -> bool {
        self.materialized
            .as_ref()
            .is_some_and(|m| m.generation() == self.generation)
    }

    /// Summary counts.
    pub fn info(&self) -> TaxonomyInfo {
        TaxonomyInfo {
            entities: self.registry.len(),
            class_edges: self.stores.family(Family::Class).len(),
            concept_edges: self.stores.family(Family::Concept).len(),
            property_edges: self.stores.family(Family::Property).len(),
            labels: self.labels.len(),
            generation: self.generation,
            materialized: self.is_materialized(),
        }
    }

    /// A serializable snapshot of entities, edges and labels.
    pub fn export(&self) -> TaxonomyExport {
        let mut edges: Vec<EdgeExport> = self
            .stores
            .all_edges()
            .into_iter()
            .map(|e| EdgeExport {
                subject: e.subject,
                subject_name: self.registry.display_name(e.subject),
                kind: e.kind,
                family: e.kind.family(),
                object: e.object,
                object_name: self.registry.display_name(e.object),
            })
            .collect();
        edges.sort_by_key(|e| (e.subject, e.kind, e.object));

        let mut entities = self.registry.all();
        entities.sort_by_key(|m| m.id);

        TaxonomyExport {
            entities,
            edges,
            labels: self.labels.all(),
        }
    }

    // -- internals shared by declare/import ---------------------------------

    fn emit(&self, notice: Notice) {
        self.sink.emit(&notice);
    }

    fn bump_generation(&mut self) {
        self.generation += 1;
    }

    fn violation_notice(&self, violation: &Violation) -> Notice {
        let subject = self.registry.display_name(violation.subject);
        let object = self.registry.display_name(violation.object);
        let conflicting = violation
            .conflicting
            .iter()
            .map(|ex| match ex.orientation {
                Orientation::Same => format!("{}({subject}, {object})", ex.kind),
                Orientation::Reversed => format!("{}({object}, {subject})", ex.kind),
            })
            .collect();
        Notice::conflict(subject, object, violation.attempted.term(), conflicting)
    }

    fn display_name(&self, id: EntityId) -> String {
        self.registry.display_name(id)
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::from_parts(TaxonomyConfig::default(), ConstraintProfile::builtin())
    }
}

impl std::fmt::Debug for Taxonomy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Taxonomy")
            .field("config", &self.config)
            .field("entities", &self.registry.len())
            .field("edges", &self.stores.len())
            .field("labels", &self.labels.len())
            .field("generation", &self.generation)
            .finish()
    }
}

/// Summary statistics about a taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyInfo {
    pub entities: usize,
    pub class_edges: usize,
    pub concept_edges: usize,
    pub property_edges: usize,
    pub labels: usize,
    pub generation: u64,
    pub materialized: bool,
}

impl std::fmt::Display for TaxonomyInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Entities:       {}", self.entities)?;
        writeln!(f, "Class edges:    {}", self.class_edges)?;
        writeln!(f, "Concept edges:  {}", self.concept_edges)?;
        writeln!(f, "Property edges: {}", self.property_edges)?;
        writeln!(f, "Labels:         {}", self.labels)?;
        write!(
            f,
            "Generation:     {}{}",
            self.generation,
            if self.materialized { " (materialized)" } else { "" }
        )
    }
}
