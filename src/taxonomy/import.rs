//! Bulk import of pre-built edges and whole exported snapshots.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, EntityRole};
use crate::error::TaxoResult;
use crate::export::TaxonomyExport;
use crate::graph::{RelationEdge, RelationKind};
use crate::message::Notice;

use super::Taxonomy;

/// How imported edges reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Each edge goes through its declare-operation; contradictions warn.
    #[default]
    Checked,
    /// Edges are inserted directly with no validation at all.
    Raw,
}

/// Outcome counts of one import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Edges that were new and were written.
    pub committed: usize,
    /// Edges already present before the import reached them.
    pub duplicate: usize,
    /// Edges skipped because they contradict the taxonomy.
    pub rejected: usize,
}

impl ImportSummary {
    pub fn total(&self) -> usize {
        self.committed + self.duplicate + self.rejected
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} committed, {} duplicate, {} rejected",
            self.committed, self.duplicate, self.rejected
        )
    }
}

impl Taxonomy {
    /// Load `edges` into the store.
    ///
    /// In checked mode precondition errors (self-relations) abort the import;
    /// edges processed before the failing one stay committed. A run of
    /// consecutive `AllDisjointGroup` edges with the same subject is declared
    /// as one group when the run ends, keeping the group's ID, so groups and
    /// binary edges are judged in the order they appear. The second half of a
    /// symmetric pair is already stored by the time it is reached and counts
    /// as a duplicate. An informational notice is emitted every
    /// `progress_every` edges and once at the end.
    pub fn import(
        &mut self,
        edges: &[RelationEdge],
        mode: ImportMode,
    ) -> TaxoResult<ImportSummary> {
        let total = edges.len();
        let every = self.config.progress_every.max(1);
        let mut summary = ImportSummary::default();
        let mut pending: Option<(EntityId, Vec<EntityId>)> = None;

        tracing::info!(total, ?mode, "import started");
        for (i, edge) in edges.iter().enumerate() {
            match mode {
                ImportMode::Raw => self.import_raw(edge, &mut summary),
                ImportMode::Checked if edge.kind == RelationKind::AllDisjointGroup => {
                    let continues = matches!(&pending, Some((group, _)) if *group == edge.subject);
                    if !continues {
                        self.import_group(pending.take(), &mut summary)?;
                        pending = Some((edge.subject, Vec::new()));
                    }
                    if let Some((_, members)) = pending.as_mut() {
                        members.push(edge.object);
                    }
                }
                ImportMode::Checked => {
                    self.import_group(pending.take(), &mut summary)?;
                    self.import_checked(edge, &mut summary)?;
                }
            }
            let done = i + 1;
            if done % every == 0 && done < total {
                self.emit(Notice::info(format!("import: {done}/{total} edges processed")));
            }
        }
        self.import_group(pending.take(), &mut summary)?;

        tracing::info!(%summary, "import finished");
        self.emit(Notice::info(format!("import finished: {summary}")));
        Ok(summary)
    }

    /// Load a whole snapshot into this taxonomy.
    ///
    /// Entities are adopted first with their IDs, names and roles, then the
    /// edges go through [`Taxonomy::import`], then the labels are attached. In
    /// checked mode labels pass the label integrity rules; in raw mode they
    /// are stored as they are.
    pub fn import_export(
        &mut self,
        export: &TaxonomyExport,
        mode: ImportMode,
    ) -> TaxoResult<ImportSummary> {
        for meta in &export.entities {
            self.registry.adopt(meta)?;
        }
        let summary = self.import(&export.relation_edges(), mode)?;
        for label in &export.labels {
            match mode {
                ImportMode::Checked => {
                    self.label(
                        "import_export",
                        label.kind,
                        label.concept,
                        label.literal.value(),
                        label.literal.language(),
                    )?;
                }
                ImportMode::Raw => {
                    self.registry.ensure(label.concept, EntityRole::Concept);
                    self.labels.insert(label.concept, label.kind, label.literal.clone());
                }
            }
        }
        tracing::info!(
            entities = export.entities.len(),
            labels = export.labels.len(),
            "snapshot imported"
        );
        Ok(summary)
    }

    fn import_raw(&mut self, edge: &RelationEdge, summary: &mut ImportSummary) {
        self.registry.ensure(edge.subject, edge.kind.subject_role());
        self.registry.ensure(edge.object, edge.kind.object_role());
        if self.stores.insert(*edge) {
            summary.committed += 1;
            self.bump_generation();
        } else {
            summary.duplicate += 1;
        }
    }

    fn import_checked(
        &mut self,
        edge: &RelationEdge,
        summary: &mut ImportSummary,
    ) -> TaxoResult<()> {
        if self.stores.contains(edge) {
            summary.duplicate += 1;
            return Ok(());
        }
        self.declare(edge.kind, edge.subject, edge.object)?;
        if self.stores.contains(edge) {
            summary.committed += 1;
        } else {
            summary.rejected += 1;
        }
        Ok(())
    }

    fn import_group(
        &mut self,
        pending: Option<(EntityId, Vec<EntityId>)>,
        summary: &mut ImportSummary,
    ) -> TaxoResult<()> {
        let Some((group, members)) = pending else {
            return Ok(());
        };
        let before = self.stores.len();
        self.group("import", Some(group), &members)?;
        if self.stores.len() > before {
            summary.committed += members.len();
        } else if self.check_all_disjoint(&members) {
            summary.duplicate += members.len();
        } else {
            summary.rejected += members.len();
        }
        Ok(())
    }
}
