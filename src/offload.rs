//! Closure queries on tokio's blocking pool.
//!
//! Closure computation is CPU-bound and synchronous; async callers hand an
//! `Arc<Taxonomy>` snapshot to `spawn_blocking` so the runtime's worker
//! threads stay free. There is no cancellation and no timeout: a spawned
//! query always runs to completion.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;

use crate::entity::EntityId;
use crate::graph::RelationKind;
use crate::graph::closure::Closure;
use crate::taxonomy::Taxonomy;

#[derive(Debug, Error, Diagnostic)]
pub enum OffloadError {
    #[error("offloaded closure query did not complete: {message}")]
    #[diagnostic(
        code(taxo::offload::join),
        help("The blocking task panicked or the runtime shut down while it was running.")
    )]
    Join { message: String },
}

fn joined(e: tokio::task::JoinError) -> OffloadError {
    OffloadError::Join {
        message: e.to_string(),
    }
}

/// [`Taxonomy::answer`] on the blocking pool.
pub async fn answer(
    taxonomy: Arc<Taxonomy>,
    closure: Closure,
    entity: EntityId,
) -> Result<HashSet<EntityId>, OffloadError> {
    tokio::task::spawn_blocking(move || taxonomy.answer(closure, entity))
        .await
        .map_err(joined)
}

/// [`Taxonomy::answer_many`] on the blocking pool.
pub async fn answer_many(
    taxonomy: Arc<Taxonomy>,
    closure: Closure,
    entities: Vec<EntityId>,
) -> Result<HashMap<EntityId, HashSet<EntityId>>, OffloadError> {
    tokio::task::spawn_blocking(move || taxonomy.answer_many(closure, &entities))
        .await
        .map_err(joined)
}

/// [`Taxonomy::holds`] on the blocking pool.
pub async fn holds(
    taxonomy: Arc<Taxonomy>,
    kind: RelationKind,
    subject: EntityId,
    object: EntityId,
) -> Result<bool, OffloadError> {
    tokio::task::spawn_blocking(move || taxonomy.holds(kind, subject, object))
        .await
        .map_err(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> (Arc<Taxonomy>, Vec<EntityId>) {
        let mut tax = Taxonomy::default();
        let ids: Vec<EntityId> = ["ex:A", "ex:B", "ex:C"]
            .iter()
            .map(|n| tax.declare_concept(n).unwrap())
            .collect();
        tax.declare_broader_transitive(ids[0], ids[1])
            .unwrap()
            .declare_broader_transitive(ids[1], ids[2])
            .unwrap();
        (Arc::new(tax), ids)
    }

    #[tokio::test]
    async fn offloaded_answer_matches_direct() {
        let (tax, ids) = chain();
        let direct = tax.broader_concepts(ids[0]);
        let offloaded = answer(tax.clone(), Closure::BroaderConcepts, ids[0])
            .await
            .unwrap();
        assert_eq!(offloaded, direct);
        assert_eq!(offloaded.len(), 2);
    }

    #[tokio::test]
    async fn offloaded_batch_and_check() {
        let (tax, ids) = chain();
        let all = answer_many(tax.clone(), Closure::NarrowerConcepts, ids.clone())
            .await
            .unwrap();
        assert_eq!(all[&ids[2]].len(), 2);
        assert!(
            holds(tax, RelationKind::BroaderTransitive, ids[0], ids[2])
                .await
                .unwrap()
        );
    }
}
