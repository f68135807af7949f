// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # taxonomia
//!
//! Constraint-checked taxonomies of ontology classes, controlled-vocabulary
//! concepts and properties, with cycle-safe transitive closure queries.
//!
//! ## Architecture
//!
//! - **Relation substrate** (`graph`): append-only, family-partitioned edge
//!   stores on petgraph, the declarative constraint profile, integrity
//!   checking, and the closure engine
//! - **Facade** (`taxonomy`): declare-, check- and answer-operations, bulk
//!   import, materialized closures
//! - **Notices** (`message`): the injected channel integrity warnings and
//!   import progress are reported on
//! - **Labels** (`labels`): preferred, alternative and hidden concept labels
//!
//! ## Library usage
//!
//! ```
//! use taxonomia::taxonomy::Taxonomy;
//!
//! let mut tax = Taxonomy::default();
//! let animal = tax.declare_class("ex:Animal").unwrap();
//! let dog = tax.declare_class("ex:Dog").unwrap();
//! let puppy = tax.declare_class("ex:Puppy").unwrap();
//! tax.declare_sub_class_of(dog, animal)
//!     .unwrap()
//!     .declare_sub_class_of(puppy, dog)
//!     .unwrap();
//!
//! assert!(tax.check_sub_class_of(puppy, animal));
//! assert_eq!(tax.super_classes(puppy).len(), 2);
//! ```

pub mod config;
pub mod entity;
pub mod error;
pub mod export;
pub mod graph;
pub mod labels;
pub mod message;
#[cfg(feature = "offload")]
pub mod offload;
pub mod registry;
pub mod script;
pub mod taxonomy;
