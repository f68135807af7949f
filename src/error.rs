//! Rich diagnostic error types for the taxonomia engine.
//!
//! Only caller misuse and configuration problems are errors. Integrity-rule
//! violations (a declaration contradicting what the taxonomy already states)
//! are not: they are reported as warnings on the notice channel and the
//! declaration becomes a no-op. See [`crate::message`].

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the taxonomia engine.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, source chains) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum TaxoError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Precondition(#[from] PreconditionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Entity(#[from] EntityError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Script(#[from] ScriptError),
}

// ---------------------------------------------------------------------------
// Precondition errors
// ---------------------------------------------------------------------------

/// Contract violations by the caller of a declare-operation.
///
/// These are never absorbed internally; the store is left untouched.
#[derive(Debug, Error, Diagnostic)]
pub enum PreconditionError {
    #[error("{operation}: subject and object are the same entity ({entity})")]
    #[diagnostic(
        code(taxo::precondition::self_relation),
        help(
            "No relation kind may relate an entity to itself. \
             Check that the subject and object arguments are not swapped copies of one id."
        )
    )]
    SelfRelation {
        operation: &'static str,
        entity: String,
    },

    #[error("{operation}: {what} must not be empty")]
    #[diagnostic(
        code(taxo::precondition::empty_collection),
        help("Provide at least one element.")
    )]
    EmptyCollection {
        operation: &'static str,
        what: &'static str,
    },

    #[error("{operation}: need at least {required} distinct members, got {actual}")]
    #[diagnostic(
        code(taxo::precondition::too_few_members),
        help("An n-ary disjointness group only makes sense with two or more distinct classes.")
    )]
    TooFewMembers {
        operation: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("{operation}: entity {entity} is listed more than once")]
    #[diagnostic(
        code(taxo::precondition::duplicate_member),
        help("Each class may appear only once in a disjointness group.")
    )]
    DuplicateMember {
        operation: &'static str,
        entity: String,
    },

    #[error("{operation}: label literal must not be empty")]
    #[diagnostic(
        code(taxo::precondition::empty_literal),
        help("Labels carry a non-empty lexical value. Whitespace-only values count as empty.")
    )]
    EmptyLiteral { operation: &'static str },

    #[error("{operation}: \"{tag}\" is not a well-formed language tag")]
    #[diagnostic(
        code(taxo::precondition::language_tag),
        help("Use a BCP 47 style tag such as `en`, `en-GB` or `pt-BR`.")
    )]
    InvalidLanguageTag {
        operation: &'static str,
        tag: String,
    },

    #[error("{operation}: {kind} cannot be declared as a binary relation")]
    #[diagnostic(
        code(taxo::precondition::not_binary),
        help("Use `declare_all_disjoint` with the full member list instead.")
    )]
    NotBinary {
        operation: &'static str,
        kind: String,
    },
}

// ---------------------------------------------------------------------------
// Entity errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum EntityError {
    #[error("entity name must not be empty")]
    #[diagnostic(
        code(taxo::entity::empty_name),
        help("Named entities are identified by an IRI or CURIE. Use an anonymous entity instead.")
    )]
    EmptyName,

    #[error("unknown entity: \"{name}\"")]
    #[diagnostic(
        code(taxo::entity::unknown),
        help("Declare the entity first, or check the spelling (names are case-sensitive).")
    )]
    UnknownName { name: String },

    #[error("cannot adopt {id} as \"{name}\": conflicts with {existing}")]
    #[diagnostic(
        code(taxo::entity::name_conflict),
        help("Import snapshots into a fresh taxonomy, or into one whose names use the same IDs.")
    )]
    NameConflict {
        id: String,
        name: String,
        existing: String,
    },

    #[error("entity allocator exhausted: cannot allocate more than u64::MAX entities")]
    #[diagnostic(
        code(taxo::entity::exhausted),
        help("The identifier space is exhausted. Check for allocation loops.")
    )]
    AllocatorExhausted,
}

// ---------------------------------------------------------------------------
// Constraint profile errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ProfileError {
    #[error("failed to read constraint profile: {path}")]
    #[diagnostic(
        code(taxo::profile::read),
        help("Ensure the profile file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse constraint profile: {message}")]
    #[diagnostic(
        code(taxo::profile::parse),
        help(
            "A profile is a list of `[[rule]]` tables, each with a `kind` and an \
             `excludes` array of `{{ kind, orientation }}` entries."
        )
    )]
    Parse { message: String },

    #[error("rule for {kind} excludes {excluded}, which belongs to another relation family")]
    #[diagnostic(
        code(taxo::profile::cross_family),
        help("Mutual exclusion only applies between kinds of the same family (class, concept or property).")
    )]
    CrossFamily { kind: String, excluded: String },

    #[error("{kind} has more than one rule")]
    #[diagnostic(
        code(taxo::profile::duplicate_rule),
        help("Merge the `excludes` lists into a single `[[rule]]` table.")
    )]
    DuplicateRule { kind: String },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read taxonomy config: {path}")]
    #[diagnostic(
        code(taxo::config::read),
        help("Ensure the config file exists and is valid TOML.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse taxonomy config: {path}")]
    #[diagnostic(
        code(taxo::config::parse),
        help("Check the TOML syntax in the config file.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write taxonomy config: {path}")]
    #[diagnostic(
        code(taxo::config::write),
        help("Ensure you have write permissions to the target directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {message}")]
    #[diagnostic(code(taxo::config::invalid), help("Check the TaxonomyConfig fields. {message}"))]
    Invalid { message: String },
}

// ---------------------------------------------------------------------------
// Declaration script errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ScriptError {
    #[error("failed to read declaration script: {path}")]
    #[diagnostic(
        code(taxo::script::read),
        help("Ensure the script file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse declaration script {path}: {message}")]
    #[diagnostic(
        code(taxo::script::parse),
        help(
            "A script is a JSON object with a `declarations` array; each entry has an `op` \
             of `relation`, `all_disjoint` or `label`."
        )
    )]
    Parse { path: String, message: String },
}

/// Convenience alias for functions returning taxonomia results.
pub type TaxoResult<T> = std::result::Result<T, TaxoError>;
