//! JSON declaration scripts.
//!
//! A script names entities instead of using raw identifiers; names are
//! interned with the role each declaration requires.
//!
//! ```json
//! {
//!   "declarations": [
//!     { "op": "relation", "kind": "subClassOf", "subject": "ex:Dog", "object": "ex:Animal" },
//!     { "op": "all_disjoint", "members": ["ex:Cat", "ex:Dog", "ex:Fish"] },
//!     { "op": "label", "kind": "Preferred", "concept": "ex:dogs", "value": "dogs", "language": "en" }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::entity::{EntityId, EntityRole};
use crate::error::{ScriptError, TaxoResult};
use crate::graph::RelationKind;
use crate::labels::LabelKind;
use crate::taxonomy::Taxonomy;

/// One scripted declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Declaration {
    Relation {
        #[serde(serialize_with = "kind_term", deserialize_with = "kind_from_term")]
        kind: RelationKind,
        subject: String,
        object: String,
    },
    AllDisjoint {
        members: Vec<String>,
    },
    Label {
        kind: LabelKind,
        concept: String,
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
}

fn kind_term<S: Serializer>(kind: &RelationKind, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(kind.term())
}

fn kind_from_term<'de, D: Deserializer<'de>>(d: D) -> Result<RelationKind, D::Error> {
    let term = String::deserialize(d)?;
    RelationKind::from_term(&term)
        .ok_or_else(|| serde::de::Error::custom(format!("unknown relation kind \"{term}\"")))
}

/// An ordered list of declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

impl Script {
    /// Parse a script; `origin` names the source in errors.
    pub fn from_json_str(content: &str, origin: &str) -> Result<Self, ScriptError> {
        serde_json::from_str(content).map_err(|e| ScriptError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let content = std::fs::read_to_string(path).map_err(|source| ScriptError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content, &path.display().to_string())
    }

    /// Apply every declaration in order, stopping at the first error.
    ///
    /// Integrity conflicts are not errors; they surface on the taxonomy's
    /// notice sink. Returns the number of declarations applied.
    pub fn apply(&self, taxonomy: &mut Taxonomy) -> TaxoResult<usize> {
        for declaration in &self.declarations {
            declaration.apply(taxonomy)?;
        }
        tracing::debug!(count = self.declarations.len(), "script applied");
        Ok(self.declarations.len())
    }
}

impl Declaration {
    pub fn apply(&self, taxonomy: &mut Taxonomy) -> TaxoResult<()> {
        match self {
            Declaration::Relation {
                kind,
                subject,
                object,
            } => {
                let s = intern(taxonomy, subject, kind.subject_role())?;
                let o = intern(taxonomy, object, kind.object_role())?;
                taxonomy.declare(*kind, s, o)?;
            }
            Declaration::AllDisjoint { members } => {
                let ids = members
                    .iter()
                    .map(|m| intern(taxonomy, m, EntityRole::Class))
                    .collect::<TaxoResult<Vec<_>>>()?;
                taxonomy.declare_all_disjoint(&ids)?;
            }
            Declaration::Label {
                kind,
                concept,
                value,
                language,
            } => {
                let c = intern(taxonomy, concept, EntityRole::Concept)?;
                taxonomy.declare_label(*kind, c, value, language.as_deref())?;
            }
        }
        Ok(())
    }
}

fn intern(taxonomy: &mut Taxonomy, name: &str, role: EntityRole) -> TaxoResult<EntityId> {
    match role {
        EntityRole::Class => taxonomy.declare_class(name),
        EntityRole::Concept => taxonomy.declare_concept(name),
        EntityRole::Property => taxonomy.declare_property(name),
    }
}

/// Resolve a scripted name against a taxonomy, for queries after `apply`.
pub fn resolve(taxonomy: &Taxonomy, name: &str) -> TaxoResult<EntityId> {
    taxonomy.registry().require(name)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::{EntityError, TaxoError};
    use crate::message::VecSink;

    const SCRIPT: &str = r#"{
        "declarations": [
            { "op": "relation", "kind": "subClassOf", "subject": "ex:Dog", "object": "ex:Animal" },
            { "op": "relation", "kind": "SubClassOf", "subject": "ex:Cat", "object": "ex:Animal" },
            { "op": "all_disjoint", "members": ["ex:Cat", "ex:Dog"] },
            { "op": "relation", "kind": "equivalentClass", "subject": "ex:Cat", "object": "ex:Dog" },
            { "op": "label", "kind": "Preferred", "concept": "ex:dogs", "value": "dogs", "language": "en" }
        ]
    }"#;

    #[test]
    fn applies_declarations_and_reports_conflicts() {
        let sink = Arc::new(VecSink::new());
        let mut tax = Taxonomy::default().with_sink(sink.clone());
        let script = Script::from_json_str(SCRIPT, "inline").unwrap();
        assert_eq!(script.apply(&mut tax).unwrap(), 5);

        let dog = resolve(&tax, "ex:Dog").unwrap();
        let cat = resolve(&tax, "ex:Cat").unwrap();
        let animal = resolve(&tax, "ex:Animal").unwrap();
        assert!(tax.check_sub_class_of(dog, animal));
        assert!(tax.check_disjoint_with(cat, dog));
        assert!(!tax.check_equivalent_class(cat, dog));
        assert_eq!(sink.warnings().len(), 1);
        assert_eq!(tax.labels().len(), 1);
    }

    #[test]
    fn rejects_unknown_kind_and_names() {
        let bad = r#"{ "declarations": [ { "op": "relation", "kind": "partOf", "subject": "a", "object": "b" } ] }"#;
        assert!(matches!(
            Script::from_json_str(bad, "inline"),
            Err(ScriptError::Parse { .. })
        ));
        let tax = Taxonomy::default();
        assert!(matches!(
            resolve(&tax, "ex:Nobody"),
            Err(TaxoError::Entity(EntityError::UnknownName { .. }))
        ));
    }

    #[test]
    fn self_relation_in_script_is_an_error() {
        let script = r#"{ "declarations": [ { "op": "relation", "kind": "broader", "subject": "ex:X", "object": "ex:X" } ] }"#;
        let mut tax = Taxonomy::default();
        let err = Script::from_json_str(script, "inline")
            .unwrap()
            .apply(&mut tax)
            .unwrap_err();
        assert!(matches!(err, TaxoError::Precondition(_)));
    }

    #[test]
    fn serializes_kind_as_term() {
        let script = Script {
            declarations: vec![Declaration::Relation {
                kind: RelationKind::BroadMatch,
                subject: "a".into(),
                object: "b".into(),
            }],
        };
        let json = serde_json::to_string(&script).unwrap();
        assert!(json.contains(r#""op":"relation""#));
        assert!(json.contains(r#""kind":"broadMatch""#));
        assert_eq!(Script::from_json_str(&json, "inline").unwrap(), script);
    }
}
