//! Concept labels: preferred, alternative and hidden lexical forms.
//!
//! Labels relate a concept to a [`Literal`] rather than to another entity, so
//! they live beside the relation stores instead of inside them. Two rules
//! apply: a concept has at most one preferred label per language, and the
//! three label kinds are pairwise disjoint for the same concept and literal.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::entity::EntityId;
use crate::error::PreconditionError;

static LANGUAGE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{2,8}(-[A-Za-z0-9]{1,8})*$").unwrap());

/// Which label relation a literal is attached by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LabelKind {
    Preferred,
    Alternative,
    Hidden,
}

impl LabelKind {
    pub const ALL: [LabelKind; 3] = [
        LabelKind::Preferred,
        LabelKind::Alternative,
        LabelKind::Hidden,
    ];

    pub fn term(self) -> &'static str {
        match self {
            LabelKind::Preferred => "prefLabel",
            LabelKind::Alternative => "altLabel",
            LabelKind::Hidden => "hiddenLabel",
        }
    }
}

impl fmt::Display for LabelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.term())
    }
}

/// A label value: NFC-normalized text with an optional lowercase language tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    language: Option<String>,
}

impl Literal {
    /// Validate and normalize a literal for `operation`.
    pub fn new(
        operation: &'static str,
        value: &str,
        language: Option<&str>,
    ) -> Result<Self, PreconditionError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(PreconditionError::EmptyLiteral { operation });
        }
        let language = match language {
            None => None,
            Some(tag) if LANGUAGE_TAG.is_match(tag) => Some(tag.to_ascii_lowercase()),
            Some(tag) => {
                return Err(PreconditionError::InvalidLanguageTag {
                    operation,
                    tag: tag.to_string(),
                });
            }
        };
        Ok(Self {
            value: value.nfc().collect(),
            language,
        })
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.value)?;
        if let Some(lang) = &self.language {
            write!(f, "@{lang}")?;
        }
        Ok(())
    }
}

/// One committed label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelEdge {
    pub concept: EntityId,
    pub kind: LabelKind,
    pub literal: Literal,
}

/// Append-only label storage with the label integrity rules.
#[derive(Debug, Default)]
pub struct LabelStore {
    by_concept: HashMap<EntityId, Vec<(LabelKind, Literal)>>,
    count: usize,
}

impl LabelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Label kinds that forbid attaching `literal` to `concept` as `kind`.
    ///
    /// A second preferred label in the same language conflicts with the
    /// existing one; the same literal under another kind conflicts with that
    /// kind. Re-stating an existing label is not a conflict.
    pub fn conflicts(
        &self,
        concept: EntityId,
        kind: LabelKind,
        literal: &Literal,
    ) -> Vec<LabelKind> {
        let Some(labels) = self.by_concept.get(&concept) else {
            return Vec::new();
        };
        let mut found = Vec::new();
        for (k, l) in labels {
            let clash = if l == literal {
                *k != kind
            } else {
                kind == LabelKind::Preferred
                    && *k == LabelKind::Preferred
                    && l.language == literal.language
            };
            if clash && !found.contains(k) {
                found.push(*k);
            }
        }
        found
    }

    /// Insert a label; returns `false` if it was already present.
    pub fn insert(&mut self, concept: EntityId, kind: LabelKind, literal: Literal) -> bool {
        let labels = self.by_concept.entry(concept).or_default();
        if labels.iter().any(|(k, l)| *k == kind && *l == literal) {
            return false;
        }
        labels.push((kind, literal));
        self.count += 1;
        true
    }

    pub fn contains(&self, concept: EntityId, kind: LabelKind, literal: &Literal) -> bool {
        self.by_concept
            .get(&concept)
            .is_some_and(|labels| labels.iter().any(|(k, l)| *k == kind && l == literal))
    }

    /// The preferred label of `concept` in `language` (`None` for untagged).
    pub fn preferred(&self, concept: EntityId, language: Option<&str>) -> Option<&Literal> {
        self.by_concept.get(&concept)?.iter().find_map(|(k, l)| {
            (*k == LabelKind::Preferred && l.language() == language).then_some(l)
        })
    }

    /// All labels of one kind attached to `concept`.
    pub fn labels_of(&self, concept: EntityId, kind: LabelKind) -> Vec<&Literal> {
        self.by_concept
            .get(&concept)
            .map(|labels| {
                labels
                    .iter()
                    .filter(|(k, _)| *k == kind)
                    .map(|(_, l)| l)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every label, ordered by concept.
    pub fn all(&self) -> Vec<LabelEdge> {
        let mut out: Vec<LabelEdge> = self
            .by_concept
            .iter()
            .flat_map(|(&concept, labels)| {
                labels.iter().map(move |(kind, literal)| LabelEdge {
                    concept,
                    kind: *kind,
                    literal: literal.clone(),
                })
            })
            .collect();
        out.sort_by_key(|e| (e.concept, e.kind));
        out
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ent(id: u64) -> EntityId {
        EntityId::new(id).unwrap()
    }

    fn lit(value: &str, lang: Option<&str>) -> Literal {
        Literal::new("test", value, lang).unwrap()
    }

    #[test]
    fn literal_is_nfc_normalized_and_tag_lowercased() {
        // "e" + combining acute composes to "é".
        let l = lit("cafe\u{0301}", Some("FR"));
        assert_eq!(l.value(), "caf\u{00e9}");
        assert_eq!(l.language(), Some("fr"));
        assert_eq!(l, lit("caf\u{00e9}", Some("fr")));
        assert_eq!(l.to_string(), "\"café\"@fr");
    }

    #[test]
    fn literal_preconditions() {
        assert!(matches!(
            Literal::new("declare_pref_label", "  ", None),
            Err(PreconditionError::EmptyLiteral { .. })
        ));
        assert!(matches!(
            Literal::new("declare_pref_label", "x", Some("en_US")),
            Err(PreconditionError::InvalidLanguageTag { .. })
        ));
        assert!(Literal::new("declare_pref_label", "x", Some("pt-BR")).is_ok());
    }

    #[test]
    fn one_preferred_label_per_language() {
        let mut store = LabelStore::new();
        store.insert(ent(1), LabelKind::Preferred, lit("cat", Some("en")));

        let dog = lit("dog", Some("en"));
        assert_eq!(
            store.conflicts(ent(1), LabelKind::Preferred, &dog),
            vec![LabelKind::Preferred]
        );
        assert!(store.conflicts(ent(1), LabelKind::Preferred, &lit("chat", Some("fr"))).is_empty());
        assert!(store.conflicts(ent(2), LabelKind::Preferred, &dog).is_empty());
        // Alternative labels are unbounded.
        assert!(store.conflicts(ent(1), LabelKind::Alternative, &dog).is_empty());
    }

    #[test]
    fn label_kinds_are_disjoint_for_the_same_literal() {
        let mut store = LabelStore::new();
        let kitty = lit("kitty", Some("en"));
        store.insert(ent(1), LabelKind::Alternative, kitty.clone());
        assert_eq!(
            store.conflicts(ent(1), LabelKind::Hidden, &kitty),
            vec![LabelKind::Alternative]
        );
        assert!(store.conflicts(ent(1), LabelKind::Alternative, &kitty).is_empty());
    }

    #[test]
    fn insert_is_idempotent() {
        let mut store = LabelStore::new();
        assert!(store.insert(ent(1), LabelKind::Preferred, lit("cat", None)));
        assert!(!store.insert(ent(1), LabelKind::Preferred, lit("cat", None)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.preferred(ent(1), None).map(Literal::value), Some("cat"));
        assert!(store.preferred(ent(1), Some("en")).is_none());
        assert_eq!(store.all().len(), 1);
    }
}
