//! Declarative mutual-exclusion table.
//!
//! A [`ConstraintProfile`] maps a relation kind to the kinds that must not
//! already hold between the same pair before it may be declared. Rules are
//! data: adding a constrained kind means adding a row, not a branch. A
//! profile can be the built-in table or loaded from TOML:
//!
//! ```toml
//! [[rule]]
//! kind = "SubClassOf"
//! excludes = [
//!     { kind = "SubClassOf", orientation = "reversed" },
//!     { kind = "EquivalentClass", orientation = "same" },
//! ]
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ProfileError;

use super::{Orientation, RelationKind};

/// A kind that conflicts with the one being declared, read in `orientation`
/// relative to the declared pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Exclusion {
    pub kind: RelationKind,
    pub orientation: Orientation,
}

impl Exclusion {
    pub const fn same(kind: RelationKind) -> Self {
        Self {
            kind,
            orientation: Orientation::Same,
        }
    }

    pub const fn reversed(kind: RelationKind) -> Self {
        Self {
            kind,
            orientation: Orientation::Reversed,
        }
    }
}

/// One row of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRule {
    pub kind: RelationKind,
    #[serde(default)]
    pub excludes: Vec<Exclusion>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProfileDocument {
    #[serde(rename = "rule", default)]
    rules: Vec<ProfileRule>,
}

/// Mutual-exclusion rules for every constrained relation kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintProfile {
    rules: HashMap<RelationKind, Vec<Exclusion>>,
}

use RelationKind::*;

const CLASS_RULES: &[(RelationKind, &[Exclusion])] = &[
    (
        SubClassOf,
        &[
            Exclusion::reversed(SubClassOf),
            Exclusion::same(EquivalentClass),
            Exclusion::same(DisjointWith),
        ],
    ),
    (
        EquivalentClass,
        &[
            Exclusion::same(SubClassOf),
            Exclusion::reversed(SubClassOf),
            Exclusion::same(DisjointWith),
        ],
    ),
    (
        DisjointWith,
        &[
            Exclusion::same(SubClassOf),
            Exclusion::reversed(SubClassOf),
            Exclusion::same(EquivalentClass),
        ],
    ),
];

const PROPERTY_RULES: &[(RelationKind, &[Exclusion])] = &[
    (
        SubPropertyOf,
        &[
            Exclusion::reversed(SubPropertyOf),
            Exclusion::same(EquivalentProperty),
        ],
    ),
    (
        EquivalentProperty,
        &[
            Exclusion::same(SubPropertyOf),
            Exclusion::reversed(SubPropertyOf),
        ],
    ),
];

/// Concept kinds that state the same relation. Every member excludes every
/// other group, read on the same ordered pair.
const CONCEPT_GROUPS: &[&[RelationKind]] = &[
    &[Broader, BroaderTransitive],
    &[Narrower, NarrowerTransitive],
    &[Related],
    &[BroadMatch],
    &[NarrowMatch],
    &[CloseMatch],
    &[ExactMatch],
    &[RelatedMatch],
];

impl ConstraintProfile {
    /// A profile without any rules: every declaration is accepted.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard class, concept and property rules.
    pub fn builtin() -> Self {
        let mut rules: HashMap<RelationKind, Vec<Exclusion>> = HashMap::new();
        for (kind, excludes) in CLASS_RULES.iter().chain(PROPERTY_RULES) {
            rules.insert(*kind, excludes.to_vec());
        }
        for (i, group) in CONCEPT_GROUPS.iter().enumerate() {
            let excludes: Vec<Exclusion> = CONCEPT_GROUPS
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, other)| Exclusion::same(other[0]))
                .collect();
            for &kind in group.iter() {
                rules.insert(kind, excludes.clone());
            }
        }
        Self { rules }
    }

    /// Build a profile from rows, rejecting cross-family and duplicate rules.
    pub fn from_rules(rows: Vec<ProfileRule>) -> Result<Self, ProfileError> {
        let mut rules = HashMap::new();
        for row in rows {
            if let Some(bad) = row
                .excludes
                .iter()
                .find(|e| e.kind.family() != row.kind.family())
            {
                return Err(ProfileError::CrossFamily {
                    kind: row.kind.to_string(),
                    excluded: bad.kind.to_string(),
                });
            }
            if rules.insert(row.kind, row.excludes).is_some() {
                return Err(ProfileError::DuplicateRule {
                    kind: row.kind.to_string(),
                });
            }
        }
        Ok(Self { rules })
    }

    /// Parse a TOML profile document.
    pub fn from_toml_str(content: &str) -> Result<Self, ProfileError> {
        let doc: ProfileDocument = toml::from_str(content).map_err(|e| ProfileError::Parse {
            message: e.to_string(),
        })?;
        Self::from_rules(doc.rules)
    }

    /// Load a TOML profile from disk.
    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let content = std::fs::read_to_string(path).map_err(|source| ProfileError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let profile = Self::from_toml_str(&content)?;
        tracing::info!(path = %path.display(), rules = profile.len(), "loaded constraint profile");
        Ok(profile)
    }

    /// Render as a TOML document that [`ConstraintProfile::from_toml_str`] accepts.
    pub fn to_toml_string(&self) -> Result<String, ProfileError> {
        let mut rules: Vec<ProfileRule> = self
            .rules
            .iter()
            .map(|(kind, excludes)| ProfileRule {
                kind: *kind,
                excludes: excludes.clone(),
            })
            .collect();
        rules.sort_by_key(|r| r.kind);
        toml::to_string_pretty(&ProfileDocument { rules }).map_err(|e| ProfileError::Parse {
            message: e.to_string(),
        })
    }

    /// Exclusions that apply when declaring `kind`.
    pub fn excluded_by(&self, kind: RelationKind) -> &[Exclusion] {
        self.rules.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of constrained kinds.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_class_rules_match_the_rule_table() {
        let p = ConstraintProfile::builtin();
        assert_eq!(
            p.excluded_by(SubClassOf),
            &[
                Exclusion::reversed(SubClassOf),
                Exclusion::same(EquivalentClass),
                Exclusion::same(DisjointWith),
            ]
        );
        assert!(p.excluded_by(DisjointWith).contains(&Exclusion::reversed(SubClassOf)));
        assert!(p.excluded_by(AllDisjointGroup).is_empty());
        assert!(p.excluded_by(Domain).is_empty());
    }

    #[test]
    fn builtin_concept_groups_exclude_everything_but_themselves() {
        let p = ConstraintProfile::builtin();
        let broader = p.excluded_by(Broader);
        assert_eq!(broader.len(), CONCEPT_GROUPS.len() - 1);
        assert!(broader.contains(&Exclusion::same(Narrower)));
        assert!(broader.contains(&Exclusion::same(Related)));
        assert!(broader.contains(&Exclusion::same(ExactMatch)));
        assert!(!broader.contains(&Exclusion::same(Broader)));
        assert_eq!(p.excluded_by(BroaderTransitive), broader);
        assert!(p.excluded_by(RelatedMatch).contains(&Exclusion::same(CloseMatch)));
    }

    #[test]
    fn parses_toml_profile() {
        let toml = r#"
            [[rule]]
            kind = "SubClassOf"
            excludes = [{ kind = "DisjointWith", orientation = "same" }]

            [[rule]]
            kind = "Related"
        "#;
        let p = ConstraintProfile::from_toml_str(toml).unwrap();
        assert_eq!(p.len(), 2);
        assert_eq!(p.excluded_by(SubClassOf), &[Exclusion::same(DisjointWith)]);
        assert!(p.excluded_by(Related).is_empty());
    }

    #[test]
    fn rejects_cross_family_rule() {
        let toml = r#"
            [[rule]]
            kind = "SubClassOf"
            excludes = [{ kind = "Broader", orientation = "same" }]
        "#;
        let err = ConstraintProfile::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, ProfileError::CrossFamily { .. }));
    }

    #[test]
    fn rejects_duplicate_rule_and_unknown_kind() {
        let dup = "[[rule]]\nkind = \"Related\"\n[[rule]]\nkind = \"Related\"\n";
        assert!(matches!(
            ConstraintProfile::from_toml_str(dup),
            Err(ProfileError::DuplicateRule { .. })
        ));
        let unknown = "[[rule]]\nkind = \"PartOf\"\n";
        assert!(matches!(
            ConstraintProfile::from_toml_str(unknown),
            Err(ProfileError::Parse { .. })
        ));
    }

    #[test]
    fn builtin_survives_toml_roundtrip() {
        let p = ConstraintProfile::builtin();
        let text = p.to_toml_string().unwrap();
        assert_eq!(ConstraintProfile::from_toml_str(&text).unwrap(), p);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("profile.toml");
        std::fs::write(&path, "[[rule]]\nkind = \"Broader\"\n").unwrap();
        let p = ConstraintProfile::load(&path).unwrap();
        assert_eq!(p.len(), 1);
        assert!(matches!(
            ConstraintProfile::load(&dir.path().join("missing.toml")),
            Err(ProfileError::Read { .. })
        ));
    }
}
