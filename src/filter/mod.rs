//! Property filtering against the tag vocabulary.
//!
//! Every property of every feature is either kept (always-keep key, or an
//! enumerated key with an allowed value) or dropped with a [`Violation`].

use geojson::{Feature, FeatureCollection, JsonObject, JsonValue};
use std::collections::HashSet;
use std::fmt;

use crate::utils::display_value;
use crate::vocabulary::TagVocabulary;

/// Keys exempt from the vocabulary check.
#[derive(Debug, Clone)]
pub struct KeepKeys(HashSet<String>);

impl KeepKeys {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keys.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }
}

impl Default for KeepKeys {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_KEEP.iter().copied())
    }
}

/// A property dropped because the data model does not allow it.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    UnknownTag {
        feature: usize,
        key: String,
    },
    DisallowedValue {
        feature: usize,
        key: String,
        value: JsonValue,
    },
}

impl Violation {
    pub fn feature(&self) -> usize {
        match self {
            Violation::UnknownTag { feature, .. } | Violation::DisallowedValue { feature, .. } => {
                *feature
            }
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Violation::UnknownTag { key, .. } | Violation::DisallowedValue { key, .. } => key,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::UnknownTag { key, .. } => write!(f, "Tag {} not in the data model!", key),
            Violation::DisallowedValue { value, .. } => {
                write!(f, "Value {} not in the data model!", display_value(value))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub features: usize,
    pub kept: usize,
    pub dropped: usize,
}

#[derive(Debug)]
pub struct FilterOutcome {
    pub collection: FeatureCollection,
    pub violations: Vec<Violation>,
    pub stats: FilterStats,
}

pub struct FeatureFilter<'a> {
    vocabulary: &'a TagVocabulary,
    keep: &'a KeepKeys,
}

impl<'a> FeatureFilter<'a> {
    pub fn new(vocabulary: &'a TagVocabulary, keep: &'a KeepKeys) -> Self {
        Self { vocabulary, keep }
    }

    /// Build a new collection holding only the properties the data model allows.
    ///
    /// The input is left untouched; geometry, `id` and `bbox` are copied as-is.
    pub fn filter(&self, input: &FeatureCollection) -> FilterOutcome {
        let mut violations = Vec::new();
        let mut stats = FilterStats::default();

        let features = input
            .features
            .iter()
            .enumerate()
            .map(|(index, feature)| {
                stats.features += 1;
                let properties = self.filter_properties(index, feature, &mut violations, &mut stats);
                Feature {
                    bbox: feature.bbox.clone(),
                    geometry: feature.geometry.clone(),
                    id: feature.id.clone(),
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();

        FilterOutcome {
            collection: FeatureCollection {
                bbox: input.bbox.clone(),
                features,
                foreign_members: None,
            },
            violations,
            stats,
        }
    }

    fn filter_properties(
        &self,
        index: usize,
        feature: &Feature,
        violations: &mut Vec<Violation>,
        stats: &mut FilterStats,
    ) -> JsonObject {
        let mut kept = JsonObject::new();
        let Some(properties) = &feature.properties else {
            return kept;
        };

        for (key, value) in properties {
            match self.check(index, key, value) {
                None => {
                    kept.insert(key.clone(), value.clone());
                    stats.kept += 1;
                }
                Some(violation) => {
                    violations.push(violation);
                    stats.dropped += 1;
                }
            }
        }
        kept
    }

    fn check(&self, index: usize, key: &str, value: &JsonValue) -> Option<Violation> {
        if self.keep.contains(key) {
            return None;
        }
        if !self.vocabulary.contains_key(key) {
            return Some(Violation::UnknownTag {
                feature: index,
                key: key.to_string(),
            });
        }
        if self.vocabulary.allows_value(key, value) {
            None
        } else {
            Some(Violation::DisallowedValue {
                feature: index,
                key: key.to_string(),
                value: value.clone(),
            })
        }
    }
}
