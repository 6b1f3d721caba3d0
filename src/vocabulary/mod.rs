//! Tag vocabulary loaded from the data-model spreadsheet.
//!
//! The vocabulary maps every enumerated tag key to the values the data model
//! allows for it. Free-text rows (value `<text>`) contribute nothing.

mod table;
mod workbook;

use anyhow::{Result, bail};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::VocabularyConfig;
use crate::utils::value_matches;
use geojson::JsonValue;

pub use table::read_csv;
pub use workbook::read_workbook;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagVocabulary {
    tags: BTreeMap<String, Vec<String>>,
}

impl TagVocabulary {
    /// Build a vocabulary from the data rows that follow the header row.
    ///
    /// The first `settings.skip_rows` rows are ignored, as are rows missing a
    /// key or a value and rows whose value is the free-text placeholder.
    pub fn from_rows<I>(rows: I, settings: &VocabularyConfig) -> Self
    where
        I: IntoIterator<Item = (Option<String>, Option<String>)>,
    {
        let mut vocabulary = TagVocabulary::default();
        for (index, (key, value)) in rows.into_iter().enumerate().skip(settings.skip_rows) {
            let (Some(key), Some(value)) = (key, value) else {
                tracing::debug!("Vocabulary: row {} has an empty key or value, skipped", index);
                continue;
            };
            if value == settings.placeholder {
                continue;
            }
            vocabulary.insert(key, value);
        }
        vocabulary
    }

    pub fn insert(&mut self, key: String, value: String) {
        self.tags.entry(key).or_default().push(value);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.tags.contains_key(key)
    }

    pub fn values(&self, key: &str) -> Option<&[String]> {
        self.tags.get(key).map(Vec::as_slice)
    }

    /// True when `key` is enumerated and `value` is one of its allowed values.
    ///
    /// Numbers compare numerically against numeric vocabulary text.
    pub fn allows_value(&self, key: &str, value: &JsonValue) -> bool {
        self.values(key)
            .is_some_and(|values| values.iter().any(|allowed| value_matches(allowed, value)))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TagVocabulary {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut vocabulary = TagVocabulary::default();
        for (key, value) in iter {
            vocabulary.insert(key.into(), value.into());
        }
        vocabulary
    }
}

/// Load the vocabulary, picking the reader from the file extension.
pub fn load(path: &Path, settings: &VocabularyConfig) -> Result<TagVocabulary> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let vocabulary = match ext.as_str() {
        "csv" => read_csv(path, settings)?,
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path, settings)?,
        _ => bail!(
            "Vocabulary: unsupported file type {:?} (expected .xlsx, .xls, .ods or .csv)",
            path
        ),
    };

    tracing::info!(
        "Vocabulary: {} enumerated tags loaded from {:?}",
        vocabulary.len(),
        path
    );
    Ok(vocabulary)
}

/// Positions of the key and value columns within a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ColumnIndex {
    pub key: usize,
    pub value: usize,
}

impl ColumnIndex {
    pub(crate) fn resolve<S: AsRef<str>>(header: &[S], settings: &VocabularyConfig) -> Result<Self> {
        let find = |name: &str| header.iter().position(|cell| cell.as_ref().trim() == name);

        match (
            find(settings.key_column.as_str()),
            find(settings.value_column.as_str()),
        ) {
            (Some(key), Some(value)) => Ok(Self { key, value }),
            (key, value) => {
                let missing: Vec<&str> = [
                    (key, settings.key_column.as_str()),
                    (value, settings.value_column.as_str()),
                ]
                .into_iter()
                .filter(|(found, _)| found.is_none())
                .map(|(_, name)| name)
                .collect();
                bail!(
                    "Vocabulary: missing column(s) {} in header [{}]",
                    missing.join(", "),
                    header
                        .iter()
                        .map(|cell| cell.as_ref())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
        }
    }
}
