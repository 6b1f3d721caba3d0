use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::path::Path;

use super::{ColumnIndex, TagVocabulary};
use crate::config::VocabularyConfig;

/// Read a CSV export of the tag overview sheet.
pub fn read_csv(path: &Path, settings: &VocabularyConfig) -> Result<TagVocabulary> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Vocabulary: failed to open {:?}", path))?;

    let header: Vec<String> = reader
        .headers()
        .with_context(|| format!("Vocabulary: failed to read header of {:?}", path))?
        .iter()
        .map(str::to_string)
        .collect();
    let columns = ColumnIndex::resolve(&header, settings)?;

    let mut pairs = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record
            .with_context(|| format!("Vocabulary: bad record {} in {:?}", line + 1, path))?;
        pairs.push((field(&record, columns.key), field(&record, columns.value)));
    }

    Ok(TagVocabulary::from_rows(pairs, settings))
}

fn field(record: &StringRecord, index: usize) -> Option<String> {
    record
        .get(index)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_exported_sheet() {
        let file = write_csv(
            "key,value,notes\n\
             key,value,sample row\n\
             amenity,clinic,\n\
             amenity,hospital,\n\
             name,<text>,free text\n",
        );

        let vocabulary = read_csv(file.path(), &VocabularyConfig::default()).unwrap();

        assert_eq!(vocabulary.len(), 1);
        assert!(vocabulary.allows_value("amenity", &"clinic".into()));
        assert!(vocabulary.allows_value("amenity", &"hospital".into()));
        assert!(!vocabulary.contains_key("name"));
        assert!(!vocabulary.contains_key("key"));
    }

    #[test]
    fn short_rows_are_tolerated() {
        let file = write_csv("key,value\nsample,row\nsurface,paved\nsurface\n");

        let vocabulary = read_csv(file.path(), &VocabularyConfig::default()).unwrap();

        assert_eq!(vocabulary.values("surface"), Some(&["paved".to_string()][..]));
    }

    #[test]
    fn custom_column_names() {
        let file = write_csv("tag,allowed\nsurface,paved\n");
        let settings = VocabularyConfig {
            key_column: "tag".to_string(),
            value_column: "allowed".to_string(),
            skip_rows: 0,
            ..VocabularyConfig::default()
        };

        let vocabulary = read_csv(file.path(), &settings).unwrap();

        assert!(vocabulary.allows_value("surface", &"paved".into()));
    }

    #[test]
    fn missing_columns_fail() {
        let file = write_csv("tag,allowed\nsurface,paved\n");
        assert!(read_csv(file.path(), &VocabularyConfig::default()).is_err());
    }
}
