use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_SHEET: &str = "Overview - all Tags";
pub const TEXT_PLACEHOLDER: &str = "<text>";
pub const DEFAULT_OUTPUT_PREFIX: &str = "new-";

/// Identity and label keys that bypass the vocabulary check.
pub const DEFAULT_KEEP: &[&str] = &[
    "name",
    "name:en",
    "id",
    "operator",
    "addr:street",
    "addr:housenumber",
    "osm_id",
    "title",
    "label",
];

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SieveConfig {
    #[serde(default)]
    pub vocabulary: VocabularyConfig,
    #[serde(default = "default_keep")]
    pub keep: Vec<String>,
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,
}

impl SieveConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}

impl Default for SieveConfig {
    fn default() -> Self {
        Self {
            vocabulary: VocabularyConfig::default(),
            keep: default_keep(),
            output_prefix: default_output_prefix(),
        }
    }
}

/// Where the tag vocabulary lives inside the spreadsheet.
///
/// The first row of the sheet is always the header naming the columns.
/// `skip_rows` counts data rows *after* that header which are ignored before
/// any key/value pair is read. The survey spreadsheets this tool was built for
/// carry one sample row under the header, hence the default of 1. Set it to 0
/// when the first data row is a real tag.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct VocabularyConfig {
    #[serde(default = "default_sheet")]
    pub sheet: String,
    #[serde(default = "default_key_column")]
    pub key_column: String,
    #[serde(default = "default_value_column")]
    pub value_column: String,
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
    #[serde(default = "default_skip_rows")]
    pub skip_rows: usize,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            sheet: default_sheet(),
            key_column: default_key_column(),
            value_column: default_value_column(),
            placeholder: default_placeholder(),
            skip_rows: default_skip_rows(),
        }
    }
}

fn default_sheet() -> String {
    DEFAULT_SHEET.to_string()
}

fn default_key_column() -> String {
    "key".to_string()
}

fn default_value_column() -> String {
    "value".to_string()
}

fn default_placeholder() -> String {
    TEXT_PLACEHOLDER.to_string()
}

fn default_skip_rows() -> usize {
    1
}

fn default_keep() -> Vec<String> {
    DEFAULT_KEEP.iter().map(|key| key.to_string()).collect()
}

fn default_output_prefix() -> String {
    DEFAULT_OUTPUT_PREFIX.to_string()
}
