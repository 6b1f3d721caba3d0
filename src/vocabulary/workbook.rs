use anyhow::{Context, Result};
use calamine::{Data, Range, Reader, open_workbook_auto};
use std::path::Path;

use super::{ColumnIndex, TagVocabulary};
use crate::config::VocabularyConfig;
use crate::utils::format_number;

pub fn read_workbook(path: &Path, settings: &VocabularyConfig) -> Result<TagVocabulary> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Vocabulary: failed to open workbook {:?}", path))?;
    let range = workbook
        .worksheet_range(&settings.sheet)
        .with_context(|| format!("Vocabulary: no sheet '{}' in {:?}", settings.sheet, path))?;

    tracing::debug!(
        "Vocabulary: sheet '{}' has {} rows",
        settings.sheet,
        range.height()
    );
    vocabulary_from_range(&range, settings)
}

/// Read the vocabulary from a worksheet whose first row is the header.
pub fn vocabulary_from_range(range: &Range<Data>, settings: &VocabularyConfig) -> Result<TagVocabulary> {
    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(|cell| cell_text(cell).unwrap_or_default()).collect())
        .unwrap_or_default();
    let columns = ColumnIndex::resolve(&header, settings)?;

    let pairs = rows.map(|row| {
        (
            row.get(columns.key).and_then(cell_text),
            row.get(columns.value).and_then(cell_text),
        )
    });
    Ok(TagVocabulary::from_rows(pairs, settings))
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(text) if text.is_empty() => None,
        Data::String(text) => Some(text.clone()),
        Data::Float(value) => Some(format_number(*value)),
        Data::Int(value) => Some(value.to_string()),
        Data::Bool(flag) => Some(flag.to_string()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::CellErrorType;
    use rust_xlsxwriter::Workbook;
    use tempfile::TempDir;

    fn write_xlsx(path: &Path, sheet_name: &str) {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name).unwrap();
        worksheet.write(0, 0, "description").unwrap();
        worksheet.write(0, 1, "key").unwrap();
        worksheet.write(0, 2, "value").unwrap();
        worksheet.write(1, 0, "sample").unwrap();
        worksheet.write(1, 1, "key").unwrap();
        worksheet.write(1, 2, "value").unwrap();
        worksheet.write(2, 0, "Health facility").unwrap();
        worksheet.write(2, 1, "amenity").unwrap();
        worksheet.write(2, 2, "clinic").unwrap();
        worksheet.write(3, 0, "Name").unwrap();
        worksheet.write(3, 1, "name").unwrap();
        worksheet.write(3, 2, "<text>").unwrap();
        worksheet.write(4, 0, "Floors").unwrap();
        worksheet.write(4, 1, "building:levels").unwrap();
        worksheet.write(4, 2, 2.0).unwrap();
        workbook.save(path).unwrap();
    }

    fn sheet(rows: &[[Data; 3]]) -> Range<Data> {
        let mut range = Range::new((0, 0), (rows.len() as u32 - 1, 2));
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                range.set_value((r as u32, c as u32), cell.clone());
            }
        }
        range
    }

    fn text(value: &str) -> Data {
        Data::String(value.to_string())
    }

    #[test]
    fn reads_key_value_columns_by_header_name() {
        let range = sheet(&[
            [text("description"), text("key"), text("value")],
            [text("sample"), text("sample"), text("sample")],
            [text("Road surface"), text("surface"), text("paved")],
            [text("Road surface"), text("surface"), text("<text>")],
            [text("Floors"), text("building:levels"), Data::Float(2.0)],
        ]);

        let vocabulary = vocabulary_from_range(&range, &VocabularyConfig::default()).unwrap();

        assert!(!vocabulary.contains_key("sample"));
        assert_eq!(vocabulary.values("surface"), Some(&["paved".to_string()][..]));
        assert!(vocabulary.allows_value("building:levels", &"2".into()));
    }

    #[test]
    fn missing_value_column_is_an_error() {
        let range = sheet(&[
            [text("key"), text("label"), text("notes")],
            [text("surface"), text("Surface"), Data::Empty],
        ]);

        let err = vocabulary_from_range(&range, &VocabularyConfig::default()).unwrap_err();
        assert!(err.to_string().contains("missing column"), "unexpected error: {err}");
    }

    #[test]
    fn cell_text_renders_numbers_like_the_sheet() {
        assert_eq!(cell_text(&Data::Float(4.0)), Some("4".to_string()));
        assert_eq!(cell_text(&Data::Float(0.5)), Some("0.5".to_string()));
        assert_eq!(cell_text(&Data::Int(7)), Some("7".to_string()));
        assert_eq!(cell_text(&Data::Bool(true)), Some("true".to_string()));
        assert_eq!(cell_text(&Data::Empty), None);
        assert_eq!(cell_text(&text("")), None);
    }

    #[test]
    fn error_cells_are_not_vocabulary_values() {
        let range = sheet(&[
            [text("description"), text("key"), text("value")],
            [text("sample"), text("sample"), text("sample")],
            [text("Lookup"), text("surface"), Data::Error(CellErrorType::NA)],
            [text("Road surface"), text("surface"), text("paved")],
        ]);

        let vocabulary = vocabulary_from_range(&range, &VocabularyConfig::default()).unwrap();

        assert_eq!(cell_text(&Data::Error(CellErrorType::NA)), None);
        assert_eq!(vocabulary.values("surface"), Some(&["paved".to_string()][..]));
    }

    #[test]
    fn reads_tag_sheet_from_xlsx_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tags.xlsx");
        write_xlsx(&path, "Overview - all Tags");

        let vocabulary = read_workbook(&path, &VocabularyConfig::default()).unwrap();

        assert_eq!(vocabulary.len(), 2);
        assert!(!vocabulary.contains_key("key"));
        assert!(!vocabulary.contains_key("name"));
        assert_eq!(vocabulary.values("amenity"), Some(&["clinic".to_string()][..]));
        assert_eq!(vocabulary.values("building:levels"), Some(&["2".to_string()][..]));
    }

    #[test]
    fn missing_sheet_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tags.xlsx");
        write_xlsx(&path, "Sheet1");

        let err = read_workbook(&path, &VocabularyConfig::default()).unwrap_err();

        assert!(
            err.to_string().contains("no sheet 'Overview - all Tags'"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn missing_workbook_reports_path() {
        let err = read_workbook(Path::new("/nonexistent/tags.xlsx"), &VocabularyConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("tags.xlsx"), "unexpected error: {err}");
    }
}
