//! Bulk-import CSV projection of [`GalleryRow`]s.
//!
//! Column layout: `ID, Handle, Image Type, Image Src, Image Command,
//! Image Position, Variant ID`, then `Option{n} Name, Option{n} Value` for
//! n in `1..=K`, then `Variant Image`. `K` is dynamic; rows narrower than
//! `K` are padded.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::path::Path;

use imgshift_core::legacy_id;

use crate::error::PipelineError;
use crate::gallery::GalleryRow;

const LEADING_COLUMNS: [&str; 7] = [
    "ID",
    "Handle",
    "Image Type",
    "Image Src",
    "Image Command",
    "Image Position",
    "Variant ID",
];

const IMAGE_TYPE: &str = "IMAGE";

/// Header row for `option_columns` option name/value pairs, each name
/// followed by its value.
#[must_use]
pub fn header(option_columns: usize) -> Vec<String> {
    let mut columns: Vec<String> = LEADING_COLUMNS.iter().map(|c| (*c).to_owned()).collect();
    for n in 1..=option_columns {
        columns.push(format!("Option{n} Name"));
        columns.push(format!("Option{n} Value"));
    }
    columns.push("Variant Image".to_owned());
    columns
}

/// Widest option list among `rows`.
#[must_use]
pub fn option_width(rows: &[GalleryRow]) -> usize {
    rows.iter().map(|r| r.options.len()).max().unwrap_or(0)
}

/// Flattens one row into `header(option_columns).len()` fields.
#[must_use]
pub fn row_fields(row: &GalleryRow, option_columns: usize) -> Vec<String> {
    let mut fields = vec![
        legacy_id(&row.product_id).to_owned(),
        row.handle.clone(),
        IMAGE_TYPE.to_owned(),
        row.image_src.clone(),
        row.image_command.as_str().to_owned(),
        row.image_position.to_string(),
        row.variant_id
            .as_deref()
            .map(legacy_id)
            .unwrap_or_default()
            .to_owned(),
    ];
    for n in 0..option_columns {
        let (name, value) = row.options.get(n).cloned().unwrap_or_default();
        fields.push(name);
        fields.push(value);
    }
    fields.push(row.variant_image().unwrap_or_default().to_owned());
    fields
}

/// Renders the header plus all rows, `\n`-terminated.
#[must_use]
pub fn render_csv(rows: &[GalleryRow], option_columns: usize) -> String {
    let mut out = String::new();
    push_record(&mut out, &header(option_columns));
    for row in rows {
        push_record(&mut out, &row_fields(row, option_columns));
    }
    out
}

/// Writes the import file, replacing any existing file at `path`.
///
/// # Errors
///
/// Returns [`PipelineError::Io`] if the file cannot be written.
pub fn write_import_file(
    path: &Path,
    rows: &[GalleryRow],
    option_columns: usize,
) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| PipelineError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, render_csv(rows, option_columns)).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Distinct values of the first (`ID`) column, header excluded.
#[must_use]
pub fn read_product_ids(text: &str) -> BTreeSet<String> {
    parse_records(text)
        .into_iter()
        .skip(1)
        .filter_map(|record| record.into_iter().next())
        .filter(|id| !id.is_empty())
        .collect()
}

fn push_record(out: &mut String, fields: &[String]) {
    let escaped: Vec<Cow<'_, str>> = fields.iter().map(|f| escape_field(f)).collect();
    out.push_str(&escaped.join(","));
    out.push('\n');
}

fn escape_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Quote-aware record splitter; accepts `\n` and `\r\n` line endings.
fn parse_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(ch),
            }
            continue;
        }
        match ch {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(ch),
        }
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::ImageCommand;

    fn row(position: usize, variant: Option<&str>, canonical: bool) -> GalleryRow {
        GalleryRow {
            product_id: "gid://shopify/Product/9678733148457".to_owned(),
            handle: "wall-tile".to_owned(),
            image_src: format!("https://files.example.com/{position}.jpg"),
            image_command: if position == 1 {
                ImageCommand::Replace
            } else {
                ImageCommand::Merge
            },
            image_position: position,
            variant_id: variant.map(|v| format!("gid://shopify/ProductVariant/{v}")),
            options: vec![(
                "Color".to_owned(),
                if canonical { "Red".to_owned() } else { String::new() },
            )],
            is_canonical_variant_image: canonical,
        }
    }

    #[test]
    fn header_pairs_each_option_name_with_its_value() {
        assert_eq!(
            header(2),
            [
                "ID",
                "Handle",
                "Image Type",
                "Image Src",
                "Image Command",
                "Image Position",
                "Variant ID",
                "Option1 Name",
                "Option1 Value",
                "Option2 Name",
                "Option2 Value",
                "Variant Image",
            ]
        );
    }

    #[test]
    fn header_without_options() {
        assert_eq!(header(0).len(), 8);
    }

    #[test]
    fn canonical_row_projection() {
        let fields = row_fields(&row(1, Some("42"), true), 1);
        assert_eq!(
            fields,
            [
                "9678733148457",
                "wall-tile",
                "IMAGE",
                "https://files.example.com/1.jpg",
                "REPLACE",
                "1",
                "42",
                "Color",
                "Red",
                "https://files.example.com/1.jpg",
            ]
        );
    }

    #[test]
    fn anonymous_row_has_empty_variant_columns() {
        let fields = row_fields(&row(2, None, false), 1);
        assert_eq!(fields[4], "MERGE");
        assert_eq!(fields[6], "");
        assert_eq!(fields[8], "");
        assert_eq!(fields[9], "");
    }

    #[test]
    fn narrow_rows_are_padded_to_width() {
        let fields = row_fields(&row(1, Some("42"), true), 3);
        assert_eq!(fields.len(), header(3).len());
        assert_eq!(&fields[7..13], ["Color", "Red", "", "", "", ""]);
        assert_eq!(fields[13], "https://files.example.com/1.jpg");
    }

    #[test]
    fn fields_with_commas_and_quotes_are_quoted() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("12\" tile"), "\"12\"\" tile\"");
    }

    #[test]
    fn render_then_read_ids() {
        let mut other = row(1, None, false);
        other.product_id = "gid://shopify/Product/7".to_owned();
        other.handle = "odd, handle".to_owned();
        let text = render_csv(&[row(1, Some("42"), true), row(2, None, false), other], 1);

        assert_eq!(text.lines().count(), 4);
        let ids = read_product_ids(&text);
        assert_eq!(
            ids.into_iter().collect::<Vec<_>>(),
            ["7", "9678733148457"]
        );
    }

    #[test]
    fn parse_records_handles_quoted_newlines_and_crlf() {
        let records = parse_records("a,b\r\n\"x\ny\",\"q\"\"\"\r\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], ["x\ny", "q\""]);
    }

    #[test]
    fn write_import_file_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("import.csv");
        write_import_file(&path, &[row(1, Some("42"), true)], 1).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("ID,Handle,"));
        assert!(written.contains(",REPLACE,1,42,Color,Red,"));
    }
}
