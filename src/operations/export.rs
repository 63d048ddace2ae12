//! Export sink: serializes a computed report to flat files under the
//! configured export directory.
//!
//! Two formats: CSV, and Excel 2003 SpreadsheetML (a single XML file
//! that spreadsheet applications open directly).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::{info, warn};

use crate::error::Result;
use crate::operations::report::Report;

const SPREADSHEET_NS: &str = "urn:schemas-microsoft-com:office:spreadsheet";

/// Writes a report as CSV. An empty report writes nothing and returns
/// `None`.
pub fn export_csv(report: &Report, export_dir: &Path, filename: &str) -> Result<Option<PathBuf>> {
    if report.is_empty() {
        warn!(report = %report.name, "empty report, nothing to export");
        return Ok(None);
    }
    fs::create_dir_all(export_dir)?;
    let path = export_dir.join(filename);

    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(&report.columns)?;
    for row in &report.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    info!(report = %report.name, path = %path.display(), "exported CSV");
    Ok(Some(path))
}

/// Writes a report as a SpreadsheetML workbook with one worksheet. An
/// empty report writes nothing and returns `None`.
pub fn export_spreadsheet(
    report: &Report,
    export_dir: &Path,
    filename: &str,
) -> Result<Option<PathBuf>> {
    if report.is_empty() {
        warn!(report = %report.name, "empty report, nothing to export");
        return Ok(None);
    }
    fs::create_dir_all(export_dir)?;
    let path = export_dir.join(filename);

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut workbook = BytesStart::new("Workbook");
    workbook.push_attribute(("xmlns", SPREADSHEET_NS));
    workbook.push_attribute(("xmlns:ss", SPREADSHEET_NS));
    writer.write_event(Event::Start(workbook))?;

    let mut worksheet = BytesStart::new("Worksheet");
    worksheet.push_attribute(("ss:Name", report.name.as_str()));
    writer.write_event(Event::Start(worksheet))?;
    writer.write_event(Event::Start(BytesStart::new("Table")))?;

    write_row(&mut writer, &report.columns, true)?;
    for row in &report.rows {
        write_row(&mut writer, row, false)?;
    }

    writer.write_event(Event::End(BytesEnd::new("Table")))?;
    writer.write_event(Event::End(BytesEnd::new("Worksheet")))?;
    writer.write_event(Event::End(BytesEnd::new("Workbook")))?;

    fs::write(&path, writer.into_inner())?;

    info!(report = %report.name, path = %path.display(), "exported spreadsheet");
    Ok(Some(path))
}

fn write_row<W: io::Write>(writer: &mut Writer<W>, cells: &[String], header: bool) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("Row")))?;
    for cell in cells {
        writer.write_event(Event::Start(BytesStart::new("Cell")))?;

        // spreadsheet apps want numeric cells typed as Number
        let cell_type = if !header && cell.parse::<f64>().is_ok() {
            "Number"
        } else {
            "String"
        };
        let mut data = BytesStart::new("Data");
        data.push_attribute(("ss:Type", cell_type));
        writer.write_event(Event::Start(data))?;
        writer.write_event(Event::Text(BytesText::new(cell)))?;
        writer.write_event(Event::End(BytesEnd::new("Data")))?;
        writer.write_event(Event::End(BytesEnd::new("Cell")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("Row")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_report() -> Report {
        Report {
            name: "monthly_summary".to_string(),
            columns: vec!["month".to_string(), "net_savings".to_string()],
            rows: vec![
                vec!["2025-01".to_string(), "50.01".to_string()],
                vec!["2025-02".to_string(), "-3".to_string()],
            ],
        }
    }

    fn empty_report() -> Report {
        Report {
            name: "monthly_summary".to_string(),
            columns: vec!["month".to_string(), "net_savings".to_string()],
            rows: vec![],
        }
    }

    #[test]
    fn test_export_csv_writes_header_and_rows() {
        let dir = tempdir().unwrap();
        let path = export_csv(&sample_report(), dir.path(), "monthly_summary.csv")
            .unwrap()
            .unwrap();

        let contents = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "month,net_savings");
        assert_eq!(lines[1], "2025-01,50.01");
        assert_eq!(lines[2], "2025-02,-3");
    }

    #[test]
    fn test_export_csv_empty_report_writes_nothing() {
        let dir = tempdir().unwrap();
        let result = export_csv(&empty_report(), dir.path(), "monthly_summary.csv").unwrap();

        assert!(result.is_none());
        assert!(!dir.path().join("monthly_summary.csv").exists());
    }

    #[test]
    fn test_export_csv_creates_export_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("data").join("export");
        let path = export_csv(&sample_report(), &nested, "out.csv")
            .unwrap()
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_export_spreadsheet_structure() {
        let dir = tempdir().unwrap();
        let path = export_spreadsheet(&sample_report(), dir.path(), "monthly_summary.xml")
            .unwrap()
            .unwrap();

        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.contains("<Workbook"));
        assert!(contents.contains("ss:Name=\"monthly_summary\""));
        // header cells are strings, amounts are typed as numbers
        assert!(contents.contains("ss:Type=\"String\""));
        assert!(contents.contains("ss:Type=\"Number\""));
        assert!(contents.contains("50.01"));
        assert!(contents.contains("2025-01"));
        assert!(contents.contains("</Workbook>"));
    }

    #[test]
    fn test_export_spreadsheet_empty_report_writes_nothing() {
        let dir = tempdir().unwrap();
        let result =
            export_spreadsheet(&empty_report(), dir.path(), "monthly_summary.xml").unwrap();

        assert!(result.is_none());
        assert!(!dir.path().join("monthly_summary.xml").exists());
    }
}
