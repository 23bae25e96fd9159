//! CSVエクスポート

use crate::parser::LogEntry;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// ファイル選択で受け付ける画像の拡張子
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "gif"];

/// CSVの1行
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Systolic_BP")]
    systolic: String,
    #[serde(rename = "Diastolic_BP")]
    diastolic: String,
    #[serde(rename = "Heart_Rate")]
    heart_rate: String,
}

impl From<&LogEntry> for CsvRow {
    fn from(entry: &LogEntry) -> Self {
        let field = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            date: field(&entry.date),
            systolic: field(&entry.systolic),
            diastolic: field(&entry.diastolic),
            heart_rate: field(&entry.heart_rate),
        }
    }
}

impl From<CsvRow> for LogEntry {
    fn from(row: CsvRow) -> Self {
        let field = |v: String| (!v.is_empty()).then_some(v);
        Self {
            date: field(row.date),
            systolic: field(row.systolic),
            diastolic: field(row.diastolic),
            heart_rate: field(row.heart_rate),
        }
    }
}

/// 画像ファイルとして扱う拡張子か
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.iter().any(|ext| e.eq_ignore_ascii_case(ext)))
}

/// 拡張子がなければ .csv を付ける
pub fn ensure_csv_extension(path: impl Into<PathBuf>) -> PathBuf {
    let mut path = path.into();
    if path.extension().is_none() {
        path.set_extension("csv");
    }
    path
}

/// 記録をCSVファイルに書き出す
pub fn write_csv(path: impl AsRef<Path>, entries: &[LogEntry]) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)
        .with_context(|| format!("CSVファイルの作成に失敗: {:?}", path))?;
    write_csv_to(file, entries)?;

    info!("exported {} entries to {:?}", entries.len(), path);
    Ok(())
}

/// 記録をCSVとして書き出す（ヘッダー行付き）
pub fn write_csv_to<W: Write>(writer: W, entries: &[LogEntry]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    if entries.is_empty() {
        wtr.write_record(["Date", "Systolic_BP", "Diastolic_BP", "Heart_Rate"])?;
    }
    for entry in entries {
        wtr.serialize(CsvRow::from(entry))
            .context("CSV行の書き込みに失敗")?;
    }

    wtr.flush().context("CSVの書き込みに失敗")?;
    Ok(())
}

/// CSVファイルを読み込む
pub fn read_csv(path: impl AsRef<Path>) -> Result<Vec<LogEntry>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .with_context(|| format!("CSVファイルを開けません: {:?}", path))?;
    read_csv_from(file)
}

/// CSVを読み込む（空欄は値なし）
pub fn read_csv_from<R: Read>(reader: R) -> Result<Vec<LogEntry>> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

    rdr.deserialize::<CsvRow>()
        .map(|row| row.map(LogEntry::from).context("CSV行の解析に失敗"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_log_text;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()
    }

    #[test]
    fn writes_header_and_empty_cells() {
        let entries = parse_log_text("04/12/2024 120/80 72\n75", today());
        let mut buf = Vec::new();
        write_csv_to(&mut buf, &entries).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "Date,Systolic_BP,Diastolic_BP,Heart_Rate\n\
             04/12/2024,120,80,72\n\
             03/09/2025,,,75\n"
        );
    }

    #[test]
    fn empty_export_still_has_header() {
        let mut buf = Vec::new();
        write_csv_to(&mut buf, &[]).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Date,Systolic_BP,Diastolic_BP,Heart_Rate\n"
        );
    }

    #[test]
    fn file_round_trip_reproduces_fields() {
        let text = "3/1 128/84 70\n3/2/25 122-79\n131/88 77\n64";
        let entries = parse_log_text(text, today());
        assert_eq!(entries.len(), 4);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        write_csv(&path, &entries).unwrap();

        assert_eq!(read_csv(&path).unwrap(), entries);
    }

    #[test]
    fn log_entry_serializes_directly() {
        let entry = LogEntry {
            date: Some("04/12/2024".to_string()),
            heart_rate: Some("72".to_string()),
            ..LogEntry::default()
        };
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.serialize(&entry).unwrap();
        let text = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert_eq!(text, "date,systolic,diastolic,heart_rate\n04/12/2024,,,72\n");

        let mut rdr = csv::Reader::from_reader(text.as_bytes());
        let back: LogEntry = rdr.deserialize().next().unwrap().unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn malformed_csv_is_an_error() {
        let data = "Date,Systolic_BP\n04/12/2024,120\n";
        assert!(read_csv_from(data.as_bytes()).is_err());
    }

    #[test]
    fn csv_extension_is_added_only_when_missing() {
        assert_eq!(ensure_csv_extension("out/log"), PathBuf::from("out/log.csv"));
        assert_eq!(ensure_csv_extension("out/log.txt"), PathBuf::from("out/log.txt"));
    }

    #[test]
    fn image_extensions_are_case_insensitive() {
        assert!(is_supported_image(Path::new("scan.JPG")));
        assert!(is_supported_image(Path::new("/tmp/page.tiff")));
        assert!(!is_supported_image(Path::new("notes.pdf")));
        assert!(!is_supported_image(Path::new("README")));
    }
}
