//! テキスト解析モジュール - 血圧記録の抽出

mod date;
mod vitals;

pub use date::{default_date, extract_date, DateMatch};
pub use vitals::{
    extract_vitals, BloodPressure, Vitals, DIASTOLIC_RANGE, HEART_RATE_RANGE, SYSTOLIC_RANGE,
};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// 記録の1行から抽出された情報
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// 測定日 (M/D/YYYY形式)
    pub date: Option<String>,
    /// 最高血圧
    pub systolic: Option<String>,
    /// 最低血圧
    pub diastolic: Option<String>,
    /// 心拍数
    pub heart_rate: Option<String>,
}

impl LogEntry {
    /// OCRテキストを解析（日付がない行は今日の日付）
    pub fn parse(text: &str) -> Vec<Self> {
        parse_log_text(text, Local::now().date_naive())
    }
}

/// OCRテキストを行ごとに解析
///
/// 1行を1件の記録とみなす。血圧か心拍数が見つかった行だけが結果に含まれる。
pub fn parse_log_text(text: &str, today: NaiveDate) -> Vec<LogEntry> {
    text.lines()
        .filter_map(|line| parse_line(line, today))
        .collect()
}

/// 1行を解析
pub fn parse_line(line: &str, today: NaiveDate) -> Option<LogEntry> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let date = extract_date(line, today);
    let vitals = extract_vitals(line, date.as_ref().map(|d| &d.span));
    if vitals.is_empty() {
        return None;
    }

    let (systolic, diastolic) = match vitals.blood_pressure {
        Some(bp) => (Some(bp.systolic), Some(bp.diastolic)),
        None => (None, None),
    };

    Some(LogEntry {
        date: Some(date.map_or_else(|| default_date(today), |d| d.date)),
        systolic,
        diastolic,
        heart_rate: vitals.heart_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()
    }

    fn entry(date: &str, sys: Option<&str>, dia: Option<&str>, hr: Option<&str>) -> LogEntry {
        LogEntry {
            date: Some(date.to_string()),
            systolic: sys.map(str::to_string),
            diastolic: dia.map(str::to_string),
            heart_rate: hr.map(str::to_string),
        }
    }

    #[test]
    fn full_line_yields_all_fields() {
        let entries = parse_log_text("04/12/2024 120/80 72", today());
        assert_eq!(
            entries,
            vec![entry("04/12/2024", Some("120"), Some("80"), Some("72"))]
        );
    }

    #[test]
    fn implausible_blood_pressure_yields_no_fields() {
        assert!(parse_log_text("300/80", today()).is_empty());

        let entries = parse_log_text("300/80 70", today());
        assert_eq!(entries, vec![entry("03/09/2025", None, None, Some("70"))]);
    }

    #[test]
    fn two_digit_year_is_normalized() {
        let entries = parse_log_text("04/12/24 118/79", today());
        assert_eq!(entries[0].date.as_deref(), Some("04/12/2024"));
    }

    #[test]
    fn heart_rate_matching_a_pressure_value_is_dropped() {
        let entries = parse_log_text("04/12/2024 120/80 80", today());
        assert_eq!(entries, vec![entry("04/12/2024", Some("120"), Some("80"), None)]);

        assert!(parse_log_text("300/80 80", today()).is_empty());
    }

    #[test]
    fn lone_heart_rate_gets_today() {
        let entries = parse_log_text("75", today());
        assert_eq!(entries, vec![entry("03/09/2025", None, None, Some("75"))]);
    }

    #[test]
    fn lines_without_digits_are_dropped() {
        assert!(parse_log_text("Date  BP  Pulse\n\n   \nmorning", today()).is_empty());
    }

    #[test]
    fn a_date_alone_is_not_an_entry() {
        assert!(parse_log_text("04/12/2024", today()).is_empty());
    }

    #[test]
    fn multi_line_page_keeps_order() {
        let text = "Date BP HR\r\n\
                    3/1 128/84 70\r\n\
                    3/2/25 122-79\r\n\
                    noise\r\n\
                    131/88 77\r\n";
        let entries = parse_log_text(text, today());
        assert_eq!(
            entries,
            vec![
                entry("3/1/2025", Some("128"), Some("84"), Some("70")),
                entry("3/2/2025", Some("122"), Some("79"), None),
                entry("03/09/2025", Some("131"), Some("88"), Some("77")),
            ]
        );
    }
}
