//! 日付抽出モジュール

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// 04/12/2024, 4-12-24 など年付きの日付
static FULL_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})[/-](\d{1,2})[/-](\d{4}|\d{2})\b").unwrap()
});

/// 04/12 など年なしの日付
static SHORT_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})[/-](\d{1,2})\b").unwrap());

/// 行内で見つかった日付
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateMatch {
    /// 正規化済みの日付 (M/D/YYYY、各要素は元の表記のまま)
    pub date: String,
    /// 行内でのバイト範囲（血圧・心拍の検索から除外する）
    pub span: Range<usize>,
}

/// 行から日付を抽出
/// 優先順位: 年付き > 年なし（今年を補う）
pub fn extract_date(line: &str, today: NaiveDate) -> Option<DateMatch> {
    if let Some(found) = extract_full_date(line) {
        return Some(found);
    }

    extract_short_date(line, today.year())
}

/// 日付が見つからなかった行に使う日付 (MM/DD/YYYY)
pub fn default_date(today: NaiveDate) -> String {
    today.format("%m/%d/%Y").to_string()
}

fn extract_full_date(line: &str) -> Option<DateMatch> {
    FULL_DATE_RE.captures_iter(line).find_map(|caps| {
        let first = caps.get(1)?.as_str();
        let second = caps.get(2)?.as_str();
        if !is_plausible(first, second) {
            return None;
        }

        // 2桁の年は 20xx とみなす
        let year = caps.get(3)?.as_str();
        let year = if year.len() == 2 {
            format!("20{}", year)
        } else {
            year.to_string()
        };

        Some(DateMatch {
            date: format!("{}/{}/{}", first, second, year),
            span: caps.get(0)?.range(),
        })
    })
}

fn extract_short_date(line: &str, year: i32) -> Option<DateMatch> {
    SHORT_DATE_RE.captures_iter(line).find_map(|caps| {
        let first = caps.get(1)?.as_str();
        let second = caps.get(2)?.as_str();
        if !is_plausible(first, second) {
            return None;
        }

        Some(DateMatch {
            date: format!("{}/{}/{}", first, second, year),
            span: caps.get(0)?.range(),
        })
    })
}

/// 月/日 の順序は曖昧なので、両方が 1..=31 で片方が 12 以下なら日付とみなす
fn is_plausible(first: &str, second: &str) -> bool {
    let (Ok(a), Ok(b)) = (first.parse::<u32>(), second.parse::<u32>()) else {
        return false;
    };

    (1..=31).contains(&a) && (1..=31).contains(&b) && a.min(b) <= 12
}
