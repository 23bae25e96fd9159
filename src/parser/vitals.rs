//! 血圧・心拍抽出モジュール

use regex::Regex;
use std::ops::{Range, RangeInclusive};
use std::sync::LazyLock;

/// 120/80 または 120-80
static BP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{2,3})[/-](\d{2,3})\b").unwrap());

/// 単独の2〜3桁の数値
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{2,3}\b").unwrap());

/// 最高血圧の妥当範囲 (mmHg)
pub const SYSTOLIC_RANGE: RangeInclusive<u32> = 70..=250;
/// 最低血圧の妥当範囲 (mmHg)
pub const DIASTOLIC_RANGE: RangeInclusive<u32> = 40..=150;
/// 心拍数の妥当範囲 (bpm)
pub const HEART_RATE_RANGE: RangeInclusive<u32> = 40..=200;

/// 血圧の読み取り値
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloodPressure {
    pub systolic: String,
    pub diastolic: String,
}

/// 1行から抽出されたバイタル
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vitals {
    pub blood_pressure: Option<BloodPressure>,
    pub heart_rate: Option<String>,
}

impl Vitals {
    pub fn is_empty(&self) -> bool {
        self.blood_pressure.is_none() && self.heart_rate.is_none()
    }
}

/// 行から血圧と心拍数を抽出
///
/// `date_span` は日付として使われた範囲で、ここに含まれる数値は無視する。
/// 血圧の形をした候補（範囲外で棄却されたものも含む）の数値は心拍数にしない。
/// 最初の候補の上下の値と同じ数値も心拍数にしない。
pub fn extract_vitals(line: &str, date_span: Option<&Range<usize>>) -> Vitals {
    let in_date = |span: &Range<usize>| date_span.is_some_and(|d| overlaps(d, span));

    let mut blood_pressure = None;
    let mut bp_spans: Vec<Range<usize>> = Vec::new();
    let mut bp_values: Vec<u32> = Vec::new();

    for caps in BP_RE.captures_iter(line) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let span = whole.range();
        if in_date(&span) {
            continue;
        }
        if bp_spans.is_empty() {
            bp_values.extend(
                [caps.get(1), caps.get(2)]
                    .into_iter()
                    .flatten()
                    .filter_map(|m| m.as_str().parse::<u32>().ok()),
            );
        }
        bp_spans.push(span);

        if blood_pressure.is_none() {
            blood_pressure = plausible_blood_pressure(
                caps.get(1).map(|m| m.as_str()),
                caps.get(2).map(|m| m.as_str()),
            );
        }
    }

    let heart_rate = NUMBER_RE
        .find_iter(line)
        .filter(|m| {
            let span = m.range();
            !in_date(&span) && !bp_spans.iter().any(|bp| overlaps(bp, &span))
        })
        .find_map(|m| {
            let value: u32 = m.as_str().parse().ok()?;
            (HEART_RATE_RANGE.contains(&value) && !bp_values.contains(&value))
                .then(|| m.as_str().to_string())
        });

    Vitals {
        blood_pressure,
        heart_rate,
    }
}

fn plausible_blood_pressure(
    systolic: Option<&str>,
    diastolic: Option<&str>,
) -> Option<BloodPressure> {
    let (systolic, diastolic) = (systolic?, diastolic?);
    let sys: u32 = systolic.parse().ok()?;
    let dia: u32 = diastolic.parse().ok()?;

    if SYSTOLIC_RANGE.contains(&sys) && DIASTOLIC_RANGE.contains(&dia) {
        Some(BloodPressure {
            systolic: systolic.to_string(),
            diastolic: diastolic.to_string(),
        })
    } else {
        None
    }
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}
