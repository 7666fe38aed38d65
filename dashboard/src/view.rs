//! Presentation state derived from a [`StatusRecord`].

use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use tracing::warn;

use crate::errors::{Error, Result};
use crate::record::{parse_labels, StatusRecord};

/// Magnitude above which a timestamp is taken to be in milliseconds.
const MILLIS_THRESHOLD: f64 = 1e10;
/// Asia/Seoul has no daylight saving time.
const KST_OFFSET_SECS: i32 = 9 * 60 * 60;
pub const TIME_PLACEHOLDER: &str = "시간 정보 없음";
const NO_RISK: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    /// No record applied yet
    Unknown,
    Normal,
    Hazardous,
}

impl Indicator {
    pub fn from_classification(classification: Option<&str>) -> Self {
        match classification.map(str::trim) {
            Some("1") => Indicator::Hazardous,
            _ => Indicator::Normal,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Indicator::Unknown => "gray.80",
            Indicator::Normal => "gray.30",
            Indicator::Hazardous => "orange.500",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Indicator::Unknown => "Status",
            Indicator::Normal => "Status: 정상",
            Indicator::Hazardous => "Status: 위험",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub caption: String,
    pub labels: Vec<String>,
    pub indicator: Indicator,
    pub indicator_color: String,
    pub indicator_label: String,
    pub risk_level: String,
    pub current_time_formatted: String,
    pub image_url: String,
}

impl Default for ViewState {
    fn default() -> Self {
        let indicator = Indicator::Unknown;
        Self {
            caption: String::new(),
            labels: Vec::new(),
            indicator,
            indicator_color: indicator.color().into(),
            indicator_label: indicator.label().into(),
            risk_level: risk_level_text(None),
            current_time_formatted: TIME_PLACEHOLDER.into(),
            image_url: String::new(),
        }
    }
}

/// Turns status records into view states. Holds the content-delivery base
/// URL, the only configuration the projection needs.
#[derive(Debug, Clone)]
pub struct Projector {
    cdn_base: String,
}

impl Projector {
    pub fn new(cdn_base: impl Into<String>) -> Self {
        Self {
            cdn_base: cdn_base.into(),
        }
    }

    /// Fails only on malformed labels; a bad timestamp degrades to the
    /// placeholder.
    pub fn project(&self, record: &StatusRecord) -> Result<ViewState> {
        let labels = match record.rekognition_labels.as_deref() {
            Some(raw) => parse_labels(raw)?,
            None => return Err(Error::MalformedLabels("labels are missing".into())),
        };

        let indicator = Indicator::from_classification(record.classification.as_deref());

        Ok(ViewState {
            caption: record.caption.clone().unwrap_or_default(),
            labels,
            indicator,
            indicator_color: indicator.color().into(),
            indicator_label: indicator.label().into(),
            risk_level: risk_level_text(record.risk_level.as_deref()),
            current_time_formatted: format_timestamp(record.timestamp.as_deref()),
            image_url: record
                .s3_location
                .as_deref()
                .map(|location| derive_image_url(&self.cdn_base, location))
                .unwrap_or_default(),
        })
    }
}

pub fn derive_image_url(cdn_base: &str, s3_location: &str) -> String {
    let file_name = s3_location.split('/').last().unwrap_or_default();
    format!("{}images/{}", cdn_base, file_name)
}

pub fn risk_level_text(risk_level: Option<&str>) -> String {
    let risk = risk_level
        .map(str::trim)
        .filter(|risk| !risk.is_empty())
        .unwrap_or(NO_RISK);
    format!("{} / 10", risk)
}

/// Seconds since epoch for a raw timestamp of ambiguous unit.
pub fn effective_epoch_seconds(raw: f64) -> f64 {
    if raw.abs() > MILLIS_THRESHOLD {
        (raw / 1000.0).floor()
    } else {
        raw
    }
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::TimestampParse(raw.to_string()))?;
    if !value.is_finite() {
        return Err(Error::TimestampParse(raw.to_string()));
    }

    let seconds = effective_epoch_seconds(value);
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9) as u32;
    let utc = DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
        .ok_or_else(|| Error::TimestampParse(raw.to_string()))?;
    let kst = FixedOffset::east_opt(KST_OFFSET_SECS)
        .ok_or_else(|| Error::TimestampParse(raw.to_string()))?;

    Ok(utc.with_timezone(&kst))
}

/// Korean locale rendering, e.g. `2024. 12. 31. 오전 8:06:40`.
pub fn format_korean(time: &DateTime<FixedOffset>) -> String {
    let (is_pm, hour) = time.hour12();
    format!(
        "{}. {}. {}. {} {}:{:02}:{:02}",
        time.year(),
        time.month(),
        time.day(),
        if is_pm { "오후" } else { "오전" },
        hour,
        time.minute(),
        time.second()
    )
}

pub fn format_timestamp(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return TIME_PLACEHOLDER.into();
    };

    match parse_timestamp(raw) {
        Ok(time) => format_korean(&time),
        Err(err) => {
            warn!("{}", err);
            TIME_PLACEHOLDER.into()
        }
    }
}
