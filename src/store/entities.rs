use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde::Serialize;

/// A persisted, immutable completed activity entry. Field names map onto the
/// session table's historical header row, so existing files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(rename = "Activity")]
    pub activity: String,
    #[serde(rename = "Start Time", with = "timestamp_ser")]
    pub start_time: NaiveDateTime,
    #[serde(rename = "End Time", with = "timestamp_ser")]
    pub end_time: NaiveDateTime,
    /// Derived once at stop time as elapsed seconds / 3600 and persisted,
    /// never recomputed on read.
    #[serde(rename = "Duration")]
    pub duration_hours: f64,
    #[serde(rename = "Notes")]
    pub notes: String,
}

impl SessionRecord {
    /// Calendar day the session started on, which is what reports and the
    /// chart group by.
    pub fn start_date(&self) -> NaiveDate {
        self.start_time.date()
    }

    pub fn elapsed(&self) -> Duration {
        self.end_time - self.start_time
    }
}

mod timestamp_ser {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    use crate::utils::time::TIMESTAMP_FORMAT;

    pub fn serialize<S>(moment: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&moment.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}
