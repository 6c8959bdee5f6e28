use chrono::NaiveDate;
use serde::{self, Deserialize, Deserializer};

const FORMAT: &str = "%Y-%m-%d";

/// Deserialize a string starting with "YYYY-MM-DD" into a `NaiveDate`.
///
/// Upstream payloads sometimes carry a time part ("2024-04-05T00:00:00.000"),
/// which is ignored.
pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let (date, remainder) =
        NaiveDate::parse_and_remainder(&s, FORMAT).map_err(serde::de::Error::custom)?;

    if !remainder.is_empty() && !remainder.starts_with(['T', ' ']) {
        return Err(serde::de::Error::custom(format!(
            "unexpected trailing characters in date: {s}"
        )));
    }

    Ok(date)
}
