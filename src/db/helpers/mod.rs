use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};

use crate::db::models::Priority;

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_priority(value: &str) -> Result<Priority> {
    match value {
        "LOW" => Ok(Priority::Low),
        "MEDIUM" => Ok(Priority::Medium),
        "HIGH" => Ok(Priority::High),
        other => Err(anyhow!("unknown task priority {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_text_round_trips() {
        for priority in [Priority::Low, Priority::Medium, Priority::High] {
            assert_eq!(parse_priority(priority.as_str()).unwrap(), priority);
        }
        assert!(parse_priority("URGENT").is_err());
    }

    #[test]
    fn datetime_errors_name_the_field() {
        let err = parse_datetime("yesterday", "created_at").unwrap_err();
        assert!(err.to_string().contains("created_at"));
    }
}
