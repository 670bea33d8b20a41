//! JSON reports on stdout.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::{self, Write};

/// Command output stamped with its creation time.
#[derive(Debug, Serialize)]
pub struct Report<T> {
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub body: T,
}

impl<T: Serialize> Report<T> {
    pub fn new(body: T) -> Self {
        Self {
            generated_at: Utc::now(),
            body,
        }
    }
}

pub fn write_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, value)
    } else {
        serde_json::to_writer(&mut out, value)
    }
    .context("failed to serialize output")?;
    writeln!(out).context("failed to write output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn report_flattens_body() {
        let report = Report::new(json!({"squares": [], "approach": "strategic"}));
        let value = serde_json::to_value(&report).unwrap();
        assert!(value["generated_at"].is_string());
        assert_eq!(value["approach"], "strategic");
    }
}
