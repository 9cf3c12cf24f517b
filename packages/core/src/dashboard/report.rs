//! Rendered dashboard output.
//!
//! A [`Report`] is plain data: it serializes to JSON for `--json` and
//! implements `Display` for the terminal view.

use std::fmt;

use serde::Serialize;

use super::sections::Section;
use crate::chain::Chain;

/// One labelled display value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

impl Metric {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "metrics", rename_all = "lowercase")]
pub enum SectionValues {
    Available(Vec<Metric>),
    /// A required call failed; the section shows a marker instead of values.
    Unavailable,
}

impl SectionValues {
    pub fn is_available(&self) -> bool {
        matches!(self, SectionValues::Available(_))
    }

    /// Value shown for `label`, if the section is available and has it.
    pub fn value(&self, label: &str) -> Option<&str> {
        match self {
            SectionValues::Available(metrics) => metrics
                .iter()
                .find(|m| m.label == label)
                .map(|m| m.value.as_str()),
            SectionValues::Unavailable => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionReport {
    pub section: Section,
    pub title: &'static str,
    pub values: SectionValues,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub chain: Chain,
    pub network: &'static str,
    pub sections: Vec<SectionReport>,
    /// One line per failed call of the batch, in request order.
    pub errors: Vec<String>,
}

impl Report {
    pub fn section(&self, section: Section) -> Option<&SectionReport> {
        self.sections.iter().find(|s| s.section == section)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} Node Dashboard", self.network)?;

        for section in &self.sections {
            writeln!(f)?;
            writeln!(f, "== {} ==", section.title)?;
            match &section.values {
                SectionValues::Available(metrics) => {
                    let width = metrics.iter().map(|m| m.label.len()).max().unwrap_or(0);
                    for metric in metrics {
                        writeln!(f, "  {:<width$}  {}", metric.label, metric.value, width = width)?;
                    }
                }
                SectionValues::Unavailable => writeln!(f, "  unavailable")?,
            }
        }

        if !self.errors.is_empty() {
            writeln!(f)?;
            writeln!(f, "Errors:")?;
            for error in &self.errors {
                writeln!(f, "  - {}", error)?;
            }
        }
        Ok(())
    }
}
