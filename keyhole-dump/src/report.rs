//! Saved dump reports.

use std::io::{BufWriter, Write};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use keyhole_core::error::GenericError;

use crate::page::Page;

/// A series of dump pages captured in one session, serializable so runs
/// can be archived and diffed later.
#[derive(Serialize, Deserialize, Debug)]
pub struct DumpReport {
    /// Function key the pages were produced by.
    pub key: String,
    /// When the report was started.
    pub created: DateTime<Utc>,
    /// Captured pages, in order.
    pub pages: Vec<Page>,
}

impl DumpReport {

    /// An empty report for the given key.
    pub fn new(key: &str) -> Self {
        DumpReport {
            key: key.to_string(),
            created: Utc::now(),
            pages: Vec::new(),
        }
    }

    /// Append one captured page.
    pub fn push(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Save the report as JSON.
    pub fn save<P>(&self, path: P) -> Result<(), GenericError>
    where P: AsRef<std::path::Path>
    {
        let mut fp = BufWriter::new(std::fs::File::create(&path)?);
        let data = serde_json::to_vec_pretty(&self)?;
        fp.write_all(&data)?;
        Ok(())
    }

    /// Load a report saved with [`save`](DumpReport::save).
    pub fn load<P>(path: P) -> Result<Self, GenericError>
    where P: AsRef<std::path::Path>
    {
        let input_str = std::fs::read_to_string(&path)?;
        let input = serde_json::from_str(&input_str)?;
        Ok(input)
    }

}

impl FromStr for DumpReport {
    type Err = GenericError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let report = serde_json::from_str(s)?;
        Ok(report)
    }
}
