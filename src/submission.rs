//! Host-side handling of a submitted output blob.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::config::AnnotationConfig;
use crate::error::{Error, Result};
use crate::model::SavedState;
use crate::serialize::Snapshot;

/// A submission with every image reduced to its bare base64 payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParsedSubmission {
    pub canvas: String,
    #[serde(rename = "savedState")]
    pub saved_state: SavedState,
    /// Cropped images keyed by `annotation_name`.
    pub annotations: BTreeMap<String, String>,
}

fn strip_data_url(url: &str) -> Result<String> {
    url.split_once(',')
        .map(|(_, payload)| payload.to_string())
        .ok_or_else(|| Error::Submission("image is not a data URL".to_string()))
}

impl ParsedSubmission {
    pub fn parse(raw: &str) -> Result<Self> {
        let snapshot: Snapshot =
            serde_json::from_str(raw).map_err(|err| Error::Submission(err.to_string()))?;
        let annotations = snapshot
            .rectangles
            .iter()
            .map(|(name, url)| Ok((name.clone(), strip_data_url(url)?)))
            .collect::<Result<BTreeMap<_, _>>>()?;
        Ok(Self {
            canvas: strip_data_url(&snapshot.canvas)?,
            saved_state: snapshot.saved_state,
            annotations,
        })
    }

    /// Fails with the labels of every required type that was not placed.
    pub fn check_required(&self, configs: &[AnnotationConfig]) -> Result<()> {
        let placed: HashSet<&str> = self
            .saved_state
            .annotations
            .iter()
            .map(|a| a.kind.as_str())
            .collect();
        let missing: Vec<String> = configs
            .iter()
            .filter(|c| c.required && !placed.contains(c.kind.as_str()))
            .map(|c| c.label.clone())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::MissingRequired(missing))
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
