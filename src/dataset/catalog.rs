use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Dataset;

/// How many output classes the classifier gets when tracks were skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassSizing {
    /// One class per candidate file; skipped tracks keep an untrained class.
    #[default]
    FileCount,
    /// One class per processed track; labels are renumbered without gaps.
    Processed,
}

/// One catalog row mapping a class index back to its track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackEntry {
    pub label: usize,
    pub file_name: String,
    /// False when the track was skipped and its class never saw a sample.
    pub trained: bool,
}

/// Class index to track name table written next to the model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackCatalog {
    pub tracks: Vec<TrackEntry>,
}

impl TrackCatalog {
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn entry(&self, label: usize) -> Option<&TrackEntry> {
        self.tracks.iter().find(|entry| entry.label == label)
    }

    pub fn file_name(&self, label: usize) -> Option<&str> {
        self.entry(label).map(|entry| entry.file_name.as_str())
    }
}

/// Classifier width, training labels, and the matching catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelPlan {
    pub num_classes: usize,
    /// Label per dataset row, in the numbering the classifier is trained on.
    pub labels: Vec<usize>,
    pub catalog: TrackCatalog,
}

/// Decide the classifier width and label numbering for `dataset`.
pub fn plan_labels(dataset: &Dataset, sizing: ClassSizing) -> LabelPlan {
    match sizing {
        ClassSizing::FileCount => {
            let trained: Vec<bool> = {
                let mut flags = vec![false; dataset.file_names.len()];
                for &label in &dataset.labels {
                    flags[label] = true;
                }
                flags
            };
            let tracks = dataset
                .file_names
                .iter()
                .enumerate()
                .map(|(label, file_name)| TrackEntry {
                    label,
                    file_name: file_name.clone(),
                    trained: trained[label],
                })
                .collect();
            LabelPlan {
                num_classes: dataset.file_names.len(),
                labels: dataset.labels.clone(),
                catalog: TrackCatalog { tracks },
            }
        }
        ClassSizing::Processed => {
            let mut remap = BTreeMap::new();
            for &label in &dataset.labels {
                let next = remap.len();
                remap.entry(label).or_insert(next);
            }
            let labels = dataset.labels.iter().map(|label| remap[label]).collect();
            let mut tracks: Vec<TrackEntry> = remap
                .iter()
                .map(|(&original, &label)| TrackEntry {
                    label,
                    file_name: dataset.file_names[original].clone(),
                    trained: true,
                })
                .collect();
            tracks.sort_by_key(|entry| entry.label);
            LabelPlan {
                num_classes: remap.len(),
                labels,
                catalog: TrackCatalog { tracks },
            }
        }
    }
}
