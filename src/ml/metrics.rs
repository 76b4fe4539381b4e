//! Evaluation metrics for the track classifier.

/// Confusion counts for a `K`-class classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub n_classes: usize,
    /// Row-major `KxK` counts (`truth * K + predicted`).
    pub counts: Vec<u32>,
}

impl ConfusionMatrix {
    pub fn new(n_classes: usize) -> Self {
        Self {
            n_classes,
            counts: vec![0; n_classes * n_classes],
        }
    }

    /// Count one prediction; out-of-range classes are ignored.
    pub fn add(&mut self, truth: usize, predicted: usize) {
        if truth >= self.n_classes || predicted >= self.n_classes {
            return;
        }
        let idx = truth * self.n_classes + predicted;
        self.counts[idx] = self.counts[idx].saturating_add(1);
    }

    pub fn get(&self, truth: usize, predicted: usize) -> u32 {
        self.counts[truth * self.n_classes + predicted]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&v| v as u64).sum()
    }

    pub fn correct(&self) -> u64 {
        (0..self.n_classes).map(|k| self.get(k, k) as u64).sum()
    }
}

/// Precision and recall for one class.
#[derive(Debug, Clone, PartialEq)]
pub struct PerClassStats {
    pub class: usize,
    /// `TP / (TP + FP)`.
    pub precision: f32,
    /// `TP / (TP + FN)`.
    pub recall: f32,
    /// True examples of the class.
    pub support: u32,
}

/// Per-class precision and recall, skipping classes with no examples or predictions.
pub fn precision_recall_by_class(cm: &ConfusionMatrix) -> Vec<PerClassStats> {
    let k = cm.n_classes;
    let mut stats = Vec::new();
    for class in 0..k {
        let tp = cm.get(class, class) as f32;
        let support: u32 = (0..k).map(|j| cm.get(class, j)).sum();
        let predicted: u32 = (0..k).map(|i| cm.get(i, class)).sum();
        if support == 0 && predicted == 0 {
            continue;
        }
        let precision = if predicted == 0 { 0.0 } else { tp / predicted as f32 };
        let recall = if support == 0 { 0.0 } else { tp / support as f32 };
        stats.push(PerClassStats {
            class,
            precision,
            recall,
            support,
        });
    }
    stats
}

/// Share of correct predictions; zero when nothing was counted.
pub fn accuracy(cm: &ConfusionMatrix) -> f32 {
    match cm.total() {
        0 => 0.0,
        total => cm.correct() as f32 / total as f32,
    }
}
