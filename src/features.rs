use std::ops::Range;

/// Supervised view of a close series: row `i` holds the `lags` closes before
/// target `i`, most recent first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LagFeatureMatrix {
    lags: usize,
    features: Vec<Vec<f64>>,
    targets: Vec<f64>,
}

impl LagFeatureMatrix {
    pub fn lags(&self) -> usize {
        self.lags
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.features[i]
    }

    /// Contiguous block of rows, preserving order.
    pub fn slice(&self, rows: Range<usize>) -> LagFeatureMatrix {
        LagFeatureMatrix {
            lags: self.lags,
            features: self.features[rows.clone()].to_vec(),
            targets: self.targets[rows].to_vec(),
        }
    }
}

pub fn make_supervised(series: &[f64], lags: usize) -> LagFeatureMatrix {
    if series.len() <= lags {
        return LagFeatureMatrix {
            lags,
            ..Default::default()
        };
    }
    let n_rows = series.len() - lags;
    let mut features = Vec::with_capacity(n_rows);
    let mut targets = Vec::with_capacity(n_rows);
    for i in lags..series.len() {
        features.push((1..=lags).map(|j| series[i - j]).collect());
        targets.push(series[i]);
    }
    LagFeatureMatrix {
        lags,
        features,
        targets,
    }
}
