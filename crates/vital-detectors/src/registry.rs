use std::collections::HashMap;
use std::sync::Arc;

use monitor_core::{Detector, MonitorError};

use crate::combined::CombinedDetector;
use crate::ecg::EcgAnomalyDetector;
use crate::manual::ManualDetector;
use crate::rapid_drop::RapidDropDetector;
use crate::threshold::ThresholdDetector;
use crate::trend::TrendDetector;

/// Category-keyed detector set with a stable evaluation order.
///
/// Keys are lowercase; unknown and duplicate keys are construction-time
/// errors, never silent fallbacks.
pub struct DetectorRegistry {
    detectors: Vec<Arc<dyn Detector>>,
    by_category: HashMap<&'static str, usize>,
}

impl DetectorRegistry {
    pub fn empty() -> Self {
        Self {
            detectors: Vec::new(),
            by_category: HashMap::new(),
        }
    }

    /// The standard six-detector set, in evaluation order.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.insert(Arc::new(ThresholdDetector::new()));
        registry.insert(Arc::new(TrendDetector::new()));
        registry.insert(Arc::new(RapidDropDetector::new()));
        registry.insert(Arc::new(EcgAnomalyDetector::new()));
        registry.insert(Arc::new(CombinedDetector::new()));
        registry.insert(Arc::new(ManualDetector::new()));
        registry
    }

    /// Add a detector; a duplicate category is rejected.
    pub fn register(&mut self, detector: Arc<dyn Detector>) -> Result<(), MonitorError> {
        if self.by_category.contains_key(detector.category()) {
            return Err(MonitorError::DuplicateCategory(
                detector.category().to_string(),
            ));
        }
        self.insert(detector);
        Ok(())
    }

    fn insert(&mut self, detector: Arc<dyn Detector>) {
        self.by_category
            .insert(detector.category(), self.detectors.len());
        self.detectors.push(detector);
    }

    /// Look up a detector by category key, case-insensitively.
    pub fn get(&self, category: &str) -> Result<&Arc<dyn Detector>, MonitorError> {
        let key = category.to_lowercase();
        self.by_category
            .get(key.as_str())
            .map(|&index| &self.detectors[index])
            .ok_or_else(|| MonitorError::UnknownCategory(category.to_string()))
    }

    /// Detectors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Detector>> {
        self.detectors.iter()
    }

    pub fn categories(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.category()).collect()
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
