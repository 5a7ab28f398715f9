//! In-process doubles for the classifier and generation seams.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::classifier::{FeatureVector, RiskClassifier};
use crate::error::ReportError;
use crate::generation::ReportGenerator;
use crate::models::SymptomInput;

pub fn scenario_input() -> SymptomInput {
    SymptomInput {
        pain_arms_jaw_back: 1.0,
        age: 55.0,
        cold_sweats_nausea: 0.0,
        chest_pain: 1.0,
        fatigue: 1.0,
        dizziness: 0.0,
        swelling: 0.0,
        shortness_of_breath: 1.0,
        palpitations: 0.0,
        sedentary_lifestyle: 1.0,
    }
}

pub struct FixedClassifier {
    class: u8,
    last: Mutex<Option<FeatureVector>>,
}

impl FixedClassifier {
    pub fn new(class: u8) -> Self {
        Self {
            class,
            last: Mutex::new(None),
        }
    }

    pub fn last_features(&self) -> Option<FeatureVector> {
        *self.last.lock().unwrap()
    }
}

impl RiskClassifier for FixedClassifier {
    fn predict(&self, features: &FeatureVector) -> anyhow::Result<u8> {
        *self.last.lock().unwrap() = Some(*features);
        Ok(self.class)
    }
}

pub struct FailingClassifier;

impl RiskClassifier for FailingClassifier {
    fn predict(&self, _features: &FeatureVector) -> anyhow::Result<u8> {
        anyhow::bail!("input shape mismatch")
    }
}

pub struct RecordingGenerator {
    outcome: Result<String, u16>,
    last_prompt: Mutex<Option<String>>,
}

impl RecordingGenerator {
    pub fn replying(report: &str) -> Self {
        Self {
            outcome: Ok(report.to_string()),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            outcome: Err(status),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReportGenerator for RecordingGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ReportError> {
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        match &self.outcome {
            Ok(report) => Ok(report.clone()),
            Err(status) => Err(ReportError::Upstream {
                status: *status,
                body: "upstream unavailable".to_string(),
            }),
        }
    }
}
