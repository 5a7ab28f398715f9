use serde::{Deserialize, Serialize};
use std::fmt;

use crate::classifier::FeatureVector;
use crate::symptoms::Feature;

/// Symptom questionnaire submitted by the frontend.
///
/// Indicator fields are conventionally 0 or 1, but any number is accepted
/// (`1` and `1.0` alike); only a value equal to 1 counts as "Yes" when the
/// summary is rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomInput {
    pub pain_arms_jaw_back: f64,
    pub age: f64,
    pub cold_sweats_nausea: f64,
    pub chest_pain: f64,
    pub fatigue: f64,
    pub dizziness: f64,
    pub swelling: f64,
    pub shortness_of_breath: f64,
    pub palpitations: f64,
    pub sedentary_lifestyle: f64,
}

impl SymptomInput {
    pub fn value(&self, feature: Feature) -> f64 {
        match feature {
            Feature::PainArmsJawBack => self.pain_arms_jaw_back,
            Feature::Age => self.age,
            Feature::ColdSweatsNausea => self.cold_sweats_nausea,
            Feature::ChestPain => self.chest_pain,
            Feature::Fatigue => self.fatigue,
            Feature::Dizziness => self.dizziness,
            Feature::Swelling => self.swelling,
            Feature::ShortnessOfBreath => self.shortness_of_breath,
            Feature::Palpitations => self.palpitations,
            Feature::SedentaryLifestyle => self.sedentary_lifestyle,
        }
    }

    /// Classifier input in canonical feature order.
    pub fn feature_vector(&self) -> FeatureVector {
        Feature::ALL.map(|feature| self.value(feature) as f32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictedLabel {
    #[serde(rename = "At Risk")]
    AtRisk,
    #[serde(rename = "Not at Risk")]
    NotAtRisk,
}

impl PredictedLabel {
    pub fn from_class(class: u8) -> Self {
        if class == 1 {
            PredictedLabel::AtRisk
        } else {
            PredictedLabel::NotAtRisk
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PredictedLabel::AtRisk => "At Risk",
            PredictedLabel::NotAtRisk => "Not at Risk",
        }
    }
}

impl fmt::Display for PredictedLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsePayload {
    pub prediction: PredictedLabel,
    pub report: String,
}
