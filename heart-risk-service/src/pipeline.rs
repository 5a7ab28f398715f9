use std::sync::Arc;

use tracing::{debug, info};

use crate::classifier::RiskPredictor;
use crate::error::ReportError;
use crate::generation::ReportGenerator;
use crate::models::{PredictedLabel, ResponsePayload, SymptomInput};
use crate::symptoms::format_symptoms;

/// Predict, summarise, prompt, generate. One pass per request, no retries.
#[derive(Clone)]
pub struct ReportPipeline {
    predictor: RiskPredictor,
    generator: Arc<dyn ReportGenerator>,
}

impl ReportPipeline {
    pub fn new(predictor: RiskPredictor, generator: Arc<dyn ReportGenerator>) -> Self {
        Self {
            predictor,
            generator,
        }
    }

    pub async fn run(&self, input: &SymptomInput) -> Result<ResponsePayload, ReportError> {
        let prediction = self.predictor.predict(input)?;
        info!(%prediction, "Heart risk prediction computed");

        let summary = format_symptoms(input);
        let prompt = build_prompt(&summary, prediction);
        debug!(prompt_chars = prompt.len(), "Built report prompt");

        let report = self.generator.generate(&prompt).await?;
        info!(report_chars = report.len(), "Report generated");

        Ok(ResponsePayload { prediction, report })
    }
}

pub fn build_prompt(summary: &str, prediction: PredictedLabel) -> String {
    format!(
        "The user has provided the following symptoms:\n{summary}\n\
         Based on these symptoms, a machine learning model predicts that the user is '{prediction}' for heart disease.\n\
         1. Explain why the user is '{prediction}', referring to the specific symptoms they provided. \
         If they are at risk, also explain what they can do to keep their heart healthy.\n\
         2. Suggest a diet specific to South Asia that supports heart health.\n\
         3. For each symptom the user answered 'Yes' to, explain how to manage it or recover from it.\n\
         4. Finish with general heart health advice."
    )
}
