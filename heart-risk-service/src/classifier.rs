//! Risk predictor backed by a pre-trained ONNX binary classifier.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, bail};
use tract_onnx::prelude::*;
use tracing::{debug, info};

use crate::error::ReportError;
use crate::models::{PredictedLabel, SymptomInput};

pub const FEATURE_COUNT: usize = 10;

pub type FeatureVector = [f32; FEATURE_COUNT];

/// Binary classifier over the canonical feature vector. Returns class 0 or 1.
pub trait RiskClassifier: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> anyhow::Result<u8>;
}

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Classifier exported from the training pipeline as ONNX.
///
/// Scikit-learn exports put an `i64` label tensor first; models exporting a
/// single `f32` score are thresholded at 0.5.
pub struct OnnxRiskModel {
    plan: OnnxPlan,
}

impl OnnxRiskModel {
    pub fn load(model_path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let model_path = model_path.as_ref();
        let plan = tract_onnx::onnx()
            .model_for_path(model_path)
            .with_context(|| format!("failed to read classifier at {}", model_path.display()))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, FEATURE_COUNT)),
            )?
            .into_optimized()?
            .into_runnable()?;

        info!("Loaded heart risk classifier from {}", model_path.display());
        Ok(Self { plan })
    }
}

impl RiskClassifier for OnnxRiskModel {
    fn predict(&self, features: &FeatureVector) -> anyhow::Result<u8> {
        let input = Tensor::from_shape(&[1, FEATURE_COUNT], features)?;
        let outputs = self.plan.run(tvec!(input.into()))?;
        let output = outputs.first().context("classifier produced no outputs")?;
        class_from_output(output)
    }
}

/// Map the classifier's first output tensor to class 0 or 1.
fn class_from_output(output: &Tensor) -> anyhow::Result<u8> {
    let class = if output.datum_type() == i64::datum_type() {
        let label = *output
            .to_array_view::<i64>()?
            .iter()
            .next()
            .context("classifier label output is empty")?;
        u8::from(label == 1)
    } else if output.datum_type() == f32::datum_type() {
        let score = *output
            .to_array_view::<f32>()?
            .iter()
            .next()
            .context("classifier score output is empty")?;
        u8::from(score >= 0.5)
    } else {
        bail!("unsupported classifier output type {:?}", output.datum_type());
    };

    Ok(class)
}

/// Shared, read-only predictor. Inference runs inline on the calling task.
#[derive(Clone)]
pub struct RiskPredictor {
    classifier: Arc<dyn RiskClassifier>,
}

impl RiskPredictor {
    pub fn new(classifier: Arc<dyn RiskClassifier>) -> Self {
        Self { classifier }
    }

    pub fn load(model_path: impl AsRef<Path>) -> anyhow::Result<Self> {
        Ok(Self::new(Arc::new(OnnxRiskModel::load(model_path)?)))
    }

    pub fn predict(&self, input: &SymptomInput) -> Result<PredictedLabel, ReportError> {
        let features = input.feature_vector();
        let class = self
            .classifier
            .predict(&features)
            .map_err(|e| ReportError::Inference(format!("{:#}", e)))?;

        debug!(?features, class, "classifier output");
        Ok(PredictedLabel::from_class(class))
    }
}
