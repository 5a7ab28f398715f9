//! Symptom features and the plain-text summary embedded in the report prompt.

use crate::models::SymptomInput;

/// The ten questionnaire features, declared in the order the classifier was
/// trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    PainArmsJawBack,
    Age,
    ColdSweatsNausea,
    ChestPain,
    Fatigue,
    Dizziness,
    Swelling,
    ShortnessOfBreath,
    Palpitations,
    SedentaryLifestyle,
}

impl Feature {
    pub const ALL: [Feature; 10] = [
        Feature::PainArmsJawBack,
        Feature::Age,
        Feature::ColdSweatsNausea,
        Feature::ChestPain,
        Feature::Fatigue,
        Feature::Dizziness,
        Feature::Swelling,
        Feature::ShortnessOfBreath,
        Feature::Palpitations,
        Feature::SedentaryLifestyle,
    ];

    /// Field name used on the wire.
    pub const fn key(self) -> &'static str {
        match self {
            Feature::PainArmsJawBack => "pain_arms_jaw_back",
            Feature::Age => "age",
            Feature::ColdSweatsNausea => "cold_sweats_nausea",
            Feature::ChestPain => "chest_pain",
            Feature::Fatigue => "fatigue",
            Feature::Dizziness => "dizziness",
            Feature::Swelling => "swelling",
            Feature::ShortnessOfBreath => "shortness_of_breath",
            Feature::Palpitations => "palpitations",
            Feature::SedentaryLifestyle => "sedentary_lifestyle",
        }
    }

    pub fn display_name(self) -> String {
        title_case(self.key())
    }
}

/// `shortness_of_breath` -> `Shortness Of Breath`
pub fn title_case(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render one line per feature, e.g. `Age: 55` or `Chest Pain: Yes`.
///
/// Indicators other than exactly 1 render as `No`; values are not validated.
pub fn format_symptoms(input: &SymptomInput) -> String {
    Feature::ALL
        .iter()
        .map(|&feature| format_line(feature, input.value(feature)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_line(feature: Feature, value: f64) -> String {
    match feature {
        Feature::Age => format!("Age: {}", value),
        _ => {
            let answer = if value == 1.0 { "Yes" } else { "No" };
            format!("{}: {}", feature.display_name(), answer)
        }
    }
}
