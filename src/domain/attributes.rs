//! Patient attribute vector for diabetes risk scoring.
//!
//! Based on the eight columns of the Pima Indians diabetes dataset. The field
//! order here is the order the trained scaler and classifier were fitted on.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ScoringError;

/// Number of attributes the trained artifacts expect.
pub const NUM_FEATURES: usize = 8;

/// Canonical attribute order shared by the normalizer and the classifier.
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "Pregnancies",
    "Glucose",
    "BloodPressure",
    "SkinThickness",
    "Insulin",
    "BMI",
    "DiabetesPedigreeFunction",
    "Age",
];

/// One patient's raw inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeVector {
    /// Number of pregnancies (0-20 on the input form)
    #[serde(rename = "Pregnancies")]
    pub pregnancies: u32,

    /// Plasma glucose concentration (0-250)
    #[serde(rename = "Glucose")]
    pub glucose: f64,

    /// Diastolic blood pressure in mm Hg (0-140)
    #[serde(rename = "BloodPressure")]
    pub blood_pressure: f64,

    /// Triceps skin fold thickness in mm (0-99)
    #[serde(rename = "SkinThickness")]
    pub skin_thickness: f64,

    /// 2-hour serum insulin in mu U/ml (0-850)
    #[serde(rename = "Insulin")]
    pub insulin: f64,

    /// Body mass index (0.0-67.0)
    #[serde(rename = "BMI")]
    pub bmi: f64,

    /// Dataset-defined family history score (0.0-2.5)
    #[serde(rename = "DiabetesPedigreeFunction")]
    pub diabetes_pedigree: f64,

    /// Age in years (1-120)
    #[serde(rename = "Age")]
    pub age: u32,
}

impl Default for AttributeVector {
    /// The initial values of the input form.
    fn default() -> Self {
        Self {
            pregnancies: 0,
            glucose: 120.0,
            blood_pressure: 70.0,
            skin_thickness: 20.0,
            insulin: 120.0,
            bmi: 32.0,
            diabetes_pedigree: 0.50,
            age: 30,
        }
    }
}

impl AttributeVector {
    /// Values in canonical order (see [`FEATURE_NAMES`]).
    #[must_use]
    pub fn to_array(&self) -> [f64; NUM_FEATURES] {
        [
            f64::from(self.pregnancies),
            self.glucose,
            self.blood_pressure,
            self.skin_thickness,
            self.insulin,
            self.bmi,
            self.diabetes_pedigree,
            f64::from(self.age),
        ]
    }

    /// Build a vector from values in canonical order.
    ///
    /// # Errors
    /// Returns `ScoringError::Configuration` if the slice length is not 8 or an
    /// integer field holds a fractional or negative value.
    pub fn from_slice(v: &[f64]) -> Result<Self, ScoringError> {
        if v.len() != NUM_FEATURES {
            return Err(ScoringError::configuration(format!(
                "Expected {NUM_FEATURES} attributes, got {}",
                v.len()
            )));
        }

        Ok(Self {
            pregnancies: whole_number(FEATURE_NAMES[0], v[0])?,
            glucose: v[1],
            blood_pressure: v[2],
            skin_thickness: v[3],
            insulin: v[4],
            bmi: v[5],
            diabetes_pedigree: v[6],
            age: whole_number(FEATURE_NAMES[7], v[7])?,
        })
    }

    /// Build a vector from a name -> value map.
    ///
    /// Exactly the eight canonical names must be present.
    ///
    /// # Errors
    /// Returns `ScoringError::Configuration` naming every missing or unexpected field.
    pub fn from_named(fields: &BTreeMap<String, f64>) -> Result<Self, ScoringError> {
        let missing: Vec<&str> = FEATURE_NAMES
            .iter()
            .copied()
            .filter(|name| !fields.contains_key(*name))
            .collect();
        let unknown: Vec<&str> = fields
            .keys()
            .map(String::as_str)
            .filter(|name| !FEATURE_NAMES.contains(name))
            .collect();

        if !missing.is_empty() || !unknown.is_empty() {
            return Err(ScoringError::configuration(format!(
                "Attribute schema mismatch (missing: [{}], unexpected: [{}])",
                missing.join(", "),
                unknown.join(", ")
            )));
        }

        let ordered: Vec<f64> = FEATURE_NAMES.iter().map(|name| fields[*name]).collect();
        Self::from_slice(&ordered)
    }

    /// Check the ranges accepted by the input form.
    ///
    /// The scoring pipeline does not call this; it is the presentation layer's
    /// input control.
    ///
    /// # Errors
    /// Returns every violation found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.pregnancies > 20 {
            errors.push(format!(
                "Pregnancies {} out of range [0, 20]",
                self.pregnancies
            ));
        }
        check_range(&mut errors, "Glucose", self.glucose, 0.0, 250.0);
        check_range(&mut errors, "Blood pressure", self.blood_pressure, 0.0, 140.0);
        check_range(&mut errors, "Skin thickness", self.skin_thickness, 0.0, 99.0);
        check_range(&mut errors, "Insulin", self.insulin, 0.0, 850.0);
        check_range(&mut errors, "BMI", self.bmi, 0.0, 67.0);
        check_range(
            &mut errors,
            "Diabetes pedigree function",
            self.diabetes_pedigree,
            0.0,
            2.5,
        );
        if !(1..=120).contains(&self.age) {
            errors.push(format!("Age {} out of range [1, 120]", self.age));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn check_range(errors: &mut Vec<String>, label: &str, value: f64, min: f64, max: f64) {
    if !value.is_finite() {
        errors.push(format!("{label} must be a finite number"));
    } else if !(min..=max).contains(&value) {
        errors.push(format!("{label} {value} out of range [{min}, {max}]"));
    }
}

fn whole_number(name: &str, value: f64) -> Result<u32, ScoringError> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX) {
        Ok(value as u32)
    } else {
        Err(ScoringError::configuration(format!(
            "{name} must be a non-negative integer, got {value}"
        )))
    }
}
