// src/ml.rs
use crate::models::PredictionInput;
use ndarray::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const N_FEATURES: usize = 9;
const N_SCALED: usize = 4;

pub const MODEL_FILE: &str = "model.json";
pub const SCALER_FILE: &str = "robust.json";
pub const LABELS_FILE: &str = "label.json";

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("missing form field '{0}'")]
    MissingField(&'static str),
    #[error("field '{field}' is not an integer: '{value}'")]
    NotAnInteger { field: &'static str, value: String },
    #[error("y contains previously unseen labels: '{0}'")]
    UnseenLabel(String),
    #[error("form body could not be decoded: {0}")]
    MalformedForm(#[from] serde_urlencoded::de::Error),
}

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid artifact {file}: {reason}")]
    Invalid { file: &'static str, reason: String },
}

/// Fitted label encoder: the code of a value is its index in the sorted class list.
#[derive(Clone, Debug, Deserialize)]
pub struct LabelEncoder<T> {
    classes: Vec<T>,
}

impl<T: Ord + Display> LabelEncoder<T> {
    pub fn new(mut classes: Vec<T>) -> Self {
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    pub fn transform(&self, value: &T) -> Result<usize, PredictionError> {
        self.classes
            .binary_search(value)
            .map_err(|_| PredictionError::UnseenLabel(value.to_string()))
    }

    pub fn classes(&self) -> &[T] {
        &self.classes
    }
}

#[derive(Deserialize)]
struct LabelArtifact {
    country: LabelEncoder<String>,
    year: LabelEncoder<i64>,
}

/// Median/IQR scaler fitted on (suicide_count, population, gdp_for_year, gdp_per_capita).
#[derive(Clone, Debug, Deserialize)]
pub struct RobustScaler {
    center: Vec<f64>,
    scale: Vec<f64>,
}

impl RobustScaler {
    pub fn new(center: Vec<f64>, scale: Vec<f64>) -> Result<Self, ArtifactError> {
        let scaler = Self { center, scale };
        scaler.validate()?;
        Ok(scaler)
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        if self.center.len() != N_SCALED || self.scale.len() != N_SCALED {
            return Err(ArtifactError::Invalid {
                file: SCALER_FILE,
                reason: format!(
                    "expected {} center and scale values, got {} and {}",
                    N_SCALED,
                    self.center.len(),
                    self.scale.len()
                ),
            });
        }
        Ok(())
    }

    pub fn transform(&self, row: [f64; N_SCALED]) -> [f64; N_SCALED] {
        let mut out = row;
        for (i, x) in out.iter_mut().enumerate() {
            // zero-width IQR is left unscaled
            let scale = if self.scale[i] == 0.0 {
                1.0
            } else {
                self.scale[i]
            };
            *x = (*x - self.center[i]) / scale;
        }
        out
    }
}

/// Flattened regression tree: node `i` is a leaf when `children_left[i] == -1`.
#[derive(Clone, Debug, Deserialize)]
pub struct RegressionTree {
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f64>,
    value: Vec<f64>,
}

impl RegressionTree {
    fn validate(&self) -> Result<(), String> {
        let n = self.children_left.len();
        if n == 0 {
            return Err("tree has no nodes".into());
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            return Err("tree arrays differ in length".into());
        }
        for i in 0..n {
            let (left, right) = (self.children_left[i], self.children_right[i]);
            if left == -1 {
                continue;
            }
            // children always come after their parent, so traversal terminates
            if left <= i as i64 || right <= i as i64 || left >= n as i64 || right >= n as i64 {
                return Err(format!("node {} has invalid children", i));
            }
            if self.feature[i] < 0 || self.feature[i] >= N_FEATURES as i64 {
                return Err(format!(
                    "node {} splits on feature {}",
                    i, self.feature[i]
                ));
            }
        }
        Ok(())
    }

    fn predict(&self, row: ArrayView1<f64>) -> f64 {
        let mut node = 0usize;
        while self.children_left[node] != -1 {
            let feature = self.feature[node] as usize;
            node = if row[feature] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        self.value[node]
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RegressionModel {
    Linear {
        coefficients: Vec<f64>,
        intercept: f64,
    },
    Forest {
        trees: Vec<RegressionTree>,
    },
}

impl RegressionModel {
    fn validate(&self) -> Result<(), ArtifactError> {
        let invalid = |reason: String| ArtifactError::Invalid {
            file: MODEL_FILE,
            reason,
        };
        match self {
            RegressionModel::Linear { coefficients, .. } => {
                if coefficients.len() != N_FEATURES {
                    return Err(invalid(format!(
                        "expected {} coefficients, got {}",
                        N_FEATURES,
                        coefficients.len()
                    )));
                }
            }
            RegressionModel::Forest { trees } => {
                if trees.is_empty() {
                    return Err(invalid("forest has no trees".into()));
                }
                for (i, tree) in trees.iter().enumerate() {
                    tree.validate()
                        .map_err(|reason| invalid(format!("tree {}: {}", i, reason)))?;
                }
            }
        }
        Ok(())
    }

    pub fn predict(&self, row: ArrayView1<f64>) -> f64 {
        match self {
            RegressionModel::Linear {
                coefficients,
                intercept,
            } => Array1::from_vec(coefficients.clone()).dot(&row) + intercept,
            RegressionModel::Forest { trees } => {
                let total: f64 = trees.iter().map(|tree| tree.predict(row)).sum();
                total / trees.len() as f64
            }
        }
    }
}

/// Model plus its fitted transformers, loaded once and shared read-only.
#[derive(Clone, Debug)]
pub struct Predictor {
    model: RegressionModel,
    scaler: RobustScaler,
    country: LabelEncoder<String>,
    year: LabelEncoder<i64>,
}

impl Predictor {
    pub fn new(
        model: RegressionModel,
        scaler: RobustScaler,
        country: LabelEncoder<String>,
        year: LabelEncoder<i64>,
    ) -> Result<Self, ArtifactError> {
        model.validate()?;
        scaler.validate()?;
        Ok(Self {
            model,
            scaler,
            country,
            year,
        })
    }

    pub async fn load(dir: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let dir = dir.as_ref();
        tracing::info!("Loading model artifacts from {}", dir.display());

        let model: RegressionModel = read_json(dir.join(MODEL_FILE)).await?;
        let scaler: RobustScaler = read_json(dir.join(SCALER_FILE)).await?;
        let labels: LabelArtifact = read_json(dir.join(LABELS_FILE)).await?;

        // files are not trusted to be pre-sorted
        let predictor = Self::new(
            model,
            scaler,
            LabelEncoder::new(labels.country.classes),
            LabelEncoder::new(labels.year.classes),
        )?;
        tracing::info!(
            countries = predictor.country.classes().len(),
            years = predictor.year.classes().len(),
            "Model artifacts loaded"
        );
        Ok(predictor)
    }

    pub fn features(&self, input: &PredictionInput) -> Result<Array1<f64>, PredictionError> {
        let country = self.country.transform(&input.country)?;
        let year = self.year.transform(&input.year)?;
        let [suicide_count, population, gdp_for_year, gdp_per_capita] = self.scaler.transform([
            input.suicide_count as f64,
            input.population as f64,
            input.gdp_for_year as f64,
            input.gdp_per_capita as f64,
        ]);

        Ok(array![
            country as f64,
            year as f64,
            input.gender as f64,
            input.age_group as f64,
            suicide_count,
            population,
            gdp_for_year,
            gdp_per_capita,
            input.generation as f64,
        ])
    }

    /// Predicted rate per 100k population, rounded to 3 decimals.
    pub fn predict(&self, input: &PredictionInput) -> Result<f64, PredictionError> {
        let row = self.features(input)?;
        let raw = self.model.predict(row.view());
        Ok(round3(raw))
    }
}

/// Half-way cases go to the even neighbour, as Python's `round` does.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round_ties_even() / 1000.0
}

async fn read_json<T: serde::de::DeserializeOwned>(path: PathBuf) -> Result<T, ArtifactError> {
    let raw = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| ArtifactError::Io {
            path: path.clone(),
            source,
        })?;
    serde_json::from_str(&raw).map_err(|source| ArtifactError::Json { path, source })
}

impl PredictionInput {
    /// Decodes an urlencoded request body; an empty or non-form body yields no fields.
    pub fn from_body(body: &[u8]) -> Result<Self, PredictionError> {
        let form: HashMap<String, String> = serde_urlencoded::from_bytes(body)?;
        Self::from_form(&form)
    }

    /// Applies the form's fixed coercions: `country` as text, everything else as an integer.
    pub fn from_form(form: &HashMap<String, String>) -> Result<Self, PredictionError> {
        let text = |field: &'static str| {
            form.get(field)
                .map(|v| v.trim().to_string())
                .ok_or(PredictionError::MissingField(field))
        };
        let int = |field: &'static str| -> Result<i64, PredictionError> {
            let value = text(field)?;
            value
                .parse::<i64>()
                .map_err(|_| PredictionError::NotAnInteger { field, value })
        };

        Ok(PredictionInput {
            country: text("country")?,
            year: int("year")?,
            gender: int("gender")?,
            age_group: int("age_group")?,
            suicide_count: int("suicide_count")?,
            population: int("population")?,
            gdp_for_year: int("gdp_for_year")?,
            gdp_per_capita: int("gdp_per_capita")?,
            generation: int("generation")?,
        })
    }
}
