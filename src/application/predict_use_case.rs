// ============================================================
// Layer 2 — Predict Use Case
// ============================================================
// Everything between "the user typed some values" and "a price
// is on screen":
//
//   InferenceContext  — loaded once: preprocessing (encoding
//                       scheme + scaler) and the network.
//                       Immutable after construction.
//
//   PredictionSession — the form's state: raw field values,
//                       current stage, displayed result and
//                       the in-memory history. Works against
//                       any PricePredictor, or none at all
//                       (demo mode).
//
//   PredictUseCase    — one-shot prediction from name=value
//                       pairs, used by the `predict` command.
//
// Every submission starts again from Idle and walks through
//
//   Idle → Collecting → Encoding → Scaling → Inferring → Displaying
//                                                      ↘ Failed
//
// The stages visited by the latest submission are kept as its
// trail; `clear` also puts the session back to Idle.

use anyhow::{bail, Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
};

use crate::data::{
    encoder::EncodingScheme,
    loader::read_table,
    preprocessor::Preprocessor,
    schema::Schema,
};
use crate::domain::{
    fields::{label_for, CATEGORICAL_FIELDS, DEMO_OPTION, NUMERIC_FIELDS, REQUIRED_POSITIVE_FIELDS},
    prediction::{format_currency, HistoryEntry},
    request::{parse_numeric, PredictionRequest},
    traits::PricePredictor,
};
use crate::error::EstimatorError;
use crate::infra::checkpoint::ArtifactStore;
use crate::ml::inferencer::Inferencer;
use crate::application::train_use_case::{TrainConfig, TARGET_COLUMN};

// ─── InferenceContext ─────────────────────────────────────────────────────────
pub struct InferenceContext {
    preprocessor: Preprocessor,
    inferencer:   Inferencer,
    trained_with: TrainConfig,
}

impl InferenceContext {
    /// Load the persisted artifacts. When `dataset` is given, its
    /// vocabularies are re-derived and any difference from the
    /// persisted encoding is reported as a warning.
    pub fn load(artifact_dir: &Path, dataset: Option<&Path>) -> Result<Self> {
        let store = ArtifactStore::new(artifact_dir);
        if !store.is_complete() {
            bail!(
                "No trained model in '{}'. Run 'train' first.",
                artifact_dir.display()
            );
        }
        let trained_with = store.load_train_config()?;
        let scheme = store.load_encoding()?;
        let scaler = store.load_scaler()?;

        if let Some(path) = dataset {
            check_drift(&scheme, path);
        }

        let preprocessor = Preprocessor::new(scheme, scaler)
            .context("Encoding scheme and scaler disagree")?;
        let inferencer = Inferencer::from_artifacts(&store)?;

        let expected = preprocessor.feature_names().len();
        if inferencer.input_dim() != expected {
            return Err(EstimatorError::FeatureMismatch {
                expected,
                actual: inferencer.input_dim(),
            }
            .into());
        }

        tracing::info!(
            "Inference context ready: {} features from '{}'",
            expected,
            artifact_dir.display()
        );
        Ok(Self { preprocessor, inferencer, trained_with })
    }

    pub fn form_layout(&self) -> FormLayout {
        FormLayout::from_scheme(self.preprocessor.scheme())
    }

    /// Hyperparameters of the run that produced the artifacts.
    pub fn trained_with(&self) -> &TrainConfig {
        &self.trained_with
    }
}

/// Compare the persisted vocabularies with ones freshly derived
/// from the cleaned dataset. Never fatal.
fn check_drift(persisted: &EncodingScheme, dataset: &Path) {
    let derived = read_table(dataset).and_then(|table| {
        let schema = Schema::infer(&table, TARGET_COLUMN)?;
        Ok(EncodingScheme::fit(&table, &schema))
    });

    match derived {
        Ok(derived) => {
            let notes = persisted.drift(&derived);
            if notes.is_empty() {
                tracing::debug!("'{}' matches the persisted encoding", dataset.display());
            }
            for note in notes {
                tracing::warn!("Vocabulary drift against '{}': {}", dataset.display(), note);
            }
        }
        Err(e) => tracing::warn!("Skipping drift check on '{}': {e:#}", dataset.display()),
    }
}

impl PricePredictor for InferenceContext {
    fn encode(&self, request: &PredictionRequest) -> Result<Vec<f64>> {
        Ok(self.preprocessor.encode(request)?)
    }

    fn scale(&self, features: &[f64]) -> Result<Vec<f64>> {
        Ok(self.preprocessor.scale(features)?)
    }

    fn infer(&self, scaled: &[f64]) -> Result<f64> {
        self.inferencer.predict(scaled)
    }

    fn describe(&self) -> String {
        let features = self.preprocessor.feature_names();
        let run      = self.trained_with();
        format!(
            "{}\n\ntrained on '{}': {} epochs, batch {}, lr {}, seed {}\n\ninput features ({}): {}",
            self.inferencer.config().summary(),
            run.dataset_path.display(),
            run.epochs,
            run.batch_size,
            run.lr,
            run.seed,
            features.len(),
            features.join(", ")
        )
    }
}

// ─── Form layout ──────────────────────────────────────────────────────────────
/// Which fields the form shows, and the options of each
/// categorical field.
#[derive(Debug, Clone, PartialEq)]
pub struct FormLayout {
    pub numeric:     Vec<String>,
    pub categorical: Vec<(String, Vec<String>)>,
}

impl FormLayout {
    pub fn from_scheme(scheme: &EncodingScheme) -> Self {
        Self {
            numeric:     scheme.numeric.clone(),
            categorical: scheme
                .categorical
                .iter()
                .map(|v| (v.column.clone(), v.labels.clone()))
                .collect(),
        }
    }

    /// Built-in layout used when no artifacts could be loaded.
    pub fn demo() -> Self {
        Self {
            numeric:     NUMERIC_FIELDS.iter().map(|f| f.name.to_string()).collect(),
            categorical: CATEGORICAL_FIELDS
                .iter()
                .map(|f| (f.name.to_string(), vec![DEMO_OPTION.to_string()]))
                .collect(),
        }
    }

    pub fn options(&self, column: &str) -> Option<&[String]> {
        self.categorical
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, labels)| labels.as_slice())
    }
}

// ─── PredictionSession ────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionStage {
    Idle,
    Collecting,
    Encoding,
    Scaling,
    Inferring,
    Displaying,
    Failed,
}

impl fmt::Display for PredictionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Idle       => "idle",
            Self::Collecting => "collecting inputs",
            Self::Encoding   => "one-hot encoding",
            Self::Scaling    => "scaling",
            Self::Inferring  => "network inference",
            Self::Displaying => "done",
            Self::Failed     => "failed",
        };
        f.write_str(text)
    }
}

/// Neutral display before any prediction and after a failure.
pub const NO_RESULT: &str = "$ 0.00";

pub struct PredictionSession<P: PricePredictor> {
    predictor:   Option<P>,
    layout:      FormLayout,
    numeric:     BTreeMap<String, String>,
    categorical: BTreeMap<String, String>,
    trail:       Vec<PredictionStage>,
    display:     Option<String>,
    history:     Vec<HistoryEntry>,
}

impl<P: PricePredictor> PredictionSession<P> {
    pub fn new(predictor: P, layout: FormLayout) -> Self {
        Self::build(Some(predictor), layout)
    }

    /// A session with the built-in layout and no model behind it.
    pub fn demo() -> Self {
        Self::build(None, FormLayout::demo())
    }

    fn build(predictor: Option<P>, layout: FormLayout) -> Self {
        let mut session = Self {
            predictor,
            layout,
            numeric:     BTreeMap::new(),
            categorical: BTreeMap::new(),
            trail:       Vec::new(),
            display:     None,
            history:     Vec::new(),
        };
        session.clear();
        session
    }

    pub fn is_demo(&self) -> bool {
        self.predictor.is_none()
    }

    pub fn layout(&self) -> &FormLayout {
        &self.layout
    }

    /// Idle until the first submission and after `clear`.
    pub fn stage(&self) -> PredictionStage {
        self.trail.last().copied().unwrap_or(PredictionStage::Idle)
    }

    /// Stages visited by the latest submission, in order.
    pub fn trail(&self) -> &[PredictionStage] {
        &self.trail
    }

    /// The currency string on screen, or the neutral placeholder.
    pub fn display(&self) -> &str {
        self.display.as_deref().unwrap_or(NO_RESULT)
    }

    pub fn numeric_value(&self, name: &str) -> Option<&str> {
        self.numeric.get(name).map(String::as_str)
    }

    pub fn category(&self, name: &str) -> Option<&str> {
        self.categorical.get(name).map(String::as_str)
    }

    /// Options of a categorical field, in vocabulary order.
    pub fn options(&self, name: &str) -> Result<&[String], EstimatorError> {
        self.layout
            .options(name)
            .ok_or_else(|| EstimatorError::UnknownField { field: name.to_string() })
    }

    /// Update one field. Numeric text must be empty or a number;
    /// a categorical value must be one of the field's options.
    pub fn set_field(&mut self, name: &str, value: &str) -> Result<(), EstimatorError> {
        let value = value.trim();

        if self.numeric.contains_key(name) {
            parse_numeric(name, value)?;
            self.numeric.insert(name.to_string(), value.to_string());
            return Ok(());
        }

        let options = self.options(name)?;
        if !options.iter().any(|o| o == value) {
            return Err(EstimatorError::UnknownCategory {
                column:  name.to_string(),
                value:   value.to_string(),
                allowed: options.to_vec(),
            });
        }
        self.categorical.insert(name.to_string(), value.to_string());
        Ok(())
    }

    /// Numeric fields back to "0", selections back to the first
    /// option, display back to neutral. History is kept.
    pub fn clear(&mut self) {
        self.numeric = self
            .layout
            .numeric
            .iter()
            .map(|name| (name.clone(), "0".to_string()))
            .collect();
        self.categorical = self
            .layout
            .categorical
            .iter()
            .filter_map(|(name, labels)| labels.first().map(|l| (name.clone(), l.clone())))
            .collect();
        self.display = None;
        self.trail.clear();
    }

    /// Run one prediction with the current field values.
    pub fn submit(&mut self) -> Result<f64> {
        self.trail.clear();
        self.trail.push(PredictionStage::Idle);

        match self.run_pipeline() {
            Ok((price, request)) => {
                let entry = HistoryEntry::new(
                    Local::now().format("%H:%M:%S").to_string(),
                    price,
                    format!(
                        "Area: {}, Age: {}",
                        request.numeric_value("livingArea"),
                        request.numeric_value("age")
                    ),
                );
                self.history.push(entry);
                self.trail.push(PredictionStage::Displaying);
                self.display = Some(format_currency(price));
                Ok(price)
            }
            Err(e) => {
                tracing::debug!("Prediction failed during {}: {e:#}", self.stage());
                self.trail.push(PredictionStage::Failed);
                self.display = None;
                Err(e)
            }
        }
    }

    fn run_pipeline(&mut self) -> Result<(f64, PredictionRequest)> {
        self.trail.push(PredictionStage::Collecting);
        let request = self.collect()?;
        self.check_required(&request)?;

        let predictor = self.predictor.as_ref().ok_or(EstimatorError::ModelNotLoaded)?;

        self.trail.push(PredictionStage::Encoding);
        let encoded = predictor.encode(&request)?;

        self.trail.push(PredictionStage::Scaling);
        let scaled = predictor.scale(&encoded)?;

        self.trail.push(PredictionStage::Inferring);
        let price = predictor.infer(&scaled)?;

        Ok((price, request))
    }

    fn collect(&self) -> Result<PredictionRequest, EstimatorError> {
        let mut request = PredictionRequest::new();
        for (name, raw) in &self.numeric {
            request.numeric.insert(name.clone(), parse_numeric(name, raw)?);
        }
        request.categorical = self.categorical.clone();
        Ok(request)
    }

    fn check_required(&self, request: &PredictionRequest) -> Result<(), EstimatorError> {
        let fields: Vec<String> = REQUIRED_POSITIVE_FIELDS
            .iter()
            .filter(|name| self.numeric.contains_key(**name))
            .filter(|name| request.numeric_value(name) <= 0.0)
            .map(|name| label_for(name).to_string())
            .collect();

        if fields.is_empty() {
            Ok(())
        } else {
            Err(EstimatorError::IncompleteData { fields })
        }
    }

    /// Most recent first.
    pub fn history(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.history.iter().rev()
    }

    pub fn describe(&self) -> String {
        match &self.predictor {
            Some(p) => p.describe(),
            None    => EstimatorError::ModelNotLoaded.to_string(),
        }
    }
}

// ─── PredictUseCase ───────────────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictConfig {
    pub artifact_dir: PathBuf,
    pub dataset_path: Option<PathBuf>,
    /// `(field, raw value)` pairs, applied in order
    pub fields:       Vec<(String, String)>,
}

pub struct PredictUseCase {
    config: PredictConfig,
}

impl PredictUseCase {
    pub fn new(config: PredictConfig) -> Self {
        Self { config }
    }

    /// Load the artifacts (fatal on failure) and predict once.
    pub fn execute(&self) -> Result<f64> {
        let cfg = &self.config;
        let context = InferenceContext::load(&cfg.artifact_dir, cfg.dataset_path.as_deref())?;
        let layout  = context.form_layout();
        let mut session = PredictionSession::new(context, layout);

        for (name, value) in &cfg.fields {
            session.set_field(name, value)?;
        }
        session.submit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::{
        tests::{quick_config, write_sample_dataset},
        TrainUseCase,
    };
    use crate::ml::trainer::tests::lock_backend_rng;
    use std::fs;
    use tempfile::tempdir;

    /// Predicts livingArea × 100 without touching any artifacts.
    struct FixedRate;

    impl PricePredictor for FixedRate {
        fn encode(&self, request: &PredictionRequest) -> Result<Vec<f64>> {
            if request.category("heating") == Some("broken") {
                anyhow::bail!("encoder exploded");
            }
            Ok(vec![request.numeric_value("livingArea")])
        }
        fn scale(&self, features: &[f64]) -> Result<Vec<f64>> {
            Ok(features.to_vec())
        }
        fn infer(&self, scaled: &[f64]) -> Result<f64> {
            Ok(scaled[0] * 100.0)
        }
        fn describe(&self) -> String {
            "fixed rate".to_string()
        }
    }

    fn layout() -> FormLayout {
        FormLayout {
            numeric:     vec!["age".into(), "livingArea".into(), "lotSize".into()],
            categorical: vec![(
                "heating".into(),
                vec!["broken".into(), "electric".into(), "gas".into()],
            )],
        }
    }

    fn ready_session() -> PredictionSession<FixedRate> {
        let mut s = PredictionSession::new(FixedRate, layout());
        s.set_field("heating", "gas").unwrap();
        s.set_field("livingArea", "2000").unwrap();
        s.set_field("lotSize", "0.5").unwrap();
        s.set_field("age", "10").unwrap();
        s
    }

    #[test]
    fn test_submit_displays_currency_and_records_history() {
        let mut s = ready_session();
        assert_eq!(s.display(), NO_RESULT);

        let price = s.submit().unwrap();
        assert_eq!(price, 200_000.0);
        assert_eq!(s.stage(), PredictionStage::Displaying);
        assert_eq!(s.display(), "$ 200,000.00");

        s.set_field("livingArea", "1500").unwrap();
        s.submit().unwrap();

        let history: Vec<_> = s.history().collect();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].price, 150_000.0);
        assert_eq!(history[0].description, "Area: 1500, Age: 10");
        assert_eq!(history[0].time.len(), 8);
    }

    #[test]
    fn test_zero_living_area_is_blocked() {
        let mut s = ready_session();
        s.set_field("livingArea", "").unwrap();

        let err = s.submit().unwrap_err();
        let err = err.downcast_ref::<EstimatorError>().unwrap();
        assert!(matches!(err, EstimatorError::IncompleteData { fields } if fields.len() == 1));
        assert!(err.is_input_error());
        assert_eq!(s.history().count(), 0);
    }

    #[test]
    fn test_negative_lot_size_is_blocked() {
        let mut s = ready_session();
        s.set_field("lotSize", "-0.5").unwrap();

        let err = s.submit().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EstimatorError>(),
            Some(EstimatorError::IncompleteData { fields }) if fields.len() == 1
        ));
        assert_eq!(s.stage(), PredictionStage::Failed);
    }

    #[test]
    fn test_each_submit_restarts_from_idle() {
        use PredictionStage::*;

        let mut s = ready_session();
        s.submit().unwrap();
        assert_eq!(s.trail(), [Idle, Collecting, Encoding, Scaling, Inferring, Displaying]);

        s.set_field("heating", "broken").unwrap();
        assert!(s.submit().is_err());
        assert_eq!(s.trail(), [Idle, Collecting, Encoding, Failed]);

        s.set_field("heating", "gas").unwrap();
        s.submit().unwrap();
        assert_eq!(s.trail().first(), Some(&Idle));
        assert_eq!(s.stage(), Displaying);

        s.clear();
        assert!(s.trail().is_empty());
    }

    #[test]
    fn test_invalid_edits_are_rejected_and_keep_old_value() {
        let mut s = ready_session();
        assert!(matches!(
            s.set_field("age", "ten"),
            Err(EstimatorError::MalformedNumber { .. })
        ));
        assert_eq!(s.numeric_value("age"), Some("10"));

        let err = s.set_field("heating", "solar").unwrap_err();
        assert!(matches!(&err, EstimatorError::UnknownCategory { allowed, .. } if allowed.len() == 3));
        assert!(matches!(s.set_field("garage", "1"), Err(EstimatorError::UnknownField { .. })));
    }

    #[test]
    fn test_failure_resets_display() {
        let mut s = ready_session();
        s.submit().unwrap();
        s.set_field("heating", "broken").unwrap();

        assert!(s.submit().is_err());
        assert_eq!(s.stage(), PredictionStage::Failed);
        assert_eq!(s.display(), NO_RESULT);
        assert_eq!(s.history().count(), 1);
    }

    #[test]
    fn test_clear_restores_defaults_but_keeps_history() {
        let mut s = ready_session();
        s.submit().unwrap();
        s.clear();

        assert_eq!(s.numeric_value("livingArea"), Some("0"));
        assert_eq!(s.category("heating"), Some("broken"));
        assert_eq!(s.stage(), PredictionStage::Idle);
        assert_eq!(s.display(), NO_RESULT);
        assert_eq!(s.history().count(), 1);
    }

    #[test]
    fn test_demo_session_reports_model_not_loaded() {
        let mut s: PredictionSession<FixedRate> = PredictionSession::demo();
        assert!(s.is_demo());
        assert_eq!(s.options("heating").unwrap(), [DEMO_OPTION.to_string()]);

        s.set_field("livingArea", "2000").unwrap();
        s.set_field("lotSize", "0.5").unwrap();
        let err = s.submit().unwrap_err();
        assert_eq!(err.downcast_ref::<EstimatorError>(), Some(&EstimatorError::ModelNotLoaded));
    }

    #[test]
    fn test_trained_artifacts_give_finite_prediction() {
        let _rng = lock_backend_rng();
        let tmp = tempdir().unwrap();
        let cfg = quick_config(tmp.path());
        write_sample_dataset(&cfg.dataset_path, 40);
        TrainUseCase::new(cfg.clone()).execute().unwrap();

        let context = InferenceContext::load(&cfg.artifact_dir, Some(&cfg.dataset_path)).unwrap();

        let layout  = context.form_layout();
        assert_eq!(layout.options("heating").unwrap().len(), 3);

        // Default selections plus three numbers; every other field stays 0
        let mut s = PredictionSession::new(context, layout);
        s.set_field("livingArea", "2000").unwrap();
        s.set_field("lotSize", "0.5").unwrap();
        s.set_field("age", "10").unwrap();

        let price = s.submit().unwrap();
        assert!(price.is_finite());
        assert!(s.display().starts_with("$ "));
        assert!(s.describe().contains("2 epochs, batch 8, lr 0.001, seed 42"));

        let one_shot = PredictUseCase::new(PredictConfig {
            artifact_dir: cfg.artifact_dir.clone(),
            dataset_path: None,
            fields: vec![
                ("livingArea".into(), "2000".into()),
                ("lotSize".into(), "0.5".into()),
                ("age".into(), "10".into()),
            ],
        })
        .execute()
        .unwrap();
        assert_eq!(one_shot, price);
    }

    #[test]
    fn test_drifted_dataset_keeps_persisted_vocabulary() {
        let _rng = lock_backend_rng();
        let tmp = tempdir().unwrap();
        let cfg = quick_config(tmp.path());
        write_sample_dataset(&cfg.dataset_path, 40);
        TrainUseCase::new(cfg.clone()).execute().unwrap();

        // Same columns, but a heating label the network never saw
        let drifted = tmp.path().join("drifted.csv");
        let mut csv = fs::read_to_string(&cfg.dataset_path).unwrap();
        csv.push_str("210000,0.5,12,21000,1600,35,3,1,2,6,solar,gas,septic,No,No,Yes\n");
        fs::write(&drifted, csv).unwrap();

        let context = InferenceContext::load(&cfg.artifact_dir, Some(&drifted)).unwrap();
        let heating = context.form_layout().options("heating").unwrap().to_vec();
        assert_eq!(heating, ["electric", "hot air", "hot water/steam"]);
        assert_eq!(context.trained_with(), &cfg);
    }

    #[test]
    fn test_missing_artifacts_fail_to_load() {
        let tmp = tempdir().unwrap();
        let err = InferenceContext::load(tmp.path(), None).err().unwrap();
        assert!(err.to_string().contains("Run 'train' first"));
    }
}
