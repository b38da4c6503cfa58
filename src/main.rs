//! Glucorisk: Diabetes risk scoring
//!
//! Command-line front end. Loads the trained artifacts once, scores one
//! patient and renders the result.

use std::collections::BTreeMap;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use glucorisk::adapters::sanitize::SanitizingMakeWriter;
use glucorisk::adapters::FileArtifactSource;
use glucorisk::{AttributeVector, GlucoriskError, ScoringResult, ScoringService};

#[derive(Parser)]
#[command(name = "glucorisk")]
#[command(about = "Estimate diabetes risk from eight patient attributes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one patient
    Score {
        /// Directory containing artifacts.json (and optionally manifest.json + artifacts.sig)
        #[arg(long, env = "GLUCORISK_ARTIFACTS", default_value = "models")]
        artifacts: PathBuf,

        /// Read attributes from a JSON object keyed by dataset column name
        #[arg(long, conflicts_with_all = [
            "pregnancies", "glucose", "blood_pressure", "skin_thickness",
            "insulin", "bmi", "dpf", "age",
        ])]
        input: Option<PathBuf>,

        #[command(flatten)]
        form: FormArgs,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Explain how the prediction is made
    Explain,
}

/// Per-attribute flags; defaults match the input form.
#[derive(Args)]
struct FormArgs {
    #[arg(long, default_value_t = 0)]
    pregnancies: u32,
    #[arg(long, default_value_t = 120.0)]
    glucose: f64,
    #[arg(long, default_value_t = 70.0)]
    blood_pressure: f64,
    #[arg(long, default_value_t = 20.0)]
    skin_thickness: f64,
    #[arg(long, default_value_t = 120.0)]
    insulin: f64,
    #[arg(long, default_value_t = 32.0)]
    bmi: f64,
    /// Diabetes pedigree function
    #[arg(long, default_value_t = 0.50)]
    dpf: f64,
    #[arg(long, default_value_t = 30)]
    age: u32,
}

impl From<FormArgs> for AttributeVector {
    fn from(f: FormArgs) -> Self {
        Self {
            pregnancies: f.pregnancies,
            glucose: f.glucose,
            blood_pressure: f.blood_pressure,
            skin_thickness: f.skin_thickness,
            insulin: f.insulin,
            bmi: f.bmi,
            diabetes_pedigree: f.dpf,
            age: f.age,
        }
    }
}

const EXPLANATION: &str = "\
Model used: Logistic Regression (Balanced)

What happens when you score:
  1. Your inputs are placed into a single 8-feature row.
  2. The same standard scaler used during training is applied.
  3. The model outputs a probability between 0 and 1 for the positive class.
  4. The probability is converted into a risk level:
       Low: < 0.33    Medium: 0.33-0.66    High: >= 0.66

Inputs:
  Pregnancies               Number of pregnancies
  Glucose                   Plasma glucose concentration
  BloodPressure             Diastolic blood pressure (mm Hg)
  SkinThickness             Triceps skin fold thickness (mm)
  Insulin                   2-hour serum insulin (mu U/ml)
  BMI                       Body mass index
  DiabetesPedigreeFunction  Dataset-defined family history score
  Age                       Age in years
";

fn init_logging() -> Result<tracing_appender::non_blocking::WorkerGuard> {
    // Logs go to stderr by default so stdout carries only the result.
    let log_mode = std::env::var("GLUCORISK_LOG_MODE").unwrap_or_else(|_| "stderr".to_string());

    let (writer, guard) = if log_mode == "file" {
        let log_file = std::env::var("GLUCORISK_LOG_FILE")
            .unwrap_or_else(|_| "glucorisk.log".to_string());

        if let Some(parent) = std::path::Path::new(&log_file).parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .with_context(|| format!("failed to open log file {log_file}"))?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stderr())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    Ok(guard)
}

fn read_input(path: &Path) -> Result<AttributeVector> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let fields: BTreeMap<String, f64> =
        serde_json::from_str(&content).map_err(GlucoriskError::from)?;
    Ok(AttributeVector::from_named(&fields).map_err(GlucoriskError::from)?)
}

fn render(result: &ScoringResult) {
    let level = format!("Risk Level: {}", result.risk_category);
    let level = if std::io::stdout().is_terminal() {
        let (r, g, b) = result.risk_category.color();
        format!("\x1b[1;38;2;{r};{g};{b}m{level}\x1b[0m")
    } else {
        level
    };

    let filled = (result.percent() / 5.0).round() as usize;
    let bar = format!("[{}{}]", "#".repeat(filled), "-".repeat(20 - filled.min(20)));

    println!("Results");
    println!(
        "Diabetes Risk Probability: {:.2} ({:.1}%)",
        result.probability,
        result.percent()
    );
    println!("{level} ({})", result.risk_category.description());
    println!("{bar}");
    println!();
    println!("{}", result.guidance.join(" "));
    println!();
    println!(
        "Tip: The probability is based on a machine learning model trained on an open dataset. \
         It may be wrong for individual cases. This is not medical advice or a diagnosis."
    );
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging()?;

    match cli.command {
        Commands::Explain => print!("{EXPLANATION}"),
        Commands::Score {
            artifacts,
            input,
            form,
            json,
        } => {
            let attrs = match input {
                Some(path) => read_input(&path)?,
                None => AttributeVector::from(form),
            };

            if let Err(errors) = attrs.validate() {
                return Err(GlucoriskError::Validation(errors.join("; ")).into());
            }

            let source = FileArtifactSource::from_env(&artifacts).map_err(GlucoriskError::from)?;
            let service = ScoringService::load(&source)
                .with_context(|| format!("failed to load artifacts from {}", artifacts.display()))?;

            let result = service.score(&attrs).map_err(GlucoriskError::from)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                render(&result);
            }
        }
    }

    Ok(())
}
