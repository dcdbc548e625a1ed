use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use speech_confidence::analysis::DEFAULT_MAX_FRAMES;
use speech_confidence::audio::{load_file, write_wav};
use speech_confidence::config::{AppConfig, DEFAULT_CONFIG_PATH};
use speech_confidence::context::{question_or_err, AppContext};
use speech_confidence::questions;
use speech_confidence::{ErrorCode, MelExtractor, Prediction, PredictError};

#[derive(Parser, Debug)]
#[command(
    name = "confidence_cli",
    about = "Estimate how confident a spoken answer sounds"
)]
struct Cli {
    /// JSON configuration file (missing or invalid files fall back to defaults)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Override the classifier model path from the configuration
    #[arg(long, global = true)]
    model: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Record from the default microphone and classify the recording
    Record {
        /// Recording length in seconds (defaults to the configured value)
        #[arg(long)]
        seconds: Option<f32>,
        /// Save the recording as a WAV file
        #[arg(long)]
        save: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Classify an audio file (wav, mp3, ogg, flac)
    Classify {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Dump the log-mel feature matrix of an audio file
    Features {
        file: PathBuf,
        #[arg(long)]
        max_frames: Option<usize>,
        /// Write the full matrix as JSON instead of a summary on stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List the interview practice questions
    Questions,
    /// Show a question, record an answer and classify it
    Practice {
        /// 1-based question number
        #[arg(long)]
        question: usize,
        #[arg(long)]
        seconds: Option<f32>,
        #[arg(long)]
        save: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Serve the JSON prediction API
    #[cfg(feature = "http")]
    Serve {
        #[arg(long, default_value = speech_confidence::http::DEFAULT_ADDR)]
        addr: std::net::SocketAddr,
    },
}

fn main() -> ExitCode {
    speech_confidence::init_logging();

    match run() {
        Ok(code) => code,
        Err(err) => {
            match err.downcast_ref::<PredictError>() {
                Some(predict_err) => {
                    eprintln!("{}: {}", predict_err.headline(), predict_err.message());
                    eprintln!("(error code {})", predict_err.code());
                }
                None => eprintln!("Error: {err:?}"),
            }
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let mut config = AppConfig::load_from_file(&cli.config);
    if let Some(model) = cli.model {
        config.model.path = Some(model);
    }

    match cli.command {
        Commands::Record {
            seconds,
            save,
            json,
        } => run_record(config, seconds, save, json),
        Commands::Classify { file, json } => run_classify(config, &file, json),
        Commands::Features {
            file,
            max_frames,
            output,
        } => run_features(&config, &file, max_frames, output),
        Commands::Questions => run_questions(),
        Commands::Practice {
            question,
            seconds,
            save,
            json,
        } => run_practice(config, question, seconds, save, json),
        #[cfg(feature = "http")]
        Commands::Serve { addr } => run_serve(config, addr),
    }
}

fn run_record(
    config: AppConfig,
    seconds: Option<f32>,
    save: Option<PathBuf>,
    json: bool,
) -> Result<ExitCode> {
    let ctx = AppContext::from_config(config)?;
    let seconds_label = seconds.unwrap_or(ctx.config().audio.record_seconds);
    println!("Recording for {:.1} seconds...", seconds_label);

    let (samples, prediction) = ctx.record_and_predict(seconds)?;
    println!("Recording finished.");

    if let Some(path) = save {
        save_recording(&path, &samples, ctx.config().audio.sample_rate)?;
    }

    emit_prediction(&prediction, json, "Your Confidence percentage is")?;
    Ok(ExitCode::from(0))
}

fn run_classify(config: AppConfig, file: &Path, json: bool) -> Result<ExitCode> {
    // Unreadable input is reported before the model is loaded
    let rate = config.audio.sample_rate;
    let samples = load_file(file, rate).map_err(PredictError::from)?;
    let ctx = AppContext::from_config(config)?;
    let prediction = ctx.predict_samples(&samples, rate)?;
    emit_prediction(&prediction, json, "Confidence")?;
    Ok(ExitCode::from(0))
}

fn run_features(
    config: &AppConfig,
    file: &Path,
    max_frames: Option<usize>,
    output: Option<PathBuf>,
) -> Result<ExitCode> {
    let rate = config.audio.sample_rate;
    let max_frames = max_frames.unwrap_or(config.features.max_frames);
    let samples = load_file(file, rate).map_err(PredictError::from)?;
    let extractor = MelExtractor::new(rate).map_err(PredictError::from)?;
    let features = extractor
        .extract(&samples, max_frames)
        .map_err(PredictError::from)?;

    let (n_mels, n_frames) = features.shape();
    let summary = FeatureSummary {
        file: file.display().to_string(),
        sample_rate: rate,
        samples: samples.len(),
        n_mels,
        n_frames,
        frames_computed: features.frames_computed(),
        min_db: features.min_value(),
        max_db: features.max_value(),
        degenerate: features.is_degenerate(),
    };

    match output {
        Some(path) => {
            let payload = FeatureDump {
                summary: &summary,
                data: features.as_slice(),
            };
            let json = serde_json::to_string(&payload)?;
            fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote {}x{} matrix to {}", n_mels, n_frames, path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&summary)?),
    }

    if n_frames != DEFAULT_MAX_FRAMES {
        log::warn!(
            "[CLI] Matrix has {} frames; the trained classifier expects {}",
            n_frames,
            DEFAULT_MAX_FRAMES
        );
    }

    Ok(ExitCode::from(0))
}

fn run_questions() -> Result<ExitCode> {
    println!("Interview Practice Questions");
    for (number, question) in questions::numbered() {
        println!("{}. {}", number, question);
    }
    Ok(ExitCode::from(0))
}

fn run_practice(
    config: AppConfig,
    number: usize,
    seconds: Option<f32>,
    save: Option<PathBuf>,
    json: bool,
) -> Result<ExitCode> {
    // Fail on a bad question number before loading the model
    let question = question_or_err(number)?;
    let ctx = AppContext::from_config(config)?;

    println!("Question {}: {}", number, question);
    println!("Recording your answer...");
    let outcome = ctx.practice(number, seconds)?;
    println!("Recording finished.");

    if let Some(path) = save {
        save_recording(&path, &outcome.samples, ctx.config().audio.sample_rate)?;
    }

    emit_prediction(&outcome.prediction, json, "Your Confidence percentage is")?;
    Ok(ExitCode::from(0))
}

#[cfg(feature = "http")]
fn run_serve(config: AppConfig, addr: std::net::SocketAddr) -> Result<ExitCode> {
    let ctx = speech_confidence::context::install(AppContext::from_config(config)?)?;
    speech_confidence::http::serve_blocking(ctx, addr)?;
    Ok(ExitCode::from(0))
}

fn save_recording(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    write_wav(path, samples, sample_rate).map_err(PredictError::from)?;
    println!("Saved recording to {}", path.display());
    Ok(())
}

fn emit_prediction(prediction: &Prediction, json: bool, percentage_label: &str) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(prediction)?);
        return Ok(());
    }

    println!("Prediction: {}", prediction.label);
    println!("{}: {:.2}%", percentage_label, prediction.percentage);
    if prediction.degenerate_input {
        println!("(warning: no usable audio, the result is not meaningful)");
    }
    Ok(())
}

#[derive(Serialize)]
struct FeatureSummary {
    file: String,
    sample_rate: u32,
    samples: usize,
    n_mels: usize,
    n_frames: usize,
    frames_computed: usize,
    min_db: f32,
    max_db: f32,
    degenerate: bool,
}

#[derive(Serialize)]
struct FeatureDump<'a> {
    #[serde(flatten)]
    summary: &'a FeatureSummary,
    data: &'a [f32],
}
