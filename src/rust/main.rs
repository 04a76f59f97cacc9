use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use cattolingo::{classify, load, EmotionClassifier, LoadOptions, ModelInfo, Prediction, RuntimeConfig};
use clap::Parser;
use log::{error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Force a fresh download of the model files
    #[arg(short, long)]
    fresh: bool,

    /// Directory for cached model files (defaults to $CATTOLINGO_CACHE or the platform cache)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Hub repository to fetch the model from, e.g. `owner/model`
    #[arg(long)]
    repo: Option<String>,

    /// Branch, tag or commit of the repository
    #[arg(long)]
    revision: Option<String>,

    /// Path of the ONNX graph inside the repository
    #[arg(long)]
    model_file: Option<String>,

    /// Path of the tokenizer.json inside the repository
    #[arg(long)]
    tokenizer_file: Option<String>,

    /// Intra-op threads for ONNX Runtime (0 lets the runtime decide)
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Run on CPU even when built with an accelerator
    #[arg(long)]
    cpu: bool,

    /// Classify this text and exit instead of reading stdin
    #[arg(short, long)]
    text: Option<String>,

    /// Print the probability of every label
    #[arg(short, long)]
    scores: bool,

    /// Print one JSON object per prediction
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cattolingo::init_logger();
    let args = Args::parse();

    let options = LoadOptions {
        model: model_info(&args),
        cache_dir: args.cache_dir.clone(),
        runtime: RuntimeConfig {
            intra_threads: args.threads,
            use_accelerator: !args.cpu,
            ..RuntimeConfig::default()
        },
        fresh: args.fresh,
        ..LoadOptions::default()
    };

    let start_time = Instant::now();
    info!("Loading AI model (RoBERTa)...");
    let classifier = load(&options)
        .await
        .context("Model not loaded properly. Check the network connection and cache directory")?;
    info!("Model ready (took {:.2?})", start_time.elapsed());

    if let Some(text) = &args.text {
        return process_input(&classifier, text, &args).map_err(Into::into);
    }

    println!("Describe what your cat is doing (Ctrl-D to quit):");
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read from stdin")?;
        if let Err(e) = process_input(&classifier, &line, &args) {
            // Inference errors leave the loaded model usable
            eprintln!("Prediction error: {}", e);
        }
        io::stdout().flush()?;
    }

    Ok(())
}

/// The built-in model with any `--repo`/`--revision`/file overrides applied.
///
/// Overriding the repository or revision also moves the cache directory, so
/// files from different sources never share one.
fn model_info(args: &Args) -> ModelInfo {
    let mut info = LoadOptions::default().model;
    if args.repo.is_some() || args.revision.is_some() {
        let repo_id = args.repo.clone().unwrap_or(info.repo_id);
        let revision = args.revision.clone().unwrap_or(info.revision);
        let name = match revision.as_str() {
            "main" => repo_id.replace('/', "--"),
            rev => format!("{}--{}", repo_id.replace('/', "--"), rev.replace('/', "--")),
        };
        info = ModelInfo {
            name,
            repo_id,
            revision,
            ..info
        };
    }
    if let Some(model_file) = &args.model_file {
        info.model_file = model_file.clone();
    }
    if let Some(tokenizer_file) = &args.tokenizer_file {
        info.tokenizer_file = tokenizer_file.clone();
    }
    info
}

fn process_input(classifier: &EmotionClassifier, text: &str, args: &Args) -> Result<(), cattolingo::InferenceError> {
    let started = Instant::now();
    let prediction = classify(text, classifier).map_err(|e| {
        error!("Failed to classify {:?}: {}", text, e);
        e
    })?;
    info!("Classified in {:.2?}", started.elapsed());

    match prediction {
        None if args.json => println!("null"),
        None => println!("Please enter some text to start analysis."),
        Some(prediction) if args.json => print_json(&prediction),
        Some(prediction) => print_prediction(&prediction, args.scores),
    }
    Ok(())
}

fn print_prediction(prediction: &Prediction, with_scores: bool) {
    println!("Emotion: {} {}", prediction.emotion, prediction.emotion.emoji());
    if with_scores {
        let mut scores = prediction.scores.clone();
        scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        for (emotion, score) in scores {
            println!("    {:<14} {:>5.1}%", emotion.as_str(), score * 100.0);
        }
    }
}

fn print_json(prediction: &Prediction) {
    match serde_json::to_string(prediction) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize prediction: {}", e),
    }
}
