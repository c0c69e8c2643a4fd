use clap::{Args, Parser, Subcommand};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rankcast::{
    format_float, format_percent, Classifier, ClientProfile, ForecastConfig, ForecastEngine,
    ForecastRequest,
};

#[derive(Parser)]
#[command(name = "rankcast", about = "Keyword rankability forecaster")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Score a keyword request and print the forecast report.
    Forecast(ForecastArgs),
    /// Write the default configuration file for tuning.
    Config(ConfigArgs),
}

#[derive(Args, Debug, Clone, Default)]
struct ForecastArgs {
    /// Path to a JSON forecast request; reads stdin when omitted.
    #[arg(long)]
    input: Option<String>,
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the classifier artifact path.
    #[arg(long)]
    model: Option<String>,
    /// Override the feature-order file path.
    #[arg(long)]
    features: Option<String>,
    /// Client vertical for the fit assessment (e.g. legal, saas).
    #[arg(long)]
    vertical: Option<String>,
    /// Comma-separated client topic keywords.
    #[arg(long)]
    topics: Option<String>,
    /// Keyword difficulty score, 0-100.
    #[arg(long)]
    difficulty: Option<f64>,
    /// Monthly search volume.
    #[arg(long)]
    volume: Option<u64>,
    /// Emit the raw JSON result instead of the report.
    #[arg(long)]
    json: bool,
    /// Print per-profile probabilities.
    #[arg(long)]
    details: bool,
}

#[derive(Args, Debug, Clone)]
struct ConfigArgs {
    #[arg(long, default_value = "config/rankcast.toml")]
    path: PathBuf,
}

fn main() {
    load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or(Command::Forecast(ForecastArgs::default()));

    match command {
        Command::Forecast(args) => run_forecast(args),
        Command::Config(args) => run_config(args),
    }
}

fn run_forecast(args: ForecastArgs) -> Result<(), String> {
    let (mut config, _) = ForecastConfig::load(args.config.clone())?;
    if let Some(model) = args.model {
        config.model.artifact_path = model;
    }
    if let Some(features) = args.features {
        config.model.feature_list_path = features;
    }

    let classifier = Classifier::load(
        Path::new(&config.model.artifact_path),
        Path::new(&config.model.feature_list_path),
    )
    .map_err(|err| err.to_string())?;
    let engine = ForecastEngine::new(Arc::new(classifier), &config);

    let payload = read_request(args.input)?;
    let request: ForecastRequest =
        serde_json::from_str(&payload).map_err(|err| format!("invalid request JSON: {}", err))?;

    let result = engine.forecast(&request).map_err(|err| err.to_string())?;

    let client = args.vertical.map(|vertical| ClientProfile {
        vertical,
        vertical_keywords: args.topics.as_deref().map(parse_topics),
    });
    let assessment = client.as_ref().map(|client| {
        engine.client_assessment(&result, client, None, args.difficulty, args.volume)
    });

    if args.json {
        let report = serde_json::json!({
            "forecast": result,
            "client": assessment,
        });
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|err| format!("failed to serialize result: {}", err))?;
        println!("{}", rendered);
        return Ok(());
    }

    println!("Keyword: {}", result.keyword);
    if result.insufficient_data {
        println!("No reference results available; forecast is zero.");
        return Ok(());
    }

    println!(
        "Median forecast: {} ({})",
        format_percent(result.median.calibrated_pct),
        result.median.tier.label()
    );
    println!(
        "Range: weak {} ({}) | strong {} ({})",
        format_percent(result.weak.calibrated_pct),
        result.weak.tier.label(),
        format_percent(result.strong.calibrated_pct),
        result.strong.tier.label()
    );
    println!(
        "Authority: own {} vs reference median {} (gap {})",
        format_float(result.own_authority, 0),
        format_float(result.reference_median_authority, 0),
        format_float(result.authority_gap, 0)
    );
    println!(
        "Backlinks: own {} vs reference median {}",
        format_float(result.own_backlinks, 0),
        format_float(result.reference_median_backlinks, 0)
    );
    println!("Giant brands in results: {}", result.giant_brand_count);
    println!("Explanation: {}", result.explanation);

    if args.details {
        println!("\nRaw probabilities:");
        println!("  weak (25th pct content): {}", format_float(result.weak.raw_probability, 3));
        println!("  median content: {}", format_float(result.median.raw_probability, 3));
        println!("  strong (75th pct content): {}", format_float(result.strong.raw_probability, 3));
    }

    if let Some(assessment) = assessment {
        println!("\nClient assessment:");
        println!(
            "  Domain fit: {} - {}",
            format_float(assessment.domain_fit.score, 1),
            assessment.domain_fit.explanation
        );
        println!(
            "  Intent fit: {} - {}",
            format_float(assessment.intent_fit.score, 1),
            assessment.intent_fit.explanation
        );
        println!(
            "  Forecast: {} ({})",
            format_percent(assessment.forecast.score),
            assessment.forecast.tier.label()
        );
        println!("  Recommendation: {}", assessment.forecast.recommendation);
    }

    Ok(())
}

fn run_config(args: ConfigArgs) -> Result<(), String> {
    let config = ForecastConfig::default();
    config.write(&args.path)?;
    println!("Wrote default config to {}", args.path.display());
    Ok(())
}

fn parse_topics(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|topic| topic.trim().to_string())
        .filter(|topic| !topic.is_empty())
        .collect()
}

fn read_request(arg: Option<String>) -> Result<String, String> {
    if let Some(path) = arg {
        return std::fs::read_to_string(&path)
            .map_err(|err| format!("failed reading {}: {}", path, err));
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|err| format!("failed reading stdin: {}", err))?;
    if buffer.trim().is_empty() {
        return Err("missing request: pass --input or pipe JSON to stdin".to_string());
    }
    Ok(buffer)
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
