use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use lexis_core::export;
use lexis_core::models::WordFrequency;
use lexis_core::{AnalysisRequest, AnalysisResult, FilePayload, Requestor, Sentiment};

use super::load_config;

pub struct AnalyzeArgs {
    pub text: Option<String>,
    pub file: Option<PathBuf>,
    pub stdin: bool,
    pub search: bool,
    pub endpoint: Option<String>,
    pub output: Option<PathBuf>,
    pub json: bool,
}

pub async fn run(config_path: Option<PathBuf>, args: AnalyzeArgs) -> Result<()> {
    let (mut config, _) = load_config(config_path)?;
    if let Some(endpoint) = args.endpoint {
        config.client.endpoint = endpoint;
    }

    let text = match args.text {
        Some(text) => text,
        None if args.stdin => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading text from stdin")?;
            buf
        }
        None => String::new(),
    };

    let request = build_request(text, args.file.as_deref(), args.search)?;
    let requestor = Requestor::new(&config.client)?;
    let result = requestor
        .submit(request)
        .await
        .with_context(|| format!("analysis via {} failed", requestor.endpoint()))?;

    if let Some(path) = &args.output {
        export::write_report(path, &result)?;
        eprintln!("  {} {}", "Saved".green(), path.display());
    }

    if args.json {
        println!("{}", export::to_report_json(&result)?);
    } else {
        render(&result, args.search);
    }

    Ok(())
}

fn build_request(text: String, file: Option<&Path>, search: bool) -> Result<AnalysisRequest> {
    let mut request = AnalysisRequest::new(text).with_search(search);
    if let Some(path) = file {
        let payload = FilePayload::from_path(path)?;
        request = request.with_file(payload);
    }
    Ok(request)
}

fn readability_band(score: f64) -> &'static str {
    if score >= 70.0 {
        "easy"
    } else if score >= 40.0 {
        "moderate"
    } else {
        "difficult"
    }
}

/// Frequencies by descending count, ties alphabetical. The provider does not sort.
fn sorted_frequencies(words: &[WordFrequency]) -> Vec<&WordFrequency> {
    let mut sorted: Vec<&WordFrequency> = words.iter().collect();
    sorted.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    sorted
}

fn render(result: &AnalysisResult, search_requested: bool) {
    println!("{}", "Summary".white().bold());
    println!("  {}", result.summary);
    println!();

    let band = readability_band(result.readability_score);
    let score = format!("{:.0} ({band})", result.readability_score);
    let score = match band {
        "easy" => score.green(),
        "moderate" => score.yellow(),
        _ => score.red(),
    };
    println!("  {} {}", "Readability:".white(), score);

    let sentiment = result.sentiment.to_string();
    let sentiment = match result.sentiment {
        Sentiment::Positive => sentiment.green(),
        Sentiment::Neutral => sentiment.cyan(),
        Sentiment::Negative => sentiment.red(),
    };
    println!("  {} {}", "Sentiment:".white(), sentiment);
    println!();

    println!("{}", "Suggestions".white().bold());
    if result.suggestions.is_empty() {
        println!("  {}", "none".dimmed());
    }
    for suggestion in &result.suggestions {
        println!("  [{}]", suggestion.kind.to_string().magenta());
        println!("    {} {}", "-".red(), suggestion.original);
        println!("    {} {}", "+".green(), suggestion.improvement);
        println!("    {}", suggestion.reason.dimmed());
    }
    println!();

    println!("{}", "Word frequency".white().bold());
    for entry in sorted_frequencies(&result.word_frequency) {
        println!("  {:<20} {}", entry.word, entry.count.to_string().cyan());
    }

    if let Some(fact_check) = &result.fact_check {
        println!();
        println!("{}", "Fact check".white().bold());
        let status = if fact_check.verified {
            "verified".green()
        } else {
            "unverified".yellow()
        };
        println!("  {} ({})", status, fact_check.notes);
        for source in &fact_check.sources {
            println!("  {}", source.blue());
        }
    } else if search_requested {
        println!();
        println!(
            "  {} search grounding returned no sources",
            "Fact check:".white()
        );
    }
}
