use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::fs;

use konspekt_core::{
    CaptionFetcher, CaptionPayload, DEFAULT_MODEL, DebugScope, MIN_TRANSCRIPT_CHARS,
    MemoryStorage, OpenAiGenerator, OutputFormat, TabStore, TextGenerator, build_prompt,
    extract_transcript, format_timestamp, normalize_caption_url, sanitize_filename,
};

/// CLI wrapper for OutputFormat (needed for clap ValueEnum)
#[derive(Clone, Default, ValueEnum)]
enum CliFormat {
    #[default]
    Md,
    Html,
}

impl From<CliFormat> for OutputFormat {
    fn from(cli: CliFormat) -> Self {
        match cli {
            CliFormat::Md => OutputFormat::Md,
            CliFormat::Html => OutputFormat::Html,
        }
    }
}

#[derive(Parser)]
#[command(name = "konspekt")]
#[command(
    about = "Reconstruct a timed transcript from a captured caption URL (or saved caption JSON) and generate lesson notes"
)]
struct Cli {
    /// Caption endpoint URL, or path to a saved caption JSON file
    source: String,

    /// Print the transcript without timestamps
    #[arg(long)]
    plain: bool,

    /// Generate lesson notes with OpenAI (requires OPENAI_API_KEY)
    #[arg(short, long)]
    summarize: bool,

    /// Model used for note generation
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Output format for generated notes
    #[arg(short = 'f', long, value_enum, default_value = "md")]
    format: CliFormat,

    /// File with additional context (notes, code) appended to the prompt
    #[arg(long)]
    context: Option<PathBuf>,

    /// Video title used in the prompt and the output filename
    #[arg(short, long)]
    title: Option<String>,

    /// Directory for the generated notes file
    #[arg(short, long, default_value = ".")]
    out: PathBuf,
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

async fn load_payload(source: &str) -> Result<CaptionPayload> {
    if source.starts_with("http://") || source.starts_with("https://") {
        let store = Arc::new(TabStore::new(Arc::new(MemoryStorage::new())));
        let fetcher = CaptionFetcher::new(Arc::clone(&store));

        let spinner = create_spinner("Fetching captions...");
        let url = normalize_caption_url(source);
        let result = fetcher.fetch_candidate(DebugScope::Global, &url).await;
        spinner.finish_and_clear();

        result.context("failed to fetch captions payload")
    } else {
        let raw = fs::read_to_string(source)
            .await
            .with_context(|| format!("failed to read {source}"))?;
        serde_json::from_str(&raw).context("file is not a valid caption JSON payload")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output_format: OutputFormat = cli.format.into();

    println!(
        "\n{}  {}\n",
        style("konspekt").cyan().bold(),
        style("Caption Transcript & Lesson Notes").dim()
    );

    let payload = load_payload(&cli.source).await?;
    let transcript = extract_transcript(&payload.events);

    println!(
        "{} Transcript reconstructed: {} lines, {}",
        style("✓").green().bold(),
        style(transcript.line_count).yellow(),
        style(format_timestamp(transcript.duration_ms)).yellow()
    );

    let transcript_text = if cli.plain {
        &transcript.plain_text
    } else {
        &transcript.timed_text
    };
    if transcript_text.chars().count() < MIN_TRANSCRIPT_CHARS {
        eprintln!(
            "{} Transcript is empty after cleaning.",
            style("Error:").red().bold()
        );
        std::process::exit(1);
    }

    println!("{}", style("─".repeat(60)).dim());
    println!("{transcript_text}");
    println!("{}", style("─".repeat(60)).dim());

    if !cli.summarize {
        return Ok(());
    }

    let generator = match OpenAiGenerator::from_env() {
        Ok(generator) => generator,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    let extra_context = match &cli.context {
        Some(path) => fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read context file {}", path.display()))?,
        None => String::new(),
    };

    let spinner = create_spinner(&format!("Generating lesson notes with {}...", cli.model));
    let prompt = build_prompt(
        cli.title.as_deref(),
        transcript.duration_ms,
        transcript_text,
        &extra_context,
        output_format,
    );
    let notes = generator.generate(&cli.model, &prompt).await?;
    spinner.finish_with_message(format!(
        "{} Lesson notes generated",
        style("✓").green().bold()
    ));

    let extension = match output_format {
        OutputFormat::Html => "html",
        OutputFormat::Md => "md",
    };
    let base = sanitize_filename(cli.title.as_deref().unwrap_or(""));
    let out_path = cli.out.join(format!("{base}.{extension}"));
    fs::write(&out_path, &notes)
        .await
        .with_context(|| format!("failed to write {}", out_path.display()))?;

    println!(
        "\n{} {}\n",
        style("Saved:").dim(),
        style(out_path.display()).cyan()
    );
    println!("{notes}");

    Ok(())
}
