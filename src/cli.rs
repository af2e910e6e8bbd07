use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Scrape(ScrapeArgs),
    Transliterate(TransliterateArgs),
}

#[derive(Debug, Args)]
pub struct ScrapeArgs {
    /// JSON job file: `{"creds": {"username", "pw"}, "courses": [...], "root"}`.
    #[arg(long)]
    pub job: Option<std::path::PathBuf>,

    /// Course id or course URL (repeatable, added to the job's courses).
    #[arg(long)]
    pub course: Vec<String>,

    /// Level selector for `--course` entries, e.g. `1-4,7` or `all`.
    #[arg(long)]
    pub levels: Option<String>,

    /// Account name (password comes from the job file or MEMRISE_PASSWORD).
    #[arg(long)]
    pub username: Option<String>,

    /// Output root for level files (default: job `root`, then `data`).
    #[arg(long)]
    pub out: Option<String>,

    /// Platform origin.
    #[arg(long, default_value = crate::config::DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Maximum requests per window.
    #[arg(long, default_value_t = 2)]
    pub max_requests: usize,

    /// Rate window length.
    #[arg(long, default_value_t = 1000)]
    pub window_ms: u64,

    /// JSON map of Japanese surface forms to kana readings.
    #[arg(long)]
    pub japanese_lexicon: Option<String>,

    /// Also save each word's audio files under `{out}/{course}/audio/`.
    #[arg(long)]
    pub download_audio: bool,
}

#[derive(Debug, Args)]
pub struct TransliterateArgs {
    /// Course display language, e.g. `Japanese`.
    #[arg(long)]
    pub lang: String,

    /// JSON map of Japanese surface forms to kana readings.
    #[arg(long)]
    pub japanese_lexicon: Option<String>,

    pub text: String,
}
