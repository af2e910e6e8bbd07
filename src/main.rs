use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

use memrise_scrape::transliterate::Transliterator;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    memrise_scrape::logging::init().context("init logging")?;

    let cli = memrise_scrape::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        memrise_scrape::cli::Command::Scrape(args) => {
            memrise_scrape::pipeline::run(args).await.context("scrape")?;
        }
        memrise_scrape::cli::Command::Transliterate(args) => {
            let lexicon = args.japanese_lexicon.as_deref().map(std::path::Path::new);
            let transliterator = Transliterator::with_lexicon(lexicon).context("load lexicon")?;
            let result = transliterator.transliterate(&args.text, &args.lang);
            println!(
                "{}",
                serde_json::to_string_pretty(&result).context("serialize transliteration")?
            );
        }
    }

    Ok(())
}
