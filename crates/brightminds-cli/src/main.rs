use anyhow::Result;
use clap::Parser;

mod app;
mod commands;
mod render;
mod theme;

#[derive(Parser)]
#[command(name = "brightminds")]
#[command(about = "AMUN Bright Minds Academy - AI assistant")]
#[command(version)]
struct Cli {
    /// Ask a single question and exit
    #[arg(short, long)]
    ask: Option<String>,

    /// Model to use
    #[arg(short, long)]
    model: Option<String>,

    /// Completion provider (openai, claude, ollama, proxy)
    #[arg(long)]
    provider: Option<String>,

    /// Color theme (dark, light); defaults to the config file's choice
    #[arg(long)]
    theme: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut settings = brightminds_core::Settings::load();

    if let Some(ref provider) = cli.provider {
        let id = provider
            .parse::<brightminds_core::ProviderId>()
            .map_err(anyhow::Error::msg)?;
        settings.set_provider(id);
    }
    if let Some(ref model) = cli.model {
        settings.assistant.model = model.clone();
    }

    if let Some(question) = cli.ask {
        app::run_single_prompt(&settings, &question).await?;
    } else {
        let theme = cli.theme.unwrap_or_else(|| settings.ui.theme.clone());
        app::run_tui(settings, &theme).await?;
    }

    Ok(())
}
