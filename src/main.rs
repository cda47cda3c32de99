use clap::{Parser, Subcommand};
use rmcp::{transport::stdio, ServiceExt};
use sheet_translator::translation::{
    default_output_path, Language, MockTranslator, TranslationRequest, TranslationResult,
};
use sheet_translator::utils::config::LoggingConfig;
use sheet_translator::{
    translate_workbook_file, AppConfig, AppState, SheetTranslatorServer, TermBaseStore,
    TranslationGateway, Translator,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "sheet-translator", version, about = "Translate spreadsheet cells between Chinese and English")]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate one spreadsheet
    Translate {
        input: PathBuf,
        /// Output path (default: <output dir>/<name>_translated.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Use a local tagging translator instead of the vendor API
        #[arg(long)]
        dry_run: bool,
    },
    /// Manage the term base
    Terms {
        #[command(subcommand)]
        action: TermsAction,
    },
    /// Translate a sample phrase to check credentials and connectivity
    Check,
    /// Run the HTTP server
    Serve {
        #[arg(long, default_value_t = 9527)]
        port: u16,
        #[arg(long, default_value = "0.0.0.0")]
        bind: String,
    },
    /// Run the MCP server on stdio
    Mcp,
}

#[derive(Subcommand, Debug)]
enum TermsAction {
    List,
    Add { term: String, translation: String },
    Remove { term: String },
}

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("").add_directive(
            format!("sheet_translator={}", logging.level).parse()?,
        ),
    };
    let json = logging.format.eq_ignore_ascii_case("json");

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();

    Ok(())
}

fn build_translator(config: &AppConfig, dry_run: bool) -> anyhow::Result<Arc<dyn Translator>> {
    if dry_run {
        return Ok(Arc::new(MockTranslator::tagged()));
    }
    Ok(Arc::new(TranslationGateway::from_config(&config.api)?))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    // The configured subscriber depends on the config itself, so loading
    // warnings go through a plain stderr one.
    let bootstrap = fmt().with_writer(std::io::stderr).finish();
    let config = tracing::subscriber::with_default(bootstrap, || {
        AppConfig::load_or_default(Some(&cli.config))
    });
    init_tracing(&config.logging)?;
    tracing::info!(backend = %config.api.backend, "Configuration ready");

    match cli.command {
        Command::Translate {
            input,
            output,
            dry_run,
        } => {
            let output = match output {
                Some(path) => path,
                None => default_output_path(&input, Some(&config.output.directory))?,
            };
            let translator = build_translator(&config, dry_run)?;
            let report = translate_workbook_file(&input, &output, &config, translator).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Terms { action } => {
            let store = TermBaseStore::new(config.term_base.path.clone());
            match action {
                TermsAction::List => {
                    println!("{}", serde_json::to_string_pretty(&store.list())?);
                }
                TermsAction::Add { term, translation } => {
                    let term_base = store.add(&term, &translation)?;
                    println!("Term added ({} entries)", term_base.len());
                }
                TermsAction::Remove { term } => {
                    let term_base = store.remove(&term)?;
                    println!("Term removed ({} entries)", term_base.len());
                }
            }
        }
        Command::Check => {
            let gateway = TranslationGateway::from_config(&config.api)?;
            let request = TranslationRequest::new("你好", Language::Zh, Language::En);

            match gateway.translate(&request).await {
                TranslationResult::Translated(text) => {
                    println!("{} OK: 你好 -> {}", config.api.backend, text);
                }
                TranslationResult::Failed(failure) => {
                    anyhow::bail!("{} check failed: {}", config.api.backend, failure.error);
                }
            }
        }
        Command::Serve { port, bind } => {
            let translator = build_translator(&config, false)?;
            let state = AppState::new(config, translator);
            state.term_store.ensure_exists()?;
            sheet_translator::server::http::serve(state, &bind, port).await?;
        }
        Command::Mcp => {
            let translator = build_translator(&config, false)?;
            let state = AppState::new(config, translator);
            state.term_store.ensure_exists()?;

            tracing::info!("Starting MCP server on stdio");
            let server = SheetTranslatorServer::new(state);
            let service = server.serve(stdio()).await?;
            service.waiting().await?;
            tracing::info!("MCP server shutting down");
        }
    }

    Ok(())
}
