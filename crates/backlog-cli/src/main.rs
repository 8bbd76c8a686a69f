//! backlog CLI — score, track and report on backlog requests.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use backlog_core::record::{RequestId, SortOrder};

mod commands;

#[derive(Parser)]
#[command(
    name = "backlog",
    version,
    about = "Questionnaire-based backlog complexity estimator"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Caller identity used for rate limiting
    #[arg(long, global = true, default_value = "local")]
    client: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the questionnaire and the scoring reference
    Questions,

    /// Score an answer set without saving it
    Score {
        /// Selected option label, one per question in order ("" skips a question)
        #[arg(long = "answer")]
        answers: Vec<String>,

        /// Show how each answer contributed
        #[arg(long)]
        explain: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Score and save a new request
    Add {
        /// Request title
        #[arg(long)]
        title: String,

        /// Selected option label, one per question in order
        #[arg(long = "answer")]
        answers: Vec<String>,
    },

    /// List saved requests
    List {
        /// Only show requests with this complexity label
        #[arg(long)]
        complexity: Option<String>,

        /// Score order: asc or desc
        #[arg(long, default_value = "desc")]
        sort: SortOrder,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show one request
    Show {
        id: RequestId,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Change a request's title or answers and rescore it
    Edit {
        id: RequestId,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// Replacement answer set, one per question in order
        #[arg(long = "answer")]
        answers: Vec<String>,

        /// Drop every stored answer (the request then scores 0)
        #[arg(long, conflicts_with = "answers")]
        clear_answers: bool,
    },

    /// Delete a request
    Remove { id: RequestId },

    /// Write an HTML report of the backlog
    Report {
        /// Output file
        #[arg(long, default_value = "backlog-report.html")]
        output: PathBuf,
    },

    /// Validate a questionnaire TOML file
    Validate {
        /// Path to the questionnaire file
        #[arg(long)]
        questionnaire: PathBuf,
    },

    /// Create a starter config and questionnaire
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("backlog=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();
    let client = cli.client.as_str();

    let result = match cli.command {
        Commands::Questions => commands::questions::execute(config),
        Commands::Score {
            answers,
            explain,
            json,
        } => commands::score::execute(config, answers, explain, json),
        Commands::Add { title, answers } => {
            commands::add::execute(config, client, title, answers).await
        }
        Commands::List {
            complexity,
            sort,
            format,
        } => commands::list::execute(config, client, complexity, sort, format).await,
        Commands::Show { id, format } => commands::show::execute(config, client, id, format).await,
        Commands::Edit {
            id,
            title,
            answers,
            clear_answers,
        } => commands::edit::execute(config, client, id, title, answers, clear_answers).await,
        Commands::Remove { id } => commands::remove::execute(config, client, id).await,
        Commands::Report { output } => commands::report::execute(config, client, output).await,
        Commands::Validate { questionnaire } => commands::validate::execute(questionnaire),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
