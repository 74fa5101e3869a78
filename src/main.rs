use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

use scribe::banner::{BannerInfo, print_banner, print_session_summary};
use scribe::commands::{self, CommandRegistry, CommandResult, render_form};
use scribe::config::{Config, KEYS, Overrides, Settings};
use scribe::consts::{DEFAULT_LOOKUP_TIMEOUT_SECS, default_db_path};
use scribe::form::ValidationRules;
use scribe::lookup::http::HttpLookup;
use scribe::navigator::Navigator;
use scribe::questions::StaticQuestions;
use scribe::questions::sqlite::SqliteQuestionPool;
use scribe::session::{Session, SessionConfig};
use scribe::store::TraceStore;
use scribe::store::sqlite::SqliteStore;

#[derive(Parser)]
#[command(
    name = "scribe",
    version,
    about = "Record thought / action / observation traces for trivia questions."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// SQLite database for traces, the question pool and config
    /// (use :memory: for ephemeral) [default: ~/.scribe/scribe.db]
    #[arg(short, long)]
    db: Option<String>,

    /// Lookup service endpoint
    #[arg(long)]
    lookup_url: Option<String>,

    /// Minimum action input length in characters
    #[arg(long)]
    min_input_len: Option<usize>,

    /// Separator between the question and the input for context tools
    #[arg(long)]
    separator: Option<String>,

    /// Draw questions from the database pool instead of the built-in list
    #[arg(long, default_value_t = false)]
    pool: bool,

    /// Store traces without their question text
    #[arg(long, default_value_t = false)]
    no_question: bool,

    /// Lookup request timeout in seconds
    #[arg(short, long, default_value_t = DEFAULT_LOOKUP_TIMEOUT_SECS)]
    timeout: u64,

    /// More log output on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Read or change stored settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Manage the question pool
    Questions {
        #[command(subcommand)]
        action: QuestionsAction,
    },
    /// Print every stored trace as one JSON object per line
    Export,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show one key, or every key when none is given
    Get { key: Option<String> },
    Set { key: String, value: String },
    Unset { key: String },
}

#[derive(Subcommand)]
enum QuestionsAction {
    /// Add questions given as arguments. Each is shown at most once
    Add {
        #[arg(required = true)]
        texts: Vec<String>,
    },
    /// Add one question per line from a file
    Import { file: PathBuf },
    /// Show how many pooled questions have not been shown yet
    /// (a question is consumed once displayed, answered or skipped)
    Count,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn prepare_db_path(db: Option<String>) -> anyhow::Result<String> {
    let path = match db {
        Some(p) => p,
        None => default_db_path().to_string_lossy().into_owned(),
    };
    if path != ":memory:"
        && let Some(parent) = Path::new(&path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(path)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let db = prepare_db_path(cli.db.clone())?;

    if let Some(command) = cli.command {
        return match command {
            Command::Config { action } => handle_config(&db, action),
            Command::Questions { action } => handle_questions(&db, action),
            Command::Export => handle_export(&db).await,
        };
    }

    let config = Config::open(&db)?;
    let settings = Settings::resolve(
        &Overrides {
            lookup_url: cli.lookup_url,
            action_input_min_len: cli.min_input_len,
            separator: cli.separator,
            store_question: cli.no_question.then_some(false),
        },
        &config,
    )?;

    let lookup = HttpLookup::new(&settings.lookup_url, Duration::from_secs(cli.timeout))?;
    let store = Arc::new(SqliteStore::open(&db)?);

    let (navigator, questions_label) = if cli.pool {
        let pool = Arc::new(SqliteQuestionPool::open(&db)?);
        let label = format!("pool ({} not yet shown)", pool.remaining()?);
        (Navigator::pooled(pool).await?, label)
    } else {
        let questions = StaticQuestions::builtin();
        let label = format!("built-in list ({})", questions.len());
        (Navigator::with_static(questions)?, label)
    };

    let storage_label = if db == ":memory:" { "ephemeral" } else { db.as_str() };
    print_banner(&BannerInfo {
        questions: &questions_label,
        lookup_url: lookup.url(),
        storage: storage_label,
        min_input_len: settings.action_input_min_len,
        separator: &settings.separator,
    });

    let session_config = SessionConfig {
        rules: ValidationRules {
            action_input_min_len: settings.action_input_min_len,
            ..ValidationRules::default()
        },
        separator: settings.separator,
        store_question: settings.store_question,
    };
    let mut session = Session::new(navigator, Arc::new(lookup), store.clone(), session_config);

    let stored_before = store.count().await?;
    run_repl(&mut session).await?;
    let stored_after = store.count().await?;

    print_session_summary(stored_after.saturating_sub(stored_before), stored_after);
    Ok(())
}

async fn run_repl(session: &mut Session) -> anyhow::Result<()> {
    let registry = CommandRegistry::new();
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    print!("{}", render_form(session));

    loop {
        print!("\n{}> ", prompt_label(session));
        io::stdout().flush()?;

        let Some(line) = read_line(&mut lines).await else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match registry.dispatch(input, session).await {
            CommandResult::Quit => break,
            CommandResult::Handled => {}
            CommandResult::NotACommand => {
                println!("  fields are set with commands, e.g. /thought <text>");
                println!("  type /help for available commands");
            }
            CommandResult::Confirm(direction) => {
                print!("  You will lose any progress made in this question. Continue? [y/N] ");
                io::stdout().flush()?;
                let Some(answer) = read_line(&mut lines).await else {
                    break;
                };
                if answer.trim().eq_ignore_ascii_case("y") {
                    commands::navigate(session, direction, true).await;
                } else {
                    println!("  cancelled");
                    continue;
                }
            }
        }

        if session.navigator().is_exhausted() {
            println!("  the question pool is empty; nothing more to annotate");
            break;
        }
    }
    Ok(())
}

/// Next stdin line. `None` on EOF, Ctrl+C, or a read error.
async fn read_line(lines: &mut Lines<BufReader<Stdin>>) -> Option<String> {
    tokio::select! {
        result = lines.next_line() => match result {
            Ok(Some(line)) => Some(line),
            Ok(None) => {
                println!();
                None
            }
            Err(e) => {
                eprintln!("input error: {e}");
                None
            }
        },
        _ = tokio::signal::ctrl_c() => {
            println!();
            None
        }
    }
}

fn prompt_label(session: &Session) -> String {
    let question = session.navigator().index() + 1;
    let steps = session.trace().len();
    let mode = if session.form().is_final() { " final" } else { "" };
    format!("q{question} s{steps}{mode}")
}

fn handle_config(db: &str, action: ConfigAction) -> anyhow::Result<()> {
    let config = Config::open(db)?;
    match action {
        ConfigAction::Get { key: Some(key) } => match config.get(&key)? {
            Some(value) => println!("{value}"),
            None => println!("(unset)"),
        },
        ConfigAction::Get { key: None } => {
            for key in KEYS {
                let value = config.get(key)?.unwrap_or_else(|| "(unset)".to_string());
                println!("{key} = {value}");
            }
        }
        ConfigAction::Set { key, value } => {
            config.set(&key, &value)?;
            println!("✓ {key} = {value}");
        }
        ConfigAction::Unset { key } => {
            config.remove(&key)?;
            println!("✓ {key} unset");
        }
    }
    Ok(())
}

fn handle_questions(db: &str, action: QuestionsAction) -> anyhow::Result<()> {
    let pool = SqliteQuestionPool::open(db)?;
    match action {
        QuestionsAction::Add { texts } => {
            for text in &texts {
                pool.add(text)?;
            }
            println!("✓ added {} question(s)", texts.len());
        }
        QuestionsAction::Import { file } => {
            let contents = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let added = pool.import(&contents)?;
            println!("✓ imported {added} question(s)");
        }
        QuestionsAction::Count => println!("{}", pool.remaining()?),
    }
    Ok(())
}

async fn handle_export(db: &str) -> anyhow::Result<()> {
    let store = SqliteStore::open(db)?;
    let records = store.records().await?;
    let mut out = io::stdout().lock();
    for record in records {
        writeln!(out, "{}", serde_json::to_string(&record)?)?;
    }
    Ok(())
}
