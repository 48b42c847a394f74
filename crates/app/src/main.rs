use std::fmt;
use std::io::Write as _;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use quiz_core::model::{Difficulty, QuizSettingsDraft, ReportId};
use services::export::render_markdown;
use services::{
    AppServices, Clock, CompletionConfig, InvalidAnswer, LearnerProfile, QuizServiceError,
    QuizSession, SessionError, SessionState,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug)]
enum CliError {
    InvalidDbUrl { raw: String },
    AiDisabled,
    MissingName,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            CliError::AiDisabled => {
                write!(f, "text generation is not configured; set QUIZ_AI_API_KEY")
            }
            CliError::MissingName => write!(f, "a learner name is required"),
        }
    }
}

impl std::error::Error for CliError {}

/// Network Architecture tutor: generated exams, explanations and exercises.
#[derive(Parser, Debug)]
#[command(name = "quiz")]
#[command(version)]
struct Cli {
    /// `SQLite` database holding finished reports
    #[arg(long, global = true, env = "QUIZ_DB_URL", default_value = "sqlite://quiz.sqlite3")]
    db: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Take a generated multiple-choice exam
    Exam(ExamArgs),
    /// Explain a networking concept
    Explain {
        /// Concept to explain
        #[arg(required = true, num_args = 1..)]
        topic: Vec<String>,
    },
    /// Propose a new exercise (without solution)
    Exercise {
        topic: String,
        #[arg(short, long, default_value = "basic")]
        difficulty: Difficulty,
    },
    /// Have a free-text answer to an exercise reviewed
    Review {
        #[arg(long)]
        exercise: String,
        #[arg(long)]
        answer: String,
    },
    /// List finished exams, or print one report
    History {
        #[arg(long, default_value_t = 20)]
        limit: u32,
        /// Print the full report with this id
        #[arg(long)]
        id: Option<u64>,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct ExamArgs {
    /// Number of questions (3-10)
    #[arg(short = 'n', long)]
    count: Option<u32>,
    /// Generation attempts allowed for the whole exam
    #[arg(long)]
    budget: Option<u32>,
    #[arg(short, long, default_value = "basic")]
    difficulty: Difficulty,
    /// Topic to draw questions from; repeat for several
    #[arg(short, long = "topic")]
    topics: Vec<String>,
    #[arg(long, env = "QUIZ_LEARNER_NAME")]
    name: Option<String>,
    #[arg(long, env = "QUIZ_LEARNER_EMAIL")]
    email: Option<String>,
    /// Also write Markdown and HTML reports here
    #[arg(long, env = "QUIZ_EXPORT_DIR")]
    export_dir: Option<PathBuf>,
}

type InputLines = Lines<BufReader<Stdin>>;

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| CliError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(CliError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn prompt(lines: &mut InputLines, label: &str) -> std::io::Result<Option<String>> {
    print!("{label}");
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?.map(|line| line.trim().to_string()))
}

fn print_question(session: &QuizSession) {
    let Some(question) = session.current_question() else {
        return;
    };
    let progress = session.progress();
    println!();
    println!(
        "Question {} of {}: {}",
        progress.position,
        progress.total,
        question.text()
    );
    for option in question.options() {
        println!("  {}) {}", option.label(), option.text());
    }
}

async fn run_exam(
    services: &AppServices,
    args: ExamArgs,
    lines: &mut InputLines,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = QuizSettingsDraft {
        question_count: args.count,
        retry_budget: args.budget,
        difficulty: args.difficulty,
        topics: args.topics,
    }
    .validate()?;

    let name = match args.name.filter(|name| !name.trim().is_empty()) {
        Some(name) => name,
        None => prompt(lines, "Your name: ")
            .await?
            .filter(|name| !name.is_empty())
            .ok_or(CliError::MissingName)?,
    };
    let learner = LearnerProfile {
        name,
        email: args.email,
    };

    println!(
        "Generating {} {} questions on {}...",
        settings.question_count(),
        settings.difficulty(),
        settings.topic_label()
    );
    let quiz = services.quiz_loop();
    let mut session = quiz.start_quiz(&settings).await?;

    while let SessionState::InProgress { .. } = session.state() {
        print_question(&session);
        let Some(input) = prompt(lines, "Your answer (A-D, q to quit): ").await? else {
            session.reset();
            println!("\nExam abandoned.");
            return Ok(());
        };
        if input.eq_ignore_ascii_case("q") {
            session.reset();
            println!("Exam abandoned.");
            return Ok(());
        }

        let feedback = match quiz.answer_current(&mut session, &input) {
            Ok(feedback) => feedback,
            Err(QuizServiceError::Session(SessionError::InvalidAnswer(
                err @ InvalidAnswer::UnknownLabel(_),
            ))) => {
                println!("{err}");
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        if feedback.is_correct {
            println!("Correct!");
        } else {
            println!(
                "Incorrect. The correct answer was {}) {}",
                feedback.correct, feedback.correct_text
            );
        }
        println!("Explanation: {}", feedback.explanation);
        quiz.advance(&mut session)?;
    }

    let finished = quiz.finish(&session, &learner, &settings).await?;
    println!();
    println!(
        "Finished: {} / {} correct ({:.0}%)",
        finished.report.score(),
        finished.report.total(),
        finished.report.percentage()
    );
    if let Some(id) = finished.persisted_id {
        println!("Saved as report {id}.");
    }
    for artifact in &finished.artifacts {
        println!("Wrote {}", artifact.path.display());
    }
    for warning in &finished.warnings {
        eprintln!("warning: {warning}");
    }
    Ok(())
}

async fn run_history(
    services: &AppServices,
    limit: u32,
    id: Option<u64>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let history = services.history();
    if let Some(id) = id {
        let stored = history.get(ReportId::new(id)).await?;
        if json {
            println!("{}", serde_json::to_string_pretty(&stored.report)?);
        } else {
            print!("{}", render_markdown(&stored.metadata, &stored.report));
        }
        return Ok(());
    }

    let items = history.list_recent(limit).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }
    if items.is_empty() {
        println!("No finished exams yet.");
    }
    for item in items {
        println!(
            "#{:<4} {}  {:>2}/{:<2}  {:<12} {} ({})",
            item.id.value(),
            item.completed_at.format("%Y-%m-%d %H:%M"),
            item.score,
            item.total,
            item.difficulty.as_str(),
            item.topic,
            item.learner_name
        );
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let db_url = normalize_sqlite_url(cli.db);
    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&db_url)?;
    debug!(db_url = %db_url, "opening report database");

    let export_dir = match &cli.command {
        Command::Exam(args) => args.export_dir.clone(),
        _ => None,
    };
    let services = AppServices::new_sqlite(
        &db_url,
        Clock::default(),
        CompletionConfig::from_env()?,
        export_dir,
    )
    .await?;

    let needs_ai = !matches!(cli.command, Command::History { .. });
    if needs_ai && !services.ai_enabled() {
        return Err(CliError::AiDisabled.into());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    match cli.command {
        Command::Exam(args) => run_exam(&services, args, &mut lines).await,
        Command::Explain { topic } => {
            let text = services.tutor().explain_concept(&topic.join(" ")).await?;
            println!("{text}");
            Ok(())
        }
        Command::Exercise { topic, difficulty } => {
            info!(%topic, %difficulty, "requesting exercise");
            let text = services.tutor().propose_exercise(&topic, difficulty).await?;
            println!("{text}");
            Ok(())
        }
        Command::Review { exercise, answer } => {
            let text = services.tutor().review_answer(&exercise, &answer).await?;
            println!("{text}");
            Ok(())
        }
        Command::History { limit, id, json } => run_history(&services, limit, id, json).await,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quiz=info,services=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_exam_flags() {
        let cli = Cli::try_parse_from([
            "quiz", "--db", "sqlite::memory:", "exam", "-n", "4", "-d", "avanzado", "-t", "VLANs",
            "-t", "OSPF", "--name", "Ana",
        ])
        .unwrap();
        assert_eq!(cli.db, "sqlite::memory:");
        let Command::Exam(args) = cli.command else {
            panic!("expected exam");
        };
        assert_eq!(args.count, Some(4));
        assert_eq!(args.difficulty, Difficulty::Advanced);
        assert_eq!(args.topics, ["VLANs", "OSPF"]);
    }

    #[test]
    fn cli_rejects_unknown_difficulty() {
        assert!(Cli::try_parse_from(["quiz", "exercise", "NAT", "-d", "expert"]).is_err());
    }

    #[test]
    fn sqlite_urls_are_normalized() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:/tmp/quiz.db".into()),
            "sqlite:///tmp/quiz.db"
        );
        assert!(normalize_sqlite_url("quiz.db".into()).ends_with("/quiz.db"));
    }

    #[test]
    fn prepare_rejects_non_file_urls() {
        assert!(prepare_sqlite_file("sqlite::memory:").is_ok());
        assert!(prepare_sqlite_file("postgres://db").is_err());
    }
}
