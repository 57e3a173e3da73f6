//! `qedit`: drive a question edit session against form schema files.
//!
//! ```text
//! qedit answers -s form.json --index 2 -c concepts.json
//! qedit check   -s form.json --index 2 -c concepts.json
//! qedit save    -s form.json --section 1 -q question.json -o form.json --force
//! ```

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{ArgAction, Args, Parser, Subcommand};
use color_eyre::eyre::{Report, Result, eyre};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use question_editor::{
    ConceptDirectory, DocumentFormat, EditorOptions, Notification, NotificationKind, Notifier,
    OutputDestination, OutputOptions, QuestionEditor, SchemaCoordinate, StaticDirectory,
    io::{emit, load_concepts, load_form_schema, load_question},
};

#[derive(Debug, Parser)]
#[command(
    name = "qedit",
    version,
    about = "Edit one question of a form schema and write it back"
)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG wins when set
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the question's answer list as displayed: concept answers merged with its own
    Answers(SessionArgs),
    /// Verify the concept and answers, then report what keeps the question from saving
    Check(SessionArgs),
    /// Save the question into the schema and emit the updated schema
    Save(SaveArgs),
}

#[derive(Debug, Args)]
struct SessionArgs {
    /// Form schema file
    #[arg(short = 's', long = "schema", value_name = "PATH")]
    schema: PathBuf,

    #[arg(long = "page", value_name = "N", default_value_t = 0)]
    page: usize,

    #[arg(long = "section", value_name = "N", default_value_t = 0)]
    section: usize,

    /// Question to edit inside the section; omit to create a new one
    #[arg(short = 'i', long = "index", value_name = "N")]
    index: Option<usize>,

    /// Working copy of the question, replacing the stored one (or the blank template)
    #[arg(short = 'q', long = "question", value_name = "PATH")]
    question: Option<PathBuf>,

    /// Concept list used as the concept directory
    #[arg(short = 'c', long = "concepts", value_name = "PATH")]
    concepts: Option<PathBuf>,

    /// Concept server base URL (`/ws/rest/v1/concept` is appended)
    #[cfg(feature = "rest")]
    #[arg(long = "server", value_name = "URL", conflicts_with = "concepts")]
    server: Option<String>,

    #[cfg(feature = "rest")]
    #[arg(long = "user", value_name = "NAME", requires = "server")]
    user: Option<String>,

    #[cfg(feature = "rest")]
    #[arg(long = "password", value_name = "SECRET", requires = "user")]
    password: Option<String>,

    /// Do not resolve the bound concept against the directory
    #[arg(long = "no-verify")]
    no_verify: bool,

    /// Do not look up answers that are not part of the concept
    #[arg(long = "no-answer-check")]
    no_answer_check: bool,
}

#[derive(Debug, Args)]
struct SaveArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Output destinations ("-" writes to stdout); defaults to stdout
    #[arg(short = 'o', long = "output", value_name = "DEST", num_args = 1.., action = ArgAction::Append)]
    outputs: Vec<String>,

    /// Emit compact JSON/TOML rather than pretty formatting
    #[arg(long = "no-pretty")]
    no_pretty: bool,

    /// Overwrite output files even if they already exist
    #[arg(short = 'f', long = "force", short_alias = 'y', alias = "yes")]
    force: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Command::Answers(args) => print_answers(&args).await,
        Command::Check(args) => check(&args).await,
        Command::Save(args) => save(&args).await,
    }
}

fn init_tracing(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}

async fn print_answers(args: &SessionArgs) -> Result<()> {
    let mut editor = open_session(args)?;
    if !args.no_verify && !editor.verify_concept().await? {
        eprintln!("warning: concept could not be resolved; showing stored answers only");
    }
    print_json(&editor.field().display_answers())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckReport {
    id: String,
    concept_valid: bool,
    answers_valid: bool,
    can_save: bool,
    blockers: Vec<String>,
}

async fn check(args: &SessionArgs) -> Result<()> {
    let mut editor = open_session(args)?;
    editor.prepare().await?;

    let blockers = editor.save_blockers();
    let field = editor.field();
    let report = CheckReport {
        id: field.question().id.clone(),
        concept_valid: field.concept_valid(),
        answers_valid: field.answers_valid(),
        can_save: blockers.is_empty(),
        blockers: blockers.iter().map(ToString::to_string).collect(),
    };
    print_json(&report)?;

    if !report.answers_valid {
        eprintln!("warning: some answers do not resolve in the concept directory");
    }
    if !report.can_save {
        return Err(eyre!("question cannot be saved: {}", report.blockers.join("; ")));
    }
    Ok(())
}

async fn save(args: &SaveArgs) -> Result<()> {
    let output = build_output_options(args)?;
    let mut editor = open_session(&args.session)?.with_notifier(Arc::new(StderrNotifier));
    editor.prepare().await?;
    if !editor.field().answers_valid() {
        eprintln!("warning: some answers do not resolve in the concept directory");
    }

    let mut saved = None;
    editor.save(|schema| saved = Some(schema))?;
    let schema = saved.ok_or_else(|| eyre!("save finished without producing a schema"))?;
    emit(&schema, &output).map_err(lift)
}

fn open_session(args: &SessionArgs) -> Result<QuestionEditor> {
    let schema = Arc::new(load_form_schema(&args.schema).map_err(lift)?);
    let working = args
        .question
        .as_deref()
        .map(load_question)
        .transpose()
        .map_err(lift)?;

    let editor = match (args.index, working) {
        (Some(index), working) => {
            let coordinate = SchemaCoordinate::at(args.page, args.section, index);
            let editor = QuestionEditor::edit(Arc::clone(&schema), coordinate)?;
            match working {
                Some(working) => {
                    let original = editor.original().cloned();
                    QuestionEditor::with_working_copy(schema, coordinate, original, working)
                }
                None => editor,
            }
        }
        (None, Some(working)) => QuestionEditor::with_working_copy(
            schema,
            SchemaCoordinate::append(args.page, args.section),
            None,
            working,
        ),
        (None, None) => QuestionEditor::create(schema, args.page, args.section),
    };
    debug!(coordinate = %editor.coordinate(), new = editor.is_new(), "session opened");

    let options = EditorOptions::default()
        .with_concept_verification(!args.no_verify)
        .with_answer_validation(!args.no_answer_check);
    let editor = editor.with_options(options);
    Ok(match build_directory(args)? {
        Some(directory) => editor.with_directory(directory),
        None => editor,
    })
}

fn build_directory(args: &SessionArgs) -> Result<Option<Arc<dyn ConceptDirectory>>> {
    if let Some(directory) = remote_directory(args) {
        return Ok(Some(directory));
    }
    match args.concepts.as_deref() {
        Some(path) => {
            let concepts = load_concepts(path).map_err(lift)?;
            debug!(count = concepts.len(), "concept directory loaded");
            Ok(Some(Arc::new(StaticDirectory::from_concepts(concepts))))
        }
        None => Ok(None),
    }
}

#[cfg(feature = "rest")]
fn remote_directory(args: &SessionArgs) -> Option<Arc<dyn ConceptDirectory>> {
    use question_editor::{RestDirectory, RestDirectoryConfig};

    let server = args.server.as_deref()?;
    let mut config = RestDirectoryConfig::new(server);
    if let Some(user) = args.user.as_deref() {
        config = config.with_credentials(user, args.password.clone().unwrap_or_default());
    }
    Some(Arc::new(RestDirectory::new(config)))
}

#[cfg(not(feature = "rest"))]
fn remote_directory(_args: &SessionArgs) -> Option<Arc<dyn ConceptDirectory>> {
    None
}

fn build_output_options(args: &SaveArgs) -> Result<OutputOptions> {
    let mut destinations = Vec::new();
    let mut format = None;
    for raw in &args.outputs {
        if raw.trim().is_empty() {
            return Err(eyre!("output destination cannot be empty"));
        }
        if raw == "-" {
            destinations.push(OutputDestination::Stdout);
            continue;
        }
        let path = Path::new(raw);
        let detected = DocumentFormat::from_path(path).ok_or_else(|| {
            eyre!(
                "cannot infer format from output file {}; use one of: {}",
                path.display(),
                format_list()
            )
        })?;
        if let Some(existing) = format
            && existing != detected
        {
            return Err(eyre!(
                "output file {} uses {detected} but other destinations use {existing}; align extensions",
                path.display()
            ));
        }
        if path.exists() && !args.force {
            return Err(eyre!(
                "file {} already exists (pass --force to overwrite)",
                path.display()
            ));
        }
        format = Some(detected);
        destinations.push(OutputDestination::file(path));
    }
    if destinations.is_empty() {
        destinations.push(OutputDestination::Stdout);
    }

    let format = format
        .or_else(|| DocumentFormat::from_path(&args.session.schema))
        .unwrap_or_default();
    Ok(OutputOptions::new(format)
        .with_pretty(!args.no_pretty)
        .with_destinations(destinations))
}

fn format_list() -> String {
    let items: Vec<String> = DocumentFormat::available_formats()
        .into_iter()
        .map(|fmt| fmt.to_string())
        .collect();
    items.join(", ")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn lift(err: impl Display) -> Report {
    eyre!("{err:#}")
}

/// Prints save notifications to stderr so stdout stays machine-readable.
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => {
                eprintln!("{}: {}", notification.title, notification.subtitle)
            }
            NotificationKind::Error => {
                eprintln!("error: {}: {}", notification.title, notification.subtitle)
            }
        }
    }
}
