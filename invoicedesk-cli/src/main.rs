use std::fmt;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Report, Result, WrapErr, eyre};
use serde_json::json;

use invoicedesk::{
    FileBackend, InvoiceDesk, Landing, Screen, SessionBackend, SessionStore,
    app::{DeskOptions, FileHandle, LoginOutcome, SubmitOutcome},
    io::{DocumentFormat, OutputDestination, OutputOptions, RecordKind, export_record},
    schema::{EXPENSE_SUBGROUP, invoice_schema},
};

const DEFAULT_STORE: &str = ".invoicedesk/session.json";
const LOG_ENV: &str = "INVOICEDESK_LOG";

#[derive(Debug, Parser)]
#[command(
    name = "invoicedesk",
    version,
    about = "Log in, fill in, save and submit invoices from the terminal"
)]
struct Cli {
    /// Session file holding the login flag, the draft and the submitted invoice
    #[arg(
        long = "store",
        env = "INVOICEDESK_STORE",
        value_name = "PATH",
        default_value = DEFAULT_STORE
    )]
    store: PathBuf,

    /// Keep the session in memory only; nothing is read from or written to disk
    #[arg(long = "memory")]
    memory: bool,

    /// Load the saved draft whenever the invoice screen opens
    #[arg(long = "restore-draft")]
    restore_draft: bool,

    /// Start with the expense details block collapsed
    #[arg(long = "collapse-expenses")]
    collapse_expenses: bool,

    /// Log debug events to stderr
    #[arg(short = 'v', long = "verbose", global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short = 'q', long = "quiet", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read workflow commands from stdin, one per line (default)
    Shell,
    /// Print what the session currently holds
    Status {
        /// Print the summary as JSON
        #[arg(long = "json")]
        json: bool,
    },
    /// Write the draft or the submitted invoice as a typed document
    Export(ExportArgs),
}

#[derive(Debug, Args)]
struct ExportArgs {
    /// Which record to export
    #[arg(long = "which", value_enum, default_value_t = RecordArg::Committed)]
    which: RecordArg,

    /// Output format; inferred from the first output file when omitted
    #[arg(long = "format", value_name = "FORMAT")]
    format: Option<String>,

    /// Output destinations ("-" writes to stdout). Accepts multiple values per flag use.
    #[arg(short = 'o', long = "output", value_name = "DEST", num_args = 1.., action = ArgAction::Append)]
    outputs: Vec<String>,

    /// Emit compact JSON/TOML rather than pretty formatting
    #[arg(long = "no-pretty")]
    no_pretty: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RecordArg {
    Draft,
    Committed,
}

impl From<RecordArg> for RecordKind {
    fn from(value: RecordArg) -> Self {
        match value {
            RecordArg::Draft => RecordKind::Draft,
            RecordArg::Committed => RecordKind::Committed,
        }
    }
}

/// One line typed into the shell.
#[derive(Debug, Parser)]
#[command(
    name = "invoicedesk",
    no_binary_name = true,
    disable_version_flag = true
)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Debug, Subcommand)]
enum ShellCommand {
    /// Navigate to a path ("/", "/invoice", "/success")
    Goto { path: String },
    /// Submit the login form
    Login {
        #[arg(default_value = "")]
        username: String,
        #[arg(default_value = "")]
        password: String,
    },
    /// Switch to a tab by id (vendor, invoice, comments)
    Tab { id: String },
    /// Move to the next tab
    NextTab,
    /// Move to the previous tab
    PrevTab,
    /// Set a field; the rest of the line is the value
    Set {
        field: String,
        #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Empty a field
    Clear { field: String },
    /// Collapse or expand the expense details block
    ToggleExpenses,
    /// List errors of the active tab, or every error with --all
    Errors {
        #[arg(long = "all")]
        all: bool,
    },
    /// Print the active tab with its current values
    Show,
    /// Attach the invoice document
    Attach { path: PathBuf },
    /// Save the form as a draft
    SaveDraft,
    /// Replace the form with the saved draft
    LoadDraft,
    /// Submit the invoice
    Submit,
    /// Print the logged in user
    Whoami,
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

enum Flow {
    Continue,
    Quit,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    if cli.memory {
        run(&cli, SessionStore::in_memory())
    } else {
        tracing::debug!(store = %cli.store.display(), "opening session file");
        let backend = FileBackend::open(&cli.store)
            .wrap_err_with(|| format!("failed to open session store {}", cli.store.display()))?;
        run(&cli, SessionStore::new(backend))
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|error| eyre!("failed to initialize tracing subscriber: {error}"))
}

fn run<B: SessionBackend>(cli: &Cli, session: SessionStore<B>) -> Result<()> {
    match &cli.command {
        None | Some(Command::Shell) => {
            let options = DeskOptions::default()
                .with_restore_draft(cli.restore_draft)
                .with_expense_details(!cli.collapse_expenses);
            let mut desk = InvoiceDesk::new(session, options).map_err(lift)?;
            run_shell(&mut desk)
        }
        Some(Command::Status { json }) => print_status(&session, *json),
        Some(Command::Export(args)) => run_export(&session, args),
    }
}

/// Library loaders return `anyhow` errors; keep their context chain.
fn lift(err: impl fmt::Display) -> Report {
    eyre!("{err:#}")
}

fn run_shell<B: SessionBackend>(desk: &mut InvoiceDesk<B>) -> Result<()> {
    let mut out = io::stdout().lock();
    let landing = desk.navigate("/")?;
    print_landing(&mut out, &landing)?;

    for line in io::stdin().lock().lines() {
        let line = line.wrap_err("failed to read from stdin")?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let parsed = match ShellLine::try_parse_from(trimmed.split_whitespace()) {
            Ok(parsed) => parsed,
            Err(err) => {
                err.print().wrap_err("failed to print command help")?;
                continue;
            }
        };
        match execute(desk, parsed.command, &line, &mut out) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(err) => writeln!(out, "error: {err:#}")?,
        }
        out.flush()?;
    }
    Ok(())
}

fn execute<B: SessionBackend>(
    desk: &mut InvoiceDesk<B>,
    command: ShellCommand,
    line: &str,
    out: &mut impl Write,
) -> Result<Flow> {
    match command {
        ShellCommand::Goto { path } => {
            let landing = desk.navigate(&path)?;
            print_landing(out, &landing)?;
        }
        ShellCommand::Login { username, password } => match desk.login(&username, &password)? {
            LoginOutcome::LoggedIn { actor } => {
                writeln!(out, "logged in as {actor}")?;
                if let Some(screen) = desk.screen() {
                    writeln!(out, "screen: {screen}")?;
                }
            }
            LoginOutcome::Rejected(errors) => {
                for (field, message) in errors.iter() {
                    writeln!(out, "{field}: {message}")?;
                }
            }
        },
        ShellCommand::Tab { id } => {
            let section = desk.activate_section(&id)?;
            writeln!(out, "tab: {}", section.title)?;
        }
        ShellCommand::NextTab => step_tab(desk, 1, out)?,
        ShellCommand::PrevTab => step_tab(desk, -1, out)?,
        ShellCommand::Set { field, value } => {
            // clap splits on whitespace; take the value from the line itself
            let value = if value.is_empty() {
                ""
            } else {
                text_after_words(line, 2)
            };
            match desk.set_field(&field, value)? {
                Some(message) => writeln!(out, "{field}: {message}")?,
                None => writeln!(out, "{}", desk.status())?,
            }
        }
        ShellCommand::Clear { field } => {
            desk.clear_field(&field)?;
            if let Some(message) = desk.invoice_form().field_error(&field) {
                writeln!(out, "{field}: {message}")?;
            }
        }
        ShellCommand::ToggleExpenses => {
            let visible = desk.toggle_expense_details()?;
            let state = if visible { "shown" } else { "hidden" };
            writeln!(out, "expense details {state} ({})", desk.expense_summary())?;
        }
        ShellCommand::Errors { all } => print_errors(desk, all, out)?,
        ShellCommand::Show => print_form(desk, out)?,
        ShellCommand::Attach { path } => {
            let file = read_attachment(&path)?;
            let selected = desk.attach_file(file)?;
            let note = if selected.accepted { "" } else { " (not a PDF)" };
            writeln!(out, "{}{note}", desk.status())?;
        }
        ShellCommand::SaveDraft => {
            desk.save_draft()?;
            writeln!(out, "{}", desk.status())?;
        }
        ShellCommand::LoadDraft => {
            desk.load_draft()?;
            writeln!(out, "{}", desk.status())?;
        }
        ShellCommand::Submit => match desk.submit()? {
            SubmitOutcome::Committed(_) => {
                writeln!(out, "{}", desk.status())?;
                if let Some(screen) = desk.screen() {
                    writeln!(out, "screen: {screen}")?;
                }
            }
            SubmitOutcome::Blocked(errors) => {
                for (field, message) in errors.iter() {
                    writeln!(out, "{field}: {message}")?;
                }
                writeln!(out, "{}", desk.status())?;
            }
        },
        ShellCommand::Whoami => match desk.session().actor_name() {
            Some(actor) if desk.session().is_authenticated() => writeln!(out, "{actor}")?,
            _ => writeln!(out, "not logged in")?,
        },
        ShellCommand::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

/// Raw text following the first `count` words of `line`, inner spacing intact.
fn text_after_words(line: &str, count: usize) -> &str {
    let mut rest = line.trim_start();
    for _ in 0..count {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        rest = rest[end..].trim_start();
    }
    rest
}

fn step_tab<B: SessionBackend>(
    desk: &mut InvoiceDesk<B>,
    delta: i32,
    out: &mut impl Write,
) -> Result<()> {
    if let Some(section) = desk.next_section(delta)? {
        writeln!(out, "tab: {}", section.title)?;
    }
    Ok(())
}

fn print_landing(out: &mut impl Write, landing: &Landing) -> io::Result<()> {
    match landing {
        Landing::Screen(screen) => writeln!(out, "screen: {screen}"),
        Landing::Redirected { requested, to } => {
            writeln!(out, "redirected: {requested} -> {to}")
        }
        Landing::Passthrough(path) => writeln!(out, "bypassed: {path}"),
    }
}

fn print_errors<B: SessionBackend>(
    desk: &InvoiceDesk<B>,
    all: bool,
    out: &mut impl Write,
) -> Result<()> {
    let errors = if all {
        desk.invoice_form().current_errors()
    } else {
        desk.visible_errors()
    };
    if errors.is_empty() {
        writeln!(out, "no errors")?;
    }
    for (field, message) in errors.iter() {
        writeln!(out, "{field}: {message}")?;
    }
    let hidden = desk.hidden_error_count();
    if !all && hidden > 0 {
        writeln!(out, "{hidden} more in other tabs or collapsed fields")?;
    }
    Ok(())
}

fn print_form<B: SessionBackend>(desk: &InvoiceDesk<B>, out: &mut impl Write) -> Result<()> {
    let Some(screen) = desk.screen() else {
        writeln!(out, "no screen mounted")?;
        return Ok(());
    };
    writeln!(out, "{}", screen.title())?;
    if screen != Screen::Invoice {
        return Ok(());
    }

    let sections = desk.sections();
    if let Some(active) = sections.active() {
        writeln!(out, "[{}]", active.title)?;
    }
    for spec in sections.visible_fields() {
        let value = desk
            .invoice_form()
            .value(&spec.name)
            .map(ToString::to_string)
            .unwrap_or_default();
        let shown = spec
            .choice_label(&value)
            .map(|label| format!("{value} ({label})"))
            .unwrap_or(value);
        let marker = if spec.required { "*" } else { "" };
        writeln!(out, "  {}{marker}: {shown}", spec.title)?;
    }
    if sections.active_id() == Some("invoice") {
        let state = if sections.is_subgroup_visible(EXPENSE_SUBGROUP) {
            "shown"
        } else {
            "hidden"
        };
        writeln!(out, "  expense details {state}: {}", desk.expense_summary())?;
    }
    if let Some(file) = desk.upload() {
        writeln!(out, "  attachment: {} ({} bytes)", file.name, file.size)?;
    }
    writeln!(out, "status: {}", desk.status())?;
    Ok(())
}

fn read_attachment(path: &Path) -> Result<FileHandle> {
    let bytes =
        fs::read(path).wrap_err_with(|| format!("failed to read file {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| eyre!("{} does not name a file", path.display()))?;
    Ok(FileHandle::new(name, bytes))
}

fn print_status<B: SessionBackend>(session: &SessionStore<B>, as_json: bool) -> Result<()> {
    let record = session.record()?;
    let draft_fields = record.draft.as_ref().map(|draft| draft.len());
    if as_json {
        let summary = json!({
            "authenticated": record.authenticated,
            "user": record.actor_name,
            "draftFields": draft_fields,
            "committed": record.committed.is_some(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let authenticated = if record.authenticated { "yes" } else { "no" };
    println!("authenticated: {authenticated}");
    println!("user: {}", record.actor_name.as_deref().unwrap_or("-"));
    match draft_fields {
        Some(count) => println!("draft: {count} field(s)"),
        None => println!("draft: none"),
    }
    let committed = if record.committed.is_some() { "yes" } else { "none" };
    println!("committed: {committed}");
    Ok(())
}

fn run_export<B: SessionBackend>(session: &SessionStore<B>, args: &ExportArgs) -> Result<()> {
    let mut destinations = Vec::new();
    for raw in &args.outputs {
        if raw.trim().is_empty() {
            return Err(eyre!("output destination cannot be empty"));
        }
        destinations.push(OutputDestination::parse(raw));
    }
    if destinations.is_empty() {
        destinations.push(OutputDestination::Stdout);
    }

    let format = match args.format.as_deref() {
        Some(raw) => raw.parse::<DocumentFormat>().map_err(lift)?,
        None => infer_format(&destinations),
    };
    let options = OutputOptions::new(format)
        .with_pretty(!args.no_pretty)
        .with_destinations(destinations);

    let schema = invoice_schema().map_err(lift)?;
    export_record(session, &schema, args.which.into(), &options).map_err(lift)?;
    Ok(())
}

fn infer_format(destinations: &[OutputDestination]) -> DocumentFormat {
    destinations
        .iter()
        .find_map(|destination| match destination {
            OutputDestination::File(path) => DocumentFormat::from_extension(path),
            OutputDestination::Stdout => None,
        })
        .unwrap_or_default()
}
