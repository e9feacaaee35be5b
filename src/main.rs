//! ratedesk CLI entry point.

use clap::Parser;
use ratedesk::cli::commands;
use ratedesk::cli::{Cli, Commands, OutputFormat};
use ratedesk::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.format == OutputFormat::Csv {
        ratedesk::CSV_OUTPUT.store(true, std::sync::atomic::Ordering::Relaxed);
    }
    if cli.no_color {
        colored::control::set_override(false);
    }

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    // Resolve effective JSON mode: --json OR --format json OR non-TTY stdout
    let json = cli.json
        || cli.format == OutputFormat::Json
        || (cli.format != OutputFormat::Csv
            && !std::io::IsTerminal::is_terminal(&std::io::stdout()));

    match run(&cli, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,rusqlite=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, json: bool) -> Result<(), Error> {
    let db = cli.db.as_ref();
    let tz = cli.timezone.as_deref();

    match &cli.command {
        Commands::Init { force } => commands::init::execute(*force, db, json),
        Commands::Version => commands::version::execute(json),
        Commands::Status => commands::status::execute(db, tz, json),

        // Dataset
        Commands::Load { file, sample, url } => {
            commands::load::execute(file.as_deref(), *sample, url.as_deref(), db, tz, json)
        }
        Commands::List { pending } => commands::list::execute(*pending, db, tz, json),

        // Rating and navigation
        Commands::Show => commands::rate::show(db, tz, json),
        Commands::Rate { form, strict } => commands::rate::rate(form, *strict, db, tz, json),
        Commands::Next { form } => commands::rate::step(1, form, db, tz, json),
        Commands::Prev { form } => commands::rate::step(-1, form, db, tz, json),
        Commands::Jump { position, form } => commands::rate::jump(position, form, db, tz, json),
        Commands::Clear => commands::rate::clear(db, tz, json),

        // Session
        Commands::Rater { id } => commands::rater::execute(id.as_deref(), db, tz, json),
        Commands::Progress => commands::progress::execute(db, tz, json),
        Commands::History { limit } => commands::history::execute(*limit, db, tz, json),
        Commands::Reset { yes } => commands::reset::execute(*yes, db, tz, json),

        // Transfer
        Commands::Export { output } => commands::export::execute(output.as_ref(), db, tz, json),
        Commands::Import { file, strategy } => {
            commands::import::execute(file, *strategy, db, tz, json)
        }

        // Shell completions
        Commands::Completions { shell } => commands::completions::execute(shell),
    }
}
