use clap::Parser;
use securevault::cli::commands;
use securevault::cli::{output, Cli, Commands};
use tracing_subscriber::EnvFilter;

/// Log filter variable; defaults to `warn` so normal runs stay quiet.
const LOG_ENV: &str = "SECUREVAULT_LOG";

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(&cli),
        Commands::Unlock => commands::unlock::execute_unlock(&cli),
        Commands::Lock => commands::unlock::execute_lock(&cli),
        Commands::Add {
            ref website,
            ref username,
            ref password,
            generate,
            ref notes,
        } => commands::add::execute(
            &cli,
            website,
            username,
            password.as_deref(),
            generate,
            notes.as_deref(),
        ),
        Commands::Get { ref id, copy } => commands::get::execute(&cli, id, copy),
        Commands::Update {
            ref id,
            ref username,
            ref password,
            generate,
            ref notes,
        } => commands::update::execute(
            &cli,
            id,
            username.as_deref(),
            password.as_deref(),
            generate,
            notes.as_deref(),
        ),
        Commands::List => commands::list::execute(&cli),
        Commands::Delete { ref id, force } => commands::delete::execute(&cli, id, force),
        Commands::Export {
            ref format,
            ref output,
        } => commands::export::execute(&cli, format, output.as_deref()),
        Commands::RotateKey => commands::rotate::execute(&cli),
        Commands::Migrate => commands::migrate::execute(&cli),
        Commands::Seal { ref text } => commands::seal::execute_seal(&cli, text.as_deref()),
        Commands::Open { ref blob } => commands::seal::execute_open(&cli, blob.as_deref()),
        Commands::Generate {
            length,
            ref classes,
            copy,
        } => commands::generate::execute(&cli, length, classes, copy),
        Commands::Strength { ref password, json } => {
            commands::strength::execute(password.as_deref(), json)
        }
        Commands::Version => commands::version::execute(),
        Commands::Completions { shell } => commands::completions::execute(shell),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
