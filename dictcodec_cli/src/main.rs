//! Entrypoint of the dictcodec binary

use dotenvy::dotenv;

mod commands {
    pub(crate) mod common;
    pub(crate) mod encode;
    pub(crate) mod query;
}
mod logging;

enum ReturnCode {
    Failure = 1,
}

#[derive(Debug, clap::Parser)]
#[clap(
    name = "dictcodec",
    version,
    about = "Dictionary encode string columns and query the encoded form",
    long_about = r#"Dictionary encode string columns and query the encoded form

Examples:
    # Encode Column.txt into dictionary.txt and encoded_data.txt using 8 workers
    dictcodec encode --column-file Column.txt --worker-count 8

    # Positions of every row equal to "GET /"
    dictcodec query exact "GET /"

    # Rows starting with "GET", grouped by value, using the scalar scan
    dictcodec query prefix GET --strategy scalar

    # The same query over the unencoded column, with debug logging
    dictcodec -vv query prefix GET --strategy raw --column-file Column.txt
"#
)]
struct Config {
    #[clap(flatten)]
    logging_config: logging::LoggingConfig,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    /// Build a dictionary over a column file and persist the encoded column
    Encode(commands::encode::Config),

    /// Answer an exact or prefix query against a persisted encoded column
    Query(commands::query::Config),
}

fn main() {
    // load all environment variables from .env before doing anything
    load_dotenv();

    let config: Config = clap::Parser::parse();

    if let Err(e) = config.logging_config.install_global_subscriber() {
        eprintln!("Initializing logs failed: {e}");
        std::process::exit(ReturnCode::Failure as _);
    }

    match config.command {
        None => println!("command required, -h/--help for help"),
        Some(Command::Encode(config)) => {
            if let Err(e) = commands::encode::command(config) {
                eprintln!("Encode command failed: {e}");
                std::process::exit(ReturnCode::Failure as _)
            }
        }
        Some(Command::Query(config)) => {
            if let Err(e) = commands::query::command(config) {
                eprintln!("Query command failed: {e}");
                std::process::exit(ReturnCode::Failure as _)
            }
        }
    }
}

/// Source the .env file before initialising the Config struct - this sets
/// any envs in the file, which the Config struct then uses.
///
/// Precedence is given to existing env variables.
fn load_dotenv() {
    match dotenv() {
        Ok(_) => {}
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
            // a missing env file is not an error
        }
        Err(e) => {
            eprintln!("FATAL Error loading config from: {e}");
            eprintln!("Aborting");
            std::process::exit(ReturnCode::Failure as _);
        }
    };
}
