use clap::{Arg, ArgAction, Command};
use ribosome::{error_io, open_root, Engine, Error, Program, Session, Store};
use std::{fs, process};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() {
    const VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));

    let matches = Command::new("ribosome")
        .version(VERSION)
        .about("Expand a template of host code and output lines into generated text.")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Log redirections, flushes and program execution to stderr."),
        )
        .arg(
            Arg::new("dump")
                .long("dump")
                .action(ArgAction::SetTrue)
                .help("Print the classified template lines to stderr before running."),
        )
        .arg(
            Arg::new("dna")
                .required(true)
                .help("The template file to expand."),
        )
        .arg(
            Arg::new("input")
                .help("A `.json` or `.xml` file, available to the template as `root`."),
        )
        .get_matches();

    let level = if matches.get_flag("verbose") {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .with_writer(std::io::stderr)
        .init();

    let dna = matches
        .get_one::<String>("dna")
        .expect("dna argument is required");
    let input = matches.get_one::<String>("input");

    if let Err(error) = run(dna, input.map(String::as_str), matches.get_flag("dump")) {
        eprintln!("{error:#}");
        process::exit(1);
    }
}

/// Expand the template at `dna`, with the optional input file bound as `root`.
fn run(dna: &str, input: Option<&str>, dump: bool) -> Result<(), Error> {
    let source = fs::read_to_string(dna).map_err(|e| error_io(dna, e))?;
    let program = Program::parse(dna, &source)?;
    if dump {
        eprint!("{program}");
    }

    let mut store = Store::new();
    if let Some(input) = input {
        store.insert("root", open_root(input)?)?;
    }
    debug!(dna, input = ?input, "expanding template");

    let engine = Engine::with_builtins();
    let mut session = Session::new();
    program.run(&mut session, &engine, &store)?;

    session.finish()
}
