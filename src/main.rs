use quillplay::config::Config;
use quillplay::database::Database;
use quillplay::dice::Dice;
use quillplay::header::SchemaRevision;
use quillplay::input::LineInput;
use quillplay::interpreter::{Interpreter, TurnOutcome};
use quillplay::presenter::{create_presenter, PresenterMode};
use log::{debug, info, warn};
use std::env;
use std::fs;
use std::path::Path;
use std::sync::Arc;

const PROMPT: &str = "> ";

struct Options {
    snapshot: String,
    revision: Option<u8>,
    config: Option<String>,
    seed: Option<u64>,
}

fn usage(program: &str) {
    println!("quillplay - interpreter for Quill text adventure snapshots");
    println!();
    println!(
        "Usage: {} <game.sna> [--revision 0|5|7] [--config profile.toml] [--seed n]",
        program
    );
    println!("Examples:");
    println!("  {} kontrabant.sna --config profiles/kontrabant.toml", program);
    println!("  {} game.sna --revision 5 --seed 42", program);
}

fn parse_args(args: &[String]) -> Result<Option<Options>, Box<dyn std::error::Error>> {
    let mut snapshot = None;
    let mut revision = None;
    let mut config = None;
    let mut seed = None;

    let mut i = 1;
    while i < args.len() {
        let value = |i: usize| {
            args.get(i + 1)
                .cloned()
                .ok_or_else(|| format!("{} needs a value", args[i]))
        };
        match args[i].as_str() {
            "-h" | "--help" => return Ok(None),
            "--revision" => {
                revision = Some(value(i)?.parse::<u8>()?);
                i += 1;
            }
            "--config" => {
                config = Some(value(i)?);
                i += 1;
            }
            "--seed" => {
                seed = Some(value(i)?.parse::<u64>()?);
                i += 1;
            }
            arg if !arg.starts_with('-') && snapshot.is_none() => {
                snapshot = Some(arg.to_string());
            }
            arg => return Err(format!("Unknown option: {}", arg).into()),
        }
        i += 1;
    }

    Ok(snapshot.map(|snapshot| Options {
        snapshot,
        revision,
        config,
        seed,
    }))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let options = match parse_args(&args) {
        Ok(Some(options)) => options,
        Ok(None) => {
            usage(&args[0]);
            return Ok(());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            usage(&args[0]);
            std::process::exit(1);
        }
    };

    let mut config = match &options.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(n) = options.revision {
        if SchemaRevision::from_number(n).is_none() {
            eprintln!("Error: unknown schema revision {} (expected 0, 5 or 7)", n);
            std::process::exit(1);
        }
        config.revision = Some(n);
    }

    debug!("Loading snapshot: {}", options.snapshot);
    let file = match fs::read(&options.snapshot) {
        Ok(bytes) => bytes,
        Err(e) => {
            match e.kind() {
                std::io::ErrorKind::NotFound => {
                    eprintln!("Error: Snapshot not found: {}", options.snapshot);
                }
                _ => {
                    eprintln!("Error: Cannot read snapshot '{}': {}", options.snapshot, e);
                }
            }
            std::process::exit(1);
        }
    };

    let db = match Database::load(&file, &config.load_options()?) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Error: {}: {}", options.snapshot, e);
            std::process::exit(1);
        }
    };
    info!(
        "Loaded revision {} database from {}",
        db.revision.marker(),
        options.snapshot
    );

    let presenter = create_presenter(PresenterMode::Auto, &config.directions)?;
    let save_file = config.save_file.clone();
    let mut interpreter = Interpreter::new(
        Arc::new(db),
        config,
        presenter,
        Dice::from_seed(options.seed),
    );
    interpreter.start();

    let mut input = LineInput::stdin();
    while let Some(line) = input.read_line(PROMPT)? {
        let mut requests = match interpreter.submit(&line) {
            TurnOutcome::Request(request) => vec![request],
            outcome => {
                debug!("Turn outcome: {:?}", outcome);
                Vec::new()
            }
        };
        requests.extend(interpreter.take_requests());
        for request in requests {
            if let Err(e) = interpreter.perform(request, Path::new(&save_file)) {
                warn!("{:?} failed: {}", request, e);
            }
        }
    }

    debug!("End of input after {} turns", interpreter.state().turns);
    Ok(())
}
