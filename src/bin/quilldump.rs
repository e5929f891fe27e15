use quillplay::config::Config;
use quillplay::database::{Database, EventTable};
use quillplay::header::{Header, SchemaRevision};
use quillplay::inspect::Inspector;
use quillplay::snapshot::Snapshot;
use log::debug;
use std::env;
use std::fs::File;
use std::io::Read;

fn print_usage(program: &str) {
    eprintln!("Usage: {} [options] <game.sna>", program);
    eprintln!("\nOptions:");
    eprintln!("  --revision N     Decode as schema revision 0, 5 or 7");
    eprintln!("  --config FILE    Read direction words from a TOML profile");
    eprintln!("  -x               Print cross references per location");
    eprintln!("  -h               Show this help message");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();

    let mut revision = None;
    let mut config_path = None;
    let mut xrefs = false;
    let mut filename = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-x" => xrefs = true,
            "--revision" if i + 1 < args.len() => {
                i += 1;
                revision = Some(args[i].parse::<u8>()?);
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(args[i].clone());
            }
            "-h" | "--help" => {
                print_usage(&args[0]);
                std::process::exit(0);
            }
            arg if !arg.starts_with('-') => {
                filename = Some(arg.to_string());
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let filename = filename.unwrap_or_else(|| {
        print_usage(&args[0]);
        std::process::exit(1);
    });

    let mut config = match config_path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(n) = revision {
        if SchemaRevision::from_number(n).is_none() {
            eprintln!("Unknown schema revision {}", n);
            std::process::exit(1);
        }
        config.revision = Some(n);
    }
    let options = config.load_options()?;

    // Load snapshot file
    let mut file = File::open(&filename)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    debug!("Loaded {} bytes from {}", bytes.len(), filename);

    let snap = Snapshot::from_file_bytes(&bytes);
    let header = Header::locate(&snap, options.revision)?;
    let db = Database::decode(&snap, &header, &options.direction_words)?;

    println!("{}", header);
    println!("{}", db.vocabulary);

    println!("Locations:");
    for (i, location) in db.locations.iter().enumerate() {
        println!("{:>4}  {}", i, location.description);
        for (word, destination) in &location.connections {
            let name = db.vocabulary.word(*word).unwrap_or("?");
            println!("        {:<4} -> {}", name, destination);
        }
    }

    println!("\nObjects:");
    for (i, object) in db.objects.iter().enumerate() {
        let noun = db
            .object_words
            .get(i)
            .and_then(|&w| db.vocabulary.word(w))
            .unwrap_or("");
        println!(
            "{:>4}  {:<4} {:?}  {}",
            i, noun, object.initial_location, object.description
        );
    }

    println!("\nMessages:");
    for (i, message) in db.messages.iter().enumerate() {
        println!("{:>4}  {}", i, message);
    }

    println!("\nSystem messages:");
    for (i, message) in db.system_messages.iter().enumerate() {
        println!("{:>4}  {}", i, message);
    }

    let inspector = Inspector::new(&db);
    println!("\nResponse table:");
    print!("{}", inspector.table_listing(EventTable::Responses));
    println!("\nProcess table:");
    print!("{}", inspector.table_listing(EventTable::Process));

    if xrefs {
        println!("\nCross references:");
        for i in 0..db.locations.len() {
            let Some(xref) = inspector.location_xref(i as u8) else {
                continue;
            };
            println!(
                "{:>4}  entrances {:?}, objects {:?}",
                i, xref.entrances, xref.objects
            );
            for r in xref.events {
                if let Some(listing) = inspector.listing(r) {
                    println!("        {:?} {:>3}  {}", r.table, r.index, listing);
                }
            }
        }
    }

    Ok(())
}
