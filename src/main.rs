use kanjidic_reader::{FormatOptions, Kanjidic, LoadOptions};
use std::env;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!(
            "Usage: {} <path-to-kanjidic> [--scheme <TAG>] [--encoding <LABEL>] [--full] \
             [--expand <PATH>]...",
            args[0]
        );
        std::process::exit(1);
    }

    let path = &args[1];
    let mut options = LoadOptions::default();
    let mut full = false;
    let mut extra_files: Vec<&str> = Vec::new();

    let mut rest = args[2..].iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--scheme" => options.scheme = flag_value(rest.next(), "--scheme").to_string(),
            "--encoding" => {
                options = options.with_encoding_label(flag_value(rest.next(), "--encoding"))
            }
            "--expand" => extra_files.push(flag_value(rest.next(), "--expand")),
            "--full" => full = true,
            other => {
                eprintln!("ERROR: Unknown argument '{}'", other);
                std::process::exit(1);
            }
        }
    }

    println!("Reading KANJIDIC file: {}", path);
    println!("{}", "=".repeat(60));

    let mut dic = Kanjidic::new();
    if let Err(e) = dic.open_with(path, &options) {
        eprintln!("\nERROR: Failed to read KANJIDIC file");
        eprintln!("  {}", e);
        std::process::exit(1);
    }
    for extra in extra_files {
        match dic.expand_with(extra, &options) {
            Ok(added) => println!("Expanded with {} ({} entries)", extra, added),
            Err(e) => {
                eprintln!("\nERROR: Failed to expand with {}", extra);
                eprintln!("  {}", e);
                std::process::exit(1);
            }
        }
    }

    let entries = match dic.entries() {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    println!("\nStatistics:");
    println!("  Total entries: {}", entries.len());
    println!("  Encoding: {}", options.encoding.name());

    let format_options = if full {
        FormatOptions::new()
    } else {
        FormatOptions::summary()
    };

    println!("\nSample entries (first 10):");
    for kanji in entries.iter().take(10) {
        println!("{}", "-".repeat(60));
        print!("{}", dic.format(kanji, &format_options));
    }

    if entries.len() > 10 {
        println!("\n  ... and {} more", entries.len() - 10);
    }
}

fn flag_value<'a>(value: Option<&'a String>, flag: &str) -> &'a str {
    match value {
        Some(v) => v,
        None => {
            eprintln!("ERROR: {} flag requires an argument.", flag);
            std::process::exit(1);
        }
    }
}
