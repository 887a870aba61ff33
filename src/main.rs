//! Spotlight command-line frontend.

fn main() {
    if let Err(e) = spotlight::cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
