#![allow(clippy::print_stderr, clippy::exit)]

fn main() {
    if let Err(error) = planetary_brief_cli::run() {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}
