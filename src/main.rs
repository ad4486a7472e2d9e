use std::process;

fn main() {
    if let Err(e) = bake::cli::run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
