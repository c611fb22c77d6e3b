use clap::Parser;

mod cli;
use crate::cli::Cli;

mod dump;

fn main() {
    // Skipped rasters are reported as warnings
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Parse the cli
    let cli = Cli::parse();

    match cli::run(cli.command, eaarlio::default_memory()) {
        Ok(out) => print!("{}", out),
        Err(err) => {
            let code = err.code();
            eprintln!("Error code {}: {}", code.name(), code.description());
            if !err.message().is_empty() {
                eprintln!("{}", err.message());
            }
            std::process::exit(1);
        }
    }
}
