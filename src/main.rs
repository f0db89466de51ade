use std::process::ExitCode;

use env_logger::Env;
use log::error;

use table_matcher::cli::{self, Command, USAGE};
use table_matcher::config::ExperimentConfig;
use table_matcher::orchestrator;
use table_matcher::overlap::LatticeDetector;
use table_matcher::util::envfile;

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    // Non-destructive: process environment wins over .env entries.
    let _ = envfile::load_dotenv_if_present();

    let argv: Vec<String> = std::env::args().skip(1).collect();

    let config = match ExperimentConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("{}", err);
            return ExitCode::from(2);
        }
    };

    let command = match cli::parse(&config, &argv) {
        Ok(command) => command,
        Err(err) => {
            eprintln!("{}\n\n{}", err, USAGE);
            return ExitCode::from(2);
        }
    };

    match command {
        Command::EnvTemplate { path } => match envfile::write_env_template(&path) {
            Ok(()) => {
                println!("wrote {}", path);
                ExitCode::SUCCESS
            }
            Err(err) => {
                error!("failed to write {}: {}", path, err);
                ExitCode::FAILURE
            }
        },
        Command::Run(args) => {
            let oracle = LatticeDetector::exhaustive();
            match orchestrator::run(&config, &args, &oracle) {
                Ok(_) => ExitCode::SUCCESS,
                Err(err) => {
                    error!("{:#}", err);
                    ExitCode::FAILURE
                }
            }
        }
    }
}
