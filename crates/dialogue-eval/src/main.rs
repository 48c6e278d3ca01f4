mod case;
mod cli;
mod engine;
mod fixture_io;

use cli::{CliError, CliOptions};
use engine::run_eval;

#[tokio::main]
async fn main() {
    let options = match CliOptions::parse(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(CliError::HelpRequested) => {
            print_usage();
            std::process::exit(0);
        }
        Err(err) => {
            eprintln!("error: {err}");
            eprintln!();
            print_usage();
            std::process::exit(2);
        }
    };

    match run_eval(&options).await {
        Ok(summary) => {
            summary.print();
            if summary.has_failures() {
                std::process::exit(1);
            }
        }
        Err(err) => {
            eprintln!("failed to run dialogue eval harness: {err}");
            std::process::exit(2);
        }
    }
}

fn print_usage() {
    eprintln!(
        "Usage: cargo run -p dialogue-eval -- [--mode mocked|live] [--case <case_id>]\n\
         \n\
         Modes:\n\
         - mocked (default): replay fixture conversations against fixture dictionaries,\n\
           geocoder answers and provider payloads, checking every turn\n\
         - live: replay smoke cases against DATA_DIR dictionaries and the real\n\
           Nominatim/IMGW services, checking only that every turn gets a reply\n\
         \n\
         Options:\n\
         - --case <case_id>  Run a single fixture case\n\
         - --help            Show this help text"
    );
}
