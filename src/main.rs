mod check;
mod cli;
mod client;
mod config;
mod model;
mod multipart;
mod output;
mod phases;
mod tester;

use clap::Parser;
use clap::error::ErrorKind;
use cli::Cli;
use output::RunSummary;

fn main() {
    // Bad flags or CINEBASE_* values are configuration errors and exit 1
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };

    let env =
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, cli.log_filter());
    env_logger::Builder::from_env(env).init();

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Run the selected phases; `Ok(true)` when every test passed
fn run(cli: &Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let file_config = config::FileConfig::load()?;
    let settings = config::Settings::resolve(cli, file_config)?;
    log::debug!("resolved settings: {:?}", settings);

    let photo = match &settings.photo {
        Some(path) => phases::RunPlan::photo_from_path(path)?,
        None => phases::RunPlan::default_photo(),
    };
    let plan = phases::RunPlan::new(&cli.phases, cli.cleanup, photo);

    let client = client::ApiClient::new(&settings.base_url, settings.timeout);
    let mut tester = tester::ApiTester::new(client).quiet(cli.json);

    tester.say("Starting CinéBase API Testing...");
    tester.say(format!("Base URL: {}", tester.base_url()));
    tester.say("=".repeat(50));

    phases::run(&mut tester, &plan);

    let summary = RunSummary::from_tester(&tester);
    if cli.json {
        output::print_json(&summary);
    } else {
        summary.print_text();
    }

    Ok(summary.all_passed())
}
