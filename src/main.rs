use clap::Parser;
use multi_cloud_network::cli::Cli;
use multi_cloud_network::config::Settings;
use multi_cloud_network::logging::init_logging;
use multi_cloud_network::output::print_summary;
use multi_cloud_network::providers::ShellRunner;
use multi_cloud_network::run_pass;
use std::process::ExitCode;
use std::rc::Rc;

fn main() -> ExitCode {
    // Do as little as possible in main.rs as it can't contain any tests
    let cli = Cli::parse();
    if let Err(e) = init_logging(&cli.log_config) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }
    dotenv::dotenv().ok();
    log::info!("#Start main() {} {}", cli.direction(), cli.file.display());

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match run_pass(&cli.file, cli.direction(), &settings, Rc::new(ShellRunner)) {
        Ok(report) => {
            print_summary(&report);
            if report.has_failures() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
