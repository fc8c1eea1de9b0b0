use clap::{Parser, Subcommand};
use tracing::error;

use moving_calc::api::{CalcArgs, PolicyArgs, build_request, run_calculation, run_http_server};
use moving_calc::report::{export_report, render_text};

#[derive(Parser, Debug)]
#[command(
    name = "moving-calc",
    version,
    about = "Salary comparison and raise calculator for a household move"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute both scenarios once and print the report
    Calc(CalcArgs),
    /// Serve the JSON API
    Serve {
        #[arg(long, env = "MOVING_CALC_PORT", default_value_t = 8080)]
        port: u16,
        #[command(flatten)]
        policy: PolicyArgs,
    },
}

#[tokio::main]
async fn main() {
    moving_calc::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { port, policy } => {
            if let Err(e) = run_http_server(port, policy.into()).await {
                error!(error = %e, "server error");
                std::process::exit(1);
            }
        }
        Command::Calc(args) => {
            if let Err(msg) = run_calc(&args) {
                eprintln!("Error: {msg}");
                std::process::exit(1);
            }
        }
    }
}

fn run_calc(args: &CalcArgs) -> Result<(), String> {
    let request = build_request(args)?;
    let (_, report) = run_calculation(&request).map_err(|e| e.to_string())?;
    print!("{}", render_text(&report));

    if let Some(path) = &args.report_path {
        // A failed export is reported but the computed report above stands.
        match export_report(&report, path) {
            Ok(()) => println!("\nReport written to {}", path.display()),
            Err(e) => eprintln!("Error: {e}"),
        }
    }
    Ok(())
}
