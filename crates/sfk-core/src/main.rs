use anyhow::bail;
use clap::{value_parser, Arg, ArgAction, Command};
use sfk_core::test_harness::{run_simulator, run_walkthrough, SimulatorConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Command::new("sfk")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Study Flow Kernel test harness")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("simulate")
                .about("Drive seeded participants through the full flow")
                .arg(
                    Arg::new("participants")
                        .long("participants")
                        .default_value("100")
                        .value_parser(value_parser!(u64))
                        .help("Number of participants to simulate"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .default_value("42")
                        .value_parser(value_parser!(u64))
                        .help("Random seed for reproducibility"),
                )
                .arg(
                    Arg::new("keep-going")
                        .long("keep-going")
                        .action(ArgAction::SetTrue)
                        .help("Collect all violations instead of stopping at the first"),
                ),
        )
        .subcommand(
            Command::new("walkthrough")
                .about("Trace a single participant through every page")
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .default_value("42")
                        .value_parser(value_parser!(u64))
                        .help("Random seed for reproducibility"),
                ),
        );

    match cli.get_matches().subcommand() {
        Some(("simulate", args)) => {
            let participants = *args.get_one::<u64>("participants").expect("has default");
            let seed = *args.get_one::<u64>("seed").expect("has default");
            let keep_going = args.get_flag("keep-going");

            let config = SimulatorConfig {
                seed,
                participants,
                stop_on_first_violation: !keep_going,
            };
            let report = run_simulator(config).await;
            println!("{}", report.generate_text());
            if !report.passed() {
                bail!("simulation detected {} violation(s)", report.violations.len());
            }
        }
        Some(("walkthrough", args)) => {
            let seed = *args.get_one::<u64>("seed").expect("has default");
            let report = run_walkthrough(seed).await;
            println!("{}", report.generate_text());
            if !report.passed() {
                bail!("walkthrough detected {} violation(s)", report.violations.len());
            }
        }
        _ => {}
    }
    Ok(())
}
