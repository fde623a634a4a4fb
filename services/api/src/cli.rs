use crate::infra::{build_pool, seed_store};
use crate::server;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use tenant_isolation::error::AppError;
use tenant_isolation::suite::{demo_organizations, OrganizationSeed};

#[derive(Parser, Debug)]
#[command(
    name = "tenant-isolation",
    about = "Serve or seed the tenant-isolated recruiting, payroll and HR tables",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Seed organizations into a fresh store and print one report per tenant
    Seed(SeedArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct SeedArgs {
    /// Organization to seed; repeat for several. Defaults to the demo organizations.
    #[arg(long = "organization")]
    pub(crate) organizations: Vec<String>,
    /// Founding date used for seeded records (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) founded_on: Option<NaiveDate>,
    /// Employees per named organization
    #[arg(long, default_value_t = 3)]
    pub(crate) headcount: usize,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Seed(args) => run_seed(args),
    }
}

fn seed_plan(args: &SeedArgs) -> Vec<OrganizationSeed> {
    let founded_on = args
        .founded_on
        .unwrap_or_else(|| Local::now().date_naive());
    if args.organizations.is_empty() {
        return demo_organizations(founded_on);
    }
    args.organizations
        .iter()
        .map(|name| OrganizationSeed::named(name.trim(), founded_on, args.headcount))
        .collect()
}

pub(crate) fn run_seed(args: SeedArgs) -> Result<(), AppError> {
    let pool = build_pool(1);
    let reports = seed_store(&pool, &seed_plan(&args))?;

    println!("Seeded {} organization(s)", reports.len());
    for report in &reports {
        println!(
            "- {} ({}) -> {} inserted, {} skipped",
            report.organization, report.tenant, report.inserted, report.skipped
        );
    }
    match serde_json::to_string_pretty(&reports) {
        Ok(json) => println!("{json}"),
        Err(err) => println!("Seed report unavailable as JSON: {err}"),
    }
    Ok(())
}
