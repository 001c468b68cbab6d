use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use trello_tracker::report::renderer::DEFAULT_TEMPLATE;
use trello_tracker::{
    Config, DeliveryOutcome, LineConfirm, Notifier, ReportPipeline, ReportRenderer, SmtpMailer,
    StepLogger, TrelloClient, WeekContext,
};

#[derive(Parser, Debug)]
#[command(name = "trello-tracker")]
#[command(version = "0.1.0")]
#[command(about = "Render a weekly report from a Trello board and mail it")]
struct Args {
    /// Configuration file (defaults to $TRELLO_TRACKER_CONFIG, ~/.trello-tracker.ini, ./.trello-tracker.ini)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Liquid template used for the report body
    #[arg(short, long, default_value = DEFAULT_TEMPLATE)]
    template: PathBuf,

    /// Only print the report, never send it
    #[arg(long)]
    no_send: bool,

    /// Print the collected board snapshot as JSON before rendering
    #[arg(long)]
    dump_json: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    if let Err(e) = init_logging(args.verbose) {
        eprintln!("Unable to initialize logging: {}", e);
    }

    let log = StepLogger::new();
    match run(&args, &log).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log.error(&e.to_string());
            ExitCode::from(1)
        }
    }
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(rust_log.as_deref(), verbose)?)
        .init();
    Ok(())
}

/// `RUST_LOG` replaces the defaults entirely, `--verbose` applies on top.
fn log_filter(rust_log: Option<&str>, verbose: bool) -> anyhow::Result<EnvFilter> {
    let mut filter = match rust_log.filter(|v| !v.trim().is_empty()) {
        Some(directives) => EnvFilter::try_new(directives)?,
        None => EnvFilter::try_new("trello_tracker=warn,reqwest=warn")?,
    };
    if verbose {
        filter = filter.add_directive("trello_tracker=debug".parse()?);
    }
    Ok(filter)
}

async fn run(args: &Args, log: &StepLogger) -> anyhow::Result<()> {
    // WEEK/YEAR are fixed here for every template in this run
    let week = WeekContext::current();
    let mut config = Config::load(args.config.as_deref(), week)?;
    if args.no_send {
        config.email.send = false;
    }
    tracing::info!(
        "Reporting week {} of {} for board {}",
        week.week,
        week.year,
        config.trello.board_id
    );

    let notifier = Notifier::new(SmtpMailer::new(&config.email.server)?, config.email.clone());
    let client = TrelloClient::new(&config.trello)?;
    let pipeline = ReportPipeline::new(client, &config);
    let context = pipeline.collect(log).await?;

    if args.dump_json {
        println!("{}", serde_json::to_string_pretty(&context)?);
    }

    let renderer = ReportRenderer::new()?;
    let body = renderer.render_file(&args.template, &context)?;

    let mut confirm = LineConfirm::stdio();
    match notifier.deliver(&body, log, &mut confirm).await? {
        DeliveryOutcome::Sent => tracing::info!("Report mailed to {}", config.email.to),
        DeliveryOutcome::Declined => tracing::info!("Report not mailed, declined at prompt"),
        DeliveryOutcome::Disabled => tracing::info!("Report printed only"),
    }

    Ok(())
}
