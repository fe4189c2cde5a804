use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use sqlx::postgres::PgPoolOptions;
use tokio::sync::mpsc;

use lead_pulse::board::{LeadFilter, StatusTotals};
use lead_pulse::config::Settings;
use lead_pulse::countdown::Countdown;
use lead_pulse::models::{date_label, Lead, LeadStatus, TeamMemberStats};
use lead_pulse::notify::{ConsoleNotifier, MutedNotifier, Notifier, SystemClock};
use lead_pulse::report;
use lead_pulse::scheduler::{ReminderScheduler, TICK};
use lead_pulse::source::LeadSource;
use lead_pulse::timezone;
use lead_pulse::{aggregate, logging};

#[derive(Parser)]
#[command(name = "lead-pulse")]
#[command(about = "Reminder countdowns and team rankings for the lead board", long_about = None)]
struct Cli {
    /// Debug-level logging for this crate
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct SourceArgs {
    /// Read leads from a CSV export
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Read leads from a JSON array in the backend's shape
    #[arg(long)]
    json: Option<PathBuf>,
    /// Read leads from the Postgres `leads` table (needs DATABASE_URL)
    #[arg(long)]
    db: bool,
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Match client number, team member, remarks or creation date
    #[arg(long)]
    search: Option<String>,
    #[arg(long, value_parser = parse_status)]
    status: Option<LeadStatus>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank team members by opened, deposit and training counts
    Rank {
        #[command(flatten)]
        source: SourceArgs,
        /// Only rank leads of this team member (Postgres source)
        #[arg(long)]
        member: Option<String>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List leads with headline totals
    Leads {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Show the countdown of every reminder once
    Reminders {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Keep countdowns live and raise alerts when reminders come due
    Watch {
        #[command(flatten)]
        source: SourceArgs,
        /// Seconds between reloads of the lead collection
        #[arg(long, default_value_t = 30)]
        refresh: u64,
        /// Stop once no alert is left pending
        #[arg(long)]
        exit_when_done: bool,
    },
    /// Show the Eastern, Central and Pacific clocks
    Clocks {
        /// Redraw every second until interrupted
        #[arg(long)]
        follow: bool,
    },
    /// Write a markdown report
    Report {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn parse_status(value: &str) -> Result<LeadStatus, String> {
    match LeadStatus::from_label(value) {
        LeadStatus::Unknown => Err(format!(
            "expected one of: {}",
            LeadStatus::ALL.map(|s| s.label()).join(", ")
        )),
        status => Ok(status),
    }
}

async fn open_source(
    args: &SourceArgs,
    settings: &Settings,
    member: Option<String>,
) -> anyhow::Result<LeadSource> {
    if let Some(path) = &args.csv {
        return Ok(LeadSource::Csv(path.clone()));
    }
    if let Some(path) = &args.json {
        return Ok(LeadSource::Json(path.clone()));
    }
    anyhow::ensure!(args.db, "no lead source given");

    let database_url = settings
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set to read leads from Postgres")?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")?;
    Ok(LeadSource::Postgres {
        pool,
        team_member: member,
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let settings = Settings::from_env().context("invalid configuration")?;
    tracing::debug!(display_tz = %settings.display_tz, "settings loaded");

    match cli.command {
        Commands::Rank {
            source,
            member,
            limit,
            format,
        } => {
            let leads = open_source(&source, &settings, member).await?.load().await?;
            let now = Utc::now().with_timezone(&settings.display_tz);
            let ranking: Vec<TeamMemberStats> = aggregate(&leads, &now).take(limit).collect();

            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&ranking)?);
                return Ok(());
            }
            if ranking.is_empty() {
                println!("No team members found.");
                return Ok(());
            }

            println!("Team performance:");
            for (idx, stats) in ranking.iter().enumerate() {
                println!("{}", report::ranking_line(idx + 1, stats));
            }
        }
        Commands::Leads { source, filter } => {
            let leads = open_source(&source, &settings, None).await?.load().await?;
            let totals = StatusTotals::from_leads(&leads);
            let filter = LeadFilter {
                search: filter.search,
                status: filter.status,
            };
            let hits = filter.apply(&leads, &settings.display_tz);

            println!(
                "{} leads | on training {} | on deposit {} | opened {}",
                totals.total, totals.on_training, totals.on_deposit, totals.opened
            );
            for lead in hits.iter() {
                let created = lead
                    .created()
                    .map(|at| date_label(at.with_timezone(&settings.display_tz).date_naive()))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "- {} | {} | {} | {} | {}",
                    created, lead.client_number, lead.team_member, lead.status, lead.remarks
                );
            }
            println!("{} clients shown.", hits.len());
        }
        Commands::Reminders { source, format } => {
            let leads = open_source(&source, &settings, None).await?.load().await?;
            let rows = report::reminder_rows(&leads, Utc::now());

            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
                return Ok(());
            }
            if rows.is_empty() {
                println!("No reminders set.");
                return Ok(());
            }
            for row in rows.iter() {
                println!(
                    "- {} ({}) at {}: {}",
                    row.client_number, row.team_member, row.target, row.countdown
                );
            }
        }
        Commands::Watch {
            source,
            refresh,
            exit_when_done,
        } => {
            let source = open_source(&source, &settings, None).await?;
            watch(&source, &settings, refresh, exit_when_done).await?;
        }
        Commands::Clocks { follow } => {
            let board = timezone::default_board();
            let mut ticker = tokio::time::interval(TICK);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        for face in timezone::render_board(Utc::now(), &board) {
                            println!("{face}");
                        }
                        if !follow {
                            break;
                        }
                        println!();
                    }
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
        }
        Commands::Report { source, out } => {
            let leads = open_source(&source, &settings, None).await?.load().await?;
            let now = Utc::now().with_timezone(&settings.display_tz);
            let report = report::build_report(&leads, &now);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

async fn watch(
    source: &LeadSource,
    settings: &Settings,
    refresh_secs: u64,
    exit_when_done: bool,
) -> anyhow::Result<()> {
    let notifier: Arc<dyn Notifier> = if settings.notifications {
        Arc::new(ConsoleNotifier)
    } else {
        Arc::new(MutedNotifier)
    };
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut scheduler = ReminderScheduler::new(Arc::new(SystemClock), notifier).with_countdowns(tx);

    let mut leads: Vec<Lead> = source.load().await?;
    scheduler.sync(&leads);
    tracing::info!(leads = leads.len(), pending = scheduler.pending(), "watching reminders");

    let mut latest: BTreeMap<String, Countdown> = BTreeMap::new();
    let mut render = tokio::time::interval(TICK);
    let mut reload = tokio::time::interval(Duration::from_secs(refresh_secs.max(1)));
    reload.tick().await;

    loop {
        tokio::select! {
            Some(update) = rx.recv() => {
                latest.insert(update.lead_id, update.countdown);
            }
            _ = render.tick() => {
                print_countdowns(&leads, &latest);
                if exit_when_done && scheduler.pending() == 0 {
                    break;
                }
            }
            _ = reload.tick() => {
                match source.load().await {
                    Ok(fresh) => {
                        scheduler.sync(&fresh);
                        latest.retain(|id, _| fresh.iter().any(|lead| &lead.id == id));
                        leads = fresh;
                    }
                    Err(err) => tracing::warn!(%err, "reload failed, keeping previous leads"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break;
            }
        }
    }

    Ok(())
}

fn print_countdowns(leads: &[Lead], latest: &BTreeMap<String, Countdown>) {
    for lead in leads {
        if let Some(countdown) = latest.get(&lead.id) {
            println!("{} ({}): {}", lead.client_number, lead.team_member, countdown);
        }
    }
}
