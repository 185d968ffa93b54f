mod bootstrap;
mod report;

use anyhow::Result;
use chrono::Utc;
use dashboard_core::auth::AuthStore;
use dashboard_core::masking::mask_sensitive_data;
use dashboard_core::settings::{Command, Settings};
use dashboard_core::time_utils::TimezoneHandler;
use dashboard_core::DashboardError;
use dashboard_data::aggregator::PeriodAggregator;
use dashboard_data::client::ProcedureClient;
use dashboard_data::loader::DataLoader;
use dashboard_runtime::orchestrator::LoadOrchestrator;
use dashboard_runtime::state::DashboardState;
use dashboard_ui::app::{restore_terminal, App, Operator};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();
    let command = settings.subcommand();

    let app_dir = bootstrap::ensure_directories()?;
    let target = bootstrap::log_target(&command, settings.log_file.as_deref(), &app_dir);
    bootstrap::setup_logging(&settings.log_level, &target)?;

    tracing::info!("Payments dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Period: {}, Theme: {}, Timezone: {}, Offline: {}",
        settings.period,
        settings.theme,
        settings.timezone,
        settings.offline
    );

    match command {
        Command::Dashboard => run_dashboard(&settings).await?,
        Command::Login { email, password } => login(&email, &password)?,
        Command::Logout => {
            AuthStore::open()?.logout()?;
            println!("Logged out.");
        }
        Command::Report => run_report(&settings).await?,
        Command::Mask { json } => println!("{}", mask_sensitive_data(&json)),
    }

    Ok(())
}

fn build_loader(settings: &Settings) -> Result<DataLoader> {
    let strategy = settings.strategy();
    if settings.offline {
        return Ok(DataLoader::offline(strategy));
    }
    let client = ProcedureClient::new(&settings.api_base_url)?;
    Ok(DataLoader::new(client, strategy))
}

fn login(email: &str, password: &str) -> Result<()> {
    eprintln!("Note: operator login checks a bundled user list and is not a security boundary.");
    let mut store = AuthStore::open()?;
    let user = store.login(email, password)?;
    println!("Logged in as {} ({})", user.email, user.role);
    Ok(())
}

async fn run_dashboard(settings: &Settings) -> Result<()> {
    let store = AuthStore::open()?;
    let user = store.user().ok_or(DashboardError::NotAuthenticated)?;
    let operator = Operator {
        email: user.email.clone(),
        role: user.role.clone(),
    };

    let tz = TimezoneHandler::new(&settings.timezone);
    let state = DashboardState::new(settings.strategy(), tz, Utc::now());
    let orchestrator = LoadOrchestrator::new(build_loader(settings)?);

    tracing::info!("Starting dashboard for {}", operator.email);
    let app = App::new(&settings.theme, state, orchestrator, settings.timezone.clone(), operator);

    // The loop exits on 'q' / Ctrl+C inside the TUI. An OS-level Ctrl+C can
    // still arrive before raw mode is on, so listen for it too.
    tokio::select! {
        result = app.run() => {
            result.map_err(|e| DashboardError::Terminal(e.to_string()))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received; shutting down");
            restore_terminal().map_err(|e| DashboardError::Terminal(e.to_string()))?;
        }
    }

    Ok(())
}

async fn run_report(settings: &Settings) -> Result<()> {
    let strategy = settings.strategy();
    let tz = TimezoneHandler::new(&settings.timezone);
    let outcome = build_loader(settings)?.load().await;

    if let Some(error) = &outcome.error {
        eprintln!("{error}");
    }

    let periods = strategy.generate(&tz.to_local(Utc::now()));
    let buckets = PeriodAggregator::aggregate(&outcome.transactions, &periods, strategy, &tz);
    let totals = PeriodAggregator::totals(&buckets);

    let report = report::Report {
        strategy,
        buckets: &buckets,
        totals: &totals,
        summary: &outcome.summary,
        used_sample: outcome.used_sample,
    };
    print!("{report}");
    Ok(())
}
