use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use vigil::engine::AgentMonitor;
use vigil::source::FileStatusSource;
use vigil::MonitorConfig;

#[derive(Parser)]
#[command(name = "vigil")]
#[command(about = "Polling-based agent status monitor and notifier", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Monitor agents until interrupted, alerting on status changes
    Watch {
        #[arg(required = true, help = "Agent IDs to monitor")]
        agents: Vec<String>,

        #[arg(
            long,
            default_value = "monitor_data",
            help = "Directory holding <agent_id>_status.json files"
        )]
        dir: PathBuf,

        #[arg(
            long,
            help = "Schedule spec: interval (\"90s\", \"5m\") or 5-field cron pattern"
        )]
        schedule: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Watch {
            agents,
            dir,
            schedule,
        } => watch(agents, dir, schedule).await?,
    }

    Ok(())
}

async fn watch(agents: Vec<String>, dir: PathBuf, schedule: Option<String>) -> Result<()> {
    let config = MonitorConfig::from_env();
    let interval_spec = format!("{}s", config.poll_interval_secs);
    let spec = schedule.unwrap_or(interval_spec);

    let source = Arc::new(FileStatusSource::new(dir));
    println!("Watching status files in {}", source.dir().display());

    let monitor = AgentMonitor::new(config, source);
    let result = monitor.start_monitoring(&agents, Some(&spec)).await?;

    println!(
        "Monitoring {} agents (schedule: {}, channels: {:?})",
        result.agents.len(),
        if result.scheduled { spec.as_str() } else { "manual" },
        result.notification_channels
    );
    if let Some(error) = &result.scheduling_error {
        eprintln!("Schedule not armed: {}", error);
    }
    println!("Initial poll detected {} changes", result.initial_poll_changes);

    tokio::signal::ctrl_c().await?;
    monitor.stop_monitoring(None);

    println!("\nFinal agent statuses:");
    for agent_id in monitor.monitored_agents() {
        match monitor.agent_status(&agent_id) {
            Ok(report) => println!(
                "  {} -> {} ({} recent changes)",
                report.agent_id,
                report.current_status,
                report.recent_changes.len()
            ),
            Err(e) => eprintln!("  {}: {}", agent_id, e),
        }
    }

    Ok(())
}
