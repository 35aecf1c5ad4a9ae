use std::io::{self, Write};
use std::process::ExitCode;

use chrono::Local;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use dhcpfind_capture::list_interfaces;
use dhcpfind_cli::run::enough_responses;
use dhcpfind_cli::{output, probe, Cli, ProbeSettings};
use dhcpfind_core::{CancelToken, Error, Result};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter())),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    if cli.list_interfaces {
        let mut stdout = io::stdout().lock();
        for iface in list_interfaces()? {
            writeln!(stdout, "{}", iface)?;
        }
        return Ok(ExitCode::SUCCESS);
    }

    cli.validate()?;

    let cancel = CancelToken::new();
    let watchdog = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received interrupt, stopping...");
                cancel.cancel();
            }
        }
    });

    let settings = ProbeSettings::from(&cli);
    let audible = cli.audible;
    let summary = tokio::task::spawn_blocking(move || {
        probe(&settings, &cancel, |_| {
            if audible {
                ring_bell();
            }
        })
    })
    .await
    .map_err(|e| Error::Interrupted(format!("probe task failed: {}", e)))??;

    watchdog.abort();

    if !cli.quiet {
        output::write_report(&mut io::stdout().lock(), &summary.responses, &Local)?;
    }

    if !enough_responses(&summary, cli.min_responses) {
        warn!(
            "Only {} DHCP server(s) answered, {} required",
            summary.responses.len(),
            cli.min_responses.unwrap_or_default()
        );
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

fn ring_bell() {
    let mut stderr = io::stderr();
    let _ = stderr.write_all(b"\x07");
    let _ = stderr.flush();
}
