//! `fitswatch run`: one watch cycle

use anyhow::Result;
use fitswatch::{CycleController, ExternalChecker, TracingDiagnostics, WatchConfig};
use fitswatch_notify::templates::process_failure_alert;
use fitswatch_scout::YamlInventoryStore;
use tracing::{error, info, warn};

pub fn run(config: &WatchConfig, force_dry_run: bool) -> Result<()> {
    let notifier = config.build_notifier(force_dry_run)?;
    let checker = ExternalChecker::new(config.checker.clone());
    let store = YamlInventoryStore::new(&config.inventory_path);
    let diagnostics = TracingDiagnostics;

    info!(
        folders = config.folders.len(),
        inventory = %config.inventory_path.display(),
        transport = notifier.transport_name(),
        "Starting watch cycle"
    );
    let outcome = CycleController::new(config, &checker, &notifier, &diagnostics)
        .and_then(|controller| controller.run(&store));

    match outcome {
        Ok(summary) if summary.bootstrapped => {
            info!("Inventory created; changes will be checked from the next run");
            Ok(())
        }
        Ok(summary) => {
            info!(
                files_updated = summary.files_updated,
                invalid_total = summary.invalid_total,
                malfunctions = summary.malfunctions,
                owner_reports = summary.owner_reports,
                "Watch cycle complete"
            );
            Ok(())
        }
        Err(err) => {
            let reason = format!("{err:#}");
            error!(error = %reason, "Watch cycle failed");
            if let Err(mail_err) =
                notifier.alert_administrators(&process_failure_alert(&reason), &[])
            {
                warn!(error = %mail_err, "Could not alert administrators");
            }
            Err(err)
        }
    }
}
