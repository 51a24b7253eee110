//! Router traffic usage: polls monitor values of routers, reduces them into
//! per-router and fleet statistics and prints the result as JSON.

pub mod error;
pub mod metric;
pub mod monitor_log;
pub mod option;
pub mod output;
pub mod percentile;
pub mod query;
pub mod router_client;
pub mod time_range;

use std::io::Write;

use chrono::{DateTime, Utc};
use tracing::{debug, error};

use crate::error::UsageError;
use crate::monitor_log::MonitorLog;
use crate::option::Settings;
use crate::output::output_metrics;
use crate::router_client::{fetch_resources, find_routers, RouterApi};

/// Finds the routers, fetches their monitor values up to `now`, aggregates
/// them and writes the (optionally queried) result to `w`.
pub async fn run<C, W>(
    client: &C,
    settings: &Settings,
    now: DateTime<Utc>,
    log: &dyn MonitorLog,
    w: &mut W,
) -> Result<(), UsageError>
where
    C: RouterApi + Sync + ?Sized,
    W: Write,
{
    let options = serde_json::to_string(settings)?;
    debug!(settings = %options, "collecting router usage");

    let routers = find_routers(client, settings).await?;
    debug!(count = routers.len(), "routers found");

    let resources = fetch_resources(client, settings, &routers, now).await?;
    let metrics = resources.aggregate(&settings.percentiles, log).to_metrics();

    output_metrics(w, &metrics, settings.query.as_deref())
}

/// Exit status for a successful run.
pub const EXIT_OK: i32 = 0;
/// Exit status for any failure; the result of the check is unknown.
pub const EXIT_UNKNOWN: i32 = 3;

/// Maps the outcome of [`run`] (or of option validation) to a process exit
/// status, logging the failure.
pub fn exit_status(result: &Result<(), UsageError>) -> i32 {
    match result {
        Ok(()) => EXIT_OK,
        Err(err) if err.is_configuration() => {
            error!(%err, "invalid configuration");
            EXIT_UNKNOWN
        }
        Err(err) => {
            error!(%err, "failed to report router usage");
            EXIT_UNKNOWN
        }
    }
}
