use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;
use serde_json::Map;
use tracing::debug;

use crate::error::{BoxError, UsageError};
use crate::metric::{MonitorValue, Resource, ResourceSet};
use crate::option::{Item, Settings};
use crate::time_range::TimeRange;

const BITS_PER_MEGABIT: f64 = 1000.0 * 1000.0;

pub const TRAFFIC_LABEL: &str = "traffic";
pub const ROUTERS_LABEL: &str = "routers";

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Router {
    pub id: u64,
    pub name: String,
}

/// One monitor point of a router, in bits per second.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RouterActivity {
    pub time: DateTime<FixedOffset>,
    #[serde(rename = "in", default)]
    pub inbound: f64,
    #[serde(rename = "out", default)]
    pub outbound: f64,
}

impl RouterActivity {
    fn megabits(&self, item: Item) -> f64 {
        let bits = match item {
            Item::In => self.inbound,
            Item::Out => self.outbound,
        };
        bits / BITS_PER_MEGABIT
    }
}

/// A router found in a zone.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneRouter {
    pub zone: String,
    pub router: Router,
}

#[async_trait]
pub trait RouterApi {
    /// Routers in `zone` whose name partially matches `name`.
    async fn find(&self, zone: &str, name: &str) -> Result<Vec<Router>, BoxError>;

    async fn monitor_router(
        &self,
        zone: &str,
        id: u64,
        time_range: &TimeRange,
    ) -> Result<Vec<RouterActivity>, BoxError>;
}

/// Routers whose names start with one of the prefixes, prefix by prefix and
/// zone by zone.
pub async fn find_routers<C>(client: &C, settings: &Settings) -> Result<Vec<ZoneRouter>, UsageError>
where
    C: RouterApi + Sync + ?Sized,
{
    let mut routers = Vec::new();
    for prefix in &settings.prefixes {
        for zone in &settings.zones {
            let found = client
                .find(zone, prefix)
                .await
                .map_err(|source| UsageError::Fetch {
                    zone: zone.clone(),
                    source,
                })?;
            for router in found {
                if router.name.starts_with(prefix.as_str()) {
                    routers.push(ZoneRouter {
                        zone: zone.clone(),
                        router,
                    });
                } else {
                    debug!(name = %router.name, zone = %zone, prefix = %prefix, "router ignored");
                }
            }
        }
    }
    Ok(routers)
}

/// Collects the latest `settings.time` monitor points of each router.
/// Routers that report nothing in the window are left out.
pub async fn fetch_resources<C>(
    client: &C,
    settings: &Settings,
    routers: &[ZoneRouter],
    now: DateTime<Utc>,
) -> Result<ResourceSet, UsageError>
where
    C: RouterApi + Sync + ?Sized,
{
    let time_range = TimeRange::lookback(now, settings.time)?;
    let limit = settings.time as usize;

    let mut resources = Vec::with_capacity(routers.len());
    for ZoneRouter { zone, router } in routers {
        let mut activities = client
            .monitor_router(zone, router.id, &time_range)
            .await
            .map_err(|source| UsageError::Fetch {
                zone: zone.clone(),
                source,
            })?;
        if activities.is_empty() {
            debug!(name = %router.name, zone = %zone, "no monitor values");
            continue;
        }
        if activities.len() > limit {
            activities.drain(..activities.len() - limit);
        }

        resources.push(Resource {
            id: router.id,
            name: router.name.clone(),
            zone: zone.clone(),
            label: TRAFFIC_LABEL.to_string(),
            monitors: activities
                .iter()
                .map(|activity| MonitorValue::new(activity.time, activity.megabits(settings.item)))
                .collect(),
            additional_info: Map::new(),
        });
    }
    Ok(ResourceSet::new(ROUTERS_LABEL, resources))
}
