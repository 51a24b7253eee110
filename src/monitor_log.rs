use tracing::{info, warn};

use crate::metric::{MonitorValue, Resource};

/// Receives the per-resource trail written while aggregating.
pub trait MonitorLog {
    fn monitor(&self, resource: &Resource, value: &MonitorValue);
    fn average(&self, resource: &Resource, average: f64);
    fn skipped(&self, _resource: &Resource) {}
}

/// Forwards the trail to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl MonitorLog for TracingLog {
    fn monitor(&self, resource: &Resource, value: &MonitorValue) {
        info!(
            name = %resource.name,
            zone = %resource.zone,
            label = %resource.label,
            value = value.value,
            time = %value.time,
            "monitor value"
        );
    }

    fn average(&self, resource: &Resource, average: f64) {
        info!(
            name = %resource.name,
            label = %resource.label,
            average,
            "resource average"
        );
    }

    fn skipped(&self, resource: &Resource) {
        warn!(
            name = %resource.name,
            zone = %resource.zone,
            "resource has no monitor values, skipped"
        );
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardLog;

impl MonitorLog for DiscardLog {
    fn monitor(&self, _resource: &Resource, _value: &MonitorValue) {}

    fn average(&self, _resource: &Resource, _average: f64) {}
}
