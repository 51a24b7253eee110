use std::ops::{Add, Div};

use bigdecimal::{BigDecimal, FromPrimitive, ToPrimitive};
use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Number, Value};

use crate::monitor_log::MonitorLog;
use crate::percentile::Percentile;

/// Largest magnitude at which every whole `f64` is still an exact integer.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Clone, PartialEq)]
pub struct MonitorValue {
    pub time: DateTime<FixedOffset>,
    pub value: f64,
}

impl MonitorValue {
    pub fn new(time: DateTime<FixedOffset>, value: f64) -> Self {
        MonitorValue { time, value }
    }

    fn to_metrics(&self, label: &str) -> Value {
        let mut monitor = Map::new();
        monitor.insert(label.to_string(), number(self.value));
        monitor.insert("time".to_string(), Value::String(self.time.to_string()));
        Value::Object(monitor)
    }
}

/// One monitored router in one zone together with its window of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub id: u64,
    pub name: String,
    pub zone: String,
    /// Metric name used as the value key of each monitor entry.
    pub label: String,
    pub monitors: Vec<MonitorValue>,
    /// Merged into the rendered metrics last, so these keys win on collision.
    pub additional_info: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceMetrics {
    pub average: f64,
    pub fields: Map<String, Value>,
}

impl Resource {
    /// Mean of the monitor values, `None` when there are none.
    pub fn average(&self) -> Option<f64> {
        mean(self.monitors.iter().map(|monitor| monitor.value))
    }

    /// Renders `name`, `zone`, `avg` and `monitors`. A resource without
    /// monitor values has no average and yields `None`.
    pub fn to_metrics(&self, log: &dyn MonitorLog) -> Option<ResourceMetrics> {
        let monitors = self
            .monitors
            .iter()
            .map(|monitor| {
                log.monitor(self, monitor);
                monitor.to_metrics(&self.label)
            })
            .collect::<Vec<_>>();

        let average = self.average()?;
        log.average(self, average);

        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::String(self.name.clone()));
        fields.insert("zone".to_string(), Value::String(self.zone.clone()));
        fields.insert("avg".to_string(), number(average));
        fields.insert("monitors".to_string(), Value::Array(monitors));
        for (key, value) in &self.additional_info {
            fields.insert(key.clone(), value.clone());
        }

        Some(ResourceMetrics { average, fields })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSet {
    pub label: String,
    pub resources: Vec<Resource>,
}

impl ResourceSet {
    pub fn new(label: &str, resources: Vec<Resource>) -> Self {
        ResourceSet {
            label: label.to_string(),
            resources,
        }
    }

    /// Reduces the per-resource averages into fleet statistics.
    ///
    /// Every resource weighs the same regardless of its sample count.
    /// Resources without monitor values are left out of both the statistics
    /// and the rendered list.
    pub fn aggregate(
        &self,
        percentiles: &[Percentile],
        log: &dyn MonitorLog,
    ) -> AggregatedMetrics {
        let mut averages = Vec::with_capacity(self.resources.len());
        let mut resources = Vec::with_capacity(self.resources.len());
        for resource in &self.resources {
            match resource.to_metrics(log) {
                Some(metrics) => {
                    averages.push(metrics.average);
                    resources.push(metrics.fields);
                }
                None => log.skipped(resource),
            }
        }

        let average = match mean(averages.iter().copied()) {
            Some(average) => average,
            None => {
                let mut metrics = AggregatedMetrics::empty(&self.label, percentiles);
                metrics.resources = resources;
                return metrics;
            }
        };

        averages.sort_by(|a, b| a.total_cmp(b));
        let percentiles = percentiles
            .iter()
            .map(|percentile| {
                (
                    percentile.key(),
                    averages[percentile.rank_index(averages.len())],
                )
            })
            .collect();

        AggregatedMetrics {
            average,
            maximum: averages[averages.len() - 1],
            minimum: averages[0],
            percentiles,
            label: self.label.clone(),
            resources,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedMetrics {
    pub average: f64,
    pub maximum: f64,
    pub minimum: f64,
    /// `("<label>pt", value)` in configuration order.
    pub percentiles: Vec<(String, f64)>,
    /// Key of the per-resource list, e.g. `"routers"`.
    pub label: String,
    pub resources: Vec<Map<String, Value>>,
}

impl AggregatedMetrics {
    /// Zero for every statistic, so consumers never see a missing value.
    pub fn empty(label: &str, percentiles: &[Percentile]) -> Self {
        AggregatedMetrics {
            average: 0.0,
            maximum: 0.0,
            minimum: 0.0,
            percentiles: percentiles
                .iter()
                .map(|percentile| (percentile.key(), 0.0))
                .collect(),
            label: label.to_string(),
            resources: vec![],
        }
    }

    pub fn to_metrics(&self) -> Map<String, Value> {
        let mut metrics = Map::new();
        metrics.insert("max".to_string(), number(self.maximum));
        metrics.insert("avg".to_string(), number(self.average));
        metrics.insert("min".to_string(), number(self.minimum));
        for (key, value) in &self.percentiles {
            metrics.insert(key.clone(), number(*value));
        }
        metrics.insert(
            self.label.clone(),
            Value::Array(
                self.resources
                    .iter()
                    .cloned()
                    .map(Value::Object)
                    .collect(),
            ),
        );
        metrics
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.to_metrics())
    }
}

fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let mut total = BigDecimal::from(0);
    let mut count = 0u64;
    for value in values {
        total = total.add(BigDecimal::from_f64(value).unwrap_or_else(|| BigDecimal::from(0)));
        count += 1;
    }
    if count == 0 {
        return None;
    }
    total.div(BigDecimal::from(count)).to_f64()
}

/// Whole values render as JSON integers, non-finite ones as `null`.
pub(crate) fn number(value: f64) -> Value {
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
        return Value::Number(Number::from(value as i64));
    }
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}
