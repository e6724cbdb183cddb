use std::collections::HashMap;

use prometheus::{Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder, proto::MetricFamily};

use barman_collect::metrics::descriptors;
use barman_collect::{MetricsSink, Sample, SinkError};

/// A gauge family registered from one descriptor.
enum Series {
    Plain(Gauge),
    Labeled {
        gauges: GaugeVec,
        labels: &'static [&'static str],
    },
}

/// `prometheus`-backed sample sink.
///
/// Construction registers every descriptor from
/// [`barman_collect::metrics`] in a fresh registry; writes then resolve
/// metrics by name only. Writing a name or label set outside the descriptor
/// table is an error, not a new series. Gauge updates are internally
/// synchronized, so one sink can take writes from concurrent scrape tasks.
pub struct PrometheusSink {
    registry: Registry,
    series: HashMap<&'static str, Series>,
}

impl PrometheusSink {
    pub fn new() -> Result<Self, SinkError> {
        let registry = Registry::new();
        let mut series = HashMap::new();

        for desc in descriptors() {
            let opts = Opts::new(desc.name, desc.help);
            if desc.labels.is_empty() {
                let gauge = Gauge::with_opts(opts).map_err(as_write_error)?;
                registry
                    .register(Box::new(gauge.clone()))
                    .map_err(as_write_error)?;
                series.insert(desc.name, Series::Plain(gauge));
            } else {
                let gauges = GaugeVec::new(opts, desc.labels).map_err(as_write_error)?;
                registry
                    .register(Box::new(gauges.clone()))
                    .map_err(as_write_error)?;
                series.insert(
                    desc.name,
                    Series::Labeled {
                        gauges,
                        labels: desc.labels,
                    },
                );
            }
        }

        Ok(Self { registry, series })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Encode the current registry contents in the Prometheus text format.
    pub fn encode_text(&self) -> Result<String, SinkError> {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&self.gather(), &mut buf)
            .map_err(as_write_error)?;
        String::from_utf8(buf).map_err(as_write_error)
    }
}

impl MetricsSink for PrometheusSink {
    fn write(&self, sample: Sample) -> Result<(), SinkError> {
        match self.series.get(sample.name) {
            None => Err(SinkError::UnknownMetric(sample.name.to_string())),
            Some(Series::Plain(gauge)) => {
                gauge.set(sample.value);
                Ok(())
            }
            Some(Series::Labeled { gauges, labels }) => {
                let mut values = Vec::with_capacity(labels.len());
                for label in *labels {
                    let value = sample
                        .labels
                        .iter()
                        .find(|(name, _)| name == label)
                        .map(|(_, value)| value.as_str())
                        .ok_or(SinkError::MissingLabel {
                            metric: sample.name,
                            label,
                        })?;
                    values.push(value);
                }
                gauges.with_label_values(&values).set(sample.value);
                Ok(())
            }
        }
    }
}

fn as_write_error(err: impl std::fmt::Display) -> SinkError {
    SinkError::Write(err.to_string())
}

#[cfg(test)]
mod tests {
    use barman_collect::metrics;

    use super::*;

    #[test]
    fn registers_every_descriptor() {
        let sink = PrometheusSink::new().unwrap();
        assert_eq!(sink.series.len(), descriptors().len());
    }

    #[test]
    fn plain_gauge_write_shows_up_in_the_exposition() {
        let sink = PrometheusSink::new().unwrap();
        sink.write(Sample::new(metrics::UP, 1.0)).unwrap();

        let text = sink.encode_text().unwrap();
        assert!(text.contains("barman_cloud_up 1"));
    }

    #[test]
    fn labeled_write_carries_its_label_values() {
        let sink = PrometheusSink::new().unwrap();
        sink.write(
            Sample::new(metrics::BACKUP_LATEST_BYTES, 4096.0)
                .with_label(metrics::LABEL_BUCKET, "bkt-a")
                .with_label(metrics::LABEL_BACKUP_ID, "id-2"),
        )
        .unwrap();

        let text = sink.encode_text().unwrap();
        assert!(
            text.contains(
                r#"barman_cloud_backup_latest_bytes{backup_id="id-2",bucket_name="bkt-a"} 4096"#
            ),
            "unexpected exposition:\n{text}"
        );
    }

    #[test]
    fn label_order_in_the_sample_does_not_matter() {
        let sink = PrometheusSink::new().unwrap();
        sink.write(
            Sample::new(metrics::BACKUP_LATEST_SUCCESS, 1.0)
                .with_label(metrics::LABEL_BACKUP_ID, "id-1")
                .with_label(metrics::LABEL_BUCKET, "bkt-a"),
        )
        .unwrap();

        let text = sink.encode_text().unwrap();
        assert!(text.contains(r#"bucket_name="bkt-a""#));
    }

    #[test]
    fn unknown_metric_is_rejected() {
        let sink = PrometheusSink::new().unwrap();
        let err = sink.write(Sample::new("barman_cloud_bogus", 1.0)).unwrap_err();
        assert!(matches!(err, SinkError::UnknownMetric(_)));
    }

    #[test]
    fn missing_label_is_rejected() {
        let sink = PrometheusSink::new().unwrap();
        let err = sink
            .write(
                Sample::new(metrics::BACKUP_LATEST_BYTES, 1.0)
                    .with_label(metrics::LABEL_BUCKET, "bkt-a"),
            )
            .unwrap_err();
        assert!(matches!(err, SinkError::MissingLabel { .. }));
    }

    #[test]
    fn rewrite_of_a_series_keeps_the_latest_value() {
        let sink = PrometheusSink::new().unwrap();
        sink.write(Sample::new(metrics::UP, 0.0)).unwrap();
        sink.write(Sample::new(metrics::UP, 1.0)).unwrap();

        let text = sink.encode_text().unwrap();
        assert!(text.contains("barman_cloud_up 1"));
    }
}
