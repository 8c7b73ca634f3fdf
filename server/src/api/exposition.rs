//! Prometheus text exposition for one scrape

use std::collections::HashMap;

use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};

use crate::domain::metrics::{Exporter, NAMESPACE, Sample};

/// Content type of the text exposition format
pub fn content_type() -> String {
    TextEncoder::new().format_type().to_string()
}

/// Render one scrape's samples together with the collection counters and
/// build info. A fresh registry is used per call so series from devices that
/// disappeared are not carried over.
pub fn render(exporter: &Exporter, samples: &[Sample]) -> prometheus::Result<String> {
    let registry = Registry::new();

    let mut gauges: HashMap<&str, GaugeVec> = HashMap::new();
    for spec in exporter.describe() {
        let gauge = GaugeVec::new(
            Opts::new(spec.fq_name(), spec.help.as_str()),
            spec.label_names(),
        )?;
        registry.register(Box::new(gauge.clone()))?;
        gauges.insert(spec.name.as_str(), gauge);
    }

    for sample in samples {
        match gauges.get(sample.metric.as_str()) {
            Some(gauge) => gauge
                .with_label_values(&[sample.device_id.as_str(), sample.device_name.as_str()])
                .set(sample.value),
            None => tracing::warn!(metric = %sample.metric, "Sample for undescribed metric"),
        }
    }

    exporter.counters().register(&registry)?;
    registry.register(Box::new(build_info()?))?;

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

fn build_info() -> prometheus::Result<GaugeVec> {
    let gauge = GaugeVec::new(
        Opts::new(
            "build_info",
            "A metric with a constant '1' value labeled by the exporter version.",
        )
        .namespace(NAMESPACE)
        .subsystem("exporter"),
        &["version"],
    )?;
    gauge
        .with_label_values(&[env!("CARGO_PKG_VERSION")])
        .set(1.0);
    Ok(gauge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::{Device, MetricRegistry};

    fn exporter() -> Exporter {
        Exporter::new(MetricRegistry::smartthings()).unwrap()
    }

    #[test]
    fn test_render_samples_and_counters() {
        let exporter = exporter();
        let devices = vec![
            Device::new("1", "Front Door")
                .with_attribute("contact", "closed")
                .with_attribute("color", "red"),
            Device::new("2", "Hub")
                .with_attribute("battery", "")
                .with_attribute("weirdAttr", "x"),
        ];
        let samples: Vec<Sample> = exporter.collect(&devices).collect();

        let text = render(&exporter, &samples).unwrap();

        assert!(text.contains("# TYPE smartthings_contact_closed gauge"));
        assert!(text.contains("smartthings_contact_closed{id=\"1\",name=\"Front Door\"} 1"));
        assert!(text.contains("smartthings_battery_percentage{id=\"2\",name=\"Hub\"} 0"));
        assert!(text.contains("smartthings_dropped_metric 1"));
        assert!(text.contains("smartthings_unknown_metric 1"));
        assert!(text.contains("smartthings_invalid_metric 0"));
        assert!(text.contains(&format!(
            "smartthings_exporter_build_info{{version=\"{}\"}} 1",
            env!("CARGO_PKG_VERSION")
        )));
    }

    #[test]
    fn test_render_without_samples() {
        let exporter = exporter();
        let text = render(&exporter, &[]).unwrap();

        assert!(!text.contains("smartthings_contact_closed{"));
        assert!(text.contains("smartthings_dropped_metric 0"));
        assert!(text.contains("smartthings_exporter_build_info"));
    }

    #[test]
    fn test_render_repeated_label_set_keeps_last_value() {
        let exporter = exporter();
        let sample = |value| Sample {
            metric: "switch_enabled".to_string(),
            device_id: "7".to_string(),
            device_name: "Lamp".to_string(),
            value,
        };

        let text = render(&exporter, &[sample(1.0), sample(0.0)]).unwrap();

        assert!(text.contains("smartthings_switch_enabled{id=\"7\",name=\"Lamp\"} 0"));
        assert!(!text.contains("smartthings_switch_enabled{id=\"7\",name=\"Lamp\"} 1"));
    }

    #[test]
    fn test_render_twice_with_same_exporter() {
        let exporter = exporter();
        assert!(render(&exporter, &[]).is_ok());
        assert!(render(&exporter, &[]).is_ok());
    }

    #[test]
    fn test_content_type() {
        assert!(content_type().starts_with("text/plain"));
    }
}
