use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;
use crate::db::types::MaterialType;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled || PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

pub(crate) fn record_grade(material_type: MaterialType, regrade: bool) {
    let kind = match material_type {
        MaterialType::Quiz => "quiz",
        MaterialType::Assignment => "assignment",
        MaterialType::Exam => "exam",
    };
    metrics::counter!(
        "gradebook_grades_recorded_total",
        "material_type" => kind,
        "regrade" => if regrade { "true" } else { "false" }
    )
    .increment(1);
}

pub(crate) fn record_settings_update() {
    metrics::counter!("gradebook_settings_updates_total").increment(1);
}
