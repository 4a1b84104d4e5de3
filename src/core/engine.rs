use crate::core::{Pipeline, ScoutReport};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

#[derive(Debug)]
pub struct ScoutOutcome {
    pub report: ScoutReport,
    pub output_path: String,
}

pub struct ScoutEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> ScoutEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<ScoutOutcome> {
        tracing::info!("🚀 Starting zone scouting...");
        self.monitor.log_stats("Start");

        // 區域 + 搜尋
        let raw = self.pipeline.extract().await?;
        tracing::info!(
            "🕵️ Found {} raw candidates. Deploying AI agents...",
            raw.places.len()
        );
        self.monitor.log_stats("Search");

        // 稽核
        let report = self.pipeline.transform(raw).await?;
        self.monitor.log_stats("Audit");

        // 輸出報告
        let output_path = self.pipeline.load(&report).await?;
        tracing::info!("📁 Report saved to: {}", output_path);
        self.monitor.log_stats("Report");
        self.monitor.log_final_stats();

        Ok(ScoutOutcome {
            report,
            output_path,
        })
    }
}
