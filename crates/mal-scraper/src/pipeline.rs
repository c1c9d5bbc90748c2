//! One invocation: walk the ranking, then persist what was collected.

use crate::driver::{PaginationDriver, RunReport};
use crate::sink::{ResultSink, SinkOutcome};
use crate::summary::RunSummary;
use anyhow::Result;
use tracing::{info, warn};

/// Number of entries previewed in the log
const PREVIEW: usize = 10;

/// Outcome of a full run
#[derive(Debug)]
pub struct PipelineOutcome {
    pub report: RunReport,
    pub summary: RunSummary,
    pub sink: SinkOutcome,
}

/// Run the driver to the end and hand its records to the sink exactly once
pub async fn scrape(driver: PaginationDriver, sink: &ResultSink) -> Result<PipelineOutcome> {
    let mut report = driver.run().await;

    let summary = RunSummary::from_records(&report.records);
    if summary.total == 0 {
        warn!("No anime data fetched");
    } else {
        summary.log(&report.records, PREVIEW);
    }

    let records = std::mem::take(&mut report.records);
    let sink_outcome = sink.persist(records)?;

    info!(
        complete = report.is_complete(),
        pages = report.pages_fetched,
        records = summary.total,
        rejected = report.rejected,
        replaced = report.replaced,
        elapsed_secs = (report.finished_at - report.started_at).num_seconds(),
        "Run finished"
    );

    Ok(PipelineOutcome {
        report,
        summary,
        sink: sink_outcome,
    })
}
