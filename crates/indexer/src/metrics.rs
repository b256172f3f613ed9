use devhub_processor::BlockReport;
use prometheus_client::encoding::{EncodeLabelSet, EncodeLabelValue, LabelValueEncoder};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;
use std::fmt::Write;
use std::sync::atomic::AtomicU64;


#[derive(Copy, Clone, Hash, Debug, Eq, PartialEq)]
pub enum Outcome {
    Persisted,
    Dropped,
    DecodeFailure,
    WriteFailure
}


impl EncodeLabelValue for Outcome {
    fn encode(&self, encoder: &mut LabelValueEncoder) -> Result<(), std::fmt::Error> {
        encoder.write_str(match self {
            Outcome::Persisted => "persisted",
            Outcome::Dropped => "dropped",
            Outcome::DecodeFailure => "decode_failure",
            Outcome::WriteFailure => "write_failure"
        })
    }
}


#[derive(Copy, Clone, Hash, Debug, Eq, PartialEq, EncodeLabelSet)]
pub struct OutcomeLabel {
    outcome: Outcome
}


lazy_static::lazy_static! {
    pub static ref PROGRESS: Gauge<f64, AtomicU64> = Default::default();
    pub static ref LAST_BLOCK: Gauge = Default::default();
    pub static ref LAST_BLOCK_TIMESTAMP: Gauge = Default::default();
    pub static ref BLOCKS_PROCESSED: Counter = Default::default();
    pub static ref POSTS_CREATED: Counter = Default::default();
    pub static ref OPERATIONS: Family<OutcomeLabel, Counter> = Default::default();
}


pub fn register_metrics(registry: &mut Registry) {
    registry.register(
        "devhub_progress_blocks_per_second",
        "Overall block processing speed",
        PROGRESS.clone()
    );
    registry.register(
        "devhub_last_block",
        "Last processed block",
        LAST_BLOCK.clone()
    );
    registry.register(
        "devhub_last_block_timestamp_ms",
        "Timestamp of the last processed block",
        LAST_BLOCK_TIMESTAMP.clone()
    );
    registry.register(
        "devhub_blocks_processed",
        "Number of processed blocks",
        BLOCKS_PROCESSED.clone()
    );
    registry.register(
        "devhub_posts_created",
        "Number of saved post creations",
        POSTS_CREATED.clone()
    );
    registry.register(
        "devhub_operations",
        "Indexed contract calls by outcome",
        OPERATIONS.clone()
    );
}


fn inc_operations(outcome: Outcome, count: usize) {
    if count > 0 {
        OPERATIONS.get_or_create(&OutcomeLabel { outcome }).inc_by(count as u64);
    }
}


pub fn report_block(report: &BlockReport) {
    BLOCKS_PROCESSED.inc();
    LAST_BLOCK.set(report.block_height as i64);
    POSTS_CREATED.inc_by(report.posts_created as u64);
    inc_operations(Outcome::Persisted, report.persisted);
    inc_operations(Outcome::Dropped, report.dropped);
    inc_operations(Outcome::DecodeFailure, report.decode_failures);
    inc_operations(Outcome::WriteFailure, report.failed);
}


#[cfg(test)]
mod test {
    use super::{register_metrics, report_block};
    use devhub_processor::BlockReport;
    use prometheus_client::registry::Registry;


    #[test]
    fn block_report_is_exported() {
        let mut registry = Registry::default();
        register_metrics(&mut registry);

        report_block(&BlockReport {
            block_height: 100,
            operations: 3,
            decode_failures: 1,
            persisted: 2,
            posts_created: 1,
            dropped: 0,
            failed: 1
        });

        let mut text = String::new();
        prometheus_client::encoding::text::encode(&mut text, &registry).unwrap();

        assert!(text.contains("devhub_last_block 100"));
        assert!(text.contains("devhub_operations_total{outcome=\"persisted\"}"));
        assert!(text.contains("devhub_operations_total{outcome=\"decode_failure\"}"));
        assert!(text.contains("devhub_operations_total{outcome=\"write_failure\"}"));
    }
}
