//! CSV result tables, one per confidence modifier.

use crate::config::ConfidenceModifier;
use crate::error::RunError;
use crate::experiment::{BucketSummary, ModifierTable};
use intuition_env::TableSink;
use serde::Serialize;

/// Column headers of every result table.
pub const HEADER: [&str; 9] = [
    "# of trials",
    "class first",
    "conference first",
    "expert first",
    "class occurrences",
    "conference occurrences",
    "expert occurrences",
    "% correct",
    "STD error",
];

/// One table row: a sequence length and its fitted shape model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundRow {
    pub number_of_trials: usize,
    pub peer_first: f64,
    pub conference_first: f64,
    pub expert_first: f64,
    pub peer_occurrences: f64,
    pub conference_occurrences: f64,
    pub expert_occurrences: f64,
    pub percent_correct: f64,
    pub std_error: f64,
}

impl From<&BucketSummary> for RoundRow {
    fn from(bucket: &BucketSummary) -> Self {
        let weight = |i: usize| bucket.fit.coefficients.get(i).copied().unwrap_or(f64::NAN);
        Self {
            number_of_trials: bucket.number_of_trials,
            peer_first: weight(0),
            conference_first: weight(1),
            expert_first: weight(2),
            peer_occurrences: weight(3),
            conference_occurrences: weight(4),
            expert_occurrences: weight(5),
            percent_correct: bucket.mean_percent_correct,
            std_error: bucket.fit.std_error,
        }
    }
}

/// Renders a modifier's table as CSV bytes.
pub fn render_table(table: &ModifierTable) -> Result<Vec<u8>, RunError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;
    for bucket in &table.rows {
        writer.serialize(RoundRow::from(bucket))?;
    }

    writer
        .into_inner()
        .map_err(|e| RunError::Csv(csv::Error::from(e.into_error())))
}

/// Writes a rendered table under the modifier's file name.
///
/// Returns the location the table was written to.
pub async fn save_table<S: TableSink + ?Sized>(
    sink: &S,
    modifier: ConfidenceModifier,
    contents: Vec<u8>,
) -> Result<String, RunError> {
    let name = modifier.file_name();
    sink.write_table(name, contents).await?;
    Ok(sink.location(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use intuition_core::RegressionFit;
    use intuition_env::{EnvError, FsSink, MemorySink};

    fn bucket(trials: usize) -> BucketSummary {
        BucketSummary {
            number_of_trials: trials,
            fit: RegressionFit {
                coefficients: vec![0.5, -0.25, 0.125, 1.0, 2.0, -3.0],
                intercept: Some(0.1),
                std_error: 0.05,
            },
            mean_percent_correct: 0.75,
            repetitions: Vec::new(),
        }
    }

    #[test]
    fn test_header_is_exact() {
        let table = ModifierTable {
            modifier: ConfidenceModifier::Control,
            rows: vec![],
        };
        let text = String::from_utf8(render_table(&table).unwrap()).unwrap();
        assert_eq!(
            text,
            "# of trials,class first,conference first,expert first,class occurrences,\
             conference occurrences,expert occurrences,% correct,STD error\n"
        );
    }

    #[test]
    fn test_one_row_per_length() {
        let table = ModifierTable {
            modifier: ConfidenceModifier::UnderConfident,
            rows: (5..=15).map(bucket).collect(),
        };
        let text = String::from_utf8(render_table(&table).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 12);
        assert!(lines[1].starts_with("5,0.5,-0.25,0.125,"));
        assert!(lines[11].starts_with("15,"));
        for line in &lines[1..] {
            assert_eq!(line.split(',').count(), 9);
            assert!(line.ends_with(",0.75,0.05"));
        }
    }

    #[test]
    fn test_row_from_short_fit() {
        let mut short = bucket(5);
        short.fit.coefficients.truncate(2);
        let row = RoundRow::from(&short);
        assert_eq!(row.conference_first, -0.25);
        assert!(row.expert_first.is_nan());
    }

    #[tokio::test]
    async fn test_save_table_to_memory() {
        let sink = MemorySink::new();
        let table = ModifierTable {
            modifier: ConfidenceModifier::Control,
            rows: (5..=6).map(bucket).collect(),
        };

        let bytes = render_table(&table).unwrap();
        let location = save_table(&sink, table.modifier, bytes.clone()).await.unwrap();

        assert_eq!(location, "memory://control.csv");
        assert_eq!(sink.get("control.csv"), Some(bytes));
        assert_eq!(sink.names(), vec!["control.csv".to_string()]);
    }

    #[tokio::test]
    async fn test_save_table_reports_sink_failure() {
        // A regular file cannot act as the output directory
        let file =
            std::env::temp_dir().join(format!("intuition_report_blocker_{}", std::process::id()));
        std::fs::write(&file, b"").unwrap();

        let sink = FsSink::new(&file);
        let err = save_table(&sink, ConfidenceModifier::OverConfident, b"x\n".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::Env(EnvError::Io { .. })));

        std::fs::remove_file(&file).unwrap();
    }
}
