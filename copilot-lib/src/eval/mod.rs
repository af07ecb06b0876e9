//! Evaluation harness
//!
//! Runs labelled questions through the same [`Copilot`] used in production
//! and scores each answer with the copilot's own [`Classifier`], so accuracy
//! numbers can never drift from what users see.
//!
//! The case file is headerless CSV, one `question,expected-category` pair per
//! row:
//!
//! ```text
//! Why was my shipment delayed?,Weather
//! What held up the pallet at the dock?,Inventory
//! ```
//!
//! [`Classifier`]: crate::classify::Classifier

use std::io;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::classify::Category;
use crate::embed::Embedder;
use crate::generate::LanguageModel;
use crate::index::VectorIndex;
use crate::pipeline::Copilot;
use crate::{Error, Result};

/// A labelled question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalCase {
    pub question: String,
    /// Expected label as written in the case file
    pub expected: String,
}

/// What happened for one case
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseOutcome {
    pub question: String,
    pub expected: String,
    /// Category detected in the model's answer, `None` if the pipeline failed
    pub detected: Option<Category>,
    /// The model's response, or the error message when the pipeline failed
    pub answer: String,
    pub passed: bool,
}

/// Aggregate result of an evaluation run
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub outcomes: Vec<CaseOutcome>,
}

impl Report {
    #[must_use]
    pub fn hits(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Fraction of passing cases, 0 for an empty run.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.hits() as f64 / total as f64,
        }
    }
}

/// Load cases from a CSV file.
pub fn load_cases(path: impl AsRef<Path>) -> Result<Vec<EvalCase>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| Error::load(path, e))?;
    read_cases(file).map_err(|e| Error::load(path, e))
}

/// Read cases from CSV. Rows with fewer than two fields are skipped.
pub fn read_cases<R: io::Read>(reader: R) -> std::result::Result<Vec<EvalCase>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut cases = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.len() < 2 {
            continue;
        }
        cases.push(EvalCase {
            question: row[0].to_string(),
            expected: row[1].to_string(),
        });
    }
    Ok(cases)
}

/// Run every case through `copilot` with `k` passages each.
///
/// A failing query counts as a miss; the run continues.
pub fn evaluate<E, I, L>(copilot: &Copilot<E, I, L>, cases: &[EvalCase], k: usize) -> Report
where
    E: Embedder + ?Sized,
    I: VectorIndex + ?Sized,
    L: LanguageModel + ?Sized,
{
    let classifier = copilot.classifier();

    let outcomes: Vec<CaseOutcome> = cases
        .iter()
        .map(|case| {
            let expected = classifier.resolve(&case.expected);
            let (detected, answer) = match copilot.ask(&case.question, k) {
                Ok(answer) => (Some(answer.category), answer.response),
                Err(e) => (None, e.to_string()),
            };
            let passed = expected.is_some() && detected == expected;

            debug!(question = %case.question, ?expected, ?detected, passed, "evaluated case");
            CaseOutcome {
                question: case.question.clone(),
                expected: case.expected.clone(),
                detected,
                answer,
                passed,
            }
        })
        .collect();

    let report = Report { outcomes };
    info!(
        hits = report.hits(),
        total = report.total(),
        accuracy = report.accuracy(),
        "evaluation finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use super::*;
    use crate::index::{FlatIndex, Metric};
    use crate::pipeline::tests::ScriptedModel;
    use crate::retrieve::tests::KeywordEmbedder;
    use crate::retrieve::Retriever;
    use crate::store::{Record, RecordStore};

    fn copilot(response: &str) -> Copilot<KeywordEmbedder, FlatIndex, ScriptedModel> {
        let retriever = Retriever::new(
            Arc::new(KeywordEmbedder::new(vec!["snow", "stock"])),
            Arc::new(FlatIndex::new(Metric::L2, 2, vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap()),
            Arc::new(RecordStore::new(vec![
                Record::new(0, "Snow on the pass"),
                Record::new(1, "Out of stock"),
            ])),
        )
        .unwrap();
        Copilot::new(retriever, Arc::new(ScriptedModel::new(response)))
    }

    fn case(question: &str, expected: &str) -> EvalCase {
        EvalCase {
            question: question.to_string(),
            expected: expected.to_string(),
        }
    }

    #[test]
    fn test_read_cases_skips_short_rows_and_trims() {
        let csv = "Why was my shipment delayed? , Weather\n\nlonely row\n\"Late, again?\",inventory\n";
        let cases = read_cases(csv.as_bytes()).unwrap();

        assert_eq!(
            cases,
            vec![
                case("Why was my shipment delayed?", "Weather"),
                case("Late, again?", "inventory"),
            ]
        );
    }

    #[test]
    fn test_load_cases_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Why late?,Traffic").unwrap();

        let cases = load_cases(file.path()).unwrap();
        assert_eq!(cases, vec![case("Why late?", "Traffic")]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_cases("/nonexistent/qa_seed.csv").unwrap_err();
        assert!(matches!(err, Error::Load { .. }));
    }

    #[test]
    fn test_accuracy() {
        let copilot = copilot("Storm damage closed the route.");
        let report = evaluate(
            &copilot,
            &[
                case("snow?", "weather"),
                case("stock?", "Weather"),
                case("stock?", "Inventory"),
                case("snow?", "Unknown"),
            ],
            1,
        );

        assert_eq!(report.total(), 4);
        assert_eq!(report.hits(), 2);
        assert!((report.accuracy() - 0.5).abs() < f64::EPSILON);
        assert_eq!(report.outcomes[0].detected, Some(Category::Weather));
    }

    #[test]
    fn test_pipeline_error_is_a_miss() {
        let copilot = copilot("Weather");
        let report = evaluate(&copilot, &[case("   ", "Weather"), case("snow", "Weather")], 1);

        assert_eq!(report.hits(), 1);
        assert!(!report.outcomes[0].passed);
        assert_eq!(report.outcomes[0].detected, None);
        assert!(report.outcomes[0].answer.contains("invalid input"));
    }

    #[test]
    fn test_unresolvable_expected_label_never_passes() {
        let copilot = copilot("Customs hold at the border.");
        let report = evaluate(&copilot, &[case("snow", "customs")], 1);
        assert_eq!(report.hits(), 0);
    }

    #[test]
    fn test_verdict_matches_classifier() {
        let copilot = copilot("Rain flooded the depot.");
        let cases = [case("snow", "Weather"), case("snow", "Traffic")];
        let report = evaluate(&copilot, &cases, 1);

        for (outcome, case) in report.outcomes.iter().zip(&cases) {
            let expected = copilot.classifier().resolve(&case.expected).unwrap();
            assert_eq!(
                outcome.passed,
                copilot.classifier().judge("Rain flooded the depot.", expected)
            );
        }
    }

    #[test]
    fn test_empty_run() {
        let report = evaluate(&copilot("Weather"), &[], 3);
        assert_eq!(report.total(), 0);
        assert_eq!(report.accuracy(), 0.0);
    }
}
