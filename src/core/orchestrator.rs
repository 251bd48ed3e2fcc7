//! Fixed-size batching over the translation gateway

use tracing::{debug, warn};

use crate::core::errors::{Result, TranslationError};
use crate::core::gateway::TranslationGateway;
use crate::core::models::{LanguageTag, TranslationOutcome};

/// Splits a sequence of texts into groups of at most `batch_size` and sends
/// them to the gateway one group at a time.
pub struct BatchOrchestrator<'g> {
    gateway: &'g dyn TranslationGateway,
    batch_size: usize,
}

impl<'g> BatchOrchestrator<'g> {
    /// Fails when `batch_size` is zero
    pub fn new(gateway: &'g dyn TranslationGateway, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(TranslationError::ConfigError {
                message: "batch_size must be greater than 0".to_string(),
            });
        }
        Ok(Self {
            gateway,
            batch_size,
        })
    }

    /// Number of gateway calls needed for `items` texts
    pub fn group_count(&self, items: usize) -> usize {
        items.div_ceil(self.batch_size)
    }

    /// Translate `items`, returning one outcome per item in input order
    pub async fn translate_batch(
        &self,
        items: &[String],
        source: LanguageTag,
        target: LanguageTag,
    ) -> Result<Vec<TranslationOutcome>> {
        self.translate_batch_with_progress(items, source, target, |_, _| {})
            .await
    }

    /// Same as [`translate_batch`](Self::translate_batch), calling
    /// `on_group(done, total)` after every group.
    ///
    /// A group that fails as a whole gets a failure marker per item and the
    /// remaining groups still run. Only [`TranslationError::BackendUnavailable`]
    /// stops the loop, since no later group could succeed either.
    pub async fn translate_batch_with_progress<F>(
        &self,
        items: &[String],
        source: LanguageTag,
        target: LanguageTag,
        mut on_group: F,
    ) -> Result<Vec<TranslationOutcome>>
    where
        F: FnMut(usize, usize) + Send,
    {
        let total = self.group_count(items.len());
        let mut outcomes = Vec::with_capacity(items.len());

        for (group, texts) in items.chunks(self.batch_size).enumerate() {
            debug!(
                "Translating group {}/{} ({} texts) via {}",
                group + 1,
                total,
                texts.len(),
                self.gateway.name()
            );

            match self.gateway.translate_many(texts, source, target).await {
                Ok(results) if results.len() == texts.len() => outcomes.extend(results),
                Ok(results) => {
                    warn!(
                        "Group {} returned {} results for {} texts",
                        group + 1,
                        results.len(),
                        texts.len()
                    );
                    let error = format!(
                        "backend returned {} results for {} texts",
                        results.len(),
                        texts.len()
                    );
                    outcomes.extend(texts.iter().map(|_| TranslationOutcome::failed(&error)));
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!("Group {} failed: {}", group + 1, e);
                    let error = e.to_string();
                    outcomes.extend(texts.iter().map(|_| TranslationOutcome::failed(&error)));
                }
            }

            on_group(group + 1, total);
        }

        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gateway::testing::ScriptedGateway;

    fn numbered(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("sentence {}", i)).collect()
    }

    #[tokio::test]
    async fn test_groups_preserve_order() {
        let gateway = ScriptedGateway::new();
        let orchestrator = BatchOrchestrator::new(&gateway, 3).unwrap();
        let items = numbered(7);

        let outcomes = orchestrator
            .translate_batch(&items, LanguageTag::English, LanguageTag::Tamil)
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 7);
        for (item, outcome) in items.iter().zip(&outcomes) {
            assert_eq!(
                outcome.translation(),
                Some(ScriptedGateway::render(item, LanguageTag::Tamil).as_str())
            );
        }

        let sizes: Vec<usize> = gateway.calls().iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
    }

    #[tokio::test]
    async fn test_failed_second_group_is_marked() {
        let gateway = ScriptedGateway::new().fail_group(1);
        let orchestrator = BatchOrchestrator::new(&gateway, 8).unwrap();
        let items = numbered(10);

        let outcomes = orchestrator
            .translate_batch(&items, LanguageTag::English, LanguageTag::Hindi)
            .await
            .unwrap();

        assert_eq!(gateway.calls().len(), 2);
        assert_eq!(outcomes.len(), 10);
        assert!(outcomes[..8].iter().all(|o| o.is_translated()));
        assert!(outcomes[8..].iter().all(|o| !o.is_translated()));
        assert_eq!(
            outcomes[7].translation(),
            Some(ScriptedGateway::render("sentence 7", LanguageTag::Hindi).as_str())
        );
    }

    #[tokio::test]
    async fn test_failed_first_group_does_not_stop_the_rest() {
        let gateway = ScriptedGateway::new().fail_group(0);
        let orchestrator = BatchOrchestrator::new(&gateway, 2).unwrap();
        let items = numbered(5);

        let outcomes = orchestrator
            .translate_batch(&items, LanguageTag::English, LanguageTag::Telugu)
            .await
            .unwrap();

        assert_eq!(gateway.calls().len(), 3);
        let translated: Vec<bool> = outcomes.iter().map(|o| o.is_translated()).collect();
        assert_eq!(translated, vec![false, false, true, true, true]);
    }

    #[tokio::test]
    async fn test_short_group_response_marks_whole_group() {
        let gateway = ScriptedGateway::new().short_group(0);
        let orchestrator = BatchOrchestrator::new(&gateway, 3).unwrap();
        let items = numbered(5);

        let outcomes = orchestrator
            .translate_batch(&items, LanguageTag::English, LanguageTag::Hindi)
            .await
            .unwrap();

        assert_eq!(outcomes.len(), items.len());
        assert!(outcomes[..3].iter().all(|o| !o.is_translated()));
        assert!(matches!(
            &outcomes[0],
            TranslationOutcome::Failed { error } if error.contains("2 results for 3 texts")
        ));
        assert_eq!(
            outcomes[3].translation(),
            Some(ScriptedGateway::render("sentence 3", LanguageTag::Hindi).as_str())
        );
        assert!(outcomes[4].is_translated());
        assert_eq!(gateway.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_item_failure_is_isolated() {
        let gateway = ScriptedGateway::new().fail_item("sentence 1");
        let orchestrator = BatchOrchestrator::new(&gateway, 8).unwrap();
        let items = numbered(3);

        let outcomes = orchestrator
            .translate_batch(&items, LanguageTag::English, LanguageTag::Malayalam)
            .await
            .unwrap();

        assert!(outcomes[0].is_translated());
        assert_eq!(outcomes[1], TranslationOutcome::failed("empty generation"));
        assert!(outcomes[2].is_translated());
    }

    #[tokio::test]
    async fn test_unavailable_backend_is_fatal() {
        let gateway = ScriptedGateway::new().unavailable();
        let orchestrator = BatchOrchestrator::new(&gateway, 2).unwrap();

        let result = orchestrator
            .translate_batch(&numbered(6), LanguageTag::English, LanguageTag::Hindi)
            .await;

        assert!(matches!(result, Err(TranslationError::BackendUnavailable { .. })));
        assert_eq!(gateway.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_calls() {
        let gateway = ScriptedGateway::new();
        let orchestrator = BatchOrchestrator::new(&gateway, 4).unwrap();

        let outcomes = orchestrator
            .translate_batch(&[], LanguageTag::English, LanguageTag::Hindi)
            .await
            .unwrap();

        assert!(outcomes.is_empty());
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_progress_reports_each_group() {
        let gateway = ScriptedGateway::new();
        let orchestrator = BatchOrchestrator::new(&gateway, 4).unwrap();
        let mut seen = Vec::new();

        orchestrator
            .translate_batch_with_progress(
                &numbered(9),
                LanguageTag::English,
                LanguageTag::Hindi,
                |done, total| seen.push((done, total)),
            )
            .await
            .unwrap();

        assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let gateway = ScriptedGateway::new();
        assert!(matches!(
            BatchOrchestrator::new(&gateway, 0),
            Err(TranslationError::ConfigError { .. })
        ));
    }
}
