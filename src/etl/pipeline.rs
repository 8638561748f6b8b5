//! Fetch/dump loop over a worker

use super::{Extractor, Loader};
use eyre::Result;

/// Totals of one drained worker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub batches: usize,
    pub records: usize,
}

/// Run fetch/dump cycles until the worker reports it is exhausted.
///
/// The worker decides termination; this loop only sequences the cycles so
/// that batch N is dumped before batch N+1 is fetched.
///
/// # Errors
/// Stops at the first failing fetch or dump. Batches dumped before the
/// failure stay dumped.
pub async fn drain<W>(worker: &mut W) -> Result<PipelineStats>
where
    W: Extractor + Loader<Item = <W as Extractor>::Item>,
{
    let mut stats = PipelineStats::default();

    while let Some(item) = worker.fetch().await? {
        log::debug!("Dumping batch {}", stats.batches);
        stats.records += worker.dump(item)?;
        stats.batches += 1;
    }

    log::debug!(
        "Worker drained after {} batch(es), {} record(s)",
        stats.batches,
        stats.records
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Yields the given batch sizes, then stops
    struct MockWorker {
        batches: Vec<usize>,
        dumped: Vec<usize>,
        fail_at: Option<usize>,
    }

    impl Extractor for MockWorker {
        type Item = usize;
        async fn fetch(&mut self) -> Result<Option<Self::Item>> {
            if Some(self.dumped.len()) == self.fail_at {
                eyre::bail!("remote failure");
            }
            Ok(self.batches.get(self.dumped.len()).copied())
        }
    }

    impl Loader for MockWorker {
        type Item = usize;
        fn dump(&mut self, item: Self::Item) -> Result<usize> {
            self.dumped.push(item);
            Ok(item)
        }
    }

    #[tokio::test]
    async fn test_drain() {
        let mut worker = MockWorker {
            batches: vec![3, 3, 1],
            dumped: Vec::new(),
            fail_at: None,
        };

        let stats = drain(&mut worker).await.unwrap();
        assert_eq!(stats, PipelineStats { batches: 3, records: 7 });
        assert_eq!(worker.dumped, vec![3, 3, 1]);
    }

    #[tokio::test]
    async fn test_drain_empty() {
        let mut worker = MockWorker {
            batches: vec![],
            dumped: Vec::new(),
            fail_at: None,
        };

        let stats = drain(&mut worker).await.unwrap();
        assert_eq!(stats, PipelineStats::default());
    }

    #[tokio::test]
    async fn test_drain_keeps_dumped_batches_on_failure() {
        let mut worker = MockWorker {
            batches: vec![3, 3, 1],
            dumped: Vec::new(),
            fail_at: Some(2),
        };

        let result = drain(&mut worker).await;
        assert!(result.is_err());
        assert_eq!(worker.dumped, vec![3, 3]);
    }
}
