use crate::downsampler::{DownsampleOptions, DownsampleOutcome, Downsampler};
use boundpix_common::{Error, Result};
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Single downsample job in a batch
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub input: PathBuf,
    pub options: DownsampleOptions,
    pub output_path: Option<PathBuf>,
}

/// Progress tracking for batch operations
#[derive(Debug, Clone)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    pub current_file: Option<PathBuf>,
    pub failed: Vec<(PathBuf, String)>, // (file, error_message)
}

impl BatchProgress {
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        (self.completed as f32 / self.total as f32) * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }
}

/// Async batch processor with progress tracking
pub struct BatchProcessor {
    downsampler: Arc<Downsampler>,
    /// Maximum concurrent decodes
    concurrency: usize,
}

impl BatchProcessor {
    pub fn new(downsampler: Downsampler, concurrency: usize) -> Self {
        let concurrency = if concurrency == 0 {
            num_cpus::get()
        } else {
            concurrency
        };

        tracing::info!(
            "BatchProcessor initialized with concurrency={}",
            concurrency
        );
        Self {
            downsampler: Arc::new(downsampler),
            concurrency,
        }
    }

    /// Process batch with progress updates via channel
    pub async fn process_batch(
        &self,
        jobs: Vec<BatchJob>,
        progress_tx: mpsc::UnboundedSender<BatchProgress>,
    ) -> Vec<Result<DownsampleOutcome>> {
        let total = jobs.len();
        tracing::info!("Starting batch processing: {} jobs", total);

        let progress = Arc::new(Mutex::new(BatchProgress {
            completed: 0,
            total,
            current_file: None,
            failed: Vec::new(),
        }));

        let initial_progress = progress.lock().await.clone();
        let _ = progress_tx.send(initial_progress);

        let results: Vec<Result<DownsampleOutcome>> = stream::iter(jobs)
            .map(|job| {
                let progress = Arc::clone(&progress);
                let progress_tx = progress_tx.clone();
                let downsampler = Arc::clone(&self.downsampler);

                async move {
                    {
                        let mut p = progress.lock().await;
                        p.current_file = Some(job.input.clone());
                        let _ = progress_tx.send(p.clone());
                    }

                    // Decoding is CPU-bound, keep it off the async workers
                    let result = tokio::task::spawn_blocking({
                        let job = job.clone();
                        move || {
                            downsampler.downsample_file(&job.input, &job.options, job.output_path)
                        }
                    })
                    .await
                    .map_err(|e| Error::DecodeFailure(format!("Task join error: {}", e)))
                    .and_then(|result| result);

                    {
                        let mut p = progress.lock().await;
                        p.completed += 1;

                        if let Err(ref e) = result {
                            p.failed.push((job.input.clone(), e.to_string()));
                        }

                        let _ = progress_tx.send(p.clone());
                    }

                    result
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        tracing::info!(
            "Batch processing complete: {}/{} succeeded",
            results.iter().filter(|r| r.is_ok()).count(),
            total
        );

        results
    }

    /// Convenience method: process batch and wait for completion
    pub async fn process_batch_sync(&self, jobs: Vec<BatchJob>) -> Vec<Result<DownsampleOutcome>> {
        let (tx, mut rx) = mpsc::unbounded_channel::<BatchProgress>();

        let logger = tokio::spawn(async move {
            while let Some(progress) = rx.recv().await {
                tracing::debug!(
                    "Progress: {}/{} ({:.1}%)",
                    progress.completed,
                    progress.total,
                    progress.percentage()
                );
            }
        });

        let results = self.process_batch(jobs, tx).await;
        let _ = logger.await;
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boundpix_common::{EdgeConstraint, PathManager};
    use crate::bounded_decoder::BoundedDecoder;
    use image::DynamicImage;
    use tempfile::TempDir;

    fn processor(temp_dir: &TempDir, concurrency: usize) -> BatchProcessor {
        let downsampler = Downsampler::with_parts(
            PathManager::with_output_dir(temp_dir.path()).unwrap(),
            BoundedDecoder::new(),
        );
        BatchProcessor::new(downsampler, concurrency)
    }

    fn jobs(temp_dir: &TempDir, count: usize, size: u32) -> Vec<BatchJob> {
        (0..count)
            .map(|i| {
                let input = temp_dir.path().join(format!("test{}.png", i));
                DynamicImage::new_rgb8(size, size).save(&input).unwrap();
                BatchJob {
                    input,
                    options: DownsampleOptions {
                        constraint: EdgeConstraint::long_edge(size as f64 / 2.0),
                        ..Default::default()
                    },
                    output_path: Some(temp_dir.path().to_path_buf()),
                }
            })
            .collect()
    }

    #[tokio::test]
    async fn test_batch_processing() {
        let temp_dir = TempDir::new().unwrap();
        let jobs = jobs(&temp_dir, 5, 100);

        let results = processor(&temp_dir, 2).process_batch_sync(jobs).await;

        assert_eq!(results.len(), 5);
        assert!(results
            .iter()
            .all(|r| r.as_ref().is_ok_and(|o| o.output_dimensions == (50, 50))));
    }

    #[tokio::test]
    async fn test_progress_tracking() {
        let temp_dir = TempDir::new().unwrap();
        let mut jobs = jobs(&temp_dir, 3, 50);

        let broken = temp_dir.path().join("broken.png");
        std::fs::write(&broken, b"not a png").unwrap();
        jobs.push(BatchJob {
            input: broken.clone(),
            options: DownsampleOptions::default(),
            output_path: None,
        });

        let (tx, mut rx) = mpsc::unbounded_channel::<BatchProgress>();
        let processor = processor(&temp_dir, 1);

        tokio::spawn(async move { processor.process_batch(jobs, tx).await });

        let mut final_progress = None;
        while let Some(progress) = rx.recv().await {
            final_progress = Some(progress);
        }

        let final_progress = final_progress.unwrap();
        assert_eq!(final_progress.completed, 4);
        assert_eq!(final_progress.total, 4);
        assert!(final_progress.is_complete());
        assert_eq!(final_progress.failed.len(), 1);
        assert_eq!(final_progress.failed[0].0, broken);
    }
}
