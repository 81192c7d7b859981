use crate::bounded_decoder::{BoundedDecoder, DecodeRequest, DecodedImage};
use boundpix_common::{EdgeConstraint, Result, TotalPixelLimit};
use boundpix_formats::Codec;
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio::sync::{mpsc, oneshot};

const WORKER_THREAD_NAME: &str = "boundpix-imageprocessing";

/// Owned decode request for hand-off to the processing queue
#[derive(Debug, Clone)]
pub struct DecodeJob {
    pub data: Arc<[u8]>,
    pub constraint: EdgeConstraint,
    pub limit: TotalPixelLimit,
    pub eager: bool,
}

impl DecodeJob {
    pub fn new(data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            data: data.into(),
            constraint: EdgeConstraint::none(),
            limit: TotalPixelLimit::default(),
            eager: false,
        }
    }

    pub fn with_constraint(mut self, constraint: EdgeConstraint) -> Self {
        self.constraint = constraint;
        self
    }

    pub fn with_pixel_limit(mut self, limit: TotalPixelLimit) -> Self {
        self.limit = limit;
        self
    }

    pub fn eager(mut self, eager: bool) -> Self {
        self.eager = eager;
        self
    }

    pub fn request(&self) -> DecodeRequest<'_> {
        DecodeRequest::new(&self.data)
            .with_constraint(self.constraint)
            .with_pixel_limit(self.limit)
            .eager(self.eager)
    }
}

struct Envelope {
    job: DecodeJob,
    reply: oneshot::Sender<Option<DecodedImage>>,
}

/// Serial work context for image decoding.
///
/// A single named worker thread runs jobs one at a time in submission order,
/// keeping decode work off the caller's thread.
pub struct ProcessingQueue {
    sender: Option<mpsc::UnboundedSender<Envelope>>,
    worker: Option<JoinHandle<()>>,
}

impl ProcessingQueue {
    pub fn new<C: Codec + 'static>(decoder: BoundedDecoder<C>) -> Result<Self> {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Envelope>();

        let worker = std::thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                while let Some(Envelope { job, reply }) = receiver.blocking_recv() {
                    let decoded = decoder.decode(&job.request());
                    // Caller may have stopped waiting
                    let _ = reply.send(decoded);
                }
                tracing::debug!("Processing queue drained");
            })?;

        tracing::debug!("Started {} worker", WORKER_THREAD_NAME);

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    /// Queue a job and wait for its result
    pub async fn submit(&self, job: DecodeJob) -> Option<DecodedImage> {
        let receiver = self.enqueue(job)?;
        receiver.await.ok().flatten()
    }

    /// Blocking variant of [`submit`](Self::submit). Must not be called from
    /// inside an async runtime.
    pub fn submit_blocking(&self, job: DecodeJob) -> Option<DecodedImage> {
        let receiver = self.enqueue(job)?;
        receiver.blocking_recv().ok().flatten()
    }

    fn enqueue(&self, job: DecodeJob) -> Option<oneshot::Receiver<Option<DecodedImage>>> {
        let (reply, receiver) = oneshot::channel();
        self.sender.as_ref()?.send(Envelope { job, reply }).ok()?;
        Some(receiver)
    }
}

impl Drop for ProcessingQueue {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop once queued jobs finish
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("{} worker panicked", WORKER_THREAD_NAME);
            }
        }
    }
}
