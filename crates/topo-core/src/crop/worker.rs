use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::{debug, info};

use crate::error::{Result, TopoError};
use crate::io::ImageProcessor;

use super::cancel::CancelFlag;
use super::downscale::discard;
use super::finalize::{finalize_crop, CropOutput, CropRequest};
use super::types::{NoOpReporter, ProgressReporter};

/// Runs crop finalization off the input thread, one job at a time per view.
///
/// Submitting a new job cancels the one in flight; dropping the worker (view
/// teardown) cancels whatever is still running. Output nobody receives is
/// removed.
pub struct CropWorker {
    processor: Arc<dyn ImageProcessor>,
    reporter: Arc<dyn ProgressReporter>,
    in_flight: Option<CancelFlag>,
}

impl CropWorker {
    pub fn new(processor: Arc<dyn ImageProcessor>) -> Self {
        Self {
            processor,
            reporter: Arc::new(NoOpReporter),
            in_flight: None,
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn submit(&mut self, request: CropRequest) -> Result<CropHandle> {
        self.cancel_in_flight();

        let cancel = CancelFlag::new();
        let (tx, rx) = mpsc::channel();
        let processor = Arc::clone(&self.processor);
        let reporter = Arc::clone(&self.reporter);
        let job_cancel = cancel.clone();

        let handle = std::thread::Builder::new()
            .name("topo-crop".into())
            .spawn(move || {
                let result = finalize_crop(&request, processor.as_ref(), &job_cancel, reporter.as_ref());
                if let Err(mpsc::SendError(Ok(orphan))) = tx.send(result) {
                    debug!(image = %orphan.image, "Crop handle gone, removing output");
                    discard(processor.as_ref(), Some(&orphan.image));
                }
            })?;

        self.in_flight = Some(cancel.clone());
        Ok(CropHandle {
            cancel,
            rx,
            handle: Some(handle),
            processor: Arc::clone(&self.processor),
        })
    }

    /// Cancel the running job, if any. Its handle reports `Cancelled`.
    pub fn cancel_in_flight(&mut self) {
        if let Some(flag) = self.in_flight.take() {
            if !flag.is_cancelled() {
                info!("Cancelling in-flight crop");
            }
            flag.cancel();
        }
    }
}

impl Drop for CropWorker {
    fn drop(&mut self) {
        self.cancel_in_flight();
    }
}

/// Handle to one submitted crop job.
///
/// Dropping it without taking the result cancels the job.
pub struct CropHandle {
    cancel: CancelFlag,
    rx: mpsc::Receiver<Result<CropOutput>>,
    handle: Option<JoinHandle<()>>,
    processor: Arc<dyn ImageProcessor>,
}

impl CropHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Non-blocking poll for the result.
    pub fn try_result(&self) -> Option<Result<CropOutput>> {
        self.rx.try_recv().ok()
    }

    /// Block until the job finishes.
    pub fn wait(mut self) -> Result<CropOutput> {
        let result = self
            .rx
            .recv()
            .map_err(|_| TopoError::Io(std::io::Error::other("crop thread exited without a result")));
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        result?
    }
}

impl Drop for CropHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
        // A result already sent is ours to clean up.
        for output in self.rx.try_iter().flatten() {
            discard(self.processor.as_ref(), Some(&output.image));
        }
    }
}
