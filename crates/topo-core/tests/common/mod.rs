#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Barrier, Mutex};

use topo_core::crop::{CancelFlag, CropRect};
use topo_core::error::{Result, TopoError};
use topo_core::geometry::{ContentImage, Viewport};
use topo_core::io::{ImageProcessor, ImageUri};

/// Viewport and content used by the worked examples: a 400x300 view of an
/// image laid out at 800x600, 1600x1200 pixels.
pub fn scenario_geometry() -> (Viewport, ContentImage) {
    (
        Viewport::new(400.0, 300.0),
        ContentImage {
            original_width: 1600,
            original_height: 1200,
            display_width: 800.0,
            display_height: 600.0,
        },
    )
}

/// Blocks the first `measure` call until the test releases it.
pub struct Gate {
    used: AtomicBool,
    entered: Mutex<mpsc::Sender<()>>,
    release: Barrier,
}

impl Gate {
    pub fn new() -> (Self, mpsc::Receiver<()>) {
        let (tx, rx) = mpsc::channel();
        (
            Self {
                used: AtomicBool::new(false),
                entered: Mutex::new(tx),
                release: Barrier::new(2),
            },
            rx,
        )
    }

    pub fn release(&self) {
        self.release.wait();
    }

    fn pass(&self) {
        if !self.used.swap(true, Ordering::SeqCst) {
            let _ = self.entered.lock().unwrap().send(());
            self.release.wait();
        }
    }
}

/// In-memory image processor that tracks every image it produces.
pub struct MockProcessor {
    pub source_dims: (u32, u32),
    pub source_bytes: u64,
    /// 1-based resize call that fails.
    pub fail_resize_at: Option<usize>,
    /// Cancel this flag right after the given 1-based resize call.
    pub cancel_after_resize: Option<(usize, CancelFlag)>,
    pub gate: Option<Gate>,
    resizes: AtomicUsize,
    outputs: AtomicUsize,
    dims: Mutex<HashMap<ImageUri, (u32, u32)>>,
    pub live: Mutex<Vec<ImageUri>>,
    pub crops: Mutex<Vec<(ImageUri, CropRect)>>,
}

impl MockProcessor {
    pub fn new(width: u32, height: u32, bytes: u64) -> Self {
        Self {
            source_dims: (width, height),
            source_bytes: bytes,
            fail_resize_at: None,
            cancel_after_resize: None,
            gate: None,
            resizes: AtomicUsize::new(0),
            outputs: AtomicUsize::new(0),
            dims: Mutex::new(HashMap::new()),
            live: Mutex::new(Vec::new()),
            crops: Mutex::new(Vec::new()),
        }
    }

    pub fn resize_calls(&self) -> usize {
        self.resizes.load(Ordering::SeqCst)
    }

    pub fn live_images(&self) -> Vec<ImageUri> {
        self.live.lock().unwrap().clone()
    }

    fn produce(&self, tag: &str, dims: (u32, u32)) -> ImageUri {
        let n = self.outputs.fetch_add(1, Ordering::SeqCst);
        let uri = ImageUri::new(format!("mock/{tag}-{n}.png"));
        self.dims.lock().unwrap().insert(uri.clone(), dims);
        self.live.lock().unwrap().push(uri.clone());
        uri
    }
}

impl ImageProcessor for MockProcessor {
    fn measure(&self, uri: &ImageUri) -> Result<(u32, u32)> {
        if let Some(gate) = &self.gate {
            gate.pass();
        }
        Ok(self
            .dims
            .lock()
            .unwrap()
            .get(uri)
            .copied()
            .unwrap_or(self.source_dims))
    }

    fn file_size(&self, _uri: &ImageUri) -> Result<u64> {
        Ok(self.source_bytes)
    }

    fn resize(&self, _uri: &ImageUri, width: u32, height: u32) -> Result<ImageUri> {
        let call = self.resizes.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_resize_at == Some(call) {
            return Err(TopoError::Io(std::io::Error::other("decoder exploded")));
        }
        let uri = self.produce("resized", (width, height));
        if let Some((at, flag)) = &self.cancel_after_resize {
            if *at == call {
                flag.cancel();
            }
        }
        Ok(uri)
    }

    fn crop(&self, uri: &ImageUri, rect: &CropRect) -> Result<ImageUri> {
        self.crops.lock().unwrap().push((uri.clone(), *rect));
        Ok(self.produce("crop", (rect.width, rect.height)))
    }

    fn remove(&self, uri: &ImageUri) -> Result<()> {
        self.live.lock().unwrap().retain(|u| u != uri);
        Ok(())
    }
}
