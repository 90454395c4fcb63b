use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, Receiver};

use crate::error::Error;
use crate::video::{Capture, VideoSource};

pub const DEFAULT_QUEUE_SIZE: usize = 128;

/// Decodes frames of an inner capture on a background thread into a
/// bounded queue. `read` blocks until a frame is queued.
pub struct BufferedCapture<C>
where
    C: Capture + Send + 'static,
    C::Frame: Send + 'static,
{
    rx: Option<Receiver<Result<C::Frame, Error>>>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<C>>,
    source_fps: f64,
}

impl<C> BufferedCapture<C>
where
    C: Capture + Send + 'static,
    C::Frame: Send + 'static,
{
    pub fn start(capture: C, queue_size: usize) -> Result<Self, Error> {
        let source_fps = capture.source_fps()?;
        let stop = Arc::new(AtomicBool::new(false));
        let (tx, rx) = bounded(queue_size.max(1));

        let thread_stop = stop.clone();
        let handle = std::thread::Builder::new()
            .name("frame-reader".into())
            .spawn(move || {
                let mut capture = capture;

                while !thread_stop.load(Ordering::Relaxed) {
                    match capture.read() {
                        Ok(Some(frame)) => {
                            if tx.send(Ok(frame)).is_err() {
                                break;
                            }
                        }
                        Ok(None) => break,
                        Err(err) => {
                            let _ = tx.send(Err(err));
                            break;
                        }
                    }
                }

                capture
            })
            .map_err(|e| Error::Capture(format!("can not spawn reader thread: {}", e)))?;

        Ok(Self {
            rx: Some(rx),
            stop,
            handle: Some(handle),
            source_fps,
        })
    }
}

impl<C> Capture for BufferedCapture<C>
where
    C: Capture + Send + 'static,
    C::Frame: Send + 'static,
{
    type Frame = C::Frame;

    fn open(source: &VideoSource) -> Result<Self, Error> {
        Self::start(C::open(source)?, DEFAULT_QUEUE_SIZE)
    }

    fn read(&mut self) -> Result<Option<C::Frame>, Error> {
        match &self.rx {
            Some(rx) => match rx.recv() {
                Ok(frame) => frame.map(Some),
                Err(_) => Ok(None),
            },
            None => Ok(None),
        }
    }

    #[inline]
    fn source_fps(&self) -> Result<f64, Error> {
        Ok(self.source_fps)
    }

    fn release(&mut self) -> Result<(), Error> {
        self.stop.store(true, Ordering::Relaxed);

        // unblocks a reader waiting on a full queue
        drop(self.rx.take());

        match self.handle.take() {
            Some(handle) => {
                let mut capture = handle
                    .join()
                    .map_err(|_| Error::Capture("frame reader thread panicked".into()))?;

                capture.release()
            }
            None => Ok(()),
        }
    }
}

impl<C> Drop for BufferedCapture<C>
where
    C: Capture + Send + 'static,
    C::Frame: Send + 'static,
{
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            tracing::warn!(%err, "failed to stop frame reader");
        }
    }
}
