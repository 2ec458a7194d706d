//! Keyed, cancellation-safe QR regeneration pipeline.
//!
//! Two-tier display: the viewer always has the synchronous half-block
//! rendition of the current request available, while a worker thread
//! produces the PNG bitmap. Completions may arrive out of submission order
//! (encode latency is input-dependent), so correctness rests on the key
//! comparison at completion time, not on arrival order: the last *submitted*
//! key always wins.
//!
//! There is no true cancellation of an in-flight encode. A superseded
//! request is soft-cancelled by disregard — its completion fails the key
//! check and is dropped — and a disposed flag discards everything that
//! resolves after teardown.

use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use log::{debug, error};

use crate::encode;
use crate::request::{GenerationRequest, RequestKey};

/// A completed encode, tagged with the key it was computed for.
struct Completion {
    key: RequestKey,
    png: Vec<u8>,
}

enum State {
    Idle,
    Pending { key: RequestKey, request: GenerationRequest },
    Ready { key: RequestKey, request: GenerationRequest, png: Vec<u8> },
}

/// What the shell should render right now.
pub enum Display<'a> {
    /// No text — show the empty-state hint.
    Empty,
    /// Encode in flight (or failed): render the fallback for `request`.
    Fallback { request: &'a GenerationRequest },
    /// Bitmap matching the current key.
    Bitmap { request: &'a GenerationRequest, png: &'a [u8] },
}

type Encoder = Box<dyn Fn(&GenerationRequest) -> anyhow::Result<Vec<u8>> + Send + 'static>;

pub struct CodeGenerator {
    job_tx: Option<mpsc::Sender<GenerationRequest>>,
    res_rx: mpsc::Receiver<Completion>,
    worker: Option<JoinHandle<()>>,
    state: State,
    disposed: bool,
}

impl CodeGenerator {
    /// Spawn a generator backed by the real PNG encoder.
    pub fn new() -> Self {
        Self::with_encoder(Box::new(|request| encode::encode_png(request)))
    }

    /// Spawn a generator with an arbitrary encoder. The encoder runs on the
    /// worker thread; tests inject recording or failing ones.
    pub fn with_encoder(encoder: Encoder) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<GenerationRequest>();
        let (res_tx, res_rx) = mpsc::channel::<Completion>();

        // Encode worker: drain-to-latest. Unlike a prefetch queue where every
        // request matters, a queued request that has already been superseded
        // is stale by definition — its completion would fail the key check
        // anyway — so only the newest job is encoded.
        let worker = thread::spawn(move || {
            debug!("encode worker: started");
            while let Ok(mut request) = job_rx.recv() {
                while let Ok(newer) = job_rx.try_recv() {
                    debug!("encode worker: dropping superseded request");
                    request = newer;
                }
                let key = request.key();
                match encoder(&request) {
                    Ok(png) => {
                        debug!("encode worker: {} bytes for [{key}]", png.len());
                        let _ = res_tx.send(Completion { key, png });
                    }
                    // EncodeFailure is recovered locally: no completion is
                    // sent, the fallback stays on screen.
                    Err(e) => error!("encode worker: [{key}]: {e:#}"),
                }
            }
            debug!("encode worker: channel closed, exiting");
        });

        Self {
            job_tx: Some(job_tx),
            res_rx,
            worker: Some(worker),
            state: State::Idle,
            disposed: false,
        }
    }

    /// Submit the current inputs.
    ///
    /// Empty text clears to `Idle` and discards any previous result. An
    /// unchanged key is a no-op, so unrelated redraw cycles never trigger a
    /// redundant encode. Anything else starts a new generation, superseding
    /// whatever was in flight.
    pub fn submit(&mut self, request: GenerationRequest) {
        if self.disposed {
            return;
        }
        if request.text.is_empty() {
            if !matches!(self.state, State::Idle) {
                debug!("generator: cleared to idle");
                self.state = State::Idle;
            }
            return;
        }
        let key = request.key();
        if self.current_key() == Some(&key) {
            return;
        }
        debug!("generator: pending [{key}]");
        if let Some(tx) = &self.job_tx {
            let _ = tx.send(request.clone());
        }
        self.state = State::Pending { key, request };
    }

    fn current_key(&self) -> Option<&RequestKey> {
        match &self.state {
            State::Idle => None,
            State::Pending { key, .. } | State::Ready { key, .. } => Some(key),
        }
    }

    /// True while an encode is in flight (the event loop polls faster then).
    pub fn is_pending(&self) -> bool {
        matches!(self.state, State::Pending { .. })
    }

    /// Drain completed encodes. Returns true if the display changed.
    pub fn pump(&mut self) -> bool {
        let mut changed = false;
        while let Ok(done) = self.res_rx.try_recv() {
            changed |= self.accept(done.key, done.png);
        }
        changed
    }

    /// Completion handler. The key recorded at submission must still equal
    /// the currently pending key; stale results and completions arriving
    /// after dispose are silently discarded — neither mutates state.
    fn accept(&mut self, key: RequestKey, png: Vec<u8>) -> bool {
        if self.disposed {
            debug!("generator: discarding completion after dispose");
            return false;
        }
        match &self.state {
            State::Pending { key: current, request } if *current == key => {
                let request = request.clone();
                debug!("generator: ready [{key}]");
                self.state = State::Ready { key, request, png };
                true
            }
            _ => {
                debug!("generator: discarding stale result [{key}]");
                false
            }
        }
    }

    /// The symbol to render right now. Never a bitmap whose key does not
    /// match the latest submitted request: a pending regeneration shows the
    /// fallback for the *new* request, not the previous bitmap.
    pub fn current_display(&self) -> Display<'_> {
        match &self.state {
            State::Idle => Display::Empty,
            State::Pending { request, .. } => Display::Fallback { request },
            State::Ready { request, png, .. } => Display::Bitmap { request, png },
        }
    }

    /// Tear down. All future completions are discarded and the worker exits
    /// once its queue drains.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.job_tx = None;
        self.state = State::Idle;
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CodeGenerator {
    fn drop(&mut self) {
        self.dispose();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
