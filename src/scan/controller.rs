//! Scan loop controller.
//!
//! Drives capture → preprocess → decode → validate → deliver on a fixed
//! period and owns the start/stop lifecycle of the frame source.

use super::detection::Detection;
use super::session::{ScanSession, ScanState};
use super::stats::{ScanStats, StatsSnapshot};
use super::ticker::Ticker;
use crate::capture::{CameraDevice, CameraError, CaptureConfig, FileConfig, FrameSource};
use crate::decode::{decode_first, DecodeConfig, Decoder, RxingDecoder};
use crate::preprocess::{PreprocessConfig, Preprocessor};
use crate::validate::{Rejection, ResultValidator};
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Consumer of accepted detections.
pub type DetectCallback = Arc<dyn Fn(&Detection) + Send + Sync>;

/// How ticks are driven once the controller is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// A dedicated scan thread ticks at this period.
    Periodic(Duration),
    /// The caller drives [`ScanController::tick`].
    Manual,
}

impl Default for Schedule {
    fn default() -> Self {
        Schedule::Periodic(Duration::from_millis(100))
    }
}

/// Controller construction options.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Constraints passed to the source on start.
    pub capture: CaptureConfig,
    /// Candidate derivation.
    pub preprocess: PreprocessConfig,
    /// How ticks are driven.
    pub schedule: Schedule,
}

impl ScanOptions {
    /// Options taken from a loaded configuration file.
    pub fn from_file_config(config: &FileConfig) -> Self {
        Self {
            capture: config.capture.clone(),
            preprocess: config.preprocess.clone(),
            schedule: Schedule::Periodic(config.scan.interval()),
        }
    }

    /// Replaces the schedule.
    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }
}

/// What a single tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Another tick was still running.
    Skipped,
    /// The controller is not running.
    Idle,
    /// The stream had no frame ready.
    NotReady,
    /// Frame capture failed; the loop keeps going.
    CaptureFailed(CameraError),
    /// No candidate decoded.
    NoSymbol,
    /// A symbol decoded but failed validation.
    Rejected(Rejection),
    /// A detection was delivered to the callback.
    Delivered(Detection),
}

thread_local! {
    // Identity of the controller whose scan loop runs on this thread.
    static SCAN_LOOP_OWNER: Cell<usize> = const { Cell::new(0) };
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

type EngineFactory<D> = Box<dyn Fn() -> D + Send + Sync>;

struct Inner<S, D> {
    source: Mutex<S>,
    engine: OnceLock<Mutex<D>>,
    make_engine: Option<EngineFactory<D>>,
    preprocessor: Preprocessor,
    validator: ResultValidator,
    capture: CaptureConfig,
    schedule: Schedule,
    session: Mutex<ScanSession>,
    callback: Mutex<Option<DetectCallback>>,
    busy: AtomicBool,
    stats: ScanStats,
}

/// Clears the busy flag when the tick ends, including by unwinding.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S: FrameSource, D: Decoder> Inner<S, D> {
    fn id(&self) -> usize {
        self as *const Self as usize
    }

    fn on_scan_thread(&self) -> bool {
        SCAN_LOOP_OWNER.with(|owner| owner.get() == self.id())
    }

    fn is_running(&self) -> bool {
        lock(&self.session).is_running()
    }

    fn tick(&self) -> TickOutcome {
        let Some(_busy) = BusyGuard::acquire(&self.busy) else {
            self.stats.record_skipped(1);
            tracing::trace!("Tick overlapped a running tick; skipped");
            return TickOutcome::Skipped;
        };

        if !self.is_running() {
            return TickOutcome::Idle;
        }
        self.stats.record_tick();

        let frame = {
            let mut source = lock(&self.source);
            if !source.has_enough_data() {
                self.stats.record_not_ready();
                return TickOutcome::NotReady;
            }
            match source.capture_frame() {
                Ok(frame) => frame,
                Err(e) => {
                    self.stats.record_capture_failure();
                    tracing::debug!(error = %e, "Frame capture failed");
                    return TickOutcome::CaptureFailed(e);
                }
            }
        };

        let Some(engine) = self.engine.get() else {
            return TickOutcome::Idle;
        };
        let decoded = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut engine = lock(engine);
            decode_first(&mut *engine, self.preprocessor.candidates(&frame))
        }))
        .unwrap_or_else(|_| {
            tracing::debug!(sequence = frame.sequence(), "Decoder panicked; treated as miss");
            None
        });
        let Some(result) = decoded else {
            self.stats.record_miss();
            tracing::trace!(sequence = frame.sequence(), "No symbol in frame");
            return TickOutcome::NoSymbol;
        };
        self.stats.record_hit(result.context.candidate);

        let callback = {
            let mut session = lock(&self.session);
            // Stopped while decoding
            if !session.is_running() {
                return TickOutcome::Idle;
            }
            if let Err(rejection) = self.validator.admit(&result, &mut session) {
                self.stats.record_rejected();
                return TickOutcome::Rejected(rejection);
            }
            lock(&self.callback).clone()
        };

        let detection = Detection::new(result, frame.sequence());
        tracing::info!(
            text = %detection.text,
            format = ?detection.format,
            candidate = ?detection.candidate,
            sequence = detection.frame_sequence,
            "Barcode detected"
        );

        if let Some(callback) = callback {
            if panic::catch_unwind(AssertUnwindSafe(|| callback(&detection))).is_err() {
                self.stats.record_callback_panic();
                tracing::warn!(text = %detection.text, "Detection callback panicked");
            }
        }
        self.stats.record_delivered();
        TickOutcome::Delivered(detection)
    }

    /// Closes the source and returns to Idle. Safe to call repeatedly.
    fn halt(&self) {
        lock(&self.session).reset();
        lock(&self.source).close();
        lock(&self.callback).take();
    }

    fn run(&self, period: Duration, stop: mpsc::Receiver<()>) {
        SCAN_LOOP_OWNER.with(|owner| owner.set(self.id()));
        let mut ticker = Ticker::new(period);

        loop {
            match stop.recv_timeout(ticker.remaining(Instant::now())) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
            if !self.is_running() {
                break;
            }

            self.tick();

            let missed = ticker.advance(Instant::now());
            if missed > 0 {
                self.stats.record_skipped(missed);
                tracing::trace!(missed, "Tick overran; skipped timer firings");
            }
        }

        SCAN_LOOP_OWNER.with(|owner| owner.set(0));
        tracing::debug!("Scan loop exited");
    }
}

/// Handle to a running scan thread.
struct Driver {
    stop: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl Driver {
    fn shutdown(self) {
        let _ = self.stop.send(());
        drop(self.stop);
        // A stop issued from inside the loop cannot wait for itself
        if self.handle.thread().id() == thread::current().id() {
            return;
        }
        if self.handle.join().is_err() {
            tracing::warn!("Scan thread panicked");
        }
    }
}

/// Owns one frame source, one decode engine and one scan session.
///
/// Controllers are independent: there is no process-wide scanner state.
pub struct ScanController<S: FrameSource + 'static, D: Decoder + 'static> {
    inner: Arc<Inner<S, D>>,
    driver: Mutex<Option<Driver>>,
}

impl<S: FrameSource + 'static> ScanController<S, RxingDecoder> {
    /// Controller with an rxing engine built from `decode` on first start.
    pub fn rxing(source: S, decode: DecodeConfig, options: ScanOptions) -> Self {
        Self::new(source, move || RxingDecoder::new(&decode), options)
    }
}

impl<S: FrameSource + 'static, D: Decoder + 'static> ScanController<S, D> {
    /// Creates a controller whose engine is built lazily by `make_engine`
    /// on the first successful start and kept for the controller lifetime.
    pub fn new<F>(source: S, make_engine: F, options: ScanOptions) -> Self
    where
        F: Fn() -> D + Send + Sync + 'static,
    {
        Self::build(source, OnceLock::new(), Some(Box::new(make_engine)), options)
    }

    /// Creates a controller around a ready engine.
    pub fn with_engine(source: S, engine: D, options: ScanOptions) -> Self {
        Self::build(source, OnceLock::from(Mutex::new(engine)), None, options)
    }

    fn build(
        source: S,
        engine: OnceLock<Mutex<D>>,
        make_engine: Option<EngineFactory<D>>,
        options: ScanOptions,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                source: Mutex::new(source),
                engine,
                make_engine,
                preprocessor: Preprocessor::new(options.preprocess),
                validator: ResultValidator::new(),
                capture: options.capture,
                schedule: options.schedule,
                session: Mutex::new(ScanSession::default()),
                callback: Mutex::new(None),
                busy: AtomicBool::new(false),
                stats: ScanStats::default(),
            }),
            driver: Mutex::new(None),
        }
    }

    /// Lists the video input devices of the underlying source.
    pub fn enumerate_devices(&self) -> Vec<CameraDevice> {
        lock(&self.inner.source).enumerate_devices()
    }

    /// Starts scanning, delivering accepted detections to `on_detect`.
    ///
    /// Any running session is stopped first. On failure the controller is
    /// left Idle with the source closed.
    pub fn start<F>(&self, device_id: Option<&str>, on_detect: F) -> Result<(), CameraError>
    where
        F: Fn(&Detection) + Send + Sync + 'static,
    {
        let mut driver = lock(&self.driver);
        self.stop_locked(&mut driver);

        lock(&self.inner.session).set_state(ScanState::Starting);

        let config = self.inner.capture.for_device(device_id);
        let opened = lock(&self.inner.source).open(&config);
        let device = match opened {
            Ok(device) => device,
            Err(e) => {
                tracing::warn!(error = %e, "Scanner start failed");
                self.inner.halt();
                return Err(e);
            }
        };

        if self.inner.engine.get().is_none() {
            if let Some(make_engine) = &self.inner.make_engine {
                tracing::debug!("Building decode engine");
                let _ = self.inner.engine.set(Mutex::new(make_engine()));
            }
        }

        *lock(&self.inner.callback) = Some(Arc::new(on_detect));
        {
            let mut session = lock(&self.inner.session);
            session.set_active_device(Some(device.id.clone()));
            session.set_state(ScanState::Running);
        }

        if let Schedule::Periodic(period) = self.inner.schedule {
            match self.spawn_driver(period) {
                Ok(spawned) => *driver = Some(spawned),
                Err(e) => {
                    self.inner.halt();
                    return Err(e);
                }
            }
        }

        tracing::info!(
            device = %device.id,
            label = %device.label,
            schedule = ?self.inner.schedule,
            "Scanner started"
        );
        Ok(())
    }

    fn spawn_driver(&self, period: Duration) -> Result<Driver, CameraError> {
        let (stop, stop_rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let handle = thread::Builder::new()
            .name("barcode-scan".into())
            .spawn(move || inner.run(period, stop_rx))
            .map_err(|e| CameraError::Hardware(format!("failed to spawn scan thread: {e}")))?;
        Ok(Driver { stop, handle })
    }

    /// Runs one tick on the calling thread.
    ///
    /// Overlapping ticks return [`TickOutcome::Skipped`] immediately.
    pub fn tick(&self) -> TickOutcome {
        self.inner.tick()
    }

    /// Stops scanning and releases the camera. Idempotent.
    ///
    /// When called from the detection callback on the scan thread the loop
    /// exits as soon as the callback returns.
    pub fn stop(&self) {
        if self.inner.on_scan_thread() {
            let was_running = self.inner.is_running();
            self.inner.halt();
            if was_running {
                tracing::info!("Scanner stopped from detection callback");
            }
            return;
        }
        let mut driver = lock(&self.driver);
        self.stop_locked(&mut driver);
    }

    fn stop_locked(&self, driver: &mut Option<Driver>) {
        // No new tick may begin once the state leaves Running
        let was = {
            let mut session = lock(&self.inner.session);
            let was = session.state();
            session.set_state(ScanState::Idle);
            was
        };
        if let Some(driver) = driver.take() {
            driver.shutdown();
        }
        self.inner.halt();
        if was == ScanState::Running {
            tracing::info!("Scanner stopped");
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ScanState {
        lock(&self.inner.session).state()
    }

    /// Returns true while a session is running.
    pub fn is_running(&self) -> bool {
        self.inner.is_running()
    }

    /// Last value delivered in the current session, or "" if none.
    pub fn last_accepted(&self) -> String {
        lock(&self.inner.session).last_accepted().to_owned()
    }

    /// Id of the device the current session opened.
    pub fn active_device(&self) -> Option<String> {
        lock(&self.inner.session)
            .active_device()
            .map(str::to_owned)
    }

    /// Returns true once the decode engine has been built.
    pub fn engine_ready(&self) -> bool {
        self.inner.engine.get().is_some()
    }

    /// Counters accumulated over the controller lifetime.
    pub fn stats(&self) -> StatsSnapshot {
        self.inner.stats.snapshot()
    }
}

impl<S: FrameSource + 'static, D: Decoder + 'static> Drop for ScanController<S, D> {
    fn drop(&mut self) {
        self.stop();
    }
}
