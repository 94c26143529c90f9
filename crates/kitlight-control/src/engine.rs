//! Engine facade: lifecycle, schedules, and the note ingestion entry point
//!
//! The engine runs two independent periodic schedules for its lifetime:
//! the animation schedule (a Tokio task that ages flashes, composites, and
//! publishes a fresh frame snapshot each tick) and the transmission
//! schedule (a dedicated OS thread that emits one DMX frame per tick).
//! They share only the frame slot, an atomically-swapped immutable
//! snapshot, so a slow serial write can never stall the compositor and a
//! transmitted frame always reflects exactly one complete tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use kitlight_core::{Config, FlashRegistry, TimingConfig, UniverseFrame};
use parking_lot::Mutex;
use tokio::time::MissedTickBehavior;

use crate::dmx::{self, DmxTransmitter};
use crate::error::Result;

/// Upper bound on waiting for either schedule to wind down
const SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Default)]
struct EngineTasks {
    animation: Option<tokio::task::JoinHandle<()>>,
    transmission: Option<std::thread::JoinHandle<()>>,
}

/// The lighting engine.
///
/// Owns the flash registry, the frame slot, and the DMX transmitter, and
/// drives them with schedule handles created in [`start`] and cancelled in
/// [`stop`]. Nothing here is process-global; engines coexist freely, which
/// the tests rely on.
///
/// [`start`]: LightEngine::start
/// [`stop`]: LightEngine::stop
pub struct LightEngine {
    registry: Arc<FlashRegistry>,
    frame: Arc<ArcSwap<UniverseFrame>>,
    transmitter: Arc<Mutex<DmxTransmitter>>,
    running: Arc<AtomicBool>,
    device: String,
    fixtures: usize,
    timing: TimingConfig,
    tasks: Mutex<EngineTasks>,
}

impl LightEngine {
    /// Build an engine from startup configuration. No schedule runs and no
    /// device is touched until [`start`](LightEngine::start).
    pub fn new(config: &Config) -> Self {
        Self {
            registry: Arc::new(FlashRegistry::new(
                config.mapping_table(),
                config.timing.fade(),
            )),
            frame: Arc::new(ArcSwap::from_pointee(UniverseFrame::blackout())),
            transmitter: Arc::new(Mutex::new(DmxTransmitter::new())),
            running: Arc::new(AtomicBool::new(false)),
            device: config.serial.device.clone(),
            fixtures: config.rig.fixtures,
            timing: config.timing.clone(),
            tasks: Mutex::new(EngineTasks::default()),
        }
    }

    /// Start both schedules and the serial open.
    ///
    /// The animation schedule begins immediately. The serial port opens on
    /// a blocking task; the transmission schedule idles until the open
    /// succeeds and keeps running dark if it never does. Starting a
    /// running engine is a no-op. Must be called within a Tokio runtime.
    pub fn start(&self) -> Result<()> {
        let mut tasks = self.tasks.lock();
        if self.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        tasks.animation = Some(self.spawn_animation());
        tasks.transmission = Some(self.spawn_transmission()?);
        self.open_port_in_background();

        tracing::info!(
            fixtures = self.fixtures,
            animation_ms = self.timing.animation_tick_ms,
            transmit_ms = self.timing.transmit_tick_ms,
            "lighting engine started"
        );
        Ok(())
    }

    /// Ingest one note event.
    ///
    /// Fire-and-forget: never blocks on serial I/O, never errors, and is
    /// safe to call from any thread at any time, including before
    /// [`start`](LightEngine::start) and concurrently with a tick.
    pub fn note_on(&self, note: u8, velocity: u8) {
        self.registry.trigger(note, velocity);
    }

    /// Stop both schedules, black out the rig, and close the port.
    ///
    /// Cancels the schedules with bounded waits, clears every live flash,
    /// publishes a blackout frame (color channels dark, master dimmer at
    /// full), sends it once if the link is open, and detaches the port.
    /// Idempotent; safe after a partial [`start`](LightEngine::start).
    pub async fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);

        let (animation, transmission) = {
            let mut tasks = self.tasks.lock();
            (tasks.animation.take(), tasks.transmission.take())
        };

        if let Some(mut handle) = animation {
            if tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut handle)
                .await
                .is_err()
            {
                handle.abort();
            }
        }
        if let Some(handle) = transmission {
            // Exits within one transmit period of the flag flip
            let _ = tokio::task::spawn_blocking(move || handle.join()).await;
        }

        self.registry.clear();
        self.frame.store(Arc::new(UniverseFrame::blackout()));

        let mut transmitter = self.transmitter.lock();
        if transmitter.is_connected() {
            // Best effort; the port's write timeout bounds a wedged link
            transmitter.transmit(&self.frame.load_full());
            transmitter.detach();
            tracing::info!("rig blacked out, serial link closed");
        }
    }

    /// Whether the schedules are running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Whether the serial link is currently open
    pub fn is_connected(&self) -> bool {
        self.transmitter.lock().is_connected()
    }

    /// The most recently published frame snapshot
    pub fn current_frame(&self) -> Arc<UniverseFrame> {
        self.frame.load_full()
    }

    fn spawn_animation(&self) -> tokio::task::JoinHandle<()> {
        let registry = Arc::clone(&self.registry);
        let frame = Arc::clone(&self.frame);
        let running = Arc::clone(&self.running);
        let fixtures = self.fixtures;
        let dt = self.timing.animation_tick();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(dt);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                let composed = registry.advance(dt);
                frame.store(Arc::new(UniverseFrame::composed(composed, fixtures)));
            }
        })
    }

    fn spawn_transmission(&self) -> Result<std::thread::JoinHandle<()>> {
        let frame = Arc::clone(&self.frame);
        let transmitter = Arc::clone(&self.transmitter);
        let running = Arc::clone(&self.running);
        let period = self.timing.transmit_tick();

        // Serial writes and the microsecond break/mark sleeps are blocking;
        // a dedicated thread keeps them off the async runtime entirely.
        let handle = std::thread::Builder::new()
            .name("kitlight-dmx".to_string())
            .spawn(move || {
                let mut deadline = Instant::now() + period;
                while running.load(Ordering::SeqCst) {
                    let snapshot = frame.load_full();
                    transmitter.lock().transmit(&snapshot);

                    let now = Instant::now();
                    if deadline > now {
                        std::thread::sleep(deadline - now);
                    } else {
                        // Fell behind (wedged write); drop the lost ticks
                        deadline = now;
                    }
                    deadline += period;
                }
            })?;
        Ok(handle)
    }

    fn open_port_in_background(&self) {
        let transmitter = Arc::clone(&self.transmitter);
        let running = Arc::clone(&self.running);
        let device = self.device.clone();

        tokio::task::spawn_blocking(move || match dmx::open_port(&device) {
            Ok(port) => {
                let mut transmitter = transmitter.lock();
                // Checked under the lock so a concurrent stop() can't leave
                // a port attached after its own detach
                if running.load(Ordering::SeqCst) {
                    transmitter.attach(port);
                    tracing::info!(device = %device, "DMX serial link open");
                }
            }
            Err(error) => {
                tracing::warn!(
                    device = %device,
                    %error,
                    "could not open DMX serial link; engine runs dark"
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kitlight_core::LightSpec;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.serial.device = "/dev/null-kitlight-test".to_string();
        config.lights = vec![LightSpec {
            name: "Kick".to_string(),
            notes: vec![36],
            color: "#323232".to_string(),
        }];
        config
    }

    #[test]
    fn test_new_engine_is_idle_and_black() {
        let engine = LightEngine::new(&test_config());
        assert!(!engine.is_running());
        assert!(!engine.is_connected());
        assert_eq!(*engine.current_frame(), UniverseFrame::blackout());
    }

    #[test]
    fn test_note_on_before_start_is_safe() {
        let engine = LightEngine::new(&test_config());
        engine.note_on(36, 127);
        engine.note_on(60, 127); // unmapped
    }

    #[tokio::test]
    async fn test_stop_without_start_is_a_noop() {
        let engine = LightEngine::new(&test_config());
        engine.stop().await;
        engine.stop().await;
        assert!(!engine.is_running());
    }
}
