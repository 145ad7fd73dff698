use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use geosphere_kernel::Planet;
use geosphere_scheduler::{Accelerator, AmortizedScheduler, Backend, SimConfig, update};

use crate::config::{EngineConfig, EngineError, PassMode, validate_speed};

const WORKER_NAME: &str = "geosphere-physics";

/// State shared between the engine handle and its worker.
#[derive(Debug)]
struct Shared {
    front: RwLock<Arc<Planet>>,
    speed_bits: AtomicU64,
    stop: AtomicBool,
    cycles: AtomicU64,
}

impl Shared {
    fn snapshot(&self) -> Arc<Planet> {
        Arc::clone(&self.front.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn speed(&self) -> f64 {
        f64::from_bits(self.speed_bits.load(Ordering::Acquire))
    }

    /// Publish `finished` as the new snapshot and hand back a planet to keep
    /// writing into: the previous snapshot when no consumer still holds it.
    fn publish(&self, finished: Planet) -> Planet {
        let front = Arc::new(finished);
        let old = {
            let mut slot = self.front.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *slot, Arc::clone(&front))
        };
        self.cycles.fetch_add(1, Ordering::Release);
        match Arc::try_unwrap(old) {
            Ok(mut back) => {
                back.clone_from(&front);
                back
            }
            Err(_held) => Planet::clone(&front),
        }
    }
}

/// One wake's worth of work.
enum Pass<A: Accelerator> {
    Amortized(AmortizedScheduler),
    Synchronous { backend: Backend<A>, sim: SimConfig },
}

impl<A: Accelerator> Pass<A> {
    /// Returns `true` when a cycle completed and the planet should be published.
    fn run(&mut self, planet: &mut Planet, dt: f64) -> bool {
        match self {
            Pass::Amortized(scheduler) => scheduler.tick(planet, dt),
            Pass::Synchronous { backend, sim } => {
                if !(dt.is_finite() && dt > 0.0) {
                    return false;
                }
                update(planet, dt, backend, sim);
                true
            }
        }
    }

    /// Complete a cycle left half done by the amortized scheduler.
    fn finish(&mut self, planet: &mut Planet) -> bool {
        match self {
            Pass::Amortized(scheduler) => {
                while !scheduler.is_idle() {
                    if scheduler.tick(planet, 0.0) {
                        return true;
                    }
                }
                false
            }
            Pass::Synchronous { .. } => false,
        }
    }

    fn reset(&mut self) {
        if let Pass::Amortized(scheduler) = self {
            scheduler.reset();
        }
    }
}

/// Runs the physics on a background thread and publishes a stable snapshot
/// after every completed cycle.
///
/// Consumers take `Arc<Planet>` snapshots with [`ThreadedEngine::snapshot`];
/// a held snapshot never changes. The worker writes into a private planet and
/// swaps it in under the lock, so readers only ever wait for a pointer swap.
#[derive(Debug)]
pub struct ThreadedEngine {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<Planet>>,
}

impl ThreadedEngine {
    /// Start a CPU-only engine.
    pub fn start(planet: Planet, config: EngineConfig) -> Result<Self, EngineError> {
        Self::start_with_backend(planet, config, Backend::cpu())
    }

    /// Start an engine whose synchronous passes may use an accelerator.
    /// Amortized passes always run on the CPU.
    pub fn start_with_backend<A>(
        planet: Planet,
        config: EngineConfig,
        backend: Backend<A>,
    ) -> Result<Self, EngineError>
    where
        A: Accelerator + Send + 'static,
    {
        config.validate()?;
        let pass = match config.mode {
            PassMode::Amortized => Pass::Amortized(AmortizedScheduler::from_sim(&config.sim)?),
            PassMode::Synchronous => Pass::Synchronous {
                backend,
                sim: config.sim.clone(),
            },
        };

        let shared = Arc::new(Shared {
            front: RwLock::new(Arc::new(planet.clone())),
            speed_bits: AtomicU64::new(config.speed.to_bits()),
            stop: AtomicBool::new(false),
            cycles: AtomicU64::new(0),
        });
        let interval = config.wake_interval()?;

        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name(WORKER_NAME.into())
            .spawn(move || run_worker(worker_shared, planet, pass, interval))
            .map_err(EngineError::Spawn)?;

        tracing::info!(
            rate_hz = config.update_rate_hz,
            speed = config.speed,
            mode = ?config.mode,
            "physics worker started"
        );
        Ok(Self {
            shared,
            worker: Some(worker),
        })
    }

    /// The most recently published planet.
    pub fn snapshot(&self) -> Arc<Planet> {
        self.shared.snapshot()
    }

    /// Set simulated years per wall-clock second. Applies from the worker's
    /// next wake.
    pub fn set_speed(&self, speed: f64) -> Result<(), EngineError> {
        validate_speed(speed)?;
        self.shared.speed_bits.store(speed.to_bits(), Ordering::Release);
        Ok(())
    }

    pub fn speed(&self) -> f64 {
        self.shared.speed()
    }

    /// Cycles published since the engine started.
    pub fn cycles(&self) -> u64 {
        self.shared.cycles.load(Ordering::Acquire)
    }

    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Signal the worker, wait for it to finish its current cycle and return
    /// the final planet.
    pub fn stop(mut self) -> Planet {
        self.shutdown()
            .unwrap_or_else(|| Planet::clone(&self.shared.snapshot()))
    }

    fn shutdown(&mut self) -> Option<Planet> {
        let worker = self.worker.take()?;
        self.shared.stop.store(true, Ordering::Release);
        match worker.join() {
            Ok(planet) => Some(planet),
            Err(_) => {
                tracing::error!("physics worker exited abnormally; returning last snapshot");
                None
            }
        }
    }
}

impl Drop for ThreadedEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker<A: Accelerator>(
    shared: Arc<Shared>,
    mut planet: Planet,
    mut pass: Pass<A>,
    interval: Duration,
) -> Planet {
    let mut last_wake = Instant::now();
    while !shared.stop.load(Ordering::Acquire) {
        let since = last_wake.elapsed();
        if since < interval {
            thread::sleep(interval - since);
        }
        let now = Instant::now();
        let dt = now.duration_since(last_wake).as_secs_f64() * shared.speed();
        last_wake = now;

        let _span = tracing::info_span!("engine_pass", dt).entered();
        match panic::catch_unwind(AssertUnwindSafe(|| pass.run(&mut planet, dt))) {
            Ok(true) => planet = shared.publish(planet),
            Ok(false) => {}
            Err(payload) => recover(&shared, &mut planet, &mut pass, payload.as_ref()),
        }
    }

    match panic::catch_unwind(AssertUnwindSafe(|| pass.finish(&mut planet))) {
        Ok(true) => planet = shared.publish(planet),
        Ok(false) => {}
        Err(payload) => recover(&shared, &mut planet, &mut pass, payload.as_ref()),
    }
    tracing::info!(time = planet.sim_time(), "physics worker stopped");
    planet
}

/// Discard the half-updated write planet after a panic.
fn recover<A: Accelerator>(
    shared: &Shared,
    planet: &mut Planet,
    pass: &mut Pass<A>,
    payload: &(dyn std::any::Any + Send),
) {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    tracing::error!(%message, "physics pass panicked; resyncing from last snapshot");
    planet.clone_from(&shared.snapshot());
    pass.reset();
}
