//! Idle globe rotation.
//!
//! While running, a background task advances the bearing by a fixed step on
//! every tick. The first click on the map stops it for good; unmounting stops
//! it regardless of state.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::core::{camera::advance_bearing, config::AnimationConfig};
use crate::engine::{lock_map, SharedMapHandle};
use crate::runtime::{spawn_on, AsyncHandle, AsyncSpawner};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatorState {
    Idle,
    Running,
    /// Terminal for the lifetime of the map handle.
    Stopped,
}

pub struct CameraAnimator {
    config: AnimationConfig,
    spawner: Arc<dyn AsyncSpawner>,
    state: AnimatorState,
    map: Option<SharedMapHandle>,
    task: Option<Box<dyn AsyncHandle>>,
    // Checked under the map lock before every tick.
    active: Arc<AtomicBool>,
    ticks: Arc<AtomicU64>,
}

impl CameraAnimator {
    pub fn new(config: AnimationConfig, spawner: Arc<dyn AsyncSpawner>) -> Self {
        Self {
            config,
            spawner,
            state: AnimatorState::Idle,
            map: None,
            task: None,
            active: Arc::new(AtomicBool::new(false)),
            ticks: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn state(&self) -> AnimatorState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == AnimatorState::Running
    }

    /// Number of bearing updates applied so far.
    pub fn tick_count(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    /// Begin rotating `map`. Only valid from `Idle`; returns whether the
    /// animation was started. Fails, staying `Idle`, when the spawner cannot
    /// run the task.
    pub fn start(&mut self, map: &SharedMapHandle) -> Result<bool> {
        if self.state != AnimatorState::Idle {
            log::debug!("animator start ignored in state {:?}", self.state);
            return Ok(false);
        }

        let period = self.config.tick_interval();
        let step = self.config.bearing_step;
        let target = Arc::clone(map);
        let active = Arc::clone(&self.active);
        let ticks = Arc::clone(&self.ticks);
        let timer = Arc::clone(&self.spawner);
        active.store(true, Ordering::SeqCst);

        let task = spawn_on(self.spawner.as_ref(), async move {
            loop {
                timer.sleep(period).await;
                let mut handle = lock_map(&target);
                if !active.load(Ordering::SeqCst) {
                    break;
                }
                let next = advance_bearing(handle.bearing(), step);
                if handle.set_bearing(next).is_err() {
                    break;
                }
                ticks.fetch_add(1, Ordering::SeqCst);
            }
        });
        let task = match task {
            Ok(task) => task,
            Err(e) => {
                self.active.store(false, Ordering::SeqCst);
                log::warn!("bearing animation could not start: {}", e);
                return Err(e);
            }
        };

        self.map = Some(Arc::clone(map));
        self.task = Some(task);
        self.state = AnimatorState::Running;
        log::debug!("bearing animation started ({:?} / {} deg)", period, step);
        Ok(true)
    }

    /// Stop in response to user interaction. Idle also moves to Stopped so a
    /// later `start` cannot resurrect the rotation after the user took over.
    ///
    /// Must not be called while the caller holds the map lock.
    pub fn stop(&mut self) {
        if self.state == AnimatorState::Stopped {
            return;
        }
        self.halt();
        log::debug!("bearing animation stopped after {} ticks", self.tick_count());
    }

    /// Tear down on unmount, whatever the state.
    pub fn cancel(&mut self) {
        self.halt();
        self.map = None;
    }

    fn halt(&mut self) {
        match &self.map {
            // Taking the lock orders this store after any tick in progress.
            Some(map) => {
                let _guard = lock_map(map);
                self.active.store(false, Ordering::SeqCst);
            }
            None => self.active.store(false, Ordering::SeqCst),
        }
        if let Some(task) = self.task.take() {
            task.cancel();
        }
        self.state = AnimatorState::Stopped;
    }
}

impl Drop for CameraAnimator {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.cancel();
        }
    }
}

impl std::fmt::Debug for CameraAnimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraAnimator")
            .field("state", &self.state)
            .field("ticks", &self.tick_count())
            .finish()
    }
}
