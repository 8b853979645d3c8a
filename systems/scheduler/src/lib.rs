#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Progress threshold scheduler that turns disclosure progress into spawn
//! origin and wave requests.
//!
//! Each counted disclosure carries the progress ratio observed right after the
//! cell opened. Thresholds at or below that ratio fire once and increment a
//! pending counter; pending requests are then drained through
//! [`SpawnRequests`] until the first refusal. A refused request stays pending
//! and is retried on the next disclosure, so no request is ever lost.

use mine_defence_core::{Event, ThresholdConfig};

/// Targets the scheduler drains its pending requests into.
pub trait SpawnRequests {
    /// Attempts to register one spawn origin, reporting whether it succeeded.
    fn try_spawn_origin(&mut self) -> bool;

    /// Attempts to launch one wave, reporting whether it succeeded.
    fn try_spawn_wave(&mut self) -> bool;
}

/// Ascending ratio list paired with monotonic fired flags.
#[derive(Clone, Debug, PartialEq)]
pub struct ThresholdSet {
    thresholds: Vec<f32>,
    fired: Vec<bool>,
}

impl ThresholdSet {
    /// Creates a set where no threshold has fired yet.
    #[must_use]
    pub fn new(thresholds: Vec<f32>) -> Self {
        let fired = vec![false; thresholds.len()];
        Self { thresholds, fired }
    }

    /// Ratios tracked by the set.
    #[must_use]
    pub fn thresholds(&self) -> &[f32] {
        &self.thresholds
    }

    /// Reports whether the threshold at `index` has fired.
    #[must_use]
    pub fn is_fired(&self, index: usize) -> bool {
        self.fired.get(index).copied().unwrap_or(false)
    }

    /// Number of thresholds that have fired.
    #[must_use]
    pub fn fired_count(&self) -> usize {
        self.fired.iter().filter(|fired| **fired).count()
    }

    /// Fires every pending threshold at or below `ratio`, returning how many fired.
    pub fn fire_up_to(&mut self, ratio: f32) -> u32 {
        let mut newly_fired = 0;
        for (threshold, fired) in self.thresholds.iter().zip(self.fired.iter_mut()) {
            if *fired || *threshold > ratio {
                continue;
            }
            *fired = true;
            newly_fired += 1;
        }
        newly_fired
    }
}

/// Requests that fired but have not been satisfied yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PendingRequests {
    /// Spawn origins still to be registered.
    pub origins: u32,
    /// Waves still to be launched.
    pub waves: u32,
}

/// Pure system that converts progress notifications into spawn requests.
#[derive(Clone, Debug)]
pub struct ThresholdScheduler {
    origin_thresholds: ThresholdSet,
    wave_thresholds: ThresholdSet,
    pending: PendingRequests,
}

impl ThresholdScheduler {
    /// Creates a scheduler using the provided threshold lists.
    #[must_use]
    pub fn new(config: &ThresholdConfig) -> Self {
        Self {
            origin_thresholds: ThresholdSet::new(config.origins.clone()),
            wave_thresholds: ThresholdSet::new(config.waves.clone()),
            pending: PendingRequests::default(),
        }
    }

    /// Consumes world events, handling every counted disclosure in order.
    pub fn handle<R>(&mut self, events: &[Event], requests: &mut R)
    where
        R: SpawnRequests + ?Sized,
    {
        for event in events {
            if let Event::CellDisclosed { progress, .. } = event {
                self.on_progress(*progress, requests);
            }
        }
    }

    /// Processes a single progress observation.
    pub fn on_progress<R>(&mut self, progress: f32, requests: &mut R)
    where
        R: SpawnRequests + ?Sized,
    {
        let origins = self.origin_thresholds.fire_up_to(progress);
        if origins > 0 {
            tracing::info!(progress, fired = origins, "spawn origin thresholds reached");
            self.pending.origins = self.pending.origins.saturating_add(origins);
        }

        let waves = self.wave_thresholds.fire_up_to(progress);
        if waves > 0 {
            tracing::info!(progress, fired = waves, "wave thresholds reached");
            self.pending.waves = self.pending.waves.saturating_add(waves);
        }

        while self.pending.origins > 0 {
            if !requests.try_spawn_origin() {
                tracing::debug!(pending = self.pending.origins, "spawn origin request deferred");
                break;
            }
            self.pending.origins -= 1;
        }

        while self.pending.waves > 0 {
            if !requests.try_spawn_wave() {
                tracing::debug!(pending = self.pending.waves, "wave request deferred");
                break;
            }
            self.pending.waves -= 1;
        }
    }

    /// Requests waiting for their preconditions.
    #[must_use]
    pub fn pending(&self) -> PendingRequests {
        self.pending
    }

    /// Thresholds that request spawn origins.
    #[must_use]
    pub fn origin_thresholds(&self) -> &ThresholdSet {
        &self.origin_thresholds
    }

    /// Thresholds that request waves.
    #[must_use]
    pub fn wave_thresholds(&self) -> &ThresholdSet {
        &self.wave_thresholds
    }
}
