//! Utilities for monitoring of *systems* in ECS.

use std::collections::VecDeque;
use std::time::Duration;

use slotmap::{new_key_type, SlotMap};

/// Count of the last updates used to compute average update time.
pub const SAMPLE_COUNT: usize = 60;

new_key_type! {
    /// Unique identifier of the monitored *system*.
    pub struct MonitorKey;
}

/// Statistics of the monitored *system*.
#[derive(Debug, Clone)]
pub struct SystemStats {
    name: &'static str,
    samples: VecDeque<Duration>,
    entities: usize,
    updates: u64,
}

impl SystemStats {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            samples: VecDeque::with_capacity(SAMPLE_COUNT),
            entities: 0,
            updates: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Duration of the last update, if any.
    pub fn last(&self) -> Option<Duration> {
        self.samples.back().copied()
    }

    /// Average duration of the last [`SAMPLE_COUNT`] updates.
    pub fn average(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.samples.iter().sum();
        total / self.samples.len() as u32
    }

    /// Count of entities matching the system when its last update started.
    pub fn entities(&self) -> usize {
        self.entities
    }

    /// Count of updates recorded so far.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    fn record(&mut self, elapsed: Duration, entities: usize) {
        if self.samples.len() == SAMPLE_COUNT {
            self.samples.pop_front();
        }
        self.samples.push_back(elapsed);
        self.entities = entities;
        self.updates += 1;
    }
}

/// Storage of statistics for all monitored systems.
#[derive(Debug, Clone, Default)]
pub struct SystemMonitor {
    stats: SlotMap<MonitorKey, SystemStats>,
}

impl SystemMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts monitoring of the system with given name.
    pub fn register(&mut self, name: &'static str) -> MonitorKey {
        self.stats.insert(SystemStats::new(name))
    }

    /// Stops monitoring of the system.
    pub fn unregister(&mut self, key: MonitorKey) -> Option<SystemStats> {
        self.stats.remove(key)
    }

    /// Records duration of one update of the system and count of entities it handled.
    ///
    /// Returns `false` if the system is not monitored.
    ///
    pub fn record(&mut self, key: MonitorKey, elapsed: Duration, entities: usize) -> bool {
        match self.stats.get_mut(key) {
            Some(stats) => {
                stats.record(elapsed, entities);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, key: MonitorKey) -> Option<&SystemStats> {
        self.stats.get(key)
    }

    /// Retrieves statistics of the first monitored system with given name.
    pub fn get_by_name(&self, name: &str) -> Option<&SystemStats> {
        self.stats.values().find(|stats| stats.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MonitorKey, &SystemStats)> {
        self.stats.iter()
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}
