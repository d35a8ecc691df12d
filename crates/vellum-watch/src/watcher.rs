//! Stat-polling watcher over a fixed set of paths.

use std::fs;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use indexmap::IndexMap;
use vellum_core::{ConfigError, WatchError};

use crate::config::WatchConfig;

/// Change observed on a watched path between two polls.
///
/// Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileEvent {
    /// The path did not exist and now does.
    Created = 0,
    /// The path existed and now does not.
    Erased = 1,
    /// The path exists and its modification time moved forward.
    Modified = 2,
}

/// Last-observed state of one path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileState {
    /// Whether the path existed.
    pub exists: bool,
    /// Modification time, if the path existed and the platform reports one.
    pub modified: Option<SystemTime>,
}

impl FileState {
    /// State of a path that does not exist.
    pub const ABSENT: FileState = FileState {
        exists: false,
        modified: None,
    };

    /// Stat `path` now.
    pub fn observe(path: &Path) -> Self {
        match fs::metadata(path) {
            Ok(meta) => Self {
                exists: true,
                modified: meta.modified().ok(),
            },
            Err(_) => Self::ABSENT,
        }
    }

    /// The event that takes `self` to `now`, if any.
    pub fn transition_to(&self, now: &FileState) -> Option<FileEvent> {
        match (self.exists, now.exists) {
            (false, true) => Some(FileEvent::Created),
            (true, false) => Some(FileEvent::Erased),
            (true, true) => match (self.modified, now.modified) {
                (Some(before), Some(after)) if after > before => Some(FileEvent::Modified),
                _ => None,
            },
            (false, false) => None,
        }
    }
}

/// One pending change, produced by [`FileWatcher::scan`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    /// The watched path, as registered.
    pub path: PathBuf,
    /// What happened.
    pub event: FileEvent,
    /// The state that [`FileWatcher::commit`] will record.
    pub observed: FileState,
}

/// Polls a set of paths for creation, deletion and modification.
///
/// Paths are reported in registration order. Polling is rate-limited: a
/// scan only runs once the configured interval has elapsed since the end
/// of the previous poll (or since construction).
///
/// Delivery is split into [`scan`](Self::scan), [`commit`](Self::commit)
/// and [`finish`](Self::finish) so a caller can release any lock around
/// the watcher while dispatching each event. [`poll`](Self::poll) runs the
/// whole cycle for callers that need no such split.
#[derive(Debug)]
pub struct FileWatcher {
    paths: IndexMap<PathBuf, FileState>,
    interval: Duration,
    last_poll: Instant,
}

impl FileWatcher {
    /// Create a watcher whose first poll is due one interval from now.
    pub fn new(config: WatchConfig) -> Result<Self, ConfigError> {
        Self::new_at(config, Instant::now())
    }

    /// Create a watcher as if constructed at `now`.
    pub fn new_at(config: WatchConfig, now: Instant) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            paths: IndexMap::new(),
            interval: config.interval(),
            last_poll: now,
        })
    }

    /// Current poll interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Replace the poll interval. Takes effect from the next poll.
    pub fn set_config(&mut self, config: WatchConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.interval = config.interval();
        Ok(())
    }

    /// Number of watched paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether no paths are watched.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Whether `path` is watched.
    pub fn is_watching(&self, path: &Path) -> bool {
        self.paths.contains_key(path)
    }

    /// Watched paths in registration order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.paths.keys().map(PathBuf::as_path)
    }

    /// Start watching `path`, snapshotting its current state.
    pub fn start(&mut self, path: impl Into<PathBuf>) -> Result<(), WatchError> {
        let path = path.into();
        if self.paths.contains_key(&path) {
            return Err(WatchError::AlreadyWatching { path });
        }
        let state = FileState::observe(&path);
        log::debug!("watching {} (exists: {})", path.display(), state.exists);
        self.paths.insert(path, state);
        Ok(())
    }

    /// Stop watching `path`. The order of the remaining paths is kept.
    pub fn stop(&mut self, path: &Path) -> Result<(), WatchError> {
        match self.paths.shift_remove(path) {
            Some(_) => {
                log::debug!("stopped watching {}", path.display());
                Ok(())
            }
            None => Err(WatchError::NotWatching {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Whether a poll at `now` would run.
    pub fn is_due(&self, now: Instant) -> bool {
        !self.paths.is_empty() && now.saturating_duration_since(self.last_poll) >= self.interval
    }

    /// Stat every watched path and report what changed, without recording
    /// anything.
    ///
    /// Returns `None` if nothing is watched or the poll is not yet due.
    pub fn scan(&self, now: Instant) -> Option<Vec<Transition>> {
        if !self.is_due(now) {
            log::trace!("watch poll skipped: not due");
            return None;
        }
        let transitions = self
            .paths
            .iter()
            .filter_map(|(path, before)| {
                let observed = FileState::observe(path);
                before.transition_to(&observed).map(|event| Transition {
                    path: path.clone(),
                    event,
                    observed,
                })
            })
            .collect();
        Some(transitions)
    }

    /// Record the state carried by a delivered transition.
    ///
    /// Ignored if the path was stopped after the scan.
    pub fn commit(&mut self, transition: &Transition) {
        if let Some(state) = self.paths.get_mut(&transition.path) {
            *state = transition.observed;
        }
    }

    /// Mark the end of a poll; the next one is due one interval later.
    ///
    /// Pass the instant dispatch finished, not the instant the scan ran.
    pub fn finish(&mut self, end: Instant) {
        self.last_poll = end;
    }

    /// Run one poll, delivering each transition to `handler`.
    ///
    /// `clock` is read once to decide whether the poll is due and again
    /// after dispatch; the next poll is due one interval after that second
    /// reading, so time spent in `handler` does not count toward it.
    ///
    /// Each transition is committed after the handler returns. If the
    /// handler breaks, the remaining transitions are neither delivered nor
    /// committed and will be reported again by the next poll. Returns the
    /// number of delivered transitions.
    pub fn poll_with_clock<C, F>(&mut self, mut clock: C, mut handler: F) -> usize
    where
        C: FnMut() -> Instant,
        F: FnMut(&Transition) -> ControlFlow<()>,
    {
        let Some(transitions) = self.scan(clock()) else {
            return 0;
        };
        let mut delivered = 0;
        for transition in &transitions {
            log::debug!("{:?} {}", transition.event, transition.path.display());
            let flow = handler(transition);
            self.commit(transition);
            delivered += 1;
            if flow.is_break() {
                break;
            }
        }
        self.finish(clock());
        delivered
    }

    /// [`poll_with_clock`](Self::poll_with_clock) against [`Instant::now`].
    pub fn poll<F>(&mut self, handler: F) -> usize
    where
        F: FnMut(&Transition) -> ControlFlow<()>,
    {
        self.poll_with_clock(Instant::now, handler)
    }
}

impl Default for FileWatcher {
    fn default() -> Self {
        Self {
            paths: IndexMap::new(),
            interval: WatchConfig::default().interval(),
            last_poll: Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: u64) -> FileState {
        FileState {
            exists: true,
            modified: Some(SystemTime::UNIX_EPOCH + Duration::from_millis(ms)),
        }
    }

    #[test]
    fn transition_table() {
        assert_eq!(FileState::ABSENT.transition_to(&at(1)), Some(FileEvent::Created));
        assert_eq!(at(1).transition_to(&FileState::ABSENT), Some(FileEvent::Erased));
        assert_eq!(at(1).transition_to(&at(2)), Some(FileEvent::Modified));
        assert_eq!(at(2).transition_to(&at(2)), None);
        assert_eq!(at(2).transition_to(&at(1)), None, "older mtime is not a change");
        assert_eq!(FileState::ABSENT.transition_to(&FileState::ABSENT), None);
    }

    #[test]
    fn event_codes_are_stable() {
        assert_eq!(FileEvent::Created as i32, 0);
        assert_eq!(FileEvent::Erased as i32, 1);
        assert_eq!(FileEvent::Modified as i32, 2);
    }

    #[test]
    fn start_twice_is_already_watching() {
        let mut w = FileWatcher::default();
        w.start("a.json").unwrap();
        assert_eq!(
            w.start("a.json"),
            Err(WatchError::AlreadyWatching {
                path: PathBuf::from("a.json")
            })
        );
    }

    #[test]
    fn stop_unknown_is_not_watching() {
        let mut w = FileWatcher::default();
        assert!(matches!(
            w.stop(Path::new("nope.json")),
            Err(WatchError::NotWatching { .. })
        ));
    }

    #[test]
    fn stop_keeps_registration_order() {
        let mut w = FileWatcher::default();
        for p in ["a", "b", "c"] {
            w.start(p).unwrap();
        }
        w.stop(Path::new("a")).unwrap();
        let order: Vec<_> = w.paths().collect();
        assert_eq!(order, vec![Path::new("b"), Path::new("c")]);
    }

    #[test]
    fn empty_watcher_never_due() {
        let t0 = Instant::now();
        let w = FileWatcher::new_at(WatchConfig::default(), t0).unwrap();
        assert!(!w.is_due(t0 + Duration::from_secs(10)));
        assert_eq!(w.scan(t0 + Duration::from_secs(10)), None);
    }

    #[test]
    fn first_poll_due_one_interval_after_construction() {
        let t0 = Instant::now();
        let mut w = FileWatcher::new_at(WatchConfig::with_interval_ms(500), t0).unwrap();
        w.start("x").unwrap();
        assert!(!w.is_due(t0 + Duration::from_millis(499)));
        assert!(w.is_due(t0 + Duration::from_millis(500)));
    }

    #[test]
    fn commit_after_stop_is_ignored() {
        let mut w = FileWatcher::default();
        w.start("gone").unwrap();
        w.stop(Path::new("gone")).unwrap();
        w.commit(&Transition {
            path: PathBuf::from("gone"),
            event: FileEvent::Created,
            observed: at(1),
        });
        assert!(w.is_empty());
    }

    #[test]
    fn set_config_validates() {
        let mut w = FileWatcher::default();
        assert!(w.set_config(WatchConfig::with_interval_ms(0)).is_err());
        w.set_config(WatchConfig::with_interval_ms(20)).unwrap();
        assert_eq!(w.interval(), Duration::from_millis(20));
    }
}
