use std::collections::HashSet;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::{Result, TrackerError};
use crate::project::{Project, ProjectId};
use crate::store::ProjectStore;
use crate::utils::hours_to_millis;

pub const DEFAULT_TICK_MS: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Stopped,
    Running,
}

/// What happens to a timer that was still running when the process exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResumePolicy {
    /// Restart the interval at load time; the time the app was closed is not counted.
    #[default]
    Restart,
    /// Count the time since the persisted `last_start` before restarting.
    CountGap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerOptions {
    pub tick_interval_ms: i64,
    pub resume: ResumePolicy,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_MS,
            resume: ResumePolicy::default(),
        }
    }
}

/// Display refresh schedule of one running project. Firing never touches
/// the project record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticker {
    interval_ms: i64,
    next_due: i64,
}

impl Ticker {
    fn start(now: i64, interval_ms: i64) -> Self {
        let interval_ms = interval_ms.max(1);
        Self {
            interval_ms,
            next_due: now + interval_ms,
        }
    }

    /// Fires at most once per call, skipping deadlines missed while the
    /// caller was busy.
    fn fire(&mut self, now: i64) -> bool {
        if now < self.next_due {
            return false;
        }
        let missed = (now - self.next_due) / self.interval_ms + 1;
        self.next_due += missed * self.interval_ms;
        true
    }
}

/// A project together with its refresh ticker. Removing the entry removes
/// the ticker with it.
#[derive(Debug)]
struct Entry {
    project: Project,
    ticker: Option<Ticker>,
}

impl Entry {
    fn idle(project: Project) -> Self {
        Self {
            project,
            ticker: None,
        }
    }

    fn start(&mut self, now: i64, interval_ms: i64) {
        self.project.is_running = true;
        self.project.last_start = Some(now);
        self.ticker = Some(Ticker::start(now, interval_ms));
    }

    /// Folds the running interval into `elapsed_time`, exactly once.
    fn stop(&mut self, now: i64) {
        if let Some(start) = self.project.last_start.take() {
            let slice = now.saturating_sub(start).max(0) as u64;
            self.project.elapsed_time = self.project.elapsed_time.saturating_add(slice);
        }
        self.project.is_running = false;
        self.ticker = None;
    }
}

/// Owns the project list and its elapsed-time accounting. Every mutation is
/// written through to the store.
pub struct TimeTracker {
    entries: Vec<Entry>,
    store: Box<dyn ProjectStore>,
    clock: Box<dyn Clock>,
    options: TrackerOptions,
    last_persist_error: Option<String>,
}

impl TimeTracker {
    /// Loads the saved projects and resumes the timers that were running
    /// when the previous process exited.
    pub fn load(
        store: Box<dyn ProjectStore>,
        clock: Box<dyn Clock>,
        options: TrackerOptions,
    ) -> Self {
        let projects = match store.load() {
            Ok(projects) => projects,
            Err(err) => {
                warn!(error = %err, "could not load projects, starting empty");
                Vec::new()
            }
        };
        let mut tracker = Self {
            entries: projects.into_iter().map(Entry::idle).collect(),
            store,
            clock,
            options,
            last_persist_error: None,
        };
        let renumbered = tracker.renumber_duplicate_ids();
        let resumed = tracker.restore_on_load();
        if renumbered || resumed {
            tracker.persist();
        }
        info!(projects = tracker.entries.len(), "loaded projects");
        tracker
    }

    fn renumber_duplicate_ids(&mut self) -> bool {
        let mut seen = HashSet::new();
        let mut next = self.entries.iter().map(|e| e.project.id).max().unwrap_or(0);
        let mut changed = false;
        for entry in &mut self.entries {
            if !seen.insert(entry.project.id) {
                next += 1;
                warn!(old = entry.project.id, new = next, "renumbered duplicate project id");
                entry.project.id = next;
                seen.insert(next);
                changed = true;
            }
        }
        changed
    }

    fn restore_on_load(&mut self) -> bool {
        let now = self.clock.now_ms();
        let mut changed = false;
        for entry in &mut self.entries {
            if entry.project.is_running {
                if let (ResumePolicy::CountGap, Some(start)) =
                    (self.options.resume, entry.project.last_start)
                {
                    let gap = now.saturating_sub(start).max(0) as u64;
                    entry.project.elapsed_time = entry.project.elapsed_time.saturating_add(gap);
                }
                entry.start(now, self.options.tick_interval_ms);
                info!(id = entry.project.id, name = %entry.project.name, "resumed running timer");
                changed = true;
            } else if entry.project.last_start.is_some() {
                entry.project.last_start = None;
                changed = true;
            }
        }
        changed
    }

    // ── Operations ───────────────────────────────────────────────────────

    pub fn create(&mut self, name: &str, notes: &str, goal_hours: f64) -> Result<ProjectId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TrackerError::EmptyName);
        }
        let id = self.next_id();
        let project = Project::new(
            id,
            name.to_string(),
            notes.trim().to_string(),
            hours_to_millis(goal_hours),
        );
        info!(id, name, goal_ms = project.goal_time, "created project");
        self.entries.push(Entry::idle(project));
        self.persist();
        Ok(id)
    }

    fn next_id(&self) -> ProjectId {
        let now = self.clock.now_ms();
        match self.entries.iter().map(|e| e.project.id).max() {
            Some(max) if max >= now => max + 1,
            _ => now,
        }
    }

    pub fn toggle_timer(&mut self, id: ProjectId) -> Result<TimerState> {
        let now = self.clock.now_ms();
        let interval = self.options.tick_interval_ms;
        let entry = self.entry_mut(id)?;
        let state = if entry.project.is_running {
            entry.stop(now);
            debug!(id, elapsed_ms = entry.project.elapsed_time, "timer stopped");
            TimerState::Stopped
        } else {
            entry.start(now, interval);
            debug!(id, "timer started");
            TimerState::Running
        };
        self.persist();
        Ok(state)
    }

    pub fn add_count(&mut self, id: ProjectId) -> Result<u64> {
        let entry = self.entry_mut(id)?;
        entry.project.count = entry.project.count.saturating_add(1);
        let count = entry.project.count;
        debug!(id, count, "count incremented");
        self.persist();
        Ok(count)
    }

    /// Edits name, notes and goal. Accounting fields are left alone.
    pub fn update(&mut self, id: ProjectId, name: &str, notes: &str, goal_hours: f64) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TrackerError::EmptyName);
        }
        let entry = self.entry_mut(id)?;
        entry.project.name = name.to_string();
        entry.project.notes = notes.trim().to_string();
        entry.project.goal_time = hours_to_millis(goal_hours);
        debug!(id, "project updated");
        self.persist();
        Ok(())
    }

    pub fn delete_prompt(&self, id: ProjectId) -> Result<String> {
        let project = self.get(id).ok_or(TrackerError::UnknownProject(id))?;
        Ok(format!(
            "Delete project \"{}\"? This cannot be undone.",
            project.name
        ))
    }

    /// Removes the project once `confirm` accepts the prompt. Returns whether
    /// anything was deleted. A running timer is discarded without folding.
    pub fn delete<F>(&mut self, id: ProjectId, confirm: F) -> Result<bool>
    where
        F: FnOnce(&str) -> bool,
    {
        let prompt = self.delete_prompt(id)?;
        if !confirm(&prompt) {
            debug!(id, "delete declined");
            return Ok(false);
        }
        let pos = self.position(id).ok_or(TrackerError::UnknownProject(id))?;
        let removed = self.entries.remove(pos);
        info!(
            id,
            name = %removed.project.name,
            was_running = removed.project.is_running,
            "deleted project"
        );
        self.persist();
        Ok(true)
    }

    /// Folds the running interval of every running project into
    /// `elapsed_time` and restarts it at `now`, keeping the timers running.
    /// Saves once if anything was running. Returns how many were folded.
    ///
    /// Called before exit and periodically, so a later `Restart` resume
    /// only drops the time since the last checkpoint.
    pub fn checkpoint(&mut self) -> usize {
        let now = self.clock.now_ms();
        let mut folded = 0;
        for entry in self.entries.iter_mut().filter(|e| e.project.is_running) {
            if let Some(start) = entry.project.last_start.replace(now) {
                let slice = now.saturating_sub(start).max(0) as u64;
                entry.project.elapsed_time = entry.project.elapsed_time.saturating_add(slice);
            }
            folded += 1;
        }
        if folded > 0 {
            debug!(running = folded, "checkpointed running timers");
            self.persist();
        }
        folded
    }

    /// Ids whose live display is due for a refresh. Nothing is mutated or saved.
    pub fn tick(&mut self) -> Vec<ProjectId> {
        let now = self.clock.now_ms();
        self.entries
            .iter_mut()
            .filter_map(|entry| {
                let ticker = entry.ticker.as_mut()?;
                ticker.fire(now).then_some(entry.project.id)
            })
            .collect()
    }

    /// Time until the next refresh is due, `None` when nothing runs.
    pub fn next_tick_in(&self) -> Option<Duration> {
        let now = self.clock.now_ms();
        self.entries
            .iter()
            .filter_map(|entry| entry.ticker.map(|t| t.next_due))
            .min()
            .map(|due| Duration::from_millis(due.saturating_sub(now).max(0) as u64))
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.entries.iter().map(|e| &e.project)
    }

    pub fn snapshot(&self) -> Vec<Project> {
        self.projects().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: ProjectId) -> Option<&Project> {
        self.projects().find(|p| p.id == id)
    }

    pub fn get_index(&self, index: usize) -> Option<&Project> {
        self.entries.get(index).map(|e| &e.project)
    }

    pub fn position(&self, id: ProjectId) -> Option<usize> {
        self.entries.iter().position(|e| e.project.id == id)
    }

    pub fn live_elapsed(&self, id: ProjectId) -> Result<u64> {
        let project = self.get(id).ok_or(TrackerError::UnknownProject(id))?;
        Ok(project.live_elapsed(self.clock.now_ms()))
    }

    pub fn is_ticking(&self, id: ProjectId) -> bool {
        self.entries
            .iter()
            .any(|e| e.project.id == id && e.ticker.is_some())
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Message of the last failed save, cleared by the next successful one.
    pub fn last_persist_error(&self) -> Option<&str> {
        self.last_persist_error.as_deref()
    }

    fn entry_mut(&mut self, id: ProjectId) -> Result<&mut Entry> {
        self.entries
            .iter_mut()
            .find(|e| e.project.id == id)
            .ok_or(TrackerError::UnknownProject(id))
    }

    fn persist(&mut self) {
        match self.store.save(&self.snapshot()) {
            Ok(()) => self.last_persist_error = None,
            Err(err) => {
                warn!(error = %err, "failed to save projects, keeping in-memory state");
                self.last_persist_error = Some(err.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::StoreError;
    use crate::store::MemoryStore;

    const T0: i64 = 1_700_000_000_000;

    fn tracker_with(store: MemoryStore, options: TrackerOptions) -> (TimeTracker, ManualClock) {
        let clock = ManualClock::new(T0);
        let tracker = TimeTracker::load(Box::new(store), Box::new(clock.clone()), options);
        (tracker, clock)
    }

    fn new_tracker() -> (TimeTracker, ManualClock, MemoryStore) {
        let store = MemoryStore::new();
        let (tracker, clock) = tracker_with(store.clone(), TrackerOptions::default());
        (tracker, clock, store)
    }

    fn running(id: ProjectId, elapsed: u64, last_start: i64) -> Project {
        let mut project = Project::new(id, format!("p{id}"), String::new(), 0);
        project.elapsed_time = elapsed;
        project.is_running = true;
        project.last_start = Some(last_start);
        project
    }

    #[test]
    fn create_converts_goal_hours_and_persists() {
        let (mut tracker, _clock, store) = new_tracker();
        let id = tracker.create("Read", "", 2.0).unwrap();

        let project = tracker.get(id).unwrap();
        assert_eq!(project.id, T0);
        assert_eq!(project.goal_time, 7_200_000);
        assert_eq!(project.elapsed_time, 0);
        assert_eq!(project.count, 0);
        assert!(!project.is_running);
        assert_eq!(project.last_start, None);
        assert_eq!(store.snapshot().unwrap(), tracker.snapshot());
    }

    #[test]
    fn create_with_blank_name_changes_nothing() {
        let (mut tracker, _clock, store) = new_tracker();
        assert_eq!(tracker.create("   ", "notes", 1.0), Err(TrackerError::EmptyName));
        assert!(tracker.is_empty());
        assert_eq!(store.successful_saves(), 0);
    }

    #[test]
    fn create_trims_and_keeps_creation_order() {
        let (mut tracker, clock, _store) = new_tracker();
        tracker.create("  Guitar ", " scales ", 0.0).unwrap();
        clock.advance(10);
        tracker.create("Run", "", -3.0).unwrap();

        let names: Vec<_> = tracker.projects().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Guitar", "Run"]);
        assert_eq!(tracker.get_index(0).unwrap().notes, "scales");
        assert_eq!(tracker.get_index(1).unwrap().goal_time, 0);
    }

    #[test]
    fn ids_stay_unique_within_one_millisecond() {
        let (mut tracker, _clock, _store) = new_tracker();
        let a = tracker.create("a", "", 0.0).unwrap();
        let b = tracker.create("b", "", 0.0).unwrap();
        let c = tracker.create("c", "", 0.0).unwrap();
        assert_eq!([a, b, c], [T0, T0 + 1, T0 + 2]);
    }

    #[test]
    fn immediate_stop_leaves_elapsed_unchanged() {
        let (mut tracker, _clock, _store) = new_tracker();
        let id = tracker.create("Read", "", 0.0).unwrap();

        assert_eq!(tracker.toggle_timer(id).unwrap(), TimerState::Running);
        assert_eq!(tracker.toggle_timer(id).unwrap(), TimerState::Stopped);

        let project = tracker.get(id).unwrap();
        assert_eq!(project.elapsed_time, 0);
        assert!(!project.is_running);
        assert_eq!(project.last_start, None);
        assert!(!tracker.is_ticking(id));
    }

    #[test]
    fn start_stop_accumulates_each_interval_once() {
        let (mut tracker, clock, store) = new_tracker();
        let id = tracker.create("Read", "", 0.0).unwrap();

        tracker.toggle_timer(id).unwrap();
        clock.advance(1_500);
        assert_eq!(tracker.live_elapsed(id).unwrap(), 1_500);
        assert_eq!(tracker.get(id).unwrap().elapsed_time, 0);
        tracker.toggle_timer(id).unwrap();
        assert_eq!(tracker.get(id).unwrap().elapsed_time, 1_500);

        clock.advance(60_000);
        tracker.toggle_timer(id).unwrap();
        clock.advance(2_500);
        tracker.toggle_timer(id).unwrap();

        assert_eq!(tracker.get(id).unwrap().elapsed_time, 4_000);
        assert_eq!(tracker.live_elapsed(id).unwrap(), 4_000);
        assert_eq!(store.snapshot().unwrap()[0].elapsed_time, 4_000);
    }

    #[test]
    fn clock_going_backwards_never_reduces_elapsed() {
        let (mut tracker, clock, _store) = new_tracker();
        let id = tracker.create("Read", "", 0.0).unwrap();
        tracker.toggle_timer(id).unwrap();
        clock.advance(-5_000);
        tracker.toggle_timer(id).unwrap();
        assert_eq!(tracker.get(id).unwrap().elapsed_time, 0);
    }

    #[test]
    fn ticks_refresh_display_without_mutating_or_saving() {
        let (mut tracker, clock, store) = new_tracker();
        let id = tracker.create("Read", "", 0.0).unwrap();
        let idle = tracker.create("Idle", "", 0.0).unwrap();
        tracker.toggle_timer(id).unwrap();
        let saves = store.successful_saves();

        assert_eq!(tracker.next_tick_in(), Some(Duration::from_millis(100)));
        clock.advance(50);
        assert!(tracker.tick().is_empty());
        clock.advance(50);
        assert_eq!(tracker.tick(), vec![id]);
        assert!(tracker.tick().is_empty());

        clock.advance(350);
        assert_eq!(tracker.tick(), vec![id]);
        assert_eq!(tracker.next_tick_in(), Some(Duration::from_millis(50)));

        assert_eq!(tracker.get(id).unwrap().elapsed_time, 0);
        assert!(!tracker.is_ticking(idle));
        assert_eq!(store.successful_saves(), saves);
    }

    #[test]
    fn no_tick_after_stop() {
        let (mut tracker, clock, _store) = new_tracker();
        let id = tracker.create("Read", "", 0.0).unwrap();
        tracker.toggle_timer(id).unwrap();
        clock.advance(90);
        tracker.toggle_timer(id).unwrap();
        clock.advance(1_000);
        assert!(tracker.tick().is_empty());
        assert_eq!(tracker.next_tick_in(), None);
    }

    #[test]
    fn add_count_increments_by_one() {
        let (mut tracker, _clock, store) = new_tracker();
        let id = tracker.create("Pushups", "", 0.0).unwrap();
        for expected in 1..=5 {
            assert_eq!(tracker.add_count(id).unwrap(), expected);
        }
        assert_eq!(store.snapshot().unwrap()[0].count, 5);
    }

    #[test]
    fn update_keeps_accounting_fields() {
        let (mut tracker, clock, _store) = new_tracker();
        let id = tracker.create("Read", "", 2.0).unwrap();
        tracker.add_count(id).unwrap();
        tracker.toggle_timer(id).unwrap();
        clock.advance(3_000);
        tracker.toggle_timer(id).unwrap();
        tracker.toggle_timer(id).unwrap();
        let before = tracker.get(id).unwrap().clone();

        tracker.update(id, " Read more ", "chapter 3", 1.5).unwrap();

        let after = tracker.get(id).unwrap();
        assert_eq!(after.name, "Read more");
        assert_eq!(after.notes, "chapter 3");
        assert_eq!(after.goal_time, 5_400_000);
        assert_eq!(after.elapsed_time, before.elapsed_time);
        assert_eq!(after.count, before.count);
        assert_eq!(after.is_running, before.is_running);
        assert_eq!(after.last_start, before.last_start);
        assert!(tracker.is_ticking(id));
    }

    #[test]
    fn update_rejects_blank_name() {
        let (mut tracker, _clock, _store) = new_tracker();
        let id = tracker.create("Read", "", 0.0).unwrap();
        assert_eq!(tracker.update(id, "", "x", 1.0), Err(TrackerError::EmptyName));
        assert_eq!(tracker.get(id).unwrap().name, "Read");
    }

    #[test]
    fn declined_delete_changes_nothing() {
        let (mut tracker, _clock, store) = new_tracker();
        let id = tracker.create("Read", "", 0.0).unwrap();
        let saves = store.successful_saves();

        let mut asked = String::new();
        let deleted = tracker
            .delete(id, |prompt| {
                asked = prompt.to_string();
                false
            })
            .unwrap();

        assert!(!deleted);
        assert!(asked.contains("\"Read\""));
        assert_eq!(tracker.len(), 1);
        assert_eq!(store.successful_saves(), saves);
    }

    #[test]
    fn delete_removes_one_and_shifts_the_rest() {
        let (mut tracker, _clock, store) = new_tracker();
        let ids: Vec<_> = ["a", "b", "c", "d"]
            .iter()
            .map(|name| tracker.create(name, "", 0.0).unwrap())
            .collect();

        assert!(tracker.delete(ids[1], |_| true).unwrap());

        assert_eq!(tracker.len(), 3);
        assert_eq!(tracker.get(ids[1]), None);
        assert_eq!(tracker.position(ids[2]), Some(1));
        assert_eq!(tracker.position(ids[3]), Some(2));
        assert_eq!(store.snapshot().unwrap().len(), 3);
    }

    #[test]
    fn deleting_a_running_project_leaves_other_tickers_alone() {
        let (mut tracker, clock, _store) = new_tracker();
        let first = tracker.create("first", "", 0.0).unwrap();
        let second = tracker.create("second", "", 0.0).unwrap();
        tracker.toggle_timer(first).unwrap();
        tracker.toggle_timer(second).unwrap();

        tracker.delete(first, |_| true).unwrap();
        clock.advance(100);

        assert_eq!(tracker.tick(), vec![second]);
        assert!(tracker.is_ticking(second));
        assert_eq!(tracker.toggle_timer(first), Err(TrackerError::UnknownProject(first)));
    }

    #[test]
    fn unknown_ids_fail_without_mutation() {
        let (mut tracker, _clock, store) = new_tracker();
        tracker.create("Read", "", 0.0).unwrap();
        let saves = store.successful_saves();

        assert_eq!(tracker.add_count(42), Err(TrackerError::UnknownProject(42)));
        assert_eq!(tracker.update(42, "x", "", 0.0), Err(TrackerError::UnknownProject(42)));
        assert_eq!(tracker.delete(42, |_| true), Err(TrackerError::UnknownProject(42)));
        assert_eq!(tracker.live_elapsed(42), Err(TrackerError::UnknownProject(42)));
        assert_eq!(store.successful_saves(), saves);
    }

    #[test]
    fn restore_restarts_running_timers_at_load_time() {
        let store = MemoryStore::with_projects(vec![running(1, 5_000, T0 - 60_000)]);
        let (mut tracker, clock) = tracker_with(store.clone(), TrackerOptions::default());

        let project = tracker.get(1).unwrap();
        assert!(project.is_running);
        assert_eq!(project.last_start, Some(T0));
        assert_eq!(project.elapsed_time, 5_000);
        assert!(tracker.is_ticking(1));
        assert_eq!(store.snapshot().unwrap()[0].last_start, Some(T0));

        // a restored timer behaves like any other: display ticks, fold on stop
        clock.advance(100);
        assert_eq!(tracker.tick(), vec![1]);
        assert_eq!(tracker.get(1).unwrap().elapsed_time, 5_000);
        clock.advance(900);
        tracker.toggle_timer(1).unwrap();
        assert_eq!(tracker.get(1).unwrap().elapsed_time, 6_000);
    }

    #[test]
    fn restore_can_count_the_offline_gap() {
        let store = MemoryStore::with_projects(vec![running(1, 5_000, T0 - 60_000)]);
        let options = TrackerOptions {
            resume: ResumePolicy::CountGap,
            ..TrackerOptions::default()
        };
        let (tracker, _clock) = tracker_with(store, options);

        let project = tracker.get(1).unwrap();
        assert_eq!(project.elapsed_time, 65_000);
        assert_eq!(project.last_start, Some(T0));
    }

    #[test]
    fn restore_normalizes_inconsistent_records() {
        let mut stray = Project::new(1, "stray".into(), String::new(), 0);
        stray.last_start = Some(T0 - 10);
        let mut missing_start = Project::new(2, "missing".into(), String::new(), 0);
        missing_start.is_running = true;
        let store = MemoryStore::with_projects(vec![stray, missing_start]);

        let (tracker, _clock) = tracker_with(store, TrackerOptions::default());

        assert_eq!(tracker.get(1).unwrap().last_start, None);
        assert!(!tracker.is_ticking(1));
        assert_eq!(tracker.get(2).unwrap().last_start, Some(T0));
        assert!(tracker.is_ticking(2));
    }

    #[test]
    fn load_without_running_timers_does_not_save() {
        let store = MemoryStore::with_projects(vec![Project::new(1, "a".into(), String::new(), 0)]);
        let (_tracker, _clock) = tracker_with(store.clone(), TrackerOptions::default());
        assert_eq!(store.successful_saves(), 0);
    }

    #[test]
    fn duplicate_ids_are_renumbered_on_load() {
        let a = Project::new(7, "a".into(), String::new(), 0);
        let b = Project::new(7, "b".into(), String::new(), 0);
        let (tracker, _clock) =
            tracker_with(MemoryStore::with_projects(vec![a, b]), TrackerOptions::default());
        let ids: Vec<_> = tracker.projects().map(|p| p.id).collect();
        assert_eq!(ids, [7, 8]);
    }

    #[test]
    fn failed_saves_keep_memory_state_and_report() {
        let (mut tracker, _clock, store) = new_tracker();
        store.fail_saves(true);
        let id = tracker.create("Read", "", 0.0).unwrap();
        tracker.add_count(id).unwrap();

        assert_eq!(tracker.get(id).unwrap().count, 1);
        assert!(tracker.last_persist_error().is_some());
        assert_eq!(store.snapshot(), None);
        assert_eq!(store.save_attempts(), 2);
        assert_eq!(store.successful_saves(), 0);

        store.fail_saves(false);
        tracker.add_count(id).unwrap();
        assert_eq!(tracker.last_persist_error(), None);
        assert_eq!(store.snapshot().unwrap()[0].count, 2);
        assert_eq!(store.save_attempts(), 3);
        assert_eq!(store.successful_saves(), 1);
    }

    #[test]
    fn checkpoint_folds_running_time_and_keeps_running() {
        let (mut tracker, clock, store) = new_tracker();
        let running_id = tracker.create("Read", "", 0.0).unwrap();
        let idle = tracker.create("Idle", "", 0.0).unwrap();
        tracker.toggle_timer(running_id).unwrap();
        clock.set(T0 + 4_000);

        assert_eq!(tracker.checkpoint(), 1);

        let project = tracker.get(running_id).unwrap();
        assert_eq!(project.elapsed_time, 4_000);
        assert_eq!(project.last_start, Some(T0 + 4_000));
        assert!(project.is_running);
        assert!(tracker.is_ticking(running_id));
        assert_eq!(tracker.get(idle).unwrap().elapsed_time, 0);
        assert_eq!(store.snapshot().unwrap()[0].elapsed_time, 4_000);

        // the folded slice is not counted again at stop
        clock.set(T0 + 6_500);
        assert_eq!(tracker.live_elapsed(running_id).unwrap(), 6_500);
        tracker.toggle_timer(running_id).unwrap();
        assert_eq!(tracker.get(running_id).unwrap().elapsed_time, 6_500);
    }

    #[test]
    fn checkpoint_without_running_timers_does_not_save() {
        let (mut tracker, clock, store) = new_tracker();
        tracker.create("Read", "", 0.0).unwrap();
        let saves = store.save_attempts();
        clock.advance(1_000);
        assert_eq!(tracker.checkpoint(), 0);
        assert_eq!(store.save_attempts(), saves);
    }

    #[test]
    fn restarting_twice_keeps_checkpointed_time() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(T0);
        let open = |clock: &ManualClock| {
            TimeTracker::load(
                Box::new(store.clone()),
                Box::new(clock.clone()),
                TrackerOptions::default(),
            )
        };

        let mut tracker = open(&clock);
        let id = tracker.create("Read", "", 0.0).unwrap();
        tracker.toggle_timer(id).unwrap();
        drop(tracker);

        let mut tracker = open(&clock);
        for _ in 0..72_000 {
            clock.advance(100);
            tracker.tick();
        }
        tracker.checkpoint();
        drop(tracker);

        clock.advance(60_000);
        let tracker = open(&clock);
        let project = tracker.get(id).unwrap();
        assert_eq!(project.elapsed_time, 7_200_000);
        assert!(project.is_running);
    }

    struct BrokenStore;

    impl ProjectStore for BrokenStore {
        fn load(&self) -> std::result::Result<Vec<Project>, StoreError> {
            Err(StoreError::Unavailable("disk gone".into()))
        }

        fn save(&self, _projects: &[Project]) -> std::result::Result<(), StoreError> {
            Err(StoreError::Unavailable("disk gone".into()))
        }
    }

    #[test]
    fn unreadable_store_starts_empty() {
        let mut tracker = TimeTracker::load(
            Box::new(BrokenStore),
            Box::new(ManualClock::new(T0)),
            TrackerOptions::default(),
        );
        assert!(tracker.is_empty());
        let id = tracker.create("Read", "", 0.0).unwrap();
        assert_eq!(tracker.get(id).unwrap().name, "Read");
    }
}
