use crate::handlers::*;
use crate::input::{Key, KeyPress};
use crate::project::{Project, ProjectId};
use crate::tracker::TimeTracker;
use crate::types::*;

/// Everything the UI needs: the tracker plus selection and dialog state.
pub struct AppState {
    pub tracker: TimeTracker,
    /// Selected project by id so that deletions never retarget the cursor.
    pub selected: Option<ProjectId>,
    pub mode: Mode,
    pub form: Option<FormState>,
    /// One-line feedback shown in the footer until the next key press.
    pub status: Option<String>,
}

impl AppState {
    pub fn new(tracker: TimeTracker) -> Self {
        let selected = tracker.get_index(0).map(|p| p.id);
        Self {
            tracker,
            selected,
            mode: Mode::View,
            form: None,
            status: None,
        }
    }

    /// Dispatch a key press to the handler of the current mode.
    /// Returns true if the app should quit.
    pub fn handle_key(&mut self, key: KeyPress) -> bool {
        if key.is_interrupt() {
            return true;
        }
        self.status = None;
        match self.mode {
            Mode::View => {
                if key.key == Key::Char('q') && !key.ctrl {
                    return true;
                }
                handle_view_key(self, &key);
            }
            Mode::ProjectForm => handle_form_key(self, &key),
            Mode::ConfirmDelete { .. } => handle_confirm_key(self, &key),
        }
        false
    }

    /// Advance the running timers' refresh schedule. Returns true when
    /// something on screen changed.
    pub fn tick(&mut self) -> bool {
        !self.tracker.tick().is_empty()
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.selected.and_then(|id| self.tracker.get(id))
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected.and_then(|id| self.tracker.position(id))
    }

    /// Points the selection at the project now occupying `index`, or the last
    /// one when the list got shorter.
    pub fn select_near(&mut self, index: usize) {
        let last = self.tracker.len().checked_sub(1);
        self.selected = last
            .map(|last| index.min(last))
            .and_then(|i| self.tracker.get_index(i))
            .map(|p| p.id);
    }
}
