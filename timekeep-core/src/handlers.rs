use tracing::debug;

use crate::app::AppState;
use crate::error::TrackerError;
use crate::input::{Key, KeyPress};
use crate::project::ProjectId;
use crate::types::*;
use crate::utils::parse_goal_hours;

pub fn handle_view_key(state: &mut AppState, key: &KeyPress) {
    match key.key {
        Key::Up | Key::Char('k') => move_selection(state, -1),
        Key::Down | Key::Char('j') => move_selection(state, 1),
        Key::Char(' ') | Key::Char('s') => {
            if let Some(id) = state.selected {
                if let Err(err) = state.tracker.toggle_timer(id) {
                    report(state, err);
                }
            }
        }
        Key::Char('+') | Key::Char('c') => {
            if let Some(id) = state.selected {
                if let Err(err) = state.tracker.add_count(id) {
                    report(state, err);
                }
            }
        }
        Key::Char('n') | Key::Char('a') => {
            state.form = Some(FormState::create());
            state.mode = Mode::ProjectForm;
        }
        Key::Enter | Key::Char('e') => {
            if let Some(id) = state.selected {
                open_edit_form(state, id);
            }
        }
        Key::Char('d') | Key::Delete => {
            if let Some(id) = state.selected {
                request_delete(state, id);
            }
        }
        _ => {}
    }
}

pub fn move_selection(state: &mut AppState, delta: isize) {
    if state.tracker.is_empty() {
        state.selected = None;
        return;
    }
    let next = match state.selected_index() {
        Some(current) => current.saturating_add_signed(delta),
        None => 0,
    };
    state.select_near(next);
}

pub fn open_edit_form(state: &mut AppState, id: ProjectId) {
    match state.tracker.get(id) {
        Some(project) => {
            state.form = Some(FormState::edit(project));
            state.mode = Mode::ProjectForm;
        }
        None => report(state, TrackerError::UnknownProject(id)),
    }
}

pub fn request_delete(state: &mut AppState, id: ProjectId) {
    match state.tracker.delete_prompt(id) {
        Ok(prompt) => state.mode = Mode::ConfirmDelete { id, prompt },
        Err(err) => report(state, err),
    }
}

pub fn handle_form_key(state: &mut AppState, key: &KeyPress) {
    let Some(form) = state.form.as_mut() else {
        state.mode = Mode::View;
        return;
    };

    let field = form.current_field;
    if edit_text_field(form.field_mut(field), key) {
        return;
    }

    match key.key {
        Key::Esc => close_form(state),
        Key::Up | Key::BackTab => form.current_field = field.prev(),
        Key::Down | Key::Tab => form.current_field = field.next(),
        Key::Enter => submit_form(state),
        _ => {}
    }
}

fn submit_form(state: &mut AppState) {
    let Some(form) = state.form.as_mut() else {
        return;
    };
    let target = form.target;
    let name = text_field_value(&form.name);
    let notes = text_field_value(&form.notes);
    let goal_hours = parse_goal_hours(&text_field_value(&form.goal_hours));

    let result = match target {
        FormTarget::Create => state.tracker.create(&name, &notes, goal_hours).map(Some),
        FormTarget::Edit(id) => state
            .tracker
            .update(id, &name, &notes, goal_hours)
            .map(|()| None),
    };

    match result {
        Ok(created) => {
            if let Some(id) = created {
                state.selected = Some(id);
            }
            close_form(state);
        }
        Err(TrackerError::EmptyName) => {
            if let Some(form) = state.form.as_mut() {
                form.current_field = FormField::Name;
            }
            state.status = Some("A project needs a name".to_string());
        }
        Err(err) => {
            close_form(state);
            report(state, err);
        }
    }
}

fn close_form(state: &mut AppState) {
    state.form = None;
    state.mode = Mode::View;
}

pub fn handle_confirm_key(state: &mut AppState, key: &KeyPress) {
    let Mode::ConfirmDelete { id, .. } = state.mode else {
        return;
    };
    let accepted = match key.key {
        Key::Char('y') | Key::Char('Y') | Key::Enter => true,
        Key::Char('n') | Key::Char('N') | Key::Esc => false,
        _ => return,
    };
    state.mode = Mode::View;

    let position = state.tracker.position(id);
    match state.tracker.delete(id, |_| accepted) {
        Ok(true) => {
            if state.selected_project().is_none() {
                state.select_near(position.unwrap_or(0));
            }
        }
        Ok(false) => debug!(id, "delete cancelled"),
        Err(err) => report(state, err),
    }
}

fn report(state: &mut AppState, err: TrackerError) {
    debug!(error = %err, "action failed");
    state.status = Some(err.to_string());
}
