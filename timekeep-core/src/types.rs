use tui_textarea::{CursorMove, TextArea};

use crate::input::{Key, KeyPress};
use crate::project::{Project, ProjectId};
use crate::utils::format_goal_hours;

// ── Single-line fields ───────────────────────────────────────────────────

pub fn text_field(value: &str) -> TextArea<'static> {
    let mut textarea = TextArea::from([value.to_string()]);
    textarea.move_cursor(CursorMove::End);
    textarea
}

pub fn text_field_value(textarea: &TextArea<'_>) -> String {
    textarea.lines().join("")
}

/// Feeds an editing key to the field. Returns true if the key was consumed.
pub fn edit_text_field(textarea: &mut TextArea<'static>, key: &KeyPress) -> bool {
    let Some(input) = key.to_field_input() else {
        return false;
    };
    // cursor movement reports "no change" but still belongs to the field
    let moves_cursor = matches!(key.key, Key::Left | Key::Right | Key::Home | Key::End);
    textarea.input(input) || moves_cursor
}

// ── Modes ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    View,
    ProjectForm,
    ConfirmDelete { id: ProjectId, prompt: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormTarget {
    Create,
    Edit(ProjectId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Name,
    Notes,
    Goal,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Name => FormField::Notes,
            FormField::Notes => FormField::Goal,
            FormField::Goal => FormField::Name,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FormField::Name => FormField::Goal,
            FormField::Notes => FormField::Name,
            FormField::Goal => FormField::Notes,
        }
    }
}

/// Create/edit dialog. Bound to a project id, never to a list position.
#[derive(Debug)]
pub struct FormState {
    pub target: FormTarget,
    pub current_field: FormField,
    pub name: TextArea<'static>,
    pub notes: TextArea<'static>,
    pub goal_hours: TextArea<'static>,
}

impl FormState {
    pub fn create() -> Self {
        Self {
            target: FormTarget::Create,
            current_field: FormField::Name,
            name: TextArea::default(),
            notes: TextArea::default(),
            goal_hours: TextArea::default(),
        }
    }

    pub fn edit(project: &Project) -> Self {
        Self {
            target: FormTarget::Edit(project.id),
            current_field: FormField::Name,
            name: text_field(&project.name),
            notes: text_field(&project.notes),
            goal_hours: text_field(&format_goal_hours(project.goal_time)),
        }
    }

    pub fn title(&self) -> &'static str {
        match self.target {
            FormTarget::Create => "New project",
            FormTarget::Edit(_) => "Edit project",
        }
    }

    pub fn field_mut(&mut self, field: FormField) -> &mut TextArea<'static> {
        match field {
            FormField::Name => &mut self.name,
            FormField::Notes => &mut self.notes,
            FormField::Goal => &mut self.goal_hours,
        }
    }

    pub fn field(&self, field: FormField) -> &TextArea<'static> {
        match field {
            FormField::Name => &self.name,
            FormField::Notes => &self.notes,
            FormField::Goal => &self.goal_hours,
        }
    }
}
