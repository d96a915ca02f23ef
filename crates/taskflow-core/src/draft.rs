//! Local input state for the new-task form and the inline editor.

use tracing::debug;

use crate::task::{NewTask, Priority, Task, TaskEdit};

/// Draft behind the "Add New Task" form. Starts collapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFormDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    submitting: bool,
    visible: bool,
}

impl TaskFormDraft {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Inputs are locked while a submit is in flight.
    pub fn inputs_disabled(&self) -> bool {
        self.submitting
    }

    pub fn open(&mut self) {
        self.visible = true;
    }

    /// Collapses the form and throws the draft away.
    pub fn cancel(&mut self) {
        if self.submitting {
            return;
        }
        self.reset();
    }

    pub fn can_submit(&self) -> bool {
        !self.submitting && !self.title.trim().is_empty()
    }

    /// Payload for the create call, or `None` when the submit is a no-op.
    pub fn begin_submit(&mut self) -> Option<NewTask> {
        if !self.can_submit() {
            debug!(submitting = self.submitting, "task form submit ignored");
            return None;
        }
        let task = NewTask::new(self.title.clone(), self.description.clone(), self.priority).ok()?;
        self.submitting = true;
        Some(task)
    }

    /// Called once the create call settles, whatever its outcome.
    pub fn finish_submit(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Independent copy of a task's editable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    saving: bool,
}

impl EditDraft {
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority,
            saving: false,
        }
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn can_save(&self) -> bool {
        !self.saving && !self.title.trim().is_empty()
    }
}

/// Render state of one task row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ItemMode {
    #[default]
    Display,
    Edit(EditDraft),
}

impl ItemMode {
    pub fn is_editing(&self) -> bool {
        matches!(self, ItemMode::Edit(_))
    }

    pub fn begin_edit(&mut self, task: &Task) {
        *self = ItemMode::Edit(EditDraft::from_task(task));
    }

    pub fn draft(&self) -> Option<&EditDraft> {
        match self {
            ItemMode::Edit(draft) => Some(draft),
            ItemMode::Display => None,
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut EditDraft> {
        match self {
            ItemMode::Edit(draft) => Some(draft),
            ItemMode::Display => None,
        }
    }

    /// Discards the draft without touching the task.
    pub fn cancel(&mut self) {
        if self.draft().is_some_and(EditDraft::is_saving) {
            return;
        }
        *self = ItemMode::Display;
    }

    pub fn begin_save(&mut self) -> Option<TaskEdit> {
        let draft = self.draft_mut()?;
        if !draft.can_save() {
            return None;
        }
        let edit = TaskEdit::new(draft.title.clone(), draft.description.clone(), draft.priority).ok()?;
        draft.saving = true;
        Some(edit)
    }

    /// Back to display once the update settles.
    pub fn finish_save(&mut self) {
        *self = ItemMode::Display;
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn task() -> Task {
        Task {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Renew passport".to_string(),
            description: "bring photos".to_string(),
            priority: Priority::High,
            completed: false,
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn form_starts_collapsed_with_medium_priority() {
        let form = TaskFormDraft::default();
        assert!(!form.is_visible());
        assert_eq!(form.priority, Priority::Medium);
        assert!(!form.can_submit());
    }

    #[test]
    fn whitespace_title_submit_is_noop_and_form_stays_open() {
        let mut form = TaskFormDraft::default();
        form.open();
        form.title = "   ".to_string();

        assert!(form.begin_submit().is_none());
        assert!(form.is_visible());
        assert!(!form.is_submitting());
        assert_eq!(form.title, "   ");
    }

    #[test]
    fn submit_locks_inputs_then_resets() {
        let mut form = TaskFormDraft::default();
        form.open();
        form.title = "Book flights".to_string();
        form.description = "aisle seat".to_string();
        form.priority = Priority::High;

        let task = form.begin_submit().expect("payload");
        assert_eq!(task.title, "Book flights");
        assert_eq!(task.priority, Priority::High);
        assert!(form.inputs_disabled());
        assert!(form.begin_submit().is_none(), "double submit blocked");

        form.cancel();
        assert!(form.is_visible(), "cancel ignored while submitting");

        form.finish_submit();
        assert_eq!(form, TaskFormDraft::default());
    }

    #[test]
    fn cancel_clears_draft() {
        let mut form = TaskFormDraft::default();
        form.open();
        form.title = "half typed".to_string();
        form.priority = Priority::Low;
        form.cancel();
        assert_eq!(form, TaskFormDraft::default());
    }

    #[test]
    fn edit_draft_is_seeded_and_cancel_discards_it() {
        let task = task();
        let mut mode = ItemMode::default();
        mode.begin_edit(&task);

        let draft = mode.draft_mut().expect("editing");
        assert_eq!(draft.title, task.title);
        assert_eq!(draft.description, task.description);
        draft.title = "changed".to_string();

        mode.cancel();
        assert_eq!(mode, ItemMode::Display);
        assert_eq!(task.title, "Renew passport");
    }

    #[test]
    fn save_disabled_for_blank_title_and_while_saving() {
        let task = task();
        let mut mode = ItemMode::default();
        mode.begin_edit(&task);

        mode.draft_mut().expect("editing").title = "  ".to_string();
        assert!(!mode.draft().expect("editing").can_save());
        assert!(mode.begin_save().is_none());

        mode.draft_mut().expect("editing").title = "Renew passport soon".to_string();
        let edit = mode.begin_save().expect("edit payload");
        assert_eq!(edit.title, "Renew passport soon");
        assert!(!mode.draft().expect("editing").can_save());
        assert!(mode.begin_save().is_none());

        mode.finish_save();
        assert!(!mode.is_editing());
    }
}
