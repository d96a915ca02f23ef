use tracing::debug;
use uuid::Uuid;

use crate::task::Task;

/// Text of a confirm/cancel prompt. Visibility is owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: String,
    pub message: String,
    pub confirm_label: Option<String>,
    pub cancel_label: Option<String>,
}

impl ConfirmPrompt {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            confirm_label: None,
            cancel_label: None,
        }
    }

    pub fn with_confirm_label(mut self, label: impl Into<String>) -> Self {
        self.confirm_label = Some(label.into());
        self
    }

    pub fn with_cancel_label(mut self, label: impl Into<String>) -> Self {
        self.cancel_label = Some(label.into());
        self
    }

    pub fn confirm_label(&self) -> &str {
        self.confirm_label.as_deref().unwrap_or("Confirm")
    }

    pub fn cancel_label(&self) -> &str {
        self.cancel_label.as_deref().unwrap_or("Cancel")
    }

    pub fn delete_task(task: &Task) -> Self {
        Self::new(
            "Delete Task",
            format!(
                "Are you sure you want to delete \"{}\"? This action cannot be undone.",
                task.title
            ),
        )
        .with_confirm_label("Delete")
    }
}

/// Everything a user can click on an open prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTrigger {
    ConfirmButton,
    CancelButton,
    Backdrop,
    DismissControl,
}

impl PromptTrigger {
    pub fn confirms(self) -> bool {
        matches!(self, PromptTrigger::ConfirmButton)
    }
}

/// Holds the task awaiting delete confirmation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteGate {
    confirm_required: bool,
    pending: Option<Uuid>,
}

impl DeleteGate {
    pub fn new(confirm_required: bool) -> Self {
        Self {
            confirm_required,
            pending: None,
        }
    }

    pub fn pending(&self) -> Option<Uuid> {
        self.pending
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns the id to delete right away, or parks it behind the prompt.
    pub fn request(&mut self, id: Uuid) -> Option<Uuid> {
        if self.confirm_required {
            debug!(%id, "delete awaiting confirmation");
            self.pending = Some(id);
            None
        } else {
            Some(id)
        }
    }

    /// Closes the prompt; yields the id only when the user confirmed.
    pub fn resolve(&mut self, trigger: PromptTrigger) -> Option<Uuid> {
        let pending = self.pending.take();
        if trigger.confirms() { pending } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_fall_back_to_defaults() {
        let prompt = ConfirmPrompt::new("Sign out", "Leave now?");
        assert_eq!(prompt.confirm_label(), "Confirm");
        assert_eq!(prompt.cancel_label(), "Cancel");

        let prompt = prompt.with_confirm_label("Leave").with_cancel_label("Stay");
        assert_eq!(prompt.confirm_label(), "Leave");
        assert_eq!(prompt.cancel_label(), "Stay");
    }

    #[test]
    fn backdrop_and_dismiss_act_as_cancel() {
        for trigger in [
            PromptTrigger::CancelButton,
            PromptTrigger::Backdrop,
            PromptTrigger::DismissControl,
        ] {
            let mut gate = DeleteGate::new(true);
            let id = Uuid::new_v4();
            assert_eq!(gate.request(id), None);
            assert!(gate.is_open());
            assert_eq!(gate.resolve(trigger), None);
            assert!(!gate.is_open());
        }
    }

    #[test]
    fn confirm_releases_pending_id() {
        let mut gate = DeleteGate::new(true);
        let id = Uuid::new_v4();
        gate.request(id);
        assert_eq!(gate.pending(), Some(id));
        assert_eq!(gate.resolve(PromptTrigger::ConfirmButton), Some(id));
        assert_eq!(gate.resolve(PromptTrigger::ConfirmButton), None);
    }

    #[test]
    fn disabled_gate_deletes_immediately() {
        let mut gate = DeleteGate::new(false);
        let id = Uuid::new_v4();
        assert_eq!(gate.request(id), Some(id));
        assert!(!gate.is_open());
    }
}
