//! In-process [`TaskStore`] with the same scoping rules as the hosted
//! table. Used by tests and local development.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::store::{Session, TaskStore};
use crate::task::{CompletionPatch, NewTask, Task, TaskEdit};

#[derive(Debug, Default)]
struct Inner {
    rows: Vec<Task>,
    last_created: Option<DateTime<Utc>>,
    fail_next: Option<StoreError>,
    fail_on: Option<(&'static str, StoreError)>,
    operations: Vec<&'static str>,
}

impl Inner {
    fn record(&mut self, op: &'static str) -> StoreResult<()> {
        self.operations.push(op);
        if let Some(err) = self.fail_next.take() {
            return Err(err);
        }
        if self.fail_on.as_ref().is_some_and(|(target, _)| *target == op)
            && let Some((_, err)) = self.fail_on.take()
        {
            return Err(err);
        }
        Ok(())
    }

    fn row_mut(&mut self, session: &Session, id: Uuid) -> StoreResult<&mut Task> {
        self.rows
            .iter_mut()
            .find(|row| row.id == id && row.user_id == session.user_id)
            .ok_or(StoreError::NotFound(id))
    }

    /// Creation stamps strictly increase so ordering never depends on clock
    /// resolution.
    fn next_created_at(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_created {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created = Some(stamp);
        stamp
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next call fail with `err` before touching any row.
    pub fn fail_next(&self, err: StoreError) {
        self.inner.lock().fail_next = Some(err);
    }

    /// Makes the next call named `op` fail; other calls pass through.
    pub fn fail_next_on(&self, op: &'static str, err: StoreError) {
        self.inner.lock().fail_on = Some((op, err));
    }

    /// Names of the calls received so far, oldest first.
    pub fn operations(&self) -> Vec<&'static str> {
        self.inner.lock().operations.clone()
    }

    pub fn row_count(&self) -> usize {
        self.inner.lock().rows.len()
    }
}

impl TaskStore for MemoryStore {
    async fn list(&self, session: &Session) -> StoreResult<Vec<Task>> {
        let mut inner = self.inner.lock();
        inner.record("list")?;
        let mut tasks: Vec<Task> = inner
            .rows
            .iter()
            .filter(|row| row.user_id == session.user_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn insert(&self, session: &Session, task: &NewTask) -> StoreResult<Task> {
        let mut inner = self.inner.lock();
        inner.record("insert")?;
        let row = Task {
            id: Uuid::new_v4(),
            user_id: session.user_id,
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority,
            completed: false,
            completed_at: None,
            created_at: inner.next_created_at(),
        };
        debug!(id = %row.id, "memory store inserted row");
        inner.rows.push(row.clone());
        Ok(row)
    }

    async fn set_completed(
        &self,
        session: &Session,
        id: Uuid,
        patch: &CompletionPatch,
    ) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        inner.record("set_completed")?;
        let row = inner.row_mut(session, id)?;
        row.completed = patch.completed;
        if let Some(completed_at) = patch.completed_at {
            row.completed_at = completed_at;
        }
        Ok(())
    }

    async fn update(&self, session: &Session, id: Uuid, edit: &TaskEdit) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        inner.record("update")?;
        let row = inner.row_mut(session, id)?;
        row.title = edit.title.clone();
        row.description = edit.description.clone();
        row.priority = edit.priority;
        Ok(())
    }

    async fn delete(&self, session: &Session, id: Uuid) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        inner.record("delete")?;
        let before = inner.rows.len();
        inner
            .rows
            .retain(|row| !(row.id == id && row.user_id == session.user_id));
        if inner.rows.len() == before {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;

    fn session_for(user_id: Uuid) -> Session {
        Session {
            user_id,
            email: format!("{user_id}@example.com"),
            access_token: "token".to_string(),
            refresh_token: None,
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn lists_newest_first() {
        let store = MemoryStore::new();
        let me = session_for(Uuid::new_v4());
        for title in ["first", "second", "third"] {
            store
                .insert(&me, &NewTask::new(title, "", Priority::Medium).unwrap())
                .await
                .unwrap();
        }

        let titles: Vec<String> = store
            .list(&me)
            .await
            .unwrap()
            .into_iter()
            .map(|task| task.title)
            .collect();
        assert_eq!(titles, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn other_users_rows_are_invisible_and_untouchable() {
        let store = MemoryStore::new();
        let alice = session_for(Uuid::new_v4());
        let bob = session_for(Uuid::new_v4());

        let task = store
            .insert(&alice, &NewTask::new("private", "", Priority::Low).unwrap())
            .await
            .unwrap();

        assert!(store.list(&bob).await.unwrap().is_empty());
        assert_eq!(
            store.delete(&bob, task.id).await,
            Err(StoreError::NotFound(task.id))
        );
        let edit = TaskEdit::new("hijacked", "", Priority::High).unwrap();
        assert_eq!(
            store.update(&bob, task.id, &edit).await,
            Err(StoreError::NotFound(task.id))
        );
        assert_eq!(store.list(&alice).await.unwrap()[0].title, "private");
    }

    #[tokio::test]
    async fn injected_failure_applies_once() {
        let store = MemoryStore::new();
        let me = session_for(Uuid::new_v4());
        store.fail_next(StoreError::Transport("offline".to_string()));

        assert!(store.list(&me).await.is_err());
        assert!(store.list(&me).await.is_ok());
        assert_eq!(store.operations(), vec!["list", "list"]);
    }

    #[tokio::test]
    async fn targeted_failure_waits_for_its_call() {
        let store = MemoryStore::new();
        let me = session_for(Uuid::new_v4());
        store.fail_next_on("list", StoreError::Transport("list timed out".to_string()));

        store
            .insert(&me, &NewTask::new("kept", "", Priority::Low).unwrap())
            .await
            .unwrap();
        assert!(store.list(&me).await.is_err());
        assert_eq!(store.list(&me).await.unwrap().len(), 1);
    }
}
