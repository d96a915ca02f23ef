use serde::Serialize;
use taskflow_core::task::CompletionPatch;
use taskflow_core::{NewTask, Priority, Session, StoreError, StoreResult, Task, TaskEdit, TaskStore};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::client::BackendClient;
use crate::query::TableQuery;

pub const TASKS_TABLE: &str = "tasks";

#[derive(Debug, Serialize)]
struct InsertRow<'a> {
    user_id: Uuid,
    title: &'a str,
    description: &'a str,
    priority: Priority,
    completed: bool,
}

pub fn list_query(user_id: Uuid) -> TableQuery {
    TableQuery::select(TASKS_TABLE, "*")
        .eq("user_id", user_id)
        .order("created_at", false)
}

fn row_scoped(query: TableQuery, user_id: Uuid, id: Uuid) -> TableQuery {
    query.eq("id", id).eq("user_id", user_id).returning()
}

pub fn update_query(user_id: Uuid, id: Uuid) -> TableQuery {
    row_scoped(TableQuery::update(TASKS_TABLE), user_id, id)
}

pub fn delete_query(user_id: Uuid, id: Uuid) -> TableQuery {
    row_scoped(TableQuery::delete(TASKS_TABLE), user_id, id)
}

/// A scoped write that matched nothing means the row is gone or belongs to
/// someone else.
fn expect_row(rows: Vec<Task>, id: Uuid) -> StoreResult<()> {
    if rows.is_empty() {
        return Err(StoreError::NotFound(id));
    }
    Ok(())
}

/// [`TaskStore`] over the backend's `tasks` table.
#[derive(Clone)]
pub struct RestTaskStore {
    client: BackendClient,
}

impl RestTaskStore {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

impl TaskStore for RestTaskStore {
    #[instrument(skip(self, session), fields(user_id = %session.user_id))]
    async fn list(&self, session: &Session) -> StoreResult<Vec<Task>> {
        let query = list_query(session.user_id);
        let tasks: Vec<Task> = self
            .client
            .execute::<_, ()>(&query, &session.access_token, None)
            .await?;
        debug!(total = tasks.len(), "listed tasks");
        Ok(tasks)
    }

    #[instrument(skip(self, session, task), fields(user_id = %session.user_id))]
    async fn insert(&self, session: &Session, task: &NewTask) -> StoreResult<Task> {
        let row = InsertRow {
            user_id: session.user_id,
            title: &task.title,
            description: &task.description,
            priority: task.priority,
            completed: false,
        };
        let query = TableQuery::insert(TASKS_TABLE).returning();
        let rows: Vec<Task> = self
            .client
            .execute(&query, &session.access_token, Some(&row))
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no rows".to_string()))
    }

    #[instrument(skip(self, session, patch), fields(user_id = %session.user_id, completed = patch.completed))]
    async fn set_completed(
        &self,
        session: &Session,
        id: Uuid,
        patch: &CompletionPatch,
    ) -> StoreResult<()> {
        let rows = self
            .client
            .execute(&update_query(session.user_id, id), &session.access_token, Some(patch))
            .await?;
        expect_row(rows, id)
    }

    #[instrument(skip(self, session, edit), fields(user_id = %session.user_id))]
    async fn update(&self, session: &Session, id: Uuid, edit: &TaskEdit) -> StoreResult<()> {
        let rows = self
            .client
            .execute(&update_query(session.user_id, id), &session.access_token, Some(edit))
            .await?;
        expect_row(rows, id)
    }

    #[instrument(skip(self, session), fields(user_id = %session.user_id))]
    async fn delete(&self, session: &Session, id: Uuid) -> StoreResult<()> {
        let rows = self
            .client
            .execute::<_, ()>(&delete_query(session.user_id, id), &session.access_token, None)
            .await?;
        expect_row(rows, id)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn list_is_scoped_and_newest_first() {
        let user = Uuid::parse_str("b5e0c2a4-4f4e-4a53-9d0b-6c1b0e0c6a11").unwrap();
        assert_eq!(
            list_query(user).params(),
            vec![
                ("select".to_string(), "*".to_string()),
                (
                    "user_id".to_string(),
                    "eq.b5e0c2a4-4f4e-4a53-9d0b-6c1b0e0c6a11".to_string()
                ),
                ("order".to_string(), "created_at.desc".to_string()),
            ]
        );
    }

    #[test]
    fn writes_filter_on_id_and_owner() {
        let user = Uuid::new_v4();
        let id = Uuid::new_v4();
        for query in [update_query(user, id), delete_query(user, id)] {
            let params = query.params();
            assert!(params.contains(&("id".to_string(), format!("eq.{id}"))));
            assert!(params.contains(&("user_id".to_string(), format!("eq.{user}"))));
            assert_eq!(query.prefer(), Some("return=representation"));
        }
    }

    #[test]
    fn insert_row_sets_owner_and_open_state() {
        let user = Uuid::new_v4();
        let row = InsertRow {
            user_id: user,
            title: "Pay rent",
            description: "",
            priority: Priority::High,
            completed: false,
        };
        assert_eq!(
            serde_json::to_value(&row).unwrap(),
            json!({
                "user_id": user.to_string(),
                "title": "Pay rent",
                "description": "",
                "priority": "high",
                "completed": false
            })
        );
    }

    #[test]
    fn edit_body_replaces_three_fields() {
        let edit = TaskEdit::new("Pay rent", "by friday", Priority::Low).unwrap();
        assert_eq!(
            serde_json::to_value(&edit).unwrap(),
            json!({ "title": "Pay rent", "description": "by friday", "priority": "low" })
        );
    }

    #[test]
    fn empty_write_result_is_not_found() {
        let id = Uuid::new_v4();
        assert_eq!(expect_row(Vec::new(), id), Err(StoreError::NotFound(id)));
    }
}
