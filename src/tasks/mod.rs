pub mod ui;

use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{delete, post, put};
use axum::{Form, Router};
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::shared::state::AppState;

/// Event name dependent UI regions (count badge, empty-state banner) listen
/// for to refresh themselves after any mutation.
pub const TASK_LIST_CHANGED: &str = "task-list-changed";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub description: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TasksError {
    #[error("Task description must not be empty")]
    EmptyDescription,
    #[error("No task with id {0}")]
    NotFound(Uuid),
}

impl IntoResponse for TasksError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::EmptyDescription => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        };
        let body = format!(
            "<div class=\"form-error\">{}</div>",
            ui::html_escape(&self.to_string())
        );
        (status, Html(body)).into_response()
    }
}

/// In-memory task collection. Insertion order is display order, so the
/// backing storage is a `Vec` behind a single lock; every operation takes
/// the lock exactly once.
#[derive(Clone, Default)]
pub struct TaskStore {
    tasks: Arc<RwLock<Vec<Task>>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Snapshot of all tasks in insertion order.
    pub async fn list(&self) -> Vec<Task> {
        let tasks = self.tasks.read().await;
        tasks.clone()
    }

    /// Append a new task. The description is trimmed; an empty result is
    /// rejected before anything is stored.
    pub async fn add(&self, description: &str) -> Result<Task, TasksError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(TasksError::EmptyDescription);
        }
        let task = Task {
            id: Uuid::new_v4(),
            description: description.to_string(),
            completed: false,
            created_at: Utc::now(),
        };
        let mut tasks = self.tasks.write().await;
        tasks.push(task.clone());
        Ok(task)
    }

    /// Remove the task with the given id. Returns whether anything was
    /// removed; removing an unknown id is a no-op, not an error.
    pub async fn remove(&self, id: Uuid) -> bool {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        tasks.len() != before
    }

    /// Flip the completion flag of the task with the given id and return the
    /// updated task.
    pub async fn toggle(&self, id: Uuid) -> Result<Task, TasksError> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TasksError::NotFound(id))?;
        task.completed = !task.completed;
        Ok(task.clone())
    }

    pub async fn count_incomplete(&self) -> usize {
        let tasks = self.tasks.read().await;
        tasks.iter().filter(|t| !t.completed).count()
    }

    pub async fn is_empty(&self) -> bool {
        let tasks = self.tasks.read().await;
        tasks.is_empty()
    }
}

/// HTML fragment response. Mutation handlers attach a change-notification
/// event, delivered to the client via the `HX-Trigger` response header, so
/// dependent regions re-fetch themselves from the read endpoints.
pub struct UiFragment {
    status: StatusCode,
    trigger: Option<&'static str>,
    html: String,
}

impl UiFragment {
    pub fn new(html: String) -> Self {
        UiFragment {
            status: StatusCode::OK,
            trigger: None,
            html,
        }
    }

    pub fn empty() -> Self {
        Self::new(String::new())
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_trigger(mut self, event: &'static str) -> Self {
        self.trigger = Some(event);
        self
    }
}

impl IntoResponse for UiFragment {
    fn into_response(self) -> Response {
        let mut response = (self.status, Html(self.html)).into_response();
        if let Some(event) = self.trigger {
            response
                .headers_mut()
                .insert("HX-Trigger", HeaderValue::from_static(event));
        }
        response
    }
}

pub fn configure_task_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/todos", post(handle_task_create))
        .route("/todos/:id", delete(handle_task_delete))
        .route("/todos/:id/toggle", put(handle_task_toggle))
}

/// Handler for task creation
async fn handle_task_create(
    State(state): State<Arc<AppState>>,
    Form(payload): Form<CreateTaskRequest>,
) -> Result<UiFragment, TasksError> {
    let task = state.tasks.add(&payload.description).await?;
    info!("Created task {}", task.id);
    Ok(UiFragment::new(ui::render_task_row(&task))
        .with_status(StatusCode::CREATED)
        .with_trigger(TASK_LIST_CHANGED))
}

/// Handler for task deletion. Deleting an unknown id succeeds with nothing
/// removed, so the handler is idempotent.
async fn handle_task_delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> UiFragment {
    if state.tasks.remove(id).await {
        info!("Deleted task {}", id);
    } else {
        debug!("Delete for unknown task {} ignored", id);
    }
    UiFragment::empty().with_trigger(TASK_LIST_CHANGED)
}

/// Handler for toggling task completion
async fn handle_task_toggle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<UiFragment, TasksError> {
    let task = state.tasks.toggle(id).await?;
    info!(
        "Toggled task {} to completed={}",
        task.id, task.completed
    );
    Ok(UiFragment::new(ui::render_task_row(&task)).with_trigger(TASK_LIST_CHANGED))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_and_list_preserve_insertion_order() {
        let store = TaskStore::new();
        let first = store.add("buy milk").await.unwrap();
        let second = store.add("walk dog").await.unwrap();
        let third = store.add("water plants").await.unwrap();

        let tasks = store.list().await;
        assert_eq!(tasks.len(), 3);
        assert_eq!(
            tasks.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![first.id, second.id, third.id]
        );
    }

    #[tokio::test]
    async fn test_add_trims_description() {
        let store = TaskStore::new();
        let task = store.add("  buy milk  ").await.unwrap();
        assert_eq!(task.description, "buy milk");
    }

    #[tokio::test]
    async fn test_add_rejects_empty_description() {
        let store = TaskStore::new();
        assert!(matches!(
            store.add("").await,
            Err(TasksError::EmptyDescription)
        ));
        assert!(matches!(
            store.add("   ").await,
            Err(TasksError::EmptyDescription)
        ));
        assert!(store.is_empty().await);
        assert_eq!(store.count_incomplete().await, 0);
    }

    #[tokio::test]
    async fn test_duplicate_descriptions_are_permitted() {
        let store = TaskStore::new();
        let first = store.add("buy milk").await.unwrap();
        let second = store.add("buy milk").await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(store.list().await.len(), 2);
    }

    #[tokio::test]
    async fn test_toggle_is_an_involution() {
        let store = TaskStore::new();
        let task = store.add("buy milk").await.unwrap();
        assert!(!task.completed);

        let toggled = store.toggle(task.id).await.unwrap();
        assert!(toggled.completed);

        let toggled_back = store.toggle(task.id).await.unwrap();
        assert!(!toggled_back.completed);
    }

    #[tokio::test]
    async fn test_toggle_unknown_id_is_not_found() {
        let store = TaskStore::new();
        let id = Uuid::new_v4();
        match store.toggle(id).await {
            Err(TasksError::NotFound(missing)) => assert_eq!(missing, id),
            other => panic!("Expected NotFound, got {:?}", other.map(|t| t.id)),
        }
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let store = TaskStore::new();
        let task = store.add("buy milk").await.unwrap();

        assert!(store.remove(task.id).await);
        assert!(!store.remove(task.id).await);
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_never_issued_id_leaves_store_unchanged() {
        let store = TaskStore::new();
        store.add("buy milk").await.unwrap();
        store.add("walk dog").await.unwrap();

        assert!(!store.remove(Uuid::new_v4()).await);
        assert_eq!(store.list().await.len(), 2);
    }

    #[tokio::test]
    async fn test_count_incomplete_tracks_operations() {
        let store = TaskStore::new();
        let first = store.add("buy milk").await.unwrap();
        assert_eq!(store.count_incomplete().await, 1);

        store.toggle(first.id).await.unwrap();
        assert_eq!(store.count_incomplete().await, 0);

        let second = store.add("walk dog").await.unwrap();
        assert_eq!(store.count_incomplete().await, 1);

        store.remove(first.id).await;
        let tasks = store.list().await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, second.id);
        assert_eq!(store.count_incomplete().await, 1);
    }

    #[tokio::test]
    async fn test_count_matches_list_after_mixed_operations() {
        let store = TaskStore::new();
        let mut ids = Vec::new();
        for i in 0..6 {
            let task = store.add(&format!("task {}", i)).await.unwrap();
            ids.push(task.id);
        }
        store.toggle(ids[1]).await.unwrap();
        store.toggle(ids[4]).await.unwrap();
        store.remove(ids[0]).await;
        store.toggle(ids[4]).await.unwrap();

        let tasks = store.list().await;
        let expected = tasks.iter().filter(|t| !t.completed).count();
        assert_eq!(store.count_incomplete().await, expected);
        assert_eq!(tasks.len(), 5);
    }
}
