//! HTML fragment rendering for the task list UI.
//!
//! The wire format is presentation markup: the `todo-count` and
//! `empty-state` element ids are part of the contract consumed by the
//! client-side script, and every fragment carries the htmx attributes it
//! needs to keep itself wired after a swap.

use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

use crate::shared::state::AppState;
use crate::tasks::{Task, TASK_LIST_CHANGED};

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// One task row. The toggle checkbox and delete button both target the row
/// itself, so a swap replaces exactly this `<li>`.
pub fn render_task_row(task: &Task) -> String {
    let row_class = if task.completed {
        "todo-item completed"
    } else {
        "todo-item"
    };
    let checked = if task.completed { " checked" } else { "" };
    let created = task.created_at.format("%Y-%m-%d %H:%M").to_string();

    format!(
        "<li class=\"{row_class}\" id=\"todo-{id}\">\
            <input type=\"checkbox\"{checked} hx-put=\"/todos/{id}/toggle\" hx-target=\"#todo-{id}\" hx-swap=\"outerHTML\">\
            <span class=\"todo-description\">{description}</span>\
            <span class=\"todo-created\">{created}</span>\
            <button class=\"btn-icon\" hx-delete=\"/todos/{id}\" hx-target=\"#todo-{id}\" hx-swap=\"outerHTML\" title=\"Delete\">×</button>\
        </li>",
        row_class = row_class,
        id = task.id,
        checked = checked,
        description = html_escape(&task.description),
        created = created,
    )
}

/// Incomplete-count badge. Re-fetches itself whenever a mutation fires the
/// change event on the body.
pub fn render_count(count: usize) -> String {
    format!(
        "<span id=\"todo-count\" class=\"todo-count\" \
            hx-get=\"/todos/count\" hx-trigger=\"{event} from:body\" hx-swap=\"outerHTML\">\
            {count} remaining\
        </span>",
        event = TASK_LIST_CHANGED,
        count = count,
    )
}

/// Placeholder shown when the list is empty. Rendered as an empty shell when
/// tasks exist so the region keeps listening for the change event.
pub fn render_empty_state(has_any: bool) -> String {
    let body = if has_any {
        ""
    } else {
        "<div class=\"empty-icon\">📝</div>\
         <h3>No tasks yet</h3>\
         <p>Add your first task to get started</p>"
    };
    format!(
        "<div id=\"empty-state\" class=\"empty-state\" \
            hx-get=\"/todos/empty-state\" hx-trigger=\"{event} from:body\" hx-swap=\"outerHTML\">\
            {body}\
        </div>",
        event = TASK_LIST_CHANGED,
        body = body,
    )
}

/// Full page for the initial load. Everything after this renders through the
/// fragment endpoints.
pub fn render_index(tasks: &[Task]) -> String {
    let mut rows = String::new();
    for task in tasks {
        rows.push_str(&render_task_row(task));
    }
    let incomplete = tasks.iter().filter(|t| !t.completed).count();

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Tasks</title>
    <script src="https://unpkg.com/htmx.org@1.9.12"></script>
    <style>
    body {{ font-family: -apple-system, sans-serif; max-width: 640px; margin: 2rem auto; padding: 0 1rem; }}
    .todo-form {{ display: flex; gap: 0.5rem; margin-bottom: 1rem; }}
    .todo-form input[type="text"] {{ flex: 1; padding: 0.5rem; border: 1px solid #e0e0e0; border-radius: 4px; }}
    .todo-list {{ list-style: none; padding: 0; display: flex; flex-direction: column; gap: 0.5rem; }}
    .todo-item {{ display: flex; align-items: center; gap: 0.75rem; padding: 0.75rem 1rem; background: #f9f9f9; border-radius: 8px; }}
    .todo-item.completed .todo-description {{ text-decoration: line-through; color: #9e9e9e; }}
    .todo-description {{ flex: 1; }}
    .todo-created {{ color: #9e9e9e; font-size: 0.8rem; }}
    .todo-count {{ color: #1976d2; font-weight: 500; }}
    .btn-icon {{ background: none; border: none; cursor: pointer; font-size: 1.1rem; }}
    .empty-state {{ text-align: center; color: #9e9e9e; }}
    .empty-icon {{ font-size: 2rem; }}
    </style>
</head>
<body>
    <h1>Tasks</h1>
    <form class="todo-form" hx-post="/todos" hx-target="#todo-list" hx-swap="beforeend" hx-on::after-request="if (event.detail.successful) this.reset()">
        <input type="text" name="description" placeholder="What needs doing?" required>
        <button type="submit" class="btn">Add</button>
    </form>
    {count}
    <ul id="todo-list" class="todo-list">{rows}</ul>
    {empty}
</body>
</html>"##,
        count = render_count(incomplete),
        rows = rows,
        empty = render_empty_state(!tasks.is_empty()),
    )
}

pub fn configure_task_ui_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handle_index))
        .route("/todos/count", get(handle_count))
        .route("/todos/empty-state", get(handle_empty_state))
}

async fn handle_index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let tasks = state.tasks.list().await;
    Html(render_index(&tasks))
}

async fn handle_count(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let count = state.tasks.count_incomplete().await;
    Html(render_count(count))
}

async fn handle_empty_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let has_any = !state.tasks.is_empty().await;
    Html(render_empty_state(has_any))
}
