use crate::tasks::TaskStore;

/// Application state shared across all request handlers.
#[derive(Clone, Default)]
pub struct AppState {
    pub tasks: TaskStore,
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            tasks: TaskStore::new(),
        }
    }
}
