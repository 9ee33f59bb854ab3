//! Application context: the single owner of the store, both collections and
//! the clock. Command handlers and the reset scheduler operate on it instead
//! of reaching for global state.
use std::sync::Arc;

use chrono::NaiveDateTime;
use log::{debug, info};

use crate::{
    Clock, Config, FileStore, IdGenerator, ResetOutcome, Result, RoutineItem, RoutineManager,
    StoreAdapter, SystemClock, TodoItem, TodoManager,
};

pub struct AppContext {
    config: Config,
    store: Arc<StoreAdapter>,
    clock: Arc<dyn Clock>,
    ids: IdGenerator,
    todos: TodoManager,
    routines: RoutineManager,
}

impl AppContext {
    /// Builds a context over `store`, loading both collections from it.
    /// Fails if either collection cannot be read.
    pub fn new(config: Config, store: StoreAdapter, clock: Arc<dyn Clock>) -> Result<Self> {
        let store = Arc::new(store);
        let todos = TodoManager::load(Arc::clone(&store))?;
        let routines = RoutineManager::load(Arc::clone(&store))?;

        let ids = IdGenerator::seeded(
            todos
                .items()
                .iter()
                .map(|t| t.id)
                .chain(routines.items().iter().map(|r| r.id)),
        );

        info!(
            "Loaded {} todos and {} routines",
            todos.len(),
            routines.len()
        );

        Ok(Self {
            config,
            store,
            clock,
            ids,
            todos,
            routines,
        })
    }

    /// Opens the file store under `config.data_dir` with the system clock.
    pub fn open(config: Config) -> Result<Self> {
        debug!("Opening data directory {}", config.data_dir.display());
        let backend = FileStore::open(&config.data_dir)?;
        Self::new(config, StoreAdapter::new(backend), Arc::new(SystemClock))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current local time according to the context's clock.
    pub fn now(&self) -> NaiveDateTime {
        self.clock.now_local()
    }

    fn next_id(&mut self) -> Result<i64> {
        self.ids.next_id(self.clock.timestamp_millis())
    }

    // Todos

    pub fn add_todo(&mut self, text: &str) -> Result<i64> {
        let id = self.next_id()?;
        self.todos.add(text, id)
    }

    pub fn toggle_todo(&mut self, id: i64) -> Result<Option<TodoItem>> {
        let now = self.clock.now_local();
        self.todos.toggle_done(id, now)
    }

    pub fn delete_todo(&mut self, id: i64) -> Result<Option<TodoItem>> {
        self.todos.delete(id)
    }

    pub fn todo(&self, id: i64) -> Option<&TodoItem> {
        self.todos.get(id)
    }

    pub fn todos(&self) -> &[TodoItem] {
        self.todos.items()
    }

    pub fn active_todos(&self) -> Vec<&TodoItem> {
        self.todos.active_items()
    }

    pub fn done_todos(&self) -> Vec<&TodoItem> {
        self.todos.done_items()
    }

    // Routines

    pub fn add_routine(&mut self, text: &str) -> Result<i64> {
        let id = self.next_id()?;
        self.routines.add(text, id)
    }

    pub fn toggle_routine(&mut self, id: i64) -> Result<Option<RoutineItem>> {
        self.routines.toggle_checked(id)
    }

    pub fn delete_routine(&mut self, id: i64) -> Result<Option<RoutineItem>> {
        self.routines.delete(id)
    }

    pub fn routine(&self, id: i64) -> Option<&RoutineItem> {
        self.routines.get(id)
    }

    pub fn routines(&self) -> &[RoutineItem] {
        self.routines.items()
    }

    pub fn last_reset(&self) -> Result<Option<String>> {
        self.routines.last_reset()
    }

    /// Runs the daily reset against the current clock and configured cutoff.
    pub fn run_daily_reset(&mut self) -> Result<ResetOutcome> {
        let now = self.clock.now_local();
        let outcome = self.routines.run_daily_reset(now, self.config.cutoff_hour)?;
        debug!("Daily reset check at {}: {:?}", now, outcome);
        Ok(outcome)
    }

    pub fn force_reset(&mut self) -> Result<ResetOutcome> {
        let now = self.clock.now_local();
        self.routines.force_reset(now)
    }

    /// Removes the todo, routine and reset-marker keys and empties both
    /// collections. Other entries in the data directory are kept. Returns the
    /// number of keys that existed.
    pub fn clear_all(&mut self) -> Result<usize> {
        let removed = self.store.remove_stored_keys()?;
        self.todos.clear();
        self.routines.clear();
        info!("Cleared {} stored keys", removed);
        Ok(removed)
    }
}
