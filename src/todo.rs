//! Todo items and the collection that owns them.
use std::sync::Arc;

use chrono::NaiveDateTime;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{format_done_time, normalize_text, Result, StoreAdapter, TODOS_KEY};

/// A single task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    /// Millisecond timestamp taken at creation
    pub id: i64,
    /// Task text, never blank
    pub text: String,
    /// Whether the task is completed
    pub done: bool,
    /// When the task was completed; present exactly when `done` is set
    pub done_time: Option<String>,
}

impl TodoItem {
    pub fn new(id: i64, text: String) -> Self {
        Self {
            id,
            text,
            done: false,
            done_time: None,
        }
    }
}

/// The todo collection, persisted in full under the `todos` key after every
/// change.
pub struct TodoManager {
    items: Vec<TodoItem>,
    store: Arc<StoreAdapter>,
}

impl TodoManager {
    /// Loads the collection from the store, starting empty if nothing or
    /// only corrupted text is stored.
    pub fn load(store: Arc<StoreAdapter>) -> Result<Self> {
        let items: Vec<TodoItem> = store.load(TODOS_KEY)?;
        debug!("Loaded {} todos", items.len());
        Ok(Self { items, store })
    }

    /// Adds a task with the given id and returns that id.
    pub fn add(&mut self, text: &str, id: i64) -> Result<i64> {
        let text = normalize_text(text)?;
        self.items.push(TodoItem::new(id, text));
        self.save()?;
        info!("Added todo {}", id);
        Ok(id)
    }

    /// Flips the done state of a task. Returns the updated task, or `None`
    /// when no task has this id.
    pub fn toggle_done(&mut self, id: i64, now: NaiveDateTime) -> Result<Option<TodoItem>> {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            debug!("Toggle ignored, todo {} not found", id);
            return Ok(None);
        };

        item.done = !item.done;
        item.done_time = item.done.then(|| format_done_time(now));
        let updated = item.clone();

        self.save()?;
        info!("Todo {} marked {}", id, if updated.done { "done" } else { "active" });
        Ok(Some(updated))
    }

    /// Removes a task. Returns the removed task, or `None` when no task has
    /// this id.
    pub fn delete(&mut self, id: i64) -> Result<Option<TodoItem>> {
        let Some(index) = self.items.iter().position(|item| item.id == id) else {
            debug!("Delete ignored, todo {} not found", id);
            return Ok(None);
        };

        let removed = self.items.remove(index);
        self.save()?;
        info!("Deleted todo {}", id);
        Ok(Some(removed))
    }

    pub fn get(&self, id: i64) -> Option<&TodoItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Tasks not yet done, in insertion order
    pub fn active_items(&self) -> Vec<&TodoItem> {
        self.items.iter().filter(|item| !item.done).collect()
    }

    /// Completed tasks, in insertion order
    pub fn done_items(&self) -> Vec<&TodoItem> {
        self.items.iter().filter(|item| item.done).collect()
    }

    /// Drops every task from memory. The caller owns removing the stored key.
    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }

    fn save(&self) -> Result<()> {
        self.store.save(TODOS_KEY, &self.items)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::MemoryStore;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn manager() -> (TodoManager, Arc<StoreAdapter>) {
        let store = Arc::new(StoreAdapter::new(MemoryStore::new()));
        (TodoManager::load(Arc::clone(&store)).unwrap(), store)
    }

    #[test]
    fn add_appends_and_persists() {
        let (mut todos, store) = manager();
        let id = todos.add("  write report ", 10).unwrap();

        assert_eq!(todos.len(), 1);
        let item = todos.get(id).unwrap();
        assert_eq!(item.text, "write report");
        assert!(!item.done);
        assert!(item.done_time.is_none());

        let stored: Vec<TodoItem> = store.load(TODOS_KEY).unwrap();
        assert_eq!(stored, todos.items());
    }

    #[test]
    fn blank_text_is_rejected_without_mutation() {
        let (mut todos, store) = manager();
        assert!(todos.add("", 1).is_err());
        assert!(todos.add("   ", 2).is_err());
        assert!(todos.is_empty());
        assert!(store.try_load::<Vec<TodoItem>>(TODOS_KEY).unwrap().is_none());
    }

    #[test]
    fn toggle_twice_restores_state() {
        let (mut todos, _) = manager();
        let id = todos.add("laundry", 1).unwrap();

        let done = todos.toggle_done(id, at(9, 30)).unwrap().unwrap();
        assert!(done.done);
        assert_eq!(done.done_time.as_deref(), Some("2024/1/2 9:30:00"));

        let undone = todos.toggle_done(id, at(9, 31)).unwrap().unwrap();
        assert!(!undone.done);
        assert!(undone.done_time.is_none());
    }

    #[test]
    fn unknown_ids_are_no_ops() {
        let (mut todos, _) = manager();
        todos.add("a", 1).unwrap();
        let before = todos.items().to_vec();

        assert!(todos.toggle_done(99, at(8, 0)).unwrap().is_none());
        assert!(todos.delete(99).unwrap().is_none());
        assert_eq!(todos.items(), before.as_slice());
    }

    #[test]
    fn partitions_cover_everything_in_order() {
        let (mut todos, _) = manager();
        for (i, text) in ["a", "b", "c", "d"].iter().enumerate() {
            todos.add(text, i as i64 + 1).unwrap();
        }
        todos.toggle_done(2, at(10, 0)).unwrap();
        todos.toggle_done(4, at(10, 1)).unwrap();

        let active: Vec<i64> = todos.active_items().iter().map(|t| t.id).collect();
        let done: Vec<i64> = todos.done_items().iter().map(|t| t.id).collect();
        assert_eq!(active, vec![1, 3]);
        assert_eq!(done, vec![2, 4]);
        assert_eq!(active.len() + done.len(), todos.len());
    }

    #[test]
    fn serialized_shape_uses_done_time_key() {
        let item = TodoItem::new(7, "x".to_string());
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 7, "text": "x", "done": false, "doneTime": null})
        );
    }
}
