//! Routine checklist items and the once-a-day reset that unchecks them.
use std::sync::Arc;

use chrono::{NaiveDateTime, Timelike};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    format_reset_date, normalize_text, Result, StoreAdapter, LAST_RESET_KEY, ROUTINES_KEY,
};

/// Local hour from which a new day's reset may run.
pub const DEFAULT_CUTOFF_HOUR: u32 = 1;

/// A recurring checklist entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineItem {
    pub id: i64,
    pub text: String,
    pub checked: bool,
}

impl RoutineItem {
    pub fn new(id: i64, text: String) -> Self {
        Self {
            id,
            text,
            checked: false,
        }
    }
}

/// What a reset attempt did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetOutcome {
    /// Routines were unchecked and the marker moved to `date`.
    Reset { cleared: usize, date: String },
    /// The local hour is still before the cutoff.
    BeforeCutoff,
    /// Today's reset has already happened.
    AlreadyReset,
}

impl ResetOutcome {
    pub fn did_reset(&self) -> bool {
        matches!(self, ResetOutcome::Reset { .. })
    }
}

/// Whether a reset should run at `now` given the stored marker.
pub fn reset_due(now: NaiveDateTime, last_reset: Option<&str>, cutoff_hour: u32) -> bool {
    if now.hour() < cutoff_hour {
        return false;
    }
    let today = format_reset_date(now.date());
    last_reset != Some(today.as_str())
}

/// The routine collection, persisted in full under the `routines` key after
/// every change.
pub struct RoutineManager {
    items: Vec<RoutineItem>,
    store: Arc<StoreAdapter>,
}

impl RoutineManager {
    pub fn load(store: Arc<StoreAdapter>) -> Result<Self> {
        let items: Vec<RoutineItem> = store.load(ROUTINES_KEY)?;
        debug!("Loaded {} routines", items.len());
        Ok(Self { items, store })
    }

    pub fn add(&mut self, text: &str, id: i64) -> Result<i64> {
        let text = normalize_text(text)?;
        self.items.push(RoutineItem::new(id, text));
        self.save()?;
        info!("Added routine {}", id);
        Ok(id)
    }

    /// Flips the checked state. Returns the updated routine, or `None` when
    /// no routine has this id.
    pub fn toggle_checked(&mut self, id: i64) -> Result<Option<RoutineItem>> {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            debug!("Toggle ignored, routine {} not found", id);
            return Ok(None);
        };

        item.checked = !item.checked;
        let updated = item.clone();
        self.save()?;
        Ok(Some(updated))
    }

    pub fn delete(&mut self, id: i64) -> Result<Option<RoutineItem>> {
        let Some(index) = self.items.iter().position(|item| item.id == id) else {
            debug!("Delete ignored, routine {} not found", id);
            return Ok(None);
        };

        let removed = self.items.remove(index);
        self.save()?;
        info!("Deleted routine {}", id);
        Ok(Some(removed))
    }

    pub fn get(&self, id: i64) -> Option<&RoutineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn items(&self) -> &[RoutineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Date of the last reset as stored, if any.
    pub fn last_reset(&self) -> Result<Option<String>> {
        self.store.load(LAST_RESET_KEY)
    }

    /// Unchecks every routine once per calendar day, from `cutoff_hour` on.
    ///
    /// Calling this again on the same day after it has fired does nothing,
    /// so it is safe to run from a timer.
    pub fn run_daily_reset(
        &mut self,
        now: NaiveDateTime,
        cutoff_hour: u32,
    ) -> Result<ResetOutcome> {
        if now.hour() < cutoff_hour {
            return Ok(ResetOutcome::BeforeCutoff);
        }

        let last_reset = self.last_reset()?;
        if !reset_due(now, last_reset.as_deref(), cutoff_hour) {
            return Ok(ResetOutcome::AlreadyReset);
        }

        self.reset(now)
    }

    /// Unchecks every routine and stamps today's date, regardless of the
    /// cutoff hour or marker.
    pub fn force_reset(&mut self, now: NaiveDateTime) -> Result<ResetOutcome> {
        self.reset(now)
    }

    fn reset(&mut self, now: NaiveDateTime) -> Result<ResetOutcome> {
        let cleared = self.items.iter().filter(|item| item.checked).count();
        for item in &mut self.items {
            item.checked = false;
        }

        // routines first, then the marker; not atomic across the two keys
        self.save()?;
        let date = format_reset_date(now.date());
        self.store.save(LAST_RESET_KEY, &date)?;

        info!("Routines reset for {} ({} unchecked)", date, cleared);
        Ok(ResetOutcome::Reset { cleared, date })
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }

    fn save(&self) -> Result<()> {
        self.store.save(ROUTINES_KEY, &self.items)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::MemoryStore;

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn manager_with_checked_routine(
        last_reset: Option<&str>,
    ) -> (RoutineManager, Arc<StoreAdapter>) {
        let store = Arc::new(StoreAdapter::new(MemoryStore::new()));
        if let Some(date) = last_reset {
            store.save(LAST_RESET_KEY, date).unwrap();
        }
        let mut routines = RoutineManager::load(Arc::clone(&store)).unwrap();
        routines.add("stretch", 1).unwrap();
        routines.toggle_checked(1).unwrap();
        (routines, store)
    }

    #[test]
    fn reset_due_respects_cutoff_and_marker() {
        assert!(reset_due(at(2, 1, 5), Some("2024-01-01"), 1));
        assert!(reset_due(at(2, 1, 5), None, 1));
        assert!(!reset_due(at(2, 0, 59), Some("2024-01-01"), 1));
        assert!(!reset_due(at(2, 23, 0), Some("2024-01-02"), 1));
    }

    #[test]
    fn reset_after_cutoff_unchecks_and_moves_marker() {
        let (mut routines, store) = manager_with_checked_routine(Some("2024-01-01"));

        let outcome = routines.run_daily_reset(at(2, 1, 5), 1).unwrap();
        assert_eq!(
            outcome,
            ResetOutcome::Reset {
                cleared: 1,
                date: "2024-01-02".to_string()
            }
        );
        assert!(!routines.get(1).unwrap().checked);
        assert_eq!(routines.last_reset().unwrap().as_deref(), Some("2024-01-02"));

        let stored: Vec<RoutineItem> = store.load(ROUTINES_KEY).unwrap();
        assert!(stored.iter().all(|r| !r.checked));
    }

    #[test]
    fn second_reset_same_day_does_nothing() {
        let (mut routines, _) = manager_with_checked_routine(Some("2024-01-01"));
        routines.run_daily_reset(at(2, 1, 5), 1).unwrap();

        routines.toggle_checked(1).unwrap();
        let outcome = routines.run_daily_reset(at(2, 14, 0), 1).unwrap();

        assert_eq!(outcome, ResetOutcome::AlreadyReset);
        assert!(routines.get(1).unwrap().checked);
    }

    #[test]
    fn no_reset_before_cutoff() {
        for marker in [None, Some("2024-01-01"), Some("2024-01-02")] {
            let (mut routines, _) = manager_with_checked_routine(marker);
            let outcome = routines.run_daily_reset(at(2, 0, 59), 1).unwrap();
            assert_eq!(outcome, ResetOutcome::BeforeCutoff);
            assert!(routines.get(1).unwrap().checked);
            assert_eq!(routines.last_reset().unwrap().as_deref(), marker);
        }
    }

    #[test]
    fn routine_added_after_reset_stays_unchecked_until_next_day() {
        let (mut routines, _) = manager_with_checked_routine(Some("2024-01-01"));
        routines.run_daily_reset(at(2, 1, 5), 1).unwrap();

        routines.add("read", 2).unwrap();
        assert!(!routines.get(2).unwrap().checked);
        routines.toggle_checked(2).unwrap();

        assert!(!routines.run_daily_reset(at(2, 22, 0), 1).unwrap().did_reset());
        assert!(routines.get(2).unwrap().checked);
        assert!(routines.run_daily_reset(at(3, 1, 0), 1).unwrap().did_reset());
        assert!(!routines.get(2).unwrap().checked);
    }

    #[test]
    fn force_reset_ignores_cutoff() {
        let (mut routines, _) = manager_with_checked_routine(Some("2024-01-02"));
        let outcome = routines.force_reset(at(2, 0, 10)).unwrap();
        assert!(outcome.did_reset());
        assert!(!routines.get(1).unwrap().checked);
    }
}
