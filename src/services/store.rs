use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::model::location::Location;
use crate::model::session::{AttendanceSession, TaskRecord};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("an open session already exists for this user")]
    AlreadyCheckedIn,

    #[error("no open session exists for this user")]
    NoOpenSession,

    #[error("session storage unavailable")]
    Unavailable,
}

#[derive(Default)]
struct UserSessions {
    open: Option<AttendanceSession>,
    history: Vec<AttendanceSession>,
}

/// Keyed session storage: at most one open session per user plus that user's
/// append-only closed history.
///
/// The outer lock is held only long enough to fetch or create a user's slot;
/// the per-user lock is held across the check-and-set, so concurrent
/// check-ins for one user serialize without blocking other users. A poisoned
/// lock is reported as `Unavailable` rather than panicking the request.
pub struct SessionStore {
    users: Mutex<HashMap<u64, Arc<Mutex<UserSessions>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, user_id: u64) -> Result<Arc<Mutex<UserSessions>>, StoreError> {
        let mut users = self.users.lock().map_err(|_| StoreError::Unavailable)?;
        Ok(users.entry(user_id).or_default().clone())
    }

    /// Atomic check-and-set: opens a session only if the user has none open.
    /// `now` is the server's canonical clock; the session's calendar day is
    /// the local date of that instant.
    pub fn try_open(
        &self,
        user_id: u64,
        location: Location,
        now: DateTime<Utc>,
    ) -> Result<AttendanceSession, StoreError> {
        let slot = self.slot(user_id)?;
        let mut sessions = slot.lock().map_err(|_| StoreError::Unavailable)?;

        if sessions.open.is_some() {
            return Err(StoreError::AlreadyCheckedIn);
        }

        let session = AttendanceSession {
            id: Uuid::new_v4(),
            user_id,
            date: now.with_timezone(&Local).date_naive(),
            check_in: now,
            check_out: None,
            location,
            task: None,
        };
        sessions.open = Some(session.clone());

        Ok(session)
    }

    /// Closes the open session, stamping the checkout time and task. A
    /// backward server clock is clamped to the check-in instant so the
    /// session reports zero duration, never a negative one.
    pub fn close(
        &self,
        user_id: u64,
        task: TaskRecord,
        now: DateTime<Utc>,
    ) -> Result<AttendanceSession, StoreError> {
        let slot = self.slot(user_id)?;
        let mut sessions = slot.lock().map_err(|_| StoreError::Unavailable)?;

        let mut session = sessions.open.take().ok_or(StoreError::NoOpenSession)?;
        session.check_out = Some(now.max(session.check_in));
        session.task = Some(task);
        sessions.history.push(session.clone());

        Ok(session)
    }

    /// The user's open session, if any. Pure read.
    pub fn status(&self, user_id: u64) -> Result<Option<AttendanceSession>, StoreError> {
        let slot = self.slot(user_id)?;
        let sessions = slot.lock().map_err(|_| StoreError::Unavailable)?;
        Ok(sessions.open.clone())
    }

    /// Closed sessions, newest first, optionally restricted to an inclusive
    /// date range.
    pub fn history(
        &self,
        user_id: u64,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<AttendanceSession>, StoreError> {
        let slot = self.slot(user_id)?;
        let sessions = slot.lock().map_err(|_| StoreError::Unavailable)?;

        let mut records: Vec<AttendanceSession> = sessions
            .history
            .iter()
            .filter(|s| match range {
                Some((from, to)) => s.date >= from && s.date <= to,
                None => true,
            })
            .cloned()
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date).then(b.check_in.cmp(&a.check_in)));

        Ok(records)
    }

    /// One consistent view of a user: the open session plus closed history
    /// (newest first).
    pub fn snapshot(
        &self,
        user_id: u64,
    ) -> Result<(Option<AttendanceSession>, Vec<AttendanceSession>), StoreError> {
        let slot = self.slot(user_id)?;
        let sessions = slot.lock().map_err(|_| StoreError::Unavailable)?;

        let mut history = sessions.history.clone();
        history.sort_by(|a, b| b.date.cmp(&a.date).then(b.check_in.cmp(&a.check_in)));

        Ok((sessions.open.clone(), history))
    }

    /// Removes the user's open marker and history in one step. Returns
    /// whether any session data existed.
    pub fn delete_user(&self, user_id: u64) -> Result<bool, StoreError> {
        let mut users = self.users.lock().map_err(|_| StoreError::Unavailable)?;
        match users.remove(&user_id) {
            Some(slot) => {
                let sessions = slot.lock().map_err(|_| StoreError::Unavailable)?;
                Ok(sessions.open.is_some() || !sessions.history.is_empty())
            }
            None => Ok(false),
        }
    }

    pub fn user_ids(&self) -> Result<Vec<u64>, StoreError> {
        let users = self.users.lock().map_err(|_| StoreError::Unavailable)?;
        let mut ids: Vec<u64> = users.keys().copied().collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::location::RegisteredLocation;
    use crate::model::session::CustomField;
    use chrono::TimeZone;
    use std::sync::Barrier;
    use std::thread;

    fn office() -> Location {
        Location::registered(&RegisteredLocation {
            id: 3,
            pincode: "400001".to_string(),
            name: "Mumbai Office".to_string(),
        })
    }

    fn task() -> TaskRecord {
        TaskRecord::new("Fixed login bug", "completed", "Auth", Vec::new()).unwrap()
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, h, m, 0).unwrap()
    }

    #[test]
    fn checkout_without_checkin_creates_nothing() {
        let store = SessionStore::new();
        let err = store.close(7, task(), at(17, 0)).unwrap_err();
        assert_eq!(err, StoreError::NoOpenSession);
        assert!(store.history(7, None).unwrap().is_empty());
    }

    #[test]
    fn full_lifecycle_closes_exactly_once() {
        let store = SessionStore::new();
        let t1 = at(9, 0);
        let t2 = at(17, 30);

        store.try_open(7, office(), t1).unwrap();
        let closed = store.close(7, task(), t2).unwrap();

        assert_eq!(closed.check_in, t1);
        assert_eq!(closed.check_out, Some(t2));
        assert_eq!(closed.duration().unwrap(), t2 - t1);
        assert_eq!(closed.task.as_ref().unwrap().status.to_string(), "completed");

        let history = store.history(7, None).unwrap();
        assert_eq!(history.len(), 1);
        assert!(!history[0].is_open());

        // The session is gone from the open slot: a second checkout fails.
        let err = store.close(7, task(), at(17, 31)).unwrap_err();
        assert_eq!(err, StoreError::NoOpenSession);
    }

    #[test]
    fn double_check_in_is_rejected() {
        let store = SessionStore::new();
        store.try_open(7, office(), at(9, 0)).unwrap();
        let err = store.try_open(7, office(), at(9, 5)).unwrap_err();
        assert_eq!(err, StoreError::AlreadyCheckedIn);
    }

    #[test]
    fn open_sessions_are_per_user() {
        let store = SessionStore::new();
        store.try_open(7, office(), at(9, 0)).unwrap();
        store.try_open(8, office(), at(9, 0)).unwrap();
        assert!(store.status(7).unwrap().is_some());
        assert!(store.status(8).unwrap().is_some());
    }

    #[test]
    fn concurrent_check_ins_have_exactly_one_winner() {
        let store = Arc::new(SessionStore::new());
        let attempts = 8;
        let barrier = Arc::new(Barrier::new(attempts));

        let handles: Vec<_> = (0..attempts)
            .map(|_| {
                let store = store.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    store.try_open(7, office(), Utc::now())
                })
            })
            .collect();

        let mut wins = 0;
        let mut losses = 0;
        for handle in handles {
            match handle.join().unwrap() {
                Ok(_) => wins += 1,
                Err(StoreError::AlreadyCheckedIn) => losses += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(wins, 1);
        assert_eq!(losses, attempts - 1);
        assert!(store.status(7).unwrap().is_some());
    }

    #[test]
    fn backward_clock_clamps_to_zero_duration() {
        let store = SessionStore::new();
        store.try_open(7, office(), at(9, 0)).unwrap();

        let closed = store.close(7, task(), at(8, 30)).unwrap();
        assert_eq!(closed.check_out, Some(closed.check_in));
        assert_eq!(closed.duration().unwrap().num_seconds(), 0);
    }

    #[test]
    fn history_is_newest_first_and_range_filtered() {
        let store = SessionStore::new();
        let days = [
            Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 11, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 12, 9, 0, 0).unwrap(),
        ];
        for day in days {
            store.try_open(7, office(), day).unwrap();
            store.close(7, task(), day + chrono::Duration::hours(8)).unwrap();
        }

        let history = store.history(7, None).unwrap();
        assert_eq!(history.len(), 3);
        assert!(history[0].check_in > history[1].check_in);
        assert!(history[1].check_in > history[2].check_in);

        let from = days[1].with_timezone(&Local).date_naive();
        let ranged = store.history(7, Some((from, from))).unwrap();
        assert_eq!(ranged.len(), 1);
        assert_eq!(ranged[0].date, from);
    }

    #[test]
    fn delete_user_removes_everything_at_once() {
        let store = SessionStore::new();
        store.try_open(7, office(), at(9, 0)).unwrap();
        store.close(7, task(), at(17, 0)).unwrap();
        store.try_open(7, office(), at(18, 0)).unwrap();

        assert!(store.delete_user(7).unwrap());
        assert!(store.status(7).unwrap().is_none());
        assert!(store.history(7, None).unwrap().is_empty());

        // Nothing left to delete the second time.
        assert!(!store.delete_user(7).unwrap());
    }

    #[test]
    fn task_custom_fields_survive_the_close() {
        let store = SessionStore::new();
        store.try_open(7, office(), at(9, 0)).unwrap();

        let fields = vec![CustomField {
            name: "ticket".to_string(),
            value: "ATT-17".to_string(),
        }];
        let task = TaskRecord::new("Fixed login bug", "completed", "Auth", fields).unwrap();
        let closed = store.close(7, task, at(17, 0)).unwrap();

        let recorded = &closed.task.unwrap().custom_fields;
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].value, "ATT-17");
    }
}
