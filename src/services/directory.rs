use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::Utc;

use crate::model::user::UserProfile;
use crate::services::store::StoreError;

/// Read-mostly mirror of the external identity provider. Profiles are
/// recorded as the boundary sees authenticated identities; the core never
/// creates or authenticates users itself.
pub struct UserDirectory {
    users: Mutex<BTreeMap<u64, UserProfile>>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(BTreeMap::new()),
        }
    }

    /// Upsert the identity fields reported by the boundary; the first
    /// sighting fixes `created_at`.
    pub fn record(
        &self,
        id: u64,
        name: &str,
        email: &str,
        is_admin: bool,
    ) -> Result<(), StoreError> {
        let mut users = self.users.lock().map_err(|_| StoreError::Unavailable)?;
        users
            .entry(id)
            .and_modify(|profile| {
                profile.name = name.to_string();
                profile.email = email.to_string();
                profile.is_admin = is_admin;
            })
            .or_insert_with(|| UserProfile {
                id,
                name: name.to_string(),
                email: email.to_string(),
                is_admin,
                created_at: Utc::now(),
            });
        Ok(())
    }

    /// All known profiles, ordered by id.
    pub fn list(&self) -> Result<Vec<UserProfile>, StoreError> {
        let users = self.users.lock().map_err(|_| StoreError::Unavailable)?;
        Ok(users.values().cloned().collect())
    }

    pub fn get(&self, id: u64) -> Result<Option<UserProfile>, StoreError> {
        let users = self.users.lock().map_err(|_| StoreError::Unavailable)?;
        Ok(users.get(&id).cloned())
    }

    pub fn remove(&self, id: u64) -> Result<Option<UserProfile>, StoreError> {
        let mut users = self.users.lock().map_err(|_| StoreError::Unavailable)?;
        Ok(users.remove(&id))
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_an_upsert_keeping_created_at() {
        let directory = UserDirectory::new();
        directory.record(7, "Asha", "asha@example.com", false).unwrap();
        let created = directory.get(7).unwrap().unwrap().created_at;

        directory.record(7, "Asha R", "asha@example.com", true).unwrap();
        let profile = directory.get(7).unwrap().unwrap();
        assert_eq!(profile.name, "Asha R");
        assert!(profile.is_admin);
        assert_eq!(profile.created_at, created);
    }

    #[test]
    fn list_is_ordered_by_id() {
        let directory = UserDirectory::new();
        directory.record(9, "Nikhil", "", false).unwrap();
        directory.record(2, "Asha", "", false).unwrap();
        let ids: Vec<u64> = directory.list().unwrap().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![2, 9]);
    }

    #[test]
    fn remove_reports_missing_users() {
        let directory = UserDirectory::new();
        directory.record(7, "Asha", "", false).unwrap();
        assert!(directory.remove(7).unwrap().is_some());
        assert!(directory.remove(7).unwrap().is_none());
    }
}
