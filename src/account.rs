use crate::error::{Error, Result};
use crate::storage::{read_json, write_json, Storage, USERS_KEY};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type AccountId = i64;

/// A registered user. The password is kept in plaintext; there is no
/// backend to protect it with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

/// The list of registered accounts, keyed by email.
#[derive(Debug, Clone)]
pub struct AccountDirectory<S: Storage> {
    storage: S,
}

impl<S: Storage> AccountDirectory<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn accounts(&self) -> Result<Vec<Account>> {
        Ok(read_json(&self.storage, USERS_KEY)?.unwrap_or_default())
    }

    pub fn register(&self, name: &str, email: &str, password: &str) -> Result<Account> {
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(Error::MissingFields);
        }

        let mut accounts = self.accounts()?;
        if accounts.iter().any(|a| a.email == email) {
            log::info!("signup rejected, email already registered");
            return Err(Error::DuplicateEmail);
        }

        let now = Utc::now();
        let next_free = accounts.iter().map(|a| a.id.saturating_add(1)).max().unwrap_or(0);
        let account = Account {
            id: now.timestamp_millis().max(next_free),
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            created_at: now,
        };
        accounts.push(account.clone());
        write_json(&self.storage, USERS_KEY, &accounts)?;
        log::info!("registered account {}", account.id);
        Ok(account)
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Option<Account>> {
        Ok(self
            .accounts()?
            .into_iter()
            .find(|a| a.email == email && a.password == password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn register_appends_and_persists() {
        let storage = MemoryStorage::new();
        let directory = AccountDirectory::new(storage.clone());

        let account = directory.register("Ada", "ada@example.com", "pw").unwrap();
        assert_eq!(account.name, "Ada");

        let reloaded = AccountDirectory::new(storage).accounts().unwrap();
        assert_eq!(reloaded, vec![account]);
    }

    #[test]
    fn duplicate_email_leaves_directory_unchanged() {
        let storage = MemoryStorage::new();
        let directory = AccountDirectory::new(storage.clone());
        directory.register("Ada", "ada@example.com", "pw").unwrap();
        let before = storage.get_item(USERS_KEY).unwrap();

        let err = directory
            .register("Other", "ada@example.com", "different")
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateEmail));
        assert_eq!(storage.get_item(USERS_KEY).unwrap(), before);
    }

    #[test]
    fn empty_fields_are_rejected() {
        let storage = MemoryStorage::new();
        let directory = AccountDirectory::new(storage.clone());
        assert!(matches!(
            directory.register("", "ada@example.com", "pw"),
            Err(Error::MissingFields)
        ));
        assert!(matches!(
            directory.register("Ada", "ada@example.com", ""),
            Err(Error::MissingFields)
        ));
        assert_eq!(storage.get_item(USERS_KEY).unwrap(), None);
    }

    #[test]
    fn ids_stay_unique_within_one_millisecond() {
        let directory = AccountDirectory::new(MemoryStorage::new());
        let a = directory.register("A", "a@example.com", "pw").unwrap();
        let b = directory.register("B", "b@example.com", "pw").unwrap();
        let c = directory.register("C", "c@example.com", "pw").unwrap();
        assert!(a.id < b.id && b.id < c.id);
    }

    #[test]
    fn largest_possible_id_does_not_overflow() {
        let storage = MemoryStorage::new();
        let stored = vec![Account {
            id: i64::MAX,
            name: "Max".to_string(),
            email: "max@example.com".to_string(),
            password: "pw".to_string(),
            created_at: Utc::now(),
        }];
        write_json(&storage, USERS_KEY, &stored).unwrap();

        let account = AccountDirectory::new(storage)
            .register("Ada", "ada@example.com", "pw")
            .unwrap();
        assert_eq!(account.id, i64::MAX);
    }

    #[test]
    fn authenticate_matches_email_and_password() {
        let directory = AccountDirectory::new(MemoryStorage::new());
        let account = directory.register("Ada", "ada@example.com", "pw").unwrap();

        assert_eq!(
            directory.authenticate("ada@example.com", "pw").unwrap(),
            Some(account)
        );
        assert_eq!(directory.authenticate("ada@example.com", "nope").unwrap(), None);
        assert_eq!(directory.authenticate("bob@example.com", "pw").unwrap(), None);
    }

    #[test]
    fn stored_format_uses_camel_case() {
        let storage = MemoryStorage::new();
        AccountDirectory::new(storage.clone())
            .register("Ada", "ada@example.com", "pw")
            .unwrap();
        let raw = storage.get_item(USERS_KEY).unwrap().unwrap();
        assert!(raw.contains("\"createdAt\""));
    }
}
