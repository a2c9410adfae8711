use crate::account::Account;
use crate::error::Result;
use crate::storage::{read_json, write_json, Storage, SESSION_KEY};

/// Outcome of checking the session marker before a protected screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Authenticated(Account),
    Unauthenticated,
}

impl SessionState {
    pub fn account(&self) -> Option<&Account> {
        match self {
            Self::Authenticated(account) => Some(account),
            Self::Unauthenticated => None,
        }
    }
}

/// The single logged-in account, stored apart from the directory.
#[derive(Debug, Clone)]
pub struct Session<S: Storage> {
    storage: S,
}

impl<S: Storage> Session<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn establish(&self, account: &Account) -> Result<()> {
        write_json(&self.storage, SESSION_KEY, account)?;
        log::info!("session started for account {}", account.id);
        Ok(())
    }

    pub fn current(&self) -> Result<Option<Account>> {
        read_json(&self.storage, SESSION_KEY)
    }

    pub fn end(&self) -> Result<()> {
        self.storage.remove_item(SESSION_KEY)?;
        log::info!("session ended");
        Ok(())
    }
}

/// Never fails: an unreadable marker counts as logged out.
pub fn guard<S: Storage>(storage: &S) -> SessionState {
    match Session::new(storage.clone()).current() {
        Ok(Some(account)) => SessionState::Authenticated(account),
        Ok(None) => SessionState::Unauthenticated,
        Err(err) => {
            log::error!("error reading session marker: {}", err);
            SessionState::Unauthenticated
        }
    }
}
