//! Screen state and the operations each screen performs.

use crate::account::{Account, AccountDirectory, AccountId};
use crate::error::{Error, Result};
use crate::session::{guard, Session, SessionState};
use crate::stats::DashboardStats;
use crate::storage::Storage;
use crate::task::{Task, TaskDraft, TaskStatus, TaskUpdate};
use crate::task_store::TaskStore;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Auth,
    Dashboard,
    Tasks,
    Profile,
}

impl Screen {
    pub fn is_protected(&self) -> bool {
        !matches!(self, Self::Auth)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Signup,
    Login,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// Read-only view of the logged-in account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    pub name: String,
    pub email: String,
    pub initial: char,
    pub member_since: String,
}

impl ProfileView {
    pub fn from_account(account: &Account) -> Self {
        let name = if account.name.is_empty() {
            "User".to_string()
        } else {
            account.name.clone()
        };
        let email = if account.email.is_empty() {
            "No email provided".to_string()
        } else {
            account.email.clone()
        };
        let initial = account
            .name
            .chars()
            .next()
            .and_then(|c| c.to_uppercase().next())
            .unwrap_or('U');
        Self {
            name,
            email,
            initial,
            member_since: account.created_at.format("%B %-d, %Y").to_string(),
        }
    }
}

pub struct App<S: Storage> {
    storage: S,
    directory: AccountDirectory<S>,
    session: Session<S>,
    tasks: TaskStore<S>,
    current: Option<Account>,
    pub screen: Screen,
    pub auth_mode: AuthMode,
    pub notice: Option<Notice>,
    pub selected_status: usize,
    pub selected_task: usize,
}

impl<S: Storage> App<S> {
    /// Opens the dashboard directly when a session is already stored.
    pub fn new(storage: S) -> Self {
        let mut app = Self {
            directory: AccountDirectory::new(storage.clone()),
            session: Session::new(storage.clone()),
            tasks: TaskStore::load(storage.clone()),
            storage,
            current: None,
            screen: Screen::Auth,
            auth_mode: AuthMode::default(),
            notice: None,
            selected_status: 0,
            selected_task: 0,
        };
        if let SessionState::Authenticated(account) = guard(&app.storage) {
            app.current = Some(account);
            app.screen = Screen::Dashboard;
        }
        app
    }

    pub fn account(&self) -> Option<&Account> {
        self.current.as_ref()
    }

    fn report<T>(&mut self, result: Result<T>, success: &str) -> Result<T> {
        match &result {
            Ok(_) => self.notice = Some(Notice::Success(success.to_string())),
            Err(err) => {
                if matches!(err, Error::Io(_) | Error::Corrupted { .. } | Error::Serialize(_)) {
                    log::error!("{}", err);
                }
                self.notice = Some(Notice::Error(err.user_message()));
            }
        }
        result
    }

    pub fn signup(&mut self, name: &str, email: &str, password: &str) -> Result<Account> {
        let result = self.directory.register(name, email, password);
        if result.is_ok() {
            self.auth_mode = AuthMode::Login;
        }
        self.report(result, "Account created successfully! Please login.")
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<Account> {
        let result = self.try_login(email, password);
        self.report(result, "Welcome back!")
    }

    fn try_login(&mut self, email: &str, password: &str) -> Result<Account> {
        let account = self
            .directory
            .authenticate(email, password)?
            .ok_or(Error::InvalidCredentials)?;
        self.session.establish(&account)?;
        self.current = Some(account.clone());
        self.screen = Screen::Dashboard;
        Ok(account)
    }

    pub fn logout(&mut self) -> Result<()> {
        let result = self.session.end();
        self.current = None;
        self.screen = Screen::Auth;
        self.selected_status = 0;
        self.selected_task = 0;
        self.report(result, "Logged out successfully")
    }

    /// Protected screens re-check the stored session and fall back to the
    /// entry screen without one.
    pub fn navigate(&mut self, screen: Screen) -> bool {
        if !screen.is_protected() {
            self.screen = screen;
            return true;
        }
        match guard(&self.storage) {
            SessionState::Authenticated(account) => {
                self.current = Some(account);
                self.screen = screen;
                true
            }
            SessionState::Unauthenticated => {
                self.current = None;
                self.screen = Screen::Auth;
                false
            }
        }
    }

    fn owner(&self) -> Result<AccountId> {
        self.current
            .as_ref()
            .map(|a| a.id)
            .ok_or(Error::NotAuthenticated)
    }

    pub fn add_task(&mut self, draft: TaskDraft) -> Result<Task> {
        let result = self
            .owner()
            .and_then(|owner| self.tasks.add(draft, Some(owner)));
        self.report(result, "Task added!")
    }

    /// Tasks of other accounts are treated as unknown ids.
    fn owned_task(&self, id: Uuid) -> Result<Option<&Task>> {
        let owner = self.owner()?;
        Ok(self.tasks.get(id).filter(|t| t.is_owned_by(owner)))
    }

    /// A no-op leaves the current notice untouched.
    fn report_change(&mut self, result: Result<bool>, success: &str) -> Result<bool> {
        if matches!(result, Ok(false)) {
            log::debug!("no matching task for {}", success);
            return result;
        }
        self.report(result, success)
    }

    pub fn update_task(&mut self, id: Uuid, update: TaskUpdate) -> Result<bool> {
        let result = match self.owned_task(id).map(|t| t.is_some()) {
            Ok(true) => self.tasks.update(id, update),
            Ok(false) => Ok(false),
            Err(err) => Err(err),
        };
        self.report_change(result, "Task updated!")
    }

    pub fn delete_task(&mut self, id: Uuid) -> Result<bool> {
        let result = match self.owned_task(id).map(|t| t.is_some()) {
            Ok(true) => self.tasks.delete(id),
            Ok(false) => Ok(false),
            Err(err) => Err(err),
        };
        self.clamp_selection();
        self.report_change(result, "Task deleted")
    }

    /// Moves the task one column toward completed.
    pub fn advance_task(&mut self, id: Uuid) -> Result<bool> {
        let result = match self.owned_task(id).map(|t| t.map(|t| t.status)) {
            Ok(Some(status)) => self.tasks.update(id, TaskUpdate::status(status.next())),
            Ok(None) => Ok(false),
            Err(err) => Err(err),
        };
        self.clamp_selection();
        self.report_change(result, "Task updated!")
    }

    pub fn tasks(&self) -> Vec<&Task> {
        match &self.current {
            Some(account) => self.tasks.tasks_for(account.id),
            None => Vec::new(),
        }
    }

    pub fn column(&self, status: TaskStatus) -> Vec<&Task> {
        match &self.current {
            Some(account) => self.tasks.tasks_by_status(account.id, status),
            None => Vec::new(),
        }
    }

    pub fn selected_column(&self) -> TaskStatus {
        TaskStatus::ALL[self.selected_status]
    }

    pub fn selected(&self) -> Option<&Task> {
        self.column(self.selected_column())
            .get(self.selected_task)
            .copied()
    }

    pub fn select_left(&mut self) {
        if self.selected_status > 0 {
            self.selected_status -= 1;
            self.clamp_selection();
        }
    }

    pub fn select_right(&mut self) {
        if self.selected_status < TaskStatus::ALL.len() - 1 {
            self.selected_status += 1;
            self.clamp_selection();
        }
    }

    pub fn select_up(&mut self) {
        if self.selected_task > 0 {
            self.selected_task -= 1;
        }
    }

    pub fn select_down(&mut self) {
        let max_tasks = self.column(self.selected_column()).len();
        if self.selected_task + 1 < max_tasks {
            self.selected_task += 1;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.column(self.selected_column()).len();
        self.selected_task = self.selected_task.min(len.saturating_sub(1));
    }

    pub fn dashboard(&self) -> Option<DashboardStats> {
        self.current
            .as_ref()
            .map(|account| DashboardStats::compute(self.tasks.list(), account.id))
    }

    pub fn profile(&self) -> Option<ProfileView> {
        self.current.as_ref().map(ProfileView::from_account)
    }
}
