use crate::account::AccountId;
use crate::error::Result;
use crate::storage::{read_json, write_json, Storage, TASKS_KEY};
use crate::task::{Task, TaskDraft, TaskStatus, TaskUpdate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// On-disk envelope: `{"state":{"users":[...]},"version":0}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Persisted {
    state: PersistedState,
    #[serde(default)]
    version: u32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedState {
    #[serde(rename = "users", default)]
    tasks: Vec<Task>,
}

/// All tasks of every account, mirrored to storage after each mutation.
#[derive(Debug)]
pub struct TaskStore<S: Storage> {
    storage: S,
    tasks: Vec<Task>,
}

impl<S: Storage> TaskStore<S> {
    /// Hydrates from storage. Unreadable data starts an empty list and is
    /// overwritten by the next mutation.
    pub fn load(storage: S) -> Self {
        let tasks = match read_json::<_, Persisted>(&storage, TASKS_KEY) {
            Ok(Some(persisted)) => persisted.state.tasks,
            Ok(None) => Vec::new(),
            Err(err) => {
                log::warn!("discarding stored tasks: {}", err);
                Vec::new()
            }
        };
        log::debug!("loaded {} tasks", tasks.len());
        Self { storage, tasks }
    }

    fn save(&self) -> Result<()> {
        let persisted = Persisted {
            state: PersistedState {
                tasks: self.tasks.clone(),
            },
            version: 0,
        };
        write_json(&self.storage, TASKS_KEY, &persisted)
    }

    pub fn list(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn add(&mut self, draft: TaskDraft, owner: Option<AccountId>) -> Result<Task> {
        let task = draft.into_task(owner);
        self.tasks.push(task.clone());
        self.save()?;
        log::info!("added task {}", task.id);
        Ok(task)
    }

    /// Returns `false` when no task has this id.
    pub fn update(&mut self, id: Uuid, update: TaskUpdate) -> Result<bool> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        task.apply(update);
        self.save()?;
        log::info!("updated task {}", id);
        Ok(true)
    }

    pub fn delete(&mut self, id: Uuid) -> Result<bool> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return Ok(false);
        }
        self.save()?;
        log::info!("deleted task {}", id);
        Ok(true)
    }

    pub fn tasks_for(&self, owner: AccountId) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.is_owned_by(owner)).collect()
    }

    pub fn tasks_by_status(&self, owner: AccountId, status: TaskStatus) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.is_owned_by(owner) && t.status == status)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::task::Priority;

    fn store() -> (MemoryStorage, TaskStore<MemoryStorage>) {
        let storage = MemoryStorage::new();
        let store = TaskStore::load(storage.clone());
        (storage, store)
    }

    #[test]
    fn add_then_list_includes_task_with_owner() {
        let (storage, mut store) = store();
        let first = store.add(TaskDraft::new("one"), Some(1)).unwrap();
        let second = store.add(TaskDraft::new("two"), Some(1)).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.list().len(), 2);
        assert!(store.list().contains(&first));
        assert_eq!(store.get(first.id).and_then(|t| t.user_id), Some(1));

        let reloaded = TaskStore::load(storage);
        assert_eq!(reloaded.list(), store.list());
    }

    #[test]
    fn update_changes_only_named_fields() {
        let (_, mut store) = store();
        let task = store
            .add(
                TaskDraft {
                    priority: Priority::High,
                    duedate: "2026-12-01".to_string(),
                    ..TaskDraft::new("ship")
                },
                Some(1),
            )
            .unwrap();

        assert!(store
            .update(task.id, TaskUpdate::status(TaskStatus::Completed))
            .unwrap());

        let updated = store.get(task.id).unwrap();
        assert_eq!(updated.status, TaskStatus::Completed);
        assert_eq!(updated.title, "ship");
        assert_eq!(updated.priority, Priority::High);
        assert_eq!(updated.duedate, "2026-12-01");
    }

    #[test]
    fn update_unknown_id_is_noop() {
        let (storage, mut store) = store();
        store.add(TaskDraft::new("one"), Some(1)).unwrap();
        let before = storage.get_item(TASKS_KEY).unwrap();

        let changed = store
            .update(Uuid::new_v4(), TaskUpdate::status(TaskStatus::Completed))
            .unwrap();
        assert!(!changed);
        assert_eq!(storage.get_item(TASKS_KEY).unwrap(), before);
    }

    #[test]
    fn delete_removes_exactly_one() {
        let (_, mut store) = store();
        let keep = store.add(TaskDraft::new("keep"), Some(1)).unwrap();
        let gone = store.add(TaskDraft::new("drop"), Some(1)).unwrap();

        assert!(store.delete(gone.id).unwrap());
        assert_eq!(store.list(), &[keep]);
        assert!(!store.delete(gone.id).unwrap());
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn owner_filters_skip_other_and_orphaned_tasks() {
        let (_, mut store) = store();
        store.add(TaskDraft::new("mine"), Some(1)).unwrap();
        store.add(TaskDraft::new("theirs"), Some(2)).unwrap();
        store.add(TaskDraft::new("orphan"), None).unwrap();
        let done = store
            .add(
                TaskDraft {
                    status: TaskStatus::Completed,
                    ..TaskDraft::new("finished")
                },
                Some(1),
            )
            .unwrap();

        assert_eq!(store.tasks_for(1).len(), 2);
        assert_eq!(store.tasks_by_status(1, TaskStatus::Completed), vec![&done]);
        assert!(store.tasks_by_status(2, TaskStatus::Completed).is_empty());
    }

    #[test]
    fn stored_envelope_matches_persisted_shape() {
        let (storage, mut store) = store();
        store.add(TaskDraft::new("one"), Some(1)).unwrap();

        let raw = storage.get_item(TASKS_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], 0);
        assert_eq!(value["state"]["users"][0]["title"], "one");
    }

    #[test]
    fn corrupt_data_loads_empty_and_is_overwritten() {
        let storage = MemoryStorage::new();
        storage.set_item(TASKS_KEY, "[[[").unwrap();

        let mut store = TaskStore::load(storage.clone());
        assert!(store.list().is_empty());

        store.add(TaskDraft::new("fresh"), Some(1)).unwrap();
        assert_eq!(TaskStore::load(storage).list().len(), 1);
    }
}
