//! Dashboard figures, recomputed from the owner's tasks on every render.

use crate::account::AccountId;
use crate::task::{Priority, Task, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSlice {
    pub label: &'static str,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub high_priority: usize,
    /// Counts for low, medium and high.
    pub priority_histogram: [usize; 3],
    /// To Do, Pending, Done.
    pub status_breakdown: [StatusSlice; 3],
}

impl DashboardStats {
    pub fn compute<'a, I>(tasks: I, owner: AccountId) -> Self
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let owned: Vec<&Task> = tasks.into_iter().filter(|t| t.is_owned_by(owner)).collect();
        let by_status = |status: TaskStatus| owned.iter().filter(|t| t.status == status).count();
        let by_priority = |priority: Priority| owned.iter().filter(|t| t.priority == priority).count();

        let todo = by_status(TaskStatus::Todo);
        let in_progress = by_status(TaskStatus::InProgress);
        let completed = by_status(TaskStatus::Completed);

        // Keep the chart non-empty when the owner has nothing yet.
        let todo_slice = if owned.is_empty() { 1 } else { todo };

        Self {
            total: owned.len(),
            completed,
            in_progress,
            high_priority: by_priority(Priority::High),
            priority_histogram: Priority::ALL.map(by_priority),
            status_breakdown: [
                StatusSlice {
                    label: "To Do",
                    value: todo_slice,
                },
                StatusSlice {
                    label: "Pending",
                    value: in_progress,
                },
                StatusSlice {
                    label: "Done",
                    value: completed,
                },
            ],
        }
    }

    /// Share of owned tasks that are completed, 0 when there are none.
    pub fn completion_percent(&self) -> u16 {
        if self.total == 0 {
            return 0;
        }
        (self.completed * 100 / self.total) as u16
    }
}
