use serde::{
  Deserialize,
  Serialize
};
use tracing::{
  debug,
  error
};
use uuid::Uuid;

use crate::error::StoreError;
use crate::task::Task;

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
  #[default]
  Todo,
  Completed
}

impl Tab {
  pub const ALL: [Tab; 2] =
    [Tab::Todo, Tab::Completed];

  pub fn includes(
    self,
    task: &Task
  ) -> bool {
    match self {
      | Tab::Todo => !task.completed,
      | Tab::Completed => task.completed
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      | Tab::Todo => "To Do",
      | Tab::Completed => "Completed"
    }
  }

  pub fn storage_value(
    self
  ) -> &'static str {
    match self {
      | Tab::Todo => "todo",
      | Tab::Completed => "completed"
    }
  }

  pub fn from_storage(
    value: &str
  ) -> Self {
    match value {
      | "completed" => Tab::Completed,
      | _ => Tab::Todo
    }
  }

  pub fn empty_title(
    self
  ) -> &'static str {
    match self {
      | Tab::Todo => "No tasks yet",
      | Tab::Completed => {
        "No completed tasks"
      }
    }
  }

  pub fn empty_hint(
    self
  ) -> &'static str {
    match self {
      | Tab::Todo => {
        "Create your first task to \
         get started"
      }
      | Tab::Completed => {
        "Complete tasks to see them \
         here"
      }
    }
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
  /// Store order: newest first.
  #[default]
  Default,
  PriorityHigh,
  PriorityLow
}

impl SortOrder {
  pub const ALL: [SortOrder; 3] = [
    SortOrder::Default,
    SortOrder::PriorityHigh,
    SortOrder::PriorityLow
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      | SortOrder::Default => "default",
      | SortOrder::PriorityHigh => {
        "priority-high"
      }
      | SortOrder::PriorityLow => {
        "priority-low"
      }
    }
  }

  pub fn parse(
    value: &str
  ) -> Option<Self> {
    match value.trim() {
      | "default" => {
        Some(SortOrder::Default)
      }
      | "priority-high" => {
        Some(SortOrder::PriorityHigh)
      }
      | "priority-low" => {
        Some(SortOrder::PriorityLow)
      }
      | _ => None
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      | SortOrder::Default => {
        "Newest first"
      }
      | SortOrder::PriorityHigh => {
        "Priority: high to low"
      }
      | SortOrder::PriorityLow => {
        "Priority: low to high"
      }
    }
  }
}

/// Stable: equal priorities keep their incoming order.
pub fn sort_tasks(
  tasks: &mut [&Task],
  order: SortOrder
) {
  match order {
    | SortOrder::Default => {}
    | SortOrder::PriorityHigh => {
      tasks.sort_by(|a, b| {
        b.priority
          .rank()
          .cmp(&a.priority.rank())
      })
    }
    | SortOrder::PriorityLow => {
      tasks.sort_by_key(|task| {
        task.priority.rank()
      })
    }
  }
}

pub fn visible_tasks(
  tasks: &[Task],
  tab: Tab,
  order: SortOrder
) -> Vec<&Task> {
  let mut visible: Vec<&Task> = tasks
    .iter()
    .filter(|task| tab.includes(task))
    .collect();
  sort_tasks(&mut visible, order);
  visible
}

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
)]
pub struct TabCounts {
  pub todo:      usize,
  pub completed: usize
}

impl TabCounts {
  pub fn for_tab(
    self,
    tab: Tab
  ) -> usize {
    match tab {
      | Tab::Todo => self.todo,
      | Tab::Completed => self.completed
    }
  }
}

pub fn tab_counts(
  tasks: &[Task]
) -> TabCounts {
  let completed = tasks
    .iter()
    .filter(|task| task.completed)
    .count();
  TabCounts {
    todo: tasks.len() - completed,
    completed
  }
}

/// Non-blocking message shown above the task list.
#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub struct Notice {
  pub message: String,
  pub auth:    bool
}

impl Notice {
  pub fn from_error(
    context: &str,
    err: &StoreError
  ) -> Self {
    Self {
      message: format!(
        "{context}: {err}"
      ),
      auth:    err.is_auth_error()
    }
  }
}

/// Board transition, produced by user input or by a finished store call.
#[derive(Debug)]
pub enum BoardEvent {
  BeginRefresh,
  Refreshed(Result<Vec<Task>, StoreError>),
  Written {
    context: &'static str,
    result:  Result<(), StoreError>
  },
  SetTab(Tab),
  SetSort(SortOrder),
  DismissNotice
}

/// In-memory view of the signed-in user's tasks.
#[derive(
  Debug, Clone, Default, PartialEq,
)]
pub struct BoardState {
  tasks:   Vec<Task>,
  loading: bool,
  tab:     Tab,
  sort:    SortOrder,
  notice:  Option<Notice>
}

impl BoardState {
  pub fn new(sort: SortOrder) -> Self {
    Self {
      sort,
      ..Self::default()
    }
  }

  pub fn tasks(&self) -> &[Task] {
    &self.tasks
  }

  pub fn loading(&self) -> bool {
    self.loading
  }

  pub fn tab(&self) -> Tab {
    self.tab
  }

  pub fn sort(&self) -> SortOrder {
    self.sort
  }

  pub fn notice(
    &self
  ) -> Option<&Notice> {
    self.notice.as_ref()
  }

  pub fn task(
    &self,
    id: Uuid
  ) -> Option<&Task> {
    self
      .tasks
      .iter()
      .find(|task| task.id == id)
  }

  pub fn set_tab(&mut self, tab: Tab) {
    debug!(tab = tab.storage_value(), "tab changed");
    self.tab = tab;
  }

  pub fn set_sort(
    &mut self,
    sort: SortOrder
  ) {
    debug!(sort = sort.as_str(), "sort order changed");
    self.sort = sort;
  }

  pub fn begin_refresh(&mut self) {
    self.loading = true;
  }

  /// Applies a list result. A failed list keeps the previous tasks on
  /// screen.
  pub fn finish_refresh(
    &mut self,
    result: Result<Vec<Task>, StoreError>
  ) {
    self.loading = false;
    match result {
      | Ok(tasks) => {
        debug!(
          total = tasks.len(),
          "task list replaced"
        );
        self.tasks = tasks;
      }
      | Err(err) => {
        error!(error = %err, "task list refresh failed");
        self.notice = Some(
          Notice::from_error(
            "Could not load tasks",
            &err
          )
        );
      }
    }
  }

  /// Applies the outcome of a write. A saved write starts the re-list, so
  /// `loading` stays up until [`BoardState::finish_refresh`].
  pub fn finish_write(
    &mut self,
    context: &str,
    result: Result<(), StoreError>
  ) {
    match result {
      | Ok(()) => {
        debug!(context, "write saved; refetching");
        self.loading = true;
      }
      | Err(err) => {
        error!(context, error = %err, "task write failed");
        self.notice = Some(
          Notice::from_error(
            context, &err
          )
        );
      }
    }
  }

  /// Single entry point for everything that changes the board.
  pub fn apply(
    &mut self,
    event: BoardEvent
  ) {
    match event {
      | BoardEvent::BeginRefresh => {
        self.begin_refresh()
      }
      | BoardEvent::Refreshed(result) => {
        self.finish_refresh(result)
      }
      | BoardEvent::Written {
        context,
        result
      } => {
        self.finish_write(
          context, result
        )
      }
      | BoardEvent::SetTab(tab) => {
        self.set_tab(tab)
      }
      | BoardEvent::SetSort(sort) => {
        self.set_sort(sort)
      }
      | BoardEvent::DismissNotice => {
        self.dismiss_notice()
      }
    }
  }

  pub fn dismiss_notice(&mut self) {
    self.notice = None;
  }

  pub fn visible(&self) -> Vec<&Task> {
    visible_tasks(
      &self.tasks,
      self.tab,
      self.sort
    )
  }

  pub fn counts(&self) -> TabCounts {
    tab_counts(&self.tasks)
  }
}

#[cfg(test)]
mod tests {
  use chrono::{
    Duration,
    TimeZone,
    Utc
  };
  use uuid::Uuid;

  use super::*;
  use crate::task::Priority;

  fn task(
    title: &str,
    priority: Priority,
    completed: bool,
    age_minutes: i64
  ) -> Task {
    let base = Utc
      .with_ymd_and_hms(
        2024, 1, 15, 12, 0, 0
      )
      .single()
      .expect("valid base");
    Task {
      id: Uuid::new_v4(),
      user_id: Uuid::nil(),
      title: title.to_string(),
      description: String::new(),
      priority,
      completed,
      completed_at: None,
      created_at: base
        - Duration::minutes(
          age_minutes
        )
    }
  }

  fn titles(
    tasks: &[&Task]
  ) -> Vec<String> {
    tasks
      .iter()
      .map(|task| task.title.clone())
      .collect()
  }

  fn sample() -> Vec<Task> {
    vec![
      task("low-a", Priority::Low, false, 1),
      task("high-a", Priority::High, false, 2),
      task("med-a", Priority::Medium, false, 3),
      task("high-b", Priority::High, false, 4),
      task("low-b", Priority::Low, false, 5),
      task("done-med", Priority::Medium, true, 6),
    ]
  }

  #[test]
  fn priority_high_orders_tiers_and_keeps_ties_stable()
  {
    let tasks = sample();
    let visible = visible_tasks(
      &tasks,
      Tab::Todo,
      SortOrder::PriorityHigh
    );
    assert_eq!(
      titles(&visible),
      vec![
        "high-a", "high-b", "med-a",
        "low-a", "low-b"
      ]
    );
  }

  #[test]
  fn priority_low_reverses_tiers_and_keeps_ties_stable()
  {
    let tasks = sample();
    let visible = visible_tasks(
      &tasks,
      Tab::Todo,
      SortOrder::PriorityLow
    );
    assert_eq!(
      titles(&visible),
      vec![
        "low-a", "low-b", "med-a",
        "high-a", "high-b"
      ]
    );
  }

  #[test]
  fn default_order_preserves_store_order() {
    let tasks = sample();
    let visible = visible_tasks(
      &tasks,
      Tab::Todo,
      SortOrder::Default
    );
    assert_eq!(
      titles(&visible),
      vec![
        "low-a", "high-a", "med-a",
        "high-b", "low-b"
      ]
    );
  }

  #[test]
  fn every_task_lands_in_exactly_one_tab() {
    let tasks = sample();
    for task in &tasks {
      let hits = Tab::ALL
        .iter()
        .filter(|tab| tab.includes(task))
        .count();
      assert_eq!(hits, 1, "{}", task.title);
    }
    let completed = visible_tasks(
      &tasks,
      Tab::Completed,
      SortOrder::Default
    );
    assert_eq!(
      titles(&completed),
      vec!["done-med"]
    );
  }

  #[test]
  fn counts_ignore_tab_and_sort() {
    let mut state = BoardState::new(
      SortOrder::Default
    );
    state.finish_refresh(Ok(sample()));
    let expected = TabCounts {
      todo:      5,
      completed: 1
    };

    for tab in Tab::ALL {
      for sort in SortOrder::ALL {
        state.set_tab(tab);
        state.set_sort(sort);
        assert_eq!(
          state.counts(),
          expected
        );
      }
    }
    assert_eq!(
      state.counts().for_tab(
        Tab::Completed
      ),
      1
    );
  }

  #[test]
  fn failed_refresh_keeps_previous_tasks() {
    let mut state = BoardState::default();
    state.begin_refresh();
    state.finish_refresh(Ok(sample()));

    state.begin_refresh();
    assert!(state.loading());
    state.finish_refresh(Err(
      StoreError::Transport(
        "timed out".to_string()
      )
    ));

    assert!(!state.loading());
    assert_eq!(state.tasks().len(), 6);
    let notice = state
      .notice()
      .expect("notice recorded");
    assert_eq!(
      notice.message,
      "Could not load tasks: request \
       failed: timed out"
    );
    assert!(!notice.auth);

    state.dismiss_notice();
    assert!(state.notice().is_none());
  }

  #[test]
  fn sort_order_round_trips_through_names() {
    for order in SortOrder::ALL {
      assert_eq!(
        SortOrder::parse(order.as_str()),
        Some(order)
      );
    }
    assert_eq!(
      SortOrder::parse("alphabetical"),
      None
    );
  }

  #[test]
  fn saved_write_holds_loading_until_relist()
  {
    let mut state = BoardState::default();
    state.apply(BoardEvent::Refreshed(
      Ok(sample())
    ));

    state.apply(BoardEvent::Written {
      context: "Could not add task",
      result:  Ok(())
    });
    assert!(state.loading());
    assert!(state.notice().is_none());

    state.apply(BoardEvent::Refreshed(
      Ok(Vec::new())
    ));
    assert!(!state.loading());
    assert!(state.tasks().is_empty());
  }

  #[test]
  fn failed_write_keeps_tasks_and_names_the_action()
  {
    let mut state = BoardState::default();
    state.apply(BoardEvent::Refreshed(
      Ok(sample())
    ));

    state.apply(BoardEvent::Written {
      context: "Could not delete task",
      result:  Err(StoreError::Rejected {
        status:  401,
        message: "JWT expired".to_string()
      })
    });
    assert!(!state.loading());
    assert_eq!(state.tasks().len(), 6);
    let notice = state
      .notice()
      .expect("notice recorded");
    assert!(
      notice
        .message
        .starts_with("Could not delete task")
    );
    assert!(notice.auth);
  }
}
