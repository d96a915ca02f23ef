pub mod config;
pub mod confirm;
pub mod datetime;
pub mod draft;
pub mod error;
pub mod flow;
pub mod memory;
pub mod store;
pub mod task;
pub mod view;

pub use error::{
  StoreError,
  StoreResult
};
pub use flow::Mutation;
pub use store::{
  CompletedAtPolicy,
  Session,
  TaskStore,
  TaskSync
};
pub use task::{
  NewTask,
  Priority,
  Task,
  TaskEdit
};
pub use view::{
  BoardEvent,
  BoardState,
  SortOrder,
  Tab
};
