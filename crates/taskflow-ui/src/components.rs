mod confirm_modal;
mod notice_banner;
mod sign_in;
mod sort_select;
mod tab_bar;
mod task_form;
mod task_item;
mod top_bar;

pub use confirm_modal::ConfirmModal;
pub use notice_banner::NoticeBanner;
pub use sign_in::SignIn;
pub use sort_select::SortSelect;
pub use tab_bar::TabBar;
pub use task_form::TaskForm;
pub use task_item::TaskItem;
pub use top_bar::TopBar;

use yew::Callback;

/// Fired once an async call started by a component has settled.
pub type Settle = Callback<()>;
