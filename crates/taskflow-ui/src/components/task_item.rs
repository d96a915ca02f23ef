use taskflow_core::datetime::local_completion_label;
use taskflow_core::draft::ItemMode;
use taskflow_core::{
  Priority,
  Task,
  TaskEdit
};
use uuid::Uuid;
use web_sys::{
  HtmlInputElement,
  HtmlSelectElement,
  HtmlTextAreaElement
};
use yew::{
  Callback,
  Html,
  Properties,
  TargetCast,
  classes,
  function_component,
  html,
  use_state
};

use super::Settle;

#[derive(Properties, PartialEq)]
pub struct TaskItemProps {
  pub task:      Task,
  pub on_toggle: Callback<(Uuid, bool)>,
  pub on_delete: Callback<Uuid>,
  pub on_update:
    Callback<(Uuid, TaskEdit, Settle)>
}

fn priority_class(
  priority: Priority
) -> &'static str {
  match priority {
    | Priority::High => "priority-high",
    | Priority::Medium => {
      "priority-medium"
    }
    | Priority::Low => "priority-low"
  }
}

#[function_component(TaskItem)]
pub fn task_item(
  props: &TaskItemProps
) -> Html {
  let mode = use_state(ItemMode::default);
  let task = &props.task;
  let id = task.id;

  if let Some(draft) = mode.draft() {
    let on_title = {
      let mode = mode.clone();
      Callback::from(
        move |e: yew::InputEvent| {
          let input: HtmlInputElement =
            e.target_unchecked_into();
          let mut next = (*mode).clone();
          if let Some(draft) =
            next.draft_mut()
          {
            draft.title = input.value();
          }
          mode.set(next);
        }
      )
    };

    let on_description = {
      let mode = mode.clone();
      Callback::from(
        move |e: yew::InputEvent| {
          let input: HtmlTextAreaElement =
            e.target_unchecked_into();
          let mut next = (*mode).clone();
          if let Some(draft) =
            next.draft_mut()
          {
            draft.description =
              input.value();
          }
          mode.set(next);
        }
      )
    };

    let on_priority = {
      let mode = mode.clone();
      Callback::from(
        move |e: yew::Event| {
          let select: HtmlSelectElement =
            e.target_unchecked_into();
          let Ok(priority) = select
            .value()
            .parse::<Priority>()
          else {
            return;
          };
          let mut next = (*mode).clone();
          if let Some(draft) =
            next.draft_mut()
          {
            draft.priority = priority;
          }
          mode.set(next);
        }
      )
    };

    let on_save = {
      let mode = mode.clone();
      let on_update =
        props.on_update.clone();
      Callback::from(move |_| {
        let mut next = (*mode).clone();
        let Some(edit) =
          next.begin_save()
        else {
          return;
        };
        mode.set(next);

        let settle = {
          let mode = mode.clone();
          Callback::from(move |_| {
            let mut done =
              (*mode).clone();
            done.finish_save();
            mode.set(done);
          })
        };
        on_update
          .emit((id, edit, settle));
      })
    };

    let on_cancel = {
      let mode = mode.clone();
      Callback::from(move |_| {
        let mut next = (*mode).clone();
        next.cancel();
        mode.set(next);
      })
    };

    let saving = draft.is_saving();

    return html! {
        <div class={classes!("task-item", "editing", priority_class(draft.priority))}>
            <input
                type="text"
                placeholder="Task title"
                value={draft.title.clone()}
                oninput={on_title}
                disabled={saving}
            />
            <textarea
                rows="2"
                placeholder="Task description (optional)"
                value={draft.description.clone()}
                oninput={on_description}
                disabled={saving}
            />
            <label class="inline-field">
                <span>{ "Priority:" }</span>
                <select onchange={on_priority} disabled={saving}>
                    {
                        for Priority::ALL.iter().map(|priority| html! {
                            <option
                                value={priority.as_str()}
                                selected={*priority == draft.priority}
                            >
                                { priority.label() }
                            </option>
                        })
                    }
                </select>
            </label>
            <div class="footer">
                <button class="btn primary" type="button" onclick={on_save} disabled={!draft.can_save()}>
                    { "Save" }
                </button>
                <button class="btn" type="button" onclick={on_cancel} disabled={saving}>
                    { "Cancel" }
                </button>
            </div>
        </div>
    };
  }

  let on_toggle = {
    let on_toggle =
      props.on_toggle.clone();
    let completed = !task.completed;
    Callback::from(move |_| {
      on_toggle.emit((id, completed))
    })
  };

  let on_edit = {
    let mode = mode.clone();
    let task = task.clone();
    Callback::from(move |_| {
      let mut next = (*mode).clone();
      next.begin_edit(&task);
      mode.set(next);
    })
  };

  let on_delete = {
    let on_delete =
      props.on_delete.clone();
    Callback::from(move |_| {
      on_delete.emit(id)
    })
  };

  let done_class = task
    .completed
    .then_some("done");
  let completion = task
    .completion_stamp()
    .map(local_completion_label);

  html! {
      <div class={classes!("task-item", priority_class(task.priority))}>
          <button
              class={classes!("check", task.completed.then_some("on"))}
              type="button"
              aria-label="Toggle completion"
              onclick={on_toggle}
          >
              { if task.completed { "✓" } else { "" } }
          </button>
          <div class="task-body">
              <div class="task-title-row">
                  <span class={classes!("task-title", done_class)}>{ &task.title }</span>
                  <span
                      class={classes!("dot", priority_class(task.priority))}
                      title={format!("{} priority", task.priority)}
                  ></span>
              </div>
              {
                  if task.has_description() {
                      html! {
                          <div class={classes!("task-subtitle", done_class)}>
                              { &task.description }
                          </div>
                      }
                  } else {
                      html! {}
                  }
              }
              <div class="task-meta">
                  <span class="badge">{ task.priority.caption() }</span>
                  {
                      match completion {
                          Some(label) => html! { <span class="completed-at">{ label }</span> },
                          None => html! {}
                      }
                  }
              </div>
          </div>
          <div class="task-actions">
              <button class="btn icon" type="button" title="Edit task" onclick={on_edit}>
                  { "Edit" }
              </button>
              <button class="btn icon danger" type="button" title="Delete task" onclick={on_delete}>
                  { "Delete" }
              </button>
          </div>
      </div>
  }
}
