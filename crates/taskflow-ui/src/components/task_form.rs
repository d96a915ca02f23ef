use taskflow_core::draft::TaskFormDraft;
use taskflow_core::{
  NewTask,
  Priority
};
use web_sys::{
  HtmlInputElement,
  HtmlSelectElement,
  HtmlTextAreaElement
};
use yew::{
  Callback,
  Html,
  Properties,
  SubmitEvent,
  TargetCast,
  function_component,
  html,
  use_state
};

use super::Settle;

#[derive(Properties, PartialEq)]
pub struct TaskFormProps {
  pub on_submit:
    Callback<(NewTask, Settle)>
}

#[function_component(TaskForm)]
pub fn task_form(
  props: &TaskFormProps
) -> Html {
  let draft =
    use_state(TaskFormDraft::default);

  if !draft.is_visible() {
    let on_open = {
      let draft = draft.clone();
      Callback::from(move |_| {
        let mut next = (*draft).clone();
        next.open();
        draft.set(next);
      })
    };
    return html! {
        <button class="btn primary add-task" type="button" onclick={on_open}>
            { "+ Add New Task" }
        </button>
    };
  }

  let on_title = {
    let draft = draft.clone();
    Callback::from(
      move |e: yew::InputEvent| {
        let input: HtmlInputElement =
          e.target_unchecked_into();
        let mut next = (*draft).clone();
        next.title = input.value();
        draft.set(next);
      }
    )
  };

  let on_description = {
    let draft = draft.clone();
    Callback::from(
      move |e: yew::InputEvent| {
        let input: HtmlTextAreaElement =
          e.target_unchecked_into();
        let mut next = (*draft).clone();
        next.description = input.value();
        draft.set(next);
      }
    )
  };

  let on_priority = {
    let draft = draft.clone();
    Callback::from(
      move |e: yew::Event| {
        let select: HtmlSelectElement =
          e.target_unchecked_into();
        if let Ok(priority) = select
          .value()
          .parse::<Priority>()
        {
          let mut next =
            (*draft).clone();
          next.priority = priority;
          draft.set(next);
        }
      }
    )
  };

  let on_submit = {
    let draft = draft.clone();
    let on_submit =
      props.on_submit.clone();
    Callback::from(
      move |e: SubmitEvent| {
        e.prevent_default();
        let mut next = (*draft).clone();
        let Some(task) =
          next.begin_submit()
        else {
          return;
        };
        draft.set(next);

        let settle = {
          let draft = draft.clone();
          Callback::from(move |_| {
            let mut done =
              (*draft).clone();
            done.finish_submit();
            draft.set(done);
          })
        };
        on_submit.emit((task, settle));
      }
    )
  };

  let on_cancel = {
    let draft = draft.clone();
    Callback::from(move |_| {
      let mut next = (*draft).clone();
      next.cancel();
      draft.set(next);
    })
  };

  let disabled = draft.inputs_disabled();

  html! {
      <form class="panel task-form" onsubmit={on_submit}>
          <div class="header">{ "Create New Task" }</div>
          <label class="field">
              <span>{ "Title *" }</span>
              <input
                  type="text"
                  placeholder="What needs to be done?"
                  value={draft.title.clone()}
                  oninput={on_title}
                  disabled={disabled}
                  required=true
              />
          </label>
          <label class="field">
              <span>{ "Description" }</span>
              <textarea
                  rows="3"
                  placeholder="Add more details (optional)"
                  value={draft.description.clone()}
                  oninput={on_description}
                  disabled={disabled}
              />
          </label>
          <label class="field">
              <span>{ "Priority" }</span>
              <select onchange={on_priority} disabled={disabled}>
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
              <button class="btn primary" type="submit" disabled={!draft.can_submit()}>
                  { if draft.is_submitting() { "Adding..." } else { "Add Task" } }
              </button>
              <button class="btn" type="button" onclick={on_cancel} disabled={disabled}>
                  { "Cancel" }
              </button>
          </div>
      </form>
  }
}
