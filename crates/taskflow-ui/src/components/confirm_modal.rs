use taskflow_core::confirm::{
  ConfirmPrompt,
  PromptTrigger
};
use yew::{
  Callback,
  Html,
  MouseEvent,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct ConfirmModalProps {
  pub is_open:   bool,
  pub prompt:    ConfirmPrompt,
  pub on_choice: Callback<PromptTrigger>
}

#[function_component(ConfirmModal)]
pub fn confirm_modal(
  props: &ConfirmModalProps
) -> Html {
  if !props.is_open {
    return html! {};
  }

  let emit = |trigger: PromptTrigger| {
    let on_choice =
      props.on_choice.clone();
    Callback::from(
      move |_: MouseEvent| {
        on_choice.emit(trigger)
      }
    )
  };

  html! {
      <div class="modal-backdrop" onclick={emit(PromptTrigger::Backdrop)}>
          <div class="modal modal-sm" onclick={Callback::from(|e: MouseEvent| e.stop_propagation())}>
              <button
                  class="modal-dismiss"
                  type="button"
                  aria-label="Close"
                  onclick={emit(PromptTrigger::DismissControl)}
              >
                  { "×" }
              </button>
              <div class="header">{ &props.prompt.title }</div>
              <div class="content">{ &props.prompt.message }</div>
              <div class="footer">
                  <button
                      class="btn"
                      type="button"
                      onclick={emit(PromptTrigger::CancelButton)}
                  >
                      { props.prompt.cancel_label() }
                  </button>
                  <button
                      class="btn danger"
                      type="button"
                      onclick={emit(PromptTrigger::ConfirmButton)}
                  >
                      { props.prompt.confirm_label() }
                  </button>
              </div>
          </div>
      </div>
  }
}
