use yew::{
  Callback,
  Html,
  MouseEvent,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct TopBarProps {
  pub email:       String,
  pub on_sign_out: Callback<MouseEvent>
}

#[function_component(TopBar)]
pub fn top_bar(
  props: &TopBarProps
) -> Html {
  html! {
      <header class="top-bar">
          <span class="brand">{ "TaskFlow" }</span>
          <div class="account">
              <span class="email">{ props.email.clone() }</span>
              <button class="btn" type="button" onclick={props.on_sign_out.clone()}>
                  { "Sign Out" }
              </button>
          </div>
      </header>
  }
}
