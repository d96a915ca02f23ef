use taskflow_core::Session;
use web_sys::HtmlInputElement;
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

use crate::api::BackendHandle;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
)]
enum AuthMode {
  SignIn,
  SignUp
}

impl AuthMode {
  fn heading(self) -> &'static str {
    match self {
      | AuthMode::SignIn => "Sign in to TaskFlow",
      | AuthMode::SignUp => {
        "Create your TaskFlow account"
      }
    }
  }

  fn submit_label(
    self,
    busy: bool
  ) -> &'static str {
    match (self, busy) {
      | (AuthMode::SignIn, false) => {
        "Sign In"
      }
      | (AuthMode::SignIn, true) => {
        "Signing in..."
      }
      | (AuthMode::SignUp, false) => {
        "Sign Up"
      }
      | (AuthMode::SignUp, true) => {
        "Creating account..."
      }
    }
  }

  fn toggle_prompt(
    self
  ) -> &'static str {
    match self {
      | AuthMode::SignIn => {
        "Need an account? Sign up"
      }
      | AuthMode::SignUp => {
        "Already have an account? Sign \
         in"
      }
    }
  }

  fn flipped(self) -> Self {
    match self {
      | AuthMode::SignIn => {
        AuthMode::SignUp
      }
      | AuthMode::SignUp => {
        AuthMode::SignIn
      }
    }
  }
}

#[derive(Properties, PartialEq)]
pub struct SignInProps {
  pub backend:    BackendHandle,
  pub on_session: Callback<Session>
}

#[function_component(SignIn)]
pub fn sign_in(
  props: &SignInProps
) -> Html {
  let mode = use_state(|| AuthMode::SignIn);
  let email = use_state(String::new);
  let password = use_state(String::new);
  let busy = use_state(|| false);
  let message =
    use_state(|| None::<String>);

  let on_email = {
    let email = email.clone();
    Callback::from(
      move |e: yew::InputEvent| {
        let input: HtmlInputElement =
          e.target_unchecked_into();
        email.set(input.value());
      }
    )
  };

  let on_password = {
    let password = password.clone();
    Callback::from(
      move |e: yew::InputEvent| {
        let input: HtmlInputElement =
          e.target_unchecked_into();
        password.set(input.value());
      }
    )
  };

  let on_submit = {
    let mode = mode.clone();
    let email = email.clone();
    let password = password.clone();
    let busy = busy.clone();
    let message = message.clone();
    let backend = props.backend.clone();
    let on_session =
      props.on_session.clone();
    Callback::from(
      move |e: SubmitEvent| {
        e.prevent_default();
        if *busy {
          return;
        }
        busy.set(true);
        message.set(None);

        let mode = *mode;
        let email = (*email).clone();
        let password = (*password).clone();
        let busy = busy.clone();
        let message = message.clone();
        let backend = backend.clone();
        let on_session =
          on_session.clone();

        wasm_bindgen_futures::spawn_local(
          async move {
            let result = match mode {
              | AuthMode::SignIn => {
                backend
                  .auth
                  .sign_in_with_password(
                    &email, &password
                  )
                  .await
              }
              | AuthMode::SignUp => {
                backend
                  .auth
                  .sign_up(
                    &email, &password
                  )
                  .await
              }
            };

            busy.set(false);
            match result {
              | Ok(session) => {
                on_session.emit(session)
              }
              | Err(err) => {
                tracing::warn!(error = %err, "authentication failed");
                message.set(Some(
                  err.to_string()
                ));
              }
            }
          }
        );
      }
    )
  };

  let on_toggle = {
    let mode = mode.clone();
    let message = message.clone();
    Callback::from(move |_| {
      mode.set(mode.flipped());
      message.set(None);
    })
  };

  html! {
      <div class="auth-shell">
          <form class="panel auth-card" onsubmit={on_submit}>
              <div class="brand">{ "TaskFlow" }</div>
              <div class="header">{ mode.heading() }</div>
              <label class="field">
                  <span>{ "Email" }</span>
                  <input
                      type="email"
                      autocomplete="email"
                      value={(*email).clone()}
                      oninput={on_email}
                      disabled={*busy}
                      required=true
                  />
              </label>
              <label class="field">
                  <span>{ "Password" }</span>
                  <input
                      type="password"
                      autocomplete="current-password"
                      value={(*password).clone()}
                      oninput={on_password}
                      disabled={*busy}
                      required=true
                  />
              </label>
              {
                  match (*message).clone() {
                      Some(text) => html! { <div class="auth-error" role="alert">{ text }</div> },
                      None => html! {}
                  }
              }
              <div class="footer">
                  <button class="btn primary" type="submit" disabled={*busy}>
                      { mode.submit_label(*busy) }
                  </button>
                  <button class="btn link" type="button" onclick={on_toggle} disabled={*busy}>
                      { mode.toggle_prompt() }
                  </button>
              </div>
          </form>
      </div>
  }
}
