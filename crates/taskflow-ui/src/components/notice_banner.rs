use gloo::timers::callback::Timeout;
use taskflow_core::view::Notice;
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html,
  use_effect_with
};

const AUTO_DISMISS_MS: u32 = 6_000;

#[derive(Properties, PartialEq)]
pub struct NoticeBannerProps {
  pub notice:     Option<Notice>,
  pub on_dismiss: Callback<()>,
  #[prop_or_default]
  pub on_reauth:  Callback<()>
}

#[function_component(NoticeBanner)]
pub fn notice_banner(
  props: &NoticeBannerProps
) -> Html {
  {
    let on_dismiss =
      props.on_dismiss.clone();
    use_effect_with(
      props.notice.clone(),
      move |notice| {
        // Auth notices stay up until the user acts on them.
        let timer = notice
          .as_ref()
          .filter(|notice| !notice.auth)
          .map(|_| {
            Timeout::new(
              AUTO_DISMISS_MS,
              move || on_dismiss.emit(())
            )
          });
        move || drop(timer)
      }
    );
  }

  let Some(notice) = props.notice.as_ref()
  else {
    return html! {};
  };

  let dismiss = {
    let on_dismiss =
      props.on_dismiss.clone();
    Callback::from(move |_| {
      on_dismiss.emit(())
    })
  };
  let reauth = {
    let on_reauth =
      props.on_reauth.clone();
    Callback::from(move |_| {
      on_reauth.emit(())
    })
  };

  html! {
      <div class="notice" role="alert">
          <span class="message">{ notice.message.clone() }</span>
          {
              if notice.auth {
                  html! {
                      <button class="btn" type="button" onclick={reauth}>
                          { "Sign in again" }
                      </button>
                  }
              } else {
                  html! {}
              }
          }
          <button class="btn icon" type="button" aria-label="Dismiss" onclick={dismiss}>
              { "×" }
          </button>
      </div>
  }
}
