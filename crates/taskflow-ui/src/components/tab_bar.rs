use taskflow_core::view::TabCounts;
use taskflow_core::Tab;
use yew::{
  Callback,
  Html,
  Properties,
  classes,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct TabBarProps {
  pub active:    Tab,
  pub counts:    TabCounts,
  pub on_select: Callback<Tab>
}

#[function_component(TabBar)]
pub fn tab_bar(
  props: &TabBarProps
) -> Html {
  html! {
      <div class="tab-bar" role="tablist">
          {
              for Tab::ALL.iter().map(|tab| {
                  let tab = *tab;
                  let on_select = props.on_select.clone();
                  let onclick = Callback::from(move |_| on_select.emit(tab));
                  html! {
                      <button
                          class={classes!("tab", (tab == props.active).then_some("active"))}
                          type="button"
                          role="tab"
                          aria-selected={(tab == props.active).to_string()}
                          {onclick}
                      >
                          { tab.label() }
                          <span class="count">{ props.counts.for_tab(tab) }</span>
                      </button>
                  }
              })
          }
      </div>
  }
}
