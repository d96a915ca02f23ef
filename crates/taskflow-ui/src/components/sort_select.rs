use taskflow_core::SortOrder;
use web_sys::HtmlSelectElement;
use yew::{
  Callback,
  Html,
  Properties,
  TargetCast,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct SortSelectProps {
  pub value:     SortOrder,
  pub on_change: Callback<SortOrder>
}

#[function_component(SortSelect)]
pub fn sort_select(
  props: &SortSelectProps
) -> Html {
  let onchange = {
    let on_change =
      props.on_change.clone();
    Callback::from(
      move |e: yew::Event| {
        let select: HtmlSelectElement =
          e.target_unchecked_into();
        if let Some(order) =
          SortOrder::parse(&select.value())
        {
          on_change.emit(order);
        }
      }
    )
  };

  html! {
      <label class="sort-select">
          <span>{ "Sort by" }</span>
          <select {onchange}>
              {
                  for SortOrder::ALL.iter().map(|order| html! {
                      <option value={order.as_str()} selected={*order == props.value}>
                          { order.label() }
                      </option>
                  })
              }
          </select>
      </label>
  }
}
