use std::rc::Rc;

use chrono::Utc;
use taskflow_backend::RestTaskStore;
use taskflow_core::confirm::{
  ConfirmPrompt,
  DeleteGate,
  PromptTrigger
};
use taskflow_core::flow::{
  self,
  Mutation
};
use taskflow_core::{
  BoardEvent,
  BoardState,
  NewTask,
  Session,
  SortOrder,
  Tab,
  TaskEdit,
  TaskSync
};
use uuid::Uuid;
use yew::{
  Callback,
  Html,
  Properties,
  Reducible,
  UseReducerHandle,
  function_component,
  html,
  use_effect_with,
  use_memo,
  use_reducer,
  use_state
};

use crate::api::{
  self,
  Backend,
  BackendHandle
};
use crate::components::{
  ConfirmModal,
  NoticeBanner,
  Settle,
  SignIn,
  SortSelect,
  TabBar,
  TaskForm,
  TaskItem,
  TopBar
};

#[derive(Clone, PartialEq)]
struct Board(BoardState);

impl Reducible for Board {
  type Action = BoardEvent;

  fn reduce(
    self: Rc<Self>,
    event: BoardEvent
  ) -> Rc<Self> {
    let mut next = self.0.clone();
    next.apply(event);
    Rc::new(Board(next))
  }
}

/// Runs one write plus its re-list in the background, then settles the
/// originating form.
fn run_mutation(
  board: UseReducerHandle<Board>,
  sync: TaskSync<RestTaskStore>,
  mutation: Mutation,
  settle: Option<Settle>
) {
  wasm_bindgen_futures::spawn_local(
    async move {
      flow::mutate(
        &sync,
        mutation,
        |event| board.dispatch(event)
      )
      .await;
      if let Some(settle) = settle {
        settle.emit(());
      }
    }
  );
}

/// Stored session, refreshed when it has expired. A failed refresh drops
/// it.
async fn restore_session(
  backend: &Backend
) -> Option<Session> {
  let stored = api::load_session()?;
  if !stored.is_expired(Utc::now()) {
    return Some(stored);
  }

  match backend.auth.refresh(&stored).await
  {
    | Ok(fresh) => {
      tracing::info!(user_id = %fresh.user_id, "session refreshed");
      api::save_session(&fresh);
      Some(fresh)
    }
    | Err(err) => {
      tracing::warn!(error = %err, "session refresh failed; signing out");
      api::clear_session();
      None
    }
  }
}

#[function_component(App)]
pub fn app() -> Html {
  let backend = use_memo((), |_| {
    let config = api::load_config();
    Backend::connect(&config)
      .map(BackendHandle::new)
      .map_err(|err| format!("{err:#}"))
  });
  let session =
    use_state(|| None::<Session>);
  let restoring = use_state(|| true);

  {
    let backend = backend.clone();
    let session = session.clone();
    let restoring = restoring.clone();

    use_effect_with((), move |_| {
      match &*backend {
        | Ok(handle) => {
          let handle = handle.clone();
          wasm_bindgen_futures::spawn_local(
            async move {
              let restored =
                restore_session(&handle)
                  .await;
              session.set(restored);
              restoring.set(false);
            }
          );
        }
        | Err(err) => {
          tracing::error!(error = %err, "backend unavailable");
          restoring.set(false);
        }
      }
      || ()
    });
  }

  let handle = match &*backend {
    | Ok(handle) => handle.clone(),
    | Err(err) => {
      return html! {
          <div class="auth-shell">
              <div class="panel setup-card">
                  <div class="header">{ "Backend setup required" }</div>
                  <div class="content">
                      <p>{ err.clone() }</p>
                      <p>
                          { "Set " }<code>{ "backend.url" }</code>{ " and " }
                          <code>{ "backend.anon_key" }</code>
                          { " in the " }<code>{ "taskflow.config" }</code>
                          { " local storage entry (one key=value per line), then reload." }
                      </p>
                  </div>
              </div>
          </div>
      };
    }
  };

  if *restoring {
    return html! {
        <div class="auth-shell">
            <div class="loading">{ "Loading..." }</div>
        </div>
    };
  }

  let on_session = {
    let session = session.clone();
    Callback::from(
      move |signed_in: Session| {
        tracing::info!(user_id = %signed_in.user_id, "session started");
        api::save_session(&signed_in);
        session.set(Some(signed_in));
      }
    )
  };

  let on_sign_out = {
    let session = session.clone();
    let handle = handle.clone();
    Callback::from(move |_| {
      if let Some(current) =
        (*session).clone()
      {
        let handle = handle.clone();
        wasm_bindgen_futures::spawn_local(
          async move {
            let _ = handle
              .auth
              .sign_out(&current)
              .await;
          }
        );
      }
      api::clear_session();
      session.set(None);
    })
  };

  match (*session).clone() {
    | None => {
      html! {
          <SignIn backend={handle} {on_session} />
      }
    }
    | Some(current) => {
      let top_sign_out = {
        let on_sign_out =
          on_sign_out.clone();
        Callback::from(move |_| {
          on_sign_out.emit(())
        })
      };
      let board_key = current.user_id.to_string();
      html! {
          <div class="app-shell">
              <TopBar email={current.email.clone()} on_sign_out={top_sign_out} />
              <TaskBoard
                  key={board_key}
                  backend={handle}
                  session={current}
                  {on_sign_out}
              />
          </div>
      }
    }
  }
}

#[derive(Properties, PartialEq)]
pub struct TaskBoardProps {
  pub backend:     BackendHandle,
  pub session:     Session,
  pub on_sign_out: Callback<()>
}

#[function_component(TaskBoard)]
pub fn task_board(
  props: &TaskBoardProps
) -> Html {
  let view = &props.backend.config.view;
  let default_sort = view.default_sort;
  let confirm_delete =
    view.confirm_delete;

  let board = use_reducer(move || {
    let mut state =
      BoardState::new(default_sort);
    state.set_tab(api::load_tab());
    Board(state)
  });
  let gate = use_state(move || {
    DeleteGate::new(confirm_delete)
  });
  let sync = props
    .backend
    .sync_for(&props.session);

  {
    let board = board.clone();
    let sync = sync.clone();

    use_effect_with(
      props.session.user_id,
      move |user_id| {
        tracing::info!(%user_id, "loading tasks");
        wasm_bindgen_futures::spawn_local(
          async move {
            flow::refresh(&sync, |event| {
              board.dispatch(event)
            })
            .await;
          }
        );
        || ()
      }
    );
  }

  let on_create = {
    let board = board.clone();
    let sync = sync.clone();
    Callback::from(
      move |(task, settle): (
        NewTask,
        Settle
      )| {
        run_mutation(
          board.clone(),
          sync.clone(),
          Mutation::Create(task),
          Some(settle)
        );
      }
    )
  };

  let on_toggle = {
    let board = board.clone();
    let sync = sync.clone();
    Callback::from(
      move |(id, completed): (
        Uuid,
        bool
      )| {
        run_mutation(
          board.clone(),
          sync.clone(),
          Mutation::SetCompleted {
            id,
            completed
          },
          None
        );
      }
    )
  };

  let on_update = {
    let board = board.clone();
    let sync = sync.clone();
    Callback::from(
      move |(id, edit, settle): (
        Uuid,
        TaskEdit,
        Settle
      )| {
        run_mutation(
          board.clone(),
          sync.clone(),
          Mutation::Update {
            id,
            edit
          },
          Some(settle)
        );
      }
    )
  };

  let delete_now = {
    let board = board.clone();
    let sync = sync.clone();
    Callback::from(move |id: Uuid| {
      run_mutation(
        board.clone(),
        sync.clone(),
        Mutation::Delete(id),
        None
      );
    })
  };

  let on_delete = {
    let gate = gate.clone();
    let delete_now = delete_now.clone();
    Callback::from(move |id: Uuid| {
      let mut next = *gate;
      let immediate = next.request(id);
      gate.set(next);
      if let Some(id) = immediate {
        delete_now.emit(id);
      }
    })
  };

  let on_choice = {
    let gate = gate.clone();
    Callback::from(
      move |trigger: PromptTrigger| {
        let mut next = *gate;
        let confirmed =
          next.resolve(trigger);
        gate.set(next);
        if let Some(id) = confirmed {
          delete_now.emit(id);
        }
      }
    )
  };

  let on_tab = {
    let board = board.clone();
    Callback::from(move |tab: Tab| {
      api::save_tab(tab);
      board.dispatch(BoardEvent::SetTab(
        tab
      ));
    })
  };

  let on_sort = {
    let board = board.clone();
    Callback::from(
      move |sort: SortOrder| {
        board.dispatch(
          BoardEvent::SetSort(sort)
        );
      }
    )
  };

  let on_dismiss = {
    let board = board.clone();
    Callback::from(move |_| {
      board.dispatch(
        BoardEvent::DismissNotice
      );
    })
  };

  let state = &board.0;
  let tab = state.tab();
  let visible = state.visible();

  // A row that vanished under a refetch leaves no prompt to show.
  let pending_prompt = gate
    .pending()
    .and_then(|id| state.task(id))
    .map(ConfirmPrompt::delete_task);

  let body = if state.loading()
    && state.tasks().is_empty()
  {
    html! { <div class="loading">{ "Loading tasks..." }</div> }
  } else if visible.is_empty() {
    html! {
        <div class="empty-state">
            <div class="header">{ tab.empty_title() }</div>
            <div class="hint">{ tab.empty_hint() }</div>
        </div>
    }
  } else {
    html! {
        <div class="task-list">
            {
                for visible.iter().map(|task| html! {
                    <TaskItem
                        key={task.id.to_string()}
                        task={(*task).clone()}
                        on_toggle={on_toggle.clone()}
                        on_delete={on_delete.clone()}
                        on_update={on_update.clone()}
                    />
                })
            }
        </div>
    }
  };

  html! {
      <main class="board">
          <NoticeBanner
              notice={state.notice().cloned()}
              {on_dismiss}
              on_reauth={props.on_sign_out.clone()}
          />
          <div class="toolbar">
              <TabBar active={tab} counts={state.counts()} on_select={on_tab} />
              <SortSelect value={state.sort()} on_change={on_sort} />
          </div>
          {
              if tab == Tab::Todo {
                  html! { <TaskForm on_submit={on_create} /> }
              } else {
                  html! {}
              }
          }
          { body }
          {
              match pending_prompt {
                  Some(prompt) => html! {
                      <ConfirmModal is_open={gate.is_open()} {prompt} {on_choice} />
                  },
                  None => html! {}
              }
          }
      </main>
  }
}
