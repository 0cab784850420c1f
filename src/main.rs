use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;

use kvscope_browse::{Applied, ListingRequest, RequestRunner};
use kvscope_client::{ClientError, KvClient};
use kvscope_tui::{
    Action, AppState, BrowserScreen, DatabaseList, DeleteRequest, DialogEffect, Event,
    EventHandler, KeyBindings, KeyContext, Pane, SaveRequest, Settings, Submission, Tui,
    ViewRequest,
};
use kvscope_types::{KeyPage, KeyValue, Notice, RequestId};

/// kvscope - A terminal UI for browsing and editing key-value databases
#[derive(Parser, Debug)]
#[command(name = "kvscope")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Database to open on startup (optional, will prompt if not provided)
    #[arg(value_name = "DATABASE")]
    database: Option<String>,

    /// Base URL of the key-value server
    #[arg(long, short = 's', value_name = "URL")]
    server: Option<String>,

    /// Keys per page (server default when omitted)
    #[arg(long)]
    page_size: Option<u32>,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(args.log_file.as_deref())?;

    let result = run_app(args).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::WARN.into()),
    );

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))?;
            builder.with_writer(Mutex::new(file)).with_ansi(false).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

/// Defaults, then the config file, then command-line flags
fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };

    if let Some(server) = &args.server {
        settings.server = server.clone();
    }
    if args.page_size.is_some() {
        settings.page_size = args.page_size;
    }
    Ok(settings)
}

/// Completions of spawned API calls
enum InternalAction {
    DatabasesLoaded(Result<Vec<String>, ClientError>),
    KeysLoaded {
        id: RequestId,
        result: Result<KeyPage, ClientError>,
    },
    ValueLoaded {
        id: RequestId,
        result: Result<KeyValue, ClientError>,
    },
    SaveFinished {
        id: RequestId,
        database: String,
        key: String,
        result: Result<(), ClientError>,
    },
    DeleteFinished {
        id: RequestId,
        database: String,
        key: String,
        result: Result<(), ClientError>,
    },
}

type Runner = RequestRunner<InternalAction>;

async fn run_app(args: Args) -> Result<()> {
    let settings = load_settings(&args)?;
    let client = KvClient::new(&settings.server, settings.request_timeout())
        .context("Failed to create HTTP client")?
        .with_page_size(settings.page_size);

    // Create action channels
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (internal_tx, mut internal_rx) = mpsc::unbounded_channel::<InternalAction>();
    let mut runner = RequestRunner::new(internal_tx);

    let mut state = AppState::new(
        client.base_url(),
        settings.search_quiet_period(),
        action_tx.clone(),
    );

    // Open the database named on the command line, if it exists
    if let Some(name) = &args.database {
        let databases = client
            .list_databases()
            .await
            .with_context(|| format!("Failed to list databases on {}", client.base_url()))?;
        if !databases.iter().any(|d| d == name) {
            anyhow::bail!("Database '{}' not found on {}", name, client.base_url());
        }

        let request = state.navigator.select_database(name.clone());
        state.set_databases(databases);
        state.ui_state.focus = Pane::Keys;
        spawn_listing(&mut runner, &client, Some(request));
    } else {
        spawn_databases(&mut runner, &client);
    }

    let mut tui = Tui::new().context("Failed to set up terminal")?;
    let mut events = EventHandler::new(Duration::from_millis(250));
    let keybindings = KeyBindings::new();

    render(&mut tui, &mut state)?;

    loop {
        let search_deadline = state.navigator.search_deadline();

        tokio::select! {
            Some(event) = events.next() => {
                match event {
                    Event::Key(key) => {
                        if let Some(action) = keybindings.get_action(state.key_context(), &key) {
                            let _ = action_tx.send(action);
                        }
                    }
                    Event::Paste(text) => {
                        let _ = action_tx.send(Action::Paste(text));
                    }
                    Event::Tick | Event::Resize(_, _) => {}
                    Event::Error(e) => {
                        state.show_notice(Notice::error(e));
                    }
                }
            }

            Some(action) = action_rx.recv() => {
                handle_action(&mut state, &mut runner, &client, action);
            }

            Some(internal) = internal_rx.recv() => {
                handle_internal(&mut state, &mut runner, &client, internal);
            }

            _ = sleep_until(search_deadline) => {
                let request = state.navigator.poll_search(Instant::now());
                spawn_listing(&mut runner, &client, request);
            }
        }

        if state.should_quit {
            break;
        }

        render(&mut tui, &mut state)?;
    }

    // Cleanup
    runner.stop();
    events.shutdown();
    tui.restore()?;

    Ok(())
}

/// Resolves at the debounce deadline, never when there is none
async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline.into()).await,
        None => std::future::pending().await,
    }
}

fn handle_action(state: &mut AppState, runner: &mut Runner, client: &KvClient, action: Action) {
    match action {
        Action::Quit => {
            state.should_quit = true;
        }
        Action::ToggleHelp => {
            state.ui_state.help_visible = !state.ui_state.help_visible;
        }
        Action::DismissNotice => {
            state.dismiss_notice();
        }

        // Focus
        Action::FocusNext => {
            state.ui_state.focus = state.ui_state.focus.next();
        }
        Action::FocusPrev => {
            state.ui_state.focus = state.ui_state.focus.prev();
        }
        Action::FocusDatabases => {
            state.ui_state.focus = Pane::Databases;
        }
        Action::FocusSearch => {
            state.ui_state.focus = Pane::Search;
        }
        Action::FocusKeys => {
            state.ui_state.focus = Pane::Keys;
            state.clamp_key_selection();
        }

        // Lists
        Action::ListUp => {
            state.list_up();
        }
        Action::ListDown => {
            state.list_down();
        }
        Action::ListSelect => match state.ui_state.focus {
            Pane::Databases => {
                if let Some(name) = state.selected_database() {
                    let _ = state
                        .action_tx
                        .send(Action::SelectDatabase(name.to_string()));
                }
            }
            Pane::Keys => view_selected_key(state, runner, client),
            Pane::Search => {}
        },

        // Databases
        Action::SelectDatabase(name) => {
            state.dialogs.cancel_view();
            let request = state.navigator.select_database(name);
            state.ui_state.search_input.clear();
            state.ui_state.key_list_state.select(None);
            state.ui_state.focus = Pane::Keys;
            spawn_listing(runner, client, Some(request));
        }
        Action::RefreshDatabases => {
            state.databases = DatabaseList::Loading;
            spawn_databases(runner, client);
        }

        // Key listing
        Action::NextPage => {
            let request = state.navigator.go_next();
            spawn_listing(runner, client, request);
        }
        Action::PrevPage => {
            let request = state.navigator.go_back();
            spawn_listing(runner, client, request);
        }
        Action::RefreshKeys => {
            let request = state.navigator.retry();
            spawn_listing(runner, client, request);
        }

        // Prefix search
        Action::SearchInput(c) => {
            state.search_input_char(c);
            schedule_search(state);
        }
        Action::SearchBackspace => {
            state.search_input_backspace();
            schedule_search(state);
        }
        Action::SearchSubmit => {
            let text = state.ui_state.search_input.clone();
            let request = state.navigator.submit_search(text);
            spawn_listing(runner, client, request);
            state.ui_state.focus = Pane::Keys;
        }
        Action::SearchClear => {
            state.ui_state.search_input.clear();
            let request = state.navigator.clear_search();
            spawn_listing(runner, client, request);
        }

        // Dialogs
        Action::ViewKey => {
            view_selected_key(state, runner, client);
        }
        Action::EditFromView => {
            state.dialogs.edit_from_view();
        }
        Action::AddKey => {
            if state.navigator.session().active_database().is_none() {
                state.show_notice(Notice::info("Select a database first"));
                return;
            }
            let trigger = state.focus_target();
            let effects = state.dialogs.open_add(trigger);
            apply_effects(state, runner, client, effects);
        }
        Action::DeleteKey => {
            if let Some(key) = state.selected_key().map(str::to_string) {
                let trigger = state.focus_target();
                let effects = state.dialogs.open_delete(&key, trigger);
                apply_effects(state, runner, client, effects);
            }
        }
        Action::CloseDialog => {
            let effects = state.dialogs.close();
            apply_effects(state, runner, client, effects);
        }
        Action::ConfirmAccept => {
            let database = state.navigator.session().active_database();
            if let Some(request) = state.dialogs.confirm(database) {
                spawn_delete(runner, client, request);
            }
        }

        // Edit form
        Action::FormInput(c) => {
            state.dialogs.input(c);
        }
        Action::FormBackspace => {
            state.dialogs.backspace();
        }
        Action::FormNewline => {
            state.dialogs.input('\n');
        }
        Action::FormNextField => {
            state.dialogs.next_field();
        }
        Action::FormClearField => {
            state.dialogs.clear_field();
        }
        Action::FormSubmit => {
            let database = state.navigator.session().active_database();
            match state.dialogs.submit(database) {
                Submission::Ignored => {}
                Submission::Rejected(notice) => state.show_notice(notice),
                Submission::Started(request) => spawn_save(runner, client, request),
            }
        }

        Action::Paste(text) => match state.key_context() {
            KeyContext::EditDialog => state.dialogs.paste(&text),
            KeyContext::SearchInput => {
                let line = text.lines().next().unwrap_or_default();
                state.ui_state.search_input.push_str(line);
                schedule_search(state);
            }
            _ => {}
        },
    }
}

fn handle_internal(
    state: &mut AppState,
    runner: &mut Runner,
    client: &KvClient,
    internal: InternalAction,
) {
    match internal {
        InternalAction::DatabasesLoaded(Ok(names)) => {
            state.set_databases(names);
        }
        InternalAction::DatabasesLoaded(Err(e)) => {
            tracing::warn!(error = %e, "failed to list databases");
            state.databases = DatabaseList::Failed(e.to_string());
        }
        InternalAction::KeysLoaded { id, result } => {
            if state.navigator.apply_listing(id, result) == Applied::Applied {
                state.reset_key_selection();
                state.sync_search_input();
            }
        }
        InternalAction::ValueLoaded { id, result } => {
            let effects = state.dialogs.view_loaded(id, result);
            apply_effects(state, runner, client, effects);
        }
        InternalAction::SaveFinished {
            id,
            database,
            key,
            result,
        } => {
            let effects = state.dialogs.save_finished(id, &database, &key, result);
            apply_effects(state, runner, client, effects);
        }
        InternalAction::DeleteFinished {
            id,
            database,
            key,
            result,
        } => {
            let effects = state.dialogs.delete_finished(id, &database, &key, result);
            apply_effects(state, runner, client, effects);
        }
    }
}

fn apply_effects(
    state: &mut AppState,
    runner: &mut Runner,
    client: &KvClient,
    effects: Vec<DialogEffect>,
) {
    for effect in effects {
        match effect {
            DialogEffect::RestoreFocus(target) => state.restore_focus(target),
            DialogEffect::ReloadListing { database } => {
                let request = state.navigator.reload(&database);
                spawn_listing(runner, client, request);
            }
            DialogEffect::RemoveKey { database, key } => {
                if state.navigator.remove_key(&database, &key) {
                    state.clamp_key_selection();
                }
            }
            DialogEffect::Notice(notice) => state.show_notice(notice),
        }
    }
}

fn schedule_search(state: &mut AppState) {
    let text = state.ui_state.search_input.clone();
    state.navigator.search_input(text, Instant::now());
}

fn view_selected_key(state: &mut AppState, runner: &mut Runner, client: &KvClient) {
    let Some(key) = state.selected_key().map(str::to_string) else {
        return;
    };
    let trigger = state.focus_target();
    let database = state.navigator.session().active_database();

    if let Some(request) = state.dialogs.request_view(database, &key, trigger) {
        spawn_view(runner, client, request);
    }
}

fn spawn_databases(runner: &mut Runner, client: &KvClient) {
    let client = client.clone();
    runner.spawn_detached(async move {
        InternalAction::DatabasesLoaded(client.list_databases().await)
    });
}

fn spawn_listing(runner: &mut Runner, client: &KvClient, request: Option<ListingRequest>) {
    let Some(ListingRequest {
        id,
        database,
        snapshot,
        cancel,
    }) = request
    else {
        return;
    };

    let client = client.clone();
    runner.spawn(cancel, async move {
        let result = client
            .list_keys(&database, &snapshot.prefix, snapshot.cursor.as_deref())
            .await;
        InternalAction::KeysLoaded { id, result }
    });
}

fn spawn_view(runner: &mut Runner, client: &KvClient, request: ViewRequest) {
    let ViewRequest {
        id,
        database,
        key,
        cancel,
    } = request;

    let client = client.clone();
    runner.spawn(cancel, async move {
        let result = client.get_key(&database, &key).await;
        InternalAction::ValueLoaded { id, result }
    });
}

fn spawn_save(runner: &mut Runner, client: &KvClient, request: SaveRequest) {
    let SaveRequest {
        id,
        database,
        entry,
    } = request;

    let client = client.clone();
    runner.spawn_detached(async move {
        let result = client.set_key(&database, &entry).await;
        InternalAction::SaveFinished {
            id,
            database,
            key: entry.key,
            result,
        }
    });
}

fn spawn_delete(runner: &mut Runner, client: &KvClient, request: DeleteRequest) {
    let DeleteRequest { id, database, key } = request;

    let client = client.clone();
    runner.spawn_detached(async move {
        let result = client.delete_key(&database, &key).await;
        InternalAction::DeleteFinished {
            id,
            database,
            key,
            result,
        }
    });
}

fn render(tui: &mut Tui, state: &mut AppState) -> Result<()> {
    tui.terminal()
        .draw(|frame| BrowserScreen::render(frame, state))?;
    Ok(())
}
