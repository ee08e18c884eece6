use chrono::{DateTime, Utc};
use clap::Parser;
use colored::*;
use jotter::client::http::HttpNotesApi;
use jotter::config::AppConfig;
use jotter::error::{JotterError, Result};
use jotter::model::{CreateNote, Note, UpdateNote};
use jotter::search::QuerySources;
use jotter::store::NotesStore;
use jotter::toast::{ToastKind, ToastMessage, ToastQueue};
use unicode_width::UnicodeWidthStr;

mod args;
use args::{Cli, Commands};

type Store = NotesStore<HttpNotesApi>;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();
    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Returns whether the dispatched command settled without an error.
async fn run() -> Result<bool> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    init_logging(&config, cli.verbose);

    let base_url = cli.base_url.clone().unwrap_or_else(|| config.base_url());
    log::debug!("environment {}, notes API at {}", config.environment, base_url);

    let api = HttpNotesApi::with_timeout(&base_url, config.request_timeout())?;
    let store = NotesStore::new(api, ToastQueue::new());

    match cli.command.unwrap_or(Commands::List { search: None }) {
        Commands::List { search } => handle_list(&store, search).await,
        Commands::Show { id } => handle_show(&store, &id).await,
        Commands::Create { title, content } => handle_create(&store, title, content).await,
        Commands::Edit { id, title, content } => handle_edit(&store, &id, title, content).await?,
        Commands::Delete { id } => handle_delete(&store, &id).await,
        Commands::Config => return handle_config(&config, &base_url),
    }

    print_toasts(&store.toasts().messages());
    Ok(store.error().is_none())
}

fn init_logging(config: &AppConfig, verbose: bool) {
    let default_level = if verbose { "debug" } else { config.log_level.as_str() };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn handle_config(config: &AppConfig, base_url: &str) -> Result<bool> {
    println!("{}", serde_json::to_string_pretty(config)?);
    println!("base url = {}", base_url);
    for (flag, enabled) in config.feature_flags() {
        println!("flag {} = {}", flag, enabled);
    }
    Ok(true)
}

async fn handle_list(store: &Store, search: Option<String>) {
    store.load_all().await;
    let sources = QuerySources {
        url_param: search,
        broadcast: None,
    };
    let query = sources.effective();
    if !query.is_empty() {
        store.search(query).await;
    }
    if store.error().is_none() {
        print_notes(&store.notes());
    }
}

async fn handle_show(store: &Store, id: &str) {
    store.get_by_id(id).await;
    if let Some(note) = store.selected_note() {
        print_full_note(&note);
    }
}

async fn handle_create(store: &Store, title: String, content: Option<String>) {
    let mut payload = CreateNote::new(title);
    payload.content = content;
    store.create(payload).await;
    if store.error().is_none() {
        if let Some(note) = store.notes().first() {
            print_notes(std::slice::from_ref(note));
        }
    }
}

async fn handle_edit(
    store: &Store,
    id: &str,
    title: Option<String>,
    content: Option<String>,
) -> Result<()> {
    let patch = UpdateNote { title, content };
    if patch.is_empty() {
        return Err(JotterError::Validation(
            "Nothing to change: pass --title and/or --content".into(),
        ));
    }

    // The store only patches notes it has cached.
    store.get_by_id(id).await;
    if store.error().is_some() {
        return Ok(());
    }
    store.update(id, patch).await;
    if let Some(note) = store.note_by_id(id) {
        print_full_note(&note);
    }
    Ok(())
}

async fn handle_delete(store: &Store, id: &str) {
    store.get_by_id(id).await;
    if store.error().is_some() {
        return;
    }
    store.remove(id).await;
}

/// Toasts are queued newest first; print them in the order they happened.
fn print_toasts(toasts: &[ToastMessage]) {
    for toast in toasts.iter().rev() {
        match toast.kind {
            ToastKind::Info => println!("{}", toast.text.dimmed()),
            ToastKind::Success => println!("{}", toast.text.green()),
            ToastKind::Warning => println!("{}", toast.text.yellow()),
            ToastKind::Error => eprintln!("{}", toast.text.red()),
        }
    }
}

fn print_full_note(note: &Note) {
    println!("{} {}", note.id.yellow(), note.title.bold());
    println!("--------------------------------");
    println!("{}", note.content);
}

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;

fn print_notes(notes: &[Note]) {
    if notes.is_empty() {
        println!("No notes found.");
        return;
    }

    let id_width = notes.iter().map(|n| n.id.width()).max().unwrap_or(0);

    for note in notes {
        let id_str = format!("{:>width$}. ", note.id, width = id_width);

        let preview: String = note
            .content
            .chars()
            .take(50)
            .map(|c| if c == '\n' { ' ' } else { c })
            .collect();
        let title_content = if preview.is_empty() {
            note.title.clone()
        } else {
            format!("{} {}", note.title, preview)
        };

        let fixed_width = id_str.width() + TIME_WIDTH;
        let available = LINE_WIDTH.saturating_sub(fixed_width);
        let title_display = truncate_to_width(&title_content, available);
        let padding = available.saturating_sub(title_display.width());

        let time_ago = note
            .updated_at
            .or(note.created_at)
            .map(format_time_ago)
            .unwrap_or_else(|| " ".repeat(TIME_WIDTH));

        println!(
            "{}{}{}{}",
            id_str.yellow(),
            title_display,
            " ".repeat(padding),
            time_ago.dimmed()
        );
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthChar;

    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let formatter = timeago::Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
