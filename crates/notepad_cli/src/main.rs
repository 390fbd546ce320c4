//! Command-line front end for the notepad core.
//!
//! # Responsibility
//! - Drive the same session operations the desktop UI uses, one command per
//!   process, for scripting and smoke checks.
//! - Flush every open note before exiting.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use notepad_core::{
    default_log_level, init_logging, open_file_session, FileSession, NoteId, NotepadPaths,
};
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "notepad", version, about = "Multi-tab plain-text notepad")]
struct Cli {
    /// Data directory (defaults to NOTEPAD_DATA_DIR or the platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level written to <data-dir>/logs
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List open tabs; the selected tab is marked with `*`
    List,
    /// Create a new tab and select it
    New,
    /// Print a note's title and body (selected tab by default)
    Show { id: Option<String> },
    /// Select a tab by id or unique id prefix
    Select { id: String },
    /// Set a tab's title (truncated to 40 characters)
    Title { id: String, title: String },
    /// Replace a tab's body; reads stdin when TEXT is omitted
    Write { id: String, text: Option<String> },
    /// Delete a tab (selected tab by default); requires --yes
    Delete {
        id: Option<String>,
        #[arg(long)]
        yes: bool,
    },
    /// Clear the selected tab's title and body
    Reset,
    /// Write the selected tab's body to PATH
    Export { path: PathBuf },
    /// Show or step the editor font size
    Font {
        #[arg(value_enum, default_value = "show")]
        action: FontAction,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum FontAction {
    Show,
    Up,
    Down,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = resolve_paths(cli.data_dir.as_deref())?;

    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    if let Err(err) = init_logging(level, &paths.log_dir) {
        eprintln!("warning: logging disabled: {err}");
    }

    let mut session = open_file_session(&paths)
        .with_context(|| format!("Failed to open notepad data at {}", paths.root.display()))?;
    session.load_if_needed();

    let outcome = run(&mut session, cli.command);
    session.flush_all();
    outcome
}

fn run(session: &mut FileSession, command: Command) -> Result<()> {
    match command {
        Command::List => {
            for tab in session.tabs() {
                let marker = if tab.is_selected { '*' } else { ' ' };
                println!("{marker} {}  {}", tab.id, tab.display_title);
            }
        }
        Command::New => {
            let id = session.add_tab();
            println!("{id}");
        }
        Command::Show { id } => {
            let id = match id {
                Some(prefix) => resolve_id(session, &prefix)?,
                None => session
                    .selected_id()
                    .ok_or_else(|| anyhow!("no tab is selected"))?,
            };
            let note = session
                .note(id)
                .ok_or_else(|| anyhow!("note not found: {id}"))?;
            println!("# {}", note.title);
            println!("{}", note.text);
        }
        Command::Select { id } => {
            let id = resolve_id(session, &id)?;
            session.select_tab(id)?;
        }
        Command::Title { id, title } => {
            let id = resolve_id(session, &id)?;
            session.edit_title(id, &title)?;
        }
        Command::Write { id, text } => {
            let id = resolve_id(session, &id)?;
            let text = match text {
                Some(text) => text,
                None => {
                    let mut buffer = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buffer)
                        .context("Failed to read note body from stdin")?;
                    buffer
                }
            };
            session.edit_text(id, &text)?;
        }
        Command::Delete { id, yes } => {
            if let Some(prefix) = id {
                let id = resolve_id(session, &prefix)?;
                session.select_tab(id)?;
            }
            let pending = session.request_delete()?;
            if !yes {
                session.cancel_delete();
                bail!("refusing to delete {pending} without --yes");
            }
            let removed = session.confirm_delete()?;
            println!("deleted {removed}");
        }
        Command::Reset => {
            session.reset_active()?;
        }
        Command::Export { path } => {
            session.export_active(&path)?;
            println!("exported to {}", path.display());
        }
        Command::Font { action } => {
            let prefs = session.preferences();
            let size = match action {
                FontAction::Show => prefs.font_size()?,
                FontAction::Up => prefs.increase_font_size()?,
                FontAction::Down => prefs.decrease_font_size()?,
            };
            println!("{size}");
        }
    }
    Ok(())
}

fn resolve_paths(data_dir: Option<&std::path::Path>) -> Result<NotepadPaths> {
    let paths = match data_dir {
        Some(root) => NotepadPaths::from_root(root),
        None => NotepadPaths::resolve(),
    };
    if paths.root.is_absolute() {
        return Ok(paths);
    }
    let cwd = std::env::current_dir().context("Failed to resolve current directory")?;
    Ok(NotepadPaths::from_root(cwd.join(&paths.root)))
}

/// Resolves a full id or a unique prefix of one open tab.
fn resolve_id(session: &FileSession, value: &str) -> Result<NoteId> {
    let needle = value.trim().to_ascii_lowercase();
    if needle.is_empty() {
        bail!("empty note id");
    }
    let matches: Vec<NoteId> = session
        .notes()
        .iter()
        .map(|note| note.id)
        .filter(|id| id.to_string().starts_with(&needle))
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => bail!("no tab matches `{value}`"),
        _ => bail!("`{value}` matches {} tabs; use a longer prefix", matches.len()),
    }
}
