mod tail;
mod text_editor;

pub use tail::{TailBinding, reconcile_tail};
pub use text_editor::TextEditor;

use crate::domain::{LogChunk, Mode, TreeNode, TreeRow, flatten_tree};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Focus {
    Tree,
    Content,
}

/// The one open file. At most one session exists at a time; opening another
/// file or switching modes replaces it wholesale.
#[derive(Clone, Debug, PartialEq)]
pub enum DocumentSession {
    Markdown {
        path: String,
        editor: TextEditor,
        dirty: bool,
    },
    Log {
        path: String,
        content: String,
        tail_offset: u64,
        size: u64,
    },
}

impl DocumentSession {
    pub fn path(&self) -> &str {
        match self {
            Self::Markdown { path, .. } | Self::Log { path, .. } => path,
        }
    }

    pub fn is_markdown(&self) -> bool {
        matches!(self, Self::Markdown { .. })
    }
}

/// Whole view state. Transitions replace it atomically: `update` consumes the
/// current model and returns the next one, so no partial mutation is ever
/// observable between events.
#[derive(Clone, Debug, PartialEq)]
pub struct AppModel {
    pub mode: Mode,
    pub tree: Vec<TreeNode>,
    pub rows: Vec<TreeRow>,
    pub tree_selected: usize,
    pub focus: Focus,
    pub session: Option<DocumentSession>,
    pub status: String,
    /// Bumped on every open and mode switch. Tail results started under an
    /// older generation are discarded instead of applied.
    pub generation: u64,
    /// Lines scrolled up from the tail of the log view; 0 sticks to the end.
    pub log_scroll_back: usize,
    pub terminal_size: (u16, u16),
    pub help_open: bool,
    pub server: String,
}

impl AppModel {
    pub fn new(server: String) -> Self {
        Self {
            mode: Mode::Markdown,
            tree: Vec::new(),
            rows: Vec::new(),
            tree_selected: 0,
            focus: Focus::Tree,
            session: None,
            status: "ready".to_string(),
            generation: 0,
            log_scroll_back: 0,
            terminal_size: (0, 0),
            help_open: false,
            server,
        }
    }

    pub fn with_status(&self, status: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.status = status.into();
        next
    }

    pub fn with_terminal_size(&self, width: u16, height: u16) -> Self {
        let mut next = self.clone();
        next.terminal_size = (width, height);
        next
    }

    /// Replaces the loaded tree wholesale. The open session is untouched:
    /// reloading a listing is independent of the open document.
    pub fn with_tree(&self, tree: Vec<TreeNode>) -> Self {
        let rows = flatten_tree(&tree);
        let mut next = self.clone();
        next.tree_selected = self.tree_selected.min(rows.len().saturating_sub(1));
        next.tree = tree;
        next.rows = rows;
        next
    }

    pub fn switch_mode(&self) -> Self {
        let mode = self.mode.toggle();
        Self {
            mode,
            tree: Vec::new(),
            rows: Vec::new(),
            tree_selected: 0,
            focus: Focus::Tree,
            session: None,
            status: mode.ready_status().to_string(),
            generation: self.generation + 1,
            log_scroll_back: 0,
            terminal_size: self.terminal_size,
            help_open: false,
            server: self.server.clone(),
        }
    }

    pub fn open_markdown(&self, path: String, content: String) -> Self {
        let mut next = self.clone();
        next.status = format!("opened {path}");
        next.session = Some(DocumentSession::Markdown {
            path,
            editor: TextEditor::from_text(&content),
            dirty: false,
        });
        next.generation = self.generation + 1;
        next.focus = Focus::Content;
        next
    }

    pub fn open_log(&self, path: String, chunk: LogChunk) -> Self {
        let mut next = self.clone();
        next.status = format!("opened {path}");
        next.session = Some(DocumentSession::Log {
            path,
            content: chunk.content,
            tail_offset: chunk.next_offset,
            size: chunk.size,
        });
        next.generation = self.generation + 1;
        next.focus = Focus::Content;
        next.log_scroll_back = 0;
        next
    }

    pub fn selected_file_path(&self) -> Option<String> {
        self.rows
            .get(self.tree_selected)
            .and_then(|row| row.file_path.clone())
    }

    fn content_page(&self) -> usize {
        usize::from(self.terminal_size.1.saturating_sub(4)).max(1)
    }
}

#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Paste(String),
    Resize(u16, u16),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AppCommand {
    None,
    Quit,
    LoadTree,
    OpenPath { path: String },
    SaveDocument { path: String, content: String },
}

pub fn update(model: AppModel, event: AppEvent) -> (AppModel, AppCommand) {
    match event {
        AppEvent::Resize(width, height) => (model.with_terminal_size(width, height), AppCommand::None),
        AppEvent::Paste(text) => {
            let mut next = model;
            if next.focus == Focus::Content {
                if let Some(DocumentSession::Markdown { editor, dirty, .. }) = &mut next.session {
                    editor.insert_str(&text);
                    *dirty = true;
                }
            }
            (next, AppCommand::None)
        }
        AppEvent::Key(key) => handle_key(model, key),
    }
}

fn handle_key(mut model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    if model.help_open {
        if matches!(
            key.code,
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q') | KeyCode::Enter
        ) {
            model.help_open = false;
        }
        return (model, AppCommand::None);
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => return (model, AppCommand::Quit),
            KeyCode::Char('s') => {
                if let Some(DocumentSession::Markdown { path, editor, .. }) = &model.session {
                    let command = AppCommand::SaveDocument {
                        path: path.clone(),
                        content: editor.text(),
                    };
                    return (model, command);
                }
                return (model, AppCommand::None);
            }
            _ => {}
        }
    }

    if key.code == KeyCode::F(1) {
        model.help_open = true;
        return (model, AppCommand::None);
    }

    if key.code == KeyCode::Tab {
        let editing = model.focus == Focus::Content
            && matches!(model.session, Some(DocumentSession::Markdown { .. }));
        if !editing {
            return (model.switch_mode(), AppCommand::LoadTree);
        }
    }

    match model.focus {
        Focus::Tree => handle_tree_key(model, key),
        Focus::Content => handle_content_key(model, key),
    }
}

fn handle_tree_key(mut model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    match key.code {
        KeyCode::Char('q') => (model, AppCommand::Quit),
        KeyCode::Char('?') => {
            model.help_open = true;
            (model, AppCommand::None)
        }
        KeyCode::Up | KeyCode::Char('k') => {
            model.tree_selected = model.tree_selected.saturating_sub(1);
            (model, AppCommand::None)
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if model.tree_selected + 1 < model.rows.len() {
                model.tree_selected += 1;
            }
            (model, AppCommand::None)
        }
        KeyCode::Enter => match model.selected_file_path() {
            Some(path) => (model, AppCommand::OpenPath { path }),
            None => (model, AppCommand::None),
        },
        KeyCode::Char('r') => (model, AppCommand::LoadTree),
        KeyCode::Right => {
            if model.session.is_some() {
                model.focus = Focus::Content;
            }
            (model, AppCommand::None)
        }
        _ => (model, AppCommand::None),
    }
}

fn handle_content_key(mut model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    if key.code == KeyCode::Esc {
        model.focus = Focus::Tree;
        return (model, AppCommand::None);
    }

    let page = model.content_page();
    match &mut model.session {
        Some(DocumentSession::Markdown { editor, dirty, .. }) => {
            match key.code {
                KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    editor.insert_char(ch);
                    *dirty = true;
                }
                KeyCode::Enter => {
                    editor.insert_newline();
                    *dirty = true;
                }
                KeyCode::Tab => {
                    editor.insert_str("  ");
                    *dirty = true;
                }
                KeyCode::Backspace => {
                    editor.backspace();
                    *dirty = true;
                }
                KeyCode::Delete => {
                    editor.delete_forward();
                    *dirty = true;
                }
                KeyCode::Left => editor.move_left(),
                KeyCode::Right => editor.move_right(),
                KeyCode::Up => editor.move_up(),
                KeyCode::Down => editor.move_down(),
                KeyCode::Home => editor.move_home(),
                KeyCode::End => editor.move_end(),
                KeyCode::PageUp => editor.page_up(page),
                KeyCode::PageDown => editor.page_down(page),
                _ => {}
            }
            (model, AppCommand::None)
        }
        Some(DocumentSession::Log { .. }) => {
            match key.code {
                KeyCode::Up | KeyCode::Char('k') => model.log_scroll_back += 1,
                KeyCode::Down | KeyCode::Char('j') => {
                    model.log_scroll_back = model.log_scroll_back.saturating_sub(1);
                }
                KeyCode::PageUp => model.log_scroll_back += page,
                KeyCode::PageDown => {
                    model.log_scroll_back = model.log_scroll_back.saturating_sub(page);
                }
                KeyCode::End | KeyCode::Char('G') => model.log_scroll_back = 0,
                _ => {}
            }
            (model, AppCommand::None)
        }
        None => (model, AppCommand::None),
    }
}

pub fn apply_tree_result(model: &AppModel, result: Result<Vec<TreeNode>, String>) -> AppModel {
    match result {
        Ok(tree) => model.with_tree(tree),
        Err(message) => model.with_status(message),
    }
}

pub fn apply_markdown_open(
    model: &AppModel,
    path: String,
    result: Result<String, String>,
) -> AppModel {
    match result {
        Ok(content) => model.open_markdown(path, content),
        Err(message) => model.with_status(message),
    }
}

pub fn apply_log_open(
    model: &AppModel,
    path: String,
    result: Result<LogChunk, String>,
) -> AppModel {
    match result {
        Ok(chunk) => model.open_log(path, chunk),
        Err(message) => model.with_status(message),
    }
}

pub fn apply_save_result(model: &AppModel, path: &str, result: Result<(), String>) -> AppModel {
    match result {
        Ok(()) => {
            let mut next = model.with_status(format!("saved {path}"));
            if let Some(DocumentSession::Markdown {
                path: open_path,
                dirty,
                ..
            }) = &mut next.session
            {
                if open_path == path {
                    *dirty = false;
                }
            }
            next
        }
        Err(message) => model.with_status(message),
    }
}

/// Applies one tail tick result. The result is validated against the state
/// the tick was started under: a mismatched generation or path means the user
/// has navigated away, and the chunk is dropped without touching the model.
pub fn apply_log_chunk(
    model: &AppModel,
    generation: u64,
    path: &str,
    result: Result<LogChunk, String>,
) -> AppModel {
    if generation != model.generation {
        return model.clone();
    }
    let Some(DocumentSession::Log {
        path: open_path,
        content,
        tail_offset,
        ..
    }) = &model.session
    else {
        return model.clone();
    };
    if open_path != path {
        return model.clone();
    }

    let chunk = match result {
        Ok(chunk) => chunk,
        Err(message) => return model.with_status(message),
    };

    if chunk.content.is_empty() && chunk.next_offset == *tail_offset {
        return model.clone();
    }

    // Append only when the server read from our cursor; a clamped offset
    // (file shrank) just moves the cursor forward.
    let mut next_content = content.clone();
    if chunk.offset == *tail_offset {
        next_content.push_str(&chunk.content);
    }

    let mut next = model.with_status(format!("tailed {path}"));
    next.session = Some(DocumentSession::Log {
        path: path.to_string(),
        content: next_content,
        tail_offset: chunk.next_offset,
        size: chunk.size,
    });
    next
}
