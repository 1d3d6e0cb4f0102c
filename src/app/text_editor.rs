use std::cmp::min;

/// Multi-line edit buffer for the open markdown document. Lines are split on
/// `\n`; `text()` re-joins them, so content round-trips byte-for-byte
/// (including a trailing newline). Cursor positions are char indices, not
/// byte indices.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TextEditor {
    pub lines: Vec<String>,
    pub cursor_row: usize,
    pub cursor_col: usize,
    pub scroll_row: usize,
}

impl TextEditor {
    pub fn from_text(text: &str) -> Self {
        let lines = normalize_newlines(text)
            .split('\n')
            .map(str::to_string)
            .collect::<Vec<_>>();
        Self {
            lines,
            cursor_row: 0,
            cursor_col: 0,
            scroll_row: 0,
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn insert_char(&mut self, ch: char) {
        let mut buffer = [0u8; 4];
        self.insert_str(ch.encode_utf8(&mut buffer));
    }

    pub fn insert_str(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.clamp_cursor();

        let normalized = normalize_newlines(text);
        let parts = normalized.split('\n').collect::<Vec<_>>();
        if let [single] = parts.as_slice() {
            let line = &mut self.lines[self.cursor_row];
            let at = byte_index(line, self.cursor_col);
            line.insert_str(at, single);
            self.cursor_col += single.chars().count();
            return;
        }

        let current = std::mem::take(&mut self.lines[self.cursor_row]);
        let split = byte_index(&current, self.cursor_col);
        let (before, after) = current.split_at(split);

        let last = parts.len() - 1;
        let mut replacement = Vec::with_capacity(parts.len());
        replacement.push(format!("{before}{}", parts[0]));
        for middle in &parts[1..last] {
            replacement.push((*middle).to_string());
        }
        replacement.push(format!("{}{after}", parts[last]));

        self.lines
            .splice(self.cursor_row..=self.cursor_row, replacement);
        self.cursor_row += last;
        self.cursor_col = parts[last].chars().count();
    }

    pub fn insert_newline(&mut self) {
        self.clamp_cursor();
        let current = std::mem::take(&mut self.lines[self.cursor_row]);
        let split = byte_index(&current, self.cursor_col);
        let (before, after) = current.split_at(split);
        let after = after.to_string();
        self.lines[self.cursor_row] = before.to_string();
        self.lines.insert(self.cursor_row + 1, after);
        self.cursor_row += 1;
        self.cursor_col = 0;
    }

    pub fn backspace(&mut self) {
        self.clamp_cursor();

        if self.cursor_col > 0 {
            let line = &mut self.lines[self.cursor_row];
            let at = byte_index(line, self.cursor_col - 1);
            line.remove(at);
            self.cursor_col -= 1;
            return;
        }

        if self.cursor_row == 0 {
            return;
        }
        let current = self.lines.remove(self.cursor_row);
        self.cursor_row -= 1;
        let previous = &mut self.lines[self.cursor_row];
        self.cursor_col = previous.chars().count();
        previous.push_str(&current);
    }

    pub fn delete_forward(&mut self) {
        self.clamp_cursor();

        if self.cursor_col < self.current_line_chars() {
            let line = &mut self.lines[self.cursor_row];
            let at = byte_index(line, self.cursor_col);
            line.remove(at);
            return;
        }

        if self.cursor_row + 1 >= self.lines.len() {
            return;
        }
        let next = self.lines.remove(self.cursor_row + 1);
        self.lines[self.cursor_row].push_str(&next);
    }

    pub fn move_left(&mut self) {
        self.clamp_cursor();
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_row > 0 {
            self.cursor_row -= 1;
            self.cursor_col = self.current_line_chars();
        }
    }

    pub fn move_right(&mut self) {
        self.clamp_cursor();
        if self.cursor_col < self.current_line_chars() {
            self.cursor_col += 1;
        } else if self.cursor_row + 1 < self.lines.len() {
            self.cursor_row += 1;
            self.cursor_col = 0;
        }
    }

    pub fn move_up(&mut self) {
        self.clamp_cursor();
        if self.cursor_row > 0 {
            self.cursor_row -= 1;
            self.cursor_col = min(self.cursor_col, self.current_line_chars());
        }
    }

    pub fn move_down(&mut self) {
        self.clamp_cursor();
        if self.cursor_row + 1 < self.lines.len() {
            self.cursor_row += 1;
            self.cursor_col = min(self.cursor_col, self.current_line_chars());
        }
    }

    pub fn move_home(&mut self) {
        self.clamp_cursor();
        self.cursor_col = 0;
    }

    pub fn move_end(&mut self) {
        self.clamp_cursor();
        self.cursor_col = self.current_line_chars();
    }

    pub fn page_up(&mut self, page: usize) {
        self.clamp_cursor();
        self.cursor_row = self.cursor_row.saturating_sub(page.max(1));
        self.cursor_col = min(self.cursor_col, self.current_line_chars());
    }

    pub fn page_down(&mut self, page: usize) {
        self.clamp_cursor();
        self.cursor_row = min(
            self.cursor_row + page.max(1),
            self.lines.len().saturating_sub(1),
        );
        self.cursor_col = min(self.cursor_col, self.current_line_chars());
    }

    fn current_line_chars(&self) -> usize {
        self.lines
            .get(self.cursor_row)
            .map(|line| line.chars().count())
            .unwrap_or(0)
    }

    fn clamp_cursor(&mut self) {
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        if self.cursor_row >= self.lines.len() {
            self.cursor_row = self.lines.len() - 1;
        }
        self.cursor_col = min(self.cursor_col, self.current_line_chars());
    }
}

fn normalize_newlines(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

fn byte_index(line: &str, char_index: usize) -> usize {
    line.char_indices()
        .nth(char_index)
        .map(|(index, _)| index)
        .unwrap_or(line.len())
}
