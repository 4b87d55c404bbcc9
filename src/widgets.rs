//! Handles the send operation works against: the input box and the message log.
//!
//! Both handles are cheap to clone and share state, so a spawned send task and
//! the renderer can hold them at the same time. Locks are never held across an
//! `.await`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::layout::total_rows;
use crate::state::Message;

/// The text field the user types into.
pub trait InputField {
    fn value(&self) -> String;
    fn clear(&self);
}

/// The scrolling container messages are appended to.
pub trait MessageLog {
    fn append(&self, message: Message);
    fn scroll_to_bottom(&self);
}

// Used when nothing has been rendered yet
const FALLBACK_WIDTH: u16 = 50;
const FALLBACK_HEIGHT: u16 = 20;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[derive(Debug, Default)]
struct InputState {
    text: String,
    cursor: usize, // in chars
}

/// Editable single-line input with a cursor.
#[derive(Debug, Clone, Default)]
pub struct InputBuffer {
    inner: Arc<Mutex<InputState>>,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: &str) -> Self {
        let buffer = Self::new();
        buffer.set(text);
        buffer
    }

    pub fn set(&self, text: &str) {
        let mut state = lock(&self.inner);
        state.text = text.to_string();
        state.cursor = text.chars().count();
    }

    pub fn cursor(&self) -> usize {
        lock(&self.inner).cursor
    }

    pub fn insert_char(&self, c: char) {
        let mut state = lock(&self.inner);
        let byte_pos = char_to_byte_index(&state.text, state.cursor);
        state.text.insert(byte_pos, c);
        state.cursor += 1;
    }

    pub fn backspace(&self) {
        let mut state = lock(&self.inner);
        if state.cursor > 0 {
            state.cursor -= 1;
            let byte_pos = char_to_byte_index(&state.text, state.cursor);
            state.text.remove(byte_pos);
        }
    }

    pub fn delete(&self) {
        let mut state = lock(&self.inner);
        if state.cursor < state.text.chars().count() {
            let byte_pos = char_to_byte_index(&state.text, state.cursor);
            state.text.remove(byte_pos);
        }
    }

    pub fn move_left(&self) {
        let mut state = lock(&self.inner);
        state.cursor = state.cursor.saturating_sub(1);
    }

    pub fn move_right(&self) {
        let mut state = lock(&self.inner);
        let char_count = state.text.chars().count();
        state.cursor = (state.cursor + 1).min(char_count);
    }

    pub fn move_home(&self) {
        lock(&self.inner).cursor = 0;
    }

    pub fn move_end(&self) {
        let mut state = lock(&self.inner);
        state.cursor = state.text.chars().count();
    }
}

impl InputField for InputBuffer {
    fn value(&self) -> String {
        lock(&self.inner).text.clone()
    }

    fn clear(&self) {
        let mut state = lock(&self.inner);
        state.text.clear();
        state.cursor = 0;
    }
}

#[derive(Debug, Default)]
struct LogState {
    messages: Vec<Message>,
    scroll: u16,
    width: u16,
    height: u16,
}

impl LogState {
    fn viewport(&self) -> (u16, u16) {
        let width = if self.width > 0 { self.width } else { FALLBACK_WIDTH };
        let height = if self.height > 0 { self.height } else { FALLBACK_HEIGHT };
        (width, height)
    }

    fn max_scroll(&self) -> u16 {
        let (width, height) = self.viewport();
        total_rows(&self.messages, width).saturating_sub(height)
    }
}

/// Point-in-time copy of the log for rendering.
#[derive(Debug, Clone)]
pub struct LogSnapshot {
    pub messages: Vec<Message>,
    pub scroll: u16,
}

/// The visible message log.
#[derive(Debug, Clone, Default)]
pub struct ChatLog {
    inner: Arc<Mutex<LogState>>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> LogSnapshot {
        let state = lock(&self.inner);
        LogSnapshot {
            messages: state.messages.clone(),
            scroll: state.scroll,
        }
    }

    pub fn messages(&self) -> Vec<Message> {
        lock(&self.inner).messages.clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn scroll(&self) -> u16 {
        lock(&self.inner).scroll
    }

    /// Inner size of the panel the log was last drawn into.
    pub fn set_viewport(&self, width: u16, height: u16) {
        let mut state = lock(&self.inner);
        state.width = width;
        state.height = height;
        let max = state.max_scroll();
        state.scroll = state.scroll.min(max);
    }

    pub fn scroll_up(&self, lines: u16) {
        let mut state = lock(&self.inner);
        state.scroll = state.scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&self, lines: u16) {
        let mut state = lock(&self.inner);
        let max = state.max_scroll();
        state.scroll = state.scroll.saturating_add(lines).min(max);
    }

    pub fn scroll_to_top(&self) {
        lock(&self.inner).scroll = 0;
    }
}

impl MessageLog for ChatLog {
    fn append(&self, message: Message) {
        lock(&self.inner).messages.push(message);
    }

    fn scroll_to_bottom(&self) {
        let mut state = lock(&self.inner);
        state.scroll = state.max_scroll();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_editing_is_utf8_safe() {
        let input = InputBuffer::new();
        for c in "Désolé".chars() {
            input.insert_char(c);
        }
        input.move_left();
        input.backspace();
        assert_eq!(input.value(), "Désoé");
        assert_eq!(input.cursor(), 4);

        input.move_home();
        input.delete();
        assert_eq!(input.value(), "ésoé");

        input.move_end();
        input.insert_char('!');
        assert_eq!(input.value(), "ésoé!");
    }

    #[test]
    fn test_input_clear_resets_cursor() {
        let input = InputBuffer::with_text("Hi");
        assert_eq!(input.cursor(), 2);
        input.clear();
        assert_eq!(input.value(), "");
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn test_clones_share_state() {
        let input = InputBuffer::new();
        let other = input.clone();
        other.set("shared");
        assert_eq!(input.value(), "shared");

        let log = ChatLog::new();
        log.clone().append(Message::user("x"));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_scroll_to_bottom_shows_last_line() {
        let log = ChatLog::new();
        log.set_viewport(20, 5);
        for i in 0..4 {
            log.append(Message::bot(format!("reply {}", i)));
        }
        log.scroll_to_bottom();
        // 4 messages of 3 rows each in a 5 row viewport
        assert_eq!(log.scroll(), 7);
    }

    #[test]
    fn test_scroll_to_bottom_stays_at_zero_when_log_fits() {
        let log = ChatLog::new();
        log.set_viewport(40, 10);
        log.append(Message::user("Hi"));
        log.scroll_to_bottom();
        assert_eq!(log.scroll(), 0);
    }

    #[test]
    fn test_manual_scroll_is_clamped() {
        let log = ChatLog::new();
        log.set_viewport(20, 5);
        for i in 0..4 {
            log.append(Message::user(format!("line {}", i)));
        }
        log.scroll_down(100);
        assert_eq!(log.scroll(), 7);
        log.scroll_up(3);
        assert_eq!(log.scroll(), 4);
        log.scroll_to_top();
        assert_eq!(log.scroll(), 0);
    }
}
