//! Input handling for the TUI.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

use super::app::{Action, PromptKey, View};

/// Convert a crossterm key event to an Action. The keymap is
/// view-aware: letters mean different things per tab.
pub fn handle_key_event(key: KeyEvent, view: &View) -> Option<Action> {
    // Global bindings first
    match key.code {
        KeyCode::Char('q') => return Some(Action::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return Some(Action::Quit);
        }
        KeyCode::Esc => return Some(Action::Back),
        KeyCode::Tab => return Some(Action::NextTab),
        KeyCode::Char(c @ '1'..='5') => {
            return Some(Action::Tab(c as usize - '1' as usize));
        }
        KeyCode::Up | KeyCode::Char('k') => return Some(Action::Up),
        KeyCode::Down | KeyCode::Char('j') => return Some(Action::Down),
        KeyCode::Enter | KeyCode::Char(' ') => return Some(Action::Select),
        KeyCode::Char('r') | KeyCode::F(5) => return Some(Action::Refresh),
        KeyCode::Left | KeyCode::Right => {
            if matches!(view, View::Crawl { .. }) {
                return Some(Action::SwitchPane);
            }
            return None;
        }
        _ => {}
    }

    match view {
        View::Crawl { .. } => match key.code {
            KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::WorkersUp),
            KeyCode::Char('-') => Some(Action::WorkersDown),
            KeyCode::Char(']') => Some(Action::RunsUp),
            KeyCode::Char('[') => Some(Action::RunsDown),
            KeyCode::Char('a') => Some(Action::SelectAll),
            KeyCode::Char('n') => Some(Action::ClearAll),
            KeyCode::Char('s') => Some(Action::Start),
            KeyCode::Char('x') => Some(Action::Stop),
            KeyCode::Char('c') => Some(Action::ClearLogs),
            KeyCode::Char('f') => Some(Action::CycleLogFilter),
            _ => None,
        },
        View::Files { .. } => match key.code {
            KeyCode::Char('b') => Some(Action::ToggleDbMode),
            KeyCode::Char('d') => Some(Action::Download),
            _ => None,
        },
        View::Routes { .. } => match key.code {
            KeyCode::Char('a') => Some(Action::Add),
            KeyCode::Char('m') => Some(Action::Rename),
            KeyCode::Char('d') => Some(Action::Delete),
            KeyCode::Char('y') => Some(Action::Duplicate),
            KeyCode::Char('u') => Some(Action::EditUrl),
            KeyCode::Char('U') => Some(Action::DropUrl),
            KeyCode::Char('t') => Some(Action::TestUrl),
            KeyCode::Char('s') | KeyCode::Char('/') => Some(Action::Search),
            KeyCode::Char('f') => Some(Action::CycleStatusFilter),
            _ => None,
        },
        View::Analytics => match key.code {
            KeyCode::Char('a') => Some(Action::RunAnalytics),
            KeyCode::Char('c') => Some(Action::Compare),
            KeyCode::Char('t') => Some(Action::Train),
            _ => None,
        },
        View::Predictions { .. } => match key.code {
            KeyCode::Char('p') => Some(Action::Predict),
            KeyCode::Char('h') => Some(Action::History),
            KeyCode::Char('/') => Some(Action::Search),
            _ => None,
        },
    }
}

/// Convert a crossterm Event to an Action.
pub fn handle_event(event: Event, view: &View) -> Option<Action> {
    match event {
        Event::Key(key) => handle_key_event(key, view),
        _ => None,
    }
}

/// Translate a crossterm Event for an open prompt. Takes precedence
/// over the keymap while a prompt is up.
pub fn handle_prompt_event(event: Event) -> Option<PromptKey> {
    let Event::Key(key) = event else {
        return None;
    };
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(PromptKey::Cancel)
        }
        KeyCode::Char(c) => Some(PromptKey::Char(c)),
        KeyCode::Backspace => Some(PromptKey::Backspace),
        KeyCode::Enter => Some(PromptKey::Submit),
        KeyCode::Esc => Some(PromptKey::Cancel),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::app::CrawlPane;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn letters_are_view_scoped() {
        let crawl = View::Crawl {
            pane: CrawlPane::Routes,
            selected: 0,
        };
        let routes = View::Routes { selected: 0 };

        assert_eq!(
            handle_key_event(key(KeyCode::Char('s')), &crawl),
            Some(Action::Start)
        );
        assert_eq!(
            handle_key_event(key(KeyCode::Char('s')), &routes),
            Some(Action::Search)
        );
        assert_eq!(handle_key_event(key(KeyCode::Char('s')), &View::Analytics), None);
    }

    #[test]
    fn number_keys_switch_tabs() {
        assert_eq!(
            handle_key_event(key(KeyCode::Char('3')), &View::Analytics),
            Some(Action::Tab(2))
        );
    }

    #[test]
    fn quit_works_everywhere() {
        assert_eq!(
            handle_key_event(key(KeyCode::Char('q')), &View::Analytics),
            Some(Action::Quit)
        );
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(
            handle_key_event(ctrl_c, &View::Predictions { selected: 0 }),
            Some(Action::Quit)
        );
    }

    #[test]
    fn prompt_keys_take_text() {
        assert_eq!(
            handle_prompt_event(Event::Key(key(KeyCode::Char('x')))),
            Some(PromptKey::Char('x'))
        );
        assert_eq!(
            handle_prompt_event(Event::Key(key(KeyCode::Enter))),
            Some(PromptKey::Submit)
        );
        assert_eq!(
            handle_prompt_event(Event::Key(key(KeyCode::Esc))),
            Some(PromptKey::Cancel)
        );
    }
}
