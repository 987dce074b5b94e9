use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::app::{App, View};

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),
        KeyCode::Char('1') => app.set_view(View::Parameters),
        KeyCode::Char('2') => app.set_view(View::Link),
        KeyCode::Char('3') => app.set_view(View::Controls),

        // Navigation (up/down for items, left/right for tabs)
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        // Toggle the selected switch
        KeyCode::Enter | KeyCode::Char(' ') => app.activate(),

        // Sources
        KeyCode::Char('u') => app.upload(),
        KeyCode::Char('g') => app.use_simulation(),
        KeyCode::Char('c') => app.clear(),
        KeyCode::Char('r') => {
            let appended = app.tick();
            app.set_status_message(format!("Refreshed ({} new readings)", appended));
        }

        KeyCode::Char('?') => app.toggle_help(),

        // Export
        KeyCode::Char('e') => {
            let export_path = std::path::PathBuf::from("benchwatch_export.json");
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, content_start_row: u16) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        MouseEventKind::Down(MouseButton::Left) => {
            let clicked_row = mouse.row;

            // Rows below the table header map to list items
            if clicked_row > content_start_row {
                let item_row = (clicked_row - content_start_row - 1) as usize;
                match app.current_view {
                    View::Parameters if item_row < app.session.table().len() => {
                        app.selected_parameter = item_row;
                    }
                    View::Controls if item_row < crate::data::Switch::ALL.len() => {
                        app.selected_switch = item_row;
                    }
                    _ => {}
                }
            }

            // Tab row sits right under the header
            if clicked_row == 1 {
                let col = mouse.column;
                // Approximate tab positions: Parameters (0-14), RS422 Link (15-30), Controls (31-42)
                if col < 15 {
                    app.set_view(View::Parameters);
                } else if col < 31 {
                    app.set_view(View::Link);
                } else if col < 43 {
                    app.set_view(View::Controls);
                }
            }
        }

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::session::Session;

    fn app() -> App {
        let settings = Settings {
            seed: Some(1),
            ..Settings::default()
        };
        App::new(Session::new(&settings).unwrap(), None)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_number_keys_switch_views() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('3')));
        assert_eq!(app.current_view, View::Controls);
        handle_key_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.current_view, View::Parameters);
    }

    #[test]
    fn test_space_toggles_switch() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('3')));
        handle_key_event(&mut app, key(KeyCode::Down));
        handle_key_event(&mut app, key(KeyCode::Char(' ')));
        assert!(app.session.controls().eom);
    }

    #[test]
    fn test_help_swallows_next_key() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.show_help);
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.show_help);
        assert!(app.running);
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.running);
    }
}
