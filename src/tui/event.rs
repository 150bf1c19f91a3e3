use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};

/// TUI-specific input events
pub enum TuiEvent {
    // Core actions (translated to core::Action in the run loop)
    ForceQuit,
    Submit,
    Back,
    Logout,
    OpenNotification,

    // TUI-local events (handled directly in the run loop)
    InputChar(char),
    Backspace,
    Escape,
    Resize,
}

/// Poll for an event with a timeout.
pub fn poll_event_timeout(timeout: std::time::Duration) -> std::io::Result<Option<TuiEvent>> {
    if !event::poll(timeout)? {
        return Ok(None);
    }
    match event::read()? {
        Event::Key(key_event) => {
            if key_event.kind == KeyEventKind::Release {
                return Ok(None);
            }
            log::debug!(
                "Key event: {:?} with modifiers {:?}",
                key_event.code,
                key_event.modifiers
            );
            Ok(match (key_event.modifiers, key_event.code) {
                (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(TuiEvent::ForceQuit),
                (KeyModifiers::CONTROL, KeyCode::Char('b')) => Some(TuiEvent::Back),
                (KeyModifiers::CONTROL, KeyCode::Char('l')) => Some(TuiEvent::Logout),
                (KeyModifiers::CONTROL, KeyCode::Char('o')) => Some(TuiEvent::OpenNotification),
                (_, KeyCode::Char(c)) => Some(TuiEvent::InputChar(c)),
                (_, KeyCode::Backspace) => Some(TuiEvent::Backspace),
                (_, KeyCode::Enter) => Some(TuiEvent::Submit),
                (_, KeyCode::Esc) => Some(TuiEvent::Escape),
                _ => None,
            })
        }
        Event::Resize(_, _) => Ok(Some(TuiEvent::Resize)),
        _ => Ok(None),
    }
}
