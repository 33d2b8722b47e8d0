/// Keys the controller understands. Everything else maps to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowRight,
    ArrowLeft,
    Space,
    PageDown,
    PageUp,
    Home,
    End,
    Escape,
    Char(char),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    /// The event was delivered while a text field had focus.
    pub from_text_input: bool,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            from_text_input: false,
        }
    }

    pub fn in_text_input(key: Key) -> Self {
        Self {
            key,
            from_text_input: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    First,
    Last,
    ToggleFullscreen,
    ExitFullscreen,
    /// Jump to a 1-based slide number.
    Jump(usize),
}

impl Command {
    /// Whether the host should suppress the key's default action.
    pub fn prevents_default(self) -> bool {
        !matches!(self, Command::ExitFullscreen | Command::Jump(_))
    }
}

pub fn binding(key: Key) -> Option<Command> {
    match key {
        Key::ArrowRight | Key::Space | Key::PageDown => Some(Command::Next),
        Key::ArrowLeft | Key::PageUp => Some(Command::Previous),
        Key::Home => Some(Command::First),
        Key::End => Some(Command::Last),
        Key::Char('f' | 'F') => Some(Command::ToggleFullscreen),
        Key::Escape => Some(Command::ExitFullscreen),
        Key::Char(c @ '1'..='9') => c.to_digit(10).map(|d| Command::Jump(d as usize)),
        Key::Char(' ') => Some(Command::Next),
        _ => None,
    }
}
