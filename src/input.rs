use crossterm::event::{KeyCode, MouseButton};

/// The three measured input classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum InputKind {
    #[strum(serialize = "Left Click")]
    LeftClick,
    #[strum(serialize = "Right Click")]
    RightClick,
    #[strum(serialize = "Key Press")]
    KeyPress,
}

/// Normalize a raw key name for display and history.
///
/// " " becomes "Space", "Escape" becomes "Esc", any other multi-character
/// name is title-cased, single characters pass through unchanged (so "a" and
/// "A" stay distinct).
pub fn normalize_key_name(raw: &str) -> String {
    match raw {
        " " => "Space".to_string(),
        "Escape" => "Esc".to_string(),
        name if name.chars().count() > 1 => {
            let mut chars = name.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        }
        name => name.to_string(),
    }
}

/// Map a terminal key press to its measured `(kind, label)` pair.
///
/// Returns None for keys that never count as input (media keys etc).
pub fn from_key_code(code: KeyCode) -> Option<(InputKind, String)> {
    let raw = match code {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Esc => "Escape".to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "BackTab".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Insert => "Insert".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::Up => "ArrowUp".to_string(),
        KeyCode::Down => "ArrowDown".to_string(),
        KeyCode::Left => "ArrowLeft".to_string(),
        KeyCode::Right => "ArrowRight".to_string(),
        KeyCode::F(n) => format!("F{n}"),
        _ => return None,
    };

    Some((InputKind::KeyPress, normalize_key_name(&raw)))
}

/// Map a mouse button press to its measured `(kind, label)` pair.
pub fn from_mouse_button(button: MouseButton) -> Option<(InputKind, String)> {
    match button {
        MouseButton::Left => Some((InputKind::LeftClick, InputKind::LeftClick.to_string())),
        MouseButton::Right => Some((InputKind::RightClick, InputKind::RightClick.to_string())),
        MouseButton::Middle => None,
    }
}
