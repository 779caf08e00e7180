//! Keyboard navigation intents.
//!
//! `KeyboardNavigationRouter` turns raw key events into `NavigationAction`s.
//! Keys outside the allow-list are dropped before they reach the channel.
//! Every subscriber gets its own receiver; a slow subscriber lags on its own
//! without holding up the others.

use std::fmt;
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use serde::Serialize;
use tokio::sync::broadcast;

use dashbrowse_config::constants::DEFAULT_NAVIGATION_CHANNEL_CAPACITY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationAction {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Escape,
}

impl NavigationAction {
    pub fn from_key_code(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Up => Some(Self::Up),
            KeyCode::Down => Some(Self::Down),
            KeyCode::Left => Some(Self::Left),
            KeyCode::Right => Some(Self::Right),
            KeyCode::Enter => Some(Self::Enter),
            KeyCode::Esc => Some(Self::Escape),
            _ => None,
        }
    }

    /// Map a key event; releases are ignored.
    pub fn from_key_event(event: &KeyEvent) -> Option<Self> {
        if event.kind == KeyEventKind::Release {
            return None;
        }
        Self::from_key_code(event.code)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "ArrowUp",
            Self::Down => "ArrowDown",
            Self::Left => "ArrowLeft",
            Self::Right => "ArrowRight",
            Self::Enter => "Enter",
            Self::Escape => "Escape",
        }
    }
}

impl fmt::Display for NavigationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a key name is not a navigation key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKey(pub String);

impl fmt::Display for UnknownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a navigation key", self.0)
    }
}

impl std::error::Error for UnknownKey {}

impl FromStr for NavigationAction {
    type Err = UnknownKey;

    /// Accepts `ArrowUp`, `up`, `Enter`, `esc` and similar spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let name = lower.strip_prefix("arrow").unwrap_or(&lower);
        match name {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "enter" | "return" => Ok(Self::Enter),
            "escape" | "esc" => Ok(Self::Escape),
            _ => Err(UnknownKey(s.to_string())),
        }
    }
}

/// Fan-out of navigation intents.
#[derive(Debug, Clone)]
pub struct KeyboardNavigationRouter {
    tx: broadcast::Sender<NavigationAction>,
}

impl Default for KeyboardNavigationRouter {
    fn default() -> Self {
        Self::new(DEFAULT_NAVIGATION_CHANNEL_CAPACITY)
    }
}

impl KeyboardNavigationRouter {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Handle a raw key press. Returns the emitted intent, if any.
    pub fn on_key_down(&self, event: KeyEvent) -> Option<NavigationAction> {
        let action = NavigationAction::from_key_event(&event)?;
        self.emit(action);
        Some(action)
    }

    /// Emit an already mapped intent.
    pub fn emit(&self, action: NavigationAction) {
        // No subscribers is fine; intents are not buffered for late subscribers.
        let _ = self.tx.send(action);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NavigationAction> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
