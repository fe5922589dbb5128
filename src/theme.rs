use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => f.write_str("light"),
            Theme::Dark => f.write_str("dark"),
        }
    }
}

/// "Renderer should apply theme X". The core never touches the display
/// itself; renderers subscribe and apply whatever they receive.
#[derive(Debug, Clone)]
pub struct ThemeSignal {
    tx: Arc<watch::Sender<Theme>>,
}

impl Default for ThemeSignal {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

impl ThemeSignal {
    pub fn new(initial: Theme) -> Self {
        let (tx, _rx) = watch::channel(initial);
        ThemeSignal { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> Theme {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Theme> {
        self.tx.subscribe()
    }

    /// Flips the theme and returns the new value.
    pub fn toggle(&self) -> Theme {
        let mut next = Theme::default();
        self.tx.send_modify(|theme| {
            *theme = theme.toggled();
            next = *theme;
        });
        next
    }
}
