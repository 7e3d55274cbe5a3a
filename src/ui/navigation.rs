/// Screen stack: Home → Compare → Detail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Home,
    Compare,
    /// Details for one boat id
    Detail(String),
}

impl Screen {
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Home => "AI Compare Boats",
            Screen::Compare => "Compare Boats",
            Screen::Detail(_) => "Boat Details",
        }
    }
}

/// Navigation stack; the root screen is never popped
#[derive(Debug, Clone)]
pub struct Navigator {
    stack: Vec<Screen>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self {
            stack: vec![Screen::Home],
        }
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &Screen {
        // The stack always holds the root
        self.stack.last().unwrap_or(&Screen::Home)
    }

    pub fn push(&mut self, screen: Screen) {
        if self.current() != &screen {
            self.stack.push(screen);
        }
    }

    /// Go back one screen; returns the screen that was left
    pub fn pop(&mut self) -> Option<Screen> {
        if self.stack.len() > 1 {
            self.stack.pop()
        } else {
            None
        }
    }
}
