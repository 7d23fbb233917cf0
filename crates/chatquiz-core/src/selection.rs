use serde::{Deserialize, Serialize};

/// One of the four option letters an assistant question can offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Letter {
    A,
    B,
    C,
    D,
}

impl Letter {
    pub const ALL: [Letter; 4] = [Letter::A, Letter::B, Letter::C, Letter::D];

    pub fn as_char(self) -> char {
        match self {
            Letter::A => 'A',
            Letter::B => 'B',
            Letter::C => 'C',
            Letter::D => 'D',
        }
    }

    /// The literal marker that starts an option line, e.g. `(A)`
    pub fn marker(self) -> &'static str {
        match self {
            Letter::A => "(A)",
            Letter::B => "(B)",
            Letter::C => "(C)",
            Letter::D => "(D)",
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            _ => None,
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Letter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl std::str::FromStr for Letter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Letter::from_char(c).ok_or_else(|| format!("Unknown option: {}", s)),
            _ => Err(format!("Unknown option: {}", s)),
        }
    }
}

/// How an option line was attached to the text in front of it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Joint {
    /// Appended directly: the input was empty or already ended in a newline
    Bare,
    /// A newline separator was inserted before the line
    Newline,
}

/// Which option letters are currently merged into the answer text.
///
/// Each slot also remembers how its line was joined so that deselecting
/// restores the input exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    slots: [Option<Joint>; 4],
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selected(&self, letter: Letter) -> bool {
        self.slots[letter.index()].is_some()
    }

    /// Selected letters in A..D order
    pub fn selected(&self) -> impl Iterator<Item = Letter> + '_ {
        Letter::ALL
            .into_iter()
            .filter(|letter| self.is_selected(*letter))
    }

    /// True when a letter other than `letter` is selected
    pub fn any_other_selected(&self, letter: Letter) -> bool {
        self.selected().any(|l| l != letter)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn clear(&mut self) {
        self.slots = [None; 4];
    }

    pub(crate) fn joint(&self, letter: Letter) -> Option<Joint> {
        self.slots[letter.index()]
    }

    pub(crate) fn mark(&mut self, letter: Letter, joint: Joint) {
        self.slots[letter.index()] = Some(joint);
    }

    pub(crate) fn unmark(&mut self, letter: Letter) {
        self.slots[letter.index()] = None;
    }
}
