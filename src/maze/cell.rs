use crossterm::style::{Color, Stylize};

use std::fmt;

/// State of a single grid cell.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellState {
    #[default]
    Wall,
    Passage,
    /// The entrance chosen by a builder.
    Start,
    /// The exit chosen by a builder.
    End,
}

impl CellState {
    /// The width of each cell when rendered, in character widths.
    pub const CELL_WIDTH: u16 = 2;

    /// Character used for this state in the plain-text grid notation.
    pub fn symbol(self) -> char {
        match self {
            CellState::Wall => '#',
            CellState::Passage => '.',
            CellState::Start => 'S',
            CellState::End => 'E',
        }
    }

    pub fn from_symbol(ch: char) -> Option<Self> {
        match ch {
            '#' => Some(CellState::Wall),
            '.' => Some(CellState::Passage),
            'S' => Some(CellState::Start),
            'E' => Some(CellState::End),
            _ => None,
        }
    }

    /// Anything but a wall can be walked through.
    pub fn is_open(self) -> bool {
        self != CellState::Wall
    }
}

impl fmt::Display for CellState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let styled_symbol = match self {
            CellState::Wall => "⬜".with(Color::White),
            CellState::Passage => "  ".with(Color::Reset),
            CellState::Start => "🟩".with(Color::Green),
            CellState::End => "🟥".with(Color::Red),
        };

        #[cfg(debug_assertions)]
        {
            use unicode_width::UnicodeWidthStr;
            assert_eq!(
                styled_symbol.content().width(),
                CellState::CELL_WIDTH as usize,
                "Each cell must occupy exactly two character widths."
            );
        }

        write!(f, "{}", styled_symbol)
    }
}
