//! Indicator colours for the push/pull labels

use super::classifier::GestureState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    Gray,
    White,
    Green,
    Red,
}

impl Color {
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Black => "black",
            Color::Gray => "gray",
            Color::White => "white",
            Color::Green => "green",
            Color::Red => "red",
        }
    }
}

/// Text and background colour of one label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelStyle {
    pub text: Color,
    pub background: Color,
}

impl LabelStyle {
    const DIMMED: LabelStyle = LabelStyle {
        text: Color::Gray,
        background: Color::White,
    };

    fn highlighted(background: Color) -> Self {
        Self {
            text: Color::Black,
            background,
        }
    }

    pub fn is_highlighted(&self) -> bool {
        *self != Self::DIMMED
    }
}

/// Styling of the push and pull labels for a gesture state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorStyle {
    pub push: LabelStyle,
    pub pull: LabelStyle,
}

impl IndicatorStyle {
    pub fn for_state(state: GestureState) -> Self {
        match state {
            GestureState::Push => Self {
                push: LabelStyle::highlighted(Color::Green),
                pull: LabelStyle::DIMMED,
            },
            GestureState::Pull => Self {
                push: LabelStyle::DIMMED,
                pull: LabelStyle::highlighted(Color::Red),
            },
            GestureState::None => Self {
                push: LabelStyle::DIMMED,
                pull: LabelStyle::DIMMED,
            },
        }
    }
}
