//! Kanban board state
//!
//! Three fixed columns of cards persisted under
//! [`KANBAN_STORAGE_KEY`](crate::consts::KANBAN_STORAGE_KEY). Cards move one
//! column at a time and can be recolored, edited and sorted by title.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::consts::KANBAN_STORAGE_KEY;
use crate::persistence::Storage;
use crate::store::{Commit, ObservableStore};

/// Title given to new cards (and to cards whose title is cleared)
pub const DEFAULT_TITLE: &str = "New card";
/// Content given to new cards (and to cards whose content is cleared)
pub const DEFAULT_CONTENT: &str = "Type card content...";

/// Board columns, left to right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Todo,
    InProgress,
    Done,
}

impl Column {
    pub const ALL: [Column; 3] = [Column::Todo, Column::InProgress, Column::Done];

    /// Stable id, used as the storage field name and DOM id
    pub fn id(&self) -> &'static str {
        match self {
            Column::Todo => "todo",
            Column::InProgress => "in-progress",
            Column::Done => "done",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Column::Todo => "To do",
            Column::InProgress => "In progress",
            Column::Done => "Done",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Column::ALL.into_iter().find(|c| c.id() == id)
    }

    fn index(&self) -> usize {
        match self {
            Column::Todo => 0,
            Column::InProgress => 1,
            Column::Done => 2,
        }
    }

    /// Adjacent column in `direction`, None at the board edge
    pub fn neighbor(&self, direction: Direction) -> Option<Column> {
        let index = match direction {
            Direction::Left => self.index().checked_sub(1)?,
            Direction::Right => self.index() + 1,
        };
        Column::ALL.get(index).copied()
    }

    pub fn is_first(&self) -> bool {
        self.neighbor(Direction::Left).is_none()
    }

    pub fn is_last(&self) -> bool {
        self.neighbor(Direction::Right).is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Editable text fields of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardField {
    Title,
    Content,
}

impl CardField {
    pub const ALL: [CardField; 2] = [CardField::Title, CardField::Content];

    pub fn default_text(&self) -> &'static str {
        match self {
            CardField::Title => DEFAULT_TITLE,
            CardField::Content => DEFAULT_CONTENT,
        }
    }

    /// Value of the `data-field` attribute on the editable element
    pub fn as_str(&self) -> &'static str {
        match self {
            CardField::Title => "title",
            CardField::Content => "content",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "title" => Some(CardField::Title),
            "content" => Some(CardField::Content),
            _ => None,
        }
    }

    /// CSS class of the editable element
    pub fn css_class(&self) -> &'static str {
        match self {
            CardField::Title => "card-title",
            CardField::Content => "card-content",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Card {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub color: String,
}

impl Card {
    pub fn new(id: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: DEFAULT_TITLE.to_string(),
            content: DEFAULT_CONTENT.to_string(),
            color: color.into(),
        }
    }

    pub fn text(&self, field: CardField) -> &str {
        match field {
            CardField::Title => &self.title,
            CardField::Content => &self.content,
        }
    }

    fn text_mut(&mut self, field: CardField) -> &mut String {
        match field {
            CardField::Title => &mut self.title,
            CardField::Content => &mut self.content,
        }
    }
}

/// Whole kanban board: the unit of persistence and notification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    #[serde(rename = "todo", default)]
    pub todo: Vec<Card>,
    #[serde(rename = "in-progress", default)]
    pub in_progress: Vec<Card>,
    #[serde(rename = "done", default)]
    pub done: Vec<Card>,
}

impl Board {
    pub fn column(&self, column: Column) -> &[Card] {
        match column {
            Column::Todo => &self.todo,
            Column::InProgress => &self.in_progress,
            Column::Done => &self.done,
        }
    }

    pub fn column_mut(&mut self, column: Column) -> &mut Vec<Card> {
        match column {
            Column::Todo => &mut self.todo,
            Column::InProgress => &mut self.in_progress,
            Column::Done => &mut self.done,
        }
    }

    /// Column and position of the card with `id`
    pub fn locate(&self, id: &str) -> Option<(Column, usize)> {
        Column::ALL.into_iter().find_map(|column| {
            self.column(column)
                .iter()
                .position(|c| c.id == id)
                .map(|index| (column, index))
        })
    }

    pub fn card(&self, id: &str) -> Option<&Card> {
        let (column, index) = self.locate(id)?;
        self.column(column).get(index)
    }

    fn card_mut(&mut self, id: &str) -> Option<&mut Card> {
        let (column, index) = self.locate(id)?;
        self.column_mut(column).get_mut(index)
    }

    pub fn card_count(&self, column: Column) -> usize {
        self.column(column).len()
    }

    pub fn total_cards(&self) -> usize {
        Column::ALL.iter().map(|c| self.card_count(*c)).sum()
    }
}

/// Case-insensitive, accent-folded title order ("ą" sorts with "a")
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    fold_title(a)
        .cmp(&fold_title(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
}

fn fold_title(title: &str) -> String {
    title
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

pub type KanbanStore<S> = ObservableStore<Board, S>;

impl<S: Storage> ObservableStore<Board, S> {
    /// Load the kanban board from its storage key
    pub fn open(storage: S) -> Self {
        Self::initialize(storage, KANBAN_STORAGE_KEY)
    }

    /// Append a default card to `column`
    pub fn add_card(&mut self, column: Column, id: impl Into<String>, color: impl Into<String>) -> Commit {
        let card = Card::new(id, color);
        self.update(move |board| {
            board.column_mut(column).push(card);
            true
        })
    }

    pub fn delete_card(&mut self, id: &str) -> Commit {
        self.update(|board| match board.locate(id) {
            Some((column, index)) => {
                board.column_mut(column).remove(index);
                true
            }
            None => false,
        })
    }

    /// Set a card's title or content; blank text restores the field default
    pub fn edit_card(&mut self, id: &str, field: CardField, text: &str) -> Commit {
        let text = match text.trim() {
            "" => field.default_text(),
            trimmed => trimmed,
        };
        self.update(|board| match board.card_mut(id) {
            Some(card) if card.text(field) != text => {
                *card.text_mut(field) = text.to_string();
                true
            }
            _ => false,
        })
    }

    pub fn set_card_color(&mut self, id: &str, color: &str) -> Commit {
        self.update(|board| match board.card_mut(id) {
            Some(card) if card.color != color => {
                card.color = color.to_string();
                true
            }
            _ => false,
        })
    }

    /// Move a card to the end of the adjacent column; no-op at the edges
    pub fn move_card(&mut self, id: &str, direction: Direction) -> Commit {
        self.update(|board| {
            let Some((from, index)) = board.locate(id) else {
                return false;
            };
            let Some(to) = from.neighbor(direction) else {
                return false;
            };
            let card = board.column_mut(from).remove(index);
            log::debug!("Moving `{}` from {} to {}", card.id, from.id(), to.id());
            board.column_mut(to).push(card);
            true
        })
    }

    /// Give every card in `column` the same `color`
    pub fn recolor_column(&mut self, column: Column, color: &str) -> Commit {
        self.update(|board| {
            let mut changed = false;
            for card in board.column_mut(column).iter_mut() {
                if card.color != color {
                    card.color = color.to_string();
                    changed = true;
                }
            }
            changed
        })
    }

    /// Give a color to every card stored without one (older or hand-edited saves)
    pub fn assign_missing_colors<F>(&mut self, mut color_fn: F) -> Commit
    where
        F: FnMut() -> String,
    {
        self.update(|board| {
            let mut changed = false;
            for column in Column::ALL {
                for card in board.column_mut(column).iter_mut() {
                    if card.color.is_empty() {
                        card.color = color_fn();
                        changed = true;
                    }
                }
            }
            changed
        })
    }

    /// Stable sort of `column` by [`compare_titles`]
    pub fn sort_column(&mut self, column: Column) -> Commit {
        self.update(|board| {
            let cards = board.column_mut(column);
            let sorted = cards
                .windows(2)
                .all(|w| compare_titles(&w[0].title, &w[1].title) != Ordering::Greater);
            if sorted {
                return false;
            }
            cards.sort_by(|a, b| compare_titles(&a.title, &b.title));
            true
        })
    }

    pub fn card_count(&self, column: Column) -> usize {
        self.state().card_count(column)
    }
}
