//! Kanban button routing
//!
//! Board buttons carry `data-action`, plus `data-column-id` or `data-id`.
//! The DOM layer reads those attributes and hands them here; everything from
//! parsing to the store call is plain Rust.

use crate::kanban::{Column, Direction, KanbanStore};
use crate::palette::{ColorGenerator, IdGenerator};
use crate::persistence::Storage;
use crate::store::Commit;

pub const ADD: &str = "add";
pub const COLOR_COLUMN: &str = "color-column";
pub const SORT: &str = "sort";
pub const DELETE: &str = "delete";
pub const MOVE_LEFT: &str = "move-left";
pub const MOVE_RIGHT: &str = "move-right";

/// A kanban button press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KanbanAction {
    Add(Column),
    ColorColumn(Column),
    Sort(Column),
    Delete(String),
    Move(String, Direction),
}

impl KanbanAction {
    /// Build an action from a button's data attributes
    ///
    /// Column actions need a known column id, card actions a card id.
    pub fn parse(action: &str, column_id: Option<&str>, card_id: Option<&str>) -> Option<Self> {
        let column = column_id.and_then(Column::from_id);
        let card = card_id.map(str::to_string);
        match action {
            ADD => column.map(KanbanAction::Add),
            COLOR_COLUMN => column.map(KanbanAction::ColorColumn),
            SORT => column.map(KanbanAction::Sort),
            DELETE => card.map(KanbanAction::Delete),
            MOVE_LEFT => card.map(|id| KanbanAction::Move(id, Direction::Left)),
            MOVE_RIGHT => card.map(|id| KanbanAction::Move(id, Direction::Right)),
            _ => None,
        }
    }

    /// Run the action against `store`
    ///
    /// `confirm_delete` is only consulted for deletions; returning false cancels.
    pub fn apply<S: Storage>(
        self,
        store: &mut KanbanStore<S>,
        colors: &mut ColorGenerator,
        ids: &mut IdGenerator,
        confirm_delete: impl FnOnce() -> bool,
    ) -> Commit {
        match self {
            KanbanAction::Add(column) => {
                let color = colors.next_color();
                let id = ids.fresh_id(|id| store.state().card(id).is_some());
                store.add_card(column, id, color)
            }
            KanbanAction::ColorColumn(column) => {
                let color = colors.next_color();
                store.recolor_column(column, &color)
            }
            KanbanAction::Sort(column) => store.sort_column(column),
            KanbanAction::Delete(id) => {
                if store.state().card(&id).is_none() || !confirm_delete() {
                    return Commit::Unchanged;
                }
                store.delete_card(&id)
            }
            KanbanAction::Move(id, direction) => store.move_card(&id, direction),
        }
    }
}
