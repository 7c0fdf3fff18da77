//! Renderer reconciliation
//!
//! Turns state snapshots into the minimal set of element changes, keyed by
//! id. The DOM layer only applies what comes out of here.

use std::collections::BTreeMap;

use crate::kanban::{Board, CardField, Column};
use crate::shapes::State;

/// One element change for the shape board
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch {
    Create { id: String, kind: String, color: String },
    Recolor { id: String, color: String },
    Remove { id: String },
}

/// Mirror of the shape elements currently on screen (id -> color)
#[derive(Debug, Default)]
pub struct ShapeView {
    mounted: BTreeMap<String, String>,
}

impl ShapeView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff `state` against what is mounted and record the result as mounted
    ///
    /// Removals come first (by id), then creations and recolors in state order.
    pub fn reconcile(&mut self, state: &State) -> Vec<Patch> {
        let mut patches: Vec<Patch> = self
            .mounted
            .keys()
            .filter(|id| !state.contains(id))
            .map(|id| Patch::Remove { id: id.clone() })
            .collect();
        for patch in &patches {
            if let Patch::Remove { id } = patch {
                self.mounted.remove(id);
            }
        }

        for shape in &state.shapes {
            match self.mounted.get_mut(&shape.id) {
                Some(color) if *color != shape.color => {
                    *color = shape.color.clone();
                    patches.push(Patch::Recolor {
                        id: shape.id.clone(),
                        color: shape.color.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    self.mounted.insert(shape.id.clone(), shape.color.clone());
                    patches.push(Patch::Create {
                        id: shape.id.clone(),
                        kind: shape.kind.clone(),
                        color: shape.color.clone(),
                    });
                }
            }
        }

        patches
    }

    /// Forget `id`, e.g. when its element could not be created
    ///
    /// The next `reconcile` emits a fresh `Create` for it.
    pub fn unmount(&mut self, id: &str) -> bool {
        self.mounted.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.mounted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mounted.is_empty()
    }

    pub fn is_mounted(&self, id: &str) -> bool {
        self.mounted.contains_key(id)
    }
}

/// Text edit for a card already on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    pub id: String,
    pub field: CardField,
    pub text: String,
}

/// What the kanban renderer has to do for a new board
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardPatch {
    Nothing,
    /// Cards moved, appeared, disappeared or changed color
    Rebuild,
    /// Only titles/contents changed
    Retext(Vec<TextChange>),
}

/// Last board rendered by the kanban renderer
#[derive(Debug, Default)]
pub struct BoardView {
    rendered: Option<Board>,
}

impl BoardView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reconcile(&mut self, board: &Board) -> BoardPatch {
        let patch = match &self.rendered {
            None => BoardPatch::Rebuild,
            Some(prev) if !same_layout(prev, board) => BoardPatch::Rebuild,
            Some(prev) => {
                let changes = text_changes(prev, board);
                if changes.is_empty() {
                    BoardPatch::Nothing
                } else {
                    BoardPatch::Retext(changes)
                }
            }
        };
        if patch != BoardPatch::Nothing {
            self.rendered = Some(board.clone());
        }
        patch
    }
}

fn same_layout(a: &Board, b: &Board) -> bool {
    Column::ALL.into_iter().all(|column| {
        let (x, y) = (a.column(column), b.column(column));
        x.len() == y.len()
            && x
                .iter()
                .zip(y)
                .all(|(p, q)| p.id == q.id && p.color == q.color)
    })
}

fn text_changes(prev: &Board, next: &Board) -> Vec<TextChange> {
    let mut changes = Vec::new();
    for column in Column::ALL {
        for (old, new) in prev.column(column).iter().zip(next.column(column)) {
            for field in CardField::ALL {
                if old.text(field) != new.text(field) {
                    changes.push(TextChange {
                        id: new.id.clone(),
                        field,
                        text: new.text(field).to_string(),
                    });
                }
            }
        }
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kanban::Card;
    use crate::shapes::Record;

    fn shape(id: &str, color: &str) -> Record {
        Record {
            id: id.to_string(),
            kind: "square".to_string(),
            color: color.to_string(),
        }
    }

    #[test]
    fn test_first_render_creates_everything() {
        let mut view = ShapeView::new();
        let state = State {
            shapes: vec![shape("a", "red"), shape("b", "blue")],
        };
        let patches = view.reconcile(&state);
        assert_eq!(patches.len(), 2);
        assert!(matches!(&patches[0], Patch::Create { id, .. } if id == "a"));
        assert!(view.is_mounted("b"));
    }

    #[test]
    fn test_unchanged_state_yields_nothing() {
        let mut view = ShapeView::new();
        let state = State {
            shapes: vec![shape("a", "red")],
        };
        view.reconcile(&state);
        assert!(view.reconcile(&state).is_empty());
    }

    #[test]
    fn test_recolor_and_remove() {
        let mut view = ShapeView::new();
        view.reconcile(&State {
            shapes: vec![shape("a", "red"), shape("b", "blue"), shape("c", "green")],
        });

        let patches = view.reconcile(&State {
            shapes: vec![shape("b", "blue"), shape("c", "pink"), shape("d", "gray")],
        });
        assert_eq!(
            patches,
            vec![
                Patch::Remove { id: "a".to_string() },
                Patch::Recolor {
                    id: "c".to_string(),
                    color: "pink".to_string()
                },
                Patch::Create {
                    id: "d".to_string(),
                    kind: "square".to_string(),
                    color: "gray".to_string()
                },
            ]
        );
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn test_unmounted_shape_is_created_again() {
        let mut view = ShapeView::new();
        let state = State {
            shapes: vec![shape("a", "red")],
        };
        view.reconcile(&state);

        // Element creation failed: drop it so it is retried
        assert!(view.unmount("a"));
        assert!(!view.unmount("a"));
        assert_eq!(
            view.reconcile(&state),
            vec![Patch::Create {
                id: "a".to_string(),
                kind: "square".to_string(),
                color: "red".to_string()
            }]
        );
        assert!(view.reconcile(&state).is_empty());
    }

    fn board_with(cards: Vec<Card>) -> Board {
        Board {
            todo: cards,
            ..Board::default()
        }
    }

    #[test]
    fn test_board_first_render_rebuilds() {
        let mut view = BoardView::new();
        assert_eq!(view.reconcile(&Board::default()), BoardPatch::Rebuild);
        assert_eq!(view.reconcile(&Board::default()), BoardPatch::Nothing);
    }

    #[test]
    fn test_board_text_edit_retexts() {
        let mut view = BoardView::new();
        let mut board = board_with(vec![Card::new("c1", "#fff")]);
        view.reconcile(&board);

        board.todo[0].title = "Write tests".to_string();
        assert_eq!(
            view.reconcile(&board),
            BoardPatch::Retext(vec![TextChange {
                id: "c1".to_string(),
                field: CardField::Title,
                text: "Write tests".to_string(),
            }])
        );
        assert_eq!(view.reconcile(&board), BoardPatch::Nothing);
    }

    #[test]
    fn test_board_move_or_recolor_rebuilds() {
        let mut view = BoardView::new();
        let mut board = board_with(vec![Card::new("c1", "#fff")]);
        view.reconcile(&board);

        board.todo[0].color = "#000".to_string();
        assert_eq!(view.reconcile(&board), BoardPatch::Rebuild);

        let card = board.todo.remove(0);
        board.done.push(card);
        assert_eq!(view.reconcile(&board), BoardPatch::Rebuild);
    }
}
