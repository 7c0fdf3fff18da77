//! Shape board state
//!
//! A flat, insertion-ordered list of colored shapes persisted under
//! [`SHAPES_STORAGE_KEY`](crate::consts::SHAPES_STORAGE_KEY).

use serde::{Deserialize, Serialize};

use crate::consts::SHAPES_STORAGE_KEY;
use crate::persistence::Storage;
use crate::store::{Commit, ObservableStore};

/// Shape types the board knows how to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Square,
    Circle,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 2] = [ShapeKind::Square, ShapeKind::Circle];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Square => "square",
            ShapeKind::Circle => "circle",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "square" => Some(ShapeKind::Square),
            "circle" => Some(ShapeKind::Circle),
            _ => None,
        }
    }
}

/// One shape on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Opaque id, unique across the live collection
    pub id: String,
    /// Category tag, e.g. "square" or "circle"
    #[serde(rename = "type")]
    pub kind: String,
    /// CSS color value
    pub color: String,
}

impl Record {
    /// The known shape type of this record, if any
    pub fn shape_kind(&self) -> Option<ShapeKind> {
        ShapeKind::from_str(&self.kind)
    }
}

/// Whole shape board: the unit of persistence and notification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    #[serde(default)]
    pub shapes: Vec<Record>,
}

impl State {
    pub fn count_by_type(&self, kind: &str) -> usize {
        self.shapes.iter().filter(|s| s.kind == kind).count()
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }
}

pub type ShapeStore<S> = ObservableStore<State, S>;

impl<S: Storage> ObservableStore<State, S> {
    /// Load the shape board from its storage key
    pub fn open(storage: S) -> Self {
        Self::initialize(storage, SHAPES_STORAGE_KEY)
    }

    /// Append a shape. The caller supplies a unique `id`.
    pub fn add_record(
        &mut self,
        kind: impl Into<String>,
        color: impl Into<String>,
        id: impl Into<String>,
    ) -> Commit {
        let record = Record {
            id: id.into(),
            kind: kind.into(),
            color: color.into(),
        };
        log::debug!("Adding {} `{}`", record.kind, record.id);
        self.update(move |state| {
            state.shapes.push(record);
            true
        })
    }

    /// Remove the shape with `id`; unknown ids leave the board untouched
    pub fn remove_record(&mut self, id: &str) -> Commit {
        self.update(|state| {
            let before = state.shapes.len();
            state.shapes.retain(|s| s.id != id);
            state.shapes.len() != before
        })
    }

    /// Give every shape of `kind` a fresh color from `color_fn`
    ///
    /// `color_fn` is called once per matching record with its current value.
    /// One persist and one notification cover the whole batch.
    pub fn recolor_by_type<F>(&mut self, kind: &str, mut color_fn: F) -> Commit
    where
        F: FnMut(&Record) -> String,
    {
        self.update(|state| {
            let mut changed = false;
            for record in state.shapes.iter_mut().filter(|s| s.kind == kind) {
                record.color = color_fn(&*record);
                changed = true;
            }
            changed
        })
    }

    pub fn count_by_type(&self, kind: &str) -> usize {
        self.state().count_by_type(kind)
    }
}
