//! Pinboard - shape and kanban boards over an observable store
//!
//! Core modules:
//! - `store`: Observable state container (load → mutate → persist → notify)
//! - `shapes`: Shape board records and operations
//! - `kanban`: Three-column card board and operations
//! - `actions`: Kanban button routing
//! - `persistence`: Storage trait and JSON snapshots
//! - `platform`: Browser/native platform abstraction
//! - `palette`: Seeded color and id generators
//! - `settings`: Persisted preferences
//! - `view`: Keyed reconciliation for the renderers

pub mod actions;
pub mod kanban;
pub mod palette;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod shapes;
pub mod store;
pub mod view;

pub use kanban::{Board, Card, CardField, Column, Direction, KanbanStore};
pub use palette::{ColorGenerator, ColorScheme, IdGenerator};
pub use persistence::{LoadError, PersistError, Storage, StorageError};
pub use settings::Settings;
pub use shapes::{Record, ShapeKind, ShapeStore, State};
pub use store::{Commit, ObservableStore, SubscriptionId};

/// Storage keys and other fixed configuration
pub mod consts {
    /// Shape board snapshot
    pub const SHAPES_STORAGE_KEY: &str = "shapesAppState";
    /// Kanban board snapshot
    pub const KANBAN_STORAGE_KEY: &str = "kanbanState";
    /// User preferences
    pub const SETTINGS_STORAGE_KEY: &str = "pinboard_settings";
}
