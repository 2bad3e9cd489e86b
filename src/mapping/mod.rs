//! Modul für die Abbildung gehaltener Tasten auf Aktionen.
//!
//! Enthält die Binding-Tabellen, aus denen pro Gerät die Aktionsmasken
//! (`ActionMasks`) berechnet werden, sowie die Menü-Tastenzuordnung.
//!
//! ```text
//! KeyStateTable ──► update_binds ──► [Emulator, Player12, Player34]
//!                     (BindingTable)
//! ```

pub mod binds;
pub mod menu;

// Re-exports für einfacheren Zugriff
pub use binds::{ActionMasks, BindType, BindingTable, DefaultBind, BIND_TYPE_COUNT};
pub use menu::{MenuButtons, MenuInput, MenuKey, MenuMap};
