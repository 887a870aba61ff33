//! Spotlight - command-palette search for the browser.
//!
//! Spotlight fuzzy-searches the current page's visible text and links, open
//! tabs, bookmarks and recent history from a single input, ranks the fused
//! results with a deterministic multi-tier comparator, and maps the selected
//! result back to an action: scroll to and highlight a page element, switch
//! to a tab, or open a URL.
//!
//! # Architecture
//!
//! The library is organized into these main modules:
//!
//! - [`core`] - Item model, page extraction, aggregation, fuzzy index, ranking
//! - [`overlay`] - Session lifecycle, event handling and dispatch
//! - [`executor`] - Mapping a selected item to an action
//! - [`platform`] - Collaborator traits (browser host, page document)
//! - [`services`] - Browser record shapes, in-memory document, localization
//! - [`config`] / [`settings`] - TOML configuration and the user settings blob
//!
//! # Example
//!
//! ```ignore
//! use spotlight::{Config, Overlay, UserSettings};
//! use spotlight::services::i18n::LocaleDir;
//!
//! let mut overlay = Overlay::new(Config::load(), UserSettings::default(), Box::new(LocaleDir::new("_locales")));
//! overlay.open(&document, &host).await;
//! overlay.set_query("github");
//! ```

// Public modules
pub mod cli;
pub mod config;
pub mod core;
pub mod events;
pub mod executor;
pub mod highlight;
pub mod logging;
pub mod overlay;
pub mod platform;
pub mod services;
pub mod session;
pub mod settings;

mod error;

// Re-export commonly used types for convenience
pub use config::{Config, Profile};
pub use crate::core::search::{SearchEngine, SearchOutcome};
pub use crate::core::{ItemKind, SearchableItem};
pub use error::{SpotlightError, SpotlightResult};
pub use executor::ExecutionAction;
pub use overlay::{Overlay, Reaction};
pub use platform::{BrowserHost, PageDocument};
pub use settings::UserSettings;
