//! Services: collaborator data shapes and stand-ins.
//!
//! - [`browser`] - tab, bookmark and history records, snapshot host
//! - [`document`] - in-memory page document
//! - [`i18n`] - localized labels

pub mod browser;
pub mod document;
pub mod i18n;
