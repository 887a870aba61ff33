//! `spotlight settings`.

use serde_json::json;

use super::SettingsCommands;
use crate::settings::{JsonSettingsStore, SettingKey, SettingsStore, UserSettings};

pub fn run_settings(action: SettingsCommands) -> anyhow::Result<()> {
    let store = JsonSettingsStore::at_default_path();
    let settings = update(&store, action)?;
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

/// Apply `action` to the stored settings, saving on change.
fn update(store: &dyn SettingsStore, action: SettingsCommands) -> anyhow::Result<UserSettings> {
    let mut settings = store.load()?;
    let change = match action {
        SettingsCommands::Show => None,
        SettingsCommands::Priority { types } => Some((SettingKey::TypePriority, json!(types))),
        SettingsCommands::Language { tag } => Some((SettingKey::Language, json!(tag))),
    };

    if let Some((key, value)) = change {
        settings.apply(key, &value)?;
        store.save(&settings)?;
        tracing::info!("Updated {}", key);
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpotlightResult;
    use std::cell::RefCell;

    #[derive(Default)]
    struct MemoryStore {
        saved: RefCell<Option<UserSettings>>,
    }

    impl SettingsStore for MemoryStore {
        fn load(&self) -> SpotlightResult<UserSettings> {
            Ok(self.saved.borrow().clone().unwrap_or_default())
        }

        fn save(&self, settings: &UserSettings) -> SpotlightResult<()> {
            *self.saved.borrow_mut() = Some(settings.clone());
            Ok(())
        }
    }

    #[test]
    fn test_show_does_not_save() {
        let store = MemoryStore::default();
        let settings = update(&store, SettingsCommands::Show).unwrap();
        assert_eq!(settings, UserSettings::default());
        assert!(store.saved.borrow().is_none());
    }

    #[test]
    fn test_priority_and_language_are_saved() {
        let store = MemoryStore::default();
        update(
            &store,
            SettingsCommands::Priority {
                types: vec!["history".into(), "tab".into()],
            },
        )
        .unwrap();
        update(&store, SettingsCommands::Language { tag: "ko".into() }).unwrap();

        let saved = store.saved.borrow().clone().unwrap();
        assert_eq!(saved.type_priority, vec!["history", "tab", "page", "bookmark"]);
        assert_eq!(saved.language, "ko");
    }
}
