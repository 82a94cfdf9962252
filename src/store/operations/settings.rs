use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::store::keys;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_play_audio: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_voice_id: Option<String>,
    /// Keys this build does not know about survive every merge.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl UserSettings {
    pub fn dark_mode(&self) -> bool {
        self.dark_mode.unwrap_or(false)
    }

    pub fn auto_play_audio(&self) -> bool {
        self.auto_play_audio.unwrap_or(true)
    }
}

fn validate_known_field(key: &str, value: &Value) -> Result<(), StoreError> {
    let ok = match key {
        "darkMode" | "autoPlayAudio" => value.is_boolean() || value.is_null(),
        "selectedVoiceId" => value.is_string() || value.is_null(),
        _ => true,
    };
    if ok {
        Ok(())
    } else {
        Err(StoreError::Validation(format!("invalid value for setting '{key}'")))
    }
}

impl Store {
    /// A missing blob yields defaults. An unreadable blob also yields defaults
    /// but stays on disk untouched.
    pub fn get_user_settings(&self) -> Result<UserSettings, StoreError> {
        match self.read_blob::<UserSettings>(keys::USER_SETTINGS) {
            Ok(Some(settings)) => Ok(settings),
            Ok(None) => Ok(UserSettings::default()),
            Err(StoreError::Serialization(error)) => {
                tracing::warn!(error = %error, "Failed to parse user settings, using defaults");
                Ok(UserSettings::default())
            }
            Err(other) => Err(other),
        }
    }

    /// Read-modify-write of the whole settings blob. A `null` value removes
    /// the key. Refuses to write when the stored blob cannot be parsed.
    /// Concurrent merges are serialized.
    pub fn merge_user_settings(&self, patch: &Map<String, Value>) -> Result<UserSettings, StoreError> {
        for (key, value) in patch {
            validate_known_field(key, value)?;
        }

        let _guard = self.lock_settings();
        self.merge_settings_locked(patch)
    }

    fn merge_settings_locked(&self, patch: &Map<String, Value>) -> Result<UserSettings, StoreError> {
        let mut current: Map<String, Value> = self.read_blob(keys::USER_SETTINGS)?.unwrap_or_default();
        for (key, value) in patch {
            if value.is_null() {
                current.remove(key);
            } else {
                current.insert(key.clone(), value.clone());
            }
        }

        let merged: UserSettings = serde_json::from_value(Value::Object(current))?;
        self.write_blob(keys::USER_SETTINGS, &merged)?;
        Ok(merged)
    }

    /// Persist `voice_id` only when the user has not picked a voice yet.
    /// Returns the effective selection.
    pub fn select_voice_if_unset(&self, voice_id: &str) -> Result<String, StoreError> {
        let _guard = self.lock_settings();
        let settings = self.get_user_settings()?;
        if let Some(existing) = settings.selected_voice_id {
            return Ok(existing);
        }

        let mut patch = Map::new();
        patch.insert("selectedVoiceId".to_string(), Value::String(voice_id.to_string()));
        self.merge_settings_locked(&patch)?;
        Ok(voice_id.to_string())
    }
}
