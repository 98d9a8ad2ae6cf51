//! Capture settings pulled from the host settings store.

use std::collections::HashMap;

use tracing::debug;

pub const SETTING_MAP_NAME: &str = "map_name";
pub const SETTING_INITIAL_WIDTH: &str = "initial_width";
pub const SETTING_INITIAL_HEIGHT: &str = "initial_height";

pub const DEFAULT_MAP_NAME: &str = "my_mapped_file";
pub const DEFAULT_INITIAL_SIZE: i64 = 200;

/// The host's key/value settings object, as seen by this source.
///
/// Integers are stored as 64-bit, strings as UTF-8. Getters fall back to a
/// previously registered default (and to `""`/`0` when neither a value nor a
/// default exists), matching how the host settings store behaves.
pub trait SettingsStore {
    fn string(&self, key: &str) -> String;
    fn int(&self, key: &str) -> i64;
    fn set_default_string(&mut self, key: &str, value: &str);
    fn set_default_int(&mut self, key: &str, value: i64);
}

/// Per-instance capture configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSettings {
    /// Name the producer published the shared region under.
    pub map_name: String,
    /// Reported width until the first valid frame has been read.
    pub initial_width: u32,
    /// Reported height until the first valid frame has been read.
    pub initial_height: u32,
}

impl CaptureSettings {
    /// Read the configuration out of the host store.
    ///
    /// The store keeps integers as 64-bit values; dimensions keep only the
    /// low 32 bits. Existing producer configurations rely on this narrowing.
    pub fn load(store: &dyn SettingsStore) -> Self {
        let settings = Self {
            map_name: store.string(SETTING_MAP_NAME),
            initial_width: (store.int(SETTING_INITIAL_WIDTH) & 0xFFFF_FFFF) as u32,
            initial_height: (store.int(SETTING_INITIAL_HEIGHT) & 0xFFFF_FFFF) as u32,
        };
        debug!(map_name = %settings.map_name, "loaded capture settings");
        settings
    }

    /// Register this source's defaults with the host store.
    pub fn apply_defaults(store: &mut dyn SettingsStore) {
        store.set_default_string(SETTING_MAP_NAME, DEFAULT_MAP_NAME);
        store.set_default_int(SETTING_INITIAL_WIDTH, DEFAULT_INITIAL_SIZE);
        store.set_default_int(SETTING_INITIAL_HEIGHT, DEFAULT_INITIAL_SIZE);
    }
}

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    Int(i64),
}

/// In-memory [`SettingsStore`], used by the test suite and by hosts without
/// a native settings object.
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: HashMap<String, Value>,
    defaults: HashMap<String, Value>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_string(&mut self, key: &str, value: &str) {
        self.values.insert(key.into(), Value::Str(value.into()));
    }

    pub fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.into(), Value::Int(value));
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        self.values.get(key).or_else(|| self.defaults.get(key))
    }
}

impl SettingsStore for MemorySettings {
    fn string(&self, key: &str) -> String {
        match self.lookup(key) {
            Some(Value::Str(s)) => s.clone(),
            _ => String::new(),
        }
    }

    fn int(&self, key: &str) -> i64 {
        match self.lookup(key) {
            Some(Value::Int(v)) => *v,
            _ => 0,
        }
    }

    fn set_default_string(&mut self, key: &str, value: &str) {
        self.defaults.insert(key.into(), Value::Str(value.into()));
    }

    fn set_default_int(&mut self, key: &str, value: i64) {
        self.defaults.insert(key.into(), Value::Int(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let mut store = MemorySettings::new();
        CaptureSettings::apply_defaults(&mut store);
        let settings = CaptureSettings::load(&store);
        assert_eq!(settings.map_name, DEFAULT_MAP_NAME);
        assert_eq!(settings.initial_width, 200);
        assert_eq!(settings.initial_height, 200);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let mut store = MemorySettings::new();
        CaptureSettings::apply_defaults(&mut store);
        store.set_string(SETTING_MAP_NAME, "producer_frames");
        store.set_int(SETTING_INITIAL_WIDTH, 640);
        store.set_int(SETTING_INITIAL_HEIGHT, 480);
        let settings = CaptureSettings::load(&store);
        assert_eq!(settings.map_name, "producer_frames");
        assert_eq!(settings.initial_width, 640);
        assert_eq!(settings.initial_height, 480);
    }

    #[test]
    fn dimensions_keep_low_32_bits() {
        let mut store = MemorySettings::new();
        store.set_int(SETTING_INITIAL_WIDTH, (5 << 32) | 320);
        store.set_int(SETTING_INITIAL_HEIGHT, -1);
        let settings = CaptureSettings::load(&store);
        assert_eq!(settings.initial_width, 320);
        assert_eq!(settings.initial_height, u32::MAX);
    }

    #[test]
    fn missing_keys_read_as_empty() {
        let store = MemorySettings::new();
        let settings = CaptureSettings::load(&store);
        assert!(settings.map_name.is_empty());
        assert_eq!(settings.initial_width, 0);
    }
}
