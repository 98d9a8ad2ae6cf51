//! Module registration surface handed to the host at load time.

use capture_core::settings::SETTING_MAP_NAME;
use capture_core::source::{
    Property, SourceDescriptor, SourceRegistry, SourceType, OUTPUT_CUSTOM_DRAW,
    OUTPUT_DO_NOT_DUPLICATE, OUTPUT_SRGB, OUTPUT_VIDEO,
};
use capture_core::{CaptureSettings, SettingsStore};

/// Registry id of the capture source.
pub const SOURCE_ID: &str = "mmf_capture";

/// Descriptor for the host's source registry.
pub fn descriptor() -> SourceDescriptor {
    SourceDescriptor {
        id: SOURCE_ID,
        display_name: "Memory-Mapped File Capture",
        source_type: SourceType::Input,
        output_flags: OUTPUT_VIDEO | OUTPUT_CUSTOM_DRAW | OUTPUT_DO_NOT_DUPLICATE | OUTPUT_SRGB,
    }
}

/// Register the capture source with the host. Called once at module load.
pub fn register(registry: &mut dyn SourceRegistry) {
    registry.register(descriptor());
}

/// Register this source's settings defaults.
pub fn apply_defaults(store: &mut dyn SettingsStore) {
    CaptureSettings::apply_defaults(store);
}

/// Properties shown in the host's source settings UI.
pub fn properties() -> Vec<Property> {
    vec![
        Property::Text {
            key: SETTING_MAP_NAME,
            label: "Map Name",
        },
        Property::Info {
            key: "map_name_info",
            label: "Use the map name configured in the producer's shared-memory output.",
        },
    ]
}
