//! Factory patches bundled with the library.
//!
//! Built-in patches that are always available without external files. They
//! only use generated wavetables.

use crate::Patch;

/// Internal names of the factory patches.
pub static FACTORY_PATCH_NAMES: &[&str] = &["init", "supersaw", "glass_pad", "hollow_lead"];

static FACTORY_PATCHES_TOML: &[(&str, &str)] = &[
    ("init", INIT_PATCH),
    ("supersaw", SUPERSAW_PATCH),
    ("glass_pad", GLASS_PAD_PATCH),
    ("hollow_lead", HOLLOW_LEAD_PATCH),
];

/// Single sine voice, default envelope.
const INIT_PATCH: &str = r#"
name = "Init"
description = "Single sine voice with the default envelope"
"#;

const SUPERSAW_PATCH: &str = r#"
name = "Supersaw"
description = "Seven detuned saws spread across the stereo field"

[wavetable]
source = "generator"
kind = "saw"
resolution = 2048

[oscillator]
volume = 0.6

[unison]
voices = 7
mix = 0.8
spread = 0.35

[envelope]
attack_ms = 5.0
decay_ms = 300.0
sustain = 0.8
release_ms = 400.0
"#;

const GLASS_PAD_PATCH: &str = r#"
name = "Glass Pad"
description = "Slow pad halfway through the sine to saw morph"

[wavetable]
source = "generator"
kind = "morph"
resolution = 2048
frames = 16

[oscillator]
volume = 0.5
frame_position = 7.5

[unison]
voices = 4
mix = 0.5
spread = 0.15

[envelope]
attack_ms = 900.0
decay_ms = 1200.0
sustain = 0.7
release_ms = 2500.0
"#;

const HOLLOW_LEAD_PATCH: &str = r#"
name = "Hollow Lead"
description = "Odd-harmonic lead with a wide bend range and no voice stealing"
voice_stealing = false

[wavetable]
source = "generator"
kind = "multisine"
resolution = 1024

[envelope]
attack_ms = 2.0
decay_ms = 150.0
sustain = 0.9
release_ms = 120.0

[pitch_bend]
up = 12.0
down = 12.0
"#;

/// Every factory patch, in [`FACTORY_PATCH_NAMES`] order.
pub fn factory_patches() -> Vec<Patch> {
    FACTORY_PATCHES_TOML
        .iter()
        .filter_map(|(_, toml)| Patch::from_toml(toml).ok())
        .collect()
}

/// Look up a factory patch by internal or display name, case-insensitively.
///
/// # Example
///
/// ```rust
/// use tabula_config::get_factory_patch;
///
/// let patch = get_factory_patch("Glass Pad").unwrap();
/// assert_eq!(patch.unison.voices, 4);
/// assert!(get_factory_patch("missing").is_none());
/// ```
pub fn get_factory_patch(name: &str) -> Option<Patch> {
    FACTORY_PATCHES_TOML
        .iter()
        .filter_map(|(id, toml)| Some((*id, Patch::from_toml(toml).ok()?)))
        .find(|(id, patch)| id.eq_ignore_ascii_case(name) || patch.name.eq_ignore_ascii_case(name))
        .map(|(_, patch)| patch)
}

/// Whether `name` names a factory patch.
pub fn is_factory_patch(name: &str) -> bool {
    get_factory_patch(name).is_some()
}
