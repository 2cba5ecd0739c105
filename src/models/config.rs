use serde::{Deserialize, Serialize};

/// User settings from `WWMI Tools.yaml`, optionally overridden by `WWMI_*`
/// environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Appended to the target file name for the pre-apply backup.
    pub backup_extension: String,

    /// `condition =` value written into new `[Key<Var>]` sections.
    pub key_condition: String,

    /// Indentation added inside generated `if` blocks.
    pub indent: String,

    pub debug_mode: bool,

    pub log_dir: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            backup_extension: default_backup_extension(),
            key_condition: default_key_condition(),
            indent: default_indent(),
            debug_mode: false,
            log_dir: "logs".to_string(),
        }
    }
}

impl EngineSettings {
    /// Backup path for `target`, e.g. `mod.ini` -> `mod.ini.bak`.
    pub fn backup_path(&self, target: &camino::Utf8Path) -> camino::Utf8PathBuf {
        camino::Utf8PathBuf::from(format!("{}{}", target, self.backup_extension))
    }
}

fn default_backup_extension() -> String {
    ".bak".to_string()
}

fn default_key_condition() -> String {
    "$object_detected".to_string()
}

fn default_indent() -> String {
    "    ".to_string()
}
