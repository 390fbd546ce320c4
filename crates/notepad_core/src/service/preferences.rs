//! Persisted user preferences.
//!
//! # Responsibility
//! - Remember the last selected tab across launches.
//! - Hold the editor font size within its supported range.
//!
//! # Invariants
//! - Font size reads and writes are always clamped to
//!   [`FONT_SIZE_MIN`, `FONT_SIZE_MAX`].
//! - Unparsable persisted values read back as "unset" instead of failing.

use crate::model::note::NoteId;
use crate::repo::settings_repo::{RepoResult, SettingsRepository};
use log::warn;
use uuid::Uuid;

pub const LAST_SELECTED_KEY: &str = "last_selected_note";
pub const FONT_SIZE_KEY: &str = "font_size";

pub const FONT_SIZE_MIN: u32 = 10;
pub const FONT_SIZE_MAX: u32 = 36;
pub const FONT_SIZE_DEFAULT: u32 = 16;
const FONT_SIZE_STEP: u32 = 1;

/// Preference facade over a settings repository.
pub struct Preferences<R: SettingsRepository> {
    repo: R,
}

impl<R: SettingsRepository> Preferences<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the last persisted selection, if any and well-formed.
    pub fn last_selected(&self) -> RepoResult<Option<NoteId>> {
        let Some(raw) = self.repo.get_setting(LAST_SELECTED_KEY)? else {
            return Ok(None);
        };
        match Uuid::parse_str(raw.trim()) {
            Ok(id) => Ok(Some(id)),
            Err(_) => {
                warn!("event=prefs_read module=prefs status=invalid key={LAST_SELECTED_KEY}");
                Ok(None)
            }
        }
    }

    /// Persists `id` as the last selected tab.
    pub fn set_last_selected(&self, id: NoteId) -> RepoResult<()> {
        self.repo.set_setting(LAST_SELECTED_KEY, &id.to_string())
    }

    /// Returns the persisted font size, or the default when unset.
    pub fn font_size(&self) -> RepoResult<u32> {
        let Some(raw) = self.repo.get_setting(FONT_SIZE_KEY)? else {
            return Ok(FONT_SIZE_DEFAULT);
        };
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(clamp_font_size(value.round() as i64)),
            _ => {
                warn!("event=prefs_read module=prefs status=invalid key={FONT_SIZE_KEY}");
                Ok(FONT_SIZE_DEFAULT)
            }
        }
    }

    /// Clamps and persists `size`, returning the stored value.
    pub fn set_font_size(&self, size: i64) -> RepoResult<u32> {
        let clamped = clamp_font_size(size);
        self.repo.set_setting(FONT_SIZE_KEY, &clamped.to_string())?;
        Ok(clamped)
    }

    pub fn increase_font_size(&self) -> RepoResult<u32> {
        let current = self.font_size()?;
        self.set_font_size(i64::from(current) + i64::from(FONT_SIZE_STEP))
    }

    pub fn decrease_font_size(&self) -> RepoResult<u32> {
        let current = self.font_size()?;
        self.set_font_size(i64::from(current) - i64::from(FONT_SIZE_STEP))
    }
}

fn clamp_font_size(size: i64) -> u32 {
    let clamped = size.clamp(i64::from(FONT_SIZE_MIN), i64::from(FONT_SIZE_MAX));
    u32::try_from(clamped).unwrap_or(FONT_SIZE_DEFAULT)
}
