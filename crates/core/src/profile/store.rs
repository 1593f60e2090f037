use super::{ProfileError, ProfileFormat, ProfileRecord, VoiceProfile};
use std::collections::btree_map::{BTreeMap, Entry};
use std::path::{Path, PathBuf};

const LOG_TARGET: &str = "profile::store";

/// In-memory profiles keyed by `user_id`. Entries are only ever inserted
/// whole or removed whole.
#[derive(Clone, Debug, Default)]
pub struct ProfileStore {
    profiles: BTreeMap<String, VoiceProfile>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces, returning the previous profile for that user.
    pub fn insert(&mut self, profile: VoiceProfile) -> Option<VoiceProfile> {
        self.profiles.insert(profile.user_id.clone(), profile)
    }

    /// Inserts or replaces and hands back the stored profile.
    pub fn upsert(&mut self, profile: VoiceProfile) -> &VoiceProfile {
        match self.profiles.entry(profile.user_id.clone()) {
            Entry::Occupied(mut slot) => {
                tracing::debug!(target: LOG_TARGET, user_id = %profile.user_id, "replacing profile");
                slot.insert(profile);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(profile),
        }
    }

    pub fn get(&self, user_id: &str) -> Option<&VoiceProfile> {
        self.profiles.get(user_id)
    }

    pub fn remove(&mut self, user_id: &str) -> Option<VoiceProfile> {
        self.profiles.remove(user_id)
    }

    pub fn clear(&mut self) {
        self.profiles.clear();
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn user_ids(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }
}

/// Writes `<dir>/<user_id>_profile.<ext>`, creating `dir` if needed. The
/// record goes to a sibling `.tmp` file first and is renamed into place.
pub fn save_profile_file(
    profile: &VoiceProfile,
    dir: &Path,
    format: ProfileFormat,
) -> Result<PathBuf, ProfileError> {
    check_user_id(&profile.user_id)?;
    std::fs::create_dir_all(dir).map_err(|source| ProfileError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(format!("{}_profile.{}", profile.user_id, format.extension()));
    let record = profile.to_record();
    let body = match format {
        ProfileFormat::Json => serde_json::to_string_pretty(&record)?,
        ProfileFormat::Yaml => serde_yaml::to_string(&record)?,
    };

    let tmp = path.with_extension(format!("{}.tmp", format.extension()));
    std::fs::write(&tmp, body).map_err(|source| ProfileError::Io {
        path: tmp.clone(),
        source,
    })?;
    std::fs::rename(&tmp, &path).map_err(|source| ProfileError::Io {
        path: path.clone(),
        source,
    })?;

    tracing::info!(target: LOG_TARGET, user_id = %profile.user_id, file = %path.display(), "profile saved");
    Ok(path)
}

/// The id becomes part of a file name, so it must be a single plain path
/// component.
fn check_user_id(user_id: &str) -> Result<(), ProfileError> {
    let bad = user_id.is_empty()
        || user_id == "."
        || user_id == ".."
        || user_id.contains(['/', '\\', '\0']);
    if bad {
        return Err(ProfileError::InvalidUserId(user_id.to_owned()));
    }
    Ok(())
}

/// Reads a record written by [`save_profile_file`]; the format comes from
/// the file extension.
pub fn load_profile_file(path: &Path) -> Result<VoiceProfile, ProfileError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let format = ProfileFormat::from_extension(ext)
        .ok_or_else(|| ProfileError::UnsupportedFormat(path.display().to_string()))?;

    let body = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let record: ProfileRecord = match format {
        ProfileFormat::Json => serde_json::from_str(&body)?,
        ProfileFormat::Yaml => serde_yaml::from_str(&body)?,
    };

    let profile = VoiceProfile::from_record(record);
    tracing::info!(target: LOG_TARGET, user_id = %profile.user_id, file = %path.display(), "profile loaded");
    Ok(profile)
}
