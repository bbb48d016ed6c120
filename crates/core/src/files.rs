//! # File Intake
//!
//! Both event attachments and profile pictures go through the same routine:
//! validate the client-supplied name and extension, then derive the name the
//! file is stored under. Where the bytes end up is the caller's concern.

use uuid::Uuid;

use crate::errors::{PlannerError, PlannerResult};

/// Image extensions accepted for profile pictures.
pub const PROFILE_PICTURE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedExtensions {
    Any,
    Only(&'static [&'static str]),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingStrategy {
    /// Keep the client's file name (stripped of any directory part).
    Original,
    /// Store as `{stem}.{extension}`, replacing whatever was there before.
    Fixed(String),
}

/// A file that passed intake and is ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedFile {
    pub filename: String,
    pub extension: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct FileIntake {
    allowed: AllowedExtensions,
    naming: NamingStrategy,
}

impl FileIntake {
    pub fn new(allowed: AllowedExtensions, naming: NamingStrategy) -> Self {
        Self { allowed, naming }
    }

    /// Attachments keep their original name and may have any extension.
    pub fn attachment() -> Self {
        Self::new(AllowedExtensions::Any, NamingStrategy::Original)
    }

    /// Profile pictures are images stored as `user_{id}.{ext}`.
    pub fn profile_picture(user_id: Uuid) -> Self {
        Self::new(
            AllowedExtensions::Only(PROFILE_PICTURE_EXTENSIONS),
            NamingStrategy::Fixed(format!("user_{user_id}")),
        )
    }

    pub fn accept(&self, original_name: &str, data: Vec<u8>) -> PlannerResult<AcceptedFile> {
        let name = base_name(original_name)
            .ok_or_else(|| PlannerError::BadRequest("A file name is required".to_string()))?;

        if data.is_empty() {
            return Err(PlannerError::BadRequest(format!("File '{name}' is empty")));
        }

        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty());

        if let AllowedExtensions::Only(allowed) = self.allowed {
            let permitted = extension
                .as_deref()
                .is_some_and(|ext| allowed.contains(&ext));
            if !permitted {
                return Err(PlannerError::BadRequest(format!(
                    "File type not allowed, expected one of: {}",
                    allowed.join(", ")
                )));
            }
        }

        let filename = match &self.naming {
            NamingStrategy::Original => name.to_string(),
            NamingStrategy::Fixed(stem) => match &extension {
                Some(ext) => format!("{stem}.{ext}"),
                None => stem.clone(),
            },
        };

        Ok(AcceptedFile {
            filename,
            extension,
            data,
        })
    }
}

/// Last path component of a client file name, if it is a usable name.
fn base_name(original: &str) -> Option<&str> {
    let name = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    match name {
        "" | "." | ".." => None,
        name => Some(name),
    }
}
