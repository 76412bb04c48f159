//! Post creation as an explicit pipeline: validate, upload, insert.
//!
//! The image is uploaded before the row is inserted so a row never points at
//! a blob that does not exist. If the insert then fails, the uploaded blob is
//! deleted again; when that delete fails too the orphan is left behind.

use std::path::Path;

use log::{debug, error, info, warn};

use crate::{
    error::{Error, Result},
    gateway::Gateway,
    model::{Location, NewPost, MAX_CONTENT_CHARS},
    utils::image_path,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub bytes: Vec<u8>,
    pub extension: String,
}

impl ImageAttachment {
    pub fn new(bytes: Vec<u8>, extension: &str) -> Self {
        Self {
            bytes,
            extension: extension.to_ascii_lowercase(),
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::Validation(format!("cannot read {}: {}", path.display(), e)))?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("jpg");
        Ok(Self::new(bytes, extension))
    }
}

/// What the user is about to publish.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostDraft {
    pub content: String,
    pub image: Option<ImageAttachment>,
    pub location: Option<Location>,
}

impl PostDraft {
    pub fn validate(&self) -> Result<()> {
        if self.content.trim().is_empty() && self.image.is_none() {
            return Err(Error::Validation("post needs text or an image".to_string()));
        }
        let chars = self.content.chars().count();
        if chars > MAX_CONTENT_CHARS {
            return Err(Error::Validation(format!(
                "post is {} characters, at most {} allowed",
                chars, MAX_CONTENT_CHARS
            )));
        }
        if let Some(location) = &self.location {
            if !location.is_valid() {
                return Err(Error::Validation(format!(
                    "location {},{} is out of range",
                    location.latitude, location.longitude
                )));
            }
        }
        Ok(())
    }
}

pub async fn publish<G: Gateway>(gateway: &G, draft: PostDraft) -> Result<()> {
    draft.validate()?;
    let author = gateway
        .current_identity()
        .await
        .ok_or(Error::Unauthenticated)?;

    let uploaded = match &draft.image {
        Some(image) => {
            let path = image_path("post", &image.extension);
            let url = gateway
                .upload_blob(image.bytes.clone(), &path)
                .await
                .map_err(|e| {
                    error!("Error uploading image: {}", e);
                    e
                })?;
            debug!("Uploaded {}", url);
            Some((path, url))
        }
        None => None,
    };

    let post = NewPost::new(author, draft.content)
        .image_url(uploaded.as_ref().map(|(_, url)| url.clone()))
        .location(draft.location);

    if let Err(e) = gateway.create_post(&post).await {
        error!("Error creating post: {}", e);
        if let Some((path, _)) = &uploaded {
            match gateway.delete_blob(path).await {
                Ok(()) => debug!("Removed orphaned image {}", path),
                Err(cleanup) => warn!("Orphaned image {} left behind: {}", path, cleanup),
            }
        }
        return Err(e);
    }

    info!("Post published");
    Ok(())
}
