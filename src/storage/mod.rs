mod s3;

pub use s3::{create_s3_client, S3ObjectStorage};

use uuid::Uuid;

/// Object key for a new upload: `{owner}/{random}.{ext}`.
///
/// The extension comes from the uploaded file name and falls back to
/// `detected_ext` when the name has none.
pub fn storage_path(owner: Uuid, file_name: &str, detected_ext: &str) -> String {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.trim())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| detected_ext.to_string());

    format!("{}/{}.{}", owner, Uuid::new_v4(), ext)
}
