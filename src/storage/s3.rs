use async_trait::async_trait;
use aws_config::{BehaviorVersion, ConfigLoader};
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::put_object::PutObjectError;
use aws_sdk_s3::Client as S3Client;
use aws_types::region::Region;
use log::error;
use url::Url;

use crate::backend::ObjectStorage;
use crate::errors::AppError;

pub async fn create_s3_client(region: Option<String>) -> S3Client {
    let aws_config = ConfigLoader::default()
        .region(region.map(Region::new))
        .behavior_version(BehaviorVersion::latest())
        .load()
        .await;

    S3Client::new(&aws_config)
}

pub struct S3ObjectStorage {
    client: S3Client,
    bucket: String,
    public_base: Url,
}

impl S3ObjectStorage {
    /// `public_base` overrides the default `https://{bucket}.s3.amazonaws.com/`.
    pub fn new(client: S3Client, bucket: String, public_base: Option<&str>) -> Result<Self, AppError> {
        let base = match public_base {
            Some(base) => base.to_string(),
            None => format!("https://{}.s3.amazonaws.com/", bucket),
        };
        let public_base = parse_base(&base)?;

        Ok(Self { client, bucket, public_base })
    }
}

fn parse_base(base: &str) -> Result<Url, AppError> {
    let mut base = base.to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Url::parse(&base)
        .map_err(|err| AppError::ConfigError(format!("Invalid public storage URL {}: {}", base, err)))
}

/// The service's own message when S3 answered, otherwise the full error
/// chain (connection refused, timeout, ...).
fn upload_error_message(err: &SdkError<PutObjectError, HttpResponse>) -> String {
    let detail = err
        .as_service_error()
        .and_then(|service_err| ProvideErrorMetadata::message(service_err))
        .map(str::to_owned)
        .unwrap_or_else(|| DisplayErrorContext(err).to_string());
    format!("Failed to upload file: {}", detail)
}

fn join_public(base: &Url, path: &str) -> Result<String, AppError> {
    base.join(path)
        .map(|url| url.to_string())
        .map_err(|err| AppError::StorageError(format!("Cannot build public URL for {}: {}", path, err)))
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .content_type(content_type)
            .body(bytes.into())
            .send()
            .await
            .map_err(|err| {
                error!("S3 upload of {} failed: {}", path, DisplayErrorContext(&err));
                AppError::StorageError(upload_error_message(&err))
            })?;
        Ok(())
    }

    fn public_url(&self, path: &str) -> Result<String, AppError> {
        join_public(&self.public_base, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::retry::RetryConfig;
    use aws_sdk_s3::config::Credentials;

    #[test]
    fn public_url_appends_path_to_base() {
        let base = parse_base("https://cdn.example.com/gallery").unwrap();
        assert_eq!(
            join_public(&base, "owner/file.png").unwrap(),
            "https://cdn.example.com/gallery/owner/file.png"
        );
    }

    fn unreachable_storage() -> S3ObjectStorage {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .endpoint_url("http://127.0.0.1:9")
            .credentials_provider(Credentials::new("test", "test", None, None, "test"))
            .retry_config(RetryConfig::disabled())
            .force_path_style(true)
            .build();
        S3ObjectStorage::new(S3Client::from_conf(config), "showcase-images".to_string(), None).unwrap()
    }

    #[tokio::test]
    async fn upload_failure_carries_the_underlying_cause() {
        let storage = unreachable_storage();
        let err = storage
            .upload("owner/a.png", vec![1, 2, 3], "image/png")
            .await
            .unwrap_err();

        let AppError::StorageError(message) = err else {
            panic!("expected a storage error, got {:?}", err);
        };
        assert!(message.starts_with("Failed to upload file: "));
        assert!(
            message.len() > "Failed to upload file: dispatch failure".len(),
            "message lost its cause: {}",
            message
        );
    }

    #[test]
    fn rejects_unparseable_base() {
        assert!(matches!(parse_base("not a url"), Err(AppError::ConfigError(_))));
    }
}
