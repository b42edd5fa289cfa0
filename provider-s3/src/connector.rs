//! S3 Connector Implementation
//!
//! Implements the `ObjectStore` trait for Amazon S3 using the REST API with
//! Signature Version 4.

use crate::error::{Result as S3Result, S3Error};
use crate::signing::SigV4Signer;
use async_trait::async_trait;
use bridge_traits::{
    error::Result,
    http::{HttpClient, HttpMethod, HttpRequest, HttpResponse},
    storage::{ObjectFetch, ObjectStore, ObjectVisibility, PutObject},
    time::Clock,
};
use core_runtime::config::{normalize_key, AwsCredentials};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const US_EAST_1: &str = "us-east-1";

/// Amazon S3 object store connector
///
/// Features:
/// - Virtual-hosted-style addressing on AWS, path-style on custom endpoints
/// - Per-segment percent-encoding of object keys
/// - `x-amz-acl: public-read` on uploads
/// - 404 and 403 reported as [`ObjectFetch`] values instead of errors
///
/// # Example
///
/// ```ignore
/// use provider_s3::S3Connector;
///
/// let connector = S3Connector::new(http_client, credentials, "mybucket", "eu-central-1", clock)?;
/// let snapshot = connector.get_object("ticktack/ticker.json").await?;
/// ```
pub struct S3Connector {
    http_client: Arc<dyn HttpClient>,
    signer: SigV4Signer,
    clock: Arc<dyn Clock>,
    bucket: String,
    base_url: String,
    host: String,
    path_prefix: String,
    public_base: String,
}

impl S3Connector {
    /// Connector for the AWS endpoint of `region`
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        credentials: AwsCredentials,
        bucket: impl Into<String>,
        region: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> S3Result<Self> {
        let bucket = bucket.into();
        let region = region.into();
        if bucket.is_empty() {
            return Err(S3Error::InvalidEndpoint("bucket name is empty".to_string()));
        }

        let host = if region == US_EAST_1 {
            format!("{}.s3.amazonaws.com", bucket)
        } else {
            format!("{}.s3.{}.amazonaws.com", bucket, region)
        };

        Ok(Self {
            http_client,
            signer: SigV4Signer::new(credentials, region),
            clock,
            base_url: format!("https://{}", host),
            host,
            path_prefix: String::new(),
            public_base: format!("https://{}.s3.amazonaws.com", bucket),
            bucket,
        })
    }

    /// Connector for an S3-compatible endpoint such as `http://localhost:9000`
    ///
    /// Uses path-style addressing (`{endpoint}/{bucket}/{key}`), which is also
    /// what public URLs point at.
    pub fn with_endpoint(
        http_client: Arc<dyn HttpClient>,
        credentials: AwsCredentials,
        bucket: impl Into<String>,
        region: impl Into<String>,
        endpoint: &str,
        clock: Arc<dyn Clock>,
    ) -> S3Result<Self> {
        let bucket = bucket.into();
        if bucket.is_empty() {
            return Err(S3Error::InvalidEndpoint("bucket name is empty".to_string()));
        }

        let base_url = endpoint.trim_end_matches('/').to_string();
        let host = base_url
            .strip_prefix("https://")
            .or_else(|| base_url.strip_prefix("http://"))
            .map(|rest| rest.split('/').next().unwrap_or_default().to_string())
            .filter(|host| !host.is_empty())
            .ok_or_else(|| S3Error::InvalidEndpoint(endpoint.to_string()))?;

        let path_prefix = format!("/{}", urlencoding::encode(&bucket));

        Ok(Self {
            http_client,
            signer: SigV4Signer::new(credentials, region),
            clock,
            public_base: format!("{}{}", base_url, path_prefix),
            base_url,
            host,
            path_prefix,
            bucket,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn region(&self) -> &str {
        self.signer.region()
    }

    /// Percent-encoded request path for `key`, segment by segment.
    fn canonical_uri(&self, key: &str) -> String {
        format!("{}/{}", self.path_prefix, encode_key(key))
    }

    async fn send(&self, mut request: HttpRequest, key: &str) -> S3Result<HttpResponse> {
        let canonical_uri = self.canonical_uri(key);
        request.url = format!("{}{}", self.base_url, canonical_uri);

        self.signer
            .sign(&mut request, &self.host, &canonical_uri, self.clock.now())?;

        debug!(method = request.method.as_str(), url = %request.url, "Sending S3 request");
        Ok(self.http_client.execute(request).await?)
    }
}

/// Percent-encode each `/`-separated segment of a key.
fn encode_key(key: &str) -> String {
    normalize_key(key)
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl ObjectStore for S3Connector {
    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn get_object(&self, key: &str) -> Result<ObjectFetch> {
        let response = self
            .send(HttpRequest::new(HttpMethod::Get, String::new()), key)
            .await?;

        match response.status {
            200..=299 => {
                debug!(bytes = response.body.len(), "Fetched object");
                Ok(ObjectFetch::Found(response.body))
            }
            404 => {
                debug!("Object does not exist");
                Ok(ObjectFetch::NotFound)
            }
            403 => {
                warn!("Access denied fetching object");
                Ok(ObjectFetch::AccessDenied)
            }
            status => Err(S3Error::from_response(status, &response.body).into()),
        }
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn object_exists(&self, key: &str) -> Result<bool> {
        let response = self
            .send(HttpRequest::new(HttpMethod::Head, String::new()), key)
            .await?;

        match response.status {
            200..=299 => Ok(true),
            404 => Ok(false),
            status => Err(S3Error::from_response(status, &response.body).into()),
        }
    }

    #[instrument(
        skip(self, object),
        fields(bucket = %self.bucket, key = %object.key, bytes = object.body.len())
    )]
    async fn put_object(&self, object: PutObject) -> Result<()> {
        let mut request = HttpRequest::new(HttpMethod::Put, String::new())
            .header("Content-Type", object.content_type.as_str())
            .body(object.body);
        if object.visibility == ObjectVisibility::PublicRead {
            request = request.header("x-amz-acl", "public-read");
        }

        let response = self.send(request, &object.key).await?;
        if !response.is_success() {
            return Err(S3Error::from_response(response.status, &response.body).into());
        }

        info!(key = %object.key, "Uploaded object");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base, normalize_key(key))
    }
}
