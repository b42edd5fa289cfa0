//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, filesystem,
//! clock) and a resolved [`TickerConfig`] into the sync core. Desktop hosts
//! enable the `desktop-shims` feature (which depends on `bridge-desktop`) and
//! call [`bootstrap_desktop`].

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use bridge_traits::{
    http::HttpClient,
    storage::{FileSystemAccess, ObjectStore},
    time::Clock,
};
use core_media::MediaStore;
use core_runtime::config::TickerConfig;
use core_sync::{Mutation, RunSummary, SyncConfig, SyncCoordinator};
use core_ticks::{Dataset, FeedDefinition, MergeEngine, MergeReport, SetOutcome, TickId, TickInput};
use provider_s3::S3Connector;
use tracing::info;

/// Aggregated handle to all bridge dependencies the core requires.
pub struct CoreDependencies {
    pub http_client: Arc<dyn HttpClient>,
    pub filesystem: Arc<dyn FileSystemAccess>,
    pub clock: Arc<dyn Clock>,
}

impl CoreDependencies {
    /// Construct a dependency bundle from explicit bridge handles.
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        filesystem: Arc<dyn FileSystemAccess>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            http_client,
            filesystem,
            clock,
        }
    }

    /// Reqwest HTTP client, tokio filesystem and the system clock.
    #[cfg(feature = "desktop-shims")]
    pub fn desktop() -> Result<Self> {
        let http_client = bridge_desktop::ReqwestHttpClient::new()
            .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;
        Ok(Self::new(
            Arc::new(http_client),
            Arc::new(bridge_desktop::TokioFileSystem::new()),
            Arc::new(bridge_traits::time::SystemClock),
        ))
    }
}

/// Primary façade exposed to the CLI.
///
/// Holds the working dataset of one invocation. The operations mirror the
/// command line: [`load`](Self::load), then [`set`](Self::set) or
/// [`delete`](Self::delete), then [`store`](Self::store).
pub struct CoreService {
    config: TickerConfig,
    coordinator: SyncCoordinator,
}

impl CoreService {
    /// Validate `config` and connect to its S3 bucket.
    ///
    /// Fails with [`CoreError::CapabilityMissing`] when the configuration
    /// carries no credentials.
    pub fn init(config: TickerConfig, deps: CoreDependencies) -> Result<Self> {
        config.validate()?;

        let credentials = config
            .credentials
            .clone()
            .ok_or_else(|| CoreError::CapabilityMissing {
                capability: "aws_credentials".to_string(),
                message: "set AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY".to_string(),
            })?;

        let connector = match &config.s3.endpoint {
            Some(endpoint) => S3Connector::with_endpoint(
                deps.http_client.clone(),
                credentials,
                &config.s3.bucket,
                &config.s3.region,
                endpoint,
                deps.clock.clone(),
            ),
            None => S3Connector::new(
                deps.http_client.clone(),
                credentials,
                &config.s3.bucket,
                &config.s3.region,
                deps.clock.clone(),
            ),
        }
        .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;

        info!(
            bucket = %config.s3.bucket,
            region = %config.s3.region,
            "Connected to object store"
        );
        Self::with_object_store(config, Arc::new(connector), deps)
    }

    /// Build the service on an arbitrary object store.
    pub fn with_object_store(
        config: TickerConfig,
        store: Arc<dyn ObjectStore>,
        deps: CoreDependencies,
    ) -> Result<Self> {
        config.validate()?;

        let media = MediaStore::new(store.clone(), deps.filesystem, config.media_prefix());
        let engine = MergeEngine::new(Arc::new(media), deps.clock);
        let coordinator = SyncCoordinator::new(store, engine, sync_config(&config));

        Ok(Self {
            config,
            coordinator,
        })
    }

    pub fn config(&self) -> &TickerConfig {
        &self.config
    }

    pub fn dataset(&self) -> &Dataset {
        self.coordinator.dataset()
    }

    pub async fn load(&mut self) -> Result<MergeReport> {
        Ok(self.coordinator.load().await?)
    }

    pub async fn set(&mut self, input: TickInput) -> Result<SetOutcome> {
        Ok(self.coordinator.set(input).await?)
    }

    pub fn delete(&mut self, id: &TickId) {
        self.coordinator.delete(id);
    }

    /// Write the snapshot and feeds. Returns the written keys.
    pub async fn store(&self) -> Result<Vec<String>> {
        Ok(self.coordinator.store().await?)
    }

    /// One full load/mutate/store cycle.
    pub async fn run(&mut self, mutation: Mutation) -> Result<RunSummary> {
        Ok(self.coordinator.run(mutation).await?)
    }
}

fn sync_config(config: &TickerConfig) -> SyncConfig {
    let feeds = config
        .partial_feeds()
        .into_iter()
        .map(|feed| FeedDefinition {
            key: feed.key,
            max_items: feed.max_items,
            max_age: feed.max_age,
        })
        .collect();
    SyncConfig::new(config.full_feed_key(), feeds)
}

/// Convenience bootstrapper for desktop hosts.
///
/// ```ignore
/// use core_runtime::config::TickerConfig;
///
/// let config = TickerConfig::load_or_default("config.json")?.with_env_credentials();
/// let mut core = core_service::bootstrap_desktop(config)?;
/// core.load().await?;
/// ```
#[cfg(feature = "desktop-shims")]
pub fn bootstrap_desktop(config: TickerConfig) -> Result<CoreService> {
    CoreService::init(config, CoreDependencies::desktop()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::http::{HttpRequest, HttpResponse};
    use bridge_traits::storage::{FileMetadata, ObjectFetch, PutObject};
    use bridge_traits::time::FixedClock;
    use bytes::Bytes;
    use core_runtime::config::{AwsCredentials, PartialFeedConfig};
    use mockall::mock;
    use std::path::Path;

    mock! {
        pub Http {}

        #[async_trait]
        impl HttpClient for Http {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    mock! {
        pub Files {}

        #[async_trait]
        impl FileSystemAccess for Files {
            async fn exists(&self, path: &Path) -> BridgeResult<bool>;
            async fn metadata(&self, path: &Path) -> BridgeResult<FileMetadata>;
            async fn read_file(&self, path: &Path) -> BridgeResult<Bytes>;
            async fn open_read_stream(
                &self,
                path: &Path,
            ) -> BridgeResult<Box<dyn tokio::io::AsyncRead + Send + Unpin>>;
        }
    }

    mock! {
        pub Objects {}

        #[async_trait]
        impl ObjectStore for Objects {
            async fn get_object(&self, key: &str) -> BridgeResult<ObjectFetch>;
            async fn object_exists(&self, key: &str) -> BridgeResult<bool>;
            async fn put_object(&self, object: PutObject) -> BridgeResult<()>;
            fn public_url(&self, key: &str) -> String;
        }
    }

    fn deps() -> CoreDependencies {
        CoreDependencies::new(
            Arc::new(MockHttp::new()),
            Arc::new(MockFiles::new()),
            Arc::new(FixedClock::new(1_000)),
        )
    }

    #[test]
    fn test_init_requires_credentials() {
        let config = TickerConfig::builder().build().unwrap();

        match CoreService::init(config, deps()) {
            Err(CoreError::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "aws_credentials")
            }
            other => panic!("expected missing capability, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_init_with_credentials() {
        let config = TickerConfig::builder()
            .bucket("news")
            .credentials(AwsCredentials::new("AKID", "secret"))
            .build()
            .unwrap();

        let service = CoreService::init(config, deps()).unwrap();
        assert_eq!(service.config().s3.bucket, "news");
        assert!(service.dataset().is_empty());
    }

    #[test]
    fn test_init_rejects_bad_endpoint() {
        let config = TickerConfig::builder()
            .endpoint("localhost:9000")
            .credentials(AwsCredentials::new("AKID", "secret"))
            .build()
            .unwrap();

        assert!(matches!(
            CoreService::init(config, deps()),
            Err(CoreError::InitializationFailed(_))
        ));
    }

    #[test]
    fn test_sync_config_from_ticker_config() {
        let config = TickerConfig::builder()
            .full_feed("/news/all.json")
            .partial_feeds(vec![
                PartialFeedConfig::new("/news/top.json").with_max_items(3),
                PartialFeedConfig::new("news/hour.json").with_max_age(3600),
            ])
            .build()
            .unwrap();

        let sync = sync_config(&config);
        assert_eq!(sync.full_key, "news/all.json");
        assert_eq!(
            sync.feeds,
            vec![
                FeedDefinition::new("news/top.json").with_max_items(3),
                FeedDefinition::new("news/hour.json").with_max_age(3600),
            ]
        );
    }

    #[tokio::test]
    async fn test_set_and_store_through_object_store() {
        let mut objects = MockObjects::new();
        objects
            .expect_get_object()
            .withf(|key| key == "ticktack/ticker.json")
            .times(1)
            .returning(|_| Ok(ObjectFetch::NotFound));
        objects
            .expect_put_object()
            .times(3)
            .returning(|object| {
                assert_eq!(object.content_type, "application/json");
                Ok(())
            });

        let config = TickerConfig::builder().build().unwrap();
        let mut service =
            CoreService::with_object_store(config, Arc::new(objects), deps()).unwrap();

        service.load().await.unwrap();
        let outcome = service
            .set(TickInput::new("1").content("hello"))
            .await
            .unwrap();
        assert_eq!(outcome, SetOutcome::Inserted);

        service.delete(&TickId::from("2"));
        let written = service.store().await.unwrap();
        assert_eq!(
            written,
            vec![
                "ticktack/ticker.json",
                "ticktack/ticker-initial.json",
                "ticktack/ticker-latest.json"
            ]
        );
        assert_eq!(service.dataset().len(), 1);
        assert!(service.dataset().is_tombstoned(&TickId::from("2")));
    }
}
