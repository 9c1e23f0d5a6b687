use crate::config::Config;
use aws_config::BehaviorVersion;
use coursedesk_atoms::store::{DocumentStore, DynamoStore, MemoryDocumentStore, MemoryObjectStore, ObjectStore, S3Store};

/// Everything a request needs, built once per cold start and shared
/// behind an `Arc`.
pub struct AppState<D: DocumentStore, O: ObjectStore> {
    pub documents: D,
    pub objects: O,
    pub config: Config,
}

impl AppState<DynamoStore, S3Store> {
    pub async fn from_aws(config: Config) -> Self {
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;

        let documents = DynamoStore::new(aws_sdk_dynamodb::Client::new(&sdk_config), config.table_name.clone());
        let objects = S3Store::new(
            aws_sdk_s3::Client::new(&sdk_config),
            config.bucket_name.clone(),
            &config.region,
            config.public_asset_base_url.clone(),
        );

        tracing::info!(
            "Using DynamoDB table {} and S3 bucket {} in {}",
            documents.table_name(),
            objects.bucket(),
            config.region
        );

        AppState {
            documents,
            objects,
            config,
        }
    }
}

impl AppState<MemoryDocumentStore, MemoryObjectStore> {
    /// Process-local stores, for local runs and tests.
    pub fn in_memory(config: Config) -> Self {
        let objects = match &config.public_asset_base_url {
            Some(base) => MemoryObjectStore::new(base.clone()),
            None => MemoryObjectStore::default(),
        };

        AppState {
            documents: MemoryDocumentStore::new(),
            objects,
            config,
        }
    }
}
