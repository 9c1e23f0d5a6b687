//! Storage ports used by the course and media facades.
//!
//! Facades never build clients themselves: they receive a [`DocumentStore`]
//! and an [`ObjectStore`] as arguments. Production wires in [`DynamoStore`]
//! and [`S3Store`]; tests and local runs use the in-memory variants.
//!
//! Documents are modelled with DynamoDB's `AttributeValue` so that the
//! mapping code reads the same whichever backend is plugged in.

mod dynamo;
mod error;
mod memory;
mod s3;

pub use dynamo::DynamoStore;
pub use error::{StoreError, StoreErrorCode};
pub use memory::{MemoryDocumentStore, MemoryObjectStore};
pub use s3::S3Store;

use aws_sdk_dynamodb::types::AttributeValue;
use bytes::Bytes;
use std::collections::HashMap;
use std::future::Future;

/// Attribute map of a stored document, without its storage key.
pub type Document = HashMap<String, AttributeValue>;

/// A document together with the key the store assigned it.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub key: String,
    pub fields: Document,
}

/// Equality condition on a top-level attribute.
#[derive(Debug, Clone)]
pub struct FieldFilter {
    pub field: String,
    pub value: AttributeValue,
}

impl FieldFilter {
    pub fn eq(field: &str, value: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            value: AttributeValue::S(value.into()),
        }
    }
}

/// Document collection backend.
pub trait DocumentStore: Send + Sync {
    /// Writes a new document; fails with `AlreadyExists` if the key is taken.
    fn insert(
        &self,
        collection: &str,
        key: &str,
        fields: Document,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Returns every document of the collection matching all filters.
    fn find(
        &self,
        collection: &str,
        filters: &[FieldFilter],
    ) -> impl Future<Output = Result<Vec<StoredDocument>, StoreError>> + Send;

    /// Overwrites the given attributes of an existing document.
    fn update(
        &self,
        collection: &str,
        key: &str,
        fields: Document,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn delete(&self, collection: &str, key: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Deletes several documents in batches. Missing keys are not an error.
    fn delete_many(
        &self,
        collection: &str,
        keys: &[String],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Binary object backend with publicly resolvable URLs.
pub trait ObjectStore: Send + Sync {
    fn put_object(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn delete_object(&self, key: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Public URL under which `key` can be fetched.
    fn public_url(&self, key: &str) -> String;

    /// Inverse of [`ObjectStore::public_url`]. `None` when the URL does not
    /// point into this store.
    fn key_from_url(&self, url: &str) -> Option<String>;
}

/// Splits `url` into host and path, dropping scheme, query and fragment.
pub(crate) fn split_url(url: &str) -> Option<(&str, &str)> {
    let no_scheme = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    let no_scheme = no_scheme.split(['?', '#']).next().unwrap_or(no_scheme);
    no_scheme.split_once('/')
}
