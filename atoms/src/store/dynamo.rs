use super::{Document, DocumentStore, FieldFilter, StoreError, StoreErrorCode, StoredDocument};
use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::types::{AttributeValue, DeleteRequest, WriteRequest};
use aws_sdk_dynamodb::Client as DynamoClient;
use std::collections::HashMap;
use tokio::time::{sleep, Duration};

/// Single-table DynamoDB layout:
/// PK = "<COLLECTION>"
/// SK = "<COLLECTION>#<key>"
#[derive(Clone, Debug)]
pub struct DynamoStore {
    client: DynamoClient,
    table_name: String,
}

impl DynamoStore {
    pub fn new(client: DynamoClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

fn partition(collection: &str) -> String {
    collection.to_uppercase()
}

fn sort_key(collection: &str, key: &str) -> String {
    format!("{}#{}", partition(collection), key)
}

fn sdk_error<E, R>(op: &str, err: SdkError<E, R>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    let code = match &err {
        SdkError::TimeoutError(_) => StoreErrorCode::DeadlineExceeded,
        SdkError::DispatchFailure(_) => StoreErrorCode::Unavailable,
        _ => StoreErrorCode::from_aws_code(err.code()),
    };
    let detail = format!("DynamoDB {} error: {}", op, DisplayErrorContext(&err));
    tracing::error!("{}", detail);
    StoreError::new(code, detail)
}

impl DocumentStore for DynamoStore {
    async fn insert(&self, collection: &str, key: &str, fields: Document) -> Result<(), StoreError> {
        let mut item = fields;
        item.insert("PK".to_string(), AttributeValue::S(partition(collection)));
        item.insert("SK".to_string(), AttributeValue::S(sort_key(collection, key)));

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(SK)")
            .send()
            .await
            .map_err(|e| {
                let err = sdk_error("put_item", e);
                if err.code == StoreErrorCode::FailedPrecondition {
                    StoreError::new(StoreErrorCode::AlreadyExists, err.detail)
                } else {
                    err
                }
            })?;

        Ok(())
    }

    async fn find(&self, collection: &str, filters: &[FieldFilter]) -> Result<Vec<StoredDocument>, StoreError> {
        let pk = partition(collection);
        let sk_prefix = format!("{}#", pk);

        let mut conditions = Vec::new();
        let mut expr_names = HashMap::new();
        let mut expr_values = HashMap::new();
        expr_values.insert(":pk".to_string(), AttributeValue::S(pk.clone()));

        for (i, filter) in filters.iter().enumerate() {
            conditions.push(format!("#f{i} = :v{i}"));
            expr_names.insert(format!("#f{i}"), filter.field.clone());
            expr_values.insert(format!(":v{i}"), filter.value.clone());
        }

        let mut documents = Vec::new();
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            let mut builder = self
                .client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression("PK = :pk")
                .set_expression_attribute_values(Some(expr_values.clone()))
                .set_exclusive_start_key(start_key.take());

            if !conditions.is_empty() {
                builder = builder
                    .filter_expression(conditions.join(" AND "))
                    .set_expression_attribute_names(Some(expr_names.clone()));
            }

            let result = builder.send().await.map_err(|e| sdk_error("query", e))?;

            for item in result.items() {
                let Some(key) = item
                    .get("SK")
                    .and_then(|v| v.as_s().ok())
                    .and_then(|sk| sk.strip_prefix(&sk_prefix))
                else {
                    continue;
                };
                let mut fields = item.clone();
                fields.remove("PK");
                fields.remove("SK");
                documents.push(StoredDocument {
                    key: key.to_string(),
                    fields,
                });
            }

            match result.last_evaluated_key() {
                Some(last) if !last.is_empty() => start_key = Some(last.clone()),
                _ => break,
            }
        }

        Ok(documents)
    }

    async fn update(&self, collection: &str, key: &str, fields: Document) -> Result<(), StoreError> {
        if fields.is_empty() {
            return Ok(());
        }

        let mut update_expr = vec![];
        let mut expr_names = HashMap::new();
        let mut expr_values = HashMap::new();

        for (i, (name, value)) in fields.into_iter().enumerate() {
            update_expr.push(format!("#a{i} = :a{i}"));
            expr_names.insert(format!("#a{i}"), name);
            expr_values.insert(format!(":a{i}"), value);
        }

        self.client
            .update_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(partition(collection)))
            .key("SK", AttributeValue::S(sort_key(collection, key)))
            .update_expression(format!("SET {}", update_expr.join(", ")))
            .condition_expression("attribute_exists(SK)")
            .set_expression_attribute_names(Some(expr_names))
            .set_expression_attribute_values(Some(expr_values))
            .send()
            .await
            .map_err(|e| {
                let err = sdk_error("update_item", e);
                if err.code == StoreErrorCode::FailedPrecondition {
                    StoreError::new(StoreErrorCode::NotFound, err.detail)
                } else {
                    err
                }
            })?;

        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(partition(collection)))
            .key("SK", AttributeValue::S(sort_key(collection, key)))
            .send()
            .await
            .map_err(|e| sdk_error("delete_item", e))?;

        Ok(())
    }

    /// Batch delete, 25 items per request, re-submitting unprocessed items.
    async fn delete_many(&self, collection: &str, keys: &[String]) -> Result<(), StoreError> {
        for chunk in keys.chunks(25) {
            let mut write_reqs = Vec::with_capacity(chunk.len());
            for key in chunk {
                let delete = DeleteRequest::builder()
                    .key("PK", AttributeValue::S(partition(collection)))
                    .key("SK", AttributeValue::S(sort_key(collection, key)))
                    .build()
                    .map_err(|e| StoreError::new(StoreErrorCode::InvalidArgument, e.to_string()))?;
                write_reqs.push(WriteRequest::builder().delete_request(delete).build());
            }

            let mut unprocessed = Some(write_reqs);
            let mut attempts = 0;
            while let Some(reqs) = unprocessed {
                attempts += 1;
                let result = self
                    .client
                    .batch_write_item()
                    .request_items(&self.table_name, reqs)
                    .send()
                    .await
                    .map_err(|e| sdk_error("batch_write_item", e))?;

                unprocessed = result
                    .unprocessed_items()
                    .and_then(|m| m.get(&self.table_name))
                    .filter(|v| !v.is_empty())
                    .cloned();

                if unprocessed.is_some() && attempts < 5 {
                    sleep(Duration::from_millis(100 * attempts)).await;
                } else if unprocessed.is_some() {
                    return Err(StoreError::new(
                        StoreErrorCode::ResourceExhausted,
                        format!("batch_write_item left unprocessed items after {} attempts", attempts),
                    ));
                }
            }
        }

        Ok(())
    }
}
