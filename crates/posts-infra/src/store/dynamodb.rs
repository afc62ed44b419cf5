//! DynamoDB store implementation.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::types::{AttributeValue as DynamoValue, ReturnValue};

use posts_core::StoreError;
use posts_core::domain::post;
use posts_core::marshal::{AttributeValue, Item, Key};
use posts_core::ports::Store;

type DynamoItem = HashMap<String, DynamoValue>;

/// Placeholder for the partition key in condition expressions.
const KEY_NAME: &str = "#pk";

/// Error codes that mean "try again later" rather than "the request was wrong".
const UNAVAILABLE_CODES: &[&str] = &[
    "ProvisionedThroughputExceededException",
    "RequestLimitExceeded",
    "ThrottlingException",
    "InternalServerError",
    "ServiceUnavailable",
];

/// DynamoDB connection configuration.
#[derive(Debug, Clone)]
pub struct DynamoConfig {
    /// Table holding the items. Its partition key is the string attribute `id`.
    pub table_name: String,
    /// Endpoint override, e.g. http://localhost:8000 for DynamoDB Local.
    pub endpoint_url: Option<String>,
}

impl DynamoConfig {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            endpoint_url: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Returns `None` when `DYNAMODB_TABLE` is not set. Credentials and region
    /// come from the standard AWS provider chain.
    pub fn from_env() -> Option<Self> {
        let table_name = std::env::var("DYNAMODB_TABLE").ok()?;

        Some(Self {
            table_name,
            endpoint_url: std::env::var("DYNAMODB_ENDPOINT_URL").ok(),
        })
    }
}

/// DynamoDB-backed store for a single table.
///
/// The SDK client is internally reference counted; one instance is shared by all requests.
pub struct DynamoStore {
    client: Client,
    table_name: String,
}

impl DynamoStore {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Build a client from the AWS provider chain plus the endpoint override.
    pub async fn connect(config: DynamoConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(url) = &config.endpoint_url {
            loader = loader.endpoint_url(url);
        }
        let sdk_config = loader.load().await;

        tracing::info!(
            table = %config.table_name,
            endpoint = config.endpoint_url.as_deref().unwrap_or("default"),
            "DynamoDB client configured"
        );

        Self::new(Client::new(&sdk_config), config.table_name)
    }

    /// Create from environment configuration.
    pub async fn from_env() -> Option<Self> {
        let config = DynamoConfig::from_env()?;
        Some(Self::connect(config).await)
    }
}

#[async_trait]
impl Store for DynamoStore {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn put(&self, item: Item) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_dynamo_item(item)))
            .send()
            .await
            .map_err(|e| classify(e, StoreError::Write))?;

        Ok(())
    }

    async fn get_by_key(&self, key: Key) -> Result<Option<Item>, StoreError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(to_dynamo_item(key)))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| classify(e, StoreError::Read))?;

        output.item().cloned().map(from_dynamo_item).transpose()
    }

    async fn scan_all(&self) -> Result<Vec<Item>, StoreError> {
        let mut items = Vec::new();
        let mut start_key: Option<DynamoItem> = None;

        // Each response holds at most 1 MB; keep following the continuation key.
        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table_name)
                .consistent_read(true)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| classify(e, StoreError::Read))?;

            for item in output.items() {
                items.push(from_dynamo_item(item.clone())?);
            }

            match output.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        tracing::debug!(table = %self.table_name, count = items.len(), "Scan completed");
        Ok(items)
    }

    async fn update(&self, key: Key, deltas: Item) -> Result<Option<Item>, StoreError> {
        if deltas.is_empty() {
            return self.get_by_key(key).await;
        }

        let expression = UpdateExpression::set(post::ID, deltas);
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(to_dynamo_item(key)))
            .update_expression(expression.expression)
            .condition_expression(format!("attribute_exists({KEY_NAME})"))
            .set_expression_attribute_names(Some(expression.names))
            .set_expression_attribute_values(Some(expression.values))
            // Only the written attributes come back, so the reply always decodes.
            .return_values(ReturnValue::UpdatedNew)
            .send()
            .await;

        match result {
            Ok(output) => output.attributes().cloned().map(from_dynamo_item).transpose(),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_conditional_check_failed_exception()) =>
            {
                Ok(None)
            }
            Err(err) => Err(classify(err, StoreError::Write)),
        }
    }

    async fn delete(&self, key: Key) -> Result<(), StoreError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(to_dynamo_item(key)))
            .send()
            .await
            .map_err(|e| classify(e, StoreError::Write))?;

        Ok(())
    }
}

/// A `SET` update expression with its placeholder maps.
#[derive(Debug)]
struct UpdateExpression {
    expression: String,
    names: HashMap<String, String>,
    values: DynamoItem,
}

impl UpdateExpression {
    /// Placeholders are assigned in attribute-name order so the expression is stable.
    fn set(key_attribute: &str, deltas: Item) -> Self {
        let ordered: BTreeMap<String, AttributeValue> = deltas.into_iter().collect();

        let mut names = HashMap::from([(KEY_NAME.to_string(), key_attribute.to_string())]);
        let mut values = DynamoItem::new();
        let mut clauses = Vec::with_capacity(ordered.len());

        for (i, (attribute, value)) in ordered.into_iter().enumerate() {
            let name = format!("#a{i}");
            let placeholder = format!(":v{i}");
            clauses.push(format!("{name} = {placeholder}"));
            names.insert(name, attribute);
            values.insert(placeholder, to_dynamo(value));
        }

        Self {
            expression: format!("SET {}", clauses.join(", ")),
            names,
            values,
        }
    }
}

/// Transport failures, timeouts and throttling become `Unavailable`; anything
/// else is a rejection reported through `rejected`.
fn classify<E, R>(err: SdkError<E, R>, rejected: fn(String) -> StoreError) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(&err).to_string();

    let unavailable = match &err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => true,
        _ => err.code().is_some_and(|code| UNAVAILABLE_CODES.contains(&code)),
    };

    if unavailable {
        tracing::warn!(error = %message, "DynamoDB unavailable");
        StoreError::Unavailable(message)
    } else {
        rejected(message)
    }
}

fn to_dynamo(value: AttributeValue) -> DynamoValue {
    match value {
        AttributeValue::S(s) => DynamoValue::S(s),
        AttributeValue::N(n) => DynamoValue::N(n),
        AttributeValue::Bool(b) => DynamoValue::Bool(b),
        AttributeValue::Null => DynamoValue::Null(true),
        AttributeValue::L(items) => DynamoValue::L(items.into_iter().map(to_dynamo).collect()),
        AttributeValue::M(item) => DynamoValue::M(to_dynamo_item(item)),
    }
}

fn from_dynamo(value: DynamoValue) -> Result<AttributeValue, StoreError> {
    Ok(match value {
        DynamoValue::S(s) => AttributeValue::S(s),
        DynamoValue::N(n) => AttributeValue::N(n),
        DynamoValue::Bool(b) => AttributeValue::Bool(b),
        DynamoValue::Null(_) => AttributeValue::Null,
        DynamoValue::L(items) => AttributeValue::L(
            items
                .into_iter()
                .map(from_dynamo)
                .collect::<Result<_, _>>()?,
        ),
        DynamoValue::M(item) => AttributeValue::M(from_dynamo_item(item)?),
        // Sets have no JSON counterpart; they read back as lists.
        DynamoValue::Ss(set) => AttributeValue::L(set.into_iter().map(AttributeValue::S).collect()),
        DynamoValue::Ns(set) => AttributeValue::L(set.into_iter().map(AttributeValue::N).collect()),
        other => {
            return Err(StoreError::Marshal(format!(
                "unsupported DynamoDB attribute: {other:?}"
            )));
        }
    })
}

fn to_dynamo_item(item: Item) -> DynamoItem {
    item.into_iter()
        .map(|(name, value)| (name, to_dynamo(value)))
        .collect()
}

fn from_dynamo_item(item: DynamoItem) -> Result<Item, StoreError> {
    item.into_iter()
        .map(|(name, value)| Ok((name, from_dynamo(value)?)))
        .collect()
}
