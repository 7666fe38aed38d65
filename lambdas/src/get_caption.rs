use aws_config::BehaviorVersion;
use lambda_http::http::StatusCode;
use lambda_http::{
    run, service_fn, Error as LambdaError, Request as LambdaRequest, Response as LambdaResponse,
};
use tracing::{error, info};

mod common;
use crate::common::attributes::{item_to_json, keep_latest, Item};
use crate::common::errors::Error;
use crate::common::utils::{json_response, text_response};
use crate::common::TABLE_NAME_DEFAULT;

const NO_CAPTION_ERROR: &str = "No caption has been recorded yet";

async fn scan_latest(
    dynamo_client: &aws_sdk_dynamodb::Client,
    table_name: &str,
) -> Result<Option<Item>, Error> {
    let mut pages = dynamo_client
        .scan()
        .table_name(table_name)
        .into_paginator()
        .items()
        .send();

    let mut latest = None;
    let mut scanned = 0usize;
    while let Some(item) = pages.next().await {
        latest = keep_latest(latest, item.map_err(Box::new)?);
        scanned += 1;
    }
    info!("scanned items: {}", scanned);

    Ok(latest)
}

fn caption_response(
    latest: Option<Item>,
    table_name: &str,
) -> Result<LambdaResponse<String>, Error> {
    let Some(item) = latest else {
        error!("No caption in table {}", table_name);
        return Err(Error::HttpError(text_response(
            StatusCode::NOT_FOUND,
            NO_CAPTION_ERROR,
        )?));
    };

    json_response(&item_to_json(&item))
}

#[tracing::instrument(skip(dynamo_client))]
async fn process_request(
    _request: LambdaRequest,
    dynamo_client: &aws_sdk_dynamodb::Client,
    table_name: &str,
) -> Result<LambdaResponse<String>, Error> {
    let latest = scan_latest(dynamo_client, table_name).await?;

    caption_response(latest, table_name)
}

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .without_time() // CloudWatch will add the ingestion time
        .with_target(false)
        .init();

    let table_name = std::env::var("TABLE_NAME").unwrap_or(TABLE_NAME_DEFAULT.into());

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let dynamo_client = aws_sdk_dynamodb::Client::new(&config);

    run(service_fn(|request: LambdaRequest| async {
        let result = process_request(request, &dynamo_client, &table_name).await;

        match result {
            Ok(val) => Ok(val),
            Err(Error::HttpError(val)) => Ok(val),
            Err(Error::LambdaError(err)) => Err(err),
        }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::types::AttributeValue;

    #[test]
    fn empty_table_is_not_found() {
        let response = match caption_response(None, "status") {
            Err(Error::HttpError(response)) => response,
            other => panic!("expected a client response, got {:?}", other),
        };

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.body(), NO_CAPTION_ERROR);
    }

    #[test]
    fn latest_item_is_returned_as_attribute_json() {
        let mut item = Item::new();
        item.insert("caption".into(), AttributeValue::S("Smoke near gate 3.".into()));
        item.insert("timestamp".into(), AttributeValue::N("1735600000".into()));

        let response = caption_response(Some(item), "status").unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value = serde_json::from_str(response.body()).unwrap();
        assert_eq!(body["caption"], serde_json::json!({"S": "Smoke near gate 3."}));
        assert_eq!(body["timestamp"], serde_json::json!({"N": "1735600000"}));
    }
}
