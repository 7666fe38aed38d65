use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::types::AttributeValue;
use lambda_http::{
    run, service_fn, Error as LambdaError, Request as LambdaRequest, Response as LambdaResponse,
};
use tracing::info;

mod common;
use crate::common::errors::Error;
use crate::common::prompts::{PromptConfig, SELECTED_PROMPT_KEY};
use crate::common::utils::json_response;
use crate::common::{KEY_ATTRIBUTE, PROMPT_TABLE_NAME_DEFAULT, UTIL_TABLE_NAME_DEFAULT};

async fn load_prompt_config(
    dynamo_client: &aws_sdk_dynamodb::Client,
    prompt_table_name: &str,
    util_table_name: &str,
) -> Result<PromptConfig, Error> {
    let mut pages = dynamo_client
        .scan()
        .table_name(prompt_table_name)
        .into_paginator()
        .items()
        .send();

    let mut catalog = Vec::new();
    while let Some(item) = pages.next().await {
        catalog.push(item.map_err(Box::new)?);
    }
    info!("prompts in catalog: {}", catalog.len());

    let selection = dynamo_client
        .get_item()
        .table_name(util_table_name)
        .key(KEY_ATTRIBUTE, AttributeValue::S(SELECTED_PROMPT_KEY.into()))
        .send()
        .await
        .map_err(Box::new)?;

    Ok(PromptConfig::from_items(catalog, selection.item()))
}

#[tracing::instrument(skip(dynamo_client))]
async fn process_request(
    _request: LambdaRequest,
    dynamo_client: &aws_sdk_dynamodb::Client,
    prompt_table_name: &str,
    util_table_name: &str,
) -> Result<LambdaResponse<String>, Error> {
    let config = load_prompt_config(dynamo_client, prompt_table_name, util_table_name).await?;
    info!("selected prompt: {:?}", config.selected_id);

    json_response(&config)
}

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .without_time() // CloudWatch will add the ingestion time
        .with_target(false)
        .init();

    let prompt_table_name =
        std::env::var("PROMPT_TABLE_NAME").unwrap_or(PROMPT_TABLE_NAME_DEFAULT.into());
    let util_table_name = std::env::var("UTIL_TABLE_NAME").unwrap_or(UTIL_TABLE_NAME_DEFAULT.into());

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let dynamo_client = aws_sdk_dynamodb::Client::new(&config);

    run(service_fn(|request: LambdaRequest| async {
        let result = process_request(
            request,
            &dynamo_client,
            &prompt_table_name,
            &util_table_name,
        )
        .await;

        match result {
            Ok(val) => Ok(val),
            Err(Error::HttpError(val)) => Ok(val),
            Err(Error::LambdaError(err)) => Err(err),
        }
    }))
    .await
}
