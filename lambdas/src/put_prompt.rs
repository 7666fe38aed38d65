use aws_config::BehaviorVersion;
use lambda_http::http::StatusCode;
use lambda_http::{
    run, service_fn, Error as LambdaError, Request as LambdaRequest, Response as LambdaResponse,
};
use tracing::{error, info};

mod common;
use crate::common::errors::Error;
use crate::common::prompts::{selection_item, SelectPromptRequest};
use crate::common::utils::{extract_request, json_response, text_response};
use crate::common::UTIL_TABLE_NAME_DEFAULT;

const EMPTY_PROMPT_ID_ERROR: &str = "Selected prompt id is empty";

async fn store_selection(
    selected_id: &str,
    dynamo_client: &aws_sdk_dynamodb::Client,
    util_table_name: &str,
) -> Result<(), Error> {
    info!("Storing selected prompt: {}", selected_id);
    let response = dynamo_client
        .put_item()
        .table_name(util_table_name)
        .set_item(Some(selection_item(selected_id)))
        .send()
        .await
        .map_err(Box::new)?;

    info!("Stored: {:?}", response);

    Ok(())
}

#[tracing::instrument(skip(dynamo_client))]
async fn process_request(
    request: LambdaRequest,
    dynamo_client: &aws_sdk_dynamodb::Client,
    util_table_name: &str,
) -> Result<LambdaResponse<String>, Error> {
    let request = extract_request::<SelectPromptRequest>(&request)?;
    let selected_id = request.selected_id.trim();
    if selected_id.is_empty() {
        error!("Rejected empty prompt id");
        return Err(Error::HttpError(text_response(
            StatusCode::BAD_REQUEST,
            EMPTY_PROMPT_ID_ERROR,
        )?));
    }

    store_selection(selected_id, dynamo_client, util_table_name).await?;

    json_response(&SelectPromptRequest {
        selected_id: selected_id.into(),
    })
}

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .without_time() // CloudWatch will add the ingestion time
        .with_target(false)
        .init();

    let util_table_name = std::env::var("UTIL_TABLE_NAME").unwrap_or(UTIL_TABLE_NAME_DEFAULT.into());

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let dynamo_client = aws_sdk_dynamodb::Client::new(&config);

    run(service_fn(|request: LambdaRequest| async {
        let result = process_request(request, &dynamo_client, &util_table_name).await;

        match result {
            Ok(val) => Ok(val),
            Err(Error::HttpError(val)) => Ok(val),
            Err(Error::LambdaError(err)) => Err(err),
        }
    }))
    .await
}
