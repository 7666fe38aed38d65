use lambda_http::http::StatusCode;
use lambda_http::{Request, RequestPayloadExt, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::common::errors::Error;

const EMPTY_PAYLOAD_ERROR: &str = "Request payload is empty";

pub fn extract_request<T: DeserializeOwned>(request: &Request) -> Result<T, Error> {
    match request.payload::<T>() {
        Ok(Some(val)) => Ok(val),
        Ok(None) => Err(Error::HttpError(text_response(
            StatusCode::BAD_REQUEST,
            EMPTY_PAYLOAD_ERROR,
        )?)),
        Err(err) => Err(Error::HttpError(text_response(
            StatusCode::BAD_REQUEST,
            &err.to_string(),
        )?)),
    }
}

pub fn text_response(status: StatusCode, body: &str) -> Result<Response<String>, Error> {
    let response = Response::builder()
        .status(status)
        .header("content-type", "text/html")
        .body(body.to_string())?;

    Ok(response)
}

pub fn json_response<T: Serialize>(body: &T) -> Result<Response<String>, Error> {
    let response = Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(serde_json::to_string(body)?)?;

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_http::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[serde(rename = "selectedId")]
        selected_id: String,
    }

    fn json_request(body: &str) -> Request {
        lambda_http::http::Request::builder()
            .method("PUT")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[test]
    fn extracts_json_payload() {
        let request = json_request(r#"{"selectedId": "fall-detection"}"#);
        let payload = extract_request::<Payload>(&request).unwrap();
        assert_eq!(payload.selected_id, "fall-detection");
    }

    #[test]
    fn malformed_payload_is_bad_request() {
        let request = json_request(r#"{"selected": 1}"#);
        match extract_request::<Payload>(&request) {
            Err(Error::HttpError(response)) => assert_eq!(response.status(), 400),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn payload_without_content_type_is_empty() {
        let request = lambda_http::http::Request::builder()
            .method("PUT")
            .body(Body::from(r#"{"selectedId": "a"}"#))
            .unwrap();
        match extract_request::<Payload>(&request) {
            Err(Error::HttpError(response)) => {
                assert_eq!(response.status(), 400);
                assert_eq!(response.body(), EMPTY_PAYLOAD_ERROR);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn json_response_sets_content_type() {
        let response = json_response(&serde_json::json!({"selectedId": "a"})).unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["Content-Type"], "application/json");
        assert_eq!(response.body(), r#"{"selectedId":"a"}"#);
    }
}
