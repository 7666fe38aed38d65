use lambda_http::{Error as LambdaError, Response};

/// Handler failure. `HttpError` carries a response meant for the caller (bad
/// request, not found), `LambdaError` is an internal failure reported to the
/// runtime.
#[derive(Debug)]
pub enum Error {
    HttpError(Response<String>),
    LambdaError(LambdaError),
}

impl<E> From<E> for Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Error::LambdaError(Box::new(err))
    }
}
