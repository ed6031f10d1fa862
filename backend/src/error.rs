use rocket::http::Status;
use rocket::response::Responder;
use rocket::serde::json::Json;
use shared::{Error, ErrorCode, PollError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Poll(#[from] PollError),
    #[error("Missing poll_id")]
    MissingPollId,
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::Poll(PollError::PollNotFound(_)) => Status::NotFound,
            ApiError::Poll(PollError::PollAlreadyExists(_)) => Status::Conflict,
            ApiError::Poll(PollError::InvalidPoll(_))
            | ApiError::Poll(PollError::InvalidOption { .. })
            | ApiError::Poll(PollError::InvalidBatch(_))
            | ApiError::MissingPollId => Status::BadRequest,
        }
    }

    fn body(&self) -> Error {
        match self {
            ApiError::Poll(err) => Error::from(err),
            ApiError::MissingPollId => Error::new(ErrorCode::InvalidInput, self.to_string()),
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for ApiError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        rocket::Response::build_from(Json(self.body()).respond_to(req)?)
            .status(status)
            .ok()
    }
}
