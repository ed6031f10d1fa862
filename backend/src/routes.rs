use rocket::{State, Shutdown, get, post, uri, http::Status, serde::json::Json};
use rocket::response::status::Created;
use rocket::response::stream::{Event, EventStream};
use rocket::tokio::select;
use futures::StreamExt;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};
use shared::{
    AggregationService, BatchOutcome, CreatePollRequest, Error, Poll, PollResult, PollStore,
    PollSummary, Vote,
};
use crate::{config::AppConfig, error::ApiError, live::result_updates};

pub struct AppState {
    pub service: AggregationService,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let store = Arc::new(PollStore::new(config.tally_policy));
        Self {
            service: AggregationService::new(store).with_max_batch_size(config.max_batch_size),
            config,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VoteAccepted {
    pub status: &'static str,
}

#[rocket::options("/<_..>")]
pub async fn all_options() -> Status {
    Status::Ok
}

#[instrument(skip(state, request))]
#[post("/create_poll", format = "json", data = "<request>")]
pub async fn create_poll(
    state: &State<AppState>,
    request: Json<CreatePollRequest>,
) -> Result<Created<Json<Poll>>, ApiError> {
    let poll = request.into_inner().into_poll();
    state.service.create_poll(poll.clone())?;
    let location = uri!("/api", get_results(poll.id.as_str()));
    Ok(Created::new(location.to_string()).body(Json(poll)))
}

#[instrument(skip(state, vote))]
#[post("/vote", format = "json", data = "<vote>")]
pub async fn cast_vote(state: &State<AppState>, vote: Json<Vote>) -> Result<Json<VoteAccepted>, ApiError> {
    let vote = vote.into_inner();
    if vote.poll_id.is_empty() {
        return Err(ApiError::MissingPollId);
    }
    state.service.cast_vote(&vote)?;
    Ok(Json(VoteAccepted { status: "ok" }))
}

#[instrument(skip(state, votes))]
#[post("/vote_multiple", format = "json", data = "<votes>")]
pub async fn cast_votes(state: &State<AppState>, votes: Json<Vec<Vote>>) -> Result<Json<BatchOutcome>, ApiError> {
    let votes = votes.into_inner();
    debug!("Applying batch of {} votes", votes.len());
    Ok(Json(state.service.cast_votes(&votes)?))
}

#[instrument(skip(state), fields(poll_id = %id))]
#[get("/results/<id>")]
pub async fn get_results(state: &State<AppState>, id: &str) -> Result<Json<PollResult>, ApiError> {
    Ok(Json(state.service.results(id)?))
}

#[instrument(skip(state))]
#[get("/polls")]
pub async fn list_polls(state: &State<AppState>) -> Json<Vec<PollSummary>> {
    Json(state.service.polls())
}

#[instrument(skip(state), fields(poll_id = %id))]
#[get("/polls/<id>")]
pub async fn get_poll(state: &State<AppState>, id: &str) -> Result<Json<Poll>, ApiError> {
    Ok(Json(state.service.poll(id)?))
}

/// Server-sent `results` events whenever the tally changes. Ends on server
/// shutdown, on client disconnect (the stream is dropped), or after a single
/// `error` event.
#[instrument(skip(state, shutdown), fields(poll_id = %id))]
#[get("/poll_updates/<id>")]
pub fn poll_updates(
    state: &State<AppState>,
    id: &str,
    mut shutdown: Shutdown,
) -> Result<EventStream<impl futures::Stream<Item = Event>>, ApiError> {
    state.service.results(id)?;

    let period = state.config.live_update_interval();
    let mut updates = Box::pin(result_updates(state.service.clone(), id.to_string(), period));

    Ok(EventStream! {
        loop {
            let next = select! {
                biased;
                next = updates.next() => next,
                _ = &mut shutdown => break,
            };
            match next {
                Some(Ok(result)) => yield Event::json(&result).event("results"),
                Some(Err(e)) => {
                    yield Event::json(&Error::from(&e)).event("error");
                    break;
                }
                None => break,
            }
        }
    })
}
