use rocket::http::{ContentType, Header, Status};
use rocket::local::blocking::Client;
use serde_json::{json, Value};

use crate::build_rocket;

fn client() -> Client {
    client_with(rocket::Config::figment().merge(("live_update_interval_ms", 50)))
}

fn client_with(figment: rocket::figment::Figment) -> Client {
    Client::tracked(build_rocket(figment)).expect("valid rocket instance")
}

fn create(client: &Client, body: Value) -> (Status, Value) {
    let response = client
        .post("/api/create_poll")
        .header(ContentType::JSON)
        .body(body.to_string())
        .dispatch();
    let status = response.status();
    (status, response.into_json().unwrap_or(Value::Null))
}

fn vote(client: &Client, poll_id: &str, option: &str) -> Status {
    client
        .post("/api/vote")
        .header(ContentType::JSON)
        .body(json!({ "poll_id": poll_id, "option": option }).to_string())
        .dispatch()
        .status()
}

fn results(client: &Client, poll_id: &str) -> (Status, Value) {
    let response = client.get(format!("/api/results/{}", poll_id)).dispatch();
    let status = response.status();
    (status, response.into_json().unwrap_or(Value::Null))
}

fn colours(client: &Client) {
    let (status, _) = create(client, json!({ "id": "p1", "question": "Favourite colour?", "options": ["Red", "Blue"] }));
    assert_eq!(status, Status::Created);
}

#[test]
fn test_create_poll_echoes_poll() {
    let client = client();
    let (status, body) = create(&client, json!({ "id": "p1", "question": "Favourite colour?", "options": ["Red", "Blue"] }));

    assert_eq!(status, Status::Created);
    assert_eq!(body["id"], "p1");
    assert_eq!(body["options"], json!(["Red", "Blue"]));

    let (status, body) = results(&client, "p1");
    assert_eq!(status, Status::Ok);
    assert_eq!(body["results"], json!({ "Red": 0, "Blue": 0 }));
}

#[test]
fn test_create_poll_without_id() {
    let client = client();
    let (status, body) = create(&client, json!({ "question": "Anything?", "options": ["Yes"] }));

    assert_eq!(status, Status::Created);
    let id = body["id"].as_str().unwrap();
    assert_eq!(results(&client, id).0, Status::Ok);
}

#[test]
fn test_create_poll_errors() {
    let client = client();
    colours(&client);

    let (status, body) = create(&client, json!({ "id": "p1", "question": "Again?", "options": ["A"] }));
    assert_eq!(status, Status::Conflict);
    assert_eq!(body["code"], "pollAlreadyExists");

    let (status, body) = create(&client, json!({ "id": "p2", "question": "Empty?", "options": [] }));
    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["code"], "invalidPoll");

    let (status, _) = create(&client, json!({ "id": "p3", "options": ["A"] }));
    assert_eq!(status, Status::UnprocessableEntity);
}

#[test]
fn test_voting_scenario() {
    let client = client();
    colours(&client);

    for option in ["Red", "Red", "Blue"] {
        assert_eq!(vote(&client, "p1", option), Status::Ok);
    }

    let (_, body) = results(&client, "p1");
    assert_eq!(body["results"], json!({ "Red": 2, "Blue": 1 }));
    assert_eq!(body["total_votes"], 3);
    assert_eq!(body["poll"]["question"], "Favourite colour?");
}

#[test]
fn test_vote_errors() {
    let client = client();
    colours(&client);

    assert_eq!(vote(&client, "missing", "Red"), Status::NotFound);
    assert_eq!(vote(&client, "", "Red"), Status::BadRequest);
    assert_eq!(vote(&client, "p1", "Green"), Status::BadRequest);
    assert_eq!(results(&client, "p1").1["total_votes"], 0);
    assert_eq!(results(&client, "missing").0, Status::NotFound);
}

#[test]
fn test_permissive_policy_from_config() {
    let client = client_with(rocket::Config::figment().merge(("tally_policy", "permissive")));
    colours(&client);

    assert_eq!(vote(&client, "p1", "Green"), Status::Ok);
    assert_eq!(results(&client, "p1").1["results"]["Green"], 1);
}

#[test]
fn test_vote_multiple_is_best_effort() {
    let client = client();
    colours(&client);
    for option in ["Red", "Red", "Blue"] {
        vote(&client, "p1", option);
    }

    let response = client
        .post("/api/vote_multiple")
        .header(ContentType::JSON)
        .body(
            json!([
                { "poll_id": "p1", "option": "Red" },
                { "poll_id": "missing", "option": "X" },
                { "poll_id": "p1", "option": "Blue" }
            ])
            .to_string(),
        )
        .dispatch();

    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().unwrap();
    assert_eq!(body["accepted"], 2);
    assert_eq!(body["rejected"], 1);
    assert_eq!(body["results"][1]["error"]["code"], "pollNotFound");

    assert_eq!(results(&client, "p1").1["results"], json!({ "Red": 3, "Blue": 2 }));

    let empty = client.post("/api/vote_multiple").header(ContentType::JSON).body("[]").dispatch();
    assert_eq!(empty.status(), Status::BadRequest);
}

#[test]
fn test_poll_listing() {
    let client = client();
    colours(&client);

    let list: Value = client.get("/api/polls").dispatch().into_json().unwrap();
    assert_eq!(list.as_array().map(Vec::len), Some(1));
    assert_eq!(list[0]["option_count"], 2);

    let poll: Value = client.get("/api/polls/p1").dispatch().into_json().unwrap();
    assert_eq!(poll["question"], "Favourite colour?");
    assert_eq!(client.get("/api/polls/nope").dispatch().status(), Status::NotFound);
}

#[test]
fn test_location_header_is_encoded() {
    let client = client();
    let response = client
        .post("/api/create_poll")
        .header(ContentType::JSON)
        .body(json!({ "id": "q?x", "question": "Encoded?", "options": ["A"] }).to_string())
        .dispatch();

    assert_eq!(response.status(), Status::Created);
    let location = response.headers().get_one("Location").map(str::to_string);
    assert_eq!(location.as_deref(), Some("/api/results/q%3Fx"));

    let body: Value = client.get(location.unwrap()).dispatch().into_json().unwrap();
    assert_eq!(body["poll"]["id"], "q?x");

    let (status, body) = create(&client, json!({ "id": "a\u{1}b", "question": "Control?", "options": ["A"] }));
    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["code"], "invalidPoll");
}

#[test]
fn test_poll_updates_unknown_poll() {
    let client = client();
    assert_eq!(client.get("/api/poll_updates/nope").dispatch().status(), Status::NotFound);
}

#[test]
fn test_cors_headers() {
    let client = client();

    let allowed = client.get("/api/polls").header(Header::new("Origin", "http://localhost:3000")).dispatch();
    assert_eq!(allowed.headers().get_one("Access-Control-Allow-Origin"), Some("http://localhost:3000"));

    let exact = client.get("/api/polls").header(Header::new("Origin", "http://localhost")).dispatch();
    assert_eq!(exact.headers().get_one("Access-Control-Allow-Origin"), Some("http://localhost"));

    for origin in ["https://example.com", "http://localhost.attacker.example", "http://localhost:3000.evil.example"] {
        let denied = client.get("/api/polls").header(Header::new("Origin", origin)).dispatch();
        assert!(denied.headers().get_one("Access-Control-Allow-Origin").is_none(), "{} was allowed", origin);
    }

    assert_eq!(client.options("/api/vote").dispatch().status(), Status::Ok);
}

#[test]
fn test_invalid_config_aborts_ignition() {
    let figment = rocket::Config::figment().merge(("live_update_interval_ms", 0));
    let Err(err) = Client::tracked(build_rocket(figment)) else {
        panic!("invalid config must abort ignition");
    };
    assert!(matches!(err.kind(), rocket::error::ErrorKind::FailedFairings(_)));
}

#[rocket::async_test]
async fn test_poll_updates_stream() {
    use rocket::local::asynchronous::Client;

    let figment = rocket::Config::figment().merge(("live_update_interval_ms", 60_000));
    let client = Client::tracked(build_rocket(figment)).await.unwrap();
    client
        .post("/api/create_poll")
        .header(ContentType::JSON)
        .body(json!({ "id": "p1", "question": "Favourite colour?", "options": ["Red", "Blue"] }).to_string())
        .dispatch()
        .await;
    client
        .post("/api/vote")
        .header(ContentType::JSON)
        .body(json!({ "poll_id": "p1", "option": "Red" }).to_string())
        .dispatch()
        .await;

    let response = client.get("/api/poll_updates/p1").dispatch().await;
    assert_eq!(response.content_type(), Some(ContentType::EventStream));

    client.rocket().shutdown().notify();
    let body = response.into_string().await.unwrap();
    assert!(body.contains("results"), "unexpected stream body: {}", body);
    assert!(body.contains(r#""Red":1"#), "unexpected stream body: {}", body);
}
