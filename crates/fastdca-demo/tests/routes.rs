//! End-to-end tests of every demo route through the in-memory client.

use fastdca_config::AppConfig;
use fastdca_demo::{app, GOAL};
use fastdca_test::TestClient;
use http::StatusCode;
use proptest::prelude::*;
use serde_json::json;

fn client() -> TestClient {
    TestClient::new(app(&AppConfig::default()))
}

#[tokio::test]
async fn read_root() {
    client()
        .get("/")
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_json_eq(&json!({"Hello": "World"}));
}

#[tokio::test]
async fn read_item_with_and_without_query() {
    let client = client();

    client
        .get("/items/5")
        .query("q", "somequery")
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_json_eq(&json!({"item_id": 5, "q": "somequery"}));

    client
        .get("/items/5")
        .send()
        .await
        .assert_json_eq(&json!({"item_id": 5, "q": null}));
}

#[tokio::test]
async fn read_item_rejects_non_integer_id() {
    let response = client().get("/items/five").send().await;
    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_json_field("error.category", &json!("bad_request"));
}

#[tokio::test]
async fn simple_goal() {
    client()
        .get("/get-simple-goal")
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_json_eq(&json!({"goal": GOAL}));
}

#[tokio::test]
async fn goal_with_username() {
    let client = client();

    client
        .get("/get-goal")
        .query("username", "hadiqa")
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_json_eq(&json!({"goal": GOAL, "username": "hadiqa"}));

    client
        .get("/get-goal")
        .send()
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn signin_with_default_credentials() {
    let client = client();

    client
        .get("/signin")
        .query("username", "admin")
        .query("password", "admin")
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_json_eq(&json!({"message": "Login Successful"}));

    client
        .get("/signin")
        .query("username", "admin")
        .query("password", "guess")
        .send()
        .await
        .assert_json_eq(&json!({"message": "Login Failed"}));

    client
        .get("/signin")
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_json_eq(&json!({"message": "Login Failed"}));
}

#[tokio::test]
async fn signin_uses_configured_credentials() {
    let mut config = AppConfig::default();
    config.login.username = "hadiqa".into();
    config.login.password = "s3cret".into();
    let client = TestClient::new(app(&config));

    client
        .get("/signin?username=hadiqa&password=s3cret")
        .send()
        .await
        .assert_json_field("message", &json!("Login Successful"));

    client
        .get("/signin?username=admin&password=admin")
        .send()
        .await
        .assert_json_field("message", &json!("Login Failed"));
}

#[tokio::test]
async fn main_sums_dependencies() {
    let response = client().get("/main/5").send().await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<String>().unwrap(), "Pakistan 18");

    let response = client().get("/main/-1").send().await;
    assert_eq!(response.json::<String>().unwrap(), "Pakistan 0");

    client()
        .get("/main/abc")
        .send()
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn main_sums_exactly_at_i64_limits() {
    let client = client();

    let response = client.get(format!("/main/{}", i64::MAX)).send().await;
    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.json::<String>().unwrap(),
        format!("Pakistan {}", 3 * i128::from(i64::MAX) + 3)
    );

    let n = i64::MAX / 3 + 1;
    let response = client.get(format!("/main/{n}")).send().await;
    assert_eq!(
        response.json::<String>().unwrap(),
        "Pakistan 9223372036854775812"
    );

    let response = client.get(format!("/main/{}", i64::MIN)).send().await;
    assert_eq!(
        response.json::<String>().unwrap(),
        "Pakistan -27670116110564327421"
    );

    client
        .get("/main/9223372036854775808")
        .send()
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn blog_lookup() {
    let client = client();

    let response = client.get("/blog/2").send().await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<String>().unwrap(), "Machine Learning Blog");

    client
        .get("/blog/99")
        .send()
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_message("Object ID 99 not found")
        .assert_json_field("error.details.resource_id", &json!("99"));
}

#[tokio::test]
async fn blog_id_is_percent_decoded() {
    let client = client();

    let response = client.get("/blog/%32").send().await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<String>().unwrap(), "Machine Learning Blog");

    client
        .get("/blog/1%202")
        .send()
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_message("Object ID 1 2 not found")
        .assert_json_field("error.details.resource_id", &json!("1 2"));
}

#[tokio::test]
async fn user_lookup() {
    let client = client();

    let response = client.get("/user/8").send().await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<String>().unwrap(), "Ahmed");

    client
        .get("/user/7")
        .send()
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_message("Object ID 7 not found");

    // A blog ID is not a user ID.
    client
        .get("/user/1")
        .send()
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_message("Object ID 1 not found");
}

#[tokio::test]
async fn create_user_echoes_dump() {
    client()
        .post("/users")
        .json(&json!({"id": 1, "name": "Hadiqa Gohar", "email": "hg@example.com", "age": 19}))
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_json_eq(&json!({
            "id": 1,
            "name": "Hadiqa Gohar",
            "email": "hg@example.com",
            "age": 19
        }));

    client()
        .post("/users")
        .json(&json!({"id": 2, "name": "Bob", "email": "bob@example.com"}))
        .send()
        .await
        .assert_json_field("age", &json!(null));
}

#[tokio::test]
async fn create_user_reports_field_errors() {
    let response = client()
        .post("/users")
        .json(&json!({"id": "not_an_int", "name": "Bob", "email": "bob"}))
        .send()
        .await;

    response
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
        .assert_json_field("error.code", &json!("VALIDATION_ERROR"));

    let body = response.json_value().unwrap();
    let fields = &body["error"]["details"]["fields"];
    assert!(fields["id"].is_array());
    assert_eq!(fields["email"], json!(["Value is not a valid email address"]));
}

#[tokio::test]
async fn create_user_rejects_malformed_json() {
    client()
        .post("/users")
        .content_type("application/json")
        .body("{not json")
        .send()
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_path_and_wrong_method() {
    let client = client();

    client
        .get("/nowhere")
        .send()
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .assert_json_field("error.code", &json!("ROUTE_NOT_FOUND"));

    client
        .delete("/blog/1")
        .send()
        .await
        .assert_status(StatusCode::METHOD_NOT_ALLOWED)
        .assert_header("allow", "GET");
}

#[tokio::test]
async fn health_reports_service_name() {
    client()
        .get("/health")
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_json_field("status", &json!("healthy"))
        .assert_json_field("service", &json!("fastdca-demo"));
}

proptest! {
    #[test]
    fn main_total_is_three_n_plus_three(n in any::<i64>()) {
        let response = tokio_test::block_on(client().get(format!("/main/{n}")).send());
        prop_assert_eq!(response.status(), StatusCode::OK);
        prop_assert_eq!(
            response.json::<String>().unwrap(),
            format!("Pakistan {}", 3 * i128::from(n) + 3)
        );
    }

    #[test]
    fn unknown_blog_ids_carry_the_id(id in "[a-z]{1,8}") {
        let response = tokio_test::block_on(client().get(format!("/blog/{id}")).send());
        prop_assert_eq!(response.status(), StatusCode::NOT_FOUND);
        prop_assert_eq!(response.error_message(), Some(format!("Object ID {id} not found")));
    }
}
