//! API integration tests
//!
//! These run against a live server with an empty database and a bootstrap
//! Dean configured, e.g.
//!
//! ```text
//! LABDESK__BOOTSTRAP__DEAN_NAME=Dean \
//! LABDESK__BOOTSTRAP__DEAN_EMAIL=dean@labdesk.test \
//! LABDESK__BOOTSTRAP__DEAN_PASSWORD=dean-password \
//! cargo run
//! ```
//!
//! then `cargo test --test api_tests -- --ignored`.

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:8080/api";
const DEAN_EMAIL: &str = "dean@labdesk.test";
const DEAN_PASSWORD: &str = "dean-password";
const PASSWORD: &str = "integration-password";

fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, &Uuid::new_v4().simple().to_string()[..8])
}

async fn login(client: &Client, email: &str, password: &str) -> reqwest::Response {
    client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to send login request")
}

async fn token_for(client: &Client, email: &str, password: &str) -> String {
    let response = login(client, email, password).await;
    assert_eq!(response.status(), StatusCode::OK, "login {}", email);
    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

async fn dean_token(client: &Client) -> String {
    token_for(client, DEAN_EMAIL, DEAN_PASSWORD).await
}

async fn get(client: &Client, token: &str, path: &str) -> Value {
    let response = client
        .get(format!("{}{}", BASE_URL, path))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success(), "GET {} -> {}", path, response.status());
    response.json().await.expect("Failed to parse response")
}

async fn post(client: &Client, token: &str, path: &str, body: Value) -> reqwest::Response {
    client
        .post(format!("{}{}", BASE_URL, path))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .expect("Failed to send request")
}

async fn patch(client: &Client, token: &str, path: &str, body: Value) -> reqwest::Response {
    client
        .patch(format!("{}{}", BASE_URL, path))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .expect("Failed to send request")
}

async fn my_id(client: &Client, token: &str) -> String {
    let me = get(client, token, "/auth/me").await;
    me["id"].as_str().expect("No id in profile").to_string()
}

/// Approved LAB_SETUP request titled `title`; returns its path
async fn approved_lab_setup(client: &Client, dean: &str, hod: &str, title: &str) -> String {
    let response = post(
        client,
        hod,
        "/requests",
        json!({ "title": title, "description": "Lab for the robotics elective", "request_type": "LAB_SETUP" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let request: Value = response.json().await.unwrap();
    let path = format!("/requests/{}", request["id"].as_str().unwrap());

    let response = patch(client, dean, &path, json!({ "status": "APPROVED" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    path
}

/// Admin account created by the Dean
async fn admin_token(client: &Client, dean: &str) -> String {
    let email = format!("{}@labdesk.test", unique("admin"));
    let response = post(
        client,
        dean,
        "/users",
        json!({ "name": "Sysadmin", "email": email, "password": PASSWORD, "role": "ADMIN" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    token_for(client, &email, PASSWORD).await
}

/// Self-registered HOD and the id of their pending account approval
async fn register_hod(client: &Client, dean: &str) -> (String, Value, String) {
    let email = format!("{}@labdesk.test", unique("hod"));
    let response = client
        .post(format!("{}/register", BASE_URL))
        .json(&json!({
            "name": "Head",
            "email": email,
            "password": PASSWORD,
            "department_name": unique("Department"),
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let user: Value = response.json().await.unwrap();
    assert_eq!(user["status"], "PENDING");

    let requests = get(client, dean, "/requests").await;
    let approval = requests
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["created_by_email"] == email.as_str() && r["request_type"] == "ACCOUNT_APPROVAL")
        .expect("account approval filed on registration");
    assert_eq!(approval["status"], "PENDING");

    (email, user, approval["id"].as_str().unwrap().to_string())
}

/// Registered and approved HOD: (token, department id)
async fn active_hod(client: &Client, dean: &str) -> (String, String) {
    let (email, user, approval_id) = register_hod(client, dean).await;
    let response = patch(client, dean, &format!("/requests/{}", approval_id), json!({ "status": "APPROVED" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let token = token_for(client, &email, PASSWORD).await;
    (token, user["department_id"].as_str().unwrap().to_string())
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login_and_me() {
    let client = Client::new();

    let response = login(&client, DEAN_EMAIL, DEAN_PASSWORD).await;
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert!(body["user"].get("password").is_none());

    let me = get(&client, body["token"].as_str().unwrap(), "/auth/me").await;
    assert_eq!(me["role"], "DEAN");

    let response = login(&client, DEAN_EMAIL, "wrong-password").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_request_goes_from_hod_through_dean_to_admin() {
    let client = Client::new();
    let dean = dean_token(&client).await;
    let admin = admin_token(&client, &dean).await;
    let (hod, department_id) = active_hod(&client, &dean).await;

    let response = post(
        &client,
        &hod,
        "/requests",
        json!({ "title": "20 PCs", "description": "Replace the first-year lab", "request_type": "NEW_SYSTEM" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let request: Value = response.json().await.unwrap();
    let id = request["id"].as_str().unwrap().to_string();
    assert_eq!(request["department_id"], department_id.as_str());
    assert!(request["request_number"].as_str().unwrap().starts_with("REQ-"));

    let listed = get(&client, &dean, "/requests").await;
    let seen = listed.as_array().unwrap().iter().find(|r| r["id"] == id.as_str()).unwrap();
    assert_eq!(seen["status"], "PENDING");

    // Admins only act on approved work
    let response = patch(&client, &admin, &format!("/requests/{}", id), json!({ "status": "COMPLETED" })).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = patch(&client, &dean, &format!("/requests/{}", id), json!({ "status": "APPROVED" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let approved: Value = response.json().await.unwrap();
    assert!(approved["approved_at"].is_string());

    let listed = get(&client, &admin, "/requests").await;
    assert!(listed.as_array().unwrap().iter().any(|r| r["id"] == id.as_str()));

    let response = patch(&client, &admin, &format!("/requests/{}", id), json!({ "status": "COMPLETED" })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let seen = get(&client, &hod, &format!("/requests/{}", id)).await;
    assert_eq!(seen["status"], "COMPLETED");
    assert!(seen["completed_at"].is_string());
    assert!(seen["assigned_admin_id"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_repeated_account_approval_is_idempotent() {
    let client = Client::new();
    let dean = dean_token(&client).await;
    let (email, _, approval_id) = register_hod(&client, &dean).await;

    let response = login(&client, &email, PASSWORD).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    for _ in 0..2 {
        let response =
            patch(&client, &dean, &format!("/requests/{}", approval_id), json!({ "status": "APPROVED" })).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = login(&client, &email, PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);

    let activities = get(&client, &dean, "/activities?limit=200").await;
    let approvals = activities
        .as_array()
        .unwrap()
        .iter()
        .filter(|a| a["entity_id"] == approval_id.as_str() && a["action"] == "APPROVED")
        .count();
    assert_eq!(approvals, 1);
}

#[tokio::test]
#[ignore]
async fn test_declined_hod_cannot_log_in() {
    let client = Client::new();
    let dean = dean_token(&client).await;
    let (email, _, approval_id) = register_hod(&client, &dean).await;

    let response = patch(&client, &dean, &format!("/requests/{}", approval_id), json!({ "status": "DECLINED" })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = login(&client, &email, PASSWORD).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Account has been rejected");
}

#[tokio::test]
#[ignore]
async fn test_concurrent_lab_setup_approvals_create_one_lab() {
    let client = Client::new();
    let dean = dean_token(&client).await;
    let (hod, department_id) = active_hod(&client, &dean).await;

    let title = unique("Networking Lab");
    let response = post(
        &client,
        &hod,
        "/requests",
        json!({ "title": title, "description": "Lab for the networking course", "request_type": "LAB_SETUP" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let request: Value = response.json().await.unwrap();
    let path = format!("/requests/{}", request["id"].as_str().unwrap());

    let body = json!({ "status": "APPROVED" });
    let (first, second) = tokio::join!(
        patch(&client, &dean, &path, body.clone()),
        patch(&client, &dean, &path, body.clone()),
    );
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::OK);

    let labs = get(&client, &dean, &format!("/labs?department_id={}", department_id)).await;
    let matching: Vec<&Value> = labs.as_array().unwrap().iter().filter(|l| l["name"] == title.as_str()).collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0]["location"], "Allocation Pending");
    assert!(matching[0]["code"].as_str().unwrap().starts_with("LAB-"));
}

#[tokio::test]
#[ignore]
async fn test_duplicate_asset_number_is_rejected() {
    let client = Client::new();
    let dean = dean_token(&client).await;

    let response = post(&client, &dean, "/departments", json!({ "name": unique("Physics"), "code": unique("PHY") })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let department: Value = response.json().await.unwrap();

    let number = unique("PHY-DT");
    let asset = json!({
        "name": "Workstation",
        "asset_number": number,
        "asset_type": "DESKTOP",
        "mac_address": "00:1A:2B:3C:4D:5E",
        "department_id": department["id"],
    });
    let response = post(&client, &dean, "/assets", asset.clone()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post(&client, &dean, "/assets", asset).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let page = get(&client, &dean, &format!("/assets?search={}", number)).await;
    assert_eq!(page["total"], 1);
}

#[tokio::test]
#[ignore]
async fn test_deleting_lab_keeps_its_assets() {
    let client = Client::new();
    let dean = dean_token(&client).await;

    let response = post(&client, &dean, "/departments", json!({ "name": unique("Chemistry"), "code": unique("CHM") })).await;
    let department: Value = response.json().await.unwrap();

    let response = post(
        &client,
        &dean,
        "/labs",
        json!({ "name": "Chem Lab 1", "code": unique("CHM-L1"), "department_id": department["id"], "capacity": 30 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let lab: Value = response.json().await.unwrap();

    let response = post(
        &client,
        &dean,
        "/assets",
        json!({
            "name": "Spectrometer PC",
            "asset_number": unique("CHM-DT"),
            "asset_type": "DESKTOP",
            "department_id": department["id"],
            "lab_id": lab["id"],
        }),
    )
    .await;
    let asset: Value = response.json().await.unwrap();

    let response = client
        .delete(format!("{}/labs/{}", BASE_URL, lab["id"].as_str().unwrap()))
        .bearer_auth(&dean)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let kept = get(&client, &dean, &format!("/assets/{}", asset["id"].as_str().unwrap())).await;
    assert!(kept["lab_id"].is_null());

    // Still referenced by its asset
    let response = client
        .delete(format!("{}/departments/{}", BASE_URL, department["id"].as_str().unwrap()))
        .bearer_auth(&dean)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore]
async fn test_lab_incharge_ticket_lifecycle() {
    let client = Client::new();
    let dean = dean_token(&client).await;
    let admin = admin_token(&client, &dean).await;
    let (_, department_id) = active_hod(&client, &dean).await;

    let email = format!("{}@labdesk.test", unique("incharge"));
    let response = client
        .post(format!("{}/register", BASE_URL))
        .bearer_auth(&dean)
        .json(&json!({
            "name": "Incharge",
            "email": email,
            "password": PASSWORD,
            "role": "LAB_INCHARGE",
            "department_id": department_id,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let incharge = token_for(&client, &email, PASSWORD).await;

    let response = post(
        &client,
        &incharge,
        "/tickets",
        json!({
            "title": "Projector dead",
            "description": "No signal on HDMI",
            "issue_type": "HARDWARE",
            "department_id": department_id,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let ticket: Value = response.json().await.unwrap();
    assert_eq!(ticket["priority"], "NORMAL");
    assert!(ticket["ticket_number"].as_str().unwrap().starts_with("TKT-"));
    let path = format!("/tickets/{}", ticket["id"].as_str().unwrap());

    let response = patch(&client, &admin, &path, json!({ "status": "PROCESSING" })).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Too late to withdraw once an admin picked it up
    let response = patch(&client, &incharge, &path, json!({ "status": "CLOSED" })).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = patch(&client, &admin, &path, json!({ "status": "RESOLVED", "remarks": "Replaced lamp" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let resolved: Value = response.json().await.unwrap();
    assert!(resolved["resolved_at"].is_string());
    assert_eq!(resolved["remarks"], "Replaced lamp");

    let mine = get(&client, &incharge, "/tickets").await;
    assert!(mine.as_array().unwrap().iter().all(|t| t["created_by_name"] == "Incharge"));
}

#[tokio::test]
#[ignore]
async fn test_completing_lab_setup_finalizes_the_lab() {
    let client = Client::new();
    let dean = dean_token(&client).await;
    let admin = admin_token(&client, &dean).await;
    let (hod, department_id) = active_hod(&client, &dean).await;

    let title = unique("Robotics Lab");
    let path = approved_lab_setup(&client, &dean, &hod, &title).await;

    let code = unique("ROB");
    let response = patch(
        &client,
        &admin,
        &path,
        json!({
            "status": "COMPLETED",
            "lab_code": code,
            "lab_capacity": 24,
            "lab_location": "Block B, Room 204",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let labs = get(&client, &dean, &format!("/labs?department_id={}", department_id)).await;
    let lab = labs
        .as_array()
        .unwrap()
        .iter()
        .find(|l| l["name"] == title.as_str())
        .expect("lab provisioned on approval");
    assert_eq!(lab["code"], code.as_str());
    assert_eq!(lab["capacity"], 24);
    assert_eq!(lab["location"], "Block B, Room 204");
}

#[tokio::test]
#[ignore]
async fn test_requests_are_only_assigned_to_admins() {
    let client = Client::new();
    let dean = dean_token(&client).await;
    let admin = admin_token(&client, &dean).await;
    let (hod, _) = active_hod(&client, &dean).await;

    let path = approved_lab_setup(&client, &dean, &hod, &unique("Assignment Lab")).await;

    let hod_id = my_id(&client, &hod).await;
    let response = patch(&client, &admin, &path, json!({ "status": "ASSIGNED", "assigned_admin_id": hod_id })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let unchanged = get(&client, &dean, &path).await;
    assert_eq!(unchanged["status"], "APPROVED");
    assert!(unchanged["assigned_admin_id"].is_null());

    let admin_id = my_id(&client, &admin).await;
    let response =
        patch(&client, &admin, &path, json!({ "status": "ASSIGNED", "assigned_admin_id": admin_id })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let assigned: Value = response.json().await.unwrap();
    assert_eq!(assigned["assigned_admin_id"], admin_id.as_str());
}

#[tokio::test]
#[ignore]
async fn test_rejected_account_token_stops_working() {
    let client = Client::new();
    let dean = dean_token(&client).await;
    let (hod, _) = active_hod(&client, &dean).await;
    get(&client, &hod, "/requests").await;

    let hod_id = my_id(&client, &hod).await;
    let response = client
        .put(format!("{}/users/{}", BASE_URL, hod_id))
        .bearer_auth(&dean)
        .json(&json!({ "status": "REJECTED" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(format!("{}/requests", BASE_URL))
        .bearer_auth(&hod)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_withdrawn_ticket_is_not_resolved() {
    let client = Client::new();
    let dean = dean_token(&client).await;
    let (_, department_id) = active_hod(&client, &dean).await;

    let email = format!("{}@labdesk.test", unique("incharge"));
    let response = client
        .post(format!("{}/register", BASE_URL))
        .bearer_auth(&dean)
        .json(&json!({
            "name": "Incharge",
            "email": email,
            "password": PASSWORD,
            "role": "LAB_INCHARGE",
            "department_id": department_id,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let incharge = token_for(&client, &email, PASSWORD).await;

    let response = post(
        &client,
        &incharge,
        "/tickets",
        json!({
            "title": "Mouse missing",
            "description": "Found it in the drawer",
            "issue_type": "OTHER",
            "department_id": department_id,
        }),
    )
    .await;
    let ticket: Value = response.json().await.unwrap();
    let path = format!("/tickets/{}", ticket["id"].as_str().unwrap());

    let response = patch(&client, &incharge, &path, json!({ "status": "CLOSED" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let withdrawn: Value = response.json().await.unwrap();
    assert_eq!(withdrawn["status"], "CLOSED");
    assert!(withdrawn["resolved_at"].is_null());
}
