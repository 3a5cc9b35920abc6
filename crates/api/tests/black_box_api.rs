use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::json;

use corebank_infra::InMemoryBankStore;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory store, ephemeral port.
        let app = corebank_api::app::build_app(Arc::new(InMemoryBankStore::new()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{addr}");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn valid_customer(email: &str, mobile: &str) -> serde_json::Value {
    json!({
        "name": "Asha Rao",
        "email": email,
        "mobile": mobile,
        "pin": "1234",
        "type": "Savings",
    })
}

async fn create_customer(
    client: &reqwest::Client,
    base_url: &str,
    email: &str,
    mobile: &str,
) -> String {
    let res = client
        .post(format!("{base_url}/api/customers"))
        .json(&valid_customer(email, mobile))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    body["account_no"].as_str().unwrap().to_string()
}

async fn deposit(
    client: &reqwest::Client,
    base_url: &str,
    account_no: &str,
    amount: serde_json::Value,
) -> reqwest::Response {
    client
        .post(format!("{base_url}/api/customers/{account_no}/deposit"))
        .json(&json!({ "amount": amount }))
        .send()
        .await
        .unwrap()
}

async fn balance_of(client: &reqwest::Client, base_url: &str, account_no: &str) -> f64 {
    let res = client
        .get(format!("{base_url}/api/customers/{account_no}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    body["balance"].as_f64().unwrap()
}

#[tokio::test]
async fn health_endpoint_responds() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_customer_allocates_unique_account_numbers() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let first = create_customer(&client, &srv.base_url, "a@gmail.com", "9876543210").await;
    let second = create_customer(&client, &srv.base_url, "b@gmail.com", "9876543211").await;

    assert_ne!(first, second);
    for account_no in [&first, &second] {
        assert_eq!(account_no.len(), 12);
        assert!(account_no.bytes().all(|b| b.is_ascii_digit()));
        assert_eq!(balance_of(&client, &srv.base_url, account_no).await, 0.0);
    }
}

#[tokio::test]
async fn customer_profile_has_the_documented_shape() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Email is normalized to lowercase on the way in.
    let res = client
        .post(format!("{}/api/customers", srv.base_url))
        .json(&json!({
            "name": "Asha Rao",
            "email": "  Asha@Gmail.COM ",
            "mobile": "9876543210",
            "pin": "1234",
            "type": "Current",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: serde_json::Value = res.json().await.unwrap();
    let account_no = created["account_no"].as_str().unwrap();

    let res = client
        .get(format!("{}/api/customers/{account_no}", srv.base_url))
        .send()
        .await
        .unwrap();
    let profile: serde_json::Value = res.json().await.unwrap();
    assert_eq!(profile["account_no"].as_str(), Some(account_no));
    assert_eq!(profile["name"], "Asha Rao");
    assert_eq!(profile["email"], "asha@gmail.com");
    assert_eq!(profile["mobile"], "9876543210");
    assert_eq!(profile["type"], "Current");
    assert_eq!(profile["balance"], 0.0);
    assert!(profile.get("created_at").is_none());

    // The listing shape carries created_at.
    let res = client
        .get(format!("{}/api/customers", srv.base_url))
        .send()
        .await
        .unwrap();
    let listed: serde_json::Value = res.json().await.unwrap();
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].get("created_at").is_some());
}

#[tokio::test]
async fn create_customer_rejects_each_invalid_field_without_persisting() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let cases: Vec<(&str, serde_json::Value)> = vec![
        ("empty name", json!({"name": " ", "email": "a@gmail.com", "mobile": "9876543210", "pin": "1234", "type": "Savings"})),
        ("missing email", json!({"name": "A", "mobile": "9876543210", "pin": "1234", "type": "Savings"})),
        ("wrong email domain", json!({"name": "A", "email": "a@example.com", "mobile": "9876543210", "pin": "1234", "type": "Savings"})),
        ("short mobile", json!({"name": "A", "email": "a@gmail.com", "mobile": "987654321", "pin": "1234", "type": "Savings"})),
        ("bad mobile prefix", json!({"name": "A", "email": "a@gmail.com", "mobile": "1876543210", "pin": "1234", "type": "Savings"})),
        ("non-numeric mobile", json!({"name": "A", "email": "a@gmail.com", "mobile": "98765x3210", "pin": "1234", "type": "Savings"})),
        ("short pin", json!({"name": "A", "email": "a@gmail.com", "mobile": "9876543210", "pin": "12", "type": "Savings"})),
        ("unknown type", json!({"name": "A", "email": "a@gmail.com", "mobile": "9876543210", "pin": "1234", "type": "Checking"})),
    ];

    for (label, body) in cases {
        let res = client
            .post(format!("{}/api/customers", srv.base_url))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "case: {label}");
        let err: serde_json::Value = res.json().await.unwrap();
        assert_eq!(err["error"], "validation_error", "case: {label}");
    }

    // Nothing was written.
    let res = client
        .get(format!("{}/api/customers", srv.base_url))
        .send()
        .await
        .unwrap();
    let listed: serde_json::Value = res.json().await.unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn create_customer_rejects_duplicate_email_or_mobile() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    create_customer(&client, &srv.base_url, "a@gmail.com", "9876543210").await;

    for body in [
        valid_customer("a@gmail.com", "9876543299"),
        valid_customer("fresh@gmail.com", "9876543210"),
    ] {
        let res = client
            .post(format!("{}/api/customers", srv.base_url))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let err: serde_json::Value = res.json().await.unwrap();
        assert_eq!(err["error"], "conflict");
    }
}

#[tokio::test]
async fn deposit_withdraw_lifecycle() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let account = create_customer(&client, &srv.base_url, "a@gmail.com", "9876543210").await;

    let res = deposit(&client, &srv.base_url, &account, json!(100.50)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["balance"], 100.5);

    let res = client
        .post(format!(
            "{}/api/customers/{account}/withdraw",
            srv.base_url
        ))
        .json(&json!({ "amount": "50.25" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["balance"], 50.25);

    // Overdraw fails and leaves the balance alone.
    let res = client
        .post(format!(
            "{}/api/customers/{account}/withdraw",
            srv.base_url
        ))
        .json(&json!({ "amount": 1000 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: serde_json::Value = res.json().await.unwrap();
    assert_eq!(err["error"], "insufficient_funds");

    assert_eq!(balance_of(&client, &srv.base_url, &account).await, 50.25);
}

#[tokio::test]
async fn deposit_rejects_bad_amounts_and_unknown_accounts() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let account = create_customer(&client, &srv.base_url, "a@gmail.com", "9876543210").await;

    for bad in [json!("abc"), json!(-5), json!(0), json!("1.005"), json!(null)] {
        let res = deposit(&client, &srv.base_url, &account, bad.clone()).await;
        assert_eq!(
            res.status(),
            StatusCode::BAD_REQUEST,
            "amount {bad} should be rejected"
        );
        let err: serde_json::Value = res.json().await.unwrap();
        assert_eq!(err["error"], "invalid_amount");
    }
    assert_eq!(balance_of(&client, &srv.base_url, &account).await, 0.0);

    // Unknown and malformed account numbers both read as missing.
    for missing in ["999999999999", "not-an-account"] {
        let res = deposit(&client, &srv.base_url, missing, json!(10)).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn transfer_moves_funds_and_logs_one_transaction() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let from = create_customer(&client, &srv.base_url, "a@gmail.com", "9876543210").await;
    let to = create_customer(&client, &srv.base_url, "b@gmail.com", "9876543211").await;
    deposit(&client, &srv.base_url, &from, json!(100)).await;

    let res = client
        .post(format!("{}/api/transfer", srv.base_url))
        .json(&json!({ "from": from, "to": to, "amount": 40 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Transferred");
    assert_eq!(body["from_balance"], 60.0);
    assert_eq!(body["to_balance"], 40.0);

    assert_eq!(balance_of(&client, &srv.base_url, &from).await, 60.0);
    assert_eq!(balance_of(&client, &srv.base_url, &to).await, 40.0);

    let res = client
        .get(format!("{}/api/transactions", srv.base_url))
        .send()
        .await
        .unwrap();
    let txns: serde_json::Value = res.json().await.unwrap();
    let transfers: Vec<_> = txns
        .as_array()
        .unwrap()
        .iter()
        .filter(|t| t["type"] == "transfer")
        .collect();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0]["details"], format!("From {from} to {to}"));
}

#[tokio::test]
async fn transfer_rejects_bad_pairs_and_missing_accounts() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let account = create_customer(&client, &srv.base_url, "a@gmail.com", "9876543210").await;
    deposit(&client, &srv.base_url, &account, json!(100)).await;

    // Identical or missing sides never reach a lookup.
    for body in [
        json!({ "from": account, "to": account, "amount": 10 }),
        json!({ "from": "", "to": account, "amount": 10 }),
        json!({ "to": account, "amount": 10 }),
    ] {
        let res = client
            .post(format!("{}/api/transfer", srv.base_url))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let err: serde_json::Value = res.json().await.unwrap();
        assert_eq!(err["error"], "invalid_request");
    }

    // A well-formed pair with an unknown side is undifferentiated.
    let res = client
        .post(format!("{}/api/transfer", srv.base_url))
        .json(&json!({ "from": account, "to": "999999999999", "amount": 10 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let err: serde_json::Value = res.json().await.unwrap();
    assert_eq!(err["message"], "one or both accounts not found");

    assert_eq!(balance_of(&client, &srv.base_url, &account).await, 100.0);
}

#[tokio::test]
async fn transfer_rejects_insufficient_funds() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let from = create_customer(&client, &srv.base_url, "a@gmail.com", "9876543210").await;
    let to = create_customer(&client, &srv.base_url, "b@gmail.com", "9876543211").await;
    deposit(&client, &srv.base_url, &from, json!(5)).await;

    let res = client
        .post(format!("{}/api/transfer", srv.base_url))
        .json(&json!({ "from": from, "to": to, "amount": 10 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: serde_json::Value = res.json().await.unwrap();
    assert_eq!(err["error"], "insufficient_funds");

    assert_eq!(balance_of(&client, &srv.base_url, &from).await, 5.0);
    assert_eq!(balance_of(&client, &srv.base_url, &to).await, 0.0);
}

#[tokio::test]
async fn transactions_listing_returns_most_recent_first() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let account = create_customer(&client, &srv.base_url, "a@gmail.com", "9876543210").await;

    for amount in [1, 2, 3, 4, 5] {
        let res = deposit(&client, &srv.base_url, &account, json!(amount)).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = client
        .get(format!("{}/api/transactions?limit=2", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let txns: serde_json::Value = res.json().await.unwrap();
    let txns = txns.as_array().unwrap();
    assert_eq!(txns.len(), 2);
    assert_eq!(txns[0]["amount"], 5.0);
    assert_eq!(txns[1]["amount"], 4.0);
    for t in txns {
        assert_eq!(t["type"], "deposit");
        assert!(t["txn_id"].as_str().is_some());
        assert!(t["timestamp"].as_str().is_some());
    }
}

#[tokio::test]
async fn delete_customer_keeps_the_transaction_log() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let account = create_customer(&client, &srv.base_url, "a@gmail.com", "9876543210").await;
    deposit(&client, &srv.base_url, &account, json!(25)).await;

    let res = client
        .delete(format!("{}/api/customers/{account}", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Deleted");

    let res = client
        .get(format!("{}/api/customers/{account}", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .delete(format!("{}/api/customers/{account}", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // History survives the customer.
    let res = client
        .get(format!("{}/api/transactions", srv.base_url))
        .send()
        .await
        .unwrap();
    let txns: serde_json::Value = res.json().await.unwrap();
    assert_eq!(txns.as_array().unwrap().len(), 1);
}
