// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};

use arbitrage_server::build_router;
use arbitrage_server::config::ServerConfig;

const SCENARIO_CSV: &str = "Time,Price\n\
                            2024/01/15 08:00,20.0\n\
                            2024/01/15 12:00,5.0\n\
                            2024/01/15 18:00,45.0\n";

const TWO_DAY_CSV: &str = "Time,Price\n\
                           2024/01/15 06:00,15\n\
                           2024/01/15 12:00,25\n\
                           2024/01/16 06:00,30\n\
                           2024/01/16 12:00,20\n";

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

struct TestServer {
    port: u16,
    client: reqwest::Client,
}

impl TestServer {
    async fn start() -> Self {
        Self::start_with(ServerConfig::default()).await
    }

    async fn start_with(mut config: ServerConfig) -> Self {
        config.server.bind_address = "127.0.0.1".to_owned();
        config.server.port = 0;
        let app = build_router(Arc::new(config));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let port = listener.local_addr().expect("No local addr").port();

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server error");
        });

        Self {
            port,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{path}", self.port)
    }

    async fn upload(&self, form: Form) -> (reqwest::StatusCode, Value) {
        let response = self
            .client
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send upload request");
        let status = response.status();
        let body = response.json().await.expect("Response is not JSON");
        (status, body)
    }
}

fn file_form(file_name: &str, content: &str) -> Form {
    Form::new().part(
        "file",
        Part::bytes(content.as_bytes().to_vec()).file_name(file_name.to_owned()),
    )
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_single_pair_scenario() {
    let server = TestServer::start().await;
    let form = file_form("prices.csv", SCENARIO_CSV).text("strategy", "one_charge_one_discharge");
    let (status, body) = server.upload(form).await;

    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["strategy"], "one_charge_one_discharge");
    assert_eq!(body["total_days"], 1);
    assert_eq!(body["total_profit"], json!(40.0));

    let day = &body["daily_profits"][0];
    assert_eq!(day["date"], "2024-01-15");
    assert_eq!(day["charge_start"], "12:00");
    assert_eq!(day["charge_price"], json!(5.0));
    assert_eq!(day["discharge_start"], "18:00");
    assert_eq!(day["discharge_price"], json!(45.0));
    assert_eq!(day["profit"], json!(40.0));
    assert_eq!(day["feasible"], true);
}

#[tokio::test]
async fn upload_without_strategy_uses_default() {
    let server = TestServer::start().await;
    let (status, body) = server.upload(file_form("prices.csv", SCENARIO_CSV)).await;

    assert_eq!(status, 200);
    assert_eq!(body["strategy"], "one_charge_one_discharge");
}

#[tokio::test]
async fn upload_two_days_chart_data() {
    let server = TestServer::start().await;
    let form = file_form("prices.csv", TWO_DAY_CSV).text("strategy", "two_charge_two_discharge");
    let (status, body) = server.upload(form).await;

    assert_eq!(status, 200);
    assert_eq!(body["total_profit"], json!(10.0));

    let chart = &body["chart_data"];
    assert_eq!(chart["dates"], json!(["2024-01-15", "2024-01-16"]));
    assert_eq!(chart["daily_profits"], json!([10.0, 0.0]));
    assert_eq!(chart["cumulative_profits"], json!([10.0, 10.0]));
    assert_eq!(chart["price_diffs"], json!([10.0, 0.0]));

    let second = &body["daily_profits"][1];
    assert_eq!(second["feasible"], false);
    assert!(second["charge_start"].is_null());
}

#[tokio::test]
async fn upload_unknown_strategy_is_rejected() {
    let server = TestServer::start().await;
    let form = file_form("prices.csv", "").text("strategy", "unknown");
    let (status, body) = server.upload(form).await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "unknown strategy 'unknown'");
}

#[tokio::test]
async fn upload_unknown_strategy_without_file_is_rejected() {
    let server = TestServer::start().await;
    let (status, body) = server
        .upload(Form::new().text("strategy", "unknown"))
        .await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "unknown strategy 'unknown'");
}

#[tokio::test]
async fn upload_missing_file() {
    let server = TestServer::start().await;
    let (status, body) = server
        .upload(Form::new().text("strategy", "one_charge_one_discharge"))
        .await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "no file was uploaded");
}

#[tokio::test]
async fn upload_empty_file() {
    let server = TestServer::start().await;
    let (status, body) = server.upload(file_form("prices.csv", "Time,Price\n")).await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "input contains no price rows");
}

#[tokio::test]
async fn upload_unsupported_file_type() {
    let server = TestServer::start().await;
    let (status, body) = server.upload(file_form("prices.json", "{}")).await;

    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("unsupported file type"));
}

#[tokio::test]
async fn upload_malformed_row_reports_row_number() {
    let server = TestServer::start().await;
    let csv = "Time,Price\n2024/01/15 08:00,20\n2024/01/15 09:00,oops\n";
    let (status, body) = server.upload(file_form("prices.csv", csv)).await;

    assert_eq!(status, 400);
    assert_eq!(
        body["error"],
        "malformed input at row 3: invalid price 'oops'"
    );
}

#[tokio::test]
async fn upload_extreme_price_is_bad_request() {
    let server = TestServer::start().await;
    let csv = "Time,Price\n\
               2024/01/15 08:00,-70000000000000000000000000000\n\
               2024/01/15 12:00,70000000000000000000000000000\n";
    let form = file_form("prices.csv", csv).text("strategy", "two_charge_two_discharge");
    let (status, body) = server.upload(form).await;

    assert_eq!(status, 400);
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("malformed input at row 2"), "{error}");
}

#[tokio::test]
async fn upload_dst_fall_back_day() {
    let mut config = ServerConfig::default();
    config.pipeline.loader.timezone = "Europe/Prague".to_owned();
    let server = TestServer::start_with(config).await;

    let csv = "Time,Price\n\
               2024-10-26T23:00:00Z,20\n\
               2024-10-27T00:00:00Z,10\n\
               2024-10-27T01:00:00Z,40\n\
               2024-10-27T02:00:00Z,30\n";
    let (status, body) = server.upload(file_form("prices.csv", csv)).await;

    assert_eq!(status, 200);
    assert_eq!(body["total_days"], 1);
    let day = &body["daily_profits"][0];
    assert_eq!(day["date"], "2024-10-27");
    assert_eq!(day["charge_start"], "02:00");
    assert_eq!(day["discharge_start"], "02:00");
    assert_eq!(day["profit"], json!(30.0));
}

#[tokio::test]
async fn upload_too_large() {
    let mut config = ServerConfig::default();
    config.pipeline.limits.max_upload_bytes = 64;
    let server = TestServer::start_with(config).await;

    let (status, body) = server.upload(file_form("prices.csv", TWO_DAY_CSV)).await;
    assert_eq!(status, 413);
    assert!(body["error"].as_str().unwrap().starts_with("input too large"));
}

// ---------------------------------------------------------------------------
// Metadata routes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_returns_ok() {
    let server = TestServer::start().await;
    let response = server
        .client
        .get(server.url("/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn strategies_lists_every_identifier() {
    let server = TestServer::start().await;
    let body: Value = server
        .client
        .get(server.url("/strategies"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["one_charge_one_discharge", "two_charge_two_discharge"]);
    assert_eq!(body[0]["default"], true);
}

#[tokio::test]
async fn static_dir_serves_index() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>arbitrage</h1>").unwrap();

    let mut config = ServerConfig::default();
    config.server.static_dir = Some(dir.path().to_path_buf());
    let server = TestServer::start_with(config).await;

    let response = server.client.get(server.url("/")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "<h1>arbitrage</h1>");
}
