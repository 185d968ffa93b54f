//! HTTP client for the transaction stored procedures.
//!
//! Every procedure is a `POST <base>/<name>` with a JSON body and answers
//! `{"status": <int>, "jsresult": [...]}`.

use std::time::Duration;

use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::{SummaryData, Transaction};
use dashboard_core::periods::PeriodStrategy;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Successful-transactions procedure.
pub const TRANSACTIONS_PROCEDURE: &str = "admin_AllMerchants_getSuccessfulTransactions";

/// Maximum number of records requested per load.
pub const TRANSACTION_LIMIT: u32 = 10_000;

const MONTHLY_SUMMARY: &str = "admin_AllMerchants_monthlytxSummaryExtended_v2";
const QUARTERLY_SUMMARY: &str = "admin_AllMerchants_quarterlytxSummaryExtended_v2";
const WEEKLY_SUMMARY: &str = "admin_AllMerchants_weeklytxSummaryExtended_v2";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Summary procedures for `strategy`, in overlay order.
pub fn summary_procedures(strategy: PeriodStrategy) -> &'static [&'static str] {
    match strategy {
        PeriodStrategy::Monthly => &[MONTHLY_SUMMARY],
        PeriodStrategy::Quarterly => &[QUARTERLY_SUMMARY, MONTHLY_SUMMARY, WEEKLY_SUMMARY],
    }
}

/// Envelope shared by every procedure.
#[derive(Debug, Deserialize)]
struct ProcedureResponse {
    #[serde(default)]
    status: Value,
    #[serde(default)]
    jsresult: Value,
}

impl ProcedureResponse {
    fn is_ok(&self) -> bool {
        self.status.as_f64() == Some(1.0)
    }
}

/// What the transactions procedure answered.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionReply {
    /// `status == 1` with an array result.
    Records(Vec<Transaction>),
    /// A well-formed envelope that carries no usable records.
    Unusable(String),
}

// ── ProcedureClient ───────────────────────────────────────────────────────────

/// Async client bound to one procedure base URL.
#[derive(Debug, Clone)]
pub struct ProcedureClient {
    client: Client,
    base_url: String,
}

impl ProcedureClient {
    /// Fails with [`DashboardError::Config`] unless `base_url` is an
    /// absolute `http`/`https` URL.
    pub fn new(base_url: &str) -> Result<Self> {
        match reqwest::Url::parse(base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(DashboardError::Config(format!(
                    "invalid API base URL: {base_url:?}"
                )))
            }
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DashboardError::Http(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch up to `limit` successful transactions.
    ///
    /// Transport failures, non-2xx statuses and malformed bodies are errors;
    /// a parsed envelope without records is a [`TransactionReply::Unusable`].
    pub async fn fetch_transactions(&self, limit: u32) -> Result<TransactionReply> {
        let response = self
            .call(TRANSACTIONS_PROCEDURE, json!({ "p_limit": limit }))
            .await?;

        if !response.is_ok() {
            return Ok(TransactionReply::Unusable(format!(
                "status {}",
                response.status
            )));
        }
        match response.jsresult {
            Value::Array(rows) => {
                let total = rows.len();
                let records: Vec<Transaction> = rows
                    .into_iter()
                    .filter_map(|row| serde_json::from_value(row).ok())
                    .collect();
                if records.len() < total {
                    warn!(
                        "Skipped {} of {} transaction rows that were not objects",
                        total - records.len(),
                        total
                    );
                }
                Ok(TransactionReply::Records(records))
            }
            other => Ok(TransactionReply::Unusable(format!(
                "jsresult is not an array: {}",
                json_kind(&other)
            ))),
        }
    }

    /// Fetch one summary procedure and return its first row.
    ///
    /// A missing or non-object first row yields an empty summary.
    pub async fn fetch_summary(&self, procedure: &str) -> Result<SummaryData> {
        let response = self.call(procedure, json!({})).await?;
        let first = match response.jsresult {
            Value::Array(mut rows) if !rows.is_empty() => rows.swap_remove(0),
            _ => Value::Null,
        };
        Ok(match first {
            Value::Object(fields) => SummaryData::from_pairs(fields),
            _ => SummaryData::default(),
        })
    }

    async fn call(&self, procedure: &str, body: Value) -> Result<ProcedureResponse> {
        let url = format!("{}/{}", self.base_url, procedure);
        debug!(%url, "calling procedure");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::HttpStatus(status.as_u16()));
        }

        let text = response.text().await.map_err(map_request_error)?;
        let value: Value = serde_json::from_str(&text)?;
        if !value.is_object() {
            return Err(DashboardError::UnexpectedResponse(format!(
                "expected an object, got {}",
                json_kind(&value)
            )));
        }
        Ok(serde_json::from_value(value)?)
    }
}

fn map_request_error(error: reqwest::Error) -> DashboardError {
    if error.is_timeout() {
        DashboardError::Http(format!(
            "request timed out after {} seconds",
            REQUEST_TIMEOUT.as_secs()
        ))
    } else if error.is_connect() {
        DashboardError::Http("unable to connect to the transaction service".to_string())
    } else {
        DashboardError::Http(error.to_string())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_server::{MockProcedureServer, MockReply};

    #[test]
    fn test_summary_procedures_per_strategy() {
        assert_eq!(summary_procedures(PeriodStrategy::Monthly), &[MONTHLY_SUMMARY]);
        assert_eq!(
            summary_procedures(PeriodStrategy::Quarterly),
            &[QUARTERLY_SUMMARY, MONTHLY_SUMMARY, WEEKLY_SUMMARY]
        );
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = ProcedureClient::new("http://localhost:1234/procedure/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:1234/procedure");
    }

    #[test]
    fn test_new_rejects_invalid_base_url() {
        for bad in ["", "not a url", "ftp://example.com/procedure"] {
            let err = ProcedureClient::new(bad).unwrap_err();
            assert!(matches!(err, DashboardError::Config(_)), "{bad}: {err}");
        }
    }

    #[tokio::test]
    async fn test_fetch_transactions_records() {
        let server = MockProcedureServer::start(vec![(
            TRANSACTIONS_PROCEDURE,
            MockReply::ok(
                r#"{"status":1,"jsresult":[{"merchantid":"m1","amount":"7200","entrydt":"2025-01-15T10:30:00Z"}]}"#,
            ),
        )])
        .unwrap();
        let client = ProcedureClient::new(&server.base_url()).unwrap();

        let reply = client.fetch_transactions(TRANSACTION_LIMIT).await.unwrap();
        let TransactionReply::Records(records) = reply else {
            panic!("expected records, got {reply:?}");
        };
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].merchantid, "m1");
        assert_eq!(records[0].amount, 7200.0);

        let body = server.last_body(TRANSACTIONS_PROCEDURE).unwrap();
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body, json!({ "p_limit": 10000 }));
    }

    #[tokio::test]
    async fn test_fetch_transactions_oddly_typed_record_is_kept() {
        let server = MockProcedureServer::start(vec![(
            TRANSACTIONS_PROCEDURE,
            MockReply::ok(
                r#"{"status":1.0,"jsresult":[
                    {"merchantid":"m1","amount":"7200","entrydt":"2025-01-15T10:30:00Z"},
                    {"merchantid":"m2","txid":12345,"scheme":7,"status":"success","id":"x1","amount":300},
                    "not a record"
                ]}"#,
            ),
        )])
        .unwrap();
        let client = ProcedureClient::new(&server.base_url()).unwrap();

        let reply = client.fetch_transactions(10).await.unwrap();
        let TransactionReply::Records(records) = reply else {
            panic!("expected records, got {reply:?}");
        };
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].txid.as_deref(), Some("12345"));
        assert_eq!(records[1].scheme.as_deref(), Some("7"));
        assert_eq!(records[1].status, 0);
        assert_eq!(records[1].id, 0);
        assert_eq!(records[1].amount, 300.0);
    }

    #[tokio::test]
    async fn test_fetch_transactions_bad_status_is_unusable() {
        let server = MockProcedureServer::start(vec![(
            TRANSACTIONS_PROCEDURE,
            MockReply::ok(r#"{"status":0,"jsresult":[]}"#),
        )])
        .unwrap();
        let client = ProcedureClient::new(&server.base_url()).unwrap();

        let reply = client.fetch_transactions(10).await.unwrap();
        assert!(matches!(reply, TransactionReply::Unusable(_)));
    }

    #[tokio::test]
    async fn test_fetch_transactions_non_array_is_unusable() {
        let server = MockProcedureServer::start(vec![(
            TRANSACTIONS_PROCEDURE,
            MockReply::ok(r#"{"status":1,"jsresult":{"rows":[]}}"#),
        )])
        .unwrap();
        let client = ProcedureClient::new(&server.base_url()).unwrap();

        let reply = client.fetch_transactions(10).await.unwrap();
        assert_eq!(
            reply,
            TransactionReply::Unusable("jsresult is not an array: object".to_string())
        );
    }

    #[tokio::test]
    async fn test_fetch_transactions_http_error() {
        let server = MockProcedureServer::start(vec![(
            TRANSACTIONS_PROCEDURE,
            MockReply::status(500, "Internal Server Error", "{}"),
        )])
        .unwrap();
        let client = ProcedureClient::new(&server.base_url()).unwrap();

        let err = client.fetch_transactions(10).await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP error! status: 500");
    }

    #[tokio::test]
    async fn test_fetch_transactions_malformed_body() {
        let server = MockProcedureServer::start(vec![(
            TRANSACTIONS_PROCEDURE,
            MockReply::ok("<html>gateway</html>"),
        )])
        .unwrap();
        let client = ProcedureClient::new(&server.base_url()).unwrap();

        let err = client.fetch_transactions(10).await.unwrap_err();
        assert!(matches!(err, DashboardError::JsonParse(_)));
    }

    #[tokio::test]
    async fn test_fetch_transactions_non_object_envelope() {
        let server = MockProcedureServer::start(vec![(
            TRANSACTIONS_PROCEDURE,
            MockReply::ok("[1, 2, 3]"),
        )])
        .unwrap();
        let client = ProcedureClient::new(&server.base_url()).unwrap();

        let err = client.fetch_transactions(10).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected API response: expected an object, got array"
        );
    }

    #[tokio::test]
    async fn test_fetch_summary_first_row() {
        let server = MockProcedureServer::start(vec![(
            MONTHLY_SUMMARY,
            MockReply::ok(
                r#"{"status":1,"jsresult":[{"this_month_transactions":"12","pct_change_amount":"5.00"},{"ignored":1}]}"#,
            ),
        )])
        .unwrap();
        let client = ProcedureClient::new(&server.base_url()).unwrap();

        let summary = client.fetch_summary(MONTHLY_SUMMARY).await.unwrap();
        assert_eq!(summary.number("this_month_transactions"), Some(12.0));
        assert_eq!(summary.text("pct_change_amount").as_deref(), Some("5.00"));
        assert!(summary.get("ignored").is_none());
    }

    #[tokio::test]
    async fn test_fetch_summary_missing_result_is_empty() {
        let server = MockProcedureServer::start(vec![(
            MONTHLY_SUMMARY,
            MockReply::ok(r#"{"status":1}"#),
        )])
        .unwrap();
        let client = ProcedureClient::new(&server.base_url()).unwrap();

        let summary = client.fetch_summary(MONTHLY_SUMMARY).await.unwrap();
        assert!(summary.is_empty());
    }

    #[tokio::test]
    async fn test_connection_refused_is_http_error() {
        // Bind then drop to get a port nothing listens on.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = ProcedureClient::new(&format!("http://127.0.0.1:{port}")).unwrap();

        let err = client.fetch_transactions(10).await.unwrap_err();
        assert!(matches!(err, DashboardError::Http(_)));
    }
}
