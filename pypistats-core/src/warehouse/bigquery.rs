//! BigQuery REST executor with service-account authentication
//!
//! The constructor takes the service-account key as an in-memory blob,
//! signs an RS256 token request with it, and drops it on return. No
//! credential material is written to disk at any point.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{QueryExecutor, RawQueryResult};
use crate::error::{Error, Result};

const BIGQUERY_ENDPOINT: &str = "https://bigquery.googleapis.com/bigquery/v2";
const BIGQUERY_SCOPE: &str = "https://www.googleapis.com/auth/bigquery.readonly";
const TOKEN_LIFETIME_SECS: u64 = 3600;
/// Slack on top of the server-side timeout so the HTTP layer does not
/// give up before the warehouse reports an incomplete job.
const REQUEST_MARGIN_SECS: u64 = 10;

/// Service-account key material, parsed straight from the secret blob.
#[derive(Deserialize)]
struct ServiceAccountKey {
    project_id: String,
    private_key: String,
    client_email: String,
    token_uri: String,
}

#[derive(Serialize)]
struct TokenClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    query: &'a str,
    use_legacy_sql: bool,
    timeout_ms: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    #[serde(default)]
    job_complete: bool,
    schema: Option<TableSchema>,
    #[serde(default)]
    rows: Vec<TableRow>,
}

#[derive(Deserialize)]
struct TableSchema {
    fields: Vec<SchemaField>,
}

#[derive(Deserialize)]
struct SchemaField {
    name: String,
}

#[derive(Deserialize)]
struct TableRow {
    f: Vec<TableCell>,
}

#[derive(Deserialize)]
struct TableCell {
    v: Value,
}

/// Executor for the public PyPI download table on BigQuery.
#[derive(Debug)]
pub struct BigQueryExecutor {
    http: Client,
    project_id: String,
    access_token: String,
    base_url: String,
}

impl BigQueryExecutor {
    /// Exchange a service-account JSON blob for a ready-to-use executor.
    pub fn from_service_account(secret_json: &str) -> Result<Self> {
        let key: ServiceAccountKey = serde_json::from_str(secret_json)
            .map_err(|e| Error::Config(format!("invalid service-account key: {e}")))?;

        let http = Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {e}")))?;

        let access_token = request_token(&http, &key)?;
        tracing::debug!(project = %key.project_id, "warehouse client ready");

        Ok(Self {
            http,
            project_id: key.project_id,
            access_token,
            base_url: BIGQUERY_ENDPOINT.to_string(),
        })
    }
}

impl QueryExecutor for BigQueryExecutor {
    fn execute(&self, query: &str, timeout_secs: u64) -> Result<RawQueryResult> {
        let url = format!("{}/projects/{}/queries", self.base_url, self.project_id);
        let body = QueryRequest {
            query,
            use_legacy_sql: false,
            timeout_ms: timeout_secs * 1000,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .timeout(Duration::from_secs(
                timeout_secs.saturating_add(REQUEST_MARGIN_SECS),
            ))
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout { secs: timeout_secs }
                } else {
                    Error::Warehouse(format!("query request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(Error::Warehouse(format!("API error ({status}): {text}")));
        }

        let result: QueryResponse = response
            .json()
            .map_err(|e| Error::Warehouse(format!("failed to parse response: {e}")))?;
        if !result.job_complete {
            return Err(Error::Timeout { secs: timeout_secs });
        }

        Ok(flatten_response(result))
    }
}

/// Sign a JWT with the service-account key and trade it for an access token.
fn request_token(http: &Client, key: &ServiceAccountKey) -> Result<String> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let claims = TokenClaims {
        iss: &key.client_email,
        scope: BIGQUERY_SCOPE,
        aud: &key.token_uri,
        iat: now,
        exp: now + TOKEN_LIFETIME_SECS,
    };

    let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| Error::Config(format!("invalid service-account private key: {e}")))?;
    let assertion = encode(&Header::new(Algorithm::RS256), &claims, &signing_key)
        .map_err(|e| Error::Config(format!("failed to sign token request: {e}")))?;

    let response = http
        .post(&key.token_uri)
        .form(&[
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", assertion.as_str()),
        ])
        .send()
        .map_err(|e| Error::Warehouse(format!("token request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let text = response
            .text()
            .unwrap_or_else(|_| "unknown".to_string());
        return Err(Error::Warehouse(format!(
            "token endpoint returned {status}: {text}"
        )));
    }

    let token: TokenResponse = response
        .json()
        .map_err(|e| Error::Warehouse(format!("failed to parse token response: {e}")))?;
    Ok(token.access_token)
}

/// Flatten the nested `schema.fields` / `rows[].f[].v` response shape
/// into plain headers and cell rows.
fn flatten_response(result: QueryResponse) -> RawQueryResult {
    let headers = result
        .schema
        .map(|s| s.fields.into_iter().map(|f| f.name).collect())
        .unwrap_or_default();
    let rows = result
        .rows
        .into_iter()
        .map(|row| row.f.into_iter().map(|cell| cell.v).collect())
        .collect();
    RawQueryResult { headers, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_malformed_secret() {
        let err = BigQueryExecutor::from_service_account("{\"project_id\":").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_flatten_query_response() {
        let raw = json!({
            "jobComplete": true,
            "schema": {
                "fields": [
                    {"name": "download_date", "type": "STRING"},
                    {"name": "download_count", "type": "INTEGER"}
                ]
            },
            "rows": [
                {"f": [{"v": "2021-01-01"}, {"v": "17"}]},
                {"f": [{"v": "2021-01-02"}, {"v": null}]}
            ]
        });
        let response: QueryResponse = serde_json::from_value(raw).unwrap();
        assert!(response.job_complete);

        let result = flatten_response(response);
        assert_eq!(result.headers, vec!["download_date", "download_count"]);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0][1], json!("17"));
        assert_eq!(result.rows[1][1], json!(null));
    }

    #[test]
    fn test_incomplete_job_deserializes_without_rows() {
        let raw = json!({"jobComplete": false});
        let response: QueryResponse = serde_json::from_value(raw).unwrap();
        assert!(!response.job_complete);
        assert!(response.rows.is_empty());
    }
}
