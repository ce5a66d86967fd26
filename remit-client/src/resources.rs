//! Typed handles for the dashboard's REST resources
//!
//! Payloads stay `serde_json::Value`; only the endpoint layout is modeled here.

use crate::client::{ApiClient, RequestOptions};
use crate::error::ApiResult;
use remit_core::{validation_error, RemitError};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Collection endpoint with the usual CRUD verbs
#[derive(Clone, Copy)]
pub struct Resource<'a> {
    client: &'a ApiClient,
    path: &'static str,
}

impl<'a> Resource<'a> {
    pub fn path(&self) -> &'static str {
        self.path
    }

    pub async fn list(&self) -> ApiResult<Option<Value>> {
        self.client.get(self.path, RequestOptions::new()).await
    }

    pub async fn create(&self, data: &Value) -> ApiResult<Option<Value>> {
        self.client.post(self.path, data, RequestOptions::new()).await
    }

    pub async fn update(&self, id: &str, data: &Value) -> ApiResult<Option<Value>> {
        self.client
            .put(&self.item(id), data, RequestOptions::new())
            .await
    }

    pub async fn delete(&self, id: &str) -> ApiResult<Option<Value>> {
        self.client
            .delete(&self.item(id), RequestOptions::new())
            .await
    }

    /// GET a sub-path such as `profile` or `42/history`
    pub async fn fetch(&self, suffix: &str) -> ApiResult<Option<Value>> {
        self.client
            .get(&self.item(suffix), RequestOptions::new())
            .await
    }

    fn item(&self, suffix: &str) -> String {
        format!("{}/{}", self.path, suffix.trim_matches('/'))
    }
}

impl ApiClient {
    pub fn users(&self) -> Resource<'_> {
        Resource {
            client: self,
            path: "users",
        }
    }

    pub fn transactions(&self) -> Resource<'_> {
        Resource {
            client: self,
            path: "transactions",
        }
    }

    pub fn exchange_rates(&self) -> Resource<'_> {
        Resource {
            client: self,
            path: "exchange-rates",
        }
    }

    /// All transactions of one user
    pub async fn transaction_history(&self, user_id: &str) -> ApiResult<Option<Value>> {
        self.transactions().fetch(&format!("user/{}", user_id)).await
    }

    /// Past values of one exchange rate
    pub async fn exchange_rate_history(&self, rate_id: &str) -> ApiResult<Option<Value>> {
        self.exchange_rates()
            .fetch(&format!("{}/history", rate_id))
            .await
    }

    pub async fn report(&self, report: Report) -> ApiResult<Option<Value>> {
        self.get(report.path(), RequestOptions::new()).await
    }
}

/// Aggregated views served under `reports/`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    Dashboard,
    ActiveUsers,
    TopSenders,
    Statistics,
}

impl Report {
    pub const ALL: [Report; 4] = [
        Report::Dashboard,
        Report::ActiveUsers,
        Report::TopSenders,
        Report::Statistics,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Report::Dashboard => "dashboard",
            Report::ActiveUsers => "active-users",
            Report::TopSenders => "top-senders",
            Report::Statistics => "statistics",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Report::Dashboard => "reports/dashboard",
            Report::ActiveUsers => "reports/active-users",
            Report::TopSenders => "reports/top-senders",
            Report::Statistics => "reports/statistics",
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Report {
    type Err = RemitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Report::ALL
            .into_iter()
            .find(|report| report.name() == s)
            .ok_or_else(|| {
                validation_error!(
                    format!(
                        "unknown report '{}', expected one of: dashboard, active-users, top-senders, statistics",
                        s
                    ),
                    "report",
                    "reports"
                )
            })
    }
}
