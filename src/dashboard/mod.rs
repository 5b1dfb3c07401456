//! Read-only analytics dashboard client and its wire shapes
//!
//! The `/api/advanced/*` endpoints are owned by the backend; this module
//! only models what the dashboard view renders.

use crate::chat::client::{decode_json, map_transport_error};
use crate::config::BackendConfig;
use crate::{BanklineError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightPriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendingTrend {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendingComparison {
    AboveAverage,
    BelowAverage,
    Average,
}

/// One card of `GET /advanced/financial-insights`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialInsight {
    pub category: String,
    pub insight: String,
    pub recommendation: String,
    #[serde(default)]
    pub impact: f64,
    pub priority: InsightPriority,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// One row of `GET /advanced/spending-patterns`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingPattern {
    pub category: String,
    pub amount: f64,
    pub percentage: f64,
    pub trend: SpendingTrend,
    pub comparison: SpendingComparison,
}

/// One entry of `GET /advanced/notifications/unread`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardNotification {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub read: bool,
}

/// Envelope of `GET /advanced/notifications/unread`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationBatch {
    #[serde(default)]
    pub notifications: Vec<DashboardNotification>,
    #[serde(default)]
    pub count: u64,
}

/// Everything the dashboard view needs, fetched in one refresh.
#[derive(Debug, Clone, Default)]
pub struct DashboardSnapshot {
    pub insights: Vec<FinancialInsight>,
    pub spending: Vec<SpendingPattern>,
    pub notifications: NotificationBatch,
}

/// Read-only client for the dashboard endpoints. Same fixed-timeout,
/// no-retry contract as the chat client.
pub struct DashboardClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl DashboardClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| BanklineError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.chat_timeout(),
        })
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| map_transport_error(e, self.timeout))?;

        decode_json(response, self.timeout).await
    }

    pub async fn financial_insights(&self) -> Result<Vec<FinancialInsight>> {
        self.get("/advanced/financial-insights").await
    }

    pub async fn spending_patterns(&self) -> Result<Vec<SpendingPattern>> {
        self.get("/advanced/spending-patterns").await
    }

    pub async fn unread_notifications(&self) -> Result<NotificationBatch> {
        self.get("/advanced/notifications/unread").await
    }

    /// Fetch all three dashboard reads concurrently.
    pub async fn snapshot(&self) -> Result<DashboardSnapshot> {
        let (insights, spending, notifications) = tokio::join!(
            self.financial_insights(),
            self.spending_patterns(),
            self.unread_notifications(),
        );

        Ok(DashboardSnapshot {
            insights: insights?,
            spending: spending?,
            notifications: notifications?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insight_deserializes_backend_json() {
        let json = r#"{
            "category": "spending",
            "insight": "Dining spend rose 23% this month.",
            "recommendation": "Consider setting a dining budget.",
            "impact": 195.50,
            "priority": "high",
            "timestamp": "2025-03-14T10:00:00"
        }"#;
        let insight: FinancialInsight = serde_json::from_str(json).unwrap();
        assert_eq!(insight.priority, InsightPriority::High);
    }

    #[test]
    fn spending_pattern_parses_snake_case_variants() {
        let json = r#"{
            "category": "dining",
            "amount": 850.50,
            "percentage": 25.3,
            "trend": "increasing",
            "comparison": "above_average"
        }"#;
        let pattern: SpendingPattern = serde_json::from_str(json).unwrap();
        assert_eq!(pattern.trend, SpendingTrend::Increasing);
        assert_eq!(pattern.comparison, SpendingComparison::AboveAverage);
    }

    #[test]
    fn notification_batch_defaults_when_fields_missing() {
        let batch: NotificationBatch = serde_json::from_str("{}").unwrap();
        assert!(batch.notifications.is_empty());
        assert_eq!(batch.count, 0);
    }
}
