//! Stock alert notifications
//!
//! After each recorded movement the alert check runs in the background and
//! emails the configured recipients about products at or below the low-stock
//! threshold and batches whose best-before date is inside the warning
//! window. Email delivery failures are logged, never surfaced to the
//! operator recording stock.

use chrono::{DateTime, Utc};
use lettre::{
    message::header::ContentType,
    transport::smtp::{authentication::Credentials, Error as SmtpError},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use sqlx::PgPool;

use crate::config::{AlertConfig, MailConfig};
use crate::error::AppResult;

/// SMTP mailer, present only when an SMTP host is configured
#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl Mailer {
    /// Build a mailer from configuration. Returns `Ok(None)` when no SMTP
    /// host is configured, which disables email alerts entirely.
    pub fn from_config(config: &MailConfig) -> Result<Option<Self>, SmtpError> {
        if config.smtp_host.is_empty() {
            return Ok(None);
        }

        let credentials = Credentials::new(config.username.clone(), config.password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Some(Self {
            transport,
            from_address: config.from_address.clone(),
        }))
    }

    async fn send(&self, to: &str, subject: &str, body: String) {
        let message = Message::builder()
            .from(match self.from_address.parse() {
                Ok(from) => from,
                Err(e) => {
                    tracing::warn!(error = %e, "invalid from address, alert email dropped");
                    return;
                }
            })
            .to(match to.parse() {
                Ok(to) => to,
                Err(e) => {
                    tracing::warn!(recipient = to, error = %e, "invalid recipient, alert email dropped");
                    return;
                }
            })
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body);

        match message {
            Ok(message) => {
                if let Err(e) = self.transport.send(message).await {
                    tracing::warn!(recipient = to, error = %e, "failed to send alert email");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to build alert email");
            }
        }
    }
}

/// A product at or below the low-stock threshold
#[derive(Debug, sqlx::FromRow)]
struct LowStockRow {
    name: String,
    quantity: i32,
}

/// A recorded batch whose best-before date is inside the warning window
#[derive(Debug, sqlx::FromRow)]
struct ExpiringRow {
    product_name: String,
    batch: String,
    best_before: DateTime<Utc>,
    quantity: i32,
}

/// Result of one alert check run
#[derive(Debug, serde::Serialize)]
pub struct AlertSummary {
    pub low_stock_count: usize,
    pub expiring_count: usize,
    pub emails_sent: bool,
}

#[derive(Clone)]
pub struct NotificationService {
    db: PgPool,
    mailer: Option<Mailer>,
    alerts: AlertConfig,
}

impl NotificationService {
    pub fn new(db: PgPool, mailer: Option<Mailer>, alerts: AlertConfig) -> Self {
        Self { db, mailer, alerts }
    }

    /// Run the alert check in the background so movement recording never
    /// waits on SMTP
    pub fn spawn_alert_check(&self) {
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.check_inventory_alerts().await {
                tracing::warn!(error = %e, "inventory alert check failed");
            }
        });
    }

    /// Check for low stock and expiring batches, emailing recipients when
    /// anything is found
    pub async fn check_inventory_alerts(&self) -> AppResult<AlertSummary> {
        let low_stock = sqlx::query_as::<_, LowStockRow>(
            r#"
            SELECT p.name, COALESCE(i.quantity, 0) AS quantity
            FROM products p
            LEFT JOIN inventory i ON i.product_id = p.id
            WHERE COALESCE(i.quantity, 0) <= $1
            ORDER BY quantity, p.name
            "#,
        )
        .bind(self.alerts.low_stock_threshold)
        .fetch_all(&self.db)
        .await?;

        // Only batches still on hand matter; exits and long-gone stock are
        // excluded by requiring a positive inventory level.
        let expiring = sqlx::query_as::<_, ExpiringRow>(
            r#"
            SELECT p.name AS product_name, m.batch, m.best_before, m.quantity
            FROM movements m
            JOIN products p ON p.id = m.product_id
            JOIN inventory i ON i.product_id = p.id
            WHERE m.movement_type = 'entry'
              AND i.quantity > 0
              AND m.best_before <= NOW() + make_interval(days => $1::int)
            ORDER BY m.best_before
            "#,
        )
        .bind(self.alerts.expiring_soon_days as i32)
        .fetch_all(&self.db)
        .await?;

        let summary = AlertSummary {
            low_stock_count: low_stock.len(),
            expiring_count: expiring.len(),
            emails_sent: false,
        };

        if low_stock.is_empty() && expiring.is_empty() {
            return Ok(summary);
        }

        tracing::info!(
            low_stock = summary.low_stock_count,
            expiring = summary.expiring_count,
            "inventory alerts found"
        );

        let Some(mailer) = &self.mailer else {
            return Ok(summary);
        };
        if self.alerts.recipients.is_empty() {
            return Ok(summary);
        }

        let body = Self::render_alert_body(&low_stock, &expiring);
        for recipient in &self.alerts.recipients {
            mailer
                .send(recipient, "Alerte stock - Condifri", body.clone())
                .await;
        }

        Ok(AlertSummary {
            emails_sent: true,
            ..summary
        })
    }

    fn render_alert_body(low_stock: &[LowStockRow], expiring: &[ExpiringRow]) -> String {
        let mut body = String::from("Alertes de stock\n================\n");

        if !low_stock.is_empty() {
            body.push_str("\nStock bas :\n");
            for row in low_stock {
                body.push_str(&format!("  - {} : {} unités\n", row.name, row.quantity));
            }
        }

        if !expiring.is_empty() {
            body.push_str("\nLots proches de la DLC :\n");
            for row in expiring {
                body.push_str(&format!(
                    "  - {} lot {} ({} unités) : DLC {}\n",
                    row.product_name,
                    row.batch,
                    row.quantity,
                    row.best_before.format("%d/%m/%Y")
                ));
            }
        }

        body
    }
}
