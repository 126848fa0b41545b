// src/services/notification.rs

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use serde::Serialize;

use crate::{config::MailConfig, models::submission::Submission, utils::html::escape_text};

/// What happened to a result notification. Never an error for the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NotificationOutcome {
    /// `SMTP_ENABLED` is not `true`.
    Disabled,
    /// Enabled, but required relay settings are absent.
    Misconfigured { missing: Vec<&'static str> },
    Sent { recipient: String, response: String },
    Failed { error: String },
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Mail relay is not configured")]
    NotConfigured,

    #[error("Invalid email address {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP relay error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Delivers a finished message and returns the relay's reply.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: Message) -> Result<String, MailError>;
}

/// SMTP delivery through the configured relay.
pub struct SmtpRelay {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpRelay {
    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        let (Some(host), Some(port), Some(user), Some(password)) =
            (&config.host, config.port, &config.user, &config.password)
        else {
            return Err(MailError::NotConfigured);
        };

        let builder = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
        };

        let transport = builder
            .port(port)
            .credentials(Credentials::new(user.clone(), password.clone()))
            .build();

        Ok(Self { transport })
    }
}

#[async_trait]
impl MailTransport for SmtpRelay {
    async fn send(&self, message: Message) -> Result<String, MailError> {
        let response = self.transport.send(message).await?;
        Ok(response.code().to_string())
    }
}

/// Sends result emails after a submission has been committed.
///
/// Cheap to clone; the relay connection pool is shared between clones.
#[derive(Clone)]
pub struct Notifier {
    config: MailConfig,
    transport: Option<Arc<dyn MailTransport>>,
}

impl Notifier {
    pub fn new(config: MailConfig) -> Self {
        let transport = if config.enabled && config.missing_fields().is_empty() {
            match SmtpRelay::from_config(&config) {
                Ok(relay) => Some(Arc::new(relay) as Arc<dyn MailTransport>),
                Err(e) => {
                    tracing::warn!("Mail relay could not be set up: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self { config, transport }
    }

    pub fn with_transport(config: MailConfig, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            config,
            transport: Some(transport),
        }
    }

    /// Emails the participant a summary of their result.
    ///
    /// Gated on configuration; every failure is logged and returned as
    /// `NotificationOutcome::Failed`.
    pub async fn notify(&self, submission: &Submission, result_id: i64) -> NotificationOutcome {
        if !self.config.enabled {
            tracing::info!(result_id, "Email sending is disabled (SMTP_ENABLED != true)");
            return NotificationOutcome::Disabled;
        }

        let missing = self.config.missing_fields();
        if !missing.is_empty() {
            tracing::error!(
                result_id,
                "Missing required email environment variables: {}",
                missing.join(", ")
            );
            return NotificationOutcome::Misconfigured { missing };
        }

        match self.deliver(submission).await {
            Ok(response) => {
                tracing::info!(
                    result_id,
                    recipient = %submission.email,
                    response = %response,
                    "Result email sent"
                );
                NotificationOutcome::Sent {
                    recipient: submission.email.clone(),
                    response,
                }
            }
            Err(e) => {
                tracing::error!(result_id, "Error sending result email: {}", e);
                NotificationOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    async fn deliver(&self, submission: &Submission) -> Result<String, MailError> {
        let message = build_message(&self.config, submission)?;

        match &self.transport {
            Some(transport) => transport.send(message).await,
            None => SmtpRelay::from_config(&self.config)?.send(message).await,
        }
    }
}

fn parse_address(address: &str) -> Result<lettre::Address, MailError> {
    address.parse().map_err(|source| MailError::Address {
        address: address.to_string(),
        source,
    })
}

fn build_message(config: &MailConfig, submission: &Submission) -> Result<Message, MailError> {
    let from_email = config.from_email.as_deref().ok_or(MailError::NotConfigured)?;
    let from = Mailbox::new(Some(config.from_name.clone()), parse_address(from_email)?);
    let to = Mailbox::new(None, parse_address(&submission.email)?);

    let mut builder = Message::builder()
        .from(from)
        .to(to)
        .subject(subject_line(submission))
        .header(ContentType::TEXT_HTML);

    if let Some(bcc) = &config.bcc_email {
        builder = builder.bcc(Mailbox::new(None, parse_address(bcc)?));
    }

    Ok(builder.body(render_result_email(submission))?)
}

pub fn subject_line(submission: &Submission) -> String {
    format!(
        "Quiz {} - Score: {}% ({})",
        submission.quiz_title, submission.score.percentage, submission.score.grade
    )
}

/// Background color of the score banner.
pub fn score_color(percentage: f64) -> &'static str {
    if percentage >= 70.0 {
        "#10b981"
    } else if percentage >= 50.0 {
        "#f59e0b"
    } else {
        "#ef4444"
    }
}

/// `125` -> `2m 5s`.
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{}m {}s", seconds / 60, seconds % 60)
}

/// French `dd/mm/YYYY HH:MM` in UTC; unparseable input is shown as sent.
pub fn format_completed_at(completed_at: &str) -> String {
    match DateTime::parse_from_rfc3339(completed_at) {
        Ok(date) => date.with_timezone(&Utc).format("%d/%m/%Y %H:%M").to_string(),
        Err(_) => completed_at.to_string(),
    }
}

fn answer_rows(submission: &Submission) -> String {
    submission
        .answers
        .iter()
        .enumerate()
        .map(|(index, answer)| {
            let badge = if answer.is_correct {
                r#"<span style="display: inline-block; background-color: #dcfce7; color: #16a34a; padding: 4px 12px; border-radius: 9999px; font-weight: 600; font-size: 14px;">✓ Correct</span>"#
            } else {
                r#"<span style="display: inline-block; background-color: #fee2e2; color: #dc2626; padding: 4px 12px; border-radius: 9999px; font-weight: 600; font-size: 14px;">✗ Incorrect</span>"#
            };

            format!(
                r#"
        <tr style="border-bottom: 1px solid #e5e7eb;">
          <td style="padding: 12px; text-align: center; font-weight: 600; color: #6b7280;">{position}</td>
          <td style="padding: 12px;">
            <div style="font-weight: 600; color: #1f2937; margin-bottom: 4px;">{question}</div>
            <div style="color: #6b7280; font-size: 14px;">{answer}</div>
          </td>
          <td style="padding: 12px; text-align: center;">{badge}</td>
        </tr>"#,
                position = index + 1,
                question = escape_text(&answer.question_title),
                answer = escape_text(&answer.answer_text),
                badge = badge,
            )
        })
        .collect()
}

/// Renders the self-contained HTML result summary sent to the participant.
pub fn render_result_email(submission: &Submission) -> String {
    let score = &submission.score;

    format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Résultats du Quiz</title>
</head>
<body style="margin: 0; padding: 0; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Arial, sans-serif; background-color: #f3f4f6;">
  <table role="presentation" style="width: 100%; border-collapse: collapse;">
    <tr>
      <td style="padding: 40px 20px;">
        <table role="presentation" style="max-width: 600px; margin: 0 auto; background-color: #ffffff; border-radius: 8px;">
          <tr>
            <td style="background-color: #667eea; padding: 40px 30px; border-radius: 8px 8px 0 0; text-align: center;">
              <h1 style="margin: 0; color: #ffffff; font-size: 28px; font-weight: 700;">Résultats du Quiz</h1>
              <p style="margin: 10px 0 0 0; color: #e0e7ff; font-size: 16px;">{title}</p>
            </td>
          </tr>
          <tr>
            <td style="padding: 40px 30px; text-align: center; background-color: #f9fafb;">
              <div style="background-color: {color}; color: #ffffff; padding: 30px; border-radius: 12px;">
                <div style="font-size: 48px; font-weight: 700; margin-bottom: 8px;">{percentage}%</div>
                <div style="font-size: 20px; font-weight: 600;">Note: {grade}</div>
                <div style="font-size: 16px; margin-top: 12px;">{correct} / {total} bonnes réponses</div>
              </div>
            </td>
          </tr>
          <tr>
            <td style="padding: 0 30px 30px 30px;">
              <h2 style="color: #1f2937; font-size: 20px; font-weight: 600; margin: 0 0 20px 0;">Détails des réponses</h2>
              <table role="presentation" style="width: 100%; border-collapse: collapse; border: 1px solid #e5e7eb;">
                <thead>
                  <tr style="background-color: #f9fafb;">
                    <th style="padding: 12px; text-align: center; color: #6b7280; width: 50px;">#</th>
                    <th style="padding: 12px; text-align: left; color: #6b7280;">Question et Réponse</th>
                    <th style="padding: 12px; text-align: center; color: #6b7280; width: 120px;">Statut</th>
                  </tr>
                </thead>
                <tbody>{rows}
                </tbody>
              </table>
            </td>
          </tr>
          <tr>
            <td style="padding: 0 30px 30px 30px;">
              <div style="background-color: #f9fafb; padding: 20px; border-radius: 8px; border-left: 4px solid #667eea;">
                <h3 style="margin: 0 0 12px 0; color: #1f2937; font-size: 16px;">Informations de session</h3>
                <div style="color: #6b7280; font-size: 14px; line-height: 1.6;">
                  <div><strong>Email:</strong> {email}</div>
                  <div><strong>Date de complétion:</strong> {completed_at}</div>
                  <div><strong>Durée:</strong> {duration}</div>
                </div>
              </div>
            </td>
          </tr>
          <tr>
            <td style="padding: 30px; text-align: center; border-top: 1px solid #e5e7eb;">
              <p style="margin: 0; color: #6b7280; font-size: 14px;">Merci d'avoir participé à ce quiz!</p>
              <p style="margin: 10px 0 0 0; color: #9ca3af; font-size: 12px;">Cet email a été envoyé automatiquement, merci de ne pas y répondre.</p>
            </td>
          </tr>
        </table>
      </td>
    </tr>
  </table>
</body>
</html>
"#,
        title = escape_text(&submission.quiz_title),
        color = score_color(score.percentage),
        percentage = score.percentage,
        grade = escape_text(&score.grade),
        correct = score.correct,
        total = score.total,
        rows = answer_rows(submission),
        email = escape_text(&submission.email),
        completed_at = escape_text(&format_completed_at(&submission.completed_at)),
        duration = format_duration(submission.session_duration),
    )
}
