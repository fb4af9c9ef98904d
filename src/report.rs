// src/report.rs
//! Report dispatch over authenticated SMTP (STARTTLS).
//!
//! Builds a multipart message from a plain-text body and optional file
//! attachments. Attachment paths that do not resolve to an existing file
//! are skipped silently; missing credentials fail before any network I/O.

use std::path::{Path, PathBuf};

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, Message, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::AppError;

pub const DEFAULT_SUBJECT: &str = "News Analyzer Report";
pub const DEFAULT_BODY: &str = "Please find the attached report.";

pub async fn send_report(
    cfg: &Config,
    to: &[String],
    subject: &str,
    body: &str,
    attachments: &[PathBuf],
) -> Result<(), AppError> {
    let (user, pass) = cfg.email_credentials()?;

    let msg = build_message(user, to, subject, body, attachments)?;

    let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.smtp_host)
        .map_err(|e| AppError::Upstream(format!("smtp relay {}: {e}", cfg.smtp_host)))?
        .credentials(Credentials::new(user.to_string(), pass.to_string()))
        .build();

    mailer
        .send(msg)
        .await
        .map_err(|e| AppError::Upstream(format!("smtp send: {e}")))?;
    info!(recipients = to.len(), "report sent");
    Ok(())
}

fn build_message(
    from: &str,
    to: &[String],
    subject: &str,
    body: &str,
    attachments: &[PathBuf],
) -> Result<Message, AppError> {
    if to.is_empty() {
        return Err(AppError::Validation(
            "at least one recipient is required".to_string(),
        ));
    }

    let from_mbox: Mailbox = from
        .parse()
        .map_err(|_| AppError::Config(format!("invalid EMAIL_USER address: {from}")))?;
    let mut builder = Message::builder().from(from_mbox).subject(subject);
    for addr in to {
        let mbox: Mailbox = addr
            .parse()
            .map_err(|_| AppError::Validation(format!("invalid recipient address: {addr}")))?;
        builder = builder.to(mbox);
    }

    let mut multipart = MultiPart::mixed().singlepart(
        SinglePart::builder()
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string()),
    );
    for path in attachments {
        match read_attachment(path) {
            Some((name, bytes)) => {
                multipart = multipart.singlepart(
                    Attachment::new(name).body(bytes, ContentType::parse("application/octet-stream").expect("static mime")),
                );
            }
            None => debug!(path = %path.display(), "skipping missing attachment"),
        }
    }

    builder
        .multipart(multipart)
        .map_err(|e| AppError::Validation(format!("building message: {e}")))
}

/// Returns the file name and contents, or `None` when the path does not
/// point at a readable regular file.
fn read_attachment(path: &Path) -> Option<(String, Vec<u8>)> {
    if !path.is_file() {
        return None;
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())?;
    let bytes = std::fs::read(path).ok()?;
    Some((name, bytes))
}
