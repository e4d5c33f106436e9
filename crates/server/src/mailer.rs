//! Reset-mail hand-off.
//!
//! Actual delivery belongs to an external mail service; this composes the
//! frontend reset link and hands it to the log drain the operator wires up.

use tracing::info;

#[derive(Clone, Debug, Default)]
pub struct Mailer {
    frontend_url: Option<String>,
}

impl Mailer {
    pub fn new(frontend_url: Option<String>) -> Self {
        Self { frontend_url }
    }

    /// Emits the reset link for the configured delivery pipeline.
    pub fn send_reset(&self, email: &str, token: &str) {
        let base = self
            .frontend_url
            .as_deref()
            .unwrap_or("http://localhost:5173");
        let link = format!("{}/reset/{token}", base.trim_end_matches('/'));
        info!(%email, "password reset link issued: {link}");
    }
}
