//! Email bodies. HTML is rendered with Askama, the text part is formatted inline.
use crate::mail::{MailError, OutgoingEmail};
use askama::Template;

#[derive(Template)]
#[template(path = "password_reset_email.html")]
pub struct PasswordResetEmailTemplate {
    pub site_name: String,
    pub username: String,
    pub reset_url: String,
    pub lifetime_minutes: i64,
}

impl PasswordResetEmailTemplate {
    #[tracing::instrument(skip(self))]
    pub fn render_html(&self) -> Result<String, askama::Error> {
        self.render()
    }

    pub fn render_text(&self) -> String {
        format!(
            r#"Hello {},

You can use the following link to reset your password:

{}

This link will expire in {} minutes. If you didn't ask for a new password you can ignore this email.

The {} Team"#,
            self.username, self.reset_url, self.lifetime_minutes, self.site_name
        )
    }

    pub fn into_email(self, to: &str) -> Result<OutgoingEmail, MailError> {
        Ok(OutgoingEmail {
            to: to.to_string(),
            subject: format!("{} password reset", self.site_name),
            html_body: self.render_html()?,
            text_body: self.render_text(),
        })
    }
}

#[derive(Template)]
#[template(path = "welcome_email.html")]
pub struct WelcomeEmailTemplate {
    pub site_name: String,
    pub site_url: String,
    pub username: String,
}

impl WelcomeEmailTemplate {
    #[tracing::instrument(skip(self))]
    pub fn render_html(&self) -> Result<String, askama::Error> {
        self.render()
    }

    pub fn render_text(&self) -> String {
        format!(
            r#"Welcome to {} {}!

We're glad you're here. Check in at {}

The {} Team"#,
            self.site_name, self.username, self.site_url, self.site_name
        )
    }

    pub fn into_email(self, to: &str) -> Result<OutgoingEmail, MailError> {
        Ok(OutgoingEmail {
            to: to.to_string(),
            subject: format!("Welcome to {} {}!", self.site_name, self.username),
            html_body: self.render_html()?,
            text_body: self.render_text(),
        })
    }
}
