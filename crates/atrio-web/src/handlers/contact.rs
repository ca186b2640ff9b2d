//! `POST /contact` — public contact-form submissions.

use axum::{
  Form, Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;

use atrio_core::{contact::NewContact, store::ContactStore};

use crate::{AppState, enrich::ClientIp, error::Error};

/// Urlencoded body of the public contact form.
#[derive(Debug, Deserialize)]
pub struct ContactForm {
  #[serde(default)]
  pub email:   String,
  #[serde(default)]
  pub names:   String,
  #[serde(default)]
  pub subject: String,
  #[serde(default)]
  pub comment: String,
  /// Token produced by the captcha widget on the rendered form.
  #[serde(default, rename = "g-recaptcha-response")]
  pub captcha_token: Option<String>,
}

/// Captcha gates the submission; geolocation and notification are
/// best-effort and never fail it.
pub async fn submit<S>(
  State(state): State<AppState<S>>,
  ClientIp(ip): ClientIp,
  Form(form): Form<ContactForm>,
) -> Result<impl IntoResponse, Error>
where
  S: ContactStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if !state.captcha.verify(form.captcha_token.as_deref()).await {
    return Err(Error::Validation(
      "captcha verification failed".to_string(),
    ));
  }

  let mut input = NewContact {
    email:   form.email.trim().to_string(),
    names:   form.names.trim().to_string(),
    subject: form.subject.trim().to_string(),
    comment: form.comment.trim().to_string(),
    ip:      ip.clone(),
    country: None,
  };
  // Reject junk before spending a geolocation round trip on it.
  input.validate()?;

  input.country = Some(state.geo.country_for_ip(ip.as_deref()).await);

  let contact = state
    .store
    .add_contact(input)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  state.notifier.contact_received(&contact);

  Ok((StatusCode::CREATED, Json(contact)))
}
