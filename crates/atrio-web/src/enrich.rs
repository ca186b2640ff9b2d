//! Best-effort collaborators on the contact-submission path.
//!
//! Geolocation never fails a request: every lookup problem collapses into
//! a sentinel country value, so the create path has no branching on
//! enrichment success. Captcha is the one gate that blocks submission
//! when it rejects. Notification is a logged boundary — mail transport
//! is out of scope.

use std::{net::IpAddr, time::Duration};

use atrio_core::contact::Contact;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use serde::Deserialize;

/// Country recorded when the submitter could not be geolocated.
pub const UNKNOWN_COUNTRY: &str = "unknown";
/// Country recorded for loopback/private submitters.
pub const LOCAL_COUNTRY: &str = "local";

/// Default timeout for outbound enrichment calls.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

// ─── Client IP ────────────────────────────────────────────────────────────────

/// Submitter address: first `X-Forwarded-For` hop when present, else the
/// socket peer address. `None` when neither is available (e.g. in-process
/// test requests).
pub struct ClientIp(pub Option<String>);

impl<S> FromRequestParts<S> for ClientIp
where
  S: Send + Sync,
{
  type Rejection = std::convert::Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    let forwarded = parts
      .headers
      .get("x-forwarded-for")
      .and_then(|v| v.to_str().ok())
      .and_then(|v| v.split(',').next())
      .map(|s| s.trim().to_string())
      .filter(|s| !s.is_empty());

    let ip = forwarded.or_else(|| {
      parts
        .extensions
        .get::<ConnectInfo<std::net::SocketAddr>>()
        .map(|info| info.0.ip().to_string())
    });

    Ok(ClientIp(ip))
  }
}

// ─── Geolocation ──────────────────────────────────────────────────────────────

/// Client for an ipapi.co-compatible geolocation endpoint.
#[derive(Clone)]
pub struct GeoClient {
  http: reqwest::Client,
  base: String,
}

#[derive(Deserialize)]
struct GeoResponse {
  country_name: Option<String>,
  #[serde(default)]
  error: bool,
}

impl GeoClient {
  pub fn new(http: reqwest::Client, base: impl Into<String>) -> Self {
    Self { http, base: base.into() }
  }

  /// Country for `ip`. Never fails: missing or non-public addresses map
  /// to [`LOCAL_COUNTRY`], everything else that goes wrong to
  /// [`UNKNOWN_COUNTRY`].
  pub async fn country_for_ip(&self, ip: Option<&str>) -> String {
    let Some(ip) = ip else {
      return LOCAL_COUNTRY.to_string();
    };
    let Ok(parsed) = ip.parse::<IpAddr>() else {
      tracing::debug!(ip, "unparseable client address");
      return UNKNOWN_COUNTRY.to_string();
    };
    if !is_public(parsed) {
      return LOCAL_COUNTRY.to_string();
    }

    match self.lookup(ip).await {
      Ok(Some(country)) => country,
      Ok(None) => UNKNOWN_COUNTRY.to_string(),
      Err(e) => {
        tracing::warn!(ip, error = %e, "geolocation lookup failed");
        UNKNOWN_COUNTRY.to_string()
      }
    }
  }

  async fn lookup(&self, ip: &str) -> Result<Option<String>, reqwest::Error> {
    let url = format!("{}/{ip}/json/", self.base.trim_end_matches('/'));
    let resp = self.http.get(&url).send().await?.error_for_status()?;
    let body: GeoResponse = resp.json().await?;
    if body.error {
      return Ok(None);
    }
    Ok(body.country_name.filter(|c| !c.is_empty()))
  }
}

fn is_public(ip: IpAddr) -> bool {
  match ip {
    IpAddr::V4(v4) => {
      !(v4.is_loopback()
        || v4.is_private()
        || v4.is_link_local()
        || v4.is_unspecified())
    }
    IpAddr::V6(v6) => {
      // Unique-local fc00::/7 and link-local fe80::/10.
      let prefix = v6.segments()[0];
      !(v6.is_loopback()
        || v6.is_unspecified()
        || (prefix & 0xfe00) == 0xfc00
        || (prefix & 0xffc0) == 0xfe80)
    }
  }
}

// ─── Captcha ──────────────────────────────────────────────────────────────────

const SITEVERIFY_URL: &str =
  "https://www.google.com/recaptcha/api/siteverify";

/// Client for Google's reCAPTCHA `siteverify` endpoint.
///
/// Constructed without a secret, the check is disabled and every
/// submission passes.
#[derive(Clone)]
pub struct CaptchaClient {
  http:   reqwest::Client,
  secret: Option<String>,
}

#[derive(Deserialize)]
struct SiteverifyResponse {
  success: bool,
}

impl CaptchaClient {
  pub fn new(http: reqwest::Client, secret: Option<String>) -> Self {
    Self { http, secret }
  }

  /// `true` when the submission may proceed. A missing token or any
  /// verification problem blocks it — captcha is the gate that must not
  /// fail open.
  pub async fn verify(&self, token: Option<&str>) -> bool {
    let Some(secret) = self.secret.as_deref() else {
      return true;
    };
    let Some(token) = token.filter(|t| !t.is_empty()) else {
      return false;
    };

    let params = [("secret", secret), ("response", token)];
    match self.http.post(SITEVERIFY_URL).form(&params).send().await {
      Ok(resp) => match resp.json::<SiteverifyResponse>().await {
        Ok(body) => body.success,
        Err(e) => {
          tracing::warn!(error = %e, "unreadable captcha verification response");
          false
        }
      },
      Err(e) => {
        tracing::warn!(error = %e, "captcha verification request failed");
        false
      }
    }
  }
}

// ─── Notification ─────────────────────────────────────────────────────────────

/// Outbound notification boundary for new contact submissions.
///
/// Best-effort by construction: it only logs the would-be delivery, so it
/// can never fail the create path.
#[derive(Clone, Default)]
pub struct Notifier {
  pub recipients: Vec<String>,
}

impl Notifier {
  pub fn contact_received(&self, contact: &Contact) {
    if self.recipients.is_empty() {
      return;
    }
    tracing::info!(
      recipients = ?self.recipients,
      contact_id = contact.id,
      email = %contact.email,
      subject = %contact.subject,
      "contact notification queued"
    );
  }
}
