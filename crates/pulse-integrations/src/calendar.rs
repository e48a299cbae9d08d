//! Google Calendar adapter
//!
//! OAuth2 authorization-code flow plus the two REST calls the client
//! needs: list upcoming events and insert one.

use chrono::{DateTime, Utc};
use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope,
    TokenResponse, TokenUrl,
};
use pulse_core::config::GoogleOAuthConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
const EVENTS_URL: &str =
    "https://www.googleapis.com/calendar/v3/calendars/primary/events";

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("OAuth setup failed: {0}")]
    OAuthSetup(String),
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),
    #[error("Calendar request failed: {0}")]
    Request(String),
    #[error("Calendar returned status {0}")]
    Status(u16),
}

/// A calendar event in the shape the client renders
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(default)]
    pub id: Option<String>,
    pub summary: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    pub date_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<CalendarEvent>,
}

pub struct GoogleCalendarService {
    oauth: BasicClient,
    http: Client,
}

impl GoogleCalendarService {
    pub fn new(config: &GoogleOAuthConfig) -> Result<Self, CalendarError> {
        let oauth = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            AuthUrl::new(AUTH_URL.to_string())
                .map_err(|e| CalendarError::OAuthSetup(e.to_string()))?,
            Some(
                TokenUrl::new(TOKEN_URL.to_string())
                    .map_err(|e| CalendarError::OAuthSetup(e.to_string()))?,
            ),
        )
        .set_redirect_uri(
            RedirectUrl::new(config.redirect_url.clone())
                .map_err(|e| CalendarError::OAuthSetup(e.to_string()))?,
        );

        Ok(Self {
            oauth,
            http: Client::new(),
        })
    }

    /// Build the consent URL the client redirects the user to. Returns the
    /// URL and the CSRF state to verify on callback.
    pub fn authorize_url(&self) -> (String, String) {
        let (url, csrf) = self
            .oauth
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new(CALENDAR_SCOPE.to_string()))
            .url();

        (url.to_string(), csrf.secret().clone())
    }

    /// Exchange the callback code for an access token
    pub async fn exchange_code(&self, code: String) -> Result<String, CalendarError> {
        let token = self
            .oauth
            .exchange_code(AuthorizationCode::new(code))
            .request_async(oauth2::reqwest::async_http_client)
            .await
            .map_err(|e| CalendarError::TokenExchange(e.to_string()))?;

        Ok(token.access_token().secret().clone())
    }

    /// Upcoming events on the primary calendar
    pub async fn list_events(
        &self,
        access_token: &str,
        max_results: u32,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        let response = self
            .http
            .get(EVENTS_URL)
            .bearer_auth(access_token)
            .query(&[
                ("maxResults", max_results.to_string()),
                ("orderBy", "startTime".to_string()),
                ("singleEvents", "true".to_string()),
                ("timeMin", Utc::now().to_rfc3339()),
            ])
            .send()
            .await
            .map_err(|e| CalendarError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CalendarError::Status(response.status().as_u16()));
        }

        let list: EventList = response
            .json()
            .await
            .map_err(|e| CalendarError::Request(e.to_string()))?;

        debug!(count = list.items.len(), "Calendar events fetched");
        Ok(list.items)
    }

    /// Insert an event on the primary calendar
    pub async fn insert_event(
        &self,
        access_token: &str,
        event: &CalendarEvent,
    ) -> Result<CalendarEvent, CalendarError> {
        let response = self
            .http
            .post(EVENTS_URL)
            .bearer_auth(access_token)
            .json(event)
            .send()
            .await
            .map_err(|e| CalendarError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CalendarError::Status(response.status().as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| CalendarError::Request(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> GoogleCalendarService {
        GoogleCalendarService::new(&GoogleOAuthConfig {
            client_id: "client-id".into(),
            client_secret: "client-secret".into(),
            redirect_url: "http://localhost:8080/api/calendar/callback".into(),
        })
        .unwrap()
    }

    #[test]
    fn test_authorize_url_shape() {
        let (url, csrf) = service().authorize_url();
        assert!(url.starts_with(AUTH_URL));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("calendar"));
        assert!(!csrf.is_empty());
    }

    #[test]
    fn test_event_serialization() {
        let event = CalendarEvent {
            id: None,
            summary: "Standup".into(),
            description: None,
            start: EventTime {
                date_time: Utc::now(),
            },
            end: EventTime {
                date_time: Utc::now(),
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert!(json["start"]["dateTime"].is_string());
        assert_eq!(json["summary"], "Standup");
    }
}
