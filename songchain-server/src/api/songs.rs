//! Song listing and registration
//!
//! Registration is a post-redirect-get flow: the outcome is queued as flash
//! messages and the browser is sent back to `/`. A record is appended only
//! after the BaaS accepts the task.

use axum::{
    extract::State,
    response::{Html, Redirect},
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::extract::cookie::SignedCookieJar;
use serde::Deserialize;
use songchain_common::models::{is_valid_owner, SongPayload, TaskRequest};
use songchain_common::{time, SongRecord};
use thiserror::Error;
use tracing::{info, warn};

use crate::api::flash::{self, FlashMessage};
use crate::api::ui;
use crate::services::BaasError;
use crate::store::Reservation;
use crate::AppState;

/// Registration form fields; all optional so validation can report them
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationForm {
    pub title: Option<String>,
    pub url: Option<String>,
    pub price: Option<String>,
    pub owner: Option<String>,
}

/// Form validation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("Error registering song: missing field '{0}'")]
    MissingField(&'static str),

    #[error("Error registering song: invalid price '{0}'")]
    InvalidPrice(String),

    #[error("Please provide a valid Algorand address (58 characters)")]
    InvalidOwner,
}

/// A registration that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRegistration {
    pub title: String,
    pub url: String,
    pub price: i64,
    pub owner: String,
}

impl RegistrationForm {
    /// Check the form without side effects
    pub fn validate(self) -> Result<ValidRegistration, RegistrationError> {
        let title = self.title.ok_or(RegistrationError::MissingField("title"))?;
        let url = self.url.ok_or(RegistrationError::MissingField("url"))?;

        let raw_price = self.price.ok_or(RegistrationError::MissingField("price"))?;
        let price = raw_price
            .trim()
            .parse::<i64>()
            .map_err(|_| RegistrationError::InvalidPrice(raw_price.clone()))?;

        let owner = self.owner.unwrap_or_default();
        if owner.is_empty() || !is_valid_owner(&owner) {
            return Err(RegistrationError::InvalidOwner);
        }

        Ok(ValidRegistration { title, url, price, owner })
    }
}

/// GET /
pub async fn index(State(state): State<AppState>, jar: SignedCookieJar) -> (SignedCookieJar, Html<String>) {
    let (jar, messages) = flash::take(jar);
    let songs = state.store.list().await;
    (jar, Html(ui::render_index(&songs, &messages)))
}

/// GET /api/songs
pub async fn list_songs(State(state): State<AppState>) -> Json<Vec<SongRecord>> {
    Json(state.store.list().await)
}

/// POST /register_song
pub async fn register_song(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<RegistrationForm>,
) -> (SignedCookieJar, Redirect) {
    let messages = register(&state, form).await;
    (flash::push(jar, messages), Redirect::to("/"))
}

/// Run one registration and describe the outcome as flash messages
async fn register(state: &AppState, form: RegistrationForm) -> Vec<FlashMessage> {
    let registration = match form.validate() {
        Ok(registration) => registration,
        Err(e) => {
            warn!(error = %e, "Rejected song registration");
            return vec![FlashMessage::error(e.to_string())];
        }
    };

    let now = time::now();
    let reservation = Reservation::acquire(state.store.clone(), now.timestamp()).await;
    let data_id = reservation.data_id().to_string();
    let song = SongPayload::new(
        registration.title,
        registration.url,
        registration.price,
        registration.owner,
        time::to_iso8601(now),
    );
    let request = TaskRequest::new(data_id.clone(), song);

    match state.baas.submit_task(&request).await {
        Ok(task_id) => {
            let record = reservation
                .commit(request.json_payload, task_id.clone())
                .await;

            info!(
                id = record.id,
                data_id = %data_id,
                task_id = task_id.as_deref().unwrap_or("none"),
                "Song registered, awaiting blockchain confirmation"
            );

            vec![
                FlashMessage::success(format!(
                    "Song registered successfully! Tracking ID: {}",
                    data_id
                )),
                FlashMessage::info(format!(
                    "BaaS Task ID: {} - Your song will be written to the blockchain shortly.",
                    task_id.as_deref().unwrap_or("None")
                )),
            ]
        }
        Err(e) => {
            reservation.release().await;
            warn!(data_id = %data_id, error = %e, "Song registration failed");

            let message = match e {
                BaasError::Api(status, body) => format!("Error: {} - {}", status, body),
                other => format!("Error registering song: {}", other),
            };
            vec![FlashMessage::error(message)]
        }
    }
}

/// Build song routes
pub fn song_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/register_song", post(register_song))
        .route("/api/songs", get(list_songs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(price: &str, owner: &str) -> RegistrationForm {
        RegistrationForm {
            title: Some("A".to_string()),
            url: Some("http://x".to_string()),
            price: Some(price.to_string()),
            owner: Some(owner.to_string()),
        }
    }

    #[test]
    fn test_valid_form() {
        let valid = form(" 5 ", &"A".repeat(58)).validate().unwrap();
        assert_eq!(valid.price, 5);
        assert_eq!(valid.title, "A");
    }

    #[test]
    fn test_owner_length_rejected() {
        assert_eq!(
            form("5", &"A".repeat(57)).validate(),
            Err(RegistrationError::InvalidOwner)
        );
        assert_eq!(form("5", "").validate(), Err(RegistrationError::InvalidOwner));

        let mut missing_owner = form("5", "x");
        missing_owner.owner = None;
        assert_eq!(missing_owner.validate(), Err(RegistrationError::InvalidOwner));
    }

    #[test]
    fn test_price_rejected() {
        assert_eq!(
            form("abc", &"A".repeat(58)).validate(),
            Err(RegistrationError::InvalidPrice("abc".to_string()))
        );
        assert!(form("5.5", &"A".repeat(58)).validate().is_err());
        assert!(form("", &"A".repeat(58)).validate().is_err());
    }

    #[test]
    fn test_missing_fields() {
        let mut no_title = form("5", &"A".repeat(58));
        no_title.title = None;
        assert_eq!(no_title.validate(), Err(RegistrationError::MissingField("title")));

        let no_price = RegistrationForm {
            price: None,
            ..form("5", &"A".repeat(58))
        };
        assert_eq!(no_price.validate(), Err(RegistrationError::MissingField("price")));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            RegistrationError::InvalidOwner.to_string(),
            "Please provide a valid Algorand address (58 characters)"
        );
    }
}
