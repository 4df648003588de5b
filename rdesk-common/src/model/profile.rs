//! Artist profile and its explicit partial-update type

use serde::{Deserialize, Serialize};

use crate::normalize::{
    normalize_booking_status, normalize_contact_status, normalize_manager_status,
};

/// Artist profile row, one per user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ArtistProfile {
    pub user_id: String,
    pub artist_name: String,
    pub biography: String,
    pub location: String,
    pub website: String,
    pub contact_email: String,
    pub genres: Vec<String>,

    /// Canonical label status (see `normalize::contact`)
    pub label_status: Option<String>,
    pub label_name: String,
    pub manager_status: Option<String>,
    pub manager_name: String,
    pub manager_email: String,
    pub booking_status: Option<String>,
    pub booking_agent: String,
    pub booking_email: String,
}

/// Partial update: `None` leaves a field untouched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileUpdate {
    pub artist_name: Option<String>,
    pub biography: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub contact_email: Option<String>,
    pub genres: Option<Vec<String>>,
    pub label_status: Option<String>,
    pub label_name: Option<String>,
    pub manager_status: Option<String>,
    pub manager_name: Option<String>,
    pub manager_email: Option<String>,
    pub booking_status: Option<String>,
    pub booking_agent: Option<String>,
    pub booking_email: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == ProfileUpdate::default()
    }
}

fn set_text(target: &mut String, value: Option<String>) {
    if let Some(v) = value {
        *target = v.trim().to_string();
    }
}

impl ArtistProfile {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    /// Apply `update`, normalizing the three status fields
    pub fn merge(&mut self, update: ProfileUpdate) {
        set_text(&mut self.artist_name, update.artist_name);
        set_text(&mut self.biography, update.biography);
        set_text(&mut self.location, update.location);
        set_text(&mut self.website, update.website);
        set_text(&mut self.contact_email, update.contact_email);
        if let Some(genres) = update.genres {
            self.genres = genres
                .into_iter()
                .map(|g| g.trim().to_string())
                .filter(|g| !g.is_empty())
                .collect();
        }

        if let Some(status) = update.label_status {
            self.label_status = normalize_contact_status(&status);
        }
        set_text(&mut self.label_name, update.label_name);

        if let Some(status) = update.manager_status {
            self.manager_status = normalize_manager_status(&status);
        }
        set_text(&mut self.manager_name, update.manager_name);
        set_text(&mut self.manager_email, update.manager_email);

        if let Some(status) = update.booking_status {
            self.booking_status = normalize_booking_status(&status);
        }
        set_text(&mut self.booking_agent, update.booking_agent);
        set_text(&mut self.booking_email, update.booking_email);
    }
}
