//! Submitted form payloads and their field constraints.
//!
//! The same structs pre-populate the edit forms, so they serialize with the
//! field names the forms post.

use chrono::{DateTime, NaiveDateTime, Utc};
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Deserializer, Serialize};

use crate::entities;
use crate::genres;
use crate::validation::{ValidationErrors, Validator};

const SHORT_TEXT: usize = 120;
const LONG_TEXT: usize = 500;

/// Checkbox values are only sent when ticked; any of these mean "on".
fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.is_some_and(|v| {
        matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "y" | "yes" | "on" | "true" | "1"
        )
    }))
}

/// Selected genres with blank entries dropped.
fn selected(genres: &[String]) -> Vec<&str> {
    genres
        .iter()
        .map(|g| g.trim())
        .filter(|g| !g.is_empty())
        .collect()
}

/// Empty optional inputs are stored as NULL.
fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VenueForm {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: Option<String>,
    pub genres: Vec<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    #[serde(rename = "website_link")]
    pub website: Option<String>,
    #[serde(deserialize_with = "checkbox")]
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
}

impl VenueForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.required("name", &self.name)
            .required("city", &self.city)
            .max_length("city", Some(&self.city), SHORT_TEXT)
            .required("state", &self.state)
            .max_length("state", Some(&self.state), SHORT_TEXT)
            .required("address", &self.address)
            .max_length("address", Some(&self.address), SHORT_TEXT)
            .max_length("phone", self.phone.as_deref(), SHORT_TEXT)
            .required_list("genres", &self.genres)
            .max_length("image_link", self.image_link.as_deref(), LONG_TEXT)
            .url("image_link", self.image_link.as_deref())
            .max_length("facebook_link", self.facebook_link.as_deref(), SHORT_TEXT)
            .url("facebook_link", self.facebook_link.as_deref())
            .max_length("website_link", self.website.as_deref(), SHORT_TEXT)
            .url("website_link", self.website.as_deref())
            .max_length(
                "seeking_description",
                self.seeking_description.as_deref(),
                LONG_TEXT,
            );
        v.finish()
    }

    /// Copy every form field onto the record.
    pub fn apply(&self, venue: &mut entities::venue::ActiveModel) {
        venue.name = Set(self.name.trim().to_string());
        venue.city = Set(self.city.trim().to_string());
        venue.state = Set(self.state.trim().to_string());
        venue.address = Set(self.address.trim().to_string());
        venue.phone = Set(optional(&self.phone));
        venue.genres = Set(genres::join(&selected(&self.genres)));
        venue.image_link = Set(optional(&self.image_link));
        venue.facebook_link = Set(optional(&self.facebook_link));
        venue.website = Set(optional(&self.website));
        venue.seeking_talent = Set(self.seeking_talent);
        venue.seeking_description = Set(optional(&self.seeking_description));
    }
}

impl From<&entities::venue::Model> for VenueForm {
    fn from(venue: &entities::venue::Model) -> Self {
        Self {
            name: venue.name.clone(),
            city: venue.city.clone(),
            state: venue.state.clone(),
            address: venue.address.clone(),
            phone: venue.phone.clone(),
            genres: genres::split(&venue.genres),
            image_link: venue.image_link.clone(),
            facebook_link: venue.facebook_link.clone(),
            website: venue.website.clone(),
            seeking_talent: venue.seeking_talent,
            seeking_description: venue.seeking_description.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtistForm {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub genres: Vec<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    #[serde(rename = "website_link")]
    pub website: Option<String>,
    #[serde(deserialize_with = "checkbox")]
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
}

impl ArtistForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let joined = genres::join(&selected(&self.genres));
        let mut v = Validator::new();
        v.required("name", &self.name)
            .required("city", &self.city)
            .max_length("city", Some(&self.city), SHORT_TEXT)
            .required("state", &self.state)
            .max_length("state", Some(&self.state), SHORT_TEXT)
            .max_length("phone", self.phone.as_deref(), SHORT_TEXT)
            .required_list("genres", &self.genres)
            // The artist genre column is bounded as a whole.
            .max_length("genres", Some(&joined), SHORT_TEXT)
            .max_length("image_link", self.image_link.as_deref(), LONG_TEXT)
            .url("image_link", self.image_link.as_deref())
            .max_length("facebook_link", self.facebook_link.as_deref(), SHORT_TEXT)
            .url("facebook_link", self.facebook_link.as_deref())
            .max_length("website_link", self.website.as_deref(), SHORT_TEXT)
            .url("website_link", self.website.as_deref())
            .max_length(
                "seeking_description",
                self.seeking_description.as_deref(),
                LONG_TEXT,
            );
        v.finish()
    }

    pub fn apply(&self, artist: &mut entities::artist::ActiveModel) {
        artist.name = Set(self.name.trim().to_string());
        artist.city = Set(self.city.trim().to_string());
        artist.state = Set(self.state.trim().to_string());
        artist.phone = Set(optional(&self.phone));
        artist.genres = Set(genres::join(&selected(&self.genres)));
        artist.image_link = Set(optional(&self.image_link));
        artist.facebook_link = Set(optional(&self.facebook_link));
        artist.website = Set(optional(&self.website));
        artist.seeking_venue = Set(self.seeking_venue);
        artist.seeking_description = Set(optional(&self.seeking_description));
    }
}

impl From<&entities::artist::Model> for ArtistForm {
    fn from(artist: &entities::artist::Model) -> Self {
        Self {
            name: artist.name.clone(),
            city: artist.city.clone(),
            state: artist.state.clone(),
            phone: artist.phone.clone(),
            genres: genres::split(&artist.genres),
            image_link: artist.image_link.clone(),
            facebook_link: artist.facebook_link.clone(),
            website: artist.website.clone(),
            seeking_venue: artist.seeking_venue,
            seeking_description: artist.seeking_description.clone(),
        }
    }
}

/// Raw show submission. Ids and time arrive as text so that malformed input
/// is reported as a validation failure instead of an extractor rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowForm {
    pub artist_id: String,
    pub venue_id: String,
    pub start_time: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewShow {
    pub artist_id: i64,
    pub venue_id: i64,
    pub start_time: DateTime<Utc>,
}

impl ShowForm {
    pub fn validate(&self) -> Result<NewShow, ValidationErrors> {
        let mut v = Validator::new();
        v.required("artist_id", &self.artist_id)
            .required("venue_id", &self.venue_id)
            .required("start_time", &self.start_time);

        let artist_id = parse_id(&mut v, "artist_id", &self.artist_id);
        let venue_id = parse_id(&mut v, "venue_id", &self.venue_id);
        let start_time = if self.start_time.trim().is_empty() {
            None
        } else {
            let parsed = parse_start_time(&self.start_time);
            if parsed.is_none() {
                v.add("start_time", "Not a valid datetime value.");
            }
            parsed
        };
        v.finish()?;

        match (artist_id, venue_id, start_time) {
            (Some(artist_id), Some(venue_id), Some(start_time)) => Ok(NewShow {
                artist_id,
                venue_id,
                start_time,
            }),
            // Every missing value already produced an error above.
            _ => Err(ValidationErrors::default()),
        }
    }
}

fn parse_id(v: &mut Validator, field: &'static str, value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match value.parse::<i64>() {
        Ok(id) if id > 0 => Some(id),
        _ => {
            v.add(field, "Not a valid integer value.");
            None
        }
    }
}

/// Accepts `YYYY-MM-DD HH:MM:SS`, the `datetime-local` input format and
/// RFC 3339. Values without an offset are taken as UTC.
pub fn parse_start_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

/// Body of the search forms.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchForm {
    pub search_term: String,
}
