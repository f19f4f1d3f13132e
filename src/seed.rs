//! Demo listings for a fresh database.

use std::sync::Arc;

use color_eyre::{Result, eyre::Context};

use crate::database::Database;
use crate::forms::{ArtistForm, ShowForm, VenueForm};
use crate::services::{artist::ArtistService, show::ShowService, venue::VenueService};

fn link(value: &str) -> Option<String> {
    Some(value.to_string())
}

fn genres(values: &[&str]) -> Vec<String> {
    values.iter().map(|g| g.to_string()).collect()
}

fn venues() -> Vec<VenueForm> {
    vec![
        VenueForm {
            name: "The Musical Hop".into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            address: "1015 Folsom Street".into(),
            phone: link("123-123-1234"),
            genres: genres(&["Jazz", "Reggae", "Swing", "Classical", "Folk"]),
            image_link: link(
                "https://images.unsplash.com/photo-1543900694-133f37abaaa5?w=400",
            ),
            facebook_link: link("https://www.facebook.com/TheMusicalHop"),
            website: link("https://www.themusicalhop.com"),
            seeking_talent: true,
            seeking_description: link(
                "We are on the lookout for a local artist to play every two weeks. Please call us.",
            ),
        },
        VenueForm {
            name: "The Dueling Pianos Bar".into(),
            city: "New York".into(),
            state: "NY".into(),
            address: "335 Delancey Street".into(),
            phone: link("914-003-1132"),
            genres: genres(&["Classical", "R&B", "Hip-Hop"]),
            image_link: link(
                "https://images.unsplash.com/photo-1497032205916-ac775f0649ae?w=750",
            ),
            facebook_link: link("https://www.facebook.com/theduelingpianos"),
            website: link("https://www.theduelingpianos.com"),
            seeking_talent: false,
            seeking_description: None,
        },
        VenueForm {
            name: "Park Square Live Music & Coffee".into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            address: "34 Whiskey Moore Ave".into(),
            phone: link("415-000-1234"),
            genres: genres(&["Rock n Roll", "Jazz", "Classical", "Folk"]),
            image_link: link(
                "https://images.unsplash.com/photo-1485686531765-ba63b07845a7?w=747",
            ),
            facebook_link: link("https://www.facebook.com/ParkSquareLiveMusicAndCoffee"),
            website: link("https://www.parksquarelivemusicandcoffee.com"),
            seeking_talent: false,
            seeking_description: None,
        },
    ]
}

fn artists() -> Vec<ArtistForm> {
    vec![
        ArtistForm {
            name: "Guns N Petals".into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            phone: link("326-123-5000"),
            genres: genres(&["Rock n Roll"]),
            image_link: link(
                "https://images.unsplash.com/photo-1549213783-8284d0336c4f?w=300",
            ),
            facebook_link: link("https://www.facebook.com/GunsNPetals"),
            website: link("https://www.gunsnpetalsband.com"),
            seeking_venue: true,
            seeking_description: link(
                "Looking for shows to perform at in the San Francisco Bay Area!",
            ),
        },
        ArtistForm {
            name: "Matt Quevedo".into(),
            city: "New York".into(),
            state: "NY".into(),
            phone: link("300-400-5000"),
            genres: genres(&["Jazz"]),
            image_link: link(
                "https://images.unsplash.com/photo-1495223153807-b916f75de8c5?w=334",
            ),
            facebook_link: link("https://www.facebook.com/mattquevedo923251523"),
            website: None,
            seeking_venue: false,
            seeking_description: None,
        },
        ArtistForm {
            name: "The Wild Sax Band".into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            phone: link("432-325-5432"),
            genres: genres(&["Jazz", "Classical"]),
            image_link: link(
                "https://images.unsplash.com/photo-1558369981-f9ca78462e61?w=794",
            ),
            facebook_link: None,
            website: None,
            seeking_venue: false,
            seeking_description: None,
        },
    ]
}

/// (artist index, venue index, start time)
const SHOWS: [(usize, usize, &str); 5] = [
    (0, 0, "2019-05-21 21:30:00"),
    (1, 2, "2019-06-15 23:00:00"),
    (2, 2, "2035-04-01 20:00:00"),
    (2, 2, "2035-04-08 20:00:00"),
    (2, 2, "2035-04-15 20:00:00"),
];

/// Insert the demo listings. Returns false, and changes nothing, when the
/// database already has data.
pub async fn seed(db: Arc<Database>) -> Result<bool> {
    if !db.is_empty().await? {
        log::warn!("Database already has listings, skipping seed");
        return Ok(false);
    }

    let venue_service = VenueService::new(db.clone());
    let mut venue_ids = Vec::new();
    for form in venues() {
        let name = form.name.clone();
        let venue = venue_service
            .create(form)
            .await
            .wrap_err_with(|| format!("Failed to seed venue {name}"))?;
        venue_ids.push(venue.id);
    }

    let artist_service = ArtistService::new(db.clone());
    let mut artist_ids = Vec::new();
    for form in artists() {
        let name = form.name.clone();
        let artist = artist_service
            .create(form)
            .await
            .wrap_err_with(|| format!("Failed to seed artist {name}"))?;
        artist_ids.push(artist.id);
    }

    let show_service = ShowService::new(db);
    for (artist, venue, start_time) in SHOWS {
        show_service
            .create(ShowForm {
                artist_id: artist_ids[artist].to_string(),
                venue_id: venue_ids[venue].to_string(),
                start_time: start_time.to_string(),
            })
            .await
            .wrap_err_with(|| format!("Failed to seed show at {start_time}"))?;
    }

    log::info!(
        "Seeded {} venues, {} artists and {} shows",
        venue_ids.len(),
        artist_ids.len(),
        SHOWS.len()
    );
    Ok(true)
}
