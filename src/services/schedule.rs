//! Past / upcoming classification of shows.
//!
//! Nothing here is stored: a show is upcoming iff its start time is strictly
//! later than the instant the query is evaluated at.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect};

use crate::entities;

pub fn is_upcoming(start_time: &DateTime<Utc>, now: &DateTime<Utc>) -> bool {
    start_time > now
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule<T> {
    pub past: Vec<T>,
    pub upcoming: Vec<T>,
}

/// Split `items` into past and upcoming, keeping their relative order.
pub fn partition<T, F>(
    items: impl IntoIterator<Item = T>,
    now: &DateTime<Utc>,
    start_time: F,
) -> Schedule<T>
where
    F: Fn(&T) -> DateTime<Utc>,
{
    let (upcoming, past) = items
        .into_iter()
        .partition(|item| is_upcoming(&start_time(item), now));
    Schedule { past, upcoming }
}

/// Upcoming show counts keyed by `owner` (venue or artist id). Owners without
/// upcoming shows are absent from the map.
pub async fn upcoming_counts<C>(
    conn: &C,
    owner: entities::show::Column,
    now: DateTime<Utc>,
) -> Result<HashMap<i64, i64>, DbErr>
where
    C: ConnectionTrait,
{
    let rows: Vec<(i64, i64)> = entities::show::Entity::find()
        .select_only()
        .column(owner)
        .column_as(entities::show::Column::Id.count(), "num_upcoming_shows")
        .filter(entities::show::Column::StartTime.gt(now))
        .group_by(owner)
        .into_tuple()
        .all(conn)
        .await?;

    Ok(rows.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::test_utils::{insert_artist, insert_show, insert_venue, test_db};

    #[test]
    fn test_show_starting_now_is_past() {
        let now = Utc::now();
        assert!(!is_upcoming(&now, &now));
        assert!(is_upcoming(&(now + Duration::seconds(1)), &now));
        assert!(!is_upcoming(&(now - Duration::seconds(1)), &now));
    }

    #[test]
    fn test_partition_keeps_order() {
        let now = Utc::now();
        let times = vec![
            now - Duration::days(2),
            now + Duration::days(1),
            now,
            now + Duration::days(3),
            now - Duration::days(1),
        ];

        let schedule = partition(times.clone(), &now, |t| *t);

        assert_eq!(schedule.past, vec![times[0], times[2], times[4]]);
        assert_eq!(schedule.upcoming, vec![times[1], times[3]]);
    }

    #[tokio::test]
    async fn test_upcoming_counts_per_owner() {
        let db = test_db().await;
        let now = Utc::now();
        let hop = insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        let bar = insert_venue(&db, "The Dueling Pianos Bar", "New York", "NY").await;
        let petals = insert_artist(&db, "Guns N Petals").await;

        insert_show(&db, petals.id, hop.id, now + Duration::days(1)).await;
        insert_show(&db, petals.id, hop.id, now + Duration::days(2)).await;
        insert_show(&db, petals.id, hop.id, now - Duration::days(2)).await;
        insert_show(&db, petals.id, bar.id, now).await;

        let by_venue = upcoming_counts(&db.conn, entities::show::Column::VenueId, now)
            .await
            .unwrap();
        assert_eq!(by_venue.get(&hop.id), Some(&2));
        assert_eq!(by_venue.get(&bar.id), None);

        let by_artist = upcoming_counts(&db.conn, entities::show::Column::ArtistId, now)
            .await
            .unwrap();
        assert_eq!(by_artist.get(&petals.id), Some(&2));
    }
}
