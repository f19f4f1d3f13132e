//! Genre lists are persisted as a single comma-joined column.
//!
//! Values containing the delimiter are not rejected here; they will not
//! survive a `join` / `split` round trip.

pub const DELIMITER: char = ',';

/// Join an ordered genre selection into its stored form.
pub fn join<S: AsRef<str>>(genres: &[S]) -> String {
    genres
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(&DELIMITER.to_string())
}

/// Split a stored genre column back into the ordered list.
pub fn split(stored: &str) -> Vec<String> {
    if stored.is_empty() {
        return Vec::new();
    }
    stored.split(DELIMITER).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_preserves_order() {
        let genres = vec!["Jazz", "Reggae", "Swing", "Classical", "Folk"];
        let stored = join(&genres);
        assert_eq!(stored, "Jazz,Reggae,Swing,Classical,Folk");
        assert_eq!(split(&stored), genres);
    }

    #[test]
    fn test_single_genre() {
        assert_eq!(join(&["Rock n Roll"]), "Rock n Roll");
        assert_eq!(split("Rock n Roll"), vec!["Rock n Roll"]);
    }

    #[test]
    fn test_empty_list_round_trips() {
        let empty: Vec<String> = Vec::new();
        assert_eq!(join(&empty), "");
        assert!(split("").is_empty());
    }

    #[test]
    fn test_value_with_delimiter_does_not_round_trip() {
        let genres = vec!["Rock, Pop", "Jazz"];
        assert_eq!(split(&join(&genres)), vec!["Rock", " Pop", "Jazz"]);
    }
}
