use serde::Serialize;

/// Search response: the match count and the matches themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResults<T> {
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> From<Vec<T>> for SearchResults<T> {
    fn from(data: Vec<T>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }
}

/// One venue or artist in a listing, with its upcoming show count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub id: i64,
    pub name: String,
    pub num_upcoming_shows: i64,
}

/// Case-insensitive substring match on names.
///
/// Both sides are lowercased with Unicode rules, so "über" finds "Café Über".
/// Every character of the term is literal and an empty term matches every
/// name.
#[derive(Debug, Clone)]
pub struct NameFilter {
    needle: String,
}

impl NameFilter {
    pub fn new(term: &str) -> Self {
        Self {
            needle: term.to_lowercase(),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        name.to_lowercase().contains(&self.needle)
    }
}
