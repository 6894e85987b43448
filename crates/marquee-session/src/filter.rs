//! Filter composition into canonical search requests

use marquee_core::SearchRequest;

/// Genre sentinel meaning "no genre filter"
pub const ALL_GENRES: &str = "All";

/// Genres offered by the filter bar, in display order
pub const GENRE_CHOICES: &[&str] = &[
    "action",
    "adventure",
    "comedy",
    "melodrama",
    "crime",
    "biography",
    "drama",
    "history",
    "documentary",
    "short",
    "music",
    "cartoon",
    "fantasy",
    "family",
    "sci-fi",
    "thriller",
];

/// Merge the free-text query and the discrete filter selections into one
/// canonical page-1 request.
///
/// Pure: no state is retained between calls. The [`ALL_GENRES`] sentinel and
/// blank or non-finite ratings normalize to "no filter". Any change to any of
/// the three inputs produces a request with a different fingerprint, which is
/// how callers know to discard accumulated results.
pub fn compose_request(query: &str, genre: Option<&str>, min_rating: Option<f64>) -> SearchRequest {
    let genre = genre
        .map(str::trim)
        .filter(|g| !g.is_empty() && !g.eq_ignore_ascii_case(ALL_GENRES))
        .map(str::to_owned);
    let min_rating = min_rating.filter(|r| r.is_finite());

    SearchRequest {
        query: query.to_owned(),
        genre,
        min_rating,
        page: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composes_page_one() {
        let request = compose_request("Luck", Some("drama"), Some(7.0));
        assert_eq!(request.page, 1);
        assert_eq!(request.query, "Luck");
        assert_eq!(request.genre.as_deref(), Some("drama"));
        assert_eq!(request.min_rating, Some(7.0));
    }

    #[test]
    fn all_sentinel_means_no_genre_filter() {
        assert_eq!(compose_request("", Some(ALL_GENRES), None).genre, None);
        assert_eq!(compose_request("", Some("all"), None).genre, None);
        assert_eq!(compose_request("", Some("  "), None).genre, None);
        assert_eq!(compose_request("", None, None).genre, None);
    }

    #[test]
    fn non_finite_ratings_are_dropped() {
        assert_eq!(compose_request("", None, Some(f64::NAN)).min_rating, None);
        assert_eq!(compose_request("", None, Some(f64::INFINITY)).min_rating, None);
    }

    #[test]
    fn changing_any_input_changes_the_fingerprint() {
        let base = compose_request("Luck", Some("drama"), Some(7.0));
        let by_query = compose_request("Lucky", Some("drama"), Some(7.0));
        let by_genre = compose_request("Luck", Some("comedy"), Some(7.0));
        let by_rating = compose_request("Luck", Some("drama"), Some(8.0));

        assert_ne!(base.fingerprint(), by_query.fingerprint());
        assert_ne!(base.fingerprint(), by_genre.fingerprint());
        assert_ne!(base.fingerprint(), by_rating.fingerprint());

        let same = compose_request("Luck", Some("drama"), Some(7.0));
        assert_eq!(base.fingerprint(), same.fingerprint());
    }
}
