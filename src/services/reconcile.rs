use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{Book, RatingBook, RecommendationSet},
};

/// Category value that disables filtering
pub const ALL_CATEGORIES: &str = "all";

/// A wishlisted book with the reader's optional note
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WishlistEntry {
    pub book_id: String,
    pub notes: Option<String>,
}

/// New display position for one wishlist entry
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct WishlistOrder {
    pub book_id: String,
    pub order: u32,
}

/// Local UI state that changes independently of refresh cycles
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub ratings: RatingBook,
    pub dismissed: BTreeSet<String>,
    /// Wishlist in display order
    pub wishlist: Vec<WishlistEntry>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dismiss(&mut self, book_id: &str) -> AppResult<()> {
        let book_id = non_blank(book_id)?;
        self.dismissed.insert(book_id.to_string());
        Ok(())
    }

    /// Dismissed book ids, sorted
    pub fn dismissed_ids(&self) -> Vec<String> {
        self.dismissed.iter().cloned().collect()
    }

    /// Adds a book to the wishlist. Adding it again keeps its position and
    /// only replaces the note when a new one is given.
    pub fn add_to_wishlist(&mut self, book_id: &str, notes: Option<String>) -> AppResult<()> {
        let book_id = non_blank(book_id)?;
        let notes = notes.filter(|n| !n.trim().is_empty());

        match self.wishlist.iter_mut().find(|e| e.book_id == book_id) {
            Some(existing) => {
                if notes.is_some() {
                    existing.notes = notes;
                }
            }
            None => self.wishlist.push(WishlistEntry {
                book_id: book_id.to_string(),
                notes,
            }),
        }
        Ok(())
    }

    pub fn remove_from_wishlist(&mut self, book_id: &str) -> AppResult<()> {
        let before = self.wishlist.len();
        self.wishlist.retain(|e| e.book_id != book_id);
        if self.wishlist.len() == before {
            return Err(not_in_wishlist(book_id));
        }
        Ok(())
    }

    /// Moves entries to the given display positions.
    ///
    /// Entries not mentioned keep their current index as their position; ties
    /// keep the current relative order. Unknown ids reject the whole request.
    pub fn reorder_wishlist(&mut self, orders: &[WishlistOrder]) -> AppResult<()> {
        if let Some(unknown) = orders.iter().find(|o| !self.in_wishlist(&o.book_id)) {
            return Err(not_in_wishlist(&unknown.book_id));
        }

        let mut keyed: Vec<(u32, WishlistEntry)> = self
            .wishlist
            .drain(..)
            .enumerate()
            .map(|(index, entry)| {
                let position = orders
                    .iter()
                    .rev()
                    .find(|o| o.book_id == entry.book_id)
                    .map(|o| o.order)
                    .unwrap_or_else(|| u32::try_from(index).unwrap_or(u32::MAX));
                (position, entry)
            })
            .collect();
        keyed.sort_by_key(|(position, _)| *position);

        self.wishlist = keyed.into_iter().map(|(_, entry)| entry).collect();
        Ok(())
    }

    pub fn in_wishlist(&self, book_id: &str) -> bool {
        self.wishlist.iter().any(|e| e.book_id == book_id)
    }
}

fn not_in_wishlist(book_id: &str) -> AppError {
    AppError::NotFound(format!("Book {} is not in the wishlist", book_id))
}

fn non_blank(book_id: &str) -> AppResult<&str> {
    let trimmed = book_id.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(
            "Book id cannot be empty".to_string(),
        ));
    }
    Ok(trimmed)
}

/// A recommendation as shown to the reader
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecommendationView {
    #[serde(flatten)]
    pub book: Book,
    pub in_wishlist: bool,
}

/// Projects the current recommendation set through the session state.
///
/// Dismissed and already-rated books are hidden and the category filter is
/// applied. The set itself is left untouched so a later dismiss or filter
/// change never requires a refetch.
pub fn visible_recommendations(
    set: &RecommendationSet,
    session: &SessionState,
    category: Option<&str>,
) -> Vec<RecommendationView> {
    let category = category
        .map(str::trim)
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(ALL_CATEGORIES));

    set.iter()
        .filter(|book| !session.dismissed.contains(&book.id))
        .filter(|book| !session.ratings.contains(&book.id))
        .filter(|book| category.map_or(true, |c| book.matches_category(c)))
        .map(|book| RecommendationView {
            book: book.clone(),
            in_wishlist: session.in_wishlist(&book.id),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rating;

    fn book(id: &str, topics: &[&str]) -> Book {
        Book {
            id: id.to_string(),
            title: format!("Title {}", id),
            author: "Author".to_string(),
            description: None,
            topics: topics.iter().map(|t| t.to_string()).collect(),
            categories: vec![],
            average_rating: None,
            publication_year: None,
            page_count: None,
        }
    }

    fn ids(views: &[RecommendationView]) -> Vec<&str> {
        views.iter().map(|v| v.book.id.as_str()).collect()
    }

    #[test]
    fn test_dismissed_and_rated_books_are_hidden() {
        let set = vec![book("1", &[]), book("2", &[]), book("3", &[])];
        let mut session = SessionState::new();
        session.dismiss("1").unwrap();
        session.ratings.submit(Rating::new("3", 4).unwrap());

        let visible = visible_recommendations(&set, &session, None);
        assert_eq!(ids(&visible), vec!["2"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_category_filter() {
        let set = vec![
            book("1", &["Technical"]),
            book("2", &["Non-Technical"]),
            book("3", &["technical", "Databases"]),
        ];
        let session = SessionState::new();

        let visible = visible_recommendations(&set, &session, Some("Technical"));
        assert_eq!(ids(&visible), vec!["1", "3"]);

        let visible = visible_recommendations(&set, &session, Some("All"));
        assert_eq!(visible.len(), 3);
    }

    #[test]
    fn test_wishlist_flag_and_idempotent_add() {
        let set = vec![book("1", &[]), book("2", &[])];
        let mut session = SessionState::new();
        session.add_to_wishlist("2", Some("gift idea".to_string())).unwrap();
        session.add_to_wishlist("2", None).unwrap();
        assert_eq!(
            session.wishlist,
            vec![WishlistEntry {
                book_id: "2".to_string(),
                notes: Some("gift idea".to_string()),
            }]
        );

        let visible = visible_recommendations(&set, &session, None);
        assert!(!visible[0].in_wishlist);
        assert!(visible[1].in_wishlist);
    }

    #[test]
    fn test_remove_missing_wishlist_entry() {
        let mut session = SessionState::new();
        session.add_to_wishlist("1", None).unwrap();
        session.remove_from_wishlist("1").unwrap();
        assert!(matches!(
            session.remove_from_wishlist("1"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_blank_ids_rejected() {
        let mut session = SessionState::new();
        assert!(matches!(session.dismiss(" "), Err(AppError::InvalidInput(_))));
        assert!(matches!(
            session.add_to_wishlist("", None),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_readding_with_note_replaces_note() {
        let mut session = SessionState::new();
        session.add_to_wishlist("1", Some("later".to_string())).unwrap();
        session.add_to_wishlist("1", Some("next".to_string())).unwrap();
        assert_eq!(session.wishlist.len(), 1);
        assert_eq!(session.wishlist[0].notes.as_deref(), Some("next"));
    }

    #[test]
    fn test_dismissed_ids_are_listed_once() {
        let mut session = SessionState::new();
        session.dismiss("b").unwrap();
        session.dismiss("a").unwrap();
        session.dismiss(" b ").unwrap();
        assert_eq!(session.dismissed_ids(), vec!["a", "b"]);
    }

    fn wishlist_ids(session: &SessionState) -> Vec<&str> {
        session.wishlist.iter().map(|e| e.book_id.as_str()).collect()
    }

    fn order(book_id: &str, order: u32) -> WishlistOrder {
        WishlistOrder {
            book_id: book_id.to_string(),
            order,
        }
    }

    #[test]
    fn test_reorder_wishlist() {
        let mut session = SessionState::new();
        for id in ["a", "b", "c"] {
            session.add_to_wishlist(id, None).unwrap();
        }

        session
            .reorder_wishlist(&[order("c", 0), order("a", 1), order("b", 2)])
            .unwrap();
        assert_eq!(wishlist_ids(&session), vec!["c", "a", "b"]);

        // unlisted entries keep their index as position
        session.reorder_wishlist(&[order("b", 0)]).unwrap();
        assert_eq!(wishlist_ids(&session), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_reorder_with_unknown_id_changes_nothing() {
        let mut session = SessionState::new();
        session.add_to_wishlist("a", None).unwrap();
        session.add_to_wishlist("b", None).unwrap();

        let result = session.reorder_wishlist(&[order("b", 0), order("zzz", 1)]);
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(wishlist_ids(&session), vec!["a", "b"]);
    }
}
