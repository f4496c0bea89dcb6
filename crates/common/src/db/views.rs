//! Read views assembled by raw SQL
//!
//! Each struct here is one row shape of an aggregate query. Nested lists are
//! aggregated in SQL as JSON and decoded through the `FromJsonQueryResult`
//! wrappers below, so a single row carries a whole paper or author.

use sea_orm::{prelude::DateTimeWithTimeZone, FromJsonQueryResult, FromQueryResult};
use serde::{Deserialize, Serialize};

use super::models::LibraryEntry;

/// Author on a paper's byline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
    pub author_id: i32,
    pub name: String,
    pub order: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct AuthorRefs(pub Vec<AuthorRef>);

/// Byline entry on the paper detail page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BylineAuthor {
    pub author_id: i32,
    pub name: String,
    pub affiliation: Option<String>,
    pub orcid_id: Option<String>,
    pub order: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Byline(pub Vec<BylineAuthor>);

/// JSON array of strings (author names, keywords, area names)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct StringList(pub Vec<String>);

#[derive(Debug, FromQueryResult)]
pub(crate) struct CountRow {
    pub total: i64,
}

// ============================================================================
// Papers
// ============================================================================

/// Paper row of the listing and search views
#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct PaperSummary {
    pub paper_id: i32,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub year: Option<i32>,
    pub doi: Option<String>,
    pub pdf_url: Option<String>,
    pub citation_count: i32,
    pub created_at: DateTimeWithTimeZone,
    pub venue_name: Option<String>,
    pub venue_type: Option<String>,
    pub authors: AuthorRefs,
    pub keywords: StringList,
}

#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct PaperDetail {
    pub paper_id: i32,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub year: Option<i32>,
    pub doi: Option<String>,
    pub pdf_url: Option<String>,
    pub pages: Option<String>,
    pub venue_id: Option<i32>,
    pub citation_count: i32,
    pub created_at: DateTimeWithTimeZone,
    pub venue_name: Option<String>,
    pub venue_short_name: Option<String>,
    pub venue_type: Option<String>,
    pub publisher: Option<String>,
    pub authors: Byline,
    pub keywords: StringList,
    pub research_areas: StringList,
}

/// Neighbour of a paper in the citation graph
#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct CitationEntry {
    pub paper_id: i32,
    pub title: String,
    pub year: Option<i32>,
    pub citation_count: i32,
    pub citation_context: Option<String>,
    pub authors: StringList,
}

#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct Recommendation {
    pub paper_id: i32,
    pub title: String,
    pub year: Option<i32>,
    pub citation_count: i32,
    pub venue_name: Option<String>,
    pub authors: StringList,
    /// Keywords shared with the source paper
    pub common_keywords: i64,
    /// Whether a citation connects the candidate and the source
    pub citation_link: bool,
}

// ============================================================================
// Comments
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct CommentView {
    pub comment_id: i32,
    pub user_id: i32,
    pub paper_id: i32,
    pub parent_comment_id: Option<i32>,
    pub comment_text: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub user_name: String,
}

/// Comment placed in its thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadedComment {
    #[serde(flatten)]
    pub comment: CommentView,
    pub depth: usize,
}

/// Comment listed on its author's profile
#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct UserComment {
    pub comment_id: i32,
    pub paper_id: i32,
    pub parent_comment_id: Option<i32>,
    pub comment_text: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub paper_title: String,
}

// ============================================================================
// Authors
// ============================================================================

#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct AuthorSummary {
    pub author_id: i32,
    pub name: String,
    pub affiliation: Option<String>,
    pub email: Option<String>,
    pub orcid_id: Option<String>,
    pub h_index: i32,
    pub citation_count: i32,
    pub institution_name: Option<String>,
    pub institution_country: Option<String>,
    pub research_areas: StringList,
    pub paper_count: i64,
}

#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct AuthorDetail {
    pub author_id: i32,
    pub name: String,
    pub affiliation: Option<String>,
    pub email: Option<String>,
    pub orcid_id: Option<String>,
    pub research_interests: Option<String>,
    pub institution_id: Option<i32>,
    pub h_index: i32,
    pub citation_count: i32,
    pub created_at: DateTimeWithTimeZone,
    pub institution_name: Option<String>,
    pub institution_country: Option<String>,
    pub institution_website: Option<String>,
    pub research_areas: StringList,
    pub paper_count: i64,
}

/// Paper on an author's publication list
#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct AuthorPaper {
    pub paper_id: i32,
    pub title: String,
    pub year: Option<i32>,
    pub citation_count: i32,
    pub doi: Option<String>,
    pub venue_name: Option<String>,
    pub venue_type: Option<String>,
    pub author_order: i32,
    pub co_authors: AuthorRefs,
}

#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct CoAuthor {
    pub author_id: i32,
    pub name: String,
    pub affiliation: Option<String>,
    pub h_index: i32,
    pub collaboration_count: i64,
}

// ============================================================================
// Library
// ============================================================================

#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct LibraryItem {
    pub paper_id: i32,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub year: Option<i32>,
    pub citation_count: i32,
    pub venue_name: Option<String>,
    pub authors: StringList,
    pub added_at: DateTimeWithTimeZone,
    pub user_notes: Option<String>,
    pub rating: Option<i32>,
}

#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct LibraryStats {
    pub total_papers: i64,
    pub rated_papers: i64,
    pub average_rating: Option<f64>,
    pub research_areas: StringList,
}

/// Library row returned by the upsert, with whether it was new
#[derive(Debug, FromQueryResult)]
pub(crate) struct LibraryUpsertRow {
    pub user_id: i32,
    pub paper_id: i32,
    pub user_notes: Option<String>,
    pub rating: Option<i32>,
    pub added_at: DateTimeWithTimeZone,
    pub inserted: bool,
}

impl LibraryUpsertRow {
    pub(crate) fn into_parts(self) -> (LibraryEntry, bool) {
        let entry = LibraryEntry {
            user_id: self.user_id,
            paper_id: self.paper_id,
            user_notes: self.user_notes,
            rating: self.rating,
            added_at: self.added_at,
        };
        (entry, self.inserted)
    }
}

// ============================================================================
// Follows
// ============================================================================

#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct FollowedAuthor {
    pub author_id: i32,
    pub name: String,
    pub affiliation: Option<String>,
    pub h_index: i32,
    pub citation_count: i32,
    pub followed_at: DateTimeWithTimeZone,
    pub paper_count: i64,
}

#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct FollowedVenue {
    pub venue_id: i32,
    pub name: String,
    pub short_name: Option<String>,
    #[serde(rename = "type")]
    pub venue_type: String,
    pub impact_factor: Option<f64>,
    pub followed_at: DateTimeWithTimeZone,
    pub paper_count: i64,
}

/// Paper surfaced in the follow feed
#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct FeedItem {
    pub paper_id: i32,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub year: Option<i32>,
    pub citation_count: i32,
    pub created_at: DateTimeWithTimeZone,
    pub venue_name: Option<String>,
    pub authors: StringList,
    /// "author" when a followed author wrote it, otherwise "venue"
    pub follow_type: String,
}
