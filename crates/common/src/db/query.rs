//! Typed predicate builder for the paper and author read views
//!
//! Filters are turned into [`PaperPredicate`]/[`AuthorPredicate`] values,
//! rendered once into a [`Conditions`] block, and that block feeds both the
//! `COUNT(*)` statement and the page statement. Nothing outside this module
//! concatenates user input into SQL; every value travels as a bound parameter.

use sea_orm::{DbBackend, Statement, Value};
use serde::Deserialize;

use super::pagination::PageRequest;

/// Aggregated byline of `p`, in author order
pub(crate) const PAPER_AUTHORS_JSON: &str = "COALESCE((
        SELECT json_agg(json_build_object(
                   'author_id', a.author_id,
                   'name', a.name,
                   'order', pa.author_order
               ) ORDER BY pa.author_order)
        FROM paper_authors pa
        JOIN authors a ON a.author_id = pa.author_id
        WHERE pa.paper_id = p.paper_id
    ), '[]'::json)";

/// Author names of `p`, in author order
pub(crate) const PAPER_AUTHOR_NAMES_JSON: &str = "COALESCE((
        SELECT json_agg(a.name ORDER BY pa.author_order)
        FROM paper_authors pa
        JOIN authors a ON a.author_id = pa.author_id
        WHERE pa.paper_id = p.paper_id
    ), '[]'::json)";

pub(crate) const PAPER_KEYWORDS_JSON: &str = "COALESCE((
        SELECT json_agg(k.keyword ORDER BY k.keyword)
        FROM paper_keywords pk
        JOIN keywords k ON k.keyword_id = pk.keyword_id
        WHERE pk.paper_id = p.paper_id
    ), '[]'::json)";

pub(crate) const PAPER_AREAS_JSON: &str = "COALESCE((
        SELECT json_agg(ra.area_name ORDER BY ra.area_name)
        FROM paper_research_areas pra
        JOIN research_areas ra ON ra.area_id = pra.area_id
        WHERE pra.paper_id = p.paper_id
    ), '[]'::json)";

pub(crate) const AUTHOR_AREAS_JSON: &str = "COALESCE((
        SELECT json_agg(ra.area_name ORDER BY ra.area_name)
        FROM author_research_areas ara
        JOIN research_areas ra ON ra.area_id = ara.area_id
        WHERE ara.author_id = a.author_id
    ), '[]'::json)";

pub(crate) const AUTHOR_PAPER_COUNT: &str =
    "(SELECT COUNT(*) FROM paper_authors pc WHERE pc.author_id = a.author_id)";

/// Escape `%`, `_` and `\` so user text matches literally under (I)LIKE
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// `%input%` with the input escaped
pub fn contains_pattern(input: &str) -> String {
    format!("%{}%", escape_like(input))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// A WHERE block under construction: clauses joined with AND, plus the
/// positional values they reference.
#[derive(Debug, Default, Clone)]
pub struct Conditions {
    clauses: Vec<String>,
    values: Vec<Value>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value and return its placeholder (`$n`)
    pub fn bind(&mut self, value: impl Into<Value>) -> String {
        self.values.push(value.into());
        format!("${}", self.values.len())
    }

    pub fn push(&mut self, clause: impl Into<String>) {
        self.clauses.push(clause.into());
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// `WHERE ...`, or nothing when there are no clauses
    pub fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    fn statement(&self, sql: String) -> Statement {
        Statement::from_sql_and_values(DbBackend::Postgres, sql, self.values.clone())
    }
}

// ============================================================================
// Papers
// ============================================================================

/// One search filter on papers (alias `p`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaperPredicate {
    /// Full text on title and abstract, or a title substring
    Text(String),
    AuthorName(String),
    VenueName(String),
    Year(i32),
    Keyword(String),
    ResearchArea(String),
}

impl PaperPredicate {
    fn render(&self, conditions: &mut Conditions) {
        let clause = match self {
            PaperPredicate::Text(text) => {
                let query = conditions.bind(text.clone());
                let like = conditions.bind(contains_pattern(text));
                format!(
                    "(to_tsvector('english', p.title) @@ plainto_tsquery('english', {query}) \
                     OR to_tsvector('english', COALESCE(p.abstract, '')) @@ plainto_tsquery('english', {query}) \
                     OR p.title ILIKE {like})"
                )
            }
            PaperPredicate::AuthorName(name) => {
                let like = conditions.bind(contains_pattern(name));
                format!(
                    "EXISTS (SELECT 1 FROM paper_authors fpa \
                     JOIN authors fa ON fa.author_id = fpa.author_id \
                     WHERE fpa.paper_id = p.paper_id AND fa.name ILIKE {like})"
                )
            }
            PaperPredicate::VenueName(name) => {
                let like = conditions.bind(contains_pattern(name));
                format!(
                    "EXISTS (SELECT 1 FROM venues fv \
                     WHERE fv.venue_id = p.venue_id AND fv.name ILIKE {like})"
                )
            }
            PaperPredicate::Year(year) => {
                let year = conditions.bind(*year);
                format!("p.year = {year}")
            }
            PaperPredicate::Keyword(keyword) => {
                let like = conditions.bind(contains_pattern(keyword));
                format!(
                    "EXISTS (SELECT 1 FROM paper_keywords fpk \
                     JOIN keywords fk ON fk.keyword_id = fpk.keyword_id \
                     WHERE fpk.paper_id = p.paper_id AND fk.keyword ILIKE {like})"
                )
            }
            PaperPredicate::ResearchArea(area) => {
                let like = conditions.bind(contains_pattern(area));
                format!(
                    "EXISTS (SELECT 1 FROM paper_research_areas fpra \
                     JOIN research_areas fra ON fra.area_id = fpra.area_id \
                     WHERE fpra.paper_id = p.paper_id AND fra.area_name ILIKE {like})"
                )
            }
        };
        conditions.push(clause);
    }
}

/// Paper search filters as received; blank strings count as absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaperFilter {
    pub q: Option<String>,
    pub author: Option<String>,
    pub venue: Option<String>,
    pub year: Option<i32>,
    pub keyword: Option<String>,
    pub area: Option<String>,
}

impl PaperFilter {
    pub fn predicates(&self) -> Vec<PaperPredicate> {
        let mut predicates = Vec::new();
        if let Some(q) = non_blank(&self.q) {
            predicates.push(PaperPredicate::Text(q.to_string()));
        }
        if let Some(author) = non_blank(&self.author) {
            predicates.push(PaperPredicate::AuthorName(author.to_string()));
        }
        if let Some(venue) = non_blank(&self.venue) {
            predicates.push(PaperPredicate::VenueName(venue.to_string()));
        }
        if let Some(year) = self.year {
            predicates.push(PaperPredicate::Year(year));
        }
        if let Some(keyword) = non_blank(&self.keyword) {
            predicates.push(PaperPredicate::Keyword(keyword.to_string()));
        }
        if let Some(area) = non_blank(&self.area) {
            predicates.push(PaperPredicate::ResearchArea(area.to_string()));
        }
        predicates
    }

    /// The text query worth recording in search history
    pub fn text_query(&self) -> Option<&str> {
        non_blank(&self.q)
    }

    pub fn conditions(&self) -> Conditions {
        let mut conditions = Conditions::new();
        for predicate in self.predicates() {
            predicate.render(&mut conditions);
        }
        conditions
    }
}

/// Paper ordering; `paper_id` always breaks ties
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSort {
    /// Most cited first, then newest
    #[default]
    Relevance,
    Citations,
    Year,
    Title,
}

impl PaperSort {
    pub fn order_by(&self) -> &'static str {
        match self {
            PaperSort::Relevance => "p.citation_count DESC, p.year DESC NULLS LAST, p.paper_id ASC",
            PaperSort::Citations => "p.citation_count DESC, p.paper_id ASC",
            PaperSort::Year => "p.year DESC NULLS LAST, p.paper_id ASC",
            PaperSort::Title => "p.title ASC, p.paper_id ASC",
        }
    }
}

/// Count and page statements for a paper listing or search
pub fn paper_search_statements(
    filter: &PaperFilter,
    sort: PaperSort,
    page: PageRequest,
) -> (Statement, Statement) {
    let mut conditions = filter.conditions();
    let where_sql = conditions.where_sql();

    let count = conditions.statement(format!(
        "SELECT COUNT(*) AS total FROM papers p {where_sql}"
    ));

    let limit = conditions.bind(page.limit() as i64);
    let offset = conditions.bind(page.offset() as i64);

    let data = conditions.statement(format!(
        r#"
        SELECT p.paper_id, p.title, p.abstract AS abstract_text, p.year, p.doi,
               p.pdf_url, p.citation_count, p.created_at,
               v.name AS venue_name, v.type AS venue_type,
               {PAPER_AUTHORS_JSON} AS authors,
               {PAPER_KEYWORDS_JSON} AS keywords
        FROM papers p
        LEFT JOIN venues v ON v.venue_id = p.venue_id
        {where_sql}
        ORDER BY {order}
        LIMIT {limit} OFFSET {offset}
        "#,
        order = sort.order_by(),
    ));

    (count, data)
}

// ============================================================================
// Authors
// ============================================================================

/// One search filter on authors (alias `a`, institution alias `i`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorPredicate {
    Name(String),
    Institution(String),
    ResearchArea(String),
}

impl AuthorPredicate {
    fn render(&self, conditions: &mut Conditions) {
        let clause = match self {
            AuthorPredicate::Name(name) => {
                format!("a.name ILIKE {}", conditions.bind(contains_pattern(name)))
            }
            AuthorPredicate::Institution(name) => {
                format!("i.name ILIKE {}", conditions.bind(contains_pattern(name)))
            }
            AuthorPredicate::ResearchArea(area) => {
                let like = conditions.bind(contains_pattern(area));
                format!(
                    "EXISTS (SELECT 1 FROM author_research_areas fara \
                     JOIN research_areas fra ON fra.area_id = fara.area_id \
                     WHERE fara.author_id = a.author_id AND fra.area_name ILIKE {like})"
                )
            }
        };
        conditions.push(clause);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorFilter {
    pub q: Option<String>,
    pub institution: Option<String>,
    pub area: Option<String>,
}

impl AuthorFilter {
    pub fn predicates(&self) -> Vec<AuthorPredicate> {
        let mut predicates = Vec::new();
        if let Some(q) = non_blank(&self.q) {
            predicates.push(AuthorPredicate::Name(q.to_string()));
        }
        if let Some(institution) = non_blank(&self.institution) {
            predicates.push(AuthorPredicate::Institution(institution.to_string()));
        }
        if let Some(area) = non_blank(&self.area) {
            predicates.push(AuthorPredicate::ResearchArea(area.to_string()));
        }
        predicates
    }

    pub fn conditions(&self) -> Conditions {
        let mut conditions = Conditions::new();
        for predicate in self.predicates() {
            predicate.render(&mut conditions);
        }
        conditions
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorSort {
    #[default]
    Citations,
    #[serde(rename = "h-index")]
    HIndex,
    Name,
    Papers,
}

impl AuthorSort {
    pub fn order_by(&self) -> &'static str {
        match self {
            AuthorSort::Citations => "a.citation_count DESC, a.author_id ASC",
            AuthorSort::HIndex => "a.h_index DESC, a.author_id ASC",
            AuthorSort::Name => "a.name ASC, a.author_id ASC",
            AuthorSort::Papers => "paper_count DESC, a.author_id ASC",
        }
    }
}

/// Count and page statements for an author listing or search
pub fn author_search_statements(
    filter: &AuthorFilter,
    sort: AuthorSort,
    page: PageRequest,
) -> (Statement, Statement) {
    let mut conditions = filter.conditions();
    let where_sql = conditions.where_sql();

    let count = conditions.statement(format!(
        "SELECT COUNT(*) AS total FROM authors a \
         LEFT JOIN institutions i ON i.institution_id = a.institution_id {where_sql}"
    ));

    let limit = conditions.bind(page.limit() as i64);
    let offset = conditions.bind(page.offset() as i64);

    let data = conditions.statement(format!(
        r#"
        SELECT a.author_id, a.name, a.affiliation, a.email, a.orcid_id,
               a.h_index, a.citation_count,
               i.name AS institution_name, i.country AS institution_country,
               {AUTHOR_AREAS_JSON} AS research_areas,
               {AUTHOR_PAPER_COUNT} AS paper_count
        FROM authors a
        LEFT JOIN institutions i ON i.institution_id = a.institution_id
        {where_sql}
        ORDER BY {order}
        LIMIT {limit} OFFSET {offset}
        "#,
        order = sort.order_by(),
    ));

    (count, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> PaperFilter {
        PaperFilter::default()
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("100%_done\\"), "100\\%\\_done\\\\");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
    }

    #[test]
    fn test_blank_filters_are_absent() {
        let f = PaperFilter {
            q: Some("   ".into()),
            author: Some(String::new()),
            ..filter()
        };
        assert!(f.predicates().is_empty());
        assert!(f.conditions().is_empty());
        assert_eq!(f.conditions().where_sql(), "");
        assert_eq!(f.text_query(), None);
    }

    #[test]
    fn test_predicates_in_fixed_order() {
        let f = PaperFilter {
            q: Some(" graph ".into()),
            year: Some(2020),
            area: Some("Databases".into()),
            ..filter()
        };
        assert_eq!(
            f.predicates(),
            vec![
                PaperPredicate::Text("graph".into()),
                PaperPredicate::Year(2020),
                PaperPredicate::ResearchArea("Databases".into()),
            ]
        );
    }

    #[test]
    fn test_text_predicate_binds_query_and_pattern() {
        let f = PaperFilter { q: Some("neural nets".into()), ..filter() };
        let conditions = f.conditions();

        let sql = conditions.where_sql();
        assert!(sql.contains("plainto_tsquery('english', $1)"));
        assert!(sql.contains("COALESCE(p.abstract, '')"));
        assert!(sql.contains("p.title ILIKE $2"));
        assert_eq!(
            conditions.values(),
            &[Value::from("neural nets".to_string()), Value::from("%neural nets%".to_string())]
        );
    }

    #[test]
    fn test_placeholders_are_sequential() {
        let f = PaperFilter {
            author: Some("Smith".into()),
            venue: Some("VLDB".into()),
            year: Some(2019),
            keyword: Some("index".into()),
            ..filter()
        };
        let conditions = f.conditions();
        let sql = conditions.where_sql();

        assert!(sql.starts_with("WHERE "));
        assert!(sql.matches(" AND ").count() >= 3);
        for n in 1..=4 {
            assert!(sql.contains(&format!("${n}")));
        }
        assert!(!sql.contains("$5"));
        assert_eq!(conditions.values()[2], Value::from(2019));
    }

    #[test]
    fn test_count_and_data_share_conditions() {
        let f = PaperFilter { venue: Some("SIG%".into()), ..filter() };
        let page = PageRequest::new(Some(3), Some(10)).unwrap();
        let (count, data) = paper_search_statements(&f, PaperSort::Title, page);

        assert!(count.sql.contains("fv.name ILIKE $1"));
        assert!(data.sql.contains("fv.name ILIKE $1"));
        assert!(data.sql.contains("LIMIT $2 OFFSET $3"));
        assert!(data.sql.contains("ORDER BY p.title ASC, p.paper_id ASC"));

        let count_values = count.values.unwrap().0;
        let data_values = data.values.unwrap().0;
        assert_eq!(count_values, vec![Value::from("%SIG\\%%".to_string())]);
        assert_eq!(&data_values[..1], &count_values[..]);
        assert_eq!(data_values[1], Value::from(10i64));
        assert_eq!(data_values[2], Value::from(20i64));
    }

    #[test]
    fn test_listing_equals_empty_search() {
        let page = PageRequest::default();
        let blank = PaperFilter { q: Some(String::new()), ..filter() };
        let (list_count, list_data) = paper_search_statements(&filter(), PaperSort::default(), page);
        let (search_count, search_data) = paper_search_statements(&blank, PaperSort::default(), page);

        assert_eq!(list_count.sql, search_count.sql);
        assert_eq!(list_data.sql, search_data.sql);
        assert_eq!(list_data.values, search_data.values);
    }

    #[test]
    fn test_sort_parsing() {
        let sort: PaperSort = serde_json::from_str("\"citations\"").unwrap();
        assert_eq!(sort, PaperSort::Citations);
        assert!(serde_json::from_str::<PaperSort>("\"popularity\"").is_err());

        let sort: AuthorSort = serde_json::from_str("\"h-index\"").unwrap();
        assert_eq!(sort, AuthorSort::HIndex);
        assert!(PaperSort::default().order_by().starts_with("p.citation_count DESC, p.year DESC"));
    }

    #[test]
    fn test_author_statements() {
        let f = AuthorFilter {
            q: Some("Lee".into()),
            institution: Some("MIT".into()),
            area: None,
        };
        let (count, data) = author_search_statements(&f, AuthorSort::Papers, PageRequest::default());

        assert!(count.sql.contains("LEFT JOIN institutions i"));
        assert!(count.sql.contains("a.name ILIKE $1 AND i.name ILIKE $2"));
        assert!(data.sql.contains("ORDER BY paper_count DESC"));
        assert!(data.sql.contains("LIMIT $3 OFFSET $4"));
    }
}
