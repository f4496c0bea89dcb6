//! SeaORM entity models
//!
//! One module per table in `migrations/`.

mod user;
mod paper;
mod author;
mod institution;
mod venue;
mod keyword;
mod research_area;
mod paper_author;
mod paper_keyword;
mod paper_research_area;
mod author_research_area;
mod citation;
mod comment;
mod library_entry;
mod author_follow;
mod venue_follow;
mod search_history;

pub use user::{
    Entity as UserEntity,
    Model as User,
    ActiveModel as UserActiveModel,
    Column as UserColumn,
};

pub use paper::{
    Entity as PaperEntity,
    Model as Paper,
    ActiveModel as PaperActiveModel,
    Column as PaperColumn,
};

pub use author::{
    Entity as AuthorEntity,
    Model as Author,
    ActiveModel as AuthorActiveModel,
    Column as AuthorColumn,
};

pub use institution::{
    Entity as InstitutionEntity,
    Model as Institution,
    ActiveModel as InstitutionActiveModel,
    Column as InstitutionColumn,
};

pub use venue::{
    Entity as VenueEntity,
    Model as Venue,
    ActiveModel as VenueActiveModel,
    Column as VenueColumn,
    VenueType,
};

pub use keyword::{
    Entity as KeywordEntity,
    Model as Keyword,
    ActiveModel as KeywordActiveModel,
    Column as KeywordColumn,
};

pub use research_area::{
    Entity as ResearchAreaEntity,
    Model as ResearchArea,
    ActiveModel as ResearchAreaActiveModel,
    Column as ResearchAreaColumn,
};

pub use paper_author::{
    Entity as PaperAuthorEntity,
    Model as PaperAuthor,
    ActiveModel as PaperAuthorActiveModel,
    Column as PaperAuthorColumn,
};

pub use paper_keyword::{
    Entity as PaperKeywordEntity,
    Model as PaperKeyword,
    ActiveModel as PaperKeywordActiveModel,
    Column as PaperKeywordColumn,
};

pub use paper_research_area::{
    Entity as PaperResearchAreaEntity,
    Model as PaperResearchArea,
    ActiveModel as PaperResearchAreaActiveModel,
    Column as PaperResearchAreaColumn,
};

pub use author_research_area::{
    Entity as AuthorResearchAreaEntity,
    Model as AuthorResearchArea,
    ActiveModel as AuthorResearchAreaActiveModel,
    Column as AuthorResearchAreaColumn,
};

pub use citation::{
    Entity as CitationEntity,
    Model as Citation,
    ActiveModel as CitationActiveModel,
    Column as CitationColumn,
};

pub use comment::{
    Entity as CommentEntity,
    Model as Comment,
    ActiveModel as CommentActiveModel,
    Column as CommentColumn,
};

pub use library_entry::{
    Entity as LibraryEntryEntity,
    Model as LibraryEntry,
    ActiveModel as LibraryEntryActiveModel,
    Column as LibraryEntryColumn,
};

pub use author_follow::{
    Entity as AuthorFollowEntity,
    Model as AuthorFollow,
    ActiveModel as AuthorFollowActiveModel,
    Column as AuthorFollowColumn,
};

pub use venue_follow::{
    Entity as VenueFollowEntity,
    Model as VenueFollow,
    ActiveModel as VenueFollowActiveModel,
    Column as VenueFollowColumn,
};

pub use search_history::{
    Entity as SearchHistoryEntity,
    Model as SearchHistory,
    ActiveModel as SearchHistoryActiveModel,
    Column as SearchHistoryColumn,
};
