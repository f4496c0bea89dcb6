//! Demo dataset
//!
//! Rows reference each other by position in these tables. Generated keys are
//! collected while inserting, so the dataset loads into a non-empty database.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, FixedOffset, Utc};
use scholardemon_common::{
    auth::{hash_password, Role},
    db::models::*,
};
use sea_orm::{ActiveModelTrait, DatabaseTransaction, EntityTrait, Set};
use tracing::debug;

const DEMO_PASSWORD: &str = "password123";

struct UserFixture {
    name: &'static str,
    email: &'static str,
    role: Role,
    verified: bool,
}

const USERS: &[UserFixture] = &[
    UserFixture { name: "John Doe", email: "john@example.com", role: Role::Admin, verified: true },
    UserFixture { name: "Jane Smith", email: "jane@example.com", role: Role::User, verified: true },
    UserFixture { name: "Alice Johnson", email: "alice@example.com", role: Role::User, verified: true },
    UserFixture { name: "Bob Wilson", email: "bob@example.com", role: Role::Author, verified: true },
    UserFixture { name: "Carol Brown", email: "carol@example.com", role: Role::User, verified: false },
];

/// (name, country, website, type)
const INSTITUTIONS: &[(&str, &str, &str, &str)] = &[
    ("Massachusetts Institute of Technology", "USA", "https://www.mit.edu", "university"),
    ("Stanford University", "USA", "https://www.stanford.edu", "university"),
    ("University of Cambridge", "UK", "https://www.cam.ac.uk", "university"),
    ("Max Planck Institute for Intelligent Systems", "Germany", "https://is.mpg.de", "research_institute"),
    ("Google Research", "USA", "https://research.google", "industry"),
    ("ETH Zurich", "Switzerland", "https://ethz.ch", "university"),
    ("University of Toronto", "Canada", "https://www.utoronto.ca", "university"),
];

/// (name, description)
const RESEARCH_AREAS: &[(&str, &str)] = &[
    ("Machine Learning", "Algorithms that learn from data"),
    ("Deep Learning", "Neural networks with many layers"),
    ("Computer Vision", "Understanding images and video"),
    ("Natural Language Processing", "Understanding and generating human language"),
    ("Generative Models", "Models that learn to produce new samples"),
    ("Optimization", "Training procedures and numerical methods"),
];

struct AuthorFixture {
    name: &'static str,
    institution: usize,
    interests: &'static str,
    h_index: i32,
    citation_count: i32,
    areas: &'static [usize],
}

const AUTHORS: &[AuthorFixture] = &[
    AuthorFixture { name: "Ashish Vaswani", institution: 4, interests: "Attention mechanisms, sequence models", h_index: 25, citation_count: 120_000, areas: &[1, 3] },
    AuthorFixture { name: "Kaiming He", institution: 0, interests: "Visual recognition, residual learning", h_index: 70, citation_count: 500_000, areas: &[1, 2] },
    AuthorFixture { name: "Jacob Devlin", institution: 4, interests: "Language model pre-training", h_index: 20, citation_count: 110_000, areas: &[3] },
    AuthorFixture { name: "Ian Goodfellow", institution: 4, interests: "Adversarial training, generative models", h_index: 60, citation_count: 300_000, areas: &[0, 4] },
    AuthorFixture { name: "Geoffrey Hinton", institution: 6, interests: "Neural networks, representation learning", h_index: 180, citation_count: 800_000, areas: &[0, 1] },
    AuthorFixture { name: "Diederik Kingma", institution: 4, interests: "Variational inference, stochastic optimization", h_index: 30, citation_count: 250_000, areas: &[4, 5] },
    AuthorFixture { name: "Sergey Ioffe", institution: 4, interests: "Normalization, training deep networks", h_index: 25, citation_count: 90_000, areas: &[1, 5] },
    AuthorFixture { name: "Joseph Redmon", institution: 5, interests: "Real-time object detection", h_index: 15, citation_count: 80_000, areas: &[2] },
    AuthorFixture { name: "Fei-Fei Li", institution: 1, interests: "Large-scale visual datasets", h_index: 130, citation_count: 280_000, areas: &[2] },
    AuthorFixture { name: "Bernhard Schölkopf", institution: 3, interests: "Kernel methods, causal inference", h_index: 150, citation_count: 200_000, areas: &[0] },
];

/// (name, short name, type, publisher, impact factor, issn)
const VENUES: &[(&str, &str, VenueType, &str, Option<f64>, Option<&str>)] = &[
    ("Neural Information Processing Systems", "NeurIPS", VenueType::Conference, "Curran Associates", None, None),
    ("International Conference on Machine Learning", "ICML", VenueType::Conference, "PMLR", None, None),
    ("Conference on Computer Vision and Pattern Recognition", "CVPR", VenueType::Conference, "IEEE", None, None),
    ("Journal of Machine Learning Research", "JMLR", VenueType::Journal, "JMLR Inc.", Some(6.0), Some("1532-4435")),
    ("Annual Meeting of the Association for Computational Linguistics", "ACL", VenueType::Conference, "ACL", None, None),
    ("International Conference on Learning Representations", "ICLR", VenueType::Conference, "OpenReview", None, None),
    ("IEEE Transactions on Pattern Analysis and Machine Intelligence", "TPAMI", VenueType::Journal, "IEEE", Some(23.6), Some("0162-8828")),
];

const KEYWORDS: &[&str] = &[
    "transformer",
    "attention",
    "convolutional neural network",
    "residual learning",
    "image classification",
    "object detection",
    "language model",
    "pre-training",
    "generative adversarial network",
    "variational inference",
    "stochastic optimization",
    "regularization",
    "normalization",
    "dataset",
];

struct PaperFixture {
    title: &'static str,
    abstract_text: &'static str,
    year: i32,
    doi: Option<&'static str>,
    pages: Option<&'static str>,
    venue: usize,
    citation_count: i32,
    authors: &'static [usize],
    keywords: &'static [usize],
    areas: &'static [usize],
}

const PAPERS: &[PaperFixture] = &[
    PaperFixture {
        title: "ImageNet: A Large-Scale Hierarchical Image Database",
        abstract_text: "We introduce a database of millions of annotated images organized by the WordNet hierarchy to support object recognition research.",
        year: 2009,
        doi: Some("10.1109/CVPR.2009.5206848"),
        pages: Some("248-255"),
        venue: 2,
        citation_count: 60_000,
        authors: &[8],
        keywords: &[13, 4],
        areas: &[2],
    },
    PaperFixture {
        title: "ImageNet Classification with Deep Convolutional Neural Networks",
        abstract_text: "We trained a large deep convolutional neural network to classify the ImageNet images into 1000 classes, substantially improving the state of the art.",
        year: 2012,
        doi: None,
        pages: Some("1097-1105"),
        venue: 0,
        citation_count: 120_000,
        authors: &[4],
        keywords: &[2, 4],
        areas: &[1, 2],
    },
    PaperFixture {
        title: "Auto-Encoding Variational Bayes",
        abstract_text: "We introduce a stochastic variational inference and learning algorithm that scales to large datasets and works with intractable posteriors.",
        year: 2014,
        doi: None,
        pages: None,
        venue: 5,
        citation_count: 35_000,
        authors: &[5],
        keywords: &[9],
        areas: &[0, 4],
    },
    PaperFixture {
        title: "Generative Adversarial Nets",
        abstract_text: "We propose a framework for estimating generative models via an adversarial process between a generator and a discriminator.",
        year: 2014,
        doi: None,
        pages: Some("2672-2680"),
        venue: 0,
        citation_count: 70_000,
        authors: &[3],
        keywords: &[8],
        areas: &[1, 4],
    },
    PaperFixture {
        title: "Dropout: A Simple Way to Prevent Neural Networks from Overfitting",
        abstract_text: "Randomly dropping units during training prevents co-adaptation and significantly reduces overfitting in deep networks.",
        year: 2014,
        doi: None,
        pages: Some("1929-1958"),
        venue: 3,
        citation_count: 45_000,
        authors: &[4],
        keywords: &[11],
        areas: &[0, 1],
    },
    PaperFixture {
        title: "Adam: A Method for Stochastic Optimization",
        abstract_text: "We introduce an algorithm for first-order gradient-based optimization based on adaptive estimates of lower-order moments.",
        year: 2015,
        doi: None,
        pages: None,
        venue: 5,
        citation_count: 180_000,
        authors: &[5],
        keywords: &[10],
        areas: &[5],
    },
    PaperFixture {
        title: "Batch Normalization: Accelerating Deep Network Training by Reducing Internal Covariate Shift",
        abstract_text: "Normalizing layer inputs for each mini-batch allows much higher learning rates and acts as a regularizer.",
        year: 2015,
        doi: None,
        pages: Some("448-456"),
        venue: 1,
        citation_count: 50_000,
        authors: &[6],
        keywords: &[12, 11],
        areas: &[1, 5],
    },
    PaperFixture {
        title: "Deep Residual Learning for Image Recognition",
        abstract_text: "We present a residual learning framework to ease the training of networks that are substantially deeper than those used previously.",
        year: 2016,
        doi: Some("10.1109/CVPR.2016.90"),
        pages: Some("770-778"),
        venue: 2,
        citation_count: 200_000,
        authors: &[1],
        keywords: &[3, 2, 4],
        areas: &[1, 2],
    },
    PaperFixture {
        title: "You Only Look Once: Unified, Real-Time Object Detection",
        abstract_text: "We frame object detection as a single regression problem from image pixels to bounding boxes and class probabilities.",
        year: 2016,
        doi: Some("10.1109/CVPR.2016.91"),
        pages: Some("779-788"),
        venue: 2,
        citation_count: 40_000,
        authors: &[7],
        keywords: &[5, 2],
        areas: &[2],
    },
    PaperFixture {
        title: "Attention Is All You Need",
        abstract_text: "We propose the Transformer, a network architecture based solely on attention mechanisms, dispensing with recurrence and convolutions entirely.",
        year: 2017,
        doi: None,
        pages: Some("5998-6008"),
        venue: 0,
        citation_count: 150_000,
        authors: &[0],
        keywords: &[0, 1],
        areas: &[1, 3],
    },
    PaperFixture {
        title: "BERT: Pre-training of Deep Bidirectional Transformers for Language Understanding",
        abstract_text: "We introduce a language representation model pre-trained on unlabeled text by jointly conditioning on left and right context.",
        year: 2019,
        doi: Some("10.18653/v1/N19-1423"),
        pages: Some("4171-4186"),
        venue: 4,
        citation_count: 110_000,
        authors: &[2],
        keywords: &[0, 6, 7],
        areas: &[3],
    },
    PaperFixture {
        title: "Kernel Methods for Causal Discovery in Deep Representations",
        abstract_text: "We study how kernel-based independence tests can identify causal structure in features learned by deep networks.",
        year: 2020,
        doi: None,
        pages: Some("1-18"),
        venue: 6,
        citation_count: 120,
        authors: &[9, 4],
        keywords: &[11, 9],
        areas: &[0],
    },
];

/// (citing paper, cited paper, context)
const CITATIONS: &[(usize, usize, &str)] = &[
    (1, 0, "Trained on the ImageNet dataset"),
    (7, 1, "Deep convolutional networks for image classification"),
    (7, 6, "Batch normalization after each convolution"),
    (7, 0, "Evaluated on ImageNet"),
    (8, 1, "Convolutional backbone"),
    (8, 4, "Dropout to avoid overfitting"),
    (6, 4, "Batch normalization reduces the need for dropout"),
    (9, 5, "Trained with the Adam optimizer"),
    (9, 7, "Residual connections around each sub-layer"),
    (9, 4, "Dropout applied to sub-layer outputs"),
    (10, 9, "Built on the Transformer encoder"),
    (10, 5, "Fine-tuned with Adam"),
    (3, 2, "Related latent variable approach"),
    (11, 2, "Variational bounds on representation quality"),
    (11, 7, "Residual features under analysis"),
];

/// (user, paper, notes, rating)
const LIBRARY: &[(usize, usize, Option<&str>, Option<i32>)] = &[
    (1, 9, Some("Foundational for modern NLP"), Some(5)),
    (1, 10, Some("Read alongside the Transformer paper"), Some(5)),
    (1, 5, None, Some(4)),
    (2, 7, Some("Skip connections explained clearly"), Some(5)),
    (2, 8, None, None),
    (2, 0, Some("Dataset reference"), Some(3)),
    (3, 3, Some("Revisit the minimax proof"), Some(4)),
    (3, 2, None, Some(5)),
    (4, 1, Some("Classic"), None),
];

/// (user, author)
const AUTHOR_FOLLOWS: &[(usize, usize)] = &[(1, 0), (1, 2), (2, 1), (2, 7), (2, 8), (3, 3), (3, 5), (4, 4)];

/// (user, venue)
const VENUE_FOLLOWS: &[(usize, usize)] = &[(1, 0), (1, 4), (2, 2), (3, 0), (3, 5), (4, 3)];

/// (user, paper, parent comment, text)
const COMMENTS: &[(usize, usize, Option<usize>, &str)] = &[
    (1, 9, None, "The multi-head attention figure is still the clearest explanation around."),
    (2, 9, Some(0), "Agreed. The positional encoding section deserves the same attention."),
    (3, 9, Some(1), "Learned positional embeddings work about as well in practice."),
    (2, 7, None, "Identity shortcuts make very deep networks trainable without extra parameters."),
    (4, 7, Some(3), "Does the bottleneck design change that argument?"),
    (3, 3, None, "Mode collapse is mentioned only briefly here."),
    (1, 3, Some(5), "Later work addresses it directly, but the seed of the idea is in this paper."),
    (2, 5, None, "Bias correction for the moment estimates is easy to overlook."),
];

/// (user, query)
const SEARCHES: &[(usize, &str)] = &[
    (1, "transformer"),
    (1, "attention mechanism"),
    (1, "BERT"),
    (2, "residual networks"),
    (2, "object detection"),
    (3, "generative adversarial"),
    (3, "variational inference"),
    (4, "dropout"),
];

/// Row counts reported after a successful seed
#[derive(Debug, Default)]
pub struct SeedSummary {
    pub users: usize,
    pub authors: usize,
    pub papers: usize,
    pub citations: usize,
    pub comments: usize,
}

fn id(ids: &[i32], index: usize, table: &str) -> Result<i32> {
    ids.get(index)
        .copied()
        .ok_or_else(|| anyhow!("{table} fixture {index} does not exist"))
}

fn minutes_ago(now: DateTime<FixedOffset>, minutes: usize) -> DateTime<FixedOffset> {
    now - Duration::minutes(minutes as i64)
}

/// Insert the whole dataset through `txn`
pub async fn seed(txn: &DatabaseTransaction) -> Result<SeedSummary> {
    let now = Utc::now().fixed_offset();

    let password_hash = hash_password(DEMO_PASSWORD)?;
    let mut users = Vec::with_capacity(USERS.len());
    for user in USERS {
        let model = UserActiveModel {
            name: Set(user.name.to_string()),
            email: Set(user.email.to_string()),
            password_hash: Set(password_hash.clone()),
            role: Set(user.role.as_str().to_string()),
            is_verified: Set(user.verified),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        users.push(model.user_id);
    }
    debug!(count = users.len(), "Inserted users");

    let mut institutions = Vec::with_capacity(INSTITUTIONS.len());
    for (name, country, website, kind) in INSTITUTIONS {
        let model = InstitutionActiveModel {
            name: Set(name.to_string()),
            country: Set(Some(country.to_string())),
            website: Set(Some(website.to_string())),
            institution_type: Set(Some(kind.to_string())),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        institutions.push(model.institution_id);
    }

    let mut areas = Vec::with_capacity(RESEARCH_AREAS.len());
    for (name, description) in RESEARCH_AREAS {
        let model = ResearchAreaActiveModel {
            area_name: Set(name.to_string()),
            description: Set(Some(description.to_string())),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        areas.push(model.area_id);
    }

    let mut authors = Vec::with_capacity(AUTHORS.len());
    let mut author_areas = Vec::new();
    for author in AUTHORS {
        let institution = id(&institutions, author.institution, "institution")?;
        let affiliation = INSTITUTIONS.get(author.institution).map(|i| i.0.to_string());
        let model = AuthorActiveModel {
            name: Set(author.name.to_string()),
            affiliation: Set(affiliation),
            research_interests: Set(Some(author.interests.to_string())),
            institution_id: Set(Some(institution)),
            h_index: Set(author.h_index),
            citation_count: Set(author.citation_count),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        for area in author.areas {
            author_areas.push(AuthorResearchAreaActiveModel {
                author_id: Set(model.author_id),
                area_id: Set(id(&areas, *area, "research area")?),
            });
        }
        authors.push(model.author_id);
    }
    AuthorResearchAreaEntity::insert_many(author_areas)
        .exec_without_returning(txn)
        .await?;
    debug!(count = authors.len(), "Inserted authors");

    let mut venues = Vec::with_capacity(VENUES.len());
    for (name, short_name, kind, publisher, impact_factor, issn) in VENUES {
        let model = VenueActiveModel {
            name: Set(name.to_string()),
            short_name: Set(Some(short_name.to_string())),
            venue_type: Set((*kind).into()),
            publisher: Set(Some(publisher.to_string())),
            impact_factor: Set(*impact_factor),
            issn_or_isbn: Set(issn.map(str::to_string)),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        venues.push(model.venue_id);
    }

    let mut keywords = Vec::with_capacity(KEYWORDS.len());
    for keyword in KEYWORDS {
        let model = KeywordActiveModel {
            keyword: Set(keyword.to_string()),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        keywords.push(model.keyword_id);
    }

    let mut papers = Vec::with_capacity(PAPERS.len());
    let mut paper_authors = Vec::new();
    let mut paper_keywords = Vec::new();
    let mut paper_areas = Vec::new();
    for (i, paper) in PAPERS.iter().enumerate() {
        // Older papers get older rows so the feed order follows publication order.
        let model = PaperActiveModel {
            title: Set(paper.title.to_string()),
            abstract_text: Set(Some(paper.abstract_text.to_string())),
            year: Set(Some(paper.year)),
            doi: Set(paper.doi.map(str::to_string)),
            pages: Set(paper.pages.map(str::to_string)),
            venue_id: Set(Some(id(&venues, paper.venue, "venue")?)),
            citation_count: Set(paper.citation_count),
            created_at: Set(minutes_ago(now, PAPERS.len() - i)),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        for (order, author) in paper.authors.iter().enumerate() {
            paper_authors.push(PaperAuthorActiveModel {
                paper_id: Set(model.paper_id),
                author_id: Set(id(&authors, *author, "author")?),
                author_order: Set(order as i32 + 1),
            });
        }
        for keyword in paper.keywords {
            paper_keywords.push(PaperKeywordActiveModel {
                paper_id: Set(model.paper_id),
                keyword_id: Set(id(&keywords, *keyword, "keyword")?),
            });
        }
        for area in paper.areas {
            paper_areas.push(PaperResearchAreaActiveModel {
                paper_id: Set(model.paper_id),
                area_id: Set(id(&areas, *area, "research area")?),
            });
        }
        papers.push(model.paper_id);
    }
    PaperAuthorEntity::insert_many(paper_authors)
        .exec_without_returning(txn)
        .await?;
    PaperKeywordEntity::insert_many(paper_keywords)
        .exec_without_returning(txn)
        .await?;
    PaperResearchAreaEntity::insert_many(paper_areas)
        .exec_without_returning(txn)
        .await?;
    debug!(count = papers.len(), "Inserted papers");

    for (citing, cited, context) in CITATIONS {
        CitationActiveModel {
            citing_paper_id: Set(id(&papers, *citing, "paper")?),
            cited_paper_id: Set(id(&papers, *cited, "paper")?),
            citation_context: Set(Some(context.to_string())),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(txn)
        .await?;
    }

    let mut library = Vec::with_capacity(LIBRARY.len());
    for (user, paper, notes, rating) in LIBRARY {
        library.push(LibraryEntryActiveModel {
            user_id: Set(id(&users, *user, "user")?),
            paper_id: Set(id(&papers, *paper, "paper")?),
            user_notes: Set(notes.map(str::to_string)),
            rating: Set(*rating),
            added_at: Set(now),
        });
    }
    LibraryEntryEntity::insert_many(library)
        .exec_without_returning(txn)
        .await?;

    let mut author_follows = Vec::with_capacity(AUTHOR_FOLLOWS.len());
    for (user, author) in AUTHOR_FOLLOWS {
        author_follows.push(AuthorFollowActiveModel {
            user_id: Set(id(&users, *user, "user")?),
            author_id: Set(id(&authors, *author, "author")?),
            followed_at: Set(now),
        });
    }
    AuthorFollowEntity::insert_many(author_follows)
        .exec_without_returning(txn)
        .await?;

    let mut venue_follows = Vec::with_capacity(VENUE_FOLLOWS.len());
    for (user, venue) in VENUE_FOLLOWS {
        venue_follows.push(VenueFollowActiveModel {
            user_id: Set(id(&users, *user, "user")?),
            venue_id: Set(id(&venues, *venue, "venue")?),
            followed_at: Set(now),
        });
    }
    VenueFollowEntity::insert_many(venue_follows)
        .exec_without_returning(txn)
        .await?;

    // Parents precede their replies, so each parent id is known by the time it is needed.
    let mut comments = Vec::with_capacity(COMMENTS.len());
    for (i, (user, paper, parent, text)) in COMMENTS.iter().enumerate() {
        let parent_comment_id = match parent {
            Some(parent) => Some(id(&comments, *parent, "comment")?),
            None => None,
        };
        let posted = minutes_ago(now, COMMENTS.len() - i);
        let model = CommentActiveModel {
            user_id: Set(id(&users, *user, "user")?),
            paper_id: Set(id(&papers, *paper, "paper")?),
            parent_comment_id: Set(parent_comment_id),
            comment_text: Set(text.to_string()),
            created_at: Set(posted),
            updated_at: Set(posted),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        comments.push(model.comment_id);
    }

    for (i, (user, query)) in SEARCHES.iter().enumerate() {
        SearchHistoryActiveModel {
            user_id: Set(id(&users, *user, "user")?),
            search_query: Set(query.to_string()),
            searched_at: Set(minutes_ago(now, SEARCHES.len() - i)),
            ..Default::default()
        }
        .insert(txn)
        .await?;
    }

    Ok(SeedSummary {
        users: users.len(),
        authors: authors.len(),
        papers: papers.len(),
        citations: CITATIONS.len(),
        comments: comments.len(),
    })
}
