//! Comment retrieval for B92 articles.
//!
//! The site has served its comments in two incompatible shapes over time. Each
//! shape is described by an [`ExtractionProfile`] (charset, node selector, URL
//! shaping and per-node text cleanup), and a single [`ProfileSource`] runs any
//! profile behind the [`CommentSource`] trait. Which profile is active is a
//! configuration decision ([`talkback_config::ExtractionVariant`]).
//!
//! - `article`: turning the user's article URL into a fetch target
//! - `fetch`: the forwarding relay and charset-aware decoding
//! - `extract`: profiles, node selection and the `CommentSource` trait
//!
//! Web scraping is brittle by nature: when the site changes its markup the
//! selectors match nothing and extraction yields an empty list, not an error.
pub mod article;
pub mod extract;
pub mod fetch;

pub use article::ArticleReference;
pub use extract::{
    extract_comments, CommentSource, ExtractError, ExtractionProfile, ProfileSource,
};
pub use fetch::{ForwardTarget, Forwarder, RawDocument};

use talkback_config::ExtractionVariant;

/// Build the comment source selected by configuration.
pub fn source_for(variant: ExtractionVariant, forwarder: Forwarder) -> ProfileSource {
    ProfileSource::new(ExtractionProfile::for_variant(variant), forwarder)
}
