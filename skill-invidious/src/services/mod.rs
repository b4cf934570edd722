//! Service modules for the Invidious skill
//!
//! Request flow: instance pool → Invidious client → relevance scorer →
//! result adapter.

pub mod instance_discovery;
pub mod instance_pool;
pub mod invidious_client;
pub mod relevance_scorer;
pub mod result_adapter;

pub use instance_discovery::{
    parse_instance_urls, CandidateSource, DiscoveryError, NoDiscovery, RedirectPageSource,
};
pub use instance_pool::{merge_candidates, InstancePool};
pub use invidious_client::{InvidiousClient, InvidiousError, LivenessProbe, SearchQuery};
pub use relevance_scorer::{PhraseAnalysis, RelevanceScorer, ScoringPolicy};
pub use result_adapter::{ResultAdapter, ScoringContext};
