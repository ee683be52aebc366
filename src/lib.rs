pub mod count;
pub mod dedup;
pub mod digest;
pub mod domains;
pub mod engine;
pub mod export;
pub mod extract;
pub mod generator;
pub mod io;
pub mod networks;
pub mod normalize;
pub mod profile;
pub mod report;
pub mod search;
pub mod stats;

pub mod prelude {
    pub use crate::digest::{DigestAlgorithm, SearchTarget};
    pub use crate::engine::{SearchReport, Session, SessionBuilder};
    pub use crate::generator::{CandidateGenerator, SeparatorMode};
    pub use crate::profile::ProfileRecord;
    pub use crate::search::SearchOutcome;
}
