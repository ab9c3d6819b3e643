pub mod query;
pub mod types;

pub use query::{InputRow, QuerySpec};
pub use types::{ExtractedLink, RequestOutcome, ResolvedUrl};
