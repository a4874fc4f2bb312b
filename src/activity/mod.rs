// Activity aggregation: fetch a user's recent posts and reduce them to metrics.
//
// The ActivitySource trait is the seam to the outside world. RedditClient
// implements it for production; tests drive the aggregator with an
// in-memory source.

pub mod aggregate;
pub mod collect;
pub mod error;
pub mod profile;
pub mod traits;
