// Reddit API client: OAuth token handling and the listing reads the
// activity aggregator needs.

pub mod client;
pub mod models;
