pub mod counters;
pub mod relationship;
pub mod social;

pub use counters::CounterService;
pub use relationship::{RelationshipState, RelationshipView};
pub use social::{SocialError, SocialOutcome, SocialService};
