//! sea-orm models for the catalog tables read by the search pipeline.
//!
//! Every name-bearing table carries a lowercased `search_text` column that
//! concatenates its name components; lookups run substring matches on it.
//! Cards carry the same for their number in `card_number_search`.

pub mod cards;
pub mod colors;
pub mod players;
pub mod series;
pub mod teams;

pub mod prelude {
    pub use super::cards::Entity as Cards;
    pub use super::colors::Entity as Colors;
    pub use super::players::Entity as Players;
    pub use super::series::Entity as Series;
    pub use super::teams::Entity as Teams;
}
