pub mod history;
pub mod listing;
pub mod search;
pub mod wizard;

pub use listing::{Listing, ListingRepository, ListingStatus, PropertyType, SpaceType};
pub use wizard::{ListingDraft, WizardStep};
