pub mod client;
pub mod error;
pub mod locale;

pub use client::{SuggestClient, DEFAULT_SUGGEST_URL};
pub use error::SuggestError;
pub use locale::split_locale;
