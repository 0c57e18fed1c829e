pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{Classification, Complexity, SymptomEntry, TriageOutcome};
pub use services::classifier::{SymptomClassifier, TriageService};
pub use services::dataset::SymptomDataset;
pub use services::spell::{levenshtein_distance, similarity, SpellChecker};
