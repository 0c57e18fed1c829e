use tracing::error;

use crate::models::SymptomEntry;

static SYMPTOMS_JSON: &str = include_str!("../../datasets/symptoms.json");

/// In-memory symptom reference data, parsed once at startup and shared
/// read-only afterwards.
#[derive(Debug, Clone)]
pub struct SymptomDataset {
    entries: Vec<SymptomEntry>,
}

impl Default for SymptomDataset {
    fn default() -> Self {
        Self::bundled()
    }
}

impl SymptomDataset {
    /// Loads the dataset compiled into the binary. A parse failure here
    /// means the bundled file is broken; degrade to an empty dataset
    /// rather than refusing to start.
    pub fn bundled() -> Self {
        match serde_json::from_str(SYMPTOMS_JSON) {
            Ok(entries) => Self { entries },
            Err(e) => {
                error!("Failed to parse bundled symptom dataset: {}", e);
                Self { entries: Vec::new() }
            }
        }
    }

    pub fn from_entries(entries: Vec<SymptomEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[SymptomEntry] {
        &self.entries
    }

    /// Every distinct symptom phrasing, lowercased, in dataset order.
    pub fn all_terms(&self) -> Vec<String> {
        let mut terms: Vec<String> = Vec::new();
        for entry in &self.entries {
            for symptom in &entry.symptoms {
                let lower = symptom.to_lowercase();
                if !terms.contains(&lower) {
                    terms.push(lower);
                }
            }
        }
        terms
    }

    /// Entries where any phrasing contains the query as a substring.
    pub fn search(&self, query: &str) -> Vec<SymptomEntry> {
        let query = query.to_lowercase();
        let query = query.trim();
        self.entries
            .iter()
            .filter(|entry| {
                entry
                    .symptoms
                    .iter()
                    .any(|s| s.to_lowercase().contains(query))
            })
            .cloned()
            .collect()
    }

    /// First entry matching the query, for the advice lookup.
    pub fn find(&self, query: &str) -> Option<&SymptomEntry> {
        let query = query.to_lowercase();
        let query = query.trim();
        self.entries.iter().find(|entry| {
            entry
                .symptoms
                .iter()
                .any(|s| s.to_lowercase().contains(query))
        })
    }
}
