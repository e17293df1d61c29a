//! Medication lookup by typed name.
//!
//! Ranks catalog entries by Jaro-Winkler similarity against the name and
//! generic name, with a bonus when the query is a prefix of either.

use strsim::jaro_winkler;

use crate::models::MedicationWithGuidelines;

/// Minimum similarity for a medication to be returned.
const MIN_SIMILARITY: f64 = 0.75;

/// Bonus added when the query is a prefix of a name.
const PREFIX_BONUS: f64 = 0.1;

/// A medication with its lookup score.
#[derive(Debug, Clone, PartialEq)]
pub struct MedicationMatch<'a> {
    pub medication: &'a MedicationWithGuidelines,
    pub score: f64,
}

/// Find medications whose name or generic name resembles `query`.
///
/// Results are ordered best first; ties keep catalog order.
pub fn find_medications_by_name<'a>(
    catalog: &'a [MedicationWithGuidelines],
    query: &str,
    limit: usize,
) -> Vec<MedicationMatch<'a>> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<MedicationMatch<'a>> = catalog
        .iter()
        .filter_map(|m| {
            let score = std::iter::once(m.medication.name.as_str())
                .chain(m.medication.generic_name.as_deref())
                .map(|name| score_name(&query, name))
                .fold(0.0, f64::max);
            (score >= MIN_SIMILARITY).then_some(MedicationMatch { medication: m, score })
        })
        .collect();

    matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    matches.truncate(limit);
    matches
}

fn score_name(query: &str, name: &str) -> f64 {
    let name = name.to_lowercase();
    if name == query {
        return 1.0 + PREFIX_BONUS;
    }
    let bonus = if name.starts_with(query) { PREFIX_BONUS } else { 0.0 };
    jaro_winkler(query, &name) + bonus
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Medication, Species};

    fn med(name: &str, generic: Option<&str>) -> MedicationWithGuidelines {
        MedicationWithGuidelines {
            medication: Medication {
                id: name.to_lowercase(),
                name: name.into(),
                generic_name: generic.map(Into::into),
                species: Species::Both,
                category: "X".into(),
                description: None,
                created_at: String::new(),
                updated_at: String::new(),
            },
            dosage_guidelines: Vec::new(),
        }
    }

    fn catalog() -> Vec<MedicationWithGuidelines> {
        vec![
            med("Rimadyl", Some("Carprofen")),
            med("Metacam", Some("Meloxicam")),
            med("Clavamox", Some("Amoxicillin-clavulanate")),
        ]
    }

    #[test]
    fn test_exact_name_first() {
        let catalog = catalog();
        let results = find_medications_by_name(&catalog, "metacam", 5);
        assert_eq!(results[0].medication.medication.name, "Metacam");
    }

    #[test]
    fn test_generic_name_match() {
        let catalog = catalog();
        let results = find_medications_by_name(&catalog, "carprofen", 5);
        assert_eq!(results[0].medication.medication.name, "Rimadyl");
    }

    #[test]
    fn test_prefix_and_typo() {
        let catalog = catalog();
        assert_eq!(
            find_medications_by_name(&catalog, "clav", 5)[0].medication.medication.name,
            "Clavamox"
        );
        assert_eq!(
            find_medications_by_name(&catalog, "meloxicm", 5)[0].medication.medication.name,
            "Metacam"
        );
    }

    #[test]
    fn test_unrelated_query_empty() {
        let catalog = catalog();
        assert!(find_medications_by_name(&catalog, "zzzz", 5).is_empty());
        assert!(find_medications_by_name(&catalog, "  ", 5).is_empty());
    }

    #[test]
    fn test_limit() {
        let mut catalog = catalog();
        catalog.push(med("Meloxidyl", Some("Meloxicam")));

        assert_eq!(find_medications_by_name(&catalog, "meloxicam", 5).len(), 2);

        let limited = find_medications_by_name(&catalog, "meloxicam", 1);
        assert_eq!(limited.len(), 1);
        // equal scores keep catalog order
        assert_eq!(limited[0].medication.medication.name, "Metacam");
    }
}
