use serde::{Deserialize, Serialize};
use std::fmt;

/// Male name endings, checked before the female set
const MALE_ENDINGS: [&str; 8] = ["ski", "cki", "dzki", "owski", "ewski", "yk", "ek", "osz"];

/// Female name endings. The bare "a" entry makes most uncategorized
/// names ending in "a" guess female; this over-triggers on purpose and
/// is a documented limitation of the heuristic.
const FEMALE_ENDINGS: [&str; 6] = ["ska", "cka", "dzka", "owska", "ewska", "a"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Default for Gender {
    fn default() -> Self {
        Self::Unknown
    }
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guess a character's gender from Polish name endings.
///
/// Pure and deterministic; returns `Unknown` when no suffix matches.
pub fn infer_gender(name: &str) -> Gender {
    let name_lower = name.to_lowercase();

    for ending in MALE_ENDINGS {
        if name_lower.ends_with(ending) {
            return Gender::Male;
        }
    }

    for ending in FEMALE_ENDINGS {
        if name_lower.ends_with(ending) {
            return Gender::Female;
        }
    }

    Gender::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_male_surnames() {
        assert_eq!(infer_gender("Kowalski"), Gender::Male);
        assert_eq!(infer_gender("Nowicki"), Gender::Male);
        assert_eq!(infer_gender("Marek"), Gender::Male);
        assert_eq!(infer_gender("Tomasz"), Gender::Male);
    }

    #[test]
    fn test_female_surnames() {
        assert_eq!(infer_gender("Kowalska"), Gender::Female);
        assert_eq!(infer_gender("Nowicka"), Gender::Female);
    }

    #[test]
    fn test_generic_a_suffix_guesses_female() {
        assert_eq!(infer_gender("Anna"), Gender::Female);
        assert_eq!(infer_gender("Zofia"), Gender::Female);
    }

    #[test]
    fn test_no_matching_suffix() {
        assert_eq!(infer_gender("Tom"), Gender::Unknown);
        assert_eq!(infer_gender(""), Gender::Unknown);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(infer_gender("KOWALSKI"), Gender::Male);
        assert_eq!(infer_gender("kowalska"), Gender::Female);
    }

    #[test]
    fn test_gender_display() {
        assert_eq!(Gender::Male.to_string(), "male");
        assert_eq!(Gender::Unknown.to_string(), "unknown");
    }
}
