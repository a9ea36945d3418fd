//! Challenge catalog
//!
//! Read-only list of problems battles are seeded from. The built-in set can be
//! replaced at startup with a JSON file (an array of challenges).

mod builtin;

use std::collections::HashSet;
use std::path::Path;

use rand::seq::IndexedRandom;

use crate::{
    constants::languages,
    error::{AppError, AppResult},
    models::Challenge,
};

/// Longest battle budget a catalog entry may declare (one week)
const MAX_TIME_LIMIT_SECS: u64 = 7 * 24 * 60 * 60;

/// Immutable collection of challenges
#[derive(Debug, Clone)]
pub struct Catalog {
    challenges: Vec<Challenge>,
}

impl Catalog {
    /// Build a catalog, rejecting malformed entries
    pub fn new(challenges: Vec<Challenge>) -> AppResult<Self> {
        if challenges.is_empty() {
            return Err(AppError::Configuration(
                "Challenge catalog is empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for challenge in &challenges {
            if !seen.insert(challenge.id.as_str()) {
                return Err(AppError::Configuration(format!(
                    "Duplicate challenge id: {}",
                    challenge.id
                )));
            }
            if challenge.test_cases.is_empty() {
                return Err(AppError::Configuration(format!(
                    "Challenge {} has no test cases",
                    challenge.id
                )));
            }
            if challenge.time_limit_secs == 0 || challenge.time_limit_secs > MAX_TIME_LIMIT_SECS {
                return Err(AppError::Configuration(format!(
                    "Challenge {} has an invalid time limit",
                    challenge.id
                )));
            }
            if let Some(language) = challenge
                .starter_code
                .keys()
                .find(|language| !languages::ALL.contains(&language.as_str()))
            {
                return Err(AppError::Configuration(format!(
                    "Challenge {} has starter code for unsupported language {}",
                    challenge.id, language
                )));
            }
        }

        Ok(Self { challenges })
    }

    /// The catalog compiled into the binary
    pub fn builtin() -> Self {
        Self {
            challenges: builtin::challenges(),
        }
    }

    /// Load a catalog from a JSON file
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!(
                "Cannot read catalog {}: {}",
                path.display(),
                e
            ))
        })?;
        let challenges: Vec<Challenge> = serde_json::from_str(&raw)?;

        Self::new(challenges)
    }

    /// File catalog when a path is configured, built-in otherwise
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        match path {
            Some(path) => {
                let catalog = Self::from_file(path)?;
                tracing::info!(
                    path = %path.display(),
                    challenges = catalog.len(),
                    "Loaded challenge catalog from file"
                );
                Ok(catalog)
            }
            None => Ok(Self::builtin()),
        }
    }

    /// Pick a challenge uniformly at random; the returned copy is owned by the caller
    pub fn pick_random(&self) -> AppResult<Challenge> {
        let mut rng = rand::rng();
        self.challenges
            .choose(&mut rng)
            .cloned()
            .ok_or_else(|| AppError::Configuration("Challenge catalog is empty".to_string()))
    }

    #[cfg(test)]
    pub fn get(&self, id: &str) -> Option<&Challenge> {
        self.challenges.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.challenges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::test_utils::sample_challenge;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let builtin = Catalog::builtin();
        let validated = Catalog::new(builtin.challenges.clone()).unwrap();
        assert_eq!(validated.len(), builtin.len());
        assert!(builtin.get("two-sum").is_some());
    }

    #[test]
    fn test_pick_random_returns_catalog_entry() {
        let catalog = Catalog::builtin();
        for _ in 0..20 {
            let picked = catalog.pick_random().unwrap();
            assert_eq!(catalog.get(&picked.id), Some(&picked));
        }
    }

    #[test]
    fn test_rejects_empty_and_duplicates() {
        assert!(Catalog::new(Vec::new()).is_err());

        let challenge = sample_challenge();
        assert!(Catalog::new(vec![challenge.clone(), challenge]).is_err());
    }

    #[test]
    fn test_rejects_challenge_without_tests() {
        let mut challenge = sample_challenge();
        challenge.test_cases.clear();
        assert!(Catalog::new(vec![challenge]).is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&vec![sample_challenge()]).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let catalog = Catalog::load(Some(file.path())).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.pick_random().unwrap(), sample_challenge());
    }

    #[test]
    fn test_from_missing_file() {
        let err = Catalog::from_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }
}
