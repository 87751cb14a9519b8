//! Static climate and soil attributes, looked up by municipality name.

use rustc_hash::FxHashMap;

use sbp_core::FeatureMap;

use crate::{AgentError, AgentResult};

/// Average climate series and soil properties of one municipality.
///
/// Created once at setup and never mutated.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Environment {
    pub climate: FeatureMap,
    pub soil:    FeatureMap,
}

impl Environment {
    pub fn new(climate: FeatureMap, soil: FeatureMap) -> Self {
        Self { climate, soil }
    }

    /// Names of attributes whose value is not finite.
    pub fn missing_values(&self) -> Vec<&str> {
        self.climate
            .iter()
            .chain(self.soil.iter())
            .filter(|(_, v)| !v.is_finite())
            .map(|(k, _)| k.as_str())
            .collect()
    }
}

/// Owned municipality name → [`Environment`] mapping.
///
/// Passed by reference into feature assembly; there is no global registry.
#[derive(Clone, Debug, Default)]
pub struct EnvironmentTable {
    by_name: FxHashMap<String, Environment>,
}

impl EnvironmentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the environment of `name`.
    pub fn insert(&mut self, name: impl Into<String>, environment: Environment) {
        self.by_name.insert(name.into(), environment);
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Environment> {
        self.by_name.get(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Check that every name in `names` has a complete environment.
    ///
    /// Reports all offending municipalities in one
    /// [`AgentError::DataIntegrity`].
    pub fn validate<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> AgentResult<()> {
        let mut problems = Vec::new();
        for name in names {
            match self.by_name.get(name) {
                None => problems.push((name.to_owned(), "no climate/soil data".to_owned())),
                Some(env) => {
                    let missing = env.missing_values();
                    if !missing.is_empty() {
                        problems.push((
                            name.to_owned(),
                            format!("missing environment values {}", missing.join(", ")),
                        ));
                    }
                }
            }
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(AgentError::data_integrity(problems))
        }
    }
}

impl FromIterator<(String, Environment)> for EnvironmentTable {
    fn from_iter<I: IntoIterator<Item = (String, Environment)>>(iter: I) -> Self {
        Self { by_name: iter.into_iter().collect() }
    }
}
