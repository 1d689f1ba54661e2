//! Compose (stack file) document model

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

/// Services by name; `None` marks an entry with an empty or unusable body
pub type Services = BTreeMap<String, Option<ServiceDefinition>>;

/// A parsed stack file. Only the parts relevant to matching are modeled;
/// everything else in the document is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeploymentDocument {
    #[serde(default, deserialize_with = "services_mapping")]
    pub services: Option<Services>,
}

impl DeploymentDocument {
    /// Parse a raw stack file.
    ///
    /// Only invalid YAML is an error. A document that is not a mapping, or
    /// whose `services` is not a mapping, has no services.
    pub fn parse(raw: &str) -> Result<Self, serde_yaml::Error> {
        match serde_yaml::from_str::<Value>(raw)? {
            value @ Value::Mapping(_) => serde_yaml::from_value(value),
            _ => Ok(Self::default()),
        }
    }

    /// Iterate services by name, skipping entries with an empty body
    pub fn services(&self) -> impl Iterator<Item = (&str, &ServiceDefinition)> {
        self.services
            .iter()
            .flatten()
            .filter_map(|(name, service)| service.as_ref().map(|s| (name.as_str(), s)))
    }
}

fn services_mapping<'de, D>(deserializer: D) -> Result<Option<Services>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Mapping(mapping) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };

    let services = mapping
        .into_iter()
        .filter_map(|(name, body)| {
            let name = name.as_str()?.to_string();
            let service = serde_yaml::from_value::<Option<ServiceDefinition>>(body)
                .ok()
                .flatten();
            Some((name, service))
        })
        .collect();
    Ok(Some(services))
}

/// A single service entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceDefinition {
    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub labels: Option<Labels>,

    #[serde(default)]
    pub deploy: Option<DeployConfig>,
}

/// The `deploy:` block of a service
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeployConfig {
    #[serde(default)]
    pub labels: Option<Labels>,
}

/// Compose accepts labels either as a list of `key=value` strings or as a mapping
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Labels {
    List(Vec<String>),
    Map(BTreeMap<String, serde_yaml::Value>),
}

impl Labels {
    /// Label entries as written; for the mapping form these are the keys
    pub fn entries(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        match self {
            Labels::List(list) => Box::new(list.iter().map(String::as_str)),
            Labels::Map(map) => Box::new(map.keys().map(String::as_str)),
        }
    }
}
