use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// What a batch run does with an item whose delivery handler returned an error
/// instead of a reported outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryErrorPolicy {
    /// Drop the item from the queue without counting it as success or failure.
    #[default]
    Drop,
    /// Keep the item queued and count it as a failure.
    Retain,
}

impl FromStr for DeliveryErrorPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "drop" => Ok(DeliveryErrorPolicy::Drop),
            "retain" => Ok(DeliveryErrorPolicy::Retain),
            _ => Err(anyhow::anyhow!("Invalid delivery error policy: {}", s)),
        }
    }
}

impl Display for DeliveryErrorPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DeliveryErrorPolicy::Drop => write!(f, "drop"),
            DeliveryErrorPolicy::Retain => write!(f, "retain"),
        }
    }
}
