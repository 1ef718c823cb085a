//! Serde integration.
//!
//! Component trees hold callbacks and arbitrary payloads, so they cannot be
//! serialized. Both directions fail with the
//! [`TreeError::Unsupported`](crate::TreeError::Unsupported) message.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TreeError;
use crate::logging::targets;
use crate::tree::ComponentTree;

fn refusal() -> TreeError {
    tracing::debug!(target: targets::CORE, "refusing to serialize a component tree");
    TreeError::unsupported("Object serialization is not supported by component trees.")
}

impl Serialize for ComponentTree {
    fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
        Err(serde::ser::Error::custom(refusal()))
    }
}

impl<'de> Deserialize<'de> for ComponentTree {
    fn deserialize<D: Deserializer<'de>>(_deserializer: D) -> Result<Self, D::Error> {
        Err(serde::de::Error::custom(refusal()))
    }
}
