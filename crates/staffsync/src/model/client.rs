//! Client profile records.

use serde::{Deserialize, Serialize};

/// Root profile of a person enrolled with the agency.
///
/// Lives at `records/{clientId}`; the registrations subtree under the same
/// node is read separately and is not part of this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Store key of this client. Not serialized; set from the path.
    #[serde(skip)]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Client {
    /// Deserializes a client profile from its store value, attaching the id.
    pub fn from_value(id: &str, value: &serde_json::Value) -> Option<Self> {
        let mut client: Self = serde_json::from_value(value.clone()).ok()?;
        client.id = id.to_string();
        Some(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_attaches_id() {
        let value = json!({
            "name": "Dana Okafor",
            "email": "dana@example.com",
            "registrations": { "r1": { "service": "job_placement" } }
        });
        let client = Client::from_value("c1", &value).unwrap();
        assert_eq!(client.id, "c1");
        assert_eq!(client.name, "Dana Okafor");
        assert_eq!(client.email.as_deref(), Some("dana@example.com"));
        assert!(client.phone.is_none());
    }

    #[test]
    fn test_from_value_missing_name() {
        let value = json!({ "email": "x@example.com" });
        assert!(Client::from_value("c1", &value).is_none());
    }
}
