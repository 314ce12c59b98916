//! Cross-record references carried on QuickBooks records

use serde::{Deserialize, Serialize};

/// `{ "value": "<id>", "name": "<hint>" }`, always tenant-local
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Reference {
    pub fn new(value: impl Into<String>, name: Option<String>) -> Self {
        Reference {
            value: value.into(),
            name,
        }
    }

    /// Name hint, trimmed; empty when absent
    pub fn hint(&self) -> &str {
        self.name.as_deref().map(str::trim).unwrap_or_default()
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} (ID: {})", name, self.value),
            None => write!(f, "ID {}", self.value),
        }
    }
}

/// Raw polymorphic `Entity` member of a journal line detail
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineEntity {
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(rename = "EntityRef", default, skip_serializing_if = "Option::is_none")]
    pub entity_ref: Option<Reference>,
}

/// A journal line's party, dispatched by kind
#[derive(Debug, Clone, PartialEq)]
pub enum PartyRef {
    Employee(Reference),
    Vendor(Reference),
}

impl PartyRef {
    pub fn reference(&self) -> &Reference {
        match self {
            PartyRef::Employee(r) | PartyRef::Vendor(r) => r,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PartyRef::Employee(_) => "Employee",
            PartyRef::Vendor(_) => "Vendor",
        }
    }

    /// Back to the wire shape
    pub fn into_line_entity(self) -> LineEntity {
        let kind = self.kind().to_string();
        let reference = match self {
            PartyRef::Employee(r) | PartyRef::Vendor(r) => r,
        };
        LineEntity {
            entity_type: Some(kind),
            entity_ref: Some(reference),
        }
    }
}

impl LineEntity {
    /// Typed view of the party; unsupported or incomplete entities yield `None`
    pub fn party(&self) -> Option<PartyRef> {
        let Some(kind) = self.entity_type.as_deref() else {
            log::warn!("Entity reference found but no Type specified");
            return None;
        };
        let Some(reference) = self.entity_ref.clone() else {
            log::warn!("Entity of type {} has no EntityRef", kind);
            return None;
        };
        match kind {
            "Employee" => Some(PartyRef::Employee(reference)),
            "Vendor" => Some(PartyRef::Vendor(reference)),
            other => {
                log::warn!("Unsupported entity type: {}", other);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reference_wire_shape() {
        let reference: Reference = serde_json::from_value(json!({"value": "12"})).unwrap();
        assert_eq!(reference.name, None);
        assert_eq!(
            serde_json::to_value(Reference::new("3", Some("Cash".into()))).unwrap(),
            json!({"value": "3", "name": "Cash"})
        );
    }

    #[test]
    fn test_party_dispatch() {
        let entity: LineEntity = serde_json::from_value(json!({
            "Type": "Vendor",
            "EntityRef": {"value": "56", "name": "Bob's Burger Joint"}
        }))
        .unwrap();
        let party = entity.party().unwrap();
        assert_eq!(party.kind(), "Vendor");
        assert_eq!(party.reference().value, "56");
    }

    #[test]
    fn test_customer_party_is_unsupported() {
        let entity = LineEntity {
            entity_type: Some("Customer".to_string()),
            entity_ref: Some(Reference::new("1", None)),
        };
        assert!(entity.party().is_none());
    }
}
