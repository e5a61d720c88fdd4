use crate::domain::UserId;
use serde_json::{Map, Value};

/// Read-only view over one invoice object returned by the service.
///
/// The probe does not own the invoice schema; it only looks at the handful of
/// fields its checks depend on (`id`, `userId`, `status`).
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice(Map<String, Value>);

#[derive(Debug, Clone, PartialEq)]
pub enum OwnerField {
    Absent,
    Owner(UserId),
    /// `userId` is present but neither a string nor a number
    Unreadable(Value),
}

impl Invoice {
    /// Returns `None` when the value is not a JSON object.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// The invoice id rendered as a path segment.
    pub fn id(&self) -> Option<String> {
        match self.0.get("id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn owner(&self) -> OwnerField {
        match self.0.get("userId") {
            None => OwnerField::Absent,
            Some(value) => match UserId::from_json(value) {
                Some(id) => OwnerField::Owner(id),
                None => OwnerField::Unreadable(value.clone()),
            },
        }
    }

    pub fn status(&self) -> Option<&str> {
        self.0.get("status").and_then(Value::as_str)
    }
}
