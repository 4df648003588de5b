//! Rights holders and royalty contact blocks

use serde::{Deserialize, Serialize};

use crate::validators::is_valid_email;

/// Where a rights holder controls the release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TerritoryScope {
    #[default]
    Worldwide,
    Home,
    Specific(Vec<String>),
}

/// One record label or publisher entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RightsEntry {
    pub name: String,
    pub contact_name: String,
    pub contact_email: String,
    pub confirmed: bool,
    pub territory_scope: TerritoryScope,
}

impl RightsEntry {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// A named entry; specific scope must list at least one territory
    pub fn is_complete(&self) -> bool {
        let scope_ok = match &self.territory_scope {
            TerritoryScope::Specific(list) => !list.is_empty(),
            _ => true,
        };
        !self.name.trim().is_empty() && scope_ok
    }
}

/// Distributor / PRO / MCS contact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactBlock {
    pub name: String,
    pub confirmed: bool,
    pub contact_name: String,
    pub contact_email: String,
}

impl ContactBlock {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Named and confirmed; a contact email, when given, must be well formed
    pub fn is_complete(&self) -> bool {
        let email_ok = self.contact_email.trim().is_empty() || is_valid_email(&self.contact_email);
        self.confirmed && !self.name.trim().is_empty() && email_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rights_entry_completion() {
        assert!(!RightsEntry::default().is_complete());
        assert!(RightsEntry::named("Night Owl Records").is_complete());

        let mut entry = RightsEntry::named("Night Owl Records");
        entry.territory_scope = TerritoryScope::Specific(vec![]);
        assert!(!entry.is_complete());
        entry.territory_scope = TerritoryScope::Specific(vec!["GB".into()]);
        assert!(entry.is_complete());
    }

    #[test]
    fn test_contact_block_completion() {
        let mut block = ContactBlock::named("PRS for Music");
        assert!(!block.is_complete());
        block.confirmed = true;
        assert!(block.is_complete());
        block.contact_email = "not-an-email".into();
        assert!(!block.is_complete());
        block.contact_email = "writer@prs.example".into();
        assert!(block.is_complete());
    }

    #[test]
    fn test_territory_scope_wire_shape() {
        let json = serde_json::to_value(TerritoryScope::Specific(vec!["FR".into()])).unwrap();
        assert_eq!(json, serde_json::json!({"specific": ["FR"]}));
        let json = serde_json::to_value(TerritoryScope::Home).unwrap();
        assert_eq!(json, serde_json::json!("home"));
    }
}
