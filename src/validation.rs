//! Required-field checks applied by editing surfaces before saving.
//!
//! Resolution does not depend on these checks; a record that fails them
//! still resolves (to degraded output).

use crate::entity::LinkItem;
use crate::error::{LinkItemError, Result};

/// Fields a link item form must fill in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Title,
    LinkType,
}

impl RequiredField {
    pub fn name(&self) -> &'static str {
        match self {
            RequiredField::Title => "Title",
            RequiredField::LinkType => "LinkType",
        }
    }

    fn is_missing(&self, item: &LinkItem) -> bool {
        match self {
            RequiredField::Title => item.title.trim().is_empty(),
            RequiredField::LinkType => item.link_type.is_none(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequiredFields {
    fields: Vec<RequiredField>,
}

impl RequiredFields {
    /// The validator used by the link item editing form
    pub fn link_item() -> Self {
        Self {
            fields: vec![RequiredField::Title, RequiredField::LinkType],
        }
    }

    /// Names of every required field the item leaves empty
    pub fn missing(&self, item: &LinkItem) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| f.is_missing(item))
            .map(|f| f.name())
            .collect()
    }

    /// Fail on the first required field the item leaves empty
    pub fn validate(&self, item: &LinkItem) -> Result<()> {
        match self.fields.iter().find(|f| f.is_missing(item)) {
            Some(field) => Err(LinkItemError::Validation {
                field: field.name().to_string(),
                message: format!("'{}' must not be empty", field.name()),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::LinkType;

    #[test]
    fn test_complete_item_passes() {
        let item = LinkItem::new("Contact".to_string(), LinkType::Email);
        assert!(RequiredFields::link_item().validate(&item).is_ok());
    }

    #[test]
    fn test_blank_title_fails() {
        let item = LinkItem::new("   ".to_string(), LinkType::Email);
        let result = RequiredFields::link_item().validate(&item);
        assert!(matches!(
            result,
            Err(LinkItemError::Validation { ref field, .. }) if field == "Title"
        ));
    }

    #[test]
    fn test_missing_reports_all_fields() {
        let mut item = LinkItem::new(String::new(), LinkType::Email);
        item.link_type = None;
        assert_eq!(
            RequiredFields::link_item().missing(&item),
            vec!["Title", "LinkType"]
        );
    }

    #[test]
    fn test_type_specific_fields_are_not_checked() {
        // An email link without an address is still a valid record.
        let item = LinkItem::new("Mail us".to_string(), LinkType::Email);
        assert!(RequiredFields::link_item().missing(&item).is_empty());
    }
}
