//! Vendor store settings.

use serde::{Deserialize, Serialize};

/// A vendor's public store profile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSettings {
    pub store_name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub return_policy: Option<String>,
}

/// Store settings validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreSettingsError {
    #[error("store name is required")]
    MissingName,
    #[error("store name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("store URL may only contain lowercase letters, digits and dashes")]
    InvalidSlug,
    #[error("contact email is not a valid address")]
    InvalidEmail,
}

impl StoreSettings {
    /// Maximum store name length.
    pub const MAX_NAME_LENGTH: usize = 100;

    /// Check the settings before sending them to the backend.
    ///
    /// # Errors
    ///
    /// Returns the first rule the settings break.
    pub fn validate(&self) -> Result<(), StoreSettingsError> {
        let name = self.store_name.trim();
        if name.is_empty() {
            return Err(StoreSettingsError::MissingName);
        }
        if name.chars().count() > Self::MAX_NAME_LENGTH {
            return Err(StoreSettingsError::NameTooLong {
                max: Self::MAX_NAME_LENGTH,
            });
        }
        if !is_valid_slug(&self.slug) {
            return Err(StoreSettingsError::InvalidSlug);
        }
        if let Some(email) = self.contact_email.as_deref()
            && !is_plausible_email(email)
        {
            return Err(StoreSettingsError::InvalidEmail);
        }
        Ok(())
    }
}

/// Slugs are non-empty, lowercase ascii alphanumerics and inner dashes.
#[must_use]
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Derive a slug from a display name: `"My Shop!"` becomes `"my-shop"`.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && !domain.is_empty() && !domain.contains('@') && !email.contains(' ')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> StoreSettings {
        StoreSettings {
            store_name: "Tea Corner".to_string(),
            slug: "tea-corner".to_string(),
            description: None,
            logo_url: None,
            contact_email: Some("hello@tea.example".to_string()),
            return_policy: None,
        }
    }

    #[test]
    fn test_valid_settings() {
        assert!(settings().validate().is_ok());
    }

    #[test]
    fn test_invalid_settings() {
        let mut s = settings();
        s.store_name = " ".to_string();
        assert_eq!(s.validate(), Err(StoreSettingsError::MissingName));

        let mut s = settings();
        s.slug = "Tea Corner".to_string();
        assert_eq!(s.validate(), Err(StoreSettingsError::InvalidSlug));

        let mut s = settings();
        s.contact_email = Some("nope".to_string());
        assert_eq!(s.validate(), Err(StoreSettingsError::InvalidEmail));

        let mut s = settings();
        s.store_name = "x".repeat(101);
        assert_eq!(
            s.validate(),
            Err(StoreSettingsError::NameTooLong { max: 100 })
        );
    }

    #[test]
    fn test_slugs() {
        assert_eq!(slugify("My Shop!"), "my-shop");
        assert_eq!(slugify("  Tea & Cakes  "), "tea-cakes");
        assert!(is_valid_slug("shop-42"));
        assert!(!is_valid_slug("-shop"));
        assert!(!is_valid_slug(""));
    }
}
