//! Domain identifier types with validation
//!
//! Newtype wrappers keep user identities, matter ids, export ids and folder
//! ids from being mixed up at call sites.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Email address of the user being offboarded
///
/// # Examples
///
/// ```
/// use offboard::domain::ids::UserEmail;
/// use std::str::FromStr;
///
/// let user = UserEmail::from_str("a@x.com").unwrap();
/// assert_eq!(user.as_str(), "a@x.com");
/// assert_eq!(user.domain(), "x.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserEmail(String);

impl UserEmail {
    /// Creates a new UserEmail, trimming surrounding whitespace
    pub fn new(email: impl Into<String>) -> Result<Self, String> {
        let email = email.into().trim().to_string();
        if email.is_empty() {
            return Err("User email cannot be empty".to_string());
        }

        let mut parts = email.split('@');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty() => {}
            _ => {
                return Err(format!(
                    "Invalid user email '{email}'. Expected format: user@domain"
                ))
            }
        }

        if email.chars().any(char::is_whitespace) {
            return Err(format!("User email '{email}' must not contain whitespace"));
        }

        Ok(Self(email))
    }

    /// Returns the email as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Part after the `@`
    pub fn domain(&self) -> &str {
        self.0.split('@').nth(1).unwrap_or_default()
    }
}

impl fmt::Display for UserEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserEmail {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for UserEmail {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserEmail> for String {
    fn from(value: UserEmail) -> Self {
        value.0
    }
}

impl AsRef<str> for UserEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Declares an opaque, non-empty string identifier issued by a remote service
macro_rules! remote_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Creates a new ", $label, ", rejecting blank values")]
            pub fn new(id: impl Into<String>) -> Result<Self, String> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(concat!($label, " cannot be empty").to_string());
                }
                Ok(Self(id))
            }

            /// Returns the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

remote_id!(
    /// Identifier of a case/matter in the export service
    MatterId,
    "Matter ID"
);

remote_id!(
    /// Identifier of an export job inside a matter
    ExportId,
    "Export ID"
);

remote_id!(
    /// Identifier of a folder in the retention store
    FolderId,
    "Folder ID"
);

remote_id!(
    /// Identifier of a file created in the retention store
    ItemId,
    "Item ID"
);
