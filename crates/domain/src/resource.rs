//! Content resources exposed by the backend

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A collection of content managed through the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Portfolio projects
    Projects,
    /// Articles and news
    Articles,
    /// Offered services
    Services,
    /// Team members
    Team,
    /// Certificates
    Certificates,
    /// Licenses
    Licenses,
    /// Admin user accounts
    Users,
    /// Messages sent through the contact form
    ContactSubmissions,
}

impl ResourceKind {
    /// Returns every known resource.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Projects,
            Self::Articles,
            Self::Services,
            Self::Team,
            Self::Certificates,
            Self::Licenses,
            Self::Users,
            Self::ContactSubmissions,
        ]
    }

    /// Returns the short name used on the command line and in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::Articles => "articles",
            Self::Services => "services",
            Self::Team => "team",
            Self::Certificates => "certificates",
            Self::Licenses => "licenses",
            Self::Users => "users",
            Self::ContactSubmissions => "contact-submissions",
        }
    }

    /// Returns the collection path relative to the API base URL.
    #[must_use]
    pub const fn collection_path(self) -> &'static str {
        match self {
            Self::Projects => "/projects",
            Self::Articles => "/articles",
            Self::Services => "/services",
            Self::Team => "/team",
            Self::Certificates => "/certificates",
            Self::Licenses => "/licenses",
            Self::Users => "/users",
            Self::ContactSubmissions => "/contact/admin/contact-submissions",
        }
    }

    /// Returns the path of a single item, addressed by id or slug.
    #[must_use]
    pub fn item_path(self, id: impl fmt::Display) -> String {
        format!("{}/{id}", self.collection_path())
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResourceKind {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| DomainError::UnknownResource(s.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn item_paths() {
        assert_eq!(ResourceKind::Users.item_path(5), "/users/5");
        assert_eq!(
            ResourceKind::Articles.item_path("bim-basics"),
            "/articles/bim-basics"
        );
        assert_eq!(
            ResourceKind::ContactSubmissions.item_path(9),
            "/contact/admin/contact-submissions/9"
        );
    }

    #[test]
    fn parses_names() {
        assert_eq!("Projects".parse::<ResourceKind>().unwrap(), ResourceKind::Projects);
        assert_eq!(
            "contact_submissions".parse::<ResourceKind>().unwrap(),
            ResourceKind::ContactSubmissions
        );
        assert!("videos".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn names_round_trip_for_every_kind() {
        for kind in ResourceKind::all() {
            assert_eq!(kind.name().parse::<ResourceKind>().unwrap(), *kind);
        }
    }
}
