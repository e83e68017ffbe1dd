//! Mastodon accounts and statuses.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// The subset of a Mastodon account needed to credit a requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub display_name: Option<String>,
    pub username: String,
}

/// Who can see a posted status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusVisibility {
    Public,
    #[default]
    Unlisted,
    Private,
    Direct,
}

impl std::fmt::Display for StatusVisibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StatusVisibility::Public => "public",
            StatusVisibility::Unlisted => "unlisted",
            StatusVisibility::Private => "private",
            StatusVisibility::Direct => "direct",
        };
        f.write_str(name)
    }
}

/// Body of `POST /api/v1/statuses`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStatus {
    pub status: String,
    pub visibility: StatusVisibility,
}

/// The part of the created status we care about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedStatus {
    pub id: CompactString,
    #[serde(default)]
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_status_serialization() {
        let status = NewStatus {
            status: "hello".to_string(),
            visibility: StatusVisibility::Unlisted,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["visibility"], "unlisted");
        assert_eq!(json["status"], "hello");
    }

    #[test]
    fn test_account_without_display_name() {
        let account: Account = serde_json::from_str(r#"{"username":"alice","id":"1"}"#).unwrap();
        assert_eq!(account.display_name, None);
        assert_eq!(account.username, "alice");
    }
}
