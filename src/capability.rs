//! Viewer capabilities.
//!
//! Everything here is advisory: it decides which controls a widget shows.
//! The store re-checks every mutation on its side. The bearer token is read
//! without verifying its signature, which is fine for choosing what to render
//! and never fine for authorizing anything.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use comments::Comment;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// What the viewer presents: a bearer token from login, and the document
/// author's edit token when the viewer owns the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credential {
    pub bearer_token: Option<String>,
    pub edit_token: Option<String>,
}

impl Credential {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            bearer_token: Some(token.into()),
            edit_token: None,
        }
    }

    pub fn with_edit_token(mut self, token: impl Into<String>) -> Self {
        self.edit_token = Some(token.into());
        self
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("token is not a three-part bearer token")]
    Shape,
    #[error("token payload is not base64url: {0}")]
    Encoding(String),
    #[error("token claims are not valid JSON: {0}")]
    Claims(String),
}

/// Claims the widget looks at. Anything else in the payload is ignored.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl Claims {
    /// Decode the payload segment of a `header.payload.signature` token.
    pub fn decode(token: &str) -> Result<Self, CapabilityError> {
        let mut parts = token.trim().split('.');
        let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(_), Some(payload), Some(_), None) if !payload.is_empty() => payload,
            _ => return Err(CapabilityError::Shape),
        };
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|err| CapabilityError::Encoding(err.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|err| CapabilityError::Claims(err.to_string()))
    }

    pub fn user_id(&self) -> Option<&str> {
        self.sub.as_deref().or(self.user_id.as_deref())
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin || self.role.as_deref() == Some("admin")
    }
}

/// The current viewer, as far as rendering is concerned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: Option<String>,
    pub display_name: Option<String>,
    pub is_admin: bool,
    /// Holds the document's edit token.
    pub is_author: bool,
}

impl Viewer {
    /// Build a viewer from raw credentials. A token that does not decode
    /// yields an anonymous viewer rather than an error.
    pub fn from_credentials(bearer_token: Option<&str>, edit_token: Option<&str>) -> Self {
        let claims = match bearer_token.filter(|t| !t.trim().is_empty()) {
            Some(token) => Claims::decode(token).unwrap_or_else(|err| {
                debug!(error = %err, "viewer_token_unreadable");
                Claims::default()
            }),
            None => Claims::default(),
        };
        Self {
            user_id: claims.user_id().map(str::to_string),
            display_name: claims.name.clone(),
            is_admin: claims.is_admin(),
            is_author: edit_token.is_some_and(|t| !t.trim().is_empty()),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.user_id.is_some()
    }

    /// Admins and the document author may delete any comment.
    pub fn can_delete(&self) -> bool {
        self.is_admin || self.is_author
    }

    /// Whoever may delete may also ban a comment's author, but never
    /// themselves.
    pub fn can_ban(&self, comment: &Comment) -> bool {
        if !self.can_delete() {
            return false;
        }
        match (comment.author_id.as_deref(), self.user_id.as_deref()) {
            (Some(author), Some(me)) => author != me,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

impl From<&Credential> for Viewer {
    fn from(credential: &Credential) -> Self {
        Self::from_credentials(
            credential.bearer_token.as_deref(),
            credential.edit_token.as_deref(),
        )
    }
}

/// Decides whether a credential carries elevated rights.
///
/// Stores call this instead of parsing credentials themselves, so a
/// deployment can swap in verified checks.
pub trait CapabilityCheck: Send + Sync {
    /// May delete comments written by others.
    fn is_privileged(&self, credential: &Credential) -> bool;

    /// May ban users. Defaults to [`is_privileged`](Self::is_privileged).
    fn can_moderate(&self, credential: &Credential) -> bool {
        self.is_privileged(credential)
    }

    /// Stable id of the credential's user, if any.
    fn user_id(&self, credential: &Credential) -> Option<String>;
}

/// [`CapabilityCheck`] over unverified token claims.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaimsCapability;

impl CapabilityCheck for ClaimsCapability {
    fn is_privileged(&self, credential: &Credential) -> bool {
        Viewer::from(credential).can_delete()
    }

    fn user_id(&self, credential: &Credential) -> Option<String> {
        Viewer::from(credential).user_id
    }
}

/// Unsigned token carrying `claims`, for tests and the demo.
pub fn unsigned_token(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_admin_by_role_or_flag() {
        let by_role = Viewer::from_credentials(
            Some(&unsigned_token(&json!({ "sub": "u-1", "role": "admin" }))),
            None,
        );
        assert!(by_role.is_admin);
        assert_eq!(by_role.user_id.as_deref(), Some("u-1"));

        let by_flag = Viewer::from_credentials(
            Some(&unsigned_token(&json!({ "userId": "u-2", "isAdmin": true }))),
            None,
        );
        assert!(by_flag.is_admin);
        assert_eq!(by_flag.user_id.as_deref(), Some("u-2"));
    }

    #[test]
    fn garbage_token_is_anonymous() {
        let viewer = Viewer::from_credentials(Some("not-a-token"), None);
        assert_eq!(viewer, Viewer::default());
        assert!(!viewer.is_signed_in());
        assert_eq!(Claims::decode("a.b"), Err(CapabilityError::Shape));
        assert!(matches!(
            Claims::decode("a.!!!.c"),
            Err(CapabilityError::Encoding(_))
        ));
    }

    #[test]
    fn edit_token_makes_author() {
        let viewer = Viewer::from_credentials(None, Some("edit-123"));
        assert!(viewer.is_author);
        assert!(viewer.can_delete());
        assert!(!Viewer::from_credentials(None, Some("  ")).is_author);
        assert!(!Viewer::default().can_delete());
    }

    #[test]
    fn moderators_cannot_ban_themselves() {
        let admin = Viewer::from_credentials(
            Some(&unsigned_token(&json!({ "sub": "boss", "role": "admin" }))),
            None,
        );
        let mut theirs = Comment::new("c", 0, None, "x");
        theirs.author_id = Some("someone".into());
        let mut mine = Comment::new("d", 0, None, "y");
        mine.author_id = Some("boss".into());

        assert!(admin.can_ban(&theirs));
        assert!(!admin.can_ban(&mine));
        assert!(!admin.can_ban(&Comment::new("e", 0, None, "anonymous")));

        let author = Viewer::from_credentials(None, Some("edit"));
        assert!(author.can_delete());
        assert!(author.can_ban(&theirs));
        assert!(!author.can_ban(&Comment::new("e", 0, None, "anonymous")));

        let signed_in_author = Viewer::from_credentials(
            Some(&unsigned_token(&json!({ "sub": "someone" }))),
            Some("edit"),
        );
        assert!(!signed_in_author.can_ban(&theirs));

        let reader = Viewer::from_credentials(
            Some(&unsigned_token(&json!({ "sub": "r" }))),
            None,
        );
        assert!(!reader.can_ban(&theirs));
    }

    #[test]
    fn claims_capability() {
        let check = ClaimsCapability;
        let admin = Credential::bearer(unsigned_token(&json!({ "sub": "a", "role": "admin" })));
        let author = Credential::anonymous().with_edit_token("edit");
        let reader = Credential::bearer(unsigned_token(&json!({ "sub": "r" })));

        assert!(check.is_privileged(&admin) && check.can_moderate(&admin));
        assert!(check.is_privileged(&author) && check.can_moderate(&author));
        assert!(!check.can_moderate(&reader));
        assert!(!check.is_privileged(&reader));
        assert_eq!(check.user_id(&reader).as_deref(), Some("r"));
    }
}
