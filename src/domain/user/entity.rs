//! User entity and related types

use serde::{Deserialize, Serialize};

/// Placeholder profile picture used when signup omits one
pub const DEFAULT_IMAGE_URL: &str = "/static/images/default-pic.png";

/// Placeholder header image for new profiles
pub const DEFAULT_HEADER_IMAGE_URL: &str = "/static/images/warbler-hero.jpg";

/// Numeric user identifier allocated from the `users` id sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted user row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: String,
    email: String,
    /// Argon2 PHC string - never exposed in serialization
    #[serde(skip_serializing, default)]
    password_hash: String,
    image_url: String,
    header_image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
}

impl User {
    /// Rebuild a user from stored columns. Image URLs start at the defaults.
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            image_url: DEFAULT_IMAGE_URL.to_string(),
            header_image_url: DEFAULT_HEADER_IMAGE_URL.to_string(),
            bio: None,
            location: None,
        }
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = url.into();
        self
    }

    pub fn with_header_image_url(mut self, url: impl Into<String>) -> Self {
        self.header_image_url = url.into();
        self
    }

    pub fn with_bio(mut self, bio: Option<String>) -> Self {
        self.bio = bio;
        self
    }

    pub fn with_location(mut self, location: Option<String>) -> Self {
        self.location = location;
        self
    }

    // Getters

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn header_image_url(&self) -> &str {
        &self.header_image_url
    }

    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

/// A signed-up user that has been staged but not yet committed.
///
/// The email is optional here because the not-null rule belongs to the store and
/// is only enforced on commit.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    id: UserId,
    username: String,
    email: Option<String>,
    password_hash: String,
    image_url: String,
    header_image_url: String,
}

impl NewUser {
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        email: Option<String>,
        password_hash: impl Into<String>,
        image_url: impl Into<String>,
        header_image_url: impl Into<String>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            email,
            password_hash: password_hash.into(),
            image_url: image_url.into(),
            header_image_url: header_image_url.into(),
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn header_image_url(&self) -> &str {
        &self.header_image_url
    }

    /// Materialize the persisted row. Returns `None` when the email is missing,
    /// which a store reports as a not-null violation.
    pub fn into_user(self) -> Option<User> {
        let email = self.email?;

        Some(
            User::new(self.id, self.username, email, self.password_hash)
                .with_image_url(self.image_url)
                .with_header_image_url(self.header_image_url),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_user(id: i64, username: &str) -> User {
        User::new(
            UserId::new(id),
            username,
            format!("{}@test.com", username),
            "HASHED_PASSWORD",
        )
    }

    #[test]
    fn test_user_id() {
        let id = UserId::new(7);
        assert_eq!(id.value(), 7);
        assert_eq!(id.to_string(), "7");
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
    }

    #[test]
    fn test_user_creation() {
        let user = create_test_user(1, "testuser");

        assert_eq!(user.id(), UserId::new(1));
        assert_eq!(user.username(), "testuser");
        assert_eq!(user.email(), "testuser@test.com");
        assert_eq!(user.image_url(), DEFAULT_IMAGE_URL);
        assert_eq!(user.header_image_url(), DEFAULT_HEADER_IMAGE_URL);
        assert!(user.bio().is_none());
        assert!(user.location().is_none());
    }

    #[test]
    fn test_user_profile_builders() {
        let user = create_test_user(1, "testuser")
            .with_image_url("/me.png")
            .with_bio(Some("hello".to_string()))
            .with_location(Some("Lisbon".to_string()));

        assert_eq!(user.image_url(), "/me.png");
        assert_eq!(user.bio(), Some("hello"));
        assert_eq!(user.location(), Some("Lisbon"));
    }

    #[test]
    fn test_user_serialization_excludes_password() {
        let user = create_test_user(1, "testuser");

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("HASHED_PASSWORD"));
        assert!(!json.contains("password_hash"));
        assert!(json.contains("\"id\":1"));
    }

    #[test]
    fn test_new_user_into_user() {
        let staged = NewUser::new(
            UserId::new(3),
            "TestUser",
            Some("Test@Test.com".to_string()),
            "$argon2id$hash",
            "/pic.png",
            DEFAULT_HEADER_IMAGE_URL,
        );

        let user = staged.into_user().unwrap();
        assert_eq!(user.username(), "TestUser");
        assert_eq!(user.email(), "Test@Test.com");
        assert_eq!(user.password_hash(), "$argon2id$hash");
        assert_eq!(user.image_url(), "/pic.png");
    }

    #[test]
    fn test_new_user_without_email_has_no_row() {
        let staged = NewUser::new(
            UserId::new(3),
            "testuser",
            None,
            "$argon2id$hash",
            DEFAULT_IMAGE_URL,
            DEFAULT_HEADER_IMAGE_URL,
        );

        assert!(staged.email().is_none());
        assert!(staged.into_user().is_none());
    }
}
