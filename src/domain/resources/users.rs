use serde::{Deserialize, Serialize};

use super::collection::Collection;
use crate::domain::client::{ApiClient, ApiRequest};
use crate::domain::shared::ClientResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Doctor,
    Reception,
    Pharmacist,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Doctor => "doctor",
            Self::Reception => "reception",
            Self::Pharmacist => "pharmacist",
        }
    }
}

/// A staff account. Create responses echo the submitted fields and may
/// omit `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default)]
    pub number: Option<String>,
    pub role: UserRole,
    #[serde(default)]
    pub secondary_role: Option<UserRole>,
}

/// Body for `POST /api/users/`. The server rejects passwords shorter than
/// five characters, a mismatched `password2` and a secondary role equal to
/// the primary one.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub password2: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_role: Option<UserRole>,
}

impl NewUser {
    pub fn new(username: impl Into<String>, password: impl Into<String>, role: UserRole) -> Self {
        let password = password.into();
        Self {
            username: username.into(),
            password2: password.clone(),
            password,
            number: None,
            role,
            secondary_role: None,
        }
    }

    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.number = Some(number.into());
        self
    }

    pub fn with_secondary_role(mut self, role: UserRole) -> Self {
        self.secondary_role = Some(role);
        self
    }
}

/// Fields for `PUT`/`PATCH /api/users/{id}/`.
///
/// A PUT needs `username` and `role`; the password is optional in both.
/// `secondary_role: Some(None)` clears the secondary role.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_role: Option<Option<UserRole>>,
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Matched against the username
    pub search: Option<String>,
    pub role: Option<UserRole>,
    pub secondary_role: Option<UserRole>,
}

impl UserFilter {
    fn apply(&self, request: ApiRequest) -> ApiRequest {
        request
            .query_opt("search", self.search.as_deref())
            .query_opt("role", self.role.map(|r| r.as_str()))
            .query_opt("secondary_role", self.secondary_role.map(|r| r.as_str()))
    }
}

/// Handle for `/api/users/`. Unlike the clinical collections, writes here
/// return the user itself rather than a `{"message", "data"}` envelope.
pub struct UsersApi<'a> {
    collection: Collection<'a>,
}

impl<'a> UsersApi<'a> {
    pub const PATH: &'static str = "/api/users/";

    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            collection: Collection::new(client, Self::PATH),
        }
    }

    pub async fn list(&self, filter: &UserFilter) -> ClientResult<Vec<User>> {
        let request = filter.apply(self.collection.list_request());
        self.collection.list(request).await
    }

    pub async fn get(&self, id: i64) -> ClientResult<User> {
        self.collection.get(id).await
    }

    pub async fn create(&self, user: &NewUser) -> ClientResult<User> {
        let request = ApiRequest::post(self.collection.path(), user)?;
        let created: User = self.collection.client().fetch(&request).await?;
        tracing::debug!(username = %created.username, role = created.role.as_str(), "User created");
        Ok(created)
    }

    pub async fn update(&self, id: i64, user: &UserUpdate) -> ClientResult<User> {
        let request = ApiRequest::put(self.collection.item_path(id), user)?;
        self.collection.client().fetch(&request).await
    }

    pub async fn partial_update(&self, id: i64, changes: &UserUpdate) -> ClientResult<User> {
        let request = ApiRequest::patch(self.collection.item_path(id), changes)?;
        self.collection.client().fetch(&request).await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.collection.delete(id).await
    }
}
