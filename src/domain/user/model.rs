//! User domain entity

/// Fleet user
#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub id: String,
    /// Unique display name, also the login name
    pub name: String,
    /// bcrypt hash of the user's secret
    pub password_hash: String,
}

impl User {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            password_hash: password_hash.into(),
        }
    }

    /// Whether `id_or_name` refers to this user.
    pub fn is_identified_by(&self, id_or_name: &str) -> bool {
        self.id == id_or_name || self.name == id_or_name
    }
}
