/// Stored user record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub login: String,
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Stored avatar image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Avatar {
    pub data: Vec<u8>,
}
