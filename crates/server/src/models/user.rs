use strum_macros::Display;

/// Identifier issued by the identity provider.
pub type UserId = String;

#[derive(Clone, Debug, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum UserRole {
    Admin,
    Regular,
}

impl UserRole {
    /// The identity provider stores free-text roles; anything but `admin` is regular.
    pub fn from_stored(role: Option<&str>) -> Self {
        match role {
            Some("admin") => Self::Admin,
            _ => Self::Regular,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admin_string_is_admin() {
        assert_eq!(UserRole::from_stored(Some("admin")), UserRole::Admin);
        assert_eq!(UserRole::from_stored(Some("user")), UserRole::Regular);
        assert_eq!(UserRole::from_stored(Some("Admin")), UserRole::Regular);
        assert_eq!(UserRole::from_stored(None), UserRole::Regular);
    }

    #[test]
    fn displays_in_snake_case() {
        assert_eq!(UserRole::Admin.to_string(), "admin");
    }
}
