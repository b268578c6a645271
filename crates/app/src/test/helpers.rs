//! Test Helpers

use crate::auth::NewRegistration;

/// Registration for `login` with email `<login>@example.com`, password
/// `correct horse` and a capitalised nickname.
pub(crate) fn registration(login: &str) -> NewRegistration {
    let mut chars = login.chars();
    let nickname = chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default();

    NewRegistration {
        login: login.to_string(),
        email: format!("{login}@example.com"),
        password: "correct horse".to_string(),
        nickname,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_capitalises_nickname() {
        let registration = registration("alice");

        assert_eq!(registration.nickname, "Alice");
        assert_eq!(registration.email, "alice@example.com");
    }
}
