//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::{Depot, StatusError};

use crate::auth::session::SessionUser;

const SESSION_USER_DEPOT_KEY: &str = "session_user";

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    fn insert_session_user(&mut self, user: SessionUser);

    fn session_user(&self) -> Option<&SessionUser>;

    fn session_user_or_401(&self) -> Result<&SessionUser, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_session_user(&mut self, user: SessionUser) {
        self.insert(SESSION_USER_DEPOT_KEY, user);
    }

    fn session_user(&self) -> Option<&SessionUser> {
        self.get::<SessionUser>(SESSION_USER_DEPOT_KEY).ok()
    }

    fn session_user_or_401(&self) -> Result<&SessionUser, StatusError> {
        self.session_user()
            .ok_or_else(|| StatusError::unauthorized().brief("Sign in required"))
    }
}

#[cfg(test)]
mod tests {
    use orbit_app::auth::UserId;

    use super::*;

    #[test]
    fn session_user_round_trips_through_the_depot() {
        let mut depot = Depot::new();

        assert!(depot.session_user_or_401().is_err(), "empty depot is anonymous");

        depot.insert_session_user(SessionUser {
            id: UserId::from_i64(3),
            nickname: "Alice".to_owned(),
        });

        assert_eq!(
            depot.session_user().map(|user| user.id),
            Some(UserId::from_i64(3))
        );
    }
}
