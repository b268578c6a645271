//! Session middleware.

use std::sync::Arc;

use salvo::prelude::*;

use crate::{auth::session::SessionUser, extensions::*, state::State};

/// Rejects requests without a live server session and exposes the signed-in user to
/// handlers.
#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let Ok(state) = depot.obtain::<Arc<State>>().map(Arc::clone) else {
        res.render(StatusError::internal_server_error());
        ctrl.skip_rest();

        return;
    };

    let user = match SessionUser::resolve(req, state.identity.as_ref()).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            res.render(StatusError::unauthorized().brief("Sign in required"));
            ctrl.skip_rest();

            return;
        }
        Err(_) => {
            res.render(StatusError::internal_server_error());
            ctrl.skip_rest();

            return;
        }
    };

    depot.insert_session_user(user);

    ctrl.call_next(req, depot, res).await;
}
