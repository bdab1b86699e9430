use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use havenz_auth_types::identity::Identity;
use havenz_auth_types::permission::Operation;

use crate::error::DashboardError;
use crate::state::AppState;
use crate::usecase::auth::ResolveIdentityUseCase;

/// Resolve the bearer credential into an [`Identity`] and store it in request extensions.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, DashboardError> {
    let usecase = ResolveIdentityUseCase {
        verifier: state.verifier.clone(),
        users: state.user_repo(),
        directory: state.directory.clone(),
        tasks: state.tasks.clone(),
    };
    let identity = usecase.execute(req.headers()).await?;
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Permission-table gate. Attach per route with
/// `from_fn_with_state(Operation::..., require_permission)`.
pub async fn require_permission(
    State(operation): State<Operation>,
    identity: Identity,
    req: Request,
    next: Next,
) -> Result<Response, DashboardError> {
    if !identity.can(operation) {
        warn!(
            user_id = %identity.id,
            role = %identity.role,
            operation = %operation,
            "operation not permitted for role"
        );
        return Err(DashboardError::Forbidden);
    }
    Ok(next.run(req).await)
}
