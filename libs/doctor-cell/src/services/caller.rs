use tracing::warn;
use uuid::Uuid;

use shared_models::auth::{Caller, Role, User};
use shared_models::error::AppError;

use crate::services::store::DoctorStore;

/// Turns an authenticated user into a [`Caller`], linking doctor accounts
/// to their doctor profile.
pub async fn resolve_caller(store: &dyn DoctorStore, user: &User) -> Result<Caller, AppError> {
    let user_id = Uuid::parse_str(&user.id)
        .map_err(|_| AppError::Auth("Invalid user id in token".to_string()))?;

    let role = user.app_role().ok_or_else(|| {
        warn!("User {} has no recognised role", user_id);
        AppError::Forbidden("Account has no booking role".to_string())
    })?;

    let caller = match role {
        Role::Patient => Caller::patient(user_id),
        Role::Admin => Caller::admin(user_id),
        Role::Staff => Caller::staff(user_id),
        Role::Doctor => {
            let doctor = store.find_by_user(user_id).await.map_err(AppError::from)?;
            match doctor {
                Some(doctor) => Caller::doctor(user_id, doctor.id),
                None => {
                    warn!("Doctor account {} has no doctor profile", user_id);
                    return Err(AppError::Forbidden("No doctor profile linked to this account".to_string()));
                }
            }
        }
    };

    Ok(caller)
}
