use serde::Serialize;
use uuid::Uuid;

use crate::models::{helper_profiles, placement_requests, users};

/// The authenticated party performing an action.
///
/// Built from the `users` row resolved by the auth extractor; the state
/// machine only ever sees this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub is_admin: bool,
}

impl Actor {
    pub fn user(user_id: Uuid) -> Self {
        Self {
            user_id,
            is_admin: false,
        }
    }

    pub fn admin(user_id: Uuid) -> Self {
        Self {
            user_id,
            is_admin: true,
        }
    }

    /// Whether the actor owns the request or is an admin.
    pub fn can_manage(&self, request: &placement_requests::Model) -> bool {
        self.is_admin || request.owner_user_id == self.user_id
    }

    pub fn owns_helper_profile(&self, profile: &helper_profiles::Model) -> bool {
        profile.user_id == self.user_id
    }
}

impl From<&users::Model> for Actor {
    fn from(user: &users::Model) -> Self {
        Self {
            user_id: user.id,
            is_admin: user.role == users::Roles::Admin,
        }
    }
}

/// How a viewer relates to a placement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Helper,
    Admin,
    Public,
}
