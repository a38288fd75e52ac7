//! Single-owner access checks.
//!
//! Every directory and file has exactly one owner. The only question the
//! guard answers is whether the calling principal is that owner.

use uuid::Uuid;

use crate::workspace::User;

/// Anything with a single owning user.
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied,
    Unauthenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    #[error("missing credentials")]
    Unauthenticated,
    #[error("you do not have access to this resource")]
    Forbidden,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }

    pub fn into_result(self) -> Result<(), GuardError> {
        match self {
            Decision::Allowed => Ok(()),
            Decision::Denied => Err(GuardError::Forbidden),
            Decision::Unauthenticated => Err(GuardError::Unauthenticated),
        }
    }
}

/// Decide whether `principal` may act on `entity`.
///
/// A missing principal is reported as [`Decision::Unauthenticated`] before
/// ownership is looked at.
pub fn authorize<T>(principal: Option<&User>, entity: &T) -> Decision
where
    T: Owned + ?Sized,
{
    match principal {
        None => Decision::Unauthenticated,
        Some(user) if user.id == entity.owner_id() => Decision::Allowed,
        Some(_) => Decision::Denied,
    }
}

/// Resolve the principal or fail with [`GuardError::Unauthenticated`].
pub fn authenticated(principal: Option<&User>) -> Result<&User, GuardError> {
    principal.ok_or(GuardError::Unauthenticated)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Thing(Uuid);

    impl Owned for Thing {
        fn owner_id(&self) -> Uuid {
            self.0
        }
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            login: "alice".to_string(),
        }
    }

    #[test]
    fn test_owner_is_allowed() {
        let alice = user();
        let thing = Thing(alice.id);
        assert_eq!(authorize(Some(&alice), &thing), Decision::Allowed);
        assert!(authorize(Some(&alice), &thing).into_result().is_ok());
    }

    #[test]
    fn test_other_user_is_denied() {
        let alice = user();
        let thing = Thing(Uuid::new_v4());
        assert_eq!(authorize(Some(&alice), &thing), Decision::Denied);
        assert_eq!(
            authorize(Some(&alice), &thing).into_result(),
            Err(GuardError::Forbidden)
        );
    }

    #[test]
    fn test_missing_principal_is_unauthenticated() {
        let thing = Thing(Uuid::new_v4());
        assert_eq!(authorize(None, &thing), Decision::Unauthenticated);
        assert_eq!(authenticated(None), Err(GuardError::Unauthenticated));
    }
}
