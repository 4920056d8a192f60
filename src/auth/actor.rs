use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized};
use futures::future::{Ready, ready};

use crate::model::role::Role;

/// Whoever is calling into the leave engine. Passed explicitly to every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

impl Actor {
    pub fn is_administrative(&self) -> bool {
        self.role.is_administrative()
    }

    /// True when the actor's linked employee is `employee_id`.
    pub fn is_self(&self, employee_id: u64) -> bool {
        self.employee_id == Some(employee_id)
    }
}

impl FromRequest for Actor {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    // The auth middleware has already verified the token.
    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<Actor>() {
            Some(actor) => ready(Ok(actor.clone())),
            None => ready(Err(ErrorUnauthorized("Missing token"))),
        }
    }
}
