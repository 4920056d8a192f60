//! Who may do what to whose leave.
//!
//! Every permission decision of the leave engine is made here, against the
//! single [`RULES`] table below.

use crate::auth::actor::Actor;
use crate::error::LeaveError;
use crate::model::leave_request::LeaveState;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Operation {
    ViewLeave,
    SetConfig,
    CreateRequest,
    EditRequest,
    Approve,
    CancelPending,
    CancelApproved,
}

impl Operation {
    /// Cancelling an approved absence is a stricter operation than
    /// withdrawing a pending one.
    pub fn cancel_for(state: LeaveState) -> Self {
        match state {
            LeaveState::Approved => Operation::CancelApproved,
            _ => Operation::CancelPending,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Operation::ViewLeave => "view this employee's leave",
            Operation::SetConfig => "set leave balances",
            Operation::CreateRequest => "request leave for this employee",
            Operation::EditRequest => "edit this leave request",
            Operation::Approve => "approve leave",
            Operation::CancelPending => "cancel this leave request",
            Operation::CancelApproved => "cancel approved leave",
        }
    }
}

/// How the actor relates to the employee being acted on.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Relation {
    Administrator,
    OwnEmployee,
    Other,
}

impl Relation {
    pub fn of(actor: &Actor, target_employee_id: u64) -> Self {
        if actor.is_administrative() {
            Relation::Administrator
        } else if actor.is_self(target_employee_id) {
            Relation::OwnEmployee
        } else {
            Relation::Other
        }
    }
}

struct Rule {
    operation: Operation,
    own_employee: bool,
    administrator: bool,
}

const fn rule(operation: Operation, own_employee: bool, administrator: bool) -> Rule {
    Rule {
        operation,
        own_employee,
        administrator,
    }
}

// Nobody unrelated to the employee is ever allowed, so there is no column for it.
const RULES: &[Rule] = &[
    rule(Operation::ViewLeave, true, true),
    rule(Operation::SetConfig, false, true),
    rule(Operation::CreateRequest, true, true),
    rule(Operation::EditRequest, true, true),
    rule(Operation::Approve, false, true),
    rule(Operation::CancelPending, true, true),
    rule(Operation::CancelApproved, false, true),
];

#[derive(Debug, Default, Clone, Copy)]
pub struct AuthorizationGate;

impl AuthorizationGate {
    pub fn allows(&self, relation: Relation, operation: Operation) -> bool {
        RULES
            .iter()
            .find(|r| r.operation == operation)
            .map(|r| match relation {
                Relation::Administrator => r.administrator,
                Relation::OwnEmployee => r.own_employee,
                Relation::Other => false,
            })
            .unwrap_or(false)
    }

    pub fn check(
        &self,
        actor: &Actor,
        operation: Operation,
        target_employee_id: u64,
    ) -> Result<(), LeaveError> {
        self.decide(actor, Relation::of(actor, target_employee_id), operation)
    }

    /// For operations only administrators may perform, whoever the target is.
    pub fn check_capability(&self, actor: &Actor, operation: Operation) -> Result<(), LeaveError> {
        let relation = if actor.is_administrative() {
            Relation::Administrator
        } else {
            Relation::Other
        };
        self.decide(actor, relation, operation)
    }

    fn decide(
        &self,
        actor: &Actor,
        relation: Relation,
        operation: Operation,
    ) -> Result<(), LeaveError> {
        if self.allows(relation, operation) {
            Ok(())
        } else {
            tracing::info!(
                user_id = actor.user_id,
                employee_id = ?actor.employee_id,
                ?operation,
                ?relation,
                "Authorization denied"
            );
            Err(LeaveError::Unauthorized(operation.describe()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;

    fn actor(role: Role, employee_id: Option<u64>) -> Actor {
        Actor {
            user_id: 1,
            username: "u".into(),
            role,
            employee_id,
        }
    }

    #[test]
    fn rule_matrix_matches_the_policy() {
        use Operation::*;
        let gate = AuthorizationGate;
        let expected = [
            (ViewLeave, true, true),
            (SetConfig, false, true),
            (CreateRequest, true, true),
            (EditRequest, true, true),
            (Approve, false, true),
            (CancelPending, true, true),
            (CancelApproved, false, true),
        ];

        for (op, own, admin) in expected {
            assert_eq!(gate.allows(Relation::OwnEmployee, op), own, "{op:?} self");
            assert_eq!(gate.allows(Relation::Administrator, op), admin, "{op:?} admin");
            assert!(!gate.allows(Relation::Other, op), "{op:?} other");
        }
    }

    #[test]
    fn relation_prefers_administrator_over_self() {
        assert_eq!(
            Relation::of(&actor(Role::Hr, Some(5)), 5),
            Relation::Administrator
        );
        assert_eq!(
            Relation::of(&actor(Role::Employee, Some(5)), 5),
            Relation::OwnEmployee
        );
        assert_eq!(Relation::of(&actor(Role::Employee, Some(5)), 6), Relation::Other);
    }

    #[test]
    fn actor_without_employee_link_has_no_self_service() {
        let gate = AuthorizationGate;
        let unlinked = actor(Role::Employee, None);
        assert!(gate.check(&unlinked, Operation::CreateRequest, 5).is_err());
        assert!(gate.check(&unlinked, Operation::ViewLeave, 5).is_err());
    }

    #[test]
    fn non_admin_service_roles_act_only_as_self() {
        let gate = AuthorizationGate;
        let system = actor(Role::System, Some(5));
        assert!(gate.check(&system, Operation::CreateRequest, 5).is_ok());
        assert!(gate.check(&system, Operation::Approve, 5).is_err());
        assert!(gate.check(&system, Operation::CreateRequest, 6).is_err());
    }

    #[test]
    fn cancel_operation_depends_on_state() {
        assert_eq!(
            Operation::cancel_for(LeaveState::Approved),
            Operation::CancelApproved
        );
        assert_eq!(
            Operation::cancel_for(LeaveState::Pending),
            Operation::CancelPending
        );
    }

    #[test]
    fn capability_check_ignores_the_target() {
        let gate = AuthorizationGate;
        assert!(gate.check_capability(&actor(Role::Admin, None), Operation::Approve).is_ok());
        assert!(
            gate.check_capability(&actor(Role::Employee, Some(5)), Operation::Approve)
                .is_err()
        );
    }

    #[test]
    fn denial_is_reported_as_unauthorized() {
        let err = AuthorizationGate
            .check(&actor(Role::Employee, Some(5)), Operation::Approve, 5)
            .unwrap_err();
        assert_eq!(err.label(), "Unauthorized");
    }
}
