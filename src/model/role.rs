use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum Role {
    Admin = 1,
    Hr = 2,
    Employee = 3,
    System = 4,
    ApiUser = 5,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Hr),
            3 => Some(Role::Employee),
            4 => Some(Role::System),
            5 => Some(Role::ApiUser),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    /// Admin and HR may manage balances and approve or cancel anyone's leave.
    pub fn is_administrative(self) -> bool {
        matches!(self, Role::Admin | Role::Hr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ids_round_trip_through_the_table() {
        for id in 1..=5 {
            let role = Role::from_id(id).unwrap();
            assert_eq!(role.id(), id);
        }
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(6), None);
    }

    #[test]
    fn only_admin_and_hr_are_administrative() {
        assert!(Role::Admin.is_administrative());
        assert!(Role::Hr.is_administrative());
        assert!(!Role::Employee.is_administrative());
        assert!(!Role::System.is_administrative());
        assert!(!Role::ApiUser.is_administrative());
    }
}
