#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    Employee = 2,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Employee),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
        }
    }

    /// Role id for a role label; unknown labels fall back to Employee.
    pub fn id_from_label(label: &str) -> u8 {
        match label {
            "admin" => Role::Admin as u8,
            _ => Role::Employee as u8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_id_maps_known_roles() {
        assert_eq!(Role::from_id(1), Some(Role::Admin));
        assert_eq!(Role::from_id(2), Some(Role::Employee));
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(9), None);
    }

    #[test]
    fn label_round_trip() {
        assert_eq!(Role::id_from_label("admin"), Role::Admin as u8);
        assert_eq!(Role::id_from_label("employee"), Role::Employee as u8);
        // unknown labels never escalate
        assert_eq!(Role::id_from_label("superuser"), Role::Employee as u8);
    }
}
