use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    Hr = 2,
    Employee = 3,
}

/// Per-screen action flags handed to the client. The UI consumes these as
/// plain booleans to gate buttons; the server re-checks them on every call.
#[derive(Debug, Copy, Clone, Serialize, ToSchema)]
pub struct Capabilities {
    pub can_view: bool,
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Hr),
            3 => Some(Role::Employee),
            _ => None,
        }
    }

    pub fn capabilities(self) -> Capabilities {
        match self {
            Role::Admin => Capabilities {
                can_view: true,
                can_create: true,
                can_edit: true,
                can_delete: true,
            },
            Role::Hr => Capabilities {
                can_view: true,
                can_create: true,
                can_edit: true,
                can_delete: false,
            },
            // Employees see their own records and submit requests.
            Role::Employee => Capabilities {
                can_view: true,
                can_create: true,
                can_edit: false,
                can_delete: false,
            },
        }
    }
}
