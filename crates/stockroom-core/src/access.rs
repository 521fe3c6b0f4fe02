//! # Access Policy
//!
//! The caller's identity and role are resolved once per request and handed
//! to every component as a [`Caller`]. Components ask the caller what it may
//! do instead of comparing role strings.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Access Policy                                   │
//! │                                                                         │
//! │   request ──► gate (token → user row) ──► Caller { id, role, .. }       │
//! │                                              │                          │
//! │          ┌───────────────────┬───────────────┼───────────────────┐      │
//! │          ▼                   ▼               ▼                   ▼      │
//! │   require_admin()     sales_scope()    can_cancel(sale)   sees_customer │
//! │   Ok / Unauthorized   All / Employee   owner or admin       _totals()   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::id::RecordId;
use crate::types::{Sale, User};

// =============================================================================
// Role
// =============================================================================

/// The two roles known to the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    #[default]
    Employee,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "employee" => Ok(Role::Employee),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: vec!["admin".to_string(), "employee".to_string()],
            }),
        }
    }
}

// =============================================================================
// Sales Scope
// =============================================================================

/// Which sales a caller may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalesScope {
    /// Every sale in the store.
    All,
    /// Only sales whose `employee_id` matches.
    Employee(RecordId),
}

impl SalesScope {
    /// The employee filter to apply to queries, if any.
    pub fn employee_filter(&self) -> Option<RecordId> {
        match self {
            SalesScope::All => None,
            SalesScope::Employee(id) => Some(*id),
        }
    }

    pub fn permits(&self, sale: &Sale) -> bool {
        match self {
            SalesScope::All => true,
            SalesScope::Employee(id) => sale.employee_id == *id,
        }
    }
}

// =============================================================================
// Caller
// =============================================================================

/// The authenticated identity behind a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Caller {
    pub id: RecordId,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl Caller {
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fails with `Unauthorized` unless the caller is an admin.
    pub fn require_admin(&self) -> CoreResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(CoreError::Unauthorized("admin role required".to_string()))
        }
    }

    /// Admins see all sales; employees see their own.
    pub fn sales_scope(&self) -> SalesScope {
        match self.role {
            Role::Admin => SalesScope::All,
            Role::Employee => SalesScope::Employee(self.id),
        }
    }

    /// A sale may be cancelled by an admin or by the employee who made it.
    pub fn can_cancel(&self, sale: &Sale) -> bool {
        self.is_admin() || sale.employee_id == self.id
    }

    /// Whether the dashboard includes store-wide customer counts.
    pub fn sees_customer_totals(&self) -> bool {
        self.is_admin()
    }
}

impl From<&User> for Caller {
    fn from(user: &User) -> Self {
        Caller {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
