//! Resource domains and the operations checked against them.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejection of a string that does not name a known module, action or role.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown module '{0}'")]
    UnknownModule(String),

    #[error("unknown action '{0}'")]
    UnknownAction(String),

    #[error("unknown role '{0}'")]
    UnknownRole(String),
}

/// Named resource domain subject to permission checks.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Module {
    Vehicle,
    Expense,
    Trips,
    Customers,
    Drivers,
    Users,
}

impl Module {
    pub const ALL: [Module; 6] = [
        Module::Vehicle,
        Module::Expense,
        Module::Trips,
        Module::Customers,
        Module::Drivers,
        Module::Users,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Vehicle => "vehicle",
            Module::Expense => "expense",
            Module::Trips => "trips",
            Module::Customers => "customers",
            Module::Drivers => "drivers",
            Module::Users => "users",
        }
    }

    /// URL section under which the module's screens and endpoints live.
    pub fn section_path(&self) -> &'static str {
        match self {
            Module::Vehicle => "/vehicles",
            Module::Expense => "/expenses",
            Module::Trips => "/trips",
            Module::Customers => "/customers",
            Module::Drivers => "/drivers",
            Module::Users => "/users",
        }
    }
}

impl core::fmt::Display for Module {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Module {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Module::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ParseError::UnknownModule(s.to_string()))
    }
}

/// Operation on a module.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::View, Action::Create, Action::Edit, Action::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| ParseError::UnknownAction(s.to_string()))
    }
}
