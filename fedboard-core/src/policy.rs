// Copyright 2025 Fedboard Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Role-based access policy
//!
//! Every gated route asks [`authorize`] for a decision; no route carries its
//! own role check.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role carried by an authenticated session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Client,
    Clinic,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Client => "client",
            Role::Clinic => "clinic",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "client" => Ok(Role::Client),
            "clinic" => Ok(Role::Clinic),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Something a session may or may not reach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Dashboard page
    Dashboard,
    /// Clients page
    Clients,
    /// Single-image classification demo
    ModelTrial,
    /// Connection test, clear, round and sample ingestion
    DatabaseAdmin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }
}

pub fn authorize(role: Role, resource: Resource) -> Decision {
    let allowed = match resource {
        Resource::Dashboard | Resource::Clients | Resource::DatabaseAdmin => role == Role::Admin,
        Resource::ModelTrial => role == Role::Clinic,
    };
    if allowed {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_table() {
        let cases = [
            (Role::Admin, Resource::Dashboard, Decision::Allow),
            (Role::Admin, Resource::Clients, Decision::Allow),
            (Role::Admin, Resource::DatabaseAdmin, Decision::Allow),
            (Role::Admin, Resource::ModelTrial, Decision::Deny),
            (Role::Clinic, Resource::ModelTrial, Decision::Allow),
            (Role::Clinic, Resource::Dashboard, Decision::Deny),
            (Role::Clinic, Resource::DatabaseAdmin, Decision::Deny),
            (Role::Client, Resource::Dashboard, Decision::Deny),
            (Role::Client, Resource::Clients, Decision::Deny),
            (Role::Client, Resource::ModelTrial, Decision::Deny),
            (Role::Client, Resource::DatabaseAdmin, Decision::Deny),
        ];
        for (role, resource, expected) in cases {
            assert_eq!(authorize(role, resource), expected, "{role} -> {resource:?}");
        }
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("Admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("clinic".parse::<Role>(), Ok(Role::Clinic));
        assert!("root".parse::<Role>().is_err());
        assert_eq!(serde_json::to_string(&Role::Client).unwrap(), "\"client\"");
    }
}
