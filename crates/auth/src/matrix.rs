//! Static role-based permission matrix.
//!
//! Every allowed `(module, action, role)` triple is listed literally in
//! [`DEFAULT_GRANTS`]. There is no role hierarchy: a role gets an action only
//! when it appears in that action's row. A pair with no row denies everyone.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Serialize;
use thiserror::Error;

use crate::{Action, Module, Role};

/// One row of the matrix: the roles allowed to perform `action` on `module`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grant {
    pub module: Module,
    pub action: Action,
    pub roles: &'static [Role],
}

impl Grant {
    pub const fn new(module: Module, action: Action, roles: &'static [Role]) -> Self {
        Self { module, action, roles }
    }
}

const EVERYONE: &[Role] = &[Role::Admin, Role::Editor, Role::Viewer, Role::Creator];
const WRITERS: &[Role] = &[Role::Admin, Role::Editor, Role::Creator];
const EDITORS: &[Role] = &[Role::Admin, Role::Editor];
const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// The back office's permission table.
pub const DEFAULT_GRANTS: &[Grant] = &[
    Grant::new(Module::Vehicle, Action::View, EVERYONE),
    Grant::new(Module::Vehicle, Action::Create, WRITERS),
    Grant::new(Module::Vehicle, Action::Edit, EDITORS),
    Grant::new(Module::Vehicle, Action::Delete, ADMIN_ONLY),
    Grant::new(Module::Expense, Action::View, EVERYONE),
    Grant::new(Module::Expense, Action::Create, WRITERS),
    Grant::new(Module::Expense, Action::Edit, EDITORS),
    Grant::new(Module::Expense, Action::Delete, ADMIN_ONLY),
    Grant::new(Module::Trips, Action::View, EVERYONE),
    Grant::new(Module::Trips, Action::Create, WRITERS),
    Grant::new(Module::Trips, Action::Edit, EDITORS),
    Grant::new(Module::Trips, Action::Delete, ADMIN_ONLY),
    Grant::new(Module::Customers, Action::View, EVERYONE),
    Grant::new(Module::Customers, Action::Create, WRITERS),
    Grant::new(Module::Customers, Action::Edit, EDITORS),
    Grant::new(Module::Customers, Action::Delete, ADMIN_ONLY),
    Grant::new(Module::Drivers, Action::View, EVERYONE),
    Grant::new(Module::Drivers, Action::Create, WRITERS),
    Grant::new(Module::Drivers, Action::Edit, EDITORS),
    Grant::new(Module::Drivers, Action::Delete, ADMIN_ONLY),
    // User invitations are administered by admins only.
    Grant::new(Module::Users, Action::View, ADMIN_ONLY),
    Grant::new(Module::Users, Action::Create, ADMIN_ONLY),
    Grant::new(Module::Users, Action::Edit, ADMIN_ONLY),
    Grant::new(Module::Users, Action::Delete, ADMIN_ONLY),
];

static GLOBAL: LazyLock<PermissionMatrix> =
    LazyLock::new(|| PermissionMatrix::from_grants(DEFAULT_GRANTS.iter().copied()));

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: role {role} may not {action} {module}")]
    Forbidden {
        module: Module,
        action: Action,
        role: Role,
    },
}

/// Actions a role may perform on one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capability {
    pub module: Module,
    pub actions: Vec<Action>,
}

/// Auditable account of a single permission decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionExplanation {
    pub module: Module,
    pub action: Action,
    pub role: Role,
    pub granted: bool,
    pub allowed_roles: Vec<Role>,
    pub reason: String,
}

/// Immutable `(module, action) -> roles` lookup table.
#[derive(Debug, Clone, Default)]
pub struct PermissionMatrix {
    grants: HashMap<(Module, Action), &'static [Role]>,
}

impl PermissionMatrix {
    /// Build a matrix from grant rows. A later row for the same pair replaces
    /// an earlier one.
    pub fn from_grants(grants: impl IntoIterator<Item = Grant>) -> Self {
        let grants = grants
            .into_iter()
            .map(|g| ((g.module, g.action), g.roles))
            .collect();
        Self { grants }
    }

    /// The process-wide matrix built from [`DEFAULT_GRANTS`].
    pub fn global() -> &'static PermissionMatrix {
        &GLOBAL
    }

    /// Roles listed for the pair; empty when the pair has no row.
    pub fn allowed_roles(&self, module: Module, action: Action) -> &[Role] {
        self.grants.get(&(module, action)).copied().unwrap_or(&[])
    }

    pub fn has_permission(&self, module: Module, action: Action, role: Role) -> bool {
        self.allowed_roles(module, action).contains(&role)
    }

    pub fn authorize(&self, module: Module, action: Action, role: Role) -> Result<(), AuthzError> {
        if self.has_permission(module, action, role) {
            Ok(())
        } else {
            Err(AuthzError::Forbidden { module, action, role })
        }
    }

    /// Per module, the actions `role` may perform. Modules with no allowed
    /// action are omitted.
    pub fn capabilities(&self, role: Role) -> Vec<Capability> {
        Module::ALL
            .into_iter()
            .filter_map(|module| {
                let actions: Vec<Action> = Action::ALL
                    .into_iter()
                    .filter(|action| self.has_permission(module, *action, role))
                    .collect();
                (!actions.is_empty()).then_some(Capability { module, actions })
            })
            .collect()
    }

    pub fn explain(&self, module: Module, action: Action, role: Role) -> PermissionExplanation {
        let allowed_roles = self.allowed_roles(module, action).to_vec();
        let granted = allowed_roles.contains(&role);

        let reason = if allowed_roles.is_empty() {
            format!("no rule defined for {module}.{action}; access is denied to every role")
        } else if granted {
            format!("{role} is listed for {module}.{action}")
        } else {
            let listed: Vec<&str> = allowed_roles.iter().map(|r| r.as_str()).collect();
            format!(
                "{role} is not listed for {module}.{action} (allowed: {})",
                listed.join(", ")
            )
        };

        PermissionExplanation {
            module,
            action,
            role,
            granted,
            allowed_roles,
            reason,
        }
    }
}

/// Whether `role` may perform `action` on `module`, per the global matrix.
pub fn has_permission(module: Module, action: Action, role: Role) -> bool {
    PermissionMatrix::global().has_permission(module, action, role)
}

/// String-boundary form of [`has_permission`].
///
/// Any value that does not name a known module, action or role denies.
pub fn has_permission_str(module: &str, action: &str, role: &str) -> bool {
    match (module.parse::<Module>(), action.parse::<Action>(), role.parse::<Role>()) {
        (Ok(m), Ok(a), Ok(r)) => has_permission(m, a, r),
        _ => {
            tracing::debug!(module, action, role, "permission lookup with unknown input; denying");
            false
        }
    }
}

/// Server-side enforcement against the global matrix.
pub fn authorize(module: Module, action: Action, role: Role) -> Result<(), AuthzError> {
    PermissionMatrix::global().authorize(module, action, role)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn triples() -> impl Iterator<Item = (Module, Action, Role)> {
        Module::ALL.into_iter().flat_map(|m| {
            Action::ALL
                .into_iter()
                .flat_map(move |a| Role::ALL.into_iter().map(move |r| (m, a, r)))
        })
    }

    #[test]
    fn viewer_cannot_create_vehicles() {
        assert!(!has_permission(Module::Vehicle, Action::Create, Role::Viewer));
        assert_eq!(
            PermissionMatrix::global().allowed_roles(Module::Vehicle, Action::Create),
            &[Role::Admin, Role::Editor, Role::Creator]
        );
    }

    #[test]
    fn admin_is_sole_user_deleter() {
        assert!(has_permission(Module::Users, Action::Delete, Role::Admin));
        for role in [Role::Editor, Role::Viewer, Role::Creator] {
            assert!(!has_permission(Module::Users, Action::Delete, role));
        }
    }

    #[test]
    fn unknown_module_string_denies_without_panicking() {
        assert!(!has_permission_str("unknown_module", "view", "ADMIN"));
        assert!(!has_permission_str("vehicle", "approve", "ADMIN"));
        assert!(!has_permission_str("vehicle", "view", "OWNER"));
        assert!(has_permission_str("vehicle", "view", "VIEWER"));
    }

    #[test]
    fn every_default_pair_has_a_row() {
        let matrix = PermissionMatrix::global();
        for m in Module::ALL {
            for a in Action::ALL {
                assert!(
                    !matrix.allowed_roles(m, a).is_empty(),
                    "missing row for {m}.{a}"
                );
            }
        }
    }

    #[test]
    fn absent_pair_denies_every_role() {
        let matrix = PermissionMatrix::from_grants([Grant::new(
            Module::Trips,
            Action::View,
            &[Role::Viewer],
        )]);

        for role in Role::ALL {
            assert!(!matrix.has_permission(Module::Trips, Action::Delete, role));
            assert!(!matrix.has_permission(Module::Vehicle, Action::View, role));
        }
        assert!(PermissionMatrix::default().capabilities(Role::Admin).is_empty());
    }

    #[test]
    fn no_role_hierarchy() {
        // Granting VIEWER must not implicitly grant ADMIN.
        let matrix = PermissionMatrix::from_grants([Grant::new(
            Module::Expense,
            Action::View,
            &[Role::Viewer],
        )]);
        assert!(matrix.has_permission(Module::Expense, Action::View, Role::Viewer));
        assert!(!matrix.has_permission(Module::Expense, Action::View, Role::Admin));
    }

    #[test]
    fn later_row_replaces_earlier_row() {
        let matrix = PermissionMatrix::from_grants([
            Grant::new(Module::Drivers, Action::Edit, &[Role::Admin, Role::Editor]),
            Grant::new(Module::Drivers, Action::Edit, &[Role::Admin]),
        ]);
        assert!(!matrix.has_permission(Module::Drivers, Action::Edit, Role::Editor));
    }

    #[test]
    fn authorize_reports_the_denied_triple() {
        let err = authorize(Module::Customers, Action::Delete, Role::Editor).unwrap_err();
        assert_eq!(
            err,
            AuthzError::Forbidden {
                module: Module::Customers,
                action: Action::Delete,
                role: Role::Editor,
            }
        );
        assert_eq!(err.to_string(), "forbidden: role EDITOR may not delete customers");
        assert!(authorize(Module::Customers, Action::Delete, Role::Admin).is_ok());
    }

    #[test]
    fn viewer_capabilities_are_read_only_and_exclude_users() {
        let caps = PermissionMatrix::global().capabilities(Role::Viewer);
        assert_eq!(caps.len(), 5);
        assert!(caps.iter().all(|c| c.actions == vec![Action::View]));
        assert!(caps.iter().all(|c| c.module != Module::Users));
    }

    #[test]
    fn explain_lists_allowed_roles_on_denial() {
        let explanation =
            PermissionMatrix::global().explain(Module::Vehicle, Action::Create, Role::Viewer);
        assert!(!explanation.granted);
        assert_eq!(
            explanation.allowed_roles,
            vec![Role::Admin, Role::Editor, Role::Creator]
        );
        assert!(explanation.reason.contains("ADMIN, EDITOR, CREATOR"));

        let empty = PermissionMatrix::default().explain(Module::Users, Action::View, Role::Admin);
        assert!(!empty.granted);
        assert!(empty.reason.contains("no rule defined"));
    }

    #[test]
    fn decisions_match_literal_rows() {
        let matrix = PermissionMatrix::global();
        for (m, a, r) in triples() {
            let listed = DEFAULT_GRANTS
                .iter()
                .filter(|g| g.module == m && g.action == a)
                .any(|g| g.roles.contains(&r));
            assert_eq!(matrix.has_permission(m, a, r), listed, "{m}.{a} for {r}");
        }
    }

    fn module() -> impl Strategy<Value = Module> {
        prop::sample::select(Module::ALL.to_vec())
    }

    fn action() -> impl Strategy<Value = Action> {
        prop::sample::select(Action::ALL.to_vec())
    }

    fn role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::ALL.to_vec())
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: a decision is true iff the role is literally listed.
        #[test]
        fn decision_iff_role_listed(m in module(), a in action(), r in role()) {
            let matrix = PermissionMatrix::global();
            prop_assert_eq!(
                matrix.has_permission(m, a, r),
                matrix.allowed_roles(m, a).contains(&r)
            );
        }

        /// Property: repeated lookups agree and leave the table untouched.
        #[test]
        fn lookups_are_deterministic(m in module(), a in action(), r in role()) {
            let before = PermissionMatrix::global().allowed_roles(m, a).to_vec();
            let first = has_permission(m, a, r);
            let second = has_permission(m, a, r);
            prop_assert_eq!(first, second);
            prop_assert_eq!(PermissionMatrix::global().allowed_roles(m, a), before.as_slice());
        }

        /// Property: arbitrary strings never panic and only known names can allow.
        #[test]
        fn string_lookup_never_panics(m in "\\PC{0,12}", a in "\\PC{0,8}", r in "\\PC{0,8}") {
            let allowed = has_permission_str(&m, &a, &r);
            if allowed {
                prop_assert!(m.parse::<Module>().is_ok());
                prop_assert!(a.parse::<Action>().is_ok());
                prop_assert!(r.parse::<Role>().is_ok());
            }
        }
    }
}
