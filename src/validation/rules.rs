// Rule sets per endpoint

use super::{Check, RuleSet};
use crate::models::Role;

pub fn path_id() -> RuleSet {
    RuleSet::new().required("id", [Check::Integer])
}

pub fn cat_create() -> RuleSet {
    RuleSet::new()
        .required("cat_name", [Check::text(1, 100)])
        .required("weight", [Check::positive_number()])
        .required("birthdate", [Check::Date])
}

pub fn cat_update() -> RuleSet {
    RuleSet::new()
        .optional("cat_name", [Check::text(1, 100)])
        .optional("weight", [Check::positive_number()])
        .optional("birthdate", [Check::Date])
}

pub fn user_create() -> RuleSet {
    RuleSet::new()
        .required("user_name", [Check::text(1, 100)])
        .optional("email", [Check::Email])
        .required("password", [Check::min_text(1)])
}

/// Self-service update; `role` is not accepted here
pub fn user_update() -> RuleSet {
    RuleSet::new()
        .optional("user_name", [Check::text(1, 100)])
        .optional("email", [Check::Email])
        .optional("password", [Check::min_text(1)])
}

pub fn user_admin_update() -> RuleSet {
    user_update().optional("role", [Check::OneOf(Role::NAMES)])
}
