// easyrp-core/src/admin.rs
// ============================================================================
// Module: Admin Rules Export
// Description: Flavor-tree introspection for the admin console chart.
// Purpose: Render a flavor's rules in the triple format the orgchart widget
//          consumes.
// Dependencies: crate::flavors, rp-logic, serde_json
// ============================================================================

//! ## Overview
//! The admin console draws each flavor tree with the hosted orgchart widget,
//! which wants one `[{v, f}, parent, tooltip]` triple per node. Decision
//! nodes render their evaluator in a `switch` div, leaves render their
//! actions in an `action` div, and every non-root node prefixes the branch
//! value in a `condition` div.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rp_logic::Rule;
use serde_json::Value;
use serde_json::json;

use crate::flavors::FlavorError;
use crate::flavors::FlavorOptions;
use crate::flavors::LogicFlavor;
use crate::flavors::RpServices;
use crate::flavors::callback_popup_tree;
use crate::flavors::callback_redirect_tree;
use crate::flavors::legacy_signin_tree;
use crate::flavors::user_status_tree;

// ============================================================================
// SECTION: Rules Export
// ============================================================================

/// Builds a flavor's tree and exports its rules in definition order.
///
/// # Errors
/// Returns [`FlavorError`] when the flavor cannot be wired.
pub fn flavor_rules(
    flavor: LogicFlavor,
    services: &RpServices,
    options: FlavorOptions,
) -> Result<Vec<Rule>, FlavorError> {
    let rules = match flavor {
        LogicFlavor::UserStatus => user_status_tree(services, options)?.rules(),
        LogicFlavor::LegacySignin => legacy_signin_tree(services, options)?.rules(),
        LogicFlavor::CallbackPopup => callback_popup_tree(services, options)?.rules(),
        LogicFlavor::CallbackRedirect => callback_redirect_tree(services, options)?.rules(),
    };
    Ok(rules)
}

/// Renders rules as orgchart triples: `[{v, f}, parent, tooltip]`.
#[must_use]
pub fn widget_rules_json(rules: &[Rule]) -> Value {
    Value::Array(rules.iter().map(rule_triple).collect())
}

/// Renders one rule as an orgchart triple.
fn rule_triple(rule: &Rule) -> Value {
    let mut label = String::new();
    if let Some(parent_value) = &rule.parent_value {
        label.push_str(&format!("<div class=\"condition\">{parent_value}</div>"));
    }
    if let Some(evaluator) = &rule.evaluator {
        label.push_str(&format!("<div class=\"switch\">{evaluator}</div>"));
    }
    if let Some(actions) = &rule.actions {
        label.push_str(&format!("<div class=\"action\">[{}]</div>", actions.join(", ")));
    }
    let parent = rule.parent_id.clone().unwrap_or_default();
    json!([{ "v": rule.id, "f": label }, parent, rule.id])
}
