use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value as Json};

use crate::{ActionInvocation, Condition, Leaf, Operator, Rule, RuleError, Value};

const NODE_SHAPE: &str = "expected a leaf {name, operator, value} or a group {all|any: [...]}";

impl Condition {
    /// Convert a JSON condition tree, rejecting anything that is neither a
    /// leaf nor an `all`/`any` group.
    ///
    /// # Errors
    ///
    /// [`RuleError::MalformedRule`] with the JSON path of the offending node,
    /// or [`RuleError::InvalidOperator`] for an operator name that does not
    /// exist.
    pub fn from_json(value: &Json) -> Result<Self, RuleError> {
        condition_from_json(value, "conditions")
    }

    /// The JSON shape accepted by [`from_json`](Self::from_json).
    #[must_use]
    pub fn to_json(&self) -> Json {
        match self {
            Condition::All(children) => group_json("all", children),
            Condition::Any(children) => group_json("any", children),
            Condition::Leaf(leaf) => {
                let mut map = Map::new();
                map.insert("name".into(), Json::from(leaf.name.as_str()));
                map.insert("operator".into(), Json::from(leaf.operator.name()));
                if let Some(value) = &leaf.value {
                    map.insert("value".into(), value_json(value));
                }
                Json::Object(map)
            }
        }
    }
}

fn group_json(keyword: &str, children: &[Condition]) -> Json {
    let mut map = Map::new();
    map.insert(
        keyword.into(),
        Json::Array(children.iter().map(Condition::to_json).collect()),
    );
    Json::Object(map)
}

fn value_json(value: &Value) -> Json {
    match value {
        Value::Bool(b) => Json::from(*b),
        Value::Int(i) => Json::from(*i),
        Value::Float(f) => Json::from(*f),
        Value::String(s) => Json::from(s.as_str()),
        Value::List(items) => Json::Array(items.iter().map(value_json).collect()),
    }
}

pub(crate) fn condition_from_json(value: &Json, path: &str) -> Result<Condition, RuleError> {
    let Json::Object(map) = value else {
        return Err(RuleError::malformed(path, NODE_SHAPE));
    };

    match (map.get("all"), map.get("any")) {
        (Some(_), Some(_)) => Err(RuleError::malformed(path, "node has both 'all' and 'any'")),
        (Some(children), None) => Ok(Condition::All(group_from_json(children, path, "all")?)),
        (None, Some(children)) => Ok(Condition::Any(group_from_json(children, path, "any")?)),
        (None, None) if map.contains_key("name") || map.contains_key("operator") => {
            leaf_from_json(map, path).map(Condition::Leaf)
        }
        (None, None) => Err(RuleError::malformed(path, NODE_SHAPE)),
    }
}

fn group_from_json(
    children: &Json,
    path: &str,
    keyword: &str,
) -> Result<Vec<Condition>, RuleError> {
    let Json::Array(children) = children else {
        return Err(RuleError::malformed(
            format!("{path}.{keyword}"),
            "expected an array of conditions",
        ));
    };
    children
        .iter()
        .enumerate()
        .map(|(i, child)| condition_from_json(child, &format!("{path}.{keyword}[{i}]")))
        .collect()
}

fn leaf_from_json(map: &Map<String, Json>, path: &str) -> Result<Leaf, RuleError> {
    let name = map
        .get("name")
        .and_then(Json::as_str)
        .ok_or_else(|| RuleError::malformed(format!("{path}.name"), "expected a variable name"))?;
    let operator_name = map.get("operator").and_then(Json::as_str).ok_or_else(|| {
        RuleError::malformed(format!("{path}.operator"), "expected an operator name")
    })?;
    let operator = Operator::from_name(operator_name).ok_or_else(|| RuleError::InvalidOperator {
        operator: operator_name.to_owned(),
        field_type: None,
    })?;
    let value = match map.get("value") {
        None | Some(Json::Null) => None,
        Some(raw) => Some(
            Value::deserialize(raw)
                .map_err(|e| RuleError::malformed(format!("{path}.value"), e.to_string()))?,
        ),
    };
    Ok(Leaf {
        name: name.to_owned(),
        operator,
        value,
    })
}

pub(crate) fn rule_from_json(value: &Json, path: &str) -> Result<Rule, RuleError> {
    let Json::Object(map) = value else {
        return Err(RuleError::malformed(path, "expected a rule object"));
    };
    let conditions = map.get("conditions").ok_or_else(|| {
        RuleError::malformed(format!("{path}.conditions"), "rule has no condition tree")
    })?;
    let conditions = condition_from_json(conditions, &format!("{path}.conditions"))?;

    let actions = match map.get("actions") {
        None | Some(Json::Null) => Vec::new(),
        Some(Json::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                ActionInvocation::deserialize(item).map_err(|e| {
                    RuleError::malformed(format!("{path}.actions[{i}]"), e.to_string())
                })
            })
            .collect::<Result<_, _>>()?,
        Some(_) => {
            return Err(RuleError::malformed(
                format!("{path}.actions"),
                "expected an array of actions",
            ))
        }
    };

    Ok(Rule {
        conditions: Some(conditions),
        actions,
    })
}

pub(crate) fn rules_from_json(value: &Json) -> Result<Vec<Rule>, RuleError> {
    let Json::Array(items) = value else {
        return Err(RuleError::malformed("$", "expected an array of rules"));
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| rule_from_json(item, &format!("[{i}]")))
        .collect()
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Json::deserialize(deserializer)?;
        Condition::from_json(&raw).map_err(D::Error::custom)
    }
}

impl Serialize for Rule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(conditions) = &self.conditions {
            map.serialize_entry("conditions", conditions)?;
        }
        map.serialize_entry("actions", &self.actions)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Rule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Json::deserialize(deserializer)?;
        rule_from_json(&raw, "rule").map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{all, any, var};

    #[test]
    fn leaf_and_groups() {
        let cond = Condition::from_json(&json!({
            "all": [
                {"name": "current_inventory", "operator": "greater_than", "value": 20},
                {"any": [
                    {"name": "flag", "operator": "is_true"},
                    {"name": "tags", "operator": "contains", "value": ["a", "b"]}
                ]}
            ]
        }))
        .unwrap();
        assert_eq!(
            cond,
            all([
                var("current_inventory").greater_than(20_i64),
                any([var("flag").is_true(), var("tags").contains(vec!["a", "b"])]),
            ])
        );
    }

    #[test]
    fn empty_groups_are_legal() {
        assert_eq!(Condition::from_json(&json!({"all": []})).unwrap(), all([]));
        assert_eq!(Condition::from_json(&json!({"any": []})).unwrap(), any([]));
    }

    #[test]
    fn empty_object_is_malformed() {
        let err = Condition::from_json(&json!({})).unwrap_err();
        assert!(matches!(err, RuleError::MalformedRule { path, .. } if path == "conditions"));
    }

    #[test]
    fn malformed_path_points_at_node() {
        let err = rules_from_json(&json!([
            {"conditions": {"all": [
                {"name": "a", "operator": "equal_to", "value": 1},
                {"foo": "bar"}
            ]}}
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            RuleError::MalformedRule {
                path: "[0].conditions.all[1]".into(),
                reason: NODE_SHAPE.into(),
            }
        );
    }

    #[test]
    fn group_must_hold_an_array() {
        let err = Condition::from_json(&json!({"any": {"name": "x"}})).unwrap_err();
        assert!(matches!(err, RuleError::MalformedRule { path, .. } if path == "conditions.any"));
    }

    #[test]
    fn both_group_keys_rejected() {
        assert!(Condition::from_json(&json!({"all": [], "any": []})).is_err());
    }

    #[test]
    fn unknown_operator_name() {
        let err = Condition::from_json(&json!({"name": "x", "operator": "is_between", "value": 1}))
            .unwrap_err();
        assert_eq!(
            err,
            RuleError::InvalidOperator {
                operator: "is_between".into(),
                field_type: None,
            }
        );
    }

    #[test]
    fn null_and_object_literals() {
        let cond = Condition::from_json(&json!({"name": "x", "operator": "is_true", "value": null}))
            .unwrap();
        assert_eq!(cond, var("x").is_true());

        let err = Condition::from_json(&json!({"name": "x", "operator": "equal_to", "value": {}}))
            .unwrap_err();
        assert!(matches!(err, RuleError::MalformedRule { path, .. } if path == "conditions.value"));
    }

    #[test]
    fn rule_without_conditions_rejected() {
        let err = rules_from_json(&json!([{"actions": []}])).unwrap_err();
        assert!(matches!(err, RuleError::MalformedRule { path, .. } if path == "[0].conditions"));
    }

    #[test]
    fn actions_default_to_empty() {
        let rules = rules_from_json(&json!([{"conditions": {"all": []}}])).unwrap();
        assert!(rules[0].actions.is_empty());
    }

    #[test]
    fn bad_action_entry_has_path() {
        let err = rules_from_json(&json!([
            {"conditions": {"all": []}, "actions": [{"params": {}}]}
        ]))
        .unwrap_err();
        assert!(matches!(err, RuleError::MalformedRule { path, .. } if path == "[0].actions[0]"));
    }

    #[test]
    fn serde_roundtrip_through_rule() {
        let rule = Rule::new(any([
            var("expiration_days").less_than(5_i64),
            var("current_month").equal_to("December"),
        ]))
        .then(ActionInvocation::new("put_on_sale").param("sale_percentage", 0.25));
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(
            json["conditions"]["any"][0],
            json!({"name": "expiration_days", "operator": "less_than", "value": 5})
        );
        let back: Rule = serde_json::from_value(json).unwrap();
        assert_eq!(back, rule);
    }
}
