//! Binding request arguments to declared parameters.

use serde_json::{Map, Value};

use super::errors::BindError;

/// Value a parameter takes when the caller omits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDefault {
    /// The caller must supply the parameter.
    Required,
    Null,
    Integer(i64),
    Bool(bool),
}

impl ParamDefault {
    fn value(self) -> Option<Value> {
        match self {
            Self::Required => None,
            Self::Null => Some(Value::Null),
            Self::Integer(value) => Some(Value::from(value)),
            Self::Bool(value) => Some(Value::Bool(value)),
        }
    }
}

/// A named method parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub default: ParamDefault,
}

impl Param {
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            default: ParamDefault::Required,
        }
    }

    pub const fn optional(name: &'static str) -> Self {
        Self {
            name,
            default: ParamDefault::Null,
        }
    }

    pub const fn integer(name: &'static str, value: i64) -> Self {
        Self {
            name,
            default: ParamDefault::Integer(value),
        }
    }

    pub const fn flag(name: &'static str, value: bool) -> Self {
        Self {
            name,
            default: ParamDefault::Bool(value),
        }
    }
}

static NULL: Value = Value::Null;

/// Arguments bound to parameter names, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundArgs {
    values: Vec<(&'static str, Value)>,
}

impl BoundArgs {
    /// The value bound to `name`, or null for an undeclared name.
    #[must_use]
    pub fn get(&self, name: &str) -> &Value {
        self.values
            .iter()
            .find(|(param, _)| *param == name)
            .map_or(&NULL, |(_, value)| value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Binds positional then keyword arguments to `params`.
///
/// # Errors
///
/// Fails on surplus positionals, unknown keywords, a parameter given twice,
/// or a required parameter left unbound.
pub fn bind(
    params: &[Param],
    args: &[Value],
    kwargs: &Map<String, Value>,
) -> Result<BoundArgs, BindError> {
    if args.len() > params.len() {
        return Err(BindError::TooManyPositional {
            expected: params.len(),
            given: args.len(),
        });
    }

    if let Some(name) = kwargs
        .keys()
        .find(|name| !params.iter().any(|param| param.name == name.as_str()))
    {
        return Err(BindError::UnexpectedKeyword { name: name.clone() });
    }

    let mut values = Vec::with_capacity(params.len());
    for (index, param) in params.iter().enumerate() {
        let positional = args.get(index);
        let keyword = kwargs.get(param.name);
        let value = match (positional, keyword) {
            (Some(_), Some(_)) => {
                return Err(BindError::DuplicateArgument {
                    name: param.name.to_owned(),
                });
            }
            (Some(value), None) | (None, Some(value)) => value.clone(),
            (None, None) => param.default.value().ok_or_else(|| BindError::MissingArgument {
                name: param.name.to_owned(),
            })?,
        };
        values.push((param.name, value));
    }
    Ok(BoundArgs { values })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    const PARAMS: &[Param] = &[
        Param::required("priority"),
        Param::optional("job_id"),
        Param::integer("limit", 20),
        Param::flag("newest_first", true),
    ];

    fn kwargs(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn fills_defaults_for_omitted_parameters() {
        let bound = bind(PARAMS, &[json!(5)], &Map::new()).expect("bind");
        assert_eq!(bound.get("priority"), &json!(5));
        assert_eq!(bound.get("job_id"), &Value::Null);
        assert_eq!(bound.get("limit"), &json!(20));
        assert_eq!(bound.get("newest_first"), &json!(true));
        assert_eq!(bound.len(), 4);
    }

    #[test]
    fn keywords_bind_by_name() {
        let bound = bind(
            PARAMS,
            &[json!(1)],
            &kwargs(json!({"newest_first": false, "job_id": "12.0"})),
        )
        .expect("bind");
        assert_eq!(bound.get("job_id"), &json!("12.0"));
        assert_eq!(bound.get("newest_first"), &json!(false));
    }

    #[test]
    fn undeclared_names_read_as_null() {
        let bound = bind(PARAMS, &[json!(1)], &Map::new()).expect("bind");
        assert_eq!(bound.get("owner"), &Value::Null);
    }

    #[rstest]
    #[case::surplus(
        vec![json!(1), json!(2), json!(3), json!(4), json!(5)],
        json!({}),
        BindError::TooManyPositional { expected: 4, given: 5 }
    )]
    #[case::unknown_keyword(
        vec![json!(1)],
        json!({"colour": "red"}),
        BindError::UnexpectedKeyword { name: "colour".to_owned() }
    )]
    #[case::duplicate(
        vec![json!(1)],
        json!({"priority": 2}),
        BindError::DuplicateArgument { name: "priority".to_owned() }
    )]
    #[case::missing(
        vec![],
        json!({"job_id": "1.0"}),
        BindError::MissingArgument { name: "priority".to_owned() }
    )]
    fn rejects_mismatched_arguments(
        #[case] args: Vec<Value>,
        #[case] keywords: Value,
        #[case] expected: BindError,
    ) {
        let error = bind(PARAMS, &args, &kwargs(keywords)).expect_err("must fail");
        assert_eq!(error, expected);
    }

    #[test]
    fn methods_without_parameters_take_no_arguments() {
        assert!(bind(&[], &[], &Map::new()).expect("bind").is_empty());
        assert!(bind(&[], &[json!("x")], &Map::new()).is_err());
    }
}
