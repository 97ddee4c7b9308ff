//! Mapping raw argument lists to name and value expressions.
//!
//! Meters are recorded either with a named `name = ...` argument or with the
//! positional convention `(scope, unit, name, tags)`; single-argument calls
//! take the name directly. Events take `(name[, value][, tags = ...])` or
//! named `name =` / `value =` arguments.

/// Expressions picked out of one call's arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallArguments {
    pub name: String,
    pub value: Option<String>,
}

/// Minimum positional arity that carries a meter name at index 2.
const METER_POSITIONAL_ARITY: usize = 4;
const METER_NAME_INDEX: usize = 2;

/// Right-hand side of `key = expr`, or `None` if `arg` is not that named
/// argument. `key == expr` comparisons are not named arguments.
pub fn named_argument<'a>(arg: &'a str, key: &str) -> Option<&'a str> {
    let rest = arg.trim_start().strip_prefix(key)?;
    let rest = rest.trim_start().strip_prefix('=')?;
    if rest.starts_with('=') {
        return None;
    }
    Some(rest.trim())
}

fn find_named<'a>(args: &'a [String], key: &str) -> Option<&'a str> {
    args.iter().find_map(|arg| named_argument(arg, key))
}

/// Name expression of a meter call.
pub fn meter_name(args: &[String]) -> Option<String> {
    if let Some(name) = find_named(args, "name") {
        return non_empty(name);
    }
    match args.len() {
        n if n >= METER_POSITIONAL_ARITY => non_empty(&args[METER_NAME_INDEX]),
        1 => non_empty(&args[0]),
        _ => None,
    }
}

/// Name and optional value expressions of an event call.
pub fn event_arguments(args: &[String]) -> Option<CallArguments> {
    if let Some(name) = find_named(args, "name") {
        return Some(CallArguments {
            name: non_empty(name)?,
            value: find_named(args, "value").and_then(non_empty),
        });
    }

    let name = non_empty(args.first()?)?;
    let value = args.get(1).and_then(|arg| {
        if named_argument(arg, "tags").is_some() {
            return None;
        }
        non_empty(named_argument(arg, "value").unwrap_or(arg.as_str()))
    });

    Some(CallArguments { name, value })
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_named_argument() {
        assert_eq!(named_argument(" name = \"x\"", "name"), Some("\"x\""));
        assert_eq!(named_argument("name=prefix", "name"), Some("prefix"));
        assert_eq!(named_argument("name == other", "name"), None);
        assert_eq!(named_argument("\"name\"", "name"), None);
        assert_eq!(named_argument("tags = t", "name"), None);
    }

    #[test]
    fn test_meter_positional() {
        let a = args(&["scope", "unit", "\"requests\"", "tags"]);
        assert_eq!(meter_name(&a).as_deref(), Some("\"requests\""));

        let five = args(&["scope", "unit", "\"requests\"", "tags", "extra"]);
        assert_eq!(meter_name(&five).as_deref(), Some("\"requests\""));
    }

    #[test]
    fn test_meter_single_and_named() {
        assert_eq!(meter_name(&args(&["NAME"])).as_deref(), Some("NAME"));
        let named = args(&["unit", "name = \"hits\""]);
        assert_eq!(meter_name(&named).as_deref(), Some("\"hits\""));
    }

    #[test]
    fn test_meter_unrecognized_shapes() {
        assert_eq!(meter_name(&[]), None);
        assert_eq!(meter_name(&args(&["a", "b"])), None);
        assert_eq!(meter_name(&args(&["a", "b", "c"])), None);
    }

    #[test]
    fn test_event_positional() {
        let a = args(&["\"user.login\"", "userId"]);
        let parsed = event_arguments(&a).unwrap();
        assert_eq!(parsed.name, "\"user.login\"");
        assert_eq!(parsed.value.as_deref(), Some("userId"));
    }

    #[test]
    fn test_event_tags_are_not_values() {
        let a = args(&["\"cache.miss\"", "tags = mapOf(\"k\" to \"v\")"]);
        let parsed = event_arguments(&a).unwrap();
        assert_eq!(parsed.value, None);

        let only_name = event_arguments(&args(&["\"ping\""])).unwrap();
        assert_eq!(only_name.value, None);
    }

    #[test]
    fn test_event_named() {
        let a = args(&["tags = t", "value = e", "name = EVENT"]);
        let parsed = event_arguments(&a).unwrap();
        assert_eq!(parsed.name, "EVENT");
        assert_eq!(parsed.value.as_deref(), Some("e"));

        let positional_value = args(&["\"x\"", "value = 5L"]);
        assert_eq!(
            event_arguments(&positional_value).unwrap().value.as_deref(),
            Some("5L")
        );
    }

    #[test]
    fn test_event_empty() {
        assert_eq!(event_arguments(&[]), None);
    }
}
