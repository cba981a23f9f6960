//! Naming conventions of the programming model.
//!
//! Support methods are found by prefix: `hideName()` supports member `name`,
//! `default0PlaceOrder(...)` supports parameter 0 of action `placeOrder`.
//! A prefix only matches when it is followed by an upper-case letter (or,
//! for positional prefixes, a digit), so `settle()` is not a setter and
//! `defaulted()` is not a default.

use std::sync::LazyLock;

use regex::Regex;

pub const GET_PREFIX: &str = "get";
pub const IS_PREFIX: &str = "is";
pub const SET_PREFIX: &str = "set";
pub const CLEAR_PREFIX: &str = "clear";
pub const MODIFY_PREFIX: &str = "modify";
pub const NAMED_PREFIX: &str = "named";
pub const HIDE_PREFIX: &str = "hide";
pub const DISABLE_PREFIX: &str = "disable";
pub const VALIDATE_PREFIX: &str = "validate";
pub const DEFAULT_PREFIX: &str = "default";
pub const CHOICES_PREFIX: &str = "choices";
pub const AUTO_COMPLETE_PREFIX: &str = "autoComplete";

/// Prefixes that mark a method as support for some member. Such a method
/// is never an action; if no member claims it, it is an orphan.
pub const SUPPORT_PREFIXES: &[&str] = &[
    SET_PREFIX,
    CLEAR_PREFIX,
    MODIFY_PREFIX,
    NAMED_PREFIX,
    HIDE_PREFIX,
    DISABLE_PREFIX,
    VALIDATE_PREFIX,
    DEFAULT_PREFIX,
    CHOICES_PREFIX,
    AUTO_COMPLETE_PREFIX,
];

static SYNTHETIC_PARAM_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^arg\d+$").expect("synthetic parameter name pattern is valid"));

/// `name` with `prefix` stripped, if the remainder starts upper-case.
pub fn strip_prefix<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = name.strip_prefix(prefix)?;
    rest.chars()
        .next()
        .filter(|c| c.is_uppercase())
        .map(|_| rest)
}

/// `default0PlaceOrder` → `(0, "PlaceOrder")` for prefix `default`.
pub fn strip_positional_prefix<'a>(name: &'a str, prefix: &str) -> Option<(usize, &'a str)> {
    let rest = name.strip_prefix(prefix)?;
    let digits = rest.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let index = rest[..digits].parse().ok()?;
    let member = &rest[digits..];
    member
        .chars()
        .next()
        .filter(|c| c.is_uppercase())
        .map(|_| (index, member))
}

/// Whether `name` looks like a support method for some member.
pub fn is_support_method_name(name: &str) -> bool {
    SUPPORT_PREFIXES.iter().any(|prefix| {
        strip_prefix(name, prefix).is_some() || strip_positional_prefix(name, prefix).is_some()
    })
}

/// Capitalised member stem a support method refers to: `defaultAnInt` →
/// `AnInt`, `choices0PlaceOrder` → `PlaceOrder`.
pub fn support_method_stem(name: &str) -> Option<&str> {
    SUPPORT_PREFIXES.iter().find_map(|prefix| {
        strip_positional_prefix(name, prefix)
            .map(|(_, stem)| stem)
            .or_else(|| strip_prefix(name, prefix))
    })
}

/// Member id of a getter: `getFirstName` → `firstName`, `isActive` → `active`.
pub fn property_name_of_getter(name: &str, returns_boolean: bool) -> Option<String> {
    if let Some(rest) = strip_prefix(name, GET_PREFIX) {
        return Some(decapitalize(rest));
    }
    if returns_boolean {
        return strip_prefix(name, IS_PREFIX).map(decapitalize);
    }
    None
}

pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Bean-style decapitalisation: `Name` → `name`, but `URL` stays `URL`.
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    let (Some(first), second) = (chars.next(), chars.next()) else {
        return String::new();
    };
    if first.is_uppercase() && second.is_some_and(char::is_uppercase) {
        return name.to_string();
    }
    first.to_lowercase().chain(name.chars().skip(1)).collect()
}

/// `firstName` → `First Name`, `orderID` → `Order ID`, `line2` → `Line 2`.
pub fn natural_name(name: &str) -> String {
    let chars: Vec<char> = name.chars().filter(|c| *c != '_' && *c != '$').collect();
    let mut out = String::with_capacity(chars.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 {
            let prev = chars[i - 1];
            let next = chars.get(i + 1).copied();
            let boundary = (c.is_uppercase() && prev.is_lowercase())
                || (c.is_uppercase()
                    && prev.is_uppercase()
                    && next.is_some_and(char::is_lowercase))
                || (c.is_ascii_digit() && prev.is_alphabetic());
            if boundary {
                out.push(' ');
            }
        }
        if i == 0 {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Whether a recovered parameter name is a compiler placeholder.
pub fn is_synthetic_param_name(name: &str) -> bool {
    SYNTHETIC_PARAM_NAME.is_match(name)
}

pub fn pluralize(singular: &str) -> String {
    let lower = singular.to_ascii_lowercase();
    if let Some(stem) = singular.strip_suffix('y') {
        let before = stem.chars().last();
        if before.is_some_and(|c| !"aeiouAEIOU".contains(c)) {
            return format!("{stem}ies");
        }
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|end| lower.ends_with(end)) {
        return format!("{singular}es");
    }
    format!("{singular}s")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_need_an_upper_case_boundary() {
        assert_eq!(strip_prefix("hideName", HIDE_PREFIX), Some("Name"));
        assert_eq!(strip_prefix("settle", SET_PREFIX), None);
        assert_eq!(strip_prefix("hide", HIDE_PREFIX), None);
    }

    #[test]
    fn positional_prefixes() {
        assert_eq!(
            strip_positional_prefix("default0PlaceOrder", DEFAULT_PREFIX),
            Some((0, "PlaceOrder"))
        );
        assert_eq!(
            strip_positional_prefix("choices12Find", CHOICES_PREFIX),
            Some((12, "Find"))
        );
        assert_eq!(strip_positional_prefix("defaultName", DEFAULT_PREFIX), None);
        assert_eq!(strip_positional_prefix("default0", DEFAULT_PREFIX), None);
    }

    #[test]
    fn support_method_names() {
        assert!(is_support_method_name("defaultAnInt"));
        assert!(is_support_method_name("choices0PlaceOrder"));
        assert!(is_support_method_name("autoCompleteCustomer"));
        assert!(!is_support_method_name("placeOrder"));
        assert!(!is_support_method_name("validated"));
    }

    #[test]
    fn support_stems() {
        assert_eq!(support_method_stem("defaultAnInt"), Some("AnInt"));
        assert_eq!(support_method_stem("choices0PlaceOrder"), Some("PlaceOrder"));
        assert_eq!(support_method_stem("clearNotes"), Some("Notes"));
        assert_eq!(support_method_stem("placeOrder"), None);
    }

    #[test]
    fn getter_names() {
        assert_eq!(property_name_of_getter("getFirstName", false), Some("firstName".into()));
        assert_eq!(property_name_of_getter("isActive", true), Some("active".into()));
        assert_eq!(property_name_of_getter("isActive", false), None);
        assert_eq!(property_name_of_getter("getURL", false), Some("URL".into()));
        assert_eq!(property_name_of_getter("gettysburg", false), None);
    }

    #[test]
    fn natural_names() {
        assert_eq!(natural_name("firstName"), "First Name");
        assert_eq!(natural_name("orderID"), "Order ID");
        assert_eq!(natural_name("XMLParser"), "XML Parser");
        assert_eq!(natural_name("line2"), "Line 2");
        assert_eq!(natural_name("Customer"), "Customer");
    }

    #[test]
    fn synthetic_parameter_names() {
        assert!(is_synthetic_param_name("arg0"));
        assert!(is_synthetic_param_name("arg12"));
        assert!(!is_synthetic_param_name("argument"));
        assert!(!is_synthetic_param_name("arg"));
        assert!(!is_synthetic_param_name("quantity"));
    }

    #[test]
    fn plurals() {
        assert_eq!(pluralize("Customer"), "Customers");
        assert_eq!(pluralize("Category"), "Categories");
        assert_eq!(pluralize("Day"), "Days");
        assert_eq!(pluralize("Address"), "Addresses");
        assert_eq!(pluralize("Box"), "Boxes");
    }
}
