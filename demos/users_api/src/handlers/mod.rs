pub mod users;

/// Lenient boolean parsing for query flags: `1`, `t`, `true` and friends.
pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}
