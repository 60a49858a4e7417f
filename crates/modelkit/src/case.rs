//! Identifier case conversion
//!
//! Configuration keys are `snake_case`. Type names are `PascalCase` and the
//! wire format uses `camelCase`.

/// Convert a `snake_case` key into a `PascalCase` type name.
///
/// Each underscore-separated word gets an upper-case first letter and a
/// lower-case remainder, so `load_balancers_config` becomes
/// `LoadBalancersConfig` and `route53` becomes `Route53`.
pub fn to_pascal_case(snake: &str) -> String {
    snake
        .split('_')
        .filter(|word| !word.is_empty())
        .map(capitalize_word)
        .collect()
}

/// Convert a `snake_case` key into a `camelCase` wire name.
///
/// Words after the first get an upper-case first letter; the rest of each
/// word is kept as written. Keys without underscores pass through unchanged.
pub fn to_camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper_next = false;

    for ch in snake.chars() {
        if ch == '_' {
            upper_next = !out.is_empty();
            continue;
        }
        if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }

    out
}

fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
