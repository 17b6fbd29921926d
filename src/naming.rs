//! Naming strategies: the fallback that turns a declared field name into an
//! output key when no annotation provides one.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Process-wide default. `None` means the built-in snake_case strategy.
static DEFAULT_STRATEGY: RwLock<Option<NamingStrategy>> = RwLock::new(None);

/// A shared `name -> key` conversion.
///
/// Cheap to clone; every clone calls the same function.
#[derive(Clone)]
pub struct NamingStrategy(Arc<dyn Fn(&str) -> String + Send + Sync>);

impl NamingStrategy {
    /// Wrap an arbitrary conversion function.
    pub fn new(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// The built-in strategy: [`to_snake_case`].
    pub fn snake_case() -> Self {
        Self::new(to_snake_case)
    }

    /// Keeps declared names untouched.
    pub fn identity() -> Self {
        Self::new(str::to_string)
    }

    /// Apply the strategy to a declared field name.
    pub fn resolve(&self, field_name: &str) -> String {
        (self.0)(field_name)
    }
}

impl Default for NamingStrategy {
    fn default() -> Self {
        Self::snake_case()
    }
}

impl fmt::Debug for NamingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NamingStrategy(..)")
    }
}

/// Install the process-wide default naming strategy.
///
/// Every later [`BuildOptions::new`](crate::BuildOptions::new) picks it up.
/// Passing `None` restores the snake_case strategy. Meant to be called once
/// during initialization; callers that need per-call isolation should set
/// [`BuildOptions::naming`](crate::BuildOptions::naming) instead.
pub fn set_default_naming_strategy(strategy: Option<NamingStrategy>) {
    let mut slot = DEFAULT_STRATEGY
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    *slot = strategy;
}

/// The currently installed default strategy.
pub fn default_naming_strategy() -> NamingStrategy {
    DEFAULT_STRATEGY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .unwrap_or_default()
}

/// Convert a camelCase or PascalCase identifier to snake_case.
///
/// An uppercase letter opens a new word when it follows a lowercase letter,
/// or when it ends an uppercase run and is followed by a lowercase letter:
/// `UserID` becomes `user_id`, `NationalIDNo` becomes `national_id_no`.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut output = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_uppercase() {
            output.push(c);
            continue;
        }

        if i > 0 {
            let previous = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if previous.is_lowercase() || (previous.is_uppercase() && next_is_lower) {
                output.push('_');
            }
        }
        output.extend(c.to_lowercase());
    }

    output
}

/// Lowercase the first character, leaving the rest as-is.
///
/// Default key for document-store maps.
pub fn first_char_to_lower(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
