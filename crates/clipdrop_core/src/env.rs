//! Process-global environment mutation helpers.
//!
//! Configuration is read from the process environment, so tests that exercise
//! [`crate::Config::from_env`] or the CLI's server resolution mutate it. They
//! hold [`env_lock`] and restore values through [`EnvGuard`].

use std::sync::{Mutex, OnceLock};

/// Return the global lock used to serialize environment mutations in tests.
pub fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

#[allow(unused_unsafe)]
fn apply(key: &str, value: Option<&str>) {
    // SAFETY: Callers serialize mutation through `env_lock` when test threads may run in parallel.
    unsafe {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }
}

/// Restores an environment variable value on drop.
pub struct EnvGuard {
    key: String,
    previous: Option<String>,
}

impl EnvGuard {
    fn replace(key: &str, value: Option<&str>) -> Self {
        let previous = std::env::var(key).ok();
        apply(key, value);
        Self {
            key: key.to_string(),
            previous,
        }
    }

    /// Set `key=value` until the guard drops.
    pub fn set(key: &str, value: &str) -> Self {
        Self::replace(key, Some(value))
    }

    /// Unset `key` until the guard drops.
    pub fn remove(key: &str) -> Self {
        Self::replace(key, None)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        apply(self.key.as_str(), self.previous.as_deref());
    }
}

#[cfg(test)]
mod tests {
    use super::{env_lock, EnvGuard};

    #[test]
    fn nested_guards_unwind_in_order() {
        let _lock = env_lock().lock().expect("env lock");
        let key = "CLIPDROP_TEST_ENV_GUARD_NESTED";
        let _outer = EnvGuard::set(key, "outer");
        {
            let _inner = EnvGuard::set(key, "inner");
            assert_eq!(std::env::var(key).ok().as_deref(), Some("inner"));
            {
                let _removed = EnvGuard::remove(key);
                assert!(std::env::var(key).is_err());
            }
            assert_eq!(std::env::var(key).ok().as_deref(), Some("inner"));
        }
        assert_eq!(std::env::var(key).ok().as_deref(), Some("outer"));
    }

    #[test]
    fn guard_over_missing_variable_leaves_it_missing() {
        let _lock = env_lock().lock().expect("env lock");
        let key = "CLIPDROP_TEST_ENV_GUARD_MISSING";
        {
            let _set = EnvGuard::set(key, "temporary");
        }
        assert!(std::env::var(key).is_err());
    }
}
