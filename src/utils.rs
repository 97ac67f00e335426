/// Utility helpers shared by the API clients and the UI.

/// Suspends the current task for `ms` milliseconds without blocking the event loop.
#[cfg(target_arch = "wasm32")]
pub async fn sleep_ms(ms: u32) {
    gloo_timers::future::TimeoutFuture::new(ms).await;
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn sleep_ms(ms: u32) {
    tokio::time::sleep(std::time::Duration::from_millis(ms as u64)).await;
}

/// Lowercased, trimmed email for comparisons and directory lookups.
pub fn normalize_email<S: AsRef<str>>(email: S) -> String {
    email.as_ref().trim().to_lowercase()
}

/// Initial letter used for avatar badges.
pub fn initial<S: AsRef<str>>(s: S) -> String {
    s.as_ref()
        .trim()
        .chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_else(|| "?".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  Ghost@X.com "), "ghost@x.com");
    }

    #[test]
    fn initial_falls_back_for_blank_input() {
        assert_eq!(initial("alice@x.com"), "A");
        assert_eq!(initial("   "), "?");
    }
}
