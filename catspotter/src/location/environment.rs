//! Runtime environment classification.
//!
//! Mobile / iOS Safari detection only selects user-facing wording and the
//! mobile strategy cascade. Misclassification degrades messages, never
//! correctness, so the classification is injectable.

use std::sync::OnceLock;

use regex::Regex;

/// Classifies the runtime the user is on.
pub trait RuntimeEnvironment: Send + Sync {
    /// Phone or tablet class device.
    fn is_mobile(&self) -> bool;

    /// Safari on iOS (not Chrome/Firefox/Opera wrappers around WebKit).
    fn is_ios_safari(&self) -> bool;
}

/// Environment with fixed answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StaticEnvironment {
    pub mobile: bool,
    pub ios_safari: bool,
}

impl StaticEnvironment {
    pub const DESKTOP: Self = Self {
        mobile: false,
        ios_safari: false,
    };

    pub const MOBILE: Self = Self {
        mobile: true,
        ios_safari: false,
    };

    pub const IOS_SAFARI: Self = Self {
        mobile: true,
        ios_safari: true,
    };
}

impl RuntimeEnvironment for StaticEnvironment {
    fn is_mobile(&self) -> bool {
        self.mobile
    }

    fn is_ios_safari(&self) -> bool {
        self.ios_safari
    }
}

fn mobile_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)Android|webOS|iPhone|iPad|iPod|BlackBerry|IEMobile|Opera Mini")
            .expect("Valid regex")
    })
}

fn ios_device_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"iPad|iPhone|iPod").expect("Valid regex"))
}

fn ios_other_browser_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)CriOS|FxiOS|OPiOS|mercury").expect("Valid regex"))
}

/// Environment classified from a browser user-agent string.
///
/// The classification is computed once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAgentEnvironment {
    user_agent: String,
    mobile: bool,
    ios_safari: bool,
}

impl UserAgentEnvironment {
    pub fn new(user_agent: impl Into<String>) -> Self {
        let user_agent = user_agent.into();
        let mobile = mobile_pattern().is_match(&user_agent);
        let ios_safari = ios_device_pattern().is_match(&user_agent)
            && user_agent.contains("WebKit")
            && !ios_other_browser_pattern().is_match(&user_agent);

        Self {
            user_agent,
            mobile,
            ios_safari,
        }
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl RuntimeEnvironment for UserAgentEnvironment {
    fn is_mobile(&self) -> bool {
        self.mobile
    }

    fn is_ios_safari(&self) -> bool {
        self.ios_safari
    }
}

impl<T: RuntimeEnvironment + ?Sized> RuntimeEnvironment for Box<T> {
    fn is_mobile(&self) -> bool {
        (**self).is_mobile()
    }

    fn is_ios_safari(&self) -> bool {
        (**self).is_ios_safari()
    }
}
