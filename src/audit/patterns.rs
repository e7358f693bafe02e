//! Threat pattern tables for the skill auditor
//!
//! Each family is an ordered list of `(pattern, label)` pairs compiled once
//! per process. Order matters: the scanner reports the first pattern of a
//! family that matches a line.

use crate::models::AuditSeverity;
use regex::Regex;
use std::sync::OnceLock;

static FAMILIES: OnceLock<Vec<PatternFamily>> = OnceLock::new();
static RATE_PATTERNS: OnceLock<Vec<ThreatPattern>> = OnceLock::new();
static RED_FLAGS: OnceLock<Vec<RedFlagPattern>> = OnceLock::new();

pub const REMOTE_FETCH: &str = "Remote Fetch";
pub const KEY_STORAGE: &str = "Predictable Key Storage";
pub const WALLET_LINKING: &str = "Mandatory Wallet Linking";
pub const RATE_LIMITS: &str = "Suspicious Rate Limits";
pub const AUTO_UPDATE: &str = "Auto-Update Instructions";
pub const INJECTION_FIELDS: &str = "In-Band Injection Fields";

pub const RATE_LIMIT_PREFIX: &str = "Unusually high rate limit";
pub const RATE_LIMIT_RECOMMENDATION: &str =
    "High rate limits may indicate the skill is designed to weaponize agents for spam/engagement farming.";
pub const RED_FLAG_PREFIX: &str = "Red flag";

/// Smallest captured number that counts as a suspicious rate
pub const RATE_REPORT_THRESHOLD: u64 = 100;
/// Captured numbers at or above this are warnings rather than info
pub const RATE_WARNING_THRESHOLD: u64 = 1000;

/// One compiled pattern with its human label
pub struct ThreatPattern {
    pub label: &'static str,
    pub regex: Regex,
}

/// A fixed-severity family of patterns sharing one category label
pub struct PatternFamily {
    pub category: &'static str,
    /// Message prefix, rendered as `"<prefix>: <label>"`
    pub prefix: &'static str,
    pub severity: AuditSeverity,
    /// Severity used when the line sits inside a fenced code block
    pub fenced_severity: Option<AuditSeverity>,
    pub recommendation: &'static str,
    pub patterns: Vec<ThreatPattern>,
}

impl PatternFamily {
    /// First pattern in table order matching `line`
    pub fn first_match(&self, line: &str) -> Option<&ThreatPattern> {
        self.patterns.iter().find(|p| p.regex.is_match(line))
    }

    pub fn severity_for(&self, in_code_block: bool) -> AuditSeverity {
        match self.fenced_severity {
            Some(fenced) if in_code_block => fenced,
            _ => self.severity,
        }
    }
}

/// Sub-categories of the miscellaneous red-flag family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RedFlagKind {
    SocialEngineering,
    SupplyChain,
    Exfiltration,
    Spam,
}

impl RedFlagKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedFlagKind::SocialEngineering => "social-engineering",
            RedFlagKind::SupplyChain => "supply-chain",
            RedFlagKind::Exfiltration => "exfiltration",
            RedFlagKind::Spam => "spam",
        }
    }

    /// Exfiltration is always critical
    pub fn severity(&self) -> AuditSeverity {
        match self {
            RedFlagKind::Exfiltration => AuditSeverity::Critical,
            _ => AuditSeverity::Warning,
        }
    }

    pub fn category_label(&self) -> String {
        format!("Additional: {}", self.as_str())
    }

    pub fn recommendation(&self) -> &'static str {
        recommendation_for(self.as_str())
    }
}

/// Recommendation text for a red-flag sub-category name
pub fn recommendation_for(sub_category: &str) -> &'static str {
    match sub_category {
        "social-engineering" => "Monetary incentives can pressure users into unsafe actions.",
        "supply-chain" => "Third-party package execution introduces additional attack vectors.",
        "exfiltration" => "This pattern could exfiltrate sensitive data. Do NOT proceed.",
        "spam" => "Aggressive engagement patterns weaponize your agent as a spam bot.",
        _ => "Review this pattern carefully before installing.",
    }
}

pub struct RedFlagPattern {
    pub label: &'static str,
    pub kind: RedFlagKind,
    pub regex: Regex,
}

/// Case-insensitive regex from a pattern literal.
///
/// Every pattern here is a compile-time constant exercised by the unit
/// tests, so a failure to compile is a programming error.
fn ci(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){}", pattern)).unwrap()
}

fn table(entries: &[(&str, &'static str)]) -> Vec<ThreatPattern> {
    entries
        .iter()
        .map(|&(pattern, label)| ThreatPattern {
            label,
            regex: ci(pattern),
        })
        .collect()
}

/// Fixed-severity families in scan order (rate limits and red flags are separate)
pub fn families() -> &'static [PatternFamily] {
    FAMILIES.get_or_init(|| {
        vec![
            PatternFamily {
                category: REMOTE_FETCH,
                prefix: "Remote skill fetch detected",
                severity: AuditSeverity::Critical,
                fenced_severity: Some(AuditSeverity::Warning),
                recommendation: "Skills should not auto-update from external URLs. This enables supply chain attacks.",
                patterns: table(&[
                    (r"curl\s+.*-[so]\s+.*skill", "curl download skill file"),
                    (r"curl\s+.*skill\.md", "curl fetch skill.md"),
                    (r"wget\s+.*skill", "wget download skill"),
                    (r"curl\s+.*\|\s*(?:bash|sh|zsh)", "pipe curl to shell"),
                    (r"wget\s+.*-O\s*-\s*\|\s*(?:bash|sh)", "pipe wget to shell"),
                    (r#"fetch\s*\(\s*['"`]https?://[^'"]+skill"#, "fetch skill URL"),
                    (r"curl\s+-s\s+https?://[^\s]+\s+-o\s+~/", "silent curl to home dir"),
                ]),
            },
            PatternFamily {
                category: KEY_STORAGE,
                prefix: "Predictable key storage path",
                severity: AuditSeverity::Critical,
                fenced_severity: None,
                recommendation: "Storing keys at known paths enables mass exfiltration. Use randomized or user-controlled paths.",
                patterns: table(&[
                    (r"~/\.agents/[^/]*/vault/", "~/.agents/*/vault/ path"),
                    (r"vault/private_key", "vault/private_key storage"),
                    (r"vault/seed_phrase", "vault/seed_phrase storage"),
                    (r">\s*~/\.agents/[^/]+/[^/]*key", "redirect key to agents dir"),
                    (r"echo\s+.*private_key.*>\s*~", "echo private_key to file"),
                    (r"echo\s+.*seed.*>\s*~", "echo seed to file"),
                    (r"generate-private-key.*>\s*~", "generate key to predictable path"),
                    (r"store.*private.*key.*at\s+", "store key instruction"),
                    (r"save.*private.*key.*to\s+", "save key instruction"),
                    (r"0x[A-Fa-f0-9]{64}", "hardcoded private key pattern"),
                ]),
            },
            PatternFamily {
                category: WALLET_LINKING,
                prefix: "Coerced wallet linking",
                severity: AuditSeverity::Warning,
                fenced_severity: None,
                recommendation: "Wallet linking should always be optional. Mandatory linking is a red flag for credential harvesting.",
                patterns: table(&[
                    (r"\bMANDATORY\b.*wallet", "MANDATORY wallet"),
                    (r"wallet.*\bMANDATORY\b", "wallet MANDATORY"),
                    (r"\brequired\b.*link.*wallet", "required link wallet"),
                    (r"\bmust\b.*link.*wallet", "must link wallet"),
                    (r"wallet.*\brequired\b", "wallet required"),
                    (r"cannot\s+(?:post|like|follow).*without.*wallet", "cannot use without wallet"),
                    (r"\bNOT\s+optional\b", "NOT optional coercion"),
                    (r"Do\s+This\s+Immediately", "urgency coercion"),
                    (r"\bfirst\s+boot\b.*required", "first boot requirement"),
                ]),
            },
            PatternFamily {
                category: AUTO_UPDATE,
                prefix: "Auto-update mechanism",
                severity: AuditSeverity::Critical,
                fenced_severity: None,
                recommendation: "Auto-updating skills can be weaponized at any time. Instructions can change without notice.",
                patterns: table(&[
                    (r"cron", "cron job"),
                    (r"every\s+[0-9]+\s*(?:hour|minute|min|hr)", "periodic schedule"),
                    (r"auto[- ]?refresh", "auto-refresh"),
                    (r"auto[- ]?update", "auto-update"),
                    (r"refresh.*every", "refresh every"),
                    (r"update.*every", "update every"),
                    (r"periodic(?:ally)?\s+(?:fetch|update|download|refresh)", "periodic fetch"),
                    (r"schedule.*(?:curl|wget|fetch)", "scheduled fetch"),
                    (r"[0-9]+h?\s*(?:refresh|update)", "timed update"),
                ]),
            },
            PatternFamily {
                category: INJECTION_FIELDS,
                prefix: "In-band injection vector",
                severity: AuditSeverity::Warning,
                fenced_severity: None,
                recommendation: "Hidden fields in API responses can inject instructions. Agent cannot distinguish data from commands.",
                patterns: table(&[
                    (r"_model_guide", "_model_guide field"),
                    (r"_hint", "_hint field"),
                    (r"_notice", "_notice field"),
                    (r"_instruction", "_instruction field"),
                    (r"_directive", "_directive field"),
                    (r"_system", "_system field"),
                    (r"in-band.*(?:instruction|prompt|injection)", "in-band injection"),
                    (r"response.*includes?.*(?:instruction|guide|hint)", "response includes instructions"),
                ]),
            },
        ]
    })
}

/// Rate-limit patterns; capture group 1 holds the number
pub fn rate_patterns() -> &'static [ThreatPattern] {
    RATE_PATTERNS.get_or_init(|| {
        table(&[
            (r"([0-9]{4,})\s*(?:/|\s+per\s+)?\s*(?:min|minute)", "high rate per minute"),
            (r"rate.*limit.*([0-9]{4,})", "rate limit 1000+"),
            (r"([0-9]+)\s*(?:likes?|follows?|posts?).*(?:/|\s+per\s+)?\s*min", "engagement rate"),
        ])
    })
}

pub fn red_flags() -> &'static [RedFlagPattern] {
    RED_FLAGS.get_or_init(|| {
        use RedFlagKind::*;
        [
            (r"\$[0-9]+\s*(?:USDC|USD|ETH|reward|bonus)", "monetary incentive", SocialEngineering),
            (r"npx\s+[a-z-]+\s+generate.*key", "npx key generation", SupplyChain),
            (r"npm\s+install.*--global", "global npm install", SupplyChain),
            (r"POST.*private_key", "POST private key", Exfiltration),
            (r"POST.*seed", "POST seed phrase", Exfiltration),
            (r"verify[- ]?wallet.*POST", "verify-wallet POST", Exfiltration),
            (r"verify[- ]?key.*POST", "verify-key POST", Exfiltration),
            (r"Follow\s+Aggressively", "aggressive engagement", Spam),
            (r"Like\s+Everything", "mass engagement", Spam),
            (r"[0-9]{2,}\s+(?:follows?|likes?).*immediately", "bulk engagement on signup", Spam),
        ]
        .into_iter()
        .map(|(pattern, label, kind)| RedFlagPattern {
            label,
            kind,
            regex: ci(pattern),
        })
        .collect()
    })
}
