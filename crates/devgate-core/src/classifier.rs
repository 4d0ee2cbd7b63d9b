//! Complexity classifier (spec.md §4.2, component C2).
//!
//! Pure function, no I/O: maps a query string + tool name to a minimum
//! serving tier. Grounded on the teacher's static compiled-pattern-table
//! convention (`command_safety/command_db.rs`, `dangerous_commands.rs`),
//! generalized from command patterns to natural-language query patterns.

use once_cell::sync::Lazy;
use regex::RegexSet;

/// The cheapest tier able to serve a request, ordered cheapest-first
/// (spec.md §3 "Routing tiers").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    T0Cache,
    T1MemoryIndex,
    T2LocalModel,
    T3Filesystem,
    T4RemoteApi,
}

#[derive(Debug, Clone)]
pub struct Classification {
    pub min_tier: Tier,
    pub reason: &'static str,
    pub write_flag: bool,
}

static WRITE_INTENT: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([concat_word_boundary(&[
        "change", "edit", "modify", "update", "fix", "create", "add", "remove", "delete",
        "refactor", "implement", "write", "build", "make", "generate", "commit", "push",
        "deploy", "release", "rename", "move", "migrate", "install", "upgrade", "downgrade",
    ])])
    .expect("write-intent pattern must compile")
});

static LOCAL_MODEL_SUITED: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"(?i)\btranslat",
        r"(?i)\b(generate|write)\s+(a\s+)?(comment|doc|docstring)",
        r"(?i)\bcommit\s+message\b",
        r"(?i)\bexplain\s+(this\s+)?error\b",
        r"(?i)\b(suggest|propose)\s+(a\s+)?name\b",
        r"(?i)\btest\s+description",
        r"(?i)\bcode\s*style\b",
        r"(?i)\bformat\s+(this\s+)?log\b",
        r"(?i)\bline[- ]by[- ]line\b",
    ])
    .expect("local-model-suited pattern must compile")
});

static READ_ONLY_INTERROGATIVE: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([concat_word_boundary(&[
        "where",
        "what",
        "how",
        "why",
        "which",
        "list",
        "show",
        "explain",
        "compare",
        "describe",
        "summarize",
        "overview",
        "architecture",
        "structure",
    ])])
    .expect("read-only pattern must compile")
});

static SHORT_STRUCTURAL_LOOKUP: Lazy<Regex> = Lazy::new(|| {
    regex::Regex::new(r"(?i)^(where is|find (the )?file|what function|show me|list|get)")
        .expect("structural lookup pattern must compile")
});

static REASONING_PREFIX: Lazy<Regex> = Lazy::new(|| {
    regex::Regex::new(
        r"(?i)^(how (do|does|can|should)|why (is|does|did)|explain|what is the (best|difference)|compare|suggest|refactor|review)",
    )
    .expect("reasoning prefix pattern must compile")
});

use regex::Regex;

fn concat_word_boundary(words: &[&str]) -> String {
    format!(r"(?i)\b({})\b", words.join("|"))
}

/// Classify a query. The tool name is accepted for interface symmetry with
/// spec.md §4.2 ("Input: the raw query text and the tool name") — today's
/// decision table is query-text-only, but router callers also combine the
/// classification with the tool's own write/read nature (e.g. `smart_edit`
/// is always a write regardless of its `content` argument's wording).
pub fn classify(query: &str, _tool_name: &str) -> Classification {
    if WRITE_INTENT.is_match(query) {
        return Classification {
            min_tier: Tier::T4RemoteApi,
            reason: "write-intent pattern matched",
            write_flag: true,
        };
    }

    if LOCAL_MODEL_SUITED.is_match(query) {
        return Classification {
            min_tier: Tier::T2LocalModel,
            reason: "local-model-suited pattern matched",
            write_flag: false,
        };
    }

    // Checked ahead of the general interrogative set: it's the more specific
    // pattern, and "where is X defined?" must resolve to T1, not the T2 a
    // bare "where/what/how..." falls to below.
    if SHORT_STRUCTURAL_LOOKUP.is_match(query) {
        return Classification {
            min_tier: Tier::T1MemoryIndex,
            reason: "short structural lookup pattern matched",
            write_flag: false,
        };
    }

    if READ_ONLY_INTERROGATIVE.is_match(query) {
        return Classification {
            min_tier: Tier::T2LocalModel,
            reason: "read-only interrogative pattern matched",
            write_flag: false,
        };
    }

    if REASONING_PREFIX.is_match(query) {
        return Classification {
            min_tier: Tier::T2LocalModel,
            reason: "reasoning prefix matched",
            write_flag: false,
        };
    }

    if query.chars().count() < 300 {
        Classification {
            min_tier: Tier::T2LocalModel,
            reason: "default: short query",
            write_flag: false,
        }
    } else {
        Classification {
            min_tier: Tier::T4RemoteApi,
            reason: "default: long query",
            write_flag: false,
        }
    }
}
