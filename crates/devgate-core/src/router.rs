//! Router (spec.md §4.7, component C7): picks a serving tier per request.
//!
//! A pure decision function — no I/O, no locking — mirroring the layered
//! check-then-decide structure of the teacher's `command_safety` validators
//! and the dispatch shape of `mcp/tool_discovery.rs`. Callers gather the
//! inputs (cache probe, project-index presence, memoized model reachability)
//! and the handler executes whatever decision comes back; the router itself
//! never touches the cache, the filesystem, or the model.

use crate::classifier::{Classification, Tier};

/// Whether a tool is inherently a read or an edit of project state, as
/// opposed to a free-form command or query (spec.md §4.6 state machine:
/// "tool is read/edit?").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolShape {
    ReadOrEdit,
    Other,
}

#[derive(Debug, Clone)]
pub struct RouterInputs<'a> {
    pub classification: &'a Classification,
    pub cache_hit: bool,
    pub project_has_index: bool,
    pub model_reachable: bool,
    pub tool_shape: ToolShape,
}

/// The tier a request should be served from, per the state machine in
/// spec.md §4.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// `cache? ├─hit──► respond (T0)`
    ServeFromCache,
    /// `index available? ├─yes─► execute T1`
    ExecuteIndexLookup,
    /// `classifier wants T2 and model reachable? ├─yes─► execute T2`
    ExecuteLocalModel,
    /// `tool is read/edit? ├─yes─► T3`
    ExecuteFilesystem,
    /// `└─no──► default to tool's own path`
    ToolDefault,
}

impl RouteDecision {
    pub fn tier(self) -> Tier {
        match self {
            RouteDecision::ServeFromCache => Tier::T0Cache,
            RouteDecision::ExecuteIndexLookup => Tier::T1MemoryIndex,
            RouteDecision::ExecuteLocalModel => Tier::T2LocalModel,
            RouteDecision::ExecuteFilesystem => Tier::T3Filesystem,
            RouteDecision::ToolDefault => Tier::T4RemoteApi,
        }
    }
}

/// Walk the state machine in spec.md §4.6. Each branch is evaluated in
/// order; the first match wins.
pub fn decide(inputs: &RouterInputs<'_>) -> RouteDecision {
    if inputs.cache_hit {
        return RouteDecision::ServeFromCache;
    }

    if inputs.project_has_index {
        return RouteDecision::ExecuteIndexLookup;
    }

    if inputs.classification.min_tier == Tier::T2LocalModel && inputs.model_reachable {
        return RouteDecision::ExecuteLocalModel;
    }

    if inputs.tool_shape == ToolShape::ReadOrEdit {
        return RouteDecision::ExecuteFilesystem;
    }

    RouteDecision::ToolDefault
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;

    fn base_classification(query: &str) -> Classification {
        classify(query, "smart_read")
    }

    #[test]
    fn cache_hit_wins_regardless_of_other_inputs() {
        let classification = base_classification("where is handleLogin?");
        let decision = decide(&RouterInputs {
            classification: &classification,
            cache_hit: true,
            project_has_index: true,
            model_reachable: true,
            tool_shape: ToolShape::ReadOrEdit,
        });
        assert_eq!(decision, RouteDecision::ServeFromCache);
        assert_eq!(decision.tier(), Tier::T0Cache);
    }

    #[test]
    fn index_available_beats_local_model_preference() {
        let classification = base_classification("how does auth work?");
        let decision = decide(&RouterInputs {
            classification: &classification,
            cache_hit: false,
            project_has_index: true,
            model_reachable: true,
            tool_shape: ToolShape::Other,
        });
        assert_eq!(decision, RouteDecision::ExecuteIndexLookup);
    }

    #[test]
    fn falls_to_local_model_when_no_index_but_model_reachable() {
        let classification = base_classification("how does auth work?");
        let decision = decide(&RouterInputs {
            classification: &classification,
            cache_hit: false,
            project_has_index: false,
            model_reachable: true,
            tool_shape: ToolShape::Other,
        });
        assert_eq!(decision, RouteDecision::ExecuteLocalModel);
    }

    #[test]
    fn unreachable_model_falls_through_to_filesystem_for_read_edit_tools() {
        let classification = base_classification("how does auth work?");
        let decision = decide(&RouterInputs {
            classification: &classification,
            cache_hit: false,
            project_has_index: false,
            model_reachable: false,
            tool_shape: ToolShape::ReadOrEdit,
        });
        assert_eq!(decision, RouteDecision::ExecuteFilesystem);
    }

    #[test]
    fn non_read_edit_tool_defaults_to_its_own_path_when_nothing_else_applies() {
        let classification = base_classification("how does auth work?");
        let decision = decide(&RouterInputs {
            classification: &classification,
            cache_hit: false,
            project_has_index: false,
            model_reachable: false,
            tool_shape: ToolShape::Other,
        });
        assert_eq!(decision, RouteDecision::ToolDefault);
        assert_eq!(decision.tier(), Tier::T4RemoteApi);
    }

    #[test]
    fn write_intent_query_still_follows_the_same_state_machine() {
        let classification = base_classification("change handleLogin to accept an email");
        assert!(classification.write_flag);
        let decision = decide(&RouterInputs {
            classification: &classification,
            cache_hit: false,
            project_has_index: false,
            model_reachable: true,
            tool_shape: ToolShape::ReadOrEdit,
        });
        // write-intent classifies to T4, so the T2 branch does not apply;
        // the tool's read/edit shape routes it to the filesystem instead.
        assert_eq!(decision, RouteDecision::ExecuteFilesystem);
    }
}
