// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for groundroute.
//!
//! Provides the error taxonomy, the value types exchanged with external
//! collaborators, and the collaborator traits themselves. Every other crate
//! in the workspace builds on these.

pub mod error;
pub mod traits;
pub mod types;

pub use error::RouterError;
pub use types::{AgentReply, BackendDescriptor, Citation, CitationKind, Weight, route_name};

pub use traits::{BackendExecutor, BackendSession, CollaboratorAdapter, DiscoverySource, WeightStore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_collaborator_traits_are_exported() {
        fn _assert_discovery<T: DiscoverySource>() {}
        fn _assert_executor<T: BackendExecutor>() {}
        fn _assert_weights<T: WeightStore>() {}
        fn _assert_session<T: BackendSession>() {}
    }

    #[test]
    fn collaborator_traits_are_object_safe() {
        fn _discovery(_: &dyn DiscoverySource) {}
        fn _executor(_: &dyn BackendExecutor) {}
        fn _weights(_: &dyn WeightStore) {}
        fn _session(_: &dyn BackendSession) {}
    }

    #[test]
    fn descriptor_roundtrips_through_json() {
        let d = BackendDescriptor {
            backend_id: "asst_1".into(),
            model: "gpt-4o".into(),
            route: route_name("gpt-4o", 1),
            ordinal: 1,
            weight: Weight::FULL,
            display_name: "agent_bing__gpt4o__1".into(),
        };
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("\"weight\":100"));
        let back: BackendDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }
}
