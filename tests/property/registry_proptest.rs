//! Property-based tests for ConnectionRegistry membership
//!
//! Any interleaving of adds and removes leaves the registry holding exactly
//! the connections added and not yet removed, and a broadcast reaches each
//! of them once.

use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use discussion_board::backend::realtime::{Connection, ConnectionRegistry};

#[derive(Debug, Clone)]
enum Op {
    Add,
    /// Remove the n-th connection ever added (modulo count)
    Remove(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![Just(Op::Add), any::<usize>().prop_map(Op::Remove)]
}

proptest! {
    #[test]
    fn test_membership_matches_model(ops in proptest::collection::vec(op(), 0..64)) {
        tokio_test::block_on(async {
            let registry = Arc::new(ConnectionRegistry::new(Uuid::new_v4()));
            let mut added = Vec::new();
            let mut receivers = Vec::new();
            let mut model = HashSet::new();

            for op in &ops {
                match op {
                    Op::Add => {
                        let (connection, receiver) = Connection::channel();
                        added.push(connection.id());
                        model.insert(connection.id());
                        receivers.push(receiver);
                        registry.add(connection);
                    }
                    Op::Remove(n) if !added.is_empty() => {
                        let id = added[n % added.len()];
                        prop_assert_eq!(registry.remove(id), model.remove(&id));
                    }
                    Op::Remove(_) => {}
                }
            }

            prop_assert_eq!(registry.len(), model.len());
            let ids: HashSet<_> = registry.connection_ids().into_iter().collect();
            prop_assert_eq!(&ids, &model);

            let report = registry.broadcast("{}");
            prop_assert_eq!(report.delivered, model.len());
            prop_assert_eq!(report.failed, 0);
            Ok(())
        })?;
    }
}
