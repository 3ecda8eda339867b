//! Decision Logging System

use bevy_ecs::prelude::*;
use tracing::warn;

use sense_events::DecisionRecord;

use crate::components::{Alive, LastPerception, Perceiver};
use crate::logger::DecisionLog;
use crate::SimClock;

/// System: append this step's transitions to the decision log, in agent key order
pub fn log_decisions(
    clock: Res<SimClock>,
    mut log: ResMut<DecisionLog>,
    query: Query<(&Perceiver, &LastPerception), With<Alive>>,
) {
    let mut records: Vec<DecisionRecord> = query
        .iter()
        .filter_map(|(perceiver, last)| {
            let transition = last.0.transition?;
            let record = DecisionRecord::new(clock.step, perceiver.0.key(), transition);
            Some(match last.0.target {
                Some(target) => record.with_target(target),
                None => record,
            })
        })
        .collect();
    records.sort_by_key(|r| r.agent);

    for record in &records {
        if let Err(e) = log.log(record) {
            warn!("Failed to write decision record: {}", e);
            return;
        }
    }
}
