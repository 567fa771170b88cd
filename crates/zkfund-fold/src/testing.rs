//! Minimal contract for unit tests: a single-assignment registry plus a
//! position counter

use serde::{Deserialize, Serialize};
use zkfund_primitives::{felt_from_u64, Felt};

use crate::contract::{Contract, Slot, SlotAccess, Summary};
use crate::error::{DispatchViolation, FoldResult};
use crate::log::{Action, PendingActions};
use crate::state::{MapId, MapSpec};

pub(crate) const LEDGER_LAYOUT: &[MapSpec] = &[MapSpec::new("entries", 4), MapSpec::new("counter", 1)];

const ENTRIES: Slot<u64, u64> = Slot::new(MapId(0));
const COUNTER: Slot<u64, u64> = Slot::new(MapId(1));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum Entry {
    Put { key: u64, value: u64 },
    Append { value: u64 },
}

impl Action for Entry {
    fn to_elements(&self) -> Vec<Felt> {
        match self {
            Entry::Put { key, value } => vec![felt_from_u64(0), felt_from_u64(*key), felt_from_u64(*value)],
            Entry::Append { value } => vec![felt_from_u64(1), felt_from_u64(*value)],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct Tally {
    pub writes: u64,
}

impl Summary for Tally {
    fn to_elements(&self) -> Vec<Felt> {
        vec![felt_from_u64(self.writes)]
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Ledger;

impl Contract for Ledger {
    type Action = Entry;
    type Summary = Tally;

    fn name(&self) -> &'static str {
        "ledger"
    }

    fn layout(&self) -> &'static [MapSpec] {
        LEDGER_LAYOUT
    }

    fn check_dispatch(
        &self,
        action: &Entry,
        pending: &PendingActions<'_, Entry>,
    ) -> Result<(), DispatchViolation> {
        if let Entry::Put { key, .. } = action {
            let clash = pending
                .iter()
                .any(|other| matches!(other, Entry::Put { key: k, .. } if k == key));
            if clash {
                return Err(DispatchViolation::DuplicatePendingKey(format!("entry {key}")));
            }
        }
        Ok(())
    }

    fn apply<S: SlotAccess>(&self, action: &Entry, summary: &mut Tally, slots: &mut S) -> FoldResult<()> {
        let key = match action {
            Entry::Put { key, .. } => *key,
            Entry::Append { .. } => COUNTER.read(slots, &0)?.unwrap_or(0),
        };
        let value = match action {
            Entry::Put { value, .. } | Entry::Append { value } => *value,
        };
        ENTRIES.assign(slots, &key, &value)?;
        if matches!(action, Entry::Append { .. }) {
            COUNTER.update(slots, &0, |next| Ok(next.unwrap_or(0) + 1))?;
        }
        summary.writes += 1;
        Ok(())
    }
}
