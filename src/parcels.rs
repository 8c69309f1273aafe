// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Marking installments of a recurring template as paid.
//!
//! [`toggle`] is the pure reducer. [`ParcelBoard::toggle`] runs it against
//! the local view first, then commits to the store and restores the prior
//! set if the commit fails. A parcel that becomes paid is also written to
//! the ledger as a plain transaction; un-paying it leaves that entry alone.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{BackendError, ToggleError, ValidationError};
use crate::installments::Installment;
use crate::models::{NewTransaction, RecurringTransaction, Transaction};
use crate::store::{RecurringRepository, TransactionRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    Paid,
    Unpaid,
}

pub fn toggle(paid: &BTreeSet<u32>, number: u32) -> (BTreeSet<u32>, Transition) {
    let mut next = paid.clone();
    if next.remove(&number) {
        (next, Transition::Unpaid)
    } else {
        next.insert(number);
        (next, Transition::Paid)
    }
}

pub fn validate_parcel(
    template: &RecurringTransaction,
    number: u32,
) -> Result<Installment, ValidationError> {
    let plan = template.plan()?;
    plan.get(number).ok_or(ValidationError::ParcelOutOfRange {
        number,
        count: plan.len(),
    })
}

/// The ledger transaction that materialises a paid installment.
pub fn ledger_entry(
    template: &RecurringTransaction,
    installment: &Installment,
    now: DateTime<Utc>,
) -> NewTransaction {
    NewTransaction {
        class_id: template.class_id,
        value: template.value,
        description: format!("{} ({})", template.description, installment.label),
        created_at: now,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToggleOutcome {
    pub transition: Transition,
    pub paid: BTreeSet<u32>,
    pub installment: Installment,
    pub ledger: Option<Transaction>,
}

/// Paid sets as currently shown, keyed by recurring template id.
#[derive(Debug, Default, Clone)]
pub struct ParcelBoard {
    paid: HashMap<i64, BTreeSet<u32>>,
}

impl ParcelBoard {
    pub fn load(templates: &[RecurringTransaction]) -> Self {
        Self {
            paid: templates
                .iter()
                .map(|t| (t.id, t.paid_parcels.clone()))
                .collect(),
        }
    }

    pub fn paid(&self, id: i64) -> Option<&BTreeSet<u32>> {
        self.paid.get(&id)
    }

    pub fn toggle<S>(
        &mut self,
        store: &S,
        id: i64,
        number: u32,
        now: DateTime<Utc>,
    ) -> Result<ToggleOutcome, ToggleError>
    where
        S: RecurringRepository + TransactionRepository + ?Sized,
    {
        let template = store
            .get_recurring(id)
            .map_err(ToggleError::Lookup)?
            .ok_or_else(|| {
                ToggleError::Lookup(BackendError::NotFound {
                    table: "recurring_transaction",
                    id: id.to_string(),
                })
            })?;
        // Removed templates are kept for history only.
        if !template.status {
            return Err(ToggleError::Lookup(BackendError::NotFound {
                table: "recurring_transaction",
                id: id.to_string(),
            }));
        }
        let installment = validate_parcel(&template, number)?;

        let prior = self
            .paid
            .get(&id)
            .cloned()
            .unwrap_or_else(|| template.paid_parcels.clone());
        let (next, transition) = toggle(&prior, number);
        self.paid.insert(id, next.clone());
        debug!(id, number, ?transition, "applied parcel toggle locally");

        if let Err(err) = store.set_paid_parcels(id, &next) {
            warn!(id, number, error = %err, "parcel toggle rejected, rolling back");
            self.paid.insert(id, prior);
            return Err(ToggleError::Persist(err));
        }

        let ledger = match transition {
            Transition::Paid => {
                let entry = ledger_entry(&template, &installment, now);
                let tx = store
                    .insert_transaction(&entry)
                    .map_err(ToggleError::Ledger)?;
                info!(id, number, transaction = tx.id, "installment recorded in ledger");
                Some(tx)
            }
            Transition::Unpaid => None,
        };

        Ok(ToggleOutcome {
            transition,
            paid: next,
            installment,
            ledger,
        })
    }
}
