//! Synchronizes stored order items with an order's current items.
//!
//! Items are joined by id. Stored items missing from the order are deleted,
//! new items are inserted and items present on both sides are overwritten.
//! The three phases run in that order; writes inside a phase run
//! concurrently. Phases are not atomic as a whole: when one fails, the
//! phases before it stay applied.

use std::collections::HashSet;

use async_trait::async_trait;
use common::{OrderId, OrderItemId};
use domain::{Order, OrderItem};
use futures_util::future::try_join_all;

use crate::record::ItemRecord;
use crate::{RepositoryError, Result};

/// Storage operations the reconciler needs, one call per affected item.
#[async_trait]
pub trait OrderItemWriter: Send + Sync {
    /// Deletes the stored item with the record's id.
    async fn delete_item(&self, record: &ItemRecord) -> Result<()>;

    /// Stores a new item.
    async fn insert_item(&self, record: &ItemRecord) -> Result<()>;

    /// Overwrites every field of the stored item with the record's id.
    async fn update_item(&self, record: &ItemRecord) -> Result<()>;
}

/// A reconciliation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilePhase {
    Delete,
    Insert,
    Update,
}

impl ReconcilePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcilePhase::Delete => "delete",
            ReconcilePhase::Insert => "insert",
            ReconcilePhase::Update => "update",
        }
    }
}

impl std::fmt::Display for ReconcilePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How items present on both sides are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdatePolicy {
    /// Every matched item is rewritten, changed or not.
    #[default]
    Overwrite,
    /// Only matched items whose stored fields differ are rewritten; the rest
    /// are reported as unchanged.
    ChangedOnly,
}

/// The writes needed to bring stored items in line with an order.
///
/// `to_delete`, `to_insert` and `to_update` (plus `unchanged`) never share
/// an id with one another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemChangeSet {
    /// Stored items whose id is no longer on the order.
    pub to_delete: Vec<ItemRecord>,
    /// Order items whose id is not stored yet.
    pub to_insert: Vec<ItemRecord>,
    /// Order items whose id is already stored.
    pub to_update: Vec<ItemRecord>,
    /// Matched items skipped under [`UpdatePolicy::ChangedOnly`].
    pub unchanged: Vec<ItemRecord>,
}

impl ItemChangeSet {
    /// Plans the writes with [`UpdatePolicy::Overwrite`].
    pub fn plan(order_id: &OrderId, previous: &[ItemRecord], current: &[OrderItem]) -> Self {
        Self::plan_with(order_id, previous, current, UpdatePolicy::Overwrite)
    }

    /// Plans the writes that turn `previous` into `current`.
    ///
    /// Pure computation; each list keeps the order of its input.
    pub fn plan_with(
        order_id: &OrderId,
        previous: &[ItemRecord],
        current: &[OrderItem],
        policy: UpdatePolicy,
    ) -> Self {
        let current_ids: HashSet<&OrderItemId> = current.iter().map(OrderItem::id).collect();

        let to_delete = previous
            .iter()
            .filter(|record| !current_ids.contains(&record.id))
            .cloned()
            .collect();

        let mut changes = Self {
            to_delete,
            ..Self::default()
        };

        for item in current {
            let record = ItemRecord::from_item(order_id, item);
            match previous.iter().find(|stored| stored.id == record.id) {
                None => changes.to_insert.push(record),
                Some(stored) if policy == UpdatePolicy::ChangedOnly && *stored == record => {
                    changes.unchanged.push(record)
                }
                Some(_) => changes.to_update.push(record),
            }
        }

        changes
    }

    /// Returns true if no write is needed.
    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty() && self.to_insert.is_empty() && self.to_update.is_empty()
    }

    /// Returns the number of writes.
    pub fn len(&self) -> usize {
        self.to_delete.len() + self.to_insert.len() + self.to_update.len()
    }
}

/// Applies item change sets through an [`OrderItemWriter`].
pub struct OrderReconciler<'a, W: ?Sized> {
    writer: &'a W,
    policy: UpdatePolicy,
}

impl<'a, W> OrderReconciler<'a, W>
where
    W: OrderItemWriter + ?Sized,
{
    /// Creates a reconciler using [`UpdatePolicy::Overwrite`].
    pub fn new(writer: &'a W) -> Self {
        Self {
            writer,
            policy: UpdatePolicy::Overwrite,
        }
    }

    /// Sets how matched items are treated.
    pub fn with_policy(mut self, policy: UpdatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Plans and applies the writes that bring `previous` in line with the
    /// order's items, returning what was applied.
    ///
    /// `previous` must be what is actually stored for this order; a stale
    /// list leads to misclassified items.
    #[tracing::instrument(skip_all, fields(order_id = %order.id()))]
    pub async fn reconcile(&self, order: &Order, previous: &[ItemRecord]) -> Result<ItemChangeSet> {
        let changes = ItemChangeSet::plan_with(order.id(), previous, order.items(), self.policy);
        self.apply(&changes).await?;
        Ok(changes)
    }

    /// Runs the delete, insert and update phases in that order.
    pub async fn apply(&self, changes: &ItemChangeSet) -> Result<()> {
        tracing::debug!(
            deletes = changes.to_delete.len(),
            inserts = changes.to_insert.len(),
            updates = changes.to_update.len(),
            "applying order item changes"
        );

        self.run_phase(ReconcilePhase::Delete, &changes.to_delete)
            .await?;
        self.run_phase(ReconcilePhase::Insert, &changes.to_insert)
            .await?;
        self.run_phase(ReconcilePhase::Update, &changes.to_update)
            .await
    }

    async fn run_phase(&self, phase: ReconcilePhase, records: &[ItemRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        try_join_all(records.iter().map(|record| self.write(phase, record)))
            .await
            .map_err(|source| {
                tracing::warn!(%phase, error = %source, "order item reconciliation phase failed");
                RepositoryError::Reconcile {
                    phase,
                    source: Box::new(source),
                }
            })?;

        metrics::counter!("order_items_reconciled_total", "phase" => phase.as_str())
            .increment(records.len() as u64);
        Ok(())
    }

    async fn write(&self, phase: ReconcilePhase, record: &ItemRecord) -> Result<()> {
        match phase {
            ReconcilePhase::Delete => self.writer.delete_item(record).await,
            ReconcilePhase::Insert => self.writer.insert_item(record).await,
            ReconcilePhase::Update => self.writer.update_item(record).await,
        }
    }
}
