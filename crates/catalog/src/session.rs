//! Editor session: command execution paired with event publication.
//!
//! An [`EditorSession`] owns one catalog item for the duration of an editing
//! workflow. Each dispatched command is decided and applied atomically (no
//! partial application), then the emitted events are wrapped in envelopes
//! with a monotonically increasing per-stream sequence number and published
//! on an event bus so other open screens of the same session can observe the
//! change.

use uuid::Uuid;

use merx_core::{AggregateRoot, DomainResult, EditorId};
use merx_events::{Event, EventBus, EventEnvelope, execute};

use crate::item::{CatalogCommand, CatalogEvent, CatalogItem, CatalogItemId};

/// Stream type recorded on every published envelope.
pub const CATALOG_ITEM_AGGREGATE_TYPE: &str = "catalog.item";

/// A single-editor session over one catalog item.
#[derive(Debug)]
pub struct EditorSession<B> {
    item: CatalogItem,
    editor: EditorId,
    sequence: u64,
    bus: B,
}

impl<B> EditorSession<B>
where
    B: EventBus<EventEnvelope<CatalogEvent>>,
{
    /// Start a session for a not-yet-created item.
    pub fn new(item_id: CatalogItemId, editor: EditorId, bus: B) -> Self {
        Self {
            item: CatalogItem::empty(item_id),
            editor,
            sequence: 0,
            bus,
        }
    }

    /// Resume a session over an already-loaded item; the stream sequence
    /// continues from the item's version.
    pub fn resume(item: CatalogItem, editor: EditorId, bus: B) -> Self {
        let sequence = item.version();
        Self {
            item,
            editor,
            sequence,
            bus,
        }
    }

    pub fn editor(&self) -> EditorId {
        self.editor
    }

    pub fn item(&self) -> &CatalogItem {
        &self.item
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Execute a command against the item and publish the applied events.
    ///
    /// A rejected command publishes nothing and leaves both the item and the
    /// sequence untouched.
    pub fn dispatch(&mut self, command: &CatalogCommand) -> DomainResult<Vec<CatalogEvent>> {
        let events = execute(&mut self.item, command)?;

        for event in &events {
            self.sequence += 1;
            let envelope = EventEnvelope::new(
                Uuid::now_v7(),
                self.item.id_typed().0,
                CATALOG_ITEM_AGGREGATE_TYPE,
                self.sequence,
                event.clone(),
            );
            if let Err(err) = self.bus.publish(envelope) {
                // The event is already applied; observers catch up on refresh.
                tracing::warn!(error = ?err, "failed to publish catalog event");
            }
            tracing::info!(
                item = %self.item.id_typed(),
                editor = %self.editor,
                event = event.event_type(),
                sequence = self.sequence,
                "catalog event applied"
            );
        }

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Arc;

    use merx_core::{AggregateId, DomainError};
    use merx_events::InMemoryEventBus;

    use crate::item::{ApplyDiscount, BaseDraft, CreateSimple, SimpleOfferDraft};

    type Bus = Arc<InMemoryEventBus<EventEnvelope<CatalogEvent>>>;

    fn test_bus() -> Bus {
        merx_observability::init();
        Arc::new(InMemoryEventBus::new())
    }

    fn test_editor() -> EditorId {
        EditorId::new()
    }

    fn create_simple_cmd(item_id: CatalogItemId) -> CatalogCommand {
        CatalogCommand::CreateSimple(CreateSimple {
            item_id,
            base: BaseDraft {
                sku: "TBL-100".to_string(),
                name: "Oak Dining Table".to_string(),
                category: "Furniture".to_string(),
                ..BaseDraft::default()
            },
            offer: SimpleOfferDraft {
                price: 100_00,
                color: "Gray".to_string(),
                material: "Oak".to_string(),
                main_image: "https://img.test/main.jpg".to_string(),
                inventory: 10,
                ..SimpleOfferDraft::default()
            },
            occurred_at: Utc::now(),
        })
    }

    #[test]
    fn dispatch_publishes_enveloped_events() {
        let bus = test_bus();
        let subscription = bus.subscribe();
        let item_id = CatalogItemId::new(AggregateId::new());
        let mut session = EditorSession::new(item_id, test_editor(), bus);

        let events = session.dispatch(&create_simple_cmd(item_id)).unwrap();
        assert_eq!(events.len(), 1);

        let envelope = subscription.try_recv().unwrap();
        assert_eq!(envelope.aggregate_id(), item_id.0);
        assert_eq!(envelope.aggregate_type(), CATALOG_ITEM_AGGREGATE_TYPE);
        assert_eq!(envelope.sequence_number(), 1);
        assert_eq!(envelope.payload().event_type(), "catalog.item.simple_created");
    }

    #[test]
    fn sequence_numbers_are_strictly_increasing() {
        let bus = test_bus();
        let subscription = bus.subscribe();
        let item_id = CatalogItemId::new(AggregateId::new());
        let mut session = EditorSession::new(item_id, test_editor(), bus);

        session.dispatch(&create_simple_cmd(item_id)).unwrap();
        for percentage in [10, 20, 30] {
            let cmd = CatalogCommand::ApplyDiscount(ApplyDiscount {
                item_id,
                percentage,
                occurred_at: Utc::now(),
            });
            session.dispatch(&cmd).unwrap();
        }

        let mut last = 0;
        while let Ok(envelope) = subscription.try_recv() {
            assert!(envelope.sequence_number() > last);
            last = envelope.sequence_number();
        }
        assert_eq!(last, 4);
        assert_eq!(session.sequence(), 4);
    }

    #[test]
    fn rejected_commands_publish_nothing() {
        let bus = test_bus();
        let subscription = bus.subscribe();
        let item_id = CatalogItemId::new(AggregateId::new());
        let mut session = EditorSession::new(item_id, test_editor(), bus);
        session.dispatch(&create_simple_cmd(item_id)).unwrap();
        let _ = subscription.try_recv().unwrap();

        let before = session.item().clone();
        let cmd = CatalogCommand::ApplyDiscount(ApplyDiscount {
            item_id,
            percentage: 101,
            occurred_at: Utc::now(),
        });

        let err = session.dispatch(&cmd).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error"),
        }
        assert!(subscription.try_recv().is_err());
        assert_eq!(session.item(), &before);
        assert_eq!(session.sequence(), 1);
    }

    #[test]
    fn every_subscriber_receives_the_events() {
        let bus = test_bus();
        let screen_a = bus.subscribe();
        let screen_b = bus.subscribe();
        let item_id = CatalogItemId::new(AggregateId::new());
        let mut session = EditorSession::new(item_id, test_editor(), bus);

        session.dispatch(&create_simple_cmd(item_id)).unwrap();

        assert_eq!(screen_a.try_recv().unwrap().sequence_number(), 1);
        assert_eq!(screen_b.try_recv().unwrap().sequence_number(), 1);
    }

    #[test]
    fn resume_continues_the_stream_sequence() {
        let bus = test_bus();
        let item_id = CatalogItemId::new(AggregateId::new());
        let mut session = EditorSession::new(item_id, test_editor(), bus);
        session.dispatch(&create_simple_cmd(item_id)).unwrap();
        let item = session.item().clone();

        let bus = test_bus();
        let subscription = bus.subscribe();
        let mut resumed = EditorSession::resume(item, test_editor(), bus);
        assert_eq!(resumed.sequence(), 1);

        let cmd = CatalogCommand::ApplyDiscount(ApplyDiscount {
            item_id,
            percentage: 10,
            occurred_at: Utc::now(),
        });
        resumed.dispatch(&cmd).unwrap();

        assert_eq!(subscription.try_recv().unwrap().sequence_number(), 2);
    }
}
