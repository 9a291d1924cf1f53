use super::{Retained, RenderUnit, ScrollAdjustment, WindowController, WindowState};
use palaver_store::EntryStore;
use tracing::debug;

/// Result of a reveal request
#[derive(Debug, Clone, PartialEq)]
pub enum RevealOutcome {
    /// A batch of units was appended (and possibly old units evicted)
    Revealed(RevealBatch),
    /// Every entry is already revealed; terminal and idempotent
    NoMore,
}

/// Bookkeeping for one successful reveal
#[derive(Debug, Clone, PartialEq)]
pub struct RevealBatch {
    /// Rendered units appended (entries plus boundary markers)
    pub appended: usize,
    /// Entries consumed from the store; boundary markers do not count
    pub entries_consumed: usize,
    /// Units evicted from the front to honor the visible cap
    pub evicted: usize,
    /// Aggregate offset correction for the eviction, when any happened.
    /// Always a `ShiftBy` with a negative delta: content above the viewport
    /// was removed, so the raw scroll coordinate must shrink by exactly the
    /// evicted extent.
    pub prune: Option<ScrollAdjustment>,
}

impl WindowController {
    /// Reveal the next batch of entries, evicting from the front when the
    /// retained unit count exceeds the visible cap.
    ///
    /// Calling past the end is a normal terminal condition, not an error:
    /// the controller parks in [`WindowState::Exhausted`] and keeps
    /// answering [`RevealOutcome::NoMore`].
    pub fn request_more(&mut self, store: &EntryStore) -> RevealOutcome {
        if self.revealed_count >= store.total() {
            self.state = WindowState::Exhausted;
            debug!(revealed = self.revealed_count, "window exhausted");
            return RevealOutcome::NoMore;
        }

        let end = (self.revealed_count + self.options.batch_size).min(store.total());
        let batch = store.slice(self.revealed_count, end);

        let mut appended = 0;
        for entry in batch {
            let date = entry.date();
            if self.last_boundary != Some(date) {
                self.retained.push_back(Retained { unit: RenderUnit::DateBoundary(date), extent: 0 });
                self.last_boundary = Some(date);
                appended += 1;
            }

            let is_local = self.options.local_participant.as_deref() == Some(entry.sender.as_str());
            self.retained
                .push_back(Retained { unit: RenderUnit::Message { entry: entry.clone(), is_local }, extent: 0 });
            appended += 1;
        }

        let entries_consumed = batch.len();
        self.revealed_count = end;

        // Eviction runs as a side effect of every successful reveal and is
        // atomic: observers only ever see the fully pruned window.
        let mut evicted = 0;
        let mut removed_extent: u64 = 0;
        while self.retained.len() > self.options.visible_cap {
            if let Some(old) = self.retained.pop_front() {
                removed_extent += old.extent + self.options.unit_spacing;
                evicted += 1;
            }
        }

        self.state = WindowState::Idle;
        debug!(revealed = self.revealed_count, appended, evicted, "batch revealed");

        let prune = (evicted > 0).then(|| ScrollAdjustment::ShiftBy { delta: -(removed_extent as i64) });
        RevealOutcome::Revealed(RevealBatch { appended, entries_consumed, evicted, prune })
    }

    /// Publish rendered extents after the consumer's layout pass, one per
    /// retained unit in order. Extents recorded here feed the prune offset of
    /// later evictions.
    pub fn settle_layout(&mut self, extents: &[u64]) {
        if extents.len() != self.retained.len() {
            debug!(published = extents.len(), retained = self.retained.len(), "extent count mismatch");
        }
        for (slot, extent) in self.retained.iter_mut().zip(extents) {
            slot.extent = *extent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::WindowOptions;
    use chrono::NaiveDate;
    use palaver_core::Entry;

    fn entry(day: u32, hour: u32, sender: &str) -> Entry {
        let ts = NaiveDate::from_ymd_opt(2025, 4, day).unwrap().and_hms_opt(hour, 0, 0).unwrap();
        Entry::new(ts, sender, format!("msg d{day} h{hour}"))
    }

    fn single_day_store(count: usize) -> EntryStore {
        EntryStore::new((0..count).map(|i| entry(1, (i % 24) as u32, "Alice")).collect())
    }

    fn controller(batch_size: usize, visible_cap: usize) -> WindowController {
        WindowController::new(WindowOptions { batch_size, visible_cap, unit_spacing: 1, local_participant: None })
    }

    fn expect_batch(outcome: RevealOutcome) -> RevealBatch {
        match outcome {
            RevealOutcome::Revealed(batch) => batch,
            RevealOutcome::NoMore => panic!("expected a revealed batch"),
        }
    }

    #[test]
    fn test_first_reveal_inserts_boundary() {
        let store = single_day_store(3);
        let mut controller = controller(50, 200);

        let batch = expect_batch(controller.request_more(&store));
        assert_eq!(batch.entries_consumed, 3);
        // 3 messages on one day: one boundary + three messages
        assert_eq!(batch.appended, 4);
        assert_eq!(controller.unit_count(), 4);
        assert!(matches!(controller.units().next(), Some(RenderUnit::DateBoundary(_))));
    }

    #[test]
    fn test_boundary_per_distinct_date() {
        let store = EntryStore::new(vec![entry(1, 9, "A"), entry(1, 10, "A"), entry(2, 9, "A"), entry(3, 9, "A")]);
        let mut controller = controller(50, 200);

        let batch = expect_batch(controller.request_more(&store));
        assert_eq!(batch.entries_consumed, 4);
        assert_eq!(batch.appended, 7);

        let boundaries: Vec<NaiveDate> = controller
            .units()
            .filter_map(|u| match u {
                RenderUnit::DateBoundary(d) => Some(*d),
                RenderUnit::Message { .. } => None,
            })
            .collect();
        assert_eq!(
            boundaries,
            vec![
                NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
                NaiveDate::from_ymd_opt(2025, 4, 3).unwrap(),
            ]
        );
    }

    #[test]
    fn test_no_boundary_repeat_across_batches() {
        // The date marker carries across reveals: a batch starting on the
        // same calendar date must not insert a duplicate separator.
        let store = single_day_store(10);
        let mut controller = controller(5, 200);

        expect_batch(controller.request_more(&store));
        let second = expect_batch(controller.request_more(&store));
        assert_eq!(second.appended, 5);

        let boundary_count = controller.units().filter(|u| !u.is_message()).count();
        assert_eq!(boundary_count, 1);
    }

    #[test]
    fn test_reveal_monotonicity() {
        let store = single_day_store(120);
        let mut controller = controller(50, 200);

        let mut previous = 0;
        loop {
            let outcome = controller.request_more(&store);
            assert!(controller.revealed_count() >= previous);
            assert!(controller.revealed_count() <= store.total());
            previous = controller.revealed_count();
            if outcome == RevealOutcome::NoMore {
                break;
            }
        }
        assert_eq!(controller.revealed_count(), 120);
    }

    #[test]
    fn test_partial_final_batch() {
        let store = single_day_store(7);
        let mut controller = controller(5, 200);

        assert_eq!(expect_batch(controller.request_more(&store)).entries_consumed, 5);
        assert_eq!(expect_batch(controller.request_more(&store)).entries_consumed, 2);
        assert_eq!(controller.request_more(&store), RevealOutcome::NoMore);
    }

    #[test]
    fn test_exhaustion_idempotence() {
        let store = single_day_store(3);
        let mut controller = controller(50, 200);

        expect_batch(controller.request_more(&store));
        assert_eq!(controller.request_more(&store), RevealOutcome::NoMore);
        assert!(controller.is_exhausted());

        let revealed = controller.revealed_count();
        for _ in 0..3 {
            assert_eq!(controller.request_more(&store), RevealOutcome::NoMore);
            assert_eq!(controller.revealed_count(), revealed);
            assert!(controller.is_exhausted());
        }
    }

    #[test]
    fn test_empty_store_is_immediately_exhausted() {
        let store = EntryStore::new(vec![]);
        let mut controller = controller(50, 200);
        assert_eq!(controller.request_more(&store), RevealOutcome::NoMore);
        assert!(controller.is_exhausted());
        assert_eq!(controller.revealed_count(), 0);
    }

    #[test]
    fn test_eviction_cap_invariant() {
        let store = single_day_store(30);
        let mut controller = controller(10, 12);

        loop {
            if controller.request_more(&store) == RevealOutcome::NoMore {
                break;
            }
            assert!(controller.unit_count() <= 12);
        }
        // All 30 entries revealed even though only a suffix is retained.
        assert_eq!(controller.revealed_count(), 30);
    }

    #[test]
    fn test_eviction_preserves_suffix_order() {
        let entries: Vec<Entry> = (0..30u32).map(|i| entry(1, i % 24, &format!("S{i:02}"))).collect();
        let store = EntryStore::new(entries);
        let mut controller = controller(10, 8);

        while controller.request_more(&store) != RevealOutcome::NoMore {}

        let senders: Vec<String> = controller
            .units()
            .filter_map(|u| match u {
                RenderUnit::Message { entry, .. } => Some(entry.sender.clone()),
                RenderUnit::DateBoundary(_) => None,
            })
            .collect();
        // The retained window is a contiguous suffix of the global order.
        let expected: Vec<String> = (30 - senders.len()..30).map(|i| format!("S{i:02}")).collect();
        assert_eq!(senders, expected);
    }

    #[test]
    fn test_prune_offset_sums_extents_and_spacing() {
        let store = single_day_store(12);
        let mut controller = controller(6, 7);

        // First batch: boundary + 6 messages = 7 units, exactly at cap.
        let first = expect_batch(controller.request_more(&store));
        assert_eq!(first.appended, 7);
        assert!(first.prune.is_none());

        // Consumer lays out: 4 rows per unit.
        let extents: Vec<u64> = vec![4; controller.unit_count()];
        controller.settle_layout(&extents);

        // Second batch appends 6 messages; 6 oldest units must go. Each
        // evicted unit contributes its recorded extent plus spacing.
        let second = expect_batch(controller.request_more(&store));
        assert_eq!(second.evicted, 6);
        assert_eq!(second.prune, Some(ScrollAdjustment::ShiftBy { delta: -(6 * (4 + 1)) }));
        assert_eq!(controller.unit_count(), 7);
    }

    #[test]
    fn test_prune_before_any_layout_counts_spacing_only() {
        let store = single_day_store(12);
        let mut controller = controller(6, 7);

        expect_batch(controller.request_more(&store));
        // No settle_layout: extents are still zero.
        let second = expect_batch(controller.request_more(&store));
        assert_eq!(second.prune, Some(ScrollAdjustment::ShiftBy { delta: -6 }));
    }

    #[test]
    fn test_local_participant_flag() {
        let store = EntryStore::new(vec![entry(1, 9, "Alice"), entry(1, 10, "Bob")]);
        let mut controller = WindowController::new(WindowOptions {
            local_participant: Some("Bob".to_string()),
            ..WindowOptions::default()
        });

        expect_batch(controller.request_more(&store));
        let locals: Vec<bool> = controller
            .units()
            .filter_map(|u| match u {
                RenderUnit::Message { is_local, .. } => Some(*is_local),
                RenderUnit::DateBoundary(_) => None,
            })
            .collect();
        assert_eq!(locals, vec![false, true]);
    }

    #[test]
    fn test_settle_layout_updates_extents() {
        let store = single_day_store(2);
        let mut controller = controller(50, 200);
        expect_batch(controller.request_more(&store));

        controller.settle_layout(&[2, 5, 3]);
        let recorded: Vec<u64> = controller.retained.iter().map(|r| r.extent).collect();
        assert_eq!(recorded, vec![2, 5, 3]);
    }
}
