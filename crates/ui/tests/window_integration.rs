//! End-to-end flow: transcript text through the parser and store into the
//! window controller, with a simulated layout loop publishing extents and
//! applying scroll adjustments the way the viewer does.

use palaver_core::EntryParser;
use palaver_store::EntryStore;
use palaver_ui::{RenderUnit, RevealOutcome, ScrollAdjustment, WindowController, WindowOptions};
use std::io::Cursor;

fn transcript(messages: usize) -> String {
    let mut out = String::new();
    for i in 0..messages {
        let day = 1 + i / 10;
        let hour = i % 10;
        out.push_str(&format!("[{day}/6/25, {hour}:00] Sender{}: message number {i}\n", i % 3));
    }
    out
}

fn store_from(text: &str) -> EntryStore {
    EntryStore::from_entries(EntryParser::new(Cursor::new(text.to_string())))
}

#[test]
fn parse_store_reveal_round_trip() {
    let store = store_from(&transcript(75));
    assert_eq!(store.total(), 75);

    let mut controller = WindowController::new(WindowOptions::default());

    let first = match controller.request_more(&store) {
        RevealOutcome::Revealed(batch) => batch,
        RevealOutcome::NoMore => panic!("expected a batch"),
    };
    assert_eq!(first.entries_consumed, 50);
    // 50 messages spread over days 1-5: five date boundaries.
    assert_eq!(first.appended, 55);

    match controller.request_more(&store) {
        RevealOutcome::Revealed(batch) => {
            assert_eq!(batch.entries_consumed, 25);
            assert_eq!(controller.revealed_count(), 75);
        }
        RevealOutcome::NoMore => panic!("expected the final batch"),
    }

    assert_eq!(controller.request_more(&store), RevealOutcome::NoMore);
    assert!(controller.is_exhausted());
}

#[test]
fn malformed_and_multiline_transcript_end_to_end() {
    let text = "[1/6/25, 9:00] Alice: first\nwith a second line\n\
[31/2/25, 9:30] Ghost: never parses\n\
[1/6/25, 10:00] Bob: <attached: photo.jpg>\n";
    let store = store_from(text);

    assert_eq!(store.total(), 2);
    assert_eq!(store.get(0).unwrap().body, "first\nwith a second line");
    assert_eq!(store.get(1).unwrap().media_reference().unwrap().file_name, "photo.jpg");

    let mut controller = WindowController::new(WindowOptions {
        local_participant: Some("Bob".to_string()),
        ..WindowOptions::default()
    });
    match controller.request_more(&store) {
        RevealOutcome::Revealed(batch) => {
            // One boundary, two messages.
            assert_eq!(batch.appended, 3);
        }
        RevealOutcome::NoMore => panic!("expected a batch"),
    }

    let units: Vec<&RenderUnit> = controller.units().collect();
    assert!(matches!(units[0], RenderUnit::DateBoundary(_)));
    assert!(matches!(units[1], RenderUnit::Message { is_local: false, .. }));
    assert!(matches!(units[2], RenderUnit::Message { is_local: true, .. }));
}

#[test]
fn simulated_layout_loop_keeps_anchor_stable() {
    let store = store_from(&transcript(90));
    let mut controller = WindowController::new(WindowOptions {
        batch_size: 30,
        visible_cap: 40,
        unit_spacing: 2,
        local_participant: None,
    });

    // Every unit lays out at 3 rows in this simulation.
    const EXTENT: u64 = 3;
    const VIEWPORT: u64 = 20;
    let mut offset: u64 = 0;

    let mut old_max: u64 = 0;
    loop {
        let outcome = controller.request_more(&store);
        let batch = match outcome {
            RevealOutcome::Revealed(batch) => batch,
            RevealOutcome::NoMore => break,
        };

        // Layout settles: publish uniform extents, derive the new max.
        let extents: Vec<u64> = vec![EXTENT; controller.unit_count()];
        controller.settle_layout(&extents);
        let total_rows: u64 = controller.unit_count() as u64 * (EXTENT + 2);
        let new_max = total_rows.saturating_sub(VIEWPORT);

        offset = ScrollAdjustment::PreserveRelative { old_max, new_max }.apply(offset);
        if let Some(prune) = batch.prune {
            offset = prune.apply(offset);
        }
        offset = offset.min(new_max);
        old_max = new_max;

        assert!(controller.unit_count() <= 40);
        // Anchor a third of the way down for the next round.
        offset = new_max / 3;
    }

    assert_eq!(controller.revealed_count(), 90);
    assert!(controller.is_exhausted());
}

#[test]
fn prune_offset_matches_evicted_rows_exactly() {
    let store = store_from(&transcript(40));
    let mut controller =
        WindowController::new(WindowOptions { batch_size: 20, visible_cap: 25, unit_spacing: 1, local_participant: None });

    // First reveal fits under the cap.
    let first = match controller.request_more(&store) {
        RevealOutcome::Revealed(batch) => batch,
        RevealOutcome::NoMore => panic!("expected a batch"),
    };
    assert!(first.prune.is_none());
    let first_units = controller.unit_count();

    // Settle with distinct extents so the prune sum is observable.
    let extents: Vec<u64> = (0..first_units as u64).map(|i| 2 + i % 3).collect();
    controller.settle_layout(&extents);

    let second = match controller.request_more(&store) {
        RevealOutcome::Revealed(batch) => batch,
        RevealOutcome::NoMore => panic!("expected a batch"),
    };
    let evicted = second.evicted;
    assert!(evicted > 0);

    let expected: u64 = extents.iter().take(evicted).map(|e| e + 1).sum();
    assert_eq!(second.prune, Some(ScrollAdjustment::ShiftBy { delta: -(expected as i64) }));
}
