use criterion::{Criterion, criterion_group, criterion_main};
use rhythm_engine::matcher::best_match;
use rhythm_engine::{InputEvent, Note, Pattern, ProcessedSet, RhythmEngine, RhythmEngineOptions};

const LANES: [&str; 4] = ["kick", "snare", "hihat", "tom"];

fn dense_notes(count: usize) -> Vec<Note> {
    (0..count)
        .map(|i| Note::new(i as f64 * 50.0, LANES[i % LANES.len()]))
        .collect()
}

fn bench_best_match(c: &mut Criterion) {
    let notes = dense_notes(10_000);
    let processed = ProcessedSet::new(notes.len());
    let input = InputEvent::new("snare", 250_010.0);

    c.bench_function("best_match_10k", |b| {
        b.iter(|| best_match(&notes, &processed, &input, input.timestamp, 120.0));
    });
}

fn bench_full_playthrough(c: &mut Criterion) {
    let notes = dense_notes(2_000);
    let inputs: Vec<InputEvent> = notes
        .iter()
        .enumerate()
        .filter(|(i, _)| i % 7 != 0)
        .map(|(i, n)| InputEvent::new(n.note_type.clone(), n.time + (i % 5) as f64 * 10.0))
        .collect();
    let pattern = Pattern::new("bench", 101_000.0, notes);

    c.bench_function("playthrough_2k", |b| {
        b.iter(|| {
            let mut engine = RhythmEngine::new(RhythmEngineOptions::default()).unwrap();
            engine.load_pattern(pattern.clone()).unwrap();
            engine.start().unwrap();
            let mut next_tick = 0.0;
            for input in &inputs {
                while next_tick <= input.timestamp {
                    engine.update(next_tick);
                    next_tick += 16.0;
                }
                engine.process_input(input);
            }
            engine.update(f64::MAX);
            engine.stats().score
        });
    });
}

criterion_group!(benches, bench_best_match, bench_full_playthrough);
criterion_main!(benches);
