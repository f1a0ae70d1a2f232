use criterion::{Criterion, black_box, criterion_group, criterion_main};

use kotoba::card::Card;
use kotoba::card::parser::parse_block;
use kotoba::engine::partition::{ChapterMap, DEFAULT_CHAPTER_SIZE, repartition};

const KANJI: [(&str, &str, &str); 6] = [
    ("魚", "さかな", "Fish"),
    ("水", "みず", "Water"),
    ("火", "ひ", "Fire"),
    ("山", "やま", "Mountain"),
    ("川", "かわ", "River"),
    ("木", "き", "Tree"),
];

fn make_list(count: usize) -> String {
    (0..count)
        .map(|i| {
            let (kanji, hiragana, meaning) = KANJI[i % KANJI.len()];
            if i % 10 == 9 {
                // unparseable noise, like a pasted heading
                format!("Lesson {i}")
            } else {
                format!("{}. {kanji}（{hiragana}）＝ {meaning}", i + 1)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn make_cards(count: usize) -> Vec<Card> {
    parse_block(&make_list(count * 2)).cards.into_iter().take(count).collect()
}

fn bench_parse(c: &mut Criterion) {
    let list = make_list(600);

    c.bench_function("parse_block (600 lines)", |b| {
        b.iter(|| parse_block(black_box(&list)))
    });
}

fn bench_repartition(c: &mut Criterion) {
    let existing = repartition(&ChapterMap::default(), make_cards(400), DEFAULT_CHAPTER_SIZE);
    let incoming = make_cards(200);

    c.bench_function("repartition (400 existing + 200 new)", |b| {
        b.iter(|| {
            repartition(
                black_box(&existing),
                black_box(incoming.clone()),
                DEFAULT_CHAPTER_SIZE,
            )
        })
    });
}

criterion_group!(benches, bench_parse, bench_repartition);
criterion_main!(benches);
