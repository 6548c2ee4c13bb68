//! Benchmarks for solving and frame merging
//!
//! Measures performance of:
//! - Backtracking solve on puzzles of increasing difficulty
//! - Consensus merge of one recognized frame
//! - Recognition fan-out over 81 cell images

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sudoku_lens::{
    capture::{glyph, CandidateFrame, CellCandidate, CellImage, Geometry},
    consensus::{ConsensusConfig, ConsensusState, DigitLibrary},
    recognition::{recognize_cells, TemplateRecognizer},
    solver::{Grid, Solver},
};

const PUZZLES: &[(&str, &str)] = &[
    (
        "easy",
        "530070000600195000098000060800060003400803001700020006060000280000419005000080079",
    ),
    (
        "hard",
        "000000010400000000020000000000050407008000300001090000300400200050100000000806000",
    ),
    (
        "empty",
        "000000000000000000000000000000000000000000000000000000000000000000000000000000000",
    ),
];

fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve");
    let solver = Solver::new();

    for &(name, puzzle) in PUZZLES {
        let grid: Grid = puzzle.parse().expect("valid benchmark puzzle");
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(name), &grid, |b, &g| {
            b.iter(|| solver.solve(black_box(g)))
        });
    }
    group.finish();
}

fn candidate_frame(grid: &Grid) -> CandidateFrame {
    let cells = grid
        .cells()
        .iter()
        .map(|&v| match v {
            0 => CellCandidate::empty(CellImage::blank(28, 28)),
            d => CellCandidate::new(d, 0.1, glyph::render_digit(28, 28, d)),
        })
        .collect();
    CandidateFrame::new(Geometry::square(0.0, 0.0, 252.0), cells)
}

fn bench_merge(c: &mut Criterion) {
    let grid: Grid = PUZZLES[0].1.parse().expect("valid benchmark puzzle");
    let frame = candidate_frame(&grid);

    c.bench_function("merge_frame", |b| {
        b.iter_batched(
            || ConsensusState::new(ConsensusConfig::default()),
            |mut state| state.record_frame(black_box(&frame)),
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_recognize(c: &mut Criterion) {
    let grid: Grid = PUZZLES[0].1.parse().expect("valid benchmark puzzle");
    let images: Vec<CellImage> = grid
        .cells()
        .iter()
        .map(|&v| match v {
            0 => CellImage::blank(28, 28),
            d => glyph::render_digit(28, 28, d),
        })
        .collect();
    let recognizer = TemplateRecognizer::default();
    let library = DigitLibrary::new();

    c.bench_function("recognize_cells", |b| {
        b.iter(|| {
            recognize_cells(
                &recognizer,
                Geometry::square(0.0, 0.0, 252.0),
                black_box(&images),
                &library,
            )
        })
    });
}

criterion_group!(benches, bench_solve, bench_merge, bench_recognize);
criterion_main!(benches);
