use buscaminas_core::{GameConfig, Minefield};
use criterion::{Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::SmallRng;

fn flood_reveal_open_board(c: &mut Criterion) {
    c.bench_function("flood_reveal_255x255_open", |b| {
        b.iter(|| {
            let mut field = Minefield::new(GameConfig::new((255, 255), 0));
            let mut rng = SmallRng::seed_from_u64(7);
            field.generate_mines(&mut rng, (127, 127));
            field.reveal((127, 127)).unwrap()
        })
    });
}

fn generate_dense_board(c: &mut Criterion) {
    c.bench_function("generate_200x200_8000_mines", |b| {
        b.iter(|| {
            let mut field = Minefield::new(GameConfig::new((200, 200), 8000));
            let mut rng = SmallRng::seed_from_u64(7);
            field.generate_mines(&mut rng, (100, 100));
            field
        })
    });
}

criterion_group!(benches, flood_reveal_open_board, generate_dense_board);
criterion_main!(benches);
