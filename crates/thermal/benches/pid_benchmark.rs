use criterion::{black_box, criterion_group, criterion_main, Criterion};
use thermal::pid::{HeaterCeiling, Pid, PidGains};

fn bench_compute(c: &mut Criterion) {
    let mut pid = Pid::new(
        PidGains::new(4.0, 0.03, 12.0),
        0.0,
        100.0,
        90.0,
        HeaterCeiling::new(15.0, 10.0, 10.0),
    );
    pid.compute(50.0, 25.0, 30.0, 0);

    let mut t = 500u64;
    c.bench_function("pid_compute_step", |b| {
        b.iter(|| {
            let out = pid.compute(
                black_box(50.0),
                black_box(48.0),
                black_box(58.0),
                black_box(t),
            );
            t += 500;
            black_box(out)
        })
    });
}

criterion_group!(benches, bench_compute);
criterion_main!(benches);
