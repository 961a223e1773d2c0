use artspace::auth::{PasswordHasher, Role, TokenIssuer};
use chrono::Duration;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_tokens(c: &mut Criterion) {
    let issuer = TokenIssuer::new(b"bench-signing-key-0123456789abcdefgh", Duration::hours(168));

    c.bench_function("token_issue", |b| {
        b.iter(|| issuer.issue(black_box(42), Role::Artist))
    });

    let token = issuer.issue(42, Role::Artist).unwrap();
    c.bench_function("token_verify", |b| {
        b.iter(|| issuer.verify(black_box(&token)))
    });

    let mut forged = token.clone();
    forged.pop();
    forged.push('x');
    c.bench_function("token_verify_rejected", |b| {
        b.iter(|| issuer.verify(black_box(&forged)))
    });
}

fn bench_passwords(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let hasher = PasswordHasher::new(4).unwrap();
    let digest = rt.block_on(hasher.hash("correct horse")).unwrap();

    c.bench_function("password_hash_cost4", |b| {
        b.iter(|| rt.block_on(hasher.hash(black_box("correct horse"))))
    });

    c.bench_function("password_verify_cost4", |b| {
        b.iter(|| rt.block_on(hasher.verify(black_box("correct horse"), &digest)))
    });
}

criterion_group!(benches, bench_tokens, bench_passwords);
criterion_main!(benches);
