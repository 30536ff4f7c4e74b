use criterion::{criterion_group, BatchSize, Criterion};
use transmission_codec::{
    BitReader, Config, Encode, LengthType, Literal, Operation, Operator, Packet, Read,
};

/// Builds a tree of `width` operators, each holding `width` literals.
pub fn tree(width: usize) -> Packet {
    let operators = (0..width)
        .map(|i| {
            let literals = (0..width)
                .map(|j| Literal::new((j % 8) as u8, (i * width + j) as u64).unwrap().into())
                .collect();
            let length_type = if i % 2 == 0 {
                LengthType::Count
            } else {
                LengthType::TotalBits
            };
            Operator::new((i % 8) as u8, Operation::Sum, length_type, literals)
                .unwrap()
                .into()
        })
        .collect();
    Operator::new(0, Operation::Maximum, LengthType::Count, operators)
        .unwrap()
        .into()
}

fn benchmark_decode(c: &mut Criterion) {
    for width in [4, 16, 64] {
        let (bytes, num_bits) = tree(width).encode().finish();
        c.bench_function(
            &format!("{}/width={width} bits={num_bits}", module_path!()),
            |b| {
                b.iter_batched(
                    || BitReader::new(bytes.clone(), num_bits).unwrap(),
                    |mut reader| Packet::read_cfg(&mut reader, &Config::default()).unwrap(),
                    BatchSize::SmallInput,
                );
            },
        );
    }
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = benchmark_decode,
}
