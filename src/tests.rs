use crate::{
    build_generator_matrix, decode, encode, expand_to_bitmatrix, make_decoding_bitmatrix,
    CauchyCode, CodingConfig, ErasureSet, Error, Stripe,
};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

fn random_data(rng: &mut ChaCha20Rng, k: usize, size: usize) -> Vec<Vec<u8>> {
    (0..k)
        .map(|_| (0..size).map(|_| rng.gen()).collect())
        .collect()
}

/// All subsets of `0..n` with exactly `r` elements.
fn combinations(n: usize, r: usize) -> Vec<Vec<usize>> {
    if r == 0 {
        return vec![Vec::new()];
    }
    if n < r {
        return Vec::new();
    }
    let mut with_last = combinations(n - 1, r - 1);
    for combo in &mut with_last {
        combo.push(n - 1);
    }
    let mut result = combinations(n - 1, r);
    result.extend(with_last);
    result
}

#[test]
fn test_concrete_k4_m2_w4_scenario() {
    let (k, m, w, packetsize) = (4, 2, 4, 8);
    let size = w as usize * packetsize;
    let bitmatrix = expand_to_bitmatrix(&build_generator_matrix(k, m, w).unwrap());

    let mut rng = ChaCha20Rng::seed_from_u64(0x5EED);
    let mut data = random_data(&mut rng, k, size);
    let mut coding = vec![vec![0u8; size]; m];
    encode(k, m, w, &bitmatrix, &data, &mut coding, size, packetsize).unwrap();

    let original = data[0].clone();
    data[0].fill(0);
    coding[1].fill(0);

    let erasures = ErasureSet::from_terminated(&[0, k as i32 + 1, -1], k, m).unwrap();
    decode(
        k,
        m,
        w,
        &bitmatrix,
        &erasures,
        &mut data,
        &mut coding,
        size,
        packetsize,
    )
    .unwrap();
    assert_eq!(data[0], original);
}

#[test]
fn test_roundtrip_every_erasure_pattern() {
    let configs = [
        (2, 1, 2),
        (3, 2, 3),
        (4, 2, 4),
        (5, 3, 4),
        (4, 4, 3),
        (6, 2, 8),
        (4, 2, 16),
        (3, 2, 30),
        (3, 2, 32),
    ];
    let packetsize = 8;
    let mut rng = ChaCha20Rng::seed_from_u64(42);

    for &(k, m, w) in &configs {
        let config = CodingConfig::new(k, m, w, packetsize).unwrap();
        let code = CauchyCode::new(config).unwrap();
        let size = config.device_size() * 2;
        let data = random_data(&mut rng, k, size);
        let mut coding = vec![vec![0u8; size]; m];
        code.encode(&data, &mut coding).unwrap();

        for count in 1..=m {
            for erased in combinations(k + m, count) {
                let mut d = data.clone();
                let mut c = coding.clone();
                for &i in &erased {
                    if i < k {
                        d[i].fill(0);
                    } else {
                        c[i - k].fill(0);
                    }
                }
                let erasures = ErasureSet::new(erased.iter().copied(), k, m).unwrap();
                code.decode(&erasures, &mut d, &mut c).unwrap();
                assert_eq!(d, data, "k={k} m={m} w={w} erased={erased:?}");
                assert_eq!(c, coding, "k={k} m={m} w={w} erased={erased:?}");
            }
        }
    }
}

#[test]
fn test_every_survivor_choice_is_invertible() {
    let configs = [
        (2, 2, 2),
        (3, 3, 3),
        (4, 3, 3),
        (5, 3, 4),
        (3, 2, 8),
        (4, 2, 16),
        (3, 2, 30),
        (3, 2, 32),
    ];
    for &(k, m, w) in &configs {
        let bitmatrix = expand_to_bitmatrix(&build_generator_matrix(k, m, w).unwrap());
        for erased in combinations(k + m, m) {
            let erasures = ErasureSet::new(erased.iter().copied(), k, m).unwrap();
            let decoding = make_decoding_bitmatrix(k, m, w, &bitmatrix, &erasures)
                .unwrap_or_else(|e| panic!("k={k} m={m} w={w} erased={erased:?}: {e}"));
            assert_eq!(decoding.survivors.len(), k);
        }
    }
}

#[test]
fn test_m_erasures_succeed_and_m_plus_one_fail() {
    let (k, m, w) = (4, 2, 4);
    assert!(ErasureSet::new([0, 1], k, m).is_ok());
    assert!(matches!(
        ErasureSet::new([0, 1, 2], k, m),
        Err(Error::UnrecoverableErasure(_))
    ));
    assert!(matches!(
        ErasureSet::from_terminated(&[3, 4, 5, -1], k, m),
        Err(Error::UnrecoverableErasure(_))
    ));
    assert!(matches!(
        ErasureSet::new([2, 2], k, m),
        Err(Error::UnrecoverableErasure(_))
    ));

    let config = CodingConfig::new(k, m, w, 8).unwrap();
    let code = CauchyCode::new(config).unwrap();
    let erasures = ErasureSet::new([0, 5], k, m).unwrap();
    assert!(code.decoding_matrix(&erasures).is_ok());
}

#[test]
fn test_construction_rejects_oversized_code() {
    assert!(matches!(
        build_generator_matrix(10, 1, 3),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        CodingConfig::new(10, 1, 3, 8),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn test_random_erasures_large_field() {
    let config = CodingConfig::new(10, 4, 8, 16).unwrap();
    let code = CauchyCode::new(config).unwrap();
    let mut rng = ChaCha20Rng::seed_from_u64(7);

    let mut stripe = Stripe::new(&config, 2).unwrap();
    for i in 0..config.k() {
        rng.fill(stripe.device_mut(i).unwrap());
    }
    stripe.encode(&code).unwrap();
    let original = stripe.clone();

    let mut indices: Vec<usize> = (0..config.total_devices()).collect();
    for _ in 0..20 {
        indices.shuffle(&mut rng);
        let count = rng.gen_range(1..=config.m());
        let erased = &indices[..count];
        for &i in erased {
            stripe.erase(i).unwrap();
        }
        let erasures = ErasureSet::new(erased.iter().copied(), config.k(), config.m()).unwrap();
        stripe.decode(&code, &erasures).unwrap();
        assert_eq!(stripe, original, "erased={erased:?}");
    }
}
